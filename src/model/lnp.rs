//! Linear-nonlinear-Poisson model.
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::kernel::Refractory;
use super::parameters::{LnpParameters, ParameterSet};
use super::SpikingModel;
use crate::error::SNNError;
use crate::stimulation::Stimulation;

/// A neuron fires as a Poisson process of rate `exp(a - threshold)` over a step of duration `dt`,
/// i.e., it spikes with probability `1 - exp(-exp(a - threshold) dt)`.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct LnpModel {
    parameters: LnpParameters,
    stimulations: Vec<Stimulation>,
    tuned: BTreeSet<String>,
}

impl SpikingModel for LnpModel {
    type Parameters = LnpParameters;

    fn from_parts(
        parameters: LnpParameters,
        stimulations: Vec<Stimulation>,
    ) -> Result<Self, SNNError> {
        parameters.validate()?;
        Ok(LnpModel {
            parameters,
            stimulations,
            tuned: BTreeSet::new(),
        })
    }

    fn with_firing_rate(firing_rate: f32) -> Result<Self, SNNError> {
        if !(firing_rate > 0.0 && firing_rate < 1.0) {
            return Err(SNNError::InvalidParameter(format!(
                "The firing rate must be in (0, 1), got {}",
                firing_rate
            )));
        }
        let dt = LnpParameters::default().dt;
        let parameters = LnpParameters {
            threshold: -(-(-firing_rate).ln_1p() / dt).ln(),
            ..Default::default()
        };
        Self::from_parts(parameters, vec![])
    }

    fn parameters(&self) -> &LnpParameters {
        &self.parameters
    }

    fn parameters_mut(&mut self) -> &mut LnpParameters {
        &mut self.parameters
    }

    fn stimulations(&self) -> &[Stimulation] {
        &self.stimulations
    }

    fn stimulations_mut(&mut self) -> &mut Vec<Stimulation> {
        &mut self.stimulations
    }

    fn tuned(&self) -> &BTreeSet<String> {
        &self.tuned
    }

    fn tuned_mut(&mut self) -> &mut BTreeSet<String> {
        &mut self.tuned
    }

    fn time_scale(&self) -> usize {
        self.parameters.time_scale()
    }

    fn connectivity_filter(
        &self,
        w0: &[f32],
        edge_index: &[(usize, usize)],
    ) -> Result<DMatrix<f32>, SNNError> {
        self.parameters.kernel()?.filter(w0, edge_index)
    }

    fn probability_of_spike(&self, activation: &DVector<f32>) -> DVector<f32> {
        let LnpParameters { threshold, dt, .. } = self.parameters;
        activation.map(|a| -(-(a - threshold).exp() * dt).exp_m1())
    }
}
