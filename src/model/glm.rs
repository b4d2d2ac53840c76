//! Generalized linear model with a logistic link.
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::kernel::Refractory;
use super::parameters::{GlmParameters, ParameterSet};
use super::SpikingModel;
use crate::error::SNNError;
use crate::stimulation::Stimulation;
use crate::utils::{logit, sigmoid};

/// A neuron spikes with probability `sigmoid(a - threshold)`, where `a` is its filtered input.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct GlmModel {
    parameters: GlmParameters,
    stimulations: Vec<Stimulation>,
    tuned: BTreeSet<String>,
}

impl SpikingModel for GlmModel {
    type Parameters = GlmParameters;

    fn from_parts(
        parameters: GlmParameters,
        stimulations: Vec<Stimulation>,
    ) -> Result<Self, SNNError> {
        parameters.validate()?;
        Ok(GlmModel {
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
        let parameters = GlmParameters {
            threshold: -logit(firing_rate),
            ..Default::default()
        };
        Self::from_parts(parameters, vec![])
    }

    fn parameters(&self) -> &GlmParameters {
        &self.parameters
    }

    fn parameters_mut(&mut self) -> &mut GlmParameters {
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
        activation.map(|a| sigmoid(a - self.parameters.threshold))
    }
}
