//! Linear rate model of Herman et al., looking one step back.
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::parameters::{HermanParameters, ParameterSet};
use super::SpikingModel;
use crate::error::SNNError;
use crate::stimulation::Stimulation;

/// A neuron spikes with probability `baseline_rate + a`, clamped to [0, 1], where `a` is the
/// gain-scaled input from the neurons which spiked at the previous step.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct HermanModel {
    parameters: HermanParameters,
    stimulations: Vec<Stimulation>,
    tuned: BTreeSet<String>,
}

impl SpikingModel for HermanModel {
    type Parameters = HermanParameters;

    fn from_parts(
        parameters: HermanParameters,
        stimulations: Vec<Stimulation>,
    ) -> Result<Self, SNNError> {
        parameters.validate()?;
        Ok(HermanModel {
            parameters,
            stimulations,
            tuned: BTreeSet::new(),
        })
    }

    fn with_firing_rate(firing_rate: f32) -> Result<Self, SNNError> {
        let parameters = HermanParameters {
            baseline_rate: firing_rate,
            ..Default::default()
        };
        Self::from_parts(parameters, vec![])
    }

    fn parameters(&self) -> &HermanParameters {
        &self.parameters
    }

    fn parameters_mut(&mut self) -> &mut HermanParameters {
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
        1
    }

    fn connectivity_filter(
        &self,
        w0: &[f32],
        edge_index: &[(usize, usize)],
    ) -> Result<DMatrix<f32>, SNNError> {
        if w0.len() != edge_index.len() {
            return Err(SNNError::IncompatibleShapes(format!(
                "Got {} weights for {} edges",
                w0.len(),
                edge_index.len()
            )));
        }
        let gain = self.parameters.gain;
        Ok(DMatrix::from_iterator(
            edge_index.len(),
            1,
            edge_index
                .iter()
                .zip(w0.iter())
                .map(|(&(source, target), &weight)| {
                    if source == target {
                        0.0
                    } else {
                        gain * weight
                    }
                }),
        ))
    }

    fn probability_of_spike(&self, activation: &DVector<f32>) -> DVector<f32> {
        let baseline_rate = self.parameters.baseline_rate;
        activation.map(|a| (baseline_rate + a).clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_connectivity_filter() {
        let model = HermanModel::build([("gain", 0.5)], vec![]).unwrap();
        let filter = model
            .connectivity_filter(&[2.0, -1.0, 0.0], &[(0, 1), (1, 0), (0, 0)])
            .unwrap();
        assert_eq!(filter, DMatrix::from_column_slice(3, 1, &[1.0, -0.5, 0.0]));
    }

    #[test]
    fn test_probability_is_clamped() {
        let model = HermanModel::default();
        let p = model.probability_of_spike(&DVector::from_vec(vec![0.2, -1.0, 5.0]));
        assert_relative_eq!(p[0], 0.3);
        assert_eq!(p[1], 0.0);
        assert_eq!(p[2], 1.0);
    }

    #[test]
    fn test_excitation_propagates() {
        // 0 -> 1 with weight 1: neuron 1 fires right after neuron 0
        let model = HermanModel::with_firing_rate(0.0).unwrap();
        let edge_index = [(0, 1), (0, 0), (1, 1)];
        let filter = model.connectivity_filter(&[1.0, 0.0, 0.0], &edge_index).unwrap();

        let mut state = model.initialize_state(2).unwrap();
        state.push(&DVector::from_vec(vec![1.0, 0.0])).unwrap();

        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let state = model.step(state, &edge_index, &filter, 0, &mut rng).unwrap();
        assert_eq!(state.latest(), DVector::from_vec(vec![0.0, 1.0]));
    }

    #[test]
    fn test_invalid_baseline_rate() {
        assert!(matches!(
            HermanModel::with_firing_rate(1.5),
            Err(SNNError::InvalidParameter(_))
        ));
    }
}
