//! Spiking activity recorded during the simulation of one connectivity graph.
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::dataset::GraphSample;
use crate::error::SNNError;

/// The spikes of every neuron of a graph, together with the graph and the seed they were drawn from.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Trajectory {
    pub sample_id: usize,
    pub seed: u64,
    pub num_nodes: usize,
    pub num_steps: usize,
    pub w0: Vec<f32>,
    pub edge_index: Vec<(usize, usize)>,
    /// The (neuron, step) pairs at which a spike occurred, sorted by step.
    pub spikes: Vec<(usize, usize)>,
}

impl Trajectory {
    /// Start an empty recording for the given sample.
    pub fn new(sample_id: usize, seed: u64, sample: &GraphSample) -> Self {
        Trajectory {
            sample_id,
            seed,
            num_nodes: sample.num_nodes(),
            num_steps: 0,
            w0: sample.w0().to_vec(),
            edge_index: sample.edge_index().to_vec(),
            spikes: vec![],
        }
    }

    /// Append the activity of the next step.
    pub fn record(&mut self, activity: &DVector<f32>) -> Result<(), SNNError> {
        if activity.len() != self.num_nodes {
            return Err(SNNError::IncompatibleShapes(format!(
                "Got activity for {} neurons in a trajectory of {} neurons",
                activity.len(),
                self.num_nodes
            )));
        }
        let step = self.num_steps;
        self.spikes.extend(
            activity
                .iter()
                .enumerate()
                .filter(|(_, &spike)| spike > 0.0)
                .map(|(neuron, _)| (neuron, step)),
        );
        self.num_steps += 1;
        Ok(())
    }

    pub fn num_spikes(&self) -> usize {
        self.spikes.len()
    }

    /// The (num_nodes, num_steps) spike raster.
    pub fn to_dense(&self) -> DMatrix<f32> {
        let mut raster = DMatrix::zeros(self.num_nodes, self.num_steps);
        for &(neuron, step) in self.spikes.iter() {
            if let Some(entry) = raster.get_mut((neuron, step)) {
                *entry = 1.0;
            }
        }
        raster
    }

    /// The mean number of spikes per neuron and per step.
    pub fn firing_rate(&self) -> f32 {
        if self.num_nodes == 0 || self.num_steps == 0 {
            return 0.0;
        }
        self.spikes.len() as f32 / (self.num_nodes * self.num_steps) as f32
    }

    /// Save the trajectory to a file.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), SNNError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    /// Load a trajectory from a file.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, SNNError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let trajectory: Trajectory = serde_json::from_reader(reader)?;
        if let Some(&(neuron, step)) = trajectory
            .spikes
            .iter()
            .find(|&&(neuron, step)| neuron >= trajectory.num_nodes || step >= trajectory.num_steps)
        {
            return Err(SNNError::OutOfBounds(format!(
                "Spike of neuron {} at step {} in a trajectory of {} neurons over {} steps",
                neuron, step, trajectory.num_nodes, trajectory.num_steps
            )));
        }
        Ok(trajectory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::dmatrix;

    fn sample() -> GraphSample {
        GraphSample::from_dense(&dmatrix![0.0, 1.0, 0.0; 0.0, 0.0, -1.0; 0.0, 0.0, 0.0]).unwrap()
    }

    #[test]
    fn test_record() {
        let mut trajectory = Trajectory::new(3, 7, &sample());
        trajectory.record(&DVector::from_vec(vec![1.0, 0.0, 0.0])).unwrap();
        trajectory.record(&DVector::from_vec(vec![0.0, 1.0, 1.0])).unwrap();

        assert_eq!(trajectory.num_steps, 2);
        assert_eq!(trajectory.spikes, vec![(0, 0), (1, 1), (2, 1)]);
        assert_eq!(
            trajectory.to_dense(),
            dmatrix![1.0, 0.0; 0.0, 1.0; 0.0, 1.0]
        );
        assert_eq!(trajectory.firing_rate(), 0.5);
        assert!(trajectory.record(&DVector::zeros(2)).is_err());
    }

    #[test]
    fn test_empty_firing_rate() {
        assert_eq!(Trajectory::new(0, 0, &sample()).firing_rate(), 0.0);
    }

    #[test]
    fn test_save_load() {
        let mut trajectory = Trajectory::new(0, 0, &sample());
        trajectory.record(&DVector::from_vec(vec![1.0, 1.0, 0.0])).unwrap();

        let file = tempfile::NamedTempFile::new().unwrap();
        trajectory.save_to(file.path()).unwrap();
        assert_eq!(Trajectory::load_from(file.path()).unwrap(), trajectory);
        assert!(matches!(
            Trajectory::load_from("/no/such/trajectory.json"),
            Err(SNNError::FileNotFound(_))
        ));
    }
}
