//! Module implementing the dataset of connectivity graphs.
use nalgebra::DMatrix;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::ops::Index;
use std::path::Path;

use super::clustered::ClusteredParams;
use super::generator::sample_graph;
use super::graph::GraphSample;
use super::params::ConnectivityParams;
use crate::error::SNNError;

/// An ordered collection of connectivity graphs, all generated from the same seed.
/// Sample `i` is drawn with a generator seeded by `seed + i`.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ConnectivityDataset {
    seed: u64,
    samples: Vec<GraphSample>,
}

impl ConnectivityDataset {
    /// Wrap existing samples into a dataset.
    pub fn new(samples: Vec<GraphSample>, seed: u64) -> Self {
        ConnectivityDataset { seed, samples }
    }

    /// Generate `num_sims` random graphs of `num_nodes` neurons each.
    /// Returns an error if the number of neurons is odd or the number of simulations is negative.
    ///
    /// # Examples
    ///
    /// ```
    /// use spiking_network::dataset::{ConnectivityDataset, ConnectivityParams, DistributionParams};
    ///
    /// let params = ConnectivityParams::new(DistributionParams::glorot(0.0, 5.0));
    /// assert!(ConnectivityDataset::generate(21, 10, &params, 0).is_err());
    /// assert!(ConnectivityDataset::generate(20, -1, &params, 0).is_err());
    /// ```
    pub fn generate(
        num_nodes: usize,
        num_sims: i64,
        params: &ConnectivityParams,
        seed: u64,
    ) -> Result<Self, SNNError> {
        if num_nodes == 0 || num_nodes % 2 != 0 {
            return Err(SNNError::InvalidParameter(format!(
                "The number of neurons must be a positive even number, got {}",
                num_nodes
            )));
        }
        let num_sims = Self::check_num_sims(num_sims)?;
        params.validate()?;

        let samples = (0..num_sims)
            .into_par_iter()
            .map(|i| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(i as u64));
                sample_graph(num_nodes, params, &mut rng)
            })
            .collect::<Result<Vec<GraphSample>, SNNError>>()?;

        log::info!(
            "Generated {} connectivity graphs with {} neurons (seed {})",
            samples.len(),
            num_nodes,
            seed
        );
        Ok(ConnectivityDataset { seed, samples })
    }

    /// Generate `num_sims` random clustered graphs.
    pub fn generate_clustered(
        params: &ClusteredParams,
        num_sims: i64,
        seed: u64,
    ) -> Result<Self, SNNError> {
        let num_sims = Self::check_num_sims(num_sims)?;
        params.validate()?;

        let samples = (0..num_sims)
            .into_par_iter()
            .map(|i| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(i as u64));
                params.sample(&mut rng)
            })
            .collect::<Result<Vec<GraphSample>, SNNError>>()?;

        log::info!(
            "Generated {} clustered graphs with {} clusters of {} neurons (seed {})",
            samples.len(),
            params.num_clusters,
            params.cluster_size,
            seed
        );
        Ok(ConnectivityDataset { seed, samples })
    }

    fn check_num_sims(num_sims: i64) -> Result<usize, SNNError> {
        usize::try_from(num_sims).map_err(|_| {
            SNNError::InvalidParameter(format!(
                "The number of simulations must be non-negative, got {}",
                num_sims
            ))
        })
    }

    /// Returns the seed the dataset was generated with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns the number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns the sample at the given position, if any.
    pub fn get(&self, index: usize) -> Option<&GraphSample> {
        self.samples.get(index)
    }

    pub fn samples(&self) -> &[GraphSample] {
        &self.samples[..]
    }

    pub fn iter(&self) -> impl Iterator<Item = &GraphSample> + '_ {
        self.samples.iter()
    }

    /// Dense weight matrices of all samples.
    pub fn to_dense(&self) -> Vec<DMatrix<f32>> {
        self.samples.iter().map(|sample| sample.to_dense()).collect()
    }

    /// Save the dataset to a file.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), SNNError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    /// Load a dataset from a file.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, SNNError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let dataset: ConnectivityDataset = serde_json::from_reader(reader)?;
        // re-run the bounds checks on what was read
        let samples = dataset
            .samples
            .into_iter()
            .map(|sample| {
                let num_nodes = sample.num_nodes();
                GraphSample::from_coo(sample.edge_index().to_vec(), sample.w0().to_vec(), num_nodes)
            })
            .collect::<Result<Vec<GraphSample>, SNNError>>()?;
        Ok(ConnectivityDataset::new(samples, dataset.seed))
    }
}

impl Index<usize> for ConnectivityDataset {
    type Output = GraphSample;

    fn index(&self, index: usize) -> &Self::Output {
        &self.samples[index]
    }
}

impl<'a> IntoIterator for &'a ConnectivityDataset {
    type Item = &'a GraphSample;
    type IntoIter = std::slice::Iter<'a, GraphSample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::params::DistributionParams;

    #[test]
    fn test_generate_is_deterministic() {
        let params = ConnectivityParams::new(DistributionParams::glorot(0.0, 5.0));
        let first = ConnectivityDataset::generate(20, 4, &params, 7).unwrap();
        let second = ConnectivityDataset::generate(20, 4, &params, 7).unwrap();
        assert_eq!(first, second);

        let other = ConnectivityDataset::generate(20, 4, &params, 8).unwrap();
        assert_ne!(first, other);
    }

    #[test]
    fn test_seed_offsets() {
        // sample i of seed s is sample 0 of seed s + i
        let params = ConnectivityParams::new(DistributionParams::normal(0.0, 1.0));
        let dataset = ConnectivityDataset::generate(10, 3, &params, 100).unwrap();
        let shifted = ConnectivityDataset::generate(10, 1, &params, 102).unwrap();
        assert_eq!(dataset[2], shifted[0]);
    }

    #[test]
    fn test_empty_dataset() {
        let params = ConnectivityParams::default();
        let dataset = ConnectivityDataset::generate(10, 0, &params, 0).unwrap();
        assert!(dataset.is_empty());
        assert!(dataset.get(0).is_none());
    }
}
