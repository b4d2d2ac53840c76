//! Clustered connectivity: dense blocks on the diagonal, sparse links between them.
use nalgebra::DMatrix;
use rand::distributions::Uniform;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use super::generator::{sample_dense_weights, sparsify};
use super::graph::GraphSample;
use super::params::{ConnectivityParams, DistributionParams};
use crate::error::SNNError;

/// Parameters of a clustered connectivity graph.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct ClusteredParams {
    /// The number of clusters.
    pub num_clusters: usize,
    /// The number of neurons in each cluster (must be even).
    pub cluster_size: usize,
    /// The number of connections between neurons of different clusters.
    pub num_cluster_connections: usize,
    /// The connectivity inside each cluster.
    pub connectivity: ConnectivityParams,
}

impl ClusteredParams {
    pub fn new(
        num_clusters: usize,
        cluster_size: usize,
        num_cluster_connections: usize,
        connectivity: ConnectivityParams,
    ) -> Self {
        ClusteredParams {
            num_clusters,
            cluster_size,
            num_cluster_connections,
            connectivity,
        }
    }

    /// The total number of neurons.
    pub fn num_nodes(&self) -> usize {
        self.num_clusters * self.cluster_size
    }

    pub fn validate(&self) -> Result<(), SNNError> {
        if self.num_clusters == 0 {
            return Err(SNNError::InvalidParameter(
                "There must be at least one cluster".to_string(),
            ));
        }
        if self.cluster_size == 0 || self.cluster_size % 2 != 0 {
            return Err(SNNError::InvalidParameter(format!(
                "The cluster size must be a positive even number, got {}",
                self.cluster_size
            )));
        }
        let max_connections =
            self.num_nodes() * (self.num_nodes() - self.cluster_size);
        if self.num_cluster_connections > max_connections {
            return Err(SNNError::InvalidParameter(format!(
                "At most {} connections between clusters are possible, got {}",
                max_connections, self.num_cluster_connections
            )));
        }
        if self.num_cluster_connections > 0
            && matches!(self.connectivity.distribution, DistributionParams::MexicanHat(_))
        {
            return Err(SNNError::InvalidParameter(
                "Connections between clusters need a distribution with a Dale split, not a mexican hat"
                    .to_string(),
            ));
        }
        if self.num_cluster_connections > 0
            && !(self.connectivity.distribution.scale(self.cluster_size) > 0.0)
        {
            return Err(SNNError::InvalidParameter(
                "Connections between clusters need a positive weight scale".to_string(),
            ));
        }
        self.connectivity.validate()
    }

    /// Sample a clustered graph.
    /// The sign of an inter-cluster connection follows its source neuron: the first half of every cluster is excitatory.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<GraphSample, SNNError> {
        self.validate()?;

        let num_nodes = self.num_nodes();
        let mut weights = DMatrix::zeros(num_nodes, num_nodes);

        for cluster in 0..self.num_clusters {
            let block =
                sample_dense_weights(self.cluster_size, &self.connectivity.distribution, rng)?;
            let offset = cluster * self.cluster_size;
            weights
                .view_mut((offset, offset), (self.cluster_size, self.cluster_size))
                .copy_from(&block);
        }

        let magnitude_dist = Normal::new(0.0, self.connectivity.distribution.scale(self.cluster_size))
            .map_err(|e| {
                SNNError::InvalidParameter(format!("Invalid weight distribution: {}", e))
            })?;
        let source_dist = Uniform::new(0, num_nodes);
        let local_dist = Uniform::new(0, self.cluster_size);

        let mut num_placed = 0;
        while num_placed < self.num_cluster_connections {
            let source = source_dist.sample(rng);
            let source_cluster = source / self.cluster_size;
            let target_cluster =
                (source_cluster + rng.gen_range(1..self.num_clusters)) % self.num_clusters;
            let target = target_cluster * self.cluster_size + local_dist.sample(rng);

            let magnitude: f32 = magnitude_dist.sample(rng);
            let magnitude = magnitude.abs();
            if weights[(source, target)] != 0.0 || magnitude == 0.0 {
                continue;
            }

            weights[(source, target)] = if source % self.cluster_size < self.cluster_size / 2 {
                magnitude
            } else {
                -magnitude
            };
            num_placed += 1;
        }

        let mut sample = GraphSample::from_dense(&weights)?;
        sparsify(&mut sample, self.connectivity.sparsity, rng)?;
        log::debug!(
            "Sampled a clustered graph with {} nodes and {} edges",
            num_nodes,
            sample.num_edges()
        );
        Ok(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::params::DistributionParams;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn params(num_clusters: usize, cluster_size: usize, num_connections: usize) -> ClusteredParams {
        ClusteredParams::new(
            num_clusters,
            cluster_size,
            num_connections,
            ConnectivityParams::new(DistributionParams::glorot(0.0, 5.0)),
        )
    }

    #[test]
    fn test_validate() {
        assert!(params(0, 10, 0).validate().is_err());
        assert!(params(2, 9, 0).validate().is_err());
        assert!(params(1, 10, 1).validate().is_err());
        assert!(params(2, 10, 200).validate().is_ok());
        assert!(params(2, 10, 201).validate().is_err());

        let mexican_hat = |num_connections| {
            ClusteredParams::new(
                2,
                10,
                num_connections,
                ConnectivityParams::new(DistributionParams::mexican_hat(Default::default())),
            )
        };
        assert!(mexican_hat(0).validate().is_ok());
        assert!(matches!(
            mexican_hat(3).validate(),
            Err(SNNError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_cluster_connections() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let sample = params(3, 10, 7).sample(&mut rng).unwrap();
        assert_eq!(sample.num_nodes(), 30);
        assert!(sample.has_self_loops());

        let num_inter = sample
            .edge_index()
            .iter()
            .filter(|(source, target)| source / 10 != target / 10)
            .count();
        assert_eq!(num_inter, 7);

        for (&(source, target), &weight) in sample.edge_index().iter().zip(sample.w0()) {
            if source / 10 != target / 10 {
                assert_eq!(weight > 0.0, source % 10 < 5);
            }
        }
    }
}
