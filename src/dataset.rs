//! Connectivity datasets: random weighted graphs and their container.
//!
//! A dataset is an ordered collection of [`GraphSample`], each holding the raw weights `W0` of
//! a random connectivity graph together with its edge index. Every sample is drawn from its own
//! seeded generator, hence regenerating a dataset with the same seed and parameters reproduces it
//! exactly.
//!
//! # Examples
//!
//! ```
//! use spiking_network::dataset::{ConnectivityDataset, ConnectivityParams, DistributionParams};
//!
//! let params = ConnectivityParams::new(DistributionParams::glorot(0.0, 5.0));
//! let dataset = ConnectivityDataset::generate(20, 10, &params, 0).unwrap();
//!
//! assert_eq!(dataset.len(), 10);
//! assert!(dataset.iter().all(|sample| sample.num_nodes() == 20));
//! assert!(dataset.iter().all(|sample| sample.has_self_loops()));
//! ```
pub mod clustered;
pub mod dataset;
pub mod generator;
pub mod graph;
pub mod params;

pub use clustered::ClusteredParams;
pub use dataset::ConnectivityDataset;
pub use graph::GraphSample;
pub use params::{ConnectivityParams, DistributionParams, MexicanHatParams};
