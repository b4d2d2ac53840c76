//! This crate provides tools for simulating point-process spiking neural networks over random connectivity graphs.
//!
//! # Generating Connectivity Datasets
//!
//! ```rust
//! use spiking_network::dataset::{ConnectivityDataset, ConnectivityParams, DistributionParams};
//!
//! // 10 graphs of 20 neurons following Dale's principle, a tenth of the connections dropped
//! let params = ConnectivityParams::new(DistributionParams::glorot(0.0, 5.0)).with_sparsity(0.1);
//! let dataset = ConnectivityDataset::generate(20, 10, &params, 42).unwrap();
//!
//! assert_eq!(dataset.len(), 10);
//! assert!(dataset.iter().all(|sample| sample.num_nodes() == 20 && sample.has_self_loops()));
//! ```
//!
//! # Simulating Networks
//!
//! ```rust
//! use spiking_network::dataset::{ConnectivityDataset, ConnectivityParams};
//! use spiking_network::model::{LnpModel, SpikingModel};
//! use spiking_network::simulation::{simulate, SimulationConfig};
//! use spiking_network::stimulation::RegularStimulation;
//!
//! let dataset = ConnectivityDataset::generate(20, 2, &ConnectivityParams::default(), 0).unwrap();
//!
//! // Drive the first two neurons with a pulse every 50 steps
//! let mut model = LnpModel::with_firing_rate(0.05).unwrap();
//! model.add_stimulation(RegularStimulation::build(vec![0, 1], 5.0, 0.5, 50, 0, 500).unwrap());
//! model.tune(["threshold", "stimulation.strength"]).unwrap();
//!
//! let config = SimulationConfig { num_steps: 500, max_parallel: 2, ..Default::default() };
//! let trajectories = simulate(&model, &dataset, &config).unwrap();
//!
//! assert_eq!(trajectories.len(), 2);
//! assert_eq!(trajectories[0].to_dense().shape(), (20, 500));
//! ```

pub mod dataset;
pub mod error;
pub mod model;
pub mod simulation;
pub mod stimulation;
pub mod utils;
