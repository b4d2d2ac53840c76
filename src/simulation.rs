//! Simulation of a spiking model over every graph of a connectivity dataset.
//!
//! Samples are independent: each one gets its own copy of the model, its own state and its own
//! random number generator, seeded with `seed + sample_id` on a stream of its own, apart from the
//! one graph generation draws from. They are simulated on a bounded pool of
//! workers, and the trajectories come back in sample order whatever the scheduling.
//!
//! # Examples
//!
//! ```
//! use spiking_network::dataset::{ConnectivityDataset, ConnectivityParams};
//! use spiking_network::model::{GlmModel, SpikingModel};
//! use spiking_network::simulation::{simulate, SimulationConfig};
//!
//! let dataset = ConnectivityDataset::generate(10, 4, &ConnectivityParams::default(), 0).unwrap();
//! let model = GlmModel::with_firing_rate(0.1).unwrap();
//! let config = SimulationConfig {
//!     num_steps: 100,
//!     max_parallel: 2,
//!     ..Default::default()
//! };
//!
//! let trajectories = simulate(&model, &dataset, &config).unwrap();
//! assert_eq!(trajectories.len(), 4);
//! assert!(trajectories.iter().all(|trajectory| trajectory.num_steps == 100));
//! ```
pub mod trajectory;

pub use trajectory::Trajectory;

use derivative::Derivative;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::dataset::{ClusteredParams, ConnectivityDataset, GraphSample};
use crate::error::SNNError;
use crate::model::{GlmModel, SpikingModel};

/// Settings of a simulation run.
#[derive(Derivative, Debug, PartialEq, Clone, Serialize, Deserialize)]
#[derivative(Default)]
pub struct SimulationConfig {
    /// Number of steps simulated for every sample.
    #[derivative(Default(value = "10000"))]
    pub num_steps: usize,
    /// Maximum number of samples simulated at once.
    #[derivative(Default(value = "100"))]
    pub max_parallel: usize,
    /// Sample `i` is simulated with a generator seeded by `seed + i`.
    pub seed: u64,
    /// Directory receiving one `<sample_id>.json` file per trajectory, if any.
    pub data_path: Option<PathBuf>,
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), SNNError> {
        if self.max_parallel == 0 {
            return Err(SNNError::InvalidParameter(
                "At least one worker is required to run a simulation".to_string(),
            ));
        }
        if self.num_steps == 0 {
            log::warn!("Simulating zero steps, every trajectory will be empty");
        }
        Ok(())
    }
}

/// Simulate the model on every sample of the dataset.
/// Returns an error if the configuration is invalid, or as soon as one of the samples fails.
pub fn simulate<M: SpikingModel>(
    model: &M,
    dataset: &ConnectivityDataset,
    config: &SimulationConfig,
) -> Result<Vec<Trajectory>, SNNError> {
    config.validate()?;
    if let Some(data_path) = &config.data_path {
        fs::create_dir_all(data_path)?;
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.max_parallel)
        .build()
        .map_err(|e| SNNError::SimulationFailed(format!("Failed to build the worker pool: {}", e)))?;

    log::info!(
        "Simulating {} samples over {} steps with at most {} workers...",
        dataset.len(),
        config.num_steps,
        config.max_parallel
    );

    let trajectories = pool.install(|| {
        dataset
            .samples()
            .par_iter()
            .enumerate()
            .map(|(sample_id, sample)| {
                let trajectory = run_sample(model.clone(), sample, sample_id, config)?;
                if let Some(data_path) = &config.data_path {
                    let path = data_path.join(format!("{}.json", sample_id));
                    trajectory.save_to(&path)?;
                    log::info!("Trajectory {} written to {}", sample_id, path.display());
                }
                Ok(trajectory)
            })
            .collect::<Result<Vec<Trajectory>, SNNError>>()
    })?;

    log::info!("Simulation completed successfully!");
    Ok(trajectories)
}

/// Simulate one sample from a silent network.
/// Stream of the spike draws. Graph generation uses the default stream 0, so a dataset and a
/// simulation sharing a seed draw independent numbers.
const SIMULATION_STREAM: u64 = 1;

/// The generator of the spike draws of a sample seeded by `seed`.
pub fn simulation_rng(seed: u64) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(SIMULATION_STREAM);
    rng
}

fn run_sample<M: SpikingModel>(
    model: M,
    sample: &GraphSample,
    sample_id: usize,
    config: &SimulationConfig,
) -> Result<Trajectory, SNNError> {
    let seed = config.seed.wrapping_add(sample_id as u64);
    let mut rng = simulation_rng(seed);
    let edge_index = sample.edge_index();
    let filter = model.connectivity_filter(sample.w0(), edge_index)?;

    let mut state = model.initialize_state(sample.num_nodes())?;
    let mut trajectory = Trajectory::new(sample_id, seed, sample);
    for step in 0..config.num_steps {
        state = model.step(state, edge_index, &filter, step, &mut rng)?;
        trajectory.record(&state.latest())?;
    }

    log::debug!(
        "Sample {}: {} spikes over {} steps (firing rate {:.4})",
        sample_id,
        trajectory.num_spikes(),
        trajectory.num_steps,
        trajectory.firing_rate()
    );
    Ok(trajectory)
}

/// Generate clustered graphs and simulate them with the default GLM.
pub fn make_dataset(
    params: &ClusteredParams,
    num_steps: usize,
    num_datasets: usize,
    config: &SimulationConfig,
) -> Result<Vec<Trajectory>, SNNError> {
    let num_datasets = i64::try_from(num_datasets).map_err(|_| {
        SNNError::InvalidParameter(format!("Too many datasets requested: {}", num_datasets))
    })?;
    let dataset = ConnectivityDataset::generate_clustered(params, num_datasets, config.seed)?;
    let config = SimulationConfig {
        num_steps,
        ..config.clone()
    };
    simulate(&GlmModel::default(), &dataset, &config)
}
