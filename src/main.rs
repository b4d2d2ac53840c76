use clap::{Parser, Subcommand};
use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::PathBuf;

use spiking_network::dataset::{
    ClusteredParams, ConnectivityDataset, ConnectivityParams, DistributionParams,
};
use spiking_network::error::SNNError;
use spiking_network::model::{GlmModel, HermanModel, SpikingModel};
use spiking_network::simulation::{make_dataset, simulate, SimulationConfig, Trajectory};

#[derive(Parser, Debug)]
#[command(about = "Simulate spiking neural networks over random connectivity graphs")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Simulate a model over randomly generated connectivity graphs
    Simulate {
        /// The number of neurons in each network (must be even)
        #[arg(short = 'n', long, default_value = "20")]
        n_neurons: usize,
        /// The number of simulation steps
        #[arg(short = 't', long, default_value = "10000")]
        n_steps: usize,
        /// The number of networks to simulate
        #[arg(short = 's', long, default_value = "1", allow_negative_numbers = true)]
        n_sims: i64,
        /// The directory receiving the trajectories
        #[arg(long, default_value = "data/simulation_data")]
        data_path: PathBuf,
        /// The maximum number of networks simulated at once
        #[arg(short = 'p', long, default_value = "100")]
        max_parallel: usize,
        /// The spike probability per step of a neuron without input
        #[arg(short = 'f', long, default_value = "0.1")]
        firing_rate: f32,
        /// Use the Herman rate model instead of the GLM
        #[arg(long)]
        herman: bool,
        /// The seed used for connectivity sampling and simulation
        #[arg(long, default_value = "0")]
        seed: u64,
        /// The probability of dropping each connection
        #[arg(long, default_value = "0.0")]
        sparsity: f32,
    },
    /// Simulate the default GLM over clustered connectivity graphs
    MakeDataset {
        /// The number of clusters
        #[arg(short = 'n', long, default_value = "1")]
        n_clusters: usize,
        /// The number of neurons in each cluster (must be even)
        #[arg(short = 's', long, default_value = "20")]
        cluster_size: usize,
        /// The number of connections between clusters
        #[arg(short = 'c', long, default_value = "0")]
        n_cluster_connections: usize,
        /// The number of simulation steps
        #[arg(short = 't', long, default_value = "1000")]
        n_steps: usize,
        /// The number of networks to simulate
        #[arg(short = 'd', long, default_value = "1")]
        n_datasets: usize,
        /// The directory receiving the trajectories
        #[arg(long, default_value = "data/cluster_data")]
        data_path: PathBuf,
        /// The maximum number of networks simulated at once
        #[arg(short = 'p', long, default_value = "100")]
        max_parallel: usize,
        /// The seed used for connectivity sampling and simulation
        #[arg(long, default_value = "0")]
        seed: u64,
    },
}

fn init_logging() -> Result<(), SNNError> {
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{d} {l} - {m}{n}")))
        .build();

    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(LevelFilter::Info))
        .map_err(|e| SNNError::IOError(e.to_string()))?;

    log4rs::init_config(config).map_err(|e| SNNError::IOError(e.to_string()))?;
    Ok(())
}

fn summarize(trajectories: &[Trajectory]) {
    let num_spikes: usize = trajectories.iter().map(Trajectory::num_spikes).sum();
    let mean_rate = trajectories
        .iter()
        .map(Trajectory::firing_rate)
        .sum::<f32>()
        / trajectories.len().max(1) as f32;
    log::info!(
        "{} trajectories, {} spikes in total, mean firing rate {:.4}",
        trajectories.len(),
        num_spikes,
        mean_rate
    );
}

fn main() -> Result<(), SNNError> {
    let args = Args::parse();
    init_logging()?;

    log::info!("{:?}", args);

    match args.command {
        Command::Simulate {
            n_neurons,
            n_steps,
            n_sims,
            data_path,
            max_parallel,
            firing_rate,
            herman,
            seed,
            sparsity,
        } => {
            let params = ConnectivityParams::new(DistributionParams::glorot(0.0, 5.0))
                .with_sparsity(sparsity);
            let dataset = ConnectivityDataset::generate(n_neurons, n_sims, &params, seed)?;
            log::info!("Connectivity sampling: done!");

            std::fs::create_dir_all(&data_path)?;
            let dataset_path = data_path.join("dataset.json");
            dataset.save_to(&dataset_path)?;
            log::info!("Connectivity saving: done! Saved to {}", dataset_path.display());

            let config = SimulationConfig {
                num_steps: n_steps,
                max_parallel,
                seed,
                data_path: Some(data_path),
            };
            let trajectories = if herman {
                simulate(&HermanModel::with_firing_rate(firing_rate)?, &dataset, &config)?
            } else {
                simulate(&GlmModel::with_firing_rate(firing_rate)?, &dataset, &config)?
            };
            summarize(&trajectories);
        }
        Command::MakeDataset {
            n_clusters,
            cluster_size,
            n_cluster_connections,
            n_steps,
            n_datasets,
            data_path,
            max_parallel,
            seed,
        } => {
            let params = ClusteredParams::new(
                n_clusters,
                cluster_size,
                n_cluster_connections,
                ConnectivityParams::default(),
            );
            let config = SimulationConfig {
                num_steps: n_steps,
                max_parallel,
                seed,
                data_path: Some(data_path),
            };
            let trajectories = make_dataset(&params, n_steps, n_datasets, &config)?;
            summarize(&trajectories);
        }
    }

    log::info!("Done!");
    Ok(())
}
