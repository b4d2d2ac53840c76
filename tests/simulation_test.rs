use spiking_network::dataset::{ConnectivityDataset, ConnectivityParams};
use spiking_network::model::{GlmModel, HermanModel, LnpModel, SpikingModel};
use spiking_network::simulation::{simulate, SimulationConfig, Trajectory};
use spiking_network::stimulation::SinStimulation;

fn config(max_parallel: usize) -> SimulationConfig {
    SimulationConfig {
        num_steps: 200,
        max_parallel,
        seed: 3,
        data_path: None,
    }
}

#[test]
fn test_trajectories_in_sample_order() {
    let dataset = ConnectivityDataset::generate(10, 8, &ConnectivityParams::default(), 0).unwrap();
    let trajectories = simulate(&GlmModel::default(), &dataset, &config(4)).unwrap();

    assert_eq!(trajectories.len(), 8);
    for (sample_id, trajectory) in trajectories.iter().enumerate() {
        assert_eq!(trajectory.sample_id, sample_id);
        assert_eq!(trajectory.edge_index, dataset[sample_id].edge_index());
        assert_eq!(trajectory.to_dense().shape(), (10, 200));
    }
}

#[test]
fn test_reproducible_and_independent_of_parallelism() {
    let dataset = ConnectivityDataset::generate(10, 6, &ConnectivityParams::default(), 1).unwrap();
    let model = LnpModel::with_firing_rate(0.2).unwrap();

    let sequential = simulate(&model, &dataset, &config(1)).unwrap();
    let parallel = simulate(&model, &dataset, &config(6)).unwrap();
    let again = simulate(&model, &dataset, &config(3)).unwrap();

    assert_eq!(sequential, parallel);
    assert_eq!(parallel, again);
    assert!(sequential.iter().any(|trajectory| trajectory.num_spikes() > 0));
}

#[test]
fn test_seed_changes_trajectories() {
    let dataset = ConnectivityDataset::generate(10, 1, &ConnectivityParams::default(), 1).unwrap();
    let model = HermanModel::with_firing_rate(0.3).unwrap();

    let first = simulate(&model, &dataset, &config(1)).unwrap();
    let second = simulate(
        &model,
        &dataset,
        &SimulationConfig {
            seed: 4,
            ..config(1)
        },
    )
    .unwrap();
    assert_ne!(first[0].spikes, second[0].spikes);
}

#[test]
fn test_trajectories_written_per_sample() {
    let dir = tempfile::tempdir().unwrap();
    let data_path = dir.path().join("simulation_data");
    let dataset = ConnectivityDataset::generate(6, 3, &ConnectivityParams::default(), 2).unwrap();

    let mut model = GlmModel::with_firing_rate(0.1).unwrap();
    model.add_stimulation(SinStimulation::build(vec![0, 1], 2.0, 0.02, 0.0, 200).unwrap());

    let config = SimulationConfig {
        data_path: Some(data_path.clone()),
        ..config(2)
    };
    let trajectories = simulate(&model, &dataset, &config).unwrap();

    for trajectory in trajectories.iter() {
        let path = data_path.join(format!("{}.json", trajectory.sample_id));
        assert_eq!(&Trajectory::load_from(&path).unwrap(), trajectory);
    }
}

#[test]
fn test_empty_dataset() {
    let dataset = ConnectivityDataset::generate(10, 0, &ConnectivityParams::default(), 0).unwrap();
    assert!(simulate(&GlmModel::default(), &dataset, &config(2))
        .unwrap()
        .is_empty());
}
