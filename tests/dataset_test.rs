use spiking_network::dataset::{
    ClusteredParams, ConnectivityDataset, ConnectivityParams, DistributionParams, GraphSample,
    MexicanHatParams,
};
use spiking_network::error::SNNError;

fn nonzero_weights(dataset: &ConnectivityDataset) -> Vec<f32> {
    dataset
        .iter()
        .flat_map(|sample| sample.w0().iter().copied())
        .filter(|&weight| weight != 0.0)
        .collect()
}

#[test]
fn test_normal_weight_statistics() {
    let params = ConnectivityParams::new(DistributionParams::normal(0.0, 1.0));
    let dataset = ConnectivityDataset::generate(200, 4, &params, 0).unwrap();

    let weights = nonzero_weights(&dataset);
    let n = weights.len() as f32;
    let mean = weights.iter().sum::<f32>() / n;
    let std = (weights.iter().map(|w| (w - mean).powi(2)).sum::<f32>() / n).sqrt();

    assert!(mean.abs() < 0.05, "mean is {}", mean);
    assert!((std - 1.0).abs() < 0.05, "std is {}", std);
}

#[test]
fn test_glorot_weight_statistics() {
    let params = ConnectivityParams::new(DistributionParams::glorot(0.0, 5.0));
    let dataset = ConnectivityDataset::generate(100, 4, &params, 1).unwrap();

    let weights = nonzero_weights(&dataset);
    let n = weights.len() as f32;
    let mean = weights.iter().sum::<f32>() / n;
    let std = (weights.iter().map(|w| (w - mean).powi(2)).sum::<f32>() / n).sqrt();

    // 5 / sqrt(100)
    assert!((std - 0.5).abs() < 0.025, "std is {}", std);
}

#[test]
fn test_regenerate_matches_saved_dataset() {
    let params = ConnectivityParams::new(DistributionParams::glorot(0.0, 5.0)).with_sparsity(0.3);
    let dataset = ConnectivityDataset::generate(20, 5, &params, 7).unwrap();

    let file = tempfile::NamedTempFile::new().unwrap();
    dataset.save_to(file.path()).unwrap();
    let loaded = ConnectivityDataset::load_from(file.path()).unwrap();
    let regenerated = ConnectivityDataset::generate(20, 5, &params, 7).unwrap();

    assert_eq!(loaded, dataset);
    for (saved, fresh) in loaded.iter().zip(regenerated.iter()) {
        assert_eq!(saved.w0(), fresh.w0());
        assert_eq!(saved.edge_index(), fresh.edge_index());
    }
}

#[test]
fn test_load_missing_dataset() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        ConnectivityDataset::load_from(dir.path().join("missing.json")),
        Err(SNNError::FileNotFound(_))
    ));
}

#[test]
fn test_to_dense_matches_coo() {
    let dataset = ConnectivityDataset::generate(10, 3, &ConnectivityParams::default(), 0).unwrap();
    let dense = dataset.to_dense();
    assert_eq!(dense.len(), 3);

    for (matrix, sample) in dense.iter().zip(dataset.iter()) {
        assert_eq!(matrix.shape(), (10, 10));
        let mut expected = nalgebra::DMatrix::zeros(10, 10);
        for (&(source, target), &weight) in sample.edge_index().iter().zip(sample.w0()) {
            expected[(source, target)] += weight;
        }
        assert_eq!(matrix, &expected);
        assert_eq!(&GraphSample::from_dense(matrix).unwrap().to_dense(), matrix);
    }
}

#[test]
fn test_samples_have_self_loops() {
    let dataset = ConnectivityDataset::generate(12, 4, &ConnectivityParams::default(), 3).unwrap();
    for sample in dataset.iter() {
        assert_eq!(sample.num_nodes(), 12);
        assert!(sample.has_self_loops());
        for (&(source, target), &weight) in sample.edge_index().iter().zip(sample.w0()) {
            assert!(source < 12 && target < 12);
            if source == target {
                assert_eq!(weight, 0.0);
            }
        }
    }
}

#[test]
fn test_sparse_dataset_has_fewer_weights() {
    let distribution = DistributionParams::glorot(0.0, 5.0);
    let dense = ConnectivityDataset::generate(20, 3, &ConnectivityParams::new(distribution), 11)
        .unwrap();
    let sparse = ConnectivityDataset::generate(
        20,
        3,
        &ConnectivityParams::new(distribution).with_sparsity(0.5),
        11,
    )
    .unwrap();

    for (dense, sparse) in dense.iter().zip(sparse.iter()) {
        assert!(sparse.num_edges() < dense.num_edges());
        // every remaining edge has the weight it had in the dense graph
        let dense_weights = dense.to_dense();
        for (&(source, target), &weight) in sparse.edge_index().iter().zip(sparse.w0()) {
            assert_eq!(dense_weights[(source, target)], weight);
        }
    }
}

#[test]
fn test_invalid_requests() {
    let params = ConnectivityParams::default();
    assert!(matches!(
        ConnectivityDataset::generate(11, 1, &params, 0),
        Err(SNNError::InvalidParameter(_))
    ));
    assert!(matches!(
        ConnectivityDataset::generate(10, -1, &params, 0),
        Err(SNNError::InvalidParameter(_))
    ));
    assert!(matches!(
        ConnectivityDataset::generate(10, 1, &ConnectivityParams::default().with_sparsity(1.0), 0),
        Err(SNNError::InvalidParameter(_))
    ));
    assert!(ConnectivityDataset::generate(10, 0, &params, 0).unwrap().is_empty());
}

#[test]
fn test_mexican_hat_dataset() {
    let params = ConnectivityParams::new(DistributionParams::mexican_hat(MexicanHatParams {
        noise_std: 0.05,
        ..Default::default()
    }));
    let dataset = ConnectivityDataset::generate(30, 2, &params, 0).unwrap();

    // noisy samples differ, but the kernel dominates close to the diagonal
    assert_ne!(dataset[0].w0(), dataset[1].w0());
    for dense in dataset.to_dense() {
        assert!((0..30).all(|node| dense[(node, (node + 1) % 30)] > 0.0));
    }
}

#[test]
fn test_clustered_dataset() {
    let params = ClusteredParams::new(3, 6, 4, ConnectivityParams::default());
    let dataset = ConnectivityDataset::generate_clustered(&params, 2, 0).unwrap();

    for sample in dataset.iter() {
        assert_eq!(sample.num_nodes(), 18);
        let between = sample
            .edge_index()
            .iter()
            .zip(sample.w0())
            .filter(|&(&(source, target), &weight)| source / 6 != target / 6 && weight != 0.0)
            .count();
        assert_eq!(between, 4);
    }
}
