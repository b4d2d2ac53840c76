//! Sampling of random connectivity graphs.
use nalgebra::DMatrix;
use rand::Rng;
use rand_distr::{Bernoulli, Distribution, Normal};

use super::graph::GraphSample;
use super::params::{ConnectivityParams, DistributionParams, MexicanHatParams};
use crate::error::SNNError;
use crate::utils::mod_dist;

/// Sample a dense (num_nodes, num_nodes) weight matrix with a zero diagonal.
/// Entry (source, target) is the weight of the connection from source to target.
pub fn sample_dense_weights<R: Rng + ?Sized>(
    num_nodes: usize,
    distribution: &DistributionParams,
    rng: &mut R,
) -> Result<DMatrix<f32>, SNNError> {
    if num_nodes == 0 || num_nodes % 2 != 0 {
        return Err(SNNError::InvalidParameter(format!(
            "The number of neurons must be a positive even number, got {}",
            num_nodes
        )));
    }
    distribution.validate()?;

    let mut weights = match distribution {
        DistributionParams::Glorot { mean, .. } | DistributionParams::Normal { mean, .. } => {
            sample_excitatory_inhibitory(num_nodes, *mean, distribution.scale(num_nodes), rng)?
        }
        DistributionParams::MexicanHat(params) => sample_mexican_hat(num_nodes, params, rng)?,
    };
    weights.fill_diagonal(0.0);

    Ok(weights)
}

/// Sample a graph from the connectivity parameters.
/// The base weights are drawn first and sparsification consumes the same generator afterwards,
/// so that a sparsified graph is a subgraph of the dense graph sampled with the same seed.
pub fn sample_graph<R: Rng + ?Sized>(
    num_nodes: usize,
    params: &ConnectivityParams,
    rng: &mut R,
) -> Result<GraphSample, SNNError> {
    params.validate()?;
    let weights = sample_dense_weights(num_nodes, &params.distribution, rng)?;
    let mut sample = GraphSample::from_dense(&weights)?;
    sparsify(&mut sample, params.sparsity, rng)?;
    Ok(sample)
}

/// Drop each off-diagonal edge independently with the given probability. Self-loops are always kept.
pub fn sparsify<R: Rng + ?Sized>(
    sample: &mut GraphSample,
    sparsity: f32,
    rng: &mut R,
) -> Result<(), SNNError> {
    if sparsity <= 0.0 {
        return Ok(());
    }
    let drop_dist = Bernoulli::new(sparsity as f64).map_err(|e| {
        SNNError::InvalidParameter(format!("Invalid sparsity distribution: {}", e))
    })?;
    sample.retain_edges(|(source, target), _| source == target || !drop_dist.sample(rng));
    Ok(())
}

/// Draw an (n/2, n) block of normal weights and split it in an excitatory and an inhibitory half:
/// the positive part of row i goes to source neuron i, its negative part to source neuron i + n/2.
fn sample_excitatory_inhibitory<R: Rng + ?Sized>(
    num_nodes: usize,
    mean: f32,
    std: f32,
    rng: &mut R,
) -> Result<DMatrix<f32>, SNNError> {
    let weight_dist = Normal::new(mean, std).map_err(|e| {
        SNNError::InvalidParameter(format!("Invalid weight distribution: {}", e))
    })?;

    let half = num_nodes / 2;
    let mut weights = DMatrix::zeros(num_nodes, num_nodes);
    for source in 0..half {
        for target in 0..num_nodes {
            let weight: f32 = weight_dist.sample(rng);
            if weight > 0.0 {
                weights[(source, target)] = weight;
            } else {
                weights[(source + half, target)] = weight;
            }
        }
    }

    Ok(weights)
}

fn sample_mexican_hat<R: Rng + ?Sized>(
    num_nodes: usize,
    params: &MexicanHatParams,
    rng: &mut R,
) -> Result<DMatrix<f32>, SNNError> {
    let noise_dist = Normal::new(0.0, params.noise_std).map_err(|e| {
        SNNError::InvalidParameter(format!("Invalid noise distribution: {}", e))
    })?;

    let mut weights = DMatrix::from_fn(num_nodes, num_nodes, |source, target| {
        params.eval(mod_dist(source as f64, target as f64, num_nodes as f64) as f32)
    });

    if params.noise_std > 0.0 {
        weights
            .iter_mut()
            .for_each(|weight| *weight += noise_dist.sample(rng));
    }

    Ok(weights)
}
