//! Parameters of the connectivity distributions.
use derivative::Derivative;
use serde::{Deserialize, Serialize};

use crate::error::SNNError;

/// The distribution from which the connectivity weights are drawn.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub enum DistributionParams {
    /// Normal weights scaled by the square root of the number of neurons.
    /// The first half of the neurons are excitatory, the second half inhibitory.
    Glorot { mean: f32, std: f32 },
    /// Normal weights, split between excitatory and inhibitory neurons as for Glorot.
    Normal { mean: f32, std: f32 },
    /// Difference of Gaussians over the circular distance between neurons.
    MexicanHat(MexicanHatParams),
}

impl DistributionParams {
    pub fn glorot(mean: f32, std: f32) -> Self {
        DistributionParams::Glorot { mean, std }
    }

    pub fn normal(mean: f32, std: f32) -> Self {
        DistributionParams::Normal { mean, std }
    }

    pub fn mexican_hat(params: MexicanHatParams) -> Self {
        DistributionParams::MexicanHat(params)
    }

    /// Returns the typical weight magnitude for a graph with the given number of neurons.
    pub fn scale(&self, num_nodes: usize) -> f32 {
        match self {
            DistributionParams::Glorot { std, .. } => std / (num_nodes as f32).sqrt(),
            DistributionParams::Normal { std, .. } => *std,
            DistributionParams::MexicanHat(params) => params.excitation,
        }
    }

    pub fn validate(&self) -> Result<(), SNNError> {
        match self {
            DistributionParams::Glorot { mean, std } | DistributionParams::Normal { mean, std } => {
                if !mean.is_finite() {
                    return Err(SNNError::InvalidParameter(
                        "The weight mean must be finite".to_string(),
                    ));
                }
                if !(std.is_finite() && *std >= 0.0) {
                    return Err(SNNError::InvalidParameter(
                        "The weight standard deviation must be non-negative".to_string(),
                    ));
                }
                Ok(())
            }
            DistributionParams::MexicanHat(params) => params.validate(),
        }
    }
}

impl Default for DistributionParams {
    fn default() -> Self {
        DistributionParams::glorot(0.0, 5.0)
    }
}

/// Mexican hat kernel: w(d) = excitation * exp(-d^2 / 2 sigma_e^2) - inhibition * exp(-d^2 / 2 sigma_i^2).
#[derive(Derivative, Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
#[derivative(Default)]
pub struct MexicanHatParams {
    /// Amplitude of the short-range excitatory Gaussian.
    #[derivative(Default(value = "1.0"))]
    pub excitation: f32,
    /// Amplitude of the medium-range inhibitory Gaussian.
    #[derivative(Default(value = "0.5"))]
    pub inhibition: f32,
    /// Width of the excitatory Gaussian, in neurons.
    #[derivative(Default(value = "2.0"))]
    pub sigma_excitation: f32,
    /// Width of the inhibitory Gaussian, in neurons.
    #[derivative(Default(value = "4.0"))]
    pub sigma_inhibition: f32,
    /// Standard deviation of the additive normal noise.
    #[derivative(Default(value = "0.0"))]
    pub noise_std: f32,
}

impl MexicanHatParams {
    /// Evaluate the kernel at the given distance.
    pub fn eval(&self, distance: f32) -> f32 {
        let d2 = distance * distance;
        self.excitation * (-d2 / (2.0 * self.sigma_excitation.powi(2))).exp()
            - self.inhibition * (-d2 / (2.0 * self.sigma_inhibition.powi(2))).exp()
    }

    pub fn validate(&self) -> Result<(), SNNError> {
        if !(self.sigma_excitation > 0.0 && self.sigma_inhibition > 0.0) {
            return Err(SNNError::InvalidParameter(
                "The mexican hat widths must be positive".to_string(),
            ));
        }
        if !(self.noise_std.is_finite() && self.noise_std >= 0.0) {
            return Err(SNNError::InvalidParameter(
                "The mexican hat noise must be non-negative".to_string(),
            ));
        }
        if !(self.excitation.is_finite() && self.inhibition.is_finite()) {
            return Err(SNNError::InvalidParameter(
                "The mexican hat amplitudes must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Full description of how a connectivity graph is sampled.
#[derive(Debug, PartialEq, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ConnectivityParams {
    /// The weight distribution.
    pub distribution: DistributionParams,
    /// Probability for each off-diagonal edge to be dropped after sampling.
    pub sparsity: f32,
}

impl ConnectivityParams {
    /// Dense connectivity from the given distribution.
    pub fn new(distribution: DistributionParams) -> Self {
        ConnectivityParams {
            distribution,
            sparsity: 0.0,
        }
    }

    /// Drop each off-diagonal edge with the given probability.
    pub fn with_sparsity(mut self, sparsity: f32) -> Self {
        self.sparsity = sparsity;
        self
    }

    pub fn validate(&self) -> Result<(), SNNError> {
        if !(0.0..1.0).contains(&self.sparsity) {
            return Err(SNNError::InvalidParameter(format!(
                "Sparsity must be in [0, 1), got {}",
                self.sparsity
            )));
        }
        self.distribution.validate()
    }
}
