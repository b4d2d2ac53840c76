//! Exponential synaptic filter with absolute and relative refractoriness on the self edges.
use nalgebra::DMatrix;

use super::parameters::steps;
use crate::error::SNNError;

/// Parameter sets describing a refractory kernel.
pub trait Refractory {
    /// Returns (beta, abs_ref_scale, abs_ref_strength, rel_ref_scale, rel_ref_strength).
    fn refractory(&self) -> (f32, f32, f32, f32, f32);

    fn kernel(&self) -> Result<RefractoryKernel, SNNError> {
        let (beta, abs_ref_scale, abs_ref_strength, rel_ref_scale, rel_ref_strength) =
            self.refractory();
        RefractoryKernel::build(
            beta,
            abs_ref_scale,
            abs_ref_strength,
            rel_ref_scale,
            rel_ref_strength,
        )
    }

    /// The number of past steps the kernel looks at, once the parameters are validated.
    fn time_scale(&self) -> usize {
        let (_, abs_ref_scale, _, rel_ref_scale, _) = self.refractory();
        (abs_ref_scale as usize).saturating_add(rel_ref_scale as usize)
    }
}

/// The kernel shared by the GLM and LNP models.
///
/// At lag k (k = 0 being the most recent step), an edge of weight w contributes `w * exp(-|beta| k)`,
/// while a self edge contributes `abs_ref_strength` for k < abs_ref_scale, then
/// `rel_ref_strength * exp(-|beta| (k - abs_ref_scale))` until abs_ref_scale + rel_ref_scale.
#[derive(Debug, PartialEq, Clone)]
pub struct RefractoryKernel {
    beta: f32,
    abs_ref_scale: usize,
    abs_ref_strength: f32,
    rel_ref_scale: usize,
    rel_ref_strength: f32,
}

impl RefractoryKernel {
    pub fn build(
        beta: f32,
        abs_ref_scale: f32,
        abs_ref_strength: f32,
        rel_ref_scale: f32,
        rel_ref_strength: f32,
    ) -> Result<Self, SNNError> {
        Ok(RefractoryKernel {
            beta,
            abs_ref_scale: steps("abs_ref_scale", abs_ref_scale)?,
            abs_ref_strength,
            rel_ref_scale: steps("rel_ref_scale", rel_ref_scale)?,
            rel_ref_strength,
        })
    }

    /// The number of past steps the kernel looks at.
    pub fn time_scale(&self) -> usize {
        self.abs_ref_scale + self.rel_ref_scale
    }

    /// Contribution of a spike emitted `lag` steps ago along a synapse of the given weight.
    pub fn synaptic(&self, weight: f32, lag: usize) -> f32 {
        weight * (-self.beta.abs() * lag as f32).exp()
    }

    /// Contribution of a neuron's own spike emitted `lag` steps ago.
    pub fn refractory(&self, lag: usize) -> f32 {
        if lag < self.abs_ref_scale {
            self.abs_ref_strength
        } else if lag < self.time_scale() {
            self.rel_ref_strength * (-self.beta.abs() * (lag - self.abs_ref_scale) as f32).exp()
        } else {
            0.0
        }
    }

    /// The (num_edges, time_scale) filter, oldest step first.
    pub fn filter(&self, w0: &[f32], edge_index: &[(usize, usize)]) -> Result<DMatrix<f32>, SNNError> {
        if w0.len() != edge_index.len() {
            return Err(SNNError::IncompatibleShapes(format!(
                "Got {} weights for {} edges",
                w0.len(),
                edge_index.len()
            )));
        }
        let time_scale = self.time_scale();
        Ok(DMatrix::from_fn(edge_index.len(), time_scale, |edge, col| {
            let lag = time_scale - 1 - col;
            let (source, target) = edge_index[edge];
            if source == target {
                self.refractory(lag)
            } else {
                self.synaptic(w0[edge], lag)
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_refractory_profile() {
        let kernel = RefractoryKernel::build(0.2, 3.0, -100.0, 7.0, -30.0).unwrap();
        assert_eq!(kernel.time_scale(), 10);
        assert_eq!(kernel.refractory(0), -100.0);
        assert_eq!(kernel.refractory(2), -100.0);
        assert_eq!(kernel.refractory(3), -30.0);
        assert_relative_eq!(kernel.refractory(5), -30.0 * (-0.4_f32).exp());
        assert_eq!(kernel.refractory(10), 0.0);
    }

    #[test]
    fn test_filter() {
        let kernel = RefractoryKernel::build(0.5, 1.0, -10.0, 2.0, -5.0).unwrap();
        let filter = kernel.filter(&[2.0, 0.0], &[(0, 1), (1, 1)]).unwrap();

        assert_eq!(filter.shape(), (2, 3));
        // most recent step in the last column
        assert_relative_eq!(filter[(0, 2)], 2.0);
        assert_relative_eq!(filter[(0, 1)], 2.0 * (-0.5_f32).exp());
        assert_relative_eq!(filter[(0, 0)], 2.0 * (-1.0_f32).exp());
        assert_relative_eq!(filter[(1, 2)], -10.0);
        assert_relative_eq!(filter[(1, 1)], -5.0);
        assert_relative_eq!(filter[(1, 0)], -5.0 * (-0.5_f32).exp());
    }

    #[test]
    fn test_filter_shape_mismatch() {
        let kernel = RefractoryKernel::build(0.5, 1.0, -10.0, 2.0, -5.0).unwrap();
        assert!(kernel.filter(&[2.0], &[(0, 1), (1, 1)]).is_err());
    }

    #[test]
    fn test_kernel_from_parameters() {
        use crate::model::{GlmParameters, LnpParameters};

        let glm = GlmParameters::default();
        assert_eq!(glm.time_scale(), 10);
        assert_eq!(glm.kernel().unwrap().time_scale(), glm.time_scale());

        let lnp = LnpParameters {
            abs_ref_scale: 2.0,
            rel_ref_scale: 0.0,
            ..Default::default()
        };
        assert_eq!(lnp.time_scale(), 2);
        assert_eq!(lnp.kernel().unwrap().refractory(1), lnp.abs_ref_strength);
    }
}
