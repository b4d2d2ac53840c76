//! Named parameter sets of the spiking models.
//!
//! Every model has a fixed list of parameter names, and a fixed subset of them can be tuned.
//! Both lists are explicit constants checked whenever a name is supplied.
use derivative::Derivative;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::kernel::Refractory;
use crate::error::SNNError;

/// A fixed set of named scalar parameters.
pub trait ParameterSet:
    Default + Clone + PartialEq + std::fmt::Debug + Serialize + DeserializeOwned + Send + Sync
{
    /// All parameter names.
    const NAMES: &'static [&'static str];
    /// The names of the parameters which can be tuned.
    const TUNABLE: &'static [&'static str];

    /// Returns the value of the named parameter, if it exists.
    fn get(&self, name: &str) -> Option<f32>;

    /// Set the named parameter. Returns an error if the name is unknown.
    fn set(&mut self, name: &str, value: f32) -> Result<(), SNNError>;

    /// Check that the parameter values are consistent.
    fn validate(&self) -> Result<(), SNNError>;

    /// Start from the defaults and override the supplied parameters.
    /// Returns an error if any name is unknown or if the resulting set is invalid.
    fn from_named<I, K>(named: I) -> Result<Self, SNNError>
    where
        I: IntoIterator<Item = (K, f32)>,
        K: AsRef<str>,
    {
        let mut parameters = Self::default();
        for (name, value) in named {
            parameters.set(name.as_ref(), value)?;
        }
        parameters.validate()?;
        Ok(parameters)
    }

    /// All parameters with their values, in declaration order.
    fn named(&self) -> Vec<(&'static str, f32)> {
        Self::NAMES
            .iter()
            .filter_map(|&name| self.get(name).map(|value| (name, value)))
            .collect()
    }

    fn is_tunable(name: &str) -> bool {
        Self::TUNABLE.iter().any(|&tunable| tunable == name)
    }
}

/// Convert a parameter holding a number of steps.
pub(crate) fn steps(name: &str, value: f32) -> Result<usize, SNNError> {
    if !(value.is_finite() && value >= 0.0 && value.fract() == 0.0) {
        return Err(SNNError::InvalidParameter(format!(
            "{} must be a non-negative integer, got {}",
            name, value
        )));
    }
    Ok(value as usize)
}

/// The longest spike history a model may look at, in steps.
pub const MAX_TIME_SCALE: usize = 10_000;

fn check_refractory(abs_ref_scale: f32, rel_ref_scale: f32) -> Result<(), SNNError> {
    let time_scale = steps("abs_ref_scale", abs_ref_scale)?
        .checked_add(steps("rel_ref_scale", rel_ref_scale)?)
        .filter(|&time_scale| time_scale <= MAX_TIME_SCALE)
        .ok_or_else(|| {
            SNNError::InvalidParameter(format!(
                "The refractory scales must span at most {} steps, got {} + {}",
                MAX_TIME_SCALE, abs_ref_scale, rel_ref_scale
            ))
        })?;
    if time_scale == 0 {
        return Err(SNNError::InvalidParameter(
            "The refractory scales must span at least one step".to_string(),
        ));
    }
    Ok(())
}

fn check_finite(named: &[(&'static str, f32)]) -> Result<(), SNNError> {
    match named.iter().find(|(_, value)| !value.is_finite()) {
        Some((name, value)) => Err(SNNError::InvalidParameter(format!(
            "{} must be finite, got {}",
            name, value
        ))),
        None => Ok(()),
    }
}

/// Parameters of the generalized linear model.
#[derive(Derivative, Debug, PartialEq, Clone, Serialize, Deserialize)]
#[derivative(Default)]
pub struct GlmParameters {
    /// Decay rate of the synaptic and relative refractory filters.
    #[derivative(Default(value = "0.2"))]
    pub beta: f32,
    /// Activation at which the spike probability is one half.
    #[derivative(Default(value = "5.0"))]
    pub threshold: f32,
    /// Number of steps of absolute refractoriness.
    #[derivative(Default(value = "3.0"))]
    pub abs_ref_scale: f32,
    /// Self-inhibition during the absolute refractory period.
    #[derivative(Default(value = "-100.0"))]
    pub abs_ref_strength: f32,
    /// Number of steps of relative refractoriness.
    #[derivative(Default(value = "7.0"))]
    pub rel_ref_scale: f32,
    /// Self-inhibition at the start of the relative refractory period.
    #[derivative(Default(value = "-30.0"))]
    pub rel_ref_strength: f32,
}

impl ParameterSet for GlmParameters {
    const NAMES: &'static [&'static str] = &[
        "beta",
        "threshold",
        "abs_ref_scale",
        "abs_ref_strength",
        "rel_ref_scale",
        "rel_ref_strength",
    ];
    const TUNABLE: &'static [&'static str] =
        &["beta", "threshold", "abs_ref_strength", "rel_ref_strength"];

    fn get(&self, name: &str) -> Option<f32> {
        match name {
            "beta" => Some(self.beta),
            "threshold" => Some(self.threshold),
            "abs_ref_scale" => Some(self.abs_ref_scale),
            "abs_ref_strength" => Some(self.abs_ref_strength),
            "rel_ref_scale" => Some(self.rel_ref_scale),
            "rel_ref_strength" => Some(self.rel_ref_strength),
            _ => None,
        }
    }

    fn set(&mut self, name: &str, value: f32) -> Result<(), SNNError> {
        match name {
            "beta" => self.beta = value,
            "threshold" => self.threshold = value,
            "abs_ref_scale" => self.abs_ref_scale = value,
            "abs_ref_strength" => self.abs_ref_strength = value,
            "rel_ref_scale" => self.rel_ref_scale = value,
            "rel_ref_strength" => self.rel_ref_strength = value,
            _ => return Err(SNNError::UnknownParameter(name.to_string())),
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), SNNError> {
        check_finite(&self.named())?;
        check_refractory(self.abs_ref_scale, self.rel_ref_scale)
    }
}

impl Refractory for GlmParameters {
    fn refractory(&self) -> (f32, f32, f32, f32, f32) {
        (
            self.beta,
            self.abs_ref_scale,
            self.abs_ref_strength,
            self.rel_ref_scale,
            self.rel_ref_strength,
        )
    }
}

/// Parameters of the linear-nonlinear-Poisson model.
#[derive(Derivative, Debug, PartialEq, Clone, Serialize, Deserialize)]
#[derivative(Default)]
pub struct LnpParameters {
    /// Decay rate of the synaptic and relative refractory filters.
    #[derivative(Default(value = "0.2"))]
    pub beta: f32,
    /// Activation at which the firing rate is one spike per unit of time.
    #[derivative(Default(value = "5.0"))]
    pub threshold: f32,
    /// Number of steps of absolute refractoriness.
    #[derivative(Default(value = "3.0"))]
    pub abs_ref_scale: f32,
    /// Self-inhibition during the absolute refractory period.
    #[derivative(Default(value = "-100.0"))]
    pub abs_ref_strength: f32,
    /// Number of steps of relative refractoriness.
    #[derivative(Default(value = "7.0"))]
    pub rel_ref_scale: f32,
    /// Self-inhibition at the start of the relative refractory period.
    #[derivative(Default(value = "-30.0"))]
    pub rel_ref_strength: f32,
    /// Duration of a simulation step.
    #[derivative(Default(value = "1.0"))]
    pub dt: f32,
}

impl ParameterSet for LnpParameters {
    const NAMES: &'static [&'static str] = &[
        "beta",
        "threshold",
        "abs_ref_scale",
        "abs_ref_strength",
        "rel_ref_scale",
        "rel_ref_strength",
        "dt",
    ];
    const TUNABLE: &'static [&'static str] =
        &["beta", "threshold", "abs_ref_strength", "rel_ref_strength"];

    fn get(&self, name: &str) -> Option<f32> {
        match name {
            "beta" => Some(self.beta),
            "threshold" => Some(self.threshold),
            "abs_ref_scale" => Some(self.abs_ref_scale),
            "abs_ref_strength" => Some(self.abs_ref_strength),
            "rel_ref_scale" => Some(self.rel_ref_scale),
            "rel_ref_strength" => Some(self.rel_ref_strength),
            "dt" => Some(self.dt),
            _ => None,
        }
    }

    fn set(&mut self, name: &str, value: f32) -> Result<(), SNNError> {
        match name {
            "beta" => self.beta = value,
            "threshold" => self.threshold = value,
            "abs_ref_scale" => self.abs_ref_scale = value,
            "abs_ref_strength" => self.abs_ref_strength = value,
            "rel_ref_scale" => self.rel_ref_scale = value,
            "rel_ref_strength" => self.rel_ref_strength = value,
            "dt" => self.dt = value,
            _ => return Err(SNNError::UnknownParameter(name.to_string())),
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), SNNError> {
        check_finite(&self.named())?;
        if !(self.dt > 0.0) {
            return Err(SNNError::InvalidParameter(format!(
                "dt must be positive, got {}",
                self.dt
            )));
        }
        check_refractory(self.abs_ref_scale, self.rel_ref_scale)
    }
}

impl Refractory for LnpParameters {
    fn refractory(&self) -> (f32, f32, f32, f32, f32) {
        (
            self.beta,
            self.abs_ref_scale,
            self.abs_ref_strength,
            self.rel_ref_scale,
            self.rel_ref_strength,
        )
    }
}

/// Parameters of the Herman rate model.
#[derive(Derivative, Debug, PartialEq, Clone, Serialize, Deserialize)]
#[derivative(Default)]
pub struct HermanParameters {
    /// Spike probability of a neuron without input.
    #[derivative(Default(value = "0.1"))]
    pub baseline_rate: f32,
    /// Scaling of the connectivity weights.
    #[derivative(Default(value = "1.0"))]
    pub gain: f32,
}

impl ParameterSet for HermanParameters {
    const NAMES: &'static [&'static str] = &["baseline_rate", "gain"];
    const TUNABLE: &'static [&'static str] = &["baseline_rate", "gain"];

    fn get(&self, name: &str) -> Option<f32> {
        match name {
            "baseline_rate" => Some(self.baseline_rate),
            "gain" => Some(self.gain),
            _ => None,
        }
    }

    fn set(&mut self, name: &str, value: f32) -> Result<(), SNNError> {
        match name {
            "baseline_rate" => self.baseline_rate = value,
            "gain" => self.gain = value,
            _ => return Err(SNNError::UnknownParameter(name.to_string())),
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), SNNError> {
        check_finite(&self.named())?;
        if !(0.0..=1.0).contains(&self.baseline_rate) {
            return Err(SNNError::InvalidParameter(format!(
                "baseline_rate must be in [0, 1], got {}",
                self.baseline_rate
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(GlmParameters::default().validate().is_ok());
        assert!(LnpParameters::default().validate().is_ok());
        assert!(HermanParameters::default().validate().is_ok());
    }

    #[test]
    fn test_from_named() {
        let parameters = GlmParameters::from_named([("threshold", 2.0), ("beta", 0.5)]).unwrap();
        assert_eq!(parameters.threshold, 2.0);
        assert_eq!(parameters.beta, 0.5);
        assert_eq!(parameters.abs_ref_scale, 3.0);

        assert_eq!(
            GlmParameters::from_named([("ku", 0.0)]),
            Err(SNNError::UnknownParameter("ku".into()))
        );
        assert!(matches!(
            GlmParameters::from_named([("abs_ref_scale", 2.5)]),
            Err(SNNError::InvalidParameter(_))
        ));
        assert!(matches!(
            GlmParameters::from_named([("abs_ref_scale", 1.0e30)]),
            Err(SNNError::InvalidParameter(_))
        ));
        assert!(matches!(
            LnpParameters::from_named([("rel_ref_scale", 1.0e9)]),
            Err(SNNError::InvalidParameter(_))
        ));
        assert!(
            GlmParameters::from_named([("abs_ref_scale", 4000.0), ("rel_ref_scale", 6000.0)]).is_ok()
        );
        assert!(matches!(
            LnpParameters::from_named([("dt", 0.0)]),
            Err(SNNError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_names_are_consistent() {
        let parameters = LnpParameters::default();
        assert_eq!(parameters.named().len(), LnpParameters::NAMES.len());
        assert!(LnpParameters::TUNABLE
            .iter()
            .all(|name| LnpParameters::NAMES.contains(name)));
        assert!(!GlmParameters::is_tunable("abs_ref_scale"));
        assert!(GlmParameters::is_tunable("threshold"));
    }
}
