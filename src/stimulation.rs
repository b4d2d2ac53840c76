//! External stimulation injected into the neurons' activation.
//!
//! Every stimulation is a pure function of the simulation step: given the targeted neurons and the
//! total number of neurons it returns an additive input per neuron. Several stimulations combine by
//! summation.
use nalgebra::DVector;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Bernoulli, Distribution};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

use crate::error::SNNError;

/// Capability shared by all stimulations.
pub trait Stimulus {
    /// The input to every neuron at the given step; non-targeted neurons receive zero.
    /// Targets outside of [0, num_nodes) are ignored.
    fn evaluate(&self, step: usize, targets: &[usize], num_nodes: usize) -> DVector<f32>;

    /// The neurons receiving the stimulation.
    fn targets(&self) -> &[usize];

    /// The named parameters of the stimulation.
    fn parameters(&self) -> Vec<(&'static str, f32)>;

    /// Set a parameter by name.
    fn set_parameter(&mut self, name: &str, value: f32) -> Result<(), SNNError>;

    /// Evaluate the stimulation on its own targets.
    fn stimulate(&self, step: usize, num_nodes: usize) -> DVector<f32> {
        self.evaluate(step, self.targets(), num_nodes)
    }
}

fn broadcast(value: f32, targets: &[usize], num_nodes: usize) -> DVector<f32> {
    let mut input = DVector::zeros(num_nodes);
    if value != 0.0 {
        targets
            .iter()
            .filter(|&&target| target < num_nodes)
            .for_each(|&target| input[target] = value);
    }
    input
}

fn check_targets(targets: &[usize]) -> Result<(), SNNError> {
    if targets.is_empty() {
        return Err(SNNError::InvalidParameter(
            "A stimulation needs at least one target".to_string(),
        ));
    }
    Ok(())
}

fn check_decay(decay: f32) -> Result<(), SNNError> {
    if !(decay.is_finite() && decay >= 0.0) {
        return Err(SNNError::InvalidParameter(format!(
            "The stimulation decay must be non-negative, got {}",
            decay
        )));
    }
    Ok(())
}

/// Pulses at regular intervals, each decaying exponentially until the next one.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct RegularStimulation {
    targets: Vec<usize>,
    strength: f32,
    decay: f32,
    interval: usize,
    start: usize,
    duration: usize,
}

impl RegularStimulation {
    /// Create a pulse train starting at `start`, with one pulse every `interval` steps, during `duration` steps.
    pub fn build(
        targets: Vec<usize>,
        strength: f32,
        decay: f32,
        interval: usize,
        start: usize,
        duration: usize,
    ) -> Result<Self, SNNError> {
        check_targets(&targets)?;
        check_decay(decay)?;
        if interval == 0 {
            return Err(SNNError::InvalidParameter(
                "The stimulation interval must be positive".to_string(),
            ));
        }
        Ok(RegularStimulation {
            targets,
            strength,
            decay,
            interval,
            start,
            duration,
        })
    }

    fn value_at(&self, step: usize) -> f32 {
        if step < self.start || step >= self.start.saturating_add(self.duration) {
            return 0.0;
        }
        let elapsed = (step - self.start) % self.interval;
        self.strength * (-self.decay * elapsed as f32).exp()
    }
}

impl Stimulus for RegularStimulation {
    fn evaluate(&self, step: usize, targets: &[usize], num_nodes: usize) -> DVector<f32> {
        broadcast(self.value_at(step), targets, num_nodes)
    }

    fn targets(&self) -> &[usize] {
        &self.targets[..]
    }

    fn parameters(&self) -> Vec<(&'static str, f32)> {
        vec![("strength", self.strength), ("decay", self.decay)]
    }

    fn set_parameter(&mut self, name: &str, value: f32) -> Result<(), SNNError> {
        match name {
            "strength" => self.strength = value,
            "decay" => {
                check_decay(value)?;
                self.decay = value;
            }
            _ => return Err(SNNError::UnknownParameter(name.to_string())),
        }
        Ok(())
    }
}

/// Sinusoidal input, `amplitude * sin(2 pi frequency step + phase)`, during `duration` steps.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct SinStimulation {
    targets: Vec<usize>,
    amplitude: f32,
    frequency: f32,
    phase: f32,
    duration: usize,
}

impl SinStimulation {
    /// The frequency is expressed in cycles per step.
    pub fn build(
        targets: Vec<usize>,
        amplitude: f32,
        frequency: f32,
        phase: f32,
        duration: usize,
    ) -> Result<Self, SNNError> {
        check_targets(&targets)?;
        if !(frequency.is_finite() && frequency >= 0.0) {
            return Err(SNNError::InvalidParameter(format!(
                "The stimulation frequency must be non-negative, got {}",
                frequency
            )));
        }
        Ok(SinStimulation {
            targets,
            amplitude,
            frequency,
            phase,
            duration,
        })
    }

    fn value_at(&self, step: usize) -> f32 {
        if step >= self.duration {
            return 0.0;
        }
        self.amplitude * (2.0 * PI * self.frequency * step as f32 + self.phase).sin()
    }
}

impl Stimulus for SinStimulation {
    fn evaluate(&self, step: usize, targets: &[usize], num_nodes: usize) -> DVector<f32> {
        broadcast(self.value_at(step), targets, num_nodes)
    }

    fn targets(&self) -> &[usize] {
        &self.targets[..]
    }

    fn parameters(&self) -> Vec<(&'static str, f32)> {
        vec![
            ("amplitude", self.amplitude),
            ("frequency", self.frequency),
            ("phase", self.phase),
        ]
    }

    fn set_parameter(&mut self, name: &str, value: f32) -> Result<(), SNNError> {
        match name {
            "amplitude" => self.amplitude = value,
            "frequency" => self.frequency = value,
            "phase" => self.phase = value,
            _ => return Err(SNNError::UnknownParameter(name.to_string())),
        }
        Ok(())
    }
}

/// Pulses at random steps (discretized Poisson process), each decaying exponentially until the next one.
/// The pulse times are drawn once, at construction, so that evaluation is deterministic.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct PoissonStimulation {
    targets: Vec<usize>,
    strength: f32,
    decay: f32,
    pulses: Vec<usize>,
}

impl PoissonStimulation {
    /// Draw pulses at the given rate (expected pulses per step) during `duration` steps.
    pub fn build(
        targets: Vec<usize>,
        strength: f32,
        decay: f32,
        rate: f32,
        duration: usize,
        seed: u64,
    ) -> Result<Self, SNNError> {
        check_targets(&targets)?;
        check_decay(decay)?;
        if !(rate.is_finite() && rate > 0.0) {
            return Err(SNNError::InvalidParameter(format!(
                "The pulse rate must be positive and finite, got {}",
                rate
            )));
        }
        // At most one pulse per step: a step holds a pulse if the process has any arrival in it.
        let pulse_dist = Bernoulli::new(-(-(rate as f64)).exp_m1()).map_err(|e| {
            SNNError::InvalidParameter(format!("Invalid pulse rate: {}", e))
        })?;

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let pulses = (0..duration)
            .filter(|_| pulse_dist.sample(&mut rng))
            .collect();

        Ok(PoissonStimulation {
            targets,
            strength,
            decay,
            pulses,
        })
    }

    /// Returns the steps at which a pulse starts.
    pub fn pulses(&self) -> &[usize] {
        &self.pulses[..]
    }

    fn value_at(&self, step: usize) -> f32 {
        let num_started = self.pulses.partition_point(|&pulse| pulse <= step);
        match num_started {
            0 => 0.0,
            n => {
                let elapsed = step - self.pulses[n - 1];
                self.strength * (-self.decay * elapsed as f32).exp()
            }
        }
    }
}

impl Stimulus for PoissonStimulation {
    fn evaluate(&self, step: usize, targets: &[usize], num_nodes: usize) -> DVector<f32> {
        broadcast(self.value_at(step), targets, num_nodes)
    }

    fn targets(&self) -> &[usize] {
        &self.targets[..]
    }

    fn parameters(&self) -> Vec<(&'static str, f32)> {
        vec![("strength", self.strength), ("decay", self.decay)]
    }

    fn set_parameter(&mut self, name: &str, value: f32) -> Result<(), SNNError> {
        match name {
            "strength" => self.strength = value,
            "decay" => {
                check_decay(value)?;
                self.decay = value;
            }
            _ => return Err(SNNError::UnknownParameter(name.to_string())),
        }
        Ok(())
    }
}

/// Any of the available stimulations.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum Stimulation {
    Regular(RegularStimulation),
    Sin(SinStimulation),
    Poisson(PoissonStimulation),
}

impl Stimulation {
    fn inner(&self) -> &dyn Stimulus {
        match self {
            Stimulation::Regular(stimulation) => stimulation,
            Stimulation::Sin(stimulation) => stimulation,
            Stimulation::Poisson(stimulation) => stimulation,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Stimulus {
        match self {
            Stimulation::Regular(stimulation) => stimulation,
            Stimulation::Sin(stimulation) => stimulation,
            Stimulation::Poisson(stimulation) => stimulation,
        }
    }
}

impl Stimulus for Stimulation {
    fn evaluate(&self, step: usize, targets: &[usize], num_nodes: usize) -> DVector<f32> {
        self.inner().evaluate(step, targets, num_nodes)
    }

    fn targets(&self) -> &[usize] {
        self.inner().targets()
    }

    fn parameters(&self) -> Vec<(&'static str, f32)> {
        self.inner().parameters()
    }

    fn set_parameter(&mut self, name: &str, value: f32) -> Result<(), SNNError> {
        self.inner_mut().set_parameter(name, value)
    }
}

impl From<RegularStimulation> for Stimulation {
    fn from(stimulation: RegularStimulation) -> Self {
        Stimulation::Regular(stimulation)
    }
}

impl From<SinStimulation> for Stimulation {
    fn from(stimulation: SinStimulation) -> Self {
        Stimulation::Sin(stimulation)
    }
}

impl From<PoissonStimulation> for Stimulation {
    fn from(stimulation: PoissonStimulation) -> Self {
        Stimulation::Poisson(stimulation)
    }
}
