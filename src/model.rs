//! Point-process spiking models stepped over a connectivity graph.
//!
//! A model turns the raw weights of a graph into a connectivity filter, combines the filter with the
//! recent spike history of the network to compute the activation of every neuron, squashes the
//! activation into a spike probability and finally draws the new spikes.
//!
//! # Examples
//!
//! ```
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use spiking_network::dataset::{ConnectivityDataset, ConnectivityParams};
//! use spiking_network::model::{GlmModel, SpikingModel};
//!
//! let dataset = ConnectivityDataset::generate(20, 1, &ConnectivityParams::default(), 0).unwrap();
//! let sample = &dataset[0];
//!
//! let model = GlmModel::default();
//! let filter = model.connectivity_filter(sample.w0(), sample.edge_index()).unwrap();
//! let mut state = model.initialize_state(sample.num_nodes()).unwrap();
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(0);
//! for step in 0..100 {
//!     state = model.step(state, sample.edge_index(), &filter, step, &mut rng).unwrap();
//! }
//! assert_eq!(state.shape(), (20, model.time_scale()));
//! ```
pub mod glm;
pub mod herman;
pub mod kernel;
pub mod lnp;
pub mod parameters;
pub mod state;

pub use glm::GlmModel;
pub use herman::HermanModel;
pub use lnp::LnpModel;
pub use parameters::{GlmParameters, HermanParameters, LnpParameters, ParameterSet};
pub use state::ModelState;

use nalgebra::{DMatrix, DVector};
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::SNNError;
use crate::stimulation::{Stimulation, Stimulus};

/// Prefix of the stimulation parameters in the named parameter set.
pub const STIMULATION_PREFIX: &str = "stimulation";

/// Name of a stimulation parameter: `stimulation.<name>` for a single stimulation,
/// `stimulation.<index>.<name>` when several are registered.
fn stimulation_parameter_name(index: usize, num_stimulations: usize, name: &str) -> String {
    if num_stimulations == 1 {
        format!("{}.{}", STIMULATION_PREFIX, name)
    } else {
        format!("{}.{}.{}", STIMULATION_PREFIX, index, name)
    }
}

/// Split a stimulation parameter name into the stimulation index and the parameter name.
fn parse_stimulation_parameter_name(name: &str, num_stimulations: usize) -> Option<(usize, &str)> {
    let rest = name
        .strip_prefix(STIMULATION_PREFIX)?
        .strip_prefix('.')?;
    if num_stimulations == 1 {
        return Some((0, rest));
    }
    let (index, name) = rest.split_once('.')?;
    let index = index.parse::<usize>().ok()?;
    (index < num_stimulations).then_some((index, name))
}

/// Sum over the incoming edges of every neuron of the filtered spike history of the source neuron.
pub fn propagate(
    state: &ModelState,
    edge_index: &[(usize, usize)],
    filter: &DMatrix<f32>,
) -> Result<DVector<f32>, SNNError> {
    if filter.nrows() != edge_index.len() || filter.ncols() != state.time_scale() {
        return Err(SNNError::IncompatibleShapes(format!(
            "A filter of shape {:?} does not fit {} edges and a state of shape {:?}",
            filter.shape(),
            edge_index.len(),
            state.shape()
        )));
    }

    let num_nodes = state.num_nodes();
    let history = state.history();
    let mut activation = DVector::zeros(num_nodes);
    for (edge, &(source, target)) in edge_index.iter().enumerate() {
        if source >= num_nodes || target >= num_nodes {
            return Err(SNNError::OutOfBounds(format!(
                "Edge ({}, {}) in a network of {} neurons",
                source, target, num_nodes
            )));
        }
        activation[target] += filter.row(edge).dot(&history.row(source));
    }
    Ok(activation)
}

/// A spiking model with named parameters, an optional set of stimulations and a selection of tuned parameters.
pub trait SpikingModel: Clone + Send + Sync + Serialize + DeserializeOwned {
    type Parameters: ParameterSet;

    /// Create a model from its parameters and stimulations.
    fn from_parts(
        parameters: Self::Parameters,
        stimulations: Vec<Stimulation>,
    ) -> Result<Self, SNNError>;

    /// Create a model whose neurons fire with the given probability per step when they receive no input.
    fn with_firing_rate(firing_rate: f32) -> Result<Self, SNNError>;

    fn parameters(&self) -> &Self::Parameters;

    fn parameters_mut(&mut self) -> &mut Self::Parameters;

    fn stimulations(&self) -> &[Stimulation];

    fn stimulations_mut(&mut self) -> &mut Vec<Stimulation>;

    /// The names of the parameters selected for tuning.
    fn tuned(&self) -> &BTreeSet<String>;

    fn tuned_mut(&mut self) -> &mut BTreeSet<String>;

    /// The number of past steps the model looks at.
    fn time_scale(&self) -> usize;

    /// The (num_edges, time_scale) filter derived from the raw weights, oldest step first.
    fn connectivity_filter(
        &self,
        w0: &[f32],
        edge_index: &[(usize, usize)],
    ) -> Result<DMatrix<f32>, SNNError>;

    /// Squash the activation into a spike probability in [0, 1].
    fn probability_of_spike(&self, activation: &DVector<f32>) -> DVector<f32>;

    /// Create a model from named parameters, starting from the defaults.
    /// Returns an error if a name is not a parameter of the model.
    fn build<I, K>(parameters: I, stimulations: Vec<Stimulation>) -> Result<Self, SNNError>
    where
        I: IntoIterator<Item = (K, f32)>,
        K: AsRef<str>,
    {
        Self::from_parts(Self::Parameters::from_named(parameters)?, stimulations)
    }

    /// A silent (num_nodes, time_scale) history.
    fn initialize_state(&self, num_nodes: usize) -> Result<ModelState, SNNError> {
        ModelState::zeros(num_nodes, self.time_scale())
    }

    /// The synaptic input of every neuron, without stimulation.
    fn activation(
        &self,
        state: &ModelState,
        edge_index: &[(usize, usize)],
        filter: &DMatrix<f32>,
    ) -> Result<DVector<f32>, SNNError> {
        propagate(state, edge_index, filter)
    }

    /// The sum of all stimulations at the given step.
    fn stimulate(&self, step: usize, num_nodes: usize) -> DVector<f32> {
        self.stimulations()
            .iter()
            .fold(DVector::zeros(num_nodes), |acc, stimulation| {
                acc + stimulation.stimulate(step, num_nodes)
            })
    }

    /// The synaptic input plus the stimulation at the given step.
    fn stimulated_activation(
        &self,
        state: &ModelState,
        edge_index: &[(usize, usize)],
        filter: &DMatrix<f32>,
        step: usize,
    ) -> Result<DVector<f32>, SNNError> {
        let activation = self.activation(state, edge_index, filter)?;
        Ok(activation + self.stimulate(step, state.num_nodes()))
    }

    /// Advance the network by one step: draw the new spikes and append them to the history.
    fn step<R: Rng + ?Sized>(
        &self,
        mut state: ModelState,
        edge_index: &[(usize, usize)],
        filter: &DMatrix<f32>,
        step: usize,
        rng: &mut R,
    ) -> Result<ModelState, SNNError> {
        let activation = self.stimulated_activation(&state, edge_index, filter, step)?;
        let probabilities = self.probability_of_spike(&activation);
        let spikes = probabilities.map(|p| if rng.gen::<f32>() < p { 1.0 } else { 0.0 });
        state.push(&spikes)?;
        Ok(state)
    }

    /// Register a new stimulation. Its parameters become part of the named parameters.
    fn add_stimulation<S: Into<Stimulation>>(&mut self, stimulation: S) {
        // The first stimulation loses its unindexed names once a second one joins.
        if self.stimulations().len() == 1 {
            let renamed: Vec<(String, String)> = self
                .tuned()
                .iter()
                .filter_map(|name| {
                    parse_stimulation_parameter_name(name, 1)
                        .map(|(_, param)| (name.clone(), stimulation_parameter_name(0, 2, param)))
                })
                .collect();
            let tuned = self.tuned_mut();
            for (old, new) in renamed {
                tuned.remove(&old);
                tuned.insert(new);
            }
        }
        self.stimulations_mut().push(stimulation.into());
    }

    /// All parameters of the model and of its stimulations, in order.
    fn named_parameters(&self) -> Vec<(String, f32)> {
        let num_stimulations = self.stimulations().len();
        self.parameters()
            .named()
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .chain(
                self.stimulations()
                    .iter()
                    .enumerate()
                    .flat_map(|(index, stimulation)| {
                        stimulation.parameters().into_iter().map(move |(name, value)| {
                            (stimulation_parameter_name(index, num_stimulations, name), value)
                        })
                    }),
            )
            .collect()
    }

    /// The named parameters as a map.
    fn state_dict(&self) -> BTreeMap<String, f32> {
        self.named_parameters().into_iter().collect()
    }

    /// Returns the value of a named parameter, if it exists.
    fn parameter(&self, name: &str) -> Option<f32> {
        match parse_stimulation_parameter_name(name, self.stimulations().len()) {
            Some((index, name)) => self.stimulations()[index]
                .parameters()
                .into_iter()
                .find(|(stimulation_name, _)| *stimulation_name == name)
                .map(|(_, value)| value),
            None => self.parameters().get(name),
        }
    }

    /// Set a named parameter, e.g., after a tuning step.
    /// Returns an error if the name is unknown or the new value is invalid; the model is left unchanged in that case.
    fn set_parameter(&mut self, name: &str, value: f32) -> Result<(), SNNError> {
        let num_stimulations = self.stimulations().len();
        match parse_stimulation_parameter_name(name, num_stimulations) {
            Some((index, stimulation_name)) => self.stimulations_mut()[index]
                .set_parameter(stimulation_name, value)
                .map_err(|error| match error {
                    SNNError::UnknownParameter(_) => SNNError::UnknownParameter(name.to_string()),
                    error => error,
                }),
            None => {
                let mut parameters = self.parameters().clone();
                parameters.set(name, value)?;
                parameters.validate()?;
                *self.parameters_mut() = parameters;
                Ok(())
            }
        }
    }

    /// Select parameters for tuning.
    /// Returns an error, and selects nothing, if any name is not a tunable parameter of the model.
    /// All stimulation parameters are tunable.
    fn tune<I, K>(&mut self, names: I) -> Result<(), SNNError>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let names: Vec<String> = names.into_iter().map(|name| name.as_ref().to_string()).collect();
        for name in names.iter() {
            if self.parameter(name).is_none() {
                return Err(SNNError::UnknownParameter(name.clone()));
            }
            let is_stimulation =
                parse_stimulation_parameter_name(name, self.stimulations().len()).is_some();
            if !is_stimulation && !Self::Parameters::is_tunable(name) {
                return Err(SNNError::NotTunable(name.clone()));
            }
        }
        self.tuned_mut().extend(names);
        Ok(())
    }

    /// The parameters selected for tuning, with their current values.
    fn tuned_parameters(&self) -> Vec<(String, f32)> {
        self.named_parameters()
            .into_iter()
            .filter(|(name, _)| self.tuned().contains(name))
            .collect()
    }

    /// Save the model to a file.
    fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), SNNError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    /// Load a model from a file.
    /// Returns `SNNError::FileNotFound` if there is no such file.
    fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, SNNError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let model: Self = serde_json::from_reader(reader)?;
        model.parameters().validate()?;
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stimulation_parameter_names() {
        assert_eq!(stimulation_parameter_name(0, 1, "strength"), "stimulation.strength");
        assert_eq!(stimulation_parameter_name(1, 2, "decay"), "stimulation.1.decay");

        assert_eq!(
            parse_stimulation_parameter_name("stimulation.strength", 1),
            Some((0, "strength"))
        );
        assert_eq!(
            parse_stimulation_parameter_name("stimulation.1.decay", 2),
            Some((1, "decay"))
        );
        assert_eq!(parse_stimulation_parameter_name("stimulation.2.decay", 2), None);
        assert_eq!(parse_stimulation_parameter_name("stimulation.decay", 2), None);
        assert_eq!(parse_stimulation_parameter_name("threshold", 1), None);
        assert_eq!(parse_stimulation_parameter_name("stimulationx.decay", 1), None);
    }

    #[test]
    fn test_propagate() {
        // 0 -> 1 with weight 2, 1 -> 0 with weight -1, filter over two steps
        let edge_index = [(0, 1), (1, 0)];
        let filter = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, -1.0, -0.5]);
        let history = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 0.0, 1.0]);
        let state = ModelState::from_history(history).unwrap();

        let activation = propagate(&state, &edge_index, &filter).unwrap();
        assert_eq!(activation, DVector::from_vec(vec![-0.5, 3.0]));
    }

    #[test]
    fn test_propagate_errors() {
        let state = ModelState::zeros(2, 2).unwrap();
        assert!(matches!(
            propagate(&state, &[(0, 1)], &DMatrix::zeros(1, 3)),
            Err(SNNError::IncompatibleShapes(_))
        ));
        assert!(matches!(
            propagate(&state, &[(0, 2)], &DMatrix::zeros(1, 2)),
            Err(SNNError::OutOfBounds(_))
        ));
    }
}
