//! Rolling spike history of a network.
use nalgebra::{DMatrix, DVector};

use crate::error::SNNError;

/// The last `time_scale` steps of activity of every neuron, one row per neuron.
/// The last column holds the most recent step.
#[derive(Debug, PartialEq, Clone)]
pub struct ModelState {
    history: DMatrix<f32>,
}

impl ModelState {
    /// A silent history.
    pub fn zeros(num_nodes: usize, time_scale: usize) -> Result<Self, SNNError> {
        Self::from_history(DMatrix::zeros(num_nodes, time_scale))
    }

    /// Start from a given history, e.g., a prior recording.
    pub fn from_history(history: DMatrix<f32>) -> Result<Self, SNNError> {
        if history.ncols() == 0 {
            return Err(SNNError::IncompatibleShapes(
                "A state history must span at least one step".to_string(),
            ));
        }
        Ok(ModelState { history })
    }

    pub fn num_nodes(&self) -> usize {
        self.history.nrows()
    }

    pub fn time_scale(&self) -> usize {
        self.history.ncols()
    }

    /// Returns (num_nodes, time_scale).
    pub fn shape(&self) -> (usize, usize) {
        self.history.shape()
    }

    pub fn history(&self) -> &DMatrix<f32> {
        &self.history
    }

    /// The activity at the most recent step.
    pub fn latest(&self) -> DVector<f32> {
        self.history.column(self.time_scale() - 1).into_owned()
    }

    /// Drop the oldest step and append the new activity as the most recent one.
    pub fn push(&mut self, activity: &DVector<f32>) -> Result<(), SNNError> {
        if activity.len() != self.num_nodes() {
            return Err(SNNError::IncompatibleShapes(format!(
                "Got activity for {} neurons in a state of {} neurons",
                activity.len(),
                self.num_nodes()
            )));
        }
        let time_scale = self.time_scale();
        for col in 1..time_scale {
            let newer = self.history.column(col).into_owned();
            self.history.set_column(col - 1, &newer);
        }
        self.history.set_column(time_scale - 1, activity);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push() {
        let mut state = ModelState::zeros(2, 3).unwrap();
        state.push(&DVector::from_vec(vec![1.0, 0.0])).unwrap();
        state.push(&DVector::from_vec(vec![0.0, 1.0])).unwrap();

        assert_eq!(
            state.history(),
            &DMatrix::from_row_slice(2, 3, &[0.0, 1.0, 0.0, 0.0, 0.0, 1.0])
        );
        assert_eq!(state.latest(), DVector::from_vec(vec![0.0, 1.0]));

        state.push(&DVector::from_vec(vec![0.0, 0.0])).unwrap();
        state.push(&DVector::from_vec(vec![0.0, 0.0])).unwrap();
        assert_eq!(state, ModelState::zeros(2, 3).unwrap());
    }

    #[test]
    fn test_push_wrong_size() {
        let mut state = ModelState::zeros(2, 3).unwrap();
        assert!(matches!(
            state.push(&DVector::zeros(3)),
            Err(SNNError::IncompatibleShapes(_))
        ));
    }

    #[test]
    fn test_empty_history() {
        assert!(matches!(
            ModelState::zeros(2, 0),
            Err(SNNError::IncompatibleShapes(_))
        ));
        assert!(ModelState::from_history(DMatrix::zeros(0, 0)).is_err());

        let mut state = ModelState::zeros(2, 1).unwrap();
        state.push(&DVector::from_vec(vec![1.0, 1.0])).unwrap();
        assert_eq!(state.latest(), DVector::from_vec(vec![1.0, 1.0]));
    }
}
