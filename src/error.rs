//! Error module for the spiking network library.
use std::error::Error;
use std::fmt;
use std::io;

/// Error types for the library.
#[derive(Debug, PartialEq)]
pub enum SNNError {
    /// Error for invalid parameters, e.g., odd number of neurons or negative number of simulations.
    InvalidParameter(String),
    /// Error for a parameter name which is not part of the model.
    UnknownParameter(String),
    /// Error for a parameter name which exists but cannot be tuned.
    NotTunable(String),
    /// Error for out of bounds access, e.g., node index larger than the number of nodes.
    OutOfBounds(String),
    /// Error for incompatible shapes, e.g., a state and a filter which do not line up.
    IncompatibleShapes(String),
    /// Error for a missing file.
    FileNotFound(String),
    /// Error for I/O operations.
    IOError(String),
    /// Error for a failed simulation, e.g., the worker pool could not be built.
    SimulationFailed(String),
}

impl fmt::Display for SNNError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SNNError::InvalidParameter(e) => write!(f, "Invalid parameters: {}", e),
            SNNError::UnknownParameter(e) => write!(f, "Unknown parameter: {}", e),
            SNNError::NotTunable(e) => write!(f, "Parameter cannot be tuned: {}", e),
            SNNError::OutOfBounds(e) => {
                write!(f, "Index out of bounds: {}", e)
            }
            SNNError::IncompatibleShapes(e) => write!(f, "Incompatible shapes: {}", e),
            SNNError::FileNotFound(e) => write!(f, "File not found: {}", e),
            SNNError::IOError(e) => write!(f, "I/O error: {}", e),
            SNNError::SimulationFailed(e) => write!(f, "Simulation failed: {}", e),
        }
    }
}

impl Error for SNNError {}

impl From<io::Error> for SNNError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::NotFound => SNNError::FileNotFound(e.to_string()),
            _ => SNNError::IOError(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for SNNError {
    fn from(e: serde_json::Error) -> Self {
        SNNError::IOError(e.to_string())
    }
}
