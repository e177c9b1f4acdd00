use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LmError {
    #[error("Invalid sequence: {0}")]
    InvalidSequence(String),

    #[error("Degenerate distribution: {0}")]
    DegenerateDistribution(String),

    #[error("Predictor contract violation: expected {expected} probabilities, got {got}")]
    PredictorContractViolation { expected: usize, got: usize },

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LmError>;
