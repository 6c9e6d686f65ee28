//! # Error Types

use std::{fmt, io, time::Duration};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur while reducing and solving a hitting set instance
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The set family or universe does not describe a valid instance
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A matrix file does not follow the exchange format
    #[error("malformed matrix file: {0}")]
    MalformedFile(String),
    /// No hitting set exists
    #[error("infeasible problem: {0}")]
    Infeasible(Infeasibility),
    /// The ILP solver terminated abnormally or returned an unusable solution
    #[error("ILP solver failed: {0}")]
    Solver(String),
    /// The ILP solver interface reported an error
    #[error(transparent)]
    Backend(#[from] hsilp_ilp::Error),
    /// The ILP solver did not finish within the time limit
    #[error("ILP solver reached the time limit of {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Logger(#[from] LoggerError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// The reason why an instance has no hitting set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Infeasibility {
    /// The set with this (1-based) index contains no element
    EmptySet(usize),
    /// The ILP solver proved that no solution exists
    Solver,
}

impl fmt::Display for Infeasibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Infeasibility::EmptySet(row) => write!(f, "set {row} contains no element"),
            Infeasibility::Solver => write!(f, "the ILP solver reported infeasibility"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    #[error("IO error in logger: {0}")]
    IO(#[from] io::Error),
}
