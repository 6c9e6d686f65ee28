//! # Options
//!
//! This module contains all configuration options of the hitting set reducer.

use std::{fmt, time::Duration};

/// Configuration options for [`crate::Reducer`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReducerOptions {
    /// How to choose among multiple minimum hitting sets
    pub tie_break: TieBreak,
    /// Wall-clock limit for each call to the ILP solver
    pub time_limit: Option<Duration>,
    /// The number of threads the ILP solver may use
    pub threads: u32,
    /// Let the ILP solver print its own diagnostic output
    pub solver_output: bool,
}

impl Default for ReducerOptions {
    fn default() -> Self {
        ReducerOptions {
            tie_break: Default::default(),
            time_limit: None,
            threads: 1,
            solver_output: false,
        }
    }
}

/// Policies for breaking ties between minimum hitting sets
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum TieBreak {
    /// Return the lexicographically smallest minimum hitting set. This needs one additional ILP
    /// solver call per decided element.
    #[default]
    Lexicographic,
    /// Return whichever minimum hitting set the ILP solver finds first
    Solver,
}

impl fmt::Display for TieBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TieBreak::Lexicographic => write!(f, "lexicographic"),
            TieBreak::Solver => write!(f, "solver"),
        }
    }
}
