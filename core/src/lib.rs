//! # hsilp
//!
//! Computes minimum hitting sets of finite set families by reduction to 0/1 integer linear
//! programming.
//!
//! A family of sets over the universe `1..=t` is encoded as a binary incidence matrix, the matrix
//! is formulated as an ILP with one binary variable per universe element and one covering
//! constraint per set, and the optimal assignment of an external ILP solver is decoded back into
//! a hitting set of minimum cardinality.

use std::{ffi::OsString, fmt, path::PathBuf, time::Duration};

use hsilp_ilp::SolveResult;

pub mod error;
pub use error::{Error, Infeasibility, LoggerError, Result};

pub mod universe;
pub use universe::{build_universe, Universe};

pub mod matrix;
pub use matrix::{deserialize, encode, serialize, IncidenceMatrix};

pub mod options;
pub use options::{ReducerOptions, TieBreak};

pub mod reducer;
pub use reducer::Reducer;

pub use hsilp_ilp as ilp;

/// The ILP solver used by the entry points of this crate
#[cfg(feature = "highs")]
pub type DefaultSolver = hsilp_ilp::HighsSolver;
/// The ILP solver used by the entry points of this crate
#[cfg(all(feature = "gurobi", not(feature = "highs")))]
pub type DefaultSolver = hsilp_ilp::GurobiSolver;

/// The purpose of a call to the ILP solver
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolverCall {
    /// Finding the minimum hitting set size
    Optimize,
    /// Checking whether the given element can be part of a minimum hitting set that agrees with
    /// all previous decisions
    Probe(usize),
}

impl fmt::Display for SolverCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverCall::Optimize => write!(f, "optimize"),
            SolverCall::Probe(element) => write!(f, "probe {element}"),
        }
    }
}

/// Statistics of the reducer
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct Stats {
    /// The number of sets, i.e., matrix rows
    pub n_sets: usize,
    /// The number of universe elements, i.e., matrix columns
    pub universe_size: usize,
    /// The number of ones in the incidence matrix
    pub n_nonzeros: usize,
    /// The number of calls to the ILP solver
    pub n_solver_calls: usize,
    /// The CPU time spent in the ILP solver
    pub solve_time: Duration,
    /// The size of the computed hitting set
    pub hitting_set_size: usize,
}

/// A logger to attach to a reducer
pub trait WriteReductionLog {
    /// Adds the dimensions of the incidence matrix to the log
    fn log_matrix(
        &mut self,
        n_sets: usize,
        universe_size: usize,
        n_nonzeros: usize,
    ) -> Result<(), LoggerError>;
    /// Adds an ILP solver call to the log
    fn log_solver_call(
        &mut self,
        call: SolverCall,
        result: &SolveResult,
        cpu_time: Duration,
    ) -> Result<(), LoggerError>;
    /// Adds a tie-breaking decision on an element to the log
    fn log_tie_break(&mut self, element: usize, selected: bool) -> Result<(), LoggerError>;
    /// Adds the final hitting set to the log
    fn log_hitting_set(&mut self, hitting_set: &[usize]) -> Result<(), LoggerError>;
    /// Logs any string
    fn log_message(&mut self, msg: &str) -> Result<(), LoggerError>;
}

/// Computes a minimum hitting set of a set family over the universe `1..=m`, where `m` is the
/// largest element occurring in any set
///
/// Returns the selected elements in ascending order.
///
/// # Errors
///
/// - [`Error::InvalidInput`] if `sets` is empty or contains the element `0`
/// - [`Error::Infeasible`] if a set is empty
/// - [`Error::Solver`], [`Error::Backend`] or [`Error::Timeout`] if the ILP solver fails
#[cfg(any(feature = "highs", feature = "gurobi"))]
pub fn from_sets<S: AsRef<[usize]>>(sets: &[S]) -> Result<Vec<usize>> {
    let universe = build_universe(sets)?;
    from_universe_sets(&universe, sets)
}

/// Computes a minimum hitting set of a set family over an explicit universe
///
/// Elements of the universe that occur in no set are never selected.
///
/// # Errors
///
/// As [`from_sets`], additionally [`Error::InvalidInput`] if a set contains an element outside
/// of `universe`.
#[cfg(any(feature = "highs", feature = "gurobi"))]
pub fn from_universe_sets<S: AsRef<[usize]>>(
    universe: &Universe,
    sets: &[S],
) -> Result<Vec<usize>> {
    if sets.is_empty() {
        return Err(Error::InvalidInput(String::from("the set family is empty")));
    }
    let matrix = encode(sets, universe)?;
    Reducer::<DefaultSolver>::default().solve_ilp(&matrix)
}

/// Reads an incidence matrix in the exchange format from `path` and computes a minimum hitting
/// set of its rows
///
/// # Errors
///
/// [`Error::Io`] if the file cannot be read, [`Error::MalformedFile`] if it is not in the
/// exchange format, otherwise as [`from_sets`].
#[cfg(any(feature = "highs", feature = "gurobi"))]
pub fn solve_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Vec<usize>> {
    Reducer::<DefaultSolver>::default().solve_file(path)
}

/// Writes the incidence matrix of a set family to `<path>.txt`, replacing any existing file
///
/// Returns the path of the written file. No solving is performed.
///
/// # Errors
///
/// [`Error::InvalidInput`] as for [`from_sets`], [`Error::Io`] if writing fails.
pub fn write_from_sets<S: AsRef<[usize]>, P: Into<PathBuf>>(
    sets: &[S],
    path: P,
) -> Result<PathBuf> {
    let universe = build_universe(sets)?;
    let matrix = encode(sets, &universe)?;
    let mut path: OsString = path.into().into_os_string();
    path.push(".txt");
    let path = PathBuf::from(path);
    matrix.write_to_path(&path)?;
    Ok(path)
}
