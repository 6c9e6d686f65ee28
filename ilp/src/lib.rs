//! # 0/1 Integer Linear Program Solvers
//!
//! This crate contains a uniform interface to external integer program solvers, restricted to
//! what covering-type problems over binary variables need: binary columns with an objective
//! coefficient (the objective is always minimized), greater-or-equal rows, and solving to
//! optimality.
//!
//! A solver instance is a single session. It is created from a [`BuildSolver`] and consumed by
//! [`IlpSolver::solve`], so no model or environment outlives one solve.

use std::{fmt, time::Duration};

#[cfg(feature = "highs")]
mod highs;
#[cfg(feature = "highs")]
pub use highs::{Builder as HighsBuilder, Solver as HighsSolver};

#[cfg(feature = "gurobi")]
mod gurobi;
#[cfg(feature = "gurobi")]
pub use gurobi::{Builder as GurobiBuilder, Solver as GurobiSolver};

pub const EPSILON: f64 = 0.05;
pub const TRUE: f64 = 1. - EPSILON;
pub const FALSE: f64 = 0. + EPSILON;

/// Interprets the value a solver assigned to a binary variable
///
/// Returns [`None`] if the value is not within [`EPSILON`] of `0` or `1`.
pub fn binary_value(val: f64) -> Option<bool> {
    if val >= TRUE {
        Some(true)
    } else if val <= FALSE {
        Some(false)
    } else {
        None
    }
}

/// Handle of a binary variable in a solver session
///
/// Variables are numbered consecutively in the order they were added, starting at `0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(usize);

impl VarId {
    /// Gets the index of the variable, which is also its position in [`SolveResult::Optimal`]
    pub fn idx(self) -> usize {
        self.0
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "y{}", self.0 + 1)
    }
}

#[derive(Debug, PartialEq)]
pub enum SolveResult {
    /// The objective value and the value of each variable, indexed by [`VarId::idx`]
    Optimal(f64, Vec<f64>),
    Infeasible,
    /// The time limit was reached before optimality was proven
    TimeLimit,
    /// Any other termination status of the solver
    Other(String),
}

impl fmt::Display for SolveResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveResult::Optimal(cost, _) => write!(f, "optimal (objective {cost})"),
            SolveResult::Infeasible => write!(f, "infeasible"),
            SolveResult::TimeLimit => write!(f, "time limit reached"),
            SolveResult::Other(status) => write!(f, "{status}"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("variable {0} is not part of this solver")]
    UnknownVar(VarId),
    #[cfg(feature = "gurobi")]
    #[error("Gurobi error: {0}")]
    Gurobi(#[from] grb::Error),
}

/// Trait specifying the unified interface to 0/1 ILP solvers
pub trait IlpSolver: Sized {
    /// The type that can be used to build a solver of this type
    type Builder: BuildSolver<Solver = Self>;

    /// Adds a new binary variable with the given coefficient in the (minimized) objective
    fn add_binary_var(&mut self, obj_coeff: f64) -> Result<VarId, Error>;

    /// Adds the linear constraint `sum(coeff * var) >= bound`
    fn add_geq_constr<I>(&mut self, terms: I, bound: f64) -> Result<(), Error>
    where
        I: IntoIterator<Item = (VarId, f64)>;

    /// Gets the number of variables added so far
    fn n_vars(&self) -> usize;

    /// Solves the problem, consuming the solver session
    fn solve(self) -> Result<SolveResult, Error>;
}

/// Trait for initializing a new solver
pub trait BuildSolver {
    /// The solver type that can be initialized with this builder
    type Solver: IlpSolver;

    /// Initializes a new solver builder with default options
    ///
    /// # Default
    ///
    /// Solvers shall be quiet, use `1` thread and have no time limit
    fn new() -> Self;

    /// Initializes a solver from the given builder
    fn init(self) -> Result<Self::Solver, Error>;

    /// Sets the number of threads to solve with
    fn threads(&mut self, threads: u32) -> &mut Self;

    /// Sets a wall-clock time limit for [`IlpSolver::solve`]
    fn time_limit(&mut self, limit: Duration) -> &mut Self;

    /// Turns the solver's own diagnostic output on or off
    fn quiet(&mut self, quiet: bool) -> &mut Self;
}
