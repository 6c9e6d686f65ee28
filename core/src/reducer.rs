//! # The Hitting Set Reducer
//!
//! Formulates an incidence matrix as a 0/1 ILP with one binary variable `y_j` per universe
//! element, one covering constraint `sum(y_j for j in set i) >= 1` per set and the objective
//! `min sum(y_j)`, and decodes the optimal assignment into a hitting set.

use std::{marker::PhantomData, path::Path, time::Duration};

use cpu_time::ProcessTime;
use hsilp_ilp::{BuildSolver, IlpSolver, SolveResult, VarId};

use crate::{
    error::Infeasibility, Error, IncidenceMatrix, ReducerOptions, Result, SolverCall, Stats,
    TieBreak, WriteReductionLog,
};

/// Solves minimum hitting set instances with the ILP solver `S`
///
/// Every call to the ILP solver builds a fresh solver session, so nothing is shared between
/// solves.
pub struct Reducer<S> {
    opts: ReducerOptions,
    stats: Stats,
    logger: Option<Box<dyn WriteReductionLog>>,
    _solver: PhantomData<S>,
}

impl<S> Default for Reducer<S>
where
    S: IlpSolver,
{
    fn default() -> Self {
        Self::new(ReducerOptions::default())
    }
}

impl<S> Reducer<S>
where
    S: IlpSolver,
{
    pub fn new(opts: ReducerOptions) -> Self {
        Reducer {
            opts,
            stats: Stats::default(),
            logger: None,
            _solver: PhantomData,
        }
    }

    pub fn options(&self) -> &ReducerOptions {
        &self.opts
    }

    /// Gets the statistics of the last call to [`Reducer::solve_ilp`]
    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Attaches a logger to the reducer, replacing any previously attached one
    pub fn attach_logger<L: WriteReductionLog + 'static>(&mut self, logger: L) {
        self.logger = Some(Box::new(logger));
    }

    /// Detaches the logger from the reducer
    pub fn detach_logger(&mut self) -> Option<Box<dyn WriteReductionLog>> {
        self.logger.take()
    }

    /// Reads a matrix file in the exchange format and solves it
    pub fn solve_file<P: AsRef<Path>>(&mut self, path: P) -> Result<Vec<usize>> {
        let matrix = IncidenceMatrix::from_path(path)?;
        self.solve_ilp(&matrix)
    }

    /// Computes a minimum hitting set of the sets given by the rows of `matrix`
    ///
    /// Returns the selected universe elements in ascending order. Fails with
    /// [`Error::Infeasible`] before invoking the ILP solver if a row has no one.
    pub fn solve_ilp(&mut self, matrix: &IncidenceMatrix) -> Result<Vec<usize>> {
        self.stats = Stats {
            n_sets: matrix.n_sets(),
            universe_size: matrix.universe_size(),
            n_nonzeros: matrix.n_nonzeros(),
            ..Stats::default()
        };
        if let Some(logger) = &mut self.logger {
            logger.log_matrix(matrix.n_sets(), matrix.universe_size(), matrix.n_nonzeros())?;
        }

        if let Some(row) = matrix.empty_rows().next() {
            return Err(Error::Infeasible(Infeasibility::EmptySet(row + 1)));
        }

        let hitting_set = if matrix.n_sets() == 0 {
            if let Some(logger) = &mut self.logger {
                logger.log_message("no sets to hit, skipping the ILP solver")?;
            }
            vec![]
        } else {
            let optimum = self
                .optimize(matrix, &[], None, SolverCall::Optimize)?
                .ok_or(Error::Infeasible(Infeasibility::Solver))?;
            match self.opts.tie_break {
                TieBreak::Solver => optimum,
                TieBreak::Lexicographic => self.smallest_optimum(matrix, optimum.len())?,
            }
        };

        self.stats.hitting_set_size = hitting_set.len();
        if let Some(logger) = &mut self.logger {
            logger.log_hitting_set(&hitting_set)?;
        }
        Ok(hitting_set)
    }

    /// Finds the lexicographically smallest hitting set of size at most `bound`
    ///
    /// Elements are decided in ascending order. Each element is selected if a hitting set within
    /// the bound still exists that agrees with all previous decisions and contains the element.
    fn smallest_optimum(&mut self, matrix: &IncidenceMatrix, bound: usize) -> Result<Vec<usize>> {
        let mut decisions = Vec::with_capacity(matrix.universe_size());
        let mut hitting_set = Vec::with_capacity(bound);
        for element in matrix.universe().iter() {
            if hitting_set.len() == bound {
                break;
            }
            decisions.push(true);
            let selected = self
                .optimize(matrix, &decisions, Some(bound), SolverCall::Probe(element))?
                .is_some();
            decisions[element - 1] = selected;
            if selected {
                hitting_set.push(element);
            }
            if let Some(logger) = &mut self.logger {
                logger.log_tie_break(element, selected)?;
            }
        }
        Ok(hitting_set)
    }

    /// Builds and solves the ILP for `matrix` in a fresh solver session
    ///
    /// `decisions[j]` fixes the variable of element `j + 1`, `bound` limits the number of
    /// selected elements. Returns [`None`] if the ILP is infeasible.
    fn optimize(
        &mut self,
        matrix: &IncidenceMatrix,
        decisions: &[bool],
        bound: Option<usize>,
        call: SolverCall,
    ) -> Result<Option<Vec<usize>>> {
        let mut builder = <S::Builder as BuildSolver>::new();
        builder
            .threads(self.opts.threads)
            .quiet(!self.opts.solver_output);
        if let Some(limit) = self.opts.time_limit {
            builder.time_limit(limit);
        }
        let mut solver = builder.init()?;

        let vars = (0..matrix.universe_size())
            .map(|_| solver.add_binary_var(1.))
            .collect::<Result<Vec<VarId>, _>>()?;
        for row in 0..matrix.n_sets() {
            solver.add_geq_constr(matrix.covering(row).map(|col| (vars[col], 1.)), 1.)?;
        }
        if let Some(bound) = bound {
            solver.add_geq_constr(vars.iter().map(|&var| (var, -1.)), -(bound as f64))?;
        }
        for (&var, &selected) in vars.iter().zip(decisions) {
            if selected {
                solver.add_geq_constr([(var, 1.)], 1.)?;
            } else {
                solver.add_geq_constr([(var, -1.)], 0.)?;
            }
        }

        let start = ProcessTime::now();
        let result = solver.solve()?;
        let cpu_time = start.elapsed();
        self.stats.n_solver_calls += 1;
        self.stats.solve_time += cpu_time;
        if let Some(logger) = &mut self.logger {
            logger.log_solver_call(call, &result, cpu_time)?;
        }

        match result {
            SolveResult::Optimal(_, values) => decode(&values, matrix.universe_size()).map(Some),
            SolveResult::Infeasible => Ok(None),
            SolveResult::TimeLimit => Err(Error::Timeout(
                self.opts.time_limit.unwrap_or(Duration::ZERO),
            )),
            SolveResult::Other(status) => Err(Error::Solver(format!(
                "solver terminated without an optimal solution: {status}"
            ))),
        }
    }
}

/// Collects the (1-based) elements whose variable is assigned to one
fn decode(values: &[f64], universe_size: usize) -> Result<Vec<usize>> {
    if values.len() < universe_size {
        return Err(Error::Solver(format!(
            "solver returned {} values for {universe_size} variables",
            values.len()
        )));
    }
    let mut selected = vec![];
    for (col, &val) in values[..universe_size].iter().enumerate() {
        match hsilp_ilp::binary_value(val) {
            Some(true) => selected.push(col + 1),
            Some(false) => (),
            None => {
                return Err(Error::Solver(format!(
                    "variable y{} assigned to non-integral value {val}",
                    col + 1
                )))
            }
        }
    }
    Ok(selected)
}
