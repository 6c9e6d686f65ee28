//! # ILP Solver Interface for the HiGHS Solver

use std::time::Duration;

use highs::{Col, HighsModelStatus, RowProblem, Sense};

use super::{BuildSolver, Error, IlpSolver, SolveResult, VarId};

pub struct Solver {
    problem: RowProblem,
    cols: Vec<Col>,
    costs: Vec<f64>,
    options: Options,
}

impl IlpSolver for Solver {
    type Builder = Builder;

    fn add_binary_var(&mut self, obj_coeff: f64) -> Result<VarId, Error> {
        let col = self.problem.add_integer_column(obj_coeff, 0..=1);
        self.cols.push(col);
        self.costs.push(obj_coeff);
        Ok(VarId(self.cols.len() - 1))
    }

    fn add_geq_constr<I>(&mut self, terms: I, bound: f64) -> Result<(), Error>
    where
        I: IntoIterator<Item = (VarId, f64)>,
    {
        let row_factors = terms
            .into_iter()
            .map(|(var, coeff)| {
                let col = self.cols.get(var.idx()).ok_or(Error::UnknownVar(var))?;
                Ok((*col, coeff))
            })
            .collect::<Result<Vec<_>, Error>>()?;
        self.problem.add_row(bound.., row_factors);
        Ok(())
    }

    fn n_vars(&self) -> usize {
        self.cols.len()
    }

    fn solve(self) -> Result<SolveResult, Error> {
        let Solver {
            problem,
            costs,
            options,
            ..
        } = self;
        let mut model = problem.optimise(Sense::Minimise);
        model.set_option("output_flag", !options.quiet);
        model.set_option("threads", options.threads);
        if let Some(limit) = options.time_limit {
            model.set_option("time_limit", limit.as_secs_f64());
        }
        let solved = model.solve();
        match solved.status() {
            HighsModelStatus::Optimal => {
                let values = solved.get_solution().columns().to_vec();
                let cost = values.iter().zip(&costs).map(|(val, cost)| val * cost).sum();
                Ok(SolveResult::Optimal(cost, values))
            }
            // all variables are bounded, so the problem can never be unbounded
            HighsModelStatus::Infeasible | HighsModelStatus::UnboundedOrInfeasible => {
                Ok(SolveResult::Infeasible)
            }
            HighsModelStatus::ReachedTimeLimit => Ok(SolveResult::TimeLimit),
            status => Ok(SolveResult::Other(format!("HiGHS status {status:?}"))),
        }
    }
}

/// The [`BuildSolver`] type for the HiGHS solver
pub struct Builder {
    options: Options,
}

struct Options {
    threads: i32,
    time_limit: Option<Duration>,
    quiet: bool,
}

impl BuildSolver for Builder {
    type Solver = Solver;

    fn new() -> Self {
        Builder {
            options: Options {
                threads: 1,
                time_limit: None,
                quiet: true,
            },
        }
    }

    fn init(self) -> Result<Self::Solver, Error> {
        Ok(Solver {
            problem: RowProblem::default(),
            cols: vec![],
            costs: vec![],
            options: self.options,
        })
    }

    fn threads(&mut self, threads: u32) -> &mut Self {
        self.options.threads = i32::try_from(threads).unwrap_or(i32::MAX);
        self
    }

    fn time_limit(&mut self, limit: Duration) -> &mut Self {
        self.options.time_limit = Some(limit);
        self
    }

    fn quiet(&mut self, quiet: bool) -> &mut Self {
        self.options.quiet = quiet;
        self
    }
}
