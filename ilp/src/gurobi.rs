//! # ILP Solver Interface for the Gurobi Solver
//!
//! Every solver owns its own started environment, which is freed together with the model once
//! [`IlpSolver::solve`] returns.

use std::time::Duration;

use grb::{add_binvar, attr, c, expr::Expr, param, Env, Model, Status};

use super::{BuildSolver, Error, IlpSolver, SolveResult, VarId};

pub struct Solver {
    model: Model,
    vars: Vec<grb::Var>,
    n_constrs: usize,
}

impl IlpSolver for Solver {
    type Builder = Builder;

    fn add_binary_var(&mut self, obj_coeff: f64) -> Result<VarId, Error> {
        let model = &mut self.model;
        let name = format!("y{}", self.vars.len() + 1);
        let var = add_binvar!(model, name: &name, obj: obj_coeff)?;
        self.vars.push(var);
        Ok(VarId(self.vars.len() - 1))
    }

    fn add_geq_constr<I>(&mut self, terms: I, bound: f64) -> Result<(), Error>
    where
        I: IntoIterator<Item = (VarId, f64)>,
    {
        let mut expr = Expr::Constant(0.);
        for (var, coeff) in terms {
            let gv = *self.vars.get(var.idx()).ok_or(Error::UnknownVar(var))?;
            expr = expr + Expr::Term(coeff, gv);
        }
        self.n_constrs += 1;
        self.model
            .add_constr(&format!("c{}", self.n_constrs), c!(expr >= bound))?;
        Ok(())
    }

    fn n_vars(&self) -> usize {
        self.vars.len()
    }

    fn solve(mut self) -> Result<SolveResult, Error> {
        self.model.optimize()?;
        match self.model.status()? {
            Status::Optimal => {
                let cost = self.model.get_attr(attr::ObjVal)?;
                let values = self
                    .vars
                    .iter()
                    .map(|gv| self.model.get_obj_attr(attr::X, gv))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(SolveResult::Optimal(cost, values))
            }
            Status::Infeasible | Status::InfOrUnbd => Ok(SolveResult::Infeasible),
            Status::TimeLimit => Ok(SolveResult::TimeLimit),
            status => Ok(SolveResult::Other(format!("Gurobi status {status:?}"))),
        }
    }
}

/// The [`BuildSolver`] type for the Gurobi solver
pub struct Builder {
    threads: i32,
    time_limit: Option<Duration>,
    quiet: bool,
}

impl BuildSolver for Builder {
    type Solver = Solver;

    fn new() -> Self {
        Builder {
            threads: 1,
            time_limit: None,
            quiet: true,
        }
    }

    fn init(self) -> Result<Self::Solver, Error> {
        let mut env = Env::empty()?;
        if self.quiet {
            env.set(param::LogFile, "".to_string())?;
            env.set(param::LogToConsole, 0)?;
        }
        env.set(param::Threads, self.threads)?;
        if let Some(limit) = self.time_limit {
            env.set(param::TimeLimit, limit.as_secs_f64())?;
        }
        let env = env.start()?;
        let model = Model::with_env("hsilp", &env)?;
        Ok(Solver {
            model,
            vars: vec![],
            n_constrs: 0,
        })
    }

    fn threads(&mut self, threads: u32) -> &mut Self {
        self.threads = i32::try_from(threads).unwrap_or(i32::MAX);
        self
    }

    fn time_limit(&mut self, limit: Duration) -> &mut Self {
        self.time_limit = Some(limit);
        self
    }

    fn quiet(&mut self, quiet: bool) -> &mut Self {
        self.quiet = quiet;
        self
    }
}
