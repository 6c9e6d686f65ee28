use std::{
    fs,
    sync::{Arc, Mutex},
    time::Duration,
};

use hsilp_core::{
    encode, from_sets, from_universe_sets, ilp::SolveResult, solve_from_file, write_from_sets,
    DefaultSolver, Error, IncidenceMatrix, Infeasibility, LoggerError, Reducer, ReducerOptions,
    SolverCall, TieBreak, Universe, WriteReductionLog,
};
use itertools::Itertools;

fn hits_all(sets: &[Vec<usize>], hitting_set: &[usize]) -> bool {
    sets.iter()
        .all(|set| set.iter().any(|elem| hitting_set.contains(elem)))
}

/// Checks coverage and that no proper subset of `hitting_set` is a hitting set
fn check_minimal(sets: &[Vec<usize>], hitting_set: &[usize]) {
    assert!(!hitting_set.is_empty());
    assert!(hitting_set.windows(2).all(|w| w[0] < w[1]));
    assert!(hits_all(sets, hitting_set), "{hitting_set:?} misses a set");
    for sub in hitting_set
        .iter()
        .copied()
        .combinations(hitting_set.len() - 1)
    {
        assert!(!hits_all(sets, &sub), "{sub:?} is a smaller hitting set");
    }
}

fn solver_ties() -> Reducer<DefaultSolver> {
    Reducer::new(ReducerOptions {
        tie_break: TieBreak::Solver,
        ..ReducerOptions::default()
    })
}

#[test]
fn single_element() {
    assert_eq!(from_sets(&[vec![5]]).unwrap(), vec![5]);
    let universe = Universe::try_from(1..=5).unwrap();
    assert_eq!(from_universe_sets(&universe, &[vec![5]]).unwrap(), vec![5]);
}

#[test]
fn nested() {
    let universe = Universe::try_from(1..=3).unwrap();
    let sets = [vec![1, 2, 3], vec![2, 3], vec![3]];
    assert_eq!(from_universe_sets(&universe, &sets).unwrap(), vec![3]);
    assert_eq!(from_sets(&sets).unwrap(), vec![3]);
}

#[test]
fn triangle() {
    let sets = [vec![1, 2], vec![2, 3], vec![3, 1]];
    assert_eq!(from_sets(&sets).unwrap(), vec![1, 2]);

    let matrix = encode(&sets, &Universe::with_size(3)).unwrap();
    let hs = solver_ties().solve_ilp(&matrix).unwrap();
    assert_eq!(hs.len(), 2);
    check_minimal(&sets, &hs);
}

#[test]
fn larger_universe() {
    let universe = Universe::try_from(1..=10).unwrap();
    let sets = [vec![2, 4], vec![4, 6]];
    assert_eq!(from_universe_sets(&universe, &sets).unwrap(), vec![4]);
}

#[test]
fn coverage_and_minimality() {
    let families = [
        vec![vec![1, 2], vec![3, 4], vec![5, 6], vec![1, 3, 5]],
        vec![vec![1], vec![2], vec![3], vec![1, 2, 3]],
        vec![vec![1, 4, 7], vec![2, 5, 8], vec![3, 6, 9], vec![1, 2, 3], vec![7, 8, 9]],
        vec![vec![6, 2], vec![2, 6], vec![4]],
    ];
    for sets in families {
        check_minimal(&sets, &from_sets(&sets).unwrap());
        let matrix = encode(&sets, &hsilp_core::build_universe(&sets).unwrap()).unwrap();
        check_minimal(&sets, &solver_ties().solve_ilp(&matrix).unwrap());
    }
}

#[test]
fn idempotence() {
    let sets = [vec![1, 2, 5], vec![2, 3], vec![3, 4, 5], vec![1, 4]];
    let first = from_sets(&sets).unwrap();
    let second = from_sets(&sets).unwrap();
    assert_eq!(first, second);

    let matrix = encode(&sets, &Universe::with_size(5)).unwrap();
    let mut reducer = solver_ties();
    let first = reducer.solve_ilp(&matrix).unwrap();
    let second = reducer.solve_ilp(&matrix).unwrap();
    assert_eq!(first.len(), second.len());
}

#[test]
fn empty_set() {
    assert!(matches!(
        from_sets(&[vec![1, 2], vec![], vec![2]]),
        Err(Error::Infeasible(Infeasibility::EmptySet(2)))
    ));
    let sets: [Vec<usize>; 2] = [vec![], vec![]];
    assert!(matches!(
        from_sets(&sets),
        Err(Error::Infeasible(Infeasibility::EmptySet(1)))
    ));
}

#[test]
fn invalid_input() {
    let sets: [Vec<usize>; 0] = [];
    assert!(matches!(from_sets(&sets), Err(Error::InvalidInput(_))));
    assert!(matches!(
        from_sets(&[vec![1, 0]]),
        Err(Error::InvalidInput(_))
    ));
    let universe = Universe::try_from(1..=3).unwrap();
    assert!(matches!(
        from_universe_sets(&universe, &[vec![1, 4]]),
        Err(Error::InvalidInput(_))
    ));
    assert!(matches!(
        from_universe_sets(&universe, &sets),
        Err(Error::InvalidInput(_))
    ));
    assert!(matches!(
        Universe::try_from(2..=3),
        Err(Error::InvalidInput(_))
    ));
}

#[test]
fn write_and_solve_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_from_sets(&[vec![1, 2, 3], vec![2, 3], vec![3]], dir.path().join("nested"))
        .unwrap();
    assert_eq!(path, dir.path().join("nested.txt"));
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "3 3\n1 1 1 1\n2 0 1 1\n3 0 0 1"
    );
    assert_eq!(solve_from_file(&path).unwrap(), vec![3]);

    // existing files are replaced
    let path = write_from_sets(&[vec![2]], dir.path().join("nested")).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "1 2\n1 0 1");
    assert_eq!(solve_from_file(&path).unwrap(), vec![2]);
}

#[test]
fn write_invalid_input() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        write_from_sets(&[vec![0, 1]], dir.path().join("invalid")),
        Err(Error::InvalidInput(_))
    ));
    assert!(!dir.path().join("invalid.txt").exists());
}

#[test]
fn malformed_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("truncated.txt");
    fs::write(&path, "3 2\n1 1 0\n2 0 1").unwrap();
    assert!(matches!(
        solve_from_file(&path),
        Err(Error::MalformedFile(_))
    ));
}

#[test]
fn missing_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        solve_from_file(dir.path().join("missing.txt")),
        Err(Error::Io(_))
    ));
}

#[test]
fn stats() {
    let matrix = encode(
        &[vec![1, 2], vec![2, 3], vec![3, 1]],
        &Universe::with_size(3),
    )
    .unwrap();
    let mut reducer = Reducer::<DefaultSolver>::default();
    reducer.solve_ilp(&matrix).unwrap();
    let stats = reducer.stats();
    assert_eq!(stats.n_sets, 3);
    assert_eq!(stats.universe_size, 3);
    assert_eq!(stats.n_nonzeros, 6);
    assert_eq!(stats.hitting_set_size, 2);
    // optimization plus probes for elements 1 and 2
    assert_eq!(stats.n_solver_calls, 3);

    let mut reducer = solver_ties();
    reducer.solve_ilp(&matrix).unwrap();
    assert_eq!(reducer.stats().n_solver_calls, 1);
}

#[test]
fn no_sets() {
    let mut reducer = Reducer::<DefaultSolver>::default();
    assert!(reducer
        .solve_ilp(&IncidenceMatrix::new(0, 3))
        .unwrap()
        .is_empty());
    assert_eq!(reducer.stats().n_solver_calls, 0);
}

#[test]
fn options() {
    let matrix = encode(&[vec![1, 3], vec![2, 3]], &Universe::with_size(3)).unwrap();
    let mut reducer = Reducer::<DefaultSolver>::new(ReducerOptions {
        time_limit: Some(Duration::from_secs(60)),
        threads: 2,
        ..ReducerOptions::default()
    });
    assert_eq!(reducer.solve_ilp(&matrix).unwrap(), vec![3]);
}

#[derive(Clone, Default)]
struct RecordingLogger {
    entries: Arc<Mutex<Vec<String>>>,
}

impl RecordingLogger {
    fn record(&mut self, entry: String) -> Result<(), LoggerError> {
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }
}

impl WriteReductionLog for RecordingLogger {
    fn log_matrix(
        &mut self,
        n_sets: usize,
        universe_size: usize,
        n_nonzeros: usize,
    ) -> Result<(), LoggerError> {
        self.record(format!("matrix {n_sets} {universe_size} {n_nonzeros}"))
    }

    fn log_solver_call(
        &mut self,
        call: SolverCall,
        result: &SolveResult,
        _cpu_time: Duration,
    ) -> Result<(), LoggerError> {
        let status = match result {
            SolveResult::Optimal(..) => "optimal",
            SolveResult::Infeasible => "infeasible",
            _ => "other",
        };
        self.record(format!("{call}: {status}"))
    }

    fn log_tie_break(&mut self, element: usize, selected: bool) -> Result<(), LoggerError> {
        self.record(format!("tie-break {element} {selected}"))
    }

    fn log_hitting_set(&mut self, hitting_set: &[usize]) -> Result<(), LoggerError> {
        self.record(format!("hitting set {hitting_set:?}"))
    }

    fn log_message(&mut self, msg: &str) -> Result<(), LoggerError> {
        self.record(msg.to_string())
    }
}

#[test]
fn logging() {
    let logger = RecordingLogger::default();
    let mut reducer = Reducer::<DefaultSolver>::default();
    reducer.attach_logger(logger.clone());
    let matrix = encode(&[vec![1, 2, 3], vec![2, 3], vec![3]], &Universe::with_size(3)).unwrap();
    assert_eq!(reducer.solve_ilp(&matrix).unwrap(), vec![3]);
    assert_eq!(
        *logger.entries.lock().unwrap(),
        vec![
            "matrix 3 3 6",
            "optimize: optimal",
            "probe 1: infeasible",
            "tie-break 1 false",
            "probe 2: infeasible",
            "tie-break 2 false",
            "probe 3: optimal",
            "tie-break 3 true",
            "hitting set [3]",
        ]
    );

    assert!(reducer.detach_logger().is_some());
    reducer.solve_ilp(&matrix).unwrap();
    assert_eq!(logger.entries.lock().unwrap().len(), 9);
}

#[test]
fn logging_infeasible() {
    let logger = RecordingLogger::default();
    let mut reducer = Reducer::<DefaultSolver>::default();
    reducer.attach_logger(logger.clone());
    let matrix = encode(&[vec![2], Vec::new()], &Universe::with_size(2)).unwrap();
    assert!(matches!(
        reducer.solve_ilp(&matrix),
        Err(Error::Infeasible(Infeasibility::EmptySet(2)))
    ));
    assert_eq!(*logger.entries.lock().unwrap(), vec!["matrix 2 2 1"]);
}

/// A solver that builds the model in [`DefaultSolver`] but answers with scripted results
mod scripted {
    use std::{cell::RefCell, collections::VecDeque, time::Duration};

    use hsilp_core::{
        ilp::{BuildSolver, Error, IlpSolver, SolveResult, VarId},
        DefaultSolver,
    };

    type InnerBuilder = <DefaultSolver as IlpSolver>::Builder;

    thread_local! {
        static RESULTS: RefCell<VecDeque<SolveResult>> = RefCell::new(VecDeque::new());
    }

    /// Sets the results of the next solver calls on this thread
    pub fn script<I: IntoIterator<Item = SolveResult>>(results: I) {
        RESULTS.with(|res| *res.borrow_mut() = results.into_iter().collect());
    }

    pub fn remaining() -> usize {
        RESULTS.with(|res| res.borrow().len())
    }

    pub struct Solver {
        inner: DefaultSolver,
    }

    impl IlpSolver for Solver {
        type Builder = Builder;

        fn add_binary_var(&mut self, obj_coeff: f64) -> Result<VarId, Error> {
            self.inner.add_binary_var(obj_coeff)
        }

        fn add_geq_constr<I>(&mut self, terms: I, bound: f64) -> Result<(), Error>
        where
            I: IntoIterator<Item = (VarId, f64)>,
        {
            self.inner.add_geq_constr(terms, bound)
        }

        fn n_vars(&self) -> usize {
            self.inner.n_vars()
        }

        fn solve(self) -> Result<SolveResult, Error> {
            Ok(RESULTS
                .with(|res| res.borrow_mut().pop_front())
                .expect("more solver calls than scripted results"))
        }
    }

    pub struct Builder {
        inner: InnerBuilder,
    }

    impl BuildSolver for Builder {
        type Solver = Solver;

        fn new() -> Self {
            Builder {
                inner: <InnerBuilder as BuildSolver>::new(),
            }
        }

        fn init(self) -> Result<Self::Solver, Error> {
            Ok(Solver {
                inner: self.inner.init()?,
            })
        }

        fn threads(&mut self, threads: u32) -> &mut Self {
            self.inner.threads(threads);
            self
        }

        fn time_limit(&mut self, limit: Duration) -> &mut Self {
            self.inner.time_limit(limit);
            self
        }

        fn quiet(&mut self, quiet: bool) -> &mut Self {
            self.inner.quiet(quiet);
            self
        }
    }
}

fn scripted_reducer(tie_break: TieBreak) -> Reducer<scripted::Solver> {
    Reducer::new(ReducerOptions {
        tie_break,
        time_limit: Some(Duration::from_secs(5)),
        ..ReducerOptions::default()
    })
}

fn pair() -> IncidenceMatrix {
    encode(&[vec![1, 2]], &Universe::with_size(2)).unwrap()
}

#[test]
fn status_time_limit() {
    scripted::script([SolveResult::TimeLimit]);
    let mut reducer = scripted_reducer(TieBreak::Solver);
    assert!(matches!(
        reducer.solve_ilp(&pair()),
        Err(Error::Timeout(limit)) if limit == Duration::from_secs(5)
    ));
    assert_eq!(reducer.stats().n_solver_calls, 1);

    // time limit hit while breaking ties
    scripted::script([
        SolveResult::Optimal(1., vec![0., 1.]),
        SolveResult::TimeLimit,
    ]);
    let mut reducer = scripted_reducer(TieBreak::Lexicographic);
    assert!(matches!(
        reducer.solve_ilp(&pair()),
        Err(Error::Timeout(_))
    ));
    assert_eq!(reducer.stats().n_solver_calls, 2);
    assert_eq!(scripted::remaining(), 0);
}

#[test]
fn status_other() {
    scripted::script([SolveResult::Other(String::from("numerical trouble"))]);
    let mut reducer = scripted_reducer(TieBreak::Solver);
    match reducer.solve_ilp(&pair()) {
        Err(Error::Solver(msg)) => assert!(msg.contains("numerical trouble"), "{msg}"),
        res => panic!("unexpected result {res:?}"),
    }
    assert_eq!(reducer.stats().n_solver_calls, 1);
}

#[test]
fn status_infeasible() {
    scripted::script([SolveResult::Infeasible]);
    let mut reducer = scripted_reducer(TieBreak::Lexicographic);
    assert!(matches!(
        reducer.solve_ilp(&pair()),
        Err(Error::Infeasible(Infeasibility::Solver))
    ));
    assert_eq!(reducer.stats().n_solver_calls, 1);
    assert_eq!(reducer.stats().hitting_set_size, 0);
}

#[test]
fn non_integral_values() {
    scripted::script([SolveResult::Optimal(1., vec![0.5, 0.5])]);
    let mut reducer = scripted_reducer(TieBreak::Solver);
    assert!(matches!(
        reducer.solve_ilp(&pair()),
        Err(Error::Solver(_))
    ));
    assert_eq!(reducer.stats().n_solver_calls, 1);

    // value read during tie-breaking
    scripted::script([
        SolveResult::Optimal(1., vec![1., 0.]),
        SolveResult::Optimal(1., vec![0.7, 0.]),
    ]);
    let mut reducer = scripted_reducer(TieBreak::Lexicographic);
    assert!(matches!(
        reducer.solve_ilp(&pair()),
        Err(Error::Solver(_))
    ));
    assert_eq!(reducer.stats().n_solver_calls, 2);
}

#[test]
fn too_few_values() {
    scripted::script([SolveResult::Optimal(1., vec![1.])]);
    let mut reducer = scripted_reducer(TieBreak::Solver);
    assert!(matches!(
        reducer.solve_ilp(&pair()),
        Err(Error::Solver(_))
    ));
    assert_eq!(reducer.stats().n_solver_calls, 1);
}

#[test]
fn tolerated_values() {
    scripted::script([SolveResult::Optimal(1., vec![1e-7, 0.999_999])]);
    let mut reducer = scripted_reducer(TieBreak::Solver);
    assert_eq!(reducer.solve_ilp(&pair()).unwrap(), vec![2]);
    assert_eq!(reducer.stats().n_solver_calls, 1);
}

#[test]
fn scripted_tie_break() {
    // fixing element 1 is infeasible, so element 2 is selected
    scripted::script([
        SolveResult::Optimal(1., vec![1., 0.]),
        SolveResult::Infeasible,
        SolveResult::Optimal(1., vec![0., 1.]),
    ]);
    let mut reducer = scripted_reducer(TieBreak::Lexicographic);
    assert_eq!(reducer.solve_ilp(&pair()).unwrap(), vec![2]);
    assert_eq!(reducer.stats().n_solver_calls, 3);
    assert_eq!(reducer.stats().hitting_set_size, 1);
    assert_eq!(scripted::remaining(), 0);
}
