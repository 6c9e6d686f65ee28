//! # Command Line Interface for the Solver Binary

use std::io::Error as IOError;
use std::path::PathBuf;
use std::time::Duration;
use std::{
    fmt::{self},
    io::Write,
};

use clap::{crate_name, crate_version, error::ErrorKind, Args, Parser};
use cpu_time::ProcessTime;
use hsilp_core::{
    ilp::SolveResult, LoggerError, ReducerOptions, SolverCall, Stats, TieBreak,
    WriteReductionLog,
};
use termcolor::{Buffer, BufferWriter, Color, ColorSpec, WriteColor};

macro_rules! none_if_zero {
    ($val:expr) => {
        if $val == 0. {
            None
        } else {
            Some($val)
        }
    };
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// The incidence matrix file to solve
    input_file: PathBuf,
    /// The file to write the minimum hitting set to
    output_file: PathBuf,
    #[command(flatten)]
    reducer: ReducerArgs,
    #[command(flatten)]
    log: LogArgs,
}

#[derive(Args)]
struct ReducerArgs {
    /// How to choose among multiple minimum hitting sets
    #[arg(long, value_enum, default_value_t = TieBreak::default())]
    tie_break: TieBreak,
    /// Limit the wall-clock time of each ILP solver call in seconds (0 is no limit)
    #[arg(long, default_value_t = 0., value_parser = parse_seconds)]
    time_limit: f64,
    /// The number of threads the ILP solver may use
    #[arg(long, default_value_t = 1)]
    threads: u32,
    /// Show the output of the ILP solver
    #[arg(long)]
    solver_output: bool,
}

fn parse_seconds(s: &str) -> Result<f64, String> {
    let secs: f64 = s.parse().map_err(|err| format!("{err}"))?;
    if !secs.is_finite() || secs < 0. {
        return Err(String::from("expected a non-negative number of seconds"));
    }
    // values accepted here are converted with `Duration::from_secs_f64`
    Duration::try_from_secs_f64(secs).map_err(|err| format!("{err}"))?;
    Ok(secs)
}

impl From<&ReducerArgs> for ReducerOptions {
    fn from(args: &ReducerArgs) -> Self {
        ReducerOptions {
            tie_break: args.tie_break,
            time_limit: none_if_zero!(args.time_limit).map(Duration::from_secs_f64),
            threads: args.threads,
            solver_output: args.solver_output,
        }
    }
}

#[derive(Args)]
struct LogArgs {
    #[command(flatten)]
    color: concolor_clap::Color,
    /// Print the solver configuration
    #[arg(long)]
    print_solver_config: bool,
    /// Don't print statistics
    #[arg(long)]
    no_print_stats: bool,
    /// Verbosity of the solver output
    #[arg(short, long, default_value_t = 0)]
    verbosity: u8,
    /// Log the dimensions of the incidence matrix
    #[arg(long)]
    log_matrix: bool,
    /// Log ILP solver calls
    #[arg(long)]
    log_solver_calls: bool,
    /// Log tie-breaking decisions
    #[arg(long)]
    log_tie_breaks: bool,
}

impl From<&LogArgs> for LoggerConfig {
    fn from(args: &LogArgs) -> Self {
        LoggerConfig {
            log_matrix: args.log_matrix || args.verbosity >= 1,
            log_solver_calls: args.log_solver_calls || args.verbosity >= 2,
            log_tie_breaks: args.log_tie_breaks || args.verbosity >= 2,
            log_hitting_set: args.verbosity >= 1,
        }
    }
}

pub struct Cli {
    pub input_file: PathBuf,
    pub output_file: PathBuf,
    pub options: ReducerOptions,
    stdout: BufferWriter,
    stderr: BufferWriter,
    print_solver_config: bool,
    print_stats: bool,
    color: concolor_clap::Color,
    logger_config: LoggerConfig,
}

impl Cli {
    pub fn init() -> Self {
        let args = match CliArgs::try_parse() {
            Ok(args) => args,
            Err(err) => match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),
                _ => {
                    let _ = err.print();
                    eprintln!(
                        "received arguments: {:?}",
                        std::env::args().skip(1).collect::<Vec<_>>()
                    );
                    std::process::exit(2)
                }
            },
        };
        Cli {
            input_file: args.input_file,
            output_file: args.output_file,
            options: (&args.reducer).into(),
            stdout: BufferWriter::stdout(color_choice(args.log.color, atty::Stream::Stdout)),
            stderr: BufferWriter::stderr(color_choice(args.log.color, atty::Stream::Stderr)),
            print_solver_config: args.log.print_solver_config,
            print_stats: !args.log.no_print_stats,
            color: args.log.color,
            logger_config: (&args.log).into(),
        }
    }

    pub fn new_cli_logger(&self) -> CliLogger {
        CliLogger {
            stdout: BufferWriter::stdout(color_choice(self.color, atty::Stream::Stdout)),
            config: self.logger_config.clone(),
        }
    }

    pub fn warning(&self, msg: &str) -> Result<(), IOError> {
        let mut buffer = self.stderr.buffer();
        buffer.set_color(ColorSpec::new().set_bold(true).set_fg(Some(Color::Yellow)))?;
        write!(buffer, "warning")?;
        buffer.reset()?;
        buffer.set_color(ColorSpec::new().set_bold(true))?;
        write!(buffer, ": ")?;
        buffer.reset()?;
        writeln!(buffer, "{}", msg)?;
        self.stderr.print(&buffer)?;
        Ok(())
    }

    pub fn error(&self, msg: &str) -> Result<(), IOError> {
        let mut buffer = self.stderr.buffer();
        buffer.set_color(ColorSpec::new().set_bold(true).set_fg(Some(Color::Red)))?;
        write!(buffer, "error")?;
        buffer.reset()?;
        buffer.set_color(ColorSpec::new().set_bold(true))?;
        write!(buffer, ": ")?;
        buffer.reset()?;
        writeln!(buffer, "{}", msg)?;
        self.stderr.print(&buffer)?;
        Ok(())
    }

    pub fn info(&self, msg: &str) -> Result<(), IOError> {
        let mut buffer = self.stdout.buffer();
        buffer.set_color(ColorSpec::new().set_bold(true).set_fg(Some(Color::Blue)))?;
        write!(buffer, "info")?;
        buffer.reset()?;
        buffer.set_color(ColorSpec::new().set_bold(true))?;
        write!(buffer, ": ")?;
        buffer.reset()?;
        writeln!(buffer, "{}", msg)?;
        self.stdout.print(&buffer)?;
        Ok(())
    }

    pub fn print_header(&self) -> Result<(), IOError> {
        let mut buffer = self.stdout.buffer();
        buffer.set_color(ColorSpec::new().set_bold(true).set_fg(Some(Color::Green)))?;
        write!(buffer, "{}", crate_name!())?;
        buffer.reset()?;
        buffer.set_color(ColorSpec::new().set_bold(true))?;
        writeln!(buffer, " ({})", crate_version!())?;
        buffer.reset()?;
        write!(buffer, "ilp solver: ")?;
        buffer.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        writeln!(buffer, "{}", ILP_SOLVER)?;
        buffer.reset()?;
        buffer.set_color(ColorSpec::new().set_bold(true))?;
        write!(buffer, "==============================")?;
        buffer.reset()?;
        writeln!(buffer)?;
        self.stdout.print(&buffer)?;
        Ok(())
    }

    pub fn print_solver_config(&self) -> Result<(), IOError> {
        if self.print_solver_config {
            let mut buffer = self.stdout.buffer();
            Self::start_block(&mut buffer)?;
            buffer.set_color(ColorSpec::new().set_bold(true).set_fg(Some(Color::Blue)))?;
            write!(buffer, "Solver Config")?;
            buffer.reset()?;
            buffer.set_color(ColorSpec::new().set_bold(true))?;
            writeln!(buffer, ": ")?;
            buffer.reset()?;
            Self::print_parameter(&mut buffer, "tie-break", self.options.tie_break)?;
            Self::print_parameter(
                &mut buffer,
                "time-limit",
                OptVal::new(self.options.time_limit.map(DurPrinter::new)),
            )?;
            Self::print_parameter(&mut buffer, "threads", self.options.threads)?;
            Self::print_parameter(&mut buffer, "solver-output", self.options.solver_output)?;
            Self::end_block(&mut buffer)?;
            self.stdout.print(&buffer)?;
        }
        Ok(())
    }

    pub fn print_hitting_set(&self, hitting_set: &[usize]) -> Result<(), IOError> {
        let mut buffer = self.stdout.buffer();
        Self::start_block(&mut buffer)?;
        buffer.set_color(ColorSpec::new().set_bold(true).set_fg(Some(Color::Blue)))?;
        write!(buffer, "Minimum Hitting Set")?;
        buffer.set_color(ColorSpec::new().set_bold(true))?;
        writeln!(buffer, ": ")?;
        buffer.reset()?;
        Self::print_parameter(&mut buffer, "size", hitting_set.len())?;
        writeln!(buffer, "{:?}", hitting_set)?;
        Self::end_block(&mut buffer)?;
        self.stdout.print(&buffer)?;
        Ok(())
    }

    pub fn print_stats(&self, stats: Stats) -> Result<(), IOError> {
        if self.print_stats {
            let mut buffer = self.stdout.buffer();
            Self::start_block(&mut buffer)?;
            buffer.set_color(ColorSpec::new().set_bold(true).set_fg(Some(Color::Blue)))?;
            write!(buffer, "Solver Stats")?;
            buffer.reset()?;
            buffer.set_color(ColorSpec::new().set_bold(true))?;
            writeln!(buffer, ": ")?;
            buffer.reset()?;
            Self::print_parameter(&mut buffer, "n-sets", stats.n_sets)?;
            Self::print_parameter(&mut buffer, "universe-size", stats.universe_size)?;
            Self::print_parameter(&mut buffer, "n-nonzeros", stats.n_nonzeros)?;
            Self::print_parameter(&mut buffer, "n-solver-calls", stats.n_solver_calls)?;
            Self::print_parameter(
                &mut buffer,
                "cpu-solve-time",
                DurPrinter::new(stats.solve_time),
            )?;
            Self::print_parameter(&mut buffer, "hitting-set-size", stats.hitting_set_size)?;
            Self::print_parameter(
                &mut buffer,
                "cpu-time",
                DurPrinter::new(ProcessTime::now().as_duration()),
            )?;
            Self::end_block(&mut buffer)?;
            self.stdout.print(&buffer)?;
        }
        Ok(())
    }

    fn print_parameter<V: fmt::Display>(
        buffer: &mut Buffer,
        name: &str,
        val: V,
    ) -> Result<(), IOError> {
        buffer.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
        write!(buffer, "{}", name)?;
        buffer.reset()?;
        writeln!(buffer, ": {}", val)?;
        Ok(())
    }

    fn start_block(buffer: &mut Buffer) -> Result<(), IOError> {
        buffer.set_color(ColorSpec::new().set_dimmed(true))?;
        write!(buffer, ">>>>>")?;
        buffer.reset()?;
        writeln!(buffer)?;
        Ok(())
    }

    fn end_block(buffer: &mut Buffer) -> Result<(), IOError> {
        buffer.set_color(ColorSpec::new().set_dimmed(true))?;
        write!(buffer, "<<<<<")?;
        buffer.reset()?;
        writeln!(buffer)?;
        Ok(())
    }
}

#[cfg(feature = "highs")]
const ILP_SOLVER: &str = "highs";
#[cfg(all(feature = "gurobi", not(feature = "highs")))]
const ILP_SOLVER: &str = "gurobi";

fn color_choice(color: concolor_clap::Color, stream: atty::Stream) -> termcolor::ColorChoice {
    match color.color {
        concolor_clap::ColorChoice::Always => termcolor::ColorChoice::Always,
        concolor_clap::ColorChoice::Never => termcolor::ColorChoice::Never,
        concolor_clap::ColorChoice::Auto => {
            if atty::is(stream) {
                termcolor::ColorChoice::Auto
            } else {
                termcolor::ColorChoice::Never
            }
        }
    }
}

#[derive(Clone)]
struct LoggerConfig {
    log_matrix: bool,
    log_solver_calls: bool,
    log_tie_breaks: bool,
    log_hitting_set: bool,
}

pub struct CliLogger {
    stdout: BufferWriter,
    config: LoggerConfig,
}

impl WriteReductionLog for CliLogger {
    fn log_matrix(
        &mut self,
        n_sets: usize,
        universe_size: usize,
        n_nonzeros: usize,
    ) -> Result<(), LoggerError> {
        if self.config.log_matrix {
            let mut buffer = self.stdout.buffer();
            buffer.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)))?;
            write!(buffer, "incidence matrix")?;
            buffer.reset()?;
            writeln!(
                buffer,
                ": n-sets: {}; universe-size: {}; n-nonzeros: {}",
                n_sets, universe_size, n_nonzeros
            )?;
            self.stdout.print(&buffer)?;
        }
        Ok(())
    }

    fn log_solver_call(
        &mut self,
        call: SolverCall,
        result: &SolveResult,
        cpu_time: Duration,
    ) -> Result<(), LoggerError> {
        if self.config.log_solver_calls {
            let mut buffer = self.stdout.buffer();
            buffer.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)))?;
            write!(buffer, "ilp solver call")?;
            buffer.reset()?;
            writeln!(
                buffer,
                ": purpose: {}; result: {}; duration: {}; cpu-time: {}",
                call,
                result,
                DurPrinter::new(cpu_time),
                DurPrinter::new(ProcessTime::now().as_duration()),
            )?;
            self.stdout.print(&buffer)?;
        }
        Ok(())
    }

    fn log_tie_break(&mut self, element: usize, selected: bool) -> Result<(), LoggerError> {
        if self.config.log_tie_breaks {
            let mut buffer = self.stdout.buffer();
            buffer.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
            write!(buffer, "tie-break")?;
            buffer.reset()?;
            writeln!(
                buffer,
                ": element: {}; {}",
                element,
                if selected { "selected" } else { "excluded" }
            )?;
            self.stdout.print(&buffer)?;
        }
        Ok(())
    }

    fn log_hitting_set(&mut self, hitting_set: &[usize]) -> Result<(), LoggerError> {
        if self.config.log_hitting_set {
            let mut buffer = self.stdout.buffer();
            buffer.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
            write!(buffer, "hitting set")?;
            buffer.reset()?;
            writeln!(
                buffer,
                ": size: {}; elements: {}; cpu-time: {}",
                hitting_set.len(),
                VecPrinter::new(hitting_set),
                DurPrinter::new(ProcessTime::now().as_duration()),
            )?;
            self.stdout.print(&buffer)?;
        }
        Ok(())
    }

    fn log_message(&mut self, msg: &str) -> Result<(), LoggerError> {
        let mut buffer = self.stdout.buffer();
        writeln!(buffer, "{}", msg)?;
        self.stdout.print(&buffer)?;
        Ok(())
    }
}

struct OptVal<T> {
    val: Option<T>,
}

impl<T> OptVal<T> {
    fn new(val: Option<T>) -> Self {
        OptVal { val }
    }
}

impl<T: fmt::Display> fmt::Display for OptVal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.val {
            Some(t) => fmt::Display::fmt(&t, f),
            None => write!(f, "none"),
        }
    }
}

struct VecPrinter<'a, C>
where
    C: 'a,
{
    elems: &'a [C],
}

impl<'a, C> VecPrinter<'a, C> {
    fn new(elems: &'a [C]) -> Self {
        VecPrinter { elems }
    }
}

impl<C: fmt::Display> fmt::Display for VecPrinter<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (idx, elem) in self.elems.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", elem)?;
        }
        write!(f, ")")
    }
}

struct DurPrinter {
    dur: Duration,
}

impl DurPrinter {
    fn new(dur: Duration) -> Self {
        Self { dur }
    }
}

impl fmt::Display for DurPrinter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.dur)
    }
}

#[test]
fn verify_cli_args() {
    use clap::CommandFactory;
    CliArgs::command().debug_assert()
}

#[test]
fn reducer_options() {
    let args = CliArgs::try_parse_from(["hsilp", "in.txt", "out.txt"]).unwrap();
    assert_eq!(ReducerOptions::from(&args.reducer), ReducerOptions::default());

    let args = CliArgs::try_parse_from([
        "hsilp",
        "--tie-break",
        "solver",
        "--time-limit",
        "2.5",
        "--threads",
        "4",
        "in.txt",
        "out.txt",
    ])
    .unwrap();
    let opts = ReducerOptions::from(&args.reducer);
    assert_eq!(opts.tie_break, TieBreak::Solver);
    assert_eq!(opts.time_limit, Some(Duration::from_millis(2500)));
    assert_eq!(opts.threads, 4);
}

#[test]
fn large_time_limit() {
    let args = CliArgs::try_parse_from(["hsilp", "--time-limit", "1e9", "in.txt", "out.txt"])
        .unwrap();
    assert_eq!(
        ReducerOptions::from(&args.reducer).time_limit,
        Some(Duration::from_secs(1_000_000_000))
    );
}

#[test]
fn positional_args_required() {
    assert!(CliArgs::try_parse_from(["hsilp"]).is_err());
    assert!(CliArgs::try_parse_from(["hsilp", "in.txt"]).is_err());
    assert!(CliArgs::try_parse_from(["hsilp", "in.txt", "out.txt", "extra"]).is_err());
}

#[test]
fn invalid_time_limit() {
    for limit in ["inf", "NaN", "abc", "-1", "1e300", "18446744073709551616"] {
        assert!(
            CliArgs::try_parse_from(["hsilp", "--time-limit", limit, "in.txt", "out.txt"])
                .is_err(),
            "accepted time limit `{limit}`"
        );
    }
}
