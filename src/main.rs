use std::fs;

use hsilp_core::{DefaultSolver, Reducer};

mod cli;
use cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::init();

    if let Err(err) = sub_main(&cli) {
        cli.error(&format!("{err:#}"))?;
        std::process::exit(1);
    }

    Ok(())
}

fn sub_main(cli: &Cli) -> anyhow::Result<()> {
    cli.print_header()?;
    cli.print_solver_config()?;

    cli.info(&format!("solving instance {:?}", cli.input_file))?;
    if cli.output_file.exists() {
        cli.warning(&format!(
            "output file {:?} exists and will be overwritten",
            cli.output_file
        ))?;
    }

    let mut reducer = Reducer::<DefaultSolver>::new(cli.options);
    reducer.attach_logger(cli.new_cli_logger());
    let hitting_set = reducer.solve_file(&cli.input_file)?;

    cli.print_hitting_set(&hitting_set)?;
    cli.print_stats(reducer.stats())?;

    // only written after solving succeeded
    fs::write(&cli.output_file, format!("{hitting_set:?}")).map_err(|err| {
        anyhow::anyhow!("failed to write output file {:?}: {err}", cli.output_file)
    })?;
    cli.info(&format!("wrote hitting set to {:?}", cli.output_file))?;

    Ok(())
}
