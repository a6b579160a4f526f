//! zizmor-action binary entry point.

// The launcher owns the process's stdout and stderr.
#![allow(clippy::print_stdout, clippy::print_stderr)]

use clap::Parser;
use std::io;
use zizmor_action::cli::Cli;
use zizmor_action::tracing::init_tracing;
use zizmor_action::{EXIT_BOOTSTRAP_FAILURE, report, run};
use zizmor_action_core::workflow::{Annotations, RunnerEnvironment};

fn main() {
    let runner = RunnerEnvironment::from_env();
    let mut annotations = Annotations::new(io::stdout(), runner.debug);

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help and --version
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let rendered = e.render().to_string();
            let _ = annotations.error(rendered.lines().next().unwrap_or_default());
            eprint!("{}", e.render().ansi());
            std::process::exit(EXIT_BOOTSTRAP_FAILURE);
        }
    };

    if let Err(e) = init_tracing(cli.tracing_config()) {
        let _ = annotations.error(&e.to_string());
        eprintln!("{e:?}");
        std::process::exit(EXIT_BOOTSTRAP_FAILURE);
    }

    let code = match run(
        &cli,
        &runner,
        &mut annotations,
        &mut io::stdout(),
        &mut io::stderr(),
    ) {
        Ok(code) => code,
        Err(err) => {
            report(&mut annotations, &mut io::stderr(), err);
            EXIT_BOOTSTRAP_FAILURE
        }
    };

    std::process::exit(code);
}
