use std::env;
use std::io;

use brainfuck::commands::run::{self, RunArgs};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "brainfuck", disable_help_flag = true)]
struct Cli {
    #[command(flatten)]
    run: RunArgs,
}

/// Logs go to stderr so stdout carries only program output.
/// `RUST_LOG` overrides the default `warn` filter.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    // We still pull the program name for help rendering consistency
    let program = env::args().next().unwrap_or_else(|| String::from("brainfuck"));

    init_logging();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            eprint!("{e}");
            run::usage_and_exit(&program, 2);
        }
    };

    let code = run::run(&program, cli.run);
    std::process::exit(code);
}
