use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::{handle_check, handle_config, handle_fix, handle_init, CheckArgs};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Check {
            path,
            prod,
            format,
            output,
            licenses,
            fail_on,
            fail_on_missing,
            whitelist,
        } => handle_check(
            CheckArgs {
                path,
                prod,
                format,
                output,
                licenses,
                fail_on,
                fail_on_missing,
                whitelist,
            },
            cli.quiet,
            cli.verbose,
        ),
        Commands::Init {
            preset,
            output,
            force,
        } => handle_init(preset, output, force, cli.quiet),
        Commands::Fix {
            path,
            prod,
            dry_run,
            whitelist,
        } => handle_fix(path, prod, dry_run, whitelist, cli.quiet),
        Commands::Config { show, validate } => handle_config(show, validate, cli.quiet),
    };

    match result {
        Ok(status) => ExitCode::from(status.code()),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins; otherwise warnings only, or everything with `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
