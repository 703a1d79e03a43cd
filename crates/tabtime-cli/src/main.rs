use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tabtime_cli::commands::{check, report, util};
use tabtime_cli::{Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    match &cli.command {
        Some(Commands::Report(args)) => {
            let warnings = report::run(&mut std::io::stdout().lock(), args, &config)?;
            util::emit_warnings(
                &mut std::io::stderr().lock(),
                &warnings,
                args.strict || config.strict,
            )?;
        }
        Some(Commands::Check(args)) => {
            let warnings = check::run(&mut std::io::stdout().lock(), args)?;
            util::emit_warnings(
                &mut std::io::stderr().lock(),
                &warnings,
                args.strict || config.strict,
            )?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
