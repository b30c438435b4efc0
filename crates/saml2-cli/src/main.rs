//! # saml2
//!
//! Entry point of the SAML 2.0 assertion tool.

#![forbid(unsafe_code)]

use clap::Parser;
use saml2_cli::{
    cli::{Cli, Command},
    commands::{run_actor, run_read, run_validate},
    config::CliConfig,
    output::error,
    CliResult,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_level.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(cli) {
        error(&e.code(), &e.to_string());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let config = CliConfig::load(cli.config.as_deref())?;
    let format = cli.output.unwrap_or(config.output_format);

    match cli.command {
        Command::Read { file } => run_read(&file, &config, format),
        Command::Validate(args) => run_validate(&args, &config, format),
        Command::Actor { file, issuer } => run_actor(&file, &issuer, format),
    }
}
