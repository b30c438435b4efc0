//! CLI argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::OutputFormat;

/// Reads, validates and inspects SAML 2.0 assertions.
#[derive(Debug, Parser)]
#[command(name = "saml2")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (TOML).
    #[arg(short, long, env = "SAML2_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format (overrides config).
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Read an assertion without verifying it and print a summary.
    Read {
        /// File holding the assertion XML.
        file: PathBuf,
    },

    /// Run the full validation pipeline and print the resulting claims.
    Validate(ValidateArgs),

    /// Decode a serialized actor document.
    Actor {
        /// File holding the actor XML.
        file: PathBuf,

        /// Issuer stamped on the decoded claims.
        #[arg(long, default_value = "LOCAL AUTHORITY")]
        issuer: String,
    },
}

/// Arguments of `saml2 validate`.
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// File holding the signed assertion XML.
    pub file: PathBuf,

    /// Trusted certificate or public key (PEM file). Repeatable.
    #[arg(long = "key", value_name = "PEM")]
    pub keys: Vec<PathBuf>,

    /// Trusted shared secret (base64). Repeatable.
    #[arg(long = "secret", value_name = "B64")]
    pub secrets: Vec<String>,

    /// Accepted issuer. Repeatable; adds to the configured issuers.
    #[arg(long = "issuer")]
    pub issuers: Vec<String>,

    /// Accepted audience. Repeatable; adds to the configured audiences.
    #[arg(long = "audience")]
    pub audiences: Vec<String>,

    /// Skip the issuer check.
    #[arg(long)]
    pub no_issuer: bool,

    /// Skip the audience check.
    #[arg(long)]
    pub no_audience: bool,

    /// Skip the lifetime check.
    #[arg(long)]
    pub no_lifetime: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    /// Tests that the argument definitions are consistent.
    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    /// Tests that repeatable validate options collect.
    #[test]
    fn test_parse_validate() {
        let cli = Cli::parse_from([
            "saml2",
            "validate",
            "token.xml",
            "--key",
            "idp.pem",
            "--secret",
            "c2VjcmV0",
            "--audience",
            "https://sp.example.com",
            "--audience",
            "https://sp2.example.com",
            "--no-lifetime",
            "-o",
            "json",
        ]);
        let Command::Validate(args) = cli.command else {
            panic!("expected validate");
        };
        assert_eq!(args.keys, vec![PathBuf::from("idp.pem")]);
        assert_eq!(args.secrets, vec!["c2VjcmV0".to_string()]);
        assert_eq!(args.audiences.len(), 2);
        assert!(args.no_lifetime);
        assert!(!args.no_issuer);
        assert!(matches!(cli.output, Some(OutputFormat::Json)));
    }

    /// Tests the default issuer of decoded actors.
    #[test]
    fn test_actor_issuer_default() {
        let cli = Cli::parse_from(["saml2", "actor", "actor.xml"]);
        match cli.command {
            Command::Actor { issuer, .. } => assert_eq!(issuer, "LOCAL AUTHORITY"),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
