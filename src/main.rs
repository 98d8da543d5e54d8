//! Command-line interface for the cffgen binary.
//!
//! A thin wrapper around the library: parses arguments, builds the platform
//! and registry clients, assembles the citation document and writes it to
//! the requested path.

use std::{path::PathBuf, process};

use cffgen::{
    Error, GithubPlatform, OrcidRegistry, ResolverConfig, assemble_citation, write_citation,
};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Command line interface for generating CITATION.cff files.
#[derive(Debug, Parser)]
#[command(name = "cffgen", version, about = "Assemble CITATION.cff metadata for a GitHub repository")]
struct Cli {
    /// GitHub account that owns the repository.
    owner: String,

    /// Repository name.
    repository: String,

    /// Destination path for the generated citation file.
    #[arg(long = "output", value_name = "PATH", default_value = "CITATION.cff")]
    output: PathBuf,

    /// GitHub token used for authenticated API requests.
    #[arg(long = "token", env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>
}

/// Entry point that reports errors and sets the appropriate exit status.
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(error) = run().await {
        eprintln!("{}", error.to_display_string());
        process::exit(1);
    }
}

/// Executes the CLI using parsed arguments.
///
/// # Errors
///
/// Propagates errors originating from client construction, assembly and
/// output writing.
async fn run() -> Result<(), Error> {
    let cli = Cli::parse();

    let platform = GithubPlatform::new(cli.token.as_deref())?;
    let registry = OrcidRegistry::new()?;
    let config = ResolverConfig::default();

    let document =
        assemble_citation(&platform, &registry, &cli.owner, &cli.repository, &config).await?;
    write_citation(&cli.output, &document)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Cli;

    #[test]
    fn cli_parses_positional_arguments() {
        let cli = Cli::try_parse_from([env!("CARGO_PKG_NAME"), "octocat", "hello-world"])
            .expect("failed to parse CLI");

        assert_eq!(cli.owner, "octocat");
        assert_eq!(cli.repository, "hello-world");
        assert_eq!(cli.output.to_str(), Some("CITATION.cff"));
    }

    #[test]
    fn cli_accepts_output_override() {
        let cli = Cli::try_parse_from([
            env!("CARGO_PKG_NAME"),
            "octocat",
            "hello-world",
            "--output",
            "out/CITATION.cff",
        ])
        .expect("failed to parse CLI");

        assert_eq!(cli.output.to_str(), Some("out/CITATION.cff"));
    }

    #[test]
    fn cli_requires_both_positional_arguments() {
        let result = Cli::try_parse_from([env!("CARGO_PKG_NAME"), "octocat"]);
        assert!(result.is_err(), "repository argument must be required");
    }
}
