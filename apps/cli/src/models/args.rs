//! # CLI Argument Definitions
//!
//! Vendor commands (`keygen`, `issue`) and consumer commands (`install`, `view`,
//! `verify`, `uninstall`, `subject`) share one configuration file.

use chrono::{DateTime, NaiveDate};
use clap::{Parser, Subcommand};
use sigil_licensing::repository::RepositoryModel;
use std::path::PathBuf;

/// The main CLI structure parsing command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "sigil")]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Issue, install and verify signed license artifacts")]
pub struct Cli {
    /// Configuration file (defaults to an optional `sigil.toml` in the working directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Overrides the configured log level
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate a vendor keyset at the configured keyset path
    Keygen {
        /// Shared secret stored in the keyset for encrypted formats (v2, v3)
        #[arg(short, long)]
        secret: Option<String>,

        /// Replace an existing keyset
        #[arg(long)]
        force: bool,
    },
    /// Issue a license artifact
    Issue(IssueArgs),
    /// Install a license artifact
    Install {
        /// Artifact file to install
        path: PathBuf,
    },
    /// Print the installed license as JSON
    View {
        /// Verify the license before printing it
        #[arg(long)]
        verify: bool,
    },
    /// Verify the installed license
    Verify {},
    /// Remove the installed license
    Uninstall {},
    /// Print the configured subject
    Subject {},
}

#[derive(Debug, clap::Args)]
pub struct IssueArgs {
    /// Where to write the artifact
    #[arg(short, long)]
    pub output: PathBuf,

    /// Distinguished name of the holder (e.g. 'CN=Acme Corp')
    #[arg(long)]
    pub holder: Option<String>,

    /// Distinguished name of the issuer (defaults to 'CN=<subject>')
    #[arg(long)]
    pub issuer: Option<String>,

    /// Licensed subject (defaults to the configured subject)
    #[arg(long)]
    pub subject: Option<String>,

    /// Consumer type counted by the license (defaults to 'User')
    #[arg(long)]
    pub consumer_type: Option<String>,

    /// Number of consumers admitted
    #[arg(long)]
    pub consumers: Option<u32>,

    /// Start of validity (YYYY-MM-DD or RFC 3339)
    #[arg(long, value_parser = parse_instant)]
    pub not_before: Option<i64>,

    /// End of validity (YYYY-MM-DD or RFC 3339)
    #[arg(long, value_parser = parse_instant, conflicts_with = "days")]
    pub not_after: Option<i64>,

    /// Validity in days, counted from --not-before or now
    #[arg(short, long)]
    pub days: Option<u32>,

    /// Free-form note
    #[arg(long)]
    pub info: Option<String>,

    /// Custom attribute, repeatable (KEY=VALUE)
    #[arg(short, long = "attr", value_parser = parse_key_value)]
    pub attributes: Vec<(String, String)>,

    /// Artifact format (v1, v2, v3); defaults to the configured version
    #[arg(short, long)]
    pub model: Option<RepositoryModel>,
}

fn parse_instant(value: &str) -> Result<i64, String> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .ok_or_else(|| format!("invalid date '{value}'"));
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.timestamp())
        .map_err(|e| format!("expected YYYY-MM-DD or RFC 3339, got '{value}': {e}"))
}

fn parse_key_value(value: &str) -> Result<(String, String), String> {
    value
        .split_once('=')
        .map(|(k, v)| (k.trim().to_owned(), v.to_owned()))
        .ok_or_else(|| format!("expected KEY=VALUE, got '{value}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn instants_accept_dates_and_rfc3339() {
        assert_eq!(parse_instant("2024-01-01"), Ok(1_704_067_200));
        assert_eq!(parse_instant("2024-01-01T00:00:10Z"), Ok(1_704_067_210));
        assert!(parse_instant("yesterday").is_err());
    }

    #[test]
    fn attributes_split_on_first_equals() {
        assert_eq!(parse_key_value("tier=a=b"), Ok(("tier".to_owned(), "a=b".to_owned())));
        assert!(parse_key_value("tier").is_err());
    }

    #[test]
    fn issue_parses_model_and_attributes() {
        let cli = Cli::try_parse_from([
            "sigil", "issue", "-o", "out.lic", "--model", "v3", "--attr", "edition=pro",
        ])
        .unwrap();
        let Commands::Issue(args) = cli.command else { panic!("expected issue") };
        assert_eq!(args.model, Some(RepositoryModel::V3));
        assert_eq!(args.attributes, vec![("edition".to_owned(), "pro".to_owned())]);
    }
}
