//! Command-line interface for name-reconciler.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **reconcile**: Match every variant name in one table to a reference list
//! - **compare**: Score a single pair of names and show the breakdown
//! - **serve**: Start the interactive web interface
//!
//! ## Usage
//!
//! ```text
//! # Reconcile a spreadsheet of variant names against a master list
//! name-reconciler reconcile yuragi.xlsx master.xlsx
//!
//! # Different columns, custom weights, xlsx output
//! name-reconciler reconcile variants.csv master.csv \
//!     --variant-field name --reference-field canonical \
//!     --char-weight 0.6 --token-weight 0.4 --output result.xlsx
//!
//! # JSON output for scripting
//! name-reconciler --format json reconcile yuragi.xlsx master.xlsx
//!
//! # Why did these two names score the way they did?
//! name-reconciler compare "Sony ProductB" "Sony Product B"
//!
//! # Start web UI
//! name-reconciler serve --port 8080 --open
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod compare;
pub mod reconcile;

#[derive(Parser)]
#[command(name = "name-reconciler")]
#[command(version)]
#[command(about = "Match messy product names to a canonical master list")]
#[command(
    long_about = "name-reconciler resolves inconsistently written names (typos, full-width characters, reordered words) to the closest entry of a canonical list.\n\nEach variant is scored against every reference with a hybrid of:\n- Character similarity (Indel ratio, 2 x common subsequence / total length)\n- Token similarity (Jaccard over space/slash separated words)\n\nThe best-scoring reference is reported with all three scores."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output (one debug line per match)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Also write the log to this file (without colors)
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Match each variant name to its closest reference name
    Reconcile(reconcile::ReconcileArgs),

    /// Score one variant name against one reference name
    Compare(compare::CompareArgs),

    /// Start the web server
    Serve(ServeArgs),
}

#[derive(clap::Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    pub port: u16,

    /// Address to bind to
    #[arg(short, long, default_value = "127.0.0.1")]
    pub address: String,

    /// Open browser automatically
    #[arg(long)]
    pub open: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Parse a scoring weight: any finite, non-negative number
pub(crate) fn parse_weight(s: &str) -> Result<f64, String> {
    let weight: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a number"))?;

    if !weight.is_finite() || weight < 0.0 {
        return Err(format!("weight must be a finite number >= 0, got {s}"));
    }
    Ok(weight)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_weight() {
        assert_eq!(parse_weight("0.7"), Ok(0.7));
        assert_eq!(parse_weight("1"), Ok(1.0));
        assert!(parse_weight("-0.1").is_err());
        assert!(parse_weight("NaN").is_err());
        assert!(parse_weight("inf").is_err());
        assert!(parse_weight("heavy").is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "name-reconciler",
            "compare",
            "a",
            "b",
            "--format",
            "json",
            "--verbose",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.format, OutputFormat::Json));
        assert!(matches!(cli.command, Commands::Compare(_)));
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["name-reconciler", "-v", "-q", "compare", "a", "b"]).is_err());
    }
}
