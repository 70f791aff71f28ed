use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::cli::{parse_weight, OutputFormat};
use crate::core::table::RecordTable;
use crate::export::format_score;
use crate::export::xlsx::write_results_xlsx;
use crate::matching::engine::{ScoringWeights, DEFAULT_CHAR_WEIGHT, DEFAULT_TOKEN_WEIGHT};
use crate::matching::progress::TracingProgress;
use crate::matching::reconcile::{
    reconcile, reconcile_parallel, MatchResult, ReconcileConfig, DEFAULT_FIELD,
};
use crate::parsing::{load_table, TableFormat, TableOptions};

#[derive(Args)]
pub struct ReconcileArgs {
    /// Table of variant names (xlsx, xls, ods, csv, or tsv)
    #[arg(required = true)]
    pub variants: PathBuf,

    /// Table of canonical reference names (xlsx, xls, ods, csv, or tsv)
    #[arg(required = true)]
    pub references: PathBuf,

    /// Worksheet to read from the variant workbook (first sheet by default)
    #[arg(long)]
    pub variant_sheet: Option<String>,

    /// Worksheet to read from the reference workbook (first sheet by default)
    #[arg(long)]
    pub reference_sheet: Option<String>,

    /// 0-based row holding the column names in both inputs
    #[arg(long, default_value = "0")]
    pub header_row: usize,

    /// Column holding the names in the variant table
    #[arg(long, default_value = DEFAULT_FIELD)]
    pub variant_field: String,

    /// Column holding the names in the reference table
    #[arg(long, default_value = DEFAULT_FIELD)]
    pub reference_field: String,

    /// Weight of the character-level similarity
    #[arg(long, default_value_t = DEFAULT_CHAR_WEIGHT, value_parser = parse_weight)]
    pub char_weight: f64,

    /// Weight of the token-level similarity
    #[arg(long, default_value_t = DEFAULT_TOKEN_WEIGHT, value_parser = parse_weight)]
    pub token_weight: f64,

    /// Also write the results to this xlsx file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Match variants on all CPU cores
    #[arg(long)]
    pub parallel: bool,

    /// Input format for both files (detected from the extension by default)
    #[arg(long, value_enum)]
    pub input_format: Option<TableFormat>,
}

impl ReconcileArgs {
    fn config(&self) -> ReconcileConfig {
        ReconcileConfig {
            variant_field: self.variant_field.clone(),
            reference_field: self.reference_field.clone(),
            weights: ScoringWeights::new(self.char_weight, self.token_weight),
        }
    }

    fn table_options(&self, sheet: Option<&String>) -> TableOptions {
        TableOptions {
            sheet: sheet.cloned(),
            header_row: self.header_row,
            format: self.input_format,
        }
    }
}

/// Execute reconcile subcommand
///
/// # Errors
///
/// Returns an error if either input cannot be read, a comparison column is
/// missing, or the output file cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: ReconcileArgs, format: OutputFormat) -> anyhow::Result<()> {
    let variants = load_table(
        &args.variants,
        &args.table_options(args.variant_sheet.as_ref()),
    )
    .with_context(|| format!("Failed to read variants from {}", args.variants.display()))?;

    let references = load_table(
        &args.references,
        &args.table_options(args.reference_sheet.as_ref()),
    )
    .with_context(|| {
        format!(
            "Failed to read references from {}",
            args.references.display()
        )
    })?;

    if references.is_empty() {
        tracing::warn!("Reference table is empty; no variant can be matched");
    }

    let config = args.config();
    let progress = TracingProgress::new();
    let results = if args.parallel {
        reconcile_parallel(&variants, &references, &config, &progress)?
    } else {
        reconcile(&variants, &references, &config, &progress)?
    };

    if let Some(path) = &args.output {
        write_results_xlsx(&results, path)
            .with_context(|| format!("Failed to write results to {}", path.display()))?;
    }

    match format {
        OutputFormat::Text => print_text_results(&results, &variants, &references),
        OutputFormat::Json => print_json_results(&results, &config)?,
        OutputFormat::Tsv => print_tsv_results(&results),
    }

    Ok(())
}

fn print_text_results(results: &[MatchResult], variants: &RecordTable, references: &RecordTable) {
    println!("Reconciliation Results");
    println!("{}", "=".repeat(60));
    println!(
        "\n{} variant(s) from {}",
        variants.len(),
        variants.source.as_deref().unwrap_or("input")
    );
    println!(
        "{} reference(s) from {}\n",
        references.len(),
        references.source.as_deref().unwrap_or("input")
    );

    for (i, result) in results.iter().enumerate() {
        match (&result.matched_reference, result.score) {
            (Some(reference), Some(score)) => {
                println!("#{} {} => {}", i + 1, result.original_variant, reference);
                println!(
                    "   Hybrid: {}  Char: {}  Token: {}",
                    format_score(score.hybrid),
                    format_score(score.char_sim),
                    format_score(score.token_sim)
                );
            }
            _ => println!("#{} {} => (no reference)", i + 1, result.original_variant),
        }
    }

    let perfect = results
        .iter()
        .filter(|r| r.score.is_some_and(|s| s.is_perfect()))
        .count();
    println!("\n{} of {} variant(s) matched exactly", perfect, results.len());
}

fn print_json_results(results: &[MatchResult], config: &ReconcileConfig) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "config": config,
        "count": results.len(),
        "results": results,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_results(results: &[MatchResult]) {
    println!("original_variant\tmatched_reference\thybrid_score\tchar_similarity\ttoken_similarity");

    for result in results {
        match (&result.matched_reference, result.score) {
            (Some(reference), Some(score)) => println!(
                "{}\t{}\t{}\t{}\t{}",
                result.original_variant,
                reference,
                format_score(score.hybrid),
                format_score(score.char_sim),
                format_score(score.token_sim)
            ),
            _ => println!("{}\t\t\t\t", result.original_variant),
        }
    }
}
