use clap::Args;

use crate::cli::{parse_weight, OutputFormat};
use crate::core::cell::CellValue;
use crate::export::format_score;
use crate::matching::engine::{ScoringWeights, DEFAULT_CHAR_WEIGHT, DEFAULT_TOKEN_WEIGHT};
use crate::matching::normalize::{fold, fold_str, normalize_width, ComparisonKey};
use crate::matching::scoring::{hybrid_score, ScoreTriple};

#[derive(Args)]
pub struct CompareArgs {
    /// Variant name (width-normalized and case-folded)
    #[arg(required = true)]
    pub variant: String,

    /// Reference name (case-folded only)
    #[arg(required = true)]
    pub reference: String,

    /// Weight of the character-level similarity
    #[arg(long, default_value_t = DEFAULT_CHAR_WEIGHT, value_parser = parse_weight)]
    pub char_weight: f64,

    /// Weight of the token-level similarity
    #[arg(long, default_value_t = DEFAULT_TOKEN_WEIGHT, value_parser = parse_weight)]
    pub token_weight: f64,
}

/// Execute compare subcommand
///
/// # Errors
///
/// Returns an error if JSON output cannot be serialized.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: CompareArgs, format: OutputFormat) -> anyhow::Result<()> {
    let weights = ScoringWeights::new(args.char_weight, args.token_weight);
    if !weights.is_balanced() {
        tracing::warn!(
            "Scoring weights sum to {:.3}, not 1.0; the hybrid score is not bounded by 1",
            weights.sum()
        );
    }

    let variant_key = fold(&normalize_width(&CellValue::text(args.variant.as_str())));
    let reference_key = fold_str(&args.reference);
    let score = hybrid_score(variant_key.as_str(), reference_key.as_str(), &weights);

    tracing::debug!(
        "{} => {} (hybrid {:.2}, char {:.2}, token {:.2})",
        args.variant,
        args.reference,
        score.hybrid,
        score.char_sim,
        score.token_sim
    );

    match format {
        OutputFormat::Text => print_text_comparison(&args, &variant_key, &reference_key, &score),
        OutputFormat::Json => {
            print_json_comparison(&args, &variant_key, &reference_key, &weights, &score)?;
        }
        OutputFormat::Tsv => print_tsv_comparison(&score),
    }

    Ok(())
}

fn print_text_comparison(
    args: &CompareArgs,
    variant_key: &ComparisonKey,
    reference_key: &ComparisonKey,
    score: &ScoreTriple,
) {
    println!("Comparison Results");
    println!("{}", "=".repeat(60));

    println!("\nVariant:   {}", args.variant);
    println!("  Compared as: {variant_key}");
    println!("  Tokens: {}", sorted_tokens(variant_key).join(" | "));

    println!("\nReference: {}", args.reference);
    println!("  Compared as: {reference_key}");
    println!("  Tokens: {}", sorted_tokens(reference_key).join(" | "));

    println!("\nSimilarity Scores:");
    println!("  Char Similarity:  {}", format_score(score.char_sim));
    println!("  Token Similarity: {}", format_score(score.token_sim));
    println!("  Hybrid Score:     {}", format_score(score.hybrid));
}

fn print_json_comparison(
    args: &CompareArgs,
    variant_key: &ComparisonKey,
    reference_key: &ComparisonKey,
    weights: &ScoringWeights,
    score: &ScoreTriple,
) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "variant": {
            "original": args.variant,
            "key": variant_key.as_str(),
            "tokens": sorted_tokens(variant_key),
        },
        "reference": {
            "original": args.reference,
            "key": reference_key.as_str(),
            "tokens": sorted_tokens(reference_key),
        },
        "weights": weights,
        "score": score,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_comparison(score: &ScoreTriple) {
    println!("hybrid_score\tchar_similarity\ttoken_similarity");
    println!(
        "{}\t{}\t{}",
        format_score(score.hybrid),
        format_score(score.char_sim),
        format_score(score.token_sim)
    );
}

fn sorted_tokens(key: &ComparisonKey) -> Vec<&str> {
    let mut tokens: Vec<&str> = key.tokens().into_iter().collect();
    tokens.sort_unstable();
    tokens
}
