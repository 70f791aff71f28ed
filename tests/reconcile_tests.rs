//! End-to-end reconciliation behavior through the public library API.

use std::sync::{Arc, Mutex};

use name_reconciler::matching::engine::ScoringWeights;
use name_reconciler::matching::progress::NoProgress;
use name_reconciler::matching::reconcile::{reconcile_with_scorer, Collection};
use name_reconciler::matching::scoring::{hybrid_score, ScoreTriple, Scorer};
use name_reconciler::{
    reconcile, reconcile_parallel, CellValue, ReconcileConfig, ReconcileError, RecordTable,
};

fn table(values: &[&str]) -> RecordTable {
    RecordTable::single_column("商品名", values.iter().copied())
}

fn run(variants: &[&str], references: &[&str]) -> Vec<name_reconciler::MatchResult> {
    reconcile(
        &table(variants),
        &table(references),
        &ReconcileConfig::default(),
        &NoProgress,
    )
    .unwrap()
}

/// Records every reference key it is asked to score
#[derive(Clone, Default)]
struct CountingScorer {
    seen: Arc<Mutex<Vec<String>>>,
}

impl Scorer for CountingScorer {
    fn score(&self, a: &str, b: &str, weights: &ScoringWeights) -> ScoreTriple {
        self.seen.lock().unwrap().push(b.to_string());
        hybrid_score(a, b, weights)
    }
}

#[test]
fn test_mixed_script_scenario() {
    let results = run(
        &["ソニー商品A", "Sony ProductB"],
        &["Sony Product A", "Sony Product B"],
    );
    assert_eq!(results.len(), 2);

    // Almost nothing in common across scripts; the trailing "A" decides
    let first = &results[0];
    assert_eq!(first.original_variant, "ソニー商品A");
    assert_eq!(first.matched_reference.as_deref(), Some("Sony Product A"));
    let score = first.score.unwrap();
    assert!(score.hybrid < 0.2, "hybrid was {}", score.hybrid);
    assert!(score.token_sim.abs() < f64::EPSILON);

    // One missing space: high edit similarity, low token overlap
    let second = &results[1];
    assert_eq!(second.matched_reference.as_deref(), Some("Sony Product B"));
    let score = second.score.unwrap();
    assert!(score.char_sim > 0.9, "char_sim was {}", score.char_sim);
    assert!((score.token_sim - 0.25).abs() < 1e-12);
    assert!((score.char_sim - 26.0 / 27.0).abs() < 1e-9);
    assert!((score.hybrid - (0.7 * 26.0 / 27.0 + 0.3 * 0.25)).abs() < 1e-9);
    assert!((score.hybrid - 0.749).abs() < 1e-3);
}

#[test]
fn test_unequal_lengths_use_combined_length() {
    // "SONY TX" keeps the length but breaks a token; "SONY TV 4K" keeps both
    // tokens of the variant and only adds characters
    let results = run(&["Sony TV"], &["Sony TX", "Sony TV 4K"]);
    assert_eq!(results[0].matched_reference.as_deref(), Some("Sony TV 4K"));

    let score = results[0].score.unwrap();
    assert!((score.char_sim - 14.0 / 17.0).abs() < 1e-9);
    assert!((score.token_sim - 2.0 / 3.0).abs() < 1e-9);
    assert!((score.hybrid - (0.7 * 14.0 / 17.0 + 0.3 * 2.0 / 3.0)).abs() < 1e-9);
}

#[test]
fn test_full_width_digits_are_normalized() {
    let results = run(&["ABC１２３"], &["ABC123"]);
    let score = results[0].score.unwrap();

    assert_eq!(results[0].original_variant, "ABC１２３");
    assert_eq!(results[0].matched_reference.as_deref(), Some("ABC123"));
    assert!((score.char_sim - 1.0).abs() < f64::EPSILON);
    assert!((score.token_sim - 1.0).abs() < f64::EPSILON);
    assert!((score.hybrid - 1.0).abs() < 1e-12);
}

#[test]
fn test_case_is_ignored() {
    let results = run(&["sony product a"], &["Sony Product B", "SONY PRODUCT A"]);
    assert_eq!(
        results[0].matched_reference.as_deref(),
        Some("SONY PRODUCT A")
    );
    assert!(results[0].score.unwrap().is_perfect());
}

#[test]
fn test_no_references_means_no_match() {
    let results = run(&["Sony Product A", "ソニー テレビ", ""], &[]);

    assert_eq!(results.len(), 3);
    for result in &results {
        assert!(result.matched_reference.is_none());
        assert!(result.score.is_none());
        assert!(!result.is_match());
    }
}

#[test]
fn test_output_follows_variant_order() {
    let variants = ["C", "A", "B", "A", "Z"];
    let results = run(&variants, &["A", "B", "C"]);

    assert_eq!(results.len(), variants.len());
    for (variant, result) in variants.iter().zip(&results) {
        assert_eq!(result.original_variant, *variant);
    }
    assert_eq!(results[0].matched_reference.as_deref(), Some("C"));
    assert_eq!(results[1].matched_reference.as_deref(), Some("A"));
    assert_eq!(results[3].matched_reference.as_deref(), Some("A"));
}

#[test]
fn test_repeated_runs_are_identical() {
    let variants = ["ｿﾆｰ ﾃﾚﾋﾞ", "Panasonic/TV", "東芝 冷蔵庫", "Sharp"];
    let references = ["ソニー テレビ", "Panasonic TV", "東芝 冷蔵庫 大型", "SHARP AQUOS"];

    let first = run(&variants, &references);
    for _ in 0..5 {
        assert_eq!(run(&variants, &references), first);
    }
}

#[test]
fn test_duplicate_references_keep_first_original() {
    // Both fold to the same key; the first one's original text is reported
    let results = run(&["a"], &["a", "A"]);
    assert_eq!(results[0].matched_reference.as_deref(), Some("a"));

    let results = run(&["A"], &["A", "A"]);
    assert_eq!(results[0].matched_reference.as_deref(), Some("A"));

    // Equal but imperfect scores also keep the first
    let results = run(&["AB"], &["AC", "AD"]);
    assert_eq!(results[0].matched_reference.as_deref(), Some("AC"));
}

#[test]
fn test_exact_match_stops_the_scan() {
    let scorer = CountingScorer::default();
    let results = reconcile_with_scorer(
        &table(&["FOO"]),
        &table(&["BAR", "FOO", "FOOZ"]),
        &ReconcileConfig::default(),
        scorer.clone(),
        &NoProgress,
    )
    .unwrap();

    assert_eq!(results[0].matched_reference.as_deref(), Some("FOO"));
    assert_eq!(*scorer.seen.lock().unwrap(), vec!["BAR", "FOO"]);
}

#[test]
fn test_unbalanced_weights_scan_every_reference() {
    let scorer = CountingScorer::default();
    let config = ReconcileConfig {
        weights: ScoringWeights::new(0.4, 0.4),
        ..ReconcileConfig::default()
    };
    let results = reconcile_with_scorer(
        &table(&["FOO"]),
        &table(&["BAR", "FOO", "FOOZ"]),
        &config,
        scorer.clone(),
        &NoProgress,
    )
    .unwrap();

    // Identity scores the sum of the weights, which never reaches 1.0 here
    let score = results[0].score.unwrap();
    assert_eq!(results[0].matched_reference.as_deref(), Some("FOO"));
    assert!((score.hybrid - 0.8).abs() < 1e-12);
    assert_eq!(scorer.seen.lock().unwrap().len(), 3);
}

#[test]
fn test_scores_stay_in_bounds() {
    let variants = ["", " ", "ＡＢＣ", "ﾃｽﾄ/ﾃｽﾄ", "123", "長い商品名 テスト 用"];
    let references = ["", "abc", "テスト", "123.0", "長い 商品名"];

    for result in run(&variants, &references) {
        let score = result.score.unwrap();
        assert!((0.0..=1.0).contains(&score.char_sim));
        assert!((0.0..=1.0).contains(&score.token_sim));
        assert!((0.0..=1.0).contains(&score.hybrid));
    }
}

#[test]
fn test_blank_variant_matches_blank_reference() {
    let results = run(&["", "Sony"], &["Sony", ""]);

    assert_eq!(results[0].original_variant, "");
    assert_eq!(results[0].matched_reference.as_deref(), Some(""));
    assert!(results[0].score.unwrap().is_perfect());
}

#[test]
fn test_mixed_cell_types() {
    let variants = RecordTable::new(
        vec!["商品名".to_string()],
        vec![
            vec![CellValue::Number(123.0)],
            vec![CellValue::Other("TRUE".to_string())],
            vec![CellValue::Missing],
        ],
    );
    let references = table(&["123", "true"]);

    let results = reconcile(
        &variants,
        &references,
        &ReconcileConfig::default(),
        &NoProgress,
    )
    .unwrap();

    assert_eq!(results[0].original_variant, "123");
    assert_eq!(results[0].matched_reference.as_deref(), Some("123"));
    assert_eq!(results[1].matched_reference.as_deref(), Some("true"));
    assert_eq!(results[2].original_variant, "");
}

#[test]
fn test_parallel_driver_matches_sequential() {
    let variants: Vec<String> = (0..500).map(|i| format!("ｿﾆｰ 商品 {i}")).collect();
    let references: Vec<String> = (0..50).map(|i| format!("ソニー 商品 {}", i * 10)).collect();
    let variants = RecordTable::single_column("商品名", variants.iter().map(String::as_str));
    let references = RecordTable::single_column("商品名", references.iter().map(String::as_str));
    let config = ReconcileConfig::default();

    let sequential = reconcile(&variants, &references, &config, &NoProgress).unwrap();
    let parallel = reconcile_parallel(&variants, &references, &config, &NoProgress).unwrap();

    assert_eq!(sequential, parallel);
}

#[test]
fn test_missing_fields_fail_before_matching() {
    let variants = RecordTable::single_column("name", ["Sony"]);
    let references = table(&["Sony"]);

    let err = reconcile(
        &variants,
        &references,
        &ReconcileConfig::default(),
        &NoProgress,
    )
    .unwrap_err();
    match err {
        ReconcileError::MissingField {
            collection,
            field,
            available,
        } => {
            assert_eq!(collection, Collection::Variant);
            assert_eq!(field, "商品名");
            assert_eq!(available, "name");
        }
    }

    let config = ReconcileConfig {
        variant_field: "name".to_string(),
        reference_field: "正式名称".to_string(),
        ..ReconcileConfig::default()
    };
    let err = reconcile(&variants, &references, &config, &NoProgress).unwrap_err();
    assert!(matches!(
        err,
        ReconcileError::MissingField {
            collection: Collection::Reference,
            ..
        }
    ));
    assert!(err.to_string().contains("正式名称"));
}

#[test]
fn test_custom_comparison_columns() {
    let variants = RecordTable::new(
        vec!["id".to_string(), "表記".to_string()],
        vec![
            vec![CellValue::text("1"), CellValue::text("ﾊﾟﾅｿﾆｯｸ")],
            vec![CellValue::text("2"), CellValue::text("ＳＨＡＲＰ")],
        ],
    );
    let references = RecordTable::single_column("正式名称", ["シャープ", "パナソニック", "SHARP"]);
    let config = ReconcileConfig {
        variant_field: "表記".to_string(),
        reference_field: "正式名称".to_string(),
        ..ReconcileConfig::default()
    };

    let results = reconcile(&variants, &references, &config, &NoProgress).unwrap();

    assert_eq!(results[0].matched_reference.as_deref(), Some("パナソニック"));
    assert_eq!(results[1].matched_reference.as_deref(), Some("SHARP"));
}
