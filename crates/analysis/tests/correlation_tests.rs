use chrono::{TimeZone, Utc};
use tickcorr_analysis::correlation::analyze;
use tickcorr_core::analysis::entity::{
    Classification, CorrelationThresholds, ReturnKind, ReturnsFrame,
};
use tickcorr_core::analysis::error::AnalysisError;
use tickcorr_core::common::Instrument;

fn percent_frame(a: &[f64], b: &[f64]) -> ReturnsFrame {
    ReturnsFrame {
        kind: ReturnKind::Percent,
        instruments: vec![Instrument::new("EURUSD"), Instrument::new("USDJPY")],
        instants: (0..a.len())
            .map(|i| Utc.timestamp_opt(i64::try_from(i).unwrap(), 0).unwrap())
            .collect(),
        columns: vec![a.to_vec(), b.to_vec()],
    }
}

fn run(a: &[f64], b: &[f64]) -> Result<f64, AnalysisError> {
    analyze(
        &percent_frame(a, b),
        "EURUSD",
        "USDJPY",
        &CorrelationThresholds::default(),
    )
    .map(|r| r.coefficient)
}

#[test]
fn test_identical_columns_give_exactly_one() {
    let xs = [0.0001, -0.00025, 0.00007, 0.0, 0.00031, -0.00012];
    assert_eq!(run(&xs, &xs), Ok(1.0));
}

#[test]
fn test_negated_columns_give_exactly_minus_one() {
    let xs = [0.0001, -0.00025, 0.00007, 0.0, 0.00031, -0.00012];
    let neg: Vec<f64> = xs.iter().map(|x| -x).collect();
    assert_eq!(run(&xs, &neg), Ok(-1.0));
}

#[test]
fn test_result_fields() {
    let result = analyze(
        &percent_frame(&[0.01, 0.02, 0.03], &[0.03, 0.01, 0.02]),
        "EURUSD",
        "USDJPY",
        &CorrelationThresholds::default(),
    )
    .unwrap();

    assert_eq!(result.instrument_a.symbol, "EURUSD");
    assert_eq!(result.instrument_b.symbol, "USDJPY");
    assert_eq!(result.sample_size, 3);
    assert!((result.coefficient - (-0.5)).abs() < 1e-12);
    assert_eq!(result.classification, Classification::StrongNegative);
}

#[test]
fn test_degenerate_samples_are_insufficient() {
    assert_eq!(run(&[], &[]), Err(AnalysisError::InsufficientData { rows: 0 }));
    assert_eq!(
        run(&[0.01], &[0.02]),
        Err(AnalysisError::InsufficientData { rows: 1 })
    );
}

#[test]
fn test_constant_column_has_no_coefficient() {
    assert_eq!(
        run(&[0.01, 0.02, 0.03], &[0.0, 0.0, 0.0]),
        Err(AnalysisError::ConstantSeries {
            instrument: "USDJPY".to_string()
        })
    );
}

#[test]
fn test_unknown_instrument() {
    let result = analyze(
        &percent_frame(&[0.01, 0.02], &[0.02, 0.01]),
        "EURUSD",
        "GBPUSD",
        &CorrelationThresholds::default(),
    );
    assert_eq!(
        result,
        Err(AnalysisError::UnknownInstrument("GBPUSD".to_string()))
    );
}

/// # Summary
/// 分类边界：阈值本身归为 moderate。
#[test]
fn test_classification_boundaries() {
    let t = CorrelationThresholds::default();

    assert_eq!(t.classify(0.3), Classification::Moderate);
    assert_eq!(t.classify(0.30001), Classification::StrongPositive);
    assert_eq!(t.classify(-0.3), Classification::Moderate);
    assert_eq!(t.classify(-0.30001), Classification::StrongNegative);
    assert_eq!(t.classify(0.0), Classification::Moderate);
    assert_eq!(t.classify(1.0), Classification::StrongPositive);
    assert_eq!(t.classify(-1.0), Classification::StrongNegative);

    assert_eq!(Classification::StrongNegative.to_string(), "strong negative");
    assert_eq!(Classification::Moderate.to_string(), "moderate");
    assert_eq!(Classification::StrongPositive.to_string(), "strong positive");
}

#[test]
fn test_custom_thresholds() {
    let t = CorrelationThresholds {
        negative: -0.5,
        positive: 0.5,
    };
    assert_eq!(t.classify(0.4), Classification::Moderate);
    assert_eq!(t.classify(-0.6), Classification::StrongNegative);
}

#[test]
fn test_vanishing_variance_is_constant_series() {
    // 偏差平方下溢为 0，列本身并非常数
    let tiny = [1e-200, -1e-200, 1e-200, -1e-200];
    let normal = [0.01, -0.02, 0.015, -0.01];
    assert_eq!(
        run(&tiny, &normal),
        Err(AnalysisError::ConstantSeries {
            instrument: "EURUSD".to_string()
        })
    );
}
