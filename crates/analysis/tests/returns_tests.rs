use chrono::{DateTime, TimeZone, Utc};
use tickcorr_analysis::returns::{return_stats, returns};
use tickcorr_core::analysis::entity::{AlignedFrame, ReturnKind};
use tickcorr_core::analysis::error::AnalysisError;
use tickcorr_core::common::Instrument;

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_750_723_200 + secs, 0).unwrap()
}

fn frame(columns: Vec<Vec<f64>>) -> AlignedFrame {
    let rows = columns.first().map(Vec::len).unwrap_or(0);
    let instruments = (0..columns.len())
        .map(|i| Instrument::new(format!("I{i}")))
        .collect();
    AlignedFrame {
        instruments,
        instants: (0..rows).map(|i| at(i64::try_from(i).unwrap())).collect(),
        columns,
    }
}

#[test]
fn test_returns_round_trip_values() {
    let (abs, pct) = returns(&frame(vec![vec![100.0, 101.0, 99.0]])).unwrap();

    assert_eq!(abs.kind, ReturnKind::Absolute);
    assert_eq!(pct.kind, ReturnKind::Percent);
    assert_eq!(abs.len(), 2);
    assert_eq!(pct.len(), 2);
    assert_eq!(abs.instants, vec![at(1), at(2)]);

    assert_eq!(abs.columns[0], vec![1.0, -2.0]);
    let p = &pct.columns[0];
    assert!((p[0] - 0.01).abs() < 1e-12);
    assert!((p[1] - (-2.0 / 101.0)).abs() < 1e-12);
    assert!((p[1] + 0.019802).abs() < 1e-6);
}

#[test]
fn test_returns_columns_independent() {
    let (abs, pct) = returns(&frame(vec![vec![1.0, 2.0], vec![10.0, 5.0]])).unwrap();

    assert_eq!(abs.column("I0").unwrap(), &[1.0]);
    assert_eq!(abs.column("I1").unwrap(), &[-5.0]);
    assert_eq!(pct.column("I0").unwrap(), &[1.0]);
    assert_eq!(pct.column("I1").unwrap(), &[-0.5]);
}

#[test]
fn test_returns_short_frames_are_empty() {
    for columns in [vec![vec![], vec![]], vec![vec![1.0], vec![2.0]]] {
        let (abs, pct) = returns(&frame(columns)).unwrap();
        assert!(abs.is_empty());
        assert!(pct.is_empty());
        assert_eq!(pct.columns.len(), 2);
    }
}

#[test]
fn test_returns_zero_prior_value_is_an_error() {
    let result = returns(&frame(vec![vec![1.0, 1.5, 2.0], vec![3.0, 0.0, 1.0]]));
    assert_eq!(
        result,
        Err(AnalysisError::DivisionByZero {
            instrument: "I1".to_string(),
            at: at(1),
        })
    );
}

#[test]
fn test_return_stats() {
    let (_, pct) = returns(&frame(vec![vec![100.0, 110.0, 99.0, 99.0]])).unwrap();
    let stats = return_stats(&pct);

    assert_eq!(stats.len(), 1);
    let s = &stats[0];
    assert_eq!(s.count, 3);
    assert!((s.max - 0.1).abs() < 1e-12);
    assert!((s.min + 0.1).abs() < 1e-12);
    assert!(s.mean.abs() < 1e-12);
    assert!((s.std_dev.unwrap() - 0.1).abs() < 1e-12);
}

#[test]
fn test_return_stats_skip_empty_columns() {
    let (_, pct) = returns(&frame(vec![vec![1.0]])).unwrap();
    assert!(return_stats(&pct).is_empty());
}
