mod helpers;

use std::collections::BTreeMap;

use chrono::TimeDelta;
use helpers::*;
use proptest::prelude::*;
use tsidx::{FieldRole, Scalar, SourceTable, TsIdxData, TsIdxError, Warning};

#[test]
fn append_skips_the_units_row() {
    let mut data = TsIdxData::builder(TEMP)
        .data(four_seconds())
        .build()
        .unwrap();
    let report = data
        .append(records_with_units(&[
            ("01/01/2020 00:00:04", "5.0"),
            ("01/01/2020 00:00:05", "6.0"),
        ]))
        .unwrap();

    assert!(report.applied);
    assert_eq!(report.rows_before, 4);
    assert_eq!(report.rows_ingested, 2);
    assert_eq!(report.rows_after, 6);
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    assert_eq!(values(&data), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    assert_eq!(data.end_ts().unwrap(), dt(2020, 1, 1, 0, 0, 5));
}

#[test]
fn appended_rows_win_on_shared_timestamps() {
    let mut data = container(&[(0, 1.0), (1, 2.0), (2, 3.0)]);
    data.append_data(pairs(&[(3, 4.0), (1, 20.0)]), 0).unwrap();

    assert_eq!(data.index(), &[ms(0), ms(1000), ms(2000), ms(3000)]);
    assert_eq!(values(&data), vec![1.0, 20.0, 3.0, 4.0]);
}

#[test]
fn append_keeps_a_known_sample_period() {
    let mut data = container(&[(0, 1.0), (1, 2.0), (2, 3.0)]);
    data.append_data(pairs(&[(10, 4.0), (20, 5.0), (30, 6.0), (40, 7.0)]), 0)
        .unwrap();
    assert_eq!(data.sample_period(), Some(TimeDelta::seconds(1)));
}

#[test]
fn append_to_an_empty_container_infers_the_period() {
    let mut data = TsIdxData::builder(TEMP).build().unwrap();
    let report = data
        .append_data(pairs(&[(0, 1.0), (2, 2.0), (4, 3.0)]), 0)
        .unwrap();
    assert_eq!(report.rows_after, 3);
    assert_eq!(data.sample_period(), Some(TimeDelta::seconds(2)));
    assert_eq!(data.columns(), vec![TEMP]);
}

#[test]
fn appended_rows_pass_through_filter_and_bounds() {
    let mut data = TsIdxData::builder(TEMP)
        .value_filter("val < 10")
        .end("1970-01-01 00:00:05")
        .build()
        .unwrap();
    let report = data
        .append_data(pairs(&[(4, 1.0), (5, 50.0), (6, 2.0)]), 0)
        .unwrap();
    assert_eq!(report.rows_ingested, 1);
    assert_eq!(data.index(), &[ms(4000)]);
}

#[test]
fn replace_reinfers_the_sample_period() {
    let mut data = container(&[(0, 1.0), (1, 2.0), (2, 3.0)]);
    let report = data
        .replace_data(pairs(&[(0, 7.0), (60, 8.0), (120, 9.0)]), 0)
        .unwrap();
    assert_eq!(report.rows_before, 3);
    assert_eq!(report.rows_after, 3);
    assert_eq!(values(&data), vec![7.0, 8.0, 9.0]);
    assert_eq!(data.sample_period(), Some(TimeDelta::seconds(60)));
}

#[test]
fn replace_with_a_scalar_changes_nothing() {
    let mut data = container(&[(0, 1.0), (1, 2.0), (2, 3.0)]);
    let before = data.table();

    let report = data.replace(Scalar::Text("oops".into())).unwrap();

    assert!(!report.applied);
    assert_eq!(report.rows_after, report.rows_before);
    assert!(
        report
            .warnings
            .iter()
            .any(|w| matches!(w, Warning::SourceNotTabular { .. }))
    );
    assert_eq!(data.table(), before);
    assert_eq!(data.sample_period(), Some(TimeDelta::seconds(1)));
}

#[test]
fn missing_field_on_append_leaves_the_container_unchanged() {
    let mut data = container(&[(0, 1.0), (1, 2.0), (2, 3.0)]);
    let before = data.table();
    let bad = SourceTable::from_records(&["time", TEMP], &[["", ""], ["01/01/2020 00:00:00", "1"]])
        .unwrap();

    let err = data.append(bad).unwrap_err();

    match err {
        TsIdxError::MissingField { role, .. } => assert_eq!(role, FieldRole::Timestamp),
        other => panic!("unexpected: {other:?}"),
    }
    assert_eq!(data.table(), before);
}

proptest! {
    #[test]
    fn append_merges_last_writer_wins(
        existing in prop::collection::vec((0i64..50, -1.0e6f64..1.0e6), 0..30),
        incoming in prop::collection::vec((0i64..50, -1.0e6f64..1.0e6), 0..30),
    ) {
        let mut data = container(&existing);
        data.append_data(pairs(&incoming), 0).unwrap();

        let mut expected: BTreeMap<i64, f64> = BTreeMap::new();
        for &(s, v) in existing.iter().chain(&incoming) {
            expected.insert(s, v);
        }
        let index: Vec<_> = expected.keys().map(|&s| ms(s * 1000)).collect();
        let vals: Vec<f64> = expected.values().copied().collect();

        prop_assert_eq!(data.index(), index.as_slice());
        prop_assert_eq!(values(&data), vals);
        prop_assert!(data.index().windows(2).all(|w| w[0] < w[1]));
    }
}
