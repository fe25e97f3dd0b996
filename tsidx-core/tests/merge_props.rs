use chrono::{DateTime, Utc};
use proptest::prelude::*;
use tsidx_core::{CanonicalTable, Column, ColumnData, merge_last_wins};

fn t(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap()
}

fn table(rows: &[(i64, f64)]) -> CanonicalTable {
    CanonicalTable::try_new(
        "timestamp",
        rows.iter().map(|(ms, _)| t(*ms)).collect(),
        vec![Column::float("v", rows.iter().map(|(_, v)| *v))],
    )
    .unwrap()
}

fn arb_rows() -> impl Strategy<Value = Vec<(i64, f64)>> {
    proptest::collection::btree_map(0i64..500, -10.0f64..10.0, 0..60)
        .prop_map(|m| m.into_iter().collect())
}

proptest! {
    #[test]
    fn incoming_wins_and_output_is_sorted(old in arb_rows(), new in arb_rows()) {
        let merged = merge_last_wins(&table(&old), table(&new));
        prop_assert!(merged.index().windows(2).all(|w| w[0] < w[1]));
        for (ts, v) in merged.index().iter().zip(merged.values()) {
            let expect = new
                .iter()
                .chain(old.iter().filter(|(m, _)| !new.iter().any(|(n, _)| n == m)))
                .find(|(m, _)| t(*m) == *ts)
                .map(|(_, v)| *v);
            prop_assert_eq!(Some(v), expect);
        }
        let mut all: Vec<i64> = old.iter().chain(&new).map(|(m, _)| *m).collect();
        all.sort_unstable();
        all.dedup();
        prop_assert_eq!(merged.len(), all.len());
    }
}

#[test]
fn columns_are_aligned_by_name() {
    let old = table(&[(0, 1.0)]);
    let new = CanonicalTable::try_new(
        "timestamp",
        vec![t(1)],
        vec![Column::float("v", [2.0]), Column::text("note", ["hi"])],
    )
    .unwrap();
    let merged = merge_last_wins(&old, new);
    assert_eq!(merged.values(), vec![1.0, 2.0]);
    assert_eq!(
        merged.column("note").unwrap().data,
        ColumnData::Text(vec![None, Some("hi".into())])
    );
}

#[test]
fn empty_existing_adopts_incoming_columns() {
    let old = CanonicalTable::empty("timestamp", "placeholder");
    let merged = merge_last_wins(&old, table(&[(0, 1.0)]));
    assert_eq!(merged.schema().len(), 1);
    assert_eq!(merged.value_column().unwrap().name, "v");
}
