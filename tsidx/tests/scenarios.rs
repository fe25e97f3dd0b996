mod helpers;

use chrono::TimeDelta;
use helpers::*;
use proptest::prelude::*;
use tsidx::{StatSet, TsIdxData};

#[test]
fn three_rows_downsampled_to_two_second_means() {
    let mut data = TsIdxData::builder(TEMP)
        .data(records(&[
            ("01/01/2020 00:00:00.000", "1.0"),
            ("01/01/2020 00:00:01.000", "2.0"),
            ("01/01/2020 00:00:02.000", "3.0"),
        ]))
        .build()
        .unwrap();
    assert_eq!(data.sample_period(), Some(TimeDelta::seconds(1)));

    data.resample(Some("2S"), Some("mean"));

    assert_eq!(
        data.index(),
        &[dt(2020, 1, 1, 0, 0, 0), dt(2020, 1, 1, 0, 0, 2)]
    );
    assert_eq!(values(&data), vec![1.0, 2.5]);
    assert_eq!(data.columns(), vec!["mean_temp"]);
}

#[test]
fn header_like_first_row_is_skipped_before_merge() {
    let mut data = TsIdxData::builder(TEMP)
        .data(four_seconds())
        .build()
        .unwrap();
    let source = records(&[
        ("01/01/2020 00:00:01", "99.0"),
        ("01/01/2020 00:00:03", "40.0"),
        ("01/01/2020 00:00:04", "5.0"),
    ]);

    let report = data.append(source).unwrap();

    // three source rows, one skipped, one collision
    assert_eq!(report.rows_after, report.rows_before + 3 - 1 - 1);
    assert_eq!(values(&data), vec![1.0, 2.0, 3.0, 40.0, 5.0]);
}

#[test]
fn replace_with_a_scalar_is_bit_identical() {
    let mut data = TsIdxData::builder(TEMP)
        .data(four_seconds())
        .build()
        .unwrap();
    let before = format!("{data}");
    let report = data.replace_data(tsidx::Scalar::Float(3.0), 0).unwrap();
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(format!("{data}"), before);
}

proptest! {
    #[test]
    fn timestamps_are_unique_and_sorted(
        points in prop::collection::vec((0i64..100_000, -10.0f64..10.0), 0..60),
    ) {
        let data = TsIdxData::builder(TEMP)
            .data(points.iter().map(|&(m, v)| (ms(m), v)).collect::<Vec<_>>())
            .build()
            .unwrap();
        prop_assert!(data.index().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn constant_spacing_is_inferred_exactly(
        delta_ms in 1i64..100_000,
        start in 0i64..1_000_000,
        n in 2usize..30,
    ) {
        let points: Vec<_> = (0..n)
            .map(|i| (ms(start + i as i64 * delta_ms), i as f64))
            .collect();
        let data = TsIdxData::builder(TEMP).data(points).build().unwrap();
        prop_assert_eq!(data.sample_period(), Some(TimeDelta::milliseconds(delta_ms)));
    }

    #[test]
    fn filtered_rows_respect_bounds_and_predicate(
        points in prop::collection::vec((0i64..60_000, -10.0f64..10.0), 1..60),
        a in 0i64..60_000,
        b in 0i64..60_000,
    ) {
        let (lo, hi) = (a.min(b), a.max(b));
        let fmt = |m: i64| ms(m).format("%Y-%m-%d %H:%M:%S%.3f").to_string();
        let data = TsIdxData::builder(TEMP)
            .value_filter("val > 0")
            .start(fmt(lo))
            .end(fmt(hi))
            .data(points.iter().map(|&(m, v)| (ms(m), v)).collect::<Vec<_>>())
            .build()
            .unwrap();

        let start = data.start_bound().unwrap();
        let end = data.end_bound().unwrap();
        for (t, v) in data.index().iter().zip(values(&data)) {
            prop_assert!(start <= *t && *t <= end);
            prop_assert!(v > 0.0);
        }
    }

    #[test]
    fn downsample_then_upsample_restores_aligned_timestamps(
        period in 2i64..6,
        base in 0i64..500,
        k in 1i64..10,
    ) {
        let first = base * period;
        let points: Vec<(i64, f64)> = (first..=first + k * period).map(|s| (s, s as f64)).collect();
        let mut data = container(&points);
        let original = data.index().to_vec();

        data.resample_to(TimeDelta::seconds(period), StatSet::MEAN);
        data.resample_to(TimeDelta::seconds(1), StatSet::MEAN);

        prop_assert_eq!(data.index(), original.as_slice());
    }
}
