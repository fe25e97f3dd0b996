use tsidx::{SourceTable, TsIdxData};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Suggested: RUST_LOG=info
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .try_init();

    // 1. An instrument export: header, units row, then samples every 15 seconds.
    let header = ["timestamp", "flow", "status"];
    let rows = [
        ["", "m3/h", ""],
        ["03/01/2021 08:00:00", "12.5", "ok"],
        ["03/01/2021 08:00:15", "13.0", "ok"],
        ["03/01/2021 08:00:30", "-1", "sensor fault"],
        ["03/01/2021 08:00:45", "14.25", "ok"],
        ["03/01/2021 08:01:00", "15.0", "ok"],
    ];
    let export = SourceTable::from_records(&header, &rows)?.skip_rows(1);

    // 2. Keep plausible readings from the morning shift, in local time.
    let (mut flow, report) = TsIdxData::builder("flow")
        .value_filter("val >= 0")
        .start("2021-03-01 06:00")
        .end("2021-03-01 14:00")
        .source_timezone("Europe/Rome")
        .data(export)
        .build_with_report()?;
    for w in &report.warnings {
        println!("warning: {w}");
    }
    println!("{flow}");

    // 3. Later rows arrive in the same shape; the units row is skipped by default.
    let more = SourceTable::from_records(
        &header,
        &[
            ["", "m3/h", ""],
            ["03/01/2021 08:01:15", "15.5", "ok"],
            ["03/01/2021 08:01:30", "16.0", "ok"],
        ],
    )?;
    flow.append(more)?;

    // 4. One-minute statistics.
    let report = flow.resample(Some("1min"), Some("min, max, mean"));
    println!("{:?}", report.outcome);
    println!("{flow}");

    Ok(())
}
