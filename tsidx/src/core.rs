use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use tsidx_core::datetime::resolve_timezone;
use tsidx_core::timeseries::period::period_to_std;
use tsidx_core::timeseries::util::push_warning;
use tsidx_core::{
    CanonicalTable, DataType, DateParser, FieldNames, IntoSourceTable, LenientDateParser,
    NormalizeOptions, SourceTable, Tz, ValueFilter, filter_table, infer_sample_period, normalize,
    parse_bound, reconcile_bounds,
};
use tsidx_types::{BoundSide, BuildReport, ContainerConfig, TsIdxError, Warning};

type PendingSource = Box<dyn FnOnce(FieldNames<'_>) -> Result<SourceTable, TsIdxError>>;

/// A single time series held in a canonical, timestamp-indexed table.
///
/// The table's index is unique, strictly ascending and millisecond aligned;
/// its first column is the value column. Every operation keeps these
/// properties.
#[derive(Debug, Clone)]
pub struct TsIdxData {
    pub(crate) cfg: ContainerConfig,
    pub(crate) value_field: String,
    pub(crate) filter: ValueFilter,
    pub(crate) start: Option<DateTime<Utc>>,
    pub(crate) end: Option<DateTime<Utc>>,
    pub(crate) tz: Tz,
    pub(crate) parser: Arc<dyn DateParser>,
    pub(crate) table: CanonicalTable,
    pub(crate) sample_period: Option<TimeDelta>,
}

/// Builder for constructing a [`TsIdxData`] container.
pub struct TsIdxDataBuilder {
    cfg: ContainerConfig,
    predicate: Option<ValueFilter>,
    parser: Arc<dyn DateParser>,
    outer: Option<(Option<String>, Option<String>)>,
    source: Option<PendingSource>,
}

impl Default for TsIdxDataBuilder {
    fn default() -> Self {
        Self::new("")
    }
}

impl TsIdxDataBuilder {
    /// Create a builder with default configuration for the named series.
    ///
    /// Behavior and trade-offs:
    /// - The value field defaults to `name`; the timestamp field to `"timestamp"`.
    /// - Without [`data`](Self::data) the container starts empty and its sample
    ///   period stays unknown until data is appended.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_config(ContainerConfig::named(name))
    }

    /// Start from a complete configuration, e.g. one deserialized from JSON.
    #[must_use]
    pub fn from_config(cfg: ContainerConfig) -> Self {
        Self {
            cfg,
            predicate: None,
            parser: Arc::new(LenientDateParser),
            outer: None,
            source: None,
        }
    }

    /// Name of the timestamp dimension.
    #[must_use]
    pub fn timestamp_field(mut self, name: impl Into<String>) -> Self {
        self.cfg.timestamp_field = name.into();
        self
    }

    /// Name of the value dimension; the canonical value column is renamed to it.
    #[must_use]
    pub fn value_field(mut self, name: impl Into<String>) -> Self {
        self.cfg.value_field = Some(name.into());
        self
    }

    /// Filter expression over the value dimension.
    ///
    /// Behavior and trade-offs:
    /// - The value is bound to `val` or to the value field's name, e.g.
    ///   `"val > 0 and val < 100"`.
    /// - An expression that does not compile is not an error: it is reported
    ///   as [`Warning::InvalidFilter`] and no value filtering happens.
    /// - Replaces a predicate set with [`value_filter_fn`](Self::value_filter_fn).
    #[must_use]
    pub fn value_filter(mut self, expr: impl Into<String>) -> Self {
        self.cfg.value_filter = expr.into();
        self.predicate = None;
        self
    }

    /// Filter the value dimension with a closure.
    #[must_use]
    pub fn value_filter_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(f64) -> bool + Send + Sync + 'static,
    {
        self.cfg.value_filter.clear();
        self.predicate = Some(ValueFilter::predicate(f));
        self
    }

    /// Inclusive lower time bound, parsed leniently.
    #[must_use]
    pub fn start(mut self, text: impl Into<String>) -> Self {
        self.cfg.start = Some(text.into());
        self
    }

    /// Inclusive upper time bound, parsed leniently.
    ///
    /// A bound at local midnight, such as `"2020-01-31"`, extends through the
    /// end of that day.
    #[must_use]
    pub fn end(mut self, text: impl Into<String>) -> Self {
        self.cfg.end = Some(text.into());
        self
    }

    /// Clamp the container's own bounds to an outer window.
    ///
    /// Behavior and trade-offs:
    /// - The effective start is the later of the two starts and the effective
    ///   end the earlier of the two ends; a side set on only one window is
    ///   taken from that window.
    /// - The effective end is never before the effective start.
    #[must_use]
    pub fn within(mut self, outer_start: Option<&str>, outer_end: Option<&str>) -> Self {
        self.outer = Some((
            outer_start.map(str::to_string),
            outer_end.map(str::to_string),
        ));
        self
    }

    /// Strict `strftime` format tried before lenient parsing of timestamp strings.
    #[must_use]
    pub fn source_time_format(mut self, format: impl Into<String>) -> Self {
        self.cfg.source_time_format = format.into();
        self
    }

    /// IANA timezone of naive source timestamps and bounds. Defaults to UTC.
    #[must_use]
    pub fn source_timezone(mut self, tz: impl Into<String>) -> Self {
        self.cfg.source_timezone = Some(tz.into());
        self
    }

    /// Locate the timestamp and value dimensions by position when the names
    /// do not match.
    #[must_use]
    pub const fn force_column_names(mut self, yes: bool) -> Self {
        self.cfg.force_column_names = yes;
        self
    }

    /// Leading rows dropped by [`TsIdxData::append`] and [`TsIdxData::replace`].
    #[must_use]
    pub const fn skip_leading_rows(mut self, n: usize) -> Self {
        self.cfg.skip_leading_rows = n;
        self
    }

    /// Upper bound on the rows a single resample may produce.
    #[must_use]
    pub const fn max_resample_rows(mut self, n: usize) -> Self {
        self.cfg.max_resample_rows = n;
        self
    }

    /// Replace the date parser used for timestamps and bounds.
    #[must_use]
    pub fn date_parser(mut self, parser: Arc<dyn DateParser>) -> Self {
        self.parser = parser;
        self
    }

    /// Initial data. Nothing is read until [`build`](Self::build).
    #[must_use]
    pub fn data<S>(mut self, source: S) -> Self
    where
        S: IntoSourceTable + 'static,
    {
        self.source = Some(Box::new(move |fields: FieldNames<'_>| {
            source.into_source_table(fields)
        }));
        self
    }

    /// Build the container.
    ///
    /// # Errors
    /// See [`build_with_report`](Self::build_with_report).
    pub fn build(self) -> Result<TsIdxData, TsIdxError> {
        self.build_with_report().map(|(data, _)| data)
    }

    /// Build the container and report what happened along the way.
    ///
    /// Bounds are resolved first, then the filter is compiled, then the
    /// initial data is normalized, filtered and its sample period inferred.
    ///
    /// # Errors
    /// Returns `TsIdxError::NotTabular` when the initial data has no tabular
    /// shape and `TsIdxError::MissingField` when its timestamp or value
    /// dimension cannot be located.
    pub fn build_with_report(self) -> Result<(TsIdxData, BuildReport), TsIdxError> {
        let Self {
            cfg,
            predicate,
            parser,
            outer,
            source,
        } = self;
        let mut warnings = Vec::new();

        let tz = resolve_timezone(cfg.source_timezone.as_deref(), &mut warnings);
        let value_field = cfg.resolved_value_field().to_string();

        let mut bound =
            |text: Option<&str>, side| resolve_bound(&*parser, text, side, tz, &mut warnings);
        let mut start = bound(cfg.start.as_deref(), BoundSide::Start);
        let mut end = bound(cfg.end.as_deref(), BoundSide::End);
        if let Some((outer_start, outer_end)) = &outer {
            let outer_start = bound(outer_start.as_deref(), BoundSide::Start);
            let outer_end = bound(outer_end.as_deref(), BoundSide::End);
            (start, end) = reconcile_bounds(outer_start, outer_end, start, end);
        }

        let filter =
            predicate.unwrap_or_else(|| ValueFilter::compile(&cfg.value_filter, &value_field));

        let (table, sample_period) = match source {
            None => (
                CanonicalTable::empty(cfg.timestamp_field.as_str(), value_field.as_str()),
                None,
            ),
            Some(pending) => {
                let src = pending(FieldNames {
                    timestamp: &cfg.timestamp_field,
                    value: &value_field,
                })?;
                let opts = NormalizeOptions {
                    timestamp_field: &cfg.timestamp_field,
                    value_field: &value_field,
                    source_time_format: &cfg.source_time_format,
                    force_column_names: cfg.force_column_names,
                    timezone: tz,
                    parser: &*parser,
                };
                let canonical = normalize(src, &opts, &mut warnings)?;
                let table = filter_table(&canonical, &filter, start, end, &mut warnings);
                let period = infer_sample_period(table.index(), &mut warnings);
                (table, Some(period))
            }
        };

        #[cfg(feature = "tracing")]
        tracing::info!(
            name = cfg.name.as_str(),
            rows = table.len(),
            warnings = warnings.len(),
            "tsidx: container built"
        );

        let report = BuildReport {
            rows: table.len(),
            sample_period: sample_period.and_then(period_to_std),
            warnings,
        };
        let data = TsIdxData {
            cfg,
            value_field,
            filter,
            start,
            end,
            tz,
            parser,
            table,
            sample_period,
        };
        Ok((data, report))
    }
}

fn resolve_bound(
    parser: &dyn DateParser,
    text: Option<&str>,
    side: BoundSide,
    tz: Tz,
    warnings: &mut Vec<Warning>,
) -> Option<DateTime<Utc>> {
    let text = text.map(str::trim).filter(|t| !t.is_empty())?;
    match parse_bound(parser, text, side == BoundSide::End, tz) {
        Ok(ts) => Some(ts),
        Err(e) => {
            push_warning(
                warnings,
                Warning::InvalidBound {
                    side,
                    input: text.to_string(),
                    reason: e.to_string(),
                },
            );
            None
        }
    }
}

impl TsIdxData {
    /// Start building a container for the named series.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> TsIdxDataBuilder {
        TsIdxDataBuilder::new(name)
    }

    /// Configuration the container was built with.
    #[must_use]
    pub const fn config(&self) -> &ContainerConfig {
        &self.cfg
    }

    /// Series name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.cfg.name
    }

    /// Name of the timestamp dimension (and of the table's index).
    #[must_use]
    pub fn timestamp_field(&self) -> &str {
        &self.cfg.timestamp_field
    }

    /// Name of the value dimension.
    #[must_use]
    pub fn value_field(&self) -> &str {
        &self.value_field
    }

    /// Strict timestamp format tried first.
    #[must_use]
    pub fn source_time_format(&self) -> &str {
        &self.cfg.source_time_format
    }

    /// Value filter applied to incoming data.
    #[must_use]
    pub const fn value_filter(&self) -> &ValueFilter {
        &self.filter
    }

    /// Resolved inclusive lower bound.
    #[must_use]
    pub const fn start_bound(&self) -> Option<DateTime<Utc>> {
        self.start
    }

    /// Resolved inclusive upper bound.
    #[must_use]
    pub const fn end_bound(&self) -> Option<DateTime<Utc>> {
        self.end
    }

    /// Sampling period, `None` until the container has seen data.
    #[must_use]
    pub const fn sample_period(&self) -> Option<TimeDelta> {
        self.sample_period
    }

    /// Timestamp index.
    #[must_use]
    pub fn index(&self) -> &[DateTime<Utc>] {
        self.table.index()
    }

    /// Column names, value column first.
    #[must_use]
    pub fn columns(&self) -> Vec<&str> {
        self.table.columns().iter().map(|c| c.name.as_str()).collect()
    }

    /// Column names with their data types.
    #[must_use]
    pub fn schema(&self) -> Vec<(String, DataType)> {
        self.table.schema()
    }

    /// Borrow the canonical table.
    #[must_use]
    pub const fn as_table(&self) -> &CanonicalTable {
        &self.table
    }

    /// Copy of the canonical table.
    #[must_use]
    pub fn table(&self) -> CanonicalTable {
        self.table.clone()
    }

    /// Number of rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.table.len()
    }

    /// True when the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// First timestamp.
    ///
    /// # Errors
    /// Returns `TsIdxError::EmptyTable` when the table has no rows.
    pub fn start_ts(&self) -> Result<DateTime<Utc>, TsIdxError> {
        self.table
            .index()
            .first()
            .copied()
            .ok_or_else(|| TsIdxError::empty_table("start timestamp"))
    }

    /// Last timestamp.
    ///
    /// # Errors
    /// Returns `TsIdxError::EmptyTable` when the table has no rows.
    pub fn end_ts(&self) -> Result<DateTime<Utc>, TsIdxError> {
        self.table
            .index()
            .last()
            .copied()
            .ok_or_else(|| TsIdxError::empty_table("end timestamp"))
    }
}
