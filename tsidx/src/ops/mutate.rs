use tsidx_core::timeseries::util::push_warning;
use tsidx_core::{
    CanonicalTable, FieldNames, IntoSourceTable, NormalizeOptions, SourceTable, filter_table,
    infer_sample_period, merge_last_wins, normalize,
};
use tsidx_types::{MutationReport, TsIdxError, Warning};

use crate::TsIdxData;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Append,
    Replace,
}

impl TsIdxData {
    /// Merge new data into the table, skipping the configured number of
    /// leading source rows.
    ///
    /// # Errors
    /// See [`append_data`](Self::append_data).
    pub fn append<S: IntoSourceTable>(&mut self, source: S) -> Result<MutationReport, TsIdxError> {
        self.append_data(source, self.cfg.skip_leading_rows)
    }

    /// Replace the table with new data, skipping the configured number of
    /// leading source rows.
    ///
    /// # Errors
    /// See [`replace_data`](Self::replace_data).
    pub fn replace<S: IntoSourceTable>(
        &mut self,
        source: S,
    ) -> Result<MutationReport, TsIdxError> {
        self.replace_data(source, self.cfg.skip_leading_rows)
    }

    /// Merge new data into the table.
    ///
    /// Behavior and trade-offs:
    /// - The first `skip_leading_rows` source rows are dropped (typically a
    ///   units or description row under a CSV header).
    /// - Incoming rows go through the same normalization, value filter and
    ///   time bounds as the initial data.
    /// - On a timestamp already present, the incoming row replaces the old one.
    /// - The sample period is inferred only if it was unknown.
    /// - A source with no tabular shape leaves the container unchanged and is
    ///   reported as [`Warning::SourceNotTabular`].
    ///
    /// # Errors
    /// Returns `TsIdxError::MissingField` when the timestamp or value dimension
    /// cannot be located; the container is unchanged.
    pub fn append_data<S: IntoSourceTable>(
        &mut self,
        source: S,
        skip_leading_rows: usize,
    ) -> Result<MutationReport, TsIdxError> {
        self.ingest(source, skip_leading_rows, Mode::Append)
    }

    /// Replace the table with new data.
    ///
    /// Same input handling as [`append_data`](Self::append_data); the sample
    /// period is always re-inferred from the new table.
    ///
    /// # Errors
    /// Returns `TsIdxError::MissingField` when the timestamp or value dimension
    /// cannot be located; the container is unchanged.
    pub fn replace_data<S: IntoSourceTable>(
        &mut self,
        source: S,
        skip_leading_rows: usize,
    ) -> Result<MutationReport, TsIdxError> {
        self.ingest(source, skip_leading_rows, Mode::Replace)
    }

    fn ingest<S: IntoSourceTable>(
        &mut self,
        source: S,
        skip_leading_rows: usize,
        mode: Mode,
    ) -> Result<MutationReport, TsIdxError> {
        let rows_before = self.table.len();
        let mut warnings = Vec::new();

        let fields = FieldNames {
            timestamp: &self.cfg.timestamp_field,
            value: &self.value_field,
        };
        let src = match source.into_source_table(fields) {
            Ok(src) => src.skip_rows(skip_leading_rows),
            Err(e) => {
                push_warning(
                    &mut warnings,
                    Warning::SourceNotTabular {
                        reason: e.to_string(),
                    },
                );
                return Ok(MutationReport {
                    applied: false,
                    rows_before,
                    rows_ingested: 0,
                    rows_after: rows_before,
                    warnings,
                });
            }
        };

        let incoming = self.prepare(src, &mut warnings)?;
        let rows_ingested = incoming.len();

        self.table = match mode {
            Mode::Append => merge_last_wins(&self.table, incoming),
            Mode::Replace => incoming,
        };
        if mode == Mode::Replace || self.sample_period.is_none() {
            self.sample_period = Some(infer_sample_period(self.table.index(), &mut warnings));
        }

        #[cfg(feature = "tracing")]
        tracing::info!(
            name = self.cfg.name.as_str(),
            mode = ?mode,
            rows_before,
            rows_ingested,
            rows_after = self.table.len(),
            "tsidx: data ingested"
        );

        Ok(MutationReport {
            applied: true,
            rows_before,
            rows_ingested,
            rows_after: self.table.len(),
            warnings,
        })
    }

    fn prepare(
        &self,
        src: SourceTable,
        warnings: &mut Vec<Warning>,
    ) -> Result<CanonicalTable, TsIdxError> {
        let opts = NormalizeOptions {
            timestamp_field: &self.cfg.timestamp_field,
            value_field: &self.value_field,
            source_time_format: &self.cfg.source_time_format,
            force_column_names: self.cfg.force_column_names,
            timezone: self.tz,
            parser: &*self.parser,
        };
        let canonical = normalize(src, &opts, warnings)?;
        Ok(filter_table(
            &canonical,
            &self.filter,
            self.start,
            self.end,
            warnings,
        ))
    }
}
