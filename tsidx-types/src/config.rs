//! Configuration types shared by the core algorithms and the container.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Default name of the timestamp dimension.
pub const DEFAULT_TIMESTAMP_FIELD: &str = "timestamp";
/// Default strict format used when parsing timestamp strings.
pub const DEFAULT_SOURCE_TIME_FORMAT: &str = "%m/%d/%Y %H:%M:%S%.f";
/// Default number of leading source rows dropped by append/replace.
pub const DEFAULT_SKIP_LEADING_ROWS: usize = 1;
/// Default upper bound on the number of rows a resample may produce.
pub const DEFAULT_MAX_RESAMPLE_ROWS: usize = 10_000_000;

/// A single statistic computed per bucket when downsampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stat {
    /// Last observed value in the bucket (a selection, not an aggregate).
    Value,
    /// Minimum.
    Min,
    /// Maximum.
    Max,
    /// Arithmetic mean.
    Mean,
    /// Sample standard deviation (n - 1).
    Std,
}

impl Stat {
    /// Output column prefix for this statistic; `None` for [`Stat::Value`],
    /// which keeps the value field's name.
    #[must_use]
    pub const fn prefix(self) -> Option<&'static str> {
        match self {
            Self::Value => None,
            Self::Min => Some("min"),
            Self::Max => Some("max"),
            Self::Mean => Some("mean"),
            Self::Std => Some("std"),
        }
    }

    /// Output column name for this statistic.
    #[must_use]
    pub fn column_name(self, name: &str, value_field: &str) -> String {
        match self.prefix() {
            Some(p) => format!("{p}_{name}"),
            None => value_field.to_string(),
        }
    }
}

bitflags! {
    /// Set of statistics selected for a downsample.
    ///
    /// Iteration order (and therefore output column order) is
    /// value, min, max, mean, std.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct StatSet: u8 {
        /// Last value per bucket.
        const VALUE = 0b0000_0001;
        /// Minimum per bucket.
        const MIN = 0b0000_0010;
        /// Maximum per bucket.
        const MAX = 0b0000_0100;
        /// Mean per bucket.
        const MEAN = 0b0000_1000;
        /// Sample standard deviation per bucket.
        const STD = 0b0001_0000;
    }
}

impl Default for StatSet {
    fn default() -> Self {
        Self::MEAN
    }
}

impl StatSet {
    /// Parse a case-insensitive statistics selector.
    ///
    /// The selector is split on commas, whitespace, `+` and `|`. Tokens that
    /// are full names (`value`, `last`, `min`, `max`, `mean`, `average`,
    /// `avg`, `std`, `stddev`) select that statistic. Any other token is read
    /// letter by letter: `v` value, `i` min, `x` max, `m`/`a` mean,
    /// `s`/`d` std; other letters are ignored.
    ///
    /// Returns `None` when nothing was recognized.
    ///
    /// ```
    /// use tsidx_types::StatSet;
    /// assert_eq!(StatSet::parse_selector("mean"), Some(StatSet::MEAN));
    /// assert_eq!(StatSet::parse_selector("min, max"), Some(StatSet::MIN | StatSet::MAX));
    /// assert_eq!(StatSet::parse_selector("ix"), Some(StatSet::MIN | StatSet::MAX));
    /// assert_eq!(StatSet::parse_selector("zzz"), None);
    /// ```
    #[must_use]
    pub fn parse_selector(selector: &str) -> Option<Self> {
        let lowered = selector.to_ascii_lowercase();
        let mut out = Self::empty();
        for token in lowered
            .split(|c: char| c == ',' || c == '+' || c == '|' || c.is_whitespace())
            .filter(|t| !t.is_empty())
        {
            match token {
                "value" | "last" => out |= Self::VALUE,
                "min" | "minimum" => out |= Self::MIN,
                "max" | "maximum" => out |= Self::MAX,
                "mean" | "average" | "avg" => out |= Self::MEAN,
                "std" | "stddev" | "stdev" => out |= Self::STD,
                letters => {
                    for ch in letters.chars() {
                        match ch {
                            'v' => out |= Self::VALUE,
                            'i' => out |= Self::MIN,
                            'x' => out |= Self::MAX,
                            'm' | 'a' => out |= Self::MEAN,
                            's' | 'd' => out |= Self::STD,
                            _ => {}
                        }
                    }
                }
            }
        }
        if out.is_empty() { None } else { Some(out) }
    }

    /// Selected statistics in output column order.
    pub fn stats(self) -> impl Iterator<Item = Stat> {
        [
            (Self::VALUE, Stat::Value),
            (Self::MIN, Stat::Min),
            (Self::MAX, Stat::Max),
            (Self::MEAN, Stat::Mean),
            (Self::STD, Stat::Std),
        ]
        .into_iter()
        .filter(move |(flag, _)| self.contains(*flag))
        .map(|(_, s)| s)
    }
}

/// Construction-time configuration for a time-series container.
///
/// Every field has a default so partial JSON documents deserialize cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Identifying name; default value-column label and statistic column suffix.
    pub name: String,
    /// Name of the timestamp dimension.
    pub timestamp_field: String,
    /// Name of the value dimension; `None` means "same as `name`".
    pub value_field: Option<String>,
    /// Predicate over the value dimension (`val` is the bound variable).
    /// Empty means no value filtering.
    pub value_filter: String,
    /// Inclusive lower time bound, parsed leniently.
    pub start: Option<String>,
    /// Inclusive upper time bound, parsed leniently. A bound without a
    /// time-of-day extends through the end of that day.
    pub end: Option<String>,
    /// Strict `strftime` format tried first when parsing timestamp strings.
    pub source_time_format: String,
    /// IANA timezone used to interpret naive timestamps; UTC when `None`.
    pub source_timezone: Option<String>,
    /// Infer the timestamp/value columns positionally when names do not match.
    pub force_column_names: bool,
    /// Leading rows dropped from append/replace sources by default.
    pub skip_leading_rows: usize,
    /// Upper bound on rows produced by a single resample.
    pub max_resample_rows: usize,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            timestamp_field: DEFAULT_TIMESTAMP_FIELD.to_string(),
            value_field: None,
            value_filter: String::new(),
            start: None,
            end: None,
            source_time_format: DEFAULT_SOURCE_TIME_FORMAT.to_string(),
            source_timezone: None,
            force_column_names: false,
            skip_leading_rows: DEFAULT_SKIP_LEADING_ROWS,
            max_resample_rows: DEFAULT_MAX_RESAMPLE_ROWS,
        }
    }
}

impl ContainerConfig {
    /// Create a configuration with defaults for the given container name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Effective value field name (falls back to `name`).
    #[must_use]
    pub fn resolved_value_field(&self) -> &str {
        self.value_field.as_deref().unwrap_or(&self.name)
    }
}
