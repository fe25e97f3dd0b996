use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::Warning;
use crate::table::CanonicalTable;
use crate::timeseries::expr::Expr;
use crate::timeseries::util::push_warning;

/// Caller-supplied predicate over a value.
pub type ValuePredicate = Arc<dyn Fn(f64) -> bool + Send + Sync>;

/// Predicate over the value dimension.
#[derive(Clone, Default)]
pub enum ValueFilter {
    /// Keep every row.
    #[default]
    None,
    /// A compiled expression.
    Expr {
        /// Expression text as given.
        source: String,
        /// Compiled form.
        expr: Expr,
    },
    /// A caller-supplied closure.
    Predicate(ValuePredicate),
    /// An expression that failed to compile; applying it keeps every row
    /// and records a warning.
    Invalid {
        /// Expression text as given.
        source: String,
        /// Compiler diagnostic.
        reason: String,
    },
}

impl ValueFilter {
    /// Compile an expression. Blank text means no filter.
    #[must_use]
    pub fn compile(text: &str, value_field: &str) -> Self {
        let source = text.trim();
        if source.is_empty() {
            return Self::None;
        }
        match Expr::parse(source, value_field) {
            Ok(expr) => Self::Expr {
                source: source.to_string(),
                expr,
            },
            Err(e) => Self::Invalid {
                source: source.to_string(),
                reason: e.to_string(),
            },
        }
    }

    /// Wrap a closure.
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(f64) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(f))
    }

    /// True when no value filtering applies.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Human-readable description.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::None => String::new(),
            Self::Expr { source, .. } => source.clone(),
            Self::Predicate(_) => "<predicate>".to_string(),
            Self::Invalid { source, .. } => format!("{source} (invalid, ignored)"),
        }
    }
}

impl core::fmt::Debug for ValueFilter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Expr { source, .. } => f.debug_tuple("Expr").field(source).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
            Self::Invalid { source, reason } => f
                .debug_struct("Invalid")
                .field("source", source)
                .field("reason", reason)
                .finish(),
        }
    }
}

/// Apply the value filter, then restrict to `start <= ts <= end`.
///
/// An invalid filter records [`Warning::InvalidFilter`] and keeps every row.
/// A filter that rejects every row yields an empty table.
#[must_use]
pub fn filter_table(
    table: &CanonicalTable,
    filter: &ValueFilter,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    warnings: &mut Vec<Warning>,
) -> CanonicalTable {
    let keep: Option<Vec<usize>> = match filter {
        ValueFilter::None => None,
        ValueFilter::Invalid { source, reason } => {
            push_warning(
                warnings,
                Warning::InvalidFilter {
                    expr: source.clone(),
                    reason: reason.clone(),
                },
            );
            None
        }
        ValueFilter::Expr { expr, .. } => Some(rows_where(table, |v| expr.matches(v))),
        ValueFilter::Predicate(f) => Some(rows_where(table, |v| f(v))),
    };

    let filtered = match keep {
        Some(rows) if rows.len() != table.len() => table.gather(&rows),
        _ => table.clone(),
    };
    if start.is_none() && end.is_none() {
        filtered
    } else {
        filtered.slice_by_time(start, end)
    }
}

fn rows_where(table: &CanonicalTable, pred: impl Fn(f64) -> bool) -> Vec<usize> {
    table
        .values()
        .into_iter()
        .enumerate()
        .filter_map(|(i, v)| pred(v).then_some(i))
        .collect()
}
