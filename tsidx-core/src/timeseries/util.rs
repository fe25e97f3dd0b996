//! Shared helpers for warning collection.

use crate::Warning;

/// Record a non-fatal condition and, with the `tracing` feature, log it.
pub fn push_warning(warnings: &mut Vec<Warning>, warning: Warning) {
    #[cfg(feature = "tracing")]
    tracing::warn!(%warning, "tsidx");
    warnings.push(warning);
}
