//! Structured output parsing with an explicit degraded shape.
//!
//! Anywhere a generator's free-text output must be machine-read, the caller
//! goes through [`parse_or_degrade`]: attempt a typed parse, and on failure
//! fall back to the type's [`Degrade`] impl. The degraded shape is defined
//! once per type rather than re-derived at each call site, and parse failure
//! is a recoverable condition, never a run-fatal one.

use serde::de::DeserializeOwned;

use crate::utils::strip_code_fences;

/// A conservative fallback shape for unparseable generator output.
pub trait Degrade {
    /// Builds the degraded value from the raw (trimmed) generator text.
    fn degrade(raw: &str) -> Self;
}

/// Parses `raw` as JSON into `T`, tolerating an enclosing code fence;
/// on parse failure, logs and returns `T::degrade(raw)`.
pub fn parse_or_degrade<T>(raw: &str) -> T
where
    T: DeserializeOwned + Degrade,
{
    let trimmed = raw.trim();
    let candidate = strip_code_fences(trimmed);
    match serde_json::from_str(&candidate) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(error = %err, "structured output did not parse; degrading");
            T::degrade(trimmed)
        }
    }
}
