//! Error taxonomy shared by the cache, the refresh loop and the analytics.

use thiserror::Error;

/// Errors surfaced by the quote pipeline.
///
/// Provider internals report failures as `anyhow::Error`; they are folded into
/// [`QuoteError::DataUnavailable`] at the cache boundary so that consumers only
/// ever need to match on these three cases.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuoteError {
    /// The symbol was empty after trimming or contained unsupported characters.
    #[error("Invalid symbol: '{0}'")]
    InvalidSymbol(String),

    /// The upstream provider failed, timed out, or returned no usable fields.
    #[error("Data unavailable for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    /// A derived ratio had a zero, missing or non-finite denominator.
    #[error("Computation undefined: {0}")]
    ComputationUndefined(&'static str),
}

impl QuoteError {
    pub fn unavailable(symbol: impl Into<String>, err: &anyhow::Error) -> Self {
        QuoteError::DataUnavailable {
            symbol: symbol.into(),
            reason: format!("{err:#}"),
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, QuoteError::ComputationUndefined(_))
    }
}
