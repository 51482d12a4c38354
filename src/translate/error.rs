//! Error types for natural-language translation

use crate::query::FilterError;
use thiserror::Error;

/// Failures of the text generation capability itself
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// No API key configured; nothing was sent
    #[error("text generation is not configured (set ai.api_key or DEEPSEEK_API_KEY)")]
    MissingApiKey,

    /// HTTP 401/403
    #[error("text generation request was not authorized: {0}")]
    Unauthorized(String),

    /// HTTP 429
    #[error("text generation is rate limited, try again later")]
    RateLimited,

    #[error("text generation timed out after {0}s")]
    Timeout(u64),

    /// Transport failure or non-success status
    #[error("text generation service unavailable: {0}")]
    Unavailable(String),

    /// Success status but no usable completion in the body
    #[error("unexpected response from text generation service: {0}")]
    InvalidResponse(String),
}

impl GenerationError {
    /// Whether repeating the same request later may succeed
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited | Self::Timeout(_) | Self::Unavailable(_) | Self::InvalidResponse(_)
        )
    }
}

/// Reasons a natural-language request could not be turned into a filter
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslateError {
    #[error("query text cannot be empty")]
    EmptyInput,

    #[error("query text is too long ({len} characters, max {max})")]
    TooLong { len: usize, max: usize },

    /// The model could not be reached or refused the request
    #[error(transparent)]
    Upstream(#[from] GenerationError),

    /// The model answered, but not with a JSON object
    #[error("could not interpret query, please rephrase: {0}")]
    Parse(String),

    /// The model's JSON is not an acceptable filter
    #[error("could not interpret query, please rephrase: {0}")]
    Validation(#[source] FilterError),
}
