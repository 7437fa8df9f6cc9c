use thiserror::Error;

/// Failure of a single call to the generative text service.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Failure constructing the underlying HTTP client.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// The call did not complete within the configured timeout.
    #[error("generation request timed out")]
    Timeout,

    /// Connect errors, 429, 5xx, and 529 overloaded. Retried inside the client.
    #[error("transient failure from model {model}: {reason}")]
    Transient { model: String, reason: String },

    /// The configured model does not exist or is not served to this key.
    #[error("model {model} unavailable: {reason}")]
    ModelUnavailable { model: String, reason: String },

    /// Authentication or request errors that retrying cannot fix.
    #[error("generation failed (status {status:?}): {message}")]
    Fatal { status: Option<u16>, message: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure of a synthesis contract after its bounded attempts.
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("no valid result after {attempts} attempt(s): {reason}")]
    Exhausted { attempts: u32, reason: String },

    #[error("generation timed out on all {attempts} attempt(s)")]
    TimedOut { attempts: u32 },

    #[error(transparent)]
    Generation(#[from] GenerateError),
}

/// Failure of a competitor link lookup. Never fails an analysis.
#[derive(Debug, Error)]
#[error("competitor link lookup failed: {0}")]
pub struct ResolveError(pub String);
