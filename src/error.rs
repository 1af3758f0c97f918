//! Error types for the menu2ingredients library.
//!
//! Three distinct error types reflect three distinct failure modes:
//!
//! * [`Menu2IngredientsError`] is **fatal**: the service cannot run at all
//!   (invalid configuration, failed socket bind). Returned from startup paths.
//!
//! * [`DishError`] is **non-fatal**: a single dish failed inside the pipeline
//!   but the other dishes in the request are fine. Rendered into the degraded
//!   [`crate::output::DishResult`] so callers can inspect partial success
//!   rather than losing the whole request to one bad dish.
//!
//! * [`ApiError`] is **transport-level**: raw failures from the recipe-search
//!   or chat-completion HTTP seams. These never cross the orchestrator
//!   boundary: the client wrappers in [`crate::pipeline`] contain every
//!   `ApiError` behind a typed empty/default result and a log line.

use thiserror::Error;

/// Fatal errors: the process cannot start or a request cannot be served at all.
#[derive(Debug, Error)]
pub enum Menu2IngredientsError {
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Could not bind the HTTP listener.
    #[error("Failed to bind '{addr}': {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single dish.
///
/// Stored (via its `Display` form) in `DishResult::metadata.error` when a
/// dish fails. The overall request continues for the remaining dishes.
#[derive(Debug, Clone, Error)]
pub enum DishError {
    /// The per-dish pipeline aborted unexpectedly (e.g. a panic in a stage).
    #[error("processing failed for dish '{dish}': {detail}")]
    Failed { dish: String, detail: String },
}

/// Transport-level failure from one of the two remote-API seams.
///
/// Returned by [`crate::pipeline::recipes::RecipeApi`] and
/// [`crate::pipeline::llm::ChatApi`] implementations; contained at the
/// wrapper layer and converted into empty/default results there.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, DNS, TLS, or timeout failure before a response arrived.
    #[error("transport error: {detail}")]
    Transport { detail: String },

    /// The remote API answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be decoded into the expected shape.
    #[error("malformed response body: {detail}")]
    MalformedBody { detail: String },

    /// The response was structurally valid but carried no usable content.
    #[error("empty response from remote API")]
    EmptyResponse,
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::MalformedBody {
                detail: e.to_string(),
            }
        } else {
            ApiError::Transport {
                detail: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dish_error_display_names_the_dish() {
        let e = DishError::Failed {
            dish: "Pad Thai".into(),
            detail: "stage panicked".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("Pad Thai"), "got: {msg}");
        assert!(msg.contains("stage panicked"));
    }

    #[test]
    fn api_error_status_display() {
        let e = ApiError::Status {
            status: 402,
            body: "quota exceeded".into(),
        };
        assert!(e.to_string().contains("402"));
        assert!(e.to_string().contains("quota exceeded"));
    }

    #[test]
    fn invalid_config_display() {
        let e = Menu2IngredientsError::InvalidConfig("port must be non-zero".into());
        assert!(e.to_string().contains("port must be non-zero"));
    }
}
