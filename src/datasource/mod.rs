//! External AI collaborator: OCR trade extraction, market quotes, and
//! narrative portfolio analysis.
//!
//! Everything coming back through this layer is untrusted free text. The
//! parsers here turn it into candidate shapes; the core validates those like
//! any manual input.

use async_trait::async_trait;
use std::fmt;

pub mod chat;
pub mod market;
pub mod mock;
pub mod ocr;

pub use chat::ChatAiEngine;
pub use market::parse_market_text;
pub use mock::MockAiEngine;
pub use ocr::parse_candidates;

/// AI collaborator trait. Every method returns the model's raw text reply;
/// parsing happens in [`ocr`] and [`market`].
///
/// Implementations must handle retry/backoff and rate limiting.
#[async_trait]
pub trait AiEngine: Send + Sync + fmt::Debug {
    /// Extract trade records from a screenshot.
    ///
    /// # Arguments
    /// * `image_base64` - Raw image bytes, base64-encoded
    /// * `mime` - Image MIME type (e.g., "image/png")
    async fn extract_trades(&self, image_base64: &str, mime: &str)
        -> Result<String, AiEngineError>;

    /// Look up current quotes for the given identifiers.
    async fn quote_prices(&self, identifiers: &[String]) -> Result<String, AiEngineError>;

    /// Produce a narrative risk analysis for a portfolio description.
    async fn analyze(&self, portfolio_text: &str) -> Result<String, AiEngineError>;
}

/// Error type for AI collaborator calls.
#[derive(Debug, Clone)]
pub enum AiEngineError {
    /// Network error (e.g., connection timeout, DNS failure)
    NetworkError(String),
    /// HTTP error (e.g., 429 rate limit, 5xx server error)
    HttpError { status: u16, message: String },
    /// Parsing error (reply missing the expected completion shape)
    ParseError(String),
    /// Rate limit exceeded after retries
    RateLimited,
    /// Other error
    Other(String),
}

impl fmt::Display for AiEngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AiEngineError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            AiEngineError::HttpError { status, message } => {
                write!(f, "HTTP error {}: {}", status, message)
            }
            AiEngineError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            AiEngineError::RateLimited => write!(f, "Rate limited"),
            AiEngineError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for AiEngineError {}
