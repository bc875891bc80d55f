//! Mock AI engine for testing without network calls.

use super::{AiEngine, AiEngineError};
use async_trait::async_trait;

/// Mock AI engine that returns predefined replies.
#[derive(Debug, Clone)]
pub struct MockAiEngine {
    extraction_reply: String,
    quote_reply: String,
    analysis_reply: String,
    fail_with: Option<String>,
}

impl MockAiEngine {
    /// Create a new mock with empty replies.
    pub fn new() -> Self {
        Self {
            extraction_reply: "[]".to_string(),
            quote_reply: String::new(),
            analysis_reply: String::new(),
            fail_with: None,
        }
    }

    /// Set the reply returned by extract_trades.
    pub fn with_extraction_reply(mut self, reply: &str) -> Self {
        self.extraction_reply = reply.to_string();
        self
    }

    /// Set the reply returned by quote_prices.
    pub fn with_quote_reply(mut self, reply: &str) -> Self {
        self.quote_reply = reply.to_string();
        self
    }

    /// Set the reply returned by analyze.
    pub fn with_analysis_reply(mut self, reply: &str) -> Self {
        self.analysis_reply = reply.to_string();
        self
    }

    /// Make every call fail with the given message.
    pub fn failing(mut self, message: &str) -> Self {
        self.fail_with = Some(message.to_string());
        self
    }

    fn check(&self) -> Result<(), AiEngineError> {
        match &self.fail_with {
            Some(msg) => Err(AiEngineError::Other(msg.clone())),
            None => Ok(()),
        }
    }
}

impl Default for MockAiEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AiEngine for MockAiEngine {
    async fn extract_trades(
        &self,
        _image_base64: &str,
        _mime: &str,
    ) -> Result<String, AiEngineError> {
        self.check()?;
        Ok(self.extraction_reply.clone())
    }

    async fn quote_prices(&self, _identifiers: &[String]) -> Result<String, AiEngineError> {
        self.check()?;
        Ok(self.quote_reply.clone())
    }

    async fn analyze(&self, _portfolio_text: &str) -> Result<String, AiEngineError> {
        self.check()?;
        Ok(self.analysis_reply.clone())
    }
}
