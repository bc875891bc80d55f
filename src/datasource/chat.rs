//! OpenAI-compatible chat-completions client.

use super::{AiEngine, AiEngineError};
use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

const EXTRACT_PROMPT: &str = "Extract every trade record visible in this brokerage \
screenshot. Reply with a JSON array of objects with keys: stockName, direction \
(buy/sell), assetType (stock/option), optionType (put/call, options only), price, \
quantity, strikePrice, expiryDate (YYYY-MM-DD), openDate (YYYY-MM-DD). Reply with \
JSON only.";

const QUOTE_PROMPT: &str = "Report the latest quote for each symbol, one per line, \
formatted exactly as 'SYMBOL: price, Vol: volume, Amt: amount, Time: HH:MM'.";

/// AI engine backed by an OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct ChatAiEngine {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl ChatAiEngine {
    pub fn new(base_url: String, api_key: String, model: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
            model,
        }
    }

    async fn complete(&self, messages: serde_json::Value) -> Result<String, AiEngineError> {
        let url = format!("{}/chat/completions", self.base_url);
        let payload = serde_json::json!({
            "model": self.model,
            "messages": messages,
        });
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(60)),
            ..Default::default()
        };

        let body = retry(backoff, || async {
            let response = self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&payload)
                .send()
                .await
                .map_err(|e| {
                    backoff::Error::transient(AiEngineError::NetworkError(e.to_string()))
                })?;

            let status = response.status();
            if status == 429 {
                return Err(backoff::Error::transient(AiEngineError::RateLimited));
            }
            if status.is_server_error() {
                return Err(backoff::Error::transient(AiEngineError::HttpError {
                    status: status.as_u16(),
                    message: "Server error".to_string(),
                }));
            }
            if !status.is_success() {
                return Err(backoff::Error::permanent(AiEngineError::HttpError {
                    status: status.as_u16(),
                    message: "Client error".to_string(),
                }));
            }

            response
                .json::<serde_json::Value>()
                .await
                .map_err(|e| backoff::Error::permanent(AiEngineError::ParseError(e.to_string())))
        })
        .await?;

        body.get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| AiEngineError::ParseError("no completion content".to_string()))
    }
}

#[async_trait]
impl AiEngine for ChatAiEngine {
    async fn extract_trades(
        &self,
        image_base64: &str,
        mime: &str,
    ) -> Result<String, AiEngineError> {
        debug!(model = %self.model, mime, "requesting trade extraction");

        let messages = serde_json::json!([{
            "role": "user",
            "content": [
                { "type": "text", "text": EXTRACT_PROMPT },
                { "type": "image_url", "image_url": {
                    "url": format!("data:{};base64,{}", mime, image_base64)
                } }
            ]
        }]);
        self.complete(messages).await
    }

    async fn quote_prices(&self, identifiers: &[String]) -> Result<String, AiEngineError> {
        debug!(count = identifiers.len(), "requesting quotes");

        let messages = serde_json::json!([{
            "role": "user",
            "content": format!("{}\n\nSymbols: {}", QUOTE_PROMPT, identifiers.join(", ")),
        }]);
        self.complete(messages).await
    }

    async fn analyze(&self, portfolio_text: &str) -> Result<String, AiEngineError> {
        debug!("requesting portfolio analysis");

        let messages = serde_json::json!([{
            "role": "user",
            "content": format!(
                "You are a risk analyst. Review this portfolio and comment on \
                 concentration, downside exposure, and hedging:\n\n{}",
                portfolio_text
            ),
        }]);
        self.complete(messages).await
    }
}
