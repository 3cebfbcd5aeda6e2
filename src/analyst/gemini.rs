use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{info, warn};

use super::traits::ChartAnalyst;
use crate::config::AppConfig;
use crate::model::AnalystError;

/// Pause before the single retry of a transient inference failure.
const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Multimodal analyst backed by the Gemini generateContent endpoint.
pub struct GeminiAnalyst {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiAnalyst {
    pub fn new(config: &AppConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .expect("❗ Failed to create HTTP client");
        Self {
            client,
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_model.clone(),
            base_url: config.gemini_api_base.clone(),
        }
    }

    fn build_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    async fn send_once(&self, body: &GenerateContentRequest) -> Result<String, AnalystError> {
        let response = self
            .client
            .post(self.build_url())
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AnalystError::Timeout
                } else {
                    AnalystError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AnalystError::Http(e.to_string()))?;
        if !status.is_success() {
            return Err(AnalystError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        let reply: GenerateContentResponse =
            serde_json::from_str(&text).map_err(|e| AnalystError::Decode(e.to_string()))?;
        reply.first_text().ok_or(AnalystError::EmptyReply)
    }
}

#[async_trait::async_trait]
impl ChartAnalyst for GeminiAnalyst {
    async fn analyze_chart(
        &self,
        ticker: &str,
        chart_png: &[u8],
    ) -> Result<String, AnalystError> {
        let body = GenerateContentRequest::for_chart(ticker, chart_png);
        info!(
            "📤 Requesting analysis for {} ({} byte chart)",
            ticker,
            chart_png.len()
        );
        match self.send_once(&body).await {
            Ok(text) => Ok(text),
            Err(e) if is_transient(&e) => {
                warn!("⏳ Transient inference failure for {}: {}. Retrying once...", ticker, e);
                sleep(RETRY_DELAY).await;
                self.send_once(&body).await
            }
            Err(e) => Err(e),
        }
    }
}

/// Only failures a second attempt can plausibly fix are retried; client
/// errors fail immediately.
fn is_transient(error: &AnalystError) -> bool {
    match error {
        AnalystError::Timeout | AnalystError::Http(_) => true,
        AnalystError::Api { status, .. } => *status >= 500,
        _ => false,
    }
}

/// Fixed instruction sent alongside the chart image.
pub fn build_instruction(ticker: &str) -> String {
    format!(
        "You are a technical analyst for stocks at a top financial institution. \
         Based on its candlestick chart and the displayed technical indicators, \
         analyze the stock chart for {ticker}. Provide a detailed explanation of \
         your analysis, by mentioning what patterns, trends and signals you see \
         in the chart. Based on your analysis of the chart, provide a \
         recommendation from the following options: 'Strong Buy', 'Buy', \
         'Lean Buy', 'Neutral', 'Lean Sell', 'Sell', 'Strong Sell'. Return your \
         output as a JSON object with two keys: 'analysis' and 'recommendation'."
    )
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: Blob },
}

#[derive(Debug, Serialize)]
struct Blob {
    mime_type: String,
    data: String,
}

impl GenerateContentRequest {
    /// Two user contents, the instruction first and the PNG as base64
    /// inline data.
    fn for_chart(ticker: &str, chart_png: &[u8]) -> Self {
        Self {
            contents: vec![
                Content {
                    role: "user",
                    parts: vec![Part::Text {
                        text: build_instruction(ticker),
                    }],
                },
                Content {
                    role: "user",
                    parts: vec![Part::InlineData {
                        inline_data: Blob {
                            mime_type: "image/png".to_string(),
                            data: BASE64.encode(chart_png),
                        },
                    }],
                },
            ],
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ReplyContent>,
}

#[derive(Debug, Deserialize)]
struct ReplyContent {
    #[serde(default)]
    parts: Vec<ReplyPart>,
}

#[derive(Debug, Deserialize)]
struct ReplyPart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, if any text came back.
    fn first_text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let joined: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if joined.is_empty() { None } else { Some(joined) }
    }
}
