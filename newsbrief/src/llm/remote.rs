use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{ArticleSummary, Summarizer};

/// Remote summarizer using an OpenAI-compatible HTTP API
pub struct RemoteSummarizer {
    base_url: String,
    api_key: String,
    model: String,
    default_timeout: Duration,
    default_max_tokens: usize,
    default_temperature: f32,
    client: reqwest::Client,
}

impl RemoteSummarizer {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            default_timeout: Duration::from_secs(30),
            default_max_tokens: 400,
            default_temperature: 0.5,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_defaults(mut self, timeout_secs: u64, max_tokens: usize, temperature: f32) -> Self {
        self.default_timeout = Duration::from_secs(timeout_secs);
        self.default_max_tokens = max_tokens;
        self.default_temperature = temperature;
        self
    }

    /// Single chat-completion round trip, returning the raw assistant text.
    pub async fn generate(&self, prompt: String) -> Result<String> {
        let req_body = OpenAiRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt,
            }],
            max_tokens: Some(self.default_max_tokens),
            temperature: Some(self.default_temperature),
        };

        let response = tokio::time::timeout(
            self.default_timeout,
            self.client
                .post(&self.base_url)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("Content-Type", "application/json")
                .json(&req_body)
                .send(),
        )
        .await
        .context("summarization request timed out")?
        .context("summarization HTTP request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("summarization API error {}: {}", status, body);
        }

        let resp_body: OpenAiResponse = response
            .json()
            .await
            .context("failed to parse summarization response")?;

        let choice = resp_body
            .choices
            .into_iter()
            .next()
            .context("summarization response has no choices")?;

        Ok(choice.message.content)
    }
}

#[async_trait::async_trait]
impl Summarizer for RemoteSummarizer {
    async fn summarize_article(&self, url: &str) -> Result<ArticleSummary> {
        let prompt = format!(
            r#"You are a news article summarizer. Read the article at the URL below and summarize it.

OUTPUT FORMAT (strict JSON):
{{
  "summary": "concise summary of the article, 2-4 sentences",
  "country": "country the article is primarily about, in English, or null if none applies"
}}

Return only the JSON object, nothing else.

ARTICLE URL:
{}
"#,
            url
        );

        let content = self.generate(prompt).await?;

        // Robust JSON extraction: handle markdown backticks, preamble, etc.
        let cleaned_json = super::extract_json_from_text(&content)
            .context("no valid JSON found in summarization response")?;

        let parsed: SummaryJson = serde_json::from_str(&cleaned_json).with_context(|| {
            format!("failed to parse summary as JSON. Input was: {}", cleaned_json)
        })?;

        Ok(ArticleSummary {
            summary: parsed.summary,
            // Blank or whitespace country collapses to None so grouping
            // falls through to the sentinel bucket.
            country: parsed.country.filter(|c| !c.trim().is_empty()),
        })
    }
}

// OpenAI API request/response structures
#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

// Internal structure for parsing summary JSON
#[derive(Debug, Deserialize)]
struct SummaryJson {
    summary: String,
    #[serde(default)]
    country: Option<String>,
}
