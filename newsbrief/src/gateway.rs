use serde::Serialize;
use std::sync::Arc;
use url::Url;

use crate::llm::{ArticleSummary, Summarizer};

const GENERIC_FAILURE: &str = "An unknown error occurred during summarization.";

/// Per-field validation messages, keyed at the API surface.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldErrors {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub url: Vec<String>,
}

/// Result envelope for one summarization attempt. Consumed immediately by the
/// presentation layer: on success the summary is appended to the session
/// store, on failure the message is shown and state is untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SummarizationOutcome {
    Success {
        message: String,
        #[serde(rename = "originalUrl")]
        original_url: String,
        #[serde(flatten)]
        summary: ArticleSummary,
    },
    Failure {
        message: String,
        error: String,
        #[serde(rename = "fieldErrors", skip_serializing_if = "Option::is_none")]
        field_errors: Option<FieldErrors>,
    },
}

/// Validates a candidate URL, invokes the external summarization capability
/// once, and maps success or failure into a uniform envelope. Never mutates
/// session state; that happens in the route on receipt of the outcome.
pub struct SummarizationGateway {
    summarizer: Arc<dyn Summarizer>,
}

impl SummarizationGateway {
    pub fn new(summarizer: Arc<dyn Summarizer>) -> Self {
        Self { summarizer }
    }

    pub async fn submit(&self, raw_url: &str) -> SummarizationOutcome {
        if let Err(message) = validate_url(raw_url) {
            return SummarizationOutcome::Failure {
                message: "Validation Error".to_string(),
                error: "Invalid URL provided.".to_string(),
                field_errors: Some(FieldErrors { url: vec![message] }),
            };
        }

        match self.summarizer.summarize_article(raw_url).await {
            Ok(summary) => SummarizationOutcome::Success {
                message: "Article summarized successfully!".to_string(),
                original_url: raw_url.to_string(),
                summary,
            },
            Err(e) => {
                tracing::warn!(url = %raw_url, error = %e, "summarization failed");
                let error = e.to_string();
                SummarizationOutcome::Failure {
                    message: "Summarization Failed".to_string(),
                    error: if error.is_empty() {
                        GENERIC_FAILURE.to_string()
                    } else {
                        error
                    },
                    field_errors: None,
                }
            }
        }
    }
}

/// Syntactic validation only: the input must parse as an absolute URL.
fn validate_url(raw: &str) -> Result<(), String> {
    match Url::parse(raw) {
        Ok(_) => Ok(()),
        Err(_) => Err("Please enter a valid URL.".to_string()),
    }
}
