//! Ollama-backed classifier.
//!
//! Sends the inbound message plus the product knowledge base to a local
//! Ollama chat endpoint with `format: "json"` and parses the model's verdict
//! leniently.  Any failure on this path -- connection refused, timeout, HTTP
//! error, or unparseable output -- produces the fallback verdict; a timeout
//! is treated exactly like a classifier error.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::verdict::{TriageRequest, TriageVerdict};
use crate::Classifier;

const KNOWLEDGE_BASE: &str = "\
TechCorp SaaS Product Docs:
1. Pricing: Pro Plan is $29/mo, Enterprise is $99/mo.
2. Features: Cloud Storage (5GB/50GB/Unlimited), API Access, 24/7 Support.
3. Troubleshooting: Reset password via /forgot-password page. Clear cache if dashboard won't load.
4. Refunds: 14-day money-back guarantee for new customers.
5. Legal: Data is stored in region-locked AWS servers. ISO 27001 certified.";

const SYSTEM_PROMPT: &str = "\
You are the automated support triage employee for TechCorp.

Rules:
- NEVER discuss custom pricing discounts.
- NEVER share internal keys.
- ALWAYS be professional.
- ESCALATE if the customer mentions \"lawyer\", \"legal\", \"sue\", or is extremely angry.
- CATEGORIZE into one of: \"Billing\", \"Technical\", \"Account\", \"Feature Request\", \"General\", or \"Bug\".
- SUGGEST 3 short, helpful response options for a human agent to use.

Reply with a single JSON object and nothing else:
{
  \"response\": string,        // the reply to send to the customer
  \"sentiment\": number,       // 0 to 1, 0 is very negative
  \"should_escalate\": boolean,
  \"category\": string,        // one of the specified categories
  \"suggestions\": [string, string, string],
  \"reason\": string           // reason for escalation, if applicable
}";

/// Internal failure modes; never exposed past [`Classifier::classify`].
#[derive(Debug, Error)]
enum TriageError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("verdict parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("verdict missing required field: {0}")]
    MissingField(&'static str),
}

/// Classifier backed by an Ollama `/api/chat` endpoint.
pub struct OllamaClassifier {
    http_client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaClassifier {
    /// `base_url` is the Ollama root, e.g. `http://127.0.0.1:11434`.
    /// The timeout applies to the whole request; an expired timeout takes
    /// the same fallback path as any other classifier failure.
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http_client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    async fn request_verdict(&self, request: &TriageRequest) -> Result<TriageVerdict, TriageError> {
        let user_prompt = format!(
            "Analyze this customer message from the {} channel:\n\"{}\"\n\n\
             Customer Context: {}\nKnowledge Base:\n{}",
            request.channel.as_str(),
            request.content,
            request.context,
            KNOWLEDGE_BASE,
        );

        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user_prompt,
                },
            ],
            stream: false,
            format: "json",
        };

        let response: ChatResponse = self
            .http_client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        parse_verdict(&response.message.content)
    }
}

#[async_trait]
impl Classifier for OllamaClassifier {
    async fn classify(&self, request: &TriageRequest) -> TriageVerdict {
        match self.request_verdict(request).await {
            Ok(verdict) => {
                tracing::debug!(
                    category = %verdict.category,
                    should_escalate = verdict.should_escalate,
                    "triage verdict"
                );
                verdict
            }
            Err(e) => {
                tracing::warn!(error = %e, "triage classifier failed, applying fallback verdict");
                TriageVerdict::fallback("AI processing failed")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Wire types (Ollama chat API)
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    format: &'a str,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

/// What the model actually returned; everything except `response` gets a
/// lenient default before normalization.
#[derive(Deserialize)]
struct RawVerdict {
    response: Option<String>,
    sentiment: Option<f64>,
    should_escalate: Option<bool>,
    category: Option<String>,
    suggestions: Option<Vec<String>>,
    reason: Option<String>,
}

/// Parse model output into a normalized verdict.  Models occasionally wrap
/// the JSON in code fences even when asked not to.
fn parse_verdict(text: &str) -> Result<TriageVerdict, TriageError> {
    let trimmed = text
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let raw: RawVerdict = serde_json::from_str(trimmed)?;

    let verdict = TriageVerdict {
        response: raw.response.ok_or(TriageError::MissingField("response"))?,
        sentiment: raw.sentiment.unwrap_or(0.5),
        should_escalate: raw.should_escalate.unwrap_or(false),
        category: raw.category.unwrap_or_else(|| "General".to_string()),
        suggestions: raw.suggestions.unwrap_or_default(),
        reason: raw.reason,
    };
    Ok(verdict.normalized())
}

#[cfg(test)]
mod tests {
    use super::*;
    use helpdesk_shared::Channel;

    #[test]
    fn parses_complete_verdict() {
        let verdict = parse_verdict(
            r#"{"response":"Try resetting your password.","sentiment":0.6,
                "should_escalate":false,"category":"Technical",
                "suggestions":["a","b","c"],"reason":null}"#,
        )
        .unwrap();
        assert_eq!(verdict.category, "Technical");
        assert_eq!(verdict.sentiment, 0.6);
        assert!(!verdict.should_escalate);
        assert_eq!(verdict.suggestions.len(), 3);
    }

    #[test]
    fn parses_fenced_and_sparse_output() {
        let verdict = parse_verdict(
            "```json\n{\"response\":\"Hello\",\"suggestions\":[\"one\"]}\n```",
        )
        .unwrap();
        assert_eq!(verdict.response, "Hello");
        assert_eq!(verdict.sentiment, 0.5);
        assert_eq!(verdict.suggestions.len(), 3);
        assert_eq!(verdict.category, "General");
    }

    #[test]
    fn rejects_output_without_response() {
        assert!(parse_verdict(r#"{"sentiment":0.4}"#).is_err());
        assert!(parse_verdict("not json at all").is_err());
    }

    #[tokio::test]
    async fn unreachable_endpoint_degrades_to_fallback() {
        // Port 9 (discard) refuses connections immediately.
        let classifier = OllamaClassifier::new(
            "http://127.0.0.1:9",
            "test-model",
            Duration::from_millis(200),
        );
        let verdict = classifier
            .classify(&TriageRequest {
                content: "I keep getting an error page".to_string(),
                channel: Channel::WebForm,
                context: "New Customer Inquiry".to_string(),
            })
            .await;

        assert!(verdict.should_escalate);
        assert_eq!(verdict.category, crate::SYSTEM_ERROR_CATEGORY);
        assert_eq!(verdict.sentiment, 0.5);
        assert_eq!(verdict.suggestions.len(), 3);
    }
}
