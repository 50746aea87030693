//! Triage request/verdict types and the guaranteed fallback.

use serde::{Deserialize, Serialize};

use helpdesk_shared::Channel;

/// Category labels the classifier is allowed to choose from.
pub const CATEGORIES: [&str; 6] = [
    "Billing",
    "Technical",
    "Account",
    "Feature Request",
    "General",
    "Bug",
];

/// Category assigned when the classifier itself failed.
pub const SYSTEM_ERROR_CATEGORY: &str = "system_error";

/// Number of suggested replies a verdict always carries.
pub const SUGGESTION_COUNT: usize = 3;

const FALLBACK_RESPONSE: &str = "I'm sorry, I'm having trouble processing your request right \
     now. A human agent will follow up shortly.";

const HOLD_SUGGESTIONS: [&str; SUGGESTION_COUNT] = [
    "I'll look into this immediately.",
    "Can you provide more details?",
    "Connecting you with a specialist.",
];

/// What the classifier is asked to triage.
#[derive(Debug, Clone, Serialize)]
pub struct TriageRequest {
    /// The inbound message text.
    pub content: String,
    /// The channel the message arrived through.
    pub channel: Channel,
    /// Free-text customer context (currently just a label).
    pub context: String,
}

/// A structurally complete triage result.  The engine never receives a
/// partial or malformed verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageVerdict {
    /// Reply text to send to the customer.
    pub response: String,
    /// Emotional tone estimate in [0,1]; 0 is very negative.
    pub sentiment: f64,
    /// Whether a human must take over.
    pub should_escalate: bool,
    /// One of [`CATEGORIES`], or [`SYSTEM_ERROR_CATEGORY`] on failure.
    pub category: String,
    /// Exactly three short suggested replies for a human agent.
    pub suggestions: Vec<String>,
    /// Populated when escalating or when the classifier failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl TriageVerdict {
    /// The safe verdict applied when classification fails for any reason:
    /// neutral sentiment, escalate to a human, generic hold suggestions.
    pub fn fallback(reason: impl Into<String>) -> Self {
        Self {
            response: FALLBACK_RESPONSE.to_string(),
            sentiment: 0.5,
            should_escalate: true,
            category: SYSTEM_ERROR_CATEGORY.to_string(),
            suggestions: HOLD_SUGGESTIONS.iter().map(|s| s.to_string()).collect(),
            reason: Some(reason.into()),
        }
    }

    /// Force the invariants a well-formed verdict carries: sentiment inside
    /// [0,1] and exactly three suggestions (models occasionally return two or
    /// four, or a score slightly out of range).
    pub fn normalized(mut self) -> Self {
        if !self.sentiment.is_finite() {
            self.sentiment = 0.5;
        }
        self.sentiment = self.sentiment.clamp(0.0, 1.0);

        self.suggestions.truncate(SUGGESTION_COUNT);
        let mut pad = HOLD_SUGGESTIONS.iter();
        while self.suggestions.len() < SUGGESTION_COUNT {
            self.suggestions
                .push(pad.next().map(|s| s.to_string()).unwrap_or_default());
        }
        self
    }
}
