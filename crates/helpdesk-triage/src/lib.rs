//! # helpdesk-triage
//!
//! The triage classifier collaborator: given an inbound message, produce a
//! drafted reply, a sentiment score, an escalation decision, a category, and
//! suggested replies for a human agent.
//!
//! The [`Classifier`] trait is infallible by contract.  A broken model must
//! never silently drop a customer inquiry, so every internal failure (HTTP
//! error, timeout, malformed output) degrades to the fallback verdict:
//! "escalate to a human" with a neutral sentiment.  Failures are logged for
//! operational visibility only and never surface to the submitter.

pub mod ollama;
pub mod verdict;

use async_trait::async_trait;

pub use ollama::OllamaClassifier;
pub use verdict::{TriageRequest, TriageVerdict, CATEGORIES, SYSTEM_ERROR_CATEGORY};

/// The classifier seam the lifecycle engine depends on.
///
/// Implementations always return a structurally complete verdict, absorbing
/// their own failures into [`TriageVerdict::fallback`].
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, request: &TriageRequest) -> TriageVerdict;
}
