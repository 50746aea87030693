//! # helpdesk-engine
//!
//! The ticket lifecycle engine: the rules for how a raw inquiry becomes a
//! categorized, sentiment-scored, possibly-escalated ticket, and how a human
//! agent takes over that lifecycle at any point.
//!
//! The engine owns a [`helpdesk_store::Database`] and a
//! [`helpdesk_triage::Classifier`]; the presentation layer talks to the
//! engine only.  One logical operation runs at a time -- the store is never
//! called concurrently.

pub mod analytics;
pub mod engine;

mod error;

pub use analytics::Analytics;
pub use engine::{ticket_sentiment, LifecycleEngine};
pub use error::EngineError;
