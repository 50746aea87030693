//! The lifecycle state machine.
//!
//! States: `Open` (created, not yet triaged) -> `Resolved` | `Escalated`
//! (automated triage) -> `AwaitingHuman` (explicit handover) -> `Resolved`
//! (human reply).  `Escalated` and `AwaitingHuman` are not terminal: an agent
//! reply from either moves the ticket to `Resolved`.
//!
//! Concurrency note: the engine serializes store access through a mutex, so
//! store calls never overlap.  Two *agents* replying to the same ticket at
//! the same time is still a last-write-wins race; fixing that would need
//! per-ticket version stamps, which is out of scope here.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;

use helpdesk_shared::{Direction, Role, TicketId, TicketIntake, TicketStatus, ValidationError};
use helpdesk_store::{Database, NewMessage, Ticket, TicketPatch};
use helpdesk_triage::{Classifier, TriageRequest};

use crate::analytics::{self, Analytics};
use crate::error::EngineError;

/// System message appended when a human takes a ticket over.
const HANDOVER_NOTE: &str =
    "Ticket status updated: Handed over to a human agent for further assistance.";

/// Context label handed to the classifier alongside a fresh inquiry.
const NEW_INQUIRY_CONTEXT: &str = "New Customer Inquiry";

/// The only mutation surface the presentation layer may call.
pub struct LifecycleEngine {
    db: Mutex<Database>,
    classifier: Arc<dyn Classifier>,
}

impl LifecycleEngine {
    pub fn new(db: Database, classifier: Arc<dyn Classifier>) -> Self {
        Self {
            db: Mutex::new(db),
            classifier,
        }
    }

    /// Submit a new inquiry: validate, persist the ticket with its seed
    /// inbound message, triage it, and apply the verdict.
    ///
    /// The returned ticket is always in `Resolved` or `Escalated`, never
    /// `Open`: a classifier failure is absorbed into the fallback verdict
    /// rather than surfacing to the submitter.  A storage failure during
    /// creation aborts before the classifier is ever invoked.
    pub async fn submit(&self, intake: &TicketIntake) -> Result<Ticket, EngineError> {
        intake.validate()?;

        let ticket = self
            .lock_db()?
            .create_ticket(intake)
            .map_err(EngineError::Storage)?;

        tracing::info!(ticket_id = %ticket.id, subject = %ticket.subject, "ticket created, running triage");

        // The one suspending operation.  While it is pending the ticket is
        // visible to readers as Open, without category or sentiment yet.
        let verdict = self
            .classifier
            .classify(&TriageRequest {
                content: intake.message.clone(),
                channel: intake.channel,
                context: NEW_INQUIRY_CONTEXT.to_string(),
            })
            .await;

        let status = if verdict.should_escalate {
            TicketStatus::Escalated
        } else {
            TicketStatus::Resolved
        };

        let db = self.lock_db()?;
        db.append_message(
            ticket.id,
            NewMessage {
                conversation_id: ticket.conversation_id,
                channel: intake.channel,
                direction: Direction::Outbound,
                role: Role::Agent,
                content: verdict.response.clone(),
                sentiment_score: Some(verdict.sentiment),
            },
        )
        .map_err(|e| EngineError::from_store(ticket.id, e))?;

        let updated = db
            .update_ticket(
                ticket.id,
                &TicketPatch {
                    status: Some(status),
                    category: Some(verdict.category.clone()),
                    resolution_notes: verdict.reason.clone(),
                    ai_suggestions: Some(verdict.suggestions.clone()),
                    resolved_at: (status == TicketStatus::Resolved).then(Utc::now),
                },
            )
            .map_err(|e| EngineError::from_store(ticket.id, e))?;

        tracing::info!(
            ticket_id = %updated.id,
            status = updated.status.as_str(),
            category = %updated.category,
            "triage applied"
        );
        Ok(updated)
    }

    /// Hand the ticket over to a human agent.
    ///
    /// Valid from any state and idempotent with respect to status: calling it
    /// twice leaves the ticket `AwaitingHuman` and appends one system note
    /// per call (no dedup).
    pub fn handover(&self, ticket_id: TicketId) -> Result<Ticket, EngineError> {
        let db = self.lock_db()?;
        let ticket = db
            .ticket_by_id(ticket_id)
            .map_err(|e| EngineError::from_store(ticket_id, e))?;

        db.update_ticket(
            ticket_id,
            &TicketPatch {
                status: Some(TicketStatus::AwaitingHuman),
                ..Default::default()
            },
        )
        .map_err(|e| EngineError::from_store(ticket_id, e))?;

        db.append_message(
            ticket_id,
            NewMessage {
                conversation_id: ticket.conversation_id,
                channel: ticket.source_channel,
                direction: Direction::Outbound,
                role: Role::System,
                content: HANDOVER_NOTE.to_string(),
                sentiment_score: None,
            },
        )
        .map_err(|e| EngineError::from_store(ticket_id, e))?;

        tracing::info!(ticket_id = %ticket_id, "ticket handed over to a human agent");
        db.ticket_by_id(ticket_id)
            .map_err(|e| EngineError::from_store(ticket_id, e))
    }

    /// Send a human agent's reply and resolve the ticket.
    ///
    /// Rejects blank text with nothing persisted.  Available from any status;
    /// always lands on `Resolved`, overriding `Escalated` or `AwaitingHuman`.
    /// Human replies are not auto-scored.
    pub fn agent_reply(&self, ticket_id: TicketId, text: &str) -> Result<Ticket, EngineError> {
        if text.trim().is_empty() {
            return Err(ValidationError::EmptyReply.into());
        }

        let db = self.lock_db()?;
        let ticket = db
            .ticket_by_id(ticket_id)
            .map_err(|e| EngineError::from_store(ticket_id, e))?;

        db.append_message(
            ticket_id,
            NewMessage {
                conversation_id: ticket.conversation_id,
                channel: ticket.source_channel,
                direction: Direction::Outbound,
                role: Role::Agent,
                content: text.to_string(),
                sentiment_score: None,
            },
        )
        .map_err(|e| EngineError::from_store(ticket_id, e))?;

        let updated = db
            .update_ticket(
                ticket_id,
                &TicketPatch {
                    status: Some(TicketStatus::Resolved),
                    resolved_at: Some(Utc::now()),
                    ..Default::default()
                },
            )
            .map_err(|e| EngineError::from_store(ticket_id, e))?;

        tracing::info!(ticket_id = %ticket_id, "agent reply sent, ticket resolved");
        Ok(updated)
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// All tickets, most recently created first.
    pub fn all_tickets(&self) -> Result<Vec<Ticket>, EngineError> {
        self.lock_db()?.all_tickets().map_err(EngineError::Storage)
    }

    /// One ticket with its full thread.
    pub fn ticket(&self, ticket_id: TicketId) -> Result<Ticket, EngineError> {
        self.lock_db()?
            .ticket_by_id(ticket_id)
            .map_err(|e| EngineError::from_store(ticket_id, e))
    }

    /// Every ticket filed under this exact email, most recent first.
    pub fn customer_history(&self, email: &str) -> Result<Vec<Ticket>, EngineError> {
        self.lock_db()?
            .customer_history(email)
            .map_err(EngineError::Storage)
    }

    /// Aggregate dashboard numbers over all tickets.
    pub fn analytics(&self) -> Result<Analytics, EngineError> {
        Ok(analytics::compute(&self.all_tickets()?))
    }

    fn lock_db(&self) -> Result<MutexGuard<'_, Database>, EngineError> {
        self.db.lock().map_err(|_| EngineError::LockPoisoned)
    }
}

/// The ticket's current sentiment for display: a last-value-wins fold over
/// the thread in order, defaulting to 0.5 when no message is scored.
pub fn ticket_sentiment(ticket: &Ticket) -> f64 {
    ticket
        .messages
        .iter()
        .fold(0.5, |last, m| m.sentiment_score.unwrap_or(last))
}
