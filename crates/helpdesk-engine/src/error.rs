use thiserror::Error;

use helpdesk_shared::{TicketId, ValidationError};
use helpdesk_store::StoreError;

/// Errors a lifecycle operation can surface to its caller.
///
/// Classifier failures are deliberately absent: they are absorbed into the
/// fallback verdict and never propagate (the submission still succeeds from
/// the customer's point of view).
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed input; nothing was persisted, the caller re-prompts.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The operation targeted a ticket id absent from the store.
    #[error("ticket not found: {0}")]
    NotFound(TicketId),

    /// Persistence failure: fatal to the current operation, no retry.
    #[error("storage error: {0}")]
    Storage(StoreError),

    /// The in-process database lock was poisoned by a panicking holder.
    #[error("engine state lock poisoned")]
    LockPoisoned,
}

impl EngineError {
    /// Map a store error raised while operating on `ticket_id`.
    pub(crate) fn from_store(ticket_id: TicketId, e: StoreError) -> Self {
        match e {
            StoreError::NotFound => EngineError::NotFound(ticket_id),
            other => EngineError::Storage(other),
        }
    }
}
