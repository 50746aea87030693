//! Domain model structs persisted in the SQLite database.
//!
//! Every struct derives `Serialize` and `Deserialize` so it can be handed
//! directly to the presentation layer as JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use helpdesk_shared::{
    Channel, ConversationId, CustomerId, Direction, MessageId, Priority, Role, TicketId,
    TicketStatus,
};

// ---------------------------------------------------------------------------
// Customer
// ---------------------------------------------------------------------------

/// A known customer identity, keyed by email (at most one per distinct
/// email).  Created lazily on the first ticket from a new address; never
/// deleted, never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    /// Open-ended JSON object, empty for now.
    pub metadata: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// One atomic utterance in a ticket's conversation.  Immutable once stored;
/// the owning ticket appends messages in arrival order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub channel: Channel,
    pub direction: Direction,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// Present only on scored messages; system messages never carry one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment_score: Option<f64>,
}

/// A message as handed to the store, before it is assigned an id and
/// timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMessage {
    pub conversation_id: ConversationId,
    pub channel: Channel,
    pub direction: Direction,
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment_score: Option<f64>,
}

// ---------------------------------------------------------------------------
// Ticket
// ---------------------------------------------------------------------------

/// The unit of support work: one conversation thread plus its resolution
/// state.  Owns its message sequence (a message has no existence outside its
/// ticket's thread); references its customer by id with a name/email snapshot
/// taken at creation time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ticket {
    pub id: TicketId,
    pub conversation_id: ConversationId,
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub customer_email: String,
    pub source_channel: Channel,
    pub subject: String,
    /// Starts as the user-chosen category; the triage verdict may overwrite it.
    pub category: String,
    pub priority: Priority,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_suggestions: Option<Vec<String>>,
    /// Thread in arrival order; `messages[0]` is always the originating
    /// inbound customer message.
    pub messages: Vec<Message>,
}

/// Partial update applied to a ticket with shallow-merge semantics: fields
/// left as `None` keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TicketPatch {
    pub status: Option<TicketStatus>,
    pub category: Option<String>,
    pub resolution_notes: Option<String>,
    pub ai_suggestions: Option<Vec<String>>,
    pub resolved_at: Option<DateTime<Utc>>,
}
