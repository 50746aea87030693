//! CRUD operations for [`Message`] records.
//!
//! Messages are append-only: once stored they are never updated or removed,
//! and thread order is insertion order.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use helpdesk_shared::{ConversationId, MessageId, TicketId};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::{Message, NewMessage};

impl Database {
    /// Assign an id and timestamp to `new`, append it to the ticket's thread,
    /// and return the stored message.
    ///
    /// Fails with [`StoreError::NotFound`] when the ticket id is absent.
    pub fn append_message(&self, ticket_id: TicketId, new: NewMessage) -> Result<Message> {
        let exists: bool = self.conn().query_row(
            "SELECT EXISTS(SELECT 1 FROM tickets WHERE id = ?1)",
            params![ticket_id.to_string()],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(StoreError::NotFound);
        }

        let message = Message {
            id: MessageId::from(self.ids().generate()),
            conversation_id: new.conversation_id,
            channel: new.channel,
            direction: new.direction,
            role: new.role,
            content: new.content,
            created_at: Utc::now(),
            sentiment_score: new.sentiment_score,
        };

        insert_message(self.conn(), ticket_id, &message)?;
        Ok(message)
    }

    /// The ticket's thread in arrival order.
    pub fn messages_for_ticket(&self, ticket_id: TicketId) -> Result<Vec<Message>> {
        load_messages(self.conn(), ticket_id)
    }
}

/// Insert one message row (also usable inside a transaction).
pub(crate) fn insert_message(
    conn: &Connection,
    ticket_id: TicketId,
    message: &Message,
) -> Result<()> {
    conn.execute(
        "INSERT INTO messages
             (id, ticket_id, conversation_id, channel, direction, role,
              content, created_at, sentiment_score)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            message.id.to_string(),
            ticket_id.to_string(),
            message.conversation_id.to_string(),
            message.channel.as_str(),
            message.direction.as_str(),
            message.role.as_str(),
            message.content,
            message.created_at.to_rfc3339(),
            message.sentiment_score,
        ],
    )?;
    Ok(())
}

/// Load a ticket's messages in insertion order.  `rowid` rather than the
/// timestamp breaks ties between messages stored in the same millisecond.
pub(crate) fn load_messages(conn: &Connection, ticket_id: TicketId) -> Result<Vec<Message>> {
    let mut stmt = conn.prepare(
        "SELECT id, conversation_id, channel, direction, role,
                content, created_at, sentiment_score
         FROM messages
         WHERE ticket_id = ?1
         ORDER BY rowid ASC",
    )?;

    let rows = stmt.query_map(params![ticket_id.to_string()], row_to_message)?;

    let mut messages = Vec::new();
    for row in rows {
        messages.push(row?);
    }
    Ok(messages)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Map a `rusqlite::Row` to a [`Message`].
fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    let id_str: String = row.get(0)?;
    let conversation_str: String = row.get(1)?;
    let channel_str: String = row.get(2)?;
    let direction_str: String = row.get(3)?;
    let role_str: String = row.get(4)?;
    let content: String = row.get(5)?;
    let created_str: String = row.get(6)?;
    let sentiment_score: Option<f64> = row.get(7)?;

    let id = MessageId::parse(&id_str).map_err(|e| conv_err(0, e))?;
    let conversation_id =
        ConversationId::parse(&conversation_str).map_err(|e| conv_err(1, e))?;
    let channel = channel_str.parse().map_err(|e| conv_err(2, e))?;
    let direction = direction_str.parse().map_err(|e| conv_err(3, e))?;
    let role = role_str.parse().map_err(|e| conv_err(4, e))?;

    let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&created_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conv_err(6, e))?;

    Ok(Message {
        id,
        conversation_id,
        channel,
        direction,
        role,
        content,
        created_at,
        sentiment_score,
    })
}

pub(crate) fn conv_err<E>(idx: usize, e: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
}
