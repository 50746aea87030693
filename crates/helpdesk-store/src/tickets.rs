//! CRUD operations for [`Ticket`] records.
//!
//! Ticket creation performs the customer lookup-or-create step and stores the
//! ticket together with its seed inbound message in one transaction, so no
//! half-constructed state is ever observable.

use chrono::{DateTime, Utc};
use rusqlite::params;
use serde_json::Map;

use helpdesk_shared::{
    ConversationId, CustomerId, Direction, MessageId, Role, TicketId, TicketIntake, TicketStatus,
};

use crate::customers;
use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::messages::{self, conv_err};
use crate::models::{Customer, Message, Ticket, TicketPatch};

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Create a new ticket from an intake, reusing the customer record for
    /// the email if one exists and creating it otherwise.
    ///
    /// The new ticket starts in [`TicketStatus::Open`] with exactly one
    /// message: the inbound customer message.  Customer, ticket, and seed
    /// message are committed atomically.
    pub fn create_ticket(&mut self, intake: &TicketIntake) -> Result<Ticket> {
        let ids = self.ids();
        let now = Utc::now();

        let tx = self.conn_mut().transaction()?;

        let customer = match customers::find_customer(&tx, &intake.email)? {
            Some(existing) => existing,
            None => {
                let customer = Customer {
                    id: CustomerId::from(ids.generate()),
                    name: intake.name.clone(),
                    email: intake.email.clone(),
                    created_at: now,
                    metadata: Map::new(),
                };
                customers::insert_customer(&tx, &customer)?;
                customer
            }
        };

        let conversation_id = ConversationId::from(ids.generate());
        let seed = Message {
            id: MessageId::from(ids.generate()),
            conversation_id,
            channel: intake.channel,
            direction: Direction::Inbound,
            role: Role::Customer,
            content: intake.message.clone(),
            created_at: now,
            sentiment_score: None,
        };

        let ticket = Ticket {
            id: TicketId::from(ids.generate()),
            conversation_id,
            customer_id: customer.id,
            customer_name: customer.name.clone(),
            customer_email: customer.email.clone(),
            source_channel: intake.channel,
            subject: intake.subject.clone(),
            category: intake.category.clone(),
            priority: intake.priority,
            status: TicketStatus::Open,
            created_at: now,
            resolved_at: None,
            resolution_notes: None,
            ai_suggestions: None,
            messages: vec![seed],
        };

        tx.execute(
            "INSERT INTO tickets
                 (id, conversation_id, customer_id, customer_name, customer_email,
                  source_channel, subject, category, priority, status,
                  created_at, resolved_at, resolution_notes, ai_suggestions)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                ticket.id.to_string(),
                ticket.conversation_id.to_string(),
                ticket.customer_id.to_string(),
                ticket.customer_name,
                ticket.customer_email,
                ticket.source_channel.as_str(),
                ticket.subject,
                ticket.category,
                ticket.priority.as_str(),
                ticket.status.as_str(),
                ticket.created_at.to_rfc3339(),
                Option::<String>::None,
                Option::<String>::None,
                Option::<String>::None,
            ],
        )?;

        messages::insert_message(&tx, ticket.id, &ticket.messages[0])?;

        tx.commit()?;

        tracing::debug!(
            ticket_id = %ticket.id,
            customer_id = %ticket.customer_id,
            "created ticket"
        );
        Ok(ticket)
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// All tickets with their threads, most recently created first.
    pub fn all_tickets(&self) -> Result<Vec<Ticket>> {
        let mut stmt = self.conn().prepare(&format!(
            "{TICKET_SELECT} ORDER BY created_at DESC, rowid DESC"
        ))?;

        let rows = stmt.query_map([], row_to_ticket)?;

        let mut tickets = Vec::new();
        for row in rows {
            tickets.push(self.attach_messages(row?)?);
        }
        Ok(tickets)
    }

    /// Fetch a single ticket with its thread.
    pub fn ticket_by_id(&self, id: TicketId) -> Result<Ticket> {
        let ticket = self
            .conn()
            .query_row(
                &format!("{TICKET_SELECT} WHERE id = ?1"),
                params![id.to_string()],
                row_to_ticket,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })?;
        self.attach_messages(ticket)
    }

    /// All tickets whose snapshot email matches exactly, most recent first.
    pub fn customer_history(&self, email: &str) -> Result<Vec<Ticket>> {
        let mut stmt = self.conn().prepare(&format!(
            "{TICKET_SELECT} WHERE customer_email = ?1
             ORDER BY created_at DESC, rowid DESC"
        ))?;

        let rows = stmt.query_map(params![email], row_to_ticket)?;

        let mut tickets = Vec::new();
        for row in rows {
            tickets.push(self.attach_messages(row?)?);
        }
        Ok(tickets)
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Shallow-merge `patch` into the stored ticket: fields left as `None`
    /// keep their current value.  Returns the merged ticket.
    ///
    /// Fails with [`StoreError::NotFound`] when the id is absent.
    pub fn update_ticket(&self, id: TicketId, patch: &TicketPatch) -> Result<Ticket> {
        let mut ticket = self.ticket_by_id(id)?;

        if let Some(status) = patch.status {
            ticket.status = status;
        }
        if let Some(category) = &patch.category {
            ticket.category = category.clone();
        }
        if let Some(notes) = &patch.resolution_notes {
            ticket.resolution_notes = Some(notes.clone());
        }
        if let Some(suggestions) = &patch.ai_suggestions {
            ticket.ai_suggestions = Some(suggestions.clone());
        }
        if let Some(resolved_at) = patch.resolved_at {
            ticket.resolved_at = Some(resolved_at);
        }

        let suggestions_json = ticket
            .ai_suggestions
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        self.conn().execute(
            "UPDATE tickets
             SET status = ?1, category = ?2, resolution_notes = ?3,
                 ai_suggestions = ?4, resolved_at = ?5
             WHERE id = ?6",
            params![
                ticket.status.as_str(),
                ticket.category,
                ticket.resolution_notes,
                suggestions_json,
                ticket.resolved_at.map(|t| t.to_rfc3339()),
                id.to_string(),
            ],
        )?;

        Ok(ticket)
    }

    fn attach_messages(&self, mut ticket: Ticket) -> Result<Ticket> {
        ticket.messages = messages::load_messages(self.conn(), ticket.id)?;
        Ok(ticket)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const TICKET_SELECT: &str = "SELECT id, conversation_id, customer_id, customer_name, \
     customer_email, source_channel, subject, category, priority, status, \
     created_at, resolved_at, resolution_notes, ai_suggestions FROM tickets";

/// Map a `rusqlite::Row` to a [`Ticket`] with an empty thread; callers attach
/// the messages afterwards.
fn row_to_ticket(row: &rusqlite::Row<'_>) -> rusqlite::Result<Ticket> {
    let id_str: String = row.get(0)?;
    let conversation_str: String = row.get(1)?;
    let customer_id_str: String = row.get(2)?;
    let customer_name: String = row.get(3)?;
    let customer_email: String = row.get(4)?;
    let channel_str: String = row.get(5)?;
    let subject: String = row.get(6)?;
    let category: String = row.get(7)?;
    let priority_str: String = row.get(8)?;
    let status_str: String = row.get(9)?;
    let created_str: String = row.get(10)?;
    let resolved_str: Option<String> = row.get(11)?;
    let resolution_notes: Option<String> = row.get(12)?;
    let suggestions_str: Option<String> = row.get(13)?;

    let id = TicketId::parse(&id_str).map_err(|e| conv_err(0, e))?;
    let conversation_id =
        ConversationId::parse(&conversation_str).map_err(|e| conv_err(1, e))?;
    let customer_id = CustomerId::parse(&customer_id_str).map_err(|e| conv_err(2, e))?;
    let source_channel = channel_str.parse().map_err(|e| conv_err(5, e))?;
    let priority = priority_str.parse().map_err(|e| conv_err(8, e))?;
    let status = status_str.parse().map_err(|e| conv_err(9, e))?;

    let created_at = parse_timestamp(&created_str).map_err(|e| conv_err(10, e))?;
    let resolved_at = resolved_str
        .as_deref()
        .map(parse_timestamp)
        .transpose()
        .map_err(|e| conv_err(11, e))?;

    let ai_suggestions: Option<Vec<String>> = suggestions_str
        .as_deref()
        .map(serde_json::from_str)
        .transpose()
        .map_err(|e| conv_err(13, e))?;

    Ok(Ticket {
        id,
        conversation_id,
        customer_id,
        customer_name,
        customer_email,
        source_channel,
        subject,
        category,
        priority,
        status,
        created_at,
        resolved_at,
        resolution_notes,
        ai_suggestions,
        messages: Vec::new(),
    })
}

fn parse_timestamp(s: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    use helpdesk_shared::{Channel, IdGen, Priority, TicketIntake};
    use uuid::Uuid;

    use super::*;
    use crate::models::NewMessage;

    /// Deterministic id source: 1, 2, 3, ... as UUIDs.
    struct SeqIds(AtomicU64);

    impl IdGen for SeqIds {
        fn generate(&self) -> Uuid {
            Uuid::from_u128(self.0.fetch_add(1, Ordering::SeqCst) as u128)
        }
    }

    fn open_db(dir: &tempfile::TempDir) -> Database {
        let path = dir.path().join("helpdesk.db");
        Database::open_at(&path, Arc::new(SeqIds(AtomicU64::new(1)))).unwrap()
    }

    fn intake(email: &str, subject: &str) -> TicketIntake {
        TicketIntake {
            name: "Ann Lee".to_string(),
            email: email.to_string(),
            subject: subject.to_string(),
            category: "general".to_string(),
            priority: Priority::Medium,
            channel: Channel::WebForm,
            message: "Something is broken and I need help".to_string(),
        }
    }

    #[test]
    fn create_ticket_seeds_one_inbound_message() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = open_db(&dir);

        let ticket = db.create_ticket(&intake("ann@x.com", "Cannot log in")).unwrap();

        assert_eq!(ticket.status, TicketStatus::Open);
        assert_eq!(ticket.messages.len(), 1);
        assert_eq!(ticket.messages[0].direction, Direction::Inbound);
        assert_eq!(ticket.messages[0].role, Role::Customer);
        assert_eq!(ticket.messages[0].sentiment_score, None);

        let reread = db.ticket_by_id(ticket.id).unwrap();
        assert_eq!(reread, ticket);
    }

    #[test]
    fn same_email_reuses_customer_different_email_does_not() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = open_db(&dir);

        let first = db.create_ticket(&intake("ann@x.com", "First issue")).unwrap();
        let second = db.create_ticket(&intake("ann@x.com", "Second issue")).unwrap();
        let third = db.create_ticket(&intake("bob@y.com", "Other issue")).unwrap();

        assert_eq!(first.customer_id, second.customer_id);
        assert_ne!(first.customer_id, third.customer_id);
        assert_eq!(db.all_customers().unwrap().len(), 2);
    }

    #[test]
    fn email_match_is_case_sensitive() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = open_db(&dir);

        let lower = db.create_ticket(&intake("ann@x.com", "First issue")).unwrap();
        let upper = db.create_ticket(&intake("Ann@x.com", "Second issue")).unwrap();

        assert_ne!(lower.customer_id, upper.customer_id);
        assert_eq!(db.customer_history("ann@x.com").unwrap().len(), 1);
    }

    #[test]
    fn all_tickets_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = open_db(&dir);

        let first = db.create_ticket(&intake("ann@x.com", "First issue")).unwrap();
        let second = db.create_ticket(&intake("ann@x.com", "Second issue")).unwrap();

        let all = db.all_tickets().unwrap();
        assert_eq!(all.len(), 2);
        // Both may share a creation timestamp; rowid breaks the tie.
        assert_eq!(all[0].id, second.id);
        assert_eq!(all[1].id, first.id);
    }

    #[test]
    fn update_ticket_merges_shallowly() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = open_db(&dir);

        let ticket = db.create_ticket(&intake("ann@x.com", "Cannot log in")).unwrap();

        db.update_ticket(
            ticket.id,
            &TicketPatch {
                status: Some(TicketStatus::Escalated),
                resolution_notes: Some("customer mentioned legal action".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        // Second patch omits status and notes; both must be retained.
        let merged = db
            .update_ticket(
                ticket.id,
                &TicketPatch {
                    category: Some("Technical".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(merged.status, TicketStatus::Escalated);
        assert_eq!(
            merged.resolution_notes.as_deref(),
            Some("customer mentioned legal action")
        );
        assert_eq!(merged.category, "Technical");

        let reread = db.ticket_by_id(ticket.id).unwrap();
        assert_eq!(reread.status, TicketStatus::Escalated);
        assert_eq!(reread.category, "Technical");
    }

    #[test]
    fn update_missing_ticket_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let db = open_db(&dir);

        let missing = TicketId::new();
        let err = db.update_ticket(missing, &TicketPatch::default()).unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[test]
    fn append_message_preserves_thread_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = open_db(&dir);

        let ticket = db.create_ticket(&intake("ann@x.com", "Cannot log in")).unwrap();

        for (n, score) in [(1, Some(0.2)), (2, None), (3, Some(0.9))] {
            db.append_message(
                ticket.id,
                NewMessage {
                    conversation_id: ticket.conversation_id,
                    channel: ticket.source_channel,
                    direction: Direction::Outbound,
                    role: Role::Agent,
                    content: format!("reply {n}"),
                    sentiment_score: score,
                },
            )
            .unwrap();
        }

        let thread = db.messages_for_ticket(ticket.id).unwrap();
        assert_eq!(thread.len(), 4);
        assert_eq!(thread[0].role, Role::Customer);
        assert_eq!(thread[1].content, "reply 1");
        assert_eq!(thread[3].content, "reply 3");
        assert_eq!(thread[3].sentiment_score, Some(0.9));
    }

    #[test]
    fn append_to_missing_ticket_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let db = open_db(&dir);

        let err = db
            .append_message(
                TicketId::new(),
                NewMessage {
                    conversation_id: ConversationId::new(),
                    channel: Channel::Email,
                    direction: Direction::Outbound,
                    role: Role::Agent,
                    content: "hello".to_string(),
                    sentiment_score: None,
                },
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }
}
