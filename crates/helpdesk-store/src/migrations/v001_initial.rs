//! v001 -- Initial schema creation.
//!
//! Creates the three core tables: `customers`, `tickets`, and `messages`.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Customers
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS customers (
    id         TEXT PRIMARY KEY NOT NULL,   -- UUID v4
    name       TEXT NOT NULL,
    email      TEXT NOT NULL UNIQUE,        -- natural key, exact-match (case-sensitive)
    created_at TEXT NOT NULL,               -- ISO-8601 / RFC-3339
    metadata   TEXT NOT NULL DEFAULT '{}'   -- open-ended JSON object
);

-- ----------------------------------------------------------------
-- Tickets
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS tickets (
    id               TEXT PRIMARY KEY NOT NULL,  -- UUID v4
    conversation_id  TEXT NOT NULL,              -- 1:1 with the ticket
    customer_id      TEXT NOT NULL,              -- FK -> customers(id)
    customer_name    TEXT NOT NULL,              -- snapshot at creation time
    customer_email   TEXT NOT NULL,              -- snapshot at creation time
    source_channel   TEXT NOT NULL,
    subject          TEXT NOT NULL,
    category         TEXT NOT NULL,
    priority         TEXT NOT NULL,
    status           TEXT NOT NULL,
    created_at       TEXT NOT NULL,
    resolved_at      TEXT,
    resolution_notes TEXT,
    ai_suggestions   TEXT,                       -- JSON array of strings

    FOREIGN KEY (customer_id) REFERENCES customers(id)
);

CREATE INDEX IF NOT EXISTS idx_tickets_customer_email ON tickets(customer_email);
CREATE INDEX IF NOT EXISTS idx_tickets_created ON tickets(created_at DESC);

-- ----------------------------------------------------------------
-- Messages (owned by their ticket, append-only)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS messages (
    id              TEXT PRIMARY KEY NOT NULL,  -- UUID v4
    ticket_id       TEXT NOT NULL,              -- FK -> tickets(id)
    conversation_id TEXT NOT NULL,
    channel         TEXT NOT NULL,
    direction       TEXT NOT NULL,              -- inbound | outbound
    role            TEXT NOT NULL,              -- customer | agent | system
    content         TEXT NOT NULL,
    created_at      TEXT NOT NULL,
    sentiment_score REAL,                       -- [0,1], only on scored messages

    FOREIGN KEY (ticket_id) REFERENCES tickets(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_messages_ticket ON messages(ticket_id);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
