//! CRUD operations for [`Customer`] records.
//!
//! Customer lookup is by exact email equality, case-sensitive.  The source
//! system behaves the same way even though email local parts are commonly
//! treated case-insensitively; kept as-is.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use helpdesk_shared::CustomerId;

use crate::database::Database;
use crate::error::Result;
use crate::models::Customer;

impl Database {
    /// Fetch a customer by exact email, if one exists.
    pub fn customer_by_email(&self, email: &str) -> Result<Option<Customer>> {
        find_customer(self.conn(), email)
    }

    /// List all known customers, oldest first.
    pub fn all_customers(&self) -> Result<Vec<Customer>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, name, email, created_at, metadata
             FROM customers
             ORDER BY created_at ASC",
        )?;

        let rows = stmt.query_map([], row_to_customer)?;

        let mut customers = Vec::new();
        for row in rows {
            customers.push(row?);
        }
        Ok(customers)
    }
}

/// Look up a customer by exact email on an open connection (also usable
/// inside a transaction).
pub(crate) fn find_customer(conn: &Connection, email: &str) -> Result<Option<Customer>> {
    let result = conn.query_row(
        "SELECT id, name, email, created_at, metadata
         FROM customers
         WHERE email = ?1",
        params![email],
        row_to_customer,
    );

    match result {
        Ok(customer) => Ok(Some(customer)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(other) => Err(other.into()),
    }
}

/// Insert a new customer row.
pub(crate) fn insert_customer(conn: &Connection, customer: &Customer) -> Result<()> {
    conn.execute(
        "INSERT INTO customers (id, name, email, created_at, metadata)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            customer.id.to_string(),
            customer.name,
            customer.email,
            customer.created_at.to_rfc3339(),
            serde_json::to_string(&customer.metadata)?,
        ],
    )?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Map a `rusqlite::Row` to a [`Customer`].
fn row_to_customer(row: &rusqlite::Row<'_>) -> rusqlite::Result<Customer> {
    let id_str: String = row.get(0)?;
    let name: String = row.get(1)?;
    let email: String = row.get(2)?;
    let created_str: String = row.get(3)?;
    let metadata_str: String = row.get(4)?;

    let id = CustomerId::parse(&id_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&created_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?;

    let metadata = serde_json::from_str(&metadata_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Customer {
        id,
        name,
        email,
        created_at,
        metadata,
    })
}
