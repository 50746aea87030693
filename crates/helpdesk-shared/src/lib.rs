//! # helpdesk-shared
//!
//! Domain vocabulary shared by every helpdesk crate: typed identifiers,
//! the closed enum sets used on the wire and in the database, the ticket
//! intake payload with its validation rules, and the id-generation
//! capability injected into the store for deterministic tests.

pub mod ids;
pub mod intake;
pub mod types;

pub use ids::{ConversationId, CustomerId, IdGen, MessageId, RandomIds, TicketId};
pub use intake::{TicketIntake, ValidationError};
pub use types::{Channel, Direction, Priority, Role, TicketStatus, UnknownVariant};
