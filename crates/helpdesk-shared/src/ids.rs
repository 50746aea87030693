//! Typed identifiers for the domain entities.
//!
//! Every id is a random 128-bit UUID wrapped in a newtype so a ticket id
//! can never be passed where a customer id is expected.  Generation goes
//! through the [`IdGen`] capability so tests can substitute a sequential
//! source and get stable ids.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Source of fresh identifiers.
///
/// The store owns one of these; production code uses [`RandomIds`], tests
/// inject a deterministic implementation.
pub trait IdGen: Send + Sync {
    fn generate(&self) -> Uuid;
}

/// Default id source: UUID v4 (collision-resistant 128-bit random).
pub struct RandomIds;

impl IdGen for RandomIds {
    fn generate(&self) -> Uuid {
        Uuid::new_v4()
    }
}

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Identifies one ticket (unit of support work).
    TicketId
);
id_type!(
    /// Identifies one customer, created at first sight of a new email.
    CustomerId
);
id_type!(
    /// Groups the messages belonging to one ticket's thread (1:1 with the
    /// ticket in this system).
    ConversationId
);
id_type!(
    /// Identifies one message within a conversation.
    MessageId
);
