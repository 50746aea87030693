//! Closed enum sets used on the wire and in the database.
//!
//! All enums serialize as `snake_case` strings so the JSON surface and the
//! SQLite text columns carry the same values.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raised when a stored or incoming string is not a member of a closed set.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// The channel an inquiry arrived through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Email,
    Whatsapp,
    WebForm,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Email, Channel::Whatsapp, Channel::WebForm];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Whatsapp => "whatsapp",
            Channel::WebForm => "web_form",
        }
    }
}

impl std::str::FromStr for Channel {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(Channel::Email),
            "whatsapp" => Ok(Channel::Whatsapp),
            "web_form" => Ok(Channel::WebForm),
            other => Err(UnknownVariant {
                kind: "channel",
                value: other.to_string(),
            }),
        }
    }
}

/// Lifecycle state of a ticket.
///
/// `Processing` is a transient state a reader may observe while triage is in
/// flight; a completed submission always lands on `Resolved` or `Escalated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    Processing,
    Resolved,
    Escalated,
    AwaitingHuman,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::Processing => "processing",
            TicketStatus::Resolved => "resolved",
            TicketStatus::Escalated => "escalated",
            TicketStatus::AwaitingHuman => "awaiting_human",
        }
    }
}

impl std::str::FromStr for TicketStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(TicketStatus::Open),
            "processing" => Ok(TicketStatus::Processing),
            "resolved" => Ok(TicketStatus::Resolved),
            "escalated" => Ok(TicketStatus::Escalated),
            "awaiting_human" => Ok(TicketStatus::AwaitingHuman),
            other => Err(UnknownVariant {
                kind: "ticket status",
                value: other.to_string(),
            }),
        }
    }
}

/// Priority chosen by the customer at intake; the lifecycle never changes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(UnknownVariant {
                kind: "priority",
                value: other.to_string(),
            }),
        }
    }
}

/// Whether a message came from the customer or went out to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Inbound,
    Outbound,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Inbound => "inbound",
            Direction::Outbound => "outbound",
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inbound" => Ok(Direction::Inbound),
            "outbound" => Ok(Direction::Outbound),
            other => Err(UnknownVariant {
                kind: "direction",
                value: other.to_string(),
            }),
        }
    }
}

/// Who authored a message.
///
/// `System` messages are lifecycle annotations (e.g. a handover note), not
/// conversation content, and never carry a sentiment score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Agent,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Agent => "agent",
            Role::System => "system",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Role::Customer),
            "agent" => Ok(Role::Agent),
            "system" => Ok(Role::System),
            other => Err(UnknownVariant {
                kind: "role",
                value: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_round_trip_through_strings() {
        for channel in Channel::ALL {
            assert_eq!(channel.as_str().parse::<Channel>().unwrap(), channel);
        }
        for status in [
            TicketStatus::Open,
            TicketStatus::Processing,
            TicketStatus::Resolved,
            TicketStatus::Escalated,
            TicketStatus::AwaitingHuman,
        ] {
            assert_eq!(status.as_str().parse::<TicketStatus>().unwrap(), status);
        }
    }

    #[test]
    fn serde_uses_snake_case() {
        assert_eq!(
            serde_json::to_string(&TicketStatus::AwaitingHuman).unwrap(),
            "\"awaiting_human\""
        );
        assert_eq!(serde_json::to_string(&Channel::WebForm).unwrap(), "\"web_form\"");
    }

    #[test]
    fn unknown_value_is_rejected() {
        let err = "closed".parse::<TicketStatus>().unwrap_err();
        assert_eq!(err.value, "closed");
    }
}
