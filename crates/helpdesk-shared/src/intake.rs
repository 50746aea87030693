//! Ticket intake payload and its validation rules.
//!
//! Validation runs before any store call: a rejected intake persists
//! nothing and the caller simply re-prompts.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Channel, Priority};

/// A new inquiry as submitted by the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketIntake {
    pub name: String,
    pub email: String,
    pub subject: String,
    /// User-chosen starting category; the triage verdict may overwrite it.
    pub category: String,
    pub priority: Priority,
    pub channel: Channel,
    pub message: String,
}

/// Caller-facing rejection of malformed input.  Recoverable: nothing was
/// persisted, the caller fixes the field and retries.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("name must be at least 2 characters")]
    NameTooShort,

    #[error("invalid email address")]
    InvalidEmail,

    #[error("subject must be at least 5 characters")]
    SubjectTooShort,

    #[error("message must be at least 10 characters")]
    MessageTooShort,

    #[error("reply text must not be empty")]
    EmptyReply,
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static regex"))
}

impl TicketIntake {
    /// Check all intake fields.  Lengths are measured on trimmed input.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().chars().count() < 2 {
            return Err(ValidationError::NameTooShort);
        }
        if !email_regex().is_match(&self.email) {
            return Err(ValidationError::InvalidEmail);
        }
        if self.subject.trim().chars().count() < 5 {
            return Err(ValidationError::SubjectTooShort);
        }
        if self.message.trim().chars().count() < 10 {
            return Err(ValidationError::MessageTooShort);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_intake() -> TicketIntake {
        TicketIntake {
            name: "Ann Lee".to_string(),
            email: "ann@x.com".to_string(),
            subject: "Cannot log in".to_string(),
            category: "technical".to_string(),
            priority: Priority::High,
            channel: Channel::WebForm,
            message: "I keep getting an error page".to_string(),
        }
    }

    #[test]
    fn accepts_well_formed_intake() {
        assert_eq!(valid_intake().validate(), Ok(()));
    }

    #[test]
    fn rejects_short_name() {
        let mut intake = valid_intake();
        intake.name = " a ".to_string();
        assert_eq!(intake.validate(), Err(ValidationError::NameTooShort));
    }

    #[test]
    fn rejects_malformed_email() {
        for bad in ["ann", "ann@x", "ann x@y.com", "@x.com"] {
            let mut intake = valid_intake();
            intake.email = bad.to_string();
            assert_eq!(intake.validate(), Err(ValidationError::InvalidEmail), "{bad}");
        }
    }

    #[test]
    fn rejects_short_subject_and_message() {
        let mut intake = valid_intake();
        intake.subject = "Help".to_string();
        assert_eq!(intake.validate(), Err(ValidationError::SubjectTooShort));

        let mut intake = valid_intake();
        intake.message = "broken".to_string();
        assert_eq!(intake.validate(), Err(ValidationError::MessageTooShort));
    }
}
