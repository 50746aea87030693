//! Aggregate numbers for the agent dashboard.

use std::collections::BTreeMap;

use serde::Serialize;

use helpdesk_shared::{Channel, TicketStatus};
use helpdesk_store::Ticket;

use crate::engine::ticket_sentiment;

/// Dashboard rollup over the whole ticket set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analytics {
    pub total_tickets: usize,
    pub resolved_count: usize,
    pub escalated_count: usize,
    /// Mean of each ticket's folded sentiment; 0.5 when there are no tickets.
    pub avg_sentiment: f64,
    /// Ticket count per source channel (all channels present, zero included).
    pub channel_distribution: BTreeMap<String, usize>,
}

/// Compute the rollup.  Pure so it can be tested without a store.
pub fn compute(tickets: &[Ticket]) -> Analytics {
    let mut channel_distribution: BTreeMap<String, usize> = Channel::ALL
        .iter()
        .map(|c| (c.as_str().to_string(), 0))
        .collect();

    let mut resolved_count = 0;
    let mut escalated_count = 0;
    let mut sentiment_sum = 0.0;

    for ticket in tickets {
        match ticket.status {
            TicketStatus::Resolved => resolved_count += 1,
            TicketStatus::Escalated => escalated_count += 1,
            _ => {}
        }
        sentiment_sum += ticket_sentiment(ticket);
        *channel_distribution
            .entry(ticket.source_channel.as_str().to_string())
            .or_insert(0) += 1;
    }

    let avg_sentiment = if tickets.is_empty() {
        0.5
    } else {
        sentiment_sum / tickets.len() as f64
    };

    Analytics {
        total_tickets: tickets.len(),
        resolved_count,
        escalated_count,
        avg_sentiment,
        channel_distribution,
    }
}
