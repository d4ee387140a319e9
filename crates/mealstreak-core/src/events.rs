use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ledger::{DayOfWeek, MealSlot};

/// Every ledger mutation produces an Event.
/// The presentation layer consumes these through a [`RewardSink`]
/// (e.g. to run a "+0.1 token" animation); nothing in the core ever
/// waits on the sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A meal slot was marked done and 0.1 token was awarded.
    MealCompleted {
        day: DayOfWeek,
        meal: MealSlot,
        completion_key: String,
        amount: f64,
        at: DateTime<Utc>,
    },
    /// A whole day became complete, either explicitly or because its
    /// fifth meal slot was marked done.
    DayCompleted {
        day: DayOfWeek,
        completion_key: String,
        /// Award carried by this event: 1.0 for an explicit day
        /// completion, 0.0 when the day rolled up from meal awards.
        amount: f64,
        streak: u32,
        at: DateTime<Utc>,
    },
    /// Tokens were spent on a redemption. `amount` is negative.
    TokensRedeemed {
        redemption_id: Uuid,
        amount: f64,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// The token delta this event represents.
    pub fn amount(&self) -> f64 {
        match self {
            Event::MealCompleted { amount, .. }
            | Event::DayCompleted { amount, .. }
            | Event::TokensRedeemed { amount, .. } => *amount,
        }
    }
}

/// Fire-and-forget notification sink.
///
/// Implementations must not block and must not fail; the ledger
/// ignores whatever the sink does with the event.
pub trait RewardSink: Send {
    fn notify(&self, event: &Event);
}

/// Sink that discards all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl RewardSink for NullSink {
    fn notify(&self, _event: &Event) {}
}
