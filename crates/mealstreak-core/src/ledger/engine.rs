//! Token/streak ledger engine.
//!
//! The ledger is a single-user state machine: each operation runs to
//! completion (mutate in memory, persist, notify) before the next one
//! is accepted. Persistence and notification are fire-and-forget --
//! a failed save never rolls back the in-memory mutation.
//!
//! ## Accounting
//!
//! Tokens are held as integer tenths (`token_tenths`). A meal award
//! is +1 tenth, a whole-day award is +10 tenths, redemption costs are
//! whole tokens. Balances are therefore always exact to one decimal
//! place; no float drift can accumulate.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::slots::{DayOfWeek, MealSlot};
use super::week::{day_key, meal_key, week_key};
use crate::error::{CoreError, Result, ValidationError};
use crate::events::{Event, RewardSink};
use crate::redemption::{ConsultRequest, Redemption};
use crate::storage::TokenStore;

/// Tenths of a token awarded per completed meal slot.
pub const MEAL_AWARD_TENTHS: u64 = 1;
/// Tenths of a token awarded per explicitly completed day.
pub const DAY_AWARD_TENTHS: u64 = 10;

/// One completed day as the server document records it: the calendar
/// date the completion happened plus the plan day that was completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedDayRecord {
    pub date: NaiveDate,
    pub day_of_week: DayOfWeek,
}

/// The persisted ledger document, one per user.
///
/// Union of the meal-level completion-key shape and the dated
/// day-record shape so a single contract serves both the client and
/// server surfaces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LedgerState {
    /// Token balance in tenths of a token.
    pub token_tenths: u64,
    pub streak: u32,
    /// Day-level completion keys, e.g. `2023-W30-Monday`.
    pub completed_days: BTreeSet<String>,
    /// Meal-level completion keys, e.g. `2023-W30-Monday-breakfast`.
    pub completed_meals: BTreeSet<String>,
    /// Dated day completions, in completion order.
    pub completed_day_records: Vec<CompletedDayRecord>,
    pub last_completed_at: Option<DateTime<Utc>>,
}

impl LedgerState {
    /// Balance in whole tokens, exact to one decimal.
    pub fn tokens(&self) -> f64 {
        self.token_tenths as f64 / 10.0
    }
}

/// Outcome of a completion operation. Re-marking an already-complete
/// meal or day is a silent no-op, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Awarded {
        amount_tenths: u64,
        /// Whether this operation made the whole day complete.
        day_completed: bool,
        streak: u32,
    },
    AlreadyComplete,
}

impl Completion {
    pub fn is_awarded(&self) -> bool {
        matches!(self, Completion::Awarded { .. })
    }

    /// Token delta of this outcome.
    pub fn amount(&self) -> f64 {
        match self {
            Completion::Awarded { amount_tenths, .. } => *amount_tenths as f64 / 10.0,
            Completion::AlreadyComplete => 0.0,
        }
    }
}

/// Wire-shaped summary of the ledger, as served by `GET /tokens`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSummary {
    pub total_tokens: f64,
    pub current_streak: u32,
    pub completed_days: Vec<CompletedDayRecord>,
    pub completed_meal_keys: Vec<String>,
    pub last_completed_at: Option<DateTime<Utc>>,
    /// Set when the most recent save failed; the in-memory state is
    /// still authoritative.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persist_error: Option<String>,
}

/// The token/streak ledger for one user.
pub struct TokenLedger {
    user_id: String,
    state: LedgerState,
    store: Box<dyn TokenStore>,
    sink: Box<dyn RewardSink>,
    last_persist_error: Option<String>,
}

impl TokenLedger {
    /// Load the ledger from the store, initializing a zeroed state
    /// when the store has no document for this user.
    pub fn open(
        user_id: &str,
        store: Box<dyn TokenStore>,
        sink: Box<dyn RewardSink>,
    ) -> Result<Self> {
        let state = store.load()?.unwrap_or_default();
        Ok(Self {
            user_id: user_id.to_string(),
            state,
            store,
            sink,
            last_persist_error: None,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn tokens(&self) -> f64 {
        self.state.tokens()
    }

    pub fn streak(&self) -> u32 {
        self.state.streak
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    /// Error message from the most recent failed save, if any.
    pub fn last_persist_error(&self) -> Option<&str> {
        self.last_persist_error.as_deref()
    }

    pub fn summary(&self) -> TokenSummary {
        TokenSummary {
            total_tokens: self.state.tokens(),
            current_streak: self.state.streak,
            completed_days: self.state.completed_day_records.clone(),
            completed_meal_keys: self.state.completed_meals.iter().cloned().collect(),
            last_completed_at: self.state.last_completed_at,
            persist_error: self.last_persist_error.clone(),
        }
    }

    /// Redemption history, newest first.
    pub fn redemptions(&self) -> Result<Vec<Redemption>> {
        Ok(self.store.redemptions()?)
    }

    // ── Completion operations ────────────────────────────────────────

    /// Mark one meal slot done for today's week. +0.1 token, or a
    /// no-op when the slot is already complete.
    pub fn complete_meal(&mut self, day: DayOfWeek, meal: MealSlot) -> Completion {
        self.complete_meal_on(Utc::now().date_naive(), day, meal)
    }

    /// `complete_meal` against an explicit calendar date.
    pub fn complete_meal_on(&mut self, date: NaiveDate, day: DayOfWeek, meal: MealSlot) -> Completion {
        let week = week_key(date);
        let mkey = meal_key(&week, day, meal);
        if self.state.completed_meals.contains(&mkey) {
            return Completion::AlreadyComplete;
        }

        self.state.completed_meals.insert(mkey.clone());
        self.state.token_tenths += MEAL_AWARD_TENTHS;

        // The fifth slot rolls the whole day up.
        let all_slots_done = MealSlot::ALL
            .iter()
            .all(|m| self.state.completed_meals.contains(&meal_key(&week, day, *m)));
        let day_completed = all_slots_done && self.mark_day_complete(date, &week, day);

        self.persist();

        let at = Utc::now();
        self.sink.notify(&Event::MealCompleted {
            day,
            meal,
            completion_key: mkey,
            amount: MEAL_AWARD_TENTHS as f64 / 10.0,
            at,
        });
        if day_completed {
            self.sink.notify(&Event::DayCompleted {
                day,
                completion_key: day_key(&week, day),
                amount: 0.0,
                streak: self.state.streak,
                at,
            });
        }

        Completion::Awarded {
            amount_tenths: MEAL_AWARD_TENTHS,
            day_completed,
            streak: self.state.streak,
        }
    }

    /// Mark a whole day done for today's week. +1 token and all five
    /// meal slots folded in, or a no-op when the day is already
    /// complete.
    pub fn complete_day(&mut self, day: DayOfWeek) -> Completion {
        self.complete_day_on(Utc::now().date_naive(), day)
    }

    /// `complete_day` against an explicit calendar date.
    pub fn complete_day_on(&mut self, date: NaiveDate, day: DayOfWeek) -> Completion {
        let week = week_key(date);
        let dkey = day_key(&week, day);
        if self.state.completed_days.contains(&dkey) {
            return Completion::AlreadyComplete;
        }

        // Bulk-mark all slots. Slots completed earlier keep their meal
        // awards; the day shortcut itself pays 1 whole token, never a
        // per-slot top-up.
        for meal in MealSlot::ALL {
            self.state.completed_meals.insert(meal_key(&week, day, meal));
        }
        self.state.token_tenths += DAY_AWARD_TENTHS;
        self.mark_day_complete(date, &week, day);

        self.persist();

        self.sink.notify(&Event::DayCompleted {
            day,
            completion_key: dkey,
            amount: DAY_AWARD_TENTHS as f64 / 10.0,
            streak: self.state.streak,
            at: Utc::now(),
        });

        Completion::Awarded {
            amount_tenths: DAY_AWARD_TENTHS,
            day_completed: true,
            streak: self.state.streak,
        }
    }

    // ── Redemption operations ────────────────────────────────────────

    /// Spend tokens on a food donation.
    pub fn redeem_donate(&mut self, cost: u64) -> Result<Redemption> {
        let cost_tenths = self.check_balance(cost)?;
        self.state.token_tenths -= cost_tenths;
        let redemption = Redemption::donate(&self.user_id, cost);
        self.record_redemption(&redemption);
        Ok(redemption)
    }

    /// Spend tokens on a dietitian consultation booking.
    pub fn redeem_consult(&mut self, cost: u64, request: ConsultRequest) -> Result<Redemption> {
        request.validate()?;
        let cost_tenths = self.check_balance(cost)?;
        self.state.token_tenths -= cost_tenths;
        let redemption = Redemption::consult(&self.user_id, cost, request);
        self.record_redemption(&redemption);
        Ok(redemption)
    }

    /// Validate a whole-token cost against the balance. Returns the
    /// cost in tenths. Costs whose tenths would not fit in the balance
    /// type are rejected outright, since configs carry arbitrary u64s.
    fn check_balance(&self, cost: u64) -> Result<u64> {
        let cost_tenths = cost.checked_mul(10).ok_or_else(|| {
            CoreError::Validation(ValidationError::InvalidValue {
                field: "cost".to_string(),
                message: format!("cost {cost} is out of range"),
            })
        })?;
        if self.state.token_tenths < cost_tenths {
            return Err(CoreError::InsufficientBalance {
                cost,
                balance: self.state.tokens(),
            });
        }
        Ok(cost_tenths)
    }

    fn record_redemption(&mut self, redemption: &Redemption) {
        if let Err(e) = self.store.record_redemption(redemption) {
            self.last_persist_error = Some(e.to_string());
        }
        self.persist();
        self.sink.notify(&Event::TokensRedeemed {
            redemption_id: redemption.id,
            amount: -(redemption.cost as f64),
            at: Utc::now(),
        });
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Insert the day key and recompute the streak. Returns `false`
    /// when the day was already complete.
    fn mark_day_complete(&mut self, date: NaiveDate, week: &str, day: DayOfWeek) -> bool {
        if !self.state.completed_days.insert(day_key(week, day)) {
            return false;
        }
        self.state.completed_day_records.push(CompletedDayRecord {
            date,
            day_of_week: day,
        });
        self.state.last_completed_at = Some(Utc::now());
        self.recompute_streak(week, day);
        true
    }

    /// Streak rule: Monday always starts a fresh streak; any other day
    /// extends the streak only when the preceding day of the same week
    /// is complete. A lone completed day still counts as streak 1.
    fn recompute_streak(&mut self, week: &str, day: DayOfWeek) {
        self.state.streak = match day.prev() {
            None => 1,
            Some(prev) if self.state.completed_days.contains(&day_key(week, prev)) => {
                self.state.streak + 1
            }
            Some(_) => 1,
        };
    }

    /// Save the ledger document, keeping the in-memory mutation on
    /// failure.
    fn persist(&mut self) {
        match self.store.save(&self.state) {
            Ok(()) => self.last_persist_error = None,
            Err(e) => self.last_persist_error = Some(e.to_string()),
        }
    }
}
