mod engine;
mod slots;
pub mod week;

pub use engine::{
    Completion, CompletedDayRecord, LedgerState, TokenLedger, TokenSummary, DAY_AWARD_TENTHS,
    MEAL_AWARD_TENTHS,
};
pub use slots::{DayOfWeek, MealSlot};
