//! Closed day and meal-slot enumerations.
//!
//! The ledger only ever accepts these two enums; free-form day/meal
//! strings are rejected at the parse boundary. Wire tokens match the
//! completion-key format: `Monday`..`Sunday` and camelCase meal slots.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Day of the week, Monday-first.
///
/// The Monday-first ordering is significant: the streak rule walks
/// this order, and Monday (index 0) always starts a fresh streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    /// All days in Monday-first order.
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    /// Position in Monday-first order (Monday = 0 .. Sunday = 6).
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|d| *d == self).unwrap_or(0)
    }

    /// The preceding calendar day, or `None` for Monday.
    pub fn prev(self) -> Option<DayOfWeek> {
        let idx = self.index();
        if idx == 0 {
            None
        } else {
            Some(Self::ALL[idx - 1])
        }
    }

    /// Wire/key token for this day.
    pub fn as_str(self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
            DayOfWeek::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayOfWeek {
    type Err = ValidationError;

    /// Parse a day name, ignoring ASCII case ("monday" == "Monday").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|d| d.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ValidationError::UnknownDay(s.to_string()))
    }
}

/// One of the five meal slots that make up a tracked day.
///
/// Order defines the canonical 5-slot day; completing all five slots
/// implies completing the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MealSlot {
    Breakfast,
    MorningSnack,
    Lunch,
    AfternoonSnack,
    Dinner,
}

impl MealSlot {
    /// All slots in canonical order.
    pub const ALL: [MealSlot; 5] = [
        MealSlot::Breakfast,
        MealSlot::MorningSnack,
        MealSlot::Lunch,
        MealSlot::AfternoonSnack,
        MealSlot::Dinner,
    ];

    /// Wire/key token for this slot.
    pub fn as_str(self) -> &'static str {
        match self {
            MealSlot::Breakfast => "breakfast",
            MealSlot::MorningSnack => "morningSnack",
            MealSlot::Lunch => "lunch",
            MealSlot::AfternoonSnack => "afternoonSnack",
            MealSlot::Dinner => "dinner",
        }
    }

    /// Human-readable label for UI surfaces.
    pub fn label(self) -> &'static str {
        match self {
            MealSlot::Breakfast => "Breakfast",
            MealSlot::MorningSnack => "Morning snack",
            MealSlot::Lunch => "Lunch",
            MealSlot::AfternoonSnack => "Afternoon snack",
            MealSlot::Dinner => "Dinner",
        }
    }
}

impl fmt::Display for MealSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealSlot {
    type Err = ValidationError;

    /// Parse a slot token, ignoring ASCII case ("morningsnack" is
    /// accepted for "morningSnack").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ValidationError::UnknownMealSlot(s.to_string()))
    }
}
