//! # Mealstreak Core Library
//!
//! This library provides the token/streak accounting core of the
//! Mealstreak diet tracker. It implements a core-first philosophy
//! where all operations live in one library, with the CLI binary and
//! any server handler being thin surfaces over the same code.
//!
//! ## Architecture
//!
//! - **Ledger**: a single-user state machine over completion keys --
//!   meal completions accrue 0.1 token, day completions 1 token, and
//!   the streak counter follows Monday-first calendar order
//! - **Storage**: SQLite-based ledger documents behind the
//!   `TokenStore` trait, with an in-memory backend for ephemeral use,
//!   plus TOML-based configuration
//! - **Redemptions**: token spending records (donations and
//!   consultation bookings)
//! - **Service**: per-user ledger registry that serializes operations
//!   for multi-session surfaces
//!
//! ## Key Components
//!
//! - [`TokenLedger`]: core completion/streak state machine
//! - [`TokenStore`]: persistence adapter trait
//! - [`RewardSink`]: fire-and-forget notification trait
//! - [`Config`]: application configuration management

pub mod error;
pub mod events;
pub mod ledger;
pub mod redemption;
pub mod service;
pub mod storage;

pub use error::{ConfigError, CoreError, StoreError, ValidationError};
pub use events::{Event, NullSink, RewardSink};
pub use ledger::{
    Completion, CompletedDayRecord, DayOfWeek, LedgerState, MealSlot, TokenLedger, TokenSummary,
};
pub use redemption::{ConsultRequest, Redemption, RedemptionStatus, RedemptionType};
pub use service::TokenService;
pub use storage::{Config, MemoryStore, SqliteStore, TokenStore};
