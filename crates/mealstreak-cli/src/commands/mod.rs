pub mod config;
pub mod redeem;
pub mod tokens;

use mealstreak_core::storage::SqliteStore;
use mealstreak_core::{Config, Event, NullSink, RewardSink, TokenLedger};

/// Prints reward feedback to stderr, the CLI's stand-in for the UI's
/// token animation overlay.
pub struct StderrSink;

impl RewardSink for StderrSink {
    fn notify(&self, event: &Event) {
        let amount = event.amount();
        if amount > 0.0 {
            let unit = if amount == 1.0 { "token" } else { "tokens" };
            eprintln!("+{amount} {unit}");
        } else if amount < 0.0 {
            eprintln!("{amount} tokens");
        }
    }
}

/// Resolve the acting user: explicit flag first, then config.
pub fn resolve_user(flag: Option<String>, cfg: &Config) -> String {
    flag.unwrap_or_else(|| cfg.user.clone())
}

/// Open the durable ledger for a user, wiring the reward sink unless
/// notifications are disabled.
pub fn open_ledger(user: &str, cfg: &Config) -> Result<TokenLedger, Box<dyn std::error::Error>> {
    let store = SqliteStore::open(user)?;
    let sink: Box<dyn RewardSink> = if cfg.notifications.enabled {
        Box::new(StderrSink)
    } else {
        Box::new(NullSink)
    };
    Ok(TokenLedger::open(user, Box::new(store), sink)?)
}
