mod config;
pub mod database;
mod memory;

pub use config::Config;
pub use database::SqliteStore;
pub use memory::MemoryStore;

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::StoreError;
use crate::ledger::LedgerState;
use crate::redemption::Redemption;

/// Persistence adapter the ledger reads at startup and writes after
/// every mutation.
///
/// Two interchangeable backends ship with the core: the durable
/// per-user [`SqliteStore`] and the ephemeral [`MemoryStore`].
/// `load` returning `Ok(None)` means no document exists yet; the
/// ledger then starts from a zeroed state.
pub trait TokenStore: Send {
    fn load(&self) -> Result<Option<LedgerState>, StoreError>;
    fn save(&self, state: &LedgerState) -> Result<(), StoreError>;
    /// Upsert a redemption record.
    fn record_redemption(&self, redemption: &Redemption) -> Result<(), StoreError>;
    /// Redemption history, newest first.
    fn redemptions(&self) -> Result<Vec<Redemption>, StoreError>;
}

impl<S: TokenStore + Send + Sync> TokenStore for Arc<S> {
    fn load(&self) -> Result<Option<LedgerState>, StoreError> {
        (**self).load()
    }
    fn save(&self, state: &LedgerState) -> Result<(), StoreError> {
        (**self).save(state)
    }
    fn record_redemption(&self, redemption: &Redemption) -> Result<(), StoreError> {
        (**self).record_redemption(redemption)
    }
    fn redemptions(&self) -> Result<Vec<Redemption>, StoreError> {
        (**self).redemptions()
    }
}

/// Returns `~/.config/mealstreak[-dev]/` based on MEALSTREAK_ENV.
///
/// Set MEALSTREAK_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("MEALSTREAK_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("mealstreak-dev")
    } else {
        base_dir.join("mealstreak")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    // HOME and MEALSTREAK_ENV are process-global, so all data-dir
    // assertions live in this one test.
    #[test]
    fn data_dir_honors_home_and_env_switch() {
        let home = tempfile::TempDir::new().unwrap();
        std::env::set_var("HOME", home.path());

        std::env::remove_var("MEALSTREAK_ENV");
        let dir = data_dir().unwrap();
        assert_eq!(dir, home.path().join(".config").join("mealstreak"));
        assert!(dir.is_dir());

        std::env::set_var("MEALSTREAK_ENV", "dev");
        let dev_dir = data_dir().unwrap();
        assert_eq!(dev_dir, home.path().join(".config").join("mealstreak-dev"));
        assert!(dev_dir.is_dir());

        // The durable store lands inside the resolved directory.
        let store = SqliteStore::open("user-1").unwrap();
        assert!(store.load().unwrap().is_none());
        store.save(&LedgerState::default()).unwrap();
        assert!(dev_dir.join("mealstreak.db").is_file());

        std::env::remove_var("MEALSTREAK_ENV");
    }
}
