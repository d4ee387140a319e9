//! Per-user ledger registry for multi-session surfaces.
//!
//! The ledger itself is single-session: operations must be serialized
//! per user, or two browser tabs could each pass the idempotence check
//! and double-award the same meal. `TokenService` owns one ledger per
//! user behind a per-user mutex; a server handler calls
//! [`TokenService::with_ledger`] and gets that serialization for free.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{CoreError, Result};
use crate::events::NullSink;
use crate::ledger::TokenLedger;
use crate::storage::SqliteStore;

/// Opens the ledger for a user the first time it is requested.
pub type LedgerFactory = Box<dyn Fn(&str) -> Result<TokenLedger> + Send + Sync>;

pub struct TokenService {
    factory: LedgerFactory,
    ledgers: Mutex<HashMap<String, Arc<Mutex<TokenLedger>>>>,
}

impl TokenService {
    pub fn new(factory: LedgerFactory) -> Self {
        Self {
            factory,
            ledgers: Mutex::new(HashMap::new()),
        }
    }

    /// Service backed by the durable SQLite store, no notification
    /// sink. What a server deployment mounts.
    pub fn sqlite() -> Self {
        Self::new(Box::new(|user_id| {
            let store = SqliteStore::open(user_id)?;
            TokenLedger::open(user_id, Box::new(store), Box::new(NullSink))
        }))
    }

    /// Run `f` against the user's ledger, holding that user's lock for
    /// the duration. Creates the ledger on first use (zeroed state
    /// when the store has no document).
    pub fn with_ledger<R>(
        &self,
        user_id: &str,
        f: impl FnOnce(&mut TokenLedger) -> R,
    ) -> Result<R> {
        let ledger = self.ledger_for(user_id)?;
        let mut guard = ledger
            .lock()
            .map_err(|_| CoreError::Custom(format!("ledger lock poisoned for '{user_id}'")))?;
        Ok(f(&mut guard))
    }

    fn ledger_for(&self, user_id: &str) -> Result<Arc<Mutex<TokenLedger>>> {
        let mut ledgers = self
            .ledgers
            .lock()
            .map_err(|_| CoreError::Custom("ledger registry lock poisoned".into()))?;
        if let Some(ledger) = ledgers.get(user_id) {
            return Ok(Arc::clone(ledger));
        }
        let ledger = Arc::new(Mutex::new((self.factory)(user_id)?));
        ledgers.insert(user_id.to_string(), Arc::clone(&ledger));
        Ok(ledger)
    }
}
