//! Ephemeral in-memory store.
//!
//! Stands in for the browser-local storage of the client surface:
//! state lives only as long as the process. Interchangeable with
//! [`SqliteStore`](super::SqliteStore) behind the [`TokenStore`]
//! trait, which also makes it the store of choice in tests.

use std::sync::Mutex;

use super::TokenStore;
use crate::error::StoreError;
use crate::ledger::LedgerState;
use crate::redemption::Redemption;

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    state: Option<LedgerState>,
    redemptions: Vec<Redemption>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::QueryFailed("memory store lock poisoned".into()))
    }
}

impl TokenStore for MemoryStore {
    fn load(&self) -> Result<Option<LedgerState>, StoreError> {
        Ok(self.lock()?.state.clone())
    }

    fn save(&self, state: &LedgerState) -> Result<(), StoreError> {
        self.lock()?.state = Some(state.clone());
        Ok(())
    }

    fn record_redemption(&self, redemption: &Redemption) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        if let Some(existing) = inner
            .redemptions
            .iter_mut()
            .find(|r| r.id == redemption.id)
        {
            *existing = redemption.clone();
        } else {
            inner.redemptions.push(redemption.clone());
        }
        Ok(())
    }

    fn redemptions(&self) -> Result<Vec<Redemption>, StoreError> {
        let mut all = self.lock()?.redemptions.clone();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_is_none_until_first_save() {
        let store = MemoryStore::new();
        assert!(store.load().unwrap().is_none());

        let state = LedgerState {
            token_tenths: 5,
            ..Default::default()
        };
        store.save(&state).unwrap();
        assert_eq!(store.load().unwrap().unwrap(), state);
    }

    #[test]
    fn record_redemption_upserts() {
        let store = MemoryStore::new();
        let mut redemption = Redemption::donate("user-1", 10);
        store.record_redemption(&redemption).unwrap();
        redemption.cost = 12;
        store.record_redemption(&redemption).unwrap();

        let all = store.redemptions().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].cost, 12);
    }
}
