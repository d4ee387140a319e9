//! SQLite-based durable per-user store.
//!
//! The ledger document is stored as one JSON row per user; redemption
//! records get their own table so history queries do not load the
//! document. Everything lives in `~/.config/mealstreak/mealstreak.db`.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{data_dir, TokenStore};
use crate::error::StoreError;
use crate::ledger::LedgerState;
use crate::redemption::{ConsultDetails, Redemption, RedemptionType};

/// SQLite store scoped to a single user.
pub struct SqliteStore {
    conn: Connection,
    user_id: String,
}

impl SqliteStore {
    /// Open the database at `~/.config/mealstreak/mealstreak.db`,
    /// creating the file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(user_id: &str) -> Result<Self, StoreError> {
        let path = data_dir()?.join("mealstreak.db");
        let conn = Connection::open(&path)
            .map_err(|source| StoreError::OpenFailed { path, source })?;
        let store = Self {
            conn,
            user_id: user_id.to_string(),
        };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory database (for tests).
    #[cfg(test)]
    pub fn open_memory(user_id: &str) -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(StoreError::from)?;
        let store = Self {
            conn,
            user_id: user_id.to_string(),
        };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS ledgers (
                user_id     TEXT PRIMARY KEY,
                document    TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS redemptions (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL,
                type        TEXT NOT NULL,
                cost        INTEGER NOT NULL,
                details     TEXT,
                created_at  TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_redemptions_user
                ON redemptions(user_id, created_at);",
        )?;
        Ok(())
    }
}

impl TokenStore for SqliteStore {
    fn load(&self) -> Result<Option<LedgerState>, StoreError> {
        let document: Option<String> = self
            .conn
            .query_row(
                "SELECT document FROM ledgers WHERE user_id = ?1",
                params![self.user_id],
                |row| row.get(0),
            )
            .optional()?;
        match document {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn save(&self, state: &LedgerState) -> Result<(), StoreError> {
        let document = serde_json::to_string(state)?;
        self.conn.execute(
            "INSERT INTO ledgers (user_id, document, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(user_id) DO UPDATE SET
                 document = excluded.document,
                 updated_at = excluded.updated_at",
            params![self.user_id, document, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn record_redemption(&self, redemption: &Redemption) -> Result<(), StoreError> {
        let details = redemption
            .details
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        self.conn.execute(
            "INSERT OR REPLACE INTO redemptions (id, user_id, type, cost, details, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                redemption.id.to_string(),
                redemption.user_id,
                redemption.redemption_type.as_str(),
                redemption.cost,
                details,
                redemption.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn redemptions(&self) -> Result<Vec<Redemption>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, type, cost, details, created_at FROM redemptions
             WHERE user_id = ?1
             ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map(params![self.user_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, u64>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut redemptions = Vec::new();
        for row in rows {
            let (id, redemption_type, cost, details, created_at) = row?;
            redemptions.push(Redemption {
                id: Uuid::parse_str(&id)
                    .map_err(|e| StoreError::QueryFailed(format!("bad redemption id: {e}")))?,
                user_id: self.user_id.clone(),
                redemption_type: parse_type(&redemption_type)?,
                cost,
                details: details
                    .map(|json| serde_json::from_str::<ConsultDetails>(&json))
                    .transpose()?,
                created_at: DateTime::parse_from_rfc3339(&created_at)
                    .map_err(|e| StoreError::QueryFailed(format!("bad timestamp: {e}")))?
                    .with_timezone(&Utc),
            });
        }
        Ok(redemptions)
    }
}

fn parse_type(s: &str) -> Result<RedemptionType, StoreError> {
    s.parse()
        .map_err(|_| StoreError::QueryFailed(format!("bad redemption type: {s}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redemption::ConsultRequest;
    use chrono::NaiveDate;
    use std::collections::BTreeSet;

    #[test]
    fn load_is_none_for_fresh_user() {
        let store = SqliteStore::open_memory("user-1").unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn ledger_document_roundtrip() {
        let store = SqliteStore::open_memory("user-1").unwrap();
        let state = LedgerState {
            token_tenths: 12,
            streak: 2,
            completed_days: BTreeSet::from(["2023-W30-Monday".to_string()]),
            completed_meals: BTreeSet::from(["2023-W30-Monday-breakfast".to_string()]),
            ..Default::default()
        };
        store.save(&state).unwrap();
        assert_eq!(store.load().unwrap().unwrap(), state);
    }

    #[test]
    fn save_overwrites_previous_document() {
        let store = SqliteStore::open_memory("user-1").unwrap();
        store.save(&LedgerState::default()).unwrap();
        let updated = LedgerState {
            token_tenths: 3,
            ..Default::default()
        };
        store.save(&updated).unwrap();
        assert_eq!(store.load().unwrap().unwrap().token_tenths, 3);
    }

    #[test]
    fn redemption_history_roundtrip_newest_first() {
        let store = SqliteStore::open_memory("user-1").unwrap();
        let donate = Redemption::donate("user-1", 10);
        store.record_redemption(&donate).unwrap();

        let mut consult = Redemption::consult(
            "user-1",
            30,
            ConsultRequest {
                name: "Alex".into(),
                date: NaiveDate::from_ymd_opt(2023, 8, 1).unwrap(),
                time: "14:00".into(),
                goals: "Lose weight".into(),
            },
        );
        consult.created_at = donate.created_at + chrono::Duration::seconds(5);
        store.record_redemption(&consult).unwrap();

        let all = store.redemptions().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, consult.id);
        assert_eq!(all[0].details.as_ref().unwrap().name, "Alex");
        assert_eq!(all[1].id, donate.id);
        assert!(all[1].details.is_none());
    }

    #[test]
    fn corrupt_document_is_reported() {
        let store = SqliteStore::open_memory("user-1").unwrap();
        store
            .conn
            .execute(
                "INSERT INTO ledgers (user_id, document, updated_at) VALUES (?1, ?2, ?3)",
                params!["user-1", "not json", Utc::now().to_rfc3339()],
            )
            .unwrap();
        assert!(matches!(store.load(), Err(StoreError::Corrupt(_))));
    }
}
