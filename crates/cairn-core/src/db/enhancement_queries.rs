//! Enhancement queries.

use rusqlite::{params, OptionalExtension, Transaction};

use super::utils::{decode, encode, micros};
use crate::{
    error::{DatabaseResultExt, StoreResult},
    models::{ChangeHistoryEntry, Enhancement},
};

const UPSERT_ENHANCEMENT_SQL: &str = "INSERT INTO enhancements (id, plan_id, status, created_at_us, document) \
     VALUES (?1, ?2, ?3, ?4, ?5) \
     ON CONFLICT(id) DO UPDATE SET plan_id = excluded.plan_id, status = excluded.status, \
     created_at_us = excluded.created_at_us, document = excluded.document";
const SELECT_ENHANCEMENT_SQL: &str = "SELECT id, document FROM enhancements WHERE id = ?1";
const SELECT_ENHANCEMENTS_BY_PLAN_SQL: &str =
    "SELECT id, document FROM enhancements WHERE plan_id = ?1 ORDER BY created_at_us DESC, id";
const DELETE_ENHANCEMENT_SQL: &str = "DELETE FROM enhancements WHERE id = ?1";

fn upsert_enhancement(tx: &Transaction<'_>, enhancement: &Enhancement) -> StoreResult<()> {
    let document = encode(&enhancement.id, enhancement)?;
    tx.execute(
        UPSERT_ENHANCEMENT_SQL,
        params![
            enhancement.id,
            enhancement.plan_id,
            enhancement.status.as_str(),
            micros(enhancement.created_at),
            document
        ],
    )
    .db_context("Failed to write enhancement")?;
    Ok(())
}

impl super::Database {
    /// Inserts or fully replaces an enhancement.
    pub fn put_enhancement(&mut self, enhancement: &Enhancement) -> StoreResult<()> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;
        upsert_enhancement(&tx, enhancement)?;
        tx.commit().db_context("Failed to commit transaction")
    }

    pub fn get_enhancement(&self, id: &str) -> StoreResult<Option<Enhancement>> {
        let row: Option<(String, String)> = self
            .connection
            .query_row(SELECT_ENHANCEMENT_SQL, params![id], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .optional()
            .db_context("Failed to query enhancement")?;

        row.map(|(id, document)| decode(&id, &document)).transpose()
    }

    /// Lists a plan's enhancements, newest first.
    pub fn list_enhancements_for_plan(&self, plan_id: &str) -> StoreResult<Vec<Enhancement>> {
        let mut stmt = self
            .connection
            .prepare(SELECT_ENHANCEMENTS_BY_PLAN_SQL)
            .db_context("Failed to prepare query")?;

        let rows = stmt
            .query_map(params![plan_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .db_context("Failed to query enhancements")?
            .collect::<Result<Vec<_>, _>>()
            .db_context("Failed to fetch enhancements")?;

        rows.iter()
            .map(|(id, document)| decode(id, document))
            .collect()
    }

    pub fn delete_enhancement(&mut self, id: &str) -> StoreResult<bool> {
        let rows_affected = self
            .connection
            .execute(DELETE_ENHANCEMENT_SQL, params![id])
            .db_context("Failed to delete enhancement")?;
        Ok(rows_affected > 0)
    }

    /// Writes the enhancement's new state and its history entries in one
    /// transaction.
    pub fn record_application(
        &mut self,
        enhancement: &Enhancement,
        entries: &[ChangeHistoryEntry],
    ) -> StoreResult<()> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        upsert_enhancement(&tx, enhancement)?;
        for entry in entries {
            super::history_queries::insert_history_entry(&tx, entry)?;
        }

        tx.commit().db_context("Failed to commit transaction")
    }
}
