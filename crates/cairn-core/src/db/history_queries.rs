//! Change history queries. The table is append-only apart from age pruning.

use jiff::Timestamp;
use rusqlite::{params, OptionalExtension, Transaction};

use super::utils::{decode, encode, micros};
use crate::{
    error::{DatabaseResultExt, StoreResult},
    models::ChangeHistoryEntry,
};

const INSERT_HISTORY_SQL: &str = "INSERT INTO change_history (id, plan_id, enhancement_id, applied_at_us, is_rollback, rolled_back_entry_id, document) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";
const SELECT_HISTORY_ENTRY_SQL: &str = "SELECT id, document FROM change_history WHERE id = ?1";
const SELECT_HISTORY_BY_PLAN_SQL: &str =
    "SELECT id, document FROM change_history WHERE plan_id = ?1 ORDER BY applied_at_us, seq";
const SELECT_HISTORY_BY_ENHANCEMENT_SQL: &str =
    "SELECT id, document FROM change_history WHERE enhancement_id = ?1 ORDER BY applied_at_us, seq";
const DELETE_HISTORY_BEFORE_SQL: &str =
    "DELETE FROM change_history WHERE plan_id = ?1 AND applied_at_us < ?2";

pub(super) fn insert_history_entry(
    tx: &Transaction<'_>,
    entry: &ChangeHistoryEntry,
) -> StoreResult<()> {
    let document = encode(&entry.id, entry)?;
    tx.execute(
        INSERT_HISTORY_SQL,
        params![
            entry.id,
            entry.plan_id,
            entry.enhancement_id,
            micros(entry.applied_at),
            entry.is_rollback,
            entry.rolled_back_entry_id,
            document
        ],
    )
    .db_context("Failed to insert history entry")?;
    Ok(())
}

impl super::Database {
    pub fn get_history_entry(&self, id: &str) -> StoreResult<Option<ChangeHistoryEntry>> {
        let row: Option<(String, String)> = self
            .connection
            .query_row(SELECT_HISTORY_ENTRY_SQL, params![id], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .optional()
            .db_context("Failed to query history entry")?;

        row.map(|(id, document)| decode(&id, &document)).transpose()
    }

    /// History of a plan in application order.
    pub fn history_for_plan(&self, plan_id: &str) -> StoreResult<Vec<ChangeHistoryEntry>> {
        self.query_history(SELECT_HISTORY_BY_PLAN_SQL, plan_id)
    }

    /// History attributable to one enhancement, in application order.
    pub fn history_for_enhancement(
        &self,
        enhancement_id: &str,
    ) -> StoreResult<Vec<ChangeHistoryEntry>> {
        self.query_history(SELECT_HISTORY_BY_ENHANCEMENT_SQL, enhancement_id)
    }

    /// Deletes a plan's entries applied before `cutoff`.
    pub fn delete_history_before(&mut self, plan_id: &str, cutoff: Timestamp) -> StoreResult<usize> {
        self.connection
            .execute(DELETE_HISTORY_BEFORE_SQL, params![plan_id, micros(cutoff)])
            .db_context("Failed to prune history")
    }

    fn query_history(&self, sql: &str, key: &str) -> StoreResult<Vec<ChangeHistoryEntry>> {
        let mut stmt = self
            .connection
            .prepare(sql)
            .db_context("Failed to prepare query")?;

        let rows = stmt
            .query_map(params![key], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .db_context("Failed to query history")?
            .collect::<Result<Vec<_>, _>>()
            .db_context("Failed to fetch history")?;

        rows.iter()
            .map(|(id, document)| decode(id, document))
            .collect()
    }
}
