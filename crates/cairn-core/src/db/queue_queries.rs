//! Pending mutation queue queries.

use rusqlite::params;

use super::utils::{decode, encode, micros, parse_text, parse_timestamp};
use crate::{
    error::{DatabaseResultExt, StoreResult},
    models::{Plan, SyncQueueItem},
};

const INSERT_MUTATION_SQL: &str = "INSERT INTO pending_mutations (id, operation, plan_id, snapshot, enqueued_at, enqueued_at_us, retry_count, next_attempt_at, last_error, dead_lettered) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)";
const SELECT_MUTATIONS_SQL: &str = "SELECT id, operation, plan_id, snapshot, enqueued_at, retry_count, next_attempt_at, last_error, dead_lettered \
     FROM pending_mutations ORDER BY enqueued_at_us, seq";
const UPDATE_MUTATION_SQL: &str = "UPDATE pending_mutations SET retry_count = ?2, next_attempt_at = ?3, last_error = ?4, dead_lettered = ?5 WHERE id = ?1";
const DELETE_MUTATION_SQL: &str = "DELETE FROM pending_mutations WHERE id = ?1";

impl super::Database {
    /// Appends an item to the queue.
    pub fn insert_mutation(&mut self, item: &SyncQueueItem) -> StoreResult<()> {
        let snapshot = item
            .snapshot
            .as_ref()
            .map(|plan| encode(&item.id, plan))
            .transpose()?;

        self.connection
            .execute(
                INSERT_MUTATION_SQL,
                params![
                    item.id,
                    item.operation.as_str(),
                    item.plan_id,
                    snapshot,
                    item.enqueued_at.to_string(),
                    micros(item.enqueued_at),
                    item.retry_count,
                    item.next_attempt_at.map(|at| at.to_string()),
                    item.last_error,
                    item.dead_lettered
                ],
            )
            .db_context("Failed to enqueue mutation")?;
        Ok(())
    }

    /// Every queued item, oldest first.
    pub fn list_mutations(&self) -> StoreResult<Vec<SyncQueueItem>> {
        let mut stmt = self
            .connection
            .prepare(SELECT_MUTATIONS_SQL)
            .db_context("Failed to prepare query")?;

        let rows = stmt
            .query_map([], |row| {
                let snapshot: Option<String> = row.get(3)?;
                let next_attempt_at: Option<String> = row.get(6)?;
                let item = SyncQueueItem {
                    id: row.get(0)?,
                    operation: parse_text(1, &row.get::<_, String>(1)?)?,
                    plan_id: row.get(2)?,
                    snapshot: None,
                    enqueued_at: parse_timestamp(4, &row.get::<_, String>(4)?)?,
                    retry_count: row.get(5)?,
                    next_attempt_at: next_attempt_at
                        .as_deref()
                        .map(|raw| parse_timestamp(6, raw))
                        .transpose()?,
                    last_error: row.get(7)?,
                    dead_lettered: row.get(8)?,
                };
                Ok((item, snapshot))
            })
            .db_context("Failed to query pending mutations")?
            .collect::<Result<Vec<_>, _>>()
            .db_context("Failed to fetch pending mutations")?;

        rows.into_iter()
            .map(|(mut item, snapshot)| {
                item.snapshot = snapshot
                    .map(|raw| decode::<Plan>(&item.id, &raw))
                    .transpose()?;
                Ok(item)
            })
            .collect()
    }

    /// Persists retry bookkeeping for an item.
    pub fn update_mutation(&mut self, item: &SyncQueueItem) -> StoreResult<()> {
        self.connection
            .execute(
                UPDATE_MUTATION_SQL,
                params![
                    item.id,
                    item.retry_count,
                    item.next_attempt_at.map(|at| at.to_string()),
                    item.last_error,
                    item.dead_lettered
                ],
            )
            .db_context("Failed to update pending mutation")?;
        Ok(())
    }

    pub fn delete_mutation(&mut self, id: &str) -> StoreResult<()> {
        self.connection
            .execute(DELETE_MUTATION_SQL, params![id])
            .db_context("Failed to remove pending mutation")?;
        Ok(())
    }
}
