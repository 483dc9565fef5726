//! Plan document queries.

use rusqlite::{params, OptionalExtension};

use super::utils::{decode, encode, micros};
use crate::{
    error::{DatabaseResultExt, StoreResult},
    models::Plan,
};

const SELECT_PLAN_SQL: &str = "SELECT id, document FROM plans WHERE id = ?1";
const SELECT_PLANS_BY_OWNER_SQL: &str =
    "SELECT id, document FROM plans WHERE owner_id = ?1 ORDER BY updated_at_us DESC, id";
const UPSERT_PLAN_SQL: &str = "INSERT INTO plans (id, owner_id, version, created_at, updated_at, updated_at_us, document) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) \
     ON CONFLICT(id) DO UPDATE SET owner_id = excluded.owner_id, version = excluded.version, \
     created_at = excluded.created_at, updated_at = excluded.updated_at, \
     updated_at_us = excluded.updated_at_us, document = excluded.document";
const CAS_UPDATE_PLAN_SQL: &str = "UPDATE plans SET owner_id = ?2, version = ?3, created_at = ?4, updated_at = ?5, \
     updated_at_us = ?6, document = ?7 WHERE id = ?1 AND version = ?8";
const SELECT_PLAN_VERSION_SQL: &str = "SELECT version FROM plans WHERE id = ?1";
const DELETE_PLAN_SQL: &str = "DELETE FROM plans WHERE id = ?1";

/// Outcome of a version-guarded write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasOutcome {
    Written,
    /// The stored version differed; `None` when the plan no longer exists
    Conflict { actual: Option<u64> },
}

impl super::Database {
    /// Retrieves a plan by its ID.
    pub fn get_plan(&self, id: &str) -> StoreResult<Option<Plan>> {
        let row: Option<(String, String)> = self
            .connection
            .query_row(SELECT_PLAN_SQL, params![id], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .optional()
            .db_context("Failed to query plan")?;

        row.map(|(id, document)| decode(&id, &document)).transpose()
    }

    /// Lists an owner's plans, most recently updated first.
    pub fn list_plans_by_owner(&self, owner_id: &str) -> StoreResult<Vec<Plan>> {
        let mut stmt = self
            .connection
            .prepare(SELECT_PLANS_BY_OWNER_SQL)
            .db_context("Failed to prepare query")?;

        let rows = stmt
            .query_map(params![owner_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .db_context("Failed to query plans")?
            .collect::<Result<Vec<_>, _>>()
            .db_context("Failed to fetch plans")?;

        rows.iter()
            .map(|(id, document)| decode(id, document))
            .collect()
    }

    /// Inserts or fully replaces a plan.
    pub fn put_plan(&mut self, plan: &Plan) -> StoreResult<()> {
        let document = encode(&plan.id, plan)?;
        self.connection
            .execute(
                UPSERT_PLAN_SQL,
                params![
                    plan.id,
                    plan.owner_id,
                    plan.version as i64,
                    plan.created_at.to_string(),
                    plan.updated_at.to_string(),
                    micros(plan.updated_at),
                    document
                ],
            )
            .db_context("Failed to write plan")?;
        Ok(())
    }

    /// Replaces a plan only if the stored version equals `expected_version`.
    pub fn compare_and_put_plan(
        &mut self,
        plan: &Plan,
        expected_version: u64,
    ) -> StoreResult<CasOutcome> {
        let document = encode(&plan.id, plan)?;
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let rows_affected = tx
            .execute(
                CAS_UPDATE_PLAN_SQL,
                params![
                    plan.id,
                    plan.owner_id,
                    plan.version as i64,
                    plan.created_at.to_string(),
                    plan.updated_at.to_string(),
                    micros(plan.updated_at),
                    document,
                    expected_version as i64
                ],
            )
            .db_context("Failed to update plan")?;

        let outcome = if rows_affected == 1 {
            CasOutcome::Written
        } else {
            let actual: Option<i64> = tx
                .query_row(SELECT_PLAN_VERSION_SQL, params![plan.id], |row| row.get(0))
                .optional()
                .db_context("Failed to read plan version")?;
            CasOutcome::Conflict {
                actual: actual.map(|v| v as u64),
            }
        };

        tx.commit().db_context("Failed to commit transaction")?;
        Ok(outcome)
    }

    /// Deletes a plan. Returns whether a row was removed.
    pub fn delete_plan(&mut self, id: &str) -> StoreResult<bool> {
        let rows_affected = self
            .connection
            .execute(DELETE_PLAN_SQL, params![id])
            .db_context("Failed to delete plan")?;
        Ok(rows_affected > 0)
    }
}
