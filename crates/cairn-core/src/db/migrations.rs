//! Database schema initialization and migrations.

use crate::error::{DatabaseResultExt, StoreResult};

impl super::Database {
    /// Initializes the database schema using the embedded SQL file.
    /// Safe to run against an already initialized database.
    pub(super) fn initialize_schema(&self) -> StoreResult<()> {
        let schema_sql = include_str!("../../assets/schema.sql");
        self.connection
            .execute_batch(schema_sql)
            .db_context("Failed to initialize database schema")?;

        self.apply_migrations()?;

        Ok(())
    }

    /// Brings databases created before `dead_lettered` existed up to date.
    fn apply_migrations(&self) -> StoreResult<()> {
        let has_dead_letter_column: bool = self
            .connection
            .query_row(
                "SELECT COUNT(*) FROM pragma_table_info('pending_mutations') WHERE name = 'dead_lettered'",
                [],
                |row| row.get(0),
            )
            .map(|count: i64| count > 0)
            .db_context("Failed to inspect pending_mutations columns")?;

        if !has_dead_letter_column {
            self.connection
                .execute(
                    "ALTER TABLE pending_mutations ADD COLUMN dead_lettered INTEGER NOT NULL DEFAULT 0",
                    [],
                )
                .db_context("Failed to add dead_lettered column to pending_mutations")?;
        }

        Ok(())
    }
}
