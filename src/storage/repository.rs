use anyhow::{Context, Result};
use sqlx::{Row, Sqlite, SqlitePool, Transaction};

use crate::domain::{Expense, LedgerSnapshot};

use super::MIGRATION_001_INITIAL;

/// Repository for persisting the ledger to SQLite.
///
/// The split of an expense is stored as a JSON array of names in a single
/// column, mirroring the snapshot format. The repository hands back raw
/// snapshots; validating them is the caller's job.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a connection pool for the given database URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Apply the schema migrations. Safe to run repeatedly.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;

        Ok(())
    }

    /// Connect and migrate in one step.
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    // ========================
    // Loading
    // ========================

    /// Load the full stored ledger, people and expenses each ordered by
    /// position.
    pub async fn load(&self) -> Result<LedgerSnapshot> {
        let rows = sqlx::query("SELECT name FROM people ORDER BY position")
            .fetch_all(&self.pool)
            .await
            .context("Failed to load people")?;

        let people: Vec<String> = rows.iter().map(|row| row.get("name")).collect();

        let rows = sqlx::query(
            "SELECT amount, paid_by, split_between FROM expenses ORDER BY position",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to load expenses")?;

        let expenses = rows
            .iter()
            .map(Self::row_to_expense)
            .collect::<Result<Vec<_>>>()?;

        Ok(LedgerSnapshot { people, expenses })
    }

    fn row_to_expense(row: &sqlx::sqlite::SqliteRow) -> Result<Expense> {
        let split_json: String = row.get("split_between");
        let split_between: Vec<String> = serde_json::from_str(&split_json)
            .context("Failed to parse split_between column")?;

        Ok(Expense {
            amount: row.get("amount"),
            paid_by: row.get("paid_by"),
            split_between,
        })
    }

    // ========================
    // Writing
    // ========================

    /// Append a person after the last stored position.
    pub async fn append_person(&self, name: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO people (position, name)
            VALUES ((SELECT COALESCE(MAX(position), -1) + 1 FROM people), ?)
            "#,
        )
        .bind(name)
        .execute(&self.pool)
        .await
        .context("Failed to save person")?;
        Ok(())
    }

    /// Append an expense after the last stored position.
    pub async fn append_expense(&self, expense: &Expense) -> Result<()> {
        let split_json = serde_json::to_string(&expense.split_between)?;

        sqlx::query(
            r#"
            INSERT INTO expenses (position, amount, paid_by, split_between)
            VALUES ((SELECT COALESCE(MAX(position), -1) + 1 FROM expenses), ?, ?, ?)
            "#,
        )
        .bind(expense.amount)
        .bind(&expense.paid_by)
        .bind(&split_json)
        .execute(&self.pool)
        .await
        .context("Failed to save expense")?;
        Ok(())
    }

    /// Remove a person and rewrite the expense list in one transaction.
    /// The caller passes the expenses as they look after the cascade.
    pub async fn remove_person(&self, name: &str, expenses: &[Expense]) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        sqlx::query("DELETE FROM people WHERE name = ?")
            .bind(name)
            .execute(&mut *tx)
            .await
            .context("Failed to delete person")?;

        sqlx::query("DELETE FROM expenses")
            .execute(&mut *tx)
            .await
            .context("Failed to clear expenses")?;

        Self::insert_expenses(&mut tx, expenses).await?;

        tx.commit().await.context("Failed to commit removal")?;
        Ok(())
    }

    /// Rewrite the stored expense list; positions are reassigned densely.
    pub async fn replace_expenses(&self, expenses: &[Expense]) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        sqlx::query("DELETE FROM expenses")
            .execute(&mut *tx)
            .await
            .context("Failed to clear expenses")?;

        Self::insert_expenses(&mut tx, expenses).await?;

        tx.commit().await.context("Failed to commit expenses")?;
        Ok(())
    }

    /// Replace the entire stored ledger in one transaction.
    pub async fn replace_all(&self, snapshot: &LedgerSnapshot) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        sqlx::query("DELETE FROM people")
            .execute(&mut *tx)
            .await
            .context("Failed to clear people")?;

        sqlx::query("DELETE FROM expenses")
            .execute(&mut *tx)
            .await
            .context("Failed to clear expenses")?;

        for (position, name) in snapshot.people.iter().enumerate() {
            sqlx::query("INSERT INTO people (position, name) VALUES (?, ?)")
                .bind(position as i64)
                .bind(name)
                .execute(&mut *tx)
                .await
                .context("Failed to save person")?;
        }

        Self::insert_expenses(&mut tx, &snapshot.expenses).await?;

        tx.commit().await.context("Failed to commit restore")?;
        Ok(())
    }

    async fn insert_expenses(
        tx: &mut Transaction<'_, Sqlite>,
        expenses: &[Expense],
    ) -> Result<()> {
        for (position, expense) in expenses.iter().enumerate() {
            let split_json = serde_json::to_string(&expense.split_between)?;

            sqlx::query(
                "INSERT INTO expenses (position, amount, paid_by, split_between) VALUES (?, ?, ?, ?)",
            )
            .bind(position as i64)
            .bind(expense.amount)
            .bind(&expense.paid_by)
            .bind(&split_json)
            .execute(&mut **tx)
            .await
            .context("Failed to save expense")?;
        }
        Ok(())
    }
}
