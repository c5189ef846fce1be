//! Scoped transactions.
//!
//! A transaction opened here commits only through an explicit
//! `tx.commit()`. Every other exit path (an early `?`, a returned error, a
//! timeout dropping the future) drops the `sqlx::Transaction`, which rolls
//! it back. Nothing is ever half-written.

use sqlx::{PgPool, Postgres, Transaction};

/// Isolation level requested right after `BEGIN`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Isolation {
    /// Read-then-write units such as match reporting
    Serializable,
    /// Multi-statement reads that must see one snapshot
    Snapshot,
}

impl Isolation {
    fn statement(self) -> &'static str {
        match self {
            Isolation::Serializable => "SET TRANSACTION ISOLATION LEVEL SERIALIZABLE",
            Isolation::Snapshot => "SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY",
        }
    }
}

/// Begin a transaction at the given isolation level
pub async fn begin(
    pool: &PgPool,
    isolation: Isolation,
) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query(isolation.statement()).execute(&mut *tx).await?;
    Ok(tx)
}

/// Begin a SERIALIZABLE transaction
pub async fn begin_serializable(
    pool: &PgPool,
) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
    begin(pool, Isolation::Serializable).await
}

/// Begin a read-only snapshot transaction
pub async fn begin_snapshot(
    pool: &PgPool,
) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
    begin(pool, Isolation::Snapshot).await
}
