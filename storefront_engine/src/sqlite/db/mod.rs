//! # SQLite Database methods
//!
//! This module contains "low-level" SQLite database interactions.
//!
//! All these interaction are maintained by simple functions (rather than stateful structs) that accept a
//! `&mut SqliteConnection` argument. None of them open a transaction. Callers obtain a unit of work from
//! [`begin_unit_of_work`] and pass `&mut *tx` through, so every read that gates a decision and every write that follows
//! it commit together.
use sqlx::{sqlite::SqlitePoolOptions, Error as SqlxError, Sqlite, SqlitePool, Transaction};

pub mod balances;
pub mod cart;
pub mod catalog;
pub mod history;
pub mod purchases;

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect(url).await?;
    Ok(pool)
}

/// Opens a write transaction. `BEGIN IMMEDIATE` takes the database write lock up front, so two units of work can never
/// both read a balance and then race to update it. Other writers wait on the busy timeout.
///
/// Dropping the returned transaction without committing rolls it back.
pub async fn begin_unit_of_work(pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>, SqlxError> {
    pool.begin_with("BEGIN IMMEDIATE").await
}
