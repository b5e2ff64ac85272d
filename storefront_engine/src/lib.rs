//! Storefront Engine
//!
//! The storefront engine is the transactional commerce core of a digital game store. It owns three things: the
//! balance ledger, the purchase orchestrator and the shopping cart. The catalog, user accounts, authentication and any
//! HTTP surface live elsewhere and are only referenced by id.
//!
//! The library is divided into two main sections:
//! 1. Backend contracts ([`mod@traits`]) and their SQLite implementation ([`SqliteDatabase`]). You should never need to
//!    touch the database directly. The exception is the data types stored in the database, which are defined in
//!    [`mod@db_types`] and are public.
//! 2. The public API ([`LedgerApi`], [`PurchaseApi`], [`CartApi`] and [`HistoryApi`]). Every call is a single atomic
//!    unit of work: balance checks, ownership checks and the writes that depend on them commit together or not at all.
//!
//! The engine also publishes events after work commits. When games are purchased a [`events::GamesPurchasedEvent`]
//! is emitted, and every balance change emits a [`events::BalanceChangedEvent`]. Hooks are registered with
//! [`events::EventHooks`].
#[cfg(feature = "sqlite")]
mod sqlite;
mod store_api;

pub mod config;
pub mod db_types;
pub mod events;
pub mod helpers;
pub mod traits;

#[cfg(all(feature = "sqlite", any(feature = "test_utils", test)))]
pub mod test_utils;

pub use config::EngineConfig;
#[cfg(feature = "sqlite")]
pub use sqlite::{db as sqlite_db, SqliteDatabase};
pub use store_api::{
    cart_api::CartApi,
    history_api::HistoryApi,
    ledger_api::{parse_amount, LedgerApi, DEFAULT_MAX_TRANSACTION_AMOUNT},
    purchase_api::PurchaseApi,
};
pub use traits::{
    CartError,
    CartManagement,
    HistoryError,
    HistoryManagement,
    LedgerError,
    LedgerManagement,
    PurchaseError,
    PurchaseManagement,
};
