//! # Storefront engine public API
//!
//! The `store_api` module exposes the programmatic API for the commerce core. The API is modular, so that clients can
//! pick and choose the functionality they want.
//!
//! * [`ledger_api`] manages user balances: creation, deposits, withdrawals and the transaction log.
//! * [`purchase_api`] buys games, singly or in batches, and answers ownership and eligibility questions.
//! * [`cart_api`] stages games and checks them out as one atomic purchase.
//! * [`history_api`] reads back the audit history written by purchases.
//!
//! # API usage
//!
//! The pattern for using all the APIs is the same. An API instance is created by supplying a database backend that
//! implements the specific backend traits required by the API. APIs that publish events also take the
//! [`EventProducers`](crate::events::EventProducers) to publish to.
//!
//! ```rust,ignore
//! use storefront_engine::{events::EventProducers, LedgerApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! // SqliteDatabase implements LedgerManagement
//! let api = LedgerApi::new(db, EventProducers::default());
//! let tx = api.deposit(user_id, "25.00".parse()?).await?;
//! ```
//!
//! The acting user is always an explicit argument. Nothing in the engine looks up a "current user".
pub mod cart_api;
pub mod history_api;
pub mod ledger_api;
pub mod purchase_api;
