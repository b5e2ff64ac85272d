//! #  Backend contracts for the commerce core.
//!
//! This module defines the behaviour a storage backend must expose for the storefront engine to run on it. Every
//! method on these traits is one atomic unit of work: the reads that gate a decision and the writes that follow are
//! committed together or not at all.
//!
//! ## Traits
//! * [`LedgerManagement`] owns balances and their append-only transaction log. It is the only path through which a
//!   balance can change.
//! * [`PurchaseManagement`] validates and executes purchases, turning funds into ownership records and history
//!   entries.
//! * [`CartManagement`] stages games a user intends to buy and checks them out as a single purchase.
//! * [`HistoryManagement`] gives read access to the audit history the other traits write.
mod cart_management;
mod data_objects;
mod history_management;
mod ledger_management;
mod purchase_management;

pub use cart_management::{CartError, CartManagement};
pub use data_objects::{
    CartEntry,
    CartSummary,
    CheckoutReceipt,
    Eligibility,
    PurchaseOutcome,
    PurchaseReceipt,
    PurchaseRequest,
};
pub use history_management::{HistoryError, HistoryManagement};
pub use ledger_management::{LedgerError, LedgerManagement};
pub use purchase_management::{PurchaseError, PurchaseManagement};
