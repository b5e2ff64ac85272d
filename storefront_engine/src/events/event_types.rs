use serde::{Deserialize, Serialize};

use crate::{
    db_types::{BalanceTransaction, Money, UserId},
    traits::{CheckoutReceipt, PurchaseOutcome, PurchaseReceipt},
};

/// Published after a purchase or a checkout has committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GamesPurchasedEvent {
    pub user_id: UserId,
    pub receipts: Vec<PurchaseReceipt>,
    pub total: Money,
}

impl GamesPurchasedEvent {
    pub fn new(user_id: UserId, receipts: Vec<PurchaseReceipt>, total: Money) -> Self {
        Self { user_id, receipts, total }
    }

    pub fn from_outcome(outcome: &PurchaseOutcome) -> Self {
        Self::new(outcome.buyer, outcome.receipts.clone(), outcome.total)
    }

    pub fn from_checkout(user_id: UserId, receipt: &CheckoutReceipt) -> Self {
        Self::new(user_id, receipt.receipts.clone(), receipt.total_charged)
    }
}

/// Published after any committed change to a balance, including the debit made by a purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceChangedEvent {
    pub transaction: BalanceTransaction,
}

impl BalanceChangedEvent {
    pub fn new(transaction: BalanceTransaction) -> Self {
        Self { transaction }
    }
}
