use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{
    db_types::{BalanceTransaction, Game, GameId, Money, PurchaseRecord, UserId},
    traits::CartError,
};

//--------------------------------------    PurchaseRequest   ---------------------------------------------------------
/// A request to buy one or more games as a single atomic batch.
///
/// `quoted_prices`, when present, are the prices the caller displayed to the user. They are kept for reporting only;
/// the amount charged is always the catalog price read inside the purchase's unit of work.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRequest {
    pub game_ids: Vec<GameId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quoted_prices: Option<Vec<Money>>,
}

impl PurchaseRequest {
    pub fn new(game_ids: Vec<GameId>) -> Self {
        Self { game_ids, quoted_prices: None }
    }

    pub fn single(game_id: GameId) -> Self {
        Self::new(vec![game_id])
    }

    pub fn with_quoted_prices(mut self, prices: Vec<Money>) -> Self {
        self.quoted_prices = Some(prices);
        self
    }

    pub fn len(&self) -> usize {
        self.game_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.game_ids.is_empty()
    }
}

//--------------------------------------    PurchaseReceipt   ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseReceipt {
    pub purchase_id: i64,
    pub game_id: GameId,
    pub title: String,
    pub price_paid: Money,
    /// The catalog price when the receipt was produced.
    pub current_price: Money,
    /// How far the current price has moved from the reference price. For a fresh purchase the reference is the price
    /// quoted to the buyer (zero difference when nothing was quoted); for an existing purchase it is the price paid.
    pub price_difference: Money,
    pub purchased_at: DateTime<Utc>,
}

impl PurchaseReceipt {
    /// A receipt for a purchase that has just been made, so the paid and current prices coincide.
    pub fn at_purchase(record: &PurchaseRecord, game: &Game, quoted_price: Option<Money>) -> Self {
        Self {
            purchase_id: record.id,
            game_id: record.game_id,
            title: game.title.clone(),
            price_paid: record.price_paid,
            current_price: record.price_paid,
            price_difference: quoted_price.map(|q| record.price_paid - q).unwrap_or_default(),
            purchased_at: record.purchased_at,
        }
    }

    /// A receipt for an earlier purchase, compared against the game's current catalog price.
    pub fn for_existing(record: &PurchaseRecord, game: &Game) -> Self {
        Self {
            purchase_id: record.id,
            game_id: record.game_id,
            title: game.title.clone(),
            price_paid: record.price_paid,
            current_price: game.price,
            price_difference: game.price - record.price_paid,
            purchased_at: record.purchased_at,
        }
    }
}

//--------------------------------------    PurchaseOutcome   ---------------------------------------------------------
/// The result of a committed purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOutcome {
    pub buyer: UserId,
    pub receipts: Vec<PurchaseReceipt>,
    pub total: Money,
    /// The single ledger entry for the whole batch. `None` when every game in the batch was free.
    pub transaction: Option<BalanceTransaction>,
}

impl PurchaseOutcome {
    pub fn count(&self) -> usize {
        self.receipts.len()
    }
}

//--------------------------------------      Eligibility     ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eligibility {
    pub game_id: GameId,
    pub eligible: bool,
    /// Why the game cannot be purchased. `None` when it can.
    pub reason: Option<String>,
}

impl Eligibility {
    pub fn eligible(game_id: GameId) -> Self {
        Self { game_id, eligible: true, reason: None }
    }

    pub fn ineligible<S: Into<String>>(game_id: GameId, reason: S) -> Self {
        Self { game_id, eligible: false, reason: Some(reason.into()) }
    }
}

//--------------------------------------       CartEntry      ---------------------------------------------------------
/// A staged game joined with its current catalog data.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct CartEntry {
    pub game_id: GameId,
    pub title: String,
    pub price: Money,
    pub author_id: UserId,
    pub added_at: DateTime<Utc>,
}

//--------------------------------------      CartSummary     ---------------------------------------------------------
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSummary {
    pub items: Vec<CartEntry>,
    /// The sum of current catalog prices. Informational only; checkout re-reads prices.
    pub total: Money,
    pub count: usize,
}

impl CartSummary {
    /// Fails with [`CartError::InvalidAmount`] if the prices cannot be totalled without overflowing.
    pub fn new(items: Vec<CartEntry>) -> Result<Self, CartError> {
        let total = Money::checked_sum(items.iter().map(|i| i.price))
            .ok_or_else(|| CartError::InvalidAmount(format!("The prices of {} cart items overflow", items.len())))?;
        let count = items.len();
        Ok(Self { items, total, count })
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn game_ids(&self) -> Vec<GameId> {
        self.items.iter().map(|i| i.game_id).collect()
    }
}

//--------------------------------------    CheckoutReceipt   ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutReceipt {
    pub items_processed: usize,
    pub total_charged: Money,
    pub receipts: Vec<PurchaseReceipt>,
    pub transaction: Option<BalanceTransaction>,
}

impl From<PurchaseOutcome> for CheckoutReceipt {
    fn from(outcome: PurchaseOutcome) -> Self {
        Self {
            items_processed: outcome.receipts.len(),
            total_charged: outcome.total,
            receipts: outcome.receipts,
            transaction: outcome.transaction,
        }
    }
}
