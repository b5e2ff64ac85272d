//! Purchase validation that does not touch storage.
//!
//! The backend gathers the facts a decision needs (the catalog rows, the ids already owned and the buyer's balance)
//! inside its unit of work and hands them to [`plan_purchase`]. Keeping the rules here means that a committed purchase,
//! an eligibility preview and a cart pre-check all reject for exactly the same reasons.
use std::collections::{HashMap, HashSet};

use crate::{
    db_types::{Game, GameId, Money, UserId},
    traits::{PurchaseError, PurchaseRequest},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedItem {
    pub game: Game,
    pub quoted_price: Option<Money>,
}

/// A validated purchase, ready to be executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchasePlan {
    /// The games to grant, in request order.
    pub items: Vec<PlannedItem>,
    /// The amount to debit. Zero when every game is free, in which case no debit takes place.
    pub total: Money,
}

impl PurchasePlan {
    pub fn game_ids(&self) -> Vec<GameId> {
        self.items.iter().map(|i| i.game.id).collect()
    }

    pub fn requires_payment(&self) -> bool {
        self.total.is_positive()
    }
}

/// Structural checks on a request. These fail before any storage is read.
pub fn validate_request(request: &PurchaseRequest) -> Result<(), PurchaseError> {
    if request.is_empty() {
        return Err(PurchaseError::InvalidRequest("No games were given".into()));
    }
    if let Some(prices) = &request.quoted_prices {
        if prices.len() != request.len() {
            return Err(PurchaseError::InvalidRequest(format!(
                "{} games were requested but {} prices were quoted",
                request.len(),
                prices.len()
            )));
        }
    }
    let mut seen = HashSet::with_capacity(request.len());
    if let Some(dup) = request.game_ids.iter().find(|id| !seen.insert(**id)) {
        return Err(PurchaseError::InvalidRequest(format!("Game {dup} was requested more than once")));
    }
    Ok(())
}

/// Applies the purchase rules, in order: every id must resolve, none may already be owned, none may be authored by the
/// buyer, and the buyer must be able to pay for the lot.
///
/// `balance` is `None` when the buyer has no balance. That only matters if the total is non-zero.
pub fn plan_purchase(
    buyer: UserId,
    request: &PurchaseRequest,
    found: Vec<Game>,
    owned: &[GameId],
    balance: Option<Money>,
) -> Result<PurchasePlan, PurchaseError> {
    validate_request(request)?;
    let mut by_id = found.into_iter().map(|g| (g.id, g)).collect::<HashMap<_, _>>();
    let missing = request.game_ids.iter().filter(|id| !by_id.contains_key(id)).copied().collect::<Vec<_>>();
    if !missing.is_empty() {
        return Err(PurchaseError::GamesNotFound(missing));
    }
    let already_owned = request.game_ids.iter().filter(|id| owned.contains(id)).copied().collect::<Vec<_>>();
    if !already_owned.is_empty() {
        return Err(PurchaseError::AlreadyOwned(already_owned));
    }
    let mut items = Vec::with_capacity(request.len());
    for (i, id) in request.game_ids.iter().enumerate() {
        let game = by_id.remove(id).ok_or_else(|| PurchaseError::GamesNotFound(vec![*id]))?;
        if game.is_authored_by(buyer) {
            return Err(PurchaseError::SelfPurchase(game.id));
        }
        let quoted_price = request.quoted_prices.as_ref().map(|p| p[i]);
        items.push(PlannedItem { game, quoted_price });
    }
    let total = Money::checked_sum(items.iter().map(|i| i.game.price))
        .ok_or_else(|| PurchaseError::InvalidAmount("The purchase total is too large".into()))?;
    if total.is_positive() {
        let available = balance.ok_or(PurchaseError::BalanceNotFound(buyer))?;
        if available < total {
            return Err(PurchaseError::InsufficientFunds { available, required: total });
        }
    }
    Ok(PurchasePlan { items, total })
}
