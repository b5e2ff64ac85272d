use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{GameId, UserId},
    events::{EventProducers, GamesPurchasedEvent},
    traits::{CartError, CartManagement, CartSummary, CheckoutReceipt, PurchaseManagement},
};

/// `CartApi` stages games a user intends to buy and checks them out as one purchase.
///
/// The cart is only emptied by a checkout whose purchase committed in the same unit of work. A failed checkout leaves
/// the cart, the balance and the user's library exactly as they were, and the purchase error is returned unchanged
/// inside [`CartError::Purchase`].
pub struct CartApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B: Debug> Debug for CartApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CartApi ({:?})", self.db)
    }
}

impl<B> CartApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> CartApi<B>
where B: CartManagement + PurchaseManagement
{
    /// Adds the game to the cart and returns the new cart size.
    pub async fn add(&self, user_id: UserId, game_id: GameId) -> Result<i64, CartError> {
        self.db.add_to_cart(user_id, game_id).await
    }

    /// Removes the game from the cart and returns the new cart size.
    pub async fn remove(&self, user_id: UserId, game_id: GameId) -> Result<i64, CartError> {
        self.db.remove_from_cart(user_id, game_id).await
    }

    /// The cart joined with current catalog data. An empty cart is an empty summary, not an error.
    pub async fn view(&self, user_id: UserId) -> Result<CartSummary, CartError> {
        self.db.fetch_cart(user_id).await
    }

    /// Empties the cart and returns the number of items removed.
    pub async fn clear(&self, user_id: UserId) -> Result<u64, CartError> {
        self.db.clear_cart(user_id).await
    }

    pub async fn checkout(&self, user_id: UserId) -> Result<CheckoutReceipt, CartError> {
        let receipt = self.db.checkout(user_id).await.map_err(|e| {
            debug!("🧺️ Checkout for {user_id} failed. The cart is unchanged. {e}");
            e
        })?;
        self.producers.publish_games_purchased(GamesPurchasedEvent::from_checkout(user_id, &receipt));
        if let Some(tx) = &receipt.transaction {
            self.producers.publish_balance_changed(tx);
        }
        info!("🧺️ {user_id} checked out {} game(s) for {}", receipt.items_processed, receipt.total_charged);
        Ok(receipt)
    }

    /// True if checking out right now would succeed. An empty cart is simply `false`.
    pub async fn validate_for_checkout(&self, user_id: UserId) -> Result<bool, CartError> {
        let game_ids = self.db.fetch_cart_game_ids(user_id).await?;
        if game_ids.is_empty() {
            trace!("🧺️ Cart for {user_id} is empty. Nothing to validate");
            return Ok(false);
        }
        let ok = self.db.can_purchase_all(user_id, &game_ids).await?;
        Ok(ok)
    }
}
