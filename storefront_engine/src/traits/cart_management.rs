use thiserror::Error;

use crate::{
    db_types::{GameId, UserId},
    traits::{
        data_objects::{CartSummary, CheckoutReceipt},
        PurchaseError,
    },
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Game {0} does not exist")]
    GameNotFound(GameId),
    #[error("There is no {0}")]
    UserNotFound(UserId),
    #[error("Game {0} is already owned")]
    AlreadyOwned(GameId),
    #[error("Game {0} is already in the cart")]
    AlreadyInCart(GameId),
    #[error("Game {0} is not in the cart")]
    NotInCart(GameId),
    #[error("The cart is empty")]
    EmptyCart,
    #[error("Invalid amount. {0}")]
    InvalidAmount(String),
    #[error(transparent)]
    Purchase(#[from] PurchaseError),
}

impl From<sqlx::Error> for CartError {
    fn from(e: sqlx::Error) -> Self {
        CartError::DatabaseError(e.to_string())
    }
}

/// The `CartManagement` trait defines behaviour for staging games ahead of a purchase.
///
/// Cart rows are only ever removed by [`CartManagement::remove_from_cart`], [`CartManagement::clear_cart`], or by a
/// checkout whose purchase has succeeded in the same unit of work.
#[allow(async_fn_in_trait)]
pub trait CartManagement {
    /// Stages the game for the user and returns the new number of items in the cart.
    async fn add_to_cart(&self, user_id: UserId, game_id: GameId) -> Result<i64, CartError>;

    /// Removes the game from the user's cart and returns the new number of items in the cart.
    async fn remove_from_cart(&self, user_id: UserId, game_id: GameId) -> Result<i64, CartError>;

    /// The user's staged games joined with current catalog data.
    async fn fetch_cart(&self, user_id: UserId) -> Result<CartSummary, CartError>;

    /// The ids of all staged games, in the order they were added.
    async fn fetch_cart_game_ids(&self, user_id: UserId) -> Result<Vec<GameId>, CartError>;

    /// Removes every staged game and returns how many were removed.
    async fn clear_cart(&self, user_id: UserId) -> Result<u64, CartError>;

    /// Purchases everything in the cart as one batch and empties the cart, in a single unit of work.
    async fn checkout(&self, user_id: UserId) -> Result<CheckoutReceipt, CartError>;
}
