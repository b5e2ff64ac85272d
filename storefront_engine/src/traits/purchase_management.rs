use thiserror::Error;

use crate::{
    db_types::{display_ids, Game, GameId, Money, PurchaseRecord, UserId},
    traits::{
        data_objects::{Eligibility, PurchaseOutcome, PurchaseRequest},
        LedgerError,
    },
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PurchaseError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Invalid purchase request. {0}")]
    InvalidRequest(String),
    #[error("One or more games were not found: {}", display_ids(.0))]
    GamesNotFound(Vec<GameId>),
    #[error("The following games are already owned: {}", display_ids(.0))]
    AlreadyOwned(Vec<GameId>),
    #[error("Game {0} cannot be purchased by its own author")]
    SelfPurchase(GameId),
    #[error("Insufficient funds. Available: {available}, required: {required}")]
    InsufficientFunds { available: Money, required: Money },
    #[error("No balance exists for {0}")]
    BalanceNotFound(UserId),
    #[error("There is no {0}")]
    UserNotFound(UserId),
    #[error("Invalid amount. {0}")]
    InvalidAmount(String),
    #[error("{user} has not purchased game {game}")]
    PurchaseNotFound { user: UserId, game: GameId },
}

impl PurchaseError {
    /// True if the purchase was refused on business grounds, as opposed to failing for an internal reason.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, PurchaseError::DatabaseError(_))
    }
}

impl From<sqlx::Error> for PurchaseError {
    fn from(e: sqlx::Error) -> Self {
        PurchaseError::DatabaseError(e.to_string())
    }
}

impl From<LedgerError> for PurchaseError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::InsufficientFunds { available, required } => {
                PurchaseError::InsufficientFunds { available, required }
            },
            LedgerError::BalanceNotFound(user) | LedgerError::UserNotFound(user) => {
                PurchaseError::BalanceNotFound(user)
            },
            LedgerError::InvalidAmount(s) => PurchaseError::InvalidAmount(s),
            LedgerError::DatabaseError(s) => PurchaseError::DatabaseError(s),
            LedgerError::AlreadyExists(user) => {
                PurchaseError::DatabaseError(format!("Unexpected balance creation conflict for {user}"))
            },
        }
    }
}

/// The `PurchaseManagement` trait defines behaviour for turning catalog games into paid-for entitlements.
///
/// A purchase validates, debits the ledger once for the whole request, writes one [`PurchaseRecord`] per game and
/// records history, all in one unit of work.
#[allow(async_fn_in_trait)]
pub trait PurchaseManagement {
    /// Purchases every game in the request for `buyer`, or none of them.
    async fn purchase_games(&self, buyer: UserId, request: &PurchaseRequest) -> Result<PurchaseOutcome, PurchaseError>;

    /// Runs the purchase validation for a single game without committing anything. Never fails on business grounds;
    /// the reason is reported in the result instead.
    async fn check_eligibility(&self, buyer: UserId, game_id: GameId) -> Result<Eligibility, PurchaseError>;

    /// Runs the full batch validation without committing anything. True only if `purchase_games` would succeed for
    /// these ids right now.
    async fn can_purchase_all(&self, buyer: UserId, game_ids: &[GameId]) -> Result<bool, PurchaseError>;

    /// Whether `user_id` owns `game_id`.
    async fn owns_game(&self, user_id: UserId, game_id: GameId) -> Result<bool, PurchaseError>;

    /// All purchase records for the user, newest first.
    async fn fetch_purchases(&self, user_id: UserId) -> Result<Vec<PurchaseRecord>, PurchaseError>;

    /// The purchase record for the given game, along with the game's current catalog entry.
    async fn fetch_purchase_with_game(
        &self,
        user_id: UserId,
        game_id: GameId,
    ) -> Result<Option<(PurchaseRecord, Game)>, PurchaseError>;
}
