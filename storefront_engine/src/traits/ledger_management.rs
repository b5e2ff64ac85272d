use thiserror::Error;

use crate::db_types::{Balance, BalanceTransaction, Money, TransactionType, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("A balance already exists for {0}")]
    AlreadyExists(UserId),
    #[error("No balance exists for {0}")]
    BalanceNotFound(UserId),
    #[error("{0} does not exist")]
    UserNotFound(UserId),
    #[error("Invalid amount. {0}")]
    InvalidAmount(String),
    #[error("Insufficient funds. Available: {available}, required: {required}")]
    InsufficientFunds { available: Money, required: Money },
}

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        LedgerError::DatabaseError(e.to_string())
    }
}

impl From<storefront_common::MoneyConversionError> for LedgerError {
    fn from(e: storefront_common::MoneyConversionError) -> Self {
        LedgerError::InvalidAmount(e.to_string())
    }
}

/// The `LedgerManagement` trait defines behaviour for managing per-user balances.
///
/// Implementations must make every mutation write the new balance and a [`BalanceTransaction`] describing it in the
/// same unit of work, and must never let a balance go negative.
#[allow(async_fn_in_trait)]
pub trait LedgerManagement {
    /// Creates a zero balance for the user. Fails with [`LedgerError::AlreadyExists`] if the user already has one.
    async fn create_balance(&self, user_id: UserId) -> Result<Balance, LedgerError>;

    /// Fetches the current balance for the user, failing with [`LedgerError::BalanceNotFound`] if there is none.
    async fn fetch_balance(&self, user_id: UserId) -> Result<Balance, LedgerError>;

    /// Returns true if the user's current balance covers `amount`.
    async fn can_afford(&self, user_id: UserId, amount: Money) -> Result<bool, LedgerError>;

    /// Increases the balance by `amount` and records the transaction under the given (crediting) operation type.
    async fn credit(
        &self,
        user_id: UserId,
        amount: Money,
        operation: TransactionType,
    ) -> Result<BalanceTransaction, LedgerError>;

    /// Decreases the balance by `amount` and records the transaction under the given (debiting) operation type.
    /// Fails with [`LedgerError::InsufficientFunds`] rather than overdrawing.
    async fn debit(
        &self,
        user_id: UserId,
        amount: Money,
        operation: TransactionType,
    ) -> Result<BalanceTransaction, LedgerError>;

    /// Deletes the balance along with its transaction log.
    async fn delete_balance(&self, user_id: UserId) -> Result<(), LedgerError>;

    /// The user's transaction log, oldest entry first.
    async fn fetch_transactions(&self, user_id: UserId) -> Result<Vec<BalanceTransaction>, LedgerError>;
}
