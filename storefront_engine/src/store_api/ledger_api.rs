use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Balance, BalanceTransaction, Money, TransactionType, UserId},
    events::EventProducers,
    traits::{LedgerError, LedgerManagement},
};

/// The largest amount a single deposit or withdrawal may move unless configured otherwise.
pub const DEFAULT_MAX_TRANSACTION_AMOUNT: Money = Money::from_cents(1_000_000);

/// `LedgerApi` is the only way to move money in or out of a user's balance.
///
/// Amounts are validated here before the backend is touched: they must be positive, and deposits and withdrawals may
/// not exceed the configured per-call maximum.
pub struct LedgerApi<B> {
    db: B,
    producers: EventProducers,
    max_transaction_amount: Money,
}

impl<B: Debug> Debug for LedgerApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LedgerApi ({:?}, max {})", self.db, self.max_transaction_amount)
    }
}

impl<B> LedgerApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers, max_transaction_amount: DEFAULT_MAX_TRANSACTION_AMOUNT }
    }

    pub fn with_max_transaction_amount(mut self, max: Money) -> Self {
        self.max_transaction_amount = max;
        self
    }

    pub fn max_transaction_amount(&self) -> Money {
        self.max_transaction_amount
    }
}

impl<B> LedgerApi<B>
where B: LedgerManagement
{
    pub async fn create(&self, user_id: UserId) -> Result<Balance, LedgerError> {
        self.db.create_balance(user_id).await
    }

    pub async fn get(&self, user_id: UserId) -> Result<Balance, LedgerError> {
        self.db.fetch_balance(user_id).await
    }

    pub async fn can_afford(&self, user_id: UserId, amount: Money) -> Result<bool, LedgerError> {
        check_amount(amount, None)?;
        self.db.can_afford(user_id, amount).await
    }

    pub async fn deposit(&self, user_id: UserId, amount: Money) -> Result<BalanceTransaction, LedgerError> {
        check_amount(amount, Some(self.max_transaction_amount))?;
        self.apply_credit(user_id, amount, TransactionType::Deposit).await
    }

    /// Credits a balance on behalf of an administrator. The per-call maximum does not apply.
    pub async fn admin_deposit(&self, user_id: UserId, amount: Money) -> Result<BalanceTransaction, LedgerError> {
        check_amount(amount, None)?;
        info!("💰️ Administrative credit of {amount} for {user_id}");
        self.apply_credit(user_id, amount, TransactionType::AdminDeposit).await
    }

    pub async fn withdraw(&self, user_id: UserId, amount: Money) -> Result<BalanceTransaction, LedgerError> {
        check_amount(amount, Some(self.max_transaction_amount))?;
        self.apply_debit(user_id, amount, TransactionType::Withdrawal).await
    }

    /// A debit tagged as a purchase. Purchases made through the purchase API debit inside their own unit of work, so
    /// this is for callers that settle a purchase outside the engine.
    pub async fn debit_for_purchase(&self, user_id: UserId, amount: Money) -> Result<BalanceTransaction, LedgerError> {
        check_amount(amount, None)?;
        self.apply_debit(user_id, amount, TransactionType::Purchase).await
    }

    pub async fn delete(&self, user_id: UserId) -> Result<(), LedgerError> {
        self.db.delete_balance(user_id).await
    }

    /// The balance's transaction log, oldest first.
    pub async fn transactions(&self, user_id: UserId) -> Result<Vec<BalanceTransaction>, LedgerError> {
        self.db.fetch_transactions(user_id).await
    }

    async fn apply_credit(
        &self,
        user_id: UserId,
        amount: Money,
        operation: TransactionType,
    ) -> Result<BalanceTransaction, LedgerError> {
        let tx = self.db.credit(user_id, amount, operation).await?;
        self.producers.publish_balance_changed(&tx);
        Ok(tx)
    }

    async fn apply_debit(
        &self,
        user_id: UserId,
        amount: Money,
        operation: TransactionType,
    ) -> Result<BalanceTransaction, LedgerError> {
        let tx = self.db.debit(user_id, amount, operation).await?;
        self.producers.publish_balance_changed(&tx);
        Ok(tx)
    }
}

/// Parses a user-supplied amount. Malformed input, including more than two decimal places, is an
/// [`LedgerError::InvalidAmount`].
pub fn parse_amount(value: &str) -> Result<Money, LedgerError> {
    let amount = value.parse::<Money>()?;
    Ok(amount)
}

fn check_amount(amount: Money, limit: Option<Money>) -> Result<(), LedgerError> {
    if !amount.is_positive() {
        return Err(LedgerError::InvalidAmount(format!("Amount must be greater than zero, but was {amount}")));
    }
    match limit {
        Some(max) if amount > max => {
            Err(LedgerError::InvalidAmount(format!("Amount {amount} exceeds the maximum of {max} per transaction")))
        },
        _ => Ok(()),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn amounts_must_be_positive() {
        assert!(check_amount(Money::from_cents(1), None).is_ok());
        let err = check_amount(Money::ZERO, None).unwrap_err();
        assert_eq!(err.to_string(), "Invalid amount. Amount must be greater than zero, but was 0.00");
        let err = check_amount(Money::from_cents(-500), Some(Money::from_units(10))).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount(_)));
    }

    #[test]
    fn amounts_respect_the_limit() {
        let max = Money::from_units(100);
        assert!(check_amount(max, Some(max)).is_ok());
        let err = check_amount(Money::from_cents(10_001), Some(max)).unwrap_err();
        assert_eq!(err.to_string(), "Invalid amount. Amount 100.01 exceeds the maximum of 100.00 per transaction");
        assert!(check_amount(Money::from_cents(10_001), None).is_ok());
    }

    #[test]
    fn malformed_amounts_are_invalid() {
        assert_eq!(parse_amount("29.99").unwrap(), Money::from_cents(2999));
        assert!(matches!(parse_amount("29.999"), Err(LedgerError::InvalidAmount(_))));
        assert!(matches!(parse_amount("twelve"), Err(LedgerError::InvalidAmount(_))));
        assert!(matches!(parse_amount(""), Err(LedgerError::InvalidAmount(_))));
    }
}
