use log::{debug, error, trace};
use sqlx::SqliteConnection;

use crate::{
    db_types::{Balance, BalanceTransaction, Money, TransactionType, UserId},
    traits::LedgerError,
};

pub async fn insert_balance(user_id: UserId, conn: &mut SqliteConnection) -> Result<Balance, LedgerError> {
    let balance = sqlx::query_as("INSERT INTO balances (user_id, amount) VALUES ($1, 0) RETURNING *")
        .bind(user_id)
        .fetch_one(conn)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(err) if err.is_unique_violation() => LedgerError::AlreadyExists(user_id),
            sqlx::Error::Database(err) if err.is_foreign_key_violation() => LedgerError::UserNotFound(user_id),
            e => LedgerError::from(e),
        })?;
    debug!("💰️ Created balance for {user_id}");
    Ok(balance)
}

pub async fn fetch_balance(user_id: UserId, conn: &mut SqliteConnection) -> Result<Option<Balance>, sqlx::Error> {
    let balance =
        sqlx::query_as("SELECT * FROM balances WHERE user_id = $1").bind(user_id).fetch_optional(conn).await?;
    Ok(balance)
}

/// Adds `amount` to the user's balance and appends the matching ledger entry.
///
/// Credits that would take the balance past the largest representable amount are refused with
/// [`LedgerError::InvalidAmount`].
pub async fn credit(
    user_id: UserId,
    amount: Money,
    operation: TransactionType,
    conn: &mut SqliteConnection,
) -> Result<BalanceTransaction, LedgerError> {
    let current = fetch_balance(user_id, &mut *conn).await?.ok_or(LedgerError::BalanceNotFound(user_id))?;
    let new_amount = current.amount.checked_add(amount).ok_or_else(|| {
        LedgerError::InvalidAmount(format!(
            "Crediting {amount} to the balance of {user_id} would exceed the largest balance that can be held"
        ))
    })?;
    let balance: Balance = sqlx::query_as(
        r#"UPDATE balances SET amount = $1, updated_at = strftime('%Y-%m-%d %H:%M:%f', 'now')
        WHERE id = $2 RETURNING *"#,
    )
    .bind(new_amount)
    .bind(current.id)
    .fetch_one(&mut *conn)
    .await?;
    append_transaction(&balance, operation, amount, current.amount, conn).await
}

/// Removes `amount` from the user's balance and appends the matching ledger entry.
///
/// The update only applies if the balance covers the amount, so a balance can never be driven below zero here even if
/// a caller skipped its own affordability check.
pub async fn debit(
    user_id: UserId,
    amount: Money,
    operation: TransactionType,
    conn: &mut SqliteConnection,
) -> Result<BalanceTransaction, LedgerError> {
    let updated: Option<Balance> = sqlx::query_as(
        r#"UPDATE balances SET amount = amount - $1, updated_at = strftime('%Y-%m-%d %H:%M:%f', 'now')
        WHERE user_id = $2 AND amount >= $1 RETURNING *"#,
    )
    .bind(amount)
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?;
    let balance = match updated {
        Some(b) => b,
        None => {
            let current = fetch_balance(user_id, conn).await?.ok_or(LedgerError::BalanceNotFound(user_id))?;
            debug!("💰️ Refused to debit {amount} from {user_id}. Only {} available", current.amount);
            return Err(LedgerError::InsufficientFunds { available: current.amount, required: amount });
        },
    };
    let before = balance.amount + amount;
    append_transaction(&balance, operation, amount, before, conn).await
}

async fn append_transaction(
    balance: &Balance,
    operation: TransactionType,
    amount: Money,
    balance_before: Money,
    conn: &mut SqliteConnection,
) -> Result<BalanceTransaction, LedgerError> {
    let tx: BalanceTransaction = sqlx::query_as(
        r#"INSERT INTO balance_transactions (balance_id, operation, amount, balance_before, balance_after)
        VALUES ($1, $2, $3, $4, $5) RETURNING *"#,
    )
    .bind(balance.id)
    .bind(operation)
    .bind(amount)
    .bind(balance_before)
    .bind(balance.amount)
    .fetch_one(conn)
    .await?;
    if !tx.is_consistent() {
        error!("💰️ Ledger entry {} for {} does not add up: {tx:?}", tx.id, balance.user_id);
    }
    trace!(
        "💰️ {} of {amount} for {}. {balance_before} -> {} (entry #{})",
        tx.operation,
        balance.user_id,
        tx.balance_after,
        tx.id
    );
    Ok(tx)
}

/// Deletes the balance. Its transaction log goes with it by cascade. Returns `false` if there was nothing to delete.
pub async fn delete_balance(user_id: UserId, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM balances WHERE user_id = $1").bind(user_id).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}

pub async fn transactions_for_user(
    user_id: UserId,
    conn: &mut SqliteConnection,
) -> Result<Vec<BalanceTransaction>, sqlx::Error> {
    let txs = sqlx::query_as(
        r#"SELECT balance_transactions.* FROM balance_transactions
        INNER JOIN balances ON balances.id = balance_transactions.balance_id
        WHERE balances.user_id = $1
        ORDER BY balance_transactions.created_at, balance_transactions.id"#,
    )
    .bind(user_id)
    .fetch_all(conn)
    .await?;
    Ok(txs)
}
