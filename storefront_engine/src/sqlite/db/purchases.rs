use log::trace;
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db_types::{GameId, Money, PurchaseRecord, UserId},
    traits::PurchaseError,
};

/// Grants ownership of the game. The `(user_id, game_id)` uniqueness constraint backs up the ownership check made
/// earlier in the unit of work; a violation is reported as [`PurchaseError::AlreadyOwned`]. The games have been
/// resolved by then too, so a foreign key violation means the buyer does not exist.
pub async fn insert_purchase(
    user_id: UserId,
    game_id: GameId,
    price_paid: Money,
    conn: &mut SqliteConnection,
) -> Result<PurchaseRecord, PurchaseError> {
    let record: PurchaseRecord =
        sqlx::query_as("INSERT INTO purchase_records (user_id, game_id, price_paid) VALUES ($1, $2, $3) RETURNING *")
            .bind(user_id)
            .bind(game_id)
            .bind(price_paid)
            .fetch_one(conn)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(err) if err.is_unique_violation() => PurchaseError::AlreadyOwned(vec![game_id]),
                sqlx::Error::Database(err) if err.is_foreign_key_violation() => PurchaseError::UserNotFound(user_id),
                e => PurchaseError::from(e),
            })?;
    trace!("🛒️ Purchase record #{} grants {game_id} to {user_id} at {price_paid}", record.id);
    Ok(record)
}

/// Returns those ids in `game_ids` that the user already owns.
pub async fn owned_among(
    user_id: UserId,
    game_ids: &[GameId],
    conn: &mut SqliteConnection,
) -> Result<Vec<GameId>, sqlx::Error> {
    if game_ids.is_empty() {
        return Ok(vec![]);
    }
    let mut builder = QueryBuilder::new("SELECT game_id FROM purchase_records WHERE user_id = ");
    builder.push_bind(user_id);
    builder.push(" AND game_id IN (");
    let mut list = builder.separated(", ");
    for id in game_ids {
        list.push_bind(*id);
    }
    builder.push(")");
    let owned = builder.build_query_scalar::<GameId>().fetch_all(conn).await?;
    Ok(owned)
}

pub async fn owns(user_id: UserId, game_id: GameId, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let owned = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM purchase_records WHERE user_id = $1 AND game_id = $2)")
        .bind(user_id)
        .bind(game_id)
        .fetch_one(conn)
        .await?;
    Ok(owned)
}

pub async fn fetch_purchase(
    user_id: UserId,
    game_id: GameId,
    conn: &mut SqliteConnection,
) -> Result<Option<PurchaseRecord>, sqlx::Error> {
    let record = sqlx::query_as("SELECT * FROM purchase_records WHERE user_id = $1 AND game_id = $2")
        .bind(user_id)
        .bind(game_id)
        .fetch_optional(conn)
        .await?;
    Ok(record)
}

/// The user's library, newest purchase first.
pub async fn purchases_for_user(
    user_id: UserId,
    conn: &mut SqliteConnection,
) -> Result<Vec<PurchaseRecord>, sqlx::Error> {
    let records =
        sqlx::query_as("SELECT * FROM purchase_records WHERE user_id = $1 ORDER BY purchased_at DESC, id DESC")
            .bind(user_id)
            .fetch_all(conn)
            .await?;
    Ok(records)
}
