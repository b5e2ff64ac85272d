use log::trace;
use sqlx::SqliteConnection;

use crate::{
    db_types::{CartItem, GameId, UserId},
    traits::{CartEntry, CartError},
};

/// Stages the game. The `(user_id, game_id)` uniqueness constraint turns a concurrent duplicate into
/// [`CartError::AlreadyInCart`].
///
/// Callers check that the game exists first, so a foreign key violation means the user does not.
pub async fn insert_cart_item(
    user_id: UserId,
    game_id: GameId,
    conn: &mut SqliteConnection,
) -> Result<CartItem, CartError> {
    let item: CartItem = sqlx::query_as("INSERT INTO cart_items (user_id, game_id) VALUES ($1, $2) RETURNING *")
        .bind(user_id)
        .bind(game_id)
        .fetch_one(conn)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(err) if err.is_unique_violation() => CartError::AlreadyInCart(game_id),
            sqlx::Error::Database(err) if err.is_foreign_key_violation() => CartError::UserNotFound(user_id),
            e => CartError::from(e),
        })?;
    trace!("🧺️ {game_id} staged for {user_id} as cart item #{}", item.id);
    Ok(item)
}

pub async fn is_in_cart(user_id: UserId, game_id: GameId, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let staged = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM cart_items WHERE user_id = $1 AND game_id = $2)")
        .bind(user_id)
        .bind(game_id)
        .fetch_one(conn)
        .await?;
    Ok(staged)
}

/// Returns `false` if the game was not staged.
pub async fn delete_cart_item(
    user_id: UserId,
    game_id: GameId,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND game_id = $2")
        .bind(user_id)
        .bind(game_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_cart(user_id: UserId, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1").bind(user_id).execute(conn).await?;
    Ok(result.rows_affected())
}

pub async fn cart_size(user_id: UserId, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let count =
        sqlx::query_scalar("SELECT COUNT(*) FROM cart_items WHERE user_id = $1").bind(user_id).fetch_one(conn).await?;
    Ok(count)
}

pub async fn cart_game_ids(user_id: UserId, conn: &mut SqliteConnection) -> Result<Vec<GameId>, sqlx::Error> {
    let ids = sqlx::query_scalar("SELECT game_id FROM cart_items WHERE user_id = $1 ORDER BY added_at, id")
        .bind(user_id)
        .fetch_all(conn)
        .await?;
    Ok(ids)
}

/// The staged games joined with current catalog data, in the order they were added.
pub async fn cart_entries(user_id: UserId, conn: &mut SqliteConnection) -> Result<Vec<CartEntry>, sqlx::Error> {
    let entries = sqlx::query_as(
        r#"SELECT
            games.id AS game_id,
            games.title,
            games.price,
            games.author_id,
            cart_items.added_at
        FROM cart_items INNER JOIN games ON games.id = cart_items.game_id
        WHERE cart_items.user_id = $1
        ORDER BY cart_items.added_at, cart_items.id"#,
    )
    .bind(user_id)
    .fetch_all(conn)
    .await?;
    Ok(entries)
}
