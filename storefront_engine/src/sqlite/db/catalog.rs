use log::trace;
use sqlx::{QueryBuilder, SqliteConnection};

use crate::db_types::{Game, GameId, NewGame, UserId};

pub async fn fetch_game(game_id: GameId, conn: &mut SqliteConnection) -> Result<Option<Game>, sqlx::Error> {
    let game = sqlx::query_as("SELECT * FROM games WHERE id = $1").bind(game_id).fetch_optional(conn).await?;
    Ok(game)
}

/// Fetches every game in `ids` that exists. Ids that do not resolve are simply absent from the result.
pub async fn fetch_games(ids: &[GameId], conn: &mut SqliteConnection) -> Result<Vec<Game>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(vec![]);
    }
    let mut builder = QueryBuilder::new("SELECT * FROM games WHERE id IN (");
    let mut list = builder.separated(", ");
    for id in ids {
        list.push_bind(*id);
    }
    builder.push(") ORDER BY id");
    let games = builder.build_query_as::<Game>().fetch_all(conn).await?;
    trace!("🛒️ Resolved {} of {} requested games", games.len(), ids.len());
    Ok(games)
}

pub async fn game_exists(game_id: GameId, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let exists = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM games WHERE id = $1)")
        .bind(game_id)
        .fetch_one(conn)
        .await?;
    Ok(exists)
}

pub async fn insert_user(username: &str, conn: &mut SqliteConnection) -> Result<UserId, sqlx::Error> {
    let id = sqlx::query_scalar("INSERT INTO users (username) VALUES ($1) RETURNING id")
        .bind(username)
        .fetch_one(conn)
        .await?;
    Ok(id)
}

pub async fn fetch_user_by_name(username: &str, conn: &mut SqliteConnection) -> Result<Option<UserId>, sqlx::Error> {
    let id = sqlx::query_scalar("SELECT id FROM users WHERE username = $1").bind(username).fetch_optional(conn).await?;
    Ok(id)
}

pub async fn insert_game(game: NewGame, conn: &mut SqliteConnection) -> Result<Game, sqlx::Error> {
    let game = sqlx::query_as("INSERT INTO games (title, price, author_id) VALUES ($1, $2, $3) RETURNING *")
        .bind(game.title)
        .bind(game.price)
        .bind(game.author_id)
        .fetch_one(conn)
        .await?;
    Ok(game)
}

/// Changes a game's catalog price. Used by tooling and tests to exercise price drift between purchase and now.
pub async fn update_game_price(
    game_id: GameId,
    price: crate::db_types::Money,
    conn: &mut SqliteConnection,
) -> Result<Option<Game>, sqlx::Error> {
    let game = sqlx::query_as(
        r#"UPDATE games SET price = $1, updated_at = strftime('%Y-%m-%d %H:%M:%f', 'now')
        WHERE id = $2 RETURNING *"#,
    )
    .bind(price)
    .bind(game_id)
    .fetch_optional(conn)
    .await?;
    Ok(game)
}
