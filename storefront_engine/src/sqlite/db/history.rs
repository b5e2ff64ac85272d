use log::trace;
use sqlx::SqliteConnection;

use crate::db_types::{GameId, HistoryEntry, NewHistoryEntry, UserId};

pub async fn insert_history_entry(
    entry: NewHistoryEntry,
    conn: &mut SqliteConnection,
) -> Result<HistoryEntry, sqlx::Error> {
    let entry: HistoryEntry = sqlx::query_as(
        r#"INSERT INTO history (game_id, actor_id, action, field_name, old_value, new_value, description)
        VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *"#,
    )
    .bind(entry.game_id)
    .bind(entry.actor_id)
    .bind(entry.action)
    .bind(entry.field_name)
    .bind(entry.old_value)
    .bind(entry.new_value)
    .bind(entry.description)
    .fetch_one(conn)
    .await?;
    trace!("📜️ Recorded {} of {} by {}", entry.action, entry.game_id, entry.actor_id);
    Ok(entry)
}

pub async fn history_for_game(game_id: GameId, conn: &mut SqliteConnection) -> Result<Vec<HistoryEntry>, sqlx::Error> {
    let entries = sqlx::query_as("SELECT * FROM history WHERE game_id = $1 ORDER BY created_at, id")
        .bind(game_id)
        .fetch_all(conn)
        .await?;
    Ok(entries)
}

pub async fn history_for_actor(
    actor_id: UserId,
    conn: &mut SqliteConnection,
) -> Result<Vec<HistoryEntry>, sqlx::Error> {
    let entries = sqlx::query_as("SELECT * FROM history WHERE actor_id = $1 ORDER BY created_at, id")
        .bind(actor_id)
        .fetch_all(conn)
        .await?;
    Ok(entries)
}
