use thiserror::Error;

use crate::db_types::{GameId, HistoryEntry, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for HistoryError {
    fn from(e: sqlx::Error) -> Self {
        HistoryError::DatabaseError(e.to_string())
    }
}

#[allow(async_fn_in_trait)]
pub trait HistoryManagement {
    async fn fetch_history_for_game(&self, game_id: GameId) -> Result<Vec<HistoryEntry>, HistoryError>;

    async fn fetch_history_for_actor(&self, actor_id: UserId) -> Result<Vec<HistoryEntry>, HistoryError>;
}
