use std::fmt::Debug;

use crate::{
    db_types::{GameId, HistoryEntry, UserId},
    traits::{HistoryError, HistoryManagement},
};

/// Read access to the audit history. Entries are written by the purchase flow; this API never writes.
pub struct HistoryApi<B> {
    db: B,
}

impl<B: Debug> Debug for HistoryApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HistoryApi ({:?})", self.db)
    }
}

impl<B> HistoryApi<B>
where B: HistoryManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn history_for_game(&self, game_id: GameId) -> Result<Vec<HistoryEntry>, HistoryError> {
        self.db.fetch_history_for_game(game_id).await
    }

    pub async fn history_for_actor(&self, actor_id: UserId) -> Result<Vec<HistoryEntry>, HistoryError> {
        self.db.fetch_history_for_actor(actor_id).await
    }
}
