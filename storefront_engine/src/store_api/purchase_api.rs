use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{GameId, PurchaseRecord, UserId},
    events::{EventProducers, GamesPurchasedEvent},
    traits::{Eligibility, PurchaseError, PurchaseManagement, PurchaseOutcome, PurchaseReceipt, PurchaseRequest},
};

/// `PurchaseApi` turns catalog games into owned games.
///
/// Each purchase, single or batch, is one atomic unit of work in the backend: the ledger is debited once for the whole
/// request, a purchase record is written per game and a history entry is recorded per game. Either all of that
/// happens or none of it does.
pub struct PurchaseApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B: Debug> Debug for PurchaseApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PurchaseApi ({:?})", self.db)
    }
}

impl<B> PurchaseApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> PurchaseApi<B>
where B: PurchaseManagement
{
    pub async fn purchase_single(&self, buyer: UserId, game_id: GameId) -> Result<PurchaseReceipt, PurchaseError> {
        let outcome = self.purchase(buyer, &PurchaseRequest::single(game_id)).await?;
        outcome.receipts.into_iter().next().ok_or_else(|| {
            error!("🛒️ The purchase of {game_id} by {buyer} committed without producing a receipt");
            PurchaseError::DatabaseError(format!("No receipt was produced for game {game_id}"))
        })
    }

    /// Buys every game in the request, or none of them. The ledger is debited once for the total.
    pub async fn purchase_batch(
        &self,
        buyer: UserId,
        request: PurchaseRequest,
    ) -> Result<PurchaseOutcome, PurchaseError> {
        self.purchase(buyer, &request).await
    }

    /// Reports whether `buyer` could purchase `game_id` right now, and if not, why not. Nothing is committed.
    pub async fn check_eligibility(&self, buyer: UserId, game_id: GameId) -> Result<Eligibility, PurchaseError> {
        self.db.check_eligibility(buyer, game_id).await
    }

    /// True only if [`Self::purchase_batch`] would currently succeed for these games. Nothing is committed.
    pub async fn can_purchase_all(&self, buyer: UserId, game_ids: &[GameId]) -> Result<bool, PurchaseError> {
        self.db.can_purchase_all(buyer, game_ids).await
    }

    /// The user's library, newest purchase first.
    pub async fn purchases(&self, user_id: UserId) -> Result<Vec<PurchaseRecord>, PurchaseError> {
        self.db.fetch_purchases(user_id).await
    }

    pub async fn owns(&self, user_id: UserId, game_id: GameId) -> Result<bool, PurchaseError> {
        self.db.owns_game(user_id, game_id).await
    }

    /// A receipt for a game the user already owns, comparing what they paid with the current price.
    pub async fn purchase_details(&self, user_id: UserId, game_id: GameId) -> Result<PurchaseReceipt, PurchaseError> {
        let (record, game) = self
            .db
            .fetch_purchase_with_game(user_id, game_id)
            .await?
            .ok_or(PurchaseError::PurchaseNotFound { user: user_id, game: game_id })?;
        Ok(PurchaseReceipt::for_existing(&record, &game))
    }

    async fn purchase(&self, buyer: UserId, request: &PurchaseRequest) -> Result<PurchaseOutcome, PurchaseError> {
        trace!("🛒️ {buyer} is purchasing {} game(s)", request.len());
        let outcome = self.db.purchase_games(buyer, request).await.map_err(|e| {
            debug!("🛒️ Purchase by {buyer} was not completed. {e}");
            e
        })?;
        self.producers.publish_games_purchased(GamesPurchasedEvent::from_outcome(&outcome));
        if let Some(tx) = &outcome.transaction {
            self.producers.publish_balance_changed(tx);
        }
        info!("🛒️ {buyer} purchased {} game(s) for {}", outcome.count(), outcome.total);
        Ok(outcome)
    }
}
