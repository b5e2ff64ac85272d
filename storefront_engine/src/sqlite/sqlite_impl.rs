//! `SqliteDatabase` is a concrete implementation of a storefront engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module.
//!
//! Every mutating method opens its own unit of work with [`begin_unit_of_work`], threads it through the low-level
//! functions in [`super::db`] and commits at the very end. Any early return drops the transaction, which rolls it
//! back.
use std::fmt::Debug;

use log::*;
use sqlx::{migrate, SqliteConnection, SqlitePool};

use super::db::{balances, begin_unit_of_work, cart, catalog, history, new_pool, purchases};
use crate::{
    config::EngineConfig,
    db_types::{
        Balance,
        BalanceTransaction,
        Game,
        GameId,
        HistoryEntry,
        Money,
        NewGame,
        NewHistoryEntry,
        PurchaseRecord,
        TransactionType,
        UserId,
    },
    helpers::{plan_purchase, validate_request, PurchasePlan},
    traits::{
        CartError,
        CartManagement,
        CartSummary,
        CheckoutReceipt,
        Eligibility,
        HistoryError,
        HistoryManagement,
        LedgerError,
        LedgerManagement,
        PurchaseError,
        PurchaseManagement,
        PurchaseOutcome,
        PurchaseReceipt,
        PurchaseRequest,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl LedgerManagement for SqliteDatabase {
    async fn create_balance(&self, user_id: UserId) -> Result<Balance, LedgerError> {
        let mut tx = begin_unit_of_work(&self.pool).await?;
        let balance = balances::insert_balance(user_id, &mut tx).await?;
        tx.commit().await?;
        Ok(balance)
    }

    async fn fetch_balance(&self, user_id: UserId) -> Result<Balance, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        balances::fetch_balance(user_id, &mut conn).await?.ok_or(LedgerError::BalanceNotFound(user_id))
    }

    async fn can_afford(&self, user_id: UserId, amount: Money) -> Result<bool, LedgerError> {
        let balance = self.fetch_balance(user_id).await?;
        Ok(balance.amount >= amount)
    }

    async fn credit(
        &self,
        user_id: UserId,
        amount: Money,
        operation: TransactionType,
    ) -> Result<BalanceTransaction, LedgerError> {
        let mut tx = begin_unit_of_work(&self.pool).await?;
        let entry = balances::credit(user_id, amount, operation, &mut tx).await?;
        tx.commit().await?;
        debug!("💰️ {operation} of {amount} credited to {user_id}. New balance: {}", entry.balance_after);
        Ok(entry)
    }

    async fn debit(
        &self,
        user_id: UserId,
        amount: Money,
        operation: TransactionType,
    ) -> Result<BalanceTransaction, LedgerError> {
        let mut tx = begin_unit_of_work(&self.pool).await?;
        let entry = balances::debit(user_id, amount, operation, &mut tx).await?;
        tx.commit().await?;
        debug!("💰️ {operation} of {amount} debited from {user_id}. New balance: {}", entry.balance_after);
        Ok(entry)
    }

    async fn delete_balance(&self, user_id: UserId) -> Result<(), LedgerError> {
        let mut tx = begin_unit_of_work(&self.pool).await?;
        if !balances::delete_balance(user_id, &mut tx).await? {
            return Err(LedgerError::BalanceNotFound(user_id));
        }
        tx.commit().await?;
        debug!("💰️ Balance for {user_id} deleted");
        Ok(())
    }

    async fn fetch_transactions(&self, user_id: UserId) -> Result<Vec<BalanceTransaction>, LedgerError> {
        let mut tx = self.pool.begin().await?;
        if balances::fetch_balance(user_id, &mut tx).await?.is_none() {
            return Err(LedgerError::BalanceNotFound(user_id));
        }
        let entries = balances::transactions_for_user(user_id, &mut tx).await?;
        tx.commit().await?;
        Ok(entries)
    }
}

impl PurchaseManagement for SqliteDatabase {
    async fn purchase_games(&self, buyer: UserId, request: &PurchaseRequest) -> Result<PurchaseOutcome, PurchaseError> {
        validate_request(request)?;
        let mut tx = begin_unit_of_work(&self.pool).await?;
        let outcome = execute_purchase(buyer, request, &mut tx).await?;
        tx.commit().await?;
        debug!("🛒️ {buyer} purchased {} game(s) for {}", outcome.count(), outcome.total);
        Ok(outcome)
    }

    async fn check_eligibility(&self, buyer: UserId, game_id: GameId) -> Result<Eligibility, PurchaseError> {
        let mut tx = self.pool.begin().await?;
        let result = prepare_plan(buyer, &PurchaseRequest::single(game_id), &mut tx).await;
        tx.rollback().await?;
        match result {
            Ok(_) => Ok(Eligibility::eligible(game_id)),
            Err(e) if e.is_rejection() => Ok(Eligibility::ineligible(game_id, e.to_string())),
            Err(e) => Err(e),
        }
    }

    async fn can_purchase_all(&self, buyer: UserId, game_ids: &[GameId]) -> Result<bool, PurchaseError> {
        let mut tx = self.pool.begin().await?;
        let result = prepare_plan(buyer, &PurchaseRequest::new(game_ids.to_vec()), &mut tx).await;
        tx.rollback().await?;
        match result {
            Ok(_) => Ok(true),
            Err(e) if e.is_rejection() => {
                trace!("🛒️ {buyer} cannot purchase all of the given games. {e}");
                Ok(false)
            },
            Err(e) => Err(e),
        }
    }

    async fn owns_game(&self, user_id: UserId, game_id: GameId) -> Result<bool, PurchaseError> {
        let mut conn = self.pool.acquire().await?;
        let owned = purchases::owns(user_id, game_id, &mut conn).await?;
        Ok(owned)
    }

    async fn fetch_purchases(&self, user_id: UserId) -> Result<Vec<PurchaseRecord>, PurchaseError> {
        let mut conn = self.pool.acquire().await?;
        let records = purchases::purchases_for_user(user_id, &mut conn).await?;
        Ok(records)
    }

    async fn fetch_purchase_with_game(
        &self,
        user_id: UserId,
        game_id: GameId,
    ) -> Result<Option<(PurchaseRecord, Game)>, PurchaseError> {
        let mut tx = self.pool.begin().await?;
        let Some(record) = purchases::fetch_purchase(user_id, game_id, &mut tx).await? else {
            return Ok(None);
        };
        let game = catalog::fetch_game(game_id, &mut tx).await?.ok_or(PurchaseError::GamesNotFound(vec![game_id]))?;
        tx.commit().await?;
        Ok(Some((record, game)))
    }
}

impl CartManagement for SqliteDatabase {
    async fn add_to_cart(&self, user_id: UserId, game_id: GameId) -> Result<i64, CartError> {
        let mut tx = begin_unit_of_work(&self.pool).await?;
        if !catalog::game_exists(game_id, &mut tx).await? {
            return Err(CartError::GameNotFound(game_id));
        }
        if purchases::owns(user_id, game_id, &mut tx).await? {
            return Err(CartError::AlreadyOwned(game_id));
        }
        if cart::is_in_cart(user_id, game_id, &mut tx).await? {
            return Err(CartError::AlreadyInCart(game_id));
        }
        let item = cart::insert_cart_item(user_id, game_id, &mut tx).await?;
        let size = cart::cart_size(user_id, &mut tx).await?;
        tx.commit().await?;
        debug!("🧺️ {game_id} added to the cart of {user_id} at {}. {size} item(s) in cart", item.added_at);
        Ok(size)
    }

    async fn remove_from_cart(&self, user_id: UserId, game_id: GameId) -> Result<i64, CartError> {
        let mut tx = begin_unit_of_work(&self.pool).await?;
        if !catalog::game_exists(game_id, &mut tx).await? {
            return Err(CartError::GameNotFound(game_id));
        }
        if !cart::delete_cart_item(user_id, game_id, &mut tx).await? {
            return Err(CartError::NotInCart(game_id));
        }
        let size = cart::cart_size(user_id, &mut tx).await?;
        tx.commit().await?;
        debug!("🧺️ {game_id} removed from the cart of {user_id}. {size} item(s) in cart");
        Ok(size)
    }

    async fn fetch_cart(&self, user_id: UserId) -> Result<CartSummary, CartError> {
        let mut conn = self.pool.acquire().await?;
        let entries = cart::cart_entries(user_id, &mut conn).await?;
        CartSummary::new(entries)
    }

    async fn fetch_cart_game_ids(&self, user_id: UserId) -> Result<Vec<GameId>, CartError> {
        let mut conn = self.pool.acquire().await?;
        let ids = cart::cart_game_ids(user_id, &mut conn).await?;
        Ok(ids)
    }

    async fn clear_cart(&self, user_id: UserId) -> Result<u64, CartError> {
        let mut tx = begin_unit_of_work(&self.pool).await?;
        let removed = cart::delete_cart(user_id, &mut tx).await?;
        if removed == 0 {
            return Err(CartError::EmptyCart);
        }
        tx.commit().await?;
        debug!("🧺️ Cleared {removed} item(s) from the cart of {user_id}");
        Ok(removed)
    }

    /// Loads the cart, purchases its contents and empties it in one unit of work. If the purchase fails the
    /// transaction is dropped before the cart is touched.
    async fn checkout(&self, user_id: UserId) -> Result<CheckoutReceipt, CartError> {
        let mut tx = begin_unit_of_work(&self.pool).await?;
        let game_ids = cart::cart_game_ids(user_id, &mut tx).await?;
        if game_ids.is_empty() {
            return Err(CartError::EmptyCart);
        }
        let outcome = execute_purchase(user_id, &PurchaseRequest::new(game_ids), &mut tx).await?;
        let removed = cart::delete_cart(user_id, &mut tx).await?;
        if removed as usize != outcome.count() {
            error!(
                "🧺️ Checkout for {user_id} purchased {} game(s) but removed {removed} cart item(s)",
                outcome.count()
            );
        }
        tx.commit().await?;
        debug!("🧺️ {user_id} checked out {} game(s) for {}", outcome.count(), outcome.total);
        Ok(CheckoutReceipt::from(outcome))
    }
}

impl HistoryManagement for SqliteDatabase {
    async fn fetch_history_for_game(&self, game_id: GameId) -> Result<Vec<HistoryEntry>, HistoryError> {
        let mut conn = self.pool.acquire().await?;
        let entries = history::history_for_game(game_id, &mut conn).await?;
        Ok(entries)
    }

    async fn fetch_history_for_actor(&self, actor_id: UserId) -> Result<Vec<HistoryEntry>, HistoryError> {
        let mut conn = self.pool.acquire().await?;
        let entries = history::history_for_actor(actor_id, &mut conn).await?;
        Ok(entries)
    }
}

/// Gathers everything a purchase decision depends on and runs it through the purchase rules. Nothing is written.
async fn prepare_plan(
    buyer: UserId,
    request: &PurchaseRequest,
    conn: &mut SqliteConnection,
) -> Result<PurchasePlan, PurchaseError> {
    validate_request(request)?;
    let games = catalog::fetch_games(&request.game_ids, conn).await?;
    let owned = purchases::owned_among(buyer, &request.game_ids, conn).await?;
    let balance = balances::fetch_balance(buyer, conn).await?.map(|b| b.amount);
    plan_purchase(buyer, request, games, &owned, balance)
}

/// Validate, debit, grant and record. The caller owns the unit of work and decides when to commit.
async fn execute_purchase(
    buyer: UserId,
    request: &PurchaseRequest,
    conn: &mut SqliteConnection,
) -> Result<PurchaseOutcome, PurchaseError> {
    let plan = prepare_plan(buyer, request, conn).await?;
    trace!("🛒️ Purchase plan for {buyer}: {} game(s), total {}", plan.items.len(), plan.total);
    let transaction = if plan.requires_payment() {
        Some(balances::debit(buyer, plan.total, TransactionType::Purchase, conn).await?)
    } else {
        None
    };
    let mut receipts = Vec::with_capacity(plan.items.len());
    for item in &plan.items {
        let record = purchases::insert_purchase(buyer, item.game.id, item.game.price, conn).await?;
        receipts.push(PurchaseReceipt::at_purchase(&record, &item.game, item.quoted_price));
    }
    for item in &plan.items {
        history::insert_history_entry(NewHistoryEntry::purchase(&item.game, buyer), conn).await?;
    }
    Ok(PurchaseOutcome { buyer, receipts, total: plan.total, transaction })
}

impl SqliteDatabase {
    /// Connects to the database named in the configuration.
    pub async fn from_config(config: &EngineConfig) -> Result<Self, sqlx::Error> {
        SqliteDatabase::new_with_url(&config.database_url, config.max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("Database migrations complete for {}", self.url);
        Ok(())
    }

    pub async fn close(&mut self) -> Result<(), sqlx::Error> {
        self.pool.close().await;
        Ok(())
    }

    // The catalog and user directory belong to other services. These helpers let fixtures and tooling populate them.

    pub async fn insert_user(&self, username: &str) -> Result<UserId, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        catalog::insert_user(username, &mut conn).await
    }

    pub async fn fetch_user_by_name(&self, username: &str) -> Result<Option<UserId>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        catalog::fetch_user_by_name(username, &mut conn).await
    }

    pub async fn insert_game(&self, game: NewGame) -> Result<Game, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        catalog::insert_game(game, &mut conn).await
    }

    pub async fn update_game_price(&self, game_id: GameId, price: Money) -> Result<Option<Game>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        catalog::update_game_price(game_id, price, &mut conn).await
    }
}
