use std::path::Path;

use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};

use crate::{
    db_types::{Game, Money, NewGame, TransactionType, UserId},
    traits::LedgerManagement,
    SqliteDatabase,
};

pub async fn prepare_test_env(url: &str) {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
    create_database(url).await;
    run_migrations(url).await;
}

/// A fresh database URL in the system temp directory, so parallel tests never share state.
pub fn random_db_path() -> String {
    let file = std::env::temp_dir().join(format!("storefront_test_{}.db", rand::random::<u64>()));
    format!("sqlite://{}", file.display())
}

pub async fn run_migrations(url: &str) {
    let db = SqliteDatabase::new_with_url(url, 1).await.expect("Error creating connection to database");
    db.run_migrations().await.expect("Error running DB migrations");
    info!("🚀️ Migrations complete");
}

pub async fn create_database<P: AsRef<Path>>(path: P) {
    let p = path.as_ref().as_os_str().to_str().expect("Database path is not valid UTF-8");
    if let Err(e) = Sqlite::drop_database(p).await {
        trace!("Could not drop database {p}: {e:?}");
    }
    Sqlite::create_database(p).await.expect("Error creating database");
    info!("Created Sqlite database {p}");
}

/// Creates, migrates and connects to a brand-new database.
pub async fn new_test_database(max_connections: u32) -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    SqliteDatabase::new_with_url(&url, max_connections).await.expect("Error connecting to test database")
}

pub async fn create_user(db: &SqliteDatabase, username: &str) -> UserId {
    db.insert_user(username).await.expect("Error inserting user")
}

/// Inserts a catalog entry. `price` is a plain decimal string such as `"29.99"`.
pub async fn create_game(db: &SqliteDatabase, title: &str, price: &str, author: UserId) -> Game {
    let price = price.parse::<Money>().expect("Invalid price in test fixture");
    db.insert_game(NewGame::new(title, price, author)).await.expect("Error inserting game")
}

/// The standard cast used across the engine's tests.
#[derive(Debug, Clone)]
pub struct StoreFixture {
    pub db: SqliteDatabase,
    /// Authors every game in the catalog below.
    pub author: UserId,
    /// Owns a balance.
    pub buyer: UserId,
    /// Exists, but has no balance.
    pub stranger: UserId,
    /// 29.99
    pub space_llamas: Game,
    /// 39.99
    pub dungeon_bakery: Game,
    /// 9.50
    pub pixel_pond: Game,
    /// Free
    pub free_frog: Game,
}

impl StoreFixture {
    pub async fn new() -> Self {
        Self::with_connections(5).await
    }

    pub async fn with_connections(max_connections: u32) -> Self {
        let db = new_test_database(max_connections).await;
        let author = create_user(&db, "author").await;
        let buyer = create_user(&db, "buyer").await;
        let stranger = create_user(&db, "stranger").await;
        let space_llamas = create_game(&db, "Space Llamas", "29.99", author).await;
        let dungeon_bakery = create_game(&db, "Dungeon Bakery", "39.99", author).await;
        let pixel_pond = create_game(&db, "Pixel Pond", "9.50", author).await;
        let free_frog = create_game(&db, "Free Frog", "0.00", author).await;
        db.create_balance(buyer).await.expect("Error creating buyer balance");
        Self { db, author, buyer, stranger, space_llamas, dungeon_bakery, pixel_pond, free_frog }
    }

    /// Credits the buyer directly through the backend.
    pub async fn fund_buyer(&self, amount: &str) {
        let amount = amount.parse::<Money>().expect("Invalid amount in test fixture");
        self.db.credit(self.buyer, amount, TransactionType::Deposit).await.expect("Error funding buyer");
    }
}

impl StoreFixture {
    pub async fn tear_down(mut self) {
        let url = self.db.url().to_string();
        if let Err(e) = self.db.close().await {
            error!("🚀️ Failed to close database: {e}");
        }
        if let Err(e) = Sqlite::drop_database(&url).await {
            warn!("🚀️ Failed to remove test database {url}: {e}");
        }
    }
}
