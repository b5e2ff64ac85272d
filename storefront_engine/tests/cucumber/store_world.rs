use std::collections::HashMap;

use cucumber::World;
use log::*;
use storefront_engine::{
    db_types::{Game, GameId, Money, NewGame, UserId},
    events::EventProducers,
    test_utils::prepare_env::{create_database, random_db_path, run_migrations},
    CartApi,
    LedgerApi,
    PurchaseApi,
    SqliteDatabase,
};

#[derive(Default, Debug, World)]
pub struct StoreWorld {
    pub system: Option<StoreSystem>,
}

#[derive(Debug)]
pub struct StoreSystem {
    pub db_path: String,
    pub db: SqliteDatabase,
    pub ledger: LedgerApi<SqliteDatabase>,
    pub purchases: PurchaseApi<SqliteDatabase>,
    pub cart: CartApi<SqliteDatabase>,
    pub users: HashMap<String, UserId>,
    pub games: HashMap<String, Game>,
    /// The display text of the error from the most recent `When` step, if it failed.
    pub last_error: Option<String>,
}

impl StoreWorld {
    pub fn system(&self) -> &StoreSystem {
        self.system.as_ref().expect("Store not initialised")
    }

    pub fn system_mut(&mut self) -> &mut StoreSystem {
        self.system.as_mut().expect("Store not initialised")
    }

    pub fn record<T, E: std::fmt::Display>(&mut self, result: Result<T, E>) {
        let sys = self.system_mut();
        sys.last_error = result.err().map(|e| {
            debug!("🚀️ Step failed: {e}");
            e.to_string()
        });
    }
}

impl StoreSystem {
    pub async fn new() -> Self {
        let db_path = prepare_test_env().await;
        let db = SqliteDatabase::new_with_url(&db_path, 5).await.expect("Error creating connection to database");
        debug!("Created database: {db_path}");
        let producers = EventProducers::default();
        let ledger = LedgerApi::new(db.clone(), producers.clone());
        let purchases = PurchaseApi::new(db.clone(), producers.clone());
        let cart = CartApi::new(db.clone(), producers);
        Self {
            db_path,
            db,
            ledger,
            purchases,
            cart,
            users: HashMap::new(),
            games: HashMap::new(),
            last_error: None,
        }
    }

    pub async fn user(&mut self, name: &str) -> UserId {
        if let Some(id) = self.users.get(name) {
            return *id;
        }
        let id = self.db.insert_user(name).await.expect("Error creating user");
        self.users.insert(name.to_string(), id);
        id
    }

    pub fn existing_user(&self, name: &str) -> UserId {
        *self.users.get(name).unwrap_or_else(|| panic!("Unknown user '{name}'"))
    }

    pub async fn add_game(&mut self, title: &str, price: Money, author: &str) -> Game {
        let author = self.user(author).await;
        let game = self.db.insert_game(NewGame::new(title, price, author)).await.expect("Error creating game");
        self.games.insert(title.to_string(), game.clone());
        game
    }

    pub fn game_id(&self, title: &str) -> GameId {
        self.games.get(title).map(|g| g.id).unwrap_or_else(|| panic!("Unknown game '{title}'"))
    }
}

pub async fn prepare_test_env() -> String {
    let path = random_db_path();
    create_database(&path).await;
    run_migrations(&path).await;
    path
}
