use anyhow::{anyhow, bail, Result};
use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};
use storefront_common::Money;
use storefront_engine::{
    db_types::{NewGame, UserId},
    events::EventProducers,
    traits::PurchaseRequest,
    CartApi,
    EngineConfig,
    LedgerApi,
    PurchaseApi,
    SqliteDatabase,
};

use crate::{
    formatting::{format_balance, format_cart, format_receipts, format_transaction, format_transactions},
    Arguments,
    BalanceCommand,
    BuyManyParams,
    CartCommand,
    Command,
};

/// The APIs the command line drives, all sharing one connection pool.
struct Store {
    db: SqliteDatabase,
    ledger: LedgerApi<SqliteDatabase>,
    purchases: PurchaseApi<SqliteDatabase>,
    cart: CartApi<SqliteDatabase>,
}

impl Store {
    async fn connect(config: &EngineConfig) -> Result<Self> {
        let db = SqliteDatabase::from_config(config).await?;
        let producers = EventProducers::default();
        let ledger =
            LedgerApi::new(db.clone(), producers.clone()).with_max_transaction_amount(config.max_transaction_amount);
        let purchases = PurchaseApi::new(db.clone(), producers.clone());
        let cart = CartApi::new(db.clone(), producers);
        Ok(Self { db, ledger, purchases, cart })
    }

    async fn user(&self, name: Option<&str>) -> Result<UserId> {
        let name = name.ok_or_else(|| anyhow!("This command needs a user. Pass one with --user <name>"))?;
        self.db.fetch_user_by_name(name).await?.ok_or_else(|| anyhow!("There is no user called '{name}'"))
    }
}

pub async fn run(cli: Arguments) -> Result<()> {
    let mut config = EngineConfig::from_env_or_default();
    if let Some(url) = cli.database {
        config.database_url = url;
    }
    if matches!(cli.command, Command::Migrate) {
        create_database_if_missing(&config.database_url).await?;
    }
    let store = Store::connect(&config).await?;
    let user = cli.user.as_deref();
    match cli.command {
        Command::Migrate => {
            store.db.run_migrations().await?;
            println!("Database at {} is up to date", store.db.url());
            Ok(())
        },
        Command::Seed => seed(&store).await,
        Command::Balance(cmd) => balance(&store, store.user(user).await?, cmd).await,
        Command::Buy { game } => {
            let receipt = store.purchases.purchase_single(store.user(user).await?, game).await?;
            println!("{}", format_receipts(&[receipt]));
            Ok(())
        },
        Command::BuyMany(params) => buy_many(&store, store.user(user).await?, params).await,
        Command::Library => library(&store, store.user(user).await?).await,
        Command::Cart(cmd) => cart(&store, store.user(user).await?, cmd).await,
    }
}

async fn create_database_if_missing(url: &str) -> Result<()> {
    if !Sqlite::database_exists(url).await? {
        Sqlite::create_database(url).await?;
        info!("Created database {url}");
    }
    Ok(())
}

async fn seed(store: &Store) -> Result<()> {
    if store.db.fetch_user_by_name("studio").await?.is_some() {
        bail!("The database has already been seeded");
    }
    let studio = store.db.insert_user("studio").await?;
    let alice = store.db.insert_user("alice").await?;
    let bob = store.db.insert_user("bob").await?;
    let catalog = [("Space Llamas", "29.99"), ("Dungeon Bakery", "39.99"), ("Pixel Pond", "9.50"), ("Free Frog", "0")];
    for (title, price) in catalog {
        let game = store.db.insert_game(NewGame::new(title, price.parse::<Money>()?, studio)).await?;
        println!("Added game {} '{}' at {}", game.id, game.title, game.price);
    }
    for (user, amount) in [(alice, "100.00"), (bob, "10.00"), (studio, "0")] {
        store.ledger.create(user).await?;
        let amount = amount.parse::<Money>()?;
        if amount.is_positive() {
            store.ledger.admin_deposit(user, amount).await?;
        }
    }
    println!("Seeded users studio, alice and bob");
    Ok(())
}

async fn balance(store: &Store, user: UserId, cmd: BalanceCommand) -> Result<()> {
    match cmd {
        BalanceCommand::Create => println!("{}", format_balance(&store.ledger.create(user).await?)),
        BalanceCommand::Get => println!("{}", format_balance(&store.ledger.get(user).await?)),
        BalanceCommand::Deposit { amount } => {
            println!("{}", format_transaction(&store.ledger.deposit(user, amount).await?))
        },
        BalanceCommand::Withdraw { amount } => {
            println!("{}", format_transaction(&store.ledger.withdraw(user, amount).await?))
        },
        BalanceCommand::AdminDeposit { amount } => {
            println!("{}", format_transaction(&store.ledger.admin_deposit(user, amount).await?))
        },
        BalanceCommand::Delete => {
            store.ledger.delete(user).await?;
            println!("Balance for {user} deleted");
        },
        BalanceCommand::History => println!("{}", format_transactions(&store.ledger.transactions(user).await?)),
    }
    Ok(())
}

async fn buy_many(store: &Store, user: UserId, params: BuyManyParams) -> Result<()> {
    let mut request = PurchaseRequest::new(params.games);
    if let Some(quotes) = params.quotes {
        request = request.with_quoted_prices(quotes);
    }
    let outcome = store.purchases.purchase_batch(user, request).await?;
    println!("{}", format_receipts(&outcome.receipts));
    println!("Total charged: {}", outcome.total);
    Ok(())
}

async fn library(store: &Store, user: UserId) -> Result<()> {
    let records = store.purchases.purchases(user).await?;
    let mut receipts = Vec::with_capacity(records.len());
    for record in records {
        receipts.push(store.purchases.purchase_details(user, record.game_id).await?);
    }
    println!("{}", format_receipts(&receipts));
    Ok(())
}

async fn cart(store: &Store, user: UserId, cmd: CartCommand) -> Result<()> {
    match cmd {
        CartCommand::Add { game } => println!("{} item(s) in cart", store.cart.add(user, game).await?),
        CartCommand::Remove { game } => println!("{} item(s) in cart", store.cart.remove(user, game).await?),
        CartCommand::View => println!("{}", format_cart(&store.cart.view(user).await?)),
        CartCommand::Clear => println!("Removed {} item(s)", store.cart.clear(user).await?),
        CartCommand::Checkout => {
            let receipt = store.cart.checkout(user).await?;
            println!("{}", format_receipts(&receipt.receipts));
            println!("{} item(s) processed. Total charged: {}", receipt.items_processed, receipt.total_charged);
        },
        CartCommand::Validate => {
            if store.cart.validate_for_checkout(user).await? {
                println!("The cart is ready for checkout");
            } else {
                println!("The cart cannot be checked out right now");
            }
        },
    }
    Ok(())
}
