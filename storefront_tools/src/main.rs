use clap::{Args, Parser, Subcommand};
use storefront_common::Money;
use storefront_engine::db_types::GameId;

mod commands;
mod formatting;

#[derive(Parser, Debug)]
#[command(version, about = "Operate the storefront ledger, purchases and carts")]
pub struct Arguments {
    /// Database URL. Defaults to SF_DATABASE_URL, or sqlite://data/storefront.db
    #[arg(short, long, global = true)]
    database: Option<String>,
    /// The username to act as
    #[arg(short, long, global = true)]
    user: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[clap(name = "migrate", about = "Create the database if needed and bring its schema up to date")]
    Migrate,
    #[clap(name = "seed", about = "Populate the database with demo users, games and balances")]
    Seed,
    #[clap(subcommand, name = "balance", about = "Manage the acting user's balance")]
    Balance(BalanceCommand),
    #[clap(name = "buy", about = "Purchase a single game")]
    Buy {
        game: GameId,
    },
    #[clap(name = "buy-many", about = "Purchase several games in one atomic batch")]
    BuyMany(BuyManyParams),
    #[clap(name = "library", about = "List the games the acting user owns")]
    Library,
    #[clap(subcommand, name = "cart", about = "Manage the acting user's cart")]
    Cart(CartCommand),
}

#[derive(Debug, Subcommand)]
pub enum BalanceCommand {
    Create,
    Get,
    Deposit { amount: Money },
    Withdraw { amount: Money },
    #[clap(name = "admin-deposit", about = "Credit the balance without the per-transaction limit")]
    AdminDeposit { amount: Money },
    Delete,
    #[clap(name = "history", about = "Show the balance's transaction log")]
    History,
}

#[derive(Debug, Args)]
pub struct BuyManyParams {
    /// The games to purchase
    #[arg(required = true)]
    games: Vec<GameId>,
    /// The prices the buyer was shown, one per game. Reported on the receipts, never enforced.
    #[arg(short, long = "quote", num_args = 1..)]
    quotes: Option<Vec<Money>>,
}

#[derive(Debug, Subcommand)]
pub enum CartCommand {
    Add { game: GameId },
    Remove { game: GameId },
    View,
    Clear,
    Checkout,
    #[clap(name = "validate", about = "Check whether the cart could be checked out right now")]
    Validate,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();
    let cli = Arguments::parse();
    if let Err(e) = commands::run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
