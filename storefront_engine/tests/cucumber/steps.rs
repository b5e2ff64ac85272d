use cucumber::{then, when};
use storefront_engine::{
    db_types::{Money, TransactionType},
    traits::PurchaseRequest,
};

use crate::cucumber::StoreWorld;

fn money(s: &str) -> Money {
    s.parse::<Money>().expect("Invalid amount in scenario")
}

#[when(expr = "'{word}' deposits {word}")]
async fn deposit(world: &mut StoreWorld, name: String, amount: String) {
    let sys = world.system();
    let result = sys.ledger.deposit(sys.existing_user(&name), money(&amount)).await;
    world.record(result);
}

#[when(expr = "'{word}' withdraws {word}")]
async fn withdraw(world: &mut StoreWorld, name: String, amount: String) {
    let sys = world.system();
    let result = sys.ledger.withdraw(sys.existing_user(&name), money(&amount)).await;
    world.record(result);
}

#[when(expr = "'{word}' buys {string}")]
async fn buy(world: &mut StoreWorld, name: String, title: String) {
    let sys = world.system();
    let result = sys.purchases.purchase_single(sys.existing_user(&name), sys.game_id(&title)).await;
    world.record(result);
}

#[when(expr = "'{word}' buys {string} and {string} together")]
async fn buy_batch(world: &mut StoreWorld, name: String, first: String, second: String) {
    let sys = world.system();
    let request = PurchaseRequest::new(vec![sys.game_id(&first), sys.game_id(&second)]);
    let result = sys.purchases.purchase_batch(sys.existing_user(&name), request).await;
    world.record(result);
}

#[when(expr = "'{word}' adds {string} to the cart")]
async fn add_to_cart(world: &mut StoreWorld, name: String, title: String) {
    let sys = world.system();
    let result = sys.cart.add(sys.existing_user(&name), sys.game_id(&title)).await;
    world.record(result);
}

#[when(expr = "'{word}' checks out")]
async fn checkout(world: &mut StoreWorld, name: String) {
    let sys = world.system();
    let result = sys.cart.checkout(sys.existing_user(&name)).await;
    world.record(result);
}

#[then("the last operation succeeded")]
async fn last_succeeded(world: &mut StoreWorld) {
    assert_eq!(world.system().last_error, None);
}

#[then(expr = "the last operation failed with {string}")]
async fn last_failed(world: &mut StoreWorld, message: String) {
    let err = world.system().last_error.clone().expect("The last operation succeeded");
    assert!(err.contains(&message), "Expected an error containing '{message}', but got '{err}'");
}

#[then(expr = "'{word}' has a balance of {word}")]
async fn balance_is(world: &mut StoreWorld, name: String, amount: String) {
    let sys = world.system();
    let balance = sys.ledger.get(sys.existing_user(&name)).await.expect("Error fetching balance");
    assert_eq!(balance.amount, money(&amount));
}

#[then(expr = "'{word}' owns {int} game(s)")]
async fn owns_n_games(world: &mut StoreWorld, name: String, count: usize) {
    let sys = world.system();
    let library = sys.purchases.purchases(sys.existing_user(&name)).await.expect("Error fetching library");
    assert_eq!(library.len(), count);
}

#[then(expr = "'{word}' owns {string}")]
async fn owns_game(world: &mut StoreWorld, name: String, title: String) {
    let sys = world.system();
    let owned = sys.purchases.owns(sys.existing_user(&name), sys.game_id(&title)).await.expect("Error checking");
    assert!(owned, "{name} does not own {title}");
}

#[then(expr = "the ledger for '{word}' has {int} purchase entry/entries")]
async fn purchase_entries(world: &mut StoreWorld, name: String, count: usize) {
    let sys = world.system();
    let log = sys.ledger.transactions(sys.existing_user(&name)).await.expect("Error fetching transactions");
    assert_eq!(log.iter().filter(|t| t.operation == TransactionType::Purchase).count(), count);
    assert!(log.iter().all(|t| t.is_consistent()));
}

#[then(expr = "the latest ledger entry for '{word}' is a {word} of {word}")]
async fn latest_entry(world: &mut StoreWorld, name: String, operation: String, amount: String) {
    let sys = world.system();
    let log = sys.ledger.transactions(sys.existing_user(&name)).await.expect("Error fetching transactions");
    let last = log.last().expect("The ledger is empty");
    assert_eq!(last.operation, operation.parse::<TransactionType>().expect("Unknown operation"));
    assert_eq!(last.amount, money(&amount));
}

#[then(expr = "the cart of '{word}' has {int} item(s)")]
async fn cart_size(world: &mut StoreWorld, name: String, count: usize) {
    let sys = world.system();
    let cart = sys.cart.view(sys.existing_user(&name)).await.expect("Error fetching cart");
    assert_eq!(cart.count, count);
}
