use cucumber::given;
use storefront_engine::db_types::Money;

use crate::cucumber::{store_world::StoreSystem, StoreWorld};

#[given("a fresh store")]
async fn fresh_store(world: &mut StoreWorld) {
    let system = StoreSystem::new().await;
    world.system = Some(system);
}

#[given(expr = "a game {string} priced at {word} by '{word}'")]
async fn a_game(world: &mut StoreWorld, title: String, price: String, author: String) {
    let price = price.parse::<Money>().expect("Invalid price");
    world.system_mut().add_game(&title, price, &author).await;
}

#[given(expr = "user '{word}' with a balance of {word}")]
async fn a_funded_user(world: &mut StoreWorld, name: String, amount: String) {
    let amount = amount.parse::<Money>().expect("Invalid amount");
    let sys = world.system_mut();
    let user = sys.user(&name).await;
    sys.ledger.create(user).await.expect("Error creating balance");
    if amount.is_positive() {
        sys.ledger.admin_deposit(user, amount).await.expect("Error funding balance");
    }
}
