use storefront_engine::{
    db_types::{Money, TransactionType},
    events::EventProducers,
    parse_amount,
    test_utils::prepare_env::StoreFixture,
    LedgerApi,
    LedgerError,
    SqliteDatabase,
};

fn money(s: &str) -> Money {
    s.parse().expect("bad test amount")
}

fn ledger(fixture: &StoreFixture) -> LedgerApi<SqliteDatabase> {
    LedgerApi::new(fixture.db.clone(), EventProducers::default()).with_max_transaction_amount(money("500.00"))
}

#[tokio::test]
async fn create_and_fetch_balance() {
    let fixture = StoreFixture::new().await;
    let api = ledger(&fixture);
    let balance = api.create(fixture.stranger).await.unwrap();
    assert_eq!(balance.user_id, fixture.stranger);
    assert_eq!(balance.amount, Money::ZERO);

    let err = api.create(fixture.stranger).await.unwrap_err();
    assert_eq!(err, LedgerError::AlreadyExists(fixture.stranger));

    let fetched = api.get(fixture.stranger).await.unwrap();
    assert_eq!(fetched, balance);
    // Repeated reads without a mutation in between are identical
    assert_eq!(api.get(fixture.stranger).await.unwrap(), fetched);
    fixture.tear_down().await;
}

#[tokio::test]
async fn balances_need_an_existing_user() {
    let fixture = StoreFixture::new().await;
    let api = ledger(&fixture);
    let ghost = storefront_engine::db_types::UserId(9999);
    assert_eq!(api.create(ghost).await.unwrap_err(), LedgerError::UserNotFound(ghost));
    assert_eq!(api.get(ghost).await.unwrap_err(), LedgerError::BalanceNotFound(ghost));
    fixture.tear_down().await;
}

#[tokio::test]
async fn deposit_and_withdraw() {
    let fixture = StoreFixture::new().await;
    let api = ledger(&fixture);
    let buyer = fixture.buyer;

    let tx = api.deposit(buyer, money("100.00")).await.unwrap();
    assert_eq!(tx.operation, TransactionType::Deposit);
    assert_eq!(tx.balance_before, Money::ZERO);
    assert_eq!(tx.balance_after, money("100.00"));

    let tx = api.withdraw(buyer, money("25.50")).await.unwrap();
    assert_eq!(tx.operation, TransactionType::Withdrawal);
    assert_eq!(tx.balance_before, money("100.00"));
    assert_eq!(tx.balance_after, money("74.50"));
    assert_eq!(api.get(buyer).await.unwrap().amount, money("74.50"));

    let log = api.transactions(buyer).await.unwrap();
    assert_eq!(log.len(), 2);
    assert!(log.iter().all(|t| t.is_consistent()));
    assert_eq!(log.last().unwrap().balance_after, api.get(buyer).await.unwrap().amount);
    fixture.tear_down().await;
}

#[tokio::test]
async fn invalid_amounts_are_rejected() {
    let fixture = StoreFixture::new().await;
    let api = ledger(&fixture);
    let buyer = fixture.buyer;
    api.deposit(buyer, money("100.00")).await.unwrap();

    assert!(matches!(api.withdraw(buyer, Money::ZERO).await, Err(LedgerError::InvalidAmount(_))));
    assert!(matches!(api.withdraw(buyer, money("-5.00")).await, Err(LedgerError::InvalidAmount(_))));
    assert!(matches!(api.deposit(buyer, Money::ZERO).await, Err(LedgerError::InvalidAmount(_))));
    assert!(matches!(api.deposit(buyer, money("500.01")).await, Err(LedgerError::InvalidAmount(_))));
    assert!(matches!(api.can_afford(buyer, Money::ZERO).await, Err(LedgerError::InvalidAmount(_))));
    assert!(matches!(parse_amount("1.234"), Err(LedgerError::InvalidAmount(_))));

    // Nothing was recorded for the rejected calls
    assert_eq!(api.transactions(buyer).await.unwrap().len(), 1);
    assert_eq!(api.get(buyer).await.unwrap().amount, money("100.00"));
    fixture.tear_down().await;
}

#[tokio::test]
async fn overdrafts_are_refused() {
    let fixture = StoreFixture::new().await;
    let api = ledger(&fixture);
    let buyer = fixture.buyer;
    api.deposit(buyer, money("100.00")).await.unwrap();

    let err = api.withdraw(buyer, money("150.00")).await.unwrap_err();
    assert_eq!(err, LedgerError::InsufficientFunds { available: money("100.00"), required: money("150.00") });
    let err = api.debit_for_purchase(buyer, money("100.01")).await.unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientFunds { .. }));

    assert!(api.can_afford(buyer, money("100.00")).await.unwrap());
    assert!(!api.can_afford(buyer, money("100.01")).await.unwrap());

    let tx = api.withdraw(buyer, money("100.00")).await.unwrap();
    assert_eq!(tx.balance_after, Money::ZERO);
    assert_eq!(api.transactions(buyer).await.unwrap().len(), 2);
    fixture.tear_down().await;
}

#[tokio::test]
async fn purchase_debits_are_tagged() {
    let fixture = StoreFixture::new().await;
    let api = ledger(&fixture);
    api.deposit(fixture.buyer, money("50.00")).await.unwrap();
    let tx = api.debit_for_purchase(fixture.buyer, money("29.99")).await.unwrap();
    assert_eq!(tx.operation, TransactionType::Purchase);
    assert_eq!(tx.balance_after, money("20.01"));
    fixture.tear_down().await;
}

#[tokio::test]
async fn admin_deposits_ignore_the_limit() {
    let fixture = StoreFixture::new().await;
    let api = ledger(&fixture);
    let tx = api.admin_deposit(fixture.buyer, money("2500.00")).await.unwrap();
    assert_eq!(tx.operation, TransactionType::AdminDeposit);
    assert_eq!(tx.balance_after, money("2500.00"));
    assert!(matches!(api.admin_deposit(fixture.buyer, Money::ZERO).await, Err(LedgerError::InvalidAmount(_))));
    fixture.tear_down().await;
}

#[tokio::test]
async fn credits_that_overflow_the_balance_are_refused() {
    let fixture = StoreFixture::new().await;
    let api = ledger(&fixture);
    let buyer = fixture.buyer;
    let ceiling = Money::from_cents(i64::MAX);
    api.admin_deposit(buyer, ceiling).await.unwrap();
    assert!(matches!(api.admin_deposit(buyer, Money::from_cents(1)).await, Err(LedgerError::InvalidAmount(_))));
    assert!(matches!(api.admin_deposit(buyer, ceiling).await, Err(LedgerError::InvalidAmount(_))));
    assert_eq!(api.get(buyer).await.unwrap().amount, ceiling);
    assert_eq!(api.transactions(buyer).await.unwrap().len(), 1);
    fixture.tear_down().await;
}

#[tokio::test]
async fn unknown_balances() {
    let fixture = StoreFixture::new().await;
    let api = ledger(&fixture);
    let stranger = fixture.stranger;
    assert_eq!(api.deposit(stranger, money("1.00")).await.unwrap_err(), LedgerError::BalanceNotFound(stranger));
    assert_eq!(api.withdraw(stranger, money("1.00")).await.unwrap_err(), LedgerError::BalanceNotFound(stranger));
    assert_eq!(api.can_afford(stranger, money("1.00")).await.unwrap_err(), LedgerError::BalanceNotFound(stranger));
    assert_eq!(api.delete(stranger).await.unwrap_err(), LedgerError::BalanceNotFound(stranger));
    assert_eq!(api.transactions(stranger).await.unwrap_err(), LedgerError::BalanceNotFound(stranger));
    fixture.tear_down().await;
}

#[tokio::test]
async fn delete_removes_the_log() {
    let fixture = StoreFixture::new().await;
    let api = ledger(&fixture);
    let buyer = fixture.buyer;
    api.deposit(buyer, money("10.00")).await.unwrap();
    api.withdraw(buyer, money("4.00")).await.unwrap();
    let old_balance_id = api.get(buyer).await.unwrap().id;
    api.delete(buyer).await.unwrap();
    assert_eq!(api.get(buyer).await.unwrap_err(), LedgerError::BalanceNotFound(buyer));

    let mut conn = fixture.db.pool().acquire().await.unwrap();
    let orphans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM balance_transactions WHERE balance_id = $1")
        .bind(old_balance_id)
        .fetch_one(&mut *conn)
        .await
        .unwrap();
    assert_eq!(orphans, 0);
    let remaining: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM balance_transactions").fetch_one(&mut *conn).await.unwrap();
    assert_eq!(remaining, 0);
    drop(conn);

    let balance = api.create(buyer).await.unwrap();
    assert_eq!(balance.amount, Money::ZERO);
    assert!(api.transactions(buyer).await.unwrap().is_empty());
    fixture.tear_down().await;
}

#[tokio::test]
async fn random_sequences_never_go_negative() {
    let fixture = StoreFixture::new().await;
    let api = ledger(&fixture);
    let buyer = fixture.buyer;
    let mut expected = Money::ZERO;
    for _ in 0..60 {
        let amount = Money::from_cents(rand::random::<i64>().rem_euclid(5_000) + 1);
        if rand::random::<bool>() {
            api.deposit(buyer, amount).await.unwrap();
            expected = expected + amount;
        } else {
            match api.withdraw(buyer, amount).await {
                Ok(_) => expected = expected - amount,
                Err(LedgerError::InsufficientFunds { available, .. }) => {
                    assert!(amount > available);
                    assert_eq!(available, expected);
                },
                Err(e) => panic!("Unexpected error: {e}"),
            }
        }
        assert!(!expected.is_negative());
    }
    let balance = api.get(buyer).await.unwrap();
    assert_eq!(balance.amount, expected);
    let log = api.transactions(buyer).await.unwrap();
    assert!(log.iter().all(|t| t.is_consistent()));
    match log.last() {
        Some(last) => assert_eq!(last.balance_after, balance.amount),
        None => assert_eq!(balance.amount, Money::ZERO),
    }
    fixture.tear_down().await;
}
