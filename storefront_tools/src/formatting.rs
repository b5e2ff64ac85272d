use prettytable::{
    format::{LinePosition, LineSeparator, TableFormat},
    row,
    Table,
};
use storefront_engine::{
    db_types::{Balance, BalanceTransaction},
    traits::{CartSummary, PurchaseReceipt},
};

fn markdown_format() -> TableFormat {
    prettytable::format::FormatBuilder::new()
        .column_separator('|')
        .borders('|')
        .separator(LinePosition::Title, LineSeparator::new('-', '|', '|', '|'))
        .padding(1, 1)
        .build()
}

fn timestamp(t: &chrono::DateTime<chrono::Utc>) -> String {
    t.format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn format_balance(balance: &Balance) -> String {
    format!("Balance for {}: {} (last updated {})", balance.user_id, balance.amount, timestamp(&balance.updated_at))
}

pub fn format_transaction(tx: &BalanceTransaction) -> String {
    format!("Transaction #{}: {} of {}. Balance is now {}", tx.id, tx.operation, tx.amount, tx.balance_after)
}

pub fn format_transactions(txs: &[BalanceTransaction]) -> String {
    if txs.is_empty() {
        return "No transactions".to_string();
    }
    let mut table = Table::new();
    table.set_format(markdown_format());
    table.set_titles(row!["ID", "Operation", "Amount", "Before", "After", "Created At"]);
    for tx in txs {
        table.add_row(row![
            tx.id,
            tx.operation.to_string(),
            r->tx.amount.to_string(),
            r->tx.balance_before.to_string(),
            r->tx.balance_after.to_string(),
            timestamp(&tx.created_at)
        ]);
    }
    table.to_string()
}

pub fn format_receipts(receipts: &[PurchaseReceipt]) -> String {
    if receipts.is_empty() {
        return "No games".to_string();
    }
    let mut table = Table::new();
    table.set_format(markdown_format());
    table.set_titles(row!["Purchase", "Game", "Title", "Paid", "Current", "Difference", "Purchased At"]);
    for receipt in receipts {
        table.add_row(row![
            receipt.purchase_id,
            receipt.game_id.to_string(),
            receipt.title,
            r->receipt.price_paid.to_string(),
            r->receipt.current_price.to_string(),
            r->receipt.price_difference.to_string(),
            timestamp(&receipt.purchased_at)
        ]);
    }
    table.to_string()
}

pub fn format_cart(cart: &CartSummary) -> String {
    if cart.is_empty() {
        return "The cart is empty".to_string();
    }
    let mut table = Table::new();
    table.set_format(markdown_format());
    table.set_titles(row!["Game", "Title", "Price", "Added At"]);
    for item in &cart.items {
        table.add_row(row![item.game_id.to_string(), item.title, r->item.price.to_string(), timestamp(&item.added_at)]);
    }
    format!("{table}\n{} item(s). Total: {}", cart.count, cart.total)
}
