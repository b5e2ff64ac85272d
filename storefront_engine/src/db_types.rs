//! Data types that are stored in, or read from, the storefront database.
//!
//! Relations between records are expressed as plain identifiers ([`UserId`], [`GameId`], balance ids). Nothing in here
//! lazily loads a related record; every related read is an explicit query in the backend.
use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
pub use storefront_common::Money;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Conversion error: {0}")]
pub struct ConversionError(String);

//--------------------------------------        UserId        ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct UserId(pub i64);

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "user #{}", self.0)
    }
}

//--------------------------------------        GameId        ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct GameId(pub i64);

impl From<i64> for GameId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl FromStr for GameId {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Self).map_err(|e| ConversionError(format!("Invalid game id '{s}'. {e}")))
    }
}

impl Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Formats a list of game ids as `#1, #2, #3` for error messages and logs.
pub fn display_ids(ids: &[GameId]) -> String {
    ids.iter().map(GameId::to_string).collect::<Vec<_>>().join(", ")
}

//--------------------------------------         Game         ---------------------------------------------------------
/// The slice of a catalog item that the commerce core needs. The catalog itself is managed elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub title: String,
    pub price: Money,
    pub author_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Game {
    pub fn is_authored_by(&self, user_id: UserId) -> bool {
        self.author_id == user_id
    }
}

#[derive(Debug, Clone)]
pub struct NewGame {
    pub title: String,
    pub price: Money,
    pub author_id: UserId,
}

impl NewGame {
    pub fn new<S: Into<String>>(title: S, price: Money, author_id: UserId) -> Self {
        Self { title: title.into(), price, author_id }
    }
}

//--------------------------------------        Balance       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Balance {
    pub id: i64,
    pub user_id: UserId,
    pub amount: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------    TransactionType   ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Funds added by the balance owner.
    Deposit,
    /// Funds taken out by the balance owner.
    Withdrawal,
    /// Funds spent on one or more games.
    Purchase,
    /// Funds credited by an administrator.
    AdminDeposit,
}

impl TransactionType {
    /// True for operations that increase the balance.
    pub fn is_credit(&self) -> bool {
        matches!(self, Self::Deposit | Self::AdminDeposit)
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deposit => write!(f, "deposit"),
            Self::Withdrawal => write!(f, "withdrawal"),
            Self::Purchase => write!(f, "purchase"),
            Self::AdminDeposit => write!(f, "admin_deposit"),
        }
    }
}

impl FromStr for TransactionType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deposit" => Ok(Self::Deposit),
            "withdrawal" => Ok(Self::Withdrawal),
            "purchase" => Ok(Self::Purchase),
            "admin_deposit" => Ok(Self::AdminDeposit),
            s => Err(ConversionError(format!("Invalid transaction type: {s}"))),
        }
    }
}

//--------------------------------------  BalanceTransaction  ---------------------------------------------------------
/// An immutable ledger entry. Every balance mutation writes exactly one of these in the same unit of work.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct BalanceTransaction {
    pub id: i64,
    pub balance_id: i64,
    pub operation: TransactionType,
    pub amount: Money,
    pub balance_before: Money,
    pub balance_after: Money,
    pub created_at: DateTime<Utc>,
}

impl BalanceTransaction {
    /// Checks that `balance_after` follows from `balance_before`, `amount` and the direction of the operation.
    pub fn is_consistent(&self) -> bool {
        let expected = if self.operation.is_credit() {
            self.balance_before + self.amount
        } else {
            self.balance_before - self.amount
        };
        self.amount.is_positive() && !self.balance_after.is_negative() && expected == self.balance_after
    }
}

//--------------------------------------       CartItem       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct CartItem {
    pub id: i64,
    pub user_id: UserId,
    pub game_id: GameId,
    pub added_at: DateTime<Utc>,
}

//--------------------------------------    PurchaseRecord    ---------------------------------------------------------
/// The authoritative "user owns game" relation.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct PurchaseRecord {
    pub id: i64,
    pub user_id: UserId,
    pub game_id: GameId,
    pub price_paid: Money,
    pub purchased_at: DateTime<Utc>,
}

//--------------------------------------     HistoryAction    ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    Create,
    Update,
    Delete,
    Purchase,
}

impl Display for HistoryAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
            Self::Purchase => write!(f, "purchase"),
        }
    }
}

//--------------------------------------     HistoryEntry     ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub game_id: GameId,
    pub actor_id: UserId,
    pub action: HistoryAction,
    pub field_name: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewHistoryEntry {
    pub game_id: GameId,
    pub actor_id: UserId,
    pub action: HistoryAction,
    pub field_name: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub description: String,
}

impl NewHistoryEntry {
    pub fn new<S: Into<String>>(game_id: GameId, actor_id: UserId, action: HistoryAction, description: S) -> Self {
        Self {
            game_id,
            actor_id,
            action,
            field_name: None,
            old_value: None,
            new_value: None,
            description: description.into(),
        }
    }

    pub fn purchase(game: &Game, buyer: UserId) -> Self {
        Self::new(game.id, buyer, HistoryAction::Purchase, format!("Purchased '{}' for {}", game.title, game.price))
    }
}
