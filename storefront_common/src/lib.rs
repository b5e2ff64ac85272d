mod money;

pub mod helpers;
pub mod op;

pub use money::{Money, MoneyConversionError, MONEY_SCALE};
