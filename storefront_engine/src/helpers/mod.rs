mod purchase_rules;

pub use purchase_rules::{plan_purchase, validate_request, PlannedItem, PurchasePlan};
