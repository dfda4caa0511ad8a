//! Expenses and expense categories.
//!
//! An expense is priced either by `total_cost` or by `units` of a
//! unit-priced category, never both.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Model;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExpenseCategory {
    pub id: u64,
    pub name: Option<String>,
    pub unit_name: Option<String>,
    pub unit_price: Option<Decimal>,
    pub deactivated: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model for ExpenseCategory {
    const ROOT: Option<&'static str> = Some("expense_category");
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ExpenseCategoryOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deactivated: Option<bool>,
}

impl ExpenseCategoryOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// A single expense. Either `total_cost` or `units` (priced by the category)
/// carries the amount.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Expense {
    pub id: u64,
    pub user_id: Option<u64>,
    pub project_id: Option<u64>,
    pub expense_category_id: Option<u64>,
    pub spent_at: Option<NaiveDate>,
    pub total_cost: Option<Decimal>,
    pub units: Option<Decimal>,
    pub notes: Option<String>,
    pub billable: Option<bool>,
    pub is_closed: Option<bool>,
    pub is_locked: Option<bool>,
    pub invoice_id: Option<u64>,
    pub has_receipt: Option<bool>,
    pub receipt_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model for Expense {
    const ROOT: Option<&'static str> = Some("expense");
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ExpenseOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spent_at: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expense_category_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billable: Option<bool>,
}

impl ExpenseOptions {
    /// The required fields of a new expense. Set exactly one of `total_cost`
    /// or `units` before creating it.
    pub fn new(spent_at: NaiveDate, project_id: u64, expense_category_id: u64) -> Self {
        Self {
            spent_at: Some(spent_at),
            project_id: Some(project_id),
            expense_category_id: Some(expense_category_id),
            ..Self::default()
        }
    }

    pub fn with_total_cost(mut self, total_cost: Decimal) -> Self {
        self.total_cost = Some(total_cost);
        self
    }

    pub fn with_units(mut self, units: Decimal) -> Self {
        self.units = Some(units);
        self
    }
}
