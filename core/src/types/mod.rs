//! Harvest records and the option (patch) payloads sent to create or update
//! them.
//!
//! # Design
//! Records are flat serde structs. Everything except the numeric `id` is an
//! `Option` with a serde default, so partially populated responses still
//! decode. Amounts and rates are `rust_decimal::Decimal` carried as JSON
//! numbers; calendar dates are `chrono::NaiveDate` and audit timestamps
//! `chrono::DateTime<Utc>`.
//!
//! Option structs skip unset fields when serialized, which is what makes an
//! update touch only the fields the caller supplied.

use serde::de::DeserializeOwned;

mod account;
mod client;
mod expense;
mod invoice;
mod project;
mod time;
mod user;

pub use account::{Account, AccountUser, Company};
pub use client::{Client, ClientOptions, Contact, ContactOptions};
pub use expense::{Expense, ExpenseCategory, ExpenseCategoryOptions, ExpenseOptions};
pub use invoice::{
    Invoice, InvoiceItem, InvoiceItemCategory, InvoiceItemCategoryOptions, InvoiceKind,
    InvoiceMessage, InvoiceMessageAction, InvoiceMessageOptions, InvoiceOptions, InvoiceState,
    Payment, PaymentOptions,
};
pub use project::{
    BillingMethod, BudgetMethod, EstimateMethod, Project, ProjectOptions, Task, TaskAssignment,
    TaskAssignmentOptions, TaskOptions, UserAssignment, UserAssignmentOptions,
};
pub use time::{Daily, DailyOptions, DailyProject, DailyTask, DayEntry, Timer};
pub use user::{User, UserOptions};

/// A record the client can decode from a response body.
pub trait Model: DeserializeOwned {
    /// The element wrapping a single record on the wire (`{"client": {...}}`),
    /// or `None` for records sent bare.
    const ROOT: Option<&'static str>;
}
