//! Invoices, their messages and payments.
//!
//! # Design
//! `InvoiceState` is the lifecycle reported by the service. The client
//! never moves it locally; transitions are requested through
//! [`InvoiceMessageAction`] and the server accepts or refuses them.
//!
//! Line items travel as a CSV document in `csv_line_items`, so
//! [`InvoiceOptions::with_line_items`] renders them once when the options are
//! built.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Model;

/// Lifecycle state of an invoice.
///
/// The service owns the transitions: draft → open (mark sent), open → draft
/// (mark draft), open → closed (mark closed), closed → open (reopen).
/// Payments move an open invoice to partial or paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceState {
    Draft,
    Open,
    Partial,
    Paid,
    Closed,
}

impl InvoiceState {
    pub fn as_str(self) -> &'static str {
        match self {
            InvoiceState::Draft => "draft",
            InvoiceState::Open => "open",
            InvoiceState::Partial => "partial",
            InvoiceState::Paid => "paid",
            InvoiceState::Closed => "closed",
        }
    }
}

impl fmt::Display for InvoiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a new invoice is populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceKind {
    /// Line items supplied by the caller.
    FreeForm,
    /// One line per project.
    Project,
    /// One line per task.
    Task,
    /// One line per person.
    People,
    /// One line per time entry.
    Detailed,
}

/// State change requested through `invoices/{id}/messages/{action}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceMessageAction {
    MarkAsSent,
    MarkAsClosed,
    MarkAsDraft,
    ReOpen,
}

impl InvoiceMessageAction {
    /// The path segment naming this action.
    pub fn as_str(self) -> &'static str {
        match self {
            InvoiceMessageAction::MarkAsSent => "mark_as_sent",
            InvoiceMessageAction::MarkAsClosed => "mark_as_closed",
            InvoiceMessageAction::MarkAsDraft => "mark_as_draft",
            InvoiceMessageAction::ReOpen => "re_open",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "mark_as_sent" => Some(InvoiceMessageAction::MarkAsSent),
            "mark_as_closed" => Some(InvoiceMessageAction::MarkAsClosed),
            "mark_as_draft" => Some(InvoiceMessageAction::MarkAsDraft),
            "re_open" => Some(InvoiceMessageAction::ReOpen),
            _ => None,
        }
    }
}

impl fmt::Display for InvoiceMessageAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Invoice {
    pub id: u64,
    pub client_id: Option<u64>,
    pub number: Option<String>,
    pub kind: Option<InvoiceKind>,
    pub state: Option<InvoiceState>,
    pub amount: Option<Decimal>,
    pub due_amount: Option<Decimal>,
    pub currency: Option<String>,
    pub subject: Option<String>,
    pub notes: Option<String>,
    pub issued_at: Option<NaiveDate>,
    pub due_at: Option<NaiveDate>,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    pub purchase_order: Option<String>,
    pub tax: Option<Decimal>,
    pub tax_amount: Option<Decimal>,
    pub tax2: Option<Decimal>,
    pub tax2_amount: Option<Decimal>,
    pub discount: Option<Decimal>,
    pub discount_amount: Option<Decimal>,
    pub client_key: Option<String>,
    pub csv_line_items: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model for Invoice {
    const ROOT: Option<&'static str> = Some("invoice");
}

/// One line of a free-form invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceItem {
    pub kind: String,
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub amount: Decimal,
    pub taxed: bool,
    pub taxed2: bool,
    pub project_id: Option<u64>,
}

impl InvoiceItem {
    const CSV_HEADER: &'static str = "kind,description,quantity,unit_price,amount,taxed,taxed2,project_id";

    /// Render `items` in the `csv_line_items` format, header row included.
    pub fn to_csv(items: &[InvoiceItem]) -> String {
        let mut csv = String::from(Self::CSV_HEADER);
        for item in items {
            csv.push('\n');
            csv.push_str(&format!(
                "{},{},{},{},{},{},{},{}",
                csv_field(&item.kind),
                csv_field(&item.description),
                item.quantity,
                item.unit_price,
                item.amount,
                item.taxed,
                item.taxed2,
                item.project_id.map(|id| id.to_string()).unwrap_or_default(),
            ));
        }
        csv
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct InvoiceOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<InvoiceKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_at: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    /// Comma separated project ids.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projects_to_invoice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csv_line_items: Option<String>,
}

impl InvoiceOptions {
    pub fn new(kind: InvoiceKind, client_id: u64, issued_at: NaiveDate) -> Self {
        Self {
            kind: Some(kind),
            client_id: Some(client_id),
            issued_at: Some(issued_at),
            ..Self::default()
        }
    }

    pub fn with_projects(mut self, project_ids: &[u64]) -> Self {
        let joined = project_ids
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        self.projects_to_invoice = Some(joined);
        self
    }

    pub fn with_line_items(mut self, items: &[InvoiceItem]) -> Self {
        self.csv_line_items = Some(InvoiceItem::to_csv(items));
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InvoiceItemCategory {
    pub id: u64,
    pub name: Option<String>,
    pub use_as_service: Option<bool>,
    pub use_as_expense: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model for InvoiceItemCategory {
    const ROOT: Option<&'static str> = Some("invoice_item_category");
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct InvoiceItemCategoryOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_as_service: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_as_expense: Option<bool>,
}

impl InvoiceItemCategoryOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// A message recorded against an invoice, either sent to recipients or
/// attached to a state change.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InvoiceMessage {
    pub id: u64,
    pub invoice_id: Option<u64>,
    pub body: Option<String>,
    pub sent_by: Option<String>,
    pub sent_by_email: Option<String>,
    pub full_recipient_list: Option<String>,
    pub send_me_a_copy: Option<bool>,
    pub include_pay_pal_link: Option<bool>,
    pub thank_you: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model for InvoiceMessage {
    const ROOT: Option<&'static str> = Some("message");
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct InvoiceMessageOptions {
    /// Comma separated email addresses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipients: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attach_pdf: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_me_a_copy: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_pay_pal_link: Option<bool>,
}

impl InvoiceMessageOptions {
    pub fn new(recipients: impl Into<String>) -> Self {
        Self {
            recipients: Some(recipients.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Payment {
    pub id: u64,
    pub invoice_id: Option<u64>,
    pub amount: Option<Decimal>,
    pub paid_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub recorded_by: Option<String>,
    pub recorded_by_email: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model for Payment {
    const ROOT: Option<&'static str> = Some("payment");
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct PaymentOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl PaymentOptions {
    pub fn new(amount: Decimal, paid_at: DateTime<Utc>) -> Self {
        Self {
            amount: Some(amount),
            paid_at: Some(paid_at),
            notes: None,
        }
    }
}
