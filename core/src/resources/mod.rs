//! One handle per Harvest resource.
//!
//! Handles borrow the client and only build operations; nothing is sent
//! until the returned [`Call`](crate::Call) is executed.

use chrono::NaiveDateTime;

use crate::error::HarvestError;
use crate::params;
use crate::request::ApiRequest;

mod account;
mod clients;
mod contacts;
mod expense_categories;
mod expenses;
mod invoice_categories;
mod invoice_messages;
mod invoice_payments;
mod invoices;
mod people;
mod projects;
mod reports;
mod task_assignments;
mod tasks;
mod time_tracking;
mod user_assignments;

pub use account::AccountResource;
pub use clients::ClientsResource;
pub use contacts::ContactsResource;
pub use expense_categories::ExpenseCategoriesResource;
pub use expenses::ExpensesResource;
pub use invoice_categories::InvoiceCategoriesResource;
pub use invoice_messages::InvoiceMessagesResource;
pub use invoice_payments::InvoicePaymentsResource;
pub use invoices::{InvoiceFilter, InvoicesResource};
pub use people::PeopleResource;
pub use projects::ProjectsResource;
pub use reports::{EntryFilter, ExpenseFilter, ReportsResource};
pub use task_assignments::TaskAssignmentsResource;
pub use tasks::TasksResource;
pub use time_tracking::TimeTrackingResource;
pub use user_assignments::UserAssignmentsResource;

/// Fail unless `value` holds non-blank text.
pub(crate) fn require_text(value: Option<&str>, field: &str) -> Result<(), HarvestError> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(()),
        _ => Err(HarvestError::invalid(format!("{field} is required"))),
    }
}

/// Fail unless `value` is set.
pub(crate) fn require<V>(value: Option<V>, field: &str) -> Result<V, HarvestError> {
    value.ok_or_else(|| HarvestError::invalid(format!("{field} is required")))
}

pub(crate) fn updated_since(request: ApiRequest, since: Option<NaiveDateTime>) -> ApiRequest {
    request.query_opt(params::UPDATED_SINCE, since.map(params::timestamp))
}

pub(crate) fn of_user(request: ApiRequest, user_id: Option<u64>) -> ApiRequest {
    request.query_opt(params::OF_USER, user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_is_rejected() {
        assert!(require_text(Some("Acme"), "name").is_ok());
        for value in [None, Some(""), Some("   ")] {
            let err = require_text(value, "name").unwrap_err();
            assert!(matches!(err, HarvestError::InvalidArgument(ref msg) if msg == "name is required"));
        }
    }

    #[test]
    fn updated_since_is_minute_precision() {
        let since = chrono::NaiveDate::from_ymd_opt(2014, 12, 19)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        let request = updated_since(ApiRequest::get("clients"), Some(since));
        assert_eq!(request.query_value("updated_since"), Some("2014-12-19 10:30"));
        assert!(updated_since(ApiRequest::get("clients"), None).query.is_empty());
    }
}
