//! Path fragments, query parameter names and wire formatting shared by the
//! resource modules.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::{Decimal, RoundingStrategy};

// Resources.
pub(crate) const ACCOUNT: &str = "account";
pub(crate) const CLIENTS: &str = "clients";
pub(crate) const CONTACTS: &str = "contacts";
pub(crate) const DAILY: &str = "daily";
pub(crate) const EXPENSE_CATEGORIES: &str = "expense_categories";
pub(crate) const EXPENSES: &str = "expenses";
pub(crate) const INVOICE_ITEM_CATEGORIES: &str = "invoice_item_categories";
pub(crate) const INVOICES: &str = "invoices";
pub(crate) const MESSAGES: &str = "messages";
pub(crate) const PAYMENTS: &str = "payments";
pub(crate) const PEOPLE: &str = "people";
pub(crate) const PROJECTS: &str = "projects";
pub(crate) const TASK_ASSIGNMENTS: &str = "task_assignments";
pub(crate) const TASKS: &str = "tasks";
pub(crate) const USER_ASSIGNMENTS: &str = "user_assignments";

// Actions.
pub(crate) const ACTIVATE: &str = "activate";
pub(crate) const ADD: &str = "add";
pub(crate) const ADD_WITH_CREATE_NEW_TASK: &str = "add_with_create_new_task";
pub(crate) const DELETE: &str = "delete";
pub(crate) const ENTRIES: &str = "entries";
pub(crate) const RECEIPT: &str = "receipt";
pub(crate) const RESET_PASSWORD: &str = "reset_password";
pub(crate) const SHOW: &str = "show";
pub(crate) const TIMER: &str = "timer";
pub(crate) const TOGGLE: &str = "toggle";
pub(crate) const UPDATE: &str = "update";
pub(crate) const WHO_AM_I: &str = "who_am_i";

// Query parameters.
pub(crate) const BILLABLE: &str = "billable";
pub(crate) const CLIENT: &str = "client";
pub(crate) const FROM: &str = "from";
pub(crate) const IS_CLOSED: &str = "is_closed";
pub(crate) const OF_USER: &str = "of_user";
pub(crate) const ONLY_BILLED: &str = "only_billed";
pub(crate) const ONLY_UNBILLED: &str = "only_unbilled";
pub(crate) const PAGE: &str = "page";
pub(crate) const PROJECT_ID: &str = "project_id";
pub(crate) const STATUS: &str = "status";
pub(crate) const TO: &str = "to";
pub(crate) const UPDATED_SINCE: &str = "updated_since";
pub(crate) const USER_ID: &str = "user_id";

/// `updated_since` values: `2014-12-19 10:30`.
pub(crate) fn timestamp(value: NaiveDateTime) -> String {
    value.format("%Y-%m-%d %H:%M").to_string()
}

/// Report and invoice range bounds: `20141219`.
pub(crate) fn compact_date(value: NaiveDate) -> String {
    value.format("%Y%m%d").to_string()
}

pub(crate) fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

/// Hours with two decimals: `1.50`.
pub(crate) fn hours(value: Decimal) -> String {
    format!(
        "{:.2}",
        value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}

/// Clock times as the daily endpoints expect them: `9:05am`.
pub(crate) fn clock_time(value: NaiveTime) -> String {
    value.format("%-I:%M%P").to_string()
}
