//! The `who_am_i` answer: the company and the authenticated user.

use serde::{Deserialize, Serialize};

use super::Model;

/// Result of `account/who_am_i`: the company and the authenticated user.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Account {
    pub company: Company,
    pub user: AccountUser,
}

impl Model for Account {
    const ROOT: Option<&'static str> = None;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Company {
    pub name: Option<String>,
    pub base_uri: Option<String>,
    pub full_domain: Option<String>,
    pub active: Option<bool>,
    pub plan_type: Option<String>,
    pub week_start_day: Option<String>,
    pub time_format: Option<String>,
    pub clock: Option<String>,
    pub decimal_symbol: Option<String>,
    pub thousands_separator: Option<String>,
    pub color_scheme: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AccountUser {
    pub id: u64,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub admin: Option<bool>,
    pub timezone: Option<String>,
    pub timestamp_timers: Option<bool>,
    pub avatar_url: Option<String>,
}
