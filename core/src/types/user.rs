//! Users (the `people` endpoints).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Model;

/// A person on the account.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct User {
    pub id: u64,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub telephone: Option<String>,
    pub department: Option<String>,
    pub timezone: Option<String>,
    pub is_active: Option<bool>,
    pub is_admin: Option<bool>,
    pub is_contractor: Option<bool>,
    pub has_access_to_all_future_projects: Option<bool>,
    pub wants_newsletter: Option<bool>,
    pub wants_weekly_digest: Option<bool>,
    pub default_hourly_rate: Option<Decimal>,
    pub cost_rate: Option<Decimal>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model for User {
    const ROOT: Option<&'static str> = Some("user");
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct UserOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telephone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_contractor: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_access_to_all_future_projects: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wants_newsletter: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wants_weekly_digest: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_hourly_rate: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_rate: Option<Decimal>,
}

impl UserOptions {
    /// Options for a new, active user.
    pub fn new(
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            email: Some(email.into()),
            first_name: Some(first_name.into()),
            last_name: Some(last_name.into()),
            is_active: Some(true),
            ..Self::default()
        }
    }
}
