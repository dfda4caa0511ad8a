//! Clients and their contacts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Model;

/// A customer the account bills.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Client {
    pub id: u64,
    pub name: Option<String>,
    pub active: Option<bool>,
    pub currency: Option<String>,
    pub currency_symbol: Option<String>,
    pub details: Option<String>,
    pub highrise_id: Option<u64>,
    pub last_invoice_kind: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model for Client {
    const ROOT: Option<&'static str> = Some("client");
}

/// Fields to set when creating or updating a client.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ClientOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highrise_id: Option<u64>,
}

impl ClientOptions {
    /// Options for a new, active client.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            active: Some(true),
            ..Self::default()
        }
    }
}

/// A person at a client.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Contact {
    pub id: u64,
    pub client_id: Option<u64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub title: Option<String>,
    pub email: Option<String>,
    pub phone_office: Option<String>,
    pub phone_mobile: Option<String>,
    pub fax: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model for Contact {
    const ROOT: Option<&'static str> = Some("contact");
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ContactOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_office: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_mobile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fax: Option<String>,
}

impl ContactOptions {
    pub fn new(client_id: u64, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            client_id: Some(client_id),
            first_name: Some(first_name.into()),
            last_name: Some(last_name.into()),
            ..Self::default()
        }
    }
}
