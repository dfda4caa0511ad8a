//! In-memory record store behind the fake Harvest API.
//!
//! Records are kept as raw JSON objects keyed by collection and id so the
//! server echoes back whatever fields a client sent, the way the real service
//! does for the fields it knows about.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use tokio::sync::RwLock;

pub type Db = Arc<RwLock<Store>>;

pub const CLIENTS: &str = "clients";
pub const CONTACTS: &str = "contacts";
pub const ENTRIES: &str = "entries";
pub const EXPENSE_CATEGORIES: &str = "expense_categories";
pub const EXPENSES: &str = "expenses";
pub const INVOICE_ITEM_CATEGORIES: &str = "invoice_item_categories";
pub const INVOICES: &str = "invoices";
pub const MESSAGES: &str = "messages";
pub const PAYMENTS: &str = "payments";
pub const PEOPLE: &str = "people";
pub const PROJECTS: &str = "projects";
pub const TASK_ASSIGNMENTS: &str = "task_assignments";
pub const TASKS: &str = "tasks";
pub const USER_ASSIGNMENTS: &str = "user_assignments";

/// Id of the user the server treats as authenticated.
pub const CURRENT_USER: u64 = 1;
pub const FIXTURE_CLIENT: u64 = 2;
pub const FIXTURE_PROJECT: u64 = 3;
pub const FIXTURE_TASK: u64 = 4;
/// Notes carried by the seeded, never billed time entries.
pub const FIXTURE_NOTE: &str = "Test DO NOT DELETE";

pub type Record = Map<String, Value>;

#[derive(Debug, Default)]
pub struct Store {
    next_id: u64,
    collections: HashMap<&'static str, BTreeMap<u64, Record>>,
}

impl Store {
    /// A store holding the account fixtures: one admin user, a client with a
    /// project and task, and non-billable time entries on 2014-12-19 and
    /// 2014-12-20 plus one billable entry outside that range.
    pub fn seeded() -> Self {
        let mut store = Store::default();
        store.insert_with_id(
            PEOPLE,
            CURRENT_USER,
            json!({
                "email": "admin@example.com",
                "first_name": "Test",
                "last_name": "Admin",
                "is_admin": true,
                "is_active": true,
                "timezone": "UTC"
            }),
        );
        store.insert_with_id(
            CLIENTS,
            FIXTURE_CLIENT,
            json!({"name": "Fixture Client", "active": true, "currency": "United States Dollar - USD"}),
        );
        store.insert_with_id(
            PROJECTS,
            FIXTURE_PROJECT,
            json!({"name": "Fixture Project", "client_id": FIXTURE_CLIENT, "active": true, "billable": false}),
        );
        store.insert_with_id(
            TASKS,
            FIXTURE_TASK,
            json!({"name": "Fixture Task", "billable_by_default": false, "deactivated": false}),
        );
        for (spent_at, billable, notes) in [
            ("2014-12-19", false, FIXTURE_NOTE),
            ("2014-12-20", false, FIXTURE_NOTE),
            ("2014-12-22", true, "Billable work"),
        ] {
            store.insert(
                ENTRIES,
                json!({
                    "user_id": CURRENT_USER,
                    "project_id": FIXTURE_PROJECT,
                    "task_id": FIXTURE_TASK,
                    "spent_at": spent_at,
                    "hours": 1.0,
                    "notes": notes,
                    "billable": billable,
                    "is_billed": false,
                    "is_closed": false
                }),
            );
        }
        store
    }

    fn table(&mut self, collection: &'static str) -> &mut BTreeMap<u64, Record> {
        self.collections.entry(collection).or_default()
    }

    fn insert_with_id(&mut self, collection: &'static str, id: u64, fields: Value) {
        let mut record = match fields {
            Value::Object(map) => map,
            _ => Record::new(),
        };
        let now = now();
        record.insert("id".to_string(), json!(id));
        record.insert("created_at".to_string(), json!(now));
        record.insert("updated_at".to_string(), json!(now));
        self.next_id = self.next_id.max(id);
        self.table(collection).insert(id, record);
    }

    /// Store `fields` as a new record and return its id. The server owns
    /// `id` and the audit timestamps.
    pub fn insert(&mut self, collection: &'static str, fields: Value) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.insert_with_id(collection, id, fields);
        id
    }

    pub fn get(&self, collection: &str, id: u64) -> Option<&Record> {
        self.collections.get(collection)?.get(&id)
    }

    pub fn get_mut(&mut self, collection: &str, id: u64) -> Option<&mut Record> {
        self.collections.get_mut(collection)?.get_mut(&id)
    }

    pub fn remove(&mut self, collection: &str, id: u64) -> Option<Record> {
        self.collections.get_mut(collection)?.remove(&id)
    }

    /// Records of `collection` in id order.
    pub fn all(&self, collection: &str) -> impl Iterator<Item = &Record> {
        self.collections
            .get(collection)
            .into_iter()
            .flat_map(|table| table.values())
    }

    /// Overwrite the supplied fields of a record, leaving the rest untouched.
    pub fn merge(&mut self, collection: &str, id: u64, fields: &Record) -> Option<&Record> {
        let record = self.get_mut(collection, id)?;
        for (key, value) in fields {
            if key != "id" && key != "created_at" && key != "updated_at" {
                record.insert(key.clone(), value.clone());
            }
        }
        record.insert("updated_at".to_string(), json!(now()));
        Some(&*record)
    }
}

pub fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn u64_field(record: &Record, field: &str) -> Option<u64> {
    record.get(field).and_then(Value::as_u64)
}

pub fn bool_field(record: &Record, field: &str) -> bool {
    record.get(field).and_then(Value::as_bool).unwrap_or(false)
}

pub fn date_field(record: &Record, field: &str) -> Option<NaiveDate> {
    let text = record.get(field)?.as_str()?;
    NaiveDate::parse_from_str(text.get(..10)?, "%Y-%m-%d").ok()
}

pub fn timestamp_field(record: &Record, field: &str) -> Option<DateTime<Utc>> {
    let text = record.get(field)?.as_str()?;
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|value| value.with_timezone(&Utc))
}

/// `{"client": {...}}`
pub fn wrap(root: &str, record: &Record) -> Value {
    json!({ root: record })
}
