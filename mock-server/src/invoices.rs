//! Invoice messages, state transitions and payments.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::store::{u64_field, wrap, Db, Record, Store, EXPENSES, INVOICES, MESSAGES, PAYMENTS};
use crate::{body_root, created, error};

pub(crate) const PAGE_SIZE: usize = 50;

const DRAFT: &str = "draft";
const OPEN: &str = "open";
const PARTIAL: &str = "partial";
const PAID: &str = "paid";
const CLOSED: &str = "closed";

pub(crate) fn routes() -> Router<Db> {
    Router::new()
        .route("/invoices/{id}/messages", get(list_messages).post(send_message))
        .route(
            "/invoices/{id}/messages/{segment}",
            get(show_message).delete(delete_message).post(transition),
        )
        .route("/invoices/{id}/payments", get(list_payments).post(create_payment))
        .route(
            "/invoices/{id}/payments/{payment_id}",
            get(show_payment).delete(delete_payment),
        )
        .route("/expenses/{id}/receipt", post(attach_receipt))
}

/// The state an invoice moves to when `action` is posted in `state`.
pub(crate) fn next_state(state: &str, action: &str) -> Option<&'static str> {
    match (action, state) {
        ("mark_as_sent", DRAFT) => Some(OPEN),
        ("mark_as_draft", OPEN) => Some(DRAFT),
        ("mark_as_closed", OPEN | PARTIAL) => Some(CLOSED),
        ("re_open", CLOSED) => Some(OPEN),
        _ => None,
    }
}

fn state(invoice: &Record) -> &str {
    invoice.get("state").and_then(Value::as_str).unwrap_or(DRAFT)
}

fn set_state(store: &mut Store, invoice_id: u64, state: &str) {
    let mut patch = Record::new();
    patch.insert("state".to_string(), json!(state));
    store.merge(INVOICES, invoice_id, &patch);
}

fn belongs_to(record: &Record, invoice_id: u64) -> bool {
    u64_field(record, "invoice_id") == Some(invoice_id)
}

fn record_message(store: &mut Store, invoice_id: u64, mut fields: Record) -> u64 {
    fields.insert("invoice_id".to_string(), json!(invoice_id));
    fields.insert("sent_by".to_string(), json!("Test Admin"));
    fields.insert("sent_by_email".to_string(), json!("admin@example.com"));
    store.insert(MESSAGES, Value::Object(fields))
}

async fn list_messages(State(db): State<Db>, Path(invoice_id): Path<u64>) -> Response {
    let store = db.read().await;
    if store.get(INVOICES, invoice_id).is_none() {
        return StatusCode::NOT_FOUND.into_response();
    }
    let messages: Vec<Value> = store
        .all(MESSAGES)
        .filter(|message| belongs_to(message, invoice_id))
        .map(|message| wrap("message", message))
        .collect();
    Json(messages).into_response()
}

async fn send_message(
    State(db): State<Db>,
    Path(invoice_id): Path<u64>,
    Json(body): Json<Value>,
) -> Response {
    let mut fields = match body_root(&body, "invoice_message") {
        Ok(fields) => fields,
        Err(response) => return response,
    };
    let mut store = db.write().await;
    let Some(invoice) = store.get(INVOICES, invoice_id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let was_draft = state(invoice) == DRAFT;
    if let Some(recipients) = fields.remove("recipients") {
        fields.insert("full_recipient_list".to_string(), recipients);
    }
    let id = record_message(&mut store, invoice_id, fields);
    if was_draft {
        set_state(&mut store, invoice_id, OPEN);
    }
    info!(invoice_id, message_id = id, "sent invoice");
    created(format!("/{INVOICES}/{invoice_id}/{MESSAGES}/{id}"))
}

fn message_id(segment: &str) -> Option<u64> {
    segment.parse().ok()
}

async fn show_message(
    State(db): State<Db>,
    Path((invoice_id, segment)): Path<(u64, String)>,
) -> Response {
    let store = db.read().await;
    let message = message_id(&segment)
        .and_then(|id| store.get(MESSAGES, id))
        .filter(|message| belongs_to(message, invoice_id));
    match message {
        Some(message) => Json(wrap("message", message)).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn delete_message(
    State(db): State<Db>,
    Path((invoice_id, segment)): Path<(u64, String)>,
) -> StatusCode {
    let mut store = db.write().await;
    let Some(id) = message_id(&segment) else {
        return StatusCode::NOT_FOUND;
    };
    if !store.get(MESSAGES, id).is_some_and(|message| belongs_to(message, invoice_id)) {
        return StatusCode::NOT_FOUND;
    }
    store.remove(MESSAGES, id);
    StatusCode::OK
}

async fn transition(
    State(db): State<Db>,
    Path((invoice_id, action)): Path<(u64, String)>,
    body: axum::body::Bytes,
) -> Response {
    let mut store = db.write().await;
    let Some(invoice) = store.get(INVOICES, invoice_id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let current = state(invoice).to_string();
    let Some(next) = next_state(&current, &action) else {
        warn!(invoice_id, %action, state = %current, "rejected invoice transition");
        return error(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("cannot {action} an invoice that is {current}"),
        );
    };
    let mut fields = serde_json::from_slice::<Value>(&body)
        .ok()
        .and_then(|body| body.get("message").and_then(Value::as_object).cloned())
        .unwrap_or_default();
    fields.insert("action".to_string(), json!(action));
    record_message(&mut store, invoice_id, fields);
    set_state(&mut store, invoice_id, next);
    debug!(invoice_id, from = %current, to = next, "invoice transition");
    StatusCode::OK.into_response()
}

fn decimal(record: &Record, field: &str) -> f64 {
    match record.get(field) {
        Some(Value::Number(number)) => number.as_f64().unwrap_or(0.0),
        Some(Value::String(text)) => text.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Split one CSV row, honouring double-quoted fields.
fn csv_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ',' if !quoted => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}

/// Sum of the `amount` column of an invoice's line items.
pub(crate) fn line_item_total(csv: &str) -> f64 {
    let mut lines = csv.lines();
    let Some(header) = lines.next() else {
        return 0.0;
    };
    let Some(column) = csv_row(header).iter().position(|name| name == "amount") else {
        return 0.0;
    };
    lines
        .filter_map(|line| csv_row(line).get(column).and_then(|amount| amount.parse::<f64>().ok()))
        .sum()
}

/// Invoice amount: the explicit `amount` if set, otherwise the line items.
fn invoice_amount(invoice: &Record) -> f64 {
    let amount = decimal(invoice, "amount");
    if amount > 0.0 {
        return amount;
    }
    invoice
        .get("csv_line_items")
        .and_then(Value::as_str)
        .map(line_item_total)
        .unwrap_or(0.0)
}

/// Fill in `amount` and `due_amount` of a new invoice from its line items.
pub(crate) fn price(invoice: &mut Record) {
    let amount = invoice_amount(invoice);
    invoice.insert("amount".to_string(), json!(amount));
    invoice.insert("due_amount".to_string(), json!(amount));
}

/// Recompute `due_amount` and the paid/partial state from the payments.
fn settle(store: &mut Store, invoice_id: u64) {
    let paid: f64 = store
        .all(PAYMENTS)
        .filter(|payment| belongs_to(payment, invoice_id))
        .map(|payment| decimal(payment, "amount"))
        .sum();
    let Some(invoice) = store.get_mut(INVOICES, invoice_id) else {
        return;
    };
    let amount = invoice_amount(invoice);
    let due = (amount - paid).max(0.0);
    let current = state(invoice).to_string();
    let next = match current.as_str() {
        DRAFT | CLOSED => current.clone(),
        _ if paid <= 0.0 => OPEN.to_string(),
        _ if due <= 0.0 => PAID.to_string(),
        _ => PARTIAL.to_string(),
    };
    invoice.insert("due_amount".to_string(), json!(due));
    invoice.insert("state".to_string(), json!(next));
}

async fn list_payments(State(db): State<Db>, Path(invoice_id): Path<u64>) -> Response {
    let store = db.read().await;
    if store.get(INVOICES, invoice_id).is_none() {
        return StatusCode::NOT_FOUND.into_response();
    }
    let payments: Vec<Value> = store
        .all(PAYMENTS)
        .filter(|payment| belongs_to(payment, invoice_id))
        .map(|payment| wrap("payment", payment))
        .collect();
    Json(payments).into_response()
}

async fn create_payment(
    State(db): State<Db>,
    Path(invoice_id): Path<u64>,
    Json(body): Json<Value>,
) -> Response {
    let mut fields = match body_root(&body, "payment") {
        Ok(fields) => fields,
        Err(response) => return response,
    };
    if decimal(&fields, "amount") <= 0.0 {
        return error(StatusCode::UNPROCESSABLE_ENTITY, "amount must be positive");
    }
    let mut store = db.write().await;
    if store.get(INVOICES, invoice_id).is_none() {
        return StatusCode::NOT_FOUND.into_response();
    }
    fields.insert("invoice_id".to_string(), json!(invoice_id));
    fields.insert("recorded_by".to_string(), json!("Test Admin"));
    fields.insert("recorded_by_email".to_string(), json!("admin@example.com"));
    let id = store.insert(PAYMENTS, Value::Object(fields));
    settle(&mut store, invoice_id);
    info!(invoice_id, payment_id = id, "recorded payment");
    created(format!("/{INVOICES}/{invoice_id}/{PAYMENTS}/{id}"))
}

async fn show_payment(
    State(db): State<Db>,
    Path((invoice_id, id)): Path<(u64, u64)>,
) -> Response {
    let store = db.read().await;
    match store.get(PAYMENTS, id).filter(|payment| belongs_to(payment, invoice_id)) {
        Some(payment) => Json(wrap("payment", payment)).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn delete_payment(
    State(db): State<Db>,
    Path((invoice_id, id)): Path<(u64, u64)>,
) -> StatusCode {
    let mut store = db.write().await;
    if !store.get(PAYMENTS, id).is_some_and(|payment| belongs_to(payment, invoice_id)) {
        return StatusCode::NOT_FOUND;
    }
    store.remove(PAYMENTS, id);
    settle(&mut store, invoice_id);
    StatusCode::OK
}

/// Accepts a multipart upload carrying an `expense[receipt]` part.
async fn attach_receipt(
    State(db): State<Db>,
    Path(id): Path<u64>,
    body: axum::body::Bytes,
) -> Response {
    let has_part = body
        .windows(RECEIPT_PART.len())
        .any(|window| window == RECEIPT_PART);
    if !has_part {
        return error(StatusCode::UNPROCESSABLE_ENTITY, "missing expense[receipt] part");
    }
    let mut patch = Record::new();
    patch.insert("has_receipt".to_string(), json!(true));
    let mut store = db.write().await;
    match store.merge(EXPENSES, id, &patch) {
        Some(_) => {
            info!(expense_id = id, bytes = body.len(), "attached receipt");
            StatusCode::OK.into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

const RECEIPT_PART: &[u8] = b"name=\"expense[receipt]\"";
