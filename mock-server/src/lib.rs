//! A fake Harvest API for exercising the client over real HTTP.
//!
//! Writes answer the way the service does: a create returns `201 Created`
//! with a `Location` header and an empty body, an update returns `200 OK`
//! with a `Location` header, and a delete returns `200 OK` or `404`.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::NaiveDateTime;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};

mod invoices;
pub mod store;
mod time;

use store::{
    bool_field, date_field, now, timestamp_field, u64_field, wrap, Db, Record, Store, CLIENTS,
    CONTACTS, CURRENT_USER, EXPENSE_CATEGORIES, EXPENSES, INVOICES, INVOICE_ITEM_CATEGORIES,
    PEOPLE, PROJECTS, TASKS, TASK_ASSIGNMENTS, USER_ASSIGNMENTS,
};

type Params = HashMap<String, String>;

/// A flat collection served with list/create/show/update/delete.
#[derive(Debug, Clone, Copy)]
struct Resource {
    collection: &'static str,
    root: &'static str,
}

const RESOURCES: [Resource; 8] = [
    Resource { collection: CLIENTS, root: "client" },
    Resource { collection: CONTACTS, root: "contact" },
    Resource { collection: EXPENSE_CATEGORIES, root: "expense_category" },
    Resource { collection: EXPENSES, root: "expense" },
    Resource { collection: INVOICE_ITEM_CATEGORIES, root: "invoice_item_category" },
    Resource { collection: INVOICES, root: "invoice" },
    Resource { collection: PEOPLE, root: "user" },
    Resource { collection: PROJECTS, root: "project" },
];

const TASK_RESOURCE: Resource = Resource { collection: TASKS, root: "task" };

/// A collection nested under a project that references another record.
#[derive(Debug, Clone, Copy)]
struct Assignment {
    collection: &'static str,
    root: &'static str,
    /// Element naming the referenced record in a create body.
    reference: &'static str,
    reference_collection: &'static str,
    reference_key: &'static str,
}

const TASK_ASSIGNMENT: Assignment = Assignment {
    collection: TASK_ASSIGNMENTS,
    root: "task_assignment",
    reference: "task",
    reference_collection: TASKS,
    reference_key: "task_id",
};

const USER_ASSIGNMENT: Assignment = Assignment {
    collection: USER_ASSIGNMENTS,
    root: "user_assignment",
    reference: "user",
    reference_collection: PEOPLE,
    reference_key: "user_id",
};

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::seeded()));
    let mut router = Router::new()
        .route("/account/who_am_i", get(who_am_i))
        .route("/clients/{id}/toggle", post(toggle_client))
        .route("/clients/{id}/contacts", get(client_contacts))
        .route("/people/{id}/toggle", post(toggle_user))
        .route("/people/{id}/reset_password", post(reset_password))
        .route("/projects/{id}/toggle", put(toggle_project))
        .route("/tasks/{id}/activate", post(activate_task))
        .route(
            "/projects/{id}/task_assignments/add_with_create_new_task",
            post(create_task_and_assign),
        )
        .merge(crud(TASK_RESOURCE))
        .merge(assignments(TASK_ASSIGNMENT))
        .merge(assignments(USER_ASSIGNMENT))
        .merge(invoices::routes())
        .merge(time::routes());
    for resource in RESOURCES {
        router = router.merge(crud(resource));
    }
    router.with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn crud(resource: Resource) -> Router<Db> {
    let collection = format!("/{}", resource.collection);
    let item = format!("/{}/{{id}}", resource.collection);
    Router::new()
        .route(
            &collection,
            get(move |State(db): State<Db>, Query(params): Query<Params>| {
                list(db, params, resource)
            })
            .post(move |State(db): State<Db>, Json(body): Json<Value>| create(db, body, resource)),
        )
        .route(
            &item,
            get(move |State(db): State<Db>, Path(key): Path<String>| show(db, key, resource))
                .put(
                    move |State(db): State<Db>, Path(id): Path<u64>, Json(body): Json<Value>| {
                        update(db, id, body, resource)
                    },
                )
                .delete(move |State(db): State<Db>, Path(id): Path<u64>| {
                    delete(db, resource.collection, id)
                }),
        )
}

pub(crate) fn error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

pub(crate) fn created(location: String) -> Response {
    (StatusCode::CREATED, [(header::LOCATION, location)]).into_response()
}

pub(crate) fn moved(location: String) -> Response {
    (StatusCode::OK, [(header::LOCATION, location)]).into_response()
}

/// The object under `root` in a request body.
pub(crate) fn body_root(body: &Value, root: &str) -> Result<Record, Response> {
    body.get(root)
        .and_then(Value::as_object)
        .cloned()
        .ok_or_else(|| error(StatusCode::BAD_REQUEST, format!("missing {root} element")))
}

/// Values a new record starts with unless the request sets them.
fn defaults(collection: &str) -> Value {
    match collection {
        CLIENTS | PROJECTS => json!({"active": true}),
        PEOPLE => json!({"is_active": true, "is_admin": false}),
        TASKS | EXPENSE_CATEGORIES => json!({"deactivated": false}),
        EXPENSES => json!({"user_id": CURRENT_USER, "has_receipt": false, "is_closed": false}),
        INVOICES => json!({"state": "draft", "amount": 0.0, "due_amount": 0.0}),
        _ => json!({}),
    }
}

fn with_defaults(collection: &str, fields: Record) -> Value {
    let mut record = match defaults(collection) {
        Value::Object(map) => map,
        _ => Record::new(),
    };
    record.extend(fields);
    Value::Object(record)
}

fn parse_since(params: &Params) -> Result<Option<NaiveDateTime>, Response> {
    match params.get("updated_since") {
        None => Ok(None),
        Some(text) => NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M")
            .map(Some)
            .map_err(|_| error(StatusCode::BAD_REQUEST, "invalid updated_since")),
    }
}

pub(crate) fn parse_compact_date(
    params: &Params,
    name: &str,
) -> Result<Option<chrono::NaiveDate>, Response> {
    match params.get(name) {
        None => Ok(None),
        Some(text) => chrono::NaiveDate::parse_from_str(text, "%Y%m%d")
            .map(Some)
            .map_err(|_| error(StatusCode::BAD_REQUEST, format!("invalid {name}"))),
    }
}

pub(crate) fn updated_after(record: &Record, since: Option<NaiveDateTime>) -> bool {
    match (since, timestamp_field(record, "updated_at")) {
        (Some(since), Some(updated)) => updated.naive_utc() >= since,
        _ => true,
    }
}

async fn list(db: Db, params: Params, resource: Resource) -> Response {
    let since = match parse_since(&params) {
        Ok(since) => since,
        Err(response) => return response,
    };
    let (from, to) = match (
        parse_compact_date(&params, "from"),
        parse_compact_date(&params, "to"),
    ) {
        (Ok(from), Ok(to)) => (from, to),
        (Err(response), _) | (_, Err(response)) => return response,
    };
    let client = params.get("client").and_then(|id| id.parse::<u64>().ok());
    let status = params.get("status");
    let page = params
        .get("page")
        .and_then(|page| page.parse::<usize>().ok())
        .unwrap_or(1)
        .max(1);

    let store = db.read().await;
    let items: Vec<Value> = store
        .all(resource.collection)
        .filter(|record| updated_after(record, since))
        .filter(|record| client.is_none() || u64_field(record, "client_id") == client)
        .filter(|record| {
            status.is_none() || record.get("state").and_then(Value::as_str) == status.map(String::as_str)
        })
        .filter(|record| {
            let issued = date_field(record, "issued_at");
            from.map_or(true, |from| issued.is_some_and(|day| day >= from))
                && to.map_or(true, |to| issued.is_some_and(|day| day <= to))
        })
        .skip((page - 1) * invoices::PAGE_SIZE)
        .take(invoices::PAGE_SIZE)
        .map(|record| wrap(resource.root, record))
        .collect();
    debug!(collection = resource.collection, count = items.len(), "listed records");
    Json(items).into_response()
}

async fn create(db: Db, body: Value, resource: Resource) -> Response {
    let fields = match body_root(&body, resource.root) {
        Ok(fields) => fields,
        Err(response) => return response,
    };
    let mut record = with_defaults(resource.collection, fields);
    if resource.collection == INVOICES {
        if let Value::Object(invoice) = &mut record {
            invoices::price(invoice);
        }
    }
    let id = db.write().await.insert(resource.collection, record);
    info!(collection = resource.collection, id, "created record");
    created(format!("/{}/{id}", resource.collection))
}

async fn show(db: Db, key: String, resource: Resource) -> Response {
    let store = db.read().await;
    let record = match key.parse::<u64>() {
        Ok(id) => store.get(resource.collection, id),
        Err(_) if resource.collection == PEOPLE => store
            .all(PEOPLE)
            .find(|user| user.get("email").and_then(Value::as_str) == Some(key.as_str())),
        Err(_) => None,
    };
    match record {
        Some(record) => Json(wrap(resource.root, record)).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn update(db: Db, id: u64, body: Value, resource: Resource) -> Response {
    let fields = match body_root(&body, resource.root) {
        Ok(fields) => fields,
        Err(response) => return response,
    };
    let mut store = db.write().await;
    match store.merge(resource.collection, id, &fields) {
        Some(_) => moved(format!("/{}/{id}", resource.collection)),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn delete(db: Db, collection: &'static str, id: u64) -> StatusCode {
    let mut store = db.write().await;
    match store.remove(collection, id) {
        Some(_) => {
            info!(collection, id, "deleted record");
            StatusCode::OK
        }
        None => StatusCode::NOT_FOUND,
    }
}

async fn who_am_i(State(db): State<Db>) -> Response {
    let store = db.read().await;
    let Some(user) = store.get(PEOPLE, CURRENT_USER) else {
        return StatusCode::UNAUTHORIZED.into_response();
    };
    Json(json!({
        "company": {
            "name": "Example Co",
            "base_uri": "https://example.harvestapp.com",
            "full_domain": "example.harvestapp.com",
            "active": true,
            "week_start_day": "Monday",
            "time_format": "hours_minutes",
            "clock": "12h"
        },
        "user": {
            "id": CURRENT_USER,
            "email": user.get("email"),
            "first_name": user.get("first_name"),
            "last_name": user.get("last_name"),
            "admin": bool_field(user, "is_admin"),
            "timezone": user.get("timezone")
        }
    }))
    .into_response()
}

/// Flip a boolean field and stamp `updated_at`.
fn flip(store: &mut Store, collection: &str, id: u64, field: &str) -> Option<bool> {
    let record = store.get_mut(collection, id)?;
    let flipped = !bool_field(record, field);
    record.insert(field.to_string(), json!(flipped));
    record.insert("updated_at".to_string(), json!(now()));
    Some(flipped)
}

async fn toggle_client(State(db): State<Db>, Path(id): Path<u64>) -> Response {
    let mut store = db.write().await;
    match flip(&mut store, CLIENTS, id, "active") {
        Some(_) => moved(format!("/{CLIENTS}/{id}")),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn toggle_user(State(db): State<Db>, Path(id): Path<u64>) -> StatusCode {
    let mut store = db.write().await;
    match flip(&mut store, PEOPLE, id, "is_active") {
        Some(_) => StatusCode::OK,
        None => StatusCode::NOT_FOUND,
    }
}

async fn toggle_project(State(db): State<Db>, Path(id): Path<u64>) -> StatusCode {
    let mut store = db.write().await;
    match flip(&mut store, PROJECTS, id, "active") {
        Some(_) => StatusCode::OK,
        None => StatusCode::NOT_FOUND,
    }
}

async fn reset_password(State(db): State<Db>, Path(id): Path<u64>) -> Response {
    let store = db.read().await;
    match store.get(PEOPLE, id) {
        Some(user) => Json(wrap("user", user)).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn activate_task(State(db): State<Db>, Path(id): Path<u64>) -> Response {
    let mut store = db.write().await;
    let mut patch = Record::new();
    patch.insert("deactivated".to_string(), json!(false));
    match store.merge(TASKS, id, &patch) {
        Some(task) => Json(wrap("task", task)).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn client_contacts(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Query(params): Query<Params>,
) -> Response {
    let since = match parse_since(&params) {
        Ok(since) => since,
        Err(response) => return response,
    };
    let store = db.read().await;
    if store.get(CLIENTS, id).is_none() {
        return StatusCode::NOT_FOUND.into_response();
    }
    let contacts: Vec<Value> = store
        .all(CONTACTS)
        .filter(|contact| u64_field(contact, "client_id") == Some(id))
        .filter(|contact| updated_after(contact, since))
        .map(|contact| wrap("contact", contact))
        .collect();
    Json(contacts).into_response()
}

fn assignments(kind: Assignment) -> Router<Db> {
    let collection = format!("/{PROJECTS}/{{id}}/{}", kind.collection);
    let item = format!("/{PROJECTS}/{{id}}/{}/{{assignment_id}}", kind.collection);
    Router::new()
        .route(
            &collection,
            get(move |State(db): State<Db>, Path(project): Path<u64>| {
                list_assignments(db, project, kind)
            })
            .post(move |State(db): State<Db>, Path(project): Path<u64>, Json(body): Json<Value>| {
                create_assignment(db, project, body, kind)
            }),
        )
        .route(
            &item,
            get(move |State(db): State<Db>, Path(ids): Path<(u64, u64)>| {
                show_assignment(db, ids, kind)
            })
            .put(
                move |State(db): State<Db>, Path(ids): Path<(u64, u64)>, Json(body): Json<Value>| {
                    update_assignment(db, ids, body, kind)
                },
            )
            .delete(move |State(db): State<Db>, Path(ids): Path<(u64, u64)>| {
                delete_assignment(db, ids, kind)
            }),
        )
}

fn in_project(record: &Record, project: u64) -> bool {
    u64_field(record, "project_id") == Some(project)
}

async fn list_assignments(db: Db, project: u64, kind: Assignment) -> Response {
    let store = db.read().await;
    if store.get(PROJECTS, project).is_none() {
        return StatusCode::NOT_FOUND.into_response();
    }
    let items: Vec<Value> = store
        .all(kind.collection)
        .filter(|record| in_project(record, project))
        .map(|record| wrap(kind.root, record))
        .collect();
    Json(items).into_response()
}

fn assign(store: &mut Store, project: u64, reference_id: u64, kind: Assignment) -> u64 {
    store.insert(
        kind.collection,
        json!({
            "project_id": project,
            kind.reference_key: reference_id,
            "deactivated": false,
            "billable": true,
            "is_project_manager": false
        }),
    )
}

async fn create_assignment(db: Db, project: u64, body: Value, kind: Assignment) -> Response {
    let reference = match body_root(&body, kind.reference) {
        Ok(reference) => reference,
        Err(response) => return response,
    };
    let Some(reference_id) = u64_field(&reference, "id") else {
        return error(StatusCode::BAD_REQUEST, format!("missing {} id", kind.reference));
    };
    let mut store = db.write().await;
    if store.get(PROJECTS, project).is_none()
        || store.get(kind.reference_collection, reference_id).is_none()
    {
        return StatusCode::NOT_FOUND.into_response();
    }
    let id = assign(&mut store, project, reference_id, kind);
    created(format!("/{PROJECTS}/{project}/{}/{id}", kind.collection))
}

async fn create_task_and_assign(
    State(db): State<Db>,
    Path(project): Path<u64>,
    Json(body): Json<Value>,
) -> Response {
    let task = match body_root(&body, "task") {
        Ok(task) => task,
        Err(response) => return response,
    };
    let name = task.get("name").and_then(Value::as_str).unwrap_or_default();
    if name.trim().is_empty() {
        return error(StatusCode::UNPROCESSABLE_ENTITY, "task name is required");
    }
    let mut store = db.write().await;
    if store.get(PROJECTS, project).is_none() {
        return StatusCode::NOT_FOUND.into_response();
    }
    let task_id = store.insert(TASKS, with_defaults(TASKS, task));
    let id = assign(&mut store, project, task_id, TASK_ASSIGNMENT);
    created(format!("/{PROJECTS}/{project}/{TASK_ASSIGNMENTS}/{id}"))
}

async fn show_assignment(db: Db, (project, id): (u64, u64), kind: Assignment) -> Response {
    let store = db.read().await;
    match store.get(kind.collection, id).filter(|record| in_project(record, project)) {
        Some(record) => Json(wrap(kind.root, record)).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn update_assignment(db: Db, (project, id): (u64, u64), body: Value, kind: Assignment) -> Response {
    let fields = match body_root(&body, kind.root) {
        Ok(fields) => fields,
        Err(response) => return response,
    };
    let mut store = db.write().await;
    if !store.get(kind.collection, id).is_some_and(|record| in_project(record, project)) {
        return StatusCode::NOT_FOUND.into_response();
    }
    store.merge(kind.collection, id, &fields);
    moved(format!("/{PROJECTS}/{project}/{}/{id}", kind.collection))
}

async fn delete_assignment(db: Db, (project, id): (u64, u64), kind: Assignment) -> StatusCode {
    let mut store = db.write().await;
    if !store.get(kind.collection, id).is_some_and(|record| in_project(record, project)) {
        return StatusCode::NOT_FOUND;
    }
    store.remove(kind.collection, id);
    StatusCode::OK
}
