//! The daily time sheet, timers and the time and expense reports.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::store::{
    bool_field, date_field, now, timestamp_field, u64_field, wrap, Db, Record, Store, ENTRIES,
    EXPENSES, PEOPLE, PROJECTS, TASKS,
};
use crate::{error, parse_compact_date, updated_after, Params};

/// `hours` value that asks for a running timer instead of a duration.
const START_TIMER: &str = " ";

pub(crate) fn routes() -> Router<Db> {
    Router::new()
        .route("/daily", get(today))
        .route("/daily/{day}/{year}", get(day))
        .route("/daily/show/{id}", get(show))
        .route("/daily/timer/{id}", get(toggle_timer))
        .route("/daily/add", post(add))
        .route("/daily/update/{id}", post(update))
        .route("/daily/delete/{id}", delete(remove))
        .route("/people/{id}/entries", get(user_entries))
        .route("/projects/{id}/entries", get(project_entries))
        .route("/people/{id}/expenses", get(user_expenses))
        .route("/projects/{id}/expenses", get(project_expenses))
}

fn of_user(params: &Params) -> u64 {
    params
        .get("of_user")
        .and_then(|id| id.parse().ok())
        .unwrap_or(crate::store::CURRENT_USER)
}

fn owned_by(entry: &Record, user: u64) -> bool {
    u64_field(entry, "user_id") == Some(user)
}

fn sheet(store: &Store, day: NaiveDate, user: u64) -> Value {
    let entries: Vec<&Record> = store
        .all(ENTRIES)
        .filter(|entry| owned_by(entry, user) && date_field(entry, "spent_at") == Some(day))
        .collect();
    let tasks: Vec<Value> = store
        .all(TASKS)
        .filter(|task| !bool_field(task, "deactivated"))
        .map(|task| {
            json!({
                "id": task.get("id"),
                "name": task.get("name"),
                "billable": bool_field(task, "billable_by_default")
            })
        })
        .collect();
    let projects: Vec<Value> = store
        .all(PROJECTS)
        .filter(|project| bool_field(project, "active"))
        .map(|project| {
            json!({
                "id": project.get("id"),
                "name": project.get("name"),
                "code": project.get("code"),
                "billable": bool_field(project, "billable"),
                "client_id": project.get("client_id"),
                "tasks": tasks
            })
        })
        .collect();
    json!({
        "for_day": day.format("%Y-%m-%d").to_string(),
        "day_entries": entries,
        "projects": projects
    })
}

async fn today(State(db): State<Db>, Query(params): Query<Params>) -> Json<Value> {
    let store = db.read().await;
    Json(sheet(&store, Utc::now().date_naive(), of_user(&params)))
}

async fn day(
    State(db): State<Db>,
    Path((day, year)): Path<(u32, i32)>,
    Query(params): Query<Params>,
) -> Response {
    let Some(date) = NaiveDate::from_yo_opt(year, day) else {
        return error(StatusCode::BAD_REQUEST, format!("no day {day} in {year}"));
    };
    let store = db.read().await;
    Json(sheet(&store, date, of_user(&params))).into_response()
}

fn entry_response(store: &Store, id: u64, user: u64, status: StatusCode) -> Response {
    match store.get(ENTRIES, id).filter(|entry| owned_by(entry, user)) {
        Some(entry) => (status, Json(Value::Object(entry.clone()))).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn show(State(db): State<Db>, Path(id): Path<u64>, Query(params): Query<Params>) -> Response {
    let store = db.read().await;
    entry_response(&store, id, of_user(&params), StatusCode::OK)
}

/// Hours elapsed since the entry's timer started.
fn elapsed(entry: &Record) -> f64 {
    timestamp_field(entry, "timer_started_at")
        .map(|started| (Utc::now() - started).num_seconds().max(0) as f64 / 3600.0)
        .unwrap_or(0.0)
}

fn hours(entry: &Record) -> f64 {
    entry.get("hours").and_then(Value::as_f64).unwrap_or(0.0)
}

/// Stop the timer on `id`, folding the running time into its hours.
fn stop(store: &mut Store, id: u64) {
    let Some(entry) = store.get_mut(ENTRIES, id) else {
        return;
    };
    let previous = hours(entry);
    entry.insert("hours".to_string(), json!(previous + elapsed(entry)));
    entry.insert("hours_for_previously_running_timer".to_string(), json!(previous));
    entry.insert("timer_started_at".to_string(), Value::Null);
    entry.insert("updated_at".to_string(), json!(now()));
}

/// Start the timer on `id`, stopping any other timer the user has running.
fn start(store: &mut Store, id: u64, user: u64) {
    let running: Vec<u64> = store
        .all(ENTRIES)
        .filter(|entry| owned_by(entry, user) && timestamp_field(entry, "timer_started_at").is_some())
        .filter_map(|entry| u64_field(entry, "id"))
        .collect();
    for other in running {
        stop(store, other);
    }
    if let Some(entry) = store.get_mut(ENTRIES, id) {
        entry.insert("timer_started_at".to_string(), json!(now()));
        entry.insert("updated_at".to_string(), json!(now()));
    }
}

async fn toggle_timer(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Query(params): Query<Params>,
) -> Response {
    let user = of_user(&params);
    let mut store = db.write().await;
    let Some(entry) = store.get(ENTRIES, id).filter(|entry| owned_by(entry, user)) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if timestamp_field(entry, "timer_started_at").is_some() {
        stop(&mut store, id);
        debug!(id, "stopped timer");
    } else {
        start(&mut store, id, user);
        debug!(id, "started timer");
    }
    entry_response(&store, id, user, StatusCode::OK)
}

/// Turn the flat form fields into stored entry fields. Returns whether a
/// timer should be started.
fn normalize(fields: &mut Record) -> Result<bool, Response> {
    let Some(hours) = fields.remove("hours") else {
        return Ok(false);
    };
    match hours {
        Value::String(text) if text == START_TIMER => {
            fields.insert("hours".to_string(), json!(0.0));
            Ok(true)
        }
        Value::String(text) => match text.trim().parse::<f64>() {
            Ok(value) => {
                fields.insert("hours".to_string(), json!(value));
                Ok(false)
            }
            Err(_) => Err(error(StatusCode::UNPROCESSABLE_ENTITY, format!("invalid hours {text:?}"))),
        },
        other => {
            fields.insert("hours".to_string(), other);
            Ok(false)
        }
    }
}

async fn add(
    State(db): State<Db>,
    Query(params): Query<Params>,
    Json(body): Json<Value>,
) -> Response {
    let Value::Object(mut fields) = body else {
        return error(StatusCode::BAD_REQUEST, "expected an object");
    };
    for required in ["spent_at", "project_id", "task_id"] {
        if !fields.contains_key(required) {
            return error(StatusCode::BAD_REQUEST, format!("{required} is required"));
        }
    }
    let timer = match normalize(&mut fields) {
        Ok(timer) => timer,
        Err(response) => return response,
    };
    let user = of_user(&params);
    fields.insert("user_id".to_string(), json!(user));
    fields.entry("hours").or_insert(json!(0.0));
    fields.insert("is_billed".to_string(), json!(false));
    fields.insert("is_closed".to_string(), json!(false));
    fields.insert("timer_started_at".to_string(), Value::Null);

    let mut store = db.write().await;
    let id = store.insert(ENTRIES, Value::Object(fields));
    if timer {
        start(&mut store, id, user);
    }
    info!(id, user, timer, "added time entry");
    entry_response(&store, id, user, StatusCode::CREATED)
}

async fn update(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Query(params): Query<Params>,
    Json(body): Json<Value>,
) -> Response {
    let Value::Object(mut fields) = body else {
        return error(StatusCode::BAD_REQUEST, "expected an object");
    };
    let timer = match normalize(&mut fields) {
        Ok(timer) => timer,
        Err(response) => return response,
    };
    let user = of_user(&params);
    let mut store = db.write().await;
    if !store.get(ENTRIES, id).is_some_and(|entry| owned_by(entry, user)) {
        return StatusCode::NOT_FOUND.into_response();
    }
    fields.remove("user_id");
    store.merge(ENTRIES, id, &fields);
    if timer {
        start(&mut store, id, user);
    }
    entry_response(&store, id, user, StatusCode::OK)
}

async fn remove(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Query(params): Query<Params>,
) -> StatusCode {
    let user = of_user(&params);
    let mut store = db.write().await;
    if !store.get(ENTRIES, id).is_some_and(|entry| owned_by(entry, user)) {
        return StatusCode::NOT_FOUND;
    }
    store.remove(ENTRIES, id);
    StatusCode::OK
}

/// Report criteria shared by every report route.
struct Criteria {
    from: NaiveDate,
    to: NaiveDate,
    params: Params,
}

impl Criteria {
    fn parse(params: Params) -> Result<Self, Response> {
        let from = parse_compact_date(&params, "from")?;
        let to = parse_compact_date(&params, "to")?;
        match (from, to) {
            (Some(from), Some(to)) => Ok(Self { from, to, params }),
            _ => Err(error(StatusCode::BAD_REQUEST, "from and to are required")),
        }
    }

    fn flag(&self, name: &str) -> Option<bool> {
        match self.params.get(name).map(String::as_str) {
            Some("yes" | "true") => Some(true),
            Some("no" | "false") => Some(false),
            _ => None,
        }
    }

    fn id(&self, name: &str) -> Option<u64> {
        self.params.get(name).and_then(|id| id.parse().ok())
    }

    /// Whether `record` falls in the date range and passes the billed and
    /// closed filters. `billed` tells whether the record has been invoiced.
    fn admits(&self, record: &Record, billed: bool) -> Result<bool, Response> {
        let in_range = date_field(record, "spent_at")
            .is_some_and(|day| day >= self.from && day <= self.to);
        let since = crate::parse_since(&self.params)?;
        Ok(in_range
            && updated_after(record, since)
            && (self.flag("only_billed") != Some(true) || billed)
            && (self.flag("only_unbilled") != Some(true) || !billed)
            && self.flag("is_closed").map_or(true, |closed| bool_field(record, "is_closed") == closed))
    }
}

fn report(
    store: &Store,
    collection: &'static str,
    root: &'static str,
    params: Params,
    scope: impl Fn(&Criteria, &Record) -> bool,
) -> Response {
    let criteria = match Criteria::parse(params) {
        Ok(criteria) => criteria,
        Err(response) => return response,
    };
    let mut items = Vec::new();
    for record in store.all(collection) {
        let billed = if collection == EXPENSES {
            u64_field(record, "invoice_id").is_some()
        } else {
            bool_field(record, "is_billed")
        };
        match criteria.admits(record, billed) {
            Ok(true) if scope(&criteria, record) => items.push(wrap(root, record)),
            Ok(_) => {}
            Err(response) => return response,
        }
    }
    debug!(collection, count = items.len(), "report");
    Json(items).into_response()
}

async fn user_entries(
    State(db): State<Db>,
    Path(user): Path<u64>,
    Query(params): Query<Params>,
) -> Response {
    let store = db.read().await;
    if store.get(PEOPLE, user).is_none() {
        return StatusCode::NOT_FOUND.into_response();
    }
    report(&store, ENTRIES, "day_entry", params, |criteria, entry| {
        owned_by(entry, user)
            && criteria.flag("billable").map_or(true, |billable| bool_field(entry, "billable") == billable)
            && criteria.id("project_id").map_or(true, |project| u64_field(entry, "project_id") == Some(project))
    })
}

async fn project_entries(
    State(db): State<Db>,
    Path(project): Path<u64>,
    Query(params): Query<Params>,
) -> Response {
    let store = db.read().await;
    if store.get(PROJECTS, project).is_none() {
        return StatusCode::NOT_FOUND.into_response();
    }
    report(&store, ENTRIES, "day_entry", params, |criteria, entry| {
        u64_field(entry, "project_id") == Some(project)
            && criteria.flag("billable").map_or(true, |billable| bool_field(entry, "billable") == billable)
            && criteria.id("user_id").map_or(true, |user| owned_by(entry, user))
    })
}

async fn user_expenses(
    State(db): State<Db>,
    Path(user): Path<u64>,
    Query(params): Query<Params>,
) -> Response {
    let store = db.read().await;
    if store.get(PEOPLE, user).is_none() {
        return StatusCode::NOT_FOUND.into_response();
    }
    report(&store, EXPENSES, "expense", params, |_, expense| owned_by(expense, user))
}

async fn project_expenses(
    State(db): State<Db>,
    Path(project): Path<u64>,
    Query(params): Query<Params>,
) -> Response {
    let store = db.read().await;
    if store.get(PROJECTS, project).is_none() {
        return StatusCode::NOT_FOUND.into_response();
    }
    report(&store, EXPENSES, "expense", params, |_, expense| {
        u64_field(expense, "project_id") == Some(project)
    })
}
