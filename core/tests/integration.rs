//! End-to-end tests against the fake Harvest server.
//!
//! # Design
//! Each test starts its own mock server on a random port so state never leaks
//! between tests. Blocking tests drive the client through `UreqTransport`;
//! async tests use `ReqwestTransport` inside the test's tokio runtime.

use chrono::NaiveDate;
use harvest_core::{
    CancellationToken, ClientOptions, EntryFilter, ExpenseCategoryOptions, ExpenseOptions,
    HarvestClient, HarvestConfig, HarvestError, InvoiceItem, InvoiceKind, InvoiceOptions,
    InvoiceState, PaymentOptions, ReqwestTransport, UreqTransport, UserOptions,
};
use mock_server::store::{CURRENT_USER, FIXTURE_CLIENT, FIXTURE_NOTE, FIXTURE_PROJECT, FIXTURE_TASK};
use rust_decimal::Decimal;

/// Start the mock server on its own thread and return its base url.
fn spawn_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn config(base_url: &str) -> HarvestConfig {
    HarvestConfig::builder()
        .base_url(base_url)
        .basic_auth("admin@example.com", "secret")
        .build()
        .unwrap()
}

fn blocking_client() -> HarvestClient<UreqTransport> {
    HarvestClient::new(config(&spawn_server()), UreqTransport::default())
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[test]
fn client_crud_lifecycle() {
    let client = blocking_client();

    // Create echoes back the stored record.
    let created = client
        .clients()
        .create(&ClientOptions::new("Integration Client"))
        .send()
        .unwrap();
    assert_eq!(created.name.as_deref(), Some("Integration Client"));
    assert_eq!(created.active, Some(true));
    let id = created.id;

    // Update changes only the supplied fields.
    let details = ClientOptions {
        details: Some("Second floor".to_string()),
        ..ClientOptions::default()
    };
    let updated = client.clients().update(id, &details).send().unwrap();
    assert_eq!(updated.name.as_deref(), Some("Integration Client"));
    assert_eq!(updated.details.as_deref(), Some("Second floor"));

    let toggled = client.clients().toggle(id).send().unwrap();
    assert_eq!(toggled.active, Some(false));

    let listed = client.clients().list(None).send().unwrap();
    assert!(listed.iter().any(|c| c.id == id));

    assert!(client.clients().delete(id).send().unwrap());
    assert!(!client.clients().delete(id).send().unwrap());
    let err = client.clients().get(id).send().unwrap_err();
    assert!(matches!(err, HarvestError::NotFound));
}

#[test]
fn who_am_i_reports_the_fixture_admin() {
    let client = blocking_client();
    let account = client.account().who_am_i().send().unwrap();
    assert_eq!(account.user.id, CURRENT_USER);
}

#[test]
fn project_toggle_reports_status() {
    let client = blocking_client();
    assert!(client.projects().toggle(FIXTURE_PROJECT).send().unwrap());
    let project = client.projects().get(FIXTURE_PROJECT).send().unwrap();
    assert_eq!(project.active, Some(false));
    assert!(!client.projects().toggle(9_999).send().unwrap());
}

#[test]
fn people_toggle_returns_refreshed_user() {
    let client = blocking_client();
    let person = client
        .people()
        .create(&UserOptions::new("new.hire@example.com", "New", "Hire"))
        .send()
        .unwrap();
    assert_eq!(person.is_active, Some(true));

    let toggled = client.people().toggle(person.id).send().unwrap();
    assert_eq!(toggled.id, person.id);
    assert_eq!(toggled.is_active, Some(false));

    let by_email = client
        .people()
        .get_by_email("new.hire@example.com")
        .send()
        .unwrap();
    assert_eq!(by_email.id, person.id);
}

#[test]
fn task_assignment_links_fixture_task() {
    let client = blocking_client();
    let assignment = client
        .task_assignments()
        .create(FIXTURE_PROJECT, FIXTURE_TASK)
        .send()
        .unwrap();
    assert_eq!(assignment.task_id, Some(FIXTURE_TASK));

    let fetched = client
        .task_assignments()
        .get(FIXTURE_PROJECT, assignment.id)
        .send()
        .unwrap();
    assert_eq!(fetched.id, assignment.id);

    let err = client
        .task_assignments()
        .create_with_new_task(FIXTURE_PROJECT, "  ")
        .send()
        .unwrap_err();
    assert!(matches!(err, HarvestError::InvalidArgument(_)));
}

fn line_item() -> InvoiceItem {
    InvoiceItem {
        kind: "Service".to_string(),
        description: "Design, phase 1".to_string(),
        quantity: Decimal::new(2, 0),
        unit_price: Decimal::new(50, 0),
        amount: Decimal::new(100, 0),
        taxed: false,
        taxed2: false,
        project_id: Some(FIXTURE_PROJECT),
    }
}

fn draft_invoice(client: &HarvestClient<UreqTransport>) -> u64 {
    let options = InvoiceOptions::new(InvoiceKind::FreeForm, FIXTURE_CLIENT, date(2014, 12, 19))
        .with_line_items(&[line_item()]);
    let invoice = client.invoices().create(&options).send().unwrap();
    assert_eq!(invoice.state, Some(InvoiceState::Draft));
    invoice.id
}

#[test]
fn invoice_state_sequence() {
    let client = blocking_client();
    let id = draft_invoice(&client);
    let messages = client.invoice_messages();
    let state = || client.invoices().get(id).send().unwrap().state;

    // A draft cannot be closed.
    assert!(!messages.mark_closed(id, None).send().unwrap());
    assert_eq!(state(), Some(InvoiceState::Draft));

    assert!(messages.mark_sent(id, Some("first send")).send().unwrap());
    assert_eq!(state(), Some(InvoiceState::Open));

    assert!(messages.mark_draft(id).send().unwrap());
    assert_eq!(state(), Some(InvoiceState::Draft));

    assert!(messages.mark_sent(id, None).send().unwrap());
    assert!(messages.mark_closed(id, Some("closing")).send().unwrap());
    assert_eq!(state(), Some(InvoiceState::Closed));

    assert!(messages.reopen(id, None).send().unwrap());
    assert_eq!(state(), Some(InvoiceState::Open));
    assert!(!messages.reopen(id, None).send().unwrap());

    let bodies: Vec<String> = messages
        .list(id)
        .send()
        .unwrap()
        .into_iter()
        .filter_map(|message| message.body)
        .collect();
    assert_eq!(bodies, vec!["first send".to_string(), "closing".to_string()]);
}

#[test]
fn partial_payment_leaves_amount_due() {
    let client = blocking_client();
    let id = draft_invoice(&client);
    assert!(client.invoice_messages().mark_sent(id, None).send().unwrap());

    let paid_at = date(2014, 12, 20).and_hms_opt(10, 0, 0).unwrap().and_utc();
    let payment = client
        .invoice_payments()
        .create(id, &PaymentOptions::new(Decimal::new(40, 0), paid_at))
        .send()
        .unwrap();
    assert_eq!(payment.amount, Some(Decimal::new(40, 0)));
    assert_eq!(payment.paid_at, Some(paid_at));

    let invoice = client.invoices().get(id).send().unwrap();
    assert_eq!(invoice.state, Some(InvoiceState::Partial));
    assert_eq!(invoice.due_amount, Some(Decimal::new(60, 0)));
}

#[test]
fn billed_filters_partition_fixture_entries() {
    let client = blocking_client();
    let range = EntryFilter::new(date(2014, 12, 19), date(2014, 12, 20));

    let unbilled = client
        .reports()
        .user_entries(CURRENT_USER, &range.clone().billed(false))
        .send()
        .unwrap();
    assert_eq!(unbilled.len(), 2);
    assert!(unbilled
        .iter()
        .all(|entry| entry.notes.as_deref() == Some(FIXTURE_NOTE)));

    let billed = client
        .reports()
        .user_entries(CURRENT_USER, &range.clone().billed(true))
        .send()
        .unwrap();
    assert!(billed.is_empty());

    let non_billable = client
        .reports()
        .project_entries(FIXTURE_PROJECT, &range.billable(false))
        .send()
        .unwrap();
    assert_eq!(non_billable.len(), 2);
}

#[test]
fn receipts_are_checked_before_upload() {
    let client = blocking_client();
    let category = client
        .expense_categories()
        .create(&ExpenseCategoryOptions::new("Travel"))
        .send()
        .unwrap();
    let options = ExpenseOptions::new(date(2014, 12, 19), FIXTURE_PROJECT, category.id)
        .with_total_cost(Decimal::new(1250, 2));
    let expense = client.expenses().create(&options, None).send().unwrap();
    assert_eq!(expense.has_receipt, Some(false));

    let err = client
        .expenses()
        .attach_receipt(expense.id, b"MZ".to_vec(), "receipt.exe", None)
        .send()
        .unwrap_err();
    assert!(matches!(err, HarvestError::InvalidArgument(_)));

    let refreshed = client
        .expenses()
        .attach_receipt(expense.id, b"%PDF-1.4".to_vec(), "receipt.PDF", None)
        .send()
        .unwrap();
    assert_eq!(refreshed.id, expense.id);
    assert_eq!(refreshed.has_receipt, Some(true));
}

#[test]
fn daily_by_day_of_year_lists_fixture_entries() {
    let client = blocking_client();
    let daily = client.time_tracking().daily_on(353, 2014, None).send().unwrap();
    assert_eq!(daily.for_day, Some(date(2014, 12, 19)));
    assert_eq!(daily.day_entries.len(), 1);
    assert_eq!(daily.day_entries[0].notes.as_deref(), Some(FIXTURE_NOTE));
    assert!(daily.projects.iter().any(|project| project.id == FIXTURE_PROJECT));
}

async fn async_client() -> HarvestClient<ReqwestTransport> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run(listener));
    HarvestClient::new(config(&format!("http://{addr}")), ReqwestTransport::default())
}

#[tokio::test]
async fn timer_starts_and_stops_over_async_transport() {
    let client = async_client().await;
    let cancel = CancellationToken::new();

    let timer = client
        .time_tracking()
        .start_timer(date(2015, 1, 5), FIXTURE_PROJECT, FIXTURE_TASK, Some("pairing"), None)
        .send_async(&cancel)
        .await
        .unwrap();
    assert!(timer.is_running());
    assert_eq!(timer.notes.as_deref(), Some("pairing"));

    let stopped = client
        .time_tracking()
        .toggle_timer(timer.id, None)
        .send_async(&cancel)
        .await
        .unwrap();
    assert!(!stopped.is_running());

    assert!(client
        .time_tracking()
        .delete(timer.id, None)
        .send_async(&cancel)
        .await
        .unwrap());
}

#[tokio::test]
async fn cancelled_token_stops_the_call() {
    let client = async_client().await;
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = client
        .clients()
        .list(None)
        .send_async(&cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, HarvestError::Cancelled));
}
