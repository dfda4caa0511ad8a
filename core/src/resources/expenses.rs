//! Expenses and receipt uploads.
//!
//! # Design
//! Amount rules are checked before anything is sent: a create needs exactly
//! one of `total_cost` or `units`, an update may carry neither but not both.
//! A receipt upload is a multipart POST followed by a GET of the expense,
//! and the file extension decides the part's content type.

use std::path::Path;

use super::{of_user, require};
use crate::client::{Call, HarvestClient};
use crate::error::HarvestError;
use crate::params;
use crate::request::{ApiRequest, FilePart, Operation};
use crate::types::{Expense, ExpenseOptions};

const ROOT: &str = "expense";
const RECEIPT_FIELD: &str = "expense[receipt]";

/// Expenses of the authenticated user, or of `of_user` when an admin acts
/// on someone else's behalf.
pub struct ExpensesResource<'c, T> {
    client: &'c HarvestClient<T>,
}

impl<'c, T> ExpensesResource<'c, T> {
    pub(crate) fn new(client: &'c HarvestClient<T>) -> Self {
        Self { client }
    }

    pub fn list(&self, user: Option<u64>) -> Call<'c, T, Vec<Expense>> {
        let request = of_user(ApiRequest::get(params::EXPENSES), user);
        self.client.call(Ok(Operation::many(request)))
    }

    pub fn get(&self, id: u64, user: Option<u64>) -> Call<'c, T, Expense> {
        let request = of_user(ApiRequest::get(path(id)), user);
        self.client.call(Ok(Operation::one(request)))
    }

    /// Create an expense. `spent_at`, `project_id` and `expense_category_id`
    /// are required, and exactly one of `total_cost` or `units` must be set.
    pub fn create(&self, options: &ExpenseOptions, user: Option<u64>) -> Call<'c, T, Expense> {
        self.client.call(create_operation(options, user))
    }

    /// Change only the fields set in `options`. Setting both `total_cost`
    /// and `units` is rejected.
    pub fn update(&self, id: u64, options: &ExpenseOptions, user: Option<u64>) -> Call<'c, T, Expense> {
        self.client.call(update_operation(id, options, user))
    }

    pub fn delete(&self, id: u64, user: Option<u64>) -> Call<'c, T, bool> {
        let request = of_user(ApiRequest::delete(path(id)), user);
        self.client.call(Ok(Operation::status(request)))
    }

    /// Upload a receipt image or PDF, then return the refreshed expense.
    ///
    /// Only `png`, `gif`, `pdf`, `jpg` and `jpeg` files are accepted; any
    /// other extension fails locally.
    pub fn attach_receipt(
        &self,
        id: u64,
        bytes: Vec<u8>,
        file_name: &str,
        user: Option<u64>,
    ) -> Call<'c, T, Expense> {
        self.client.call(receipt_operation(id, bytes, file_name, user))
    }
}

fn path(id: u64) -> String {
    format!("{}/{id}", params::EXPENSES)
}

const BOTH_AMOUNTS: &str = "only one of total_cost or units may be set";

fn create_operation(options: &ExpenseOptions, user: Option<u64>) -> Result<Operation<Expense>, HarvestError> {
    require(options.spent_at, "spent_at")?;
    require(options.project_id, "project_id")?;
    require(options.expense_category_id, "expense_category_id")?;
    match (options.total_cost, options.units) {
        (Some(_), Some(_)) => return Err(HarvestError::invalid(BOTH_AMOUNTS)),
        (None, None) => {
            return Err(HarvestError::invalid(
                "either total_cost or units must be set",
            ))
        }
        _ => {}
    }
    let request = of_user(ApiRequest::post(params::EXPENSES), user).json_root(ROOT, options)?;
    Ok(Operation::one(request).follow_location())
}

fn update_operation(
    id: u64,
    options: &ExpenseOptions,
    user: Option<u64>,
) -> Result<Operation<Expense>, HarvestError> {
    if options.total_cost.is_some() && options.units.is_some() {
        return Err(HarvestError::invalid(BOTH_AMOUNTS));
    }
    let request = of_user(ApiRequest::put(path(id)), user).json_root(ROOT, options)?;
    Ok(Operation::one(request).follow_location())
}

fn receipt_operation(
    id: u64,
    bytes: Vec<u8>,
    file_name: &str,
    user: Option<u64>,
) -> Result<Operation<Expense>, HarvestError> {
    let content_type = receipt_content_type(file_name)?;
    let part = FilePart {
        field: RECEIPT_FIELD.to_string(),
        file_name: file_name.to_string(),
        content_type: content_type.to_string(),
        bytes,
    };
    let upload = of_user(
        ApiRequest::post(format!("{}/{}", path(id), params::RECEIPT)),
        user,
    )
    .file(part);
    let refresh = of_user(ApiRequest::get(path(id)), user);
    Ok(Operation::one(upload).then_fetch(refresh))
}

fn receipt_content_type(file_name: &str) -> Result<&'static str, HarvestError> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("png") => Ok("image/png"),
        Some("gif") => Ok("image/gif"),
        Some("pdf") => Ok("application/pdf"),
        Some("jpg" | "jpeg") => Ok("image/jpeg"),
        _ => Err(HarvestError::invalid(format!(
            "unsupported receipt file type: {file_name}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::*;
    use crate::http::HttpMethod;
    use crate::request::{FollowUp, RequestBody};
    use crate::testing::{fake_client, FakeTransport, BASE_URL};

    fn options() -> ExpenseOptions {
        ExpenseOptions::new(NaiveDate::from_ymd_opt(2014, 12, 19).unwrap(), 1, 2)
    }

    #[test]
    fn create_needs_exactly_one_amount() {
        let client = fake_client(&FakeTransport::new());
        let expenses = client.expenses();

        let neither = expenses.create(&options(), None).into_operation().unwrap_err();
        assert!(matches!(neither, HarvestError::InvalidArgument(_)));

        let both = options()
            .with_total_cost(Decimal::new(10, 0))
            .with_units(Decimal::new(3, 0));
        let err = expenses.create(&both, None).into_operation().unwrap_err();
        assert!(matches!(err, HarvestError::InvalidArgument(ref msg) if msg == BOTH_AMOUNTS));

        let ok = options().with_units(Decimal::new(3, 0));
        assert!(expenses.create(&ok, None).into_operation().is_ok());
    }

    #[test]
    fn update_rejects_both_amounts_but_allows_neither() {
        let client = fake_client(&FakeTransport::new());
        let both = ExpenseOptions::default()
            .with_total_cost(Decimal::new(10, 0))
            .with_units(Decimal::new(3, 0));
        assert!(client.expenses().update(5, &both, None).into_operation().is_err());

        let notes_only = ExpenseOptions {
            notes: Some("lunch".to_string()),
            ..ExpenseOptions::default()
        };
        let operation = client
            .expenses()
            .update(5, &notes_only, Some(7))
            .into_operation()
            .unwrap();
        assert_eq!(operation.request().query_value("of_user"), Some("7"));
    }

    #[test]
    fn receipt_extension_whitelist() {
        assert_eq!(receipt_content_type("scan.PNG").unwrap(), "image/png");
        assert_eq!(receipt_content_type("a.gif").unwrap(), "image/gif");
        assert_eq!(receipt_content_type("a.pdf").unwrap(), "application/pdf");
        assert_eq!(receipt_content_type("a.jpg").unwrap(), "image/jpeg");
        assert_eq!(receipt_content_type("a.Jpeg").unwrap(), "image/jpeg");
        for name in ["a.txt", "a.exe", "noext", "png"] {
            assert!(receipt_content_type(name).is_err(), "{name}");
        }
    }

    #[test]
    fn rejected_receipt_makes_no_request() {
        let fake = FakeTransport::new();
        let err = fake_client(&fake)
            .expenses()
            .attach_receipt(5, b"hello".to_vec(), "notes.txt", None)
            .send()
            .unwrap_err();
        assert!(matches!(err, HarvestError::InvalidArgument(_)));
        assert!(fake.requests().is_empty());
    }

    #[test]
    fn receipt_upload_then_refetches_expense() {
        let fake = FakeTransport::new();
        fake.respond(200, "");
        fake.respond(200, r#"{"expense":{"id":5,"has_receipt":true}}"#);
        let client = fake_client(&fake);

        let operation = client
            .expenses()
            .attach_receipt(5, b"%PDF".to_vec(), "r.pdf", None)
            .into_operation()
            .unwrap();
        assert!(matches!(operation.follow_up(), FollowUp::Fetch(_)));
        match &operation.request().body {
            Some(RequestBody::File(part)) => {
                assert_eq!(part.field, "expense[receipt]");
                assert_eq!(part.content_type, "application/pdf");
            }
            other => panic!("unexpected body {other:?}"),
        }

        let expense = client.execute_typed(&operation).unwrap();
        assert_eq!(expense.has_receipt, Some(true));
        let requests = fake.requests();
        assert_eq!(requests[0].url, format!("{BASE_URL}/expenses/5/receipt"));
        assert_eq!(requests[1].method, HttpMethod::Get);
        assert_eq!(requests[1].url, format!("{BASE_URL}/expenses/5"));
    }
}
