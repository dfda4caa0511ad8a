//! Expense categories.

use chrono::NaiveDateTime;

use super::{require_text, updated_since};
use crate::client::{Call, HarvestClient};
use crate::error::HarvestError;
use crate::params;
use crate::request::{ApiRequest, Operation};
use crate::types::{ExpenseCategory, ExpenseCategoryOptions};

const ROOT: &str = "expense_category";

pub struct ExpenseCategoriesResource<'c, T> {
    client: &'c HarvestClient<T>,
}

impl<'c, T> ExpenseCategoriesResource<'c, T> {
    pub(crate) fn new(client: &'c HarvestClient<T>) -> Self {
        Self { client }
    }

    pub fn list(&self, since: Option<NaiveDateTime>) -> Call<'c, T, Vec<ExpenseCategory>> {
        let request = updated_since(ApiRequest::get(params::EXPENSE_CATEGORIES), since);
        self.client.call(Ok(Operation::many(request)))
    }

    pub fn get(&self, id: u64) -> Call<'c, T, ExpenseCategory> {
        self.client.call(Ok(Operation::one(ApiRequest::get(path(id)))))
    }

    /// Create a category. `name` is required.
    pub fn create(&self, options: &ExpenseCategoryOptions) -> Call<'c, T, ExpenseCategory> {
        self.client.call(create_operation(options))
    }

    pub fn update(&self, id: u64, options: &ExpenseCategoryOptions) -> Call<'c, T, ExpenseCategory> {
        let operation = ApiRequest::put(path(id))
            .json_root(ROOT, options)
            .map(|request| Operation::one(request).follow_location());
        self.client.call(operation)
    }

    pub fn delete(&self, id: u64) -> Call<'c, T, bool> {
        self.client
            .call(Ok(Operation::status(ApiRequest::delete(path(id)))))
    }
}

fn path(id: u64) -> String {
    format!("{}/{id}", params::EXPENSE_CATEGORIES)
}

fn create_operation(
    options: &ExpenseCategoryOptions,
) -> Result<Operation<ExpenseCategory>, HarvestError> {
    require_text(options.name.as_deref(), "name")?;
    let request = ApiRequest::post(params::EXPENSE_CATEGORIES).json_root(ROOT, options)?;
    Ok(Operation::one(request).follow_location())
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::testing::{fake_client, FakeTransport};

    #[test]
    fn unit_only_update_leaves_name_out_of_the_body() {
        let client = fake_client(&FakeTransport::new());
        let options = ExpenseCategoryOptions {
            unit_name: Some("Miles".to_string()),
            unit_price: Some(Decimal::new(55, 2)),
            ..ExpenseCategoryOptions::default()
        };
        let operation = client
            .expense_categories()
            .update(8, &options)
            .into_operation()
            .unwrap();
        let body = operation.request().json_body().unwrap();
        assert_eq!(body["expense_category"]["unit_name"], "Miles");
        assert!(body["expense_category"].get("name").is_none());
    }

    #[test]
    fn create_requires_name() {
        let client = fake_client(&FakeTransport::new());
        let err = client
            .expense_categories()
            .create(&ExpenseCategoryOptions::new(" "))
            .into_operation()
            .unwrap_err();
        assert!(matches!(err, HarvestError::InvalidArgument(_)));
    }
}
