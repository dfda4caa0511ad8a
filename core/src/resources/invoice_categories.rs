//! Invoice item categories.

use super::require_text;
use crate::client::{Call, HarvestClient};
use crate::error::HarvestError;
use crate::params;
use crate::request::{ApiRequest, Operation};
use crate::types::{InvoiceItemCategory, InvoiceItemCategoryOptions};

const ROOT: &str = "invoice_item_category";

/// Categories for invoice line items.
pub struct InvoiceCategoriesResource<'c, T> {
    client: &'c HarvestClient<T>,
}

impl<'c, T> InvoiceCategoriesResource<'c, T> {
    pub(crate) fn new(client: &'c HarvestClient<T>) -> Self {
        Self { client }
    }

    pub fn list(&self) -> Call<'c, T, Vec<InvoiceItemCategory>> {
        let request = ApiRequest::get(params::INVOICE_ITEM_CATEGORIES);
        self.client.call(Ok(Operation::many(request)))
    }

    pub fn get(&self, id: u64) -> Call<'c, T, InvoiceItemCategory> {
        self.client.call(Ok(Operation::one(ApiRequest::get(path(id)))))
    }

    pub fn create(&self, options: &InvoiceItemCategoryOptions) -> Call<'c, T, InvoiceItemCategory> {
        self.client.call(create_operation(options))
    }

    pub fn update(
        &self,
        id: u64,
        options: &InvoiceItemCategoryOptions,
    ) -> Call<'c, T, InvoiceItemCategory> {
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
    format!("{}/{id}", params::INVOICE_ITEM_CATEGORIES)
}

fn create_operation(
    options: &InvoiceItemCategoryOptions,
) -> Result<Operation<InvoiceItemCategory>, HarvestError> {
    require_text(options.name.as_deref(), "name")?;
    let request = ApiRequest::post(params::INVOICE_ITEM_CATEGORIES).json_root(ROOT, options)?;
    Ok(Operation::one(request).follow_location())
}
