//! Payments recorded against an invoice.

use super::{invoices, require};
use crate::client::{Call, HarvestClient};
use crate::error::HarvestError;
use crate::params;
use crate::request::{ApiRequest, Operation};
use crate::types::{Payment, PaymentOptions};

const ROOT: &str = "payment";

/// Payments recorded against an invoice.
pub struct InvoicePaymentsResource<'c, T> {
    client: &'c HarvestClient<T>,
}

impl<'c, T> InvoicePaymentsResource<'c, T> {
    pub(crate) fn new(client: &'c HarvestClient<T>) -> Self {
        Self { client }
    }

    pub fn list(&self, invoice_id: u64) -> Call<'c, T, Vec<Payment>> {
        self.client
            .call(Ok(Operation::many(ApiRequest::get(payments_path(invoice_id)))))
    }

    pub fn get(&self, invoice_id: u64, payment_id: u64) -> Call<'c, T, Payment> {
        let path = format!("{}/{payment_id}", payments_path(invoice_id));
        self.client.call(Ok(Operation::one(ApiRequest::get(path))))
    }

    /// Record a payment. `amount` and `paid_at` are required.
    pub fn create(&self, invoice_id: u64, options: &PaymentOptions) -> Call<'c, T, Payment> {
        self.client.call(create_operation(invoice_id, options))
    }

    pub fn delete(&self, invoice_id: u64, payment_id: u64) -> Call<'c, T, bool> {
        let path = format!("{}/{payment_id}", payments_path(invoice_id));
        self.client.call(Ok(Operation::status(ApiRequest::delete(path))))
    }
}

fn payments_path(invoice_id: u64) -> String {
    format!("{}/{}", invoices::path(invoice_id), params::PAYMENTS)
}

fn create_operation(invoice_id: u64, options: &PaymentOptions) -> Result<Operation<Payment>, HarvestError> {
    require(options.amount, "amount")?;
    require(options.paid_at, "paid_at")?;
    let request = ApiRequest::post(payments_path(invoice_id)).json_root(ROOT, options)?;
    Ok(Operation::one(request).follow_location())
}
