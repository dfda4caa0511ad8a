//! Invoices and the filter used to list them.
//!
//! Listing is paged by the service; [`InvoiceFilter::page`] selects a page
//! and page 1 is requested without a `page` parameter.

use chrono::{NaiveDate, NaiveDateTime};

use super::{require, updated_since};
use crate::client::{Call, HarvestClient};
use crate::error::HarvestError;
use crate::params;
use crate::request::{ApiRequest, Operation};
use crate::types::{Invoice, InvoiceOptions, InvoiceState};

const ROOT: &str = "invoice";

/// Narrows `invoices().list`. Every criterion is optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceFilter {
    /// One-based page number; page 1 is not sent.
    pub page: u32,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub updated_since: Option<NaiveDateTime>,
    pub status: Option<InvoiceState>,
    pub client_id: Option<u64>,
}

impl Default for InvoiceFilter {
    fn default() -> Self {
        Self {
            page: 1,
            from: None,
            to: None,
            updated_since: None,
            status: None,
            client_id: None,
        }
    }
}

impl InvoiceFilter {
    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    pub fn status(mut self, status: InvoiceState) -> Self {
        self.status = Some(status);
        self
    }

    pub fn client(mut self, client_id: u64) -> Self {
        self.client_id = Some(client_id);
        self
    }

    fn apply(&self, mut request: ApiRequest) -> ApiRequest {
        if self.page > 1 {
            request = request.query(params::PAGE, self.page);
        }
        let request = request
            .query_opt(params::FROM, self.from.map(params::compact_date))
            .query_opt(params::TO, self.to.map(params::compact_date));
        updated_since(request, self.updated_since)
            .query_opt(params::STATUS, self.status.map(InvoiceState::as_str))
            .query_opt(params::CLIENT, self.client_id)
    }
}

pub struct InvoicesResource<'c, T> {
    client: &'c HarvestClient<T>,
}

impl<'c, T> InvoicesResource<'c, T> {
    pub(crate) fn new(client: &'c HarvestClient<T>) -> Self {
        Self { client }
    }

    pub fn list(&self, filter: &InvoiceFilter) -> Call<'c, T, Vec<Invoice>> {
        let request = filter.apply(ApiRequest::get(params::INVOICES));
        self.client.call(Ok(Operation::many(request)))
    }

    pub fn get(&self, id: u64) -> Call<'c, T, Invoice> {
        self.client.call(Ok(Operation::one(ApiRequest::get(path(id)))))
    }

    /// Create an invoice. `kind`, `client_id` and `issued_at` are required.
    pub fn create(&self, options: &InvoiceOptions) -> Call<'c, T, Invoice> {
        self.client.call(create_operation(options))
    }

    pub fn update(&self, id: u64, options: &InvoiceOptions) -> Call<'c, T, Invoice> {
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

pub(crate) fn path(id: u64) -> String {
    format!("{}/{id}", params::INVOICES)
}

fn create_operation(options: &InvoiceOptions) -> Result<Operation<Invoice>, HarvestError> {
    require(options.kind, "kind")?;
    require(options.client_id, "client_id")?;
    require(options.issued_at, "issued_at")?;
    let request = ApiRequest::post(params::INVOICES).json_root(ROOT, options)?;
    Ok(Operation::one(request).follow_location())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::InvoiceKind;
    use crate::testing::{fake_client, FakeTransport, BASE_URL};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn default_filter_sends_no_parameters() {
        let request = InvoiceFilter::default().apply(ApiRequest::get("invoices"));
        assert!(request.query.is_empty());
        let request = InvoiceFilter::default().page(1).apply(ApiRequest::get("invoices"));
        assert!(request.query.is_empty());
    }

    #[test]
    fn filter_formats_every_criterion() {
        let filter = InvoiceFilter::default()
            .page(3)
            .between(date(2014, 1, 1), date(2014, 12, 31))
            .status(InvoiceState::Partial)
            .client(42);
        let request = filter.apply(ApiRequest::get("invoices"));
        let pairs: Vec<(&str, &str)> = request
            .query
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("page", "3"),
                ("from", "20140101"),
                ("to", "20141231"),
                ("status", "partial"),
                ("client", "42"),
            ]
        );
    }

    #[test]
    fn list_builds_query_string() {
        let fake = FakeTransport::new();
        fake.respond(200, "[]");
        let invoices = fake_client(&fake)
            .invoices()
            .list(&InvoiceFilter::default().status(InvoiceState::Draft))
            .send()
            .unwrap();
        assert!(invoices.is_empty());
        assert_eq!(fake.requests()[0].url, format!("{BASE_URL}/invoices?status=draft"));
    }

    #[test]
    fn create_requires_kind_client_and_date() {
        let client = fake_client(&FakeTransport::new());
        let missing_client = InvoiceOptions {
            client_id: None,
            ..InvoiceOptions::new(InvoiceKind::FreeForm, 1, date(2014, 12, 19))
        };
        let err = client.invoices().create(&missing_client).into_operation().unwrap_err();
        assert!(matches!(err, HarvestError::InvalidArgument(ref msg) if msg.contains("client_id")));
    }
}
