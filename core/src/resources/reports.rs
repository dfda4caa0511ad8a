//! Time and expense reports over a date range.
//!
//! The service only answers these for admins.

use chrono::{NaiveDate, NaiveDateTime};

use super::updated_since;
use crate::client::{Call, HarvestClient};
use crate::params;
use crate::request::{ApiRequest, Operation};
use crate::types::{DayEntry, Expense};

/// Criteria for time entry reports. The date range is mandatory; every
/// other criterion is a filter that is only sent when set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFilter {
    pub from: NaiveDate,
    pub to: NaiveDate,
    /// Only honoured by user reports.
    pub project_id: Option<u64>,
    /// Only honoured by project reports.
    pub user_id: Option<u64>,
    pub billable: Option<bool>,
    /// `true` keeps invoiced entries, `false` keeps uninvoiced ones.
    pub billed: Option<bool>,
    pub closed: Option<bool>,
    pub updated_since: Option<NaiveDateTime>,
}

impl EntryFilter {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from,
            to,
            project_id: None,
            user_id: None,
            billable: None,
            billed: None,
            closed: None,
            updated_since: None,
        }
    }

    pub fn project(mut self, project_id: u64) -> Self {
        self.project_id = Some(project_id);
        self
    }

    pub fn user(mut self, user_id: u64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn billable(mut self, billable: bool) -> Self {
        self.billable = Some(billable);
        self
    }

    pub fn billed(mut self, billed: bool) -> Self {
        self.billed = Some(billed);
        self
    }

    pub fn closed(mut self, closed: bool) -> Self {
        self.closed = Some(closed);
        self
    }

    pub fn updated_since(mut self, since: NaiveDateTime) -> Self {
        self.updated_since = Some(since);
        self
    }

    fn apply(&self, request: ApiRequest) -> ApiRequest {
        let request = range(request, self.from, self.to)
            .query_opt(params::PROJECT_ID, self.project_id)
            .query_opt(params::USER_ID, self.user_id)
            .query_opt(params::BILLABLE, self.billable.map(params::yes_no));
        let request = tri_state(request, self.billed, self.closed);
        updated_since(request, self.updated_since)
    }
}

/// Criteria for expense reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseFilter {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub billed: Option<bool>,
    pub closed: Option<bool>,
    pub updated_since: Option<NaiveDateTime>,
}

impl ExpenseFilter {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from,
            to,
            billed: None,
            closed: None,
            updated_since: None,
        }
    }

    pub fn billed(mut self, billed: bool) -> Self {
        self.billed = Some(billed);
        self
    }

    pub fn closed(mut self, closed: bool) -> Self {
        self.closed = Some(closed);
        self
    }

    pub fn updated_since(mut self, since: NaiveDateTime) -> Self {
        self.updated_since = Some(since);
        self
    }

    fn apply(&self, request: ApiRequest) -> ApiRequest {
        let request = tri_state(range(request, self.from, self.to), self.billed, self.closed);
        updated_since(request, self.updated_since)
    }
}

fn range(request: ApiRequest, from: NaiveDate, to: NaiveDate) -> ApiRequest {
    request
        .query(params::FROM, params::compact_date(from))
        .query(params::TO, params::compact_date(to))
}

fn tri_state(request: ApiRequest, billed: Option<bool>, closed: Option<bool>) -> ApiRequest {
    let request = match billed {
        Some(true) => request.query(params::ONLY_BILLED, params::yes_no(true)),
        Some(false) => request.query(params::ONLY_UNBILLED, params::yes_no(true)),
        None => request,
    };
    request.query_opt(params::IS_CLOSED, closed.map(params::yes_no))
}

pub struct ReportsResource<'c, T> {
    client: &'c HarvestClient<T>,
}

impl<'c, T> ReportsResource<'c, T> {
    pub(crate) fn new(client: &'c HarvestClient<T>) -> Self {
        Self { client }
    }

    /// Time logged by one user.
    pub fn user_entries(&self, user_id: u64, filter: &EntryFilter) -> Call<'c, T, Vec<DayEntry>> {
        let path = format!("{}/{user_id}/{}", params::PEOPLE, params::ENTRIES);
        self.client
            .call(Ok(Operation::many(filter.apply(ApiRequest::get(path)))))
    }

    /// Time logged against one project.
    pub fn project_entries(&self, project_id: u64, filter: &EntryFilter) -> Call<'c, T, Vec<DayEntry>> {
        let path = format!("{}/{project_id}/{}", params::PROJECTS, params::ENTRIES);
        self.client
            .call(Ok(Operation::many(filter.apply(ApiRequest::get(path)))))
    }

    pub fn user_expenses(&self, user_id: u64, filter: &ExpenseFilter) -> Call<'c, T, Vec<Expense>> {
        let path = format!("{}/{user_id}/{}", params::PEOPLE, params::EXPENSES);
        self.client
            .call(Ok(Operation::many(filter.apply(ApiRequest::get(path)))))
    }

    pub fn project_expenses(&self, project_id: u64, filter: &ExpenseFilter) -> Call<'c, T, Vec<Expense>> {
        let path = format!("{}/{project_id}/{}", params::PROJECTS, params::EXPENSES);
        self.client
            .call(Ok(Operation::many(filter.apply(ApiRequest::get(path)))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fake_client, FakeTransport, BASE_URL};

    fn december() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2014, 12, 19).unwrap(),
            NaiveDate::from_ymd_opt(2014, 12, 20).unwrap(),
        )
    }

    #[test]
    fn range_alone_is_always_sent() {
        let (from, to) = december();
        let request = EntryFilter::new(from, to).apply(ApiRequest::get("people/1/entries"));
        assert_eq!(request.query_value("from"), Some("20141219"));
        assert_eq!(request.query_value("to"), Some("20141220"));
        assert_eq!(request.query.len(), 2);
    }

    #[test]
    fn billed_maps_to_one_of_two_parameters() {
        let (from, to) = december();
        let billed = EntryFilter::new(from, to).billed(true).apply(ApiRequest::get("x"));
        assert_eq!(billed.query_value("only_billed"), Some("yes"));
        assert_eq!(billed.query_value("only_unbilled"), None);

        let unbilled = EntryFilter::new(from, to).billed(false).apply(ApiRequest::get("x"));
        assert_eq!(unbilled.query_value("only_unbilled"), Some("yes"));
        assert_eq!(unbilled.query_value("only_billed"), None);
    }

    #[test]
    fn billable_and_closed_use_yes_no() {
        let (from, to) = december();
        let request = EntryFilter::new(from, to)
            .billable(false)
            .closed(true)
            .apply(ApiRequest::get("x"));
        assert_eq!(request.query_value("billable"), Some("no"));
        assert_eq!(request.query_value("is_closed"), Some("yes"));
    }

    #[test]
    fn user_entries_hits_people_entries() {
        let fake = FakeTransport::new();
        fake.respond(
            200,
            r#"[{"day_entry":{"id":1,"notes":"Test DO NOT DELETE","spent_at":"2014-12-19"}}]"#,
        );
        let (from, to) = december();
        let entries = fake_client(&fake)
            .reports()
            .user_entries(7, &EntryFilter::new(from, to).billable(false))
            .send()
            .unwrap();
        assert_eq!(entries[0].notes.as_deref(), Some("Test DO NOT DELETE"));
        assert_eq!(
            fake.requests()[0].url,
            format!("{BASE_URL}/people/7/entries?from=20141219&to=20141220&billable=no")
        );
    }

    #[test]
    fn expense_reports_scope_by_project() {
        let client = fake_client(&FakeTransport::new());
        let (from, to) = december();
        let operation = client
            .reports()
            .project_expenses(5, &ExpenseFilter::new(from, to).billed(false))
            .into_operation()
            .unwrap();
        assert_eq!(operation.request().path, "projects/5/expenses");
        assert_eq!(operation.request().query_value("only_unbilled"), Some("yes"));
    }
}
