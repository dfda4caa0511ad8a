//! Account users, looked up by id or by email address.
//!
//! `toggle` is a two-step operation: the toggle itself answers with an empty
//! body, so the refreshed user is fetched afterwards.

use chrono::NaiveDateTime;
use url::Url;

use super::{require_text, updated_since};
use crate::client::{Call, HarvestClient};
use crate::error::HarvestError;
use crate::params;
use crate::request::{ApiRequest, Operation};
use crate::types::{User, UserOptions};

const ROOT: &str = "user";

/// Users of the account.
pub struct PeopleResource<'c, T> {
    client: &'c HarvestClient<T>,
}

impl<'c, T> PeopleResource<'c, T> {
    pub(crate) fn new(client: &'c HarvestClient<T>) -> Self {
        Self { client }
    }

    pub fn list(&self, since: Option<NaiveDateTime>) -> Call<'c, T, Vec<User>> {
        let request = updated_since(ApiRequest::get(params::PEOPLE), since);
        self.client.call(Ok(Operation::many(request)))
    }

    pub fn get(&self, id: u64) -> Call<'c, T, User> {
        self.client.call(Ok(Operation::one(ApiRequest::get(path(id)))))
    }

    /// Look a user up by email address instead of id.
    pub fn get_by_email(&self, email: &str) -> Call<'c, T, User> {
        let operation = require_text(Some(email), "email")
            .and_then(|()| email_path(email.trim()))
            .map(|path| Operation::one(ApiRequest::get(path)));
        self.client.call(operation)
    }

    /// Create a user. `email`, `first_name` and `last_name` are required.
    pub fn create(&self, options: &UserOptions) -> Call<'c, T, User> {
        self.client.call(create_operation(options))
    }

    pub fn update(&self, id: u64, options: &UserOptions) -> Call<'c, T, User> {
        let operation = ApiRequest::put(path(id))
            .json_root(ROOT, options)
            .map(|request| Operation::one(request).follow_location());
        self.client.call(operation)
    }

    pub fn delete(&self, id: u64) -> Call<'c, T, bool> {
        self.client
            .call(Ok(Operation::status(ApiRequest::delete(path(id)))))
    }

    /// Activate or deactivate the user, then fetch the updated record.
    pub fn toggle(&self, id: u64) -> Call<'c, T, User> {
        let toggle = ApiRequest::post(format!("{}/{}", path(id), params::TOGGLE));
        let operation = Operation::one(toggle).then_fetch(ApiRequest::get(path(id)));
        self.client.call(Ok(operation))
    }

    /// Send the user a password reset email.
    pub fn reset_password(&self, id: u64) -> Call<'c, T, User> {
        let request = ApiRequest::post(format!("{}/{}", path(id), params::RESET_PASSWORD));
        self.client
            .call(Ok(Operation::one(request).follow_location()))
    }
}

fn path(id: u64) -> String {
    format!("{}/{id}", params::PEOPLE)
}

/// `people/{email}` with the address percent-encoded as one path segment.
fn email_path(email: &str) -> Result<String, HarvestError> {
    let mut url = Url::parse("http://localhost/")
        .map_err(|e| HarvestError::invalid(format!("invalid email path: {e}")))?;
    url.path_segments_mut()
        .map_err(|()| HarvestError::invalid("invalid email path"))?
        .clear()
        .push(params::PEOPLE)
        .push(email);
    Ok(url.path().trim_start_matches('/').to_string())
}

fn create_operation(options: &UserOptions) -> Result<Operation<User>, HarvestError> {
    require_text(options.email.as_deref(), "email")?;
    require_text(options.first_name.as_deref(), "first_name")?;
    require_text(options.last_name.as_deref(), "last_name")?;
    let request = ApiRequest::post(params::PEOPLE).json_root(ROOT, options)?;
    Ok(Operation::one(request).follow_location())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;
    use crate::testing::{fake_client, FakeTransport, BASE_URL};

    #[test]
    fn toggle_posts_then_fetches_user() {
        let fake = FakeTransport::new();
        fake.respond(200, "");
        fake.respond(200, r#"{"user":{"id":3,"is_active":false}}"#);
        let user = fake_client(&fake).people().toggle(3).send().unwrap();

        assert_eq!(user.is_active, Some(false));
        let requests = fake.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].method, HttpMethod::Post);
        assert_eq!(requests[0].url, format!("{BASE_URL}/people/3/toggle"));
        assert_eq!(requests[1].method, HttpMethod::Get);
        assert_eq!(requests[1].url, format!("{BASE_URL}/people/3"));
    }

    #[test]
    fn failed_toggle_skips_the_fetch() {
        let fake = FakeTransport::new();
        fake.respond(404, "");
        let err = fake_client(&fake).people().toggle(3).send().unwrap_err();
        assert!(matches!(err, HarvestError::NotFound));
        assert_eq!(fake.requests().len(), 1);
    }

    #[test]
    fn lookup_by_email_uses_the_address_as_path() {
        let client = fake_client(&FakeTransport::new());
        let operation = client
            .people()
            .get_by_email("jane@acme.test")
            .into_operation()
            .unwrap();
        assert_eq!(operation.request().path, "people/jane@acme.test");
        assert!(client.people().get_by_email("").into_operation().is_err());
    }

    #[test]
    fn email_with_reserved_characters_stays_one_segment() {
        let client = fake_client(&FakeTransport::new());
        let operation = client
            .people()
            .get_by_email("a#b/c?d@acme.test")
            .into_operation()
            .unwrap();
        assert_eq!(operation.request().path, "people/a%23b%2Fc%3Fd@acme.test");

        let http = client.build_request(operation.request()).unwrap();
        assert_eq!(http.url, format!("{BASE_URL}/people/a%23b%2Fc%3Fd@acme.test"));
    }

    #[test]
    fn create_requires_email() {
        let client = fake_client(&FakeTransport::new());
        let options = UserOptions {
            email: None,
            ..UserOptions::new("x@acme.test", "Jane", "Doe")
        };
        let err = client.people().create(&options).into_operation().unwrap_err();
        assert!(matches!(err, HarvestError::InvalidArgument(ref msg) if msg.contains("email")));
    }
}
