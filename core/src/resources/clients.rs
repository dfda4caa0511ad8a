//! Clients: list, lookup, create, update, delete and activation toggle.

use chrono::NaiveDateTime;

use super::{require_text, updated_since};
use crate::client::{Call, HarvestClient};
use crate::error::HarvestError;
use crate::params;
use crate::request::{ApiRequest, Operation};
use crate::types::{Client, ClientOptions};

const ROOT: &str = "client";

/// Clients of the account.
pub struct ClientsResource<'c, T> {
    client: &'c HarvestClient<T>,
}

impl<'c, T> ClientsResource<'c, T> {
    pub(crate) fn new(client: &'c HarvestClient<T>) -> Self {
        Self { client }
    }

    pub fn list(&self, since: Option<NaiveDateTime>) -> Call<'c, T, Vec<Client>> {
        let request = updated_since(ApiRequest::get(params::CLIENTS), since);
        self.client.call(Ok(Operation::many(request)))
    }

    pub fn get(&self, id: u64) -> Call<'c, T, Client> {
        self.client.call(Ok(Operation::one(ApiRequest::get(path(id)))))
    }

    /// Create a client. `name` is required.
    pub fn create(&self, options: &ClientOptions) -> Call<'c, T, Client> {
        self.client.call(create_operation(options))
    }

    /// Change only the fields set in `options`.
    pub fn update(&self, id: u64, options: &ClientOptions) -> Call<'c, T, Client> {
        let operation = ApiRequest::put(path(id))
            .json_root(ROOT, options)
            .map(|request| Operation::one(request).follow_location());
        self.client.call(operation)
    }

    pub fn delete(&self, id: u64) -> Call<'c, T, bool> {
        self.client
            .call(Ok(Operation::status(ApiRequest::delete(path(id)))))
    }

    /// Flip the client between active and inactive.
    pub fn toggle(&self, id: u64) -> Call<'c, T, Client> {
        let request = ApiRequest::post(format!("{}/{}", path(id), params::TOGGLE));
        self.client
            .call(Ok(Operation::one(request).follow_location()))
    }
}

fn path(id: u64) -> String {
    format!("{}/{id}", params::CLIENTS)
}

fn create_operation(options: &ClientOptions) -> Result<Operation<Client>, HarvestError> {
    require_text(options.name.as_deref(), "name")?;
    let request = ApiRequest::post(params::CLIENTS).json_root(ROOT, options)?;
    Ok(Operation::one(request).follow_location())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpMethod, HttpResponse};
    use crate::testing::{fake_client, FakeTransport, BASE_URL};

    #[test]
    fn create_posts_wrapped_options_and_fetches_location() {
        let fake = FakeTransport::new();
        fake.respond_with(HttpResponse {
            status: 201,
            headers: vec![("Location".to_string(), "/clients/12".to_string())],
            body: String::new(),
        });
        fake.respond(200, r#"{"client":{"id":12,"name":"Test Create Client","active":true}}"#);

        let client = fake_client(&fake);
        let created = client
            .clients()
            .create(&ClientOptions::new("Test Create Client"))
            .send()
            .unwrap();

        assert_eq!(created.name.as_deref(), Some("Test Create Client"));
        let requests = fake.requests();
        assert_eq!(requests[0].method, HttpMethod::Post);
        let body: serde_json::Value =
            serde_json::from_slice(requests[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"client": {"name": "Test Create Client", "active": true}}));
        assert_eq!(requests[1].url, format!("{BASE_URL}/clients/12"));
    }

    #[test]
    fn create_without_name_never_reaches_transport() {
        let fake = FakeTransport::new();
        let err = fake_client(&fake)
            .clients()
            .create(&ClientOptions::default())
            .send()
            .unwrap_err();
        assert!(matches!(err, HarvestError::InvalidArgument(_)));
        assert!(fake.requests().is_empty());
    }

    #[test]
    fn update_sends_only_supplied_fields() {
        let client = fake_client(&FakeTransport::new());
        let options = ClientOptions {
            details: Some("Updated details".to_string()),
            ..ClientOptions::default()
        };
        let operation = client.clients().update(4, &options).into_operation().unwrap();
        assert_eq!(operation.request().path, "clients/4");
        assert_eq!(
            operation.request().json_body().unwrap(),
            &serde_json::json!({"client": {"details": "Updated details"}})
        );
    }

    #[test]
    fn delete_reports_status() {
        let fake = FakeTransport::new();
        fake.respond(200, "");
        fake.respond(404, "");
        let client = fake_client(&fake);
        assert!(client.clients().delete(4).send().unwrap());
        assert!(!client.clients().delete(4).send().unwrap());
    }

    #[test]
    fn toggle_posts_to_the_toggle_action() {
        let client = fake_client(&FakeTransport::new());
        let operation = client.clients().toggle(4).into_operation().unwrap();
        assert_eq!(operation.request().method, HttpMethod::Post);
        assert_eq!(operation.request().path, "clients/4/toggle");
    }
}
