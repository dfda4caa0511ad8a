//! Client contacts, listed account-wide or per client.

use chrono::NaiveDateTime;

use super::{require, require_text, updated_since};
use crate::client::{Call, HarvestClient};
use crate::error::HarvestError;
use crate::params;
use crate::request::{ApiRequest, Operation};
use crate::types::{Contact, ContactOptions};

const ROOT: &str = "contact";

/// Contacts, account-wide or under one client.
pub struct ContactsResource<'c, T> {
    client: &'c HarvestClient<T>,
}

impl<'c, T> ContactsResource<'c, T> {
    pub(crate) fn new(client: &'c HarvestClient<T>) -> Self {
        Self { client }
    }

    pub fn list(&self, since: Option<NaiveDateTime>) -> Call<'c, T, Vec<Contact>> {
        let request = updated_since(ApiRequest::get(params::CONTACTS), since);
        self.client.call(Ok(Operation::many(request)))
    }

    pub fn list_for_client(
        &self,
        client_id: u64,
        since: Option<NaiveDateTime>,
    ) -> Call<'c, T, Vec<Contact>> {
        let path = format!("{}/{client_id}/{}", params::CLIENTS, params::CONTACTS);
        let request = updated_since(ApiRequest::get(path), since);
        self.client.call(Ok(Operation::many(request)))
    }

    pub fn get(&self, id: u64) -> Call<'c, T, Contact> {
        self.client.call(Ok(Operation::one(ApiRequest::get(path(id)))))
    }

    /// Create a contact. `client_id`, `first_name` and `last_name` are
    /// required.
    pub fn create(&self, options: &ContactOptions) -> Call<'c, T, Contact> {
        self.client.call(create_operation(options))
    }

    pub fn update(&self, id: u64, options: &ContactOptions) -> Call<'c, T, Contact> {
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
    format!("{}/{id}", params::CONTACTS)
}

fn create_operation(options: &ContactOptions) -> Result<Operation<Contact>, HarvestError> {
    require(options.client_id, "client_id")?;
    require_text(options.first_name.as_deref(), "first_name")?;
    require_text(options.last_name.as_deref(), "last_name")?;
    let request = ApiRequest::post(params::CONTACTS).json_root(ROOT, options)?;
    Ok(Operation::one(request).follow_location())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fake_client, FakeTransport};

    #[test]
    fn client_contacts_are_nested_under_the_client() {
        let client = fake_client(&FakeTransport::new());
        let operation = client
            .contacts()
            .list_for_client(3, None)
            .into_operation()
            .unwrap();
        assert_eq!(operation.request().path, "clients/3/contacts");
    }

    #[test]
    fn create_requires_names() {
        let client = fake_client(&FakeTransport::new());
        let options = ContactOptions {
            last_name: None,
            ..ContactOptions::new(3, "Jane", "Doe")
        };
        let err = client.contacts().create(&options).into_operation().unwrap_err();
        assert!(matches!(err, HarvestError::InvalidArgument(ref msg) if msg.contains("last_name")));
    }

    #[test]
    fn list_decodes_wrapped_contacts() {
        let fake = FakeTransport::new();
        fake.respond(
            200,
            r#"[{"contact":{"id":1,"client_id":3,"first_name":"Jane","last_name":"Doe"}}]"#,
        );
        let contacts = fake_client(&fake).contacts().list(None).send().unwrap();
        assert_eq!(contacts[0].first_name.as_deref(), Some("Jane"));
        assert_eq!(contacts[0].client_id, Some(3));
    }
}
