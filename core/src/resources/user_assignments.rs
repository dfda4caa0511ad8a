//! Users assigned to a project.

use chrono::NaiveDateTime;
use serde_json::json;

use super::{projects, require, updated_since};
use crate::client::{Call, HarvestClient};
use crate::error::HarvestError;
use crate::params;
use crate::request::{ApiRequest, Operation};
use crate::types::{UserAssignment, UserAssignmentOptions};

const ROOT: &str = "user_assignment";

/// Users assigned to a project.
pub struct UserAssignmentsResource<'c, T> {
    client: &'c HarvestClient<T>,
}

impl<'c, T> UserAssignmentsResource<'c, T> {
    pub(crate) fn new(client: &'c HarvestClient<T>) -> Self {
        Self { client }
    }

    pub fn list(&self, project_id: u64, since: Option<NaiveDateTime>) -> Call<'c, T, Vec<UserAssignment>> {
        let request = updated_since(ApiRequest::get(collection(project_id)), since);
        self.client.call(Ok(Operation::many(request)))
    }

    pub fn get(&self, project_id: u64, id: u64) -> Call<'c, T, UserAssignment> {
        self.client
            .call(Ok(Operation::one(ApiRequest::get(path(project_id, id)))))
    }

    /// Assign a user to the project.
    pub fn create(&self, project_id: u64, user_id: u64) -> Call<'c, T, UserAssignment> {
        let operation = ApiRequest::post(collection(project_id))
            .json(&json!({ "user": { "id": user_id } }))
            .map(|request| Operation::one(request).follow_location());
        self.client.call(operation)
    }

    /// Update an assignment. `user_id` is required; the project id is taken
    /// from the path.
    pub fn update(
        &self,
        project_id: u64,
        id: u64,
        options: &UserAssignmentOptions,
    ) -> Call<'c, T, UserAssignment> {
        self.client.call(update_operation(project_id, id, options))
    }

    pub fn delete(&self, project_id: u64, id: u64) -> Call<'c, T, bool> {
        self.client
            .call(Ok(Operation::status(ApiRequest::delete(path(project_id, id)))))
    }
}

fn collection(project_id: u64) -> String {
    format!("{}/{}", projects::path(project_id), params::USER_ASSIGNMENTS)
}

fn path(project_id: u64, id: u64) -> String {
    format!("{}/{id}", collection(project_id))
}

fn update_operation(
    project_id: u64,
    id: u64,
    options: &UserAssignmentOptions,
) -> Result<Operation<UserAssignment>, HarvestError> {
    require(options.user_id, "user_id")?;
    let body = UserAssignmentOptions {
        project_id: Some(project_id),
        ..options.clone()
    };
    let request = ApiRequest::put(path(project_id, id)).json_root(ROOT, &body)?;
    Ok(Operation::one(request).follow_location())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fake_client, FakeTransport};

    #[test]
    fn update_writes_project_from_path() {
        let client = fake_client(&FakeTransport::new());
        let options = UserAssignmentOptions {
            is_project_manager: Some(true),
            project_id: Some(999),
            ..UserAssignmentOptions::new(4)
        };
        let operation = client
            .user_assignments()
            .update(3, 21, &options)
            .into_operation()
            .unwrap();
        assert_eq!(operation.request().path, "projects/3/user_assignments/21");
        assert_eq!(
            operation.request().json_body().unwrap(),
            &json!({"user_assignment": {"user_id": 4, "project_id": 3, "is_project_manager": true}})
        );
    }

    #[test]
    fn update_requires_user() {
        let client = fake_client(&FakeTransport::new());
        let err = client
            .user_assignments()
            .update(3, 21, &UserAssignmentOptions::default())
            .into_operation()
            .unwrap_err();
        assert!(matches!(err, HarvestError::InvalidArgument(_)));
    }

    #[test]
    fn create_sends_user_reference() {
        let client = fake_client(&FakeTransport::new());
        let operation = client.user_assignments().create(3, 4).into_operation().unwrap();
        assert_eq!(operation.request().json_body().unwrap(), &json!({"user": {"id": 4}}));
    }
}
