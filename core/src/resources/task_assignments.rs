//! Tasks assigned to a project, nested under `projects/{id}`.

use chrono::NaiveDateTime;
use serde_json::json;

use super::{projects, require_text, updated_since};
use crate::client::{Call, HarvestClient};
use crate::error::HarvestError;
use crate::params;
use crate::request::{ApiRequest, Operation};
use crate::types::{TaskAssignment, TaskAssignmentOptions};

const ROOT: &str = "task_assignment";

/// Tasks assigned to a project.
pub struct TaskAssignmentsResource<'c, T> {
    client: &'c HarvestClient<T>,
}

impl<'c, T> TaskAssignmentsResource<'c, T> {
    pub(crate) fn new(client: &'c HarvestClient<T>) -> Self {
        Self { client }
    }

    pub fn list(&self, project_id: u64, since: Option<NaiveDateTime>) -> Call<'c, T, Vec<TaskAssignment>> {
        let request = updated_since(ApiRequest::get(collection(project_id)), since);
        self.client.call(Ok(Operation::many(request)))
    }

    pub fn get(&self, project_id: u64, id: u64) -> Call<'c, T, TaskAssignment> {
        self.client
            .call(Ok(Operation::one(ApiRequest::get(path(project_id, id)))))
    }

    /// Assign an existing task to the project.
    pub fn create(&self, project_id: u64, task_id: u64) -> Call<'c, T, TaskAssignment> {
        let operation = ApiRequest::post(collection(project_id))
            .json(&json!({ "task": { "id": task_id } }))
            .map(|request| Operation::one(request).follow_location());
        self.client.call(operation)
    }

    /// Create a task named `name` and assign it to the project in one step.
    pub fn create_with_new_task(&self, project_id: u64, name: &str) -> Call<'c, T, TaskAssignment> {
        self.client.call(new_task_operation(project_id, name))
    }

    pub fn update(
        &self,
        project_id: u64,
        id: u64,
        options: &TaskAssignmentOptions,
    ) -> Call<'c, T, TaskAssignment> {
        let operation = ApiRequest::put(path(project_id, id))
            .json_root(ROOT, options)
            .map(|request| Operation::one(request).follow_location());
        self.client.call(operation)
    }

    pub fn delete(&self, project_id: u64, id: u64) -> Call<'c, T, bool> {
        self.client
            .call(Ok(Operation::status(ApiRequest::delete(path(project_id, id)))))
    }
}

fn collection(project_id: u64) -> String {
    format!("{}/{}", projects::path(project_id), params::TASK_ASSIGNMENTS)
}

fn path(project_id: u64, id: u64) -> String {
    format!("{}/{id}", collection(project_id))
}

fn new_task_operation(project_id: u64, name: &str) -> Result<Operation<TaskAssignment>, HarvestError> {
    require_text(Some(name), "name")?;
    let path = format!("{}/{}", collection(project_id), params::ADD_WITH_CREATE_NEW_TASK);
    let request = ApiRequest::post(path).json(&json!({ "task": { "name": name } }))?;
    Ok(Operation::one(request).follow_location())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fake_client, FakeTransport};

    #[test]
    fn get_addresses_the_assignment() {
        let client = fake_client(&FakeTransport::new());
        let operation = client.task_assignments().get(3, 17).into_operation().unwrap();
        assert_eq!(operation.request().path, "projects/3/task_assignments/17");
    }

    #[test]
    fn create_sends_task_reference() {
        let client = fake_client(&FakeTransport::new());
        let operation = client.task_assignments().create(3, 8).into_operation().unwrap();
        assert_eq!(
            operation.request().json_body().unwrap(),
            &json!({"task": {"id": 8}})
        );
    }

    #[test]
    fn new_task_requires_a_name() {
        let client = fake_client(&FakeTransport::new());
        let err = client
            .task_assignments()
            .create_with_new_task(3, "  ")
            .into_operation()
            .unwrap_err();
        assert!(matches!(err, HarvestError::InvalidArgument(_)));

        let operation = client
            .task_assignments()
            .create_with_new_task(3, "Research")
            .into_operation()
            .unwrap();
        assert_eq!(
            operation.request().path,
            "projects/3/task_assignments/add_with_create_new_task"
        );
        assert_eq!(
            operation.request().json_body().unwrap(),
            &json!({"task": {"name": "Research"}})
        );
    }
}
