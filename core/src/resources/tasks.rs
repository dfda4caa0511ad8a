//! Tasks.

use chrono::NaiveDateTime;

use super::{require_text, updated_since};
use crate::client::{Call, HarvestClient};
use crate::error::HarvestError;
use crate::params;
use crate::request::{ApiRequest, Operation};
use crate::types::{Task, TaskOptions};

const ROOT: &str = "task";

pub struct TasksResource<'c, T> {
    client: &'c HarvestClient<T>,
}

impl<'c, T> TasksResource<'c, T> {
    pub(crate) fn new(client: &'c HarvestClient<T>) -> Self {
        Self { client }
    }

    pub fn list(&self, since: Option<NaiveDateTime>) -> Call<'c, T, Vec<Task>> {
        let request = updated_since(ApiRequest::get(params::TASKS), since);
        self.client.call(Ok(Operation::many(request)))
    }

    pub fn get(&self, id: u64) -> Call<'c, T, Task> {
        self.client.call(Ok(Operation::one(ApiRequest::get(path(id)))))
    }

    /// Create a task. `name` is required.
    pub fn create(&self, options: &TaskOptions) -> Call<'c, T, Task> {
        self.client.call(create_operation(options))
    }

    pub fn update(&self, id: u64, options: &TaskOptions) -> Call<'c, T, Task> {
        let operation = ApiRequest::put(path(id))
            .json_root(ROOT, options)
            .map(|request| Operation::one(request).follow_location());
        self.client.call(operation)
    }

    pub fn delete(&self, id: u64) -> Call<'c, T, bool> {
        self.client
            .call(Ok(Operation::status(ApiRequest::delete(path(id)))))
    }

    /// Reactivate an archived task.
    pub fn activate(&self, id: u64) -> Call<'c, T, Task> {
        let request = ApiRequest::post(format!("{}/{}", path(id), params::ACTIVATE));
        self.client
            .call(Ok(Operation::one(request).follow_location()))
    }
}

fn path(id: u64) -> String {
    format!("{}/{id}", params::TASKS)
}

fn create_operation(options: &TaskOptions) -> Result<Operation<Task>, HarvestError> {
    require_text(options.name.as_deref(), "name")?;
    let request = ApiRequest::post(params::TASKS).json_root(ROOT, options)?;
    Ok(Operation::one(request).follow_location())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fake_client, FakeTransport};

    #[test]
    fn activate_decodes_the_task() {
        let fake = FakeTransport::new();
        fake.respond(200, r#"{"task":{"id":4,"name":"Design","deactivated":false}}"#);
        let task = fake_client(&fake).tasks().activate(4).send().unwrap();
        assert_eq!(task.deactivated, Some(false));
        assert!(fake.requests()[0].url.ends_with("/tasks/4/activate"));
    }
}
