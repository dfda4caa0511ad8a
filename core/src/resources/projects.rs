//! Projects. `toggle` archives or restores a project and reports only
//! whether the service accepted it.

use chrono::NaiveDateTime;

use super::{require, require_text, updated_since};
use crate::client::{Call, HarvestClient};
use crate::error::HarvestError;
use crate::params;
use crate::request::{ApiRequest, Operation};
use crate::types::{Project, ProjectOptions};

const ROOT: &str = "project";

pub struct ProjectsResource<'c, T> {
    client: &'c HarvestClient<T>,
}

impl<'c, T> ProjectsResource<'c, T> {
    pub(crate) fn new(client: &'c HarvestClient<T>) -> Self {
        Self { client }
    }

    /// List projects, optionally only those of one client.
    pub fn list(&self, client_id: Option<u64>, since: Option<NaiveDateTime>) -> Call<'c, T, Vec<Project>> {
        let request = ApiRequest::get(params::PROJECTS).query_opt(params::CLIENT, client_id);
        let request = updated_since(request, since);
        self.client.call(Ok(Operation::many(request)))
    }

    pub fn get(&self, id: u64) -> Call<'c, T, Project> {
        self.client.call(Ok(Operation::one(ApiRequest::get(path(id)))))
    }

    /// Create a project. `name` and `client_id` are required.
    pub fn create(&self, options: &ProjectOptions) -> Call<'c, T, Project> {
        self.client.call(create_operation(options))
    }

    pub fn update(&self, id: u64, options: &ProjectOptions) -> Call<'c, T, Project> {
        let operation = ApiRequest::put(path(id))
            .json_root(ROOT, options)
            .map(|request| Operation::one(request).follow_location());
        self.client.call(operation)
    }

    pub fn delete(&self, id: u64) -> Call<'c, T, bool> {
        self.client
            .call(Ok(Operation::status(ApiRequest::delete(path(id)))))
    }

    /// Flip the project between active and archived.
    pub fn toggle(&self, id: u64) -> Call<'c, T, bool> {
        let request = ApiRequest::put(format!("{}/{}", path(id), params::TOGGLE));
        self.client.call(Ok(Operation::status(request)))
    }
}

pub(crate) fn path(id: u64) -> String {
    format!("{}/{id}", params::PROJECTS)
}

fn create_operation(options: &ProjectOptions) -> Result<Operation<Project>, HarvestError> {
    require_text(options.name.as_deref(), "name")?;
    require(options.client_id, "client_id")?;
    let request = ApiRequest::post(params::PROJECTS).json_root(ROOT, options)?;
    Ok(Operation::one(request).follow_location())
}
