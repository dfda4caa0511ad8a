//! The daily time sheet: entries, timers and day lookups.
//!
//! Unlike the other resources these endpoints take flat JSON bodies and
//! answer writes with the entry itself, so no follow-up request is made.

use super::{of_user, require};
use crate::client::{Call, HarvestClient};
use crate::error::HarvestError;
use crate::params;
use crate::request::{ApiRequest, Operation};
use crate::types::{Daily, DailyOptions, Timer};

/// The daily time sheet and its timers.
pub struct TimeTrackingResource<'c, T> {
    client: &'c HarvestClient<T>,
}

impl<'c, T> TimeTrackingResource<'c, T> {
    pub(crate) fn new(client: &'c HarvestClient<T>) -> Self {
        Self { client }
    }

    /// Today's entries.
    pub fn daily(&self, user: Option<u64>) -> Call<'c, T, Daily> {
        let request = of_user(ApiRequest::get(params::DAILY), user);
        self.client.call(Ok(Operation::one(request)))
    }

    /// Entries for day `day_of_year` (1 to 366) of `year`.
    pub fn daily_on(&self, day_of_year: u16, year: i32, user: Option<u64>) -> Call<'c, T, Daily> {
        let operation = if (1..=366).contains(&day_of_year) {
            let path = format!("{}/{day_of_year}/{year}", params::DAILY);
            Ok(Operation::one(of_user(ApiRequest::get(path), user)))
        } else {
            Err(HarvestError::invalid(format!(
                "day of year must be between 1 and 366, got {day_of_year}"
            )))
        };
        self.client.call(operation)
    }

    pub fn entry(&self, id: u64, user: Option<u64>) -> Call<'c, T, Timer> {
        let path = format!("{}/{}/{id}", params::DAILY, params::SHOW);
        self.client
            .call(Ok(Operation::one(of_user(ApiRequest::get(path), user))))
    }

    /// Start the entry's timer, or stop it if it is running.
    pub fn toggle_timer(&self, id: u64, user: Option<u64>) -> Call<'c, T, Timer> {
        let path = format!("{}/{}/{id}", params::DAILY, params::TIMER);
        self.client
            .call(Ok(Operation::one(of_user(ApiRequest::get(path), user))))
    }

    /// Add an entry. `spent_at`, `project_id` and `task_id` are required.
    pub fn create(&self, options: &DailyOptions, user: Option<u64>) -> Call<'c, T, Timer> {
        self.client.call(create_operation(options, user))
    }

    /// Add an entry with a running timer.
    pub fn start_timer(
        &self,
        spent_at: chrono::NaiveDate,
        project_id: u64,
        task_id: u64,
        notes: Option<&str>,
        user: Option<u64>,
    ) -> Call<'c, T, Timer> {
        let mut options = DailyOptions::timer(spent_at, project_id, task_id);
        options.notes = notes.map(str::to_string);
        self.create(&options, user)
    }

    /// Change only the fields set in `options`.
    pub fn update(&self, id: u64, options: &DailyOptions, user: Option<u64>) -> Call<'c, T, Timer> {
        let path = format!("{}/{}/{id}", params::DAILY, params::UPDATE);
        let operation = of_user(ApiRequest::post(path), user)
            .json(options)
            .map(Operation::one);
        self.client.call(operation)
    }

    pub fn delete(&self, id: u64, user: Option<u64>) -> Call<'c, T, bool> {
        let path = format!("{}/{}/{id}", params::DAILY, params::DELETE);
        self.client
            .call(Ok(Operation::status(of_user(ApiRequest::delete(path), user))))
    }
}

fn create_operation(options: &DailyOptions, user: Option<u64>) -> Result<Operation<Timer>, HarvestError> {
    require(options.spent_at, "spent_at")?;
    require(options.project_id, "project_id")?;
    require(options.task_id, "task_id")?;
    let path = format!("{}/{}", params::DAILY, params::ADD);
    let request = of_user(ApiRequest::post(path), user).json(options)?;
    Ok(Operation::one(request))
}
