//! Projects, tasks and the assignments that link them to each other and to
//! users.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Model;

/// Which rate a project bills time at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BillingMethod {
    #[serde(rename = "none")]
    None,
    #[serde(rename = "Project")]
    Project,
    #[serde(rename = "Tasks")]
    Tasks,
    #[serde(rename = "People")]
    People,
}

/// What a project budget is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetMethod {
    None,
    Project,
    ProjectCost,
    Task,
    TaskFees,
    Person,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateMethod {
    None,
    Project,
    Task,
    Person,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Project {
    pub id: u64,
    pub client_id: Option<u64>,
    pub name: Option<String>,
    pub code: Option<String>,
    pub active: Option<bool>,
    pub billable: Option<bool>,
    pub bill_by: Option<BillingMethod>,
    pub hourly_rate: Option<Decimal>,
    pub budget: Option<Decimal>,
    pub budget_by: Option<BudgetMethod>,
    pub notify_when_over_budget: Option<bool>,
    pub over_budget_notification_percentage: Option<Decimal>,
    pub show_budget_to_all: Option<bool>,
    pub estimate: Option<Decimal>,
    pub estimate_by: Option<EstimateMethod>,
    pub cost_budget: Option<Decimal>,
    pub cost_budget_include_expenses: Option<bool>,
    pub notes: Option<String>,
    pub hint_earliest_record_at: Option<NaiveDate>,
    pub hint_latest_record_at: Option<NaiveDate>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model for Project {
    const ROOT: Option<&'static str> = Some("project");
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ProjectOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bill_by: Option<BillingMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hourly_rate: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_by: Option<BudgetMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_when_over_budget: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub over_budget_notification_percentage: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_budget_to_all: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimate: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimate_by: Option<EstimateMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_budget: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_budget_include_expenses: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ProjectOptions {
    /// Options for a new, active project under `client_id`.
    pub fn new(name: impl Into<String>, client_id: u64) -> Self {
        Self {
            name: Some(name.into()),
            client_id: Some(client_id),
            active: Some(true),
            ..Self::default()
        }
    }
}

/// A task that can be assigned to projects.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Task {
    pub id: u64,
    pub name: Option<String>,
    pub billable_by_default: Option<bool>,
    pub is_default: Option<bool>,
    pub default_hourly_rate: Option<Decimal>,
    pub deactivated: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model for Task {
    const ROOT: Option<&'static str> = Some("task");
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct TaskOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billable_by_default: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_hourly_rate: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deactivated: Option<bool>,
}

impl TaskOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TaskAssignment {
    pub id: u64,
    pub project_id: Option<u64>,
    pub task_id: Option<u64>,
    pub billable: Option<bool>,
    pub deactivated: Option<bool>,
    pub hourly_rate: Option<Decimal>,
    pub budget: Option<Decimal>,
    pub estimate: Option<Decimal>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model for TaskAssignment {
    const ROOT: Option<&'static str> = Some("task_assignment");
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct TaskAssignmentOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deactivated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hourly_rate: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UserAssignment {
    pub id: u64,
    pub project_id: Option<u64>,
    pub user_id: Option<u64>,
    pub is_project_manager: Option<bool>,
    pub deactivated: Option<bool>,
    pub hourly_rate: Option<Decimal>,
    pub budget: Option<Decimal>,
    pub estimate: Option<Decimal>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model for UserAssignment {
    const ROOT: Option<&'static str> = Some("user_assignment");
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct UserAssignmentOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,
    /// Filled in from the request path when updating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deactivated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hourly_rate: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_project_manager: Option<bool>,
}

impl UserAssignmentOptions {
    pub fn new(user_id: u64) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn billing_method_keeps_service_capitalisation() {
        assert_eq!(serde_json::to_value(BillingMethod::Tasks).unwrap(), "Tasks");
        assert_eq!(serde_json::to_value(BillingMethod::None).unwrap(), "none");
        assert_eq!(serde_json::to_value(BudgetMethod::TaskFees).unwrap(), "task_fees");
    }

    #[test]
    fn new_project_is_active() {
        let body = serde_json::to_value(ProjectOptions::new("Website", 7)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"client_id": 7, "name": "Website", "active": true})
        );
    }
}
