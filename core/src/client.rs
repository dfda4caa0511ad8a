//! The Harvest client: request materialization and execution.
//!
//! # Design
//! `HarvestClient` holds only its configuration and the injected transport
//! and carries no mutable state between calls, so one instance can serve
//! concurrent callers whenever the transport allows it.
//!
//! Resource handles (`client.clients()`, `client.invoices()`, ...) build
//! [`Operation`]s and wrap them in a [`Call`]. A call runs either blocking
//! through a [`Transport`] or asynchronously through an [`AsyncTransport`].
//! Both paths share request building, follow-up selection and decoding and
//! differ only in how the transport is awaited.

use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};
use url::Url;
use uuid::Uuid;

use crate::config::HarvestConfig;
use crate::error::HarvestError;
use crate::http::{HttpRequest, HttpResponse};
use crate::request::{ApiRequest, Operation, RequestBody};
use crate::resources::{
    AccountResource, ClientsResource, ContactsResource, ExpenseCategoriesResource,
    ExpensesResource, InvoiceCategoriesResource, InvoiceMessagesResource,
    InvoicePaymentsResource, InvoicesResource, PeopleResource, ProjectsResource,
    ReportsResource, TaskAssignmentsResource, TasksResource, TimeTrackingResource,
    UserAssignmentsResource,
};
use crate::transport::{AsyncTransport, Transport};

/// Client for one Harvest account.
#[derive(Debug, Clone)]
pub struct HarvestClient<T> {
    config: HarvestConfig,
    transport: T,
}

impl<T> HarvestClient<T> {
    pub fn new(config: HarvestConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Turn a logical request into the HTTP request the transport receives.
    pub fn build_request(&self, request: &ApiRequest) -> Result<HttpRequest, HarvestError> {
        let joined = format!(
            "{}/{}",
            self.config.base_url(),
            request.path.trim_start_matches('/')
        );
        let mut url = Url::parse(&joined)
            .map_err(|e| HarvestError::invalid(format!("invalid request url {joined:?}: {e}")))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(
                request
                    .query
                    .iter()
                    .map(|(name, value)| (name.as_str(), value.as_str())),
            );
        }

        let mut headers = vec![
            ("Accept".to_string(), "application/json".to_string()),
            ("User-Agent".to_string(), self.config.user_agent().to_string()),
        ];
        if let Some(credentials) = self.config.credentials() {
            headers.push(("Authorization".to_string(), credentials.authorization()));
        }

        let body = match &request.body {
            None => None,
            Some(RequestBody::Json(value)) => {
                headers.push(("Content-Type".to_string(), "application/json".to_string()));
                Some(
                    serde_json::to_vec(value)
                        .map_err(|e| HarvestError::Serialization(e.to_string()))?,
                )
            }
            Some(RequestBody::File(part)) => {
                let boundary = format!("harvest-{}", Uuid::new_v4().simple());
                headers.push((
                    "Content-Type".to_string(),
                    format!("multipart/form-data; boundary={boundary}"),
                ));
                Some(part.encode(&boundary))
            }
        };

        Ok(HttpRequest {
            method: request.method,
            url: url.into(),
            headers,
            body,
        })
    }

    pub(crate) fn call<R>(&self, operation: Result<Operation<R>, HarvestError>) -> Call<'_, T, R> {
        Call {
            client: self,
            operation,
        }
    }

    pub fn account(&self) -> AccountResource<'_, T> {
        AccountResource::new(self)
    }

    pub fn clients(&self) -> ClientsResource<'_, T> {
        ClientsResource::new(self)
    }

    pub fn contacts(&self) -> ContactsResource<'_, T> {
        ContactsResource::new(self)
    }

    pub fn expense_categories(&self) -> ExpenseCategoriesResource<'_, T> {
        ExpenseCategoriesResource::new(self)
    }

    pub fn expenses(&self) -> ExpensesResource<'_, T> {
        ExpensesResource::new(self)
    }

    pub fn invoice_categories(&self) -> InvoiceCategoriesResource<'_, T> {
        InvoiceCategoriesResource::new(self)
    }

    pub fn invoices(&self) -> InvoicesResource<'_, T> {
        InvoicesResource::new(self)
    }

    pub fn invoice_messages(&self) -> InvoiceMessagesResource<'_, T> {
        InvoiceMessagesResource::new(self)
    }

    pub fn invoice_payments(&self) -> InvoicePaymentsResource<'_, T> {
        InvoicePaymentsResource::new(self)
    }

    pub fn people(&self) -> PeopleResource<'_, T> {
        PeopleResource::new(self)
    }

    pub fn projects(&self) -> ProjectsResource<'_, T> {
        ProjectsResource::new(self)
    }

    pub fn tasks(&self) -> TasksResource<'_, T> {
        TasksResource::new(self)
    }

    pub fn task_assignments(&self) -> TaskAssignmentsResource<'_, T> {
        TaskAssignmentsResource::new(self)
    }

    pub fn user_assignments(&self) -> UserAssignmentsResource<'_, T> {
        UserAssignmentsResource::new(self)
    }

    pub fn reports(&self) -> ReportsResource<'_, T> {
        ReportsResource::new(self)
    }

    pub fn time_tracking(&self) -> TimeTrackingResource<'_, T> {
        TimeTrackingResource::new(self)
    }
}

impl<T: Transport> HarvestClient<T> {
    /// Send one request and return the raw response, whatever its status.
    #[instrument(skip_all, fields(method = %request.method, path = %request.path))]
    pub fn execute(&self, request: &ApiRequest) -> Result<HttpResponse, HarvestError> {
        let http = self.build_request(request)?;
        debug!(url = %http.url, "sending request");
        let response = self.transport.execute(http)?;
        debug!(status = response.status, "received response");
        Ok(response)
    }

    /// Run an operation, including its follow-up request, and decode it.
    pub fn execute_typed<R>(&self, operation: &Operation<R>) -> Result<R, HarvestError> {
        let first = self.execute(operation.request())?;
        let response = match operation.next_request(&first, self.config.base_url())? {
            Some(next) => self.execute(&next)?,
            None => first,
        };
        operation.decode(&response)
    }
}

impl<T: AsyncTransport> HarvestClient<T> {
    /// Send one request without blocking. Cancelling `cancel` abandons the
    /// in-flight exchange and yields [`HarvestError::Cancelled`].
    #[instrument(skip_all, fields(method = %request.method, path = %request.path))]
    pub async fn execute_async(
        &self,
        request: &ApiRequest,
        cancel: &CancellationToken,
    ) -> Result<HttpResponse, HarvestError> {
        let http = self.build_request(request)?;
        debug!(url = %http.url, "sending request");
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                warn!("request cancelled");
                Err(HarvestError::Cancelled)
            }
            result = self.transport.execute_async(http) => result.map_err(HarvestError::from),
        };
        let response = result?;
        debug!(status = response.status, "received response");
        Ok(response)
    }

    /// Async counterpart of [`HarvestClient::execute_typed`].
    pub async fn execute_typed_async<R>(
        &self,
        operation: &Operation<R>,
        cancel: &CancellationToken,
    ) -> Result<R, HarvestError> {
        let first = self.execute_async(operation.request(), cancel).await?;
        let response = match operation.next_request(&first, self.config.base_url())? {
            Some(next) => self.execute_async(&next, cancel).await?,
            None => first,
        };
        operation.decode(&response)
    }
}

/// A built operation bound to the client that will run it.
///
/// Validation failures are captured when the call is built and returned by
/// `send`/`send_async` without touching the transport.
#[must_use = "a call does nothing until it is sent"]
pub struct Call<'c, T, R> {
    client: &'c HarvestClient<T>,
    operation: Result<Operation<R>, HarvestError>,
}

impl<T, R> Call<'_, T, R> {
    /// The operation this call would run, or the validation error that
    /// prevents it from running.
    pub fn into_operation(self) -> Result<Operation<R>, HarvestError> {
        self.operation
    }
}

impl<T: Transport, R> Call<'_, T, R> {
    pub fn send(self) -> Result<R, HarvestError> {
        let operation = self.operation?;
        self.client.execute_typed(&operation)
    }
}

impl<T: AsyncTransport, R> Call<'_, T, R> {
    pub async fn send_async(self, cancel: &CancellationToken) -> Result<R, HarvestError> {
        let operation = self.operation?;
        self.client.execute_typed_async(&operation, cancel).await
    }
}
