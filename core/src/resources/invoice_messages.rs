//! Invoice messages and invoice state changes.

use serde::Serialize;

use super::{invoices, require_text};
use crate::client::{Call, HarvestClient};
use crate::error::HarvestError;
use crate::params;
use crate::request::{ApiRequest, Operation};
use crate::types::{InvoiceMessage, InvoiceMessageAction, InvoiceMessageOptions};

const SEND_ROOT: &str = "invoice_message";
const ACTION_ROOT: &str = "message";

#[derive(Serialize)]
struct ActionBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'a str>,
}

/// Messages on an invoice and the state changes posted through them.
///
/// The service decides whether a transition is legal; an illegal one comes
/// back as a non-200 status and is reported as `false`.
pub struct InvoiceMessagesResource<'c, T> {
    client: &'c HarvestClient<T>,
}

impl<'c, T> InvoiceMessagesResource<'c, T> {
    pub(crate) fn new(client: &'c HarvestClient<T>) -> Self {
        Self { client }
    }

    pub fn list(&self, invoice_id: u64) -> Call<'c, T, Vec<InvoiceMessage>> {
        self.client
            .call(Ok(Operation::many(ApiRequest::get(messages_path(invoice_id)))))
    }

    pub fn get(&self, invoice_id: u64, message_id: u64) -> Call<'c, T, InvoiceMessage> {
        let path = format!("{}/{message_id}", messages_path(invoice_id));
        self.client.call(Ok(Operation::one(ApiRequest::get(path))))
    }

    /// Email the invoice. `recipients` is required.
    pub fn send(&self, invoice_id: u64, options: &InvoiceMessageOptions) -> Call<'c, T, InvoiceMessage> {
        self.client.call(send_operation(invoice_id, options))
    }

    pub fn delete(&self, invoice_id: u64, message_id: u64) -> Call<'c, T, bool> {
        let path = format!("{}/{message_id}", messages_path(invoice_id));
        self.client.call(Ok(Operation::status(ApiRequest::delete(path))))
    }

    /// Post `action` with an optional message body.
    pub fn mark(
        &self,
        invoice_id: u64,
        body: Option<&str>,
        action: InvoiceMessageAction,
    ) -> Call<'c, T, bool> {
        let path = format!("{}/{}", messages_path(invoice_id), action.as_str());
        let operation = ApiRequest::post(path)
            .json_root(ACTION_ROOT, &ActionBody { body })
            .map(Operation::status);
        self.client.call(operation)
    }

    /// Draft → open.
    pub fn mark_sent(&self, invoice_id: u64, body: Option<&str>) -> Call<'c, T, bool> {
        self.mark(invoice_id, body, InvoiceMessageAction::MarkAsSent)
    }

    /// Open → closed.
    pub fn mark_closed(&self, invoice_id: u64, body: Option<&str>) -> Call<'c, T, bool> {
        self.mark(invoice_id, body, InvoiceMessageAction::MarkAsClosed)
    }

    /// Open → draft.
    pub fn mark_draft(&self, invoice_id: u64) -> Call<'c, T, bool> {
        self.mark(invoice_id, None, InvoiceMessageAction::MarkAsDraft)
    }

    /// Closed → open.
    pub fn reopen(&self, invoice_id: u64, body: Option<&str>) -> Call<'c, T, bool> {
        self.mark(invoice_id, body, InvoiceMessageAction::ReOpen)
    }
}

fn messages_path(invoice_id: u64) -> String {
    format!("{}/{}", invoices::path(invoice_id), params::MESSAGES)
}

fn send_operation(
    invoice_id: u64,
    options: &InvoiceMessageOptions,
) -> Result<Operation<InvoiceMessage>, HarvestError> {
    require_text(options.recipients.as_deref(), "recipients")?;
    let request = ApiRequest::post(messages_path(invoice_id)).json_root(SEND_ROOT, options)?;
    Ok(Operation::one(request).follow_location())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fake_client, FakeTransport, BASE_URL};

    #[test]
    fn actions_post_to_their_token() {
        let client = fake_client(&FakeTransport::new());
        let messages = client.invoice_messages();
        let cases = [
            (messages.mark_sent(7, Some("sent")), "mark_as_sent"),
            (messages.mark_closed(7, Some("closed")), "mark_as_closed"),
            (messages.mark_draft(7), "mark_as_draft"),
            (messages.reopen(7, None), "re_open"),
        ];
        for (call, token) in cases {
            let operation = call.into_operation().unwrap();
            assert_eq!(operation.request().path, format!("invoices/7/messages/{token}"));
        }
    }

    #[test]
    fn action_body_is_omitted_when_absent() {
        let client = fake_client(&FakeTransport::new());
        let with_body = client
            .invoice_messages()
            .mark_sent(7, Some("Marked sent"))
            .into_operation()
            .unwrap();
        assert_eq!(
            with_body.request().json_body().unwrap(),
            &serde_json::json!({"message": {"body": "Marked sent"}})
        );
        let without = client.invoice_messages().mark_draft(7).into_operation().unwrap();
        assert_eq!(
            without.request().json_body().unwrap(),
            &serde_json::json!({"message": {}})
        );
    }

    #[test]
    fn illegal_transition_is_false_not_an_error() {
        let fake = FakeTransport::new();
        fake.respond(422, r#"{"error":"invoice is already closed"}"#);
        let ok = fake_client(&fake)
            .invoice_messages()
            .mark_closed(7, None)
            .send()
            .unwrap();
        assert!(!ok);
        assert_eq!(
            fake.requests()[0].url,
            format!("{BASE_URL}/invoices/7/messages/mark_as_closed")
        );
    }

    #[test]
    fn send_requires_recipients() {
        let client = fake_client(&FakeTransport::new());
        let err = client
            .invoice_messages()
            .send(7, &InvoiceMessageOptions::default())
            .into_operation()
            .unwrap_err();
        assert!(matches!(err, HarvestError::InvalidArgument(_)));

        let operation = client
            .invoice_messages()
            .send(7, &InvoiceMessageOptions::new("billing@acme.test"))
            .into_operation()
            .unwrap();
        assert_eq!(
            operation.request().json_body().unwrap()["invoice_message"]["recipients"],
            "billing@acme.test"
        );
    }
}
