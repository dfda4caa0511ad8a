//! Logical request descriptors and the typed operations built from them.
//!
//! # Design
//! An [`ApiRequest`] is what a resource module produces: verb, relative path,
//! query parameters and an optional payload. It knows nothing about hosts,
//! credentials or headers, which keeps every builder a pure function.
//!
//! An [`Operation`] pairs an `ApiRequest` with the way its response is read:
//! a decoder (single record, list of records, or status flag) and an optional
//! follow-up request for endpoints that answer a write with a redirect to the
//! full representation.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use crate::error::HarvestError;
use crate::http::{HttpMethod, HttpResponse};
use crate::types::Model;

/// A request relative to the configured base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

/// Request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    File(FilePart),
}

/// A single file sent as `multipart/form-data`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FilePart {
    /// Encode as a one-part multipart body delimited by `boundary`.
    pub fn encode(&self, boundary: &str) -> Vec<u8> {
        let head = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
            self.field, self.file_name, self.content_type
        );
        let tail = format!("\r\n--{boundary}--\r\n");

        let mut bytes = Vec::with_capacity(head.len() + self.bytes.len() + tail.len());
        bytes.extend_from_slice(head.as_bytes());
        bytes.extend_from_slice(&self.bytes);
        bytes.extend_from_slice(tail.as_bytes());
        bytes
    }
}

impl ApiRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    pub fn query(mut self, name: &str, value: impl ToString) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }

    /// Append `name=value` only when `value` is set.
    pub fn query_opt<V: ToString>(self, name: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.query(name, value),
            None => self,
        }
    }

    /// Attach `body` wrapped in its root element: `{"client": {...}}`.
    pub fn json_root<B: Serialize + ?Sized>(
        mut self,
        root: &str,
        body: &B,
    ) -> Result<Self, HarvestError> {
        let mut envelope = Map::new();
        envelope.insert(root.to_string(), to_json(body)?);
        self.body = Some(RequestBody::Json(Value::Object(envelope)));
        Ok(self)
    }

    /// Attach `body` as-is.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, HarvestError> {
        self.body = Some(RequestBody::Json(to_json(body)?));
        Ok(self)
    }

    pub fn file(mut self, part: FilePart) -> Self {
        self.body = Some(RequestBody::File(part));
        self
    }

    /// First value of the query parameter `name`.
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// The JSON payload, if the body is JSON.
    pub fn json_body(&self) -> Option<&Value> {
        match &self.body {
            Some(RequestBody::Json(value)) => Some(value),
            _ => None,
        }
    }
}

fn to_json<B: Serialize + ?Sized>(body: &B) -> Result<Value, HarvestError> {
    serde_json::to_value(body).map_err(|e| HarvestError::Serialization(e.to_string()))
}

/// What to do after the first response of an operation.
#[derive(Debug, Clone, PartialEq)]
pub enum FollowUp {
    /// Decode the first response.
    None,
    /// If the first response is a 2xx with an empty body and a `Location`
    /// header, fetch that location and decode it instead.
    Location,
    /// After a 2xx first response, fetch this request and decode it.
    Fetch(ApiRequest),
}

type Decoder<R> = fn(&HttpResponse) -> Result<R, HarvestError>;

/// A request plus the recipe for turning its response into `R`.
pub struct Operation<R> {
    request: ApiRequest,
    follow_up: FollowUp,
    decode: Decoder<R>,
}

impl<R> Operation<R> {
    pub fn request(&self) -> &ApiRequest {
        &self.request
    }

    pub fn follow_up(&self) -> &FollowUp {
        &self.follow_up
    }

    pub(crate) fn follow_location(mut self) -> Self {
        self.follow_up = FollowUp::Location;
        self
    }

    pub(crate) fn then_fetch(mut self, request: ApiRequest) -> Self {
        self.follow_up = FollowUp::Fetch(request);
        self
    }

    /// Decode the final response of this operation.
    pub fn decode(&self, response: &HttpResponse) -> Result<R, HarvestError> {
        (self.decode)(response)
    }

    /// Select the second request to issue after `first`, if any.
    pub(crate) fn next_request(
        &self,
        first: &HttpResponse,
        base_url: &str,
    ) -> Result<Option<ApiRequest>, HarvestError> {
        match &self.follow_up {
            FollowUp::None => Ok(None),
            FollowUp::Fetch(request) => {
                check_status(first)?;
                Ok(Some(request.clone()))
            }
            FollowUp::Location => {
                if !first.is_success() || !first.body.trim().is_empty() {
                    return Ok(None);
                }
                Ok(first
                    .header("location")
                    .map(|location| ApiRequest::get(relative_path(location, base_url))))
            }
        }
    }
}

impl<M: Model> Operation<M> {
    /// Decode a single record.
    pub fn one(request: ApiRequest) -> Self {
        Self {
            request,
            follow_up: FollowUp::None,
            decode: decode_one::<M>,
        }
    }
}

impl<M: Model> Operation<Vec<M>> {
    /// Decode a JSON array of records.
    pub fn many(request: ApiRequest) -> Self {
        Self {
            request,
            follow_up: FollowUp::None,
            decode: decode_many::<M>,
        }
    }
}

impl Operation<bool> {
    /// Report whether the server answered `200 OK`.
    pub fn status(request: ApiRequest) -> Self {
        Self {
            request,
            follow_up: FollowUp::None,
            decode: decode_status,
        }
    }
}

impl<R> fmt::Debug for Operation<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("request", &self.request)
            .field("follow_up", &self.follow_up)
            .finish_non_exhaustive()
    }
}

/// Resolve a `Location` value against the base URL and return the part of
/// its path below the base path, without query or fragment.
fn relative_path(location: &str, base_url: &str) -> String {
    let resolved = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))
        .and_then(|base| base.join(location).map(|url| (base, url)));
    let Ok((base, url)) = resolved else {
        let path = location.split(['?', '#']).next().unwrap_or_default();
        return path.trim_start_matches('/').to_string();
    };
    let prefix = base.path().trim_end_matches('/');
    let path = match url.path().strip_prefix(prefix) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => url.path(),
    };
    path.trim_start_matches('/').to_string()
}

/// Map non-success status codes to the appropriate `HarvestError` variant.
fn check_status(response: &HttpResponse) -> Result<(), HarvestError> {
    if response.is_success() {
        return Ok(());
    }
    if response.status == 404 {
        return Err(HarvestError::NotFound);
    }
    Err(HarvestError::Http {
        status: response.status,
        body: response.body.clone(),
    })
}

fn parse_body(response: &HttpResponse) -> Result<Value, HarvestError> {
    if response.body.trim().is_empty() {
        return Err(HarvestError::Deserialization(
            "empty response body".to_string(),
        ));
    }
    serde_json::from_str(&response.body).map_err(|e| HarvestError::Deserialization(e.to_string()))
}

/// Accept both `{"client": {...}}` and a bare record.
fn unwrap_root(value: Value, root: Option<&str>) -> Value {
    if let (Some(root), Value::Object(map)) = (root, &value) {
        if map.len() == 1 {
            if let Some(inner) = map.get(root) {
                return inner.clone();
            }
        }
    }
    value
}

fn from_value<M: Model>(value: Value) -> Result<M, HarvestError> {
    serde_json::from_value(unwrap_root(value, M::ROOT))
        .map_err(|e| HarvestError::Deserialization(e.to_string()))
}

fn decode_one<M: Model>(response: &HttpResponse) -> Result<M, HarvestError> {
    check_status(response)?;
    from_value(parse_body(response)?)
}

fn decode_many<M: Model>(response: &HttpResponse) -> Result<Vec<M>, HarvestError> {
    check_status(response)?;
    match parse_body(response)? {
        Value::Array(items) => items.into_iter().map(from_value::<M>).collect(),
        _ => Err(HarvestError::Deserialization(
            "expected a JSON array".to_string(),
        )),
    }
}

fn decode_status(response: &HttpResponse) -> Result<bool, HarvestError> {
    let ok = response.status == 200;
    if !ok {
        debug!(status = response.status, "operation reported failure status");
    }
    Ok(ok)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Client;

    fn created(location: &str) -> HttpResponse {
        HttpResponse {
            status: 201,
            headers: vec![("Location".to_string(), location.to_string())],
            body: String::new(),
        }
    }

    #[test]
    fn json_root_wraps_payload() {
        #[derive(Serialize)]
        struct Payload {
            name: &'static str,
        }
        let request = ApiRequest::post("clients")
            .json_root("client", &Payload { name: "Acme" })
            .unwrap();
        assert_eq!(
            request.json_body().unwrap(),
            &serde_json::json!({"client": {"name": "Acme"}})
        );
    }

    #[test]
    fn query_opt_skips_unset_values() {
        let request = ApiRequest::get("expenses")
            .query_opt("of_user", None::<u64>)
            .query_opt("page", Some(2));
        assert_eq!(request.query, vec![("page".to_string(), "2".to_string())]);
        assert_eq!(request.query_value("of_user"), None);
    }

    #[test]
    fn decode_one_accepts_wrapped_and_bare_records() {
        let op = Operation::<Client>::one(ApiRequest::get("clients/1"));
        let wrapped = op
            .decode(&HttpResponse::new(200, r#"{"client":{"id":1,"name":"Wrapped"}}"#))
            .unwrap();
        let bare = op
            .decode(&HttpResponse::new(200, r#"{"id":2,"name":"Bare"}"#))
            .unwrap();
        assert_eq!(wrapped.name.as_deref(), Some("Wrapped"));
        assert_eq!(bare.id, 2);
    }

    #[test]
    fn decode_many_unwraps_each_item() {
        let op = Operation::<Vec<Client>>::many(ApiRequest::get("clients"));
        let clients = op
            .decode(&HttpResponse::new(
                200,
                r#"[{"client":{"id":1,"name":"A"}},{"client":{"id":2,"name":"B"}}]"#,
            ))
            .unwrap();
        assert_eq!(clients.len(), 2);
        assert_eq!(clients[1].name.as_deref(), Some("B"));
    }

    #[test]
    fn decode_maps_404_to_not_found() {
        let op = Operation::<Client>::one(ApiRequest::get("clients/9"));
        let err = op.decode(&HttpResponse::new(404, "")).unwrap_err();
        assert!(matches!(err, HarvestError::NotFound));
    }

    #[test]
    fn decode_maps_other_failures_to_http_error() {
        let op = Operation::<Client>::one(ApiRequest::get("clients/9"));
        let err = op.decode(&HttpResponse::new(500, "boom")).unwrap_err();
        assert!(matches!(err, HarvestError::Http { status: 500, ref body } if body == "boom"));
    }

    #[test]
    fn decode_rejects_empty_and_malformed_bodies() {
        let op = Operation::<Client>::one(ApiRequest::get("clients/1"));
        assert!(matches!(
            op.decode(&HttpResponse::new(200, "")).unwrap_err(),
            HarvestError::Deserialization(_)
        ));
        assert!(matches!(
            op.decode(&HttpResponse::new(200, "not json")).unwrap_err(),
            HarvestError::Deserialization(_)
        ));
    }

    #[test]
    fn status_decoder_is_true_only_for_200() {
        let op = Operation::status(ApiRequest::delete("clients/1"));
        for (status, expected) in [(200, true), (201, false), (204, false), (404, false), (500, false)] {
            assert_eq!(op.decode(&HttpResponse::new(status, "")).unwrap(), expected, "{status}");
        }
    }

    #[test]
    fn location_follow_up_fetches_relative_path() {
        let op = Operation::<Client>::one(ApiRequest::post("clients")).follow_location();
        let next = op
            .next_request(&created("/clients/42"), "https://acme.harvestapp.com")
            .unwrap()
            .unwrap();
        assert_eq!(next, ApiRequest::get("clients/42"));
    }

    #[test]
    fn location_follow_up_strips_absolute_base_url() {
        let op = Operation::<Client>::one(ApiRequest::post("clients")).follow_location();
        let next = op
            .next_request(
                &created("https://acme.harvestapp.com/clients/42?x=1"),
                "https://acme.harvestapp.com",
            )
            .unwrap()
            .unwrap();
        assert_eq!(next.path, "clients/42");
    }

    #[test]
    fn location_follow_up_drops_base_path_prefix() {
        let op = Operation::<Client>::one(ApiRequest::post("clients")).follow_location();
        let base = "https://proxy.example/api";
        for location in [
            "/api/clients/42",
            "https://proxy.example/api/clients/42",
            "clients/42",
        ] {
            let next = op.next_request(&created(location), base).unwrap().unwrap();
            assert_eq!(next.path, "clients/42", "{location}");
        }
        let next = op
            .next_request(&created("/apiary/7"), base)
            .unwrap()
            .unwrap();
        assert_eq!(next.path, "apiary/7");
    }

    #[test]
    fn location_follow_up_is_skipped_when_body_present() {
        let op = Operation::<Client>::one(ApiRequest::post("clients")).follow_location();
        let mut response = created("/clients/42");
        response.body = r#"{"client":{"id":42}}"#.to_string();
        assert!(op.next_request(&response, "").unwrap().is_none());
    }

    #[test]
    fn fetch_follow_up_requires_success() {
        let op = Operation::<Client>::one(ApiRequest::post("clients/1/toggle"))
            .then_fetch(ApiRequest::get("clients/1"));
        let err = op
            .next_request(&HttpResponse::new(403, "nope"), "")
            .unwrap_err();
        assert!(matches!(err, HarvestError::Http { status: 403, .. }));
        let next = op.next_request(&HttpResponse::new(200, ""), "").unwrap();
        assert_eq!(next, Some(ApiRequest::get("clients/1")));
    }

    #[test]
    fn file_part_encodes_single_multipart_section() {
        let part = FilePart {
            field: "expense[receipt]".to_string(),
            file_name: "receipt.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: b"PNG".to_vec(),
        };
        let encoded = String::from_utf8(part.encode("XYZ")).unwrap();
        assert_eq!(
            encoded,
            "--XYZ\r\nContent-Disposition: form-data; name=\"expense[receipt]\"; filename=\"receipt.png\"\r\nContent-Type: image/png\r\n\r\nPNG\r\n--XYZ--\r\n"
        );
    }
}
