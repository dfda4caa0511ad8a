//! Typed client for the Harvest time tracking and invoicing API.
//!
//! # Overview
//! Every remote operation is a method on a resource handle
//! (`client.invoices().list(..)`, `client.people().toggle(id)`, ...). The
//! method builds an [`Operation`]: verb, path, query, payload and the way the
//! response is decoded. The returned [`Call`] runs it through an injected
//! transport, blocking via [`Transport`] or asynchronously via
//! [`AsyncTransport`] with cancellation.
//!
//! # Design
//! - `HarvestClient` holds only configuration and the transport; it is
//!   stateless between calls.
//! - Request building is pure, so every operation can be inspected with
//!   [`Call::into_operation`] without touching the network.
//! - Typed operations fail on non-2xx responses; delete and state-change
//!   operations return `false` instead.
//! - `ureq` and `reqwest` backends live behind the `ureq-transport` and
//!   `reqwest-transport` features.
//!
//! ```no_run
//! use harvest_core::{HarvestClient, HarvestConfig, UreqTransport};
//!
//! let config = HarvestConfig::builder()
//!     .subdomain("acme")
//!     .basic_auth("me@acme.test", "secret")
//!     .build()?;
//! let client = HarvestClient::new(config, UreqTransport::default());
//! for project in client.projects().list(None, None).send()? {
//!     println!("{:?}", project.name);
//! }
//! # Ok::<(), harvest_core::HarvestError>(())
//! ```

pub mod backends;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
mod params;
pub mod request;
pub mod resources;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testing;

#[cfg(feature = "reqwest-transport")]
pub use backends::ReqwestTransport;
#[cfg(feature = "ureq-transport")]
pub use backends::UreqTransport;
pub use client::{Call, HarvestClient};
pub use config::{Credentials, HarvestConfig, HarvestConfigBuilder};
pub use error::HarvestError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use request::{ApiRequest, FilePart, FollowUp, Operation, RequestBody};
pub use resources::{EntryFilter, ExpenseFilter, InvoiceFilter};
pub use transport::{AsyncTransport, Transport, TransportError};
pub use tokio_util::sync::CancellationToken;
pub use types::*;
