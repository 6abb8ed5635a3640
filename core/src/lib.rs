//! Redirect-following HTTP client core.
//!
//! # Overview
//! Issues a request over HTTP or HTTPS and follows redirect responses
//! according to a configurable policy. Network I/O for each hop is delegated
//! to a `Transport`; the default transports are backed by ureq.
//!
//! # Design
//! - `RedirectClient` is immutable after construction: it holds the merged
//!   `RedirectConfig` and the plaintext/secure `Transports`.
//! - `RedirectClient::request` returns an `Operation`, a lazy iterator of
//!   `ClientEvent`s (`Request`, `Response`, `Error`). Each operation owns its
//!   redirect count.
//! - `ClientObserver` receives the same events as callbacks via
//!   `Operation::run`.
//! - Redirect locations are resolved against the current request URL, so
//!   absolute locations may switch host and transport.

pub mod client;
pub mod config;
pub mod error;
pub mod event;
pub mod http;
pub mod options;
pub mod transport;

pub use client::{Operation, RedirectClient};
pub use config::{RedirectConfig, RedirectOverrides};
pub use error::{ClientError, ErrorKind, TransportError};
pub use event::{ClientEvent, ClientObserver, EventLog};
pub use http::{Body, HttpResponse};
pub use options::RequestOptions;
pub use transport::{Scheme, Transport, Transports, UreqTransport};
