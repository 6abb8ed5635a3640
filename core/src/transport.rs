//! Transport collaborators and scheme-based selection.
//!
//! # Design
//! A `Transport` performs exactly one hop: it sends the request described
//! by `RequestOptions`, streams the optional body, and returns the response
//! as data. It never follows redirects itself. The client picks between the
//! plaintext and secure variants with `Scheme::from_protocol`, a pure
//! function of the normalized protocol.

use std::sync::Arc;

use log::debug;
use ureq::{Agent, SendBody};

use crate::error::TransportError;
use crate::http::{Body, HttpResponse};
use crate::options::{normalize_protocol, RequestOptions};

/// Which transport variant handles a hop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Plain,
    Secure,
}

impl Scheme {
    /// `https` in either form selects `Secure`; anything else, including an
    /// absent protocol, selects `Plain`.
    pub fn from_protocol(protocol: Option<&str>) -> Self {
        match normalize_protocol(protocol).as_deref() {
            Some("https:") => Scheme::Secure,
            _ => Scheme::Plain,
        }
    }
}

/// Issues a single request and returns its response.
///
/// `body == None` finishes the request without a body; `Some` streams the
/// reader to completion as the request body.
pub trait Transport: Send + Sync {
    fn issue(&self, options: &RequestOptions, body: Option<Body>) -> Result<HttpResponse, TransportError>;
}

/// `Transport` backed by a ureq agent with redirect following disabled.
#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
    scheme: Scheme,
}

impl UreqTransport {
    pub fn plain() -> Self {
        Self::with_scheme(Scheme::Plain)
    }

    pub fn secure() -> Self {
        Self::with_scheme(Scheme::Secure)
    }

    fn with_scheme(scheme: Scheme) -> Self {
        // Status codes come back as data so the client sees every 3xx.
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(0)
            .max_redirects_will_error(false)
            .https_only(scheme == Scheme::Secure)
            .build()
            .new_agent();
        Self { agent, scheme }
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }
}

impl Transport for UreqTransport {
    fn issue(&self, options: &RequestOptions, body: Option<Body>) -> Result<HttpResponse, TransportError> {
        let url = options.url();
        debug!("{:?} transport: {} {url}", self.scheme, options.method);

        let mut builder = ureq::http::Request::builder()
            .method(options.method.as_str())
            .uri(url.as_str());
        for (name, value) in &options.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let result = match body {
            Some(mut reader) => {
                let request = builder
                    .body(SendBody::from_reader(&mut reader))
                    .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
                self.agent.run(request)
            }
            None => {
                let request = builder
                    .body(())
                    .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
                self.agent.run(request)
            }
        };

        let mut response = result?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        // ureq caps reads at 10 MiB unless told otherwise.
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()?;

        Ok(HttpResponse { status, headers, body })
    }
}

/// The two transport variants a client chooses between.
#[derive(Clone)]
pub struct Transports {
    plain: Arc<dyn Transport>,
    secure: Arc<dyn Transport>,
}

impl Transports {
    pub fn new(plain: Arc<dyn Transport>, secure: Arc<dyn Transport>) -> Self {
        Self { plain, secure }
    }

    pub fn select(&self, scheme: Scheme) -> &dyn Transport {
        match scheme {
            Scheme::Plain => self.plain.as_ref(),
            Scheme::Secure => self.secure.as_ref(),
        }
    }
}

impl Default for Transports {
    fn default() -> Self {
        Self::new(Arc::new(UreqTransport::plain()), Arc::new(UreqTransport::secure()))
    }
}

impl std::fmt::Debug for Transports {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transports").finish_non_exhaustive()
    }
}
