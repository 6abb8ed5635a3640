//! Per-request options and redirect derivation.
//!
//! # Design
//! `RequestOptions` is the unit passed to a transport for one hop. A
//! redirect never mutates the options of the hop that produced it; it
//! derives a fresh copy with the method forced to `GET` and the location
//! applied.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ClientError, TransportError};

/// Target and shape of one HTTP request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestOptions {
    /// `"http"`, `"https"` or their colon-terminated forms. `None` falls
    /// back to the plaintext transport.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    pub host: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    pub path: String,
    pub method: String,
    pub headers: BTreeMap<String, String>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            protocol: None,
            host: "localhost".to_string(),
            port: None,
            path: "/".to_string(),
            method: "GET".to_string(),
            headers: BTreeMap::new(),
        }
    }
}

impl RequestOptions {
    pub fn new(host: &str, path: &str) -> Self {
        Self {
            host: host.to_string(),
            path: path.to_string(),
            ..Self::default()
        }
    }

    pub fn with_protocol(mut self, protocol: &str) -> Self {
        self.protocol = Some(protocol.to_string());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_method(mut self, method: &str) -> Self {
        self.method = method.to_string();
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    /// Returns the options with `protocol` colon-terminated.
    pub fn normalized(mut self) -> Self {
        self.protocol = normalize_protocol(self.protocol.as_deref());
        self
    }

    /// Renders `{scheme}//{host}[:{port}]{path}`. An absent protocol
    /// renders as `http:`.
    pub fn url(&self) -> String {
        let scheme = normalize_protocol(self.protocol.as_deref()).unwrap_or_else(|| "http:".to_string());
        let path = if self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        };
        let host = if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };
        match self.port {
            Some(port) => format!("{scheme}//{host}:{port}{path}"),
            None => format!("{scheme}//{host}{path}"),
        }
    }

    /// Derives the options of the hop that follows a redirect to `location`.
    ///
    /// The copy keeps headers, forces `GET`, and resolves `location`
    /// against the current URL: a relative reference replaces the path
    /// (and query), an absolute one also replaces protocol, host and port.
    pub fn redirected(&self, location: &str) -> Result<Self, ClientError> {
        let invalid = |reason: String| ClientError::InvalidLocation {
            location: location.to_string(),
            reason,
        };
        let base = Url::parse(&self.url())
            .map_err(|e| TransportError::InvalidRequest(format!("{}: {e}", self.url())))?;
        let target = base.join(location).map_err(|e| invalid(e.to_string()))?;

        let mut next = self.clone();
        next.method = "GET".to_string();
        next.path = match target.query() {
            Some(query) => format!("{}?{query}", target.path()),
            None => target.path().to_string(),
        };

        if target.origin() != base.origin() {
            let host = target
                .host_str()
                .ok_or_else(|| invalid("location has no host".to_string()))?;
            next.protocol = Some(format!("{}:", target.scheme()));
            next.host = host.to_string();
            next.port = target.port();
        }
        Ok(next)
    }
}

/// Appends the scheme terminator to a protocol that lacks one.
pub fn normalize_protocol(protocol: Option<&str>) -> Option<String> {
    protocol.map(|p| {
        if p.ends_with(':') {
            p.to_string()
        } else {
            format!("{p}:")
        }
    })
}
