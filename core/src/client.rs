//! Redirect-following request orchestrator.
//!
//! # Design
//! `RedirectClient` holds only the immutable redirect policy and the two
//! transports. Each call to `request` starts a logical operation with its
//! own `Operation` value carrying the redirect count, so overlapping
//! operations on one client never share accounting.
//!
//! An `Operation` is a lazy event stream: nothing touches the network until
//! it is polled, and each hop is only issued after the previous response has
//! been fully evaluated.

use std::collections::VecDeque;
use std::mem;

use log::{debug, info, warn};
use uuid::Uuid;

use crate::config::{RedirectConfig, RedirectOverrides};
use crate::error::{ClientError, TransportError};
use crate::event::{ClientEvent, ClientObserver};
use crate::http::{Body, HttpResponse};
use crate::options::RequestOptions;
use crate::transport::{Scheme, Transports};

/// HTTP client that follows redirects according to a `RedirectConfig`.
#[derive(Debug, Clone, Default)]
pub struct RedirectClient {
    config: RedirectConfig,
    transports: Transports,
}

impl RedirectClient {
    /// Builds a client whose policy is `overrides` merged over the defaults.
    pub fn new(overrides: RedirectOverrides) -> Self {
        Self::with_config(RedirectConfig::merged(overrides))
    }

    pub fn with_config(config: RedirectConfig) -> Self {
        Self::with_transports(config, Transports::default())
    }

    pub fn with_transports(config: RedirectConfig, transports: Transports) -> Self {
        Self { config, transports }
    }

    pub fn config(&self) -> &RedirectConfig {
        &self.config
    }

    /// Starts a logical operation. Returns immediately; the hops run as the
    /// returned `Operation` is polled.
    pub fn request(&self, options: RequestOptions, body: Option<Body>) -> Operation<'_> {
        let operation = Operation {
            client: self,
            id: Uuid::new_v4(),
            redirect_count: 0,
            stage: Stage::Issue(options, body),
            pending: VecDeque::new(),
        };
        debug!("[{}] operation started", operation.id);
        operation
    }

    /// Runs a logical operation to completion and returns its final response.
    pub fn send(&self, options: RequestOptions, body: Option<Body>) -> Result<HttpResponse, ClientError> {
        let mut last_response = None;
        for event in self.request(options, body) {
            match event {
                ClientEvent::Request(_) => {}
                ClientEvent::Response { response, .. } => last_response = Some(response),
                ClientEvent::Error(err) => return Err(err),
            }
        }
        last_response.ok_or_else(|| {
            TransportError::InvalidRequest("operation ended without a response".to_string()).into()
        })
    }
}

enum Stage {
    /// Emit the `Request` event for these options.
    Issue(RequestOptions, Option<Body>),
    /// Hand the announced options to the transport.
    Send(RequestOptions, Option<Body>),
    Completed,
}

/// One logical operation: a chain of hops driven by the redirect policy.
///
/// Iterating yields the operation's `ClientEvent`s in emission order and
/// ends once a non-redirecting response or an error has been yielded.
pub struct Operation<'a> {
    client: &'a RedirectClient,
    id: Uuid,
    redirect_count: u32,
    stage: Stage,
    pending: VecDeque<ClientEvent>,
}

impl Operation<'_> {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Redirects taken so far by this operation.
    pub fn redirect_count(&self) -> u32 {
        self.redirect_count
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.stage, Stage::Completed) && self.pending.is_empty()
    }

    /// Drives the operation to completion, dispatching every event to
    /// `observer`. Returns the final response unless the operation failed.
    pub fn run<O: ClientObserver + ?Sized>(mut self, observer: &mut O) -> Option<HttpResponse> {
        let mut outcome = None;
        for event in self.by_ref() {
            observer.dispatch(&event);
            match event {
                ClientEvent::Response {
                    response,
                    will_redirect: false,
                } => outcome = Some(response),
                ClientEvent::Error(_) => outcome = None,
                _ => {}
            }
        }
        outcome
    }

    fn send_hop(&mut self, options: RequestOptions, body: Option<Body>) {
        let scheme = Scheme::from_protocol(options.protocol.as_deref());
        let client = self.client;
        let transport = client.transports.select(scheme);
        debug!(
            "[{}] {} {} via {:?} transport (body: {})",
            self.id,
            options.method,
            options.url(),
            scheme,
            body.is_some()
        );

        match transport.issue(&options, body) {
            Ok(response) => self.handle_response(&options, response),
            Err(err) => {
                debug!("[{}] transport error: {err}", self.id);
                self.pending.push_back(ClientEvent::Error(err.into()));
            }
        }
    }

    fn handle_response(&mut self, options: &RequestOptions, response: HttpResponse) {
        let client = self.client;
        let config = &client.config;
        if !config.should_redirect(response.status) {
            debug!("[{}] completed with status {}", self.id, response.status);
            self.respond(response, false);
            return;
        }

        if self.redirect_count >= config.redirect_limit {
            warn!(
                "[{}] redirect limit {} reached at status {}",
                self.id, config.redirect_limit, response.status
            );
            self.respond(response, false);
            self.fail(ClientError::RedirectLimitExceeded {
                limit: config.redirect_limit,
            });
            return;
        }

        let next = match response.location() {
            Some(location) => options.redirected(location),
            None => Err(ClientError::MissingLocation {
                status: response.status,
            }),
        };
        match next {
            Ok(next) => {
                self.redirect_count += 1;
                info!(
                    "[{}] redirect {}/{}: {} -> {}",
                    self.id,
                    self.redirect_count,
                    config.redirect_limit,
                    response.status,
                    next.url()
                );
                self.respond(response, true);
                self.stage = Stage::Issue(next, None);
            }
            Err(err) => {
                self.respond(response, false);
                self.fail(err);
            }
        }
    }

    fn respond(&mut self, response: HttpResponse, will_redirect: bool) {
        self.pending.push_back(ClientEvent::Response {
            response,
            will_redirect,
        });
    }

    fn fail(&mut self, err: ClientError) {
        self.pending.push_back(ClientEvent::Error(err));
    }
}

impl Iterator for Operation<'_> {
    type Item = ClientEvent;

    fn next(&mut self) -> Option<ClientEvent> {
        if let Some(event) = self.pending.pop_front() {
            return Some(event);
        }
        match mem::replace(&mut self.stage, Stage::Completed) {
            Stage::Issue(options, body) => {
                let options = options.normalized();
                self.stage = Stage::Send(options.clone(), body);
                Some(ClientEvent::Request(options))
            }
            Stage::Send(options, body) => {
                self.send_hop(options, body);
                self.pending.pop_front()
            }
            Stage::Completed => None,
        }
    }
}
