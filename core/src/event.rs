//! Lifecycle events of a logical operation and the observer that receives them.

use crate::error::ClientError;
use crate::http::HttpResponse;
use crate::options::RequestOptions;

/// One signal emitted while an operation runs.
///
/// Per operation the order is
/// `Request → [Response(will_redirect: true) → Request]* → Response(false) | Error`.
/// When the redirect limit is hit, the offending response is reported with
/// `will_redirect: false` immediately before the `Error`, so the error is
/// always the last event. Observers that expect the error first, followed by
/// the response, must not rely on that order here.
#[derive(Debug)]
pub enum ClientEvent {
    /// A hop is about to be issued with these normalized options.
    Request(RequestOptions),
    /// A hop produced a response. `will_redirect` is true only when this
    /// response caused another hop.
    Response { response: HttpResponse, will_redirect: bool },
    /// The operation failed and will emit nothing further.
    Error(ClientError),
}

/// Handler registration for operation events. Every method defaults to a no-op.
pub trait ClientObserver {
    fn on_request(&mut self, _options: &RequestOptions) {}

    fn on_response(&mut self, _response: &HttpResponse, _will_redirect: bool) {}

    fn on_error(&mut self, _error: &ClientError) {}

    fn dispatch(&mut self, event: &ClientEvent) {
        match event {
            ClientEvent::Request(options) => self.on_request(options),
            ClientEvent::Response { response, will_redirect } => self.on_response(response, *will_redirect),
            ClientEvent::Error(error) => self.on_error(error),
        }
    }
}

/// Observer that keeps every event it sees, in order.
#[derive(Debug, Default)]
pub struct EventLog {
    pub requests: Vec<RequestOptions>,
    pub responses: Vec<(u16, bool)>,
    pub errors: Vec<String>,
    pub sequence: Vec<&'static str>,
}

impl ClientObserver for EventLog {
    fn on_request(&mut self, options: &RequestOptions) {
        self.requests.push(options.clone());
        self.sequence.push("request");
    }

    fn on_response(&mut self, response: &HttpResponse, will_redirect: bool) {
        self.responses.push((response.status, will_redirect));
        self.sequence.push("response");
    }

    fn on_error(&mut self, error: &ClientError) {
        self.errors.push(error.to_string());
        self.sequence.push("error");
    }
}
