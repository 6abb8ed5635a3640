//! Redirect handling against the live mock server.
//!
//! # Design
//! Each test starts the mock server on a random port, then drives real HTTP
//! through the default ureq transports. The server answers with genuine
//! 3xx responses, so these tests cover the transport's "redirects as data"
//! configuration as well as the client's policy.

use std::io::Cursor;
use std::net::SocketAddr;

use redirect_core::{
    Body, ClientEvent, ErrorKind, EventLog, RedirectClient, RedirectOverrides, RequestOptions,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn start_server() -> SocketAddr {
    init_logging();
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

fn options(addr: SocketAddr, path: &str) -> RequestOptions {
    RequestOptions::new(&addr.ip().to_string(), path)
        .with_protocol("http")
        .with_port(addr.port())
}

#[test]
fn follows_redirect_chain_to_final_response() {
    let addr = start_server();
    let client = RedirectClient::new(RedirectOverrides::default());
    let mut log = EventLog::default();

    let response = client.request(options(addr, "/redirect/3"), None).run(&mut log).unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.body_text(), "chain complete");
    assert_eq!(log.responses, vec![(302, true), (302, true), (302, true), (200, false)]);
    let paths: Vec<&str> = log.requests.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(paths, vec!["/redirect/3", "/redirect/2", "/redirect/1", "/redirect/0"]);
    assert!(log.requests.iter().all(|r| r.protocol.as_deref() == Some("http:")));
}

#[test]
fn redirect_loop_stops_at_limit() {
    let addr = start_server();
    let client = RedirectClient::new(RedirectOverrides::default().redirect_limit(2));
    let mut operation = client.request(options(addr, "/loop"), None);

    let mut requests = 0;
    let mut error = None;
    for event in operation.by_ref() {
        match event {
            ClientEvent::Request(_) => requests += 1,
            ClientEvent::Error(err) => error = Some(err),
            ClientEvent::Response { .. } => {}
        }
    }

    assert_eq!(requests, 3);
    assert_eq!(operation.redirect_count(), 2);
    assert_eq!(error.map(|e| e.kind()), Some(ErrorKind::RedirectLimitExceeded));
}

#[test]
fn redirect_after_post_uses_get_without_body() {
    let addr = start_server();
    let client = RedirectClient::new(RedirectOverrides::default());
    let body: Body = Box::new(Cursor::new(b"form=data".to_vec()));

    let response = client
        .send(options(addr, "/status/307").with_method("POST"), Some(body))
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.body_text(), "final GET");
}

#[test]
fn body_is_streamed_to_server() {
    let addr = start_server();
    let client = RedirectClient::new(RedirectOverrides::default());
    let body: Body = Box::new(Cursor::new(b"hello".to_vec()));

    let response = client
        .send(options(addr, "/echo").with_method("POST"), Some(body))
        .unwrap();

    assert_eq!(response.body_text(), "POST hello");
}

#[test]
fn disabled_following_returns_redirect_response() {
    let addr = start_server();
    let client = RedirectClient::new(RedirectOverrides::default().follow_redirects(false));
    let mut log = EventLog::default();

    let response = client.request(options(addr, "/status/302"), None).run(&mut log).unwrap();

    assert_eq!(response.status, 302);
    assert_eq!(response.location(), Some("/final"));
    assert_eq!(log.requests.len(), 1);
    assert_eq!(log.responses, vec![(302, false)]);
}

#[test]
fn status_outside_policy_is_final() {
    let addr = start_server();
    let client = RedirectClient::new(RedirectOverrides::default());

    let response = client.send(options(addr, "/status/308"), None).unwrap();

    assert_eq!(response.status, 308);
}

#[test]
fn absolute_location_is_followed() {
    let addr = start_server();
    let client = RedirectClient::new(RedirectOverrides::default());
    let path = format!("/absolute?to=http%3A%2F%2F{}%3A{}%2Ffinal", addr.ip(), addr.port());

    let response = client.send(options(addr, &path), None).unwrap();

    assert_eq!(response.body_text(), "final GET");
}

#[test]
fn body_larger_than_ten_mib_is_delivered() {
    let addr = start_server();
    let client = RedirectClient::new(RedirectOverrides::default());
    let len = 11 * 1024 * 1024;
    let mut log = EventLog::default();

    let response = client
        .request(options(addr, &format!("/bytes/{len}")), None)
        .run(&mut log)
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.body.len(), len);
    assert_eq!(log.responses, vec![(200, false)]);
    assert!(log.errors.is_empty());
}

#[test]
fn connection_refused_is_transport_error() {
    init_logging();
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let client = RedirectClient::new(RedirectOverrides::default());
    let mut log = EventLog::default();

    let outcome = client.request(options(addr, "/"), None).run(&mut log);

    assert!(outcome.is_none());
    assert_eq!(log.sequence, vec!["request", "error"]);
}

#[test]
fn https_against_plaintext_server_fails_in_transport() {
    let addr = start_server();
    let client = RedirectClient::new(RedirectOverrides::default());

    let err = client
        .send(options(addr, "/final").with_protocol("https"), None)
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
}
