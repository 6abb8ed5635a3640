use axum::{
    extract::{Path, Query},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Router,
};
use serde::Deserialize;
use tokio::net::TcpListener;

#[derive(Deserialize)]
pub struct AbsoluteTarget {
    pub to: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/redirect/{hops}", get(redirect_chain))
        .route("/loop", any(redirect_loop))
        .route("/status/{code}", any(status))
        .route("/absolute", get(absolute))
        .route("/final", any(final_page))
        .route("/echo", any(echo))
        .route("/bytes/{len}", get(filler))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// `/redirect/{n}` answers 302 to `/redirect/{n-1}` until `n` reaches zero.
async fn redirect_chain(Path(hops): Path<u32>) -> Response {
    if hops == 0 {
        return (StatusCode::OK, "chain complete").into_response();
    }
    found(format!("/redirect/{}", hops - 1))
}

async fn redirect_loop() -> Response {
    found("/loop".to_string())
}

/// Answers with `code`; redirection codes point at `/final`.
async fn status(Path(code): Path<u16>) -> Result<Response, StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    if status.is_redirection() {
        return Ok((status, [(header::LOCATION, "/final")]).into_response());
    }
    Ok(status.into_response())
}

async fn absolute(Query(target): Query<AbsoluteTarget>) -> Response {
    found(target.to)
}

async fn final_page(method: Method) -> String {
    format!("final {method}")
}

async fn echo(method: Method, body: String) -> String {
    format!("{method} {body}")
}

/// Answers 200 with `len` filler bytes.
async fn filler(Path(len): Path<usize>) -> Vec<u8> {
    vec![b'x'; len]
}

fn found(location: String) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}
