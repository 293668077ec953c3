//! Default responder used when no redirect matches.

use axum::Router;

/// Answers every request with `200 Hello, world!`.
pub fn hello() -> Router {
    Router::new().fallback(hello_world)
}

async fn hello_world() -> &'static str {
    "Hello, world!"
}
