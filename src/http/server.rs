//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the redirect handler chain from configuration
//! - Create the Axum Router with the handler as its only service
//! - Wire up middleware (request ID, tracing, timeout)
//! - Serve until shutdown

use std::convert::Infallible;
use std::time::Duration;

use axum::body::Body;
use axum::http::{HeaderName, Request};
use axum::response::IntoResponse;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::Service;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{read_redirect_document, ConfigError, RedirectsConfig, ServerConfig};
use crate::http::fallback;
use crate::http::request::{make_request_span, UuidRequestId, X_REQUEST_ID};
use crate::redirect::{structured_handler, MapHandler, RedirectTable};

/// Handler chain built from configuration:
/// redirect file → inline paths → default responder.
pub type RedirectService = MapHandler<MapHandler<Router>>;

/// Build the handler chain described by `redirects`.
///
/// The redirect file is consulted first, so its entries shadow inline
/// `paths` with the same key. A file that cannot be read or parsed is an
/// error.
pub fn build_handler(redirects: &RedirectsConfig) -> Result<RedirectService, ConfigError> {
    let inline = MapHandler::new(redirects.paths.clone(), fallback::hello());
    tracing::info!(redirects = inline.table().len(), "Inline redirects loaded");

    let handler = match read_redirect_document(redirects)? {
        Some(document) => {
            let handler = structured_handler(document.format, &document.bytes, inline)
                .map_err(|source| ConfigError::Redirects {
                    path: document.path.clone(),
                    source,
                })?;
            tracing::info!(
                path = ?document.path,
                format = %document.format,
                redirects = handler.table().len(),
                "Redirect file loaded"
            );
            handler
        }
        None => MapHandler::from_table(RedirectTable::default(), inline),
    };

    Ok(handler)
}

/// HTTP server that hands every request to a redirect handler.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a server around an already built handler.
    pub fn new<S>(config: ServerConfig, handler: S) -> Self
    where
        S: Service<Request<Body>, Error = Infallible> + Clone + Send + Sync + 'static,
        S::Response: IntoResponse,
        S::Future: Send + 'static,
    {
        let router = Self::build_router(&config, handler);
        Self { router, config }
    }

    /// Create a server whose handler chain comes from `config.redirects`.
    pub fn from_config(config: ServerConfig) -> Result<Self, ConfigError> {
        let handler = build_handler(&config.redirects)?;
        Ok(Self::new(config, handler))
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router<S>(config: &ServerConfig, handler: S) -> Router
    where
        S: Service<Request<Body>, Error = Infallible> + Clone + Send + Sync + 'static,
        S::Response: IntoResponse,
        S::Future: Send + 'static,
    {
        let request_id = HeaderName::from_static(X_REQUEST_ID);

        Router::new()
            .fallback_service(handler)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
            .layer(PropagateRequestIdLayer::new(request_id.clone()))
            .layer(SetRequestIdLayer::new(request_id, UuidRequestId))
    }

    /// Run the server on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The fully layered router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}
