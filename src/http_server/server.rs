//! # HTTP Server
//!
//! Main HTTP server combining the health route and one router per
//! resource type.

use std::sync::Arc;

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::{self, Next},
    response::Response,
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use uuid::Uuid;

use crate::auth::AuthorizationGate;
use crate::observability::{log_event, log_event_with_fields, Event};
use crate::records::Resources;
use crate::resource::{DeleteMessage, ResourceHandler};

use super::config::HttpServerConfig;
use super::health::health_routes;
use super::resource_routes::resource_routes;

/// Header carrying the per-request correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// HTTP server for the campus API
pub struct HttpServer {
    config: HttpServerConfig,
    gate: Arc<AuthorizationGate>,
    resources: Resources,
    legacy_delete_messages: bool,
}

impl HttpServer {
    pub fn new(config: HttpServerConfig, gate: AuthorizationGate, resources: Resources) -> Self {
        Self {
            config,
            gate: Arc::new(gate),
            resources,
            legacy_delete_messages: false,
        }
    }

    /// Answer organization deletes with `record <key> deleted`
    pub fn with_legacy_delete_messages(mut self, enabled: bool) -> Self {
        self.legacy_delete_messages = enabled;
        self
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Build the combined router with all endpoints
    pub fn router(&self) -> Router {
        let resources = &self.resources;
        let gate = &self.gate;

        let org_deletes = if self.legacy_delete_messages {
            DeleteMessage::Legacy
        } else {
            DeleteMessage::TypeName
        };

        Router::new()
            .merge(health_routes())
            .merge(resource_routes(
                ResourceHandler::new(resources.help_requests.clone()),
                gate.clone(),
            ))
            .merge(resource_routes(
                ResourceHandler::new(resources.menu_item_reviews.clone()),
                gate.clone(),
            ))
            .merge(resource_routes(
                ResourceHandler::new(resources.recommendation_requests.clone()),
                gate.clone(),
            ))
            .merge(resource_routes(
                ResourceHandler::new(resources.dining_commons_menu_items.clone()),
                gate.clone(),
            ))
            .merge(resource_routes(
                ResourceHandler::new(resources.organizations.clone())
                    .with_delete_message(org_deletes),
                gate.clone(),
            ))
            .layer(middleware::from_fn(track_request))
            .layer(self.cors_layer())
    }

    fn cors_layer(&self) -> CorsLayer {
        let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
        if self.config.cors_origins.is_empty() {
            return layer.allow_origin(Any);
        }

        let origins: Vec<HeaderValue> = self
            .config
            .cors_origins
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect();
        layer.allow_origin(AllowOrigin::list(origins))
    }

    /// Serve until SIGINT or SIGTERM
    pub async fn start(self) -> Result<(), std::io::Error> {
        let listener = TcpListener::bind(self.socket_addr()).await?;
        let addr = listener.local_addr()?.to_string();
        log_event_with_fields(Event::ServerStart, &[("addr", &addr)]);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        log_event(Event::ServerStop);
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        // Without a handler the server runs until killed
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

/// Tag each response with a request id and log its outcome
///
/// A caller-supplied `x-request-id` is kept; otherwise a v4 UUID is minted.
async fn track_request(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty() && v.len() <= 128)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    log_event_with_fields(
        Event::RequestCompleted,
        &[
            ("request_id", &request_id),
            ("method", &method),
            ("path", &path),
            ("status", response.status().as_str()),
        ],
    );
    response
}
