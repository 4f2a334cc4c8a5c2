//! Resource HTTP Routes
//!
//! One router per record type, all sharing the same handlers. The gate
//! runs before any key, field or body is looked at.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use crate::auth::{AuthError, AuthorizationGate};
use crate::resource::{
    FieldSet, MessageResponse, Operation, Record, ResourceError, ResourceHandler,
};

/// Shared state of one resource router
pub struct ResourceState<R: Record> {
    pub handler: ResourceHandler<R>,
    pub gate: Arc<AuthorizationGate>,
}

impl<R: Record> ResourceState<R> {
    fn authorize(&self, headers: &HeaderMap, op: Operation) -> Result<(), ApiError> {
        self.gate
            .authorize(headers, self.handler.required_role(op))
            .map(|_| ())
            .map_err(ApiError::from)
    }

    fn requested_key(&self, params: HashMap<String, String>) -> Result<R::Key, ApiError> {
        Ok(self.handler.parse_key(&FieldSet::new(params))?)
    }
}

/// Failure of a resource request
#[derive(Debug)]
pub enum ApiError {
    Auth(AuthError),
    Resource(ResourceError),
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        ApiError::Auth(e)
    }
}

impl From<ResourceError> for ApiError {
    fn from(e: ResourceError) -> Self {
        ApiError::Resource(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Auth(e) => e.into_response(),
            ApiError::Resource(e) => e.into_response(),
        }
    }
}

/// Routes for `R` under `/api/{collection}`
pub fn resource_routes<R: Record>(
    handler: ResourceHandler<R>,
    gate: Arc<AuthorizationGate>,
) -> Router {
    let prefix = format!("/api/{}", R::COLLECTION);
    let state = Arc::new(ResourceState { handler, gate });

    Router::new()
        .route(&format!("{}/all", prefix), get(list_handler::<R>))
        .route(&format!("{}/post", prefix), post(create_handler::<R>))
        .route(
            &prefix,
            get(get_handler::<R>)
                .put(update_handler::<R>)
                .delete(delete_handler::<R>),
        )
        .with_state(state)
}

// ==================
// Handlers
// ==================

async fn list_handler<R: Record>(
    State(state): State<Arc<ResourceState<R>>>,
    headers: HeaderMap,
) -> Result<Json<Vec<R>>, ApiError> {
    state.authorize(&headers, Operation::List)?;
    Ok(Json(state.handler.list_all()?))
}

async fn get_handler<R: Record>(
    State(state): State<Arc<ResourceState<R>>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<R>, ApiError> {
    state.authorize(&headers, Operation::Get)?;
    let key = state.requested_key(params)?;
    Ok(Json(state.handler.get_by_key(&key)?))
}

async fn create_handler<R: Record>(
    State(state): State<Arc<ResourceState<R>>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<R>, ApiError> {
    state.authorize(&headers, Operation::Create)?;
    Ok(Json(state.handler.create(&FieldSet::new(params))?))
}

async fn update_handler<R: Record>(
    State(state): State<Arc<ResourceState<R>>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
    body: Result<Json<R>, JsonRejection>,
) -> Result<Json<R>, ApiError> {
    state.authorize(&headers, Operation::Update)?;
    let key = state.requested_key(params)?;
    let Json(replacement) = body.map_err(|e| {
        state
            .handler
            .malformed_input(ResourceError::malformed(e.body_text()))
    })?;
    Ok(Json(state.handler.update(&key, replacement)?))
}

async fn delete_handler<R: Record>(
    State(state): State<Arc<ResourceState<R>>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.authorize(&headers, Operation::Delete)?;
    let key = state.requested_key(params)?;
    Ok(Json(state.handler.delete(&key)?))
}
