//! # HTTP Server Module
//!
//! Axum server exposing every campus resource under `/api`.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/api/{collection}/all` - List records
//! - `/api/{collection}/post` - Create a record from query parameters
//! - `/api/{collection}?{key}=` - Get, replace or delete one record

pub mod config;
pub mod health;
pub mod resource_routes;
pub mod server;

pub use config::HttpServerConfig;
pub use resource_routes::{resource_routes, ApiError, ResourceState};
pub use server::{HttpServer, REQUEST_ID_HEADER};
