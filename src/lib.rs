//! campus_api - CRUD service for campus records
//!
//! Five record types (help requests, menu item reviews, recommendation
//! requests, dining commons menu items, student organizations) served
//! through one generic resource handler behind a role-based gate.

pub mod auth;
pub mod cli;
pub mod http_server;
pub mod observability;
pub mod records;
pub mod resource;
