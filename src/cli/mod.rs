//! CLI module for the campus API
//!
//! Provides command-line interface for:
//! - serve: Run the HTTP server
//! - token: Mint a bearer token for operators and tests

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{run, run_command, serve, token, Config, JwtSettings, JWT_SECRET_ENV};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_json, write_json_to};
