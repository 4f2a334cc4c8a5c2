//! CLI argument definitions using clap
//!
//! Commands:
//! - campus-api serve [--config <path>] [--port <n>]
//! - campus-api token --subject <id> [--email <addr>] [--admin] [--config <path>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Campus API - CRUD service for campus records
#[derive(Parser, Debug)]
#[command(name = "campus-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server
    Serve {
        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Port to listen on, overriding the configuration
        #[arg(long)]
        port: Option<u16>,
    },

    /// Mint a bearer token signed with the server's secret
    Token {
        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Subject the token identifies
        #[arg(long)]
        subject: String,

        /// Email carried in the token
        #[arg(long)]
        email: Option<String>,

        /// Grant the admin role as well as user
        #[arg(long)]
        admin: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
