//! CLI command implementations
//!
//! `serve` loads the configuration, opens the record stores and runs the
//! HTTP server until interrupted. `token` mints a bearer token with the
//! same signing settings the server validates against.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthorizationGate, JwtConfig, JwtManager, Role};
use crate::http_server::{HttpServer, HttpServerConfig};
use crate::observability::{log_event_with_fields, Event, Logger, Severity};
use crate::records::Resources;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::write_json;

/// Environment variable overriding `jwt.secret`
pub const JWT_SECRET_ENV: &str = "CAMPUS_API_JWT_SECRET";

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP listener settings
    #[serde(default)]
    pub http: HttpServerConfig,

    /// Token signing and validation settings
    #[serde(default)]
    pub jwt: JwtSettings,

    /// Directory for JSON snapshots; absent keeps records in memory
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Answer organization deletes with `record <key> deleted`
    #[serde(default)]
    pub legacy_delete_messages: bool,

    /// Minimum severity written to the log (default: "INFO")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Token settings as written in the configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtSettings {
    /// HS256 signing secret (required)
    #[serde(default)]
    pub secret: String,

    #[serde(default = "default_token_party")]
    pub issuer: String,

    #[serde(default = "default_token_party")]
    pub audience: String,

    #[serde(default = "default_token_ttl")]
    pub access_token_ttl_minutes: i64,
}

fn default_log_level() -> String {
    "INFO".to_string()
}
fn default_token_party() -> String {
    "campus-api".to_string()
}
fn default_token_ttl() -> i64 {
    60
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http: HttpServerConfig::default(),
            jwt: JwtSettings::default(),
            data_dir: None,
            legacy_delete_messages: false,
            log_level: default_log_level(),
        }
    }
}

impl Default for JwtSettings {
    fn default() -> Self {
        Self {
            secret: String::new(),
            issuer: default_token_party(),
            audience: default_token_party(),
            access_token_ttl_minutes: default_token_ttl(),
        }
    }
}

impl JwtSettings {
    /// Fails when a token issued now could not carry its expiry
    pub fn to_jwt_config(&self) -> CliResult<JwtConfig> {
        let access_token_ttl = Duration::try_minutes(self.access_token_ttl_minutes)
            .filter(|ttl| Utc::now().checked_add_signed(*ttl).is_some())
            .ok_or_else(|| CliError::config_error("jwt.access_token_ttl_minutes is out of range"))?;

        Ok(JwtConfig {
            secret: self.secret.clone(),
            access_token_ttl,
            issuer: self.issuer.clone(),
            audience: self.audience.clone(),
        })
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        Ok(config)
    }

    /// Load from `path` if given, apply environment overrides, validate
    pub fn resolve(path: Option<&Path>) -> CliResult<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };

        if let Ok(secret) = env::var(JWT_SECRET_ENV) {
            if !secret.is_empty() {
                config.jwt.secret = secret;
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> CliResult<()> {
        if self.jwt.secret.is_empty() {
            return Err(CliError::config_error(format!(
                "jwt.secret must not be empty (set it in the config file or {})",
                JWT_SECRET_ENV
            )));
        }

        if self.jwt.access_token_ttl_minutes <= 0 {
            return Err(CliError::config_error(
                "jwt.access_token_ttl_minutes must be > 0",
            ));
        }
        self.jwt.to_jwt_config()?;

        if self.http.port == 0 {
            return Err(CliError::config_error("http.port must be > 0"));
        }

        self.severity()?;

        Ok(())
    }

    /// Parsed `log_level`
    pub fn severity(&self) -> CliResult<Severity> {
        self.log_level
            .parse::<Severity>()
            .map_err(|e| CliError::config_error(format!("Invalid log_level: {}", e)))
    }

    /// Open the record stores this configuration names
    pub fn open_resources(&self) -> CliResult<Resources> {
        match &self.data_dir {
            Some(dir) => Ok(Resources::file_backed(dir)?),
            None => Ok(Resources::in_memory()),
        }
    }
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config, port } => serve(config.as_deref(), port),
        Command::Token {
            config,
            subject,
            email,
            admin,
        } => token(config.as_deref(), &subject, email.as_deref(), admin),
    }
}

/// Start the HTTP server
///
/// 1. Load and validate configuration
/// 2. Open record stores
/// 3. Serve until interrupted
pub fn serve(config_path: Option<&Path>, port: Option<u16>) -> CliResult<()> {
    let mut config = Config::resolve(config_path)?;
    Logger::set_min_severity(config.severity()?);

    let source = config_path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults".to_string());
    log_event_with_fields(Event::ConfigLoaded, &[("source", &source)]);

    if let Some(port) = port {
        config.http.port = port;
    }

    let resources = config.open_resources()?;
    let gate = AuthorizationGate::new(config.jwt.to_jwt_config()?);
    let server = HttpServer::new(config.http.clone(), gate, resources)
        .with_legacy_delete_messages(config.legacy_delete_messages);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })?;

    Ok(())
}

/// Mint a token and print it as JSON on stdout
pub fn token(
    config_path: Option<&Path>,
    subject: &str,
    email: Option<&str>,
    admin: bool,
) -> CliResult<()> {
    let config = Config::resolve(config_path)?;
    let manager = JwtManager::new(config.jwt.to_jwt_config()?);

    let issued = manager.issue(subject, email, &token_roles(admin))?;
    write_json(&issued)
}

fn token_roles(admin: bool) -> Vec<Role> {
    if admin {
        vec![Role::User, Role::Admin]
    } else {
        vec![Role::User]
    }
}
