mod file_config;

pub use file_config::FileConfig;

use crate::record_store::ValidationPolicy;
use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub allowed_origin: Option<String>,
    pub strict_validation: bool,
    pub admin_username: Option<String>,
    pub admin_password_hash: Option<String>,
    pub token_secret: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_dir: PathBuf,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub allowed_origin: Option<String>,
    pub validation_policy: ValidationPolicy,

    pub admin_username: String,
    pub admin_password_hash: String,
    pub token_secret: String,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;

        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let port = file.port.unwrap_or(cli.port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let allowed_origin = file.allowed_origin.or_else(|| cli.allowed_origin.clone());

        let validation_policy = match file.strict_validation.unwrap_or(cli.strict_validation) {
            true => ValidationPolicy::Strict,
            false => ValidationPolicy::Baseline,
        };

        let admin_username = file
            .admin_username
            .or_else(|| cli.admin_username.clone())
            .ok_or_else(|| anyhow::anyhow!("admin_username must be specified"))?;

        let admin_password_hash = file
            .admin_password_hash
            .or_else(|| cli.admin_password_hash.clone())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "admin_password_hash must be specified (generate one with the cli-hash binary)"
                )
            })?;

        let token_secret = file
            .token_secret
            .or_else(|| cli.token_secret.clone())
            .ok_or_else(|| anyhow::anyhow!("token_secret must be specified"))?;

        Ok(Self {
            db_dir,
            port,
            logging_level,
            allowed_origin,
            validation_policy,
            admin_username,
            admin_password_hash,
            token_secret,
        })
    }

    pub fn records_db_path(&self) -> PathBuf {
        self.db_dir.join("records.db")
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
