use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::{fmt::Debug, path::PathBuf};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;
mod record_store;
mod server;
mod sqlite_persistence;

use config::{AppConfig, CliConfig, FileConfig};
use record_store::SqliteRecordStore;
use server::auth::AdminAuth;
use server::{run_server, RequestsLoggingLevel, ServerConfig};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Directory holding the SQLite records database.
    #[clap(long, value_parser = parse_path)]
    pub db_dir: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Allowed CORS origin; omit to allow any origin.
    #[clap(long)]
    pub allowed_origin: Option<String>,

    /// Require every descriptive field on create/update, not just title and
    /// synopsis.
    #[clap(long)]
    pub strict_validation: bool,

    /// Admin username for the login endpoint.
    #[clap(long)]
    pub admin_username: Option<String>,

    /// Argon2 digest of the admin password (generate with the cli-hash binary).
    #[clap(long)]
    pub admin_password_hash: Option<String>,

    /// Secret used to sign session tokens.
    #[clap(long)]
    pub token_secret: Option<String>,

    /// Optional TOML config file; its values override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };

    let cli_config = CliConfig {
        db_dir: cli_args.db_dir,
        port: cli_args.port,
        logging_level: cli_args.logging_level,
        allowed_origin: cli_args.allowed_origin,
        strict_validation: cli_args.strict_validation,
        admin_username: cli_args.admin_username,
        admin_password_hash: cli_args.admin_password_hash,
        token_secret: cli_args.token_secret,
    };
    let app_config = AppConfig::resolve(&cli_config, file_config)?;

    let db_path = app_config.records_db_path();
    info!("Opening SQLite records database at {:?}...", db_path);
    let record_store = Arc::new(SqliteRecordStore::new(&db_path)?);

    let admin_auth = AdminAuth::new(
        app_config.admin_username.clone(),
        app_config.admin_password_hash.clone(),
        app_config.token_secret.clone(),
    );

    let server_config = ServerConfig {
        requests_logging_level: app_config.logging_level.clone(),
        port: app_config.port,
        allowed_origin: app_config.allowed_origin.clone(),
        validation_policy: app_config.validation_policy,
    };

    info!("Ready to serve at port {}!", server_config.port);
    run_server(server_config, record_store, admin_auth).await
}
