pub mod auth;
pub mod config;
mod error;
mod http_layers;
mod images;
mod session;
pub mod state;
mod ttl_cache;

pub mod server;

pub use config::ServerConfig;
pub use http_layers::*;
#[allow(unused_imports)] // Used by main.rs
pub use server::run_server;
