use super::RequestsLoggingLevel;
use crate::record_store::ValidationPolicy;

#[derive(Clone)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    /// `Access-Control-Allow-Origin` value; `None` allows any origin.
    pub allowed_origin: Option<String>,
    pub validation_policy: ValidationPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 3001,
            allowed_origin: None,
            validation_policy: ValidationPolicy::Baseline,
        }
    }
}
