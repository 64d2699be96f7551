use axum::extract::FromRef;

use crate::record_store::RecordStore;
use std::sync::Arc;
use std::time::Instant;

use super::auth::AdminAuth;
use super::images::ImageProcessor;
use super::ttl_cache::UrlProber;
use super::ServerConfig;

pub type GuardedRecordStore = Arc<dyn RecordStore>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub record_store: GuardedRecordStore,
    pub admin_auth: AdminAuth,
    pub image_processor: Arc<ImageProcessor>,
    pub url_prober: Arc<UrlProber>,
    pub hash: String,
}

impl FromRef<ServerState> for GuardedRecordStore {
    fn from_ref(input: &ServerState) -> Self {
        input.record_store.clone()
    }
}

impl FromRef<ServerState> for AdminAuth {
    fn from_ref(input: &ServerState) -> Self {
        input.admin_auth.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}

impl FromRef<ServerState> for Arc<ImageProcessor> {
    fn from_ref(input: &ServerState) -> Self {
        input.image_processor.clone()
    }
}
