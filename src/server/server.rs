use anyhow::Result;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use tracing::{debug, warn};

use crate::record_store::{validate_draft, MediaRecord, RecordDraft, RecordStore};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::auth::AdminAuth;
use super::error::ApiError;
use super::images::ImageProcessor;
use super::session::Session;
use super::state::{GuardedRecordStore, ServerState};
use super::ttl_cache::UrlProber;
use super::{log_requests, ServerConfig};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
    pub records_count: usize,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[derive(Deserialize, Debug)]
struct LoginBody {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
struct LoginSuccessResponse {
    token: String,
}

#[derive(Deserialize, Debug)]
struct PublicStatusBody {
    #[serde(default)]
    pub watched_status: String,
}

#[derive(Serialize)]
struct DeleteSuccessResponse {
    message: String,
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
        records_count: state.record_store.records_count(),
    };
    Json(stats)
}

async fn login(
    State(auth): State<AdminAuth>,
    Json(body): Json<LoginBody>,
) -> Result<Json<LoginSuccessResponse>, ApiError> {
    let username = body.username.trim();
    let password = body.password.trim();

    let mut missing = Vec::new();
    if username.is_empty() {
        missing.push("username".to_string());
    }
    if password.is_empty() {
        missing.push("password".to_string());
    }
    if !missing.is_empty() {
        return Err(ApiError::Validation { fields: missing });
    }

    match auth.login(username, password) {
        Some(token) => Ok(Json(LoginSuccessResponse { token })),
        None => Err(ApiError::BadCredentials),
    }
}

async fn list_records(
    State(store): State<GuardedRecordStore>,
) -> Result<Json<Vec<MediaRecord>>, ApiError> {
    Ok(Json(store.list_records()?))
}

/// Normalizes the draft's inline image and fires a best-effort liveness
/// probe for plain URLs. Neither step can fail the request.
fn process_draft_image(state: &ServerState, mut draft: RecordDraft) -> RecordDraft {
    if let Some(image) = draft.image.take().filter(|s| !s.trim().is_empty()) {
        if image.starts_with("http://") || image.starts_with("https://") {
            let prober = state.url_prober.clone();
            let url = image.clone();
            tokio::spawn(async move {
                if !prober.is_alive(&url).await {
                    warn!("Record image URL does not answer: {}", url);
                }
            });
            draft.image = Some(image);
        } else {
            draft.image = Some(state.image_processor.normalize_data_uri(&image));
        }
    }
    draft
}

async fn create_record(
    _session: Session,
    State(state): State<ServerState>,
    Json(draft): Json<RecordDraft>,
) -> Result<(StatusCode, Json<MediaRecord>), ApiError> {
    validate_draft(&draft, state.config.validation_policy)
        .map_err(|fields| ApiError::Validation { fields })?;

    let draft = process_draft_image(&state, draft);
    let record = state.record_store.create_record(&draft)?;
    debug!("Created record {} ({})", record.id, record.title);
    Ok((StatusCode::CREATED, Json(record)))
}

async fn update_record(
    _session: Session,
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(draft): Json<RecordDraft>,
) -> Result<Json<MediaRecord>, ApiError> {
    validate_draft(&draft, state.config.validation_policy)
        .map_err(|fields| ApiError::Validation { fields })?;

    let draft = process_draft_image(&state, draft);
    match state.record_store.update_record(&id, &draft)? {
        Some(record) => Ok(Json(record)),
        None => Err(ApiError::NotFound),
    }
}

async fn public_update_watched_status(
    State(store): State<GuardedRecordStore>,
    Path(id): Path<String>,
    Json(body): Json<PublicStatusBody>,
) -> Result<Json<MediaRecord>, ApiError> {
    if body.watched_status.trim().is_empty() {
        return Err(ApiError::Validation {
            fields: vec!["watched_status".to_string()],
        });
    }
    match store.update_watched_status(&id, body.watched_status.trim())? {
        Some(record) => Ok(Json(record)),
        None => Err(ApiError::NotFound),
    }
}

async fn delete_record(
    _session: Session,
    State(store): State<GuardedRecordStore>,
    Path(id): Path<String>,
) -> Result<Json<DeleteSuccessResponse>, ApiError> {
    if store.delete_record(&id)? {
        Ok(Json(DeleteSuccessResponse {
            message: "Record deleted successfully".to_string(),
        }))
    } else {
        Err(ApiError::NotFound)
    }
}

fn make_cors_layer(allowed_origin: &Option<String>) -> CorsLayer {
    let origin = match allowed_origin {
        Some(origin) => match HeaderValue::from_str(origin) {
            Ok(value) => AllowOrigin::exact(value),
            Err(_) => {
                warn!("Invalid allowed_origin {:?}, allowing any", origin);
                AllowOrigin::any()
            }
        },
        None => Any.into(),
    };
    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

pub fn make_app(
    config: ServerConfig,
    record_store: Arc<dyn RecordStore>,
    admin_auth: AdminAuth,
) -> Result<Router> {
    let cors = make_cors_layer(&config.allowed_origin);
    let state = ServerState {
        config,
        start_time: Instant::now(),
        record_store,
        admin_auth,
        image_processor: Arc::new(ImageProcessor::default()),
        url_prober: Arc::new(UrlProber::default()),
        hash: env!("GIT_HASH").to_string(),
    };

    let record_routes = |prefix: &'static str| -> Router<ServerState> {
        Router::new()
            .route(
                &format!("/{}", prefix),
                get(list_records).post(create_record),
            )
            .route(
                &format!("/{}/{{id}}", prefix),
                put(update_record).delete(delete_record),
            )
            .route(
                &format!("/public/{}/{{id}}", prefix),
                put(public_update_watched_status),
            )
    };

    let app: Router = Router::new()
        .route("/", get(home))
        .route("/login", post(login))
        .merge(record_routes("media_records"))
        // Legacy path kept for older clients.
        .merge(record_routes("records"))
        .layer(middleware::from_fn_with_state(state.clone(), log_requests))
        .layer(cors)
        .with_state(state);

    Ok(app)
}

pub async fn run_server(
    config: ServerConfig,
    record_store: Arc<dyn RecordStore>,
    admin_auth: AdminAuth,
) -> Result<()> {
    let port = config.port;
    let app = make_app(config, record_store, admin_auth)?;

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;

    Ok(axum::serve(listener, app).await?)
}
