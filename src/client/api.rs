//! HTTP plumbing for the client: bearer-token custody and the one response
//! handler every call funnels through.

use crate::record_store::{MediaRecord, RecordDraft};
use crate::server::auth::TOKEN_TTL_SECONDS;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::debug;

use super::prefs::PreferenceStore;

const PREF_KEY_SESSION: &str = "session";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Session expired, must re-authenticate")]
    MustReauthenticate,
    #[error("{0}")]
    Api(String),
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Deserialize)]
struct TokenBody {
    token: String,
}

#[derive(serde::Serialize, Deserialize)]
struct StoredSession {
    token: String,
    expires_at: u64,
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Single owner of the bearer token. Expiry is checked here and nowhere
/// else; the token survives restarts through the preference store.
pub struct SessionManager {
    prefs: Arc<dyn PreferenceStore>,
}

impl SessionManager {
    pub fn new(prefs: Arc<dyn PreferenceStore>) -> Self {
        SessionManager { prefs }
    }

    pub fn token(&self) -> Option<String> {
        let stored: StoredSession = self
            .prefs
            .get(PREF_KEY_SESSION)
            .and_then(|value| serde_json::from_value(value).ok())?;
        if stored.expires_at <= unix_now() {
            debug!("Stored session token is expired, discarding");
            let _ = self.prefs.remove(PREF_KEY_SESSION);
            return None;
        }
        Some(stored.token)
    }

    pub fn store_token(&self, token: String) {
        let stored = StoredSession {
            token,
            expires_at: unix_now() + TOKEN_TTL_SECONDS,
        };
        if let Err(err) = self.prefs.set(PREF_KEY_SESSION, json!(stored)) {
            debug!("Failed to persist session token: {}", err);
        }
    }

    pub fn clear(&self) {
        let _ = self.prefs.remove(PREF_KEY_SESSION);
    }
}

pub struct ApiClient {
    base_url: String,
    client: Client,
    session: SessionManager,
}

impl ApiClient {
    pub fn new(base_url: String, prefs: Arc<dyn PreferenceStore>) -> Self {
        ApiClient {
            base_url,
            client: Client::new(),
            session: SessionManager::new(prefs),
        }
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, builder: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        match self.session.token() {
            Some(token) => Ok(builder.header("Authorization", format!("Bearer {}", token))),
            None => Err(ClientError::MustReauthenticate),
        }
    }

    /// The single response funnel: non-2xx answers become `ClientError::Api`
    /// with the server's `{error}` message when one is present, and auth
    /// failures on protected calls clear the stored token.
    async fn handle<T: for<'de> Deserialize<'de>>(
        &self,
        response: Response,
        protected: bool,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        if protected
            && (status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN)
        {
            self.session.clear();
            return Err(ClientError::MustReauthenticate);
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .map(|body| body.error)
            .unwrap_or_else(|_| format!("Request failed with status {}", status.as_u16()));
        Err(ClientError::Api(message))
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<(), ClientError> {
        let response = self
            .client
            .post(self.url("/login"))
            .json(&json!({"username": username, "password": password}))
            .send()
            .await?;
        let body: TokenBody = self.handle(response, false).await?;
        self.session.store_token(body.token);
        Ok(())
    }

    pub async fn list_records(&self) -> Result<Vec<MediaRecord>, ClientError> {
        let response = self.client.get(self.url("/media_records")).send().await?;
        self.handle(response, false).await
    }

    pub async fn create_record(&self, draft: &RecordDraft) -> Result<MediaRecord, ClientError> {
        let request = self.authorize(self.client.post(self.url("/media_records")))?;
        let response = request.json(draft).send().await?;
        self.handle(response, true).await
    }

    pub async fn update_record(
        &self,
        id: &str,
        draft: &RecordDraft,
    ) -> Result<MediaRecord, ClientError> {
        let request =
            self.authorize(self.client.put(self.url(&format!("/media_records/{}", id))))?;
        let response = request.json(draft).send().await?;
        self.handle(response, true).await
    }

    /// The unauthenticated "mark watched" path.
    pub async fn update_watched_status(
        &self,
        id: &str,
        watched_status: &str,
    ) -> Result<MediaRecord, ClientError> {
        let response = self
            .client
            .put(self.url(&format!("/public/media_records/{}", id)))
            .json(&json!({"watched_status": watched_status}))
            .send()
            .await?;
        self.handle(response, false).await
    }

    pub async fn delete_record(&self, id: &str) -> Result<String, ClientError> {
        let request =
            self.authorize(self.client.delete(self.url(&format!("/media_records/{}", id))))?;
        let response = request.send().await?;
        let body: serde_json::Value = self.handle(response, true).await?;
        Ok(body["message"].as_str().unwrap_or("Deleted").to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::prefs::InMemoryPreferenceStore;

    #[test]
    fn token_round_trips_through_prefs() {
        let prefs = Arc::new(InMemoryPreferenceStore::default());
        let manager = SessionManager::new(prefs.clone());
        assert!(manager.token().is_none());

        manager.store_token("tok-123".to_string());
        assert_eq!(manager.token(), Some("tok-123".to_string()));

        // A second manager over the same store sees the same token.
        let other = SessionManager::new(prefs);
        assert_eq!(other.token(), Some("tok-123".to_string()));

        other.clear();
        assert!(manager.token().is_none());
    }

    #[test]
    fn expired_token_is_discarded() {
        let prefs = Arc::new(InMemoryPreferenceStore::default());
        prefs
            .set(
                PREF_KEY_SESSION,
                json!({"token": "stale", "expires_at": unix_now() - 1}),
            )
            .unwrap();

        let manager = SessionManager::new(prefs.clone());
        assert!(manager.token().is_none());
        // The stale entry is gone, not just ignored.
        assert!(prefs.get(PREF_KEY_SESSION).is_none());
    }

    #[test]
    fn protected_calls_without_token_fail_fast() {
        let prefs = Arc::new(InMemoryPreferenceStore::default());
        let client = ApiClient::new("http://localhost:0".to_string(), prefs);
        let result = client.authorize(client.client.post(client.url("/media_records")));
        assert!(matches!(result, Err(ClientError::MustReauthenticate)));
    }
}
