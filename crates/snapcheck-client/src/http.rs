//! reqwest implementation of the sync API

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use snapcheck_api::{
    ApiEnvelope, DeviceSyncRequest, HeartbeatRequest, LockState, LoginRequest, LoginResponse,
    PlanInfo, UsageSyncRequest,
};
use snapcheck_store::SessionStore;
use snapcheck_util::UserId;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::{ClientError, ClientResult, SyncApi};

/// HTTP client for the snapcheck backend.
///
/// The bearer token is read from the session store on every request, so a
/// re-login takes effect without rebuilding the client. A missing token is
/// sent as an unauthenticated request; the server is the source of truth
/// for authorization failures.
pub struct HttpSyncClient {
    http: Client,
    base_url: String,
    store: Arc<dyn SessionStore>,
}

impl HttpSyncClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        let http = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            store,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.store.auth_token() {
            Ok(Some(token)) => builder.bearer_auth(token),
            Ok(None) => builder,
            Err(e) => {
                warn!(error = %e, "Session store unreadable, sending unauthenticated request");
                builder
            }
        }
    }

    /// Read a response into the `{success, message?, data?}` envelope,
    /// normalizing HTTP and body-level failures into [`ClientError`].
    async fn read_envelope<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> ClientResult<ApiEnvelope<T>> {
        let status = response.status();
        let text = response.text().await?;

        let parsed: Result<ApiEnvelope<T>, _> = serde_json::from_str(&text);

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let message = match &parsed {
                Ok(envelope) => envelope
                    .message
                    .clone()
                    .unwrap_or_else(|| "Unauthorized".to_string()),
                Err(_) => "Unauthorized".to_string(),
            };
            return Err(ClientError::Auth {
                status: status.as_u16(),
                message,
            });
        }

        match parsed {
            Ok(envelope) if envelope.success => Ok(envelope),
            Ok(envelope) => Err(ClientError::Api {
                message: envelope
                    .message
                    .unwrap_or_else(|| format!("Request failed (HTTP {})", status.as_u16())),
            }),
            Err(_) if !status.is_success() => Err(ClientError::Api {
                message: format!("Request failed (HTTP {})", status.as_u16()),
            }),
            Err(e) => Err(ClientError::Decode(e.to_string())),
        }
    }
}

#[async_trait]
impl SyncApi for HttpSyncClient {
    async fn login(&self, request: &LoginRequest) -> ClientResult<LoginResponse> {
        debug!(email = %request.email, "Logging in");

        let response = self
            .http
            .post(self.url("/auth/login"))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        match serde_json::from_str::<LoginResponse>(&text) {
            Ok(login) => Ok(login),
            Err(_) if !status.is_success() => Err(ClientError::Api {
                message: format!("Login failed (HTTP {})", status.as_u16()),
            }),
            Err(e) => Err(ClientError::Decode(e.to_string())),
        }
    }

    async fn heartbeat(&self, user_id: &UserId) -> ClientResult<()> {
        let body = HeartbeatRequest {
            user_id: user_id.clone(),
        };

        let response = self
            .authorize(self.http.post(self.url("/activity/heartbeat")))
            .json(&body)
            .send()
            .await?;

        Self::read_envelope::<serde_json::Value>(response).await?;
        Ok(())
    }

    async fn sync_device(&self, request: &DeviceSyncRequest) -> ClientResult<PlanInfo> {
        let response = self
            .authorize(self.http.post(self.url("/device/sync")))
            .json(request)
            .send()
            .await?;

        let envelope = Self::read_envelope::<PlanInfo>(response).await?;
        envelope
            .data
            .ok_or_else(|| ClientError::Decode("device sync response carried no data".into()))
    }

    async fn sync_usage(&self, request: &UsageSyncRequest) -> ClientResult<()> {
        let response = self
            .authorize(self.http.post(self.url("/apps/sync")))
            .json(request)
            .send()
            .await?;

        Self::read_envelope::<serde_json::Value>(response).await?;
        Ok(())
    }

    async fn latest_lock_state(&self, user_id: &UserId) -> ClientResult<LockState> {
        let path = format!("/device/latest/{}", user_id);
        let response = self.authorize(self.http.get(self.url(&path))).send().await?;

        let envelope = Self::read_envelope::<LockState>(response).await?;
        envelope
            .data
            .ok_or_else(|| ClientError::Decode("lock poll response carried no data".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapcheck_api::Session;
    use snapcheck_store::MemorySessionStore;

    fn store_with_token() -> Arc<dyn SessionStore> {
        Arc::new(MemorySessionStore::with_session(Session {
            user_id: UserId::new("u1"),
            token: "tok-123".into(),
        }))
    }

    fn client_for(server: &mockito::Server) -> HttpSyncClient {
        HttpSyncClient::new(server.url(), Duration::from_secs(2), store_with_token())
    }

    #[tokio::test]
    async fn heartbeat_sends_bearer_and_user_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/activity/heartbeat")
            .match_header("authorization", "Bearer tok-123")
            .match_body(mockito::Matcher::Json(serde_json::json!({"userId": "u1"})))
            .with_body(r#"{"success":true}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        client.heartbeat(&UserId::new("u1")).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn heartbeat_without_session_is_unauthenticated() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/activity/heartbeat")
            .match_header("authorization", mockito::Matcher::Missing)
            .with_body(r#"{"success":true}"#)
            .create_async()
            .await;

        let client = HttpSyncClient::new(
            server.url(),
            Duration::from_secs(2),
            Arc::new(MemorySessionStore::new()),
        );
        client.heartbeat(&UserId::new("u1")).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn unauthorized_maps_to_auth_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/activity/heartbeat")
            .with_status(401)
            .with_body(r#"{"success":false,"message":"Token expired"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.heartbeat(&UserId::new("u1")).await.unwrap_err();

        assert!(err.is_auth());
        assert!(err.to_string().contains("Token expired"));
    }

    #[tokio::test]
    async fn backend_refusal_maps_to_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/device/sync")
            .with_body(r#"{"success":false,"message":"Database error"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let snapshot_req = DeviceSyncRequest {
            user_id: UserId::new("u1"),
            device_model: "Pixel 7".into(),
            unique_id: "x".into(),
            battery: "50%".into(),
            wifi_status: "ON".into(),
            location_status: "OFF".into(),
            device_timestamp: "2025-06-01 12:00:00".into(),
        };
        let err = client.sync_device(&snapshot_req).await.unwrap_err();

        assert!(matches!(err, ClientError::Api { ref message } if message == "Database error"));
    }

    #[tokio::test]
    async fn lock_poll_parses_data() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/device/latest/u1")
            .with_body(r#"{"success":true,"data":{"isLocked":false,"remainingSeconds":30}}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let state = client.latest_lock_state(&UserId::new("u1")).await.unwrap();

        assert!(!state.is_locked);
        assert_eq!(state.remaining_seconds, Some(30));
    }

    #[tokio::test]
    async fn garbage_body_maps_to_decode_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/device/latest/u1")
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.latest_lock_state(&UserId::new("u1")).await.unwrap_err();

        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[tokio::test]
    async fn unreachable_server_maps_to_transport_error() {
        // Reserved port with nothing listening
        let client = HttpSyncClient::new(
            "http://127.0.0.1:9",
            Duration::from_millis(200),
            store_with_token(),
        );

        let err = client.heartbeat(&UserId::new("u1")).await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }

    #[tokio::test]
    async fn login_returns_token_and_user() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/auth/login")
            .with_body(
                r#"{"success":true,"token":"tok-9","user":{"id":"u9","email":"g@example.com"}}"#,
            )
            .create_async()
            .await;

        let client = HttpSyncClient::new(
            server.url(),
            Duration::from_secs(2),
            Arc::new(MemorySessionStore::new()),
        );
        let login = client
            .login(&LoginRequest {
                email: "g@example.com".into(),
                password: "pw".into(),
            })
            .await
            .unwrap();

        assert!(login.success);
        assert_eq!(login.token.as_deref(), Some("tok-9"));
        assert_eq!(login.user.unwrap().id, "u9");
    }
}
