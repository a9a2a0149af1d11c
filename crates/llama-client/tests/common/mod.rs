//! Shared fixtures for the HTTP integration tests

#![allow(dead_code, clippy::unwrap_used)]

use llama_client::{ApiClient, HistoryNavigator, MemoryStore, Route, SessionStore};
use llama_core::{Config, Role, SessionUser};
use std::sync::Arc;
use wiremock::MockServer;

/// Client wired to a mock backend
pub struct TestClient {
    pub server: MockServer,
    pub session: SessionStore,
    pub navigator: Arc<HistoryNavigator>,
    pub api: ApiClient,
}

impl TestClient {
    /// Start a mock server with the navigator at `start`
    pub async fn start(start: Route) -> Self {
        let server = MockServer::start().await;

        let mut config = Config::default();
        config.api.base_url = server.uri();
        config.api.request_timeout_secs = 5;

        let session = SessionStore::new(Arc::new(MemoryStore::new()), "auth-storage");
        let navigator = Arc::new(HistoryNavigator::new(start));
        let api = ApiClient::new(&config.api, session.clone(), navigator.clone()).unwrap();

        Self {
            server,
            session,
            navigator,
            api,
        }
    }

    /// Same as [`Self::start`] with an admin already logged in
    pub async fn logged_in(start: Route, token: &str) -> Self {
        let client = Self::start(start).await;
        client.session.login(admin_user(), token).unwrap();
        client
    }
}

/// Administrator as returned by the login endpoint
pub fn admin_user() -> SessionUser {
    SessionUser {
        id: Some(1),
        first_name: Some("Ana".to_string()),
        last_name: Some("Quispe".to_string()),
        email: Some("ana@llama.pe".to_string()),
        role: Some(Role::Id(1)),
        ..SessionUser::default()
    }
}
