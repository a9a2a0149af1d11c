//! API client combining the transport and the 401 interceptor

use crate::interceptor::Interceptor;
use crate::navigation::Navigator;
use crate::session::SessionStore;
use crate::transport::Transport;
use crate::Result;
use llama_core::config::ApiConfig;
use llama_core::forms::MultipartDraft;
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// API client for the Llama Matemática backend
///
/// Cheap to clone; clones share the session, navigator and connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    transport: Transport,
    interceptor: Interceptor,
}

impl ApiClient {
    /// Create a client for `config`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(
        config: &ApiConfig,
        session: SessionStore,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let transport = Transport::new(config, session.clone())?;
        Ok(Self {
            transport,
            interceptor: Interceptor::new(session, navigator),
        })
    }

    /// Session used for tokens
    #[must_use]
    pub const fn session(&self) -> &SessionStore {
        self.transport.session()
    }

    /// Navigator driven on 401
    #[must_use]
    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        self.interceptor.navigator()
    }

    /// Underlying transport, for callers that want the raw outcome
    #[must_use]
    pub const fn transport(&self) -> &Transport {
        &self.transport
    }

    /// `GET path`
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.interceptor.resolve(self.transport.get(path).await)
    }

    /// `POST path` with a JSON body
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.interceptor
            .resolve(self.transport.post_json(path, body).await)
    }

    /// Create or update with a JSON body; the response body is ignored
    pub async fn write_json<B>(&self, method: Method, path: &str, body: &B) -> Result<()>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.interceptor
            .resolve(self.transport.write_json(method, path, body).await)
    }

    /// Create or update as multipart; the response body is ignored
    pub async fn write_multipart(
        &self,
        method: Method,
        path: &str,
        draft: &(dyn MultipartDraft + Sync),
    ) -> Result<()> {
        self.interceptor
            .resolve(self.transport.write_multipart(method, path, draft).await)
    }

    /// `DELETE path`
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.interceptor.resolve(self.transport.delete(path).await)
    }
}
