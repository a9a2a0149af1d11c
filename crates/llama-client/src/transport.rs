//! Authenticated HTTP transport
//!
//! Attaches the bearer token to every request and classifies the response.
//! It never navigates or touches the session beyond reading the token; the
//! 401 policy lives in [`crate::interceptor`].

use crate::session::SessionStore;
use crate::{ClientError, Result};
use llama_core::config::ApiConfig;
use llama_core::forms::MultipartDraft;
use reqwest::{Method, StatusCode, multipart};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Result of one request
#[derive(Debug)]
pub enum Outcome<T> {
    /// 2xx with a decoded body
    Ok(T),
    /// 401 from the backend
    Unauthorized(ClientError),
    /// Any other failure
    Error(ClientError),
}

impl<T> Outcome<T> {
    /// Collapse into a `Result`, keeping the unauthorized error as-is
    pub fn into_result(self) -> Result<T> {
        match self {
            Self::Ok(value) => Ok(value),
            Self::Unauthorized(err) | Self::Error(err) => Err(err),
        }
    }

    /// Whether this is a 401
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    /// Transform the success value
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Ok(value) => Outcome::Ok(f(value)),
            Self::Unauthorized(err) => Outcome::Unauthorized(err),
            Self::Error(err) => Outcome::Error(err),
        }
    }
}

enum Body {
    Empty,
    Json(serde_json::Value),
    Multipart(multipart::Form),
}

/// HTTP transport bound to one API root and one session
#[derive(Debug, Clone)]
pub struct Transport {
    client: reqwest::Client,
    api_root: String,
    session: SessionStore,
}

impl Transport {
    /// Build a transport for `config`, reading tokens from `session`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &ApiConfig, session: SessionStore) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            api_root: config.api_root(),
            session,
        })
    }

    /// Root every path is appended to (`<base>/api`)
    #[must_use]
    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    /// Session the token is read from
    #[must_use]
    pub const fn session(&self) -> &SessionStore {
        &self.session
    }

    /// `GET path`
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Outcome<T> {
        self.send(Method::GET, path, Body::Empty).await
    }

    /// `POST path` with a JSON body
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Outcome<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        match serde_json::to_value(body) {
            Ok(value) => self.send(Method::POST, path, Body::Json(value)).await,
            Err(err) => Outcome::Error(err.into()),
        }
    }

    /// Write with a JSON body, accepting any 2xx body
    pub async fn write_json<B>(&self, method: Method, path: &str, body: &B) -> Outcome<()>
    where
        B: Serialize + ?Sized + Sync,
    {
        match serde_json::to_value(body) {
            Ok(value) => self.dispatch(method, path, Body::Json(value)).await.map(drop),
            Err(err) => Outcome::Error(err.into()),
        }
    }

    /// Write as `multipart/form-data`, accepting any 2xx body
    pub async fn write_multipart(
        &self,
        method: Method,
        path: &str,
        draft: &(dyn MultipartDraft + Sync),
    ) -> Outcome<()> {
        match build_form(draft) {
            Ok(form) => self.dispatch(method, path, Body::Multipart(form)).await.map(drop),
            Err(err) => Outcome::Error(err),
        }
    }

    /// `DELETE path`, accepting any 2xx body
    pub async fn delete(&self, path: &str) -> Outcome<()> {
        self.dispatch(Method::DELETE, path, Body::Empty).await.map(drop)
    }

    async fn send<T: DeserializeOwned>(&self, method: Method, path: &str, body: Body) -> Outcome<T> {
        match self.dispatch(method, path, body).await {
            Outcome::Ok(bytes) => decode(path, &bytes),
            Outcome::Unauthorized(err) => Outcome::Unauthorized(err),
            Outcome::Error(err) => Outcome::Error(err),
        }
    }

    /// Perform the request and classify the status, returning the raw 2xx body
    async fn dispatch(&self, method: Method, path: &str, body: Body) -> Outcome<Vec<u8>> {
        let url = format!("{}/{}", self.api_root, path.trim_start_matches('/'));
        let mut request = self.client.request(method.clone(), &url);

        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token);
        }

        request = match body {
            Body::Empty => request,
            Body::Json(value) => request.json(&value),
            Body::Multipart(form) => request.multipart(form),
        };

        tracing::debug!(%method, path, "request started");

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(%method, path, error = %err, "request failed");
                return Outcome::Error(err.into());
            }
        };

        let status = response.status();
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => return Outcome::Error(err.into()),
        };

        tracing::debug!(%method, path, status = status.as_u16(), "request finished");

        if status.is_success() {
            return Outcome::Ok(bytes.to_vec());
        }

        let message = extract_error_message(&bytes);
        if status == StatusCode::UNAUTHORIZED {
            Outcome::Unauthorized(ClientError::Unauthorized { message })
        } else {
            Outcome::Error(ClientError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }
}

fn decode<T: DeserializeOwned>(path: &str, bytes: &[u8]) -> Outcome<T> {
    let raw: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
        b"null"
    } else {
        bytes
    };
    match serde_json::from_slice(raw) {
        Ok(value) => Outcome::Ok(value),
        Err(err) => Outcome::Error(ClientError::Decode {
            path: path.to_string(),
            reason: err.to_string(),
        }),
    }
}

/// Pull the backend's `error` (or `message`) field out of an error body
#[must_use]
pub fn extract_error_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    ["error", "message"]
        .iter()
        .find_map(|field| value.get(field).and_then(serde_json::Value::as_str))
        .filter(|message| !message.trim().is_empty())
        .map(ToString::to_string)
}

fn build_form(draft: &(dyn MultipartDraft + Sync)) -> Result<multipart::Form> {
    let mut form = multipart::Form::new();
    for (name, value) in draft.text_parts() {
        form = form.text(name, value);
    }
    for (name, image) in draft.file_parts() {
        let part = multipart::Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.content_type)?;
        form = form.part(name, part);
    }
    Ok(form)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_error_message() {
        assert_eq!(
            extract_error_message(br#"{"error":"Credenciales incorrectas"}"#).as_deref(),
            Some("Credenciales incorrectas")
        );
        assert_eq!(
            extract_error_message(br#"{"message":"Sin permiso"}"#).as_deref(),
            Some("Sin permiso")
        );
        assert_eq!(extract_error_message(br#"{"error":""}"#), None);
        assert_eq!(extract_error_message(b"<html>502</html>"), None);
    }

    #[test]
    fn test_outcome_into_result() {
        let ok: Outcome<i32> = Outcome::Ok(3);
        assert_eq!(ok.map(|v| v * 2).into_result().unwrap(), 6);

        let unauthorized: Outcome<i32> =
            Outcome::Unauthorized(ClientError::Unauthorized { message: None });
        assert!(unauthorized.is_unauthorized());
        assert!(unauthorized.into_result().unwrap_err().is_unauthorized());
    }
}
