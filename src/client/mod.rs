//! HTTP client for the restaurant API, used by the CLI and the form controller.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use crate::form::RestaurantApi;
use crate::models::{Restaurant, RestaurantPatch, RestaurantPayload};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("server returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("response carried no data")]
    MissingData,

    #[error("invalid server url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    /// Classify a non-success response by its status code.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 => ClientError::Unauthorized(message),
            403 => ClientError::Forbidden(message),
            404 => ClientError::NotFound(message),
            _ => ClientError::Api { status, message },
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    error: Option<String>,
}

/// Talks to a running server over HTTP with an optional bearer token.
#[derive(Debug, Clone)]
pub struct HttpRestaurantClient {
    http: reqwest::Client,
    base: Url,
    token: Option<String>,
}

impl HttpRestaurantClient {
    pub fn new(base: &str, token: Option<String>) -> Result<Self, ClientError> {
        let mut base = Url::parse(base)?;
        // Keep join() from dropping the last path segment
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base,
            token,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub async fn list(&self) -> Result<Vec<Restaurant>, ClientError> {
        self.send::<(), _>(Method::GET, "restaurant/", None).await
    }

    pub async fn get(&self, rest_id: &str) -> Result<Restaurant, ClientError> {
        self.send::<(), _>(Method::GET, &format!("restaurant/{}", rest_id), None)
            .await
    }

    pub async fn mine(&self) -> Result<Option<Restaurant>, ClientError> {
        self.send_optional::<(), _>(Method::GET, "restaurant/user", None)
            .await
    }

    pub async fn create(&self, payload: &RestaurantPayload) -> Result<Restaurant, ClientError> {
        self.send(Method::POST, "restaurant/create", Some(payload))
            .await
    }

    pub async fn edit(
        &self,
        rest_id: Uuid,
        patch: &RestaurantPatch,
    ) -> Result<Restaurant, ClientError> {
        self.send(
            Method::POST,
            &format!("restaurant/{}/edit", rest_id),
            Some(patch),
        )
        .await
    }

    pub async fn delete(&self, rest_id: &str) -> Result<Restaurant, ClientError> {
        self.send::<(), _>(
            Method::DELETE,
            &format!("restaurant/{}/delete", rest_id),
            None,
        )
        .await
    }

    async fn send<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_optional(method, path, body)
            .await?
            .ok_or(ClientError::MissingData)
    }

    async fn send_optional<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Option<T>, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.base.join(path)?;
        tracing::debug!("{} {}", method, url);

        let mut request = self.http.request(method, url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        parse_envelope(status, &text)
    }
}

fn parse_envelope<T: DeserializeOwned>(
    status: StatusCode,
    text: &str,
) -> Result<Option<T>, ClientError> {
    let envelope = serde_json::from_str::<Envelope<T>>(text);

    if !status.is_success() {
        let message = match envelope {
            Ok(Envelope {
                error: Some(message),
                ..
            }) => message,
            _ => status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
        };
        return Err(ClientError::from_status(status.as_u16(), message));
    }

    envelope.map(|e| e.data).map_err(|e| ClientError::Api {
        status: status.as_u16(),
        message: format!("unreadable response body: {}", e),
    })
}

#[async_trait]
impl RestaurantApi for HttpRestaurantClient {
    async fn fetch_mine(&self) -> Result<Option<Restaurant>, ClientError> {
        self.mine().await
    }

    async fn create(&self, payload: &RestaurantPayload) -> Result<Restaurant, ClientError> {
        HttpRestaurantClient::create(self, payload).await
    }

    async fn edit(
        &self,
        rest_id: Uuid,
        payload: &RestaurantPayload,
    ) -> Result<Restaurant, ClientError> {
        let patch = RestaurantPatch::from(payload.clone());
        HttpRestaurantClient::edit(self, rest_id, &patch).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_statuses_to_kinds() {
        assert!(matches!(
            ClientError::from_status(401, "x".into()),
            ClientError::Unauthorized(_)
        ));
        assert!(matches!(
            ClientError::from_status(403, "x".into()),
            ClientError::Forbidden(_)
        ));
        assert!(matches!(
            ClientError::from_status(404, "x".into()),
            ClientError::NotFound(_)
        ));
        assert!(matches!(
            ClientError::from_status(409, "x".into()),
            ClientError::Api { status: 409, .. }
        ));
    }

    #[test]
    fn null_data_is_an_empty_result() {
        let parsed: Option<Restaurant> =
            parse_envelope(StatusCode::OK, r#"{"success":true,"data":null}"#).unwrap();
        assert!(parsed.is_none());
    }

    #[test]
    fn error_envelopes_keep_the_server_message() {
        let err = parse_envelope::<Restaurant>(
            StatusCode::FORBIDDEN,
            r#"{"success":false,"error":"You do not own this restaurant","code":"FORBIDDEN"}"#,
        )
        .unwrap_err();
        match err {
            ClientError::Forbidden(msg) => assert_eq!(msg, "You do not own this restaurant"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn non_json_failures_fall_back_to_the_reason_phrase() {
        let err =
            parse_envelope::<Restaurant>(StatusCode::BAD_GATEWAY, "upstream down").unwrap_err();
        assert!(matches!(
            err,
            ClientError::Api { status: 502, ref message } if message == "Bad Gateway"
        ));
    }

    #[test]
    fn base_url_gains_a_trailing_slash() {
        let client = HttpRestaurantClient::new("http://localhost:3000/api", None).unwrap();
        assert_eq!(
            client.base_url().join("restaurant/user").unwrap().as_str(),
            "http://localhost:3000/api/restaurant/user"
        );
    }
}
