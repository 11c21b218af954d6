use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use super::{interpret_mutation, EntityGateway, MutationReply, ReferenceSource, RemoteError};
use crate::config::RemoteConfig;
use crate::entity::{EntityKind, ReferenceItem, ReferenceKind};
use crate::session::SessionToken;

/// HTTP client for the console's remote API.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    http: reqwest::Client,
    base_url: Url,
}

// Lists may come bare or wrapped in a `data` envelope
#[derive(Deserialize)]
#[serde(untagged)]
enum ListBody<T> {
    Bare(Vec<T>),
    Wrapped { data: Vec<T> },
}

impl RemoteClient {
    pub fn new(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let base_url = Url::parse(config.base_url.trim())
            .map_err(|e| RemoteError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(RemoteError::InvalidUrl(config.base_url.clone()));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, RemoteError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| RemoteError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, token: &SessionToken) -> RequestBuilder {
        self.http
            .request(method, url)
            .header(AUTHORIZATION, token.bearer())
            .header(ACCEPT, "application/json")
    }

    /// Load one entity, e.g. to pre-fill an edit dialog.
    pub async fn fetch_entity(
        &self,
        kind: EntityKind,
        id: &str,
        token: &SessionToken,
    ) -> Result<Value, RemoteError> {
        let url = self.endpoint(&[kind.collection(), id])?;
        let response = self.request(Method::GET, url, token).send().await?;
        let body: Value = Self::expect_success(response).await?.json().await?;

        // Unwrap a `data` envelope when present
        match body {
            Value::Object(mut map) if map.get("data").map_or(false, Value::is_object) => {
                Ok(map.remove("data").unwrap_or(Value::Null))
            }
            other => Ok(other),
        }
    }

    async fn fetch_list<T: DeserializeOwned>(&self, url: Url, token: &SessionToken) -> Result<Vec<T>, RemoteError> {
        let response = self.request(Method::GET, url, token).send().await?;
        let body: ListBody<T> = Self::expect_success(response).await?.json().await?;
        Ok(match body {
            ListBody::Bare(items) => items,
            ListBody::Wrapped { data } => data,
        })
    }

    async fn expect_success(response: Response) -> Result<Response, RemoteError> {
        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::UNAUTHORIZED => Err(RemoteError::Unauthorized),
            status => Err(RemoteError::Status(status.as_u16())),
        }
    }

    async fn send_mutation(
        &self,
        method: Method,
        url: Url,
        payload: &Value,
        token: &SessionToken,
    ) -> Result<MutationReply, RemoteError> {
        tracing::debug!("Remote mutation {} {}", method, url);
        let response = self.request(method, url, token).json(payload).send().await?;
        let status = response.status().as_u16();

        // Empty or non-JSON bodies are judged on HTTP status alone
        let bytes = response.bytes().await?;
        let reply = if bytes.is_empty() {
            None
        } else {
            serde_json::from_slice::<MutationReply>(&bytes).ok()
        };

        interpret_mutation(status, reply)
    }
}

#[async_trait]
impl ReferenceSource for RemoteClient {
    async fn fetch_reference(
        &self,
        kind: ReferenceKind,
        token: &SessionToken,
    ) -> Result<Vec<ReferenceItem>, RemoteError> {
        let url = self.endpoint(&[kind.path()])?;
        self.fetch_list(url, token).await
    }
}

#[async_trait]
impl EntityGateway for RemoteClient {
    async fn create(
        &self,
        kind: EntityKind,
        payload: &Value,
        token: &SessionToken,
    ) -> Result<MutationReply, RemoteError> {
        let url = self.endpoint(&[kind.collection()])?;
        self.send_mutation(Method::POST, url, payload, token).await
    }

    async fn update(
        &self,
        kind: EntityKind,
        id: &str,
        payload: &Value,
        token: &SessionToken,
    ) -> Result<MutationReply, RemoteError> {
        let url = self.endpoint(&[kind.collection(), id])?;
        self.send_mutation(Method::PUT, url, payload, token).await
    }
}
