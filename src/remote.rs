//! HTTP access to the Polyglot translation service.
//!
//! Every request carries the bearer token and a `User-Agent` naming this
//! client. Responses outside 2xx/3xx become [`RemoteError::Status`] with the
//! status code and body text.

use crate::config::{ClientConfig, TranslationMode};
use crate::error::RemoteError;
use crate::language::Language;
use crate::localisation::{LocalisationRecord, Translation};
use crate::retry::{with_retry, RetryConfig};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Serialize)]
struct RegisterProductRequest<'a> {
    languages: &'a [Language],
}

/// Body of the create-or-update call for one string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStringRequest {
    pub translations: HashMap<Language, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desired_max_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<TranslationMode>,
}

#[derive(Debug, Clone)]
pub struct PolyglotApi {
    client: reqwest::Client,
    api_url: String,
    token: String,
    product_id: String,
    retry: RetryConfig,
}

impl PolyglotApi {
    pub fn new(config: &ClientConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            product_id: config.product_id.clone(),
            retry: config.retry.clone(),
        })
    }

    fn product_url(&self) -> String {
        format!(
            "{}/products/{}",
            self.api_url,
            urlencoding::encode(&self.product_id)
        )
    }

    fn string_url(&self, string_id: &str) -> String {
        format!(
            "{}/strings/{}",
            self.product_url(),
            urlencoding::encode(string_id)
        )
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        debug!("{} {}", method, url);
        self.client
            .request(method, url)
            .header("Authorization", format!("Bearer {}", self.token))
    }

    async fn send(request: RequestBuilder) -> Result<Response, RemoteError> {
        let response = request.send().await.map_err(RemoteError::Transport)?;

        let status = response.status();
        if status.is_success() || status.is_redirection() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
        Err(RemoteError::Status { status, body })
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, RemoteError> {
        Self::send(request)
            .await?
            .json()
            .await
            .map_err(RemoteError::Decode)
    }

    /// `PUT /products/{productId}`: declare the languages the product uses.
    pub async fn register_languages(&self, languages: &[Language]) -> Result<(), RemoteError> {
        let url = self.product_url();
        let body = RegisterProductRequest { languages };

        with_retry(&self.retry, "Product registration", || {
            Self::send(self.request(Method::PUT, &url).json(&body))
        })
        .await
        .map(|_| ())
    }

    /// `GET /products/{productId}/strings`: every record of the product.
    pub async fn list_strings(
        &self,
        exclude: &[Language],
    ) -> Result<Vec<LocalisationRecord>, RemoteError> {
        let url = format!("{}/strings", self.product_url());
        let query: Vec<(&str, &str)> = exclude
            .iter()
            .map(|language| ("exclude", language.code()))
            .collect();

        with_retry(&self.retry, "String listing", || {
            Self::send_json(self.request(Method::GET, &url).query(&query))
        })
        .await
    }

    /// `GET /products/{productId}/strings/{stringId}/translations/{language}`
    pub async fn fetch_translation(
        &self,
        string_id: &str,
        language: Language,
    ) -> Result<Translation, RemoteError> {
        let url = format!("{}/translations/{}", self.string_url(string_id), language);
        Self::send_json(self.request(Method::GET, &url)).await
    }

    /// `PUT /products/{productId}/strings/{stringId}`: create or update a
    /// string and trigger its translation.
    pub async fn create_string(
        &self,
        string_id: &str,
        body: &CreateStringRequest,
    ) -> Result<LocalisationRecord, RemoteError> {
        let url = self.string_url(string_id);
        Self::send_json(self.request(Method::PUT, &url).json(body)).await
    }
}
