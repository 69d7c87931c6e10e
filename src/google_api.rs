use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{ConfigError, SyncError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Upstream error bodies are cut to this many characters in error messages.
const ERROR_BODY_LIMIT: usize = 300;

/// Bearer-authenticated JSON client rooted at one API base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    service: &'static str,
    http: Client,
    base: Url,
    token: String,
}

impl ApiClient {
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] for an unusable base URL, or
    /// [`SyncError::Http`] if the HTTP client cannot be built.
    pub fn new(service: &'static str, base_url: &str, token: &str) -> Result<Self, SyncError> {
        let mut base = Url::parse(base_url).map_err(|error| ConfigError::Invalid {
            field: "base_url",
            message: format!("{base_url}: {error}"),
        })?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(concat!("shift-sync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| SyncError::Http {
                url: base.to_string(),
                source,
            })?;

        Ok(Self {
            service,
            http,
            base,
            token: token.to_string(),
        })
    }

    #[must_use]
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Resolves `path` against the base URL; `path` must not start with `/`.
    ///
    /// # Errors
    ///
    /// [`SyncError::Decode`] if the joined URL is invalid.
    pub fn endpoint(&self, path: &str) -> Result<Url, SyncError> {
        self.base.join(path).map_err(|error| SyncError::Decode {
            what: "endpoint url",
            message: format!("{path}: {error}"),
        })
    }

    /// # Errors
    ///
    /// Transport failures, non-success statuses and undecodable bodies.
    pub fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, SyncError> {
        let url = self.endpoint(path)?;
        let request = self.http.get(url.clone()).query(query);
        self.send(&url, request)
    }

    /// # Errors
    ///
    /// Transport failures, non-success statuses and undecodable bodies.
    pub fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, SyncError> {
        let url = self.endpoint(path)?;
        let request = self.http.post(url.clone()).json(body);
        self.send(&url, request)
    }

    fn send<T: DeserializeOwned>(&self, url: &Url, request: RequestBuilder) -> Result<T, SyncError> {
        let http_error = |source| SyncError::Http {
            url: url.to_string(),
            source,
        };

        let response = request.bearer_auth(&self.token).send().map_err(http_error)?;
        let status = response.status();
        let body = response.text().map_err(http_error)?;
        if !status.is_success() {
            return Err(SyncError::Upstream {
                service: self.service,
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        serde_json::from_str(&body).map_err(|error| SyncError::Decode {
            what: "response body",
            message: format!("{url}: {error}"),
        })
    }
}
