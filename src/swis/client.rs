use std::time::{Duration, Instant};

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use crate::Result;
use crate::config::{Credentials, HttpSettings};
use crate::error::{ConfigError, Error, SwisError};

use super::models::body_preview;

const CORRELATION_HEADER: &str = "x-correlation-id";

/// Thin client for the SolarWinds Information Service JSON endpoint.
#[derive(Clone)]
pub struct SwisClient {
    http: reqwest::Client,
    base: Url,
    credentials: Credentials,
}

impl SwisClient {
    /// Build a `SwisClient` for the given base URL, e.g.
    /// `https://orion:17778/SolarWinds/InformationService/v3/Json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL uses plain HTTP while `allow_http` is
    /// off, or if the underlying HTTP client fails to build.
    pub fn new(base: Url, credentials: Credentials, settings: &HttpSettings) -> Result<Self> {
        if base.scheme() != "https" && !settings.allow_http {
            return Err(Error::Config(ConfigError::InvalidField {
                field: "swis.url",
                message: "only https URLs are accepted unless allow_http is set".to_string(),
            }));
        }
        if base.cannot_be_a_base() {
            return Err(Error::Config(ConfigError::InvalidField {
                field: "swis.url",
                message: "URL cannot be used as a base".to_string(),
            }));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .user_agent(concat!("alarm-bridge/", env!("CARGO_PKG_VERSION")))
            .pool_idle_timeout(Duration::from_secs(30));

        if !settings.allow_http {
            builder = builder.https_only(true);
        }
        if settings.accept_invalid_certs {
            warn!(base = %base, "TLS certificate validation is disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let http = builder
            .build()
            .map_err(|err| SwisError::Client { source: err })?;

        Ok(Self {
            http,
            base,
            credentials,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // Checked in `new`.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// POST `body` as JSON below the base URL and decode the JSON reply.
    pub(super) async fn post<B, T>(&self, segments: &[&str], body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let (body, correlation_id) = self.send(segments, body).await?;
        serde_json::from_slice(&body).map_err(|err| {
            let message = format!(
                "error decoding response body: {err}; body preview: {}",
                body_preview(&body)
            );
            warn!(%correlation_id, endpoint = segments.join("/"), "undecodable SWIS response");
            SwisError::Json { message }.into()
        })
    }

    /// POST `body` as JSON; the reply only has to carry a success status.
    pub(super) async fn post_unchecked<B>(&self, segments: &[&str], body: &B) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        self.send(segments, body).await.map(|_| ())
    }

    async fn send<B>(&self, segments: &[&str], body: &B) -> Result<(Vec<u8>, String)>
    where
        B: Serialize + ?Sized,
    {
        let correlation_id = Uuid::now_v7().to_string();
        let started = Instant::now();
        let url = self.endpoint(segments);

        let response = self
            .http
            .post(url)
            .basic_auth(
                &self.credentials.username,
                Some(self.credentials.password.expose_secret()),
            )
            .header(CORRELATION_HEADER, &correlation_id)
            .json(body)
            .send()
            .await
            .map_err(SwisError::from)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(SwisError::from)?;

        if !status.is_success() {
            return Err(SwisError::HttpStatus {
                status,
                body: body_preview(&bytes),
            }
            .into());
        }

        debug!(
            endpoint = segments.join("/"),
            %correlation_id,
            %status,
            latency_ms = started.elapsed().as_millis(),
            "swis call succeeded"
        );
        Ok((bytes.to_vec(), correlation_id))
    }
}
