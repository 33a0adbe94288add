use std::time::{Duration, Instant};

use backoff::ExponentialBackoffBuilder;
use backoff::backoff::Backoff;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use crate::Result;
use crate::error::{ConfigError, Error, ZbxError};

use super::Session;
use super::rpc::{RpcEnvelope, RpcRequest, body_preview};

const MAX_ATTEMPTS: u64 = 3;
const CORRELATION_HEADER: &str = "x-correlation-id";

/// JSON-RPC transport to the Zabbix API. Holds no credentials; every
/// authenticated call takes the [`Session`] explicitly.
#[derive(Clone)]
pub struct ZbxClient {
    http: reqwest::Client,
    base: Url,
    timeout: Duration,
}

enum Attempt<T> {
    Done(T),
    Retry(ZbxError),
    Fail(ZbxError),
}

impl ZbxClient {
    /// Build a `ZbxClient` configured with the supplied parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if HTTPS is required but the URL uses HTTP, or if the
    /// underlying HTTP client fails to build.
    pub fn new(
        base: Url,
        timeout: Duration,
        connect_timeout: Duration,
        insecure_http: bool,
    ) -> Result<Self> {
        if base.scheme() != "https" && !insecure_http {
            return Err(Error::Config(ConfigError::InvalidField {
                field: "zabbix.url",
                message: "only https URLs are accepted unless --insecure or \
                          zabbix.insecure_http is set"
                    .to_string(),
            }));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json-rpc"),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .user_agent(concat!("zbx-relay/", env!("CARGO_PKG_VERSION")))
            .pool_idle_timeout(Duration::from_secs(30));

        if !insecure_http {
            builder = builder.https_only(true);
        }

        let http = builder
            .build()
            .map_err(|err| ZbxError::Client { source: err })?;

        Ok(Self {
            http,
            base,
            timeout,
        })
    }

    /// Calls `method`, retrying transient failures within the request
    /// timeout. API errors are returned as-is.
    pub(super) async fn call<T>(
        &self,
        method: &str,
        params: Value,
        session: Option<&Session>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let mut backoff = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(200))
            .with_multiplier(2.0)
            .with_randomization_factor(0.25)
            .with_max_interval(Duration::from_secs(2))
            .with_max_elapsed_time(Some(self.timeout))
            .build();

        let mut attempt = 1;
        loop {
            let correlation_id = Uuid::now_v7().to_string();
            let started = Instant::now();
            let err = match self
                .attempt(method, &params, session, attempt, &correlation_id)
                .await
            {
                Attempt::Done(result) => {
                    debug!(
                        method,
                        %correlation_id,
                        attempt,
                        latency_ms = millis(started.elapsed()),
                        "zabbix call succeeded"
                    );
                    return Ok(result);
                }
                Attempt::Fail(err) => return Err(err.into()),
                Attempt::Retry(err) => err,
            };

            if attempt >= MAX_ATTEMPTS {
                return Err(ZbxError::RetryExhausted {
                    source: Box::new(err),
                }
                .into());
            }
            let Some(delay) = backoff.next_backoff() else {
                return Err(err.into());
            };
            warn!(
                method,
                %correlation_id,
                attempt,
                delay_ms = millis(delay),
                error = %err,
                "retrying zabbix call"
            );
            sleep(delay).await;
            attempt += 1;
        }
    }

    async fn attempt<T>(
        &self,
        method: &str,
        params: &Value,
        session: Option<&Session>,
        id: u64,
        correlation_id: &str,
    ) -> Attempt<T>
    where
        T: DeserializeOwned,
    {
        let bearer = session.filter(|s| s.uses_bearer_header());
        let payload = RpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id,
            auth: session
                .filter(|s| !s.uses_bearer_header())
                .map(Session::token),
        };
        let mut request = self
            .http
            .post(self.base.clone())
            .header(CORRELATION_HEADER, correlation_id)
            .json(&payload);
        if let Some(session) = bearer {
            request = request.bearer_auth(session.token());
        }

        let response = match request.send().await {
            Ok(resp) => resp,
            Err(err) => return Attempt::Retry(ZbxError::from(err)),
        };

        let status = response.status();
        if status.is_server_error() || status == StatusCode::REQUEST_TIMEOUT {
            return Attempt::Retry(ZbxError::HttpStatus { status });
        }
        if !status.is_success() {
            return Attempt::Fail(ZbxError::HttpStatus { status });
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(err) => return Attempt::Retry(ZbxError::from(err)),
        };

        let envelope: RpcEnvelope<T> = match serde_json::from_slice(&body) {
            Ok(env) => env,
            Err(err) => {
                return Attempt::Retry(ZbxError::Json {
                    message: format!(
                        "error decoding response body: {err}; body preview: {}",
                        body_preview(&body)
                    ),
                });
            }
        };

        if let Some(err) = envelope.error {
            let message = match err.data {
                Some(data) if !data.is_empty() => format!("{} - {data}", err.message),
                _ => err.message,
            };
            return Attempt::Fail(ZbxError::Api {
                code: err.code,
                message,
            });
        }

        envelope.result.map_or(
            Attempt::Fail(ZbxError::MissingField { field: "result" }),
            Attempt::Done,
        )
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
