//! Delivery of notification text to the messaging relay.
//!
//! Delivery is best effort: one attempt per message, failures are logged and
//! the message is dropped.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, error, info};
use url::Url;

use crate::error::NotifyError;

#[async_trait]
pub trait Notify: Send + Sync {
    /// Sends `message` to `recipient`. Never fails to the caller.
    async fn notify(&self, message: &str, recipient: &str);
}

#[async_trait]
impl<T: Notify + ?Sized> Notify for Box<T> {
    async fn notify(&self, message: &str, recipient: &str) {
        (**self).notify(message, recipient).await;
    }
}

#[derive(Debug, Serialize)]
struct RelayPayload<'a> {
    phone: &'a str,
    message: &'a str,
}

/// Posts `{"phone", "message"}` JSON documents to the relay endpoint.
#[derive(Clone)]
pub struct RelayNotifier {
    http: reqwest::Client,
    url: Url,
}

impl RelayNotifier {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(url: Url, timeout: Duration) -> std::result::Result<Self, NotifyError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("zbx-relay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| NotifyError::Client { source })?;
        Ok(Self { http, url })
    }

    /// Single delivery attempt, surfacing the failure.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx answer.
    pub async fn try_send(
        &self,
        message: &str,
        recipient: &str,
    ) -> std::result::Result<(), NotifyError> {
        let started = Instant::now();
        let response = self
            .http
            .post(self.url.clone())
            .json(&RelayPayload {
                phone: recipient,
                message,
            })
            .send()
            .await
            .map_err(|source| NotifyError::Request { source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::HttpStatus { status });
        }
        debug!(
            recipient,
            %status,
            latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "notification delivered"
        );
        Ok(())
    }
}

#[async_trait]
impl Notify for RelayNotifier {
    async fn notify(&self, message: &str, recipient: &str) {
        if let Err(err) = self.try_send(message, recipient).await {
            error!(recipient, error = %err, "failed to send notification");
        }
    }
}

/// Logs what would be sent without contacting the relay.
#[derive(Clone, Copy, Debug, Default)]
pub struct DryRunNotifier;

#[async_trait]
impl Notify for DryRunNotifier {
    async fn notify(&self, message: &str, recipient: &str) {
        info!(recipient, message, "dry-run: would emit notification");
    }
}
