use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::Result;
use crate::error::{Error, ZbxError};
use crate::types::{Event, Host, PollWindow, Problem, UNKNOWN_HOST};

use super::api::MonitoringApi;
use super::models::{EventWithHosts, RawEvent, RawProblem};
use super::{Session, ZbxClient};

impl ZbxClient {
    /// Validates `token` against the server and opens a [`Session`].
    ///
    /// # Errors
    ///
    /// Every failure, transport included, is reported as [`Error::Auth`].
    pub async fn login(&self, token: &SecretString) -> Result<Session> {
        let version: String = self
            .call("apiinfo.version", json!({}), None)
            .await
            .map_err(into_auth)?;

        let user: Value = self
            .call(
                "user.checkAuthentication",
                json!({ "token": token.expose_secret() }),
                None,
            )
            .await
            .map_err(into_auth)?;
        if user.get("userid").is_none() {
            return Err(Error::Auth(ZbxError::Rejected));
        }

        let username = user.get("username").and_then(Value::as_str).unwrap_or("-");
        info!(api_version = %version, user = username, "connected to Zabbix API");
        Ok(Session::new(token.clone(), version))
    }
}

#[async_trait]
impl MonitoringApi for ZbxClient {
    async fn list_resolved_events(
        &self,
        session: &Session,
        window: PollWindow,
    ) -> Result<Vec<Event>> {
        let params = json!({
            "output": "extend",
            "time_from": window.from,
            "time_till": window.last_second(),
            "selectHosts": ["hostid", "name"],
            "sortfield": ["clock", "eventid"],
            "sortorder": "DESC"
        });
        let raw: Vec<RawEvent> = self.call("event.get", params, Some(session)).await?;
        debug!(%window, count = raw.len(), "fetched events");
        Ok(raw.into_iter().map(Event::from).collect())
    }

    async fn list_open_problems(
        &self,
        session: &Session,
        window: PollWindow,
    ) -> Result<Vec<Problem>> {
        let params = json!({
            "output": "extend",
            "time_from": window.from,
            "time_till": window.last_second(),
            "recent": true,
            "sortfield": ["eventid"],
            "sortorder": "DESC"
        });
        let raw: Vec<RawProblem> = self.call("problem.get", params, Some(session)).await?;
        debug!(%window, count = raw.len(), "fetched problems");
        Ok(raw.into_iter().map(Problem::from).collect())
    }

    async fn get_event_hosts(&self, session: &Session, event_id: &str) -> Result<Vec<String>> {
        let params = json!({
            "output": ["eventid"],
            "eventids": [event_id],
            "selectHosts": ["hostid", "name"]
        });
        let raw: Vec<EventWithHosts> = self.call("event.get", params, Some(session)).await?;
        let names: Vec<String> = raw
            .into_iter()
            .next()
            .map(|event| event.hosts.into_iter().map(|h| Host::from(h).name).collect())
            .unwrap_or_default();
        if names.is_empty() {
            return Ok(vec![UNKNOWN_HOST.to_string()]);
        }
        Ok(names)
    }
}

fn into_auth(err: Error) -> Error {
    match err {
        Error::Zabbix(inner) => Error::Auth(inner),
        other => other,
    }
}
