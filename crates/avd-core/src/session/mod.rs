//! Explicit session handle for the asset-tracking server.
//!
//! The session owns the HTTP plumbing for the query API and the event hub
//! and is passed by reference through every call that needs the server.
//! Lifecycle is explicit: [`Session::connect`] at process start,
//! [`Session::close`] on shutdown.

mod api;
mod wire;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::dispatch::{DispatchReply, EventEnvelope};
use crate::model::{AssetVersion, UserId, VersionRef};

use wire::{ApiRequest, ComponentUrlRow, HubRequest, OutgoingEvent, PullReply, QueryReply};

/// Topic carrying user-facing message notifications.
const TOPIC_USER_MESSAGE: &str = "action.trigger-user-interface";
/// Topic carrying action replies routed back to the requesting client.
const TOPIC_REPLY: &str = "action.reply";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid server URL: {0}")]
    BadServerUrl(String),
    #[error("api_user and api_key must be configured")]
    MissingCredentials,
    #[error("transport error: {0}")]
    Transport(#[from] curl::Error),
    #[error("server returned HTTP {0}")]
    HttpStatus(u32),
    #[error("malformed server reply: {0}")]
    MalformedReply(String),
}

/// Batched query seam used by actions; implemented by [`Session`].
pub trait VersionQuery {
    /// Fetches full records for all ids in one call.
    fn versions_by_ids(&self, ids: &[VersionRef]) -> Result<Vec<AssetVersion>>;
}

/// Fire-and-forget user notification seam; implemented by [`Session`].
///
/// Failures are logged at debug level and otherwise ignored, and a `None`
/// user drops the message without error.
pub trait Notifier {
    fn notify_user(&self, user: Option<&UserId>, message: &str);
}

/// Open connection to one server, holding credentials and endpoints.
#[derive(Debug)]
pub struct Session {
    api_endpoint: String,
    hub_endpoint: String,
    api_user: String,
    api_key: String,
    client_id: String,
}

impl Session {
    /// Opens a session against `server_url` with the given credentials.
    /// Fails fast on an unparseable URL or empty credentials.
    pub fn connect(server_url: &str, api_user: &str, api_key: &str) -> Result<Self, SessionError> {
        if api_user.is_empty() || api_key.is_empty() {
            return Err(SessionError::MissingCredentials);
        }
        let base = url::Url::parse(server_url)
            .map_err(|_| SessionError::BadServerUrl(server_url.to_string()))?;
        let base = base.as_str().trim_end_matches('/').to_string();
        let session = Self {
            api_endpoint: format!("{base}/api"),
            hub_endpoint: format!("{base}/event"),
            api_user: api_user.to_string(),
            api_key: api_key.to_string(),
            client_id: format!("avd-{}", std::process::id()),
        };
        tracing::info!(server = %base, user = %session.api_user, "session opened");
        Ok(session)
    }

    /// Closes the session: best-effort hub unsubscribe, then drop.
    pub fn close(self) {
        if let Err(err) = self.hub_call(&HubRequest::Unsubscribe {
            session: &self.client_id,
        }) {
            tracing::debug!("hub unsubscribe failed (ignored): {err}");
        }
        tracing::info!("session closed");
    }

    /// Subscribes this session's client id to the given hub topics.
    pub fn subscribe(&self, topics: &[&str]) -> Result<(), SessionError> {
        self.hub_call(&HubRequest::Subscribe {
            session: &self.client_id,
            topics: topics.iter().map(|t| t.to_string()).collect(),
        })?;
        tracing::debug!(?topics, "subscribed to hub topics");
        Ok(())
    }

    /// Pulls events queued for this session since the last poll.
    pub fn pending_events(&self) -> Result<Vec<EventEnvelope>, SessionError> {
        let body = self.hub_call(&HubRequest::Pull {
            session: &self.client_id,
        })?;
        let reply: PullReply =
            serde_json::from_slice(&body).map_err(|e| SessionError::MalformedReply(e.to_string()))?;
        Ok(reply.events)
    }

    /// Publishes a reply event targeted at the client that sent `event`.
    pub fn reply_to(&self, event: &EventEnvelope, reply: &DispatchReply) -> Result<(), SessionError> {
        let target = event
            .source
            .id
            .as_deref()
            .map(|id| format!("id={id}"))
            .unwrap_or_default();
        self.publish(OutgoingEvent {
            topic: TOPIC_REPLY.to_string(),
            data: serde_json::to_value(reply)
                .map_err(|e| SessionError::MalformedReply(e.to_string()))?,
            target,
            in_reply_to_event: event.id.clone(),
        })
    }

    /// URL for a component in the named location, when that location holds it.
    pub(crate) fn component_url(
        &self,
        location: &str,
        component_id: &str,
    ) -> Result<Option<String>, SessionError> {
        let expression = format!(
            "select url from ComponentLocation where component_id is '{component_id}' \
             and location.name is '{location}'"
        );
        let mut rows = self.query::<ComponentUrlRow>(&expression)?;
        Ok(rows.pop().and_then(|row| row.url).filter(|u| !u.is_empty()))
    }

    /// Runs one query expression, decoding the reply rows as `T`.
    fn query<T: DeserializeOwned>(&self, expression: &str) -> Result<Vec<T>, SessionError> {
        let request = vec![ApiRequest::Query {
            expression: expression.to_string(),
        }];
        let body =
            serde_json::to_vec(&request).map_err(|e| SessionError::MalformedReply(e.to_string()))?;
        let response = api::post_json(&self.api_endpoint, &self.api_user, &self.api_key, &body)?;
        let mut replies: Vec<QueryReply<T>> = serde_json::from_slice(&response)
            .map_err(|e| SessionError::MalformedReply(e.to_string()))?;
        // One operation in, one reply out.
        replies
            .pop()
            .map(|reply| reply.data)
            .ok_or_else(|| SessionError::MalformedReply("empty reply list".to_string()))
    }

    fn publish(&self, event: OutgoingEvent) -> Result<(), SessionError> {
        self.hub_call(&HubRequest::Publish { event })?;
        Ok(())
    }

    fn hub_call(&self, request: &HubRequest<'_>) -> Result<Vec<u8>, SessionError> {
        let body =
            serde_json::to_vec(request).map_err(|e| SessionError::MalformedReply(e.to_string()))?;
        api::post_json(&self.hub_endpoint, &self.api_user, &self.api_key, &body)
    }
}

impl VersionQuery for Session {
    fn versions_by_ids(&self, ids: &[VersionRef]) -> Result<Vec<AssetVersion>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let id_list = ids
            .iter()
            .map(|id| format!("'{}'", id.as_str()))
            .collect::<Vec<_>>()
            .join(",");
        let expression =
            format!("select id, components, link from AssetVersion where id in ({id_list})");
        let versions = self
            .query::<AssetVersion>(&expression)
            .with_context(|| format!("querying {} version record(s)", ids.len()))?;
        Ok(versions)
    }
}

impl Notifier for Session {
    fn notify_user(&self, user: Option<&UserId>, message: &str) {
        let Some(user) = user else {
            tracing::debug!("no invoking user; dropping message: {message}");
            return;
        };
        let event = OutgoingEvent {
            topic: TOPIC_USER_MESSAGE.to_string(),
            data: serde_json::json!({
                "type": "message",
                "success": true,
                "message": message,
            }),
            target: format!("user.id=\"{}\"", user.as_str()),
            in_reply_to_event: None,
        };
        if let Err(err) = self.publish(event) {
            tracing::debug!(user = user.as_str(), "notification failed (ignored): {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_rejects_empty_credentials() {
        let err = Session::connect("https://studio.example.com", "", "").unwrap_err();
        assert!(matches!(err, SessionError::MissingCredentials));
    }

    #[test]
    fn connect_rejects_bad_url() {
        let err = Session::connect("studio.example.com", "user", "key").unwrap_err();
        assert!(matches!(err, SessionError::BadServerUrl(_)));
    }

    #[test]
    fn connect_normalizes_endpoints() {
        let session = Session::connect("https://studio.example.com/", "user", "key").unwrap();
        assert_eq!(session.api_endpoint, "https://studio.example.com/api");
        assert_eq!(session.hub_endpoint, "https://studio.example.com/event");
    }
}
