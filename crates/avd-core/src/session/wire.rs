//! Wire types for the server's query API and event hub endpoints.

use serde::{Deserialize, Serialize};

use crate::dispatch::EventEnvelope;

/// One operation in a query API request body.
#[derive(Debug, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub(crate) enum ApiRequest {
    Query { expression: String },
}

/// Reply to one query operation.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub(crate) struct QueryReply<T> {
    #[serde(default)]
    pub data: Vec<T>,
}

/// Row returned when querying a component's URL in one location.
#[derive(Debug, Deserialize)]
pub(crate) struct ComponentUrlRow {
    #[serde(default)]
    pub url: Option<String>,
}

/// Requests accepted by the event hub endpoint.
#[derive(Debug, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub(crate) enum HubRequest<'a> {
    Subscribe {
        session: &'a str,
        topics: Vec<String>,
    },
    Unsubscribe {
        session: &'a str,
    },
    Pull {
        session: &'a str,
    },
    Publish {
        event: OutgoingEvent,
    },
}

/// Event published to the hub (user notifications and action replies).
#[derive(Debug, Serialize)]
pub(crate) struct OutgoingEvent {
    pub topic: String,
    pub data: serde_json::Value,
    /// Target expression selecting the receiving session(s).
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_reply_to_event: Option<String>,
}

/// Body of a pull reply: events queued for this session since the last poll.
#[derive(Debug, Deserialize)]
pub(crate) struct PullReply {
    #[serde(default)]
    pub events: Vec<EventEnvelope>,
}
