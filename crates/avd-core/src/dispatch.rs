//! Event decoding and action dispatch.
//!
//! The hub delivers discover and launch events as JSON envelopes; the
//! registry routes them to registered handlers and builds reply payloads.
//! Unknown topics and identifiers are ignored, not errors.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::action::{ActionContext, ActionHandler, ActionResult};
use crate::model::{SelectedEntity, UserId};
use crate::session::Session;

/// Topic carrying discover events (which actions apply to this selection?).
pub const TOPIC_DISCOVER: &str = "action.discover";
/// Topic carrying launch events (run this action for this selection).
pub const TOPIC_LAUNCH: &str = "action.launch";

/// Incoming event envelope, as delivered by the hub.
#[derive(Debug, Clone, Deserialize)]
pub struct EventEnvelope {
    #[serde(default)]
    pub id: Option<String>,
    pub topic: String,
    #[serde(default)]
    pub data: EventData,
    #[serde(default)]
    pub source: EventSource,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventData {
    #[serde(default, rename = "actionIdentifier")]
    pub action_identifier: Option<String>,
    #[serde(default)]
    pub selection: Vec<SelectedEntity>,
}

/// Origin of an event: the sending client and, when present, its user.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventSource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub user: Option<EventUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventUser {
    pub id: String,
}

/// Descriptor for one action offered in a discover reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionDescriptor {
    pub label: String,
    #[serde(rename = "actionIdentifier")]
    pub action_identifier: String,
    pub description: String,
}

/// Reply produced by dispatching one event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DispatchReply {
    Discover { items: Vec<ActionDescriptor> },
    Launch(ActionResult),
}

/// Owns the registered handlers and routes hub events to them. The handlers
/// themselves never see the registry.
#[derive(Default)]
pub struct ActionRegistry {
    handlers: Vec<Box<dyn ActionHandler>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capability registration: once added, the handler is offered on every
    /// matching discover event and receives matching launches.
    pub fn register(&mut self, handler: Box<dyn ActionHandler>) {
        tracing::info!(identifier = handler.identifier(), "action registered");
        self.handlers.push(handler);
    }

    /// Routes one event. `None` means no handler covered it; the hub treats
    /// that as not-handled rather than a failure.
    pub fn dispatch(
        &self,
        session: &Session,
        event: &EventEnvelope,
    ) -> Result<Option<DispatchReply>> {
        match event.topic.as_str() {
            TOPIC_DISCOVER => Ok(self.discover(&event.data.selection)),
            TOPIC_LAUNCH => self.launch(session, event),
            other => {
                tracing::debug!(topic = other, "ignoring event");
                Ok(None)
            }
        }
    }

    fn discover(&self, selection: &[SelectedEntity]) -> Option<DispatchReply> {
        let items: Vec<ActionDescriptor> = self
            .handlers
            .iter()
            .filter(|handler| handler.discover(selection))
            .map(|handler| ActionDescriptor {
                label: handler.label().to_string(),
                action_identifier: handler.identifier().to_string(),
                description: handler.description().to_string(),
            })
            .collect();
        if items.is_empty() {
            None
        } else {
            Some(DispatchReply::Discover { items })
        }
    }

    fn launch(
        &self,
        session: &Session,
        event: &EventEnvelope,
    ) -> Result<Option<DispatchReply>> {
        let Some(identifier) = event.data.action_identifier.as_deref() else {
            return Ok(None);
        };
        let Some(handler) = self
            .handlers
            .iter()
            .find(|handler| handler.identifier() == identifier)
        else {
            tracing::debug!(identifier, "no handler for action");
            return Ok(None);
        };

        let context = ActionContext {
            user_id: event
                .source
                .user
                .as_ref()
                .map(|user| UserId(user.id.clone())),
        };
        let result = handler.launch(session, &event.data.selection, &context)?;
        Ok(Some(DispatchReply::Launch(result)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubAction;

    impl ActionHandler for StubAction {
        fn label(&self) -> &str {
            "Stub"
        }

        fn identifier(&self) -> &str {
            "avd.stub"
        }

        fn description(&self) -> &str {
            "Stub action"
        }

        fn discover(&self, selection: &[SelectedEntity]) -> bool {
            !selection.is_empty()
        }

        fn launch(
            &self,
            _session: &Session,
            _selection: &[SelectedEntity],
            _context: &ActionContext,
        ) -> Result<ActionResult> {
            Ok(ActionResult::message("ok"))
        }
    }

    fn registry() -> ActionRegistry {
        let mut registry = ActionRegistry::new();
        registry.register(Box::new(StubAction));
        registry
    }

    #[test]
    fn envelope_decodes_launch_event_with_user() {
        let event: EventEnvelope = serde_json::from_str(
            r#"{
                "id": "ev-1",
                "topic": "action.launch",
                "data": {
                    "actionIdentifier": "avd.stub",
                    "selection": [{"entityType": "AssetVersion", "entityId": "v1"}]
                },
                "source": {"id": "client-9", "user": {"id": "u1"}}
            }"#,
        )
        .unwrap();
        assert_eq!(event.topic, TOPIC_LAUNCH);
        assert_eq!(event.data.action_identifier.as_deref(), Some("avd.stub"));
        assert_eq!(event.data.selection.len(), 1);
        assert_eq!(event.source.user.as_ref().unwrap().id, "u1");
    }

    #[test]
    fn envelope_tolerates_sparse_payloads() {
        let event: EventEnvelope =
            serde_json::from_str(r#"{"topic": "action.discover"}"#).unwrap();
        assert!(event.id.is_none());
        assert!(event.data.selection.is_empty());
        assert!(event.source.user.is_none());
    }

    #[test]
    fn discover_reply_lists_eligible_actions() {
        let registry = registry();
        let selection: Vec<SelectedEntity> =
            serde_json::from_str(r#"[{"entityType": "AssetVersion", "entityId": "v1"}]"#).unwrap();
        match registry.discover(&selection) {
            Some(DispatchReply::Discover { items }) => {
                assert_eq!(items.len(), 1);
                assert_eq!(items[0].action_identifier, "avd.stub");
                assert_eq!(items[0].label, "Stub");
            }
            other => panic!("expected discover reply, got {:?}", other),
        }
    }

    #[test]
    fn discover_with_empty_selection_is_not_handled() {
        assert!(registry().discover(&[]).is_none());
    }

    #[test]
    fn launch_for_unknown_identifier_is_not_handled() {
        // No network happens before handler lookup fails.
        let session = Session::connect("https://localhost", "user", "key").unwrap();
        let event: EventEnvelope = serde_json::from_str(
            r#"{
                "topic": "action.launch",
                "data": {"actionIdentifier": "someone.else"}
            }"#,
        )
        .unwrap();
        assert!(registry().dispatch(&session, &event).unwrap().is_none());

        let no_identifier: EventEnvelope =
            serde_json::from_str(r#"{"topic": "action.launch"}"#).unwrap();
        assert!(registry()
            .dispatch(&session, &no_identifier)
            .unwrap()
            .is_none());
    }

    #[test]
    fn discover_reply_serializes_host_shape() {
        let reply = DispatchReply::Discover {
            items: vec![ActionDescriptor {
                label: "Stub".to_string(),
                action_identifier: "avd.stub".to_string(),
                description: "Stub action".to_string(),
            }],
        };
        let value = serde_json::to_value(&reply).unwrap();
        assert_eq!(value["items"][0]["actionIdentifier"], "avd.stub");
    }
}
