//! Action interface: the eligibility + execution callback pair dispatched by
//! the host. Implementations hold no reference to the dispatcher;
//! registration happens externally via [`crate::dispatch::ActionRegistry`].

pub mod download_versions;

pub use download_versions::DownloadVersionsAction;

use anyhow::Result;
use serde::Serialize;

use crate::model::{SelectedEntity, UserId};
use crate::session::Session;

/// Context delivered with a launch event. A missing user id means progress
/// messages are dropped, not that the launch fails.
#[derive(Debug, Clone, Default)]
pub struct ActionContext {
    pub user_id: Option<UserId>,
}

/// Structured reply rendered by the host after a launch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionResult {
    pub success: bool,
    pub message: String,
    #[serde(rename = "type")]
    pub result_type: String,
}

impl ActionResult {
    /// Success reply shown as a message box.
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            success: true,
            message: text.into(),
            result_type: "message".to_string(),
        }
    }
}

/// Host-triggered callback pair for one action.
pub trait ActionHandler {
    fn label(&self) -> &str;
    fn identifier(&self) -> &str;
    fn description(&self) -> &str;

    /// Decides visibility of the action for the current selection.
    fn discover(&self, selection: &[SelectedEntity]) -> bool;

    /// Runs the action for the selection. The session handle is threaded in
    /// explicitly; the handler owns no connection state.
    fn launch(
        &self,
        session: &Session,
        selection: &[SelectedEntity],
        context: &ActionContext,
    ) -> Result<ActionResult>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_result_serializes_with_type_tag() {
        let reply = ActionResult::message("Download Complete");
        let value = serde_json::to_value(&reply).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "success": true,
                "message": "Download Complete",
                "type": "message"
            })
        );
    }
}
