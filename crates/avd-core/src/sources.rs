//! Ordered source-location fallback for component URLs.
//!
//! Each location either yields a fetchable URL for a component or it does
//! not; a failure while asking one location is treated the same as "not
//! here". The orchestrator takes the first hit in configured order.

use anyhow::Result;

use crate::model::Component;
use crate::session::Session;

/// A named source a component's file can be fetched from.
pub trait ComponentSource {
    fn name(&self) -> &str;
    /// `Ok(None)` when this source cannot provide the component.
    fn resolve_url(&self, component: &Component) -> Result<Option<String>>;
}

/// First non-empty URL yielded by `sources` in order, or `None` when every
/// source comes up empty or fails. Per-source failures are never surfaced.
pub fn first_available_url(
    sources: &[&dyn ComponentSource],
    component: &Component,
) -> Option<String> {
    for source in sources {
        match source.resolve_url(component) {
            Ok(Some(url)) if !url.is_empty() => {
                tracing::debug!(
                    source = source.name(),
                    component = %component.name,
                    "resolved source URL"
                );
                return Some(url);
            }
            Ok(_) => {
                tracing::debug!(
                    source = source.name(),
                    component = %component.name,
                    "source has no URL for component"
                );
            }
            Err(err) => {
                tracing::debug!(
                    source = source.name(),
                    component = %component.name,
                    "source resolution failed (ignored): {err:#}"
                );
            }
        }
    }
    None
}

/// Source backed by one named location on the session's server.
pub struct SessionSource<'s> {
    session: &'s Session,
    location: String,
}

impl<'s> SessionSource<'s> {
    pub fn new(session: &'s Session, location: impl Into<String>) -> Self {
        Self {
            session,
            location: location.into(),
        }
    }
}

impl ComponentSource for SessionSource<'_> {
    fn name(&self) -> &str {
        &self.location
    }

    fn resolve_url(&self, component: &Component) -> Result<Option<String>> {
        Ok(self.session.component_url(&self.location, &component.id)?)
    }
}
