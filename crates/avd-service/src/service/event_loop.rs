//! Hub poll loop: pull pending events, dispatch to registered actions, send
//! replies, until a shutdown signal arrives.

use anyhow::{Context, Result};
use avd_core::dispatch::{ActionRegistry, EventEnvelope, TOPIC_DISCOVER, TOPIC_LAUNCH};
use avd_core::session::Session;
use std::time::Duration;

/// Subscribes to the action topics and blocks dispatching events until
/// SIGINT. Individual event failures are logged and do not stop the loop.
/// With `once` set, drains the queue a single time and returns.
pub async fn run(
    session: &Session,
    registry: &ActionRegistry,
    poll_interval: Duration,
    once: bool,
) -> Result<()> {
    session
        .subscribe(&[TOPIC_DISCOVER, TOPIC_LAUNCH])
        .context("subscribing to action topics")?;
    tracing::info!("listening for action events");

    if once {
        return poll_once(session, registry);
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutdown signal received");
                break;
            }
            _ = tokio::time::sleep(poll_interval) => {
                if let Err(err) = poll_once(session, registry) {
                    tracing::warn!("event poll failed: {err:#}");
                }
            }
        }
    }

    Ok(())
}

/// One poll cycle: pull queued events and dispatch each. An action failure
/// surfaces only through the host's generic failure path (logged here); the
/// loop keeps serving subsequent events.
fn poll_once(session: &Session, registry: &ActionRegistry) -> Result<()> {
    let events = session.pending_events().context("pulling hub events")?;
    for event in events {
        handle_event(session, registry, &event);
    }
    Ok(())
}

fn handle_event(session: &Session, registry: &ActionRegistry, event: &EventEnvelope) {
    match registry.dispatch(session, event) {
        Ok(Some(reply)) => {
            if let Err(err) = session.reply_to(event, &reply) {
                tracing::warn!(topic = %event.topic, "failed to send reply: {err}");
            }
        }
        Ok(None) => {}
        Err(err) => {
            tracing::warn!(topic = %event.topic, "action failed: {err:#}");
        }
    }
}
