//! Event listening and the disconnect/reconnect state machine.

use std::sync::Arc;

use futures_util::future::BoxFuture;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::manager::shared::Shared;
use crate::models::ClientEvent;
use crate::traits::EventReceiver;

use super::backoff::Backoff;
use super::connect::connect;
use super::events::SessionEvent;
use super::state::SessionState;

/// Spawn the listener task for one session.
///
/// The future is boxed because listening, recovering and reconnecting
/// spawn each other.
pub(crate) fn spawn_listener(
    shared: Arc<Shared>,
    uuid: String,
    generation: u64,
    events: EventReceiver,
) -> JoinHandle<()> {
    let task: BoxFuture<'static, ()> = Box::pin(listen(shared, uuid, generation, events));
    tokio::spawn(task)
}

/// Forward server messages until the stream ends, then recover if the
/// session was lost rather than torn down on purpose.
async fn listen(shared: Arc<Shared>, uuid: String, generation: u64, mut events: EventReceiver) {
    while let Some(event) = events.recv().await {
        match event {
            ClientEvent::Message { name, data } => {
                shared.publish(&uuid, SessionEvent::Other { name, data });
            }
            ClientEvent::Disconnected => break,
        }
    }

    // A stream ending after teardown means someone else already removed
    // this session; only the current generation recovers.
    let Some(session) = shared.take_session_if(&uuid, generation).await else {
        debug!("Event stream for {} ended after teardown", uuid);
        return;
    };
    session.release();

    recover(&shared, &uuid).await;
}

/// Drive reconnect attempts for `uuid` with exponential backoff.
///
/// The record keeps its place in the persisted list while this runs. Each
/// attempt waits for the next backoff delay and then tries
/// [`connect`]. The loop ends on the first successful reconnect, or
/// aborts as soon as the manager is stopping or the record is removed.
pub(crate) async fn recover(shared: &Arc<Shared>, uuid: &str) -> SessionState {
    shared.set_connected(uuid, false).await;
    shared.publish(uuid, SessionEvent::Disconnected);

    let mut backoff = Backoff::new(shared.config.max_backoff_secs);
    while let Some(delay) = backoff.next() {
        let attempt = backoff.attempt() - 1;

        if shared.is_stopping() {
            return abort(shared, uuid, "manager is stopping").await;
        }
        let Some(record) = shared.record(uuid).await else {
            return forget(shared, uuid).await;
        };
        if shared.has_session(uuid).await {
            debug!("{} was reconnected elsewhere, ending recovery", uuid);
            return SessionState::Connected;
        }

        shared
            .set_recovery_state(uuid, SessionState::Recovering { attempt })
            .await;
        info!(
            "No connection to {}. Next try in {} second(s)",
            record.display_name(),
            delay.as_secs()
        );

        if !shared.wait_for_retry(uuid, delay).await {
            if shared.is_stopping() {
                return abort(shared, uuid, "manager is stopping").await;
            }
            return forget(shared, uuid).await;
        }

        let Some(mut record) = shared.record(uuid).await else {
            return forget(shared, uuid).await;
        };
        if connect(shared, &mut record).await {
            if !shared.has_record(uuid).await {
                // Removed while the attempt was in flight.
                if let Some(session) = shared.take_session(uuid).await {
                    session.shutdown();
                }
                return forget(shared, uuid).await;
            }
            info!("Reconnected to {}", record.display_name());
            shared.publish(uuid, SessionEvent::Reconnected);
            return SessionState::Connected;
        }
        debug!("Reconnect attempt {} for {} failed", attempt + 1, uuid);
    }

    SessionState::Aborted
}

async fn abort(shared: &Shared, uuid: &str, reason: &str) -> SessionState {
    info!("Giving up reconnecting {}: {}", uuid, reason);
    shared.set_recovery_state(uuid, SessionState::Aborted).await;
    SessionState::Aborted
}

async fn forget(shared: &Shared, uuid: &str) -> SessionState {
    info!("Server {} was removed, ending recovery", uuid);
    shared.clear_recovery_state(uuid).await;
    SessionState::Aborted
}
