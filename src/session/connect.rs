//! Establishing sessions: interactive login and reconnecting stored
//! records.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::auth::normalize_address;
use crate::error::LoginError;
use crate::manager::shared::Shared;
use crate::models::{Capabilities, ConnectionState, ServerRecord};

use super::ClientHandle;

/// Authenticate a stored record and register it as a live session.
///
/// Updates `record.connected` (and the matching entry in the manager's
/// list) with the outcome. A failed attempt is not retried here; retries
/// are driven by disconnect events.
pub(crate) async fn connect(shared: &Arc<Shared>, record: &mut ServerRecord) -> bool {
    if shared.is_stopping() {
        return false;
    }

    let client = match shared.factory.build_client() {
        Ok(client) => client,
        Err(e) => {
            warn!("Could not build a client for {}: {}", record.address, e);
            mark(shared, record, false).await;
            return false;
        }
    };

    let state = match client.authenticate(record).await {
        Ok(state) => state,
        Err(e) => {
            warn!("Authentication against {} failed: {}", record.address, e);
            ConnectionState::Unavailable
        }
    };

    if state != ConnectionState::SignedIn {
        debug!("{} is not signed in ({:?})", record.display_name(), state);
        mark(shared, record, false).await;
        return false;
    }

    let events = match client.start().await {
        Ok(events) => events,
        Err(e) => {
            warn!("Could not open event stream for {}: {}", record.address, e);
            client.stop();
            mark(shared, record, false).await;
            return false;
        }
    };

    if let Err(e) = client.post_capabilities(&Capabilities::announcement()).await {
        warn!("Failed to announce capabilities to {}: {}", record.address, e);
    }

    mark(shared, record, true).await;
    if !shared.register(record, client, events).await {
        mark(shared, record, false).await;
        return false;
    }

    info!("Connected to {}", record.display_name());
    true
}

async fn mark(shared: &Shared, record: &mut ServerRecord, connected: bool) {
    record.connected = connected;
    shared.set_connected(&record.uuid, connected).await;
}

/// Log in with username and password and add the server.
///
/// With `force_unique` the record takes the server's own id as its uuid, so
/// repeated logins to one server collapse onto one record; if that server
/// already has a live session its handle is returned untouched. Without it
/// every login gets a fresh uuid and its own record.
///
/// Persisted state only changes once the server accepted the login. What
/// gets saved is the list as it stands after the connect attempt, so a
/// session that already dropped is saved as disconnected.
pub(crate) async fn login(
    shared: &Arc<Shared>,
    address: &str,
    username: &str,
    password: &str,
    force_unique: bool,
) -> Result<ClientHandle, LoginError> {
    if shared.is_stopping() {
        return Err(LoginError::Stopping);
    }

    let address = normalize_address(address)?;
    let client = shared.factory.build_client()?;
    let credentials = client.login(&address, username, password).await?;

    let uuid = if force_unique {
        credentials.server_id.clone()
    } else {
        uuid::Uuid::new_v4().to_string()
    };

    if force_unique {
        if let Some(existing) = shared.session_handle(&uuid).await {
            debug!("Already connected to server {}, reusing session", uuid);
            return Ok(existing);
        }
    }

    // The record must be listed before the session goes live: a listener
    // that sees an immediate disconnect looks it up to recover.
    let mut record = ServerRecord::from_credentials(uuid.clone(), username, credentials);
    shared.insert_record(record.clone()).await;
    if !connect(shared, &mut record).await {
        warn!(
            "Logged in to {} but could not open a session; it will be retried on next start",
            record.address
        );
    }
    shared.save_records().await?;

    let handle = match shared.session_handle(&uuid).await {
        Some(handle) => handle,
        None => ClientHandle::new(uuid, client),
    };
    Ok(handle)
}
