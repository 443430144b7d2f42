//! Jellyfin client factory adapter.

use std::sync::Arc;

use tracing::debug;

use crate::auth::ClientIdentity;
use crate::error::ClientError;
use crate::traits::{ClientFactory, MediaClient};

use super::jellyfin_client::JellyfinClient;

/// Builds [`JellyfinClient`]s, each with a fresh device id.
#[derive(Debug, Clone, Default)]
pub struct JellyfinClientFactory {
    ignore_ssl_cert: bool,
}

impl JellyfinClientFactory {
    pub fn new(ignore_ssl_cert: bool) -> Self {
        Self { ignore_ssl_cert }
    }
}

impl ClientFactory for JellyfinClientFactory {
    fn build_client(&self) -> Result<Arc<dyn MediaClient>, ClientError> {
        let identity = ClientIdentity::generate();
        debug!("Building client with device id {}", identity.device_id);
        let client = JellyfinClient::new(identity, self.ignore_ssl_cert)?;
        Ok(Arc::new(client))
    }
}
