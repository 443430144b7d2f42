//! Client factory trait abstraction.

use std::sync::Arc;

use crate::error::ClientError;

use super::media_client::MediaClient;

/// Builds fresh, unauthenticated client handles.
///
/// Every call returns a new handle with its own identity. Building must not
/// touch the network.
pub trait ClientFactory: Send + Sync {
    fn build_client(&self) -> Result<Arc<dyn MediaClient>, ClientError>;
}
