//! Mock client factory for testing.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::ClientError;
use crate::traits::{ClientFactory, MediaClient};

use super::media_client::{MockBackend, MockMediaClient};

/// Builds [`MockMediaClient`]s bound to one [`MockBackend`].
#[derive(Debug)]
pub struct MockClientFactory {
    backend: MockBackend,
    built: AtomicUsize,
    build_should_fail: AtomicBool,
}

impl MockClientFactory {
    pub fn new(backend: MockBackend) -> Self {
        Self {
            backend,
            built: AtomicUsize::new(0),
            build_should_fail: AtomicBool::new(false),
        }
    }

    /// Number of clients built so far.
    pub fn built(&self) -> usize {
        self.built.load(Ordering::SeqCst)
    }

    pub fn set_build_should_fail(&self, should_fail: bool) {
        self.build_should_fail.store(should_fail, Ordering::SeqCst);
    }
}

impl ClientFactory for MockClientFactory {
    fn build_client(&self) -> Result<Arc<dyn MediaClient>, ClientError> {
        if self.build_should_fail.load(Ordering::SeqCst) {
            return Err(ClientError::Other("mock build failure".to_string()));
        }
        self.built.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(MockMediaClient::new(self.backend.clone())))
    }
}
