//! Mock implementations for testing.
//!
//! This module provides mock implementations of all trait abstractions,
//! enabling unit testing without network dependencies or file system access.
//!
//! # Available Mocks
//!
//! - [`MockBackend`] / [`MockMediaClient`] - Fake media server and its clients
//! - [`MockClientFactory`] - Builds mock clients for one backend
//! - [`InMemoryCredentialStore`] - In-memory server list
//! - [`MockThemeSource`] - Scripted theme search and download

pub mod client_factory;
pub mod credentials;
pub mod media_client;
pub mod theme_source;

pub use client_factory::MockClientFactory;
pub use credentials::InMemoryCredentialStore;
pub use media_client::{MockBackend, MockMediaClient, MOCK_SERVER_ID};
pub use theme_source::MockThemeSource;
