//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`MediaClient`] - one client handle to a media server
//! - [`ClientFactory`] - builds configured, unauthenticated clients
//! - [`CredentialStore`] - persisted server list
//! - [`ThemeSource`] - theme search and audio download

pub mod client_factory;
pub mod credential_store;
pub mod media_client;
pub mod theme_source;

pub use client_factory::ClientFactory;
pub use credential_store::CredentialStore;
pub use media_client::{EventReceiver, MediaClient};
pub use theme_source::ThemeSource;
