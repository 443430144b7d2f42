//! Concrete implementations of trait abstractions.
//!
//! This module provides the production adapters behind the traits defined
//! in `crate::traits`.
//!
//! # Adapters
//!
//! - [`JellyfinClient`] - REST + event socket client for a Jellyfin server
//! - [`JellyfinClientFactory`] - Builds configured Jellyfin clients
//! - [`FileCredentialStore`] - JSON file server list
//! - [`YtDlpThemeSource`] - Theme search and audio extraction via yt-dlp
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles for all adapters:
//! - [`mock::MockBackend`] / [`mock::MockMediaClient`] - Fake server and clients
//! - [`mock::MockClientFactory`] - Mock client factory
//! - [`mock::InMemoryCredentialStore`] - In-memory server list
//! - [`mock::MockThemeSource`] - Scripted theme source

pub mod client_factory;
pub mod file_credentials;
pub mod jellyfin_client;
pub mod mock;
pub mod ytdlp_theme;

pub use client_factory::JellyfinClientFactory;
pub use file_credentials::FileCredentialStore;
pub use jellyfin_client::JellyfinClient;
pub use mock::{InMemoryCredentialStore, MockBackend, MockClientFactory, MockThemeSource};
pub use ytdlp_theme::YtDlpThemeSource;
