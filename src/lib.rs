//! Theme finder - downloads theme songs for the movies and series of one or
//! more Jellyfin servers.
//!
//! This library exposes modules for use in integration tests.

pub mod adapters;
pub mod auth;
pub mod catalog;
pub mod cli;
pub mod error;
pub mod manager;
pub mod models;
pub mod session;
pub mod startup;
pub mod themes;
pub mod traits;
pub mod websocket;
