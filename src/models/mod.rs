//! Data models shared between the session layer, the backend adapters and
//! the catalog/theme helpers.

pub mod item;
pub mod server;

pub use item::{Item, ItemQuery, MediaSource};
pub use server::{Capabilities, ClientEvent, ConnectionState, ServerCredentials, ServerRecord};
