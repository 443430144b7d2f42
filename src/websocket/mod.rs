//! Server event socket.

pub mod client;
pub mod messages;

pub use client::{JellyfinSocket, SocketConfig};
pub use messages::SocketMessage;
