//! deckhand local server
//!
//! Serves a presentation tree over HTTP so pages can be opened by URL, and
//! optionally pushes reload notifications to open pages over a WebSocket.

pub mod error;
pub mod reload;
pub mod server;

pub use error::{ServerError, ServerResult};
pub use reload::{ReloadEvent, Reloader};
pub use server::{LocalServer, ServerConfig, ServerHandle};
