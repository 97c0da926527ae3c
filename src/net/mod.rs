//! Networking over TCP (tokio)
//!
//! The server accepts clients, answers each handshake with a snapshot of
//! the document, and broadcasts every accepted operation to all clients.
//! A client treats the echo of its own operation as the acknowledgment.
//!
//! There is no reconnect: a dropped connection ends that session.

pub mod client;
pub mod frame;
pub mod server;

pub use client::{connect, ClientConnection, ClientSession};
pub use frame::{read_frame, write_frame};
pub use server::{serve, serve_on, ServerHandle};
