//! Controller: the integration point between input, engine and network
//!
//! A controller owns either a client or a server engine. On the client it
//! turns input events into stamped operations, applies them optimistically,
//! queues them as pending and ships them through a [`Transport`]. On the
//! server, edits made at the server itself go through the same
//! reconciliation as remote edits and are handed back for broadcast.
//!
//! # Example
//!
//! ```rust
//! use coedit_core::controller::{Controller, Incoming, TextInputEvent};
//!
//! let mut server = Controller::server();
//! let mut alice = Controller::client("alice");
//!
//! // No transport wired: the edit still applies locally and stays pending
//! let op = alice
//!     .handle_text_input_event(TextInputEvent::insert("hi", 0))
//!     .unwrap();
//!
//! let wire = op.serialize();
//! let Incoming::Broadcast(accepted) = server.process_incoming_message(&wire) else {
//!     panic!("server should accept the edit");
//! };
//!
//! // The echo of alice's own edit is her acknowledgment
//! let ack = alice.process_incoming_message(&accepted.serialize());
//! assert!(matches!(ack, Incoming::Acknowledged(_)));
//! assert_eq!(server.text(), alice.text());
//! ```

use crate::engine::{ClientTextEngine, ServerTextEngine, TextEngine};
use crate::error::{EditError, Result};
use crate::ops::{CursorMove, Delete, Insert, OpIdGenerator, Operation, OperationId, TextOperation};
use crate::protocol::Message;
use crate::ClientID;
use std::sync::Arc;

/// Client id used for edits made at the server
pub const SERVER_CLIENT_ID: &str = "Server";

/// Outbound half of the network layer, as seen by the controller
pub trait Transport: Send + Sync {
    fn is_connected(&self) -> bool;

    /// Queue `message` for delivery; `false` if it cannot be sent
    fn send_message(&self, message: &str) -> bool;
}

/// Text edit requested by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextInputEvent {
    Insert { text: String, pos: usize },
    Delete { pos: usize, length: usize },
}

impl TextInputEvent {
    pub fn insert(text: impl Into<String>, pos: usize) -> Self {
        TextInputEvent::Insert {
            text: text.into(),
            pos,
        }
    }

    pub fn delete(pos: usize, length: usize) -> Self {
        TextInputEvent::Delete { pos, length }
    }
}

/// Cursor placement requested by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorInputEvent {
    pub pos: usize,
}

/// What an incoming message did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    /// Server: operation accepted; send it to every client
    Broadcast(TextOperation),

    /// Server: a client announced its id
    Connected(ClientID),

    /// Client: remote operation applied, as transformed
    Applied(TextOperation),

    /// Client: one of our own operations was confirmed
    Acknowledged(OperationId),

    /// Client: document replaced by a server snapshot
    DocumentLoaded,

    /// Malformed, unexpected or inconsistent message; already logged
    Dropped,
}

#[derive(Debug)]
enum Role {
    Client(ClientTextEngine),
    Server(ServerTextEngine),
}

/// Mediates between input events, the text engine and the network
pub struct Controller {
    role: Role,
    ids: OpIdGenerator,
    transport: Option<Arc<dyn Transport>>,
}

impl Controller {
    /// Controller for a client with the given id
    pub fn client(client_id: impl Into<ClientID>) -> Self {
        Self {
            role: Role::Client(ClientTextEngine::new()),
            ids: OpIdGenerator::new(client_id.into()),
            transport: None,
        }
    }

    /// Controller for the authoritative server
    pub fn server() -> Self {
        Self {
            role: Role::Server(ServerTextEngine::new()),
            ids: OpIdGenerator::new(SERVER_CLIENT_ID.to_string()),
            transport: None,
        }
    }

    pub fn is_server(&self) -> bool {
        matches!(self.role, Role::Server(_))
    }

    /// Own client id; `"Server"` on the server
    pub fn client_id(&self) -> &str {
        self.ids.client_id()
    }

    /// Wire the outbound transport (client only)
    pub fn set_transport(&mut self, transport: Arc<dyn Transport>) {
        self.transport = Some(transport);
    }

    /// Replace the document, resetting cursor and version
    pub fn set_initial_document(&mut self, text: &str) {
        match &mut self.role {
            Role::Client(client) => client.load_document(text),
            Role::Server(server) => server.engine_mut().read_string(text),
        }
    }

    /// Load the document from a file; an unreadable file gives an empty one
    pub fn load_document_file(&mut self, path: impl AsRef<std::path::Path>) {
        if let Role::Client(client) = &mut self.role {
            client.load_document("");
        }
        self.engine_mut().read_file(path);
    }

    pub fn text(&self) -> String {
        self.engine().text()
    }

    pub fn cursor_position(&self) -> usize {
        self.engine().cursor_position()
    }

    pub fn set_cursor_position(&mut self, pos: usize) {
        self.engine_mut().set_cursor_position(pos);
    }

    pub fn doc_version(&self) -> u64 {
        self.engine().doc_version()
    }

    /// Unacknowledged local operations; always empty on the server
    pub fn pending(&self) -> &[TextOperation] {
        match &self.role {
            Role::Client(client) => client.pending(),
            Role::Server(_) => &[],
        }
    }

    /// Accepted operations; always empty on a client
    pub fn history(&self) -> &[TextOperation] {
        match &self.role {
            Role::Client(_) => &[],
            Role::Server(server) => server.history(),
        }
    }

    /// Apply a user edit and return the operation it produced
    ///
    /// On a client the operation is applied optimistically, queued as
    /// pending and sent through the transport. On the server it is accepted
    /// like any remote edit and returned for the caller to broadcast.
    /// Empty edits and deletes that run past the end produce nothing.
    pub fn handle_text_input_event(&mut self, event: TextInputEvent) -> Option<TextOperation> {
        let operation_id = self.ids.next_id();
        let client_id = self.client_id().to_string();
        let mut op: TextOperation = match event {
            TextInputEvent::Insert { text, pos } => Insert::new(text, pos, client_id)
                .with_id(operation_id)
                .into(),
            TextInputEvent::Delete { pos, length } => Delete::new(pos, length, client_id)
                .with_id(operation_id)
                .into(),
        };
        if op.is_noop() {
            tracing::debug!("Ignoring empty edit {}", op.operation_id());
            return None;
        }

        match &mut self.role {
            Role::Client(client) => {
                if !client.engine_mut().apply_local(&mut op).is_applied() {
                    return None;
                }
                client.add_pending_local_op(op.clone());
                self.send(&op);
                Some(op)
            }
            Role::Server(server) => {
                if let TextOperation::Delete(delete) = &op {
                    if delete.end() > server.engine().len() {
                        tracing::warn!(
                            "Ignoring server delete {}..{} past document length {}",
                            delete.pos,
                            delete.end(),
                            server.engine().len()
                        );
                        return None;
                    }
                }
                op.set_doc_version(server.engine().doc_version());
                Some(server.process_incoming_operation(op))
            }
        }
    }

    /// Move the local cursor; never transformed or sent
    pub fn handle_cursor_input_event(&mut self, event: CursorInputEvent) -> Operation {
        self.set_cursor_position(event.pos);
        Operation::CursorMove(CursorMove::new(event.pos))
    }

    /// Handle one application-level message from the network
    pub fn process_incoming_message(&mut self, message: &str) -> Incoming {
        let message = match Message::parse(message) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!("Dropping malformed message: {}", e);
                return Incoming::Dropped;
            }
        };

        let from_self = message.origin() == Some(self.ids.client_id());
        match (&mut self.role, message) {
            (Role::Server(server), Message::Operation(op)) => {
                Incoming::Broadcast(server.process_incoming_operation(op))
            }
            (Role::Server(_), Message::Connected { client_id }) => {
                tracing::info!("Client {} connected", client_id);
                Incoming::Connected(client_id)
            }
            (Role::Client(client), Message::Operation(op)) => {
                if from_self {
                    match client.acknowledge_pending_op(op.operation_id()) {
                        Ok(acked) => Incoming::Acknowledged(acked.operation_id().clone()),
                        Err(_) => Incoming::Dropped,
                    }
                } else {
                    Incoming::Applied(client.process_incoming_operation(op))
                }
            }
            (Role::Client(client), Message::InitDocument { text }) => {
                client.load_document(&text);
                tracing::info!("Loaded document snapshot ({} chars)", client.engine().len());
                Incoming::DocumentLoaded
            }
            (role, message) => {
                tracing::warn!(
                    "Dropping unexpected {:?} on {}",
                    message,
                    if matches!(role, Role::Server(_)) { "server" } else { "client" }
                );
                Incoming::Dropped
            }
        }
    }

    fn send(&self, op: &TextOperation) {
        if let Err(e) = self.try_send(op) {
            tracing::warn!("{}; {} stays local", e, op.operation_id());
        }
    }

    fn try_send(&self, op: &TextOperation) -> Result<()> {
        let transport = self.transport.as_ref().ok_or(EditError::Unwired("transport"))?;
        if !transport.is_connected() {
            return Err(EditError::NotConnected);
        }
        if !transport.send_message(&op.serialize()) {
            return Err(EditError::SendFailed(op.operation_id().to_string()));
        }
        Ok(())
    }

    fn engine(&self) -> &TextEngine {
        match &self.role {
            Role::Client(client) => client.engine(),
            Role::Server(server) => server.engine(),
        }
    }

    fn engine_mut(&mut self) -> &mut TextEngine {
        match &mut self.role {
            Role::Client(client) => client.engine_mut(),
            Role::Server(server) => server.engine_mut(),
        }
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("role", &self.role)
            .field("client_id", &self.client_id())
            .field("transport", &self.transport.is_some())
            .finish()
    }
}
