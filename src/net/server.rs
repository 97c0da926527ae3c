//! TCP server session
//!
//! One accept loop plus one task per connection. The authoritative
//! controller and the client registry sit behind a single lock, so at most
//! one operation is reconciled at a time and broadcast happens in the same
//! critical section as acceptance.

use super::frame::{read_frame, write_frame};
use crate::config::Config;
use crate::controller::{Controller, Incoming, TextInputEvent};
use crate::error::Result;
use crate::ops::TextOperation;
use crate::protocol::Message;
use crate::ClientID;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

type Outbox = mpsc::UnboundedSender<String>;

struct ServerState {
    controller: Controller,
    clients: HashMap<ClientID, Outbox>,
}

impl ServerState {
    /// Send `op` to every registered client, the originator included
    fn broadcast(&self, op: &TextOperation) {
        let wire = op.serialize();
        for (client_id, outbox) in &self.clients {
            if outbox.send(wire.clone()).is_err() {
                debug!("Client {} is closing; broadcast skipped", client_id);
            }
        }
    }
}

/// Handle to a running server
pub struct ServerHandle {
    local_addr: SocketAddr,
    state: Arc<Mutex<ServerState>>,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ServerHandle {
    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Current authoritative document
    pub fn text(&self) -> String {
        self.state.lock().controller.text()
    }

    /// Number of accepted operations
    pub fn history_len(&self) -> usize {
        self.state.lock().controller.history().len()
    }

    /// Clients that completed the handshake and are still connected
    pub fn client_count(&self) -> usize {
        self.state.lock().clients.len()
    }

    /// Edit the document at the server and broadcast the result
    pub fn edit(&self, event: TextInputEvent) -> Option<TextOperation> {
        let mut state = self.state.lock();
        let op = state.controller.handle_text_input_event(event)?;
        state.broadcast(&op);
        Some(op)
    }

    /// Stop accepting, close every connection and wait for the accept loop
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            warn!("Server task ended abnormally: {}", e);
        }
        info!("Server on {} stopped", self.local_addr);
    }
}

/// Bind according to `config` and start serving
///
/// The starting document is loaded from `config.initial_document` if set.
pub async fn serve(config: &Config) -> Result<ServerHandle> {
    let mut controller = Controller::server();
    if let Some(path) = &config.initial_document {
        controller.load_document_file(path);
    }

    let listener = TcpListener::bind(config.listen_addr()).await?;
    serve_on(listener, controller, config.max_message_bytes)
}

/// Start serving on an already bound listener
pub fn serve_on(
    listener: TcpListener,
    controller: Controller,
    max_message_bytes: usize,
) -> Result<ServerHandle> {
    let local_addr = listener.local_addr()?;
    let state = Arc::new(Mutex::new(ServerState {
        controller,
        clients: HashMap::new(),
    }));
    let (shutdown, shutdown_rx) = watch::channel(false);

    info!("Listening on {}", local_addr);
    let task = tokio::spawn(accept_loop(
        listener,
        state.clone(),
        max_message_bytes,
        shutdown_rx,
    ));

    Ok(ServerHandle {
        local_addr,
        state,
        shutdown,
        task,
    })
}

async fn accept_loop(
    listener: TcpListener,
    state: Arc<Mutex<ServerState>>,
    max_message_bytes: usize,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    info!("Accepted connection from {}", peer);
                    let state = state.clone();
                    let shutdown = shutdown.clone();
                    tokio::spawn(async move {
                        handle_connection(stream, state, max_message_bytes, shutdown).await;
                        info!("Connection from {} closed", peer);
                    });
                }
                Err(e) => warn!("Accept failed: {}", e),
            },
            _ = shutdown.changed() => break,
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    state: Arc<Mutex<ServerState>>,
    max_message_bytes: usize,
    mut shutdown: watch::Receiver<bool>,
) {
    let (mut reader, writer) = stream.into_split();

    let client_id = tokio::select! {
        id = handshake(&mut reader, max_message_bytes) => match id {
            Some(id) => id,
            None => return,
        },
        _ = shutdown.changed() => return,
    };

    let (outbox, inbox) = mpsc::unbounded_channel();
    {
        let mut state = state.lock();
        if state.clients.contains_key(&client_id) {
            warn!("Client id {} reconnected; replacing previous connection", client_id);
        }
        // Snapshot goes first so every later broadcast applies on top of it
        let snapshot = Message::init_document(state.controller.text()).encode();
        let _ = outbox.send(snapshot);
        state.clients.insert(client_id.clone(), outbox.clone());
        info!("Client {} joined ({} connected)", client_id, state.clients.len());
    }

    let writer_task = tokio::spawn(write_loop(writer, inbox));

    loop {
        let frame = tokio::select! {
            frame = read_frame(&mut reader, max_message_bytes) => frame,
            _ = shutdown.changed() => break,
        };

        match frame {
            Ok(Some(message)) => {
                let mut state = state.lock();
                match state.controller.process_incoming_message(&message) {
                    Incoming::Broadcast(op) => state.broadcast(&op),
                    Incoming::Dropped => {}
                    other => debug!("Ignoring {:?} from {}", other, client_id),
                }
            }
            Ok(None) => break,
            Err(e) if e.is_protocol() => warn!("Dropping frame from {}: {}", client_id, e),
            Err(e) => {
                warn!("Read from {} failed: {}", client_id, e);
                break;
            }
        }
    }

    {
        let mut state = state.lock();
        let registered = state
            .clients
            .get(&client_id)
            .is_some_and(|current| current.same_channel(&outbox));
        if registered {
            state.clients.remove(&client_id);
        }
        info!("Client {} left ({} connected)", client_id, state.clients.len());
    }

    drop(outbox);
    let _ = writer_task.await;
}

/// Wait for `CONNECTED:<id>`; anything else before it is dropped
async fn handshake<R>(reader: &mut R, max_message_bytes: usize) -> Option<ClientID>
where
    R: AsyncRead + Unpin,
{
    loop {
        match read_frame(reader, max_message_bytes).await {
            Ok(Some(message)) => match Message::parse(&message) {
                Ok(Message::Connected { client_id }) => return Some(client_id),
                Ok(other) => warn!("Expected handshake, got {:?}", other),
                Err(e) => warn!("Malformed handshake: {}", e),
            },
            Ok(None) => return None,
            Err(e) if e.is_protocol() => warn!("Dropping frame before handshake: {}", e),
            Err(e) => {
                warn!("Handshake read failed: {}", e);
                return None;
            }
        }
    }
}

async fn write_loop<W>(mut writer: W, mut inbox: mpsc::UnboundedReceiver<String>)
where
    W: AsyncWrite + Unpin,
{
    while let Some(message) = inbox.recv().await {
        if let Err(e) = write_frame(&mut writer, &message).await {
            warn!("Write failed: {}", e);
            break;
        }
    }
}
