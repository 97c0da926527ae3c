//! TCP client session
//!
//! A receive task reads frames off the socket and forwards them over a
//! channel; the foreground drains the channel and applies each message to
//! the controller under its lock. Local edits take the same lock, so the
//! engine is never touched from two tasks at once.

use super::frame::{read_frame, write_frame};
use crate::config::Config;
use crate::controller::{Controller, CursorInputEvent, Incoming, TextInputEvent, Transport};
use crate::error::{EditError, Result};
use crate::ops::TextOperation;
use crate::protocol::Message;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Outbound side of a client connection
#[derive(Debug)]
pub struct ClientConnection {
    running: Arc<AtomicBool>,
    outbound: mpsc::UnboundedSender<String>,
}

impl ClientConnection {
    /// Flip the running flag; the socket tasks wind down on their own
    pub fn disconnect(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            info!("Disconnecting");
        }
    }
}

impl Transport for ClientConnection {
    fn is_connected(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn send_message(&self, message: &str) -> bool {
        self.is_connected() && self.outbound.send(message.to_string()).is_ok()
    }
}

/// Connected client: controller, connection and inbound queue
pub struct ClientSession {
    controller: Arc<Mutex<Controller>>,
    connection: Arc<ClientConnection>,
    inbound: mpsc::UnboundedReceiver<String>,
    reader_task: JoinHandle<()>,
    writer_task: JoinHandle<()>,
}

/// Connect to the server named in `config` and announce `config.client_id`
///
/// A failed connect is returned as is; there is no retry.
pub async fn connect(config: &Config) -> Result<ClientSession> {
    config.validate()?;
    let addr = config.connect_addr();
    let stream = TcpStream::connect(&addr).await?;
    info!("Connected to {} as {}", addr, config.client_id);

    let (mut reader, mut writer) = stream.into_split();
    let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<String>();
    let (inbound_tx, inbound) = mpsc::unbounded_channel::<String>();

    let running = Arc::new(AtomicBool::new(true));
    let connection = Arc::new(ClientConnection {
        running: running.clone(),
        outbound,
    });

    let mut controller = Controller::client(config.client_id.clone());
    controller.set_transport(connection.clone());
    let controller = Arc::new(Mutex::new(controller));

    // Handshake is queued before any edit can be
    if !connection.send_message(&Message::connected(config.client_id.clone()).encode()) {
        return Err(EditError::SendFailed("handshake".to_string()));
    }

    let writer_running = running.clone();
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if let Err(e) = write_frame(&mut writer, &message).await {
                warn!("Send failed: {}", e);
                writer_running.store(false, Ordering::SeqCst);
                break;
            }
        }
    });

    let max_message_bytes = config.max_message_bytes;
    let reader_task = tokio::spawn(async move {
        while running.load(Ordering::SeqCst) {
            match read_frame(&mut reader, max_message_bytes).await {
                Ok(Some(message)) => {
                    if inbound_tx.send(message).is_err() {
                        break;
                    }
                }
                Ok(None) => {
                    info!("Server closed the connection");
                    break;
                }
                Err(e) if e.is_protocol() => warn!("Dropping frame: {}", e),
                Err(e) => {
                    warn!("Receive failed: {}", e);
                    break;
                }
            }
        }
        running.store(false, Ordering::SeqCst);
    });

    Ok(ClientSession {
        controller,
        connection,
        inbound,
        reader_task,
        writer_task,
    })
}

impl ClientSession {
    /// Shared controller, for callers that need direct access
    pub fn controller(&self) -> Arc<Mutex<Controller>> {
        self.controller.clone()
    }

    pub fn client_id(&self) -> String {
        self.controller.lock().client_id().to_string()
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    pub fn text(&self) -> String {
        self.controller.lock().text()
    }

    pub fn cursor_position(&self) -> usize {
        self.controller.lock().cursor_position()
    }

    /// Number of local edits the server has not yet confirmed
    pub fn pending_len(&self) -> usize {
        self.controller.lock().pending().len()
    }

    /// Insert locally and send
    pub fn insert(&self, text: &str, pos: usize) -> Option<TextOperation> {
        self.controller
            .lock()
            .handle_text_input_event(TextInputEvent::insert(text, pos))
    }

    /// Delete locally and send
    pub fn delete(&self, pos: usize, length: usize) -> Option<TextOperation> {
        self.controller
            .lock()
            .handle_text_input_event(TextInputEvent::delete(pos, length))
    }

    pub fn move_cursor(&self, pos: usize) {
        let _ = self
            .controller
            .lock()
            .handle_cursor_input_event(CursorInputEvent { pos });
    }

    /// Wait for the next message and apply it
    ///
    /// Returns `None` once the connection is gone and every received
    /// message has been applied.
    pub async fn recv(&mut self) -> Option<Incoming> {
        let message = self.inbound.recv().await?;
        Some(self.apply(&message))
    }

    /// Apply every message that has already arrived, without waiting
    pub fn drain(&mut self) -> Vec<Incoming> {
        let mut applied = Vec::new();
        while let Ok(message) = self.inbound.try_recv() {
            applied.push(self.apply(&message));
        }
        applied
    }

    /// Close the connection; unsent messages are discarded
    pub async fn disconnect(self) {
        self.connection.disconnect();
        self.reader_task.abort();
        self.writer_task.abort();
        let _ = self.reader_task.await;
        let _ = self.writer_task.await;
    }

    fn apply(&self, message: &str) -> Incoming {
        let incoming = self.controller.lock().process_incoming_message(message);
        debug!("Applied inbound message: {:?}", incoming);
        incoming
    }
}

impl std::fmt::Debug for ClientSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSession")
            .field("connection", &self.connection)
            .finish()
    }
}
