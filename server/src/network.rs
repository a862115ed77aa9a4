//! WebSocket transport layer and the server's main event loop
//!
//! The transport is a thin shim around the engine: an accept loop hands each
//! TCP stream to a per-connection task that completes the WebSocket
//! handshake, registers an [`Outbox`] with the engine, forwards inbound text
//! frames over the shared event channel in arrival order, and reports the
//! disconnect when the stream ends. A companion writer task drains the
//! connection's outbox, serializing each structured message to JSON at the
//! wire boundary.
//!
//! The main loop is a single `tokio::select!` over the event channel and the
//! pairing interval, so every engine mutation happens on one task.

use crate::engine::{Engine, EngineEvent};
use crate::registry::{ConnectionId, Outbox};
use crate::session::UuidSource;
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::interval;
use tokio_tungstenite::{accept_async, tungstenite::Message};

/// Main server coordinating the transport tasks and the engine loop.
pub struct Server {
    listener: TcpListener,
    engine: Engine,
    pairing_interval: Duration,

    event_tx: mpsc::UnboundedSender<EngineEvent>,
    event_rx: mpsc::UnboundedReceiver<EngineEvent>,
}

impl Server {
    /// Binds the listener and prepares the engine. `pairing_interval` is how
    /// often the lounge is drained into new sessions.
    pub async fn bind(
        addr: &str,
        pairing_interval: Duration,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let listener = TcpListener::bind(addr).await?;
        info!("Server listening on {}", listener.local_addr()?);

        let (event_tx, event_rx) = mpsc::unbounded_channel();

        Ok(Server {
            listener,
            engine: Engine::new(Box::new(UuidSource)),
            pairing_interval,
            event_tx,
            event_rx,
        })
    }

    /// The actual address bound, useful when binding to port 0.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the accept loop and the engine loop until the process stops.
    pub async fn run(mut self) -> Result<(), Box<dyn std::error::Error>> {
        let accept_tx = self.event_tx.clone();
        let listener = self.listener;
        tokio::spawn(async move {
            accept_loop(listener, accept_tx).await;
        });

        let mut pairing = interval(self.pairing_interval);
        // The first interval tick fires immediately; skip it so pairing
        // starts one full interval after boot.
        pairing.tick().await;

        info!("Server started successfully");

        loop {
            tokio::select! {
                event = self.event_rx.recv() => {
                    match event {
                        Some(event) => self.engine.handle_event(event),
                        None => {
                            info!("Event channel closed, shutting down");
                            break;
                        }
                    }
                },
                _ = pairing.tick() => {
                    self.engine.pairing_tick();
                },
            }
        }

        Ok(())
    }
}

/// Accepts TCP connections forever, assigning each a fresh connection id.
async fn accept_loop(listener: TcpListener, events: mpsc::UnboundedSender<EngineEvent>) {
    let mut next_id: ConnectionId = 1;

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let id = next_id;
                next_id += 1;
                let events = events.clone();
                tokio::spawn(async move {
                    handle_connection(id, stream, addr, events).await;
                });
            }
            Err(e) => {
                error!("Error accepting connection: {}", e);
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        }
    }
}

/// Drives one client connection from handshake to disconnect.
async fn handle_connection(
    id: ConnectionId,
    stream: TcpStream,
    addr: SocketAddr,
    events: mpsc::UnboundedSender<EngineEvent>,
) {
    let ws = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!("WebSocket handshake failed for {}: {}", addr, e);
            return;
        }
    };
    debug!("Connection {} established from {}", id, addr);

    let (mut sink, mut source) = ws.split();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel();

    if events
        .send(EngineEvent::Connected {
            id,
            outbox: Outbox::new(out_tx),
        })
        .is_err()
    {
        return;
    }

    // Writer task: the serialization boundary. Structured messages in,
    // JSON text frames out.
    let writer = tokio::spawn(async move {
        while let Some(message) = out_rx.recv().await {
            match serde_json::to_string(&message) {
                Ok(text) => {
                    if sink.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Err(e) => error!("Failed to encode outbound message: {}", e),
            }
        }
    });

    // Read loop: forward text frames to the engine in arrival order.
    while let Some(frame) = source.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                if events.send(EngineEvent::Frame { id, text }).is_err() {
                    break;
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {} // binary/ping/pong frames carry no protocol messages
            Err(e) => {
                debug!("Connection {} read error: {}", id, e);
                break;
            }
        }
    }

    let _ = events.send(EngineEvent::Disconnected { id });
    writer.abort();
    debug!("Connection {} from {} closed", id, addr);
}
