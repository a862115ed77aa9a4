//! # Matchmaking Server Library
//!
//! This library implements the server for a real-time two-player matchmaking
//! and session-scoring service. Clients connect over WebSockets, log in with
//! a display name, wait in the lounge until a peer is available, play their
//! game independently, and report a final score; the server aggregates both
//! reports and broadcasts the outcome and standings to both participants.
//!
//! ## Core Responsibilities
//!
//! ### Connection Tracking
//! Every live connection is tracked in a registry together with the player
//! state it accumulates: the name set at login, the score reported at game
//! end, and a back-reference (by id, never by owning handle) to the session
//! it is currently part of.
//!
//! ### Matchmaking
//! Logged-in connections wait in a FIFO lounge. A background tick fires at a
//! fixed interval and drains the lounge two entries at a time, creating a
//! session per pair and notifying both participants to start. Pairing is
//! strictly FIFO-fair; an odd leftover waits for the next tick.
//!
//! ### Session Scoring
//! Each session is a small state machine: `Active` on creation, `Completed`
//! the moment both participants have reported. Completion triggers result
//! aggregation exactly once: participants are stably sorted by score
//! descending, standings are built, and every participant receives a
//! personal outcome plus the shared standings.
//!
//! ## Architecture Design
//!
//! ### Single-Task Event Loop
//! All engine state is owned by one task. Transport tasks deliver
//! connect/disconnect/frame events over a channel, and the pairing tick runs
//! in the same `tokio::select!` loop, so no mutation of the lounge, the
//! session set, or the registry ever races another. This mirrors the
//! single-threaded execution discipline the protocol's semantics assume.
//!
//! ### WebSocket Transport
//! Connections are persistent duplex WebSocket streams carrying JSON text
//! frames. Outbound sends are fire-and-forget: a slow or dead peer is the
//! transport's problem, never the engine's.
//!
//! ## Module Organization
//!
//! - [`registry`] — live connections and their player state, plus the
//!   per-connection outbound send adapter.
//! - [`lounge`] — the FIFO matchmaking queue.
//! - [`session`] — session state machine, session manager, and the
//!   injectable session-id source.
//! - [`results`] — the score-aggregation and standings algorithm.
//! - [`engine`] — inbound message dispatch, the login/end handlers, the
//!   pairing tick, and disconnect handling.
//! - [`network`] — the WebSocket accept loop, per-connection tasks, and the
//!   main server loop.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::Server;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Pair waiting players once a second, as fast as the lounge fills.
//!     let server = Server::bind("127.0.0.1:8080", Duration::from_millis(1000)).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod engine;
pub mod lounge;
pub mod network;
pub mod registry;
pub mod results;
pub mod session;
