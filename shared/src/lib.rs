use serde::{Deserialize, Serialize};

/// Messages sent from the client to the server.
///
/// The wire format is a JSON object tagged by its `type` field, e.g.
/// `{"type":"login","name":"alice"}`. Serde's internally-tagged
/// representation keeps the Rust enum and the wire shape in lockstep.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Registers a display name and enters the matchmaking lounge.
    /// The name is taken as-is; an empty string is accepted.
    Login { name: String },
    /// Reports the final score of the sender's current game session.
    End { points: i64 },
}

/// Messages sent from the server to the client.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Acknowledges a login, echoing the registered name.
    LoggedIn { name: String },
    /// Tells a paired client to begin playing.
    Start,
    /// Terminal message for a completed session: the sender's personal
    /// outcome line plus the full standings, sorted by score descending.
    Result {
        outcome: String,
        standings: Vec<Standing>,
    },
}

/// One row of the final standings for a completed session.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Standing {
    pub name: String,
    pub points: i64,
}
