//! Result aggregation for completed sessions
//!
//! Runs exactly once per session, the moment the second score report lands.
//! Participants are sorted by score descending with a stable sort, so equal
//! scores keep their pairing order and the output stays deterministic.
//! Everyone whose score equals the top score gets the congratulatory
//! outcome; a tie at the top produces two winners.

use crate::registry::{ConnectionId, Registry};
use shared::{ServerMessage, Standing};

pub const WIN_OUTCOME: &str = "Congratulations, you are the Tetris master!";
pub const LOSS_OUTCOME: &str = "Seriously, thats all you got?";

/// Builds the per-participant result messages for a completed session.
///
/// Participants that have already vanished from the registry are skipped;
/// they can no longer receive a result and contribute no standing.
pub fn aggregate(participants: &[ConnectionId], registry: &Registry) -> Vec<(ConnectionId, ServerMessage)> {
    let mut scored: Vec<(ConnectionId, String, i64)> = participants
        .iter()
        .filter_map(|id| registry.get(*id))
        .map(|conn| {
            (
                conn.id,
                conn.name.clone().unwrap_or_default(),
                conn.score.unwrap_or(0),
            )
        })
        .collect();

    // Stable sort: ties keep their relative (pairing) order.
    scored.sort_by(|a, b| b.2.cmp(&a.2));

    let high = match scored.first() {
        Some((_, _, points)) => *points,
        None => return Vec::new(),
    };

    let standings: Vec<Standing> = scored
        .iter()
        .map(|(_, name, points)| Standing {
            name: name.clone(),
            points: *points,
        })
        .collect();

    scored
        .iter()
        .map(|(id, _, points)| {
            let outcome = if *points == high {
                WIN_OUTCOME
            } else {
                LOSS_OUTCOME
            };
            (
                *id,
                ServerMessage::Result {
                    outcome: outcome.to_string(),
                    standings: standings.clone(),
                },
            )
        })
        .collect()
}
