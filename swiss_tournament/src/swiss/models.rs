//! Swiss tournament data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Player ID type
pub type PlayerId = i64;

/// Tournament ID type
pub type TournamentId = i64;

/// Registered player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Tournament record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// One directed match row.
///
/// Every reported result is stored twice: once from the winner's side and
/// once from the loser's side, so per-player aggregation never has to look
/// at which column a player sits in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: i64,
    pub tournament_id: TournamentId,
    pub player_id: PlayerId,
    pub opponent_id: PlayerId,
    pub won: bool,
    pub points: i64,
}

/// Unordered per-player aggregate over a tournament's match rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerTally {
    pub player_id: PlayerId,
    pub name: String,
    pub wins: i64,
    pub matches: i64,
    pub points: i64,
}

impl PlayerTally {
    /// Tally for an enrolled player with no matches yet
    pub fn empty(player_id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            player_id,
            name: name.into(),
            wins: 0,
            matches: 0,
            points: 0,
        }
    }
}

/// A player's position in the ranked standings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub player_id: PlayerId,
    pub name: String,
    pub wins: i64,
    pub matches: i64,
    /// Tie-break score; never the primary ranking key
    pub points: i64,
}

impl From<PlayerTally> for Standing {
    fn from(tally: PlayerTally) -> Self {
        Self {
            player_id: tally.player_id,
            name: tally.name,
            wins: tally.wins,
            matches: tally.matches,
            points: tally.points,
        }
    }
}

/// Next-round pairing of two adjacent standings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pairing {
    pub player1_id: PlayerId,
    pub player1_name: String,
    pub player2_id: PlayerId,
    pub player2_name: String,
}

impl Pairing {
    /// Whether the given player sits on either side of this pairing
    pub fn involves(&self, player_id: PlayerId) -> bool {
        self.player1_id == player_id || self.player2_id == player_id
    }
}

/// Outcome of a reported match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub tournament_id: TournamentId,
    pub winner_id: PlayerId,
    pub loser_id: PlayerId,
    /// Loser's win count read inside the reporting transaction
    pub loser_wins_before: i64,
    /// Points credited to the winner's row
    pub winner_points: i64,
}
