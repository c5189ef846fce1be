//! Swiss-system standings and pairings.
//!
//! This module provides:
//! - Player and tournament registration, and enrollment
//! - Match reporting with a strength-of-opponent tie-break score
//! - Ranked standings (wins, then points, then player id)
//! - Next-round pairings of adjacent players in the standings
//! - Winner detection after `ceil(log2(n))` rounds
//!
//! ## Example
//!
//! ```no_run
//! use swiss_tournament::db::MemoryTournamentStore;
//! use swiss_tournament::swiss::SwissManager;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let swiss = SwissManager::new(Arc::new(MemoryTournamentStore::new()));
//!
//!     let tournament = swiss.register_tournament("Chess club").await?;
//!     for name in ["Ann", "Bob", "Cid", "Dee"] {
//!         let player = swiss.register_player(name).await?;
//!         swiss.enroll(tournament.id, player.id).await?;
//!     }
//!
//!     for pairing in swiss.swiss_pairings(tournament.id).await? {
//!         println!("{} vs {}", pairing.player1_name, pairing.player2_name);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod manager;
pub mod models;
pub mod pairing;
pub mod scoring;
pub mod standings;

pub use errors::{ErrorKind, SwissError, SwissResult};
pub use manager::SwissManager;
pub use models::{
    MatchRecord, MatchResult, Pairing, Player, PlayerId, PlayerTally, Standing, Tournament,
    TournamentId,
};
