//! # Swiss Tournament
//!
//! Swiss-system standings and pairings over a relational store.
//!
//! Each round, players with similar records are paired against each other
//! without elimination. The library computes:
//!
//! - **Standings**: wins, matches played and a tie-break score per enrolled
//!   player, ranked by wins, then points, then player id
//! - **Pairings**: adjacent players in the standings, two at a time
//! - **Winner**: the sole leader once every player has played enough rounds
//!
//! A win is worth the loser's current win count plus one in tie-break points,
//! so beating a stronger opponent counts for more.
//!
//! ## Core Modules
//!
//! - [`swiss`]: Standings and pairing engines, scoring, and [`SwissManager`]
//! - [`db`]: The [`TournamentStore`] boundary with PostgreSQL and in-memory
//!   implementations
//!
//! ## Example
//!
//! ```
//! use swiss_tournament::swiss::{pairing, standings, PlayerTally};
//!
//! let ranked = standings::rank(vec![
//!     PlayerTally::empty(2, "Bob"),
//!     PlayerTally::empty(1, "Ann"),
//! ]);
//! let pairs = pairing::pair(&ranked).unwrap();
//! assert_eq!(pairs[0].player1_name, "Ann");
//! ```

/// PostgreSQL pool, schema migrations and tournament storage.
pub mod db;

/// Swiss-system standings, scoring and pairing.
pub mod swiss;

pub use db::{Database, DatabaseConfig, MemoryTournamentStore, PgTournamentStore, TournamentStore};
pub use swiss::{
    ErrorKind, MatchResult, Pairing, Player, PlayerId, Standing, SwissError, SwissManager,
    SwissResult, Tournament, TournamentId,
};
