//! Swiss tournament error types.

use super::models::{PlayerId, TournamentId};
use std::time::Duration;
use thiserror::Error;

/// Coarse error classification callers use to decide between retry and abort
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Referenced tournament, player or enrollment does not exist
    NotFound,
    /// Request violates a tournament invariant
    ConstraintViolation,
    /// Storage layer failed (connection, commit, timeout)
    StorageFailure,
}

/// Swiss tournament errors
#[derive(Debug, Error)]
pub enum SwissError {
    #[error("Tournament not found: {0}")]
    TournamentNotFound(TournamentId),

    #[error("Player not found: {0}")]
    PlayerNotFound(PlayerId),

    #[error("Player {player} is not enrolled in tournament {tournament}")]
    NotEnrolled {
        tournament: TournamentId,
        player: PlayerId,
    },

    #[error("Player {player} is already enrolled in tournament {tournament}")]
    AlreadyEnrolled {
        tournament: TournamentId,
        player: PlayerId,
    },

    #[error("Player {0} cannot be reported against themselves")]
    SelfMatch(PlayerId),

    #[error("Cannot pair an odd number of players: {0}")]
    OddPlayerCount(usize),

    #[error("Name must not be empty")]
    EmptyName,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Database operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl SwissError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            SwissError::TournamentNotFound(_) | SwissError::PlayerNotFound(_) => {
                ErrorKind::NotFound
            }
            SwissError::NotEnrolled { .. }
            | SwissError::AlreadyEnrolled { .. }
            | SwissError::SelfMatch(_)
            | SwissError::OddPlayerCount(_)
            | SwissError::EmptyName => ErrorKind::ConstraintViolation,
            SwissError::Database(_)
            | SwissError::Migration(_)
            | SwissError::Timeout(_)
            | SwissError::StorageUnavailable(_) => ErrorKind::StorageFailure,
        }
    }

    /// Whether a caller may retry the operation.
    ///
    /// Only storage failures qualify, and only for reads: match reporting is
    /// not idempotent, so a blind retry can double-count a result.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::StorageFailure
    }

    /// Get a client-safe error message that doesn't leak storage internals
    pub fn client_message(&self) -> String {
        match self {
            SwissError::Database(_) | SwissError::Migration(_) => {
                "Internal storage error".to_string()
            }
            SwissError::StorageUnavailable(_) => "Storage unavailable".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for Swiss tournament operations
pub type SwissResult<T> = Result<T, SwissError>;
