//! Tie-break scoring for reported matches.
//!
//! A win is worth the loser's current win count plus one, so beating an
//! opponent who has already won more games earns more tie-break points.
//! The loser's row is always worth zero.

/// Points credited to the loser's row
pub const LOSER_POINTS: i64 = 0;

/// Points credited to the winner, given the loser's wins before this match
pub fn winner_points(loser_wins_before: i64) -> i64 {
    loser_wins_before + 1
}
