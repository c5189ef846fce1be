//! Standings engine.
//!
//! Turns raw match rows into per-player tallies and orders them into a
//! ranking: wins descending, then tie-break points descending, then player id
//! ascending so that identical data always ranks identically.

use super::models::{MatchRecord, Player, PlayerTally, Standing};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Aggregate match rows for the given enrolled players.
///
/// Every player appears in the output, including players without matches.
/// Rows belonging to players outside `players` are ignored. Callers pass the
/// rows of a single tournament.
pub fn tally(players: &[Player], matches: &[MatchRecord]) -> Vec<PlayerTally> {
    let mut tallies: HashMap<i64, PlayerTally> = players
        .iter()
        .map(|p| (p.id, PlayerTally::empty(p.id, p.name.clone())))
        .collect();

    for record in matches {
        if let Some(t) = tallies.get_mut(&record.player_id) {
            t.matches += 1;
            t.points += record.points;
            if record.won {
                t.wins += 1;
            }
        }
    }

    tallies.into_values().collect()
}

/// Ranking comparator
pub fn compare(a: &PlayerTally, b: &PlayerTally) -> Ordering {
    b.wins
        .cmp(&a.wins)
        .then_with(|| b.points.cmp(&a.points))
        .then_with(|| a.player_id.cmp(&b.player_id))
}

/// Order tallies into standings
pub fn rank(mut tallies: Vec<PlayerTally>) -> Vec<Standing> {
    tallies.sort_by(compare);
    tallies.into_iter().map(Standing::from).collect()
}

/// Minimum number of rounds every player must complete before a winner can
/// be declared: `ceil(log2(n))`
pub fn required_rounds(player_count: usize) -> u32 {
    match player_count {
        0 | 1 => 0,
        n => usize::BITS - (n - 1).leading_zeros(),
    }
}

/// Sole leader of ranked standings, if the tournament is decided.
///
/// Returns `None` while any player has played fewer than
/// [`required_rounds`] matches, or when the top two are level on both wins
/// and points.
pub fn leader(standings: &[Standing]) -> Option<&Standing> {
    let first = standings.first()?;
    let rounds = i64::from(required_rounds(standings.len()));

    if standings.iter().any(|s| s.matches < rounds) {
        return None;
    }

    match standings.get(1) {
        Some(second) if second.wins == first.wins && second.points == first.points => None,
        _ => Some(first),
    }
}
