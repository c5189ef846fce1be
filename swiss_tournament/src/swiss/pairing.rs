//! Pairing engine.
//!
//! Pairs ranked standings two at a time: first with second, third with
//! fourth, and so on. Single pass, no backtracking. Rematches are not
//! avoided; the points tie-break is the only thing separating players inside
//! a win bracket.

use super::{
    errors::{SwissError, SwissResult},
    models::{Pairing, Standing},
};

/// Pair adjacent entries of ranked standings.
///
/// # Errors
///
/// * `SwissError::OddPlayerCount` - Standings have an odd number of entries
pub fn pair(standings: &[Standing]) -> SwissResult<Vec<Pairing>> {
    if standings.len() % 2 != 0 {
        return Err(SwissError::OddPlayerCount(standings.len()));
    }

    Ok(standings
        .chunks_exact(2)
        .map(|pair| Pairing {
            player1_id: pair[0].player_id,
            player1_name: pair[0].name.clone(),
            player2_id: pair[1].player_id,
            player2_name: pair[1].name.clone(),
        })
        .collect())
}
