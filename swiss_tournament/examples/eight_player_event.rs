//! Eight-Player Event Example
//!
//! Plays three rounds of a Swiss event on the in-memory store and shows how
//! the points tie-break separates players with the same number of wins.

use std::sync::Arc;
use swiss_tournament::db::MemoryTournamentStore;
use swiss_tournament::swiss::{Standing, SwissManager, SwissResult};

fn print_standings(standings: &[Standing]) {
    println!("{:<4} {:<6} {:>4} {:>7} {:>6}", "#", "Name", "Wins", "Matches", "Points");
    for (i, s) in standings.iter().enumerate() {
        println!(
            "{:<4} {:<6} {:>4} {:>7} {:>6}",
            i + 1,
            s.name,
            s.wins,
            s.matches,
            s.points
        );
    }
    println!();
}

#[tokio::main]
async fn main() -> SwissResult<()> {
    println!("=== Swiss Tournament Example ===\n");

    let swiss = SwissManager::new(Arc::new(MemoryTournamentStore::new()));
    let tournament = swiss.register_tournament("Spelling contest").await?;

    let mut ids = Vec::new();
    for name in ["A", "B", "C", "D", "E", "F", "G", "H"] {
        let player = swiss.register_player(name).await?;
        swiss.enroll(tournament.id, player.id).await?;
        ids.push(player.id);
    }
    let id = |name: char| ids[(name as u8 - b'A') as usize];

    let rounds = [
        [('A', 'B'), ('C', 'D'), ('E', 'F'), ('G', 'H')],
        [('A', 'C'), ('E', 'G'), ('B', 'D'), ('F', 'H')],
        [('B', 'A'), ('F', 'E'), ('C', 'D'), ('G', 'H')],
    ];

    for (round, results) in rounds.iter().enumerate() {
        for (winner, loser) in results {
            let result = swiss
                .report_match(tournament.id, id(*winner), id(*loser))
                .await?;
            println!(
                "Round {}: {} beat {} (+{} points)",
                round + 1,
                winner,
                loser,
                result.winner_points
            );
        }
        println!();
    }

    print_standings(&swiss.player_standings(tournament.id).await?);

    println!("Next round:");
    for pairing in swiss.swiss_pairings(tournament.id).await? {
        println!("  {} vs {}", pairing.player1_name, pairing.player2_name);
    }

    match swiss.report_winner(tournament.id).await? {
        Some(winner) => println!("\nWinner: {}", winner.name),
        None => println!("\nNo winner yet"),
    }

    Ok(())
}
