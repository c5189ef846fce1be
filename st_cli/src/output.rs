//! Rendering of command results as plain tables or JSON.

use serde::Serialize;
use serde_json::json;
use std::fmt::Write;
use swiss_tournament::{MatchResult, Pairing, Player, Standing, Tournament};

/// Output format selected with `--json`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Table,
    Json,
}

type RenderResult = Result<String, serde_json::Error>;

fn to_json<T: Serialize + ?Sized>(value: &T) -> RenderResult {
    serde_json::to_string_pretty(value)
}

pub fn message(text: &str, format: Format) -> RenderResult {
    match format {
        Format::Table => Ok(text.to_string()),
        Format::Json => to_json(&json!({ "message": text })),
    }
}

pub fn player(player: &Player, format: Format) -> RenderResult {
    match format {
        Format::Table => Ok(format!("Registered player {} ({})", player.id, player.name)),
        Format::Json => to_json(player),
    }
}

pub fn players(players: &[Player], format: Format) -> RenderResult {
    if format == Format::Json {
        return to_json(players);
    }
    if players.is_empty() {
        return Ok("No players registered".to_string());
    }
    let mut out = format!("{:>6}  {}", "ID", "NAME");
    for p in players {
        let _ = write!(out, "\n{:>6}  {}", p.id, p.name);
    }
    Ok(out)
}

pub fn tournament(tournament: &Tournament, format: Format) -> RenderResult {
    match format {
        Format::Table => Ok(format!(
            "Registered tournament {} ({})",
            tournament.id, tournament.name
        )),
        Format::Json => to_json(tournament),
    }
}

pub fn tournaments(tournaments: &[Tournament], format: Format) -> RenderResult {
    if format == Format::Json {
        return to_json(tournaments);
    }
    if tournaments.is_empty() {
        return Ok("No tournaments registered".to_string());
    }
    let mut out = format!("{:>6}  {}", "ID", "NAME");
    for t in tournaments {
        let _ = write!(out, "\n{:>6}  {}", t.id, t.name);
    }
    Ok(out)
}

pub fn match_result(result: &MatchResult, format: Format) -> RenderResult {
    match format {
        Format::Table => Ok(format!(
            "Recorded: {} beat {} for {} point(s)",
            result.winner_id, result.loser_id, result.winner_points
        )),
        Format::Json => to_json(result),
    }
}

pub fn standings(standings: &[Standing], format: Format) -> RenderResult {
    if format == Format::Json {
        return to_json(standings);
    }
    if standings.is_empty() {
        return Ok("No players enrolled".to_string());
    }
    let mut out = format!(
        "{:>4}  {:>6}  {:<24}  {:>4}  {:>7}  {:>6}",
        "RANK", "ID", "NAME", "WINS", "MATCHES", "POINTS"
    );
    for (i, s) in standings.iter().enumerate() {
        let _ = write!(
            out,
            "\n{:>4}  {:>6}  {:<24}  {:>4}  {:>7}  {:>6}",
            i + 1,
            s.player_id,
            s.name,
            s.wins,
            s.matches,
            s.points
        );
    }
    Ok(out)
}

pub fn pairings(pairings: &[Pairing], format: Format) -> RenderResult {
    if format == Format::Json {
        return to_json(pairings);
    }
    if pairings.is_empty() {
        return Ok("No pairings".to_string());
    }
    let mut out = String::new();
    for (table, p) in pairings.iter().enumerate() {
        if table > 0 {
            out.push('\n');
        }
        let _ = write!(
            out,
            "Table {}: {} ({}) vs {} ({})",
            table + 1,
            p.player1_name,
            p.player1_id,
            p.player2_name,
            p.player2_id
        );
    }
    Ok(out)
}

pub fn winner(winner: Option<&Standing>, format: Format) -> RenderResult {
    match (format, winner) {
        (Format::Json, _) => to_json(&json!({ "winner": winner })),
        (Format::Table, Some(s)) => Ok(format!(
            "Winner: {} ({}) with {} win(s) and {} point(s)",
            s.name, s.player_id, s.wins, s.points
        )),
        (Format::Table, None) => Ok("No winner yet".to_string()),
    }
}
