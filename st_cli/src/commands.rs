//! Command parsing and execution.

use crate::output::{self, Format};
use swiss_tournament::{PlayerId, SwissManager, TournamentId};
use thiserror::Error;

/// Errors that can occur during command parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// No command given.
    #[error("No command given. Run with --help to see available commands")]
    MissingCommand,
    /// Command is missing a required argument.
    #[error("'{command}' requires {what} (e.g., '{example}')")]
    MissingArgument {
        command: &'static str,
        what: &'static str,
        example: &'static str,
    },
    /// Argument is not a valid id.
    #[error("Invalid id '{0}'. Ids are positive integers")]
    InvalidId(String),
    /// Too many arguments for the command.
    #[error("Unexpected argument '{0}'")]
    UnexpectedArgument(String),
    /// Unrecognized command.
    #[error("Unrecognized command '{0}'. Run with --help to see available commands")]
    UnrecognizedCommand(String),
}

/// A parsed CLI command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Migrate,
    AddPlayer { name: String },
    Players,
    AddTournament { name: String },
    Tournaments,
    Enroll {
        tournament: TournamentId,
        player: PlayerId,
    },
    EnrollAll {
        tournament: TournamentId,
    },
    Withdraw {
        tournament: TournamentId,
    },
    Report {
        tournament: TournamentId,
        winner: PlayerId,
        loser: PlayerId,
    },
    Standings {
        tournament: TournamentId,
    },
    Pairings {
        tournament: TournamentId,
    },
    Winner {
        tournament: TournamentId,
    },
    ClearMatches {
        tournament: Option<TournamentId>,
    },
    Reset,
}

impl Command {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Command::Migrate => "migrate",
            Command::AddPlayer { .. } => "add-player",
            Command::Players => "players",
            Command::AddTournament { .. } => "add-tournament",
            Command::Tournaments => "tournaments",
            Command::Enroll { .. } => "enroll",
            Command::EnrollAll { .. } => "enroll-all",
            Command::Withdraw { .. } => "withdraw",
            Command::Report { .. } => "report",
            Command::Standings { .. } => "standings",
            Command::Pairings { .. } => "pairings",
            Command::Winner { .. } => "winner",
            Command::ClearMatches { .. } => "clear-matches",
            Command::Reset => "reset",
        }
    }
}

struct ArgCursor<'a> {
    command: &'static str,
    args: std::slice::Iter<'a, String>,
}

impl ArgCursor<'_> {
    fn id(&mut self, what: &'static str, example: &'static str) -> Result<i64, ParseError> {
        let raw = self.args.next().ok_or(ParseError::MissingArgument {
            command: self.command,
            what,
            example,
        })?;
        parse_id(raw)
    }

    fn opt_id(&mut self) -> Result<Option<i64>, ParseError> {
        self.args.next().map(|raw| parse_id(raw)).transpose()
    }

    /// Remaining words joined into one name
    fn name(&mut self, example: &'static str) -> Result<String, ParseError> {
        let words: Vec<&str> = self.args.by_ref().map(String::as_str).collect();
        if words.is_empty() {
            return Err(ParseError::MissingArgument {
                command: self.command,
                what: "a name",
                example,
            });
        }
        Ok(words.join(" "))
    }

    fn finish(mut self) -> Result<(), ParseError> {
        match self.args.next() {
            Some(extra) => Err(ParseError::UnexpectedArgument(extra.clone())),
            None => Ok(()),
        }
    }
}

fn parse_id(raw: &str) -> Result<i64, ParseError> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ParseError::InvalidId(raw.to_string())),
    }
}

/// Parse free command-line arguments into a command.
///
/// # Examples
///
/// ```
/// use st_cli::commands::{parse_command, Command};
///
/// let args: Vec<String> = ["report", "1", "4", "7"].iter().map(|s| s.to_string()).collect();
/// assert_eq!(
///     parse_command(&args),
///     Ok(Command::Report { tournament: 1, winner: 4, loser: 7 })
/// );
/// ```
pub fn parse_command(args: &[String]) -> Result<Command, ParseError> {
    let (first, rest) = args.split_first().ok_or(ParseError::MissingCommand)?;

    let command = match first.as_str() {
        "migrate" => Command::Migrate,
        "add-player" => {
            let mut cur = cursor("add-player", rest);
            return Ok(Command::AddPlayer {
                name: cur.name("add-player Chandra Nalaar")?,
            });
        }
        "players" => Command::Players,
        "add-tournament" => {
            let mut cur = cursor("add-tournament", rest);
            return Ok(Command::AddTournament {
                name: cur.name("add-tournament Spring Open")?,
            });
        }
        "tournaments" => Command::Tournaments,
        "enroll" => {
            let mut cur = cursor("enroll", rest);
            let tournament = cur.id("a tournament id", "enroll 1 4")?;
            let player = cur.id("a player id", "enroll 1 4")?;
            cur.finish()?;
            return Ok(Command::Enroll { tournament, player });
        }
        "enroll-all" => single_id("enroll-all", "enroll-all 1", rest, |tournament| {
            Command::EnrollAll { tournament }
        })?,
        "withdraw" => single_id("withdraw", "withdraw 1", rest, |tournament| {
            Command::Withdraw { tournament }
        })?,
        "report" => {
            let mut cur = cursor("report", rest);
            let tournament = cur.id("a tournament id", "report 1 4 7")?;
            let winner = cur.id("a winner id", "report 1 4 7")?;
            let loser = cur.id("a loser id", "report 1 4 7")?;
            cur.finish()?;
            return Ok(Command::Report {
                tournament,
                winner,
                loser,
            });
        }
        "standings" => single_id("standings", "standings 1", rest, |tournament| {
            Command::Standings { tournament }
        })?,
        "pairings" => single_id("pairings", "pairings 1", rest, |tournament| {
            Command::Pairings { tournament }
        })?,
        "winner" => single_id("winner", "winner 1", rest, |tournament| {
            Command::Winner { tournament }
        })?,
        "clear-matches" => {
            let mut cur = cursor("clear-matches", rest);
            let tournament = cur.opt_id()?;
            cur.finish()?;
            return Ok(Command::ClearMatches { tournament });
        }
        "reset" => Command::Reset,
        other => return Err(ParseError::UnrecognizedCommand(other.to_string())),
    };

    if matches!(
        command,
        Command::Migrate | Command::Players | Command::Tournaments | Command::Reset
    ) {
        cursor(command.name(), rest).finish()?;
    }

    Ok(command)
}

fn cursor<'a>(command: &'static str, rest: &'a [String]) -> ArgCursor<'a> {
    ArgCursor {
        command,
        args: rest.iter(),
    }
}

fn single_id(
    command: &'static str,
    example: &'static str,
    rest: &[String],
    build: impl FnOnce(TournamentId) -> Command,
) -> Result<Command, ParseError> {
    let mut cur = cursor(command, rest);
    let id = cur.id("a tournament id", example)?;
    cur.finish()?;
    Ok(build(id))
}

/// Execute a command against the manager and render its output.
///
/// `Command::Migrate` needs a database handle and is handled by the caller.
pub async fn execute(
    command: &Command,
    swiss: &SwissManager,
    format: Format,
) -> anyhow::Result<String> {
    let rendered = match command {
        Command::Migrate => anyhow::bail!("migrate needs a PostgreSQL connection"),
        Command::AddPlayer { name } => {
            output::player(&swiss.register_player(name).await?, format)?
        }
        Command::Players => output::players(&swiss.list_players().await?, format)?,
        Command::AddTournament { name } => {
            output::tournament(&swiss.register_tournament(name).await?, format)?
        }
        Command::Tournaments => {
            output::tournaments(&swiss.list_tournaments().await?, format)?
        }
        Command::Enroll { tournament, player } => {
            swiss.enroll(*tournament, *player).await?;
            let entrant = swiss.find_player(*player).await?;
            let event = swiss.find_tournament(*tournament).await?;
            output::message(
                &format!(
                    "Enrolled {} ({}) into {} ({})",
                    entrant.name, entrant.id, event.name, event.id
                ),
                format,
            )?
        }
        Command::EnrollAll { tournament } => {
            let added = swiss.enroll_all(*tournament).await?;
            output::message(
                &format!("Enrolled {added} player(s) into tournament {tournament}"),
                format,
            )?
        }
        Command::Withdraw { tournament } => {
            let removed = swiss.withdraw_players(*tournament).await?;
            output::message(
                &format!("Withdrew {removed} player(s) from tournament {tournament}"),
                format,
            )?
        }
        Command::Report {
            tournament,
            winner,
            loser,
        } => {
            let result = swiss.report_match(*tournament, *winner, *loser).await?;
            output::match_result(&result, format)?
        }
        Command::Standings { tournament } => {
            output::standings(&swiss.player_standings(*tournament).await?, format)?
        }
        Command::Pairings { tournament } => {
            output::pairings(&swiss.swiss_pairings(*tournament).await?, format)?
        }
        Command::Winner { tournament } => {
            output::winner(swiss.report_winner(*tournament).await?.as_ref(), format)?
        }
        Command::ClearMatches { tournament } => {
            let removed = match tournament {
                Some(id) => swiss.delete_matches(*id).await?,
                None => swiss.delete_all_matches().await?,
            };
            output::message(&format!("Deleted {removed} match row(s)"), format)?
        }
        Command::Reset => {
            let matches = swiss.delete_all_matches().await?;
            let tournaments = swiss.delete_tournaments().await?;
            let players = swiss.delete_all_players().await?;
            output::message(
                &format!(
                    "Deleted {matches} match row(s), {tournaments} tournament(s), \
                     {players} player(s)"
                ),
                format,
            )?
        }
    };

    Ok(rendered)
}
