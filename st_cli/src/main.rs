//! Swiss-system tournament command-line harness.
//!
//! Runs one command per invocation against a PostgreSQL-backed
//! tournament store.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Error};
use log::info;
use pico_args::Arguments;
use st_cli::{CliConfig, Command, Format, commands, logging};
use swiss_tournament::{Database, SwissError, SwissManager};

const HELP: &str = "\
Run Swiss-system tournaments: register players, report matches, pair rounds

USAGE:
  st_cli [OPTIONS] COMMAND [ARGS]

COMMANDS:
  migrate                      Apply database migrations
  add-player NAME...           Register a player
  players                      List registered players
  add-tournament NAME...       Register a tournament
  tournaments                  List tournaments
  enroll T P                   Enroll player P into tournament T
  enroll-all T                 Enroll every registered player into T
  withdraw T                   Remove every player from T (and their matches)
  report T WINNER LOSER        Record a match result in T
  standings T                  Show ranked standings for T
  pairings T                   Show next-round pairings for T
  winner T                     Show the winner of T, if decided
  clear-matches [T]            Delete the matches of T, or of every tournament
  reset                        Delete all matches, tournaments and players

OPTIONS:
  --db-url     URL             Database connection string  [default: env DATABASE_URL or postgres://postgres@localhost/tournament]

FLAGS:
  --json                       Print results as JSON
  -h, --help                   Print help information

ENVIRONMENT:
  DATABASE_URL                 PostgreSQL connection string
  DB_MAX_CONNECTIONS           Maximum pool size
  DB_QUERY_TIMEOUT_SECS        Per-statement timeout
  DB_TRANSACTION_TIMEOUT_SECS  Whole-transaction timeout
  RUST_LOG                     Log filter (logs go to stderr)
";

struct Args {
    database_url: Option<String>,
    format: Format,
    command: Command,
}

fn parse_args() -> Result<Args, Error> {
    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let format = if pargs.contains("--json") {
        Format::Json
    } else {
        Format::Table
    };
    let database_url: Option<String> = pargs.opt_value_from_str("--db-url")?;

    let free = pargs
        .finish()
        .into_iter()
        .map(|arg| {
            arg.into_string()
                .map_err(|raw| anyhow::anyhow!("Argument is not valid UTF-8: {raw:?}"))
        })
        .collect::<Result<Vec<String>, Error>>()?;

    let command = commands::parse_command(&free)?;

    Ok(Args {
        database_url,
        format,
        command,
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let args = parse_args()?;

    logging::init();

    let config = CliConfig::from_env(args.database_url)?;
    config.validate()?;

    let db = Database::new(&config.database)
        .await
        .context("Failed to connect to database")?;
    info!("Database connected");

    let started = Instant::now();

    if args.command == Command::Migrate {
        let outcome = db.migrate().await;
        logging::log_command(args.command.name(), started.elapsed(), outcome.is_ok());
        db.close().await;
        outcome?;
        println!("Migrations applied");
        return Ok(());
    }

    let store = db
        .store()
        .with_timeouts(config.query_timeout(), config.transaction_timeout());
    let swiss = SwissManager::new(Arc::new(store));

    let outcome = commands::execute(&args.command, &swiss, args.format).await;
    logging::log_command(args.command.name(), started.elapsed(), outcome.is_ok());
    db.close().await;

    match outcome {
        Ok(rendered) => {
            println!("{rendered}");
            Ok(())
        }
        Err(err) => match err.downcast_ref::<SwissError>() {
            Some(swiss_err) => {
                eprintln!("error: {}", swiss_err.client_message());
                if swiss_err.is_retryable() {
                    eprintln!("hint: this failure is transient, try again");
                }
                std::process::exit(1);
            }
            None => Err(err),
        },
    }
}
