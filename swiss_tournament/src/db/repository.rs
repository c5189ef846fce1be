//! Repository trait definitions for testability and dependency injection.
//!
//! [`TournamentStore`] is the storage boundary of the Swiss engine. Every
//! operation that touches more than one statement runs inside one
//! transaction; [`TournamentStore::record_result`] in particular reads the
//! loser's win count and inserts both match rows in a single SERIALIZABLE
//! unit.
#![allow(clippy::needless_raw_string_hashes)]

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};
use std::time::Duration;

use super::timeouts::{DEFAULT_QUERY_TIMEOUT, DEFAULT_TRANSACTION_TIMEOUT, with_timeout};
use super::transaction::{begin_serializable, begin_snapshot};
use crate::swiss::{
    MatchRecord, MatchResult, Player, PlayerId, PlayerTally, SwissError, SwissResult,
    Tournament, TournamentId, scoring,
};

/// Trait for tournament storage operations
#[async_trait]
pub trait TournamentStore: Send + Sync {
    /// Register a new player
    async fn create_player(&self, name: &str) -> SwissResult<Player>;

    /// Find player by ID
    async fn find_player(&self, player_id: PlayerId) -> SwissResult<Option<Player>>;

    /// All players, in registration order
    async fn list_players(&self) -> SwissResult<Vec<Player>>;

    /// Number of registered players
    async fn count_all_players(&self) -> SwissResult<i64>;

    /// Delete every player, cascading to enrollments and matches
    async fn delete_all_players(&self) -> SwissResult<u64>;

    /// Register a new tournament
    async fn create_tournament(&self, name: &str) -> SwissResult<Tournament>;

    /// Find tournament by ID
    async fn find_tournament(&self, tournament_id: TournamentId)
    -> SwissResult<Option<Tournament>>;

    /// All tournaments, in creation order
    async fn list_tournaments(&self) -> SwissResult<Vec<Tournament>>;

    /// Delete every tournament, cascading to enrollments and matches
    async fn delete_all_tournaments(&self) -> SwissResult<u64>;

    /// Enroll a player into a tournament
    async fn enroll(&self, tournament_id: TournamentId, player_id: PlayerId) -> SwissResult<()>;

    /// Remove every enrollment of a tournament, cascading to its matches.
    /// Fails with `TournamentNotFound` for an unknown tournament.
    async fn unenroll_all(&self, tournament_id: TournamentId) -> SwissResult<u64>;

    /// Number of players enrolled in a tournament
    async fn count_enrolled(&self, tournament_id: TournamentId) -> SwissResult<i64>;

    /// Current win count of an enrolled player
    async fn read_win_count(
        &self,
        tournament_id: TournamentId,
        player_id: PlayerId,
    ) -> SwissResult<i64>;

    /// Atomically record a result as a winner row and a loser row.
    ///
    /// The loser's win count is read inside the same transaction as the
    /// inserts and fed to [`scoring::winner_points`].
    async fn record_result(
        &self,
        tournament_id: TournamentId,
        winner_id: PlayerId,
        loser_id: PlayerId,
    ) -> SwissResult<MatchResult>;

    /// Raw match rows of a tournament
    async fn list_matches(&self, tournament_id: TournamentId) -> SwissResult<Vec<MatchRecord>>;

    /// Unordered per-player aggregates for every enrolled player
    async fn tallies(&self, tournament_id: TournamentId) -> SwissResult<Vec<PlayerTally>>;

    /// Delete one tournament's match rows. Fails with `TournamentNotFound`
    /// for an unknown tournament.
    async fn delete_matches(&self, tournament_id: TournamentId) -> SwissResult<u64>;

    /// Delete every match row
    async fn delete_all_matches(&self) -> SwissResult<u64>;
}

/// Default PostgreSQL implementation of `TournamentStore`
#[derive(Clone)]
pub struct PgTournamentStore {
    pool: PgPool,
    query_timeout: Duration,
    transaction_timeout: Duration,
}

impl PgTournamentStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            transaction_timeout: DEFAULT_TRANSACTION_TIMEOUT,
        }
    }

    /// Override the default query and transaction timeouts
    pub fn with_timeouts(mut self, query: Duration, transaction: Duration) -> Self {
        self.query_timeout = query;
        self.transaction_timeout = transaction;
        self
    }
}

fn player_from_row(row: &PgRow) -> Player {
    Player {
        id: row.get("id"),
        name: row.get("name"),
        created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
    }
}

fn tournament_from_row(row: &PgRow) -> Tournament {
    Tournament {
        id: row.get("id"),
        name: row.get("name"),
        created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
    }
}

async fn tournament_exists(
    tx: &mut Transaction<'_, Postgres>,
    tournament_id: TournamentId,
) -> Result<bool, sqlx::Error> {
    let row = sqlx::query("SELECT 1 FROM tournaments WHERE id = $1")
        .bind(tournament_id)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(row.is_some())
}

async fn player_exists(
    tx: &mut Transaction<'_, Postgres>,
    player_id: PlayerId,
) -> Result<bool, sqlx::Error> {
    let row = sqlx::query("SELECT 1 FROM players WHERE id = $1")
        .bind(player_id)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(row.is_some())
}

async fn is_enrolled(
    tx: &mut Transaction<'_, Postgres>,
    tournament_id: TournamentId,
    player_id: PlayerId,
) -> Result<bool, sqlx::Error> {
    let row = sqlx::query("SELECT 1 FROM enrollments WHERE tournament_id = $1 AND player_id = $2")
        .bind(tournament_id)
        .bind(player_id)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(row.is_some())
}

/// Fail unless the player is enrolled in the tournament
async fn require_enrolled(
    tx: &mut Transaction<'_, Postgres>,
    tournament_id: TournamentId,
    player_id: PlayerId,
) -> SwissResult<()> {
    if !is_enrolled(tx, tournament_id, player_id).await? {
        return Err(SwissError::NotEnrolled {
            tournament: tournament_id,
            player: player_id,
        });
    }
    Ok(())
}

async fn require_tournament(
    tx: &mut Transaction<'_, Postgres>,
    tournament_id: TournamentId,
) -> SwissResult<()> {
    if !tournament_exists(tx, tournament_id).await? {
        return Err(SwissError::TournamentNotFound(tournament_id));
    }
    Ok(())
}

async fn win_count(
    tx: &mut Transaction<'_, Postgres>,
    tournament_id: TournamentId,
    player_id: PlayerId,
) -> Result<i64, sqlx::Error> {
    let row = sqlx::query(
        "SELECT COUNT(*) AS wins FROM matches WHERE tournament_id = $1 AND player_id = $2 AND won",
    )
    .bind(tournament_id)
    .bind(player_id)
    .fetch_one(&mut **tx)
    .await?;
    Ok(row.get("wins"))
}

/// Insert one directed match row. Only ever called in pairs from
/// `record_result`.
async fn insert_match(
    tx: &mut Transaction<'_, Postgres>,
    tournament_id: TournamentId,
    player_id: PlayerId,
    opponent_id: PlayerId,
    won: bool,
    points: i64,
) -> Result<i64, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO matches (tournament_id, player_id, opponent_id, won, points)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(tournament_id)
    .bind(player_id)
    .bind(opponent_id)
    .bind(won)
    .bind(points)
    .fetch_one(&mut **tx)
    .await?;
    Ok(row.get("id"))
}

#[async_trait]
impl TournamentStore for PgTournamentStore {
    async fn create_player(&self, name: &str) -> SwissResult<Player> {
        let row = with_timeout(
            self.query_timeout,
            sqlx::query("INSERT INTO players (name) VALUES ($1) RETURNING id, name, created_at")
                .bind(name)
                .fetch_one(&self.pool),
        )
        .await?;
        Ok(player_from_row(&row))
    }

    async fn find_player(&self, player_id: PlayerId) -> SwissResult<Option<Player>> {
        let row = with_timeout(
            self.query_timeout,
            sqlx::query("SELECT id, name, created_at FROM players WHERE id = $1")
                .bind(player_id)
                .fetch_optional(&self.pool),
        )
        .await?;
        Ok(row.as_ref().map(player_from_row))
    }

    async fn list_players(&self) -> SwissResult<Vec<Player>> {
        let rows = with_timeout(
            self.query_timeout,
            sqlx::query("SELECT id, name, created_at FROM players ORDER BY id")
                .fetch_all(&self.pool),
        )
        .await?;
        Ok(rows.iter().map(player_from_row).collect())
    }

    async fn count_all_players(&self) -> SwissResult<i64> {
        let row = with_timeout(
            self.query_timeout,
            sqlx::query("SELECT COUNT(*) AS count FROM players").fetch_one(&self.pool),
        )
        .await?;
        Ok(row.get("count"))
    }

    async fn delete_all_players(&self) -> SwissResult<u64> {
        let result = with_timeout(
            self.query_timeout,
            sqlx::query("DELETE FROM players").execute(&self.pool),
        )
        .await?;
        Ok(result.rows_affected())
    }

    async fn create_tournament(&self, name: &str) -> SwissResult<Tournament> {
        let row = with_timeout(
            self.query_timeout,
            sqlx::query("INSERT INTO tournaments (name) VALUES ($1) RETURNING id, name, created_at")
                .bind(name)
                .fetch_one(&self.pool),
        )
        .await?;
        Ok(tournament_from_row(&row))
    }

    async fn find_tournament(
        &self,
        tournament_id: TournamentId,
    ) -> SwissResult<Option<Tournament>> {
        let row = with_timeout(
            self.query_timeout,
            sqlx::query("SELECT id, name, created_at FROM tournaments WHERE id = $1")
                .bind(tournament_id)
                .fetch_optional(&self.pool),
        )
        .await?;
        Ok(row.as_ref().map(tournament_from_row))
    }

    async fn list_tournaments(&self) -> SwissResult<Vec<Tournament>> {
        let rows = with_timeout(
            self.query_timeout,
            sqlx::query("SELECT id, name, created_at FROM tournaments ORDER BY id")
                .fetch_all(&self.pool),
        )
        .await?;
        Ok(rows.iter().map(tournament_from_row).collect())
    }

    async fn delete_all_tournaments(&self) -> SwissResult<u64> {
        let result = with_timeout(
            self.query_timeout,
            sqlx::query("DELETE FROM tournaments").execute(&self.pool),
        )
        .await?;
        Ok(result.rows_affected())
    }

    async fn enroll(&self, tournament_id: TournamentId, player_id: PlayerId) -> SwissResult<()> {
        with_timeout(self.transaction_timeout, async {
            let mut tx = begin_serializable(&self.pool).await?;

            require_tournament(&mut tx, tournament_id).await?;
            if !player_exists(&mut tx, player_id).await? {
                return Err(SwissError::PlayerNotFound(player_id));
            }
            if is_enrolled(&mut tx, tournament_id, player_id).await? {
                return Err(SwissError::AlreadyEnrolled {
                    tournament: tournament_id,
                    player: player_id,
                });
            }

            sqlx::query("INSERT INTO enrollments (tournament_id, player_id) VALUES ($1, $2)")
                .bind(tournament_id)
                .bind(player_id)
                .execute(&mut *tx)
                .await?;

            tx.commit().await?;
            Ok::<_, SwissError>(())
        })
        .await
    }

    async fn unenroll_all(&self, tournament_id: TournamentId) -> SwissResult<u64> {
        with_timeout(self.transaction_timeout, async {
            let mut tx = begin_serializable(&self.pool).await?;
            require_tournament(&mut tx, tournament_id).await?;

            let result = sqlx::query("DELETE FROM enrollments WHERE tournament_id = $1")
                .bind(tournament_id)
                .execute(&mut *tx)
                .await?;

            tx.commit().await?;
            Ok::<_, SwissError>(result.rows_affected())
        })
        .await
    }

    async fn count_enrolled(&self, tournament_id: TournamentId) -> SwissResult<i64> {
        with_timeout(self.transaction_timeout, async {
            let mut tx = begin_snapshot(&self.pool).await?;
            require_tournament(&mut tx, tournament_id).await?;

            let row =
                sqlx::query("SELECT COUNT(*) AS count FROM enrollments WHERE tournament_id = $1")
                    .bind(tournament_id)
                    .fetch_one(&mut *tx)
                    .await?;

            let count: i64 = row.get("count");

            tx.commit().await?;
            Ok::<_, SwissError>(count)
        })
        .await
    }

    async fn read_win_count(
        &self,
        tournament_id: TournamentId,
        player_id: PlayerId,
    ) -> SwissResult<i64> {
        with_timeout(self.transaction_timeout, async {
            let mut tx = begin_snapshot(&self.pool).await?;
            require_tournament(&mut tx, tournament_id).await?;
            require_enrolled(&mut tx, tournament_id, player_id).await?;
            let wins = win_count(&mut tx, tournament_id, player_id).await?;
            tx.commit().await?;
            Ok::<_, SwissError>(wins)
        })
        .await
    }

    async fn record_result(
        &self,
        tournament_id: TournamentId,
        winner_id: PlayerId,
        loser_id: PlayerId,
    ) -> SwissResult<MatchResult> {
        if winner_id == loser_id {
            return Err(SwissError::SelfMatch(winner_id));
        }

        with_timeout(self.transaction_timeout, async {
            let mut tx = begin_serializable(&self.pool).await?;

            require_tournament(&mut tx, tournament_id).await?;
            require_enrolled(&mut tx, tournament_id, winner_id).await?;
            require_enrolled(&mut tx, tournament_id, loser_id).await?;

            let loser_wins_before = win_count(&mut tx, tournament_id, loser_id).await?;
            let winner_points = scoring::winner_points(loser_wins_before);

            insert_match(&mut tx, tournament_id, winner_id, loser_id, true, winner_points)
                .await?;
            insert_match(
                &mut tx,
                tournament_id,
                loser_id,
                winner_id,
                false,
                scoring::LOSER_POINTS,
            )
            .await?;

            tx.commit().await?;

            Ok::<_, SwissError>(MatchResult {
                tournament_id,
                winner_id,
                loser_id,
                loser_wins_before,
                winner_points,
            })
        })
        .await
    }

    async fn list_matches(&self, tournament_id: TournamentId) -> SwissResult<Vec<MatchRecord>> {
        let rows = with_timeout(
            self.query_timeout,
            sqlx::query(
                r#"
                SELECT id, tournament_id, player_id, opponent_id, won, points
                FROM matches
                WHERE tournament_id = $1
                ORDER BY id
                "#,
            )
            .bind(tournament_id)
            .fetch_all(&self.pool),
        )
        .await?;

        Ok(rows
            .iter()
            .map(|r| MatchRecord {
                id: r.get("id"),
                tournament_id: r.get("tournament_id"),
                player_id: r.get("player_id"),
                opponent_id: r.get("opponent_id"),
                won: r.get("won"),
                points: r.get("points"),
            })
            .collect())
    }

    async fn tallies(&self, tournament_id: TournamentId) -> SwissResult<Vec<PlayerTally>> {
        with_timeout(self.transaction_timeout, async {
            let mut tx = begin_snapshot(&self.pool).await?;
            require_tournament(&mut tx, tournament_id).await?;

            let rows = sqlx::query(
                r#"
                SELECT p.id AS player_id,
                       p.name,
                       COUNT(m.id) FILTER (WHERE m.won) AS wins,
                       COUNT(m.id) AS matches,
                       COALESCE(SUM(m.points), 0)::BIGINT AS points
                FROM enrollments e
                JOIN players p ON p.id = e.player_id
                LEFT JOIN matches m
                       ON m.tournament_id = e.tournament_id
                      AND m.player_id = e.player_id
                WHERE e.tournament_id = $1
                GROUP BY p.id, p.name
                "#,
            )
            .bind(tournament_id)
            .fetch_all(&mut *tx)
            .await?;

            tx.commit().await?;

            Ok::<_, SwissError>(
                rows.iter()
                    .map(|r| PlayerTally {
                        player_id: r.get("player_id"),
                        name: r.get("name"),
                        wins: r.get("wins"),
                        matches: r.get("matches"),
                        points: r.get("points"),
                    })
                    .collect(),
            )
        })
        .await
    }

    async fn delete_matches(&self, tournament_id: TournamentId) -> SwissResult<u64> {
        with_timeout(self.transaction_timeout, async {
            let mut tx = begin_serializable(&self.pool).await?;
            require_tournament(&mut tx, tournament_id).await?;

            let result = sqlx::query("DELETE FROM matches WHERE tournament_id = $1")
                .bind(tournament_id)
                .execute(&mut *tx)
                .await?;

            tx.commit().await?;
            Ok::<_, SwissError>(result.rows_affected())
        })
        .await
    }

    async fn delete_all_matches(&self) -> SwissResult<u64> {
        let result = with_timeout(
            self.query_timeout,
            sqlx::query("DELETE FROM matches").execute(&self.pool),
        )
        .await?;
        Ok(result.rows_affected())
    }
}
