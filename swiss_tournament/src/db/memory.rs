//! In-process `TournamentStore`.
//!
//! Keeps every table behind one mutex. Each operation validates first and
//! mutates last while holding the lock, which gives the same all-or-nothing
//! behaviour the PostgreSQL store gets from its transactions. Cascades mirror
//! the foreign keys of the SQL schema.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

use super::repository::TournamentStore;
use crate::swiss::{
    MatchRecord, MatchResult, Player, PlayerId, PlayerTally, SwissError, SwissResult,
    Tournament, TournamentId, scoring, standings,
};

#[derive(Debug, Default)]
struct Tables {
    players: BTreeMap<PlayerId, Player>,
    tournaments: BTreeMap<TournamentId, Tournament>,
    enrollments: BTreeSet<(TournamentId, PlayerId)>,
    matches: Vec<MatchRecord>,
    next_player_id: i64,
    next_tournament_id: i64,
    next_match_id: i64,
}

impl Tables {
    fn require_tournament(&self, tournament_id: TournamentId) -> SwissResult<()> {
        if self.tournaments.contains_key(&tournament_id) {
            Ok(())
        } else {
            Err(SwissError::TournamentNotFound(tournament_id))
        }
    }

    fn require_enrolled(
        &self,
        tournament_id: TournamentId,
        player_id: PlayerId,
    ) -> SwissResult<()> {
        if self.enrollments.contains(&(tournament_id, player_id)) {
            Ok(())
        } else {
            Err(SwissError::NotEnrolled {
                tournament: tournament_id,
                player: player_id,
            })
        }
    }

    fn win_count(&self, tournament_id: TournamentId, player_id: PlayerId) -> i64 {
        self.matches
            .iter()
            .filter(|m| m.tournament_id == tournament_id && m.player_id == player_id && m.won)
            .count() as i64
    }

    fn push_match(
        &mut self,
        tournament_id: TournamentId,
        player_id: PlayerId,
        opponent_id: PlayerId,
        won: bool,
        points: i64,
    ) {
        self.next_match_id += 1;
        self.matches.push(MatchRecord {
            id: self.next_match_id,
            tournament_id,
            player_id,
            opponent_id,
            won,
            points,
        });
    }
}

/// Mutex-guarded in-memory store.
///
/// Cloning shares the underlying tables.
#[derive(Clone, Default)]
pub struct MemoryTournamentStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryTournamentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> SwissResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| SwissError::StorageUnavailable("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl TournamentStore for MemoryTournamentStore {
    async fn create_player(&self, name: &str) -> SwissResult<Player> {
        let mut tables = self.lock()?;
        tables.next_player_id += 1;
        let player = Player {
            id: tables.next_player_id,
            name: name.to_string(),
            created_at: Utc::now(),
        };
        tables.players.insert(player.id, player.clone());
        Ok(player)
    }

    async fn find_player(&self, player_id: PlayerId) -> SwissResult<Option<Player>> {
        Ok(self.lock()?.players.get(&player_id).cloned())
    }

    async fn list_players(&self) -> SwissResult<Vec<Player>> {
        Ok(self.lock()?.players.values().cloned().collect())
    }

    async fn count_all_players(&self) -> SwissResult<i64> {
        Ok(self.lock()?.players.len() as i64)
    }

    async fn delete_all_players(&self) -> SwissResult<u64> {
        let mut tables = self.lock()?;
        let removed = tables.players.len() as u64;
        tables.players.clear();
        tables.enrollments.clear();
        tables.matches.clear();
        Ok(removed)
    }

    async fn create_tournament(&self, name: &str) -> SwissResult<Tournament> {
        let mut tables = self.lock()?;
        tables.next_tournament_id += 1;
        let tournament = Tournament {
            id: tables.next_tournament_id,
            name: name.to_string(),
            created_at: Utc::now(),
        };
        tables.tournaments.insert(tournament.id, tournament.clone());
        Ok(tournament)
    }

    async fn find_tournament(
        &self,
        tournament_id: TournamentId,
    ) -> SwissResult<Option<Tournament>> {
        Ok(self.lock()?.tournaments.get(&tournament_id).cloned())
    }

    async fn list_tournaments(&self) -> SwissResult<Vec<Tournament>> {
        Ok(self.lock()?.tournaments.values().cloned().collect())
    }

    async fn delete_all_tournaments(&self) -> SwissResult<u64> {
        let mut tables = self.lock()?;
        let removed = tables.tournaments.len() as u64;
        tables.tournaments.clear();
        tables.enrollments.clear();
        tables.matches.clear();
        Ok(removed)
    }

    async fn enroll(&self, tournament_id: TournamentId, player_id: PlayerId) -> SwissResult<()> {
        let mut tables = self.lock()?;
        tables.require_tournament(tournament_id)?;
        if !tables.players.contains_key(&player_id) {
            return Err(SwissError::PlayerNotFound(player_id));
        }
        if !tables.enrollments.insert((tournament_id, player_id)) {
            return Err(SwissError::AlreadyEnrolled {
                tournament: tournament_id,
                player: player_id,
            });
        }
        Ok(())
    }

    async fn unenroll_all(&self, tournament_id: TournamentId) -> SwissResult<u64> {
        let mut tables = self.lock()?;
        tables.require_tournament(tournament_id)?;
        let before = tables.enrollments.len();
        tables.enrollments.retain(|(t, _)| *t != tournament_id);
        tables.matches.retain(|m| m.tournament_id != tournament_id);
        Ok((before - tables.enrollments.len()) as u64)
    }

    async fn count_enrolled(&self, tournament_id: TournamentId) -> SwissResult<i64> {
        let tables = self.lock()?;
        tables.require_tournament(tournament_id)?;
        Ok(tables
            .enrollments
            .iter()
            .filter(|(t, _)| *t == tournament_id)
            .count() as i64)
    }

    async fn read_win_count(
        &self,
        tournament_id: TournamentId,
        player_id: PlayerId,
    ) -> SwissResult<i64> {
        let tables = self.lock()?;
        tables.require_tournament(tournament_id)?;
        tables.require_enrolled(tournament_id, player_id)?;
        Ok(tables.win_count(tournament_id, player_id))
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

        let mut tables = self.lock()?;
        tables.require_tournament(tournament_id)?;
        tables.require_enrolled(tournament_id, winner_id)?;
        tables.require_enrolled(tournament_id, loser_id)?;

        let loser_wins_before = tables.win_count(tournament_id, loser_id);
        let winner_points = scoring::winner_points(loser_wins_before);

        tables.push_match(tournament_id, winner_id, loser_id, true, winner_points);
        tables.push_match(
            tournament_id,
            loser_id,
            winner_id,
            false,
            scoring::LOSER_POINTS,
        );

        Ok(MatchResult {
            tournament_id,
            winner_id,
            loser_id,
            loser_wins_before,
            winner_points,
        })
    }

    async fn list_matches(&self, tournament_id: TournamentId) -> SwissResult<Vec<MatchRecord>> {
        Ok(self
            .lock()?
            .matches
            .iter()
            .filter(|m| m.tournament_id == tournament_id)
            .cloned()
            .collect())
    }

    async fn tallies(&self, tournament_id: TournamentId) -> SwissResult<Vec<PlayerTally>> {
        let tables = self.lock()?;
        tables.require_tournament(tournament_id)?;

        let enrolled: Vec<Player> = tables
            .enrollments
            .iter()
            .filter(|(t, _)| *t == tournament_id)
            .filter_map(|(_, p)| tables.players.get(p).cloned())
            .collect();
        let matches: Vec<MatchRecord> = tables
            .matches
            .iter()
            .filter(|m| m.tournament_id == tournament_id)
            .cloned()
            .collect();

        Ok(standings::tally(&enrolled, &matches))
    }

    async fn delete_matches(&self, tournament_id: TournamentId) -> SwissResult<u64> {
        let mut tables = self.lock()?;
        tables.require_tournament(tournament_id)?;
        let before = tables.matches.len();
        tables.matches.retain(|m| m.tournament_id != tournament_id);
        Ok((before - tables.matches.len()) as u64)
    }

    async fn delete_all_matches(&self) -> SwissResult<u64> {
        let mut tables = self.lock()?;
        let removed = tables.matches.len() as u64;
        tables.matches.clear();
        Ok(removed)
    }
}
