//! Swiss manager: the operations callers use, over an injected store.

use super::{
    errors::{SwissError, SwissResult},
    models::{MatchResult, Pairing, Player, PlayerId, Standing, Tournament, TournamentId},
    pairing, standings,
};
use crate::db::TournamentStore;
use std::sync::Arc;

/// Swiss tournament manager
#[derive(Clone)]
pub struct SwissManager {
    store: Arc<dyn TournamentStore>,
}

impl SwissManager {
    /// Create a new Swiss manager over the given store
    pub fn new(store: Arc<dyn TournamentStore>) -> Self {
        Self { store }
    }

    /// Underlying store
    pub fn store(&self) -> &Arc<dyn TournamentStore> {
        &self.store
    }

    /// Register a new player
    ///
    /// # Errors
    ///
    /// * `SwissError::EmptyName` - Name is empty or only whitespace
    pub async fn register_player(&self, name: &str) -> SwissResult<Player> {
        let name = validated_name(name)?;
        let player = self.store.create_player(name).await?;
        log::info!("Registered player {} '{}'", player.id, player.name);
        Ok(player)
    }

    /// Look up a registered player
    ///
    /// # Errors
    ///
    /// * `SwissError::PlayerNotFound` - No player has this id
    pub async fn find_player(&self, player_id: PlayerId) -> SwissResult<Player> {
        self.store
            .find_player(player_id)
            .await?
            .ok_or(SwissError::PlayerNotFound(player_id))
    }

    /// All registered players
    pub async fn list_players(&self) -> SwissResult<Vec<Player>> {
        self.store.list_players().await
    }

    /// Number of registered players
    pub async fn count_all_players(&self) -> SwissResult<i64> {
        self.store.count_all_players().await
    }

    /// Delete every player along with their enrollments and matches
    pub async fn delete_all_players(&self) -> SwissResult<u64> {
        let removed = self.store.delete_all_players().await?;
        log::info!("Deleted {} player(s)", removed);
        Ok(removed)
    }

    /// Register a new tournament
    ///
    /// # Errors
    ///
    /// * `SwissError::EmptyName` - Name is empty or only whitespace
    pub async fn register_tournament(&self, name: &str) -> SwissResult<Tournament> {
        let name = validated_name(name)?;
        let tournament = self.store.create_tournament(name).await?;
        log::info!(
            "Registered tournament {} '{}'",
            tournament.id,
            tournament.name
        );
        Ok(tournament)
    }

    /// Look up a tournament
    ///
    /// # Errors
    ///
    /// * `SwissError::TournamentNotFound` - No tournament has this id
    pub async fn find_tournament(&self, tournament_id: TournamentId) -> SwissResult<Tournament> {
        self.store
            .find_tournament(tournament_id)
            .await?
            .ok_or(SwissError::TournamentNotFound(tournament_id))
    }

    /// All tournaments
    pub async fn list_tournaments(&self) -> SwissResult<Vec<Tournament>> {
        self.store.list_tournaments().await
    }

    /// Delete every tournament along with its enrollments and matches
    pub async fn delete_tournaments(&self) -> SwissResult<u64> {
        let removed = self.store.delete_all_tournaments().await?;
        log::info!("Deleted {} tournament(s)", removed);
        Ok(removed)
    }

    /// Enroll a registered player into a tournament
    ///
    /// # Errors
    ///
    /// * `SwissError::TournamentNotFound` / `SwissError::PlayerNotFound`
    /// * `SwissError::AlreadyEnrolled` - Player is already in the tournament
    pub async fn enroll(
        &self,
        tournament_id: TournamentId,
        player_id: PlayerId,
    ) -> SwissResult<()> {
        self.store.enroll(tournament_id, player_id).await?;
        log::info!(
            "Enrolled player {} into tournament {}",
            player_id,
            tournament_id
        );
        Ok(())
    }

    /// Enroll every registered player not yet in the tournament.
    ///
    /// Returns the number of new enrollments.
    pub async fn enroll_all(&self, tournament_id: TournamentId) -> SwissResult<usize> {
        let enrolled: Vec<PlayerId> = self
            .store
            .tallies(tournament_id)
            .await?
            .into_iter()
            .map(|t| t.player_id)
            .collect();

        let mut added = 0;
        for player in self.store.list_players().await? {
            if enrolled.contains(&player.id) {
                continue;
            }
            self.store.enroll(tournament_id, player.id).await?;
            added += 1;
        }

        log::info!(
            "Enrolled {} player(s) into tournament {}",
            added,
            tournament_id
        );
        Ok(added)
    }

    /// Number of players enrolled in a tournament
    pub async fn count_players(&self, tournament_id: TournamentId) -> SwissResult<i64> {
        self.store.count_enrolled(tournament_id).await
    }

    /// Remove every player from a tournament, along with its matches.
    ///
    /// Players stay registered and keep their other enrollments.
    ///
    /// # Errors
    ///
    /// * `SwissError::TournamentNotFound` - Tournament does not exist
    pub async fn withdraw_players(&self, tournament_id: TournamentId) -> SwissResult<u64> {
        let removed = self.store.unenroll_all(tournament_id).await?;
        log::info!(
            "Withdrew {} player(s) from tournament {}",
            removed,
            tournament_id
        );
        Ok(removed)
    }

    /// Ranked standings of every enrolled player.
    ///
    /// Ordered by wins, then tie-break points, then player id. Players who
    /// have not played yet appear with zero wins and zero matches.
    ///
    /// # Errors
    ///
    /// * `SwissError::TournamentNotFound` - Tournament does not exist
    pub async fn player_standings(
        &self,
        tournament_id: TournamentId,
    ) -> SwissResult<Vec<Standing>> {
        let tallies = self.store.tallies(tournament_id).await?;
        log::debug!(
            "Computed standings for tournament {} ({} players)",
            tournament_id,
            tallies.len()
        );
        Ok(standings::rank(tallies))
    }

    /// Record that `winner_id` beat `loser_id`.
    ///
    /// Not idempotent: reporting the same result twice records two matches.
    ///
    /// # Errors
    ///
    /// * `SwissError::SelfMatch` - Winner and loser are the same player
    /// * `SwissError::NotEnrolled` - Either player is not in the tournament
    /// * `SwissError::TournamentNotFound` - Tournament does not exist
    pub async fn report_match(
        &self,
        tournament_id: TournamentId,
        winner_id: PlayerId,
        loser_id: PlayerId,
    ) -> SwissResult<MatchResult> {
        match self
            .store
            .record_result(tournament_id, winner_id, loser_id)
            .await
        {
            Ok(result) => {
                log::info!(
                    "Tournament {}: player {} beat player {} (+{} points)",
                    tournament_id,
                    winner_id,
                    loser_id,
                    result.winner_points
                );
                Ok(result)
            }
            Err(e) => {
                log::warn!(
                    "Tournament {}: rejected report {} over {}: {}",
                    tournament_id,
                    winner_id,
                    loser_id,
                    e
                );
                Err(e)
            }
        }
    }

    /// Pairings for the next round.
    ///
    /// Adjacent players in the standings are paired. Rematches are not
    /// avoided.
    ///
    /// # Errors
    ///
    /// * `SwissError::OddPlayerCount` - Odd number of enrolled players
    /// * `SwissError::TournamentNotFound` - Tournament does not exist
    pub async fn swiss_pairings(&self, tournament_id: TournamentId) -> SwissResult<Vec<Pairing>> {
        let standings = self.player_standings(tournament_id).await?;
        let pairings = pairing::pair(&standings)?;
        log::debug!(
            "Paired {} player(s) in tournament {}",
            standings.len(),
            tournament_id
        );
        Ok(pairings)
    }

    /// The tournament winner, once decided.
    ///
    /// `None` until every player has played `ceil(log2(n))` matches, or
    /// while the top two players are level on wins and points.
    pub async fn report_winner(
        &self,
        tournament_id: TournamentId,
    ) -> SwissResult<Option<Standing>> {
        let standings = self.player_standings(tournament_id).await?;
        Ok(standings::leader(&standings).cloned())
    }

    /// Delete one tournament's matches
    ///
    /// # Errors
    ///
    /// * `SwissError::TournamentNotFound` - Tournament does not exist
    pub async fn delete_matches(&self, tournament_id: TournamentId) -> SwissResult<u64> {
        let removed = self.store.delete_matches(tournament_id).await?;
        log::info!(
            "Deleted {} match row(s) from tournament {}",
            removed,
            tournament_id
        );
        Ok(removed)
    }

    /// Delete every match of every tournament
    pub async fn delete_all_matches(&self) -> SwissResult<u64> {
        let removed = self.store.delete_all_matches().await?;
        log::info!("Deleted {} match row(s)", removed);
        Ok(removed)
    }
}

fn validated_name(name: &str) -> SwissResult<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(SwissError::EmptyName);
    }
    Ok(name)
}
