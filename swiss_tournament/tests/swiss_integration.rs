//! Integration tests for the Swiss manager over the in-memory store.
//!
//! These walk through registration, match reporting, standings, pairings
//! and winner detection the way a tournament operator would.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use swiss_tournament::db::MemoryTournamentStore;
use swiss_tournament::swiss::{
    ErrorKind, PlayerId, Standing, SwissError, SwissManager, TournamentId,
};

fn manager() -> SwissManager {
    SwissManager::new(Arc::new(MemoryTournamentStore::new()))
}

/// Register the named players into a fresh tournament
async fn setup_tournament(
    mgr: &SwissManager,
    title: &str,
    names: &[&str],
) -> (TournamentId, Vec<PlayerId>) {
    let tournament = mgr
        .register_tournament(title)
        .await
        .expect("Tournament registration should succeed");

    let mut ids = Vec::with_capacity(names.len());
    for name in names {
        let player = mgr
            .register_player(name)
            .await
            .expect("Player registration should succeed");
        mgr.enroll(tournament.id, player.id)
            .await
            .expect("Enrollment should succeed");
        ids.push(player.id);
    }

    (tournament.id, ids)
}

fn by_id(standings: &[Standing]) -> HashMap<PlayerId, Standing> {
    standings
        .iter()
        .map(|s| (s.player_id, s.clone()))
        .collect()
}

fn name_pairs(pairings: &[swiss_tournament::Pairing]) -> Vec<HashSet<String>> {
    pairings
        .iter()
        .map(|p| HashSet::from([p.player1_name.clone(), p.player2_name.clone()]))
        .collect()
}

fn set_of(a: &str, b: &str) -> HashSet<String> {
    HashSet::from([a.to_string(), b.to_string()])
}

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn test_count_players() {
    let mgr = manager();
    assert_eq!(mgr.count_all_players().await.unwrap(), 0);

    mgr.register_player("Chandra Nalaar").await.unwrap();
    assert_eq!(mgr.count_all_players().await.unwrap(), 1);

    mgr.register_player("Jace Beleren").await.unwrap();
    assert_eq!(mgr.count_all_players().await.unwrap(), 2);

    mgr.delete_all_players().await.unwrap();
    assert_eq!(mgr.count_all_players().await.unwrap(), 0);
}

#[tokio::test]
async fn test_count_players_per_tournament() {
    let mgr = manager();
    let counting = mgr.register_tournament("Counting contest").await.unwrap();
    let running = mgr
        .register_tournament("Backwards running contest")
        .await
        .unwrap();

    mgr.register_player("Jace Beleren").await.unwrap();
    mgr.enroll_all(counting.id).await.unwrap();
    mgr.register_player("Chandra Nalaar").await.unwrap();
    mgr.enroll_all(running.id).await.unwrap();

    assert_eq!(mgr.count_players(counting.id).await.unwrap(), 1);
    assert_eq!(mgr.count_players(running.id).await.unwrap(), 2);

    mgr.withdraw_players(counting.id).await.unwrap();
    assert_eq!(mgr.count_players(counting.id).await.unwrap(), 0);
    assert_eq!(mgr.count_players(running.id).await.unwrap(), 2);

    mgr.withdraw_players(running.id).await.unwrap();
    assert_eq!(mgr.count_players(running.id).await.unwrap(), 0);
    assert_eq!(
        mgr.count_all_players().await.unwrap(),
        2,
        "Withdrawing should not delete registered players"
    );
}

#[tokio::test]
async fn test_register_and_delete_tournaments() {
    let mgr = manager();
    mgr.register_tournament("Ping Pong masters").await.unwrap();
    mgr.register_tournament("Chess").await.unwrap();

    assert_eq!(mgr.list_tournaments().await.unwrap().len(), 2);

    mgr.delete_tournaments().await.unwrap();
    assert!(mgr.list_tournaments().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_enroll_unknown_entities() {
    let mgr = manager();
    let t = mgr.register_tournament("Chess").await.unwrap();
    let p = mgr.register_player("Ann").await.unwrap();

    let err = mgr.enroll(t.id, 999).await.unwrap_err();
    assert!(matches!(err, SwissError::PlayerNotFound(999)));
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = mgr.enroll(999, p.id).await.unwrap_err();
    assert!(matches!(err, SwissError::TournamentNotFound(999)));
}

// ============================================================================
// Standings
// ============================================================================

#[tokio::test]
async fn test_standings_before_matches() {
    let mgr = manager();
    let (tid, _) =
        setup_tournament(&mgr, "Coding tournament", &["Melpomene Murray", "Randy Schwartz"])
            .await;

    let standings = mgr.player_standings(tid).await.unwrap();

    assert_eq!(standings.len(), 2);
    for s in &standings {
        assert_eq!((s.wins, s.matches, s.points), (0, 0, 0));
    }
    let names: HashSet<_> = standings.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, HashSet::from(["Melpomene Murray", "Randy Schwartz"]));
}

#[tokio::test]
async fn test_unenrolled_players_are_not_in_standings() {
    let mgr = manager();
    let (tid, _) = setup_tournament(&mgr, "Spit contest", &["A", "B"]).await;
    mgr.register_player("Bystander").await.unwrap();

    assert_eq!(mgr.player_standings(tid).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_standings_for_missing_tournament() {
    let mgr = manager();
    let err = mgr.player_standings(42).await.unwrap_err();
    assert!(matches!(err, SwissError::TournamentNotFound(42)));
}

#[tokio::test]
async fn test_withdraw_from_missing_tournament() {
    let mgr = manager();
    setup_tournament(&mgr, "Real", &["A", "B"]).await;

    let err = mgr.withdraw_players(404).await.unwrap_err();
    assert!(matches!(err, SwissError::TournamentNotFound(404)));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_delete_matches_of_missing_tournament() {
    let mgr = manager();
    let (tid, ids) = setup_tournament(&mgr, "Real", &["A", "B"]).await;
    mgr.report_match(tid, ids[0], ids[1]).await.unwrap();

    let err = mgr.delete_matches(404).await.unwrap_err();
    assert!(matches!(err, SwissError::TournamentNotFound(404)));
    assert_eq!(mgr.store().list_matches(tid).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_report_matches_updates_standings() {
    let mgr = manager();
    let (tid, ids) = setup_tournament(
        &mgr,
        "Spit contest",
        &["Bruno Walton", "Boots O'Neal", "Cathy Burton", "Diane Grant"],
    )
    .await;

    mgr.report_match(tid, ids[0], ids[1]).await.unwrap();
    mgr.report_match(tid, ids[2], ids[3]).await.unwrap();

    let standings = mgr.player_standings(tid).await.unwrap();
    for s in &standings {
        assert_eq!(s.matches, 1, "Each player should have one match recorded");
        if s.player_id == ids[0] || s.player_id == ids[2] {
            assert_eq!(s.wins, 1, "Each winner should have one win recorded");
        } else {
            assert_eq!(s.wins, 0, "Each loser should have zero wins recorded");
        }
    }

    mgr.delete_all_matches().await.unwrap();
    let standings = mgr.player_standings(tid).await.unwrap();
    assert_eq!(standings.len(), 4, "Match deletion should not remove players");
    for s in &standings {
        assert_eq!((s.wins, s.matches, s.points), (0, 0, 0));
    }
}

#[tokio::test]
async fn test_report_increments_only_expected_fields() {
    let mgr = manager();
    let (tid, ids) = setup_tournament(&mgr, "Go", &["A", "B", "C", "D"]).await;
    mgr.report_match(tid, ids[2], ids[3]).await.unwrap();

    let before = by_id(&mgr.player_standings(tid).await.unwrap());
    mgr.report_match(tid, ids[0], ids[2]).await.unwrap();
    let after = by_id(&mgr.player_standings(tid).await.unwrap());

    let (w0, w1) = (&before[&ids[0]], &after[&ids[0]]);
    let (l0, l1) = (&before[&ids[2]], &after[&ids[2]]);
    assert_eq!(w1.wins, w0.wins + 1);
    assert_eq!(w1.matches, w0.matches + 1);
    assert_eq!(l1.matches, l0.matches + 1);
    assert_eq!(l1.wins, l0.wins);

    // Bystanders untouched
    assert_eq!(before[&ids[1]], after[&ids[1]]);
    assert_eq!(before[&ids[3]], after[&ids[3]]);
}

#[tokio::test]
async fn test_points_use_loser_wins_before_report() {
    let mgr = manager();
    let (tid, ids) = setup_tournament(&mgr, "Go", &["A", "B", "C", "D"]).await;

    mgr.report_match(tid, ids[2], ids[3]).await.unwrap();
    mgr.report_match(tid, ids[2], ids[1]).await.unwrap();

    let loser_wins = mgr.store().read_win_count(tid, ids[2]).await.unwrap();
    assert_eq!(loser_wins, 2);

    let result = mgr.report_match(tid, ids[0], ids[2]).await.unwrap();
    assert_eq!(result.loser_wins_before, 2);
    assert_eq!(result.winner_points, 3);

    let rows = mgr.store().list_matches(tid).await.unwrap();
    let winner_row = rows
        .iter()
        .find(|m| m.player_id == ids[0] && m.opponent_id == ids[2])
        .unwrap();
    let loser_row = rows
        .iter()
        .find(|m| m.player_id == ids[2] && m.opponent_id == ids[0])
        .unwrap();
    assert!(winner_row.won);
    assert_eq!(winner_row.points, 3);
    assert!(!loser_row.won);
    assert_eq!(loser_row.points, 0);
}

#[tokio::test]
async fn test_equal_wins_more_points_ranks_higher() {
    let mgr = manager();
    let (tid, ids) = setup_tournament(&mgr, "Go", &["A", "B", "C", "D"]).await;

    // C beats D, then B beats the one-win C (worth 2) and A beats winless D
    // (worth 1). A and B both have one win; B outranks A despite the higher id.
    mgr.report_match(tid, ids[2], ids[3]).await.unwrap();
    mgr.report_match(tid, ids[1], ids[2]).await.unwrap();
    mgr.report_match(tid, ids[0], ids[3]).await.unwrap();

    let standings = mgr.player_standings(tid).await.unwrap();
    let pos = |id: PlayerId| standings.iter().position(|s| s.player_id == id).unwrap();

    let a = &standings[pos(ids[0])];
    let b = &standings[pos(ids[1])];
    assert_eq!(a.wins, b.wins);
    assert!(b.points > a.points);
    assert!(pos(ids[1]) < pos(ids[0]));
}

#[tokio::test]
async fn test_duplicate_report_double_counts() {
    let mgr = manager();
    let (tid, ids) = setup_tournament(&mgr, "Go", &["A", "B"]).await;

    mgr.report_match(tid, ids[0], ids[1]).await.unwrap();
    mgr.report_match(tid, ids[0], ids[1]).await.unwrap();

    let a = &mgr.player_standings(tid).await.unwrap()[0];
    assert_eq!((a.wins, a.matches), (2, 2));
}

// ============================================================================
// Rejected reports
// ============================================================================

#[tokio::test]
async fn test_report_against_self_rejected() {
    let mgr = manager();
    let (tid, ids) = setup_tournament(&mgr, "Go", &["A", "B"]).await;

    let err = mgr.report_match(tid, ids[0], ids[0]).await.unwrap_err();
    assert!(matches!(err, SwissError::SelfMatch(_)));
    assert_eq!(err.kind(), ErrorKind::ConstraintViolation);
}

#[tokio::test]
async fn test_report_with_unenrolled_player_rejected() {
    let mgr = manager();
    let (tid, ids) = setup_tournament(&mgr, "Go", &["A", "B"]).await;
    let outsider = mgr.register_player("Outsider").await.unwrap();

    let err = mgr.report_match(tid, outsider.id, ids[0]).await.unwrap_err();
    assert!(matches!(err, SwissError::NotEnrolled { .. }));
    assert_eq!(err.kind(), ErrorKind::ConstraintViolation);

    let standings = mgr.player_standings(tid).await.unwrap();
    assert!(
        standings.iter().all(|s| s.matches == 0),
        "A rejected report must not leave partial rows"
    );
}

#[tokio::test]
async fn test_report_in_missing_tournament() {
    let mgr = manager();
    let (_, ids) = setup_tournament(&mgr, "Go", &["A", "B"]).await;

    let err = mgr.report_match(77, ids[0], ids[1]).await.unwrap_err();
    assert!(matches!(err, SwissError::TournamentNotFound(77)));
}

// ============================================================================
// Pairings
// ============================================================================

#[tokio::test]
async fn test_pairings_after_first_round() {
    let mgr = manager();
    let (tid, ids) = setup_tournament(
        &mgr,
        "FFC - Finger Fighting Championship",
        &[
            "Twilight Sparkle",
            "Fluttershy",
            "Applejack",
            "Pinkie Pie",
            "Rarity",
            "Rainbow Dash",
            "Princess Celestia",
            "Princess Luna",
        ],
    )
    .await;

    assert_eq!(mgr.swiss_pairings(tid).await.unwrap().len(), 4);

    for round in ids.chunks(2) {
        mgr.report_match(tid, round[0], round[1]).await.unwrap();
    }

    let winners: HashSet<_> = ids.iter().step_by(2).copied().collect();
    let pairings = mgr.swiss_pairings(tid).await.unwrap();
    assert_eq!(pairings.len(), 4);

    for p in &pairings {
        assert_eq!(
            winners.contains(&p.player1_id),
            winners.contains(&p.player2_id),
            "After one round, winners should be paired with winners"
        );
    }
}

#[tokio::test]
async fn test_pairings_cover_every_player_once() {
    let mgr = manager();
    let names = ["A", "B", "C", "D", "E", "F"];
    let (tid, ids) = setup_tournament(&mgr, "Six", &names).await;
    mgr.report_match(tid, ids[5], ids[0]).await.unwrap();

    let pairings = mgr.swiss_pairings(tid).await.unwrap();
    assert_eq!(pairings.len(), names.len() / 2);

    let mut seen = HashSet::new();
    for p in &pairings {
        assert!(seen.insert(p.player1_id));
        assert!(seen.insert(p.player2_id));
    }
    assert_eq!(seen, ids.into_iter().collect::<HashSet<_>>());
}

#[tokio::test]
async fn test_pairings_with_odd_players_rejected() {
    let mgr = manager();
    let (tid, _) = setup_tournament(&mgr, "Trio", &["A", "B", "C"]).await;

    let err = mgr.swiss_pairings(tid).await.unwrap_err();
    assert!(matches!(err, SwissError::OddPlayerCount(3)));
    assert_eq!(err.kind(), ErrorKind::ConstraintViolation);
}

#[tokio::test]
async fn test_pairings_using_points() {
    let mgr = manager();
    let (tid, ids) = setup_tournament(
        &mgr,
        "Spelling contest",
        &["A", "B", "C", "D", "E", "F", "G", "H"],
    )
    .await;
    let &[a, b, c, d, e, f, g, h] = ids.as_slice() else {
        panic!("expected eight players");
    };

    for (w, l) in [(a, b), (c, d), (e, f), (g, h)] {
        mgr.report_match(tid, w, l).await.unwrap();
    }
    for (w, l) in [(a, c), (e, g), (b, d), (f, h)] {
        mgr.report_match(tid, w, l).await.unwrap();
    }
    // Deliberately out of order
    for (w, l) in [(b, a), (f, e), (c, d), (g, h)] {
        mgr.report_match(tid, w, l).await.unwrap();
    }

    let standings = by_id(&mgr.player_standings(tid).await.unwrap());
    for id in [a, b, e, f] {
        assert_eq!(standings[&id].wins, 2);
    }
    assert!(standings[&b].points > standings[&a].points);
    assert!(standings[&f].points > standings[&e].points);

    let pairs = name_pairs(&mgr.swiss_pairings(tid).await.unwrap());
    assert!(pairs.contains(&set_of("B", "F")), "B and F should be paired");
    assert!(pairs.contains(&set_of("A", "E")), "A and E should be paired");
}

#[tokio::test]
async fn test_pairings_allow_rematches() {
    let mgr = manager();
    let (tid, ids) = setup_tournament(&mgr, "Duel", &["A", "B"]).await;
    mgr.report_match(tid, ids[0], ids[1]).await.unwrap();

    let pairings = mgr.swiss_pairings(tid).await.unwrap();
    assert_eq!(pairings.len(), 1);
    assert!(pairings[0].involves(ids[0]) && pairings[0].involves(ids[1]));
}

// ============================================================================
// Multiple tournaments
// ============================================================================

#[tokio::test]
async fn test_multiple_tournaments_are_isolated() {
    let mgr = manager();
    for name in ["A", "B", "C", "D", "E", "F", "G", "H"] {
        mgr.register_player(name).await.unwrap();
    }
    let jokes = mgr.register_tournament("Bad jokes contest").await.unwrap();
    let selfie = mgr.register_tournament("Selfie contest").await.unwrap();

    let players = mgr.list_players().await.unwrap();
    let ids: Vec<_> = players.iter().map(|p| p.id).collect();
    for id in &ids {
        mgr.enroll(jokes.id, *id).await.unwrap();
    }
    for id in &ids[0..4] {
        mgr.enroll(selfie.id, *id).await.unwrap();
    }

    assert_eq!(mgr.player_standings(jokes.id).await.unwrap().len(), 8);
    assert_eq!(mgr.player_standings(selfie.id).await.unwrap().len(), 4);
    assert_eq!(mgr.swiss_pairings(jokes.id).await.unwrap().len(), 4);
    assert_eq!(mgr.swiss_pairings(selfie.id).await.unwrap().len(), 2);

    for (w, l) in [(0, 1), (2, 3), (4, 5), (6, 7), (0, 2), (4, 6), (1, 3), (5, 7)] {
        mgr.report_match(jokes.id, ids[w], ids[l]).await.unwrap();
    }
    mgr.report_match(selfie.id, ids[1], ids[0]).await.unwrap();
    mgr.report_match(selfie.id, ids[3], ids[2]).await.unwrap();

    let expected_jokes = [2, 1, 1, 0, 2, 1, 1, 0];
    let jokes_standings = by_id(&mgr.player_standings(jokes.id).await.unwrap());
    for (id, wins) in ids.iter().zip(expected_jokes) {
        assert_eq!(jokes_standings[id].wins, wins);
        assert_eq!(jokes_standings[id].matches, 2);
    }

    let expected_selfie = [0, 1, 0, 1];
    let selfie_before = mgr.player_standings(selfie.id).await.unwrap();
    let selfie_by_id = by_id(&selfie_before);
    for (id, wins) in ids[0..4].iter().zip(expected_selfie) {
        assert_eq!(selfie_by_id[id].wins, wins);
        assert_eq!(selfie_by_id[id].matches, 1);
    }

    mgr.delete_matches(jokes.id).await.unwrap();
    assert_eq!(
        mgr.player_standings(selfie.id).await.unwrap(),
        selfie_before,
        "Removing matches from one tournament should not affect another"
    );
    assert!(
        mgr.player_standings(jokes.id)
            .await
            .unwrap()
            .iter()
            .all(|s| s.matches == 0)
    );
}

// ============================================================================
// Winner
// ============================================================================

#[tokio::test]
async fn test_report_winner() {
    let mgr = manager();
    let (tid, ids) = setup_tournament(&mgr, "Go tournament", &["A", "B", "C", "D"]).await;

    mgr.report_match(tid, ids[0], ids[1]).await.unwrap();
    mgr.report_match(tid, ids[2], ids[3]).await.unwrap();

    assert!(
        mgr.report_winner(tid).await.unwrap().is_none(),
        "No winner before the minimum number of rounds"
    );

    mgr.report_match(tid, ids[0], ids[2]).await.unwrap();
    mgr.report_match(tid, ids[1], ids[3]).await.unwrap();

    let winner = mgr
        .report_winner(tid)
        .await
        .unwrap()
        .expect("Tournament should have a winner");
    assert_eq!(winner.player_id, ids[0]);
    assert_eq!(winner.wins, 2);
}

#[tokio::test]
async fn test_no_winner_for_empty_tournament() {
    let mgr = manager();
    let t = mgr.register_tournament("Empty").await.unwrap();
    assert!(mgr.report_winner(t.id).await.unwrap().is_none());
}

// ============================================================================
// Cascades
// ============================================================================

#[tokio::test]
async fn test_deleting_players_cascades() {
    let mgr = manager();
    let (tid, ids) = setup_tournament(&mgr, "Go", &["A", "B"]).await;
    mgr.report_match(tid, ids[0], ids[1]).await.unwrap();

    mgr.delete_all_players().await.unwrap();

    assert_eq!(mgr.count_players(tid).await.unwrap(), 0);
    assert!(mgr.store().list_matches(tid).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_deleting_tournaments_keeps_players() {
    let mgr = manager();
    let (tid, ids) = setup_tournament(&mgr, "Go", &["A", "B"]).await;
    mgr.report_match(tid, ids[0], ids[1]).await.unwrap();

    mgr.delete_tournaments().await.unwrap();

    assert_eq!(mgr.count_all_players().await.unwrap(), 2);
    assert!(matches!(
        mgr.player_standings(tid).await,
        Err(SwissError::TournamentNotFound(_))
    ));
}
