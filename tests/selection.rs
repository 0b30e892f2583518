use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use squad_optimizer::selection::rerank_for_opponent;
use squad_optimizer::{
    FixtureRecord, GroupQuota, LineupRequest, OpponentInfo, PlayerRecord, Position,
    PositionGroup, PositionQuota, SelectionConfig, TeamRecord, Weights, build_starting_lineup,
    plan_squad, select_manager, select_substitutes,
};

#[derive(serde::Deserialize)]
struct Snapshot {
    players: Vec<PlayerRecord>,
    teams: Vec<TeamRecord>,
    fixtures: Vec<FixtureRecord>,
}

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn player(id: u32, position: Position, team: &str, price: f64, perf: f64, form: f64) -> PlayerRecord {
    PlayerRecord {
        id,
        name: format!("Player {id}"),
        position,
        team: team.to_string(),
        price,
        performance_score: perf,
        form,
        is_available: true,
        unavailability_reason: None,
    }
}

fn random_pool(rng: &mut StdRng, size: u32) -> Vec<PlayerRecord> {
    (1..=size)
        .map(|id| {
            let position = Position::ALL[rng.gen_range(0..Position::ALL.len())];
            let mut p = player(
                id,
                position,
                &format!("Club {}", rng.gen_range(0..20)),
                rng.gen_range(4.0..13.0),
                rng.gen_range(40.0..95.0),
                rng.gen_range(3.0..9.0),
            );
            p.is_available = rng.gen_bool(0.9);
            p
        })
        .collect()
}

#[test]
fn only_affordable_keeper_is_picked() {
    let pool = vec![
        player(1, Position::Goalkeeper, "A", 5.0, 70.0, 6.0),
        player(2, Position::Goalkeeper, "B", 4.0, 60.0, 6.0),
    ];
    let quota = PositionQuota::new(vec![(Position::Goalkeeper, 1)]);
    let sel = build_starting_lineup(&pool, &quota, &LineupRequest::new(4.5));

    assert_eq!(sel.len(), 1);
    assert_eq!(sel.picks[0].player.id, 2);
    assert!((sel.remaining_budget - 0.5).abs() < 1e-12);
}

#[test]
fn missing_positions_are_skipped_not_fatal() {
    let pool = vec![
        player(1, Position::Goalkeeper, "A", 5.0, 70.0, 6.0),
        player(2, Position::Striker, "B", 8.0, 80.0, 7.0),
    ];
    let sel = build_starting_lineup(&pool, &PositionQuota::starting_eleven(), &LineupRequest::new(100.0));

    assert_eq!(sel.len(), 2);
    assert_eq!(sel.requested_slots, 11);
    assert!(!sel.is_complete());
    let positions: Vec<Position> = sel.picks.iter().map(|p| p.player.position).collect();
    assert_eq!(positions, vec![Position::Goalkeeper, Position::Striker]);
}

#[test]
fn empty_pool_gives_empty_lineup() {
    let sel = build_starting_lineup(&[], &PositionQuota::starting_eleven(), &LineupRequest::new(100.0));
    assert!(sel.is_empty());
    assert_eq!(sel.remaining_budget, 100.0);
}

#[test]
fn unaffordable_slot_is_skipped_without_backtracking() {
    // The expensive keeper eats the budget the striker would have needed.
    let pool = vec![
        player(1, Position::Goalkeeper, "A", 9.0, 90.0, 8.0),
        player(2, Position::Goalkeeper, "B", 4.0, 50.0, 5.0),
        player(3, Position::Striker, "C", 5.0, 85.0, 8.0),
    ];
    let quota = PositionQuota::new(vec![(Position::Goalkeeper, 1), (Position::Striker, 1)]);
    let sel = build_starting_lineup(&pool, &quota, &LineupRequest::new(10.0));

    let ids: Vec<u32> = sel.picks.iter().map(|p| p.player.id).collect();
    assert_eq!(ids, vec![1]);
    assert!((sel.remaining_budget - 1.0).abs() < 1e-12);
}

#[test]
fn unavailable_players_are_never_picked() {
    let mut injured = player(1, Position::Striker, "A", 5.0, 99.0, 9.0);
    injured.is_available = false;
    injured.unavailability_reason = Some("Injury".to_string());
    let pool = vec![injured, player(2, Position::Striker, "B", 5.0, 60.0, 5.0)];
    let quota = PositionQuota::new(vec![(Position::Striker, 1)]);

    let sel = build_starting_lineup(&pool, &quota, &LineupRequest::new(50.0));
    assert_eq!(sel.picks[0].player.id, 2);
}

#[test]
fn weak_opponent_breaks_tie_when_opponents_are_considered() {
    let pool = vec![
        player(1, Position::Striker, "Hard", 7.0, 80.0, 7.0),
        player(2, Position::Striker, "Easy", 7.0, 80.0, 7.0),
    ];
    let opponents = HashMap::from([
        (
            "Hard".to_string(),
            OpponentInfo {
                opponent: "Giants".to_string(),
                is_home: false,
                strength: 95.0,
                league_position: 1,
                expected_difficulty: 5.0,
            },
        ),
        (
            "Easy".to_string(),
            OpponentInfo {
                opponent: "Minnows".to_string(),
                is_home: true,
                strength: 55.0,
                league_position: 20,
                expected_difficulty: 1.3,
            },
        ),
    ]);
    let quota = PositionQuota::new(vec![(Position::Striker, 1)]);

    let mut request = LineupRequest::new(50.0);
    request.next_opponents = Some(&opponents);
    request.consider_opponents = true;
    let sel = build_starting_lineup(&pool, &quota, &request);
    assert_eq!(sel.picks[0].player.id, 2);
    // 80 * (1 + 20/250 + 0.1)
    assert!((sel.picks[0].scores.adjusted - 94.4).abs() < 1e-9);

    request.consider_opponents = false;
    let sel = build_starting_lineup(&pool, &quota, &request);
    assert_eq!(sel.picks[0].player.id, 1);
    assert_eq!(sel.picks[0].scores.adjusted, 80.0);
}

#[test]
fn form_priority_changes_the_pick() {
    let pool = vec![
        player(1, Position::CentralMid, "A", 6.0, 80.0, 2.0),
        player(2, Position::CentralMid, "B", 6.0, 75.0, 9.0),
    ];
    let quota = PositionQuota::new(vec![(Position::CentralMid, 1)]);
    let mut request = LineupRequest::new(50.0);
    request.weights = Weights::new(1.0, 0.0).unwrap();

    request.prioritize_form = true;
    assert_eq!(build_starting_lineup(&pool, &quota, &request).picks[0].player.id, 2);

    request.prioritize_form = false;
    assert_eq!(build_starting_lineup(&pool, &quota, &request).picks[0].player.id, 1);
}

#[test]
fn random_pools_respect_budget_and_uniqueness() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..50 {
        let pool = random_pool(&mut rng, 120);
        let before = pool.clone();
        let budget = rng.gen_range(30.0..100.0);
        let sel = build_starting_lineup(&pool, &PositionQuota::starting_eleven(), &LineupRequest::new(budget));

        assert_eq!(pool, before);
        assert!(sel.len() <= 11);

        let mut running = budget;
        for pick in &sel.picks {
            assert!(pick.player.price <= running);
            running -= pick.player.price;
        }
        assert_eq!(running, sel.remaining_budget);
        assert!(sel.spent() <= budget + 1e-9);

        let ids: HashSet<u32> = sel.picks.iter().map(|p| p.player.id).collect();
        assert_eq!(ids.len(), sel.len());
        for pick in &sel.picks {
            let source = pool.iter().find(|p| p.id == pick.player.id).expect("pick comes from pool");
            assert_eq!(source, &pick.player);
            assert!(source.is_available);
        }
    }
}

#[test]
fn random_benches_respect_budget_squad_and_availability() {
    let mut rng = StdRng::seed_from_u64(19);
    for _ in 0..50 {
        let pool = random_pool(&mut rng, 150);
        let lineup: Vec<PlayerRecord> = pool
            .iter()
            .filter(|p| p.is_available)
            .take(rng.gen_range(0..12))
            .cloned()
            .collect();
        let budget = rng.gen_range(5.0..40.0);
        let sel = select_substitutes(&pool, &lineup, &GroupQuota::full_squad(), budget, Weights::balanced());

        assert!(sel.spent() <= budget + 1e-9);
        assert!(sel.remaining_budget >= -1e-9);
        assert!(sel.len() <= sel.requested_slots);
        assert_eq!(
            sel.requested_slots,
            GroupQuota::full_squad().remaining_after(&lineup).total()
        );

        let held: HashSet<u32> = lineup.iter().map(|p| p.id).collect();
        let ids: HashSet<u32> = sel.picks.iter().map(|p| p.player.id).collect();
        assert_eq!(ids.len(), sel.len());
        assert!(ids.is_disjoint(&held));
        assert!(sel.picks.iter().all(|p| p.player.is_available));
    }
}

#[test]
fn substitutes_fill_what_the_lineup_leaves_open() {
    let lineup = vec![
        player(1, Position::Goalkeeper, "A", 5.0, 70.0, 6.0),
        player(2, Position::RightBack, "A", 5.0, 70.0, 6.0),
        player(3, Position::CenterBack, "A", 5.0, 70.0, 6.0),
        player(4, Position::CenterBack, "A", 5.0, 70.0, 6.0),
        player(5, Position::LeftBack, "A", 5.0, 70.0, 6.0),
        player(6, Position::DefensiveMid, "A", 5.0, 70.0, 6.0),
        player(7, Position::CentralMid, "A", 5.0, 70.0, 6.0),
        player(8, Position::AttackingMid, "A", 5.0, 70.0, 6.0),
        player(9, Position::RightWing, "A", 5.0, 70.0, 6.0),
        player(10, Position::Striker, "A", 5.0, 70.0, 6.0),
        player(11, Position::LeftWing, "A", 5.0, 70.0, 6.0),
    ];
    let bench_pool = vec![
        player(20, Position::Goalkeeper, "B", 4.0, 60.0, 5.0),
        player(21, Position::Goalkeeper, "B", 4.0, 55.0, 5.0),
        player(22, Position::Goalkeeper, "B", 4.0, 50.0, 5.0),
        player(23, Position::LeftBack, "B", 4.0, 58.0, 5.0),
        player(24, Position::CenterBack, "B", 4.0, 62.0, 5.0),
        player(25, Position::DefensiveMid, "B", 4.5, 61.0, 5.0),
        player(26, Position::AttackingMid, "B", 4.5, 64.0, 5.0),
        player(27, Position::CentralMid, "B", 4.5, 57.0, 5.0),
        player(28, Position::Striker, "B", 4.5, 70.0, 5.0),
    ];

    let sel = select_substitutes(
        &bench_pool,
        &lineup,
        &GroupQuota::full_squad(),
        21.0,
        Weights::balanced(),
    );

    assert_eq!(sel.requested_slots, 5);
    let ids: Vec<u32> = sel.picks.iter().map(|p| p.player.id).collect();
    // GK x2, DEF x1, MID x2 uses the budget exactly; forwards are already full.
    assert_eq!(ids, vec![20, 21, 24, 26, 25]);
    assert!(sel.is_complete());
    assert!(sel.remaining_budget.abs() < 1e-9);
    assert!(sel.picks.iter().all(|p| p.player.position.group() != PositionGroup::Forward));
}

#[test]
fn bench_ranks_on_raw_performance_not_form() {
    let pool = vec![
        player(1, Position::CentralMid, "A", 5.0, 60.0, 10.0),
        player(2, Position::CentralMid, "B", 5.0, 65.0, 1.0),
    ];
    let totals = GroupQuota::new(vec![(PositionGroup::Midfielder, 1)]);
    let sel = select_substitutes(&pool, &[], &totals, 10.0, Weights::balanced());
    assert_eq!(sel.picks[0].player.id, 2);
    assert_eq!(sel.picks[0].scores.blended, 65.0);
}

#[test]
fn bench_never_repeats_a_lineup_player() {
    let keeper = player(1, Position::Goalkeeper, "A", 4.0, 90.0, 8.0);
    let totals = GroupQuota::new(vec![(PositionGroup::Goalkeeper, 2)]);
    let sel = select_substitutes(&[keeper.clone()], &[keeper], &totals, 10.0, Weights::balanced());
    assert!(sel.is_empty());
}

#[test]
fn plan_from_snapshot_splits_budget_and_keeps_squads_disjoint() {
    let snapshot: Snapshot = serde_json::from_str(&read_fixture("snapshot_small.json"))
        .expect("snapshot should parse");
    let config = SelectionConfig {
        gameweek: 2,
        ..SelectionConfig::default()
    };
    let opponents = squad_optimizer::opponent::next_opponents(
        config.gameweek,
        &snapshot.fixtures,
        &snapshot.teams,
    );
    let plan = plan_squad(&snapshot.players, &config, Some(&opponents)).expect("valid config");

    assert!(plan.lineup.is_complete());
    assert!(plan.lineup.spent() <= config.lineup_budget() + 1e-9);
    assert!(plan.substitutes.spent() <= config.bench_budget() + 1e-9);
    assert_eq!(plan.substitutes.requested_slots, 5);

    let squad = plan.squad();
    let ids: HashSet<u32> = squad.iter().map(|p| p.id).collect();
    assert_eq!(ids.len(), squad.len());
    assert!(!ids.contains(&10), "injured centre back must not be picked");
    assert!(
        plan.substitutes
            .picks
            .iter()
            .all(|p| p.player.position.group() != PositionGroup::Forward)
    );
}

#[test]
fn plan_rejects_negative_budget() {
    let config = SelectionConfig {
        budget: -5.0,
        ..SelectionConfig::default()
    };
    assert!(plan_squad(&[], &config, None).is_err());
}

#[test]
fn rerank_favours_players_not_facing_a_strong_opponent() {
    let squad = vec![
        player(1, Position::Striker, "Arsenal", 9.0, 80.0, 7.0),
        player(2, Position::Striker, "Man City", 9.0, 75.0, 7.0),
        player(3, Position::Goalkeeper, "Arsenal", 5.0, 70.0, 6.0),
    ];
    let fixtures = vec![FixtureRecord {
        gameweek: 3,
        home_team: "Arsenal".to_string(),
        away_team: "Man City".to_string(),
        played: false,
        home_score: None,
        away_score: None,
    }];
    let teams = vec![TeamRecord {
        name: "Man City".to_string(),
        strength: 90.0,
        league_position: 1,
        manager_name: None,
        manager_rating: None,
    }];
    let quota = PositionQuota::new(vec![(Position::Goalkeeper, 1), (Position::Striker, 1)]);

    let xi = rerank_for_opponent(&squad, "Man City", &fixtures, &teams, &quota);
    let ids: Vec<u32> = xi.iter().map(|p| p.id).collect();
    // Arsenal striker: 80 * (1 - 0.2 + 0.1) = 72 < 75
    assert_eq!(ids, vec![3, 2]);
}

#[test]
fn repeated_quota_entries_never_duplicate_a_player() {
    let squad = vec![
        player(1, Position::CenterBack, "A", 5.0, 70.0, 6.0),
        player(2, Position::CenterBack, "A", 5.0, 80.0, 6.0),
    ];
    let quota = PositionQuota::new(vec![(Position::CenterBack, 1), (Position::CenterBack, 1)]);
    let xi = rerank_for_opponent(&squad, "Nobody", &[], &[], &quota);
    let ids: Vec<u32> = xi.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![2, 1]);
}

fn managed(name: &str, manager: Option<&str>, rating: Option<f64>) -> TeamRecord {
    TeamRecord {
        name: name.to_string(),
        strength: 75.0,
        league_position: 10,
        manager_name: manager.map(str::to_string),
        manager_rating: rating,
    }
}

#[test]
fn manager_pick_takes_highest_rating() {
    let teams = vec![
        managed("Arsenal", Some("Arteta"), Some(8.1)),
        managed("Man City", Some("Guardiola"), Some(9.4)),
        managed("Brentford", Some("Frank"), Some(9.4)),
        managed("Wolves", None, Some(9.9)),
        managed("Ghosts", Some("Nobody"), None),
    ];
    let pick = select_manager(&teams).expect("rated managers exist");
    assert_eq!(pick.name, "Guardiola");
    assert_eq!(pick.team, "Man City");
    assert_eq!(pick.rating, 9.4);

    assert!(select_manager(&[]).is_none());
    assert!(select_manager(&[managed("Ghosts", Some("Nobody"), None)]).is_none());
}

#[test]
fn snapshot_manager_pick_is_top_rated() {
    let snapshot: Snapshot = serde_json::from_str(&read_fixture("snapshot_small.json"))
        .expect("snapshot should parse");
    let pick = select_manager(&snapshot.teams).expect("snapshot teams have managers");
    assert_eq!(pick.name, "Pep Guardiola");
    assert_eq!(pick.team, "Man City");
}
