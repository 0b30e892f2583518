use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{FixtureRecord, OpponentInfo, TeamRecord};

pub const NEUTRAL_STRENGTH: f64 = 75.0;
pub const NEUTRAL_LEAGUE_POSITION: u32 = 10;
pub const SEASON_GAMEWEEKS: u32 = 38;

const MIN_DIFFICULTY: f64 = 1.0;
const MAX_DIFFICULTY: f64 = 5.0;

/// `None` for a blank gameweek.
pub fn opponent_strength(
    team: &str,
    gameweek: u32,
    fixtures: &[FixtureRecord],
    teams: &[TeamRecord],
) -> Option<OpponentInfo> {
    let in_week = || fixtures.iter().filter(|f| f.gameweek == gameweek);
    let (opponent, is_home) = if let Some(f) = in_week().find(|f| f.home_team == team) {
        (f.away_team.clone(), true)
    } else if let Some(f) = in_week().find(|f| f.away_team == team) {
        (f.home_team.clone(), false)
    } else {
        return None;
    };

    let (strength, league_position) = team_rating(&opponent, teams);
    let expected_difficulty = expected_difficulty(strength, league_position, is_home);

    Some(OpponentInfo {
        opponent,
        is_home,
        strength,
        league_position,
        expected_difficulty,
    })
}

pub fn expected_difficulty(opponent_strength: f64, opponent_position: u32, is_home: bool) -> f64 {
    let base = opponent_strength / 20.0;
    let venue = if is_home { -0.5 } else { 0.5 };
    let table = (10.0 - opponent_position as f64) / 10.0;
    round1((base + venue + table).clamp(MIN_DIFFICULTY, MAX_DIFFICULTY))
}

pub fn fixture_difficulty_rating(
    team: &str,
    opponent: &str,
    is_home: bool,
    teams: &[TeamRecord],
) -> f64 {
    let (team_strength, _) = team_rating(team, teams);
    let (opponent_strength, opponent_position) = team_rating(opponent, teams);

    let base = 3.0 + (opponent_strength - team_strength) / 25.0;
    let venue = if is_home { -0.5 } else { 0.5 };
    let table = (10.0 - opponent_position as f64) / 20.0;

    round1((base + venue - table).clamp(MIN_DIFFICULTY, MAX_DIFFICULTY))
}

pub fn next_opponents(
    gameweek: u32,
    fixtures: &[FixtureRecord],
    teams: &[TeamRecord],
) -> HashMap<String, OpponentInfo> {
    teams
        .iter()
        .filter_map(|t| {
            opponent_strength(&t.name, gameweek, fixtures, teams).map(|info| (t.name.clone(), info))
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DifficultyTrend {
    Improving,
    Worsening,
    Stable,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameweekFixture {
    pub gameweek: u32,
    pub opponent: OpponentInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureOutlook {
    pub team: String,
    pub fixtures: Vec<GameweekFixture>,
    pub avg_difficulty: f64,
    pub trend: DifficultyTrend,
}

pub fn difficulty_outlook(
    team: &str,
    current_gameweek: u32,
    horizon: u32,
    fixtures: &[FixtureRecord],
    teams: &[TeamRecord],
) -> FixtureOutlook {
    let last = current_gameweek
        .saturating_add(horizon)
        .min(SEASON_GAMEWEEKS + 1);
    let upcoming: Vec<GameweekFixture> = (current_gameweek..last)
        .filter_map(|gw| {
            opponent_strength(team, gw, fixtures, teams).map(|opponent| GameweekFixture {
                gameweek: gw,
                opponent,
            })
        })
        .collect();

    let avg_difficulty = if upcoming.is_empty() {
        3.0
    } else {
        round1(mean_difficulty(&upcoming))
    };

    let trend = if upcoming.len() < 2 {
        DifficultyTrend::Unknown
    } else {
        let (first, second) = upcoming.split_at(upcoming.len() / 2);
        let first_avg = mean_difficulty(first);
        let second_avg = mean_difficulty(second);
        if first_avg > second_avg + 0.5 {
            DifficultyTrend::Improving
        } else if second_avg > first_avg + 0.5 {
            DifficultyTrend::Worsening
        } else {
            DifficultyTrend::Stable
        }
    };

    FixtureOutlook {
        team: team.to_string(),
        fixtures: upcoming,
        avg_difficulty,
        trend,
    }
}

fn mean_difficulty(items: &[GameweekFixture]) -> f64 {
    let total: f64 = items.iter().map(|f| f.opponent.expected_difficulty).sum();
    total / items.len() as f64
}

pub fn team_rating(name: &str, teams: &[TeamRecord]) -> (f64, u32) {
    match teams.iter().find(|t| t.name == name) {
        Some(t) => (t.strength, t.league_position),
        None => {
            debug!("team {name} missing from team table, using neutral rating");
            (NEUTRAL_STRENGTH, NEUTRAL_LEAGUE_POSITION)
        }
    }
}

pub(crate) fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}
