use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use serde::Serialize;

use crate::model::{PlayerRecord, Position, PositionGroup};
use crate::opponent::round1;

const LINEUP_SIZE: usize = 11;
const UNDERPERFORMANCE_RATIO: f64 = 0.8;

/// Defenders-midfielders-forwards, e.g. "4-3-3".
pub fn formation(players: &[PlayerRecord]) -> String {
    if players.is_empty() {
        return "Unknown".to_string();
    }
    let count = |group: PositionGroup| {
        players
            .iter()
            .filter(|p| p.position.group() == group)
            .count()
    };
    format!(
        "{}-{}-{}",
        count(PositionGroup::Defender),
        count(PositionGroup::Midfielder),
        count(PositionGroup::Forward)
    )
}

pub fn format_price(price: f64) -> String {
    format!("£{price:.1}M")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamStats {
    pub avg_price: f64,
    pub avg_performance: f64,
    pub formation: String,
    /// Number of distinct clubs represented.
    pub team_diversity: usize,
}

pub fn team_stats(squad: &[PlayerRecord]) -> TeamStats {
    if squad.is_empty() {
        return TeamStats {
            avg_price: 0.0,
            avg_performance: 0.0,
            formation: "Unknown".to_string(),
            team_diversity: 0,
        };
    }
    let n = squad.len() as f64;
    let avg_price = squad.iter().map(|p| p.price).sum::<f64>() / n;
    let avg_performance = squad.iter().map(|p| p.performance_score).sum::<f64>() / n;
    let lineup = &squad[..squad.len().min(LINEUP_SIZE)];
    let clubs: HashSet<&str> = squad.iter().map(|p| p.team.as_str()).collect();

    TeamStats {
        avg_price: round1(avg_price),
        avg_performance: round1(avg_performance),
        formation: formation(lineup),
        team_diversity: clubs.len(),
    }
}

pub fn expected_points(player: &PlayerRecord) -> f64 {
    player.performance_score / 2.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceReview {
    pub gameweek: u32,
    pub total_points: i64,
    pub position_points: BTreeMap<Position, i64>,
    pub player_points: BTreeMap<String, i64>,
    pub expected_points: f64,
    /// Actual over expected; zero when nothing was expected.
    pub performance_ratio: f64,
    pub areas_for_improvement: Vec<ImprovementArea>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ImprovementArea {
    /// A position scored under 80% of the per-position average.
    WeakPosition {
        position: Position,
        points: i64,
        average: f64,
    },
    /// The squad scored under 80% of its expected points.
    BelowExpected { total: i64, expected: f64 },
}

impl fmt::Display for ImprovementArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImprovementArea::WeakPosition {
                position,
                points,
                average,
            } => write!(
                f,
                "strengthen {position}: {points} points vs {average:.1} average"
            ),
            ImprovementArea::BelowExpected { total, expected } => write!(
                f,
                "squad underperformed: {total} points vs {expected:.1} expected"
            ),
        }
    }
}

/// `actual_points` is keyed by player name; missing squad members scored zero.
pub fn review_gameweek(
    squad: &[PlayerRecord],
    actual_points: &HashMap<String, i64>,
    gameweek: u32,
) -> PerformanceReview {
    let total_points: i64 = actual_points.values().sum();

    let mut position_points: BTreeMap<Position, i64> = BTreeMap::new();
    let mut player_points: BTreeMap<String, i64> = BTreeMap::new();
    for p in squad {
        let points = actual_points.get(&p.name).copied().unwrap_or(0);
        *position_points.entry(p.position).or_insert(0) += points;
        player_points.insert(p.name.clone(), points);
    }

    let expected: f64 = squad.iter().map(expected_points).sum();
    let performance_ratio = if expected > 0.0 {
        total_points as f64 / expected
    } else {
        0.0
    };

    let mut areas_for_improvement = Vec::new();
    if !position_points.is_empty() {
        let average = position_points.values().sum::<i64>() as f64 / position_points.len() as f64;
        for (&position, &points) in &position_points {
            if (points as f64) < average * UNDERPERFORMANCE_RATIO {
                areas_for_improvement.push(ImprovementArea::WeakPosition {
                    position,
                    points,
                    average,
                });
            }
        }
    }
    if (total_points as f64) < expected * UNDERPERFORMANCE_RATIO {
        areas_for_improvement.push(ImprovementArea::BelowExpected {
            total: total_points,
            expected,
        });
    }

    PerformanceReview {
        gameweek,
        total_points,
        position_points,
        player_points,
        expected_points: expected,
        performance_ratio,
        areas_for_improvement,
    }
}
