use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::SelectionError;
use crate::model::{OpponentInfo, PlayerRecord};
use crate::valuation;

pub const BASELINE_STRENGTH: f64 = 75.0;
pub const VALUE_SCALE: f64 = 10.0;
pub const SEASON_WEIGHT: f64 = 0.7;
pub const FORM_WEIGHT: f64 = 0.3;

/// Performance/value weighting, always summing to one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawWeights")]
pub struct Weights {
    performance: f64,
    budget: f64,
}

#[derive(Deserialize)]
struct RawWeights {
    performance: f64,
    budget: f64,
}

impl TryFrom<RawWeights> for Weights {
    type Error = SelectionError;

    fn try_from(raw: RawWeights) -> Result<Self, Self::Error> {
        Weights::new(raw.performance, raw.budget)
    }
}

impl Weights {
    pub fn new(performance: f64, budget: f64) -> Result<Self, SelectionError> {
        let total = performance + budget;
        if !total.is_finite() || total <= 0.0 {
            return Err(SelectionError::InvalidWeights {
                performance,
                budget,
            });
        }
        if total == 1.0 {
            return Ok(Self {
                performance,
                budget,
            });
        }
        Ok(Self {
            performance: performance / total,
            budget: budget / total,
        })
    }

    pub fn lineup() -> Self {
        Self {
            performance: 0.7,
            budget: 0.3,
        }
    }

    pub fn balanced() -> Self {
        Self {
            performance: 0.5,
            budget: 0.5,
        }
    }

    pub fn performance(&self) -> f64 {
        self.performance
    }

    pub fn budget(&self) -> f64 {
        self.budget
    }
}

impl Default for Weights {
    fn default() -> Self {
        Self::lineup()
    }
}

/// Not clamped; can exceed 100.
pub fn adjust_for_opponent(raw_score: f64, opponent_strength: f64, is_home: bool) -> f64 {
    let strength_factor = (BASELINE_STRENGTH - opponent_strength) / 250.0;
    let home_factor = if is_home { 0.1 } else { -0.05 };
    raw_score * (1.0 + strength_factor + home_factor)
}

pub fn blend_form(adjusted_score: f64, form: f64) -> f64 {
    adjusted_score * SEASON_WEIGHT + (form * 10.0) * FORM_WEIGHT
}

pub fn composite(blended_score: f64, value: f64, weights: Weights) -> f64 {
    blended_score * weights.performance + value * VALUE_SCALE * weights.budget
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerScores {
    pub value: f64,
    pub adjusted: f64,
    pub blended: f64,
    pub composite: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringOptions<'a> {
    /// Per-team next opponent; `None` disables the opponent adjustment.
    pub opponents: Option<&'a HashMap<String, OpponentInfo>>,
    pub prioritize_form: bool,
}

pub fn score_player(player: &PlayerRecord, weights: Weights, opts: ScoringOptions<'_>) -> PlayerScores {
    let value = valuation::value(player);
    let adjusted = match opts.opponents.and_then(|m| m.get(&player.team)) {
        Some(info) => adjust_for_opponent(player.performance_score, info.strength, info.is_home),
        None => player.performance_score,
    };
    let blended = if opts.prioritize_form {
        blend_form(adjusted, player.form)
    } else {
        adjusted
    };
    PlayerScores {
        value,
        adjusted,
        blended,
        composite: composite(blended, value, weights),
    }
}
