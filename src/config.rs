use std::env;

use serde::{Deserialize, Serialize};

use crate::error::SelectionError;
use crate::quota::{GroupQuota, PositionQuota};
use crate::scoring::Weights;

/// Everything one "generate squad" run needs besides the data itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub budget: f64,
    /// Share of `budget` given to the starting eleven; the bench gets the rest.
    pub lineup_share: f64,
    pub lineup_weights: Weights,
    pub bench_weights: Weights,
    pub consider_opponents: bool,
    pub prioritize_form: bool,
    pub gameweek: u32,
    pub lineup_quota: PositionQuota,
    pub squad_quota: GroupQuota,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            budget: 100.0,
            lineup_share: 0.8,
            lineup_weights: Weights::lineup(),
            bench_weights: Weights::balanced(),
            consider_opponents: true,
            prioritize_form: true,
            gameweek: 1,
            lineup_quota: PositionQuota::starting_eleven(),
            squad_quota: GroupQuota::full_squad(),
        }
    }
}

impl SelectionConfig {
    /// Defaults overlaid with `SQUAD_*` environment variables. Unparseable
    /// values fall back to the default; weights that do not form a valid
    /// pair are an error.
    pub fn from_env() -> Result<Self, SelectionError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SelectionError> {
        let parse_f64 = |key: &str| lookup(key).and_then(|v| v.trim().parse::<f64>().ok());
        let flag = |key: &str| lookup(key).map(|v| parse_flag(&v));

        let mut config = Self::default();
        config.budget = parse_f64("SQUAD_BUDGET").unwrap_or(config.budget);
        config.lineup_share = parse_f64("SQUAD_LINEUP_SHARE").unwrap_or(config.lineup_share);
        config.gameweek = lookup("SQUAD_GAMEWEEK")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(config.gameweek);
        config.consider_opponents = flag("SQUAD_CONSIDER_OPPONENTS").unwrap_or(config.consider_opponents);
        config.prioritize_form = flag("SQUAD_PRIORITIZE_FORM").unwrap_or(config.prioritize_form);

        config.lineup_weights = override_weights(
            config.lineup_weights,
            parse_f64("SQUAD_PERFORMANCE_WEIGHT"),
            parse_f64("SQUAD_BUDGET_WEIGHT"),
        )?;
        config.bench_weights = override_weights(
            config.bench_weights,
            parse_f64("SQUAD_BENCH_PERFORMANCE_WEIGHT"),
            parse_f64("SQUAD_BENCH_BUDGET_WEIGHT"),
        )?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SelectionError> {
        if !self.budget.is_finite() || self.budget < 0.0 {
            return Err(SelectionError::InvalidBudget(self.budget));
        }
        if !(0.0..=1.0).contains(&self.lineup_share) {
            return Err(SelectionError::InvalidShare(self.lineup_share));
        }
        Ok(())
    }

    pub fn lineup_budget(&self) -> f64 {
        self.budget * self.lineup_share
    }

    pub fn bench_budget(&self) -> f64 {
        self.budget * (1.0 - self.lineup_share)
    }
}

fn override_weights(
    base: Weights,
    performance: Option<f64>,
    budget: Option<f64>,
) -> Result<Weights, SelectionError> {
    if performance.is_none() && budget.is_none() {
        return Ok(base);
    }
    Weights::new(
        performance.unwrap_or(base.performance()),
        budget.unwrap_or(base.budget()),
    )
}

fn parse_flag(raw: &str) -> bool {
    !matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "off" | "no"
    )
}
