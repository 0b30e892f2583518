use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::model::{PlayerRecord, Position};
use crate::valuation::value;

const WEAKEST_CONSIDERED: usize = 3;
const BEST_CONSIDERED: usize = 10;
const MAX_SUGGESTIONS: usize = 5;
const REPLACEMENT_PRICE_SLACK: f64 = 1.1;
const MAX_REPLACEMENTS: usize = 3;

pub fn squad_cost(squad: &[PlayerRecord]) -> f64 {
    squad.iter().map(|p| p.price).sum()
}

/// Budget left after buying `squad`, never below zero.
pub fn remaining_budget(squad: &[PlayerRecord], total_budget: f64) -> f64 {
    (total_budget - squad_cost(squad)).max(0.0)
}

pub fn budget_allocation(squad: &[PlayerRecord]) -> BTreeMap<Position, f64> {
    let mut by_position: BTreeMap<Position, f64> = BTreeMap::new();
    for p in squad {
        *by_position.entry(p.position).or_insert(0.0) += p.price;
    }
    let total = squad_cost(squad);
    for share in by_position.values_mut() {
        *share = if total > 0.0 { *share / total * 100.0 } else { 0.0 };
    }
    by_position
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetEfficiency {
    pub avg_value: f64,
    pub best_value_player: Option<PlayerRecord>,
    pub worst_value_player: Option<PlayerRecord>,
    pub position_value: BTreeMap<Position, f64>,
}

pub fn budget_efficiency(squad: &[PlayerRecord]) -> BudgetEfficiency {
    if squad.is_empty() {
        return BudgetEfficiency {
            avg_value: 0.0,
            best_value_player: None,
            worst_value_player: None,
            position_value: BTreeMap::new(),
        };
    }

    let avg_value = squad.iter().map(value).sum::<f64>() / squad.len() as f64;
    // First player wins ties on both ends.
    let best = squad
        .iter()
        .reduce(|best, p| if value(p) > value(best) { p } else { best });
    let worst = squad
        .iter()
        .reduce(|worst, p| if value(p) < value(worst) { p } else { worst });

    let mut sums: BTreeMap<Position, (f64, usize)> = BTreeMap::new();
    for p in squad {
        let entry = sums.entry(p.position).or_insert((0.0, 0));
        entry.0 += value(p);
        entry.1 += 1;
    }
    let position_value = sums
        .into_iter()
        .map(|(pos, (total, n))| (pos, total / n as f64))
        .collect();

    BudgetEfficiency {
        avg_value,
        best_value_player: best.cloned(),
        worst_value_player: worst.cloned(),
        position_value,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferSuggestion {
    pub sell_player: String,
    pub buy_player: String,
    pub position: Position,
    pub price_diff: f64,
    pub value_improvement: f64,
}

/// Swap ideas: the weakest-value squad members against the best-value
/// players on the market in the same position, limited to what the
/// remaining budget can cover.
pub fn recommend_transfers(
    squad: &[PlayerRecord],
    available: &[PlayerRecord],
    remaining_budget: f64,
) -> Vec<TransferSuggestion> {
    if squad.is_empty() || available.is_empty() {
        return Vec::new();
    }

    let mut weakest: Vec<&PlayerRecord> = squad.iter().collect();
    weakest.sort_by(|a, b| value(a).total_cmp(&value(b)));
    weakest.truncate(WEAKEST_CONSIDERED);

    let mut best: Vec<&PlayerRecord> = available.iter().collect();
    best.sort_by(|a, b| value(b).total_cmp(&value(a)));
    best.truncate(BEST_CONSIDERED);

    let mut out = Vec::new();
    for sell in weakest {
        for buy in best.iter().filter(|p| p.position == sell.position) {
            let price_diff = buy.price - sell.price;
            if price_diff > remaining_budget {
                continue;
            }
            let value_improvement = value(buy) - value(sell);
            if value_improvement > 0.0 {
                out.push(TransferSuggestion {
                    sell_player: sell.name.clone(),
                    buy_player: buy.name.clone(),
                    position: sell.position,
                    price_diff,
                    value_improvement,
                });
            }
        }
    }

    out.sort_by(|a, b| b.value_improvement.total_cmp(&a.value_improvement));
    out.truncate(MAX_SUGGESTIONS);
    out
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormReplacement {
    pub player: PlayerRecord,
    pub candidates: Vec<PlayerRecord>,
}

/// For every squad member whose form is below the squad median, up to three
/// available players of the same position in better form costing at most 10%
/// more. Candidates are ordered by form, best first; squad members are never
/// proposed. Players without a candidate are left out.
pub fn form_replacements(squad: &[PlayerRecord], available: &[PlayerRecord]) -> Vec<FormReplacement> {
    let Some(median) = median_form(squad) else {
        return Vec::new();
    };
    let held: HashSet<u32> = squad.iter().map(|p| p.id).collect();

    squad
        .iter()
        .filter(|p| p.form < median)
        .filter_map(|p| {
            let ceiling = p.price * REPLACEMENT_PRICE_SLACK;
            let mut candidates: Vec<&PlayerRecord> = available
                .iter()
                .filter(|c| {
                    c.is_available
                        && !held.contains(&c.id)
                        && c.position == p.position
                        && c.price <= ceiling
                        && c.form > p.form
                })
                .collect();
            if candidates.is_empty() {
                return None;
            }
            candidates.sort_by(|a, b| b.form.total_cmp(&a.form));
            Some(FormReplacement {
                player: p.clone(),
                candidates: candidates
                    .into_iter()
                    .take(MAX_REPLACEMENTS)
                    .cloned()
                    .collect(),
            })
        })
        .collect()
}

fn median_form(squad: &[PlayerRecord]) -> Option<f64> {
    if squad.is_empty() {
        return None;
    }
    let mut forms: Vec<f64> = squad.iter().map(|p| p.form).collect();
    forms.sort_by(f64::total_cmp);
    let mid = forms.len() / 2;
    Some(if forms.len() % 2 == 0 {
        (forms[mid - 1] + forms[mid]) / 2.0
    } else {
        forms[mid]
    })
}
