use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::SelectionConfig;
use crate::error::SelectionError;
use crate::model::{FixtureRecord, OpponentInfo, PlayerRecord, TeamRecord};
use crate::opponent::team_rating;
use crate::quota::{GroupQuota, PositionQuota};
use crate::scoring::{BASELINE_STRENGTH, PlayerScores, ScoringOptions, Weights, score_player};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pick {
    pub player: PlayerRecord,
    pub scores: PlayerScores,
}

/// Result of one greedy pass. May hold fewer players than `requested_slots`
/// when a position ran dry or nothing left was affordable; callers check
/// [`SquadSelection::is_complete`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SquadSelection {
    pub picks: Vec<Pick>,
    pub budget: f64,
    pub remaining_budget: f64,
    pub requested_slots: usize,
}

impl SquadSelection {
    pub fn len(&self) -> usize {
        self.picks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.picks.len() == self.requested_slots
    }

    pub fn spent(&self) -> f64 {
        self.picks.iter().map(|p| p.player.price).sum()
    }

    pub fn players(&self) -> Vec<PlayerRecord> {
        self.picks.iter().map(|p| p.player.clone()).collect()
    }

    pub fn into_players(self) -> Vec<PlayerRecord> {
        self.picks.into_iter().map(|p| p.player).collect()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LineupRequest<'a> {
    pub budget: f64,
    pub weights: Weights,
    pub consider_opponents: bool,
    pub next_opponents: Option<&'a HashMap<String, OpponentInfo>>,
    pub prioritize_form: bool,
}

impl LineupRequest<'_> {
    pub fn new(budget: f64) -> Self {
        Self {
            budget,
            weights: Weights::lineup(),
            consider_opponents: false,
            next_opponents: None,
            prioritize_form: true,
        }
    }

    fn scoring(&self) -> ScoringOptions<'_> {
        ScoringOptions {
            opponents: self.next_opponents.filter(|_| self.consider_opponents),
            prioritize_form: self.prioritize_form,
        }
    }
}

/// Greedy, no backtracking: a slot nothing affordable fits stays empty.
pub fn build_starting_lineup(
    pool: &[PlayerRecord],
    quota: &PositionQuota,
    request: &LineupRequest<'_>,
) -> SquadSelection {
    let scoring = request.scoring();
    let candidates = prepare_candidates(pool, &HashSet::new(), |p| {
        score_player(p, request.weights, scoring)
    });
    let selection = greedy_fill(candidates, quota.slots(), request.budget, |p| p.position);
    info!(
        picked = selection.len(),
        requested = selection.requested_slots,
        spent = selection.spent(),
        remaining = selection.remaining_budget,
        "starting lineup selected"
    );
    selection
}

/// Bench by coarse group, on raw performance. Quotas are `totals` minus what
/// `current_squad` already holds.
pub fn select_substitutes(
    pool: &[PlayerRecord],
    current_squad: &[PlayerRecord],
    totals: &GroupQuota,
    budget: f64,
    weights: Weights,
) -> SquadSelection {
    let quota = totals.remaining_after(current_squad);
    let held: HashSet<u32> = current_squad.iter().map(|p| p.id).collect();
    let candidates = prepare_candidates(pool, &held, |p| {
        score_player(p, weights, ScoringOptions::default())
    });
    let selection = greedy_fill(candidates, quota.slots(), budget, |p| p.position.group());
    info!(
        picked = selection.len(),
        requested = selection.requested_slots,
        spent = selection.spent(),
        remaining = selection.remaining_budget,
        "substitutes selected"
    );
    selection
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SquadPlan {
    pub lineup: SquadSelection,
    pub substitutes: SquadSelection,
}

impl SquadPlan {
    pub fn squad(&self) -> Vec<PlayerRecord> {
        let mut out = self.lineup.players();
        out.extend(self.substitutes.players());
        out
    }

    pub fn total_cost(&self) -> f64 {
        self.lineup.spent() + self.substitutes.spent()
    }
}

pub fn plan_squad(
    pool: &[PlayerRecord],
    config: &SelectionConfig,
    next_opponents: Option<&HashMap<String, OpponentInfo>>,
) -> Result<SquadPlan, SelectionError> {
    config.validate()?;

    let request = LineupRequest {
        budget: config.lineup_budget(),
        weights: config.lineup_weights,
        consider_opponents: config.consider_opponents,
        next_opponents,
        prioritize_form: config.prioritize_form,
    };
    let lineup = build_starting_lineup(pool, &config.lineup_quota, &request);

    let chosen: HashSet<u32> = lineup.picks.iter().map(|p| p.player.id).collect();
    let bench_pool: Vec<PlayerRecord> = pool
        .iter()
        .filter(|p| !chosen.contains(&p.id))
        .cloned()
        .collect();
    let substitutes = select_substitutes(
        &bench_pool,
        &lineup.players(),
        &config.squad_quota,
        config.bench_budget(),
        config.bench_weights,
    );

    Ok(SquadPlan {
        lineup,
        substitutes,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManagerPick {
    pub name: String,
    pub team: String,
    pub rating: f64,
}

/// Highest-rated manager in the team table. Teams without a named, rated
/// manager are passed over; the first team wins ties.
pub fn select_manager(teams: &[TeamRecord]) -> Option<ManagerPick> {
    teams
        .iter()
        .filter_map(|t| match (&t.manager_name, t.manager_rating) {
            (Some(name), Some(rating)) if rating.is_finite() => Some((t, name, rating)),
            _ => None,
        })
        .reduce(|best, cur| if cur.2 > best.2 { cur } else { best })
        .map(|(t, name, rating)| ManagerPick {
            name: name.clone(),
            team: t.name.clone(),
            rating,
        })
}

/// Re-order an already owned squad for one specific opponent and pick the
/// best `quota` per position from it. Budget plays no part.
pub fn rerank_for_opponent(
    squad: &[PlayerRecord],
    opponent_team: &str,
    fixtures: &[FixtureRecord],
    teams: &[TeamRecord],
    quota: &PositionQuota,
) -> Vec<PlayerRecord> {
    let (opponent_strength, _) = team_rating(opponent_team, teams);

    let mut scored: Vec<(f64, &PlayerRecord)> = squad
        .iter()
        .map(|p| {
            let adjustment = if p.team == opponent_team {
                0.0
            } else {
                let is_home = fixtures
                    .iter()
                    .any(|f| f.home_team == p.team && f.away_team == opponent_team);
                let venue = if is_home { 0.1 } else { -0.1 };
                (BASELINE_STRENGTH - opponent_strength) / BASELINE_STRENGTH + venue
            };
            (p.performance_score * (1.0 + adjustment), p)
        })
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    let mut out = Vec::with_capacity(quota.total());
    for &(position, count) in quota.slots() {
        out.extend(
            scored
                .iter()
                .filter(|(_, p)| p.position == position)
                .take(count)
                .map(|(_, p)| (*p).clone()),
        );
    }
    out
}

/// Owned, scored copy of the available part of `pool`. Duplicate ids keep
/// their first occurrence.
fn prepare_candidates(
    pool: &[PlayerRecord],
    exclude: &HashSet<u32>,
    score: impl Fn(&PlayerRecord) -> PlayerScores,
) -> Vec<Pick> {
    let mut seen = HashSet::with_capacity(pool.len());
    pool.iter()
        .filter(|p| p.is_available && !exclude.contains(&p.id))
        .filter(|p| seen.insert(p.id))
        .map(|p| Pick {
            player: p.clone(),
            scores: score(p),
        })
        .collect()
}

fn greedy_fill<K>(
    candidates: Vec<Pick>,
    slots: &[(K, usize)],
    budget: f64,
    slot_of: impl Fn(&PlayerRecord) -> K,
) -> SquadSelection
where
    K: Copy + PartialEq + fmt::Display,
{
    let mut taken = vec![false; candidates.len()];
    let mut order = Vec::new();
    let mut remaining = budget;

    for &(slot, count) in slots {
        let mut ranked: Vec<usize> = (0..candidates.len())
            .filter(|&i| !taken[i] && slot_of(&candidates[i].player) == slot)
            .collect();
        if ranked.is_empty() {
            debug!("no candidates left for {slot}, skipping");
            continue;
        }
        // Stable: equal scores keep pool order.
        ranked.sort_by(|&a, &b| {
            candidates[b]
                .scores
                .composite
                .total_cmp(&candidates[a].scores.composite)
        });

        for n in 0..count {
            let Some(at) = ranked
                .iter()
                .position(|&i| candidates[i].player.price <= remaining)
            else {
                debug!(
                    "nothing affordable for {slot} slot {} with {remaining:.2} left",
                    n + 1
                );
                continue;
            };
            let idx = ranked.remove(at);
            taken[idx] = true;
            remaining -= candidates[idx].player.price;
            order.push(idx);
        }
    }

    let mut cells: Vec<Option<Pick>> = candidates.into_iter().map(Some).collect();
    let picks = order.into_iter().filter_map(|i| cells[i].take()).collect();

    SquadSelection {
        picks,
        budget,
        remaining_budget: remaining,
        requested_slots: slots.iter().map(|(_, n)| n).sum(),
    }
}
