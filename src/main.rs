use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::Level;

use squad_optimizer::budget::{budget_allocation, form_replacements, remaining_budget};
use squad_optimizer::opponent::next_opponents;
use squad_optimizer::report::{format_price, team_stats};
use squad_optimizer::selection::SquadSelection;
use squad_optimizer::{
    FixtureRecord, PlayerRecord, SelectionConfig, TeamRecord, plan_squad, select_manager,
};

#[derive(Debug, Deserialize)]
struct Snapshot {
    players: Vec<PlayerRecord>,
    #[serde(default)]
    teams: Vec<TeamRecord>,
    #[serde(default)]
    fixtures: Vec<FixtureRecord>,
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/snapshot.json"));
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("read snapshot {}", path.display()))?;
    let snapshot: Snapshot = serde_json::from_str(&raw)
        .with_context(|| format!("parse snapshot {}", path.display()))?;

    let config = SelectionConfig::from_env().context("invalid selection config")?;
    let opponents = next_opponents(config.gameweek, &snapshot.fixtures, &snapshot.teams);
    let plan = plan_squad(&snapshot.players, &config, Some(&opponents))?;

    println!(
        "Gameweek {} | budget {}",
        config.gameweek,
        format_price(config.budget)
    );
    print_selection("Starting XI", &plan.lineup);
    print_selection("Substitutes", &plan.substitutes);

    let squad = plan.squad();
    let stats = team_stats(&squad);
    println!();
    println!("Formation: {}", stats.formation);
    println!(
        "Avg price: {} | Avg performance: {:.1} | Clubs: {}",
        format_price(stats.avg_price),
        stats.avg_performance,
        stats.team_diversity
    );
    println!(
        "Spent: {} | Remaining: {}",
        format_price(plan.total_cost()),
        format_price(remaining_budget(&squad, config.budget))
    );
    for (position, share) in budget_allocation(&squad) {
        println!(" {:<3} {share:>5.1}%", position.code());
    }
    if let Some(manager) = select_manager(&snapshot.teams) {
        println!("Manager: {} ({}) rating {:.1}", manager.name, manager.team, manager.rating);
    }

    let replacements = form_replacements(&squad, &snapshot.players);
    if !replacements.is_empty() {
        println!();
        println!("Out of form");
        for r in &replacements {
            let names: Vec<&str> = r.candidates.iter().map(|c| c.name.as_str()).collect();
            println!(" {:<24} -> {}", r.player.name, names.join(", "));
        }
    }

    Ok(())
}

fn print_selection(title: &str, selection: &SquadSelection) {
    println!();
    println!(
        "{title} ({}/{})",
        selection.len(),
        selection.requested_slots
    );
    for pick in &selection.picks {
        let p = &pick.player;
        println!(
            " {:<3} {:<24} {:<18} {:>7} score {:>6.1}",
            p.position.code(),
            p.name,
            p.team,
            format_price(p.price),
            pick.scores.composite
        );
    }
    if !selection.is_complete() {
        println!(
            " [WARN] {} slot(s) left empty",
            selection.requested_slots - selection.len()
        );
    }
}
