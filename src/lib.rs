//! Budget-constrained fantasy squad selection.
//!
//! Players are valued (performance per million), optionally adjusted for their
//! next opponent and recent form, blended into a composite score, and then
//! picked greedily position by position until the quota table is filled or
//! the budget runs out.

pub mod budget;
pub mod config;
pub mod error;
pub mod model;
pub mod opponent;
pub mod quota;
pub mod report;
pub mod scoring;
pub mod selection;
pub mod valuation;

pub use config::SelectionConfig;
pub use error::SelectionError;
pub use model::{FixtureRecord, OpponentInfo, PlayerRecord, Position, PositionGroup, TeamRecord};
pub use quota::{GroupQuota, PositionQuota};
pub use scoring::Weights;
pub use selection::{
    LineupRequest, ManagerPick, SquadPlan, SquadSelection, build_starting_lineup, plan_squad,
    select_manager, select_substitutes,
};
