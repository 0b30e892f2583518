use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "GK")]
    Goalkeeper,
    #[serde(rename = "RB")]
    RightBack,
    #[serde(rename = "CB")]
    CenterBack,
    #[serde(rename = "LB")]
    LeftBack,
    #[serde(rename = "DM")]
    DefensiveMid,
    #[serde(rename = "CM")]
    CentralMid,
    #[serde(rename = "AM")]
    AttackingMid,
    #[serde(rename = "RW")]
    RightWing,
    #[serde(rename = "ST")]
    Striker,
    #[serde(rename = "LW")]
    LeftWing,
}

impl Position {
    pub const ALL: [Position; 10] = [
        Position::Goalkeeper,
        Position::RightBack,
        Position::CenterBack,
        Position::LeftBack,
        Position::DefensiveMid,
        Position::CentralMid,
        Position::AttackingMid,
        Position::RightWing,
        Position::Striker,
        Position::LeftWing,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Position::Goalkeeper => "GK",
            Position::RightBack => "RB",
            Position::CenterBack => "CB",
            Position::LeftBack => "LB",
            Position::DefensiveMid => "DM",
            Position::CentralMid => "CM",
            Position::AttackingMid => "AM",
            Position::RightWing => "RW",
            Position::Striker => "ST",
            Position::LeftWing => "LW",
        }
    }

    pub fn from_code(raw: &str) -> Option<Self> {
        let code = raw.trim().to_ascii_uppercase();
        Position::ALL.into_iter().find(|p| p.code() == code)
    }

    /// Coarse bench category this position counts towards.
    pub fn group(self) -> PositionGroup {
        match self {
            Position::Goalkeeper => PositionGroup::Goalkeeper,
            Position::RightBack | Position::CenterBack | Position::LeftBack => {
                PositionGroup::Defender
            }
            Position::DefensiveMid | Position::CentralMid | Position::AttackingMid => {
                PositionGroup::Midfielder
            }
            Position::RightWing | Position::Striker | Position::LeftWing => {
                PositionGroup::Forward
            }
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PositionGroup {
    #[serde(rename = "GK")]
    Goalkeeper,
    #[serde(rename = "DEF")]
    Defender,
    #[serde(rename = "MID")]
    Midfielder,
    #[serde(rename = "FWD")]
    Forward,
}

impl PositionGroup {
    pub const ALL: [PositionGroup; 4] = [
        PositionGroup::Goalkeeper,
        PositionGroup::Defender,
        PositionGroup::Midfielder,
        PositionGroup::Forward,
    ];

    pub fn code(self) -> &'static str {
        match self {
            PositionGroup::Goalkeeper => "GK",
            PositionGroup::Defender => "DEF",
            PositionGroup::Midfielder => "MID",
            PositionGroup::Forward => "FWD",
        }
    }
}

impl fmt::Display for PositionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One row of the player pool. Prices are in millions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    #[serde(alias = "player_id")]
    pub id: u32,
    pub name: String,
    pub position: Position,
    pub team: String,
    pub price: f64,
    pub performance_score: f64,
    pub form: f64,
    #[serde(default = "default_available")]
    pub is_available: bool,
    #[serde(default)]
    pub unavailability_reason: Option<String>,
}

fn default_available() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub name: String,
    pub strength: f64,
    /// League table position, 1 is top.
    #[serde(alias = "position")]
    pub league_position: u32,
    #[serde(default)]
    pub manager_name: Option<String>,
    #[serde(default)]
    pub manager_rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureRecord {
    pub gameweek: u32,
    pub home_team: String,
    pub away_team: String,
    #[serde(default)]
    pub played: bool,
    #[serde(default)]
    pub home_score: Option<u8>,
    #[serde(default)]
    pub away_score: Option<u8>,
}

impl FixtureRecord {
    pub fn involves(&self, team: &str) -> bool {
        self.home_team == team || self.away_team == team
    }
}

/// Upcoming opponent of a team for one gameweek.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpponentInfo {
    pub opponent: String,
    pub is_home: bool,
    pub strength: f64,
    pub league_position: u32,
    pub expected_difficulty: f64,
}
