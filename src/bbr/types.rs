// src/bbr/types.rs

use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

/// A roster row: every `data-stat` column as text, plus the player's profile link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterRow {
    #[serde(flatten)]
    pub fields: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryRow {
    pub player: String,
    pub player_url: Option<String>,
    pub player_id: Option<String>,
    pub salary: Option<i64>,
    pub salary_text: String,
    pub team: String,
    pub year: i32,
}

/// Markers observed on a contract row's year columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractFlag {
    PlayerOption,
    TeamOption,
    NonGuaranteed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    Guaranteed,
    NonGuaranteed,
    PlayerOption,
    TeamOption,
}

impl ContractStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ContractStatus::Guaranteed => "guaranteed",
            ContractStatus::NonGuaranteed => "non_guaranteed",
            ContractStatus::PlayerOption => "player_option",
            ContractStatus::TeamOption => "team_option",
        }
    }
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractRow {
    pub player: String,
    pub player_url: Option<String>,
    pub player_id: Option<String>,
    pub current_salary: Option<i64>,
    pub current_salary_text: Option<String>,
    /// Number of the six year columns that hold a value (0..=6).
    pub years_remaining: u8,
    pub status: ContractStatus,
    pub flags: BTreeSet<ContractFlag>,
}

/// One team's contracts page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamContracts {
    pub team: String,
    /// Calendar year the first listed season ends in.
    pub base_year: Option<i32>,
    /// Header label of the first year column, e.g. `2025-26`.
    pub base_year_label: Option<String>,
    pub players: Vec<ContractRow>,
}

impl TeamContracts {
    pub fn empty(team: &str) -> Self {
        Self {
            team: team.to_string(),
            base_year: None,
            base_year_label: None,
            players: Vec::new(),
        }
    }
}
