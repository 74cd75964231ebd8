// src/report.rs

use serde_json::{json, Map, Value};
use std::{collections::BTreeMap, path::PathBuf};

use crate::bbr::{SalaryRow, TeamContracts};

/// Summary printed for the contracts task. The page's own base year wins over
/// the year resolved from config.
pub fn contracts_summary(team: &str, resolved_year: i32, contracts: &TeamContracts) -> Value {
    let salaries: Map<String, Value> = contracts
        .players
        .iter()
        .map(|p| {
            (
                p.player.clone(),
                json!({
                    "salary": p.current_salary,
                    "salary_text": p.current_salary_text.clone().unwrap_or_default(),
                    "years_remaining": p.years_remaining,
                    "status": p.status.as_str(),
                }),
            )
        })
        .collect();
    json!({
        "team": team,
        "year": contracts.base_year.unwrap_or(resolved_year),
        "season": contracts.base_year_label,
        "count": contracts.players.len(),
        "salaries": salaries,
    })
}

pub fn salaries_summary(team: &str, year: i32, rows: &[SalaryRow]) -> Value {
    let salaries: Map<String, Value> = rows
        .iter()
        .map(|r| {
            (
                r.player.clone(),
                json!({ "salary": r.salary, "salary_text": r.salary_text }),
            )
        })
        .collect();
    json!({
        "team": team,
        "year": year,
        "count": rows.len(),
        "salaries": salaries,
    })
}

/// `seasons` maps season label to the number of rows kept for it.
pub fn player_stats_summary(seasons: &BTreeMap<String, usize>, written: &[PathBuf]) -> Value {
    json!({
        "task": "player_stats",
        "seasons": seasons,
        "written": written
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbr::{ContractFlag, ContractRow, ContractStatus};
    use std::collections::BTreeSet;

    fn contract(player: &str, salary: Option<i64>, status: ContractStatus) -> ContractRow {
        ContractRow {
            player: player.to_string(),
            player_url: None,
            player_id: None,
            current_salary: salary,
            current_salary_text: salary.map(|s| format!("${}", s)),
            years_remaining: 2,
            status,
            flags: BTreeSet::from([ContractFlag::TeamOption]),
        }
    }

    #[test]
    fn test_contracts_summary_prefers_page_year() {
        let contracts = TeamContracts {
            team: "BOS".into(),
            base_year: Some(2026),
            base_year_label: Some("2025-26".into()),
            players: vec![
                contract("Jayson Tatum", Some(54126450), ContractStatus::Guaranteed),
                contract("Jordan Walsh", None, ContractStatus::TeamOption),
            ],
        };
        let v = contracts_summary("BOS", 2025, &contracts);
        assert_eq!(v["year"], 2026);
        assert_eq!(v["season"], "2025-26");
        assert_eq!(v["count"], 2);
        assert_eq!(v["salaries"]["Jayson Tatum"]["salary"], 54126450);
        assert_eq!(v["salaries"]["Jordan Walsh"]["salary"], Value::Null);
        assert_eq!(v["salaries"]["Jordan Walsh"]["salary_text"], "");
        assert_eq!(v["salaries"]["Jordan Walsh"]["status"], "team_option");
    }

    #[test]
    fn test_summary_players_keep_page_order() {
        let contracts = TeamContracts {
            team: "BOS".into(),
            base_year: Some(2026),
            base_year_label: Some("2025-26".into()),
            players: vec![
                contract("Jayson Tatum", Some(54126450), ContractStatus::Guaranteed),
                contract("Derrick White", Some(28100000), ContractStatus::Guaranteed),
                contract("Al Horford", None, ContractStatus::TeamOption),
            ],
        };
        let v = contracts_summary("BOS", 2026, &contracts);
        let names: Vec<&str> = v["salaries"]
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(names, vec!["Jayson Tatum", "Derrick White", "Al Horford"]);
    }

    #[test]
    fn test_contracts_summary_falls_back_to_resolved_year() {
        let v = contracts_summary("NYK", 2027, &TeamContracts::empty("NYK"));
        assert_eq!(v["year"], 2027);
        assert_eq!(v["season"], Value::Null);
        assert_eq!(v["count"], 0);
        assert_eq!(v["salaries"], json!({}));
    }

    #[test]
    fn test_salaries_summary() {
        let rows = vec![SalaryRow {
            player: "Trae Young".into(),
            player_url: None,
            player_id: Some("youngtr01".into()),
            salary: Some(46000000),
            salary_text: "$46,000,000".into(),
            team: "ATL".into(),
            year: 2026,
        }];
        let v = salaries_summary("ATL", 2026, &rows);
        assert_eq!(
            v,
            json!({
                "team": "ATL",
                "year": 2026,
                "count": 1,
                "salaries": {"Trae Young": {"salary": 46000000, "salary_text": "$46,000,000"}},
            })
        );
    }

    #[test]
    fn test_player_stats_summary() {
        let seasons = BTreeMap::from([("2023-24".to_string(), 410), ("2024-25".to_string(), 455)]);
        let v = player_stats_summary(&seasons, &[PathBuf::from("data/raw/nba_api/player_stats_2024-25.jsonl")]);
        assert_eq!(v["task"], "player_stats");
        assert_eq!(v["seasons"]["2024-25"], 455);
        assert_eq!(v["written"][0], "data/raw/nba_api/player_stats_2024-25.jsonl");
    }
}
