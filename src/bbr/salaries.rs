// src/bbr/salaries.rs

use scraper::Html;
use tracing::debug;

use super::locate::{locate_table, TableTarget};
use super::rows::RawRow;
use super::types::SalaryRow;

pub const SALARIES_TABLE: TableTarget = TableTarget {
    wrapper_id: "all_salaries2",
    table_id: "salaries2",
};

pub const PLAYER_STAT: &str = "player";
pub const SALARY_STAT: &str = "salary";

pub fn derive_salary(row: &RawRow, team: &str, year: i32) -> Option<SalaryRow> {
    let player = row.get(PLAYER_STAT)?;
    let salary = row.get(SALARY_STAT);
    Some(SalaryRow {
        player: player.text.clone(),
        player_url: player.profile_url(),
        player_id: player.player_id(),
        salary: salary.and_then(|c| c.sort_key_int()),
        salary_text: salary.map(|c| c.text.clone()).unwrap_or_default(),
        team: team.to_string(),
        year,
    })
}

/// Parse the salaries table of a team season page. No table, no rows.
pub fn parse_salaries(html: &str, team: &str, year: i32) -> Vec<SalaryRow> {
    let doc = Html::parse_document(html);
    let Some(table) = locate_table(&doc, &SALARIES_TABLE) else {
        return Vec::new();
    };
    let rows: Vec<SalaryRow> = table
        .rows(PLAYER_STAT)
        .iter()
        .filter_map(|r| derive_salary(r, team, year))
        .collect();
    debug!(team, year, count = rows.len(), "parsed salaries");
    rows
}
