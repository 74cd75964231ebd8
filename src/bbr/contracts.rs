// src/bbr/contracts.rs

use scraper::Html;
use std::collections::BTreeSet;
use tracing::debug;

use super::locate::{locate_table, TableTarget};
use super::rows::RawRow;
use super::types::{ContractFlag, ContractRow, ContractStatus, TeamContracts};

pub const CONTRACTS_TABLE: TableTarget = TableTarget {
    wrapper_id: "all_contracts",
    table_id: "contracts",
};

pub const PLAYER_STAT: &str = "player";

/// Year columns in page order; `y1` is the current season.
pub const YEAR_COLUMNS: [&str; 6] = ["y1", "y2", "y3", "y4", "y5", "y6"];

pub const PLAYER_OPTION_CLASS: &str = "salary-pl";
pub const TEAM_OPTION_CLASS: &str = "salary-tm";

/// Status precedence: the first matching flag wins, in this order.
const STATUS_PRECEDENCE: [(ContractFlag, ContractStatus); 3] = [
    (ContractFlag::PlayerOption, ContractStatus::PlayerOption),
    (ContractFlag::TeamOption, ContractStatus::TeamOption),
    (ContractFlag::NonGuaranteed, ContractStatus::NonGuaranteed),
];

pub fn contract_status(flags: &BTreeSet<ContractFlag>) -> ContractStatus {
    STATUS_PRECEDENCE
        .iter()
        .find(|(flag, _)| flags.contains(flag))
        .map(|(_, status)| *status)
        .unwrap_or(ContractStatus::Guaranteed)
}

/// Derive a [`ContractRow`] from a contracts-table row. `None` without a player cell.
pub fn derive_contract(row: &RawRow) -> Option<ContractRow> {
    let player = row.get(PLAYER_STAT)?;

    let mut years_remaining = 0u8;
    let mut current_salary = None;
    let mut current_salary_text = None;
    let mut flags = BTreeSet::new();

    for (idx, stat) in YEAR_COLUMNS.iter().enumerate() {
        let Some(cell) = row.get(stat) else {
            continue;
        };
        if cell.is_populated() {
            years_remaining += 1;
            if idx == 0 {
                current_salary_text = Some(cell.text.clone());
                current_salary = cell.sort_key_int();
            }
        }
        if cell.has_class(PLAYER_OPTION_CLASS) {
            flags.insert(ContractFlag::PlayerOption);
        }
        if cell.has_class(TEAM_OPTION_CLASS) {
            flags.insert(ContractFlag::TeamOption);
        }
        if cell.emphasized {
            flags.insert(ContractFlag::NonGuaranteed);
        }
    }

    Some(ContractRow {
        player: player.text.clone(),
        player_url: player.profile_url(),
        player_id: player.player_id(),
        current_salary,
        current_salary_text,
        years_remaining,
        status: contract_status(&flags),
        flags,
    })
}

/// `2025-26` -> 2026, `2025-2026` -> 2026. Labels without a hyphen, or with a
/// suffix that is not two or four digits, give `None`.
pub fn parse_base_year(label: &str) -> Option<i32> {
    let (_, suffix) = label.rsplit_once('-')?;
    let suffix = suffix.trim();
    if !suffix.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let n: i32 = suffix.parse().ok()?;
    match suffix.len() {
        2 => Some(2000 + n),
        4 => Some(n),
        _ => None,
    }
}

/// Parse a team contracts page. A missing table yields an empty player list.
pub fn parse_contracts(html: &str, team: &str) -> TeamContracts {
    let doc = Html::parse_document(html);
    let Some(table) = locate_table(&doc, &CONTRACTS_TABLE) else {
        return TeamContracts::empty(team);
    };

    let base_year_label = table.header_text(YEAR_COLUMNS[0]);
    let base_year = base_year_label.as_deref().and_then(parse_base_year);
    let players: Vec<ContractRow> = table
        .rows(PLAYER_STAT)
        .iter()
        .filter_map(derive_contract)
        .collect();
    debug!(team, count = players.len(), ?base_year, "parsed contracts");

    TeamContracts {
        team: team.to_string(),
        base_year,
        base_year_label,
        players,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbr::rows::Cell;

    fn cell(text: &str, csk: Option<&str>, classes: &[&str], emphasized: bool) -> Cell {
        Cell {
            text: text.to_string(),
            sort_key: csk.map(str::to_string),
            classes: classes.iter().map(|c| c.to_string()).collect(),
            emphasized,
            ..Cell::default()
        }
    }

    fn row(cells: Vec<(&str, Cell)>) -> RawRow {
        let mut r = RawRow::default();
        r.cells.insert(
            PLAYER_STAT.to_string(),
            Cell {
                text: "Jaylen Brown".to_string(),
                href: Some("/players/b/brownja02.html".to_string()),
                ..Cell::default()
            },
        );
        for (k, c) in cells {
            r.cells.insert(k.to_string(), c);
        }
        r
    }

    #[test]
    fn test_no_populated_years_is_guaranteed_zero() {
        let r = row(vec![
            ("y1", cell("", None, &[], false)),
            ("y2", cell("", None, &[], false)),
        ]);
        let c = derive_contract(&r).unwrap();
        assert_eq!(c.years_remaining, 0);
        assert_eq!(c.status, ContractStatus::Guaranteed);
        assert_eq!(c.current_salary, None);
        assert_eq!(c.current_salary_text, None);
        assert!(c.flags.is_empty());
    }

    #[test]
    fn test_years_remaining_counts_text_or_sort_key() {
        let r = row(vec![
            ("y1", cell("$53,126,090", Some("53126090"), &[], false)),
            ("y2", cell("", Some("57126090"), &[], false)),
            ("y3", cell("$61,126,090", None, &[], false)),
            ("y4", cell("", None, &[], false)),
        ]);
        let c = derive_contract(&r).unwrap();
        assert_eq!(c.years_remaining, 3);
        assert_eq!(c.current_salary, Some(53_126_090));
        assert_eq!(c.current_salary_text.as_deref(), Some("$53,126,090"));
        assert_eq!(c.player_id.as_deref(), Some("brownja02"));
    }

    #[test]
    fn test_player_option_wins_over_everything() {
        let r = row(vec![
            ("y1", cell("$1", Some("1"), &[], true)),
            ("y2", cell("$2", Some("2"), &[TEAM_OPTION_CLASS], false)),
            ("y3", cell("$3", Some("3"), &[PLAYER_OPTION_CLASS], false)),
        ]);
        let c = derive_contract(&r).unwrap();
        assert_eq!(c.status, ContractStatus::PlayerOption);
        assert_eq!(c.flags.len(), 3);
    }

    #[test]
    fn test_precedence_order() {
        let set = |flags: &[ContractFlag]| flags.iter().copied().collect::<BTreeSet<_>>();
        assert_eq!(
            contract_status(&set(&[ContractFlag::TeamOption, ContractFlag::NonGuaranteed])),
            ContractStatus::TeamOption
        );
        assert_eq!(
            contract_status(&set(&[ContractFlag::NonGuaranteed])),
            ContractStatus::NonGuaranteed
        );
        assert_eq!(contract_status(&set(&[])), ContractStatus::Guaranteed);
    }

    #[test]
    fn test_flags_recorded_once() {
        let r = row(vec![
            ("y1", cell("$1", Some("1"), &[PLAYER_OPTION_CLASS], true)),
            ("y2", cell("$2", Some("2"), &[PLAYER_OPTION_CLASS], true)),
        ]);
        let c = derive_contract(&r).unwrap();
        assert_eq!(
            c.flags.into_iter().collect::<Vec<_>>(),
            vec![ContractFlag::PlayerOption, ContractFlag::NonGuaranteed]
        );
    }

    #[test]
    fn test_bad_sort_key_keeps_text() {
        let r = row(vec![("y1", cell("$12,000,000", Some("12M"), &[], false))]);
        let c = derive_contract(&r).unwrap();
        assert_eq!(c.years_remaining, 1);
        assert_eq!(c.current_salary, None);
        assert_eq!(c.current_salary_text.as_deref(), Some("$12,000,000"));
    }

    #[test]
    fn test_base_year_parsing() {
        assert_eq!(parse_base_year("2025-26"), Some(2026));
        assert_eq!(parse_base_year("2025-2026"), Some(2026));
        assert_eq!(parse_base_year("2026"), None);
        assert_eq!(parse_base_year("2025-xx"), None);
        assert_eq!(parse_base_year("2025-"), None);
    }

    #[test]
    fn test_parse_contracts_page() {
        let html = r#"<html><body>
        <div id="all_contracts" class="table_wrapper">
        <!--
        <table id="contracts"><thead>
          <tr class="over_header"><th></th><th colspan="3">Salary</th></tr>
          <tr><th data-stat="player">Player</th><th data-stat="age_today">Age</th>
              <th data-stat="y1">2025-26</th><th data-stat="y2">2026-27</th><th data-stat="y3">2027-28</th></tr>
        </thead><tbody>
          <tr><th data-stat="player" data-append-csv="tatumja01"><a href="/players/t/tatumja01.html">Jayson Tatum</a></th>
              <td data-stat="age_today">27</td>
              <td data-stat="y1" csk="54126450">$54,126,450</td>
              <td data-stat="y2" csk="58456566">$58,456,566</td>
              <td data-stat="y3" class="salary-pl" csk="62786682">$62,786,682</td></tr>
          <tr class="thead"><th data-stat="player">Player</th></tr>
          <tr><th data-stat="player"><a href="/players/w/walshjo01.html">Jordan Walsh</a></th>
              <td data-stat="age_today">21</td>
              <td data-stat="y1" csk="2221677"><em>$2,221,677</em></td>
              <td data-stat="y2" class="salary-tm" csk="2349578">$2,349,578</td>
              <td data-stat="y3"></td></tr>
        </tbody></table>
        -->
        </div></body></html>"#;

        let tc = parse_contracts(html, "BOS");
        assert_eq!(tc.team, "BOS");
        assert_eq!(tc.base_year, Some(2026));
        assert_eq!(tc.base_year_label.as_deref(), Some("2025-26"));
        assert_eq!(tc.players.len(), 2);

        let tatum = &tc.players[0];
        assert_eq!(tatum.player, "Jayson Tatum");
        assert_eq!(tatum.years_remaining, 3);
        assert_eq!(tatum.status, ContractStatus::PlayerOption);
        assert_eq!(tatum.current_salary, Some(54_126_450));
        assert_eq!(tatum.player_id.as_deref(), Some("tatumja01"));

        let walsh = &tc.players[1];
        assert_eq!(walsh.years_remaining, 2);
        assert_eq!(walsh.status, ContractStatus::TeamOption);
        assert_eq!(walsh.player_id.as_deref(), Some("walshjo01"));
    }

    #[test]
    fn test_parse_contracts_without_table() {
        let tc = parse_contracts("<html><body><p>Not here</p></body></html>", "UTA");
        assert_eq!(tc, TeamContracts::empty("UTA"));
    }
}
