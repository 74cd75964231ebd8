// src/bbr/roster.rs

use scraper::Html;

use super::locate::{locate_table, TableTarget};
use super::types::RosterRow;

pub const ROSTER_TABLE: TableTarget = TableTarget {
    wrapper_id: "all_roster",
    table_id: "roster",
};

pub const PLAYER_STAT: &str = "player";

pub fn parse_roster(html: &str) -> Vec<RosterRow> {
    let doc = Html::parse_document(html);
    let Some(table) = locate_table(&doc, &ROSTER_TABLE) else {
        return Vec::new();
    };
    table
        .rows(PLAYER_STAT)
        .into_iter()
        .map(|row| RosterRow {
            player_url: row.get(PLAYER_STAT).and_then(|c| c.profile_url()),
            fields: row.texts(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roster() {
        let html = r#"<div id="all_roster"><table id="roster">
            <thead><tr><th data-stat="number">No.</th><th data-stat="player">Player</th></tr></thead>
            <tbody>
            <tr><th data-stat="number">11</th><td data-stat="player"><a href="/players/h/holidjr01.html">Jrue Holiday</a></td>
                <td data-stat="pos">PG</td><td data-stat="college_name"><a href="/friv/colleges.fcgi?college=ucla">UCLA</a></td></tr>
            <tr><th data-stat="number">7</th><td data-stat="player">Unlinked Player</td><td data-stat="pos">G</td></tr>
            </tbody></table></div>"#;

        let rows = parse_roster(html);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].fields["player"], "Jrue Holiday");
        assert_eq!(rows[0].fields["number"], "11");
        assert_eq!(rows[0].fields["college_name"], "UCLA");
        assert_eq!(
            rows[0].player_url.as_deref(),
            Some("https://www.basketball-reference.com/players/h/holidjr01.html")
        );
        assert_eq!(rows[1].player_url, None);

        let json = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(json["player"], "Jrue Holiday");
        assert_eq!(json["pos"], "PG");
    }
}
