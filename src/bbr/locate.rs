// src/bbr/locate.rs

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::debug;

use super::rows::{cell_text, extract_rows, RawRow};

static TABLE: Lazy<Selector> = Lazy::new(|| Selector::parse("table").expect("table selector"));

/// Where a table lives on a page: its own id, plus the id of the wrapper
/// element the site renders around it (and sometimes comments it out inside).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableTarget {
    pub wrapper_id: &'static str,
    pub table_id: &'static str,
}

/// Lookup strategies, tried in `LOOKUP_ORDER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// `table#id` inside the wrapper.
    Direct,
    /// `table#id` inside an HTML comment somewhere under the wrapper.
    InComment,
    /// `table#id` anywhere in the document.
    Global,
}

pub const LOOKUP_ORDER: [Lookup; 3] = [Lookup::Direct, Lookup::InComment, Lookup::Global];

impl Lookup {
    fn find(self, doc: &Html, target: &TableTarget) -> Option<LocatedTable> {
        let table_sel = id_selector("table", target.table_id)?;
        match self {
            Lookup::Direct => {
                let wrapper = find_wrapper(doc, target)?;
                let table = wrapper.select(&table_sel).next()?;
                Some(LocatedTable::from_element(table, self))
            }
            Lookup::InComment => {
                let wrapper = find_wrapper(doc, target)?;
                wrapper.descendants().find_map(|node| match node.value() {
                    Node::Comment(c) => {
                        let inner = Html::parse_fragment(&c.comment);
                        let table = inner.select(&table_sel).next()?;
                        Some(LocatedTable::from_element(table, self))
                    }
                    _ => None,
                })
            }
            Lookup::Global => {
                let table = doc.select(&table_sel).next()?;
                Some(LocatedTable::from_element(table, self))
            }
        }
    }
}

fn id_selector(tag: &str, id: &str) -> Option<Selector> {
    Selector::parse(&format!("{}#{}", tag, id)).ok()
}

fn find_wrapper<'a>(doc: &'a Html, target: &TableTarget) -> Option<ElementRef<'a>> {
    let sel = Selector::parse(&format!("#{}", target.wrapper_id)).ok()?;
    doc.select(&sel).next()
}

/// A table pulled out of a page, owned independently of the page it came from.
#[derive(Debug)]
pub struct LocatedTable {
    fragment: Html,
    pub found_by: Lookup,
}

impl LocatedTable {
    fn from_element(table: ElementRef<'_>, found_by: Lookup) -> Self {
        Self {
            fragment: Html::parse_fragment(&table.html()),
            found_by,
        }
    }

    fn table(&self) -> Option<ElementRef<'_>> {
        self.fragment.select(&TABLE).next()
    }

    /// Body rows that carry a `key` cell; see [`extract_rows`].
    pub fn rows(&self, key: &str) -> Vec<RawRow> {
        self.table()
            .map(|t| extract_rows(t, key))
            .unwrap_or_default()
    }

    /// Visible text of the `thead` header cell for column `stat`.
    pub fn header_text(&self, stat: &str) -> Option<String> {
        let sel = Selector::parse(&format!(r#"thead th[data-stat="{}"]"#, stat)).ok()?;
        let th = self.table()?.select(&sel).next()?;
        Some(cell_text(th))
    }
}

/// First strategy in `LOOKUP_ORDER` that finds the table wins. `None` is an
/// ordinary outcome; callers turn it into an empty result.
pub fn locate_table(doc: &Html, target: &TableTarget) -> Option<LocatedTable> {
    let found = LOOKUP_ORDER.iter().find_map(|l| l.find(doc, target));
    match &found {
        Some(t) => debug!(table = target.table_id, found_by = ?t.found_by, "located table"),
        None => debug!(table = target.table_id, "table not found"),
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    const TARGET: TableTarget = TableTarget {
        wrapper_id: "all_salaries2",
        table_id: "salaries2",
    };

    const TABLE_HTML: &str = r#"<table id="salaries2"><thead><tr><th data-stat="player">Player</th></tr></thead>
        <tbody><tr><td data-stat="player">Jayson Tatum</td></tr></tbody></table>"#;

    #[test]
    fn test_direct_table_in_wrapper() {
        let html = format!(r#"<html><body><div id="all_salaries2">{}</div></body></html>"#, TABLE_HTML);
        let doc = Html::parse_document(&html);
        let t = locate_table(&doc, &TARGET).unwrap();
        assert_eq!(t.found_by, Lookup::Direct);
        assert_eq!(t.rows("player").len(), 1);
    }

    #[test]
    fn test_table_only_inside_comment() {
        let html = format!(
            r#"<html><body><div id="all_salaries2"><div class="placeholder"></div>
            <!--
            <div class="table_container">{}</div>
            --></div></body></html>"#,
            TABLE_HTML
        );
        let doc = Html::parse_document(&html);
        let t = locate_table(&doc, &TARGET).unwrap();
        assert_eq!(t.found_by, Lookup::InComment);
        let rows = t.rows("player");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text("player"), Some("Jayson Tatum"));
    }

    #[test]
    fn test_global_fallback_without_wrapper() {
        let html = format!(r#"<html><body><div id="elsewhere">{}</div></body></html>"#, TABLE_HTML);
        let doc = Html::parse_document(&html);
        let t = locate_table(&doc, &TARGET).unwrap();
        assert_eq!(t.found_by, Lookup::Global);
    }

    #[test]
    fn test_commented_table_beats_live_table_elsewhere() {
        let html = r#"<html><body>
            <div id="all_salaries2"><!--
            <table id="salaries2"><tbody><tr><td data-stat="player">Jayson Tatum</td></tr></tbody></table>
            --></div>
            <div id="sidebar"><table id="salaries2"><tbody>
            <tr><td data-stat="player">Decoy One</td></tr>
            <tr><td data-stat="player">Decoy Two</td></tr>
            </tbody></table></div>
            </body></html>"#;
        let doc = Html::parse_document(html);
        let t = locate_table(&doc, &TARGET).unwrap();
        assert_eq!(t.found_by, Lookup::InComment);
        let rows = t.rows("player");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text("player"), Some("Jayson Tatum"));
    }

    #[test]
    fn test_missing_table_is_none() {
        let html = r#"<html><body><div id="all_salaries2"><!-- nothing to see --></div>
            <table id="roster"></table></body></html>"#;
        let doc = Html::parse_document(html);
        assert!(locate_table(&doc, &TARGET).is_none());
    }

    #[test]
    fn test_header_text() {
        let html = r#"<div id="all_contracts"><table id="contracts"><thead>
            <tr class="over_header"><th colspan="2">Salary</th></tr>
            <tr><th data-stat="player">Player</th><th data-stat="y1">2025-26</th></tr>
            </thead><tbody></tbody></table></div>"#;
        let doc = Html::parse_document(html);
        let target = TableTarget {
            wrapper_id: "all_contracts",
            table_id: "contracts",
        };
        let t = locate_table(&doc, &target).unwrap();
        assert_eq!(t.header_text("y1").as_deref(), Some("2025-26"));
        assert_eq!(t.header_text("y7"), None);
    }
}
