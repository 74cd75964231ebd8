// src/bbr/rows.rs

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Selector};
use std::collections::BTreeMap;
use tracing::trace;
use url::Url;

use crate::config::BBR_BASE_URL;

static BODY_ROWS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tbody > tr").expect("body row selector"));
static STAT_CELLS: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("th[data-stat], td[data-stat]").expect("stat cell selector")
});
static EMPHASIS: Lazy<Selector> = Lazy::new(|| Selector::parse("em, i").expect("emphasis selector"));
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").expect("link selector"));
static PLAYER_HREF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/players/[a-z]/([A-Za-z0-9]+)\.html").expect("player href regex"));

/// Row classes the site uses for header rows repeated inside `tbody`.
const HEADER_ROW_CLASSES: &[&str] = &["thead", "over_header"];

/// One table cell, keyed in its row by the `data-stat` attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    /// `csk` attribute: the machine-sortable value, if non-empty.
    pub sort_key: Option<String>,
    pub classes: Vec<String>,
    /// An `<em>` or `<i>` sits somewhere inside the cell.
    pub emphasized: bool,
    pub href: Option<String>,
    /// `data-append-csv`, which carries the player slug on player cells.
    pub append_csv: Option<String>,
}

impl Cell {
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn is_populated(&self) -> bool {
        !self.text.is_empty() || self.sort_key.is_some()
    }

    /// Sort key as an integer; malformed or missing keys are `None`.
    pub fn sort_key_int(&self) -> Option<i64> {
        self.sort_key.as_deref().and_then(|s| s.trim().parse().ok())
    }

    pub fn profile_url(&self) -> Option<String> {
        profile_url(self.href.as_deref()?)
    }

    pub fn player_id(&self) -> Option<String> {
        self.append_csv
            .clone()
            .or_else(|| self.href.as_deref().and_then(player_id_from_href))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub cells: BTreeMap<String, Cell>,
}

impl RawRow {
    pub fn get(&self, stat: &str) -> Option<&Cell> {
        self.cells.get(stat)
    }

    pub fn text(&self, stat: &str) -> Option<&str> {
        self.get(stat).map(|c| c.text.as_str())
    }

    /// Plain `data-stat -> text` view of the row.
    pub fn texts(&self) -> BTreeMap<String, String> {
        self.cells
            .iter()
            .map(|(k, c)| (k.clone(), c.text.clone()))
            .collect()
    }
}

/// Text fragments trimmed individually and joined without separators.
pub fn cell_text(el: ElementRef<'_>) -> String {
    el.text().map(str::trim).collect()
}

fn is_header_row(tr: ElementRef<'_>) -> bool {
    tr.value()
        .classes()
        .any(|c| HEADER_ROW_CLASSES.contains(&c))
}

fn non_empty_attr(el: ElementRef<'_>, name: &str) -> Option<String> {
    el.value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn read_cell(el: ElementRef<'_>) -> Cell {
    Cell {
        text: cell_text(el),
        sort_key: non_empty_attr(el, "csk"),
        classes: el.value().classes().map(str::to_string).collect(),
        emphasized: el.select(&EMPHASIS).next().is_some(),
        href: el
            .select(&LINK)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(str::to_string),
        append_csv: non_empty_attr(el, "data-append-csv"),
    }
}

/// Convert every body row of `table` into a [`RawRow`]. Header-role rows and
/// rows without a `key` cell (spacers, repeated headers) are skipped.
pub fn extract_rows(table: ElementRef<'_>, key: &str) -> Vec<RawRow> {
    let mut rows = Vec::new();
    for tr in table.select(&BODY_ROWS) {
        if is_header_row(tr) {
            trace!("skipping header row");
            continue;
        }
        let cells: BTreeMap<String, Cell> = tr
            .select(&STAT_CELLS)
            .filter_map(|el| Some((el.value().attr("data-stat")?.to_string(), read_cell(el))))
            .collect();
        if !cells.contains_key(key) {
            trace!(key, "skipping row without key cell");
            continue;
        }
        rows.push(RawRow { cells });
    }
    rows
}

/// Absolute profile URL for a site-relative player link.
pub fn profile_url(href: &str) -> Option<String> {
    let base = Url::parse(BBR_BASE_URL).ok()?;
    base.join(href).ok().map(|u| u.to_string())
}

/// `/players/t/tatumja01.html` -> `tatumja01`.
pub fn player_id_from_href(href: &str) -> Option<String> {
    PLAYER_HREF
        .captures(href)
        .map(|caps| caps[1].to_string())
}
