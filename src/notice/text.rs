//! Text extraction helpers shared by the site adapters.

use regex_lite::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    // `\s` is ASCII-only here; non-breaking spaces are listed explicitly
    Regex::new(r"20\d{2}[.\-/년\s\x{a0}]+[01]?\d[.\-/월\s\x{a0}]+[0-3]?\d[일\s\x{a0}]*").unwrap()
});

static TABLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").unwrap());
static TABLE_ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static TABLE_CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td, th").unwrap());

/// Joins the trimmed, non-empty text nodes under `element` with `separator`.
pub fn element_text(element: ElementRef, separator: &str) -> String {
    element.text().map(str::trim).filter(|t| !t.is_empty()).collect::<Vec<_>>().join(separator)
}

/// Visible text of a whole document, text nodes joined by a single space.
///
/// Script and style contents are skipped.
pub fn document_text(document: &Html) -> String {
    visible_text(document.root_element(), false).join(" ")
}

/// Renders tables as `cell | cell` rows, followed by the remaining text.
///
/// Only the outermost tables are rendered; their text is not repeated in the
/// trailing section.
pub fn text_with_tables(element: ElementRef) -> String {
    let mut output = String::new();

    for table in element.select(&TABLE) {
        let nested = table
            .ancestors()
            .take_while(|a| a.id() != element.id())
            .filter_map(ElementRef::wrap)
            .any(|a| a.value().name() == "table");
        if nested {
            continue;
        }
        output.push_str(&table_text(table));
        output.push('\n');
    }

    for part in visible_text(element, true) {
        output.push_str(part);
        output.push('\n');
    }

    output.trim().to_string()
}

fn table_text(table: ElementRef) -> String {
    table
        .select(&TABLE_ROW)
        .filter(|row| row.select(&TABLE_CELL).next().is_some())
        .map(|row| {
            row.select(&TABLE_CELL)
                .map(|cell| element_text(cell, ""))
                .filter(|text| !text.is_empty())
                .collect::<Vec<_>>()
                .join(" | ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn visible_text(element: ElementRef<'_>, skip_tables: bool) -> Vec<&str> {
    element
        .descendants()
        .filter_map(|node| {
            let trimmed = node.value().as_text()?.trim();
            if trimmed.is_empty() {
                return None;
            }
            let hidden = node
                .ancestors()
                .take_while(|a| a.id() != element.id())
                .filter_map(ElementRef::wrap)
                .any(|a| {
                    let name = a.value().name();
                    name == "script" || name == "style" || (skip_tables && name == "table")
                });
            (!hidden).then_some(trimmed)
        })
        .collect()
}

/// Finds the first date-shaped digit group in `text`.
///
/// `2024년 3월 5일`, `2024-03-05` and `2024. 3. 5.` all come back
/// dot-separated without surrounding dots.
pub fn extract_written_date(text: &str) -> Option<String> {
    let found = DATE_PATTERN.find(text)?;
    let raw: String = found
        .as_str()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '일')
        .map(|c| if c == '년' || c == '월' { '.' } else { c })
        .collect();

    Some(raw.trim_matches('.').to_string())
}

/// Returns at most `max` characters of `s`, for log lines.
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
