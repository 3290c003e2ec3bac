//! Duplicate detection by normalized title and date.
//!
//! The same announcement is often listed under slightly different titles:
//! a `[공지]` tag added on one board, a full-width space on another. The key
//! drops those differences but keeps the written date, so reposts of an
//! identical title on another day stay distinct.

use crate::notice::models::Notice;
use regex_lite::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::info;
use unicode_normalization::UnicodeNormalization;

use super::text::truncate_chars;

/// `[...]`, `{...}` and `<...>` groups. Parentheses are not matched.
static BRACKET_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]|\{[^}]*\}|<[^>]*>").unwrap());

/// Builds the dedup key `"{title}_{date}"` for a notice.
pub fn dedup_key(title: &str, date: &str) -> String {
    format!("{}_{}", normalize_title(title), normalize_date(date))
}

fn normalize_title(title: &str) -> String {
    let mut title = title.to_string();
    while BRACKET_GROUP.is_match(&title) {
        title = BRACKET_GROUP.replace_all(&title, "").into_owned();
    }

    let title = title.replace(['\u{3000}', '\u{a0}', '\u{feff}'], " ");
    let title: String = title.nfkd().collect::<String>().nfkc().collect();
    let title = title.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();

    title.chars().filter(|c| is_key_char(*c)).collect()
}

fn normalize_date(date: &str) -> String {
    date.chars().filter(|c| !matches!(c, '.' | '-' | '/' | ' ')).collect::<String>().to_lowercase()
}

/// Hangul syllables, lowercase ASCII letters, ASCII digits and parentheses.
fn is_key_char(c: char) -> bool {
    matches!(c, '\u{ac00}'..='\u{d7a3}' | 'a'..='z' | '0'..='9' | '(' | ')')
}

/// Ordered collection of admitted notices plus the keys already seen.
#[derive(Debug, Default)]
pub struct NoticeStore {
    notices: Vec<Notice>,
    keys: HashSet<String>,
}

impl NoticeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits a notice unless one with the same key is already stored.
    ///
    /// Returns `true` when the notice was appended.
    pub fn admit(&mut self, notice: Notice) -> bool {
        let key = dedup_key(&notice.title, &notice.written_date);
        if !self.keys.insert(key) {
            info!(
                "⛔️ 중복으로 저장 안함 : {} ({})",
                truncate_chars(&notice.title, 30),
                notice.written_date
            );
            return false;
        }

        self.notices.push(notice);
        true
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn len(&self) -> usize {
        self.notices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }

    /// Consumes the store, returning notices in admission order.
    pub fn into_notices(self) -> Vec<Notice> {
        self.notices
    }
}
