//! Department of Public Administration notice board.

use super::selectors::{admin, common};
use super::{first_match, normalize_base, resolve_url, ListPage, Site, SiteAdapter};
use crate::notice::images::has_extension;
use crate::notice::text::text_with_tables;
use crate::notice::{DetailPage, DetailRef, ImageRef, NO_BODY, NO_DATE};
use anyhow::Result;
use scraper::Html;

const BOARD_PATH: &str = "/padm/life/notice-department.do";
const PAGE_SIZE: u32 = 10;
const LAST_OFFSET: u32 = 7250;

/// Pinned announcements carry this marker in the title.
const PINNED_MARKER: &str = "공지";

/// Attachments are only downloaded when their file name has one of these.
const ATTACHMENT_EXTENSIONS: [&str; 3] = [".png", ".jpg", ".jpeg"];

pub struct AdminAdapter {
    base_url: String,
}

impl AdminAdapter {
    pub fn new() -> Self {
        Self::with_base_url(None)
    }

    /// Creates an adapter with an optional custom base URL (for testing).
    pub fn with_base_url(base_url: Option<String>) -> Self {
        Self { base_url: normalize_base(base_url, Site::Admin.base_url()) }
    }

    fn board_url(&self) -> String {
        format!("{}{}", self.base_url, BOARD_PATH)
    }

    /// Keeps only the query part of `href`; the board path is always the same.
    fn detail_url(&self, href: &str) -> String {
        match href.find('?') {
            Some(pos) => format!("{}{}", self.board_url(), &href[pos..]),
            None => self.board_url(),
        }
    }

    fn attachment_url(&self, detail_url: &str, href: &str) -> Option<String> {
        if href.starts_with('?') {
            Some(format!("{}{}", self.board_url(), href))
        } else {
            resolve_url(detail_url, href)
        }
    }
}

impl Default for AdminAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteAdapter for AdminAdapter {
    fn site(&self) -> Site {
        Site::Admin
    }

    fn pages(&self) -> Box<dyn Iterator<Item = ListPage> + Send + '_> {
        Box::new((0..LAST_OFFSET).step_by(PAGE_SIZE as usize).enumerate().map(move |(i, offset)| {
            ListPage {
                category: "학과공지",
                ordinal: i as u32 + 1,
                number: offset,
                url: format!("{}?article.offset={}", self.board_url(), offset),
            }
        }))
    }

    fn parse_list(&self, page: &ListPage, body: &str) -> Result<Vec<DetailRef>> {
        let document = Html::parse_document(body);
        let mut entries = Vec::new();

        for (index, cell) in document.select(&admin::TITLE_CELL).enumerate() {
            let Some(link) = cell.select(&common::LINK).next() else {
                continue;
            };
            let title = link.text().collect::<String>().trim().to_string();
            if title.contains(PINNED_MARKER) {
                continue;
            }

            let href = link.value().attr("href").unwrap_or("");
            let prefix = page.number + index as u32;
            entries.push(DetailRef::new(title, self.detail_url(href), prefix.to_string()));
        }

        Ok(entries)
    }

    fn parse_detail(&self, entry: &DetailRef, body: &str) -> Result<DetailPage> {
        let document = Html::parse_document(body);

        let text = first_match(document.root_element(), &*admin::CONTENT)
            .map_or_else(|| NO_BODY.to_string(), text_with_tables);

        let written_date = document
            .select(&admin::DATE)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| NO_DATE.to_string());

        let mut images = Vec::new();
        for attachment in document.select(&admin::ATTACHMENT) {
            let name = attachment.text().collect::<String>().trim().to_string();
            let href = attachment.value().attr("href").unwrap_or("");
            if href.is_empty() || !has_extension(&name, &ATTACHMENT_EXTENSIONS) {
                continue;
            }
            if let Some(url) = self.attachment_url(&entry.fetch_url, href) {
                images.push(ImageRef::named(url, name));
            }
        }

        Ok(DetailPage { body: text, written_date, images })
    }
}
