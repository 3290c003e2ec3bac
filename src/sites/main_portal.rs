//! Main university CMS boards (notices, events, contests, scholarships).
//!
//! Listing rows link to details through a JavaScript handler,
//! `fnSelectBbsNttView('bbsNo','nttNo','key')`, so the detail URL is rebuilt
//! from the handler arguments. The written date is not in a fixed element and
//! is searched for in the page text.

use super::selectors::{common, main_portal};
use super::{first_match, normalize_base, resolve_url, ListPage, Site, SiteAdapter, IMAGE_EXTENSIONS};
use crate::notice::images::has_extension;
use crate::notice::text::{document_text, element_text, extract_written_date};
use crate::notice::{DetailPage, DetailRef, ImageRef, NO_BODY, NO_DATE};
use anyhow::Result;
use regex_lite::Regex;
use scraper::Html;
use std::sync::LazyLock;
use tracing::trace;

static VIEW_HANDLER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"fnSelectBbsNttView\('(\d+)',\s*'(\d+)',\s*'(\d+)'\)").unwrap()
});

/// A board on the main CMS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub name: &'static str,
    pub bbs_no: &'static str,
    pub key: &'static str,
    pub last_page: u32,
}

pub const CATEGORIES: [Category; 4] = [
    Category { name: "공지사항", bbs_no: "81", key: "277", last_page: 1460 },
    Category { name: "행사안내", bbs_no: "38", key: "279", last_page: 250 },
    Category { name: "공모모집", bbs_no: "345", key: "1959", last_page: 320 },
    Category { name: "장학게시판", bbs_no: "34", key: "232", last_page: 250 },
];

pub struct MainPortalAdapter {
    base_url: String,
    categories: Vec<Category>,
}

impl MainPortalAdapter {
    pub fn new() -> Self {
        Self::with_base_url(None)
    }

    /// Creates an adapter with an optional custom base URL (for testing).
    pub fn with_base_url(base_url: Option<String>) -> Self {
        Self { base_url: normalize_base(base_url, Site::Main.base_url()), categories: CATEGORIES.to_vec() }
    }

    /// Replaces the boards to crawl.
    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.categories = categories;
        self
    }

    fn board_root(&self) -> String {
        format!("{}/www", self.base_url)
    }

    fn list_url(&self, category: &Category, page: u32) -> String {
        format!(
            "{}/selectBbsNttList.do?bbsNo={}&pageUnit=10&key={}&pageIndex={}",
            self.board_root(),
            category.bbs_no,
            category.key,
            page
        )
    }

    /// Turns a row href into a detail URL, or `None` if the row should be skipped.
    fn detail_url(&self, href: &str) -> Option<String> {
        if href.contains("fnSelectBbsNttView") {
            let caps = VIEW_HANDLER.captures(href)?;
            return Some(format!(
                "{}/selectBbsNttView.do?bbsNo={}&nttNo={}&key={}",
                self.board_root(),
                &caps[1],
                &caps[2],
                &caps[3]
            ));
        }

        if href.is_empty() {
            return None;
        }
        resolve_url(&format!("{}/", self.board_root()), href)
    }
}

impl Default for MainPortalAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteAdapter for MainPortalAdapter {
    fn site(&self) -> Site {
        Site::Main
    }

    fn pages(&self) -> Box<dyn Iterator<Item = ListPage> + Send + '_> {
        Box::new(self.categories.iter().flat_map(move |category| {
            (1..=category.last_page).map(move |page| ListPage {
                category: category.name,
                ordinal: page,
                number: page,
                url: self.list_url(category, page),
            })
        }))
    }

    fn parse_list(&self, page: &ListPage, body: &str) -> Result<Vec<DetailRef>> {
        let document = Html::parse_document(body);
        let prefix = self
            .categories
            .iter()
            .find(|c| c.name == page.category)
            .map_or(page.category, |c| c.bbs_no);

        let mut entries = Vec::new();
        for row in document.select(&main_portal::ROW) {
            if row.select(&main_portal::PINNED).next().is_some() {
                continue;
            }
            let Some(link) = row.select(&main_portal::TITLE_LINK).next() else {
                continue;
            };

            let title = link.text().collect::<String>().trim().to_string();
            let href = link.value().attr("href").unwrap_or("");
            let Some(url) = self.detail_url(href) else {
                trace!("Skipping row with unusable link: {}", href);
                continue;
            };

            entries.push(DetailRef::new(title, url, prefix));
        }

        Ok(entries)
    }

    fn parse_detail(&self, entry: &DetailRef, body: &str) -> Result<DetailPage> {
        let document = Html::parse_document(body);
        let root = document.root_element();
        let content = first_match(root, &*main_portal::CONTENT);

        let text = content.map_or_else(|| NO_BODY.to_string(), |el| element_text(el, "\n"));
        let written_date =
            extract_written_date(&document_text(&document)).unwrap_or_else(|| NO_DATE.to_string());

        let mut images: Vec<ImageRef> = Vec::new();
        let scopes = content.into_iter().chain(document.select(&main_portal::PHOTO_AREA).take(1));
        for scope in scopes {
            for img in scope.select(&common::IMAGE) {
                let Some(src) = img.value().attr("src") else {
                    continue;
                };
                if !has_extension(src, &IMAGE_EXTENSIONS) {
                    continue;
                }
                if let Some(url) = resolve_url(&entry.fetch_url, src) {
                    if !images.iter().any(|i| i.url == url) {
                        images.push(ImageRef::new(url));
                    }
                }
            }
        }

        Ok(DetailPage { body: text, written_date, images })
    }

    fn dedupe_links(&self) -> bool {
        true
    }
}
