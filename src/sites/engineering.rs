//! Engineering Education Innovation Center bulletin.
//!
//! The written date is only shown on the listing, so it travels with the
//! [`DetailRef`] into the detail step.

use super::selectors::{common, engineering};
use super::{first_match, normalize_base, resolve_url, ListPage, Site, SiteAdapter};
use crate::notice::text::element_text;
use crate::notice::{DetailPage, DetailRef, ImageRef, NO_BODY, NO_DATE};
use anyhow::Result;
use scraper::Html;
use tracing::trace;

const LAST_PAGE: u32 = 19;

pub struct EngineeringAdapter {
    base_url: String,
}

impl EngineeringAdapter {
    pub fn new() -> Self {
        Self::with_base_url(None)
    }

    /// Creates an adapter with an optional custom base URL (for testing).
    pub fn with_base_url(base_url: Option<String>) -> Self {
        Self { base_url: normalize_base(base_url, Site::Engineering.base_url()) }
    }

    fn list_url(&self, page: u32) -> String {
        format!("{}/index.php?mt=page&mp=5_1&mm=oxbbs&oxid=1&cpage={}", self.base_url, page)
    }
}

impl Default for EngineeringAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteAdapter for EngineeringAdapter {
    fn site(&self) -> Site {
        Site::Engineering
    }

    fn pages(&self) -> Box<dyn Iterator<Item = ListPage> + Send + '_> {
        Box::new((1..=LAST_PAGE).map(move |page| ListPage {
            category: "공지사항",
            ordinal: page,
            number: page,
            url: self.list_url(page),
        }))
    }

    fn parse_list(&self, page: &ListPage, body: &str) -> Result<Vec<DetailRef>> {
        let document = Html::parse_document(body);
        let mut entries = Vec::new();

        for row in document.select(&engineering::ROW) {
            let Some(link) = row.select(&engineering::TITLE_LINK).next() else {
                continue;
            };
            let title = link.text().collect::<String>().trim().to_string();
            let Some(url) = link.value().attr("href").and_then(|href| resolve_url(&self.base_url, href))
            else {
                trace!("Skipping row without a link: {}", title);
                continue;
            };

            let listed_date = row
                .select(&engineering::DATE)
                .next()
                .map(|cell| cell.text().collect::<String>().trim().replace('-', "."))
                .filter(|d| !d.is_empty());

            let mut entry = DetailRef::new(title, url, page.number.to_string());
            entry.listed_date = listed_date;
            entries.push(entry);
        }

        Ok(entries)
    }

    fn parse_detail(&self, entry: &DetailRef, body: &str) -> Result<DetailPage> {
        let document = Html::parse_document(body);
        let content = first_match(document.root_element(), &*engineering::CONTENT);

        let text = content.map_or_else(|| NO_BODY.to_string(), |el| element_text(el, "\n"));
        let written_date = entry.listed_date.clone().unwrap_or_else(|| NO_DATE.to_string());

        let images = content
            .into_iter()
            .flat_map(|el| el.select(&common::IMAGE))
            .filter_map(|img| img.value().attr("src"))
            .filter(|src| !src.is_empty() && !src.starts_with("data:image"))
            .filter_map(|src| resolve_url(&entry.fetch_url, src))
            .map(ImageRef::new)
            .collect();

        Ok(DetailPage { body: text, written_date, images })
    }
}
