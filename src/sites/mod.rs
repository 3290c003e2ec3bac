//! Site adapters: one per notice board family.
//!
//! Adapters only describe a site. They list the pages to visit and turn page
//! bodies into [`DetailRef`]s and [`DetailPage`]s; fetching, throttling, image
//! downloads, and deduplication live in [`crate::crawler`].

pub mod admin;
pub mod engineering;
pub mod library;
pub mod main_portal;
pub mod selectors;

use crate::notice::{DetailPage, DetailRef};
use anyhow::Result;
use scraper::{ElementRef, Selector};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

pub use admin::AdminAdapter;
pub use engineering::EngineeringAdapter;
pub use library::LibraryAdapter;
pub use main_portal::MainPortalAdapter;

/// Raster image extensions accepted from inline `<img>` tags.
pub const IMAGE_EXTENSIONS: [&str; 4] = [".png", ".jpg", ".jpeg", ".gif"];

/// The supported notice boards, in crawl order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Site {
    Main,
    Library,
    Admin,
    Engineering,
}

impl Site {
    /// Human-readable board name used in log lines.
    pub fn label(&self) -> &'static str {
        match self {
            Site::Main => "메인페이지",
            Site::Library => "도서관",
            Site::Admin => "행정학과",
            Site::Engineering => "공학교육혁신센터",
        }
    }

    /// Image subdirectory for this site.
    pub fn image_dir(&self) -> &'static str {
        match self {
            Site::Main => "main",
            Site::Library => "library",
            Site::Admin => "admin",
            Site::Engineering => "engineering",
        }
    }

    /// Production base URL.
    pub fn base_url(&self) -> &'static str {
        match self {
            Site::Main => "https://www.kangwon.ac.kr",
            Site::Library => "https://library.kangwon.ac.kr",
            Site::Admin => "https://padm.kangwon.ac.kr",
            Site::Engineering => "https://icee.kangwon.ac.kr",
        }
    }

    /// Returns all sites in crawl order.
    pub fn all() -> &'static [Site] {
        &[Site::Main, Site::Library, Site::Admin, Site::Engineering]
    }

    /// Builds the production adapter for this site.
    pub fn adapter(&self) -> Box<dyn SiteAdapter> {
        match self {
            Site::Main => Box::new(MainPortalAdapter::new()),
            Site::Library => Box::new(LibraryAdapter::new()),
            Site::Admin => Box::new(AdminAdapter::new()),
            Site::Engineering => Box::new(EngineeringAdapter::new()),
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.image_dir())
    }
}

impl FromStr for Site {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "main" => Ok(Site::Main),
            "library" => Ok(Site::Library),
            "admin" => Ok(Site::Admin),
            "engineering" => Ok(Site::Engineering),
            _ => Err(format!("Unknown site: {}. Use: main, library, admin, engineering", s)),
        }
    }
}

/// One listing page to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPage {
    /// Board or category name for log lines
    pub category: &'static str,
    /// 1-based position of this page within its category
    pub ordinal: u32,
    /// Page number or offset as the site counts it
    pub number: u32,
    pub url: String,
}

/// What to do when a listing page cannot be fetched or parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFailure {
    /// Log and move on to the next page
    Skip,
    /// Log and stop this site
    Stop,
}

/// Site-specific extraction of notices from listing and detail pages.
pub trait SiteAdapter: Send + Sync {
    fn site(&self) -> Site;

    /// Listing pages in crawl order.
    fn pages(&self) -> Box<dyn Iterator<Item = ListPage> + Send + '_>;

    /// Extracts detail references from a listing page body.
    fn parse_list(&self, page: &ListPage, body: &str) -> Result<Vec<DetailRef>>;

    /// Extracts body, date, and image links from a detail page body.
    fn parse_detail(&self, entry: &DetailRef, body: &str) -> Result<DetailPage>;

    fn list_failure(&self) -> ListFailure {
        ListFailure::Skip
    }

    /// Stop the site at the first listing page without entries.
    fn stop_when_empty(&self) -> bool {
        false
    }

    /// Skip detail URLs already visited during this run.
    fn dedupe_links(&self) -> bool {
        false
    }
}

/// Returns the first element matched by the selectors, tried in order.
pub(crate) fn first_match<'a>(scope: ElementRef<'a>, selectors: &[Selector]) -> Option<ElementRef<'a>> {
    selectors.iter().find_map(|selector| scope.select(selector).next())
}

/// Resolves `href` against `base` like a browser would.
pub(crate) fn resolve_url(base: &str, href: &str) -> Option<String> {
    Url::parse(base).ok()?.join(href).ok().map(String::from)
}

/// Trims a base URL override so paths can be appended with `/`.
pub(crate) fn normalize_base(base_url: Option<String>, default: &str) -> String {
    base_url.unwrap_or_else(|| default.to_string()).trim_end_matches('/').to_string()
}
