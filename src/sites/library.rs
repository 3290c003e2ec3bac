//! University library bulletins, served by a JSON API.
//!
//! Listings are paginated by offset; each bulletin's date and HTML body come
//! from a separate per-id endpoint.

use super::selectors::common;
use super::{normalize_base, resolve_url, ListFailure, ListPage, Site, SiteAdapter};
use crate::notice::text::element_text;
use crate::notice::{DetailPage, DetailRef, ImageRef, NO_DATE};
use anyhow::{Context, Result};
use scraper::Html;
use serde::Deserialize;

const BOARD_ID: u32 = 24;
const CATEGORY_ID: u32 = 1;
const PAGE_SIZE: u32 = 10;
const MAX_PAGES: u32 = 250;

/// Inline images served from this path are notice attachments.
const ATTACHMENT_PATH: &str = "/pyxis-api/attachments/";

/// `{"data": ...}` wrapper used by every endpoint.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    data: Option<T>,
}

#[derive(Debug, Default, Deserialize)]
struct BulletinList {
    #[serde(default)]
    list: Vec<BulletinSummary>,
}

#[derive(Debug, Deserialize)]
struct BulletinSummary {
    id: u64,
    title: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BulletinDetail {
    #[serde(default)]
    date_created: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

pub struct LibraryAdapter {
    base_url: String,
    max_pages: u32,
}

impl LibraryAdapter {
    pub fn new() -> Self {
        Self::with_base_url(None)
    }

    /// Creates an adapter with an optional custom base URL (for testing).
    pub fn with_base_url(base_url: Option<String>) -> Self {
        Self { base_url: normalize_base(base_url, Site::Library.base_url()), max_pages: MAX_PAGES }
    }

    fn list_url(&self, offset: u32) -> String {
        format!(
            "{}/pyxis-api/1/bulletin-boards/{}/bulletins?offset={}&max={}&bulletinCategoryId={}",
            self.base_url, BOARD_ID, offset, PAGE_SIZE, CATEGORY_ID
        )
    }

    fn detail_api_url(&self, id: u64) -> String {
        format!("{}/pyxis-api/1/bulletins/{}/{}", self.base_url, BOARD_ID, id)
    }

    fn public_url(&self, id: u64) -> String {
        format!("{}/community/bulletin/notice/{}", self.base_url, id)
    }
}

impl Default for LibraryAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// `2024-03-01T09:00:00` → `2024.03.01`.
fn normalize_created(raw: &str) -> String {
    raw.chars().take(10).collect::<String>().replace('-', ".")
}

impl SiteAdapter for LibraryAdapter {
    fn site(&self) -> Site {
        Site::Library
    }

    fn pages(&self) -> Box<dyn Iterator<Item = ListPage> + Send + '_> {
        Box::new((0..self.max_pages).map(move |page| {
            let offset = page * PAGE_SIZE;
            ListPage { category: "공지사항", ordinal: page + 1, number: offset, url: self.list_url(offset) }
        }))
    }

    fn parse_list(&self, _page: &ListPage, body: &str) -> Result<Vec<DetailRef>> {
        let envelope: Envelope<BulletinList> =
            serde_json::from_str(body).context("Failed to decode bulletin list")?;

        Ok(envelope
            .data
            .unwrap_or_default()
            .list
            .into_iter()
            .map(|item| DetailRef {
                title: item.title,
                link: self.public_url(item.id),
                fetch_url: self.detail_api_url(item.id),
                listed_date: None,
                image_prefix: item.id.to_string(),
            })
            .collect())
    }

    fn parse_detail(&self, _entry: &DetailRef, body: &str) -> Result<DetailPage> {
        let envelope: Envelope<BulletinDetail> =
            serde_json::from_str(body).context("Failed to decode bulletin detail")?;
        let detail = envelope.data.unwrap_or_default();

        let written_date = detail
            .date_created
            .as_deref()
            .map(normalize_created)
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| NO_DATE.to_string());

        let fragment = Html::parse_fragment(detail.content.as_deref().unwrap_or(""));
        let text = element_text(fragment.root_element(), "\n");

        let images = fragment
            .select(&common::IMAGE)
            .filter_map(|img| img.value().attr("src"))
            .filter(|src| src.contains(ATTACHMENT_PATH))
            .filter_map(|src| resolve_url(&self.base_url, src))
            .map(ImageRef::new)
            .collect();

        Ok(DetailPage { body: text, written_date, images })
    }

    fn list_failure(&self) -> ListFailure {
        ListFailure::Stop
    }

    fn stop_when_empty(&self) -> bool {
        true
    }

    fn dedupe_links(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_page() -> ListPage {
        LibraryAdapter::new().pages().next().unwrap()
    }

    #[test]
    fn test_pages_offsets() {
        let adapter = LibraryAdapter::new();
        let pages: Vec<_> = adapter.pages().collect();
        assert_eq!(pages.len(), 250);
        assert_eq!(pages[0].number, 0);
        assert_eq!(pages[3].number, 30);
        assert_eq!(pages[3].ordinal, 4);
        assert_eq!(
            pages[1].url,
            "https://library.kangwon.ac.kr/pyxis-api/1/bulletin-boards/24/bulletins?offset=10&max=10&bulletinCategoryId=1"
        );
    }

    #[test]
    fn test_parse_list() {
        let adapter = LibraryAdapter::new();
        let body = r#"{"success":true,"data":{"totalCount":2,"list":[
            {"id":1501,"title":"[안내] 도서관 휴관 안내","dateCreated":"2024-03-01"},
            {"id":1499,"title":"전자책 이용 안내"}
        ]}}"#;

        let entries = adapter.parse_list(&make_page(), body).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "[안내] 도서관 휴관 안내");
        assert_eq!(entries[0].link, "https://library.kangwon.ac.kr/community/bulletin/notice/1501");
        assert_eq!(entries[0].fetch_url, "https://library.kangwon.ac.kr/pyxis-api/1/bulletins/24/1501");
        assert_eq!(entries[0].image_prefix, "1501");
    }

    #[test]
    fn test_parse_list_empty() {
        let adapter = LibraryAdapter::new();
        assert!(adapter.parse_list(&make_page(), r#"{"data":{"list":[]}}"#).unwrap().is_empty());
        assert!(adapter.parse_list(&make_page(), r#"{"data":{}}"#).unwrap().is_empty());
        assert!(adapter.parse_list(&make_page(), r#"{}"#).unwrap().is_empty());
    }

    #[test]
    fn test_parse_list_invalid_json() {
        let adapter = LibraryAdapter::new();
        let err = adapter.parse_list(&make_page(), "<html>maintenance</html>").unwrap_err();
        assert!(err.to_string().contains("Failed to decode bulletin list"));
    }

    #[test]
    fn test_parse_list_missing_id() {
        let adapter = LibraryAdapter::new();
        assert!(adapter.parse_list(&make_page(), r#"{"data":{"list":[{"title":"x"}]}}"#).is_err());
    }

    #[test]
    fn test_parse_detail() {
        let adapter = LibraryAdapter::new();
        let entry = DetailRef::new("휴관 안내", "https://library.kangwon.ac.kr/community/bulletin/notice/1501", "1501");
        let body = r#"{"data":{
            "dateCreated":"2024-03-01 09:12:00",
            "content":"<p>3월 1일은 휴관합니다.</p><p><img src=\"/pyxis-api/attachments/BULLETIN/abc\"></p><img src=\"https://other.example.com/x.png\">"
        }}"#;

        let detail = adapter.parse_detail(&entry, body).unwrap();
        assert_eq!(detail.written_date, "2024.03.01");
        assert_eq!(detail.body, "3월 1일은 휴관합니다.");
        assert_eq!(
            detail.images,
            vec![ImageRef::new("https://library.kangwon.ac.kr/pyxis-api/attachments/BULLETIN/abc")]
        );
    }

    #[test]
    fn test_parse_detail_missing_fields() {
        let adapter = LibraryAdapter::new();
        let entry = DetailRef::new("t", "https://library.kangwon.ac.kr/x", "1");

        let detail = adapter.parse_detail(&entry, r#"{"data":{}}"#).unwrap();
        assert_eq!(detail.written_date, NO_DATE);
        assert_eq!(detail.body, "");
        assert!(detail.images.is_empty());
    }

    #[test]
    fn test_normalize_created() {
        assert_eq!(normalize_created("2023-12-24T10:00:00.000+09:00"), "2023.12.24");
        assert_eq!(normalize_created("2023-12"), "2023.12");
    }

    #[test]
    fn test_failure_policies() {
        let adapter = LibraryAdapter::new();
        assert_eq!(adapter.list_failure(), ListFailure::Stop);
        assert!(adapter.stop_when_empty());
        assert!(adapter.dedupe_links());
    }
}
