//! Data models for collected notices and the pieces adapters hand back.

use serde::{Deserialize, Serialize};

/// Written-date placeholder for pages without a recognizable date.
pub const NO_DATE: &str = "(작성일 없음)";

/// Body placeholder for pages without a content container.
pub const NO_BODY: &str = "(본문 없음)";

/// A single announcement as exported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Title as shown on the listing
    pub title: String,
    /// Normalized written date or [`NO_DATE`]
    pub written_date: String,
    /// Body text, possibly with `a | b | c` table rows
    pub body: String,
    /// Public link to the announcement
    pub link: String,
    /// Local image paths (forward slashes), in page order
    pub images: Vec<String>,
}

impl Notice {
    /// Returns the image paths joined the way the export expects.
    pub fn images_joined(&self) -> String {
        self.images.join(";")
    }
}

/// Reference to a detail page discovered on a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRef {
    /// Title from the listing row
    pub title: String,
    /// Link stored in the exported record
    pub link: String,
    /// URL actually fetched for the detail (differs from `link` for JSON APIs)
    pub fetch_url: String,
    /// Date shown on the listing, if the site puts it there
    pub listed_date: Option<String>,
    /// Prefix for downloaded image file names
    pub image_prefix: String,
}

impl DetailRef {
    /// Creates a reference whose fetched URL is also the exported link.
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        image_prefix: impl Into<String>,
    ) -> Self {
        let link = link.into();
        Self {
            title: title.into(),
            fetch_url: link.clone(),
            link,
            listed_date: None,
            image_prefix: image_prefix.into(),
        }
    }
}

/// Image referenced by a detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// Absolute image URL
    pub url: String,
    /// Original file name when the page exposes one
    pub name: Option<String>,
}

impl ImageRef {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), name: None }
    }

    pub fn named(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self { url: url.into(), name: Some(name.into()) }
    }
}

/// Fields extracted from a detail page before images are downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailPage {
    pub body: String,
    pub written_date: String,
    pub images: Vec<ImageRef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_notice(images: Vec<&str>) -> Notice {
        Notice {
            title: "2024학년도 장학 안내".to_string(),
            written_date: "2024.03.01".to_string(),
            body: "본문".to_string(),
            link: "https://example.com/1".to_string(),
            images: images.into_iter().map(String::from).collect(),
        }
    }

    #[test]
    fn test_images_joined() {
        let notice = make_notice(vec!["a/main/81_0.jpg", "a/main/81_1.jpg"]);
        assert_eq!(notice.images_joined(), "a/main/81_0.jpg;a/main/81_1.jpg");
    }

    #[test]
    fn test_images_joined_empty() {
        let notice = make_notice(vec![]);
        assert_eq!(notice.images_joined(), "");
    }

    #[test]
    fn test_detail_ref_new_uses_link_for_fetch() {
        let entry = DetailRef::new("제목", "https://example.com/view?id=1", "81");
        assert_eq!(entry.fetch_url, entry.link);
        assert!(entry.listed_date.is_none());
        assert_eq!(entry.image_prefix, "81");
    }
}
