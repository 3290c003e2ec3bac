//! Notice records, duplicate detection, text extraction, and image saving.

pub mod dedup;
pub mod images;
pub mod models;
pub mod text;

pub use dedup::{dedup_key, NoticeStore};
pub use images::{ImageDownloader, ImageRequest};
pub use models::{DetailPage, DetailRef, ImageRef, Notice, NO_BODY, NO_DATE};
