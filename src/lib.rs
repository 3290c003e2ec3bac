//! univ-notice-crawler - Collects university notice boards into one CSV
//!
//! Each supported board has a site adapter; a shared driver fetches listing
//! and detail pages, downloads images, and drops notices whose normalized
//! title and date were already seen.

pub mod commands;
pub mod config;
pub mod crawler;
pub mod export;
pub mod http;
pub mod notice;
pub mod sites;

pub use config::Config;
pub use notice::{dedup_key, Notice, NoticeStore};
pub use sites::{Site, SiteAdapter};
