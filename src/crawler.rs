//! Drives a [`SiteAdapter`]: listing pages, detail pages, images, dedup.

use crate::http::Fetcher;
use crate::notice::text::truncate_chars;
use crate::notice::{DetailRef, ImageDownloader, ImageRequest, Notice, NoticeStore};
use crate::sites::{ListFailure, ListPage, Site, SiteAdapter};
use anyhow::Result;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Counters for one site run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteStats {
    pub site: Site,
    /// Listing pages requested
    pub pages: usize,
    pub pages_failed: usize,
    /// Detail pages fetched and parsed
    pub details: usize,
    pub details_failed: usize,
    /// Detail links skipped because they were already visited
    pub revisits: usize,
    pub admitted: usize,
    pub duplicates: usize,
}

impl SiteStats {
    fn new(site: Site) -> Self {
        Self {
            site,
            pages: 0,
            pages_failed: 0,
            details: 0,
            details_failed: 0,
            revisits: 0,
            admitted: 0,
            duplicates: 0,
        }
    }
}

pub struct Crawler<'a> {
    http: &'a dyn Fetcher,
    images: &'a ImageDownloader,
    max_pages: Option<u32>,
}

impl<'a> Crawler<'a> {
    pub fn new(http: &'a dyn Fetcher, images: &'a ImageDownloader) -> Self {
        Self { http, images, max_pages: None }
    }

    /// Limits each category to its first `max_pages` listing pages.
    pub fn with_max_pages(mut self, max_pages: Option<u32>) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Crawls every listing page of `adapter`, admitting notices into `store`.
    ///
    /// Failures are logged and counted; only the adapter's list failure
    /// policy can end the run early.
    pub async fn run(&self, adapter: &dyn SiteAdapter, store: &mut NoticeStore) -> SiteStats {
        let site = adapter.site();
        let mut stats = SiteStats::new(site);
        let mut visited: HashSet<String> = HashSet::new();

        info!("📂 [{}] 시작", site.label());

        for page in adapter.pages() {
            if self.max_pages.is_some_and(|max| page.ordinal > max) {
                continue;
            }

            stats.pages += 1;
            let entries = match self.fetch_list(adapter, &page).await {
                Ok(entries) => entries,
                Err(e) => {
                    stats.pages_failed += 1;
                    warn!("❌ 목록 페이지 요청 실패 ({} {}): {:#}", page.category, page.number, e);
                    match adapter.list_failure() {
                        ListFailure::Skip => continue,
                        ListFailure::Stop => break,
                    }
                }
            };

            if entries.is_empty() {
                debug!("No entries on {}", page.url);
                if adapter.stop_when_empty() {
                    info!("[{}] {} {}: 더 이상 게시물 없음", site.label(), page.category, page.number);
                    break;
                }
                continue;
            }

            for entry in entries {
                if adapter.dedupe_links() && !visited.insert(entry.fetch_url.clone()) {
                    debug!("Already visited {}", entry.fetch_url);
                    stats.revisits += 1;
                    continue;
                }

                info!(
                    "📄 [{}] {} {} - {}",
                    site.label(),
                    page.category,
                    page.number,
                    truncate_chars(&entry.title, 35)
                );

                match self.collect(adapter, &entry).await {
                    Ok(notice) => {
                        stats.details += 1;
                        if store.admit(notice) {
                            stats.admitted += 1;
                        } else {
                            stats.duplicates += 1;
                        }
                    }
                    Err(e) => {
                        stats.details_failed += 1;
                        warn!("❌ 상세 페이지 실패: {} ({:#})", truncate_chars(&entry.title, 30), e);
                    }
                }
            }
        }

        info!(
            "✅ [{}] 완료: {} saved, {} duplicates, {} failed pages, {} failed details",
            site.label(),
            stats.admitted,
            stats.duplicates,
            stats.pages_failed,
            stats.details_failed
        );
        stats
    }

    async fn fetch_list(&self, adapter: &dyn SiteAdapter, page: &ListPage) -> Result<Vec<DetailRef>> {
        let body = self.http.get_text(&page.url).await?;
        adapter.parse_list(page, &body)
    }

    /// Fetches a detail page and downloads its images.
    async fn collect(&self, adapter: &dyn SiteAdapter, entry: &DetailRef) -> Result<Notice> {
        let body = self.http.get_text(&entry.fetch_url).await?;
        let detail = adapter.parse_detail(entry, &body)?;

        let dir = adapter.site().image_dir();
        let mut images = Vec::with_capacity(detail.images.len());
        for (index, image) in detail.images.iter().enumerate() {
            let request = ImageRequest {
                url: &image.url,
                dir,
                prefix: &entry.image_prefix,
                index,
                original_name: image.name.as_deref(),
            };
            if let Some(path) = self.images.save(self.http, &request).await {
                images.push(path);
            }
        }

        Ok(Notice {
            title: entry.title.clone(),
            written_date: detail.written_date,
            body: detail.body,
            link: entry.link.clone(),
            images,
        })
    }
}
