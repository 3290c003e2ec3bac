//! Crawl command implementation.

use crate::config::Config;
use crate::crawler::{Crawler, SiteStats};
use crate::export::CsvExporter;
use crate::http::{Fetcher, HttpClient};
use crate::notice::{ImageDownloader, NoticeStore};
use crate::sites::SiteAdapter;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use tracing::info;

/// Outcome of a full run.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    /// Notices written to the CSV
    pub notices: usize,
    pub duplicates: usize,
    pub sites: Vec<SiteStats>,
    pub output: PathBuf,
}

impl fmt::Display for CrawlReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<18} {:>6} {:>6} {:>6} {:>6}", "Site", "Saved", "Dups", "Pages", "Failed")?;
        writeln!(f, "{:-<18} {:->6} {:->6} {:->6} {:->6}", "", "", "", "", "")?;
        for stats in &self.sites {
            writeln!(
                f,
                "{:<18} {:>6} {:>6} {:>6} {:>6}",
                stats.site.to_string(),
                stats.admitted,
                stats.duplicates,
                stats.pages,
                stats.pages_failed + stats.details_failed
            )?;
        }
        write!(f, "\n{} notices written to {}", self.notices, self.output.display())
    }
}

/// Runs the configured site adapters and exports the result.
pub struct CrawlCommand {
    config: Config,
}

impl CrawlCommand {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Crawls every configured site with a real HTTP client.
    pub async fn execute(&self) -> Result<CrawlReport> {
        let http = HttpClient::new(&self.config).context("Failed to create HTTP client")?;
        let adapters: Vec<Box<dyn SiteAdapter>> =
            self.config.sites.iter().map(|site| site.adapter()).collect();

        self.execute_with(&http, &adapters).await
    }

    /// Crawls with a provided client and adapters (for testing).
    pub async fn execute_with(
        &self,
        http: &dyn Fetcher,
        adapters: &[Box<dyn SiteAdapter>],
    ) -> Result<CrawlReport> {
        let images = ImageDownloader::new(
            &self.config.image_dir,
            self.config.image_timeout(),
            self.config.min_image_bytes,
        );
        let crawler = Crawler::new(http, &images).with_max_pages(self.config.max_pages);
        let mut store = NoticeStore::new();

        let mut sites = Vec::with_capacity(adapters.len());
        for adapter in adapters {
            sites.push(crawler.run(adapter.as_ref(), &mut store).await);
        }

        let notices = store.into_notices();
        CsvExporter::write(&self.config.output, &notices)?;

        let duplicates: usize = sites.iter().map(|s| s.duplicates).sum();
        info!("Crawl finished: {} notices, {} duplicates", notices.len(), duplicates);

        Ok(CrawlReport { notices: notices.len(), duplicates, sites, output: self.config.output.clone() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{RetryPolicy, Throttle};
    use crate::sites::{EngineeringAdapter, Site};
    use tempfile::TempDir;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_test_config(dir: &TempDir) -> Config {
        Config {
            output: dir.path().join("notices.csv"),
            image_dir: dir.path().join("images"),
            max_pages: Some(1),
            sites: vec![Site::Engineering],
            ..Config::default()
        }
    }

    fn test_client() -> HttpClient {
        HttpClient::with_policies("Mozilla/5.0", RetryPolicy::none(), Throttle::disabled()).unwrap()
    }

    #[tokio::test]
    async fn test_execute_with_writes_csv() {
        let server = MockServer::start().await;
        let list = r#"<table class="bbs_list"><tbody>
            <tr><td class="tit"><a href="/view/1">산학협력 설명회</a></td><td class="dt">2024-06-01</td></tr>
        </tbody></table>"#;

        Mock::given(method("GET"))
            .and(path("/index.php"))
            .and(query_param("cpage", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(list))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/view/1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"<div class="view_cont">설명회 안내</div>"#),
            )
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let cmd = CrawlCommand::new(make_test_config(&dir));
        let adapters: Vec<Box<dyn SiteAdapter>> =
            vec![Box::new(EngineeringAdapter::with_base_url(Some(server.uri())))];

        let report = cmd.execute_with(&test_client(), &adapters).await.unwrap();

        assert_eq!(report.notices, 1);
        assert_eq!(report.sites.len(), 1);
        assert_eq!(report.sites[0].pages, 1);

        let csv = std::fs::read_to_string(dir.path().join("notices.csv")).unwrap();
        assert!(csv.contains("산학협력 설명회,2024.06.01,설명회 안내,"));
        assert!(csv.contains(&format!("{}/view/1", server.uri())));
    }

    #[tokio::test]
    async fn test_unreachable_site_still_exports_header() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let cmd = CrawlCommand::new(make_test_config(&dir));
        let adapters: Vec<Box<dyn SiteAdapter>> =
            vec![Box::new(EngineeringAdapter::with_base_url(Some(server.uri())))];

        let report = cmd.execute_with(&test_client(), &adapters).await.unwrap();

        assert_eq!(report.notices, 0);
        assert_eq!(report.sites[0].pages_failed, 1);
        let csv = std::fs::read_to_string(dir.path().join("notices.csv")).unwrap();
        assert!(csv.contains("제목,작성일,본문내용,링크,사진"));
    }

    #[test]
    fn test_report_display() {
        let report = CrawlReport {
            notices: 3,
            duplicates: 1,
            sites: vec![SiteStats {
                site: Site::Library,
                pages: 2,
                pages_failed: 0,
                details: 4,
                details_failed: 1,
                revisits: 0,
                admitted: 3,
                duplicates: 1,
            }],
            output: PathBuf::from("notices.csv"),
        };

        let text = report.to_string();
        assert!(text.contains("library"));
        assert!(text.ends_with("3 notices written to notices.csv"));
    }
}
