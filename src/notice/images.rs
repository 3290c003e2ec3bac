//! Image downloads for notice attachments.

use crate::http::Fetcher;
use crate::sites::IMAGE_EXTENSIONS;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Extension used when none can be inferred.
const DEFAULT_EXTENSION: &str = ".jpg";

/// One image to save: `{dir}/{prefix}_{index}{ext}` under the downloader root.
#[derive(Debug, Clone)]
pub struct ImageRequest<'a> {
    pub url: &'a str,
    pub dir: &'a str,
    pub prefix: &'a str,
    pub index: usize,
    /// Original file name, used only to infer the extension
    pub original_name: Option<&'a str>,
}

/// Saves images to disk, discarding tiny or failed responses.
#[derive(Debug, Clone)]
pub struct ImageDownloader {
    root: PathBuf,
    timeout: Duration,
    min_bytes: usize,
}

impl ImageDownloader {
    pub fn new(root: impl Into<PathBuf>, timeout: Duration, min_bytes: usize) -> Self {
        Self { root: root.into(), timeout, min_bytes }
    }

    /// Downloads one image and returns its local path with forward slashes.
    ///
    /// Only a 200 response larger than the minimum size is written. Every
    /// failure is logged and yields `None`.
    pub async fn save(&self, http: &dyn Fetcher, request: &ImageRequest<'_>) -> Option<String> {
        let name = request.original_name.unwrap_or_else(|| last_segment(request.url));
        let file_name =
            sanitize_filename(&format!("{}_{}{}", request.prefix, request.index, extension_of(name)));
        let folder = self.root.join(request.dir);
        let path = folder.join(&file_name);

        let fetched = match http.get_bytes(request.url, self.timeout).await {
            Ok(fetched) => fetched,
            Err(e) => {
                warn!("❌ 이미지 저장 실패: {} ({})", request.url, e);
                return None;
            }
        };

        if fetched.status != 200 || fetched.body.len() <= self.min_bytes {
            warn!(
                "⚠️ 다운로드 실패 또는 너무 작음: {} (status {}, {} bytes)",
                request.url,
                fetched.status,
                fetched.body.len()
            );
            return None;
        }

        if let Err(e) = tokio::fs::create_dir_all(&folder).await {
            warn!("❌ 이미지 저장 실패: {} ({})", request.url, e);
            return None;
        }
        if let Err(e) = tokio::fs::write(&path, &fetched.body).await {
            warn!("❌ 이미지 저장 실패: {} ({})", request.url, e);
            return None;
        }

        debug!("Saved {} bytes to {}", fetched.body.len(), path.display());
        Some(path.to_string_lossy().replace('\\', "/"))
    }
}

/// Replaces characters unsafe in file names with `_`.
///
/// Letters and digits of any script are kept, as are `_`, `.`, `-` and whitespace.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Returns `.ext` of `name` when it is an image extension, otherwise `.jpg`.
pub fn extension_of(name: &str) -> String {
    match Path::new(name).extension().and_then(|e| e.to_str()) {
        Some(ext) if IMAGE_EXTENSIONS.contains(&format!(".{}", ext.to_lowercase()).as_str()) => {
            format!(".{}", ext)
        }
        _ => DEFAULT_EXTENSION.to_string(),
    }
}

/// Last path segment of a URL, without query or fragment.
fn last_segment(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/').next().unwrap_or(path)
}

/// Returns true if `name` ends with one of `extensions` (case-insensitive).
pub fn has_extension(name: &str, extensions: &[&str]) -> bool {
    let lower = name.to_lowercase();
    extensions.iter().any(|ext| lower.ends_with(ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpClient, RetryPolicy, Throttle};
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_client() -> HttpClient {
        HttpClient::with_policies("Mozilla/5.0", RetryPolicy::none(), Throttle::disabled()).unwrap()
    }

    async fn serve(mock_server: &MockServer, route: &str, template: ResponseTemplate) {
        Mock::given(method("GET")).and(path(route)).respond_with(template).mount(mock_server).await;
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("81_0.jpg"), "81_0.jpg");
        assert_eq!(sanitize_filename("공지 사진_1.png"), "공지 사진_1.png");
        assert_eq!(sanitize_filename("a/b:c*?.jpg"), "a_b_c__.jpg");
        assert_eq!(sanitize_filename("  spaced.gif  "), "spaced.gif");
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("poster.png"), ".png");
        assert_eq!(extension_of("photo.JPEG"), ".JPEG");
        assert_eq!(extension_of("image"), ".jpg");
        assert_eq!(extension_of("archive.backup"), ".jpg");
        assert_eq!(extension_of("file.php"), ".jpg");
        assert_eq!(extension_of("download.do"), ".jpg");
        assert_eq!(extension_of(""), ".jpg");
    }

    #[test]
    fn test_last_segment() {
        assert_eq!(last_segment("https://a.kr/upload/2024/poster.png?v=2"), "poster.png");
        assert_eq!(last_segment("https://a.kr/download.do#top"), "download.do");
        assert_eq!(last_segment("https://a.kr/dir/"), "");
    }

    #[test]
    fn test_has_extension() {
        assert!(has_extension("/upload/A.JPG", &[".png", ".jpg"]));
        assert!(!has_extension("/upload/doc.pdf", &[".png", ".jpg"]));
    }

    #[tokio::test]
    async fn test_save_image_over_threshold() {
        let mock_server = MockServer::start().await;
        serve(&mock_server, "/img/poster.png", ResponseTemplate::new(200).set_body_bytes(vec![7u8; 1025]))
            .await;

        let dir = TempDir::new().unwrap();
        let downloader = ImageDownloader::new(dir.path(), Duration::from_secs(10), 1024);
        let url = format!("{}/img/poster.png", mock_server.uri());
        let request =
            ImageRequest { url: &url, dir: "main", prefix: "81", index: 0, original_name: None };

        let saved = downloader.save(&make_client(), &request).await.unwrap();
        assert!(saved.ends_with("main/81_0.png"));
        assert!(!saved.contains('\\'));

        let written = std::fs::read(dir.path().join("main").join("81_0.png")).unwrap();
        assert_eq!(written.len(), 1025);
    }

    #[tokio::test]
    async fn test_save_image_script_url_defaults_to_jpg() {
        let mock_server = MockServer::start().await;
        serve(&mock_server, "/board/file.php", ResponseTemplate::new(200).set_body_bytes(vec![3u8; 2048]))
            .await;

        let dir = TempDir::new().unwrap();
        let downloader = ImageDownloader::new(dir.path(), Duration::from_secs(10), 1024);
        let url = format!("{}/board/file.php?no=3", mock_server.uri());
        let request =
            ImageRequest { url: &url, dir: "engineering", prefix: "3", index: 0, original_name: None };

        let saved = downloader.save(&make_client(), &request).await.unwrap();
        assert!(saved.ends_with("engineering/3_0.jpg"));
        assert!(dir.path().join("engineering").join("3_0.jpg").exists());
    }

    #[tokio::test]
    async fn test_save_image_too_small() {
        let mock_server = MockServer::start().await;
        serve(&mock_server, "/img/pixel.gif", ResponseTemplate::new(200).set_body_bytes(vec![0u8; 500]))
            .await;

        let dir = TempDir::new().unwrap();
        let downloader = ImageDownloader::new(dir.path(), Duration::from_secs(10), 1024);
        let url = format!("{}/img/pixel.gif", mock_server.uri());
        let request =
            ImageRequest { url: &url, dir: "library", prefix: "42", index: 1, original_name: None };

        assert!(downloader.save(&make_client(), &request).await.is_none());
        assert!(!dir.path().join("library").join("42_1.gif").exists());
    }

    #[tokio::test]
    async fn test_save_image_exactly_threshold_rejected() {
        let mock_server = MockServer::start().await;
        serve(&mock_server, "/img/edge.jpg", ResponseTemplate::new(200).set_body_bytes(vec![0u8; 1024]))
            .await;

        let dir = TempDir::new().unwrap();
        let downloader = ImageDownloader::new(dir.path(), Duration::from_secs(10), 1024);
        let url = format!("{}/img/edge.jpg", mock_server.uri());
        let request =
            ImageRequest { url: &url, dir: "main", prefix: "1", index: 0, original_name: None };

        assert!(downloader.save(&make_client(), &request).await.is_none());
    }

    #[tokio::test]
    async fn test_save_image_404() {
        let mock_server = MockServer::start().await;
        serve(&mock_server, "/img/gone.jpg", ResponseTemplate::new(404).set_body_bytes(vec![0u8; 4096]))
            .await;

        let dir = TempDir::new().unwrap();
        let downloader = ImageDownloader::new(dir.path(), Duration::from_secs(10), 1024);
        let url = format!("{}/img/gone.jpg", mock_server.uri());
        let request =
            ImageRequest { url: &url, dir: "admin", prefix: "10", index: 0, original_name: None };

        assert!(downloader.save(&make_client(), &request).await.is_none());
        assert!(!dir.path().join("admin").exists());
    }

    #[tokio::test]
    async fn test_save_image_uses_original_name_extension() {
        let mock_server = MockServer::start().await;
        serve(&mock_server, "/download.do", ResponseTemplate::new(200).set_body_bytes(vec![1u8; 2000]))
            .await;

        let dir = TempDir::new().unwrap();
        let downloader = ImageDownloader::new(dir.path(), Duration::from_secs(10), 1024);
        let url = format!("{}/download.do", mock_server.uri());
        let request = ImageRequest {
            url: &url,
            dir: "admin",
            prefix: "13",
            index: 2,
            original_name: Some("행사 포스터.jpeg"),
        };

        let saved = downloader.save(&make_client(), &request).await.unwrap();
        assert!(saved.ends_with("admin/13_2.jpeg"));
    }

    #[tokio::test]
    async fn test_save_image_unreachable() {
        let dir = TempDir::new().unwrap();
        let downloader = ImageDownloader::new(dir.path(), Duration::from_secs(2), 1024);
        let request = ImageRequest {
            url: "http://127.0.0.1:1/a.png",
            dir: "main",
            prefix: "1",
            index: 0,
            original_name: None,
        };

        assert!(downloader.save(&make_client(), &request).await.is_none());
    }
}
