//! CSV export of collected notices.
//!
//! The file starts with a UTF-8 byte order mark so spreadsheet tools detect the
//! encoding of the Korean text.

use crate::notice::Notice;
use anyhow::{Context, Result};
use csv::{Terminator, WriterBuilder};
use std::path::Path;
use tracing::info;

const BOM: &[u8] = b"\xEF\xBB\xBF";

/// Column headers: title, written date, body, link, images.
pub const HEADER: [&str; 5] = ["제목", "작성일", "본문내용", "링크", "사진"];

/// Writes notices as CSV rows in admission order.
pub struct CsvExporter;

impl CsvExporter {
    /// Renders the full file contents, BOM included.
    pub fn to_bytes(notices: &[Notice]) -> Result<Vec<u8>> {
        let mut writer = WriterBuilder::new().terminator(Terminator::CRLF).from_writer(BOM.to_vec());

        writer.write_record(HEADER)?;
        for notice in notices {
            writer.write_record([
                notice.title.as_str(),
                notice.written_date.as_str(),
                notice.body.as_str(),
                notice.link.as_str(),
                notice.images_joined().as_str(),
            ])?;
        }

        writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush CSV output: {}", e.error()))
    }

    /// Writes `notices` to `path`, creating parent directories as needed.
    pub fn write(path: impl AsRef<Path>, notices: &[Notice]) -> Result<()> {
        let path = path.as_ref();
        let bytes = Self::to_bytes(notices)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        std::fs::write(path, bytes).with_context(|| format!("Failed to write CSV: {}", path.display()))?;

        info!("✅ 통합 CSV 저장 완료: {} ({} notices)", path.display(), notices.len());
        Ok(())
    }
}
