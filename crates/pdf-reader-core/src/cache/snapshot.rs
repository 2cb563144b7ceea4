use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use super::PageRecord;

/// On-disk layout of the cache: five page-indexed parallel arrays.
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct Snapshot {
    #[serde(rename = "English")]
    paragraphs: Vec<Vec<String>>,
    #[serde(rename = "Chinese")]
    translations: Vec<Vec<String>>,
    #[serde(rename = "100-word summary")]
    summary_100: Vec<String>,
    #[serde(rename = "200-word summary")]
    summary_200: Vec<String>,
    #[serde(rename = "300-word summary")]
    summary_300: Vec<String>,
}

impl Snapshot {
    pub(crate) fn from_pages(pages: &[PageRecord]) -> Self {
        let mut snapshot = Self::default();
        for page in pages {
            let [s100, s200, s300] = page.summaries.clone();
            snapshot.paragraphs.push(page.paragraphs.clone());
            snapshot.translations.push(page.translations.clone());
            snapshot.summary_100.push(s100);
            snapshot.summary_200.push(s200);
            snapshot.summary_300.push(s300);
        }
        snapshot
    }

    /// Zip the arrays back into page records.
    ///
    /// All five arrays must be the same length.
    pub(crate) fn into_pages(self) -> Result<Vec<PageRecord>> {
        let len = self.paragraphs.len();
        let lengths = [
            ("Chinese", self.translations.len()),
            ("100-word summary", self.summary_100.len()),
            ("200-word summary", self.summary_200.len()),
            ("300-word summary", self.summary_300.len()),
        ];
        if let Some((key, other)) = lengths.iter().find(|(_, l)| *l != len) {
            return Err(Error::SnapshotInvalid(format!(
                "'English' has {len} pages but '{key}' has {other}"
            )));
        }

        let pages = self
            .paragraphs
            .into_iter()
            .zip(self.translations)
            .zip(self.summary_100)
            .zip(self.summary_200)
            .zip(self.summary_300)
            .map(|((((paragraphs, translations), s100), s200), s300)| PageRecord {
                paragraphs,
                translations,
                summaries: [s100, s200, s300],
            })
            .collect();
        Ok(pages)
    }

    pub(crate) fn read(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::SnapshotRead {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|e| Error::SnapshotParse(format!("{}: {e}", path.display())))
    }

    /// Write the snapshot next to `path`, then move it into place.
    pub(crate) fn write(&self, path: &Path) -> Result<()> {
        let write_error = |reason: String| Error::SnapshotWrite {
            path: path.to_path_buf(),
            reason,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| write_error(e.to_string()))?;
        }

        let tmp_path = path.with_extension("json.tmp");
        let file = File::create(&tmp_path).map_err(|e| write_error(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, self).map_err(|e| write_error(e.to_string()))?;
        writer.flush().map_err(|e| write_error(e.to_string()))?;
        drop(writer);

        std::fs::rename(&tmp_path, path).map_err(|e| write_error(e.to_string()))?;
        debug!("Wrote snapshot of {} pages to {}", self.paragraphs.len(), path.display());
        Ok(())
    }
}
