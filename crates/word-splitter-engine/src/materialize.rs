use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::debug;

use crate::docx::SourceDocument;
use crate::io::{IoError, write_file};
use crate::models::Chapter;
use crate::naming::chapter_file_name;
use crate::outline::PlannedChapter;

#[derive(Debug, thiserror::Error)]
pub enum MaterializeError {
    #[error("Failed to write {path}: {source}")]
    Io { path: PathBuf, source: IoError },
    #[error("Failed to build chapter package: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Chapter markup is not well-formed: {0}")]
    Xml(#[from] roxmltree::Error),
}

/// One unit of output work: a chapter, its tables and the file it goes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterJob {
    pub chapter: Chapter,
    pub tables: BTreeSet<usize>,
    pub file_name: String,
}

impl ChapterJob {
    /// `extension` includes the leading dot.
    pub fn new(planned: &PlannedChapter, extension: &str) -> Self {
        Self {
            file_name: chapter_file_name(&planned.chapter.title, extension),
            chapter: planned.chapter.clone(),
            tables: planned.tables.clone(),
        }
    }
}

/// Writes one chapter of a source document as a standalone file.
pub trait ChapterMaterializer: Send + Sync {
    fn materialize(
        &self,
        source: &SourceDocument,
        job: &ChapterJob,
        output_dir: &Path,
    ) -> Result<PathBuf, MaterializeError>;
}

/// Writes chapters as docx packages sharing the source's styles, numbering,
/// relationships and media.
///
/// Package bytes are built outside the lock; only directory creation and the
/// file write are serialised. A write that hangs on a stalled file system
/// still holds the lock, so every later chapter of the batch queues behind it
/// and times out as well.
#[derive(Debug, Default)]
pub struct DocxMaterializer {
    write_lock: Mutex<()>,
    verify: bool,
}

impl DocxMaterializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-parse every generated body before writing it.
    pub fn verifying(mut self) -> Self {
        self.verify = true;
        self
    }
}

impl ChapterMaterializer for DocxMaterializer {
    fn materialize(
        &self,
        source: &SourceDocument,
        job: &ChapterJob,
        output_dir: &Path,
    ) -> Result<PathBuf, MaterializeError> {
        let paragraphs = job.chapter.paragraphs();
        if self.verify {
            roxmltree::Document::parse(&source.chapter_xml(&paragraphs, &job.tables))?;
        }
        let bytes = source.chapter_bytes(&paragraphs, &job.tables)?;
        let path = output_dir.join(&job.file_name);

        // Same-named chapters would otherwise interleave their writes.
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        write_file(&path, &bytes).map_err(|source| MaterializeError::Io {
            path: path.clone(),
            source,
        })?;

        debug!(
            "Wrote {} ({} paragraphs, {} tables)",
            path.display(),
            job.chapter.paragraph_count(),
            job.tables.len()
        );
        Ok(path)
    }
}
