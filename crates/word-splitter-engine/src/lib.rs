pub mod docx;
pub mod io;
pub mod materialize;
pub mod models;
pub mod naming;
pub mod outline;
pub mod pipeline;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use docx::{LoadError, Package, SourceDocument, load_document};
pub use io::*;
pub use materialize::{ChapterJob, ChapterMaterializer, DocxMaterializer, MaterializeError};
pub use models::*;
pub use naming::{chapter_file_name, sanitize_filename};
pub use outline::{
    DocumentPlan, HeuristicClassifier, OutlineClassifier, PlannedChapter, StructuralClassifier,
    plan_document,
};
pub use pipeline::{
    BatchOptions, BatchProcessor, BatchReport, ChapterOutcome, ChapterReport, DocumentReport,
    DocumentStatus, PipelineError,
};
