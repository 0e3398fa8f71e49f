//! # Batch Pipeline
//!
//! Splits every document of an input directory, documents and chapters in
//! parallel.
//!
//! ## Pools
//!
//! - one rayon pool of document workers for the whole batch
//! - one rayon pool of chapter workers per document, sized to the number of
//!   chapters it actually has
//!
//! ## Timeouts
//!
//! Chapter workers report `Started`/`Finished` events over a channel. The
//! document worker waits on that channel until the earliest running chapter
//! reaches its deadline; chapters past it are reported `TimedOut` and their
//! threads are left to finish in the background. Once every chapter worker
//! is stuck this way, chapters still queued are given up on.
//!
//! ## Cancellation
//!
//! A shared flag is checked before each document and each chapter starts;
//! work already running is allowed to complete.

use std::collections::{HashMap, HashSet};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};

use crate::docx::{SourceDocument, load_document};
use crate::io::{IoError, scan_documents};
use crate::materialize::{ChapterJob, ChapterMaterializer, DocxMaterializer};
use crate::outline::{OutlineClassifier, StructuralClassifier, plan_document};

/// Upper bound on chapter threads for a single document.
pub const MAX_CHAPTER_THREADS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    pub target_level: u8,
    pub doc_workers: usize,
    pub chapter_workers: usize,
    pub chapter_timeout: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            target_level: 3,
            doc_workers: 4,
            chapter_workers: 2,
            chapter_timeout: Duration::from_secs(300),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error(transparent)]
    Io(#[from] IoError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChapterOutcome {
    Created(PathBuf),
    Failed(String),
    TimedOut,
    Cancelled,
}

impl ChapterOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterReport {
    pub title: String,
    pub file_name: String,
    pub outcome: ChapterOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentStatus {
    Completed,
    /// No headings were found, nothing was written.
    Skipped,
    LoadFailed(String),
    Failed(String),
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentReport {
    pub source: PathBuf,
    pub status: DocumentStatus,
    pub chapters: Vec<ChapterReport>,
}

impl DocumentReport {
    fn new(source: &Path, status: DocumentStatus) -> Self {
        Self {
            source: source.to_path_buf(),
            status,
            chapters: Vec::new(),
        }
    }

    pub fn created(&self) -> usize {
        self.chapters.iter().filter(|c| c.outcome.is_created()).count()
    }

    /// Chapters that were attempted and did not produce a file.
    pub fn failed(&self) -> usize {
        self.chapters
            .iter()
            .filter(|c| matches!(c.outcome, ChapterOutcome::Failed(_) | ChapterOutcome::TimedOut))
            .count()
    }
}

#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub documents: Vec<DocumentReport>,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn total_created(&self) -> usize {
        self.documents.iter().map(DocumentReport::created).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.documents.iter().map(DocumentReport::failed).sum()
    }

    pub fn count(&self, pred: impl Fn(&DocumentStatus) -> bool) -> usize {
        self.documents.iter().filter(|d| pred(&d.status)).count()
    }
}

fn available_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Document threads actually used: the request, capped by the CPU count.
pub fn effective_doc_workers(requested: usize, cpus: usize) -> usize {
    requested.min(cpus).max(1)
}

/// Chapter threads available per document, capped by half the CPU count.
pub fn effective_chapter_workers(requested: usize, cpus: usize) -> usize {
    requested.min((cpus / 2).max(1)).max(1)
}

enum ChapterEvent {
    Started(usize, Instant),
    Finished(usize, ChapterOutcome),
}

/// Splits documents into chapter files.
#[derive(Clone)]
pub struct BatchProcessor {
    options: BatchOptions,
    classifier: Arc<dyn OutlineClassifier>,
    materializer: Arc<dyn ChapterMaterializer>,
    cancel: Arc<AtomicBool>,
}

impl BatchProcessor {
    pub fn new(options: BatchOptions) -> Self {
        Self {
            options,
            classifier: Arc::new(StructuralClassifier),
            materializer: Arc::new(DocxMaterializer::new()),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn OutlineClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_materializer(mut self, materializer: Arc<dyn ChapterMaterializer>) -> Self {
        self.materializer = materializer;
        self
    }

    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// Split every Word document found directly inside `input_dir`.
    pub fn process_all(&self, input_dir: &Path, output_dir: &Path) -> Result<BatchReport, PipelineError> {
        let files = scan_documents(input_dir)?;
        info!("Found {} documents in {}", files.len(), input_dir.display());
        self.process_files(&files, output_dir)
    }

    pub fn process_files(&self, files: &[PathBuf], output_dir: &Path) -> Result<BatchReport, PipelineError> {
        let started = Instant::now();
        if files.is_empty() {
            return Ok(BatchReport::default());
        }

        let workers = effective_doc_workers(self.options.doc_workers, available_cpus()).min(files.len());
        info!("Processing {} documents with {workers} workers", files.len());
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("doc-worker-{i}"))
            .build()?;

        let (tx, rx) = mpsc::channel();
        pool.scope(|scope| {
            for path in files {
                let tx = tx.clone();
                scope.spawn(move |_| {
                    let report = self.process_document(path, output_dir);
                    let _ = tx.send(report);
                });
            }
        });
        drop(tx);

        let mut documents: Vec<DocumentReport> = rx.iter().collect();
        documents.sort_by(|a, b| a.source.cmp(&b.source));

        Ok(BatchReport {
            documents,
            elapsed: started.elapsed(),
        })
    }

    /// Split one document into `output_root/<stem>/`.
    pub fn process_document(&self, path: &Path, output_root: &Path) -> DocumentReport {
        if self.is_cancelled() {
            return DocumentReport::new(path, DocumentStatus::Cancelled);
        }

        let started = Instant::now();
        info!("Processing {}", path.display());
        let source = match load_document(path) {
            Ok(source) => source,
            Err(e) => {
                error!("Failed to load {}: {e}", path.display());
                return DocumentReport::new(path, DocumentStatus::LoadFailed(e.to_string()));
            }
        };

        let plan = plan_document(
            &source.paragraphs,
            &source.elements,
            self.classifier.as_ref(),
            self.options.target_level,
        );
        info!(
            "{}: {} paragraphs, {} headings, {} chapters",
            path.display(),
            source.paragraphs.len(),
            plan.headings.len(),
            plan.chapters.len()
        );
        if plan.is_empty() {
            warn!("No headings found in {}, skipping", path.display());
            return DocumentReport::new(path, DocumentStatus::Skipped);
        }

        let extension = source.extension();
        let jobs: Vec<ChapterJob> = plan
            .chapters
            .iter()
            .map(|planned| ChapterJob::new(planned, &extension))
            .collect();
        let output_dir = output_root.join(source.stem());

        let mut report = DocumentReport::new(path, DocumentStatus::Completed);
        match self.run_chapters(Arc::new(source), jobs, output_dir) {
            Ok(chapters) => report.chapters = chapters,
            Err(e) => {
                error!("Failed to split {}: {e}", path.display());
                report.status = DocumentStatus::Failed(e.to_string());
            }
        }

        info!(
            "Finished {} in {:.2?}: {} created, {} failed",
            path.display(),
            started.elapsed(),
            report.created(),
            report.failed()
        );
        report
    }

    fn run_chapters(
        &self,
        source: Arc<SourceDocument>,
        jobs: Vec<ChapterJob>,
        output_dir: PathBuf,
    ) -> Result<Vec<ChapterReport>, PipelineError> {
        let workers = effective_chapter_workers(self.options.chapter_workers, available_cpus())
            .min(jobs.len())
            .min(MAX_CHAPTER_THREADS)
            .max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("chapter-worker-{i}"))
            .build()?;
        debug!("{} chapters on {workers} workers", jobs.len());

        let abandon = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::channel();
        for (index, job) in jobs.iter().enumerate() {
            let task = ChapterTask {
                index,
                job: job.clone(),
                source: Arc::clone(&source),
                output_dir: output_dir.clone(),
                materializer: Arc::clone(&self.materializer),
                cancel: Arc::clone(&self.cancel),
                abandon: Arc::clone(&abandon),
                events: tx.clone(),
            };
            pool.spawn(move || task.run());
        }
        drop(tx);

        let outcomes = collect_outcomes(&rx, jobs.len(), workers, self.options.chapter_timeout, &abandon);

        Ok(jobs
            .into_iter()
            .zip(outcomes)
            .map(|(job, outcome)| ChapterReport {
                title: job.chapter.title,
                file_name: job.file_name,
                outcome,
            })
            .collect())
    }
}

struct ChapterTask {
    index: usize,
    job: ChapterJob,
    source: Arc<SourceDocument>,
    output_dir: PathBuf,
    materializer: Arc<dyn ChapterMaterializer>,
    cancel: Arc<AtomicBool>,
    abandon: Arc<AtomicBool>,
    events: Sender<ChapterEvent>,
}

impl ChapterTask {
    fn run(self) {
        if self.abandon.load(Ordering::SeqCst) {
            return;
        }
        if self.cancel.load(Ordering::SeqCst) {
            let _ = self
                .events
                .send(ChapterEvent::Finished(self.index, ChapterOutcome::Cancelled));
            return;
        }

        let _ = self.events.send(ChapterEvent::Started(self.index, Instant::now()));
        let result = catch_unwind(AssertUnwindSafe(|| {
            self.materializer
                .materialize(&self.source, &self.job, &self.output_dir)
        }));
        let outcome = match result {
            Ok(Ok(path)) => {
                info!("Created {}", path.display());
                ChapterOutcome::Created(path)
            }
            Ok(Err(e)) => {
                error!("Chapter '{}' failed: {e}", self.job.chapter.title);
                ChapterOutcome::Failed(e.to_string())
            }
            Err(_) => {
                error!("Chapter '{}' panicked", self.job.chapter.title);
                ChapterOutcome::Failed("chapter worker panicked".to_string())
            }
        };
        let _ = self.events.send(ChapterEvent::Finished(self.index, outcome));
    }
}

/// Gather one outcome per chapter, enforcing `timeout` on running chapters.
fn collect_outcomes(
    events: &mpsc::Receiver<ChapterEvent>,
    count: usize,
    workers: usize,
    timeout: Duration,
    abandon: &AtomicBool,
) -> Vec<ChapterOutcome> {
    let mut outcomes: Vec<Option<ChapterOutcome>> = vec![None; count];
    let mut running: HashMap<usize, Instant> = HashMap::new();
    let mut stuck: HashSet<usize> = HashSet::new();
    let mut pending = count;

    while pending > 0 {
        let now = Instant::now();
        let wait = running
            .values()
            .map(|started| (*started + timeout).saturating_duration_since(now))
            .min()
            .unwrap_or(timeout);

        match events.recv_timeout(wait) {
            Ok(ChapterEvent::Started(index, at)) => {
                running.insert(index, at);
            }
            Ok(ChapterEvent::Finished(index, outcome)) => {
                running.remove(&index);
                if stuck.remove(&index) {
                    debug!("Chapter {index} finished after timing out");
                    continue;
                }
                outcomes[index] = Some(outcome);
                pending -= 1;
            }
            Err(RecvTimeoutError::Timeout) => {
                let now = Instant::now();
                let expired: Vec<usize> = running
                    .iter()
                    .filter(|(_, started)| now.duration_since(**started) >= timeout)
                    .map(|(index, _)| *index)
                    .collect();
                for index in expired {
                    warn!("Chapter {index} timed out after {timeout:?}");
                    running.remove(&index);
                    stuck.insert(index);
                    outcomes[index] = Some(ChapterOutcome::TimedOut);
                    pending -= 1;
                }

                if pending > 0 && stuck.len() >= workers {
                    warn!("All chapter workers are stuck, giving up on {pending} chapters");
                    abandon.store(true, Ordering::SeqCst);
                    break;
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    outcomes
        .into_iter()
        .map(|outcome| {
            outcome.unwrap_or_else(|| ChapterOutcome::Failed("chapter was never run".to_string()))
        })
        .collect()
}
