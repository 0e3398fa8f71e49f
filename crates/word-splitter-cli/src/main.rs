use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, warn};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use word_splitter_config::{Config, Settings};
use word_splitter_engine::{
    BatchOptions, BatchProcessor, BatchReport, DocumentReport, DocumentStatus,
    HeuristicClassifier, OutlineClassifier, StructuralClassifier, io,
};

#[derive(Debug, Parser)]
#[command(name = "word-splitter")]
#[command(version, about = "Split Word documents into one file per chapter", long_about = None)]
struct Cli {
    /// Directory containing the .docx/.doc files to split
    #[arg(short, long, value_name = "DIR")]
    input: Option<PathBuf>,

    /// Directory receiving one sub-directory per document
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Preferred heading level to split at (1-6)
    #[arg(short, long, allow_negative_numbers = true)]
    level: Option<i64>,

    /// Documents processed in parallel (1-16)
    #[arg(long, allow_negative_numbers = true)]
    doc_workers: Option<i64>,

    /// Chapters written in parallel per document (1-8)
    #[arg(long, allow_negative_numbers = true)]
    chapter_workers: Option<i64>,

    /// Seconds allowed per chapter before it is given up on
    #[arg(long, value_name = "SECONDS", allow_negative_numbers = true)]
    timeout: Option<i64>,

    /// Also detect headings from bold, large or numbered lines
    #[arg(long)]
    heuristic: bool,

    /// File receiving the detailed log
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Configuration file to use instead of the default location
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl Cli {
    /// Command line values take precedence over the configuration file.
    fn apply(&self, config: &mut Config) {
        if let Some(input) = &self.input {
            config.input_dir = input.clone();
        }
        if let Some(output) = &self.output {
            config.output_dir = output.clone();
        }
        if let Some(level) = self.level {
            config.target_level = level;
        }
        if let Some(workers) = self.doc_workers {
            config.doc_workers = workers;
        }
        if let Some(workers) = self.chapter_workers {
            config.chapter_workers = workers;
        }
        if let Some(timeout) = self.timeout {
            config.chapter_timeout_secs = timeout;
        }
        if self.heuristic {
            config.heuristic_headings = true;
        }
        if let Some(log_file) = &self.log_file {
            config.log_file = log_file.clone();
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let code = match run(&cli) {
        Ok(()) => 0,
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            1
        }
    };
    process::exit(code);
}

fn run(cli: &Cli) -> Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let (loaded, config_error) = match Config::load_from_path(&config_path) {
        Ok(loaded) => (loaded, None),
        Err(e) => (None, Some(e)),
    };
    let mut config = loaded.unwrap_or_default();
    cli.apply(&mut config);
    let (settings, warnings) = config.validate();

    init_logging(&settings.log_file);
    info!("word-splitter starting up");
    info!("Config path: {}", config_path.display());

    if let Some(e) = config_error {
        warn!("{e}, using defaults");
        eprintln!("Warning: {e}, using defaults");
    }
    for warning in &warnings {
        warn!("{warning}");
        eprintln!("Warning: {warning}");
    }

    if io::validate_input_dir(&settings.input_dir).is_err() {
        warn!("Input directory {} not found", settings.input_dir.display());
        println!(
            "Input directory {} does not exist, nothing to do",
            settings.input_dir.display()
        );
        return Ok(());
    }

    let files = io::scan_documents(&settings.input_dir)
        .with_context(|| format!("Failed to scan {}", settings.input_dir.display()))?;
    if files.is_empty() {
        println!("No Word documents found in {}", settings.input_dir.display());
        return Ok(());
    }
    println!("Splitting {} documents from {}", files.len(), settings.input_dir.display());

    let cancel = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&cancel);
    ctrlc::set_handler(move || {
        handler_flag.store(true, Ordering::SeqCst);
        eprintln!("Interrupted, finishing chapters in progress...");
    })
    .context("Failed to install Ctrl-C handler")?;

    let processor = BatchProcessor::new(batch_options(&settings))
        .with_classifier(classifier(settings.heuristic_headings))
        .with_cancel_flag(cancel);
    let report = processor
        .process_files(&files, &settings.output_dir)
        .context("Batch processing failed")?;

    print_summary(&report, &settings.output_dir);
    Ok(())
}

fn batch_options(settings: &Settings) -> BatchOptions {
    BatchOptions {
        target_level: settings.target_level,
        doc_workers: settings.doc_workers,
        chapter_workers: settings.chapter_workers,
        chapter_timeout: settings.chapter_timeout,
    }
}

fn classifier(heuristic: bool) -> Arc<dyn OutlineClassifier> {
    if heuristic {
        Arc::new(StructuralClassifier.or_else(HeuristicClassifier::default()))
    } else {
        Arc::new(StructuralClassifier)
    }
}

/// Log to `log_file`, or to stderr when it cannot be opened.
fn init_logging(log_file: &Path) {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(log::LevelFilter::Info)
        .parse_default_env();

    let file = OpenOptions::new().create(true).append(true).open(log_file);
    match file {
        Ok(file) => {
            builder
                .target(env_logger::Target::Pipe(Box::new(file)))
                .write_style(env_logger::WriteStyle::Never)
                .init();
        }
        Err(e) => {
            builder.init();
            warn!("Cannot open log file {}: {e}", log_file.display());
        }
    }
}

fn describe(document: &DocumentReport) -> String {
    match &document.status {
        DocumentStatus::Completed => format!(
            "{} chapters created, {} failed",
            document.created(),
            document.failed()
        ),
        DocumentStatus::Skipped => "no headings found, skipped".to_string(),
        DocumentStatus::LoadFailed(reason) => format!("could not be read: {reason}"),
        DocumentStatus::Failed(reason) => format!("failed: {reason}"),
        DocumentStatus::Cancelled => "cancelled".to_string(),
    }
}

fn print_summary(report: &BatchReport, output_dir: &Path) {
    for document in &report.documents {
        let name = document
            .source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        println!("  {name}: {}", describe(document));
    }

    let cancelled = report.count(|s| *s == DocumentStatus::Cancelled);
    println!(
        "Done in {:.2?}: {} chapters created, {} failed, output in {}",
        report.elapsed,
        report.total_created(),
        report.total_failed(),
        output_dir.display()
    );
    if cancelled > 0 {
        println!("{cancelled} documents were not processed because of the interrupt");
    }
    info!(
        "Batch finished in {:.2?}: {} created, {} failed, {cancelled} cancelled",
        report.elapsed,
        report.total_created(),
        report.total_failed()
    );
}
