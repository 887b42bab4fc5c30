// WHY: plays are independent, so the corpus is converted concurrently; each task owns its
// document state and only the summary counters are merged, by addition, after completion

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::extractor::resolver::ConversionConfig;
use crate::extractor::{extract_play, DocumentReport};
use crate::incremental::{generate_output_path, generate_tei_path, should_process_file, write_complete_output};
use crate::prenormalize::prenormalize;
use crate::reader::{AsyncFileReader, ReadStats, ReaderConfig};
use crate::sources::SourceTable;
use crate::tei::{render_tei, TeiOptions};

/// Everything the corpus driver needs besides the file list
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub out_dir: PathBuf,
    /// Documents converted concurrently
    pub jobs: usize,
    pub overwrite_all: bool,
    pub fail_fast: bool,
    pub use_mmap: bool,
    pub prenormalize: bool,
    pub emit_json: bool,
    pub show_progress: bool,
    pub conversion: ConversionConfig,
    /// Date recorded in each output's revision history
    pub change_date: String,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("tei"),
            jobs: num_cpus::get(),
            overwrite_all: false,
            fail_fast: false,
            use_mmap: false,
            prenormalize: false,
            emit_json: false,
            show_progress: false,
            conversion: ConversionConfig::default(),
            change_date: TeiOptions::default().change_date,
        }
    }
}

/// Per-file processing statistics
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct FileStats {
    /// Source page path
    pub path: String,
    pub lines_read: u64,
    pub acts_found: usize,
    pub scenes_found: usize,
    pub cast_members: usize,
    /// Speaker identifiers left unresolved
    pub unresolved_ids: Vec<String>,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
    /// Processing status (success, skipped, failed)
    pub status: String,
    /// Error message if processing failed
    pub error: Option<String>,
}

/// Aggregate counters over a corpus run
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total_plays: usize,
    pub plays_without_acts: usize,
    pub plays_without_cast: usize,
    pub plays_with_undeclared_ids: usize,
    pub plays_with_unguessed_ids: usize,
    pub plays_with_matching_act_count: usize,
    pub plays_with_scene_list: usize,
    pub files_converted: usize,
    pub files_skipped: usize,
    pub files_failed: usize,
}

impl RunSummary {
    /// Count one extracted play
    pub fn record(&mut self, report: &DocumentReport) {
        self.total_plays += 1;
        self.plays_without_acts += usize::from(report.acts_found == 0);
        self.plays_without_cast += usize::from(!report.cast_found);
        self.plays_with_undeclared_ids += usize::from(report.undeclared_ids > 0);
        self.plays_with_unguessed_ids += usize::from(report.has_unguessed());
        self.plays_with_matching_act_count += usize::from(report.act_count_matches());
        self.plays_with_scene_list += usize::from(report.scene_list_found);
    }

    pub fn merge(&mut self, other: &RunSummary) {
        self.total_plays += other.total_plays;
        self.plays_without_acts += other.plays_without_acts;
        self.plays_without_cast += other.plays_without_cast;
        self.plays_with_undeclared_ids += other.plays_with_undeclared_ids;
        self.plays_with_unguessed_ids += other.plays_with_unguessed_ids;
        self.plays_with_matching_act_count += other.plays_with_matching_act_count;
        self.plays_with_scene_list += other.plays_with_scene_list;
        self.files_converted += other.files_converted;
        self.files_skipped += other.files_skipped;
        self.files_failed += other.files_failed;
    }

    /// Human-readable report, one labelled count per line
    pub fn render_text(&self) -> String {
        [
            ("Total number of plays", self.total_plays),
            ("Plays with no acts found", self.plays_without_acts),
            ("Plays with no cast of characters found", self.plays_without_cast),
            ("Plays with undeclared character ids", self.plays_with_undeclared_ids),
            ("Plays with at least one character that could not be guessed", self.plays_with_unguessed_ids),
            ("Plays whose declared act count matches the acts found", self.plays_with_matching_act_count),
            ("Plays with a scene list", self.plays_with_scene_list),
            ("Files converted", self.files_converted),
            ("Files skipped", self.files_skipped),
            ("Files failed", self.files_failed),
        ]
        .iter()
        .map(|(label, count)| format!("{label} : {count}\n"))
        .collect()
    }
}

/// Result of a corpus run, written to the stats file
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RunStats {
    pub summary: RunSummary,
    pub total_time_ms: u64,
    pub files: Vec<FileStats>,
}

struct FileOutcome {
    stats: FileStats,
    summary: RunSummary,
}

impl FileOutcome {
    fn skipped(path: &Path) -> Self {
        Self {
            stats: FileStats {
                path: path.display().to_string(),
                status: "skipped".to_string(),
                ..Default::default()
            },
            summary: RunSummary {
                files_skipped: 1,
                ..Default::default()
            },
        }
    }

    fn failed(mut stats: FileStats, error: String) -> Self {
        stats.status = "failed".to_string();
        stats.error = Some(error);
        Self {
            stats,
            summary: RunSummary {
                files_failed: 1,
                ..Default::default()
            },
        }
    }
}

fn progress_bar(total: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(total as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} plays ({percent}%) {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar
}

async fn read_source(path: &Path, options: &RunOptions) -> Result<(Vec<String>, ReadStats)> {
    let reader_config = ReaderConfig {
        fail_fast: options.fail_fast,
        ..Default::default()
    };
    if options.use_mmap {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || AsyncFileReader::new(reader_config).read_file_mmap(path))
            .await
            .context("Read task panicked")?
    } else {
        AsyncFileReader::new(reader_config).read_file_lines(path).await
    }
}

/// Extract, render and write one play; blocking
fn convert_lines(
    source_path: &Path,
    mut lines: Vec<String>,
    source_url: String,
    options: &RunOptions,
) -> Result<std::result::Result<DocumentReport, String>> {
    if options.prenormalize {
        lines = prenormalize(&lines.join("\n")).lines().map(str::to_string).collect();
    }

    let document = match extract_play(&lines, &options.conversion) {
        Ok(document) => document,
        Err(e) => return Ok(Err(e.to_string())),
    };

    let tei_options = TeiOptions {
        source_url,
        change_date: options.change_date.clone(),
    };
    let tei_path = generate_tei_path(source_path, &options.out_dir);
    write_complete_output(&tei_path, &render_tei(&document, &tei_options))
        .with_context(|| format!("Failed to write {}", tei_path.display()))?;

    if options.emit_json {
        let json_path = generate_output_path(source_path, &options.out_dir, "json");
        let json = serde_json::to_string_pretty(&document)?;
        write_complete_output(&json_path, &json).with_context(|| format!("Failed to write {}", json_path.display()))?;
    }

    debug!("Wrote {}", tei_path.display());
    Ok(Ok(document.report))
}

async fn convert_file(path: PathBuf, sources: Arc<SourceTable>, options: Arc<RunOptions>) -> Result<FileOutcome> {
    if !should_process_file(&path, &options.out_dir, options.overwrite_all) {
        debug!("Skipping {}: output complete", path.display());
        return Ok(FileOutcome::skipped(&path));
    }

    let start = Instant::now();
    let mut stats = FileStats {
        path: path.display().to_string(),
        ..Default::default()
    };

    let (lines, read_stats) = read_source(&path, &options).await?;
    stats.lines_read = read_stats.lines_read;
    if let Some(error) = read_stats.read_error {
        return Ok(FileOutcome::failed(stats, error));
    }

    let file_name = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
    let source_url = sources.source_for(&file_name).to_string();
    let task_path = path.clone();
    let task_options = Arc::clone(&options);
    let converted = tokio::task::spawn_blocking(move || convert_lines(&task_path, lines, source_url, &task_options))
        .await
        .context("Conversion task panicked")??;

    stats.processing_time_ms = start.elapsed().as_millis() as u64;
    match converted {
        Ok(report) => {
            let mut summary = RunSummary {
                files_converted: 1,
                ..Default::default()
            };
            summary.record(&report);
            stats.acts_found = report.acts_found;
            stats.scenes_found = report.scenes_found;
            stats.cast_members = report.cast_members;
            stats.unresolved_ids = report.unresolved_ids.clone();
            stats.status = "success".to_string();
            Ok(FileOutcome { stats, summary })
        }
        Err(error) => {
            warn!("Conversion failed for {}: {}", path.display(), error);
            if options.fail_fast {
                anyhow::bail!("Conversion failed for {}: {}", path.display(), error);
            }
            Ok(FileOutcome::failed(stats, error))
        }
    }
}

/// Convert every page in `files`, at most `options.jobs` at a time
pub async fn process_files_parallel(
    files: &[PathBuf],
    sources: Arc<SourceTable>,
    options: RunOptions,
) -> Result<RunStats> {
    let start = Instant::now();
    let jobs = options.jobs.max(1);
    let options = Arc::new(options);
    let bar = progress_bar(files.len(), options.show_progress);

    info!("Converting {} plays with {} concurrent jobs", files.len(), jobs);

    let mut outcomes = stream::iter(files.iter().cloned())
        .map(|path| convert_file(path, Arc::clone(&sources), Arc::clone(&options)))
        .buffer_unordered(jobs);

    let mut run = RunStats::default();
    while let Some(outcome) = outcomes.next().await {
        let outcome = outcome?;
        if let Some(error) = &outcome.stats.error {
            bar.set_message(format!("failed: {error}"));
        }
        run.summary.merge(&outcome.summary);
        run.files.push(outcome.stats);
        bar.inc(1);
    }
    bar.finish_and_clear();

    run.files.sort_by(|a, b| a.path.cmp(&b.path));
    run.total_time_ms = start.elapsed().as_millis() as u64;
    info!(
        "Run complete: {} converted, {} skipped, {} failed in {}ms",
        run.summary.files_converted, run.summary.files_skipped, run.summary.files_failed, run.total_time_ms
    );
    Ok(run)
}

/// Write the JSON stats file
pub async fn write_run_stats(path: &Path, stats: &RunStats) -> Result<()> {
    let json = serde_json::to_string_pretty(stats)?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write stats to {}", path.display()))
}
