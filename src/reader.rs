use anyhow::Result;
use memmap2::MmapOptions;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

/// Configuration for file reading behavior
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Whether to fail fast on first error or continue processing
    pub fail_fast: bool,
    /// Buffer size for async reading (default: 8KB)
    pub buffer_size: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            fail_fast: false,
            buffer_size: 8192,
        }
    }
}

/// Statistics for file reading operations
#[derive(Debug, Clone, Default)]
pub struct ReadStats {
    pub file_path: String,
    pub lines_read: u64,
    pub bytes_read: u64,
    pub duration_ms: u64,
    pub read_error: Option<String>,
}

/// Async file reader that streams page contents line-by-line
pub struct AsyncFileReader {
    config: ReaderConfig,
}

impl AsyncFileReader {
    pub fn new(config: ReaderConfig) -> Self {
        Self { config }
    }

    fn failed(
        &self,
        path: &Path,
        lines: Vec<String>,
        mut stats: ReadStats,
        error_msg: String,
    ) -> Result<(Vec<String>, ReadStats)> {
        warn!("{}", error_msg);
        if self.config.fail_fast {
            return Err(anyhow::anyhow!(error_msg));
        }
        debug!("Continuing after read error in {}", path.display());
        stats.read_error = Some(error_msg);
        Ok((lines, stats))
    }

    /// Read file contents line-by-line with async buffered I/O.
    /// Returns the lines and final read statistics; without fail_fast, errors come back in the stats.
    pub async fn read_file_lines<P: AsRef<Path>>(
        &self,
        file_path: P,
    ) -> Result<(Vec<String>, ReadStats)> {
        let path = file_path.as_ref();
        let start_time = std::time::Instant::now();
        let mut stats = ReadStats {
            file_path: path.display().to_string(),
            ..Default::default()
        };

        debug!("Starting async read of file: {}", path.display());

        let file = match File::open(path).await {
            Ok(file) => file,
            Err(e) => {
                stats.duration_ms = start_time.elapsed().as_millis() as u64;
                let error_msg = format!("Failed to open file {}: {}", path.display(), e);
                return self.failed(path, Vec::new(), stats, error_msg);
            }
        };

        let reader = BufReader::with_capacity(self.config.buffer_size, file);
        let mut lines = reader.lines();
        let mut result_lines = Vec::new();

        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    stats.bytes_read += line.len() as u64 + 1;
                    stats.lines_read += 1;
                    result_lines.push(line);
                }
                Ok(None) => break,
                Err(e) => {
                    stats.duration_ms = start_time.elapsed().as_millis() as u64;
                    let error_msg = format!(
                        "UTF-8 decoding error in {} at line {}: {}",
                        path.display(),
                        stats.lines_read + 1,
                        e
                    );
                    return self.failed(path, result_lines, stats, error_msg);
                }
            }
        }

        stats.duration_ms = start_time.elapsed().as_millis() as u64;
        info!(
            "Read {}: {} lines, {} bytes in {}ms",
            path.display(),
            stats.lines_read,
            stats.bytes_read,
            stats.duration_ms
        );
        Ok((result_lines, stats))
    }

    /// Whole-file read through a memory map; blocking, meant for `spawn_blocking`
    pub fn read_file_mmap<P: AsRef<Path>>(&self, file_path: P) -> Result<(Vec<String>, ReadStats)> {
        let path = file_path.as_ref();
        let start_time = std::time::Instant::now();
        let mut stats = ReadStats {
            file_path: path.display().to_string(),
            ..Default::default()
        };

        let file = match std::fs::File::open(path) {
            Ok(file) => file,
            Err(e) => {
                let error_msg = format!("Failed to open file {}: {}", path.display(), e);
                return self.failed(path, Vec::new(), stats, error_msg);
            }
        };
        if file.metadata()?.len() == 0 {
            return Ok((Vec::new(), stats));
        }

        // SAFETY: the mapping is read-only and dropped before returning. Reading it assumes the
        // page is not truncated or rewritten by another process while mapped, which would fault
        // or change the bytes under the UTF-8 check; input pages are never written during a run.
        let mmap = unsafe { MmapOptions::new().map(&file)? };
        let content = match std::str::from_utf8(&mmap) {
            Ok(content) => content,
            Err(e) => {
                let error_msg = format!("UTF-8 decoding error in {}: {}", path.display(), e);
                return self.failed(path, Vec::new(), stats, error_msg);
            }
        };

        let lines: Vec<String> = content.lines().map(str::to_string).collect();
        stats.lines_read = lines.len() as u64;
        stats.bytes_read = mmap.len() as u64;
        stats.duration_ms = start_time.elapsed().as_millis() as u64;
        debug!("Mapped {}: {} lines", path.display(), stats.lines_read);
        Ok((lines, stats))
    }
}
