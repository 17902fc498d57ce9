// WHY: Async line input for the CLI, one sentence per line from a file or stdin
// Read failures either abort or end the input early, depending on fail_fast

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

/// Configuration for line reading behavior
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Whether to fail on the first read error or keep the lines read so far
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

/// Where input lines come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl InputSource {
    /// `-` selects stdin, anything else is a file path
    pub fn from_arg(arg: &Path) -> Self {
        if arg == Path::new("-") {
            InputSource::Stdin
        } else {
            InputSource::File(arg.to_path_buf())
        }
    }

    pub fn label(&self) -> String {
        match self {
            InputSource::Stdin => "<stdin>".to_string(),
            InputSource::File(path) => path.display().to_string(),
        }
    }
}

/// Statistics for one read
#[derive(Debug, Clone, Default)]
pub struct ReadStats {
    pub source: String,
    pub lines_read: u64,
    pub bytes_read: u64,
    pub duration_ms: u64,
    pub read_error: Option<String>,
}

/// Async reader that collects input lines
pub struct AsyncLineReader {
    config: ReaderConfig,
}

impl AsyncLineReader {
    pub fn new(config: ReaderConfig) -> Self {
        Self { config }
    }

    pub async fn read_source(&self, source: &InputSource) -> Result<(Vec<String>, ReadStats)> {
        match source {
            InputSource::Stdin => {
                let reader = BufReader::with_capacity(self.config.buffer_size, tokio::io::stdin());
                self.read_lines(reader, &source.label()).await
            }
            InputSource::File(path) => {
                let file = File::open(path)
                    .await
                    .with_context(|| format!("Failed to open input file {}", path.display()))?;
                let reader = BufReader::with_capacity(self.config.buffer_size, file);
                self.read_lines(reader, &source.label()).await
            }
        }
    }

    /// Read every line from `reader`; `label` names the source in logs and stats
    pub async fn read_lines<R>(&self, reader: R, label: &str) -> Result<(Vec<String>, ReadStats)>
    where
        R: AsyncBufRead + Unpin,
    {
        let start_time = std::time::Instant::now();
        debug!("Starting async read of {}", label);

        let mut lines = reader.lines();
        let mut result_lines = Vec::new();
        let mut stats = ReadStats {
            source: label.to_string(),
            ..ReadStats::default()
        };

        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    stats.bytes_read += line.len() as u64 + 1;
                    stats.lines_read += 1;
                    result_lines.push(line);
                }
                Ok(None) => break,
                Err(e) => {
                    let error_msg = format!(
                        "Read error in {} at line {}: {}",
                        label,
                        stats.lines_read + 1,
                        e
                    );
                    warn!("{}", error_msg);

                    if self.config.fail_fast {
                        return Err(anyhow::anyhow!(error_msg));
                    }
                    stats.read_error = Some(error_msg);
                    break;
                }
            }
        }

        stats.duration_ms = start_time.elapsed().as_millis() as u64;
        info!(
            "Read {}: {} lines, {} bytes in {}ms",
            label, stats.lines_read, stats.bytes_read, stats.duration_ms
        );
        Ok((result_lines, stats))
    }
}
