use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, warn, Level};

use textprep::reader::{AsyncLineReader, InputSource, ReaderConfig};
use textprep::{Preprocessor, PreprocessorConfig, Sentence};

#[derive(Parser, Debug)]
#[command(name = "textprep")]
#[command(about = "Tokenize lines of lightly marked-up text into words and tags, one JSON record per line")]
#[command(version)]
struct Args {
    /// Input file, or - for stdin
    input: PathBuf,

    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Language code for spacing rules (overrides the config file)
    #[arg(long)]
    language: Option<String>,

    /// Keep tags in the re-assembled text
    #[arg(long)]
    with_tags: bool,

    /// Abort on the first unreadable or unprocessable line
    #[arg(long)]
    fail_fast: bool,

    /// Debug-level logging
    #[arg(long)]
    verbose: bool,

    /// Stats output file path
    #[arg(long)]
    stats_out: Option<PathBuf>,
}

#[derive(Serialize)]
struct OutputRecord<'a> {
    line: u64,
    text: String,
    sentence: &'a Sentence,
}

#[derive(Serialize, Debug, Default)]
struct RunStats {
    source: String,
    language: String,
    lines_read: u64,
    sentences: u64,
    words: u64,
    tags: u64,
    failures: u64,
    read_error: Option<String>,
    duration_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // WHY: stdout carries the JSON records, so logs go to stderr
    tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .json()
        .init();

    info!("Starting textprep");
    info!(?args, "Parsed CLI arguments");

    let mut config = match &args.config {
        Some(path) => PreprocessorConfig::from_json_file(path)?,
        None => PreprocessorConfig::default(),
    };
    if let Some(language) = &args.language {
        config.language = language.clone();
    }

    let start_time = std::time::Instant::now();
    let source = InputSource::from_arg(&args.input);
    let reader = AsyncLineReader::new(ReaderConfig {
        fail_fast: args.fail_fast,
        ..ReaderConfig::default()
    });
    let (lines, read_stats) = reader.read_source(&source).await?;

    let mut stats = RunStats {
        source: read_stats.source,
        language: config.language.clone(),
        lines_read: read_stats.lines_read,
        read_error: read_stats.read_error,
        ..RunStats::default()
    };

    let preprocessor = Preprocessor::new(config);
    let stdout = std::io::stdout();
    let mut out = std::io::BufWriter::new(stdout.lock());

    for (index, line) in lines.iter().enumerate() {
        let line_number = index as u64 + 1;
        let sentence = match preprocessor.process(line) {
            Ok(sentence) => sentence,
            Err(e) => {
                stats.failures += 1;
                if args.fail_fast {
                    return Err(e).with_context(|| format!("Failed to process line {}", line_number));
                }
                warn!("Skipping line {} ({:?}): {}", line_number, e.category(), e);
                continue;
            }
        };

        stats.sentences += 1;
        stats.words += sentence.words.len() as u64;
        stats.tags += sentence.tags.len() as u64;

        let record = OutputRecord {
            line: line_number,
            text: sentence.to_text(args.with_tags),
            sentence: &sentence,
        };
        serde_json::to_writer(&mut out, &record)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    drop(out);

    stats.duration_ms = start_time.elapsed().as_millis() as u64;
    info!(
        "Processed {} sentences ({} words, {} tags, {} failures) in {}ms",
        stats.sentences, stats.words, stats.tags, stats.failures, stats.duration_ms
    );

    if let Some(path) = &args.stats_out {
        let json = serde_json::to_string_pretty(&stats)?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("Failed to write stats to {}", path.display()))?;
        info!("Stats written to {}", path.display());
    }

    Ok(())
}
