//! CLI binary for edgequake-pdf2jpeg.
//!
//! A thin shim over the library crate: reads a trigger event (or a single
//! bucket/key), maps flags to `ConversionConfig`, runs the job driver and
//! prints the outcome.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_pdf2jpeg::{
    ConversionConfig, ConversionProgressCallback, ConversionSummary, JobDriver, JobOutcome,
    LocalStores, PageError, PdfiumSource, ProgressCallback, RecordStatus, S3Event, S3Stores,
    StoreProvider,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one progress bar per document plus a log line
/// per page. Pages complete out of order, so per-page timings are keyed by
/// page number.
struct CliProgressCallback {
    bar: Mutex<Option<ProgressBar>>,
    start_times: Mutex<HashMap<usize, Instant>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            bar: Mutex::new(None),
            start_times: Mutex::new(HashMap::new()),
        })
    }

    fn println(&self, line: String) {
        match self.bar.lock().unwrap().as_ref() {
            Some(bar) => bar.println(line),
            None => eprintln!("{line}"),
        }
    }

    fn elapsed_secs(&self, page_num: usize) -> f64 {
        self.start_times
            .lock()
            .unwrap()
            .remove(&page_num)
            .map(|t| t.elapsed().as_millis())
            .unwrap_or(0) as f64
            / 1000.0
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_pages: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        let bar = ProgressBar::new(total_pages as u64);
        bar.set_style(style);
        bar.set_prefix("Converting");
        bar.enable_steady_tick(Duration::from_millis(80));
        bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Starting conversion of {total_pages} pages…"))
        ));
        *self.bar.lock().unwrap() = Some(bar);
    }

    fn on_page_start(&self, page_num: usize, _total: usize) {
        self.start_times
            .lock()
            .unwrap()
            .insert(page_num, Instant::now());
    }

    fn on_page_complete(&self, page_num: usize, total: usize, key: &str, bytes: usize) {
        let secs = self.elapsed_secs(page_num);
        self.println(format!(
            "  {} Page {:>3}/{:<3}  {:<10}  {}  {}",
            green("✓"),
            page_num,
            total,
            dim(&format!("{:>7} B", bytes)),
            key,
            dim(&format!("{secs:.1}s")),
        ));
        if let Some(bar) = self.bar.lock().unwrap().as_ref() {
            bar.inc(1);
        }
    }

    fn on_page_error(&self, error: &PageError, total: usize) {
        let secs = self.elapsed_secs(error.page());
        let msg = error.to_string();
        // Truncate very long error messages to keep output tidy.
        let msg = if msg.chars().count() > 80 {
            format!("{}\u{2026}", msg.chars().take(79).collect::<String>())
        } else {
            msg
        };
        self.println(format!(
            "  {} Page {:>3}/{:<3}  {}  {}",
            red("✗"),
            error.page(),
            total,
            red(&msg),
            dim(&format!("{secs:.1}s")),
        ));
        if let Some(bar) = self.bar.lock().unwrap().as_ref() {
            bar.inc(1);
        }
    }

    fn on_conversion_complete(&self, summary: &ConversionSummary) {
        if let Some(bar) = self.bar.lock().unwrap().take() {
            bar.finish_and_clear();
        }
        let failed = summary.failed_pages();
        if failed == 0 {
            eprintln!(
                "{} {} pages of {} converted",
                green("✔"),
                bold(&summary.processed_pages().to_string()),
                summary.prefix
            );
        } else {
            eprintln!(
                "{} {}/{} pages of {} converted  ({} failed)",
                if failed == summary.total_pages {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&summary.processed_pages().to_string()),
                summary.total_pages,
                summary.prefix,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert one object in S3 (credentials from the AWS environment)
  pdf2jpeg --bucket inbox --key reports/q3.pdf

  # Replay an S3 event notification
  pdf2jpeg --event event.json

  # Read the event from stdin, print the outcome as JSON
  cat event.json | pdf2jpeg --event - --json

  # Offline: buckets are directories under ./data
  pdf2jpeg --local-root ./data --bucket inbox --key reports/q3.pdf

  # MinIO or another S3-compatible endpoint
  pdf2jpeg --endpoint-url http://localhost:9000 --bucket inbox --key q3.pdf

OUTPUT:
  Page N of <stem>.pdf is written to <stem>-N.jpeg in the same bucket.

ENVIRONMENT VARIABLES:
  AWS_REGION, AWS_PROFILE, AWS_ACCESS_KEY_ID, ...   standard AWS configuration
  PDFIUM_LIB_PATH         Path to libpdfium; otherwise the system library is used
  RUST_LOG                Overrides the log filter (e.g. edgequake_pdf2jpeg=debug)
"#;

/// Rasterise PDFs in an object store into per-page JPEG images.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2jpeg",
    version,
    about = "Rasterise PDFs in an object store into per-page JPEG images",
    long_about = "Rasterise every page of PDF documents stored in S3 (or a local directory \
standing in for buckets) into JPEG images stored next to the source. Pages are converted \
concurrently with a bounded number in flight; a failing page is reported and skipped.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// S3 event notification JSON file, or '-' for stdin.
    #[arg(long, conflicts_with_all = ["bucket", "key"])]
    event: Option<String>,

    /// Bucket holding the document (with --key).
    #[arg(long, requires = "key")]
    bucket: Option<String>,

    /// Object key of the document (with --bucket).
    #[arg(long, requires = "bucket")]
    key: Option<String>,

    /// Use a local directory as the object store; buckets are sub-directories.
    #[arg(long, env = "PDF2JPEG_LOCAL_ROOT", conflicts_with = "endpoint_url")]
    local_root: Option<PathBuf>,

    /// Custom S3-compatible endpoint (path-style addressing).
    #[arg(long, env = "PDF2JPEG_ENDPOINT_URL")]
    endpoint_url: Option<String>,

    /// Maximum number of pages converted at once.
    #[arg(short, long, env = "PDF2JPEG_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// JPEG quality (1–100).
    #[arg(long, env = "PDF2JPEG_QUALITY", default_value_t = 75,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,

    /// Longest rendered edge in pixels.
    #[arg(long, env = "PDF2JPEG_MAX_PIXELS", default_value_t = 2000)]
    max_pixels: u32,

    /// Suffix identifying source documents.
    #[arg(long, env = "PDF2JPEG_SUFFIX", default_value = ".pdf")]
    suffix: String,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF2JPEG_PASSWORD")]
    password: Option<String>,

    /// Print the job outcome as JSON on stdout.
    #[arg(long, env = "PDF2JPEG_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2JPEG_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2JPEG_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2JPEG_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let event = load_event(&cli).await?;

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Collaborators, built once ────────────────────────────────────────
    let source =
        PdfiumSource::bind().context("Failed to bind PDFium engine")?;

    let stores: Arc<dyn StoreProvider> = match &cli.local_root {
        Some(root) => Arc::new(LocalStores::new(root)),
        None => Arc::new(S3Stores::from_env(cli.endpoint_url.as_deref()).await),
    };

    let driver = JobDriver::new(Arc::new(source), stores, config);

    // ── Run ──────────────────────────────────────────────────────────────
    let outcome = driver.handle_event(&event).await;

    if cli.json {
        let json =
            serde_json::to_string_pretty(&outcome).context("Failed to serialise outcome")?;
        println!("{json}");
    } else if !cli.quiet {
        print_outcome(&outcome);
    }

    if outcome.failed() > 0 {
        anyhow::bail!(
            "{} of {} records failed",
            outcome.failed(),
            outcome.records.len()
        );
    }
    Ok(())
}

/// Read the trigger from `--event` or build one from `--bucket/--key`.
async fn load_event(cli: &Cli) -> Result<S3Event> {
    match (&cli.event, &cli.bucket, &cli.key) {
        (Some(path), _, _) => {
            let payload = if path == "-" {
                let mut buf = String::new();
                io::stdin()
                    .read_to_string(&mut buf)
                    .context("Failed to read event from stdin")?;
                buf
            } else {
                tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read event from {path}"))?
            };
            S3Event::from_json(&payload).context("Invalid event payload")
        }
        (None, Some(bucket), Some(key)) => Ok(S3Event::single(bucket.clone(), key)),
        _ => anyhow::bail!("Provide --event <FILE|-> or both --bucket and --key"),
    }
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .concurrency(cli.concurrency)
        .jpeg_quality(cli.quality)
        .max_rendered_pixels(cli.max_pixels)
        .source_suffix(cli.suffix.clone());

    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_outcome(outcome: &JobOutcome) {
    for record in &outcome.records {
        let location = format!("{}/{}", record.bucket, record.key);
        match &record.status {
            RecordStatus::Converted(summary) => eprintln!(
                "{}  {}  {}/{} pages  {}ms",
                if summary.failures.is_empty() {
                    green("✔")
                } else {
                    cyan("⚠")
                },
                bold(&location),
                summary.processed_pages(),
                summary.total_pages,
                summary.duration_ms
            ),
            RecordStatus::Skipped { reason } => {
                eprintln!("{}  {}  {}", dim("–"), location, dim(reason))
            }
            RecordStatus::Failed { error } => {
                eprintln!("{}  {}  {}", red("✘"), bold(&location), red(error))
            }
        }
    }
}
