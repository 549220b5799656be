//! CLI binary for transcript-eligibility.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `PipelineConfig` and prints the verdict.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use transcript_eligibility::{
    process, process_to_file, Eligibility, OcrBackend, PipelineConfig, PipelineProgressCallback,
    PipelineResult, ProgressCallback, DEFAULT_THRESHOLD,
};

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

fn colour_verdict(v: Eligibility) -> String {
    match v {
        Eligibility::Eligible => green(v.label()),
        Eligibility::ReviewRecommended => yellow(v.label()),
        Eligibility::NotEligible => red(v.label()),
        Eligibility::GpaNotFound => dim(v.label()),
    }
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner naming the page currently being read.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        Self::with_bar(ProgressBar::new_spinner())
    }

    fn with_bar(bar: ProgressBar) -> Arc<Self> {
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}  {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl PipelineProgressCallback for CliProgressCallback {
    fn on_pipeline_start(&self, _document: &str) {
        self.bar.set_message("Loading transcript…");
    }

    fn on_pages_ready(&self, total_pages: usize) {
        self.bar
            .set_message(format!("{total_pages} page(s) ready, starting OCR…"));
    }

    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        self.bar
            .set_message(format!("Reading page {page_num}/{total_pages}"));
    }

    fn on_page_recognized(&self, page_num: usize, total_pages: usize, text_len: usize) {
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            green("✓"),
            page_num,
            total_pages,
            dim(&format!("{text_len:>5} chars")),
        ));
    }

    fn on_pipeline_complete(&self, _eligibility: Eligibility) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Check a scanned PDF against the default threshold (8.0)
  transcript-check transcript.pdf

  # Custom threshold, phone photo
  transcript-check --threshold 7.5 scan.jpg

  # Save the preview image and a JSON report
  transcript-check transcript.pdf --preview page1.png -o report.json

  # Print the raw OCR text for manual review
  transcript-check --show-text transcript.png

  # Use a vision model instead of tesseract
  transcript-check --ocr vision --provider openai --model gpt-4.1-mini scan.jpg

VERDICTS:
  ELIGIBLE            GPA ≥ threshold
  REVIEW RECOMMENDED  threshold − 1 ≤ GPA < threshold
  NOT ELIGIBLE        GPA < threshold − 1
  GPA NOT FOUND       no GPA could be read; verify manually

ENVIRONMENT VARIABLES:
  TRANSCRIPT_THRESHOLD    Default GPA threshold
  PDFIUM_LIB_PATH         Path to libpdfium
  OPENAI_API_KEY          OpenAI API key (vision backend)
  ANTHROPIC_API_KEY       Anthropic API key (vision backend)
  EDGEQUAKE_LLM_PROVIDER  Override vision provider
  EDGEQUAKE_MODEL         Override vision model
"#;

/// Extract name and GPA from a scanned transcript and check eligibility.
#[derive(Parser, Debug)]
#[command(
    name = "transcript-check",
    version,
    about = "Extract name and GPA from a scanned transcript and check eligibility",
    long_about = "Run OCR over a transcript (PDF, PNG, JPG/JPEG; local file or URL), extract \
the student's name and GPA, and classify eligibility against a GPA threshold.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local transcript path or HTTP/HTTPS URL (pdf, png, jpg, jpeg).
    input: String,

    /// Minimum GPA for eligibility (nominally 0.0–10.0).
    #[arg(short, long, env = "TRANSCRIPT_THRESHOLD", default_value_t = DEFAULT_THRESHOLD)]
    threshold: f64,

    /// OCR backend.
    #[arg(long, env = "TRANSCRIPT_OCR", value_enum, default_value = "tesseract")]
    ocr: OcrArg,

    /// Tesseract language code(s), e.g. eng or eng+hin.
    #[arg(long, env = "TRANSCRIPT_LANG", default_value = "eng")]
    lang: String,

    /// Path to the tesseract executable.
    #[arg(long, env = "TESSERACT_PATH", default_value = "tesseract")]
    tesseract_path: PathBuf,

    /// Tesseract page segmentation mode (0–13).
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=13))]
    psm: Option<u8>,

    /// Vision provider: openai, anthropic, gemini, ollama, azure.
    #[arg(long, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// Vision model ID.
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// PDF rendering DPI (72–600).
    #[arg(long, env = "TRANSCRIPT_DPI", default_value_t = 200,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "TRANSCRIPT_PDF_PASSWORD")]
    password: Option<String>,

    /// Path to libpdfium.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Write the JSON report to this file.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Save the preview image (first page) to this file.
    #[arg(long)]
    preview: Option<PathBuf>,

    /// Print the result as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Also print the full OCR text.
    #[arg(long)]
    show_text: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "TRANSCRIPT_NO_PROGRESS")]
    no_progress: bool,

    /// HTTP download timeout in seconds.
    #[arg(long, default_value_t = 120)]
    download_timeout: u64,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors and the verdict.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum OcrArg {
    Tesseract,
    Vision,
}

impl From<OcrArg> for OcrBackend {
    fn from(v: OcrArg) -> Self {
        match v {
            OcrArg::Tesseract => OcrBackend::Tesseract,
            OcrArg::Vision => OcrBackend::Vision,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner covers what INFO logs would say; keep them quiet while it runs.
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

    let spinner = (show_progress && !cli.verbose).then(CliProgressCallback::new);
    let progress_cb: Option<ProgressCallback> = spinner
        .clone()
        .map(|s| s as Arc<dyn PipelineProgressCallback>);

    let config = build_config(&cli, progress_cb)?;

    // ── Run pipeline ─────────────────────────────────────────────────────
    let outcome = match cli.output {
        Some(ref path) => process_to_file(&cli.input, path, &config).await,
        None => process(&cli.input, &config).await,
    };
    // Failed runs never reach `on_pipeline_complete`.
    clear_spinner(spinner.as_deref());
    let result = outcome.context("Transcript processing failed")?;

    if let Some(ref path) = cli.preview {
        result
            .save_preview(path)
            .with_context(|| format!("Failed to save preview to {}", path.display()))?;
    }

    if cli.json {
        let json = serde_json::to_string_pretty(&result).context("Failed to serialise result")?;
        println!("{json}");
    } else {
        print_result(&result, cli.show_text);
    }

    if !cli.quiet && !cli.json {
        eprintln!(
            "{}",
            dim(&format!(
                "{} page(s), OCR {}ms, total {}ms",
                result.stats.page_count,
                result.stats.ocr_duration_ms,
                result.stats.total_duration_ms
            ))
        );
        if let Some(ref path) = cli.output {
            eprintln!("{}", dim(&format!("report → {}", path.display())));
        }
    }

    Ok(())
}

fn clear_spinner(spinner: Option<&CliProgressCallback>) {
    if let Some(s) = spinner {
        if !s.bar.is_finished() {
            s.bar.finish_and_clear();
        }
    }
}

/// Map CLI args to `PipelineConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<PipelineConfig> {
    let mut builder = PipelineConfig::builder()
        .threshold(cli.threshold)
        .ocr_backend(cli.ocr.clone().into())
        .language(&cli.lang)
        .tesseract_path(&cli.tesseract_path)
        .dpi(cli.dpi)
        .download_timeout_secs(cli.download_timeout);

    if let Some(psm) = cli.psm {
        builder = builder.page_segmentation_mode(psm);
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(ref password) = cli.password {
        builder = builder.password(password);
    }
    if let Some(ref lib) = cli.pdfium_lib {
        builder = builder.pdfium_library(lib);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_result(result: &PipelineResult, show_text: bool) {
    println!("{}  {}", bold("Name:"), result.name);
    println!("{}   {}", bold("GPA:"), result.gpa_display());
    println!(
        "{}  {}",
        bold("Eligibility:"),
        colour_verdict(result.eligibility)
    );
    println!("{}", result.summary);

    if show_text {
        println!();
        println!("{}", dim("── OCR text ─────────────────────────────────────────"));
        println!("{}", result.ocr_text.trim_end());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spinner_is_cleared_when_a_run_fails_midway() {
        let cb = CliProgressCallback::with_bar(ProgressBar::hidden());
        cb.on_pages_ready(3);
        cb.on_page_start(2, 3);
        assert!(!cb.bar.is_finished());

        clear_spinner(Some(cb.as_ref()));
        assert!(cb.bar.is_finished());
    }

    #[test]
    fn clearing_after_success_is_harmless() {
        let cb = CliProgressCallback::with_bar(ProgressBar::hidden());
        cb.on_pipeline_complete(Eligibility::Eligible);
        clear_spinner(Some(cb.as_ref()));
        clear_spinner(None);
        assert!(cb.bar.is_finished());
    }

    #[test]
    fn cli_flags_map_onto_config() {
        let cli = Cli::parse_from([
            "transcript-check",
            "--threshold",
            "7.5",
            "--ocr",
            "vision",
            "--psm",
            "6",
            "scan.jpg",
        ]);
        let config = build_config(&cli, None).unwrap();
        assert_eq!(config.threshold, 7.5);
        assert_eq!(config.ocr_backend, OcrBackend::Vision);
        assert_eq!(config.page_segmentation_mode, Some(6));
    }
}
