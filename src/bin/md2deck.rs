//! CLI binary for md2deck.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `DeckConfig` and prints the chosen layouts.

use anyhow::{Context, Result};
use clap::Parser;
use md2deck::{
    load_deck_from_inputs, save_deck, DecisionSource, Deck, DeckConfig, DeckProgressCallback,
    Layout, ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
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
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live bar plus one log line per slide.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Start of the slide currently being processed.
    slide_started: Mutex<Option<Instant>>,
    /// Slides whose refinement fell back to the heuristic.
    fallbacks: AtomicUsize,
}

impl CliProgressCallback {
    /// Spinner until `on_load_start` reports the slide count.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Reading slides…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            slide_started: Mutex::new(None),
            fallbacks: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} slides  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Laying out");
    }
}

impl DeckProgressCallback for CliProgressCallback {
    fn on_load_start(&self, total_slides: usize) {
        self.activate_bar(total_slides);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Choosing layouts for {total_slides} slides…"))
        ));
    }

    fn on_slide_start(&self, index: usize, _total: usize) {
        if let Ok(mut started) = self.slide_started.lock() {
            *started = Some(Instant::now());
        }
        self.bar.set_message(format!("slide {}", index + 1));
    }

    fn on_slide_complete(&self, index: usize, total: usize, layout: Layout, source: DecisionSource) {
        let elapsed_ms = self
            .slide_started
            .lock()
            .ok()
            .and_then(|mut s| s.take())
            .map(|t| t.elapsed().as_millis())
            .unwrap_or(0);

        let mark = if source == DecisionSource::RefinementFallback {
            self.fallbacks.fetch_add(1, Ordering::SeqCst);
            yellow("↺")
        } else {
            green("✓")
        };

        self.bar.println(format!(
            "  {} Slide {:>3}/{:<3}  {:<14}  {:<9}  {}",
            mark,
            index + 1,
            total,
            layout.as_str(),
            dim(&source.to_string()),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
        self.bar.inc(1);
    }

    fn on_load_complete(&self, total_slides: usize, refined: usize) {
        self.bar.finish_and_clear();
        let fallbacks = self.fallbacks.load(Ordering::SeqCst);
        if fallbacks == 0 {
            eprintln!(
                "{} {} slides laid out  ({} refined)",
                green("✔"),
                bold(&total_slides.to_string()),
                refined
            );
        } else {
            eprintln!(
                "{} {} slides laid out  ({} refined, {} kept heuristic after a failed refinement)",
                yellow("⚠"),
                bold(&total_slides.to_string()),
                refined,
                yellow(&fallbacks.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Lay out every slide in a folder (files sorted naturally: 2 before 10)
  md2deck slides/

  # Individual files and URLs, mixed
  md2deck intro.md https://example.com/talk/02-demo.md

  # Heuristics only, no model calls
  md2deck --no-refine slides/

  # Refine more eagerly: only accept the rules above 0.95 confidence
  md2deck --threshold 0.95 slides/

  # Write the whole deck (content, HTML, features, decisions) as JSON
  md2deck slides/ -o deck.json

  # Show every decision with its justification in the log
  md2deck --debug slides/

LAYOUTS:
  hero, section-break, content-left, content-center, two-column,
  code-focus, image-text, list-emphasize, quote, comparison,
  timeline, diagram

FRONT MATTER:
  A slide may start with a YAML block. `layout:` forces a layout:

    ---
    title: Roadmap
    layout: timeline
    ---

ENVIRONMENT VARIABLES:
  ANTHROPIC_API_KEY       Anthropic API key (enables refinement)
  OPENAI_API_KEY          OpenAI API key
  GEMINI_API_KEY          Google Gemini API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID
  RUST_LOG                Log filter, overrides -v / -q

  Without any credentials every slide keeps its heuristic layout.
"#;

/// Choose slide layouts for Markdown decks.
#[derive(Parser, Debug)]
#[command(
    name = "md2deck",
    version,
    about = "Choose slide layouts for Markdown decks",
    long_about = "Read Markdown slides (files, directories or URLs), pick one of twelve layouts \
for each slide from its structure, and ask a language model to refine low-confidence choices. \
Works without any model: the rules alone always produce a complete deck.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Markdown files, directories, or HTTP/HTTPS URLs.
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Write the deck as JSON to this file.
    #[arg(short, long, env = "MD2DECK_OUTPUT")]
    output: Option<PathBuf>,

    /// Print the deck as JSON to stdout instead of a table.
    #[arg(long, env = "MD2DECK_JSON")]
    json: bool,

    /// LLM model ID used for refinement.
    #[arg(
        long,
        env = "MD2DECK_MODEL",
        long_help = "Model used to refine low-confidence layouts. Default: claude-sonnet-4-20250514."
    )]
    model: Option<String>,

    /// LLM provider: anthropic, openai, gemini, ollama, azure.
    #[arg(
        long,
        env = "MD2DECK_PROVIDER",
        long_help = "LLM provider. Auto-detected from API key env vars if not set."
    )]
    provider: Option<String>,

    /// Never call a model; use the layout rules only.
    #[arg(long, env = "MD2DECK_NO_REFINE")]
    no_refine: bool,

    /// Heuristic confidence at or above which no refinement is attempted (0.0–1.0).
    #[arg(long, env = "MD2DECK_THRESHOLD", default_value_t = 0.90)]
    threshold: f64,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "MD2DECK_TEMPERATURE", default_value_t = 0.3)]
    temperature: f32,

    /// Max LLM output tokens per refinement.
    #[arg(long, env = "MD2DECK_MAX_TOKENS", default_value_t = 500)]
    max_tokens: usize,

    /// Per-slide refinement timeout in seconds.
    #[arg(long, env = "MD2DECK_API_TIMEOUT", default_value_t = 30)]
    api_timeout: u64,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "MD2DECK_DOWNLOAD_TIMEOUT", default_value_t = 60)]
    download_timeout: u64,

    /// Print each slide's rendered HTML after the table.
    #[arg(long)]
    show_html: bool,

    /// Disable progress bar.
    #[arg(long, env = "MD2DECK_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MD2DECK_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "MD2DECK_QUIET")]
    quiet: bool,

    /// Log every layout decision with its justification at INFO level.
    #[arg(long, env = "MD2DECK_DEBUG")]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = log_filter(&cli, show_progress);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn DeckProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    // ── Load ─────────────────────────────────────────────────────────────
    let deck = load_deck_from_inputs(&cli.inputs, &config)
        .await
        .context("Failed to load slides")?;

    if let Some(ref output_path) = cli.output {
        save_deck(&deck, output_path)
            .await
            .context("Failed to write deck")?;
        if !cli.quiet {
            eprintln!(
                "{}  {} slides  {}ms  →  {}",
                green("✔"),
                deck.len(),
                deck.stats.total_duration_ms,
                bold(&output_path.display().to_string()),
            );
        }
        return Ok(());
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if cli.json {
        let json = serde_json::to_string_pretty(&deck).context("Failed to serialise deck")?;
        writeln!(handle, "{json}").context("Failed to write to stdout")?;
    } else {
        write_table(&mut handle, &deck, cli.show_html).context("Failed to write to stdout")?;
    }

    if !cli.quiet && !show_progress && !cli.json {
        eprintln!(
            "Laid out {} slides in {}ms ({} refinement calls, {} fallbacks)",
            deck.stats.total_slides,
            deck.stats.total_duration_ms,
            deck.stats.refinement_calls,
            deck.stats.refinement_fallbacks,
        );
    }

    Ok(())
}

/// Default tracing filter when `RUST_LOG` is unset.
///
/// The progress bar replaces INFO logs unless `-v` or `--debug` asks for them.
fn log_filter(cli: &Cli, show_progress: bool) -> &'static str {
    if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else if cli.debug {
        "info"
    } else if show_progress {
        "error"
    } else {
        "info"
    }
}

/// Map CLI args to `DeckConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<DeckConfig> {
    let mut builder = DeckConfig::builder()
        .refine(!cli.no_refine)
        .confidence_threshold(cli.threshold)
        .temperature(cli.temperature)
        .max_tokens(cli.max_tokens)
        .api_timeout_secs(cli.api_timeout)
        .download_timeout_secs(cli.download_timeout)
        .debug(cli.debug);

    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// One line per slide: position, layout, confidence, source, file, reasoning.
fn write_table(out: &mut impl Write, deck: &Deck, show_html: bool) -> io::Result<()> {
    for slide in &deck.slides {
        writeln!(
            out,
            "{:>3}  {:<15} {:.2}  {:<9} {:<24} {}",
            slide.index + 1,
            slide.layout().as_str(),
            slide.decision.confidence,
            slide.decision_source.to_string(),
            slide.source_name,
            slide.justification(),
        )?;
    }
    if show_html {
        for slide in &deck.slides {
            writeln!(out, "\n<!-- {} · {} -->", slide.index + 1, slide.source_name)?;
            out.write_all(slide.content.html.as_bytes())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("md2deck").chain(args.iter().copied()))
            .expect("valid args")
    }

    #[test]
    fn debug_flag_shows_decisions_alongside_progress_bar() {
        assert_eq!(log_filter(&parse(&["--debug", "slides/"]), true), "info");
        assert_eq!(log_filter(&parse(&["slides/"]), true), "error");
        assert_eq!(log_filter(&parse(&["slides/"]), false), "info");
    }

    #[test]
    fn verbose_and_quiet_take_precedence() {
        assert_eq!(log_filter(&parse(&["-v", "--debug", "slides/"]), true), "debug");
        assert_eq!(log_filter(&parse(&["-q", "--debug", "slides/"]), false), "error");
    }
}
