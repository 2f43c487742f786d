//! CLI binary for glyph-extractor.
//!
//! A thin shim over the library crate: `extract` maps flags to
//! `ExtractionConfig`, `template` renders the printable grid, `rename`
//! normalises an existing glyph directory.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use glyph_extractor::{
    extract_to_dir, generate_template, rename_glyphs, CellSize, CharacterSet, ExtractionConfig,
    ExtractionProgressCallback, ProgressCallback, TemplateConfig,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers ──────────────────────────────────────────────────────

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

/// Terminal progress callback: one bar over all glyphs of the run, with a
/// log line per page and per failed glyph.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(TICKS),
        );
        bar.set_prefix("Preparing");
        bar.set_message("Loading scans…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }
}

impl ExtractionProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total_glyphs: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} glyphs  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total_glyphs as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Extracting");
    }

    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Page {page_num}/{total_pages}"))
        ));
    }

    fn on_glyph_complete(&self, character: char, filename: &str) {
        self.bar.set_message(format!("'{character}' → {filename}"));
        self.bar.inc(1);
    }

    fn on_glyph_error(&self, character: char, error: &str) {
        self.bar
            .println(format!("  {} '{}'  {}", red("✗"), character, red(error)));
        self.bar.inc(1);
    }

    fn on_run_complete(&self, saved: usize, failed: usize) {
        self.bar.finish_and_clear();
        if failed == 0 {
            eprintln!("{} {} glyphs extracted", green("✔"), bold(&saved.to_string()));
        } else {
            eprintln!(
                "{} {} glyphs extracted  ({} failed)",
                cyan("⚠"),
                bold(&saved.to_string()),
                red(&failed.to_string())
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Print the template, fill it in, scan both pages at 300 DPI
  glyph-extractor template template.pdf --font fonts/DejaVuSans.ttf

  # Extract glyphs into ./output/glyphs + ./output/glyphs.json
  glyph-extractor extract --input scan1.jpg,scan2.jpg

  # 600 DPI scan, greyish paper, keep the background
  glyph-extractor extract -i scan1.png -i scan2.png --dpi 600 --threshold 225 --transparent false

  # Bring a directory from an older run up to the current filenames
  glyph-extractor rename ./output/glyphs

ENVIRONMENT VARIABLES:
  RUST_LOG                Override the log filter (e.g. glyph_extractor=debug)
  PDFIUM_LIB_PATH         Path to libpdfium, used by `template`
"#;

/// Cut scanned handwriting grids into glyph PNGs.
#[derive(Parser, Debug)]
#[command(
    name = "glyph-extractor",
    version,
    about = "Cut scanned handwriting grids into transparent glyph PNGs plus a JSON manifest",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "GLYPH_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "GLYPH_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract glyphs from scanned template pages.
    Extract(ExtractArgs),

    /// Render the printable template PDF.
    Template {
        /// Output PDF path.
        #[arg(default_value = "template.pdf")]
        output: PathBuf,

        /// TrueType font for labels and titles (needed for diacritics).
        #[arg(long, env = "GLYPH_FONT")]
        font: Option<PathBuf>,

        /// Character set file; one entry per character, line breaks ignored.
        #[arg(long, env = "GLYPH_CHARSET")]
        charset: Option<PathBuf>,
    },

    /// Rename glyph files to the current naming scheme and rewrite glyphs.json.
    Rename {
        /// Directory holding the glyph PNGs.
        dir: PathBuf,

        /// Character set file; one entry per character, line breaks ignored.
        #[arg(long, env = "GLYPH_CHARSET")]
        charset: Option<PathBuf>,
    },
}

#[derive(clap::Args, Debug)]
struct ExtractArgs {
    /// Scanned pages in order (comma-separated or repeated).
    #[arg(short, long, required = true, value_delimiter = ',', num_args = 1..)]
    input: Vec<PathBuf>,

    /// Output directory; glyphs go to <output>/glyphs.
    #[arg(short, long, env = "GLYPH_OUTPUT", default_value = "./output")]
    output: PathBuf,

    /// Scanner DPI.
    #[arg(long, env = "GLYPH_DPI", default_value_t = 300,
          value_parser = clap::value_parser!(u32).range(1..))]
    dpi: u32,

    /// Top margin of the grid in mm.
    #[arg(long, env = "GLYPH_MARGIN_TOP", default_value_t = 15.0)]
    margin_top: f64,

    /// Left margin of the grid in mm.
    #[arg(long, env = "GLYPH_MARGIN_LEFT", default_value_t = 15.0)]
    margin_left: f64,

    /// Background threshold (0–255).
    #[arg(long, env = "GLYPH_THRESHOLD", default_value_t = 240)]
    threshold: u8,

    /// Turn the paper background transparent.
    #[arg(long, env = "GLYPH_TRANSPARENT", default_value_t = true, action = ArgAction::Set)]
    transparent: bool,

    /// Character set file; one entry per character, line breaks ignored.
    #[arg(long, env = "GLYPH_CHARSET")]
    charset: Option<PathBuf>,

    /// Print the run result (manifest, errors, stats) as JSON on stdout.
    #[arg(long, env = "GLYPH_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "GLYPH_NO_PROGRESS")]
    no_progress: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // INFO logs are hidden while the progress bar is drawn.
    let show_progress = match cli.command {
        Command::Extract(ref args) => !cli.quiet && !args.no_progress && !args.json,
        _ => false,
    };
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

    match cli.command {
        Command::Extract(ref args) => run_extract(args, show_progress, cli.quiet),
        Command::Template {
            ref output,
            ref font,
            ref charset,
        } => run_template(output, font.clone(), charset.as_deref(), cli.quiet),
        Command::Rename {
            ref dir,
            ref charset,
        } => run_rename(dir, charset.as_deref(), cli.quiet),
    }
}

fn load_charset(path: Option<&Path>) -> Result<CharacterSet> {
    match path {
        Some(p) => CharacterSet::from_file(p).context("Failed to load character set"),
        None => Ok(CharacterSet::czech()),
    }
}

fn run_extract(args: &ExtractArgs, show_progress: bool, quiet: bool) -> Result<()> {
    let mut builder = ExtractionConfig::builder()
        .dpi(args.dpi)
        .margins_mm(args.margin_top, args.margin_left)
        .threshold(args.threshold)
        .transparent(args.transparent)
        .charset(load_charset(args.charset.as_deref())?);

    if show_progress {
        let cb: ProgressCallback = CliProgressCallback::new();
        builder = builder.progress_callback(cb);
    }
    let config = builder.build().context("Invalid configuration")?;

    let output =
        extract_to_dir(args.input.as_slice(), &args.output, &config).context("Extraction failed")?;

    if args.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else if !quiet {
        let stats = &output.stats;
        eprintln!(
            "{}  {} glyphs from {} page(s)  {}ms  →  {}",
            if stats.glyphs_failed == 0 {
                green("✔")
            } else {
                cyan("⚠")
            },
            stats.glyphs_saved,
            stats.pages_processed,
            stats.total_duration_ms,
            bold(&args.output.join("glyphs.json").display().to_string()),
        );
        if stats.unassigned_characters > 0 {
            eprintln!(
                "   {}",
                dim(&format!(
                    "{} character(s) had no cell on the given pages",
                    stats.unassigned_characters
                ))
            );
        }
    }

    Ok(())
}

fn run_template(
    output: &Path,
    font: Option<PathBuf>,
    charset: Option<&Path>,
    quiet: bool,
) -> Result<()> {
    let charset = load_charset(charset)?;
    let config = TemplateConfig {
        font_path: font,
        ..TemplateConfig::default()
    };
    if config.font_path.is_none() && !quiet {
        eprintln!(
            "{}",
            dim("No --font given: built-in Helvetica cannot draw most diacritics")
        );
    }

    let pages = generate_template(output, &config, &charset).context("Template generation failed")?;
    if !quiet {
        eprintln!(
            "{} {} ({} pages)",
            green("✔"),
            bold(&output.display().to_string()),
            pages
        );
    }
    Ok(())
}

fn run_rename(dir: &Path, charset: Option<&Path>, quiet: bool) -> Result<()> {
    let charset = load_charset(charset)?;
    let geometry = TemplateConfig::default().geometry;
    let cell_size = CellSize {
        width: geometry.cell_width_mm,
        height: geometry.cell_height_mm,
    };

    let report = rename_glyphs(dir, &charset, cell_size)
        .with_context(|| format!("Failed to rename glyphs in {}", dir.display()))?;

    if !quiet {
        eprintln!(
            "{} {} renamed, {} missing, {} conflicts, {} removed  →  {} glyphs",
            if report.missing.is_empty() && report.failed.is_empty() {
                green("✔")
            } else {
                cyan("⚠")
            },
            report.renamed.len(),
            report.missing.len(),
            report.conflicts.len(),
            report.removed.len(),
            bold(&report.manifest.len().to_string()),
        );
        for (old, err) in &report.failed {
            eprintln!("  {} {}  {}", red("✗"), old, red(err));
        }
    }
    Ok(())
}
