//! Richmark - convert between rich-text markup and a Markdown subset.
//!
//! # Usage
//!
//! ```bash
//! richmark notes.md                 # Markdown to HTML on stdout
//! richmark --to markdown page.html  # HTML to Markdown
//! richmark --watch -o out.html notes.md
//! ```

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};

use richmark::config::{
    ConfigFlags, OutputFormat, clear_config_flags, global_config_path, load_effective_file_flags,
    parse_flag_tokens, save_config_flags,
};
use richmark::document::SourceFormat;
use richmark::editor::{Editor, EditorConfig};
use richmark::watcher::FileWatcher;

/// Debounce applied to file change events in watch mode.
const WATCH_DEBOUNCE_MS: u64 = 200;

/// Poll interval of the watch loop.
const WATCH_POLL: Duration = Duration::from_millis(250);

/// Convert between rich-text markup and Markdown
#[derive(Parser, Debug)]
#[command(name = "richmark", version, about, long_about = None)]
struct Cli {
    /// File to convert (.md/.markdown/.txt as Markdown, .html/.htm as HTML)
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Output dialect (defaults to the opposite of the input)
    #[arg(long, value_enum)]
    to: Option<OutputFormat>,

    /// Write the result to PATH instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Watch file for changes and re-convert
    #[arg(short, long)]
    watch: bool,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        load_effective_file_flags()?
    };
    let effective = file_flags.union(&cli_flags);
    debug!(?effective, "effective flags");

    if !cli.file.exists() {
        anyhow::bail!("File not found: {}", cli.file.display());
    }

    let target = effective
        .to
        .unwrap_or_else(|| default_target(&cli.file));
    let output = effective.output.as_deref();

    convert(&cli.file, target, output)?;
    if effective.watch {
        watch(&cli.file, target, output)?;
    }
    Ok(())
}

/// HTML input becomes Markdown; everything else becomes HTML.
fn default_target(file: &Path) -> OutputFormat {
    match SourceFormat::from_file_name(file) {
        SourceFormat::Html => OutputFormat::Markdown,
        SourceFormat::Markup | SourceFormat::PlainText => OutputFormat::Html,
    }
}

fn convert(file: &Path, target: OutputFormat, output: Option<&Path>) -> Result<()> {
    let bytes = fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let mut editor = Editor::new(EditorConfig::default());
    editor
        .load(&bytes, file)
        .with_context(|| format!("Failed to load {}", file.display()))?;

    let mut rendered = match target {
        OutputFormat::Markdown => editor.export_markup(),
        OutputFormat::Html => editor.document().to_html().into_bytes(),
    };
    if !rendered.ends_with(b"\n") {
        rendered.push(b'\n');
    }

    match output {
        Some(path) => fs::write(path, &rendered)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => std::io::stdout()
            .lock()
            .write_all(&rendered)
            .context("Failed to write to stdout")?,
    }
    info!(
        input = %file.display(),
        to = target.as_str(),
        bytes = rendered.len(),
        "converted"
    );
    Ok(())
}

fn watch(file: &Path, target: OutputFormat, output: Option<&Path>) -> Result<()> {
    let mut watcher = FileWatcher::new(file, WATCH_DEBOUNCE_MS)
        .with_context(|| format!("Failed to watch {}", file.display()))?;
    let start = Instant::now();
    loop {
        std::thread::sleep(WATCH_POLL);
        let now_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        if watcher.poll(now_ms) {
            debug!(path = %watcher.target_path().display(), "change detected");
            if let Err(err) = convert(file, target, output) {
                eprintln!("[warn] {err:#}");
            }
        }
    }
}
