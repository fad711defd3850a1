use clap::Parser;
use lesson_pages::{config, generate, output};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lesson-pages")]
#[command(about = "Generate static HTML pages from a lesson module")]
#[command(long_about = "\
Generate static HTML pages from a lesson module

A module is a directory with one manifest (*.imcodes, YAML) and the files it
references. Every step in the manifest becomes stepN.html; the module gets an
index.html. Other files in the module are copied alongside.

Module structure:

  intro-to-python/
  ├── lesson.imcodes          # Manifest: Title + Steps
  ├── config.toml             # Generator config (optional)
  ├── welcome.md              # TextContents of a step
  ├── welcome.timeline        # Timeline of a step (@MM:SS: blocks)
  ├── common.css              # Copied to output
  └── skulpt/                 # Copied to output
      └── skulpt.js

Step layouts: Text (default), Video, Code, VideoAndText, TextAndCode,
VideoAndCode. Unknown layouts render as Text.

Run 'lesson-pages --print-config' to print a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Extracted module directory
    #[arg(required_unless_present = "print_config")]
    input: Option<PathBuf>,

    /// Output directory
    #[arg(short, long, default_value = "module")]
    output: PathBuf,

    /// Config file (defaults to config.toml in the module directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log degraded content and skipped files
    #[arg(short, long)]
    verbose: bool,

    /// Print a stock config.toml with all options documented
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.print_config {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let Some(input) = cli.input else {
        return Err("an input module directory is required".into());
    };

    let site_config = match &cli.config {
        Some(path) => config::load_config_file(path)?,
        None => config::load_config(&input)?,
    };
    init_thread_pool(&site_config.processing);

    println!("==> Generating {} → {}", input.display(), cli.output.display());
    let report = generate::generate(&input, &cli.output, &site_config)?;
    output::print_generate_output(&report);
    println!("==> Done: {}", cli.output.display());

    Ok(())
}

/// Install the fmt subscriber. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "lesson_pages=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
