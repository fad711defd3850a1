//! Module-to-site generation.
//!
//! Takes an extracted module directory and writes the static site for it.
//!
//! ## Generated Pages
//!
//! - **Index page** (`index.html`): module title and a list of its steps
//! - **Step pages** (`step0.html` … `step{N-1}.html`): one per manifest step,
//!   numbered by manifest position
//!
//! ## Output Structure
//!
//! ```text
//! out/
//! ├── index.html
//! ├── step0.html
//! ├── step1.html
//! ├── common.css           # Passthrough assets (copied)
//! └── skulpt/
//!     └── skulpt.js
//! ```
//!
//! Every file of the module that is not a source is copied across with its
//! relative path. Sources are the manifest, `config.toml`, files whose
//! extension is listed in `copy.skip_extensions`, and the text and timeline
//! files steps reference.
//!
//! ## Failure Policy
//!
//! A step with missing or broken content still gets its page. Only a missing
//! or unparseable manifest, a renderer failure, or a filesystem error on the
//! output side stops the run.
//!
//! ## Ordering
//!
//! Steps render on the rayon pool, but each step's file name is fixed by its
//! manifest position before rendering starts and pages are written in
//! manifest order. Two steps never share an output path.

use crate::config::{CONFIG_FILENAME, CopyConfig, SiteConfig};
use crate::layout::{IndexLayout, LayoutKind, select_layout};
use crate::manifest::{ManifestError, StepSpec, fields, find_manifest, load_manifest};
use crate::resolve::StepContent;
use crate::template::{MaudRenderer, PageGlobals, TemplateError, TemplateRenderer};
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

pub const INDEX_FILENAME: &str = "index.html";

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// What a generation run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateReport {
    /// Module title from the manifest.
    pub title: String,
    /// The manifest the module was built from.
    pub manifest_path: PathBuf,
    /// Written pages, index first, then steps in manifest order.
    pub pages: Vec<PageRecord>,
    /// Passthrough assets, relative to the module directory.
    pub copied: Vec<PathBuf>,
}

impl GenerateReport {
    pub fn step_pages(&self) -> impl Iterator<Item = &PageRecord> {
        self.pages.iter().filter(|p| p.layout != LayoutKind::Index)
    }
}

/// One written page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRecord {
    pub file: String,
    pub layout: LayoutKind,
    pub title: String,
}

/// Output file name for the step at manifest position `index`.
pub fn step_filename(index: usize) -> String {
    format!("step{index}.html")
}

/// Generate the site for `input_dir` into `output_dir` with the built-in templates.
pub fn generate(
    input_dir: &Path,
    output_dir: &Path,
    config: &SiteConfig,
) -> Result<GenerateReport, GenerateError> {
    generate_with(input_dir, output_dir, config, MaudRenderer::new)
}

/// Generate with a renderer built by `make_renderer`.
///
/// The renderer is constructed once, after the manifest is loaded (the step
/// count is one of its globals), and shared by every page.
pub fn generate_with<R, F>(
    input_dir: &Path,
    output_dir: &Path,
    config: &SiteConfig,
    make_renderer: F,
) -> Result<GenerateReport, GenerateError>
where
    R: TemplateRenderer,
    F: FnOnce(PageGlobals) -> R,
{
    let manifest_path = find_manifest(input_dir, &config.manifest.extension)?;
    let manifest = load_manifest(&manifest_path)?;
    info!(
        manifest = %manifest_path.display(),
        steps = manifest.steps.len(),
        "loaded manifest"
    );

    let renderer = make_renderer(PageGlobals::new(&config.assets, manifest.steps.len()));

    fs::create_dir_all(output_dir)?;
    let mut pages = Vec::with_capacity(manifest.steps.len() + 1);

    let index_html = IndexLayout::new(&manifest.title, manifest.steps.len(), &renderer).render()?;
    write_page(output_dir, INDEX_FILENAME, &index_html)?;
    pages.push(PageRecord {
        file: INDEX_FILENAME.to_string(),
        layout: LayoutKind::Index,
        title: manifest.title.clone(),
    });

    let rendered = render_steps(&manifest.steps, input_dir, &renderer)?;
    for (index, (step, (layout, html))) in manifest.steps.iter().zip(rendered).enumerate() {
        let file = step_filename(index);
        write_page(output_dir, &file, &html)?;
        pages.push(PageRecord {
            file,
            layout,
            title: step.title(),
        });
    }

    let sources = source_files(input_dir, &manifest_path, &manifest.steps);
    let copied = copy_assets(input_dir, output_dir, &sources, &config.copy)?;

    Ok(GenerateReport {
        title: manifest.title,
        manifest_path,
        pages,
        copied,
    })
}

/// Render every step, preserving manifest order in the result.
fn render_steps<R: TemplateRenderer>(
    steps: &[StepSpec],
    base: &Path,
    renderer: &R,
) -> Result<Vec<(LayoutKind, String)>, TemplateError> {
    steps
        .par_iter()
        .map(|step| -> Result<(LayoutKind, String), TemplateError> {
            let layout = select_layout(step, base, renderer);
            Ok((layout.kind(), layout.render()?))
        })
        .collect()
}

fn write_page(output_dir: &Path, file: &str, html: &str) -> std::io::Result<()> {
    fs::write(output_dir.join(file), html)?;
    info!(file, "wrote page");
    Ok(())
}

/// Canonical paths of the files that are inputs to rendering rather than assets.
fn source_files(input_dir: &Path, manifest_path: &Path, steps: &[StepSpec]) -> HashSet<PathBuf> {
    let referenced = steps.iter().flat_map(|step| {
        let content = StepContent::new(step, input_dir);
        [fields::TIMELINE, fields::TEXT_CONTENTS]
            .into_iter()
            .filter_map(move |key| content.asset_path(key))
    });

    [manifest_path.to_path_buf(), input_dir.join(CONFIG_FILENAME)]
        .into_iter()
        .chain(referenced)
        .filter_map(|path| path.canonicalize().ok())
        .collect()
}

fn is_source(path: &Path, sources: &HashSet<PathBuf>, copy: &CopyConfig) -> bool {
    sources.contains(path)
        || path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| copy.skips_extension(e))
}

/// Copy every non-source file under `input_dir` into `output_dir`.
///
/// Returns the copied files relative to `input_dir`, in walk order. If the
/// output directory lives inside the module it is not walked. If it is the
/// module directory itself, assets are already in place and nothing is copied.
fn copy_assets(
    input_dir: &Path,
    output_dir: &Path,
    sources: &HashSet<PathBuf>,
    copy: &CopyConfig,
) -> Result<Vec<PathBuf>, GenerateError> {
    let root = input_dir.canonicalize()?;
    let output_root = output_dir.canonicalize()?;
    let mut copied = Vec::new();
    if output_root == root {
        debug!(dir = %root.display(), "output is the module directory; no assets to copy");
        return Ok(copied);
    }

    let walker = WalkDir::new(&root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.path() != output_root);

    for entry in walker {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(&root) else {
            continue;
        };
        let dst = output_root.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&dst)?;
            continue;
        }
        if is_source(entry.path(), sources, copy) {
            debug!(path = %relative.display(), "skipping source file");
            continue;
        }
        if dst.canonicalize().is_ok_and(|d| d == entry.path()) {
            debug!(path = %relative.display(), "asset already at destination");
            continue;
        }
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(entry.path(), &dst)?;
        copied.push(relative.to_path_buf());
    }

    Ok(copied)
}

// ============================================================================
// Tests
// ============================================================================
