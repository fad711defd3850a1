//! Shared test utilities for the lesson-pages test suite.
//!
//! Provides fixture setup and a template renderer that records what it was
//! asked to render, so tests can assert on render contexts instead of HTML.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let renderer = RecordingRenderer::default();
//! // ... render something ...
//! let ctx = renderer.only("Code");
//! assert_eq!(ctx.text("code"), "print(1)");
//! ```

use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use crate::template::{RenderContext, TemplateError, TemplateRenderer};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/module/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/module");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Write a module manifest named `lesson.imcodes` into `dir`.
pub fn write_manifest(dir: &Path, yaml: &str) {
    std::fs::write(dir.join("lesson.imcodes"), yaml).unwrap();
}

// =========================================================================
// Recording renderer
// =========================================================================

/// A renderer that records every `(template, context)` pair.
///
/// The returned document is `<template>` followed by the context's debug
/// form, so equal contexts produce equal documents. Clones share one log,
/// which lets a test keep a handle on a renderer the pipeline builds.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    calls: Arc<Mutex<Vec<(String, RenderContext)>>>,
}

impl RecordingRenderer {
    /// All calls in the order they were made.
    pub fn calls(&self) -> Vec<(String, RenderContext)> {
        self.calls.lock().unwrap().clone()
    }

    /// The context rendered with `template`, if exactly one call used it.
    pub fn only(&self, template: &str) -> RenderContext {
        let matching: Vec<RenderContext> = self
            .calls()
            .into_iter()
            .filter(|(name, _)| name == template)
            .map(|(_, ctx)| ctx)
            .collect();
        assert_eq!(
            matching.len(),
            1,
            "expected one '{template}' render, got {}",
            matching.len()
        );
        matching.into_iter().next().unwrap()
    }
}

impl TemplateRenderer for RecordingRenderer {
    fn render(&self, template: &str, context: &RenderContext) -> Result<String, TemplateError> {
        self.calls
            .lock()
            .unwrap()
            .push((template.to_string(), context.clone()));
        Ok(format!("<{template}>{context:?}"))
    }
}
