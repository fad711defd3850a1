//! Best-effort loading of a step's content assets.
//!
//! A step names its assets by path relative to the module directory. Any of
//! them may be missing, misspelled or unreadable; resolution then yields empty
//! content and the page renders with an empty section. One broken reference
//! never fails the module.

use crate::manifest::{StepSpec, fields};
use crate::markdown::render_markdown;
use crate::timeline::{ContentMode, Keyframe, parse_timeline};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Content accessors for one step, bound to the module's base directory.
#[derive(Debug, Clone, Copy)]
pub struct StepContent<'a> {
    step: &'a StepSpec,
    base: &'a Path,
}

impl<'a> StepContent<'a> {
    pub fn new(step: &'a StepSpec, base: &'a Path) -> Self {
        Self { step, base }
    }

    pub fn step(&self) -> &'a StepSpec {
        self.step
    }

    /// Keyframes from the `Timeline` file, or none.
    pub fn timeline(&self, mode: ContentMode) -> Vec<Keyframe> {
        self.read_asset(fields::TIMELINE)
            .map(|text| parse_timeline(&text, mode))
            .unwrap_or_default()
    }

    /// The `TextContents` file rendered to HTML, or `""`.
    pub fn markdown(&self) -> String {
        self.read_asset(fields::TEXT_CONTENTS)
            .map(|text| render_markdown(&text))
            .unwrap_or_default()
    }

    /// The `CodeContents` field verbatim. It is inline code, not a path.
    pub fn code(&self) -> String {
        self.step.field(fields::CODE_CONTENTS)
    }

    /// Resolve the path a file field points at, if the field is set.
    ///
    /// Names are always taken relative to the module directory: a leading `/`
    /// (or drive prefix) is dropped rather than escaping the base.
    pub fn asset_path(&self, key: &str) -> Option<PathBuf> {
        let name = self.step.field(key);
        let relative: PathBuf = Path::new(&name)
            .components()
            .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_)))
            .collect();
        if relative.as_os_str().is_empty() {
            None
        } else {
            Some(self.base.join(relative))
        }
    }

    fn read_asset(&self, key: &str) -> Option<String> {
        let path = self.asset_path(key)?;
        match fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(err) => {
                debug!(
                    field = key,
                    path = %path.display(),
                    error = %err,
                    "step asset unreadable; using empty content"
                );
                None
            }
        }
    }
}
