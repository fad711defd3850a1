//! Module manifest discovery and loading.
//!
//! Every module directory carries exactly one manifest, a YAML document named
//! `*.imcodes` by default:
//!
//! ```yaml
//! Title: Intro to Python
//! Steps:
//!   - Title: Welcome
//!     Layout: VideoAndText
//!     Video: https://example.com/welcome.mp4
//!     TextContents: welcome.md
//!     Timeline: welcome.timeline
//!   - Title: Your first function
//!     Layout: Code
//!     CodeContents: |
//!       def greet():
//!           print("hi")
//! ```
//!
//! The manifest is loaded once per run and never mutated afterwards. Apart from
//! the overall shape (a mapping whose `Steps` is a sequence) nothing is
//! validated: a step missing any field renders with empty placeholders.

use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("No *.{extension} manifest found in {}", dir.display())]
    NotFound { dir: PathBuf, extension: String },
    #[error("More than one manifest in {}: {files:?}", dir.display())]
    Ambiguous { dir: PathBuf, files: Vec<PathBuf> },
    #[error("Malformed manifest: {0}")]
    Malformed(String),
}

/// A loaded module manifest.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    /// Module title, empty when absent.
    pub title: String,
    /// Steps in manifest order.
    pub steps: Vec<StepSpec>,
}

/// Field names recognized on a step.
pub mod fields {
    pub const TITLE: &str = "Title";
    pub const LAYOUT: &str = "Layout";
    pub const CODE_CONTENTS: &str = "CodeContents";
    pub const TIMELINE: &str = "Timeline";
    pub const TEXT_CONTENTS: &str = "TextContents";
    pub const VIDEO: &str = "Video";
}

/// One step of a module, as declared in the manifest.
///
/// Wraps the raw YAML mapping so unknown keys survive and every recognized key
/// is read through [`StepSpec::field`], whose default is the empty string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepSpec {
    fields: Mapping,
}

impl StepSpec {
    pub fn new(fields: Mapping) -> Self {
        Self { fields }
    }

    /// Build a step from `(key, value)` string pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let fields = pairs
            .into_iter()
            .map(|(k, v)| (Value::from(k), Value::from(v)))
            .collect();
        Self { fields }
    }

    /// Read a field as text.
    ///
    /// Strings come back verbatim, numbers and booleans are stringified, and
    /// anything else (absent, null, sequence, mapping) is `""`.
    pub fn field(&self, key: &str) -> String {
        match self.fields.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => String::new(),
        }
    }

    /// The `Layout` tag, or `None` when absent or not a string.
    pub fn layout_tag(&self) -> Option<&str> {
        self.fields.get(fields::LAYOUT).and_then(Value::as_str)
    }

    pub fn title(&self) -> String {
        self.field(fields::TITLE)
    }

    pub fn video(&self) -> String {
        self.field(fields::VIDEO)
    }
}

/// Find the single manifest file in `dir` whose extension matches `extension`.
///
/// Only the top level of `dir` is searched.
pub fn find_manifest(dir: &Path, extension: &str) -> Result<PathBuf, ManifestError> {
    let mut matches: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .map(|e| e.eq_ignore_ascii_case(extension))
                    .unwrap_or(false)
        })
        .collect();
    matches.sort();

    match matches.len() {
        0 => Err(ManifestError::NotFound {
            dir: dir.to_path_buf(),
            extension: extension.to_string(),
        }),
        1 => Ok(matches.remove(0)),
        _ => Err(ManifestError::Ambiguous {
            dir: dir.to_path_buf(),
            files: matches,
        }),
    }
}

/// Read and parse a manifest file.
pub fn load_manifest(path: &Path) -> Result<Manifest, ManifestError> {
    let content = fs::read_to_string(path)?;
    parse_manifest(&content)
}

/// Parse manifest YAML text.
pub fn parse_manifest(content: &str) -> Result<Manifest, ManifestError> {
    let root: Value = serde_yaml::from_str(content)?;
    let Value::Mapping(root) = root else {
        return Err(ManifestError::Malformed(
            "top level must be a mapping".into(),
        ));
    };

    let title = StepSpec::new(root.clone()).field(fields::TITLE);

    let steps = match root.get("Steps") {
        None | Some(Value::Null) => {
            warn!("manifest has no Steps; only the index page will be generated");
            Vec::new()
        }
        Some(Value::Sequence(items)) => items
            .iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Mapping(m) => StepSpec::new(m.clone()),
                _ => {
                    warn!(index, "step is not a mapping; rendering it empty");
                    StepSpec::default()
                }
            })
            .collect(),
        Some(_) => {
            return Err(ManifestError::Malformed("Steps must be a sequence".into()));
        }
    };

    Ok(Manifest { title, steps })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parses_title_and_steps_in_order() {
        let manifest = parse_manifest(
            r#"
Title: Intro
Steps:
  - Title: One
    Layout: Code
    CodeContents: "print(1)"
  - Title: Two
"#,
        )
        .unwrap();

        assert_eq!(manifest.title, "Intro");
        assert_eq!(manifest.steps.len(), 2);
        assert_eq!(manifest.steps[0].title(), "One");
        assert_eq!(manifest.steps[0].layout_tag(), Some("Code"));
        assert_eq!(manifest.steps[0].field(fields::CODE_CONTENTS), "print(1)");
        assert_eq!(manifest.steps[1].title(), "Two");
        assert_eq!(manifest.steps[1].layout_tag(), None);
    }

    #[test]
    fn absent_fields_read_as_empty() {
        let step = StepSpec::default();
        assert_eq!(step.title(), "");
        assert_eq!(step.video(), "");
        assert_eq!(step.field(fields::TEXT_CONTENTS), "");
        assert_eq!(step.field(fields::TIMELINE), "");
    }

    #[test]
    fn scalar_fields_are_stringified() {
        let manifest = parse_manifest("Steps:\n  - Title: 42\n    CodeContents: true\n").unwrap();
        assert_eq!(manifest.steps[0].title(), "42");
        assert_eq!(manifest.steps[0].field(fields::CODE_CONTENTS), "true");
    }

    #[test]
    fn structured_fields_read_as_empty() {
        let manifest =
            parse_manifest("Steps:\n  - Title: [a, b]\n    Video: {url: x}\n    Layout: ~\n")
                .unwrap();
        let step = &manifest.steps[0];
        assert_eq!(step.title(), "");
        assert_eq!(step.video(), "");
        assert_eq!(step.layout_tag(), None);
    }

    #[test]
    fn missing_steps_is_empty_list() {
        let manifest = parse_manifest("Title: Lonely\n").unwrap();
        assert_eq!(manifest.title, "Lonely");
        assert!(manifest.steps.is_empty());
    }

    #[test]
    fn non_mapping_step_becomes_empty_step() {
        let manifest = parse_manifest("Steps:\n  - just a string\n  - Title: ok\n").unwrap();
        assert_eq!(manifest.steps.len(), 2);
        assert_eq!(manifest.steps[0], StepSpec::default());
        assert_eq!(manifest.steps[1].title(), "ok");
    }

    #[test]
    fn steps_not_a_sequence_is_malformed() {
        let err = parse_manifest("Steps: nope\n").unwrap_err();
        assert!(matches!(err, ManifestError::Malformed(_)));
    }

    #[test]
    fn top_level_scalar_is_malformed() {
        let err = parse_manifest("hello").unwrap_err();
        assert!(matches!(err, ManifestError::Malformed(_)));
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let err = parse_manifest("Steps: [unclosed").unwrap_err();
        assert!(matches!(err, ManifestError::Yaml(_)));
    }

    // =========================================================================
    // Discovery
    // =========================================================================

    #[test]
    fn find_manifest_by_extension() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("lesson.imcodes"), "Title: x").unwrap();
        fs::write(tmp.path().join("notes.md"), "# notes").unwrap();

        let found = find_manifest(tmp.path(), "imcodes").unwrap();
        assert_eq!(found, tmp.path().join("lesson.imcodes"));
    }

    #[test]
    fn find_manifest_ignores_extension_case() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("LESSON.IMCODES"), "Title: x").unwrap();
        assert!(find_manifest(tmp.path(), "imcodes").is_ok());
    }

    #[test]
    fn find_manifest_none() {
        let tmp = TempDir::new().unwrap();
        let err = find_manifest(tmp.path(), "imcodes").unwrap_err();
        assert!(matches!(err, ManifestError::NotFound { .. }));
    }

    #[test]
    fn find_manifest_ambiguous() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.imcodes"), "").unwrap();
        fs::write(tmp.path().join("b.imcodes"), "").unwrap();
        let err = find_manifest(tmp.path(), "imcodes").unwrap_err();
        match err {
            ManifestError::Ambiguous { files, .. } => assert_eq!(files.len(), 2),
            other => panic!("expected Ambiguous, got {other:?}"),
        }
    }

    #[test]
    fn find_manifest_skips_directories() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("old.imcodes")).unwrap();
        fs::write(tmp.path().join("real.imcodes"), "").unwrap();
        let found = find_manifest(tmp.path(), "imcodes").unwrap();
        assert_eq!(found.file_name().unwrap(), "real.imcodes");
    }
}
