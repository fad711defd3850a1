//! # Lesson Pages
//!
//! Turns a packaged lesson module into static HTML. A module is a directory
//! holding one manifest plus the assets it references: markdown text, inline
//! code, timeline files and video URLs. Every step of the manifest becomes one
//! page; the module gets an overview page.
//!
//! # Architecture: Content-to-Page Pipeline
//!
//! ```text
//! 1. Load      lesson.imcodes       →  Manifest        (title + ordered steps)
//! 2. Dispatch  step.Layout          →  StepLayout      (one of six layouts)
//! 3. Resolve   step fields + files  →  RenderContext   (markdown, code, keyframes)
//! 4. Render    template + context   →  stepN.html
//! 5. Copy      remaining files      →  output dir      (passthrough assets)
//! ```
//!
//! Resolution is best-effort: a missing text file, a timeline that does not
//! exist or a misspelled layout gives a thinner page, never a failed run. Only
//! manifest and output-side problems are errors.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`manifest`] | Manifest discovery, YAML loading, and get-with-default step fields |
//! | [`timeline`] | `@MM:SS:` timed-content parser producing keyframes |
//! | [`markdown`] | Markdown → HTML via pulldown-cmark |
//! | [`resolve`] | Per-step content loading (text, code, timeline) that degrades to empty |
//! | [`layout`] | Layout kinds, the tag → layout dispatcher, render-context assembly |
//! | [`template`] | Render context, the template boundary, and the built-in Maud templates |
//! | [`generate`] | The pipeline: index + step pages + passthrough asset copy |
//! | [`config`] | `config.toml` loading, merging, and validation |
//! | [`output`] | CLI output formatting of a generation run |
//!
//! # Design Decisions
//!
//! ## Layouts Are a Closed Set
//!
//! The six step layouts are an enum, not a trait with open implementations.
//! Selection is a total function with an explicit default arm: an unknown or
//! missing tag is `Text`. Adding a layout means adding a variant, a template
//! and a context arm, and the compiler points at each.
//!
//! ## Templates Behind a Boundary
//!
//! Layouts only know template names and [`template::RenderContext`]. The
//! built-in [`template::MaudRenderer`] produces the HTML, but the pipeline
//! accepts any [`template::TemplateRenderer`], which is also how tests
//! observe exactly what each page was given.
//!
//! ## Explicit Globals
//!
//! Script and stylesheet lists and the step count are a
//! [`template::PageGlobals`] value handed to the renderer when it is built,
//! once per run. There is no process-wide template state.

pub mod config;
pub mod generate;
pub mod layout;
pub mod manifest;
pub mod markdown;
pub mod output;
pub mod resolve;
pub mod template;
pub mod timeline;

#[cfg(test)]
pub(crate) mod test_helpers;
