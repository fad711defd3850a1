//! Page templates.
//!
//! Layouts talk to templates through a narrow boundary: a template name plus a
//! [`RenderContext`] in, a complete HTML document out. [`TemplateRenderer`] is
//! that boundary; [`MaudRenderer`] is the built-in implementation.
//!
//! ## Globals
//!
//! Besides the per-page context every template sees the same [`PageGlobals`]:
//! the script and stylesheet URLs from config and the module's step count.
//! They are fixed when the renderer is built, before the first page renders,
//! and shared read-only by every page of the run.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Titles, video URLs, code and code keyframes are escaped on interpolation.
//! Rendered markdown (`contents`, prose keyframes) is already HTML and is
//! inserted as-is.

use crate::config::AssetsConfig;
use crate::layout::LayoutKind;
use crate::timeline::Keyframe;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(String),
}

/// Context variable names shared by layouts and templates.
pub mod keys {
    pub const TITLE: &str = "title";
    pub const CONTENTS: &str = "contents";
    pub const CODE: &str = "code";
    pub const VIDEO: &str = "video";
    pub const KEYFRAMES: &str = "keyframes";
    pub const NUM_STEPS: &str = "numSteps";
}

/// A single context value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextValue {
    Text(String),
    Integer(usize),
    Keyframes(Vec<Keyframe>),
}

impl From<String> for ContextValue {
    fn from(value: String) -> Self {
        ContextValue::Text(value)
    }
}

impl From<&str> for ContextValue {
    fn from(value: &str) -> Self {
        ContextValue::Text(value.to_string())
    }
}

impl From<usize> for ContextValue {
    fn from(value: usize) -> Self {
        ContextValue::Integer(value)
    }
}

impl From<Vec<Keyframe>> for ContextValue {
    fn from(value: Vec<Keyframe>) -> Self {
        ContextValue::Keyframes(value)
    }
}

/// Template variables for one page.
///
/// Lookups never fail: a missing or differently-typed variable reads as its
/// empty value, so templates render empty placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderContext {
    values: BTreeMap<String, ContextValue>,
}

impl RenderContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ContextValue>) {
        self.values.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.values.get(key)
    }

    /// Variable names in sorted order.
    pub fn keys(&self) -> Vec<&str> {
        self.values.keys().map(String::as_str).collect()
    }

    pub fn text(&self, key: &str) -> &str {
        match self.values.get(key) {
            Some(ContextValue::Text(s)) => s.as_str(),
            _ => "",
        }
    }

    pub fn integer(&self, key: &str) -> usize {
        match self.values.get(key) {
            Some(ContextValue::Integer(n)) => *n,
            _ => 0,
        }
    }

    pub fn keyframes(&self, key: &str) -> &[Keyframe] {
        match self.values.get(key) {
            Some(ContextValue::Keyframes(frames)) => frames.as_slice(),
            _ => &[],
        }
    }
}

/// Renders a named template against a context.
///
/// Implementations are shared across render workers, hence `Sync`.
pub trait TemplateRenderer: Sync {
    fn render(&self, template: &str, context: &RenderContext) -> Result<String, TemplateError>;
}

/// Values every template sees, fixed for the whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageGlobals {
    pub scripts: Vec<String>,
    pub styles: Vec<String>,
    pub num_steps: usize,
}

impl PageGlobals {
    pub fn new(assets: &AssetsConfig, num_steps: usize) -> Self {
        Self {
            scripts: assets.scripts.clone(),
            styles: assets.styles.clone(),
            num_steps,
        }
    }
}

const CSS: &str = include_str!("../static/style.css");
const TIMELINE_JS: &str = include_str!("../static/timeline.js");

/// The built-in maud templates.
#[derive(Debug, Clone)]
pub struct MaudRenderer {
    globals: PageGlobals,
}

impl MaudRenderer {
    pub fn new(globals: PageGlobals) -> Self {
        Self { globals }
    }
}

impl TemplateRenderer for MaudRenderer {
    fn render(&self, template: &str, ctx: &RenderContext) -> Result<String, TemplateError> {
        let kind = LayoutKind::from_template_name(template)
            .ok_or_else(|| TemplateError::NotFound(template.to_string()))?;
        let title = ctx.text(keys::TITLE);

        let (class, body) = match kind {
            LayoutKind::Index => ("layout-index", index_body(title, ctx.integer(keys::NUM_STEPS))),
            LayoutKind::Text => (
                "layout-text",
                html! {
                    h1 { (title) }
                    (prose(ctx.text(keys::CONTENTS)))
                },
            ),
            LayoutKind::Video => (
                "layout-video",
                html! {
                    h1 { (title) }
                    (video_player(ctx.text(keys::VIDEO)))
                },
            ),
            LayoutKind::Code => (
                "layout-code",
                html! {
                    h1 { (title) }
                    (code_block(ctx.text(keys::CODE)))
                },
            ),
            LayoutKind::VideoAndText => (
                "layout-video-text",
                html! {
                    h1 { (title) }
                    div.split {
                        (video_player(ctx.text(keys::VIDEO)))
                        div.panel {
                            (prose(ctx.text(keys::CONTENTS)))
                            (keyframe_list(ctx.keyframes(keys::KEYFRAMES), false))
                        }
                    }
                },
            ),
            LayoutKind::TextAndCode => (
                "layout-text-code",
                html! {
                    h1 { (title) }
                    div.split {
                        (prose(ctx.text(keys::CONTENTS)))
                        (code_block(ctx.text(keys::CODE)))
                    }
                },
            ),
            LayoutKind::VideoAndCode => (
                "layout-video-code",
                html! {
                    h1 { (title) }
                    div.split {
                        (video_player(ctx.text(keys::VIDEO)))
                        div.panel {
                            (code_block(ctx.text(keys::CODE)))
                            (keyframe_list(ctx.keyframes(keys::KEYFRAMES), true))
                        }
                    }
                },
            ),
        };

        let has_timeline = !ctx.keyframes(keys::KEYFRAMES).is_empty();
        Ok(base_document(&self.globals, title, class, body, has_timeline).into_string())
    }
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(
    globals: &PageGlobals,
    title: &str,
    class: &str,
    content: Markup,
    has_timeline: bool,
) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                @for href in &globals.styles {
                    link rel="stylesheet" href=(href);
                }
                style { (PreEscaped(CSS)) }
            }
            body {
                (step_nav(globals.num_steps))
                main class=(class) {
                    (content)
                }
                @for src in &globals.scripts {
                    script src=(src) {}
                }
                @if has_timeline {
                    script { (PreEscaped(TIMELINE_JS)) }
                }
            }
        }
    }
}

/// Links to the overview and every step page.
fn step_nav(num_steps: usize) -> Markup {
    html! {
        nav.step-nav {
            a href="index.html" { "Overview" }
            @for i in 0..num_steps {
                a href={ "step" (i) ".html" } { (i + 1) }
            }
        }
    }
}

fn index_body(title: &str, num_steps: usize) -> Markup {
    html! {
        h1 { (title) }
        p.step-count { (num_steps) @if num_steps == 1 { " step" } @else { " steps" } }
        ol.step-list {
            @for i in 0..num_steps {
                li { a href={ "step" (i) ".html" } { "Step " (i + 1) } }
            }
        }
    }
}

fn prose(html_fragment: &str) -> Markup {
    html! {
        article.prose { (PreEscaped(html_fragment)) }
    }
}

fn code_block(code: &str) -> Markup {
    html! {
        pre.code { code { (code) } }
    }
}

fn video_player(src: &str) -> Markup {
    html! {
        div.video-frame {
            @if src.is_empty() {
                div.video-placeholder {}
            } @else {
                video controls preload="metadata" src=(src) {}
            }
        }
    }
}

/// Keyframes carry their offset for the timeline script; code keyframes are
/// escaped, prose keyframes are already HTML.
fn keyframe_list(frames: &[Keyframe], code: bool) -> Markup {
    html! {
        @if !frames.is_empty() {
            ol.keyframes {
                @for frame in frames {
                    li.keyframe data-offset=(frame.offset) {
                        @if code {
                            pre.code { code { (frame.content) } }
                        } @else {
                            (PreEscaped(&frame.content))
                        }
                    }
                }
            }
        }
    }
}
