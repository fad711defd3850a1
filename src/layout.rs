//! Layout selection and render-context assembly.
//!
//! A step's `Layout` tag picks one of six page layouts. Each layout names the
//! template it renders with and the subset of step content it needs:
//!
//! | Layout | Context |
//! |--------|---------|
//! | `Text` | title, contents |
//! | `Video` | title, video |
//! | `Code` | title, code |
//! | `VideoAndText` | title, video, contents, keyframes (prose) |
//! | `TextAndCode` | title, contents, code |
//! | `VideoAndCode` | title, code, keyframes (code), video |
//!
//! The module-level `Index` layout is rendered once per module from the module
//! title and step count.
//!
//! [`LayoutKind::from_tag`] is total: a missing or unknown tag selects `Text`.
//! Tags are matched exactly, so `code` is unknown and renders as `Text`.

use crate::manifest::StepSpec;
use crate::resolve::StepContent;
use crate::template::{RenderContext, TemplateError, TemplateRenderer, keys};
use crate::timeline::ContentMode;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// The page layouts, one per template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutKind {
    Text,
    Video,
    Code,
    VideoAndText,
    TextAndCode,
    VideoAndCode,
    Index,
}

impl LayoutKind {
    /// Layouts a step may declare.
    pub const STEP_LAYOUTS: [LayoutKind; 6] = [
        LayoutKind::Text,
        LayoutKind::Video,
        LayoutKind::Code,
        LayoutKind::VideoAndText,
        LayoutKind::TextAndCode,
        LayoutKind::VideoAndCode,
    ];

    /// Name of the template this layout renders with. Also the manifest tag.
    pub fn template_name(self) -> &'static str {
        match self {
            LayoutKind::Text => "Text",
            LayoutKind::Video => "Video",
            LayoutKind::Code => "Code",
            LayoutKind::VideoAndText => "VideoAndText",
            LayoutKind::TextAndCode => "TextAndCode",
            LayoutKind::VideoAndCode => "VideoAndCode",
            LayoutKind::Index => "Index",
        }
    }

    /// Look up a layout by template name, `Index` included.
    pub fn from_template_name(name: &str) -> Option<Self> {
        if name == "Index" {
            return Some(LayoutKind::Index);
        }
        Self::STEP_LAYOUTS
            .into_iter()
            .find(|kind| kind.template_name() == name)
    }

    /// Select the layout for a step's `Layout` tag, defaulting to `Text`.
    pub fn from_tag(tag: Option<&str>) -> Self {
        let Some(tag) = tag else {
            return LayoutKind::Text;
        };
        Self::STEP_LAYOUTS
            .into_iter()
            .find(|kind| kind.template_name() == tag)
            .unwrap_or_else(|| {
                debug!(tag, "unrecognized layout; falling back to Text");
                LayoutKind::Text
            })
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.template_name())
    }
}

/// A step bound to its layout, base directory and renderer.
///
/// Holds no state beyond its inputs; rendering the same step twice against
/// unchanged files yields identical output.
pub struct StepLayout<'a> {
    kind: LayoutKind,
    content: StepContent<'a>,
    renderer: &'a dyn TemplateRenderer,
}

/// Bind a step to the layout its `Layout` tag selects.
pub fn select_layout<'a>(
    step: &'a StepSpec,
    base: &'a Path,
    renderer: &'a dyn TemplateRenderer,
) -> StepLayout<'a> {
    StepLayout {
        kind: LayoutKind::from_tag(step.layout_tag()),
        content: StepContent::new(step, base),
        renderer,
    }
}

impl StepLayout<'_> {
    pub fn kind(&self) -> LayoutKind {
        self.kind
    }

    /// Assemble the template context this layout needs.
    pub fn context(&self) -> RenderContext {
        let content = &self.content;
        let step = content.step();
        let mut ctx = RenderContext::new().with(keys::TITLE, step.title());

        match self.kind {
            LayoutKind::Text => {
                ctx.insert(keys::CONTENTS, content.markdown());
            }
            LayoutKind::Video => {
                ctx.insert(keys::VIDEO, step.video());
            }
            LayoutKind::Code => {
                ctx.insert(keys::CODE, content.code());
            }
            LayoutKind::VideoAndText => {
                ctx.insert(keys::VIDEO, step.video());
                ctx.insert(keys::CONTENTS, content.markdown());
                ctx.insert(keys::KEYFRAMES, content.timeline(ContentMode::Prose));
            }
            LayoutKind::TextAndCode => {
                ctx.insert(keys::CONTENTS, content.markdown());
                ctx.insert(keys::CODE, content.code());
            }
            LayoutKind::VideoAndCode => {
                ctx.insert(keys::CODE, content.code());
                ctx.insert(keys::KEYFRAMES, content.timeline(ContentMode::Code));
                ctx.insert(keys::VIDEO, step.video());
            }
            // Never produced by `from_tag`; steps only see the six step layouts.
            LayoutKind::Index => {}
        }
        ctx
    }

    /// Render the step to a complete HTML document.
    pub fn render(&self) -> Result<String, TemplateError> {
        self.renderer
            .render(self.kind.template_name(), &self.context())
    }
}

/// The module overview page.
pub struct IndexLayout<'a> {
    title: &'a str,
    num_steps: usize,
    renderer: &'a dyn TemplateRenderer,
}

impl<'a> IndexLayout<'a> {
    pub fn new(title: &'a str, num_steps: usize, renderer: &'a dyn TemplateRenderer) -> Self {
        Self {
            title,
            num_steps,
            renderer,
        }
    }

    pub fn context(&self) -> RenderContext {
        RenderContext::new()
            .with(keys::TITLE, self.title)
            .with(keys::NUM_STEPS, self.num_steps)
    }

    pub fn render(&self) -> Result<String, TemplateError> {
        self.renderer
            .render(LayoutKind::Index.template_name(), &self.context())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::RecordingRenderer;
    use crate::timeline::Keyframe;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn known_tags_select_their_layout() {
        for kind in LayoutKind::STEP_LAYOUTS {
            assert_eq!(LayoutKind::from_tag(Some(kind.template_name())), kind);
        }
    }

    #[test]
    fn unknown_tag_matches_absent_tag() {
        assert_eq!(LayoutKind::from_tag(Some("Bogus")), LayoutKind::from_tag(None));
        assert_eq!(LayoutKind::from_tag(None), LayoutKind::Text);
    }

    #[test]
    fn tags_are_case_sensitive() {
        assert_eq!(LayoutKind::from_tag(Some("code")), LayoutKind::Text);
        assert_eq!(LayoutKind::from_tag(Some("VIDEO")), LayoutKind::Text);
    }

    #[test]
    fn index_is_not_a_step_layout() {
        assert_eq!(LayoutKind::from_tag(Some("Index")), LayoutKind::Text);
        assert_eq!(LayoutKind::from_template_name("Index"), Some(LayoutKind::Index));
    }

    #[test]
    fn template_names_round_trip() {
        for kind in LayoutKind::STEP_LAYOUTS {
            assert_eq!(LayoutKind::from_template_name(kind.template_name()), Some(kind));
        }
        assert_eq!(LayoutKind::from_template_name("Sidebar"), None);
    }

    #[test]
    fn select_layout_reads_step_tag() {
        let tmp = TempDir::new().unwrap();
        let renderer = RecordingRenderer::default();
        let step = StepSpec::from_pairs([("Layout", "VideoAndCode")]);
        let layout = select_layout(&step, tmp.path(), &renderer);
        assert_eq!(layout.kind(), LayoutKind::VideoAndCode);
    }

    // =========================================================================
    // Context assembly
    // =========================================================================

    fn full_module() -> (TempDir, Vec<(&'static str, &'static str)>) {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("text.md"), "Read *this*.").unwrap();
        fs::write(tmp.path().join("t.timeline"), "@00:02:\n*two*\n\n@00:04:\nfour\n").unwrap();
        let pairs = vec![
            ("Title", "Step"),
            ("TextContents", "text.md"),
            ("Timeline", "t.timeline"),
            ("CodeContents", "x = 1"),
            ("Video", "clip.mp4"),
        ];
        (tmp, pairs)
    }

    fn context_for(layout: &'static str) -> RenderContext {
        let (tmp, mut pairs) = full_module();
        pairs.push(("Layout", layout));
        let step = StepSpec::from_pairs(pairs);
        let renderer = RecordingRenderer::default();
        select_layout(&step, tmp.path(), &renderer).context()
    }

    #[test]
    fn text_context() {
        let ctx = context_for("Text");
        assert_eq!(ctx.keys(), vec!["contents", "title"]);
        assert_eq!(ctx.text(keys::TITLE), "Step");
        assert!(ctx.text(keys::CONTENTS).contains("<em>this</em>"));
    }

    #[test]
    fn video_context() {
        let ctx = context_for("Video");
        assert_eq!(ctx.keys(), vec!["title", "video"]);
        assert_eq!(ctx.text(keys::VIDEO), "clip.mp4");
    }

    #[test]
    fn code_context() {
        let ctx = context_for("Code");
        assert_eq!(ctx.keys(), vec!["code", "title"]);
        assert_eq!(ctx.text(keys::CODE), "x = 1");
    }

    #[test]
    fn video_and_text_context_uses_prose_keyframes() {
        let ctx = context_for("VideoAndText");
        assert_eq!(ctx.keys(), vec!["contents", "keyframes", "title", "video"]);
        let frames = ctx.keyframes(keys::KEYFRAMES);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].offset, 2);
        assert!(frames[0].content.contains("<em>two</em>"));
    }

    #[test]
    fn text_and_code_context() {
        let ctx = context_for("TextAndCode");
        assert_eq!(ctx.keys(), vec!["code", "contents", "title"]);
    }

    #[test]
    fn video_and_code_context_uses_raw_keyframes() {
        let ctx = context_for("VideoAndCode");
        assert_eq!(ctx.keys(), vec!["code", "keyframes", "title", "video"]);
        assert_eq!(
            ctx.keyframes(keys::KEYFRAMES),
            &[Keyframe::new(2, "*two*"), Keyframe::new(4, "four")]
        );
    }

    #[test]
    fn every_layout_tolerates_an_empty_step() {
        let tmp = TempDir::new().unwrap();
        let renderer = RecordingRenderer::default();
        for kind in LayoutKind::STEP_LAYOUTS {
            let step = StepSpec::from_pairs([("Layout", kind.template_name())]);
            let layout = select_layout(&step, tmp.path(), &renderer);
            let ctx = layout.context();
            assert_eq!(ctx.text(keys::TITLE), "");
            assert!(layout.render().is_ok(), "{kind} failed on an empty step");
        }
        let rendered: Vec<String> = renderer.calls().into_iter().map(|(name, _)| name).collect();
        assert_eq!(
            rendered,
            vec!["Text", "Video", "Code", "VideoAndText", "TextAndCode", "VideoAndCode"]
        );
    }

    #[test]
    fn render_uses_layout_template() {
        let tmp = TempDir::new().unwrap();
        let renderer = RecordingRenderer::default();
        let step = StepSpec::from_pairs([("Layout", "Code"), ("CodeContents", "print(1)")]);
        select_layout(&step, tmp.path(), &renderer).render().unwrap();

        let calls = renderer.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "Code");
        assert_eq!(calls[0].1.text(keys::CODE), "print(1)");
    }

    #[test]
    fn index_context_is_title_and_step_count() {
        let renderer = RecordingRenderer::default();
        let index = IndexLayout::new("Intro", 3, &renderer);
        let ctx = index.context();
        assert_eq!(ctx.keys(), vec!["numSteps", "title"]);
        assert_eq!(ctx.integer(keys::NUM_STEPS), 3);

        index.render().unwrap();
        assert_eq!(renderer.calls()[0].0, "Index");
    }
}
