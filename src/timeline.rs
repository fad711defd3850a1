//! Timed-content parsing.
//!
//! A timeline file synchronizes text or code with a step's video. It holds
//! zero or more blocks, each opened by an `@MM:SS:` marker line and closed by
//! a blank line or the end of the file:
//!
//! ```text
//! @00:05:
//! Define the function first.
//!
//! @01:30:
//! Now *call* it.
//! ```
//!
//! Each block becomes a [`Keyframe`] whose offset is `MM * 60 + SS` seconds.
//! Keyframes keep the order their markers appear in, not offset order: the
//! author controls the sequence.
//!
//! ## Permissive offsets
//!
//! Minutes and seconds are exactly two ASCII digits each, but seconds are not
//! range checked. `@01:75:` yields 135 seconds. A block whose marker is not
//! two-digit is simply not a marker, so it never aborts the parse.

use crate::markdown::render_markdown;
use regex::Regex;
use std::sync::LazyLock;

static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)@([0-9]{2}):([0-9]{2}):\n(.*?)(?:\n\n|\s*$)")
        .expect("marker regex is valid")
});

/// How block bodies are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentMode {
    /// Body kept verbatim (code snippets).
    Code,
    /// Body rendered from markdown to HTML.
    Prose,
}

/// One timestamped block of a timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyframe {
    /// Offset into the video, in seconds.
    pub offset: u32,
    /// Raw text (code mode) or rendered HTML (prose mode).
    pub content: String,
}

impl Keyframe {
    pub fn new(offset: u32, content: impl Into<String>) -> Self {
        Self {
            offset,
            content: content.into(),
        }
    }
}

/// Extract every keyframe from `text`, in source order.
///
/// Text without markers yields an empty vector.
pub fn parse_timeline(text: &str, mode: ContentMode) -> Vec<Keyframe> {
    let normalized;
    let text = if text.contains("\r\n") {
        normalized = text.replace("\r\n", "\n");
        normalized.as_str()
    } else {
        text
    };

    MARKER
        .captures_iter(text)
        .filter_map(|caps| {
            let minutes: u32 = caps[1].parse().ok()?;
            let seconds: u32 = caps[2].parse().ok()?;
            let body = &caps[3];
            let content = match mode {
                ContentMode::Code => body.to_string(),
                ContentMode::Prose => render_markdown(body),
            };
            Some(Keyframe::new(minutes * 60 + seconds, content))
        })
        .collect()
}
