//! Markdown to HTML conversion.
//!
//! Lesson prose (step text files and prose timeline blocks) is CommonMark with
//! the usual GitHub extensions. Raw HTML in the source passes through
//! untouched, so authors can drop in the odd `<kbd>` or `<iframe>`.

use pulldown_cmark::{Options, Parser, html};

fn options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

/// Render a markdown document to an HTML fragment.
pub fn render_markdown(source: &str) -> String {
    let parser = Parser::new_ext(source, options());
    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
