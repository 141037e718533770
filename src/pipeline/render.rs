//! Markdown → HTML for the presentation layer.
//!
//! Rendering is GitHub-flavoured (tables, strikethrough, task lists,
//! footnotes) and treats single newlines as line breaks, which is what slide
//! authors expect when they put one bullet-like line under another.

use pulldown_cmark::{html, Event, Options, Parser};

/// Render a Markdown body to an HTML fragment.
pub fn render_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);

    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::SoftBreak => Event::HardBreak,
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
