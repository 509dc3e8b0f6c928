//! Converts paragraph text (inline markdown) and plain strings into HTML
//! fragments suitable for dropping into a template.

use pulldown_cmark::escape::escape_html;
use pulldown_cmark::{html, Event, Options, Parser, Tag};
use std::io;

/// Renders `text` as inline markdown. The paragraph wrapper that
/// [`pulldown_cmark`] would normally emit is dropped since the template
/// decides the enclosing element from the paragraph's kind.
pub fn inline_html(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let events = Parser::new_ext(text, options).filter(|ev| {
        !matches!(
            ev,
            Event::Start(Tag::Paragraph) | Event::End(Tag::Paragraph)
        )
    });

    let mut out = String::with_capacity(text.len());
    html::push_html(&mut out, events);
    out.trim_end().to_owned()
}

/// Escapes `text` for use as HTML text or a double-quoted attribute value.
pub fn escape(text: &str) -> io::Result<String> {
    let mut out = String::with_capacity(text.len());
    escape_html(&mut out, text)?;
    Ok(out)
}
