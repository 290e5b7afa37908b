use pulldown_cmark::{html, Event, Options, Parser};
use serde::Serialize;

use crate::transcript::{Role, Transcript};

/// A chat bubble as the page draws it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedMessage {
    pub role: Role,
    pub content: String,
    /// `content` rendered from markdown. Raw HTML in the source is escaped,
    /// so this is safe to insert into the page.
    pub html: String,
}

/// Project the whole transcript into display order. Pure: the page redraws
/// from scratch on every call, so repeated calls must agree.
pub fn render_transcript(transcript: &Transcript) -> Vec<RenderedMessage> {
    transcript
        .all()
        .iter()
        .map(|entry| RenderedMessage {
            role: entry.role(),
            content: entry.text().to_string(),
            html: markdown_to_html(entry.text()),
        })
        .collect()
}

pub fn markdown_to_html(content: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);

    // Model output is untrusted: show HTML tags as text instead of emitting them.
    let parser = Parser::new_ext(content, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);
    html_output
}
