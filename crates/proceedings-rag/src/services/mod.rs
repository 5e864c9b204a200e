//! Session services: Q&A, summaries and legislative topics

mod qa;
mod summarizer;
mod topics;
mod transcript;

pub use qa::QaService;
pub use summarizer::SessionSummarizer;
pub use topics::{split_sections, TopicExtractor};
pub use transcript::TranscriptSource;

use pulldown_cmark::{html, Options, Parser};

/// Render a markdown artifact to HTML for the session page
pub fn render_markdown(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let parser = Parser::new_ext(markdown, options);

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
