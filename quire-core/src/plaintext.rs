//! Plain text projections of Markdown/MDX bodies.

use crate::headings::markdown_options;
use pulldown_cmark::{Event, Parser, TagEnd};
use unicode_segmentation::UnicodeSegmentation;

pub const WORDS_PER_MINUTE: usize = 200;
pub const EXCERPT_CHARS: usize = 160;

/// Render a body to searchable plain text.
///
/// Markup, raw HTML/JSX and MDX `import`/`export` statements are dropped,
/// code is kept as text and whitespace is collapsed.
pub fn markdown_to_plaintext(body: &str) -> String {
    let source = strip_mdx_statements(body);
    let mut text = String::with_capacity(source.len());

    for event in Parser::new_ext(&source, markdown_options()) {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(&t),
            Event::SoftBreak | Event::HardBreak | Event::Rule => text.push(' '),
            Event::End(TagEnd::Paragraph)
            | Event::End(TagEnd::Heading(_))
            | Event::End(TagEnd::Item)
            | Event::End(TagEnd::CodeBlock)
            | Event::End(TagEnd::TableCell)
            | Event::End(TagEnd::BlockQuote(_)) => text.push(' '),
            _ => {}
        }
    }

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove top-level MDX `import`/`export` lines, leaving fenced code alone.
fn strip_mdx_statements(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut fence: Option<&str> = None;

    for line in body.split_inclusive('\n') {
        let trimmed = line.trim_start();
        match fence {
            Some(marker) => {
                if trimmed.starts_with(marker) {
                    fence = None;
                }
            }
            None => {
                if trimmed.starts_with("```") {
                    fence = Some("```");
                } else if trimmed.starts_with("~~~") {
                    fence = Some("~~~");
                } else if line.starts_with("import ") || line.starts_with("export ") {
                    continue;
                }
            }
        }
        out.push_str(line);
    }

    out
}

/// Count words in already-plain text.
pub fn word_count(text: &str) -> usize {
    text.unicode_words().count()
}

/// Estimated reading time in whole minutes, never less than one.
///
/// ```
/// use quire_core::plaintext::reading_time;
///
/// assert_eq!(reading_time("short"), 1);
/// assert_eq!(reading_time(&"word ".repeat(401)), 3);
/// ```
pub fn reading_time(body: &str) -> u32 {
    let words = word_count(&markdown_to_plaintext(body));
    let minutes = words.div_ceil(WORDS_PER_MINUTE).max(1);
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

/// Truncate at a word boundary within `max_chars`, appending `...`.
pub fn create_snippet(text: &str, max_chars: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_chars {
        return text.to_string();
    }

    let truncated: String = chars[..max_chars].iter().collect();
    match truncated.rfind(' ') {
        Some(last_space) if last_space > 0 => format!("{}...", truncated[..last_space].trim_end()),
        _ => format!("{}...", truncated),
    }
}
