//! Heading extraction for tables of contents and stable anchors.

use crate::models::Heading;
use crate::slug::slugify;
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use std::collections::HashSet;

const FALLBACK_ID: &str = "section";

pub(crate) fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
    options
}

/// Allocates heading ids that are unique within one document.
///
/// A repeated id gets `-2`, `-3`, … appended in document order, skipping
/// any suffix that is already taken.
#[derive(Debug, Default)]
pub struct HeadingIds {
    taken: HashSet<String>,
}

impl HeadingIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self, base: &str) -> String {
        let base = if base.is_empty() { FALLBACK_ID } else { base };
        if self.taken.insert(base.to_string()) {
            return base.to_string();
        }

        let mut counter = 2;
        loop {
            let candidate = format!("{}-{}", base, counter);
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            counter += 1;
        }
    }
}

/// Extract headings from a Markdown/MDX body in document order.
///
/// ```
/// use quire_core::extract_headings;
///
/// let headings = extract_headings("# Intro\n\n## Setup\n\n## Setup\n");
/// let ids: Vec<_> = headings.iter().map(|h| h.id.as_str()).collect();
/// assert_eq!(ids, ["intro", "setup", "setup-2"]);
/// ```
pub fn extract_headings(body: &str) -> Vec<Heading> {
    let mut headings = Vec::new();
    let mut ids = HeadingIds::new();
    // (depth, explicit id, accumulated text)
    let mut current: Option<(u8, Option<String>, String)> = None;

    for event in Parser::new_ext(body, markdown_options()) {
        match event {
            Event::Start(Tag::Heading { level, id, .. }) => {
                current = Some((level as u8, id.map(|s| s.to_string()), String::new()));
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, _, ref mut title)) = current {
                    title.push_str(&text);
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if let Some((_, _, ref mut title)) = current {
                    title.push(' ');
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((depth, explicit, title)) = current.take() {
                    let text = title.split_whitespace().collect::<Vec<_>>().join(" ");
                    let base = explicit.unwrap_or_else(|| slugify(&text));
                    let id = ids.allocate(&base);
                    headings.push(Heading { depth, text, id });
                }
            }
            _ => {}
        }
    }

    headings
}
