//! HTML-safe highlighting of match spans.

use super::engine::DEFAULT_THRESHOLD;
use super::fuzzy::{match_word, tokenize};
use super::MatchSpan;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

static HANDLER_REGEX: OnceLock<Regex> = OnceLock::new();

/// `on<name>=` runs that read like inline event handler attributes.
fn handler_regex() -> &'static Regex {
    HANDLER_REGEX.get_or_init(|| Regex::new(r"(?i)\bon[a-z]+\s*=").unwrap())
}

const MARK_OPEN: &str = "<mark>";
const MARK_CLOSE: &str = "</mark>";

/// Wrap `spans` of `text` in `<mark>` and escape everything else.
///
/// Spans are character offsets with an exclusive end. Overlapping or adjacent
/// spans are merged and out of range spans are clamped, so any span list is
/// accepted. Text is escaped whether or not anything matched, and the
/// leading `o` of handler-like runs such as `onerror=` is written as a
/// character reference so the output never carries them verbatim.
///
/// ```
/// use quire_core::search::{highlight_matches, MatchSpan};
///
/// let html = highlight_matches("a <b> c", &[MatchSpan { start: 2, end: 5 }]);
/// assert_eq!(html, "a <mark>&lt;b&gt;</mark> c");
/// ```
pub fn highlight_matches(text: &str, spans: &[MatchSpan]) -> String {
    let chars: Vec<char> = text.chars().collect();
    let spans = normalize(spans, chars.len());
    let escaper = Escaper {
        chars: &chars,
        handlers: handler_starts(text),
    };

    let mut out = String::with_capacity(text.len() + spans.len() * 13);
    let mut cursor = 0;
    for span in spans {
        escaper.push(&mut out, cursor, span.start);
        out.push_str(MARK_OPEN);
        escaper.push(&mut out, span.start, span.end);
        out.push_str(MARK_CLOSE);
        cursor = span.end;
    }
    escaper.push(&mut out, cursor, chars.len());

    out
}

/// Highlight every word of `text` that matches a term of `query`.
pub fn highlight_query(text: &str, query: &str) -> String {
    let words = tokenize(text);
    let spans: Vec<MatchSpan> = tokenize(query)
        .iter()
        .flat_map(|term| {
            words.iter().filter_map(|word| {
                match_word(&term.chars, word)
                    .filter(|(quality, _)| *quality <= DEFAULT_THRESHOLD)
                    .map(|(_, span)| span)
            })
        })
        .collect();

    highlight_matches(text, &spans)
}

fn normalize(spans: &[MatchSpan], len: usize) -> Vec<MatchSpan> {
    let mut clamped: Vec<MatchSpan> = spans
        .iter()
        .map(|s| MatchSpan {
            start: s.start.min(len),
            end: s.end.min(len),
        })
        .filter(|s| s.start < s.end)
        .collect();
    clamped.sort();

    let mut merged: Vec<MatchSpan> = Vec::with_capacity(clamped.len());
    for span in clamped {
        match merged.last_mut() {
            Some(last) if span.start <= last.end => last.end = last.end.max(span.end),
            _ => merged.push(span),
        }
    }
    merged
}

/// Char offsets where a handler-like run starts.
fn handler_starts(text: &str) -> HashSet<usize> {
    handler_regex()
        .find_iter(text)
        .map(|m| text[..m.start()].chars().count())
        .collect()
}

struct Escaper<'a> {
    chars: &'a [char],
    handlers: HashSet<usize>,
}

impl Escaper<'_> {
    fn push(&self, out: &mut String, start: usize, end: usize) {
        let mut run = String::new();
        for idx in start..end {
            let c = self.chars[idx];
            if self.handlers.contains(&idx) {
                out.push_str(&html_escape::encode_safe(&run));
                run.clear();
                out.push_str(&format!("&#{};", u32::from(c)));
            } else {
                run.push(c);
            }
        }
        out.push_str(&html_escape::encode_safe(&run));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: usize, end: usize) -> MatchSpan {
        MatchSpan { start, end }
    }

    /// Text outside the mark tags must not contain raw angle brackets.
    fn assert_inert(html: &str) {
        let stripped = html.replace(MARK_OPEN, "").replace(MARK_CLOSE, "");
        assert!(!stripped.contains('<'), "raw '<' in {}", html);
        assert!(!stripped.contains('>'), "raw '>' in {}", html);
    }

    #[test]
    fn test_injection_is_escaped() {
        let html = highlight_query("<img src=x onerror=alert(1)>", "img");
        assert!(!html.contains("<img"));
        assert!(html.contains("&lt;<mark>img</mark>"));
        assert!(!html.contains("onerror"));
        assert!(html.contains("&#111;nerror=alert(1)"));
        assert_inert(&html);
    }

    #[test]
    fn test_handler_runs_are_neutralized_inside_marks() {
        let html = highlight_query("<svg OnLoad =x>", "onload");
        assert!(!html.to_lowercase().contains("onload"));
        assert!(html.contains("<mark>&#79;nLoad</mark>"));
        assert_inert(&html);
    }

    #[test]
    fn test_plain_words_starting_with_on_are_untouched() {
        let html = highlight_query("online only", "online");
        assert_eq!(html, "<mark>online</mark> only");
    }

    #[test]
    fn test_script_query_never_produces_markup() {
        let text = "Intro to <script>alert('x')</script> handling";
        let html = highlight_query(text, "<script>");
        assert!(!html.contains("<script"));
        assert!(html.contains("<mark>script</mark>"));
        assert_inert(&html);
    }

    #[test]
    fn test_escapes_without_matches() {
        let html = highlight_matches("a & <b>", &[]);
        assert_eq!(html, "a &amp; &lt;b&gt;");
    }

    #[test]
    fn test_overlapping_spans_merge() {
        let html = highlight_matches("abcdef", &[span(1, 3), span(2, 5), span(5, 6)]);
        assert_eq!(html, "a<mark>bcdef</mark>");
    }

    #[test]
    fn test_out_of_range_spans_clamp() {
        assert_eq!(highlight_matches("abc", &[span(2, 99)]), "ab<mark>c</mark>");
        assert_eq!(highlight_matches("abc", &[span(7, 9), span(2, 1)]), "abc");
    }

    #[test]
    fn test_multibyte_offsets_are_chars() {
        let html = highlight_matches("café au lait", &[span(0, 4)]);
        assert_eq!(html, "<mark>café</mark> au lait");
    }
}
