//! Typo-tolerant word matching.
//!
//! Text is split into words (runs of alphanumeric characters) that remember
//! their character offset in the original string, so matches can be mapped
//! back to highlight spans.

use super::MatchSpan;

/// Match quality for an exact word match (0 = perfect, 1 = no match).
pub const EXACT: f64 = 0.0;
pub const PREFIX: f64 = 0.1;
pub const SUBSTRING: f64 = 0.2;
const FUZZY_BASE: f64 = 0.25;
const FUZZY_RANGE: f64 = 0.25;

/// One lowercase word and its character offset in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub start: usize,
    pub chars: Vec<char>,
}

impl Word {
    pub fn span(&self) -> MatchSpan {
        MatchSpan {
            start: self.start,
            end: self.start + self.chars.len(),
        }
    }
}

/// Split text into lowercase words with character offsets.
pub fn tokenize(text: &str) -> Vec<Word> {
    let mut words = Vec::new();
    let mut current: Option<Word> = None;

    for (idx, c) in text.chars().enumerate() {
        if c.is_alphanumeric() {
            let lower = c.to_lowercase().next().unwrap_or(c);
            current
                .get_or_insert_with(|| Word {
                    start: idx,
                    chars: Vec::new(),
                })
                .chars
                .push(lower);
        } else if let Some(word) = current.take() {
            words.push(word);
        }
    }
    if let Some(word) = current {
        words.push(word);
    }

    words
}

/// Edits tolerated for a query term of `len` characters.
pub fn max_edits(len: usize) -> usize {
    match len {
        0..=3 => 0,
        4..=7 => 1,
        _ => 2,
    }
}

/// Match one query term against one word.
///
/// Returns the match quality and the matched span, already offset into the
/// source text.
pub fn match_word(term: &[char], word: &Word) -> Option<(f64, MatchSpan)> {
    if term.is_empty() || word.chars.is_empty() {
        return None;
    }

    if word.chars == term {
        return Some((EXACT, word.span()));
    }
    if word.chars.starts_with(term) {
        return Some((
            PREFIX,
            MatchSpan {
                start: word.start,
                end: word.start + term.len(),
            },
        ));
    }
    if let Some(pos) = find_subslice(&word.chars, term) {
        return Some((
            SUBSTRING,
            MatchSpan {
                start: word.start + pos,
                end: word.start + pos + term.len(),
            },
        ));
    }

    let allowed = max_edits(term.len());
    if allowed == 0 {
        return None;
    }
    let edits = bounded_edit_distance(term, &word.chars, allowed)?;
    let quality = FUZZY_BASE + FUZZY_RANGE * edits as f64 / allowed as f64;
    Some((quality, word.span()))
}

fn find_subslice(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Optimal string alignment distance (Levenshtein plus adjacent
/// transpositions), or `None` once it is certain to exceed `max`.
pub fn bounded_edit_distance(a: &[char], b: &[char], max: usize) -> Option<usize> {
    if a.len().abs_diff(b.len()) > max {
        return None;
    }

    let width = b.len() + 1;
    let mut prev_prev = vec![0usize; width];
    let mut prev: Vec<usize> = (0..width).collect();
    let mut curr = vec![0usize; width];

    for i in 1..=a.len() {
        curr[0] = i;
        let mut row_min = curr[0];
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            let mut value = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
            if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                value = value.min(prev_prev[j - 2] + 1);
            }
            curr[j] = value;
            row_min = row_min.min(value);
        }
        if row_min > max {
            return None;
        }
        std::mem::swap(&mut prev_prev, &mut prev);
        std::mem::swap(&mut prev, &mut curr);
    }

    let distance = prev[b.len()];
    (distance <= max).then_some(distance)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn word(s: &str) -> Word {
        Word {
            start: 0,
            chars: chars(s),
        }
    }

    #[test]
    fn test_tokenize_offsets() {
        let words = tokenize("Hello, Wörld! 42x");
        assert_eq!(words.len(), 3);
        assert_eq!(words[0].chars, chars("hello"));
        assert_eq!(words[1].start, 7);
        assert_eq!(words[1].chars, chars("wörld"));
        assert_eq!(words[2].span(), MatchSpan { start: 14, end: 17 });
    }

    #[test]
    fn test_edit_distance() {
        assert_eq!(bounded_edit_distance(&chars("rust"), &chars("rust"), 1), Some(0));
        assert_eq!(bounded_edit_distance(&chars("rust"), &chars("rusty"), 1), Some(1));
        assert_eq!(bounded_edit_distance(&chars("ruts"), &chars("rust"), 1), Some(1));
        assert_eq!(bounded_edit_distance(&chars("kitten"), &chars("sitting"), 2), None);
        assert_eq!(bounded_edit_distance(&chars("kitten"), &chars("sitting"), 3), Some(3));
    }

    #[test]
    fn test_match_kinds() {
        assert_eq!(match_word(&chars("rust"), &word("rust")).map(|m| m.0), Some(EXACT));
        assert_eq!(match_word(&chars("rus"), &word("rustacean")).map(|m| m.0), Some(PREFIX));
        assert_eq!(match_word(&chars("stac"), &word("rustacean")).map(|m| m.0), Some(SUBSTRING));
        // transposition within the one-edit budget of a 4-7 char term
        let (q, span) = match_word(&chars("pyhton"), &word("python")).unwrap();
        assert!(q > SUBSTRING && q <= 0.5);
        assert_eq!(span, MatchSpan { start: 0, end: 6 });
    }

    #[test]
    fn test_short_terms_are_not_fuzzy() {
        assert!(match_word(&chars("cat"), &word("cut")).is_none());
        assert!(match_word(&chars("go"), &word("do")).is_none());
    }

    #[test]
    fn test_substring_span_offsets() {
        let w = Word {
            start: 10,
            chars: chars("unsafety"),
        };
        let (_, span) = match_word(&chars("safe"), &w).unwrap();
        assert_eq!(span, MatchSpan { start: 12, end: 16 });
    }
}
