//! Date handling and the site URL surface.
//!
//! Every date is interpreted in UTC. A stored `YYYY-MM-DD` is a calendar
//! date, so URL generation never depends on the machine's local timezone.
//!
//! Paths are kept decoded internally; percent-encoding only happens when a
//! route is turned into a string, and decoding when one is parsed.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS, NON_ALPHANUMERIC};
use thiserror::Error;

/// Characters that cannot appear verbatim inside one path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// First path segments owned by the router; a page cannot use them as slug.
pub const RESERVED_PAGE_SLUGS: &[&str] = &["page", "search", "tag", "tags"];

fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    #[error("Empty date")]
    Empty,

    #[error("Unrecognized date '{0}' (expected YYYY-MM-DD)")]
    Invalid(String),
}

/// Parse a frontmatter date into a calendar date.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps and Jekyll-style
/// `YYYY-MM-DD HH:MM:SS [+ZZZZ]`. Timestamps are converted to UTC before the
/// calendar date is taken.
///
/// ```
/// use quire_core::url::parse_iso_date;
///
/// let date = parse_iso_date("2024-02-29").unwrap();
/// assert_eq!(date.to_string(), "2024-02-29");
/// ```
pub fn parse_iso_date(raw: &str) -> Result<NaiveDate, DateError> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(DateError::Empty);
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc).date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S %z") {
        return Ok(dt.with_timezone(&Utc).date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt.and_utc().date_naive());
    }

    Err(DateError::Invalid(s.to_string()))
}

/// Serialize a date back to the stored ISO form.
pub fn format_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Date-partitioned post URL, always with a trailing slash.
///
/// ```
/// use chrono::NaiveDate;
/// use quire_core::derive_url;
///
/// let date = NaiveDate::from_ymd_opt(2021, 3, 4).unwrap();
/// assert_eq!(derive_url(date, "hello"), "/2021/03/04/hello/");
/// ```
pub fn derive_url(date: NaiveDate, slug: &str) -> String {
    format!(
        "/{:04}/{:02}/{:02}/{}/",
        date.year(),
        date.month(),
        date.day(),
        encode_segment(slug)
    )
}

/// Recover `(date, slug)` from a post URL produced by [`derive_url`].
pub fn parse_post_url(path: &str) -> Option<(NaiveDate, String)> {
    match Route::parse(path)? {
        Route::Post { date, slug } => Some((date, slug)),
        _ => None,
    }
}

/// One addressable location of the static site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/` for page 1, `/page/{n}/` otherwise
    Listing(usize),
    /// `/{yyyy}/{mm}/{dd}/{slug}/`
    Post { date: NaiveDate, slug: String },
    /// `/{slug}/` for documents of the pages collection
    Page(String),
    /// `/tags/`
    Tags,
    /// `/tag/{tag}/` for page 1, `/tag/{tag}/page/{n}/` otherwise
    Tag { tag: String, page: usize },
    /// `/search/?q={query}`
    Search { query: String },
}

impl Route {
    /// Render the route as a directory-style path.
    pub fn path(&self) -> String {
        match self {
            Route::Listing(page) if *page <= 1 => "/".to_string(),
            Route::Listing(page) => format!("/page/{}/", page),
            Route::Post { date, slug } => derive_url(*date, slug),
            Route::Page(slug) => format!("/{}/", encode_segment(slug)),
            Route::Tags => "/tags/".to_string(),
            Route::Tag { tag, page } if *page <= 1 => format!("/tag/{}/", encode_segment(tag)),
            Route::Tag { tag, page } => {
                format!("/tag/{}/page/{}/", encode_segment(tag), page)
            }
            Route::Search { query } => format!(
                "/search/?q={}",
                utf8_percent_encode(query, NON_ALPHANUMERIC)
            ),
        }
    }

    /// Parse a request path (optionally with a query string) into a route.
    ///
    /// Segments are percent-decoded. Returns `None` for paths outside the
    /// URL surface, including impossible calendar dates.
    pub fn parse(raw: &str) -> Option<Self> {
        let (path, query) = match raw.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (raw, None),
        };
        let path = path.split('#').next().unwrap_or(path);

        let segments: Vec<String> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(decode_segment)
            .collect();
        let segments: Vec<&str> = segments.iter().map(String::as_str).collect();

        match segments.as_slice() {
            [] => Some(Route::Listing(1)),
            ["page", n] => parse_page_number(n).map(Route::Listing),
            ["tags"] => Some(Route::Tags),
            ["tag", tag] => Some(Route::Tag {
                tag: tag.to_string(),
                page: 1,
            }),
            ["tag", tag, "page", n] => parse_page_number(n).map(|page| Route::Tag {
                tag: tag.to_string(),
                page,
            }),
            ["search"] => Some(Route::Search {
                query: query.and_then(query_param_q).unwrap_or_default(),
            }),
            [year, month, day, slug] => {
                let date = parse_date_segments(year, month, day)?;
                Some(Route::Post {
                    date,
                    slug: slug.to_string(),
                })
            }
            [slug] => Some(Route::Page(slug.to_string())),
            _ => None,
        }
    }
}

fn decode_segment(segment: &str) -> String {
    percent_decode_str(segment)
        .decode_utf8()
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

fn parse_page_number(raw: &str) -> Option<usize> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

fn parse_date_segments(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    let digits = |s: &str, len: usize| s.len() == len && s.bytes().all(|b| b.is_ascii_digit());
    if !(digits(year, 4) && digits(month, 2) && digits(day, 2)) {
        return None;
    }
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

fn query_param_q(query: &str) -> Option<String> {
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if key != "q" {
            return None;
        }
        let value = value.replace('+', " ");
        Some(decode_segment(&value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_iso_date_formats() {
        assert_eq!(parse_iso_date("2020-01-02").unwrap(), date(2020, 1, 2));
        assert_eq!(
            parse_iso_date("2020-01-02T23:30:00Z").unwrap(),
            date(2020, 1, 2)
        );
        assert_eq!(
            parse_iso_date("2015-03-01 22:00:00 -0500").unwrap(),
            date(2015, 3, 2)
        );
        assert_eq!(
            parse_iso_date("2015-03-01 22:00:00").unwrap(),
            date(2015, 3, 1)
        );
    }

    #[test]
    fn test_parse_iso_date_offset_converts_to_utc() {
        // 01:00 at +05:00 is still the previous day in UTC
        assert_eq!(
            parse_iso_date("2020-01-02T01:00:00+05:00").unwrap(),
            date(2020, 1, 1)
        );
    }

    #[test]
    fn test_parse_iso_date_rejects_garbage() {
        assert_eq!(parse_iso_date("  "), Err(DateError::Empty));
        assert!(matches!(
            parse_iso_date("2020-13-01"),
            Err(DateError::Invalid(_))
        ));
        assert!(parse_iso_date("yesterday").is_err());
    }

    #[test]
    fn test_derive_url_pads_components() {
        assert_eq!(derive_url(date(2021, 3, 4), "hello"), "/2021/03/04/hello/");
        assert_eq!(derive_url(date(1999, 12, 31), "x"), "/1999/12/31/x/");
    }

    #[test]
    fn test_post_url_round_trip() {
        let d = date(2024, 2, 29);
        let url = derive_url(d, "leap-day");
        assert_eq!(parse_post_url(&url), Some((d, "leap-day".to_string())));
    }

    #[test]
    fn test_route_paths() {
        assert_eq!(Route::Listing(1).path(), "/");
        assert_eq!(Route::Listing(3).path(), "/page/3/");
        assert_eq!(Route::Tags.path(), "/tags/");
        assert_eq!(
            Route::Tag {
                tag: "rust".into(),
                page: 1
            }
            .path(),
            "/tag/rust/"
        );
        assert_eq!(
            Route::Tag {
                tag: "rust".into(),
                page: 2
            }
            .path(),
            "/tag/rust/page/2/"
        );
        assert_eq!(
            Route::Search {
                query: "rust async".into()
            }
            .path(),
            "/search/?q=rust%20async"
        );
        assert_eq!(Route::Page("about".into()).path(), "/about/");
    }

    #[test]
    fn test_route_parse() {
        assert_eq!(Route::parse("/"), Some(Route::Listing(1)));
        assert_eq!(Route::parse("/page/2/"), Some(Route::Listing(2)));
        assert_eq!(Route::parse("/page/two/"), None);
        assert_eq!(Route::parse("/tags/"), Some(Route::Tags));
        assert_eq!(
            Route::parse("/tag/d-d-5e/page/3/"),
            Some(Route::Tag {
                tag: "d-d-5e".into(),
                page: 3
            })
        );
        assert_eq!(
            Route::parse("/search/?q=hello+world"),
            Some(Route::Search {
                query: "hello world".into()
            })
        );
        assert_eq!(
            Route::parse("/search/?q=%3Cscript%3E"),
            Some(Route::Search {
                query: "<script>".into()
            })
        );
        assert_eq!(Route::parse("/about/"), Some(Route::Page("about".into())));
        assert_eq!(Route::parse("/a/b/"), None);
    }

    #[test]
    fn test_reserved_characters_in_slugs_round_trip() {
        let d = date(2021, 1, 1);
        let url = derive_url(d, "what-is-c#?");
        assert_eq!(url, "/2021/01/01/what-is-c%23%3F/");
        assert_eq!(parse_post_url(&url), Some((d, "what-is-c#?".to_string())));

        for slug in ["100%", "Tom's Post", "a&b", "ünïcode"] {
            let page = Route::Page(slug.to_string());
            assert_eq!(Route::parse(&page.path()), Some(page));
        }
    }

    #[test]
    fn test_route_parse_post_decodes_slug() {
        assert_eq!(
            Route::parse("/2020/01/02/Tom's%20Post/"),
            Some(Route::Post {
                date: date(2020, 1, 2),
                slug: "Tom's Post".into()
            })
        );
    }

    #[test]
    fn test_route_parse_rejects_impossible_dates() {
        assert_eq!(Route::parse("/2021/02/30/x/"), None);
        assert_eq!(Route::parse("/2021/2/3/x/"), None);
    }

    #[test]
    fn test_search_route_round_trip() {
        let route = Route::Search {
            query: "D&D 5e <b>".into(),
        };
        assert_eq!(Route::parse(&route.path()), Some(route));
    }
}
