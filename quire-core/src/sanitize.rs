//! Allow-list filter for HTML trees embedded in content.
//!
//! The filter never mutates its input: it walks the tree and builds a new one
//! from the nodes that survive. The allow-list is plain data, so callers can
//! load it from configuration or extend [`AllowList::default_content`].

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Attribute list key that applies to every allowed element.
pub const GLOBAL_ATTRIBUTES: &str = "*";

/// Minimal HTML tree, as produced by whatever parser the renderer uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HtmlNode {
    Element {
        name: String,
        #[serde(default)]
        attrs: Vec<(String, String)>,
        #[serde(default)]
        children: Vec<HtmlNode>,
    },
    Text(String),
    Comment(String),
}

impl HtmlNode {
    pub fn element(name: &str, attrs: &[(&str, &str)], children: Vec<HtmlNode>) -> Self {
        HtmlNode::Element {
            name: name.to_string(),
            attrs: attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            children,
        }
    }

    pub fn text(text: &str) -> Self {
        HtmlNode::Text(text.to_string())
    }
}

/// Tag names and per-tag attribute names that survive sanitization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowList {
    #[serde(rename = "tagNames", default)]
    pub tags: BTreeSet<String>,
    /// Tag name to allowed attributes; `"*"` lists global attributes
    #[serde(default)]
    pub attributes: BTreeMap<String, BTreeSet<String>>,
}

impl AllowList {
    pub fn new<'a>(tags: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            tags: tags.into_iter().map(str::to_string).collect(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn allow_attributes<'a>(
        mut self,
        tag: &str,
        attributes: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        self.attributes
            .entry(tag.to_string())
            .or_default()
            .extend(attributes.into_iter().map(str::to_string));
        self
    }

    /// Allow-list for rendered blog prose.
    pub fn default_content() -> Self {
        Self::new([
            "a", "abbr", "b", "blockquote", "br", "code", "dd", "del", "details", "div", "dl",
            "dt", "em", "figcaption", "figure", "h1", "h2", "h3", "h4", "h5", "h6", "hr", "i",
            "img", "kbd", "li", "mark", "ol", "p", "pre", "s", "span", "strong", "sub",
            "summary", "sup", "table", "tbody", "td", "th", "thead", "tr", "ul",
        ])
        .allow_attributes(GLOBAL_ATTRIBUTES, ["class", "id", "title"])
        .allow_attributes("a", ["href", "rel", "target"])
        .allow_attributes("img", ["src", "alt", "width", "height", "loading"])
        .allow_attributes("code", ["data-language"])
        .allow_attributes("td", ["align", "colspan", "rowspan"])
        .allow_attributes("th", ["align", "colspan", "rowspan"])
    }

    pub fn allows_tag(&self, tag: &str) -> bool {
        self.tags.contains(&tag.to_ascii_lowercase())
    }

    /// Event handlers (`on*`) are refused regardless of the lists.
    pub fn allows_attribute(&self, tag: &str, attribute: &str) -> bool {
        let tag = tag.to_ascii_lowercase();
        let attribute = attribute.to_ascii_lowercase();
        if attribute.starts_with("on") {
            return false;
        }
        [tag.as_str(), GLOBAL_ATTRIBUTES].iter().any(|key| {
            self.attributes
                .get(*key)
                .is_some_and(|attrs| attrs.contains(&attribute))
        })
    }
}

/// Filter `nodes` through `allow`, returning a new tree.
///
/// Disallowed elements are dropped together with their subtree, disallowed
/// attributes are stripped from kept elements and comments are removed.
/// Surviving nodes keep their document order.
pub fn sanitize(nodes: &[HtmlNode], allow: &AllowList) -> Vec<HtmlNode> {
    nodes
        .iter()
        .filter_map(|node| sanitize_node(node, allow))
        .collect()
}

fn sanitize_node(node: &HtmlNode, allow: &AllowList) -> Option<HtmlNode> {
    match node {
        HtmlNode::Text(text) => Some(HtmlNode::Text(text.clone())),
        HtmlNode::Comment(_) => None,
        HtmlNode::Element {
            name,
            attrs,
            children,
        } => {
            if !allow.allows_tag(name) {
                return None;
            }
            Some(HtmlNode::Element {
                name: name.to_ascii_lowercase(),
                attrs: attrs
                    .iter()
                    .filter(|(key, _)| allow.allows_attribute(name, key))
                    .cloned()
                    .collect(),
                children: sanitize(children, allow),
            })
        }
    }
}

const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "meta", "link", "source", "wbr"];

/// Serialize a tree to HTML, escaping text and attribute values.
pub fn render_html(nodes: &[HtmlNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        render_node(node, &mut out);
    }
    out
}

fn render_node(node: &HtmlNode, out: &mut String) {
    match node {
        HtmlNode::Text(text) => out.push_str(&html_escape::encode_text(text)),
        HtmlNode::Comment(text) => {
            out.push_str("<!--");
            out.push_str(&text.replace("--", ""));
            out.push_str("-->");
        }
        HtmlNode::Element {
            name,
            attrs,
            children,
        } => {
            out.push('<');
            out.push_str(name);
            for (key, value) in attrs {
                out.push(' ');
                out.push_str(key);
                out.push_str("=\"");
                out.push_str(&html_escape::encode_double_quoted_attribute(value));
                out.push('"');
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&name.as_str()) {
                return;
            }
            for child in children {
                render_node(child, out);
            }
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_handlers_are_stripped() {
        let tree = vec![HtmlNode::element(
            "img",
            &[("src", "x.png"), ("onerror", "alert(1)"), ("OnLoad", "x()")],
            vec![],
        )];
        let clean = sanitize(&tree, &AllowList::default_content());
        assert_eq!(render_html(&clean), "<img src=\"x.png\">");
    }

    #[test]
    fn test_disallowed_elements_drop_subtree() {
        let tree = vec![
            HtmlNode::element("p", &[], vec![HtmlNode::text("before")]),
            HtmlNode::element(
                "script",
                &[],
                vec![HtmlNode::text("alert(1)")],
            ),
            HtmlNode::element(
                "iframe",
                &[("src", "https://evil")],
                vec![HtmlNode::element("p", &[], vec![HtmlNode::text("nested")])],
            ),
            HtmlNode::element("p", &[], vec![HtmlNode::text("after")]),
        ];
        let clean = sanitize(&tree, &AllowList::default_content());
        assert_eq!(render_html(&clean), "<p>before</p><p>after</p>");
    }

    #[test]
    fn test_recursion_and_order() {
        let tree = vec![HtmlNode::element(
            "div",
            &[("class", "note"), ("style", "color:red")],
            vec![
                HtmlNode::text("a"),
                HtmlNode::Comment("hidden".into()),
                HtmlNode::element("a", &[("href", "/x/"), ("onclick", "y()")], vec![HtmlNode::text("b")]),
                HtmlNode::element("blink", &[], vec![HtmlNode::text("c")]),
                HtmlNode::text("d"),
            ],
        )];
        let clean = sanitize(&tree, &AllowList::default_content());
        assert_eq!(
            render_html(&clean),
            "<div class=\"note\">a<a href=\"/x/\">b</a>d</div>"
        );
    }

    #[test]
    fn test_input_is_untouched() {
        let tree = vec![HtmlNode::element("script", &[], vec![])];
        let before = tree.clone();
        let _ = sanitize(&tree, &AllowList::default_content());
        assert_eq!(tree, before);
    }

    #[test]
    fn test_custom_allow_list_from_json() {
        let allow: AllowList = serde_json::from_str(
            r#"{"tagNames": ["p", "span"], "attributes": {"span": ["data-x"]}}"#,
        )
        .unwrap();
        let tree = vec![HtmlNode::element(
            "P",
            &[("class", "c")],
            vec![HtmlNode::element("span", &[("data-x", "1")], vec![])],
        )];
        let clean = sanitize(&tree, &allow);
        assert_eq!(render_html(&clean), "<p><span data-x=\"1\"></span></p>");
    }

    #[test]
    fn test_text_is_escaped_on_render() {
        let html = render_html(&[HtmlNode::text("<script>")]);
        assert_eq!(html, "&lt;script&gt;");
    }
}
