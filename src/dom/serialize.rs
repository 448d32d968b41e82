//! Markup serialization: inner/outer HTML and text content.

use super::node::{NodeData, NodeId};
use super::tree::Dom;

/// Elements that never have children or a closing tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Whether `tag` is a void element.
pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(tag))
}

fn escape_attr(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

impl Dom {
    /// Serialize the children of `id`.
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            self.write_node(child, &mut out);
        }
        out
    }

    /// Serialize `id` itself, including its own tag.
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    /// Concatenated text of every text node under `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        self.walk_depth_first(id)
            .into_iter()
            .filter_map(|n| match self.get(n) {
                Some(NodeData::Text(text)) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match self.get(id) {
            Some(NodeData::Text(text)) => out.push_str(text),
            Some(NodeData::Fragment) => out.push_str(&self.inner_html(id)),
            Some(NodeData::Element(el)) => {
                out.push('<');
                out.push_str(&el.tag);
                for attr in &el.attributes {
                    out.push(' ');
                    out.push_str(&attr.name);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(&attr.value));
                    out.push('"');
                }
                out.push('>');
                if is_void(&el.tag) {
                    return;
                }
                for &child in self.children(id) {
                    self.write_node(child, out);
                }
                out.push_str("</");
                out.push_str(&el.tag);
                out.push('>');
            }
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::node::ElementData;

    #[test]
    fn serializes_nested_elements() {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::Fragment);
        let p = dom.insert_child(root, ElementData::new("p").with_attr("class", "greeting").into());
        dom.insert_child(p, NodeData::text("Hi "));
        let b = dom.insert_child(p, NodeData::element("b"));
        dom.insert_child(b, NodeData::text("Ada"));
        dom.insert_child(root, NodeData::element("br"));

        assert_eq!(
            dom.inner_html(root),
            r#"<p class="greeting">Hi <b>Ada</b></p><br>"#
        );
        assert_eq!(dom.outer_html(b), "<b>Ada</b>");
        assert_eq!(dom.text_content(root), "Hi Ada");
    }

    #[test]
    fn escapes_attribute_values() {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::Fragment);
        dom.insert_child(root, ElementData::new("a").with_attr("title", r#"say "hi" & go"#).into());
        assert_eq!(
            dom.inner_html(root),
            r#"<a title="say &quot;hi&quot; &amp; go"></a>"#
        );
    }

    #[test]
    fn void_lookup_is_case_insensitive() {
        assert!(is_void("BR"));
        assert!(!is_void("slot"));
    }
}
