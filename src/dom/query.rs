//! DOM queries: by id, tag, attribute, slot name; generic predicate matching.
//!
//! All queries are scoped to a subtree and return nodes in tree order. Like
//! `querySelector` on a shadow host, they never descend into shadow roots.

use super::node::{NodeData, NodeId};
use super::tree::Dom;

impl Dom {
    /// First node under `scope` (inclusive) matching `predicate`, in tree order.
    pub fn query_first(
        &self,
        scope: NodeId,
        predicate: impl Fn(&NodeData) -> bool,
    ) -> Option<NodeId> {
        self.walk_depth_first(scope)
            .into_iter()
            .find(|&id| self.get(id).is_some_and(&predicate))
    }

    /// All nodes under `scope` (inclusive) matching `predicate`, in tree order.
    pub fn query_all(&self, scope: NodeId, predicate: impl Fn(&NodeData) -> bool) -> Vec<NodeId> {
        self.walk_depth_first(scope)
            .into_iter()
            .filter(|&id| self.get(id).is_some_and(&predicate))
            .collect()
    }

    /// Find the first element whose `id` attribute matches.
    pub fn query_by_id(&self, scope: NodeId, id: &str) -> Option<NodeId> {
        self.query_first(scope, |data| data.attr("id") == Some(id))
    }

    /// Find the first element with the given tag.
    pub fn first_by_tag(&self, scope: NodeId, tag: &str) -> Option<NodeId> {
        self.query_first(scope, |data| data.is_tag(tag))
    }

    /// All elements with the given tag.
    pub fn all_by_tag(&self, scope: NodeId, tag: &str) -> Vec<NodeId> {
        self.query_all(scope, |data| data.is_tag(tag))
    }

    /// Descendants of `scope` (exclusive) that carry the named attribute.
    ///
    /// Equivalent of `scope.querySelectorAll('[name]')`.
    pub fn elements_with_attr(&self, scope: NodeId, name: &str) -> Vec<NodeId> {
        self.query_all(scope, |data| {
            data.as_element().is_some_and(|el| el.has_attr(name))
        })
        .into_iter()
        .filter(|&id| id != scope)
        .collect()
    }

    /// All `<slot name="...">` placeholders under `scope` for the given name.
    pub fn find_slots(&self, scope: NodeId, name: &str) -> Vec<NodeId> {
        self.query_all(scope, |data| data.is_tag("slot") && data.attr("name") == Some(name))
    }

    /// The first `<slot name="...">` placeholder under `scope`.
    pub fn find_slot(&self, scope: NodeId, name: &str) -> Option<NodeId> {
        self.query_first(scope, |data| data.is_tag("slot") && data.attr("name") == Some(name))
    }
}

#[cfg(test)]
mod tests {
    use crate::dom::node::{ElementData, NodeData, NodeId};
    use crate::dom::tree::Dom;

    /// Build a test tree for queries:
    /// ```text
    ///        root (fragment)
    ///       /            \
    ///   header         article #body
    ///   <slot           /        \
    ///    name=title>   p          slot name=footer
    ///                [slot=x]
    /// ```
    fn build_query_tree() -> (Dom, NodeId) {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::Fragment);
        let header = dom.insert_child(root, NodeData::element("header"));
        dom.insert_child(header, ElementData::new("slot").with_attr("name", "title").into());
        let article = dom.insert_child(root, ElementData::new("article").with_attr("id", "body").into());
        dom.insert_child(article, ElementData::new("p").with_attr("slot", "x").into());
        dom.insert_child(article, ElementData::new("slot").with_attr("name", "footer").into());
        (dom, root)
    }

    #[test]
    fn query_by_id_found() {
        let (dom, root) = build_query_tree();
        let id = dom.query_by_id(root, "body").unwrap();
        assert_eq!(dom.get(id).unwrap().tag(), Some("article"));
        assert!(dom.query_by_id(root, "missing").is_none());
    }

    #[test]
    fn find_slot_by_name() {
        let (dom, root) = build_query_tree();
        let footer = dom.find_slot(root, "footer").unwrap();
        assert_eq!(dom.get(footer).unwrap().attr("name"), Some("footer"));
        assert!(dom.find_slot(root, "signature").is_none());
        assert_eq!(dom.find_slots(root, "title").len(), 1);
    }

    #[test]
    fn find_slot_is_scoped() {
        let (dom, root) = build_query_tree();
        let header = dom.first_by_tag(root, "header").unwrap();
        assert!(dom.find_slot(header, "footer").is_none());
        assert!(dom.find_slot(header, "title").is_some());
    }

    #[test]
    fn elements_with_attr_excludes_scope() {
        let mut dom = Dom::new();
        let host = dom.insert(ElementData::new("div").with_attr("slot", "self").into());
        let child = dom.insert_child(host, ElementData::new("p").with_attr("slot", "a").into());
        assert_eq!(dom.elements_with_attr(host, "slot"), vec![child]);
    }

    #[test]
    fn query_all_in_tree_order() {
        let (dom, root) = build_query_tree();
        let slots = dom.all_by_tag(root, "slot");
        let names: Vec<_> = slots
            .iter()
            .map(|&id| dom.get(id).unwrap().attr("name").unwrap())
            .collect();
        assert_eq!(names, vec!["title", "footer"]);
    }

    #[test]
    fn query_on_empty_scope() {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::Fragment);
        assert!(dom.query_by_id(root, "x").is_none());
        assert!(dom.first_by_tag(root, "p").is_none());
        assert_eq!(dom.query_all(root, |_| true), vec![root]);
    }
}
