//! Slot fragments: host-authored content relocated into rendered templates.
//!
//! A [`SlotFragment`] is a handle to a node that lives exactly once in the
//! DOM. Handles are not `Clone`; rendering consumes a [`SlotSet`] and moves
//! each node into place, and the [`super::RenderTarget`] hands the handles
//! back when they are reclaimed.

use crate::dom::node::NodeId;
use crate::dom::tree::Dom;

/// Attribute naming the slot a fragment is destined for.
pub const SLOT_ATTR: &str = "slot";

/// A relocatable fragment and the slot name it targets.
#[derive(Debug, PartialEq, Eq)]
pub struct SlotFragment {
    target: String,
    node: NodeId,
}

impl SlotFragment {
    pub fn new(target: impl Into<String>, node: NodeId) -> Self {
        Self {
            target: target.into(),
            node,
        }
    }

    /// Build a handle from an element's `slot` attribute.
    pub fn from_node(dom: &Dom, node: NodeId) -> Option<Self> {
        let target = dom.get(node)?.attr(SLOT_ATTR)?;
        Some(Self::new(target, node))
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn node(&self) -> NodeId {
        self.node
    }
}

/// Where a fragment sat before it was first moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotOrigin {
    pub node: NodeId,
    pub parent: NodeId,
    pub index: usize,
}

impl SlotOrigin {
    /// Put `node` back at its authored position.
    ///
    /// Returns `false` if it is still attached somewhere or its old parent
    /// is gone. Restoring siblings in ascending `index` order rebuilds the
    /// authored order.
    pub fn restore(&self, dom: &mut Dom) -> bool {
        if dom.parent(self.node).is_some() || !dom.contains(self.parent) {
            return false;
        }
        dom.reparent_at(self.node, self.parent, self.index);
        true
    }
}

/// The fragments supplied to one render call, in order.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SlotSet {
    fragments: Vec<SlotFragment>,
}

impl SlotSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every descendant of `host` carrying a `slot` attribute, in tree order.
    pub fn collect(dom: &Dom, host: NodeId) -> Self {
        dom.elements_with_attr(host, SLOT_ATTR)
            .into_iter()
            .filter_map(|node| SlotFragment::from_node(dom, node))
            .collect()
    }

    /// Add a fragment. A node already in the set is not added twice.
    pub fn push(&mut self, fragment: SlotFragment) {
        if !self.fragments.iter().any(|f| f.node == fragment.node) {
            self.fragments.push(fragment);
        }
    }

    /// Move every fragment of `other` into this set.
    pub fn append(&mut self, other: SlotSet) {
        for fragment in other {
            self.push(fragment);
        }
    }

    /// Current position of every attached fragment, sorted by child index.
    pub fn origins(&self, dom: &Dom) -> Vec<SlotOrigin> {
        let mut origins: Vec<SlotOrigin> = self
            .fragments
            .iter()
            .filter_map(|f| {
                let parent = dom.parent(f.node)?;
                let index = dom.children(parent).iter().position(|&c| c == f.node)?;
                Some(SlotOrigin {
                    node: f.node,
                    parent,
                    index,
                })
            })
            .collect();
        origins.sort_by_key(|o| o.index);
        origins
    }

    pub fn targets(&self) -> Vec<&str> {
        self.fragments.iter().map(SlotFragment::target).collect()
    }

    pub fn nodes(&self) -> Vec<NodeId> {
        self.fragments.iter().map(SlotFragment::node).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SlotFragment> {
        self.fragments.iter()
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

impl FromIterator<SlotFragment> for SlotSet {
    fn from_iter<I: IntoIterator<Item = SlotFragment>>(iter: I) -> Self {
        let mut set = Self::new();
        for fragment in iter {
            set.push(fragment);
        }
        set
    }
}

impl IntoIterator for SlotSet {
    type Item = SlotFragment;
    type IntoIter = std::vec::IntoIter<SlotFragment>;

    fn into_iter(self) -> Self::IntoIter {
        self.fragments.into_iter()
    }
}
