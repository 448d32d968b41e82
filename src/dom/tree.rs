//! Tree operations: insert, remove, detach, replace, import, walk.

use slotmap::{SecondaryMap, SlotMap};

use super::node::{NodeData, NodeId};

const NO_CHILDREN: &[NodeId] = &[];

/// Node arena for a document and everything rendered into it.
///
/// Node data lives in one `SlotMap`; links live in secondary maps keyed by
/// the same ids, so a handle stays valid until its node is removed and a
/// stale handle simply finds nothing. Shadow roots are parentless
/// [`NodeData::Fragment`] nodes linked to their host through `shadow`, which
/// keeps ordinary walks and queries on the light side of the host.
#[derive(Debug, Clone, Default)]
pub struct Dom {
    pub(crate) nodes: SlotMap<NodeId, NodeData>,
    children: SecondaryMap<NodeId, Vec<NodeId>>,
    parent: SecondaryMap<NodeId, NodeId>,
    shadow: SecondaryMap<NodeId, NodeId>,
}

impl Dom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node that is not attached anywhere yet.
    pub fn insert(&mut self, data: NodeData) -> NodeId {
        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        id
    }

    /// Add a node as the last child of `parent`.
    pub fn insert_child(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        debug_assert!(self.contains(parent), "insert_child: unknown parent");
        let id = self.insert(data);
        self.attach(id, parent, None);
        id
    }

    /// Add a node as the first child of `parent`.
    pub fn prepend_child(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        debug_assert!(self.contains(parent), "prepend_child: unknown parent");
        let id = self.insert(data);
        self.attach(id, parent, Some(0));
        id
    }

    /// Link a parentless node under `parent` at `index`, or last when `None`.
    fn attach(&mut self, node: NodeId, parent: NodeId, index: Option<usize>) {
        self.parent.insert(node, parent);
        if let Some(siblings) = self.children.get_mut(parent) {
            match index {
                Some(i) if i <= siblings.len() => siblings.insert(i, node),
                _ => siblings.push(node),
            }
        }
    }

    /// Delete `id`, its descendants, and any shadow tree hanging off them.
    ///
    /// Returns the data of `id` itself.
    pub fn remove(&mut self, id: NodeId) -> Option<NodeData> {
        if !self.contains(id) {
            return None;
        }
        self.detach(id);

        let mut doomed = vec![id];
        let mut removed = None;
        while let Some(current) = doomed.pop() {
            doomed.extend(self.children.remove(current).unwrap_or_default());
            doomed.extend(self.shadow.remove(current));
            self.parent.remove(current);
            let data = self.nodes.remove(current);
            if current == id {
                removed = data;
            }
        }
        removed
    }

    /// Unlink `node` from its parent. The subtree stays in the arena.
    ///
    /// Returns the former parent.
    pub fn detach(&mut self, node: NodeId) -> Option<NodeId> {
        let from = self.parent.remove(node)?;
        if let Some(siblings) = self.children.get_mut(from) {
            siblings.retain(|&sibling| sibling != node);
        }
        Some(from)
    }

    /// Move `node` (with its subtree) to the end of `new_parent`'s children.
    pub fn reparent(&mut self, node: NodeId, new_parent: NodeId) {
        debug_assert!(self.contains(node), "reparent: unknown node");
        debug_assert!(self.contains(new_parent), "reparent: unknown parent");
        self.detach(node);
        self.attach(node, new_parent, None);
    }

    /// Move `node` under `new_parent` at child position `index`.
    ///
    /// An index past the end appends.
    pub fn reparent_at(&mut self, node: NodeId, new_parent: NodeId, index: usize) {
        debug_assert!(self.contains(node), "reparent_at: unknown node");
        debug_assert!(self.contains(new_parent), "reparent_at: unknown parent");
        self.detach(node);
        self.attach(node, new_parent, Some(index));
    }

    /// Put `replacement` where `old` is, then remove `old` and its subtree.
    ///
    /// `replacement` is detached from wherever it lived before (a move, not a
    /// copy). Returns `false` and changes nothing if either node is missing,
    /// `old` has no parent, or `replacement` is `old` itself.
    pub fn replace_with(&mut self, old: NodeId, replacement: NodeId) -> bool {
        if old == replacement || !self.contains(old) || !self.contains(replacement) {
            return false;
        }
        let Some(parent) = self.parent(old) else {
            return false;
        };
        self.detach(replacement);
        let index = self.children(parent).iter().position(|&c| c == old);
        self.attach(replacement, parent, index);
        self.remove(old);
        true
    }

    /// Remove every child of `id` (and their subtrees).
    pub fn clear_children(&mut self, id: NodeId) {
        for child in self.children(id).to_vec() {
            self.remove(child);
        }
    }

    /// Deep-copy `src` (a node of `other`) as the last child of `parent`.
    ///
    /// Returns the id of the copy. The source arena is left untouched.
    pub fn import_subtree(&mut self, other: &Dom, src: NodeId, parent: NodeId) -> Option<NodeId> {
        let data = other.get(src)?.clone();
        let copy = self.insert_child(parent, data);
        let mut pending: Vec<(NodeId, NodeId)> = vec![(src, copy)];
        while let Some((from, to)) = pending.pop() {
            for &child in other.children(from) {
                if let Some(data) = other.get(child) {
                    let cloned = self.insert_child(to, data.clone());
                    pending.push((child, cloned));
                }
            }
        }
        Some(copy)
    }

    /// Return the shadow root of `host`, if one is attached.
    pub fn shadow_root(&self, host: NodeId) -> Option<NodeId> {
        self.shadow.get(host).copied()
    }

    /// Return the shadow root of `host`, attaching a new one on first use.
    pub fn attach_shadow(&mut self, host: NodeId) -> NodeId {
        if let Some(existing) = self.shadow_root(host) {
            return existing;
        }
        let shadow_root = self.insert(NodeData::Fragment);
        self.shadow.insert(host, shadow_root);
        shadow_root
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parent.get(id).copied()
    }

    /// Children in order; empty for leaves and unknown ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children.get(id).map_or(NO_CHILDREN, Vec::as_slice)
    }

    /// Parent, grandparent, and so on up to the top of the tree.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        std::iter::successors(self.parent(id), |&p| self.parent(p)).collect()
    }

    /// Whether `node` is `ancestor` or lives somewhere beneath it.
    pub fn is_inclusive_descendant(&self, node: NodeId, ancestor: NodeId) -> bool {
        node == ancestor || self.ancestors(node).contains(&ancestor)
    }

    pub fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(id)
    }

    /// Live node count, shadow trees included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `id` still names a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// `start` and its descendants in document (pre-)order.
    ///
    /// Shadow trees are not entered.
    pub fn walk_depth_first(&self, start: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if !self.contains(current) {
                continue;
            }
            order.push(current);
            stack.extend(self.children(current).iter().rev());
        }
        order
    }
}
