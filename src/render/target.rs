//! The isolated rendering root a widget renders into.

use slotmap::SecondaryMap;

use super::slots::{SlotFragment, SlotSet};
use crate::dom::node::{NodeData, NodeId};
use crate::dom::tree::Dom;

/// A shadow root plus bookkeeping for the fragments it currently holds.
///
/// Every fragment handle given to a render ends up here: `placed` when it was
/// relocated into the view, `parked` when it could not be. [`Self::reclaim`]
/// returns all of them so the caller can resupply them to the next render.
#[derive(Debug)]
pub struct RenderTarget {
    root: NodeId,
    placed: Vec<SlotFragment>,
    parked: Vec<SlotFragment>,
    /// Authored data of nodes changed by interpolation, keyed by node.
    pristine: SecondaryMap<NodeId, NodeData>,
}

impl RenderTarget {
    /// Render into the shadow root of `host`, attaching it on first use.
    pub fn attach(dom: &mut Dom, host: NodeId) -> Self {
        Self {
            root: dom.attach_shadow(host),
            placed: Vec::new(),
            parked: Vec::new(),
            pristine: SecondaryMap::new(),
        }
    }

    /// The shadow root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Slot names currently filled by relocated fragments.
    pub fn placed_targets(&self) -> Vec<&str> {
        self.placed.iter().map(SlotFragment::target).collect()
    }

    /// Number of fragment handles held (placed or parked).
    pub fn held(&self) -> usize {
        self.placed.len() + self.parked.len()
    }

    /// Take every fragment back, detached and restored to its authored content.
    pub fn reclaim(&mut self, dom: &mut Dom) -> SlotSet {
        self.release_placed(dom);
        self.parked.drain(..).collect()
    }

    /// Drop all rendered content. Placed fragments are parked, not destroyed.
    pub(crate) fn clear(&mut self, dom: &mut Dom) {
        self.release_placed(dom);
        dom.clear_children(self.root);
    }

    pub(crate) fn place(&mut self, fragment: SlotFragment) {
        self.placed.push(fragment);
    }

    pub(crate) fn park(&mut self, fragments: SlotSet) {
        self.parked.extend(fragments);
    }

    pub(crate) fn pristine_mut(&mut self) -> &mut SecondaryMap<NodeId, NodeData> {
        &mut self.pristine
    }

    fn release_placed(&mut self, dom: &mut Dom) {
        for fragment in self.placed.drain(..) {
            dom.detach(fragment.node());
            self.parked.push(fragment);
        }
        for (id, data) in self.pristine.drain() {
            if let Some(node) = dom.get_mut(id) {
                *node = data;
            }
        }
    }
}
