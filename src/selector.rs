//! Record selector: a `<select>` projected from the record collection.
//!
//! [`SelectorBuilder::build`] inserts one `<option>` per record and returns the
//! [`Selector`] together with the receiving end of its selection channel.
//! When the selection changes, the change handler resolves the chosen value
//! back to its record (first normalized-id match) and sends
//! [`WidgetEvent::SelectionChanged`] down the channel.

use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::dom::node::{ElementData, NodeData, NodeId};
use crate::dom::tree::Dom;
use crate::event::message::{Envelope, WidgetEvent};
use crate::record::{coerce_text, Record, RecordCollection, ID_FIELD};

/// `name` attribute of the generated `<select>`.
pub const SELECT_NAME: &str = "letter-box-data-item";

// ---------------------------------------------------------------------------
// SelectableList
// ---------------------------------------------------------------------------

/// One selectable entry: the record id as value, a display field as label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// Options derived from a record collection, one per record, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectableList {
    options: Vec<SelectOption>,
}

impl SelectableList {
    /// Project `records` into options labelled by `display_field`.
    ///
    /// A record without the display field gets a blank label.
    pub fn project(records: &RecordCollection, display_field: &str) -> Self {
        let options = records
            .iter()
            .map(|record| SelectOption {
                value: record.get(ID_FIELD).map(coerce_text).unwrap_or_default(),
                label: record.get(display_field).map(coerce_text).unwrap_or_default(),
            })
            .collect();
        Self { options }
    }

    pub fn get(&self, index: usize) -> Option<&SelectOption> {
        self.options.get(index)
    }

    /// Index of the first option with exactly this value.
    pub fn position(&self, value: &str) -> Option<usize> {
        self.options.iter().position(|o| o.value == value)
    }

    pub fn labels(&self) -> Vec<&str> {
        self.options.iter().map(|o| o.label.as_str()).collect()
    }

    pub fn values(&self) -> Vec<&str> {
        self.options.iter().map(|o| o.value.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectOption> {
        self.options.iter()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Selection channel
// ---------------------------------------------------------------------------

/// Receiving end of a selector's selection-changed signal.
#[derive(Debug)]
pub struct SelectionChanges {
    rx: UnboundedReceiver<Envelope>,
}

impl SelectionChanges {
    /// Next pending selection, if any.
    pub fn try_next(&mut self) -> Option<Envelope> {
        self.rx.try_recv().ok()
    }

    /// All pending selections, in emission order.
    pub fn drain(&mut self) -> Vec<Envelope> {
        std::iter::from_fn(|| self.try_next()).collect()
    }
}

// ---------------------------------------------------------------------------
// Selector
// ---------------------------------------------------------------------------

/// A live `<select>` element bound to a record collection.
#[derive(Debug)]
pub struct Selector {
    node: NodeId,
    records: Arc<RecordCollection>,
    list: SelectableList,
    selected: Option<usize>,
    handler: Option<UnboundedSender<Envelope>>,
}

/// Builds selectors.
pub struct SelectorBuilder;

impl SelectorBuilder {
    /// Insert a `<select>` as the first child of `host` and wire its change handler.
    pub fn build(
        dom: &mut Dom,
        host: NodeId,
        records: Arc<RecordCollection>,
        display_field: &str,
    ) -> (Selector, SelectionChanges) {
        let list = SelectableList::project(&records, display_field);
        let node = dom.prepend_child(
            host,
            ElementData::new("select").with_attr("name", SELECT_NAME).into(),
        );
        for option in list.iter() {
            let el = dom.insert_child(
                node,
                ElementData::new("option")
                    .with_attr("value", option.value.as_str())
                    .into(),
            );
            dom.insert_child(el, NodeData::text(option.label.as_str()));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let selected = if list.is_empty() { None } else { Some(0) };
        let selector = Selector {
            node,
            records,
            list,
            selected,
            handler: Some(tx),
        };
        (selector, SelectionChanges { rx })
    }
}

impl Selector {
    /// The `<select>` element.
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn list(&self) -> &SelectableList {
        &self.list
    }

    pub fn records(&self) -> &Arc<RecordCollection> {
        &self.records
    }

    /// Current value, like `select.value`.
    pub fn value(&self) -> Option<&str> {
        self.selected
            .and_then(|i| self.list.get(i))
            .map(|o| o.value.as_str())
    }

    /// Whether the change handler is still attached.
    pub fn is_wired(&self) -> bool {
        self.handler.is_some()
    }

    /// Simulate the user picking the option with this exact value.
    ///
    /// Returns the record that was announced, or `None` when no option has
    /// the value, the value resolves to no record, or the handler is detached.
    pub fn select_value(&mut self, dom: &mut Dom, value: &str) -> Option<Arc<Record>> {
        let index = self.list.position(value)?;
        self.select_index(dom, index)
    }

    /// Simulate the user picking the option at `index`.
    pub fn select_index(&mut self, dom: &mut Dom, index: usize) -> Option<Arc<Record>> {
        if index >= self.list.len() {
            return None;
        }
        self.selected = Some(index);
        self.mark_selected(dom, index);
        self.on_change()
    }

    /// Remove the change handler. Later changes announce nothing.
    pub fn detach_handler(&mut self) -> bool {
        self.handler.take().is_some()
    }

    fn mark_selected(&self, dom: &mut Dom, index: usize) {
        let options = dom.children(self.node).to_vec();
        for (i, option) in options.into_iter().enumerate() {
            if let Some(el) = dom.get_mut(option).and_then(NodeData::as_element_mut) {
                if i == index {
                    el.set_attr("selected", "");
                } else {
                    el.remove_attr("selected");
                }
            }
        }
    }

    /// The change handler: resolve the current value and announce the record.
    fn on_change(&self) -> Option<Arc<Record>> {
        let tx = self.handler.as_ref()?;
        let value = self.value()?;
        let Some(record) = self.records.find_by_value(value) else {
            tracing::warn!(value, "selected value matches no record");
            return None;
        };
        let record = Arc::clone(record);
        let envelope = Envelope::new(WidgetEvent::SelectionChanged(Arc::clone(&record)), self.node);
        // A dropped receiver means the owner is gone; nothing left to notify.
        let _ = tx.send(envelope);
        Some(record)
    }
}
