//! `{{field}}` placeholder substitution.

use slotmap::SecondaryMap;

use crate::dom::node::{NodeData, NodeId};
use crate::dom::tree::Dom;
use crate::record::Record;

/// Ordered set of field names whose placeholders get substituted.
///
/// Fields not in the set are left as literal `{{...}}` text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterpolationFields {
    fields: Vec<String>,
}

impl InterpolationFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a comma-separated list (`"last_name, first_name"`).
    ///
    /// Names are trimmed; empty names and repeats are dropped.
    pub fn parse(list: &str) -> Self {
        list.split(',').collect()
    }

    /// Append a field. Returns `false` if it was blank or already present.
    pub fn push(&mut self, field: impl Into<String>) -> bool {
        let field = field.into();
        let field = field.trim();
        if field.is_empty() || self.contains(field) {
            return false;
        }
        self.fields.push(field.to_owned());
        true
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for InterpolationFields {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut fields = Self::new();
        for field in iter {
            fields.push(field);
        }
        fields
    }
}

/// The literal placeholder for a field: `{{field}}`.
pub fn placeholder(field: &str) -> String {
    format!("{{{{{field}}}}}")
}

/// Replace placeholders in every text node and attribute value under `root`.
///
/// Fields are applied one after another in configured order. Before a node is
/// changed for the first time its authored data is saved in `pristine`.
pub(crate) fn interpolate(
    dom: &mut Dom,
    root: NodeId,
    fields: &InterpolationFields,
    record: &Record,
    pristine: &mut SecondaryMap<NodeId, NodeData>,
) {
    if fields.is_empty() {
        return;
    }
    let nodes = dom.walk_depth_first(root);
    for field in fields.iter() {
        let token = placeholder(field);
        let value = record.text(field);
        for &id in &nodes {
            let Some(data) = dom.get_mut(id) else {
                continue;
            };
            if !mentions(data, &token) {
                continue;
            }
            if !pristine.contains_key(id) {
                pristine.insert(id, data.clone());
            }
            substitute(data, &token, &value);
        }
    }
}

fn mentions(data: &NodeData, token: &str) -> bool {
    match data {
        NodeData::Text(text) => text.contains(token),
        NodeData::Element(el) => el.attributes.iter().any(|a| a.value.contains(token)),
        NodeData::Fragment => false,
    }
}

fn substitute(data: &mut NodeData, token: &str, value: &str) {
    match data {
        NodeData::Text(text) => *text = text.replace(token, value),
        NodeData::Element(el) => {
            for attr in &mut el.attributes {
                if attr.value.contains(token) {
                    attr.value = attr.value.replace(token, value);
                }
            }
        }
        NodeData::Fragment => {}
    }
}
