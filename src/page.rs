//! The hosting document: its node tree and its shared templates.

use crate::config::HOST_TAG;
use crate::dom::node::{NodeData, NodeId};
use crate::dom::tree::Dom;
use crate::markup::{parse_into, MarkupError};
use crate::template::{Template, TemplateRegistry};

/// A document plus the templates registered from it.
#[derive(Debug, Clone)]
pub struct Page {
    pub dom: Dom,
    pub templates: TemplateRegistry,
    document: NodeId,
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl Page {
    /// An empty document.
    pub fn new() -> Self {
        let mut dom = Dom::new();
        let document = dom.insert(NodeData::Fragment);
        Self {
            dom,
            templates: TemplateRegistry::new(),
            document,
        }
    }

    /// Parse a document and register every `<template id="...">` in it.
    pub fn from_markup(markup: &str) -> Result<Self, MarkupError> {
        let mut page = Self::new();
        page.append_markup(markup)?;
        Ok(page)
    }

    /// Append markup to the end of the document.
    ///
    /// Templates found in the new content are registered; a template whose id
    /// is already known replaces the previous one.
    pub fn append_markup(&mut self, markup: &str) -> Result<Vec<NodeId>, MarkupError> {
        let added = parse_into(&mut self.dom, self.document, markup)?;
        for &top in &added {
            let found = self.dom.query_all(top, |data| data.is_tag("template"));
            for element in found {
                if let Some(template) = Template::from_element(&self.dom, element) {
                    tracing::debug!(id = template.id(), "registered template");
                    self.templates.register(template);
                }
            }
        }
        Ok(added)
    }

    /// The document root.
    pub fn document(&self) -> NodeId {
        self.document
    }

    /// Every widget host element, in document order.
    ///
    /// Hosts inside `<template>` content are inert and not listed.
    pub fn hosts(&self) -> Vec<NodeId> {
        self.dom
            .all_by_tag(self.document, HOST_TAG)
            .into_iter()
            .filter(|&host| {
                !self
                    .dom
                    .ancestors(host)
                    .into_iter()
                    .any(|a| self.dom.get(a).is_some_and(|d| d.is_tag("template")))
            })
            .collect()
    }

    /// Serialized document.
    pub fn html(&self) -> String {
        self.dom.inner_html(self.document)
    }
}
