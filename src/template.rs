//! Shared templates and the page-wide registry.
//!
//! A [`Template`] is parsed once and never mutated afterwards, so every widget
//! on a page can hold the same `Arc<Template>` and clone content out of it
//! without any locking.

use std::collections::HashMap;
use std::sync::Arc;

use crate::dom::node::{NodeData, NodeId};
use crate::dom::tree::Dom;
use crate::error::WidgetError;
use crate::markup::{parse_into, MarkupError};

/// An immutable, named content tree.
#[derive(Debug, Clone)]
pub struct Template {
    id: String,
    content: Dom,
    root: NodeId,
}

impl Template {
    /// Parse template content from markup.
    pub fn parse(id: impl Into<String>, markup: &str) -> Result<Self, MarkupError> {
        let mut content = Dom::new();
        let root = content.insert(NodeData::Fragment);
        parse_into(&mut content, root, markup)?;
        Ok(Self {
            id: id.into(),
            content,
            root,
        })
    }

    /// Copy the children of a `<template id="...">` element out of a document.
    ///
    /// Returns `None` if `element` is not a template element with an id.
    pub fn from_element(dom: &Dom, element: NodeId) -> Option<Self> {
        let data = dom.get(element)?;
        if !data.is_tag("template") {
            return None;
        }
        let id = data.attr("id")?.to_owned();
        let mut content = Dom::new();
        let root = content.insert(NodeData::Fragment);
        for &child in dom.children(element) {
            content.import_subtree(dom, child, root);
        }
        Some(Self { id, content, root })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Serialized template content.
    pub fn inner_html(&self) -> String {
        self.content.inner_html(self.root)
    }

    /// Deep-copy the content under `parent`. Returns the new top-level nodes.
    pub fn instantiate(&self, dom: &mut Dom, parent: NodeId) -> Vec<NodeId> {
        self.content
            .children(self.root)
            .iter()
            .filter_map(|&child| dom.import_subtree(&self.content, child, parent))
            .collect()
    }
}

/// Page-wide template lookup by identifier.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: HashMap<String, Arc<Template>>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template, replacing any previous one with the same id.
    pub fn register(&mut self, template: Template) -> Arc<Template> {
        let shared = Arc::new(template);
        self.templates
            .insert(shared.id().to_owned(), Arc::clone(&shared));
        shared
    }

    pub fn get(&self, id: &str) -> Option<Arc<Template>> {
        self.templates.get(id).cloned()
    }

    /// Look up a template that must exist.
    pub fn require(&self, id: &str) -> Result<Arc<Template>, WidgetError> {
        self.get(id)
            .ok_or_else(|| WidgetError::TemplateMissing(id.to_owned()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.templates.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
