//! Mount-time configuration read from host attributes.

use crate::dom::node::ElementData;
use crate::error::WidgetError;
use crate::render::InterpolationFields;

/// Custom element name of a widget host.
pub const HOST_TAG: &str = "letter-box";
/// Page-wide identifier of the shared template.
pub const TEMPLATE_ID: &str = "letter-box-template";
/// Field shown as the selector label unless `label` says otherwise.
pub const DEFAULT_LABEL_FIELD: &str = "last_name";

/// Configuration for one widget instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetConfig {
    /// Location of the record list (`src`).
    pub src: String,
    /// Placeholders to substitute (`properties`).
    pub properties: InterpolationFields,
    /// Record field used for option labels (`label`).
    pub label_field: String,
    /// Identifier of the shared template (`template`).
    pub template_id: String,
}

impl WidgetConfig {
    /// Create a config with defaults for everything but the source.
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            properties: InterpolationFields::default(),
            label_field: DEFAULT_LABEL_FIELD.to_owned(),
            template_id: TEMPLATE_ID.to_owned(),
        }
    }

    /// Read `src`, `properties`, `label` and `template` from a host element.
    pub fn from_element(host: &ElementData) -> Result<Self, WidgetError> {
        let src = host
            .attr("src")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                WidgetError::InvalidConfig(format!("<{}> requires a non-empty src", host.tag))
            })?;

        let mut config = Self::new(src);
        if let Some(properties) = host.attr("properties") {
            config.properties = InterpolationFields::parse(properties);
        }
        if let Some(label) = host.attr("label").map(str::trim).filter(|s| !s.is_empty()) {
            config.label_field = label.to_owned();
        }
        if let Some(template) = host.attr("template").map(str::trim).filter(|s| !s.is_empty()) {
            config.template_id = template.to_owned();
        }
        Ok(config)
    }

    /// Set the interpolated fields (builder).
    pub fn with_properties(mut self, properties: InterpolationFields) -> Self {
        self.properties = properties;
        self
    }

    /// Set the label field (builder).
    pub fn with_label_field(mut self, field: impl Into<String>) -> Self {
        self.label_field = field.into();
        self
    }

    /// Set the template identifier (builder).
    pub fn with_template_id(mut self, id: impl Into<String>) -> Self {
        self.template_id = id.into();
        self
    }
}
