//! Widget error taxonomy.

use crate::markup::MarkupError;

/// Everything that can go wrong between mount and render.
///
/// `Clone` so failures can travel inside [`crate::event::WidgetEvent::Failed`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WidgetError {
    /// The data source answered with a non-success status.
    #[error("could not retrieve source data: {code} {reason}")]
    SourceUnavailable { code: u16, reason: String },
    /// The response body is not a list of records.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    /// The request never produced a response.
    #[error("transport failure: {0}")]
    Transport(String),
    /// No template is registered under the configured identifier.
    #[error("template '{0}' not found")]
    TemplateMissing(String),
    /// Slot fragments target placeholders the template does not have.
    #[error("no slot placeholder for {}", targets.join(", "))]
    SlotNotFound { targets: Vec<String> },
    /// Host attributes are unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Host or template markup could not be parsed.
    #[error(transparent)]
    Markup(#[from] MarkupError),
}
