//! Widget events and the envelope that carries them.
//!
//! [`WidgetEvent`] is what a widget tells the outside world: a selection was
//! made, a record was rendered, or something failed. [`Envelope`] adds the
//! node that raised it.

use std::fmt;
use std::sync::Arc;

use crate::dom::node::NodeId;
use crate::error::WidgetError;
use crate::record::{Record, RecordId};

// ---------------------------------------------------------------------------
// WidgetEvent
// ---------------------------------------------------------------------------

/// Something that happened inside a widget.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetEvent {
    /// The user picked a record. Carries the record itself, not a copy.
    SelectionChanged(Arc<Record>),
    /// A record finished rendering.
    Rendered { id: Option<RecordId> },
    /// Mount or render failed.
    Failed(WidgetError),
}

impl WidgetEvent {
    /// Wire name, in the host page's event naming style.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SelectionChanged(_) => "data-item:selected",
            Self::Rendered { .. } => "letter:rendered",
            Self::Failed(_) => "letter:failed",
        }
    }

    /// The selected record, for selection events.
    pub fn record(&self) -> Option<&Arc<Record>> {
        match self {
            Self::SelectionChanged(record) => Some(record),
            _ => None,
        }
    }

    /// The error, for failure events.
    pub fn error(&self) -> Option<&WidgetError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Wraps an event with the node that raised it.
#[derive(Clone, PartialEq)]
pub struct Envelope {
    /// The event payload.
    pub event: WidgetEvent,
    /// The node that raised the event (selector or host element).
    pub sender: NodeId,
}

impl Envelope {
    pub fn new(event: WidgetEvent, sender: NodeId) -> Self {
        Self { event, sender }
    }
}

impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("event", &self.event.name())
            .field("sender", &self.sender)
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
