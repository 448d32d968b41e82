//! Widget lifecycle states and the transitions allowed between them.
//!
//! ```text
//! Unmounted -> Loading -> Ready <-> Rendering
//!                 |                    |
//!                 +------> Error <-----+
//! ```
//!
//! Every state may return to `Unmounted`. A widget in `Error` after a failed
//! render still has a wired selector, so `Error -> Rendering` is allowed too.

use std::fmt;

/// Where a widget is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum WidgetState {
    /// Not attached to data. Initial and terminal state.
    #[default]
    Unmounted,
    /// Waiting for the record fetch.
    Loading,
    /// Selector built; the current record (if any) is on screen.
    Ready,
    /// A render is in progress.
    Rendering,
    /// The last fetch or render failed.
    Error,
}

impl WidgetState {
    /// Whether moving from `self` to `to` is a legal transition.
    pub fn can_transition(self, to: WidgetState) -> bool {
        use WidgetState::*;
        matches!(
            (self, to),
            (_, Unmounted)
                | (Unmounted, Loading)
                | (Loading, Ready)
                | (Loading, Error)
                | (Ready, Rendering)
                | (Rendering, Ready)
                | (Rendering, Error)
                | (Error, Rendering)
        )
    }

    /// Anything but `Unmounted`.
    pub fn is_mounted(self) -> bool {
        self != WidgetState::Unmounted
    }
}

impl fmt::Display for WidgetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unmounted => "unmounted",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Rendering => "rendering",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}
