//! Event system: widget events, envelopes, host listeners.

pub mod listeners;
pub mod message;

pub use listeners::{ListenerId, Listeners};
pub use message::{Envelope, WidgetEvent};
