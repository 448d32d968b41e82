//! The letter-box widget and its lifecycle states.

pub mod letter;
pub mod state;

pub use letter::{FetchedRecords, LetterWidget, MountOutcome, MountTicket, PendingMount, CONTENT_TAG};
pub use state::WidgetState;
