//! # letter-box
//!
//! A record-selector widget that binds a fetched list of records to a shared
//! letter template.
//!
//! A `<letter-box src="..." properties="...">` host fetches its records,
//! inserts a `<select>` with one option per record, and renders the page-wide
//! `letter-box-template` into an isolated content region: host children marked
//! `slot="name"` are relocated onto the template's `<slot name="name">`
//! placeholders and `{{field}}` tokens are replaced with the selected record's
//! values. Picking another option re-renders the letter from scratch.
//!
//! ## Core Systems
//!
//! - **[`dom`]**: Slotmap-backed node arena with shadow roots, queries, serialization
//! - **[`markup`]**: Logos-based lenient markup parser
//! - **[`template`]**: Immutable shared templates and the page-wide registry
//! - **[`page`]**: The hosting document
//! - **[`record`]**: Schema-free records and normalized identifiers
//! - **[`source`]**: Async data sources (`reqwest` over HTTP)
//! - **[`selector`]**: Record selector and its selection channel
//! - **[`render`]**: Clone, relocate slots, interpolate
//! - **[`event`]**: Widget events and host listeners
//! - **[`widget`]**: `LetterWidget` and its lifecycle states
//! - **[`testing`]**: In-memory source and a page driver for tests

// Document model
pub mod dom;
pub mod markup;
pub mod page;
pub mod template;

// Data
pub mod config;
pub mod record;
pub mod source;

// Rendering and selection
pub mod render;
pub mod selector;

// Widget
pub mod error;
pub mod event;
pub mod widget;

// Test support
pub mod testing;

