//! Markup engine: logos tokenizer and lenient parser producing DOM nodes.

pub mod parser;
pub mod tokenizer;

pub use parser::{parse_fragment, parse_into, MarkupError};
