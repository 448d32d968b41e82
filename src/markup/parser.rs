//! Lenient markup parser.
//!
//! Builds DOM nodes from markup text using the two-mode lexer from
//! [`crate::markup::tokenizer`]. Recovery follows HTML habits: unclosed
//! elements close at end of input, unmatched end tags are ignored, void
//! elements never take children, and comments are dropped.

use logos::{Lexer, Logos};

use crate::dom::node::{ElementData, NodeData, NodeId};
use crate::dom::serialize::is_void;
use crate::dom::tree::Dom;
use crate::markup::tokenizer::{close_tag_name, unquote, ContentToken, TagToken};

/// Errors from markup parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarkupError {
    #[error("unexpected token at byte {position}: {message}")]
    UnexpectedToken { position: usize, message: String },
    #[error("unexpected end of input: {0}")]
    UnexpectedEof(String),
}

/// A fully read start tag.
struct StartTag {
    element: ElementData,
    self_closing: bool,
}

/// Parse `input` and append the resulting nodes under `parent`.
///
/// Returns the ids of the nodes created directly under `parent`, in order.
pub fn parse_into(dom: &mut Dom, parent: NodeId, input: &str) -> Result<Vec<NodeId>, MarkupError> {
    let mut lex = ContentToken::lexer(input);
    let mut stack = vec![parent];
    let mut top_level = Vec::new();

    while let Some(token) = lex.next() {
        let current = stack.last().copied().unwrap_or(parent);
        match token {
            Ok(ContentToken::Comment) => {}
            Ok(ContentToken::Text | ContentToken::LessThan) | Err(()) => {
                if let Some(id) = append_text(dom, current, lex.slice()) {
                    if current == parent {
                        top_level.push(id);
                    }
                }
            }
            Ok(ContentToken::TagClose) => {
                let name = close_tag_name(lex.slice());
                let open = stack
                    .iter()
                    .skip(1)
                    .rposition(|&id| dom.get(id).is_some_and(|d| d.is_tag(&name)));
                // `rposition` on the skipped iterator is relative to index 1.
                if let Some(pos) = open {
                    stack.truncate(pos + 1);
                }
            }
            Ok(ContentToken::TagOpen) => {
                let tag = lex.slice()[1..].to_ascii_lowercase();
                let (rest, start) = read_start_tag(lex, &tag)?;
                lex = rest;
                let id = dom.insert_child(current, start.element.into());
                if current == parent {
                    top_level.push(id);
                }
                if !start.self_closing && !is_void(&tag) {
                    stack.push(id);
                }
            }
        }
    }

    Ok(top_level)
}

/// Parse `input` into a fresh DOM whose root is a [`NodeData::Fragment`].
pub fn parse_fragment(input: &str) -> Result<(Dom, NodeId), MarkupError> {
    let mut dom = Dom::new();
    let root = dom.insert(NodeData::Fragment);
    parse_into(&mut dom, root, input)?;
    Ok((dom, root))
}

/// Append text under `parent`, merging into a trailing text node.
///
/// Returns the id of a newly created node (`None` when merged).
fn append_text(dom: &mut Dom, parent: NodeId, text: &str) -> Option<NodeId> {
    if let Some(&last) = dom.children(parent).last() {
        if let Some(NodeData::Text(existing)) = dom.get_mut(last) {
            existing.push_str(text);
            return None;
        }
    }
    Some(dom.insert_child(parent, NodeData::text(text)))
}

/// Read attributes in tag mode, then hand the lexer back in content mode.
fn read_start_tag<'s>(
    lex: Lexer<'s, ContentToken>,
    tag: &str,
) -> Result<(Lexer<'s, ContentToken>, StartTag), MarkupError> {
    let mut lex: Lexer<'s, TagToken> = lex.morph();
    let mut element = ElementData::new(tag);
    let mut pending: Option<String> = None;
    let mut awaiting_value = false;

    let self_closing = loop {
        match lex.next() {
            None => {
                return Err(MarkupError::UnexpectedEof(format!(
                    "input ends inside <{tag}>"
                )))
            }
            Some(Ok(TagToken::Name)) => {
                let slice = lex.slice();
                if awaiting_value {
                    if let Some(name) = pending.take() {
                        push_attr(&mut element, name, slice);
                    }
                    awaiting_value = false;
                } else if let Some(previous) = pending.replace(slice.to_ascii_lowercase()) {
                    push_attr(&mut element, previous, "");
                }
            }
            Some(Ok(TagToken::Equals)) => {
                if pending.is_none() || awaiting_value {
                    return Err(unexpected(&lex, tag));
                }
                match unquoted_value(lex.remainder()) {
                    Some((consumed, value)) => {
                        if let Some(name) = pending.take() {
                            push_attr(&mut element, name, value);
                        }
                        lex.bump(consumed);
                    }
                    None => awaiting_value = true,
                }
            }
            Some(Ok(TagToken::DoubleQuoted | TagToken::SingleQuoted)) => {
                if !awaiting_value {
                    return Err(unexpected(&lex, tag));
                }
                if let Some(name) = pending.take() {
                    push_attr(&mut element, name, unquote(lex.slice()));
                }
                awaiting_value = false;
            }
            Some(Ok(TagToken::Slash)) => {}
            Some(Ok(TagToken::End)) => break false,
            Some(Ok(TagToken::SelfClose)) => break true,
            Some(Err(())) => return Err(unexpected(&lex, tag)),
        }
    };

    if let Some(name) = pending.take() {
        push_attr(&mut element, name, "");
    }

    Ok((
        lex.morph(),
        StartTag {
            element,
            self_closing,
        },
    ))
}

/// An unquoted value at the start of `rest`, as bytes consumed and the value.
///
/// Runs up to whitespace or `>`, so slashes stay in the value.
fn unquoted_value(rest: &str) -> Option<(usize, &str)> {
    let is_space = |c: char| matches!(c, ' ' | '\t' | '\r' | '\n' | '\x0C');
    let trimmed = rest.trim_start_matches(is_space);
    let lead = rest.len() - trimmed.len();
    match trimmed.chars().next() {
        None | Some('"' | '\'' | '>') => None,
        Some(_) => {
            let len = trimmed
                .find(|c: char| is_space(c) || c == '>')
                .unwrap_or(trimmed.len());
            Some((lead + len, &trimmed[..len]))
        }
    }
}

/// First occurrence of an attribute wins, as in HTML.
fn push_attr(element: &mut ElementData, name: String, value: &str) {
    if !element.has_attr(&name) {
        element.set_attr(name, value);
    }
}

fn unexpected(lex: &Lexer<'_, TagToken>, tag: &str) -> MarkupError {
    MarkupError::UnexpectedToken {
        position: lex.span().start,
        message: format!("'{}' inside <{}>", lex.slice(), tag),
    }
}
