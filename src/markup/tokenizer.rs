//! logos-based markup tokenizer.
//!
//! Markup is lexed in two modes. [`ContentToken`] covers the space between
//! tags (text, tag openers, end tags, comments). After a [`ContentToken::TagOpen`]
//! the parser morphs the lexer into [`TagToken`] mode to read attributes up to
//! the closing `>` or `/>`, then morphs back.
//!
//! Token priority in logos is determined by:
//! 1. Longest match wins (e.g. `<p` as TagOpen beats `<` as LessThan)
//! 2. For equal length matches, earlier-defined variants win

use logos::{Lexer, Logos};

/// Tokens between tags.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentToken {
    /// `<!-- ... -->`, consumed up to the terminator (or end of input).
    #[token("<!--", skip_comment_body)]
    Comment,

    /// End tag: `</p>`, `</letter-box >`.
    #[regex(r"</[a-zA-Z][a-zA-Z0-9_-]*[ \t\r\n\f]*>")]
    TagClose,

    /// Start of a start tag: `<p`, `<letter-box`. Attributes follow in tag mode.
    #[regex(r"<[a-zA-Z][a-zA-Z0-9_-]*")]
    TagOpen,

    /// A `<` that does not begin a tag. Treated as text.
    #[token("<")]
    LessThan,

    /// Character data.
    #[regex(r"[^<]+")]
    Text,
}

/// Tokens inside a start tag.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum TagToken {
    /// `/>`
    #[token("/>")]
    SelfClose,

    /// `>`
    #[token(">")]
    End,

    /// `=`
    #[token("=")]
    Equals,

    /// A stray `/` between attributes.
    #[token("/")]
    Slash,

    /// `"value"`
    #[regex(r#""[^"]*""#)]
    DoubleQuoted,

    /// `'value'`
    #[regex(r"'[^']*'")]
    SingleQuoted,

    /// Attribute name.
    #[regex(r#"[^ \t\r\n\f"'<>/=]+"#)]
    Name,
}

fn skip_comment_body(lex: &mut Lexer<ContentToken>) -> bool {
    let rest = lex.remainder();
    match rest.find("-->") {
        Some(end) => lex.bump(end + 3),
        None => lex.bump(rest.len()),
    }
    true
}

/// Tag name of an end-tag slice such as `</p >`.
pub fn close_tag_name(slice: &str) -> String {
    slice
        .trim_start_matches("</")
        .trim_end_matches('>')
        .trim_end()
        .to_ascii_lowercase()
}

/// Strip the surrounding quotes of a quoted attribute value.
pub fn unquote(slice: &str) -> &str {
    if slice.len() >= 2 {
        &slice[1..slice.len() - 1]
    } else {
        slice
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content_tokens(input: &str) -> Vec<(ContentToken, String)> {
        ContentToken::lexer(input)
            .spanned()
            .filter_map(|(result, span)| result.ok().map(|t| (t, input[span].to_string())))
            .collect()
    }

    fn tag_tokens(input: &str) -> Vec<TagToken> {
        TagToken::lexer(input).filter_map(Result::ok).collect()
    }

    #[test]
    fn test_simple_element() {
        let result = content_tokens("<p>Hi</p>");
        assert_eq!(result[0], (ContentToken::TagOpen, "<p".into()));
        // '>' is only meaningful in tag mode; in content mode it is text.
        assert_eq!(result[1], (ContentToken::Text, ">Hi".into()));
        assert_eq!(result[2], (ContentToken::TagClose, "</p>".into()));
    }

    #[test]
    fn test_placeholder_is_plain_text() {
        let result = content_tokens("Hi {{last_name}}");
        assert_eq!(result, vec![(ContentToken::Text, "Hi {{last_name}}".into())]);
    }

    #[test]
    fn test_comment_is_one_token() {
        let result = content_tokens("a<!-- <p>not a tag</p> -->b");
        assert_eq!(
            result,
            vec![
                (ContentToken::Text, "a".into()),
                (ContentToken::Comment, "<!-- <p>not a tag</p> -->".into()),
                (ContentToken::Text, "b".into()),
            ]
        );
    }

    #[test]
    fn test_unterminated_comment_consumes_rest() {
        let result = content_tokens("x<!-- open");
        assert_eq!(result.len(), 2);
        assert_eq!(result[1].0, ContentToken::Comment);
    }

    #[test]
    fn test_lone_less_than() {
        let result = content_tokens("1 < 2");
        assert_eq!(
            result,
            vec![
                (ContentToken::Text, "1 ".into()),
                (ContentToken::LessThan, "<".into()),
                (ContentToken::Text, " 2".into()),
            ]
        );
    }

    #[test]
    fn test_custom_element_names() {
        let result = content_tokens("<letter-box-content></letter-box-content >");
        assert_eq!(result[0], (ContentToken::TagOpen, "<letter-box-content".into()));
        assert_eq!(result[1].0, ContentToken::Text);
        assert_eq!(result[2].0, ContentToken::TagClose);
        assert_eq!(close_tag_name(&result[2].1), "letter-box-content");
    }

    #[test]
    fn test_attribute_tokens() {
        let result = tag_tokens(r#" name="footer" data-x='1' hidden value=3>"#);
        assert_eq!(
            result,
            vec![
                TagToken::Name,
                TagToken::Equals,
                TagToken::DoubleQuoted,
                TagToken::Name,
                TagToken::Equals,
                TagToken::SingleQuoted,
                TagToken::Name,
                TagToken::Name,
                TagToken::Equals,
                TagToken::Name,
                TagToken::End,
            ]
        );
    }

    #[test]
    fn test_self_close() {
        assert_eq!(tag_tokens(" />"), vec![TagToken::SelfClose]);
        assert_eq!(
            tag_tokens("disabled / x/>"),
            vec![TagToken::Name, TagToken::Slash, TagToken::Name, TagToken::SelfClose]
        );
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("\"abc\""), "abc");
        assert_eq!(unquote("''"), "");
        assert_eq!(unquote("x"), "x");
    }
}
