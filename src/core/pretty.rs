// LogSlice - core/pretty.rs
//
// Formatted rendering of extracted fragments for the content viewer.
// Never fails: the extractors only balance delimiters, so a fragment is
// not guaranteed to parse -- anything unparseable degrades to raw or
// best-effort output.

use crate::util::constants::PRETTY_XML_INDENT;

/// Pretty-print a JSON fragment.
///
/// Round-trips through serde_json when the fragment is valid JSON;
/// otherwise returns the raw text unchanged.
pub fn pretty_json(raw: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or_else(|_| raw.to_string()),
        Err(_) => raw.to_string(),
    }
}

/// Pretty-print an XML fragment: one tag per line, depth-indented.
///
/// Quote-aware tokenisation, same rules as the extractor: '>' inside a
/// quoted attribute value does not end the tag. Comments, declarations
/// and self-closing tags do not change depth. Text content is trimmed
/// and emitted at the current depth.
pub fn pretty_xml(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + raw.len() / 4);
    let mut depth: usize = 0;

    for token in tokenize(raw) {
        match token {
            Token::Close(tag) => {
                depth = depth.saturating_sub(1);
                push_line(&mut out, depth, tag);
            }
            Token::Open(tag) => {
                push_line(&mut out, depth, tag);
                depth += 1;
            }
            Token::Flat(tag) => push_line(&mut out, depth, tag),
            Token::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    push_line(&mut out, depth, trimmed);
                }
            }
        }
    }

    out
}

fn push_line(out: &mut String, depth: usize, content: &str) {
    if !out.is_empty() {
        out.push('\n');
    }
    for _ in 0..depth * PRETTY_XML_INDENT {
        out.push(' ');
    }
    out.push_str(content);
}

enum Token<'a> {
    /// Opening tag: increases depth after emission.
    Open(&'a str),
    /// Closing tag: decreases depth before emission.
    Close(&'a str),
    /// Depth-neutral markup: self-closing tag, comment, declaration.
    Flat(&'a str),
    /// Text content between tags.
    Text(&'a str),
}

fn tokenize(raw: &str) -> Vec<Token<'_>> {
    let bytes = raw.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'<' {
            let start = i;
            while i < bytes.len() && bytes[i] != b'<' {
                i += 1;
            }
            tokens.push(Token::Text(&raw[start..i]));
            continue;
        }

        let Some(end) = tag_end(bytes, i) else {
            // Unterminated markup: emit the remainder as text.
            tokens.push(Token::Text(&raw[i..]));
            break;
        };
        let tag = &raw[i..=end];
        tokens.push(classify(tag));
        i = end + 1;
    }

    tokens
}

/// Byte offset of the '>' ending the tag that starts at `at`, honouring
/// quoted attribute values and comment syntax.
fn tag_end(bytes: &[u8], at: usize) -> Option<usize> {
    // Comments may contain bare '>' characters; scan for the full "-->".
    if bytes[at..].starts_with(b"<!--") {
        return bytes[at + 4..]
            .windows(3)
            .position(|w| w == b"-->")
            .map(|i| at + 4 + i + 2);
    }

    let mut quote: Option<u8> = None;
    for (i, &b) in bytes.iter().enumerate().skip(at + 1) {
        match quote {
            Some(q) => {
                if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'"' | b'\'' => quote = Some(b),
                b'>' => return Some(i),
                _ => {}
            },
        }
    }
    None
}

fn classify(tag: &str) -> Token<'_> {
    if tag.starts_with("</") {
        Token::Close(tag)
    } else if tag.starts_with("<?") || tag.starts_with("<!") || tag.ends_with("/>") {
        Token::Flat(tag)
    } else {
        Token::Open(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_object_is_reformatted() {
        assert_eq!(
            pretty_json("{\"a\":1,\"b\":[2,3]}"),
            "{\n  \"a\": 1,\n  \"b\": [\n    2,\n    3\n  ]\n}"
        );
    }

    #[test]
    fn test_invalid_json_falls_back_to_raw() {
        assert_eq!(pretty_json("{not: valid}"), "{not: valid}");
    }

    #[test]
    fn test_empty_object_round_trips() {
        assert_eq!(pretty_json("{}"), "{}");
    }

    #[test]
    fn test_xml_nested_indentation() {
        assert_eq!(
            pretty_xml("<a><b>hi</b></a>"),
            "<a>\n  <b>\n    hi\n  </b>\n</a>"
        );
    }

    #[test]
    fn test_xml_self_closing_is_depth_neutral() {
        assert_eq!(pretty_xml("<a><br/></a>"), "<a>\n  <br/>\n</a>");
    }

    #[test]
    fn test_xml_comment_is_depth_neutral() {
        assert_eq!(
            pretty_xml("<a><!-- note --></a>"),
            "<a>\n  <!-- note -->\n</a>"
        );
    }

    #[test]
    fn test_xml_quoted_gt_does_not_end_tag() {
        assert_eq!(pretty_xml("<a expr=\"x > y\"></a>"), "<a expr=\"x > y\">\n</a>");
    }

    #[test]
    fn test_xml_whitespace_only_text_is_dropped() {
        assert_eq!(pretty_xml("<a>\n   <b/>\n</a>"), "<a>\n  <b/>\n</a>");
    }

    #[test]
    fn test_xml_unterminated_tag_degrades_to_text() {
        assert_eq!(pretty_xml("<a><broken"), "<a>\n  <broken");
    }
}
