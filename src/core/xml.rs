// LogSlice - core/xml.rs
//
// XML fragment extractor. Scans a log line for an opening-tag candidate
// and balances tags forward across lines until the candidate's element
// closes. Not a parser: no entity handling, no grammar validation --
// the only job is boundary detection inside unstructured text.
//
// Candidates are sought on the start line only; a line without '<'
// never yields a fragment. Balancing may continue onto later lines,
// bounded by the scan window.

use crate::core::extract::{line_of, window_text};
use crate::core::model::{Fragment, LineStore, MarkupKind};

/// One markup token beginning at a '<'.
///
/// `end` is the byte offset of the token's closing '>' in the window text.
enum Tag {
    Open { name: String, end: usize },
    Close { name: String, end: usize },
    SelfClose { end: usize },
    /// Declaration (`<?...?>`), comment (`<!--...-->`) or `<!...>` markup.
    /// Ignored for balancing.
    Skip { end: usize },
    /// A '<' that does not begin well-formed markup; plain text.
    Text,
}

/// Try to extract an XML fragment whose opening tag sits on line `start`.
///
/// Scans at most `window_lines` lines (including the start line). Every
/// opening-tag candidate on the start line is tried in order; a candidate
/// that fails to balance (mismatched close, unterminated markup, window
/// exhausted) is a red herring and the next candidate is tried.
pub fn extract(store: &LineStore, start: usize, window_lines: usize) -> Option<Fragment> {
    let first = store.line(start)?;
    if !first.contains('<') {
        return None;
    }

    let (text, line_starts) = window_text(store, start, window_lines);
    let first_len = first.len();
    let bytes = text.as_bytes();

    let mut at = 0;
    while at < first_len {
        if bytes[at] != b'<' {
            at += 1;
            continue;
        }
        match classify_tag(&text, at) {
            Some(Tag::Open { end, .. }) => {
                if let Some(close) = scan_balance(&text, at) {
                    let end_line = line_of(&line_starts, close);
                    return Some(Fragment {
                        kind: MarkupKind::Xml,
                        start_line: start,
                        end_line: start + end_line,
                        raw_text: text[at..=close].to_string(),
                    });
                }
                // Red herring: resume hunting after the failed opening
                // tag, not inside its quoted attributes.
                at = end + 1;
            }
            // Comments, declarations, closing and self-closing tags are
            // opaque while hunting: a candidate never starts inside them.
            Some(Tag::Close { end, .. })
            | Some(Tag::SelfClose { end })
            | Some(Tag::Skip { end }) => at = end + 1,
            _ => at += 1,
        }
    }

    None
}

/// Balance tags starting at the candidate's '<'. Returns the byte offset
/// of the '>' that closes the candidate element, or None if this
/// candidate never balances within the window.
fn scan_balance(text: &str, candidate: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut stack: Vec<String> = Vec::new();
    let mut at = candidate;

    while at < bytes.len() {
        if bytes[at] != b'<' {
            at += 1;
            continue;
        }
        // Unterminated markup (`?` on None) fails the candidate: the
        // window cannot contain a balanced element beyond it.
        match classify_tag(text, at)? {
            Tag::Open { name, end } => {
                stack.push(name);
                at = end + 1;
            }
            Tag::Close { name, end } => match stack.pop() {
                Some(top) if top == name => {
                    if stack.is_empty() {
                        return Some(end);
                    }
                    at = end + 1;
                }
                // Close-tag mismatch is a local failure for this
                // candidate only, never a fatal error.
                _ => return None,
            },
            Tag::SelfClose { end } | Tag::Skip { end } => at = end + 1,
            Tag::Text => at += 1,
        }
    }

    None
}

/// Classify the markup token starting at the '<' at byte offset `at`.
/// Returns None when the token is tag-like but unterminated in `text`.
fn classify_tag(text: &str, at: usize) -> Option<Tag> {
    let bytes = text.as_bytes();
    debug_assert_eq!(bytes[at], b'<');

    let Some(&next) = bytes.get(at + 1) else {
        return Some(Tag::Text);
    };

    // XML declaration: <? ... ?>
    if next == b'?' {
        let end = find_sub(bytes, b"?>", at + 2)?;
        return Some(Tag::Skip { end: end + 1 });
    }

    // Comment: <!-- ... -->   Other <!...> markup: skip to the next '>'.
    if next == b'!' {
        if text[at..].starts_with("<!--") {
            let end = find_sub(bytes, b"-->", at + 4)?;
            return Some(Tag::Skip { end: end + 2 });
        }
        let end = find_byte(bytes, b'>', at + 2)?;
        return Some(Tag::Skip { end });
    }

    // Closing tag: </name>
    if next == b'/' {
        let Some(name_end) = scan_name(bytes, at + 2) else {
            return Some(Tag::Text);
        };
        let end = find_byte(bytes, b'>', name_end)?;
        if bytes[name_end..end].iter().any(|b| !b.is_ascii_whitespace()) {
            return Some(Tag::Text);
        }
        return Some(Tag::Close {
            name: text[at + 2..name_end].to_string(),
            end,
        });
    }

    // Opening or self-closing tag: <name ...> | <name ... />
    let Some(name_end) = scan_name(bytes, at + 1) else {
        return Some(Tag::Text);
    };
    let name = text[at + 1..name_end].to_string();

    // Scan attributes. Quoted attribute values are taken verbatim:
    // angle brackets inside them do not affect tag detection.
    let mut i = name_end;
    let mut quote: Option<u8> = None;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'"' | b'\'' => quote = Some(b),
                b'>' => {
                    let self_closing = bytes[name_end..i]
                        .iter()
                        .rev()
                        .find(|b| !b.is_ascii_whitespace())
                        == Some(&b'/');
                    return Some(if self_closing {
                        Tag::SelfClose { end: i }
                    } else {
                        Tag::Open { name, end: i }
                    });
                }
                // A bare '<' inside an unquoted attribute area means the
                // "tag" was plain text after all.
                b'<' => return Some(Tag::Text),
                _ => {}
            },
        }
        i += 1;
    }

    None
}

/// Scan a tag name starting at `from`. Returns the byte offset one past
/// the last name character, or None when no valid name starts there.
fn scan_name(bytes: &[u8], from: usize) -> Option<usize> {
    let first = *bytes.get(from)?;
    if !(first.is_ascii_alphabetic() || first == b'_') {
        return None;
    }
    let mut i = from + 1;
    while i < bytes.len() && is_name_byte(bytes[i]) {
        i += 1;
    }
    Some(i)
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.' | b':')
}

fn find_byte(bytes: &[u8], needle: u8, from: usize) -> Option<usize> {
    bytes[from.min(bytes.len())..]
        .iter()
        .position(|&b| b == needle)
        .map(|i| from + i)
}

fn find_sub(bytes: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    let start = from.min(bytes.len());
    bytes[start..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| start + i)
}
