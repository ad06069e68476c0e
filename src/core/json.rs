// LogSlice - core/json.rs
//
// JSON fragment extractor. Symmetric in shape to core/xml.rs: find an
// opening '{' or '[' on the start line, then balance brackets forward
// across lines until the opener closes. String literals suppress
// bracket interpretation; a backslash escapes the following character.
// No grammar validation -- boundary detection only.

use crate::core::extract::{line_of, window_text};
use crate::core::model::{Fragment, LineStore, MarkupKind};

/// Try to extract a JSON fragment whose opening bracket sits on line
/// `start`.
///
/// Every `{` or `[` on the start line is a candidate, tried in order.
/// A candidate that never balances within the scan window (an earlier
/// unmatched opener, a mismatched closer) is a red herring and the next
/// candidate is tried; the first candidate whose scan balances wins.
pub fn extract(store: &LineStore, start: usize, window_lines: usize) -> Option<Fragment> {
    let first = store.line(start)?;
    if !first.contains(['{', '[']) {
        return None;
    }

    let (text, line_starts) = window_text(store, start, window_lines);
    let first_len = first.len();
    let bytes = text.as_bytes();

    for at in 0..first_len {
        if bytes[at] != b'{' && bytes[at] != b'[' {
            continue;
        }
        if let Some(end) = scan_balance(bytes, at) {
            let end_line = line_of(&line_starts, end);
            return Some(Fragment {
                kind: MarkupKind::Json,
                start_line: start,
                end_line: start + end_line,
                raw_text: text[at..=end].to_string(),
            });
        }
    }

    None
}

/// Balance brackets starting at the candidate opener. Returns the byte
/// offset of the closer that returns the depth to zero, or None if this
/// candidate never balances.
fn scan_balance(bytes: &[u8], candidate: usize) -> Option<usize> {
    // One combined stack of expected closers for both bracket shapes.
    let mut closers: Vec<u8> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(candidate) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => closers.push(b'}'),
            b'[' => closers.push(b']'),
            b'}' | b']' => {
                // A closer that does not match the innermost opener is a
                // local failure for this candidate, not a fatal error.
                if closers.last() != Some(&b) {
                    return None;
                }
                closers.pop();
                if closers.is_empty() {
                    return Some(i);
                }
            }
            _ => {}
        }
    }

    None
}
