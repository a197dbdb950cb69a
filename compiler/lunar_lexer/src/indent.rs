//! Indentation trimming for multi-line string literals.
//!
//! A literal that spans several physical lines loses the common indent of
//! its continuation lines. Indent is measured in columns: a tab counts 4,
//! zero-width marks count 0, any other whitespace counts 1. Blank lines do
//! not take part in the minimum. When the minimum ends inside a tab, the
//! overshoot is written back as spaces.
//!
//! All functions work on decoded bytes, which may hold invalid UTF-8 after
//! escapes; only the valid prefix of a line is inspected.

/// Column width of an indentation character, `None` for anything that ends
/// the indentation.
pub(crate) fn indent_width(c: char) -> Option<u32> {
    match c {
        '\t' => Some(4),
        '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}' => Some(0),
        '\n' | '\r' => None,
        c if c.is_whitespace() => Some(1),
        _ => None,
    }
}

fn utf8_prefix(bytes: &[u8]) -> &str {
    match std::str::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => std::str::from_utf8(&bytes[..err.valid_up_to()]).unwrap_or(""),
    }
}

/// Indent of the line starting at `line`, which runs to the end of its text
/// segment. `None` when the line is blank: only whitespace before a line
/// break, or before the end of the literal when `ends_literal` is set.
pub(crate) fn line_indent(line: &[u8], ends_literal: bool) -> Option<u32> {
    let text = utf8_prefix(line);
    let mut indent = 0;
    for c in text.chars() {
        match indent_width(c) {
            Some(width) => indent += width,
            None if c == '\n' || c == '\r' => return None,
            None => return Some(indent),
        }
    }
    if text.len() == line.len() && ends_literal {
        None
    } else {
        Some(indent)
    }
}

/// Smallest indent among non-blank lines. A zero indent ends the search.
pub(crate) fn minimum_indent(indents: impl IntoIterator<Item = Option<u32>>) -> u32 {
    let mut minimum: Option<u32> = None;
    for indent in indents.into_iter().flatten() {
        if indent == 0 {
            return 0;
        }
        minimum = Some(minimum.map_or(indent, |m| m.min(indent)));
    }
    minimum.unwrap_or(0)
}

/// Strip `indent` columns from the front of `line`, writing any overshoot
/// as spaces to `out`. Returns how many bytes of `line` were consumed.
fn trim_line(line: &[u8], indent: u32, out: &mut Vec<u8>) -> usize {
    let mut removed = 0;
    let mut consumed = 0;
    for c in utf8_prefix(line).chars() {
        if removed >= indent {
            break;
        }
        let Some(width) = indent_width(c) else {
            break;
        };
        removed += width;
        consumed += c.len_utf8();
    }
    if removed > indent {
        out.resize(out.len() + (removed - indent) as usize, b' ');
    }
    consumed
}

/// Copy `bytes` with `indent` columns removed at each of `line_starts`.
///
/// `line_starts` are ascending offsets into `bytes`, one per continuation
/// line.
pub(crate) fn apply_indent(bytes: &[u8], line_starts: &[usize], indent: u32) -> Vec<u8> {
    if indent == 0 || line_starts.is_empty() {
        return bytes.to_vec();
    }
    let mut out = Vec::with_capacity(bytes.len());
    let mut copied = 0;
    for &start in line_starts {
        let start = start.clamp(copied, bytes.len());
        out.extend_from_slice(&bytes[copied..start]);
        copied = start + trim_line(&bytes[start..], indent, &mut out);
    }
    out.extend_from_slice(&bytes[copied..]);
    out
}
