//! Line-oriented helpers for editing target source files
//!
//! Target files are opaque text; these helpers locate insertion points by
//! anchor text and brace counting rather than parsing the language.

use std::ops::Range;

/// A `{ ... }` block located by brace counting, as 0-based line indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BraceBlock {
    /// Line holding the opening brace
    pub open_line: usize,
    /// Line holding the matching closing brace
    pub close_line: usize,
}

/// Finds the brace block that starts at the first `{` at or after `marker`.
///
/// Returns None when the marker is absent or the braces never balance.
pub(crate) fn find_brace_block(content: &str, marker: &str) -> Option<BraceBlock> {
    let start = content.find(marker)?;
    let mut line = content[..start].matches('\n').count();

    let mut depth = 0usize;
    let mut open_line = None;
    for ch in content[start..].chars() {
        match ch {
            '\n' => line += 1,
            '{' => {
                if open_line.is_none() {
                    open_line = Some(line);
                }
                depth += 1;
            }
            '}' => {
                if open_line.is_some() {
                    depth -= 1;
                    if depth == 0 {
                        return Some(BraceBlock {
                            open_line: open_line?,
                            close_line: line,
                        });
                    }
                }
            }
            _ => {}
        }
    }
    None
}

/// Inserts lines immediately before the given 0-based line index.
///
/// Returns the new content and the 1-based numbers of the inserted lines.
/// The rebuilt content keeps the file's dominant line ending, so editing a
/// CRLF file does not rewrite every other line.
pub(crate) fn insert_lines_before(
    content: &str,
    line_idx: usize,
    new_lines: &[String],
) -> (String, Vec<usize>) {
    let eol = if content.contains("\r\n") { "\r\n" } else { "\n" };
    let trailing_newline = content.ends_with('\n');
    let mut lines: Vec<String> = content.lines().map(str::to_string).collect();
    let at = line_idx.min(lines.len());

    let numbers: Vec<usize> = (0..new_lines.len()).map(|i| at + i + 1).collect();
    for (i, line) in new_lines.iter().enumerate() {
        lines.insert(at + i, line.clone());
    }

    let mut joined = lines.join(eol);
    if trailing_newline {
        joined.push_str(eol);
    }
    (joined, numbers)
}

/// 0-based index of the last line whose trimmed content is `}`.
pub(crate) fn last_closing_brace_line(content: &str) -> Option<usize> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| line.trim() == "}")
        .map(|(idx, _)| idx)
        .last()
}

/// Whole-word identifier check; `Orders` does not match inside `OrdersDto`.
pub(crate) fn contains_identifier(content: &str, ident: &str) -> bool {
    if ident.is_empty() {
        return false;
    }
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let mut from = 0;
    while let Some(pos) = content[from..].find(ident) {
        let at = from + pos;
        let before_ok = content[..at].chars().next_back().map_or(true, |c| !is_word(c));
        let after_ok = content[at + ident.len()..]
            .chars()
            .next()
            .map_or(true, |c| !is_word(c));
        if before_ok && after_ok {
            return true;
        }
        from = at + ident.len();
    }
    false
}

/// True when `name` appears as a method, i.e. a whole-word identifier
/// directly followed by `(`. Avoids false positives from namespaces and
/// using directives that mention the bare name.
pub(crate) fn contains_method(content: &str, name: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let mut from = 0;
    while let Some(pos) = content[from..].find(name) {
        let at = from + pos;
        let before_ok = content[..at].chars().next_back().map_or(true, |c| !is_word(c));
        let called = content[at + name.len()..].starts_with('(');
        if before_ok && called {
            return true;
        }
        from = at + name.len();
    }
    false
}

/// Byte range of the text inside the first `( ... )` following `marker`.
pub(crate) fn parameter_span(content: &str, marker: &str) -> Option<Range<usize>> {
    let start = content.find(marker)? + marker.len();
    let open = start + content[start..].find('(')?;
    let mut depth = 0usize;
    for (offset, ch) in content[open..].char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + 1..open + offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// Extracts the property name from a declaration like
/// `public string Name { get; set; }`.
pub(crate) fn property_name(declaration: &str) -> Option<&str> {
    let before_brace = match declaration.find('{') {
        Some(idx) => &declaration[..idx],
        None => declaration,
    };
    before_brace.split_whitespace().next_back()
}
