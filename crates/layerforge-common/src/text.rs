//! Whitespace-insensitive line comparison
//!
//! Registration lines are deduplicated on insert and located on rollback by
//! comparing whitespace-stripped forms. Both sides must agree on the
//! normalization, so it lives here.

/// Strips all whitespace from a line for comparison purposes
///
/// Two lines are considered the same logical registration line when their
/// normalized forms match or one contains the other. The containment check
/// is intentionally fuzzy: it mirrors the historical matching behavior that
/// downstream journals depend on, ambiguity included.
pub fn normalize_line(line: &str) -> String {
    line.chars().filter(|c| !c.is_whitespace()).collect()
}

/// True when two lines match under normalization, in either direction
pub fn lines_equivalent(a: &str, b: &str) -> bool {
    let a = normalize_line(a);
    let b = normalize_line(b);
    if a.is_empty() || b.is_empty() {
        return a == b;
    }
    a.contains(&b) || b.contains(&a)
}
