//! Small text helpers shared by the parsing stages.

/// Truncates `s` to at most `max_chars` characters, ending in `...` when cut.
#[must_use]
pub fn truncate_preview(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }

    let keep = max_chars.saturating_sub(3);
    let mut out: String = s.chars().take(keep).collect();
    out.push_str("...");
    out
}
