//! Keeps player-supplied text (names, shop names, item ids) on one log line.

use std::fmt::Write;

use uuid::Uuid;

/// Longest preview kept for a single escaped value.
pub const MAX_PREVIEW: usize = 120;

/// Escape a string for single-line logging, truncating at [`MAX_PREVIEW`] characters.
///
/// Backslash, `\n`, `\r` and `\t` get their usual escapes; any other control character
/// becomes `\xNN`.
pub fn escape_log(s: &str) -> String {
    escape_log_with_limit(s, MAX_PREVIEW)
}

pub fn escape_log_with_limit(s: &str, limit: usize) -> String {
    let mut out = String::with_capacity(s.len().min(limit) + 4);
    for (count, ch) in s.chars().enumerate() {
        if count >= limit {
            out.push('…');
            break;
        }
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

/// `name(first-8-of-uuid)`, for lines where names alone are ambiguous.
pub fn player_tag(name: &str, id: Uuid) -> String {
    let id = id.simple().to_string();
    format!("{}({})", escape_log(name), &id[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_control_characters() {
        assert_eq!(escape_log("Bob\nthe\r\tBuilder"), "Bob\\nthe\\r\\tBuilder");
        assert_eq!(escape_log("a\u{7}b"), "a\\x07b");
        assert_eq!(escape_log("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn truncates_long_values() {
        assert_eq!(escape_log_with_limit("abcdef", 3), "abc…");
        assert_eq!(escape_log(&"x".repeat(MAX_PREVIEW)).chars().count(), MAX_PREVIEW);
    }

    #[test]
    fn player_tag_uses_short_id() {
        let id = Uuid::parse_str("0123456789abcdef0123456789abcdef").unwrap();
        assert_eq!(player_tag("Ann", id), "Ann(01234567)");
    }
}
