//! User name canonicalization.
//!
//! A name is trimmed, every run of whitespace (spaces, tabs, CR, LF, ...)
//! becomes a single space, non-printable characters become `#`, and the
//! result is trimmed again. Names shorter than two characters after this are
//! rejected. The transformation is idempotent.

/// Replacement for characters that cannot be displayed
pub const REPLACEMENT_CHAR: char = '#';

/// Minimum characters in a normalized name
pub const MIN_USER_NAME_CHARS: usize = 2;

/// Normalize `raw`, or `None` if the result is too short to be a name.
pub fn normalize_user_name(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;

    for c in raw.trim().chars() {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(if is_printable(c) { c } else { REPLACEMENT_CHAR });
    }

    if out.chars().count() < MIN_USER_NAME_CHARS {
        return None;
    }
    Some(out)
}

/// Whether `raw` survives normalization.
pub fn is_valid_user_name(raw: &str) -> bool {
    normalize_user_name(raw).is_some()
}

// Controls, plus the invisible formatting characters std has no predicate for.
fn is_printable(c: char) -> bool {
    !c.is_control()
        && !matches!(
            c,
            '\u{00AD}'
                | '\u{061C}'
                | '\u{180E}'
                | '\u{200B}'..='\u{200F}'
                | '\u{202A}'..='\u{202E}'
                | '\u{2060}'..='\u{2064}'
                | '\u{2066}'..='\u{206F}'
                | '\u{FEFF}'
                | '\u{FFF9}'..='\u{FFFB}'
        )
}
