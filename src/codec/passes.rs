//! The ordered rewriting passes between marker dialects and structural tags.
//!
//! Each pass is a total string-to-string function; `codec::translate` chains
//! them in a fixed order over protected input.

use std::sync::OnceLock;

use regex::Regex;

use crate::color::{is_code_char, style_tag, NamedColor};

use super::protect::{APPLIED_MARKER, MARKER};

/// Lowercase recognized `&C`-style codes. Hex sequences pass through.
pub(crate) fn normalize_codes(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == MARKER && i + 1 < chars.len() {
            let next = chars[i + 1];
            if next != '#' && is_code_char(next) {
                out.push(c);
                out.push(next.to_ascii_lowercase());
                i += 2;
                continue;
            }
        }
        out.push(c);
        i += 1;
    }
    out
}

/// `&code` → `§code` for recognized lowercase codes (runs after
/// normalization, so uppercase forms have already been folded).
pub(crate) fn apply_marker_codes(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == MARKER
            && i + 1 < chars.len()
            && matches!(chars[i + 1], '0'..='9' | 'a'..='f' | 'k'..='o' | 'r')
        {
            out.push(APPLIED_MARKER);
            out.push(chars[i + 1]);
            i += 2;
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    out
}

fn legacy_rgb_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("§x(?:§[0-9a-fA-F]){6}").unwrap())
}

/// `§x§R§R§G§G§B§B` → `&#RRGGBB` (hex hybrid, consumed by a later pass).
/// Must run before single-code translation so the run stays intact.
pub(crate) fn legacy_rgb_to_hex(input: &str) -> String {
    legacy_rgb_regex()
        .replace_all(input, |caps: &regex::Captures| {
            let hex: String = caps[0].chars().filter(char::is_ascii_hexdigit).collect();
            format!("{MARKER}#{hex}")
        })
        .into_owned()
}

/// Bare `#RRGGBB` → `<reset><#RRGGBB>` unless the preceding character marks
/// it as part of another dialect or an existing tag (`:`, `&`, `<`).
pub(crate) fn bare_hex_to_tags(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    while i < chars.len() {
        let guarded = i > 0 && matches!(chars[i - 1], ':' | '&' | '<');
        if chars[i] == '#'
            && i + 6 < chars.len()
            && chars[i + 1..=i + 6].iter().all(|c| c.is_ascii_hexdigit())
            && !guarded
        {
            out.push_str("<reset><#");
            for c in &chars[i + 1..=i + 6] {
                out.push(*c);
            }
            out.push('>');
            i += 7;
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    out
}

fn amp_hex_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("&#([0-9A-Fa-f]{6})").unwrap())
}

/// `&#RRGGBB` → `<reset><#RRGGBB>`.
pub(crate) fn amp_hex_to_tags(input: &str) -> String {
    amp_hex_regex()
        .replace_all(input, "<reset><#$1>")
        .into_owned()
}

/// Remaining applied single-character codes → structural tags. Color codes
/// expand with a leading reset (color change clears formatting).
pub(crate) fn applied_codes_to_tags(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == APPLIED_MARKER && i + 1 < chars.len() {
            let code = chars[i + 1];
            if code.is_ascii_digit() || code.is_ascii_lowercase() {
                if let Some(tag) = style_tag(code) {
                    out.push('<');
                    out.push_str(tag);
                    out.push('>');
                    i += 2;
                    continue;
                }
                if let Some(color) = NamedColor::from_code(code) {
                    out.push_str("<reset><");
                    out.push_str(color.tag_name());
                    out.push('>');
                    i += 2;
                    continue;
                }
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

/// Delete any marker still dangling before a character that is neither a
/// recognized code nor the start of a hex sequence (e.g. debris from
/// truncated hex runs).
pub(crate) fn cleanup_garbage(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    for (i, &c) in chars.iter().enumerate() {
        if c == MARKER {
            match chars.get(i + 1) {
                Some(&n) if is_code_char(n) || n == '#' => out.push(c),
                _ => {}
            }
        } else {
            out.push(c);
        }
    }
    out
}
