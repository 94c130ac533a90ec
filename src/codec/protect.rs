//! Shields already-structured interactive spans and lone escape markers from
//! reinterpretation during the codec's rewriting passes.
//!
//! Placeholders use private-use-area characters so no rewriting pass can
//! mistake them for dialect input.

use std::sync::OnceLock;

use regex::Regex;

use crate::color::is_code_char;

/// The escape marker of the raw dialect (`&c`, `&#RRGGBB`).
pub(crate) const MARKER: char = '&';
/// The marker of the already-applied legacy dialect (`§c`, `§x§R...`).
pub(crate) const APPLIED_MARKER: char = '§';

const SPAN_OPEN: char = '\u{F8F0}';
const SPAN_CLOSE: char = '\u{F8F1}';
const LONE_MARKER: char = '\u{F8F2}';

/// Matches a well-formed interactive wrapper: hover tooltip + run-command
/// click around arbitrary label text. `''` escapes a quote inside the quoted
/// parameters.
pub(crate) fn wrapper_regex() -> &'static Regex {
    static WRAPPER: OnceLock<Regex> = OnceLock::new();
    WRAPPER.get_or_init(|| {
        Regex::new(
            r"(?is)<hover:show_text:'((?:[^']|'')*)'><click:run_command:'((?:[^']|'')*)'>(.*?)</click></hover>",
        )
        .unwrap()
    })
}

/// Replace each well-formed interactive wrapper with an opaque placeholder.
/// Returns the rewritten string and the shielded originals, in match order.
pub(crate) fn protect_spans(input: &str) -> (String, Vec<String>) {
    let mut shielded: Vec<String> = Vec::new();
    let out = wrapper_regex().replace_all(input, |caps: &regex::Captures| {
        let idx = shielded.len();
        shielded.push(caps[0].to_string());
        format!("{SPAN_OPEN}{idx}{SPAN_CLOSE}")
    });
    (out.into_owned(), shielded)
}

/// Substitute span placeholders back to their original text.
pub(crate) fn restore_spans(mut input: String, shielded: &[String]) -> String {
    for (idx, original) in shielded.iter().enumerate() {
        input = input.replace(&format!("{SPAN_OPEN}{idx}{SPAN_CLOSE}"), original);
    }
    input
}

fn hex_follows(rest: &str) -> bool {
    let mut count = 0;
    for c in rest.chars().take(6) {
        if !c.is_ascii_hexdigit() {
            return false;
        }
        count += 1;
    }
    count == 6
}

/// Replace each lone marker with a placeholder, scanning left to right.
///
/// A marker is lone when it is the last character, or the next character is
/// neither a recognized code character nor a `#` that starts a full
/// six-digit hex sequence. The hex lookahead is checked first; only when it
/// fails is the marker treated as lone (`&#1234X` keeps a literal `&`).
pub(crate) fn protect_lone_markers(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for (i, c) in input.char_indices() {
        if c != MARKER {
            out.push(c);
            continue;
        }
        let rest = &input[i + c.len_utf8()..];
        let live = match rest.chars().next() {
            Some('#') => hex_follows(&rest[1..]),
            Some(next) => is_code_char(next),
            None => false,
        };
        if live {
            out.push(c);
        } else {
            out.push(LONE_MARKER);
        }
    }
    out
}

/// Substitute lone-marker placeholders back to literal markers.
pub(crate) fn restore_lone_markers(input: &str) -> String {
    input.replace(LONE_MARKER, "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn protects_and_restores_a_wrapper() {
        let input = "before <hover:show_text:'tip'><click:run_command:'/cmd'>label</click></hover> after";
        let (protected, shielded) = protect_spans(input);
        assert_eq!(shielded.len(), 1);
        assert!(!protected.contains("hover"));
        assert_eq!(restore_spans(protected, &shielded), input);
    }

    #[test]
    fn wrapper_matching_is_non_overlapping() {
        let input = "<hover:show_text:'a'><click:run_command:'/a'>1</click></hover>\
                     <hover:show_text:'b'><click:run_command:'/b'>2</click></hover>";
        let (_, shielded) = protect_spans(input);
        assert_eq!(shielded.len(), 2);
    }

    #[test]
    fn lone_marker_at_end_is_protected() {
        let out = protect_lone_markers("trailing &");
        assert!(!out.ends_with('&'));
        assert_eq!(restore_lone_markers(&out), "trailing &");
    }

    #[test]
    fn marker_before_code_stays_live() {
        assert_eq!(protect_lone_markers("&cred"), "&cred");
        assert_eq!(protect_lone_markers("&Cred"), "&Cred");
        assert_eq!(protect_lone_markers("&#ff0000x"), "&#ff0000x");
    }

    #[test]
    fn marker_before_word_is_lone() {
        let out = protect_lone_markers("Tom & Jerry");
        assert!(!out.contains('&'));
        assert_eq!(restore_lone_markers(&out), "Tom & Jerry");
    }

    #[test]
    fn short_hex_run_protects_the_marker() {
        // fewer than six hex digits after &# -> not a hex sequence
        let out = protect_lone_markers("&#1234X");
        assert!(!out.contains('&'));
        assert_eq!(restore_lone_markers(&out), "&#1234X");
    }
}
