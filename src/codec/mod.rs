//! Bidirectional transcoder between the legacy per-character dialect, the
//! hex hybrid dialect, and structural color/style tags.
//!
//! `translate` never fails: malformed markup degrades through a fallback
//! chain (lenient tag parse → legacy-only parse → single literal span) and
//! the worst outcome is reduced styling, never an error.

mod parser;
mod passes;
mod protect;
mod serialize;

pub use serialize::{to_legacy_string, to_tag_string};

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::document::{ClickAction, Document};

/// Translate a raw, untrusted dialect-mixed string into a document.
///
/// Ordered passes:
/// 1. protect well-formed interactive wrappers
/// 2. protect lone markers (hex lookahead wins over lone detection)
/// 3. case-normalize recognized codes
/// 4. `&code` → `§code`
/// 5. `§x§R§R§G§G§B§B` → `&#RRGGBB`
/// 6. bare `#RRGGBB`, then `&#RRGGBB`, → hex tags
/// 7. remaining `§` codes → tags
/// 8. delete dangling markers
/// 9. restore wrappers and lone markers
/// 10. lenient parse (with fallback chain)
/// 11. auto-link the first URL-shaped substring
pub fn translate(raw: &str) -> Document {
    let (shielded_text, shielded) = protect::protect_spans(raw);
    let shielded_text = protect::protect_lone_markers(&shielded_text);
    let normalized = passes::normalize_codes(&shielded_text);
    let applied = passes::apply_marker_codes(&normalized);
    let applied = passes::legacy_rgb_to_hex(&applied);
    let tagged = passes::bare_hex_to_tags(&applied);
    let tagged = passes::amp_hex_to_tags(&tagged);
    let tagged = passes::applied_codes_to_tags(&tagged);
    let tagged = passes::cleanup_garbage(&tagged);
    let tagged = protect::restore_spans(tagged, &shielded);
    let tagged = protect::restore_lone_markers(&tagged);

    let document = match parser::parse_tags(&tagged) {
        Ok(doc) => doc,
        Err(_) => {
            debug!("tag parse failed, falling back to legacy interpretation");
            let legacy_src =
                protect::restore_lone_markers(&protect::restore_spans(applied, &shielded));
            parser::parse_legacy(&legacy_src)
        }
    };
    autolink_urls(document)
}

/// Strip every dialect down to plain text. Pure and total; defined
/// independently of `translate` so it cannot fail.
pub fn strip(raw: &str) -> String {
    let mut s = passes::normalize_codes(raw);
    // unwrap interactive wrappers to their label text
    s = protect::wrapper_regex().replace_all(&s, "$3").into_owned();
    s = amp_hex_strip_regex().replace_all(&s, "").into_owned();
    s = strip_bare_hex(&s);
    s = amp_code_strip_regex().replace_all(&s, "").into_owned();
    s = legacy_rgb_strip_regex().replace_all(&s, "").into_owned();
    s = applied_code_strip_regex().replace_all(&s, "").into_owned();
    s = tag_strip_regex().replace_all(&s, "").into_owned();
    s
}

fn amp_hex_strip_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("&#[0-9A-Fa-f]{6}").unwrap())
}

fn amp_code_strip_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("&[0-9a-fk-or]").unwrap())
}

fn legacy_rgb_strip_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("§x(?:§[0-9a-fA-F]){6}").unwrap())
}

fn applied_code_strip_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("§[0-9a-fk-orA-FK-OR]").unwrap())
}

fn tag_strip_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            "(?i)</?(black|dark_blue|dark_green|dark_aqua|dark_red|dark_purple|gold|gray|dark_gray|blue|green|aqua|red|light_purple|yellow|white|bold|italic|underlined|strikethrough|obfuscated|reset|#[0-9A-Fa-f]{6})>",
        )
        .unwrap()
    })
}

/// Remove bare `#RRGGBB` sequences unless preceded by `:`, `&` or `<`
/// (those belong to another dialect form or a structural tag and are
/// handled by the other passes).
fn strip_bare_hex(input: &str) -> String {
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
            i += 7;
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    out
}

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(https?://)?([\w-]+\.)+[\w-]+(/[\w\-./?%&=]*)?").unwrap())
}

/// Attach an open-URL click for the first URL-shaped substring of the plain
/// projection. Never overwrites a click action already present.
fn autolink_urls(doc: Document) -> Document {
    let plain = doc.plain_text();
    let Some(found) = url_regex().find(&plain) else {
        return doc;
    };
    let url = found.as_str();
    let full = if url.starts_with("http") {
        url.to_string()
    } else {
        format!("https://{url}")
    };
    doc.with_click_where_absent(ClickAction::OpenUrl(full))
}
