//! Inverse mappings: a structural document back to a tag string or to the
//! legacy applied-code dialect.

use crate::color::Color;
use crate::document::{ClickAction, Document, Span, StyleSet};

#[derive(Clone, Copy, Default, PartialEq)]
struct State {
    color: Option<Color>,
    styles: StyleSet,
}

impl State {
    fn of(span: &Span) -> State {
        State {
            color: span.color,
            styles: span.styles,
        }
    }

    fn is_default(&self) -> bool {
        self.color.is_none() && self.styles.is_empty()
    }
}

/// Serialize to canonical structural tags. Feeding the result back through
/// `translate` yields a content-equivalent document.
pub fn to_tag_string(doc: &Document) -> String {
    let mut out = String::new();
    let mut prev = State::default();
    for span in &doc.spans {
        if let (Some(hover), Some(ClickAction::RunCommand(cmd))) = (&span.hover, &span.click) {
            out.push_str("<hover:show_text:'");
            out.push_str(&escape_quotes(&to_tag_string(hover)));
            out.push_str("'><click:run_command:'");
            out.push_str(&escape_quotes(cmd));
            out.push_str("'>");
            push_tag_state(&mut out, State::default(), State::of(span));
            out.push_str(&span.text);
            out.push_str("</click></hover>");
            // the parser restarts from the default state after a wrapper
            prev = State::default();
            continue;
        }
        let cur = State::of(span);
        push_tag_state(&mut out, prev, cur);
        out.push_str(&span.text);
        prev = cur;
    }
    out
}

fn push_tag_state(out: &mut String, prev: State, cur: State) {
    if cur == prev {
        return;
    }
    // a color tag clears styles on parse, so a reset is only needed when the
    // new state carries no color of its own
    if cur.color.is_none() && !prev.is_default() {
        out.push_str("<reset>");
    }
    match cur.color {
        Some(Color::Named(named)) => {
            out.push('<');
            out.push_str(named.tag_name());
            out.push('>');
        }
        Some(color @ Color::Rgb(..)) => {
            out.push_str("<#");
            if let Some(hex) = color.hex() {
                out.push_str(&hex);
            }
            out.push('>');
        }
        None => {}
    }
    push_style_tags(out, cur.styles);
}

fn push_style_tags(out: &mut String, styles: StyleSet) {
    if styles.obfuscated {
        out.push_str("<obfuscated>");
    }
    if styles.bold {
        out.push_str("<bold>");
    }
    if styles.strikethrough {
        out.push_str("<strikethrough>");
    }
    if styles.underline {
        out.push_str("<underlined>");
    }
    if styles.italic {
        out.push_str("<italic>");
    }
}

/// Serialize to the legacy applied-code dialect for clients that cannot
/// consume structural tags. Interactive spans degrade to their label text.
pub fn to_legacy_string(doc: &Document) -> String {
    let mut out = String::new();
    let mut prev = State::default();
    for span in &doc.spans {
        let cur = State::of(span);
        if cur != prev {
            match cur.color {
                Some(Color::Named(named)) => {
                    out.push('§');
                    out.push(named.code());
                }
                Some(Color::Rgb(r, g, b)) => {
                    out.push_str("§x");
                    for c in format!("{:02x}{:02x}{:02x}", r, g, b).chars() {
                        out.push('§');
                        out.push(c);
                    }
                }
                // no color of its own: drop back to defaults first
                None => {
                    if !prev.is_default() {
                        out.push_str("§r");
                    }
                }
            }
            push_legacy_styles(&mut out, cur.styles);
            prev = cur;
        }
        out.push_str(&span.text);
    }
    out
}

fn push_legacy_styles(out: &mut String, styles: StyleSet) {
    if styles.obfuscated {
        out.push_str("§k");
    }
    if styles.bold {
        out.push_str("§l");
    }
    if styles.strikethrough {
        out.push_str("§m");
    }
    if styles.underline {
        out.push_str("§n");
    }
    if styles.italic {
        out.push_str("§o");
    }
}

fn escape_quotes(s: &str) -> String {
    s.replace('\'', "''")
}
