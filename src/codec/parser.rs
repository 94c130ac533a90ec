//! Lenient structural-tag parsing. Unrecognized tags are literal text; a
//! parse only fails by exceeding the hover nesting cap, and `translate`
//! recovers from that through its fallback chain.

use crate::color::{Color, NamedColor};
use crate::document::{ClickAction, Document, Span, StyleSet};

use super::protect::{wrapper_regex, APPLIED_MARKER};

/// Hover tooltips may themselves contain wrappers; past this depth the parse
/// is abandoned in favor of the legacy fallback.
const MAX_HOVER_DEPTH: usize = 8;

#[derive(Debug)]
pub(crate) struct DepthExceeded;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct SpanState {
    color: Option<Color>,
    styles: StyleSet,
}

enum TagEffect {
    Reset,
    SetColor(Color),
    ClearColor,
    StyleOn(char),
    StyleOff(char),
}

pub(crate) fn parse_tags(input: &str) -> Result<Document, DepthExceeded> {
    parse_at_depth(input, 0)
}

fn parse_at_depth(input: &str, depth: usize) -> Result<Document, DepthExceeded> {
    if depth > MAX_HOVER_DEPTH {
        return Err(DepthExceeded);
    }
    let mut doc = Document::default();
    let mut last = 0;
    for caps in wrapper_regex().captures_iter(input) {
        let whole = caps.get(0).expect("regex match has a whole capture");
        parse_flat(&input[last..whole.start()], &mut doc);

        let hover = parse_at_depth(&unescape_quotes(&caps[1]), depth + 1)?;
        let command = unescape_quotes(&caps[2]);
        let mut label = Document::default();
        parse_flat(&unescape_quotes(&caps[3]), &mut label);
        if label.spans.is_empty() {
            label.push(Span::text(""));
        }
        for mut span in label.spans {
            span.hover = Some(hover.clone());
            span.click = Some(ClickAction::RunCommand(command.clone()));
            doc.push(span);
        }
        last = whole.end();
    }
    parse_flat(&input[last..], &mut doc);
    Ok(doc)
}

/// Parse a wrapper-free fragment, starting from the default state.
fn parse_flat(input: &str, doc: &mut Document) {
    let mut state = SpanState::default();
    let mut buf = String::new();
    let mut i = 0;
    while let Some(rel) = input[i..].find('<') {
        let open = i + rel;
        buf.push_str(&input[i..open]);
        if let Some(close) = input[open..].find('>').map(|rel_close| open + rel_close) {
            if let Some(effect) = tag_effect(&input[open + 1..close]) {
                flush(doc, &mut buf, state);
                apply_effect(&mut state, effect);
                i = close + 1;
                continue;
            }
        }
        buf.push('<');
        i = open + 1;
    }
    buf.push_str(&input[i..]);
    flush(doc, &mut buf, state);
}

fn flush(doc: &mut Document, buf: &mut String, state: SpanState) {
    if buf.is_empty() {
        return;
    }
    doc.push(Span {
        text: std::mem::take(buf),
        color: state.color,
        styles: state.styles,
        hover: None,
        click: None,
    });
}

fn apply_effect(state: &mut SpanState, effect: TagEffect) {
    match effect {
        TagEffect::Reset => *state = SpanState::default(),
        TagEffect::SetColor(color) => {
            // explicit color clears formatting
            state.color = Some(color);
            state.styles.clear();
        }
        TagEffect::ClearColor => state.color = None,
        TagEffect::StyleOn(code) => {
            state.styles.apply_code(code);
        }
        TagEffect::StyleOff(code) => match code {
            'k' => state.styles.obfuscated = false,
            'l' => state.styles.bold = false,
            'm' => state.styles.strikethrough = false,
            'n' => state.styles.underline = false,
            'o' => state.styles.italic = false,
            _ => {}
        },
    }
}

/// Recognize a tag body. `None` means the tag is unknown and stays literal.
fn tag_effect(body: &str) -> Option<TagEffect> {
    let trimmed = body.trim();
    let (closing, name) = match trimmed.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let lower = name.to_ascii_lowercase();

    if lower == "reset" {
        return Some(TagEffect::Reset);
    }
    if let Some(hex) = lower.strip_prefix('#') {
        let color = Color::from_hex(hex)?;
        return Some(if closing {
            TagEffect::ClearColor
        } else {
            TagEffect::SetColor(color)
        });
    }
    if let Some(named) = NamedColor::from_tag_name(&lower) {
        return Some(if closing {
            TagEffect::ClearColor
        } else {
            TagEffect::SetColor(Color::Named(named))
        });
    }
    let style = match lower.as_str() {
        "obfuscated" => 'k',
        "bold" => 'l',
        "strikethrough" => 'm',
        "underlined" => 'n',
        "italic" => 'o',
        _ => return None,
    };
    Some(if closing {
        TagEffect::StyleOff(style)
    } else {
        TagEffect::StyleOn(style)
    })
}

fn unescape_quotes(s: &str) -> String {
    s.replace("''", "'")
}

/// Interpret an applied-marker (`§`) string as legacy codes only. Total; a
/// code-free string parses to a single literal span (the last-resort case).
pub(crate) fn parse_legacy(input: &str) -> Document {
    let chars: Vec<char> = input.chars().collect();
    let mut doc = Document::default();
    let mut state = SpanState::default();
    let mut buf = String::new();
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == APPLIED_MARKER && i + 1 < chars.len() {
            let code = chars[i + 1];
            if code == 'x' && i + 13 < chars.len() && is_rgb_run(&chars[i..i + 14]) {
                let hex: String = chars[i..i + 14]
                    .iter()
                    .filter(|c| c.is_ascii_hexdigit())
                    .collect();
                if let Some(color) = Color::from_hex(&hex) {
                    flush(&mut doc, &mut buf, state);
                    state.color = Some(color);
                    state.styles.clear();
                    i += 14;
                    continue;
                }
            }
            if let Some(named) = NamedColor::from_code(code) {
                flush(&mut doc, &mut buf, state);
                state.color = Some(Color::Named(named));
                state.styles.clear();
                i += 2;
                continue;
            }
            if code.eq_ignore_ascii_case(&'r') {
                flush(&mut doc, &mut buf, state);
                state = SpanState::default();
                i += 2;
                continue;
            }
            let mut styles = state.styles;
            if styles.apply_code(code) {
                flush(&mut doc, &mut buf, state);
                state.styles = styles;
                i += 2;
                continue;
            }
        }
        buf.push(chars[i]);
        i += 1;
    }
    flush(&mut doc, &mut buf, state);
    if doc.spans.is_empty() && !input.is_empty() {
        doc.push(Span::text(input));
    }
    doc
}

fn is_rgb_run(chars: &[char]) -> bool {
    chars.len() == 14
        && chars[0] == APPLIED_MARKER
        && chars[1] == 'x'
        && chars.chunks(2).skip(1).all(|pair| {
            pair.len() == 2 && pair[0] == APPLIED_MARKER && pair[1].is_ascii_hexdigit()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_colors_and_styles() {
        let doc = parse_tags("<reset><red>Hello <bold>World").unwrap();
        assert_eq!(doc.spans.len(), 2);
        assert_eq!(doc.spans[0].text, "Hello ");
        assert_eq!(doc.spans[0].color, Some(Color::Named(NamedColor::Red)));
        assert!(doc.spans[1].styles.bold);
        assert_eq!(doc.spans[1].color, Some(Color::Named(NamedColor::Red)));
    }

    #[test]
    fn color_clears_styles() {
        let doc = parse_tags("<bold>a<green>b").unwrap();
        assert!(doc.spans[0].styles.bold);
        assert!(doc.spans[1].styles.is_empty());
        assert_eq!(doc.spans[1].color, Some(Color::Named(NamedColor::Green)));
    }

    #[test]
    fn unknown_tags_stay_literal() {
        let doc = parse_tags("hello <LAVAND> world").unwrap();
        assert_eq!(doc.plain_text(), "hello <LAVAND> world");
    }

    #[test]
    fn unterminated_angle_is_literal() {
        let doc = parse_tags("a < b").unwrap();
        assert_eq!(doc.plain_text(), "a < b");
    }

    #[test]
    fn hex_tag_sets_rgb() {
        let doc = parse_tags("<#00ff00>World").unwrap();
        assert_eq!(doc.spans[0].color, Some(Color::Rgb(0, 255, 0)));
    }

    #[test]
    fn closing_style_tag_turns_flag_off() {
        let doc = parse_tags("<bold>a</bold>b").unwrap();
        assert!(doc.spans[0].styles.bold);
        assert!(doc.spans[1].styles.is_empty());
    }

    #[test]
    fn wrapper_becomes_interactive_span() {
        let doc =
            parse_tags("see <hover:show_text:'tip'><click:run_command:'/cmd'>this</click></hover>")
                .unwrap();
        assert_eq!(doc.spans.len(), 2);
        let span = &doc.spans[1];
        assert_eq!(span.text, "this");
        assert_eq!(span.click, Some(ClickAction::RunCommand("/cmd".into())));
        assert_eq!(span.hover.as_ref().map(|h| h.plain_text()), Some("tip".into()));
    }

    #[test]
    fn doubled_quotes_unescape_in_wrapper_parts() {
        let doc = parse_tags(
            "<hover:show_text:'it''s a tip'><click:run_command:'/say it''s'>x</click></hover>",
        )
        .unwrap();
        let span = &doc.spans[0];
        assert_eq!(span.hover.as_ref().map(|h| h.plain_text()), Some("it's a tip".into()));
        assert_eq!(span.click, Some(ClickAction::RunCommand("/say it's".into())));
    }

    #[test]
    fn legacy_parse_reads_applied_codes() {
        let doc = parse_legacy("§cHello §lWorld");
        assert_eq!(doc.spans.len(), 2);
        assert_eq!(doc.spans[0].color, Some(Color::Named(NamedColor::Red)));
        assert!(doc.spans[1].styles.bold);
    }

    #[test]
    fn legacy_parse_reads_rgb_runs() {
        let doc = parse_legacy("§x§0§0§f§f§0§0hi");
        assert_eq!(doc.spans[0].color, Some(Color::Rgb(0, 255, 0)));
        assert_eq!(doc.spans[0].text, "hi");
    }

    #[test]
    fn legacy_parse_of_plain_text_is_single_span() {
        let doc = parse_legacy("just words");
        assert_eq!(doc.spans.len(), 1);
        assert_eq!(doc.spans[0].text, "just words");
    }
}
