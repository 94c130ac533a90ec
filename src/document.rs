use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Style flags carried by a span.
///
/// An explicit color change clears all flags (the legacy "color resets
/// formatting" convention); styles set after the color survive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StyleSet {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub obfuscated: bool,
}

impl StyleSet {
    pub fn is_empty(&self) -> bool {
        !(self.bold || self.italic || self.underline || self.strikethrough || self.obfuscated)
    }

    pub fn clear(&mut self) {
        *self = StyleSet::default();
    }

    /// Set the flag for a legacy style code. Returns false for non-style codes.
    pub fn apply_code(&mut self, code: char) -> bool {
        match code.to_ascii_lowercase() {
            'k' => self.obfuscated = true,
            'l' => self.bold = true,
            'm' => self.strikethrough = true,
            'n' => self.underline = true,
            'o' => self.italic = true,
            _ => return false,
        }
        true
    }
}

/// An interactive click affordance attached to a span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickAction {
    OpenUrl(String),
    RunCommand(String),
    SuggestCommand(String),
}

/// A contiguous run of text sharing one color/style/interactivity state.
///
/// Invariant: `text` contains no live dialect escape sequences; styling is
/// always structural.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "StyleSet::is_empty")]
    pub styles: StyleSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hover: Option<Document>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub click: Option<ClickAction>,
}

impl Span {
    /// A plain, unstyled, non-interactive span.
    pub fn text(text: impl Into<String>) -> Span {
        Span {
            text: text.into(),
            color: None,
            styles: StyleSet::default(),
            hover: None,
            click: None,
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.hover.is_some() || self.click.is_some()
    }
}

/// An ordered sequence of spans. Built fresh per outgoing message and never
/// mutated after composition returns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub spans: Vec<Span>,
}

impl Document {
    /// A document holding a single literal span.
    pub fn text(text: impl Into<String>) -> Document {
        Document {
            spans: vec![Span::text(text)],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.spans.iter().all(|s| s.text.is_empty())
    }

    /// The concatenated span texts. Hover tooltips are not part of the
    /// projection.
    pub fn plain_text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    pub fn has_interactive(&self) -> bool {
        self.spans.iter().any(Span::is_interactive)
    }

    pub fn push(&mut self, span: Span) {
        self.spans.push(span);
    }

    /// Attach `action` to every span that has no click action of its own.
    pub fn with_click_where_absent(mut self, action: ClickAction) -> Document {
        for span in &mut self.spans {
            if span.click.is_none() {
                span.click = Some(action.clone());
            }
        }
        self
    }

    /// Attach `hover` to every span that has no hover document of its own.
    pub fn with_hover_where_absent(mut self, hover: Document) -> Document {
        for span in &mut self.spans {
            if span.hover.is_none() {
                span.hover = Some(hover.clone());
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::NamedColor;

    #[test]
    fn plain_text_concatenates_spans() {
        let mut doc = Document::default();
        doc.push(Span::text("Hello "));
        doc.push(Span {
            color: Some(Color::Named(NamedColor::Red)),
            ..Span::text("World")
        });
        assert_eq!(doc.plain_text(), "Hello World");
    }

    #[test]
    fn interactivity_is_detected() {
        let mut doc = Document::text("plain");
        assert!(!doc.has_interactive());
        doc.push(Span {
            click: Some(ClickAction::RunCommand("/chat viewitem abc".into())),
            ..Span::text("[item]")
        });
        assert!(doc.has_interactive());
    }

    #[test]
    fn default_click_does_not_overwrite() {
        let existing = ClickAction::OpenUrl("https://example.com".into());
        let mut doc = Document::text("a");
        doc.push(Span {
            click: Some(existing.clone()),
            ..Span::text("b")
        });
        let doc = doc.with_click_where_absent(ClickAction::SuggestCommand("/msg Tom ".into()));
        assert_eq!(
            doc.spans[0].click,
            Some(ClickAction::SuggestCommand("/msg Tom ".into()))
        );
        assert_eq!(doc.spans[1].click, Some(existing));
    }

    #[test]
    fn style_codes_map_to_flags() {
        let mut styles = StyleSet::default();
        assert!(styles.apply_code('L'));
        assert!(styles.apply_code('o'));
        assert!(!styles.apply_code('c'));
        assert!(styles.bold);
        assert!(styles.italic);
        assert!(!styles.underline);
    }
}
