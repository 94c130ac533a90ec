//! Preview token expansion.
//!
//! Operates on the plain-text projection of an already-parsed document;
//! parsing first keeps item names containing dialect sigils from corrupting
//! interactive spans. Every matched occurrence mints its own snapshot id;
//! replacements are never rescanned, and tokens inside spans that are
//! already interactive never match.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::codec;
use crate::config::PreviewConfig;
use crate::document::{ClickAction, Document, Span};
use crate::providers::{PlaceholderExpander, SnapshotStore};
use crate::snapshot::{ItemSnapshot, PreviewPayload, SnapshotId};
use crate::template::TemplateContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenCategory {
    Item,
    Inventory,
}

/// A configured token category and its (lowercased) literals.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenRule {
    pub category: TokenCategory,
    pub literals: Vec<String>,
}

/// A minted preview, exposed so a delivery collaborator with an alternate
/// legacy transport can bridge the same id and label.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewRef {
    pub id: SnapshotId,
    pub category: TokenCategory,
    pub label: String,
}

/// Expand every configured token occurrence in `document` into an
/// interactive preview span.
pub fn expand(
    document: Document,
    config: &PreviewConfig,
    ctx: &TemplateContext,
    placeholders: &dyn PlaceholderExpander,
    store: &dyn SnapshotStore,
) -> (Document, Vec<PreviewRef>) {
    if !config.enabled {
        return (document, Vec::new());
    }
    let mut refs = Vec::new();
    let mut document = document;
    for rule in &config.token_rules() {
        document = expand_rule(document, rule, config, ctx, placeholders, store, &mut refs);
    }
    (document, refs)
}

fn expand_rule(
    document: Document,
    rule: &TokenRule,
    config: &PreviewConfig,
    ctx: &TemplateContext,
    placeholders: &dyn PlaceholderExpander,
    store: &dyn SnapshotStore,
    refs: &mut Vec<PreviewRef>,
) -> Document {
    let mut out = Document::default();
    let mut pending: VecDeque<Span> = document.spans.into();
    while let Some(span) = pending.pop_front() {
        if span.is_interactive() {
            out.push(span);
            continue;
        }
        let hit = rule
            .literals
            .iter()
            .filter_map(|literal| {
                find_ascii_ci(&span.text, literal).map(|pos| (pos, literal.len()))
            })
            .min_by_key(|&(pos, _)| pos);
        let Some((pos, len)) = hit else {
            out.push(span);
            continue;
        };

        let before = &span.text[..pos];
        if !before.is_empty() {
            out.push(Span {
                text: before.to_string(),
                hover: None,
                click: None,
                ..span.clone()
            });
        }
        for replacement in
            build_replacement(rule.category, config, ctx, placeholders, store, refs)
        {
            out.push(replacement);
        }
        // scanning continues after the replacement's end offset
        let after = &span.text[pos + len..];
        if !after.is_empty() {
            pending.push_front(Span {
                text: after.to_string(),
                hover: None,
                click: None,
                ..span.clone()
            });
        }
    }
    out
}

/// ASCII-case-insensitive literal search. Token literals are lowercase ASCII
/// by configuration contract; span text may be arbitrary UTF-8.
fn find_ascii_ci(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    (0..=h.len() - n.len())
        .find(|&i| haystack.is_char_boundary(i) && h[i..i + n.len()].eq_ignore_ascii_case(n))
}

fn build_replacement(
    category: TokenCategory,
    config: &PreviewConfig,
    ctx: &TemplateContext,
    placeholders: &dyn PlaceholderExpander,
    store: &dyn SnapshotStore,
    refs: &mut Vec<PreviewRef>,
) -> Vec<Span> {
    let (payload, label_source, hover_template, verb) = match category {
        TokenCategory::Item => match held_item(ctx) {
            Some(item) => (
                PreviewPayload::Item(item.clone()),
                config.item.label_template.replace("{label}", &item_label(item)),
                config.item.hover.as_str(),
                "viewitem",
            ),
            // empty hand: neutral label, no id minted, no interactivity
            None => return codec::translate(&config.item.empty_label).spans,
        },
        TokenCategory::Inventory => match &ctx.inventory {
            Some(inventory) => (
                PreviewPayload::Inventory(inventory.clone()),
                config.inventory.label_template.clone(),
                config.inventory.hover.as_str(),
                "viewinv",
            ),
            None => return codec::translate(&config.inventory.label_template).spans,
        },
    };

    let label = codec::translate(&label_source);
    let id = match store.store(payload, &ctx.name) {
        Ok(id) => id,
        Err(err) => {
            // degrade this occurrence to a plain label, keep composing
            warn!(error = %err, "snapshot store failed, preview degrades to plain label");
            return label.spans;
        }
    };

    let hover_text = codec::strip(&placeholders.apply(
        ctx.sender,
        &ctx.substitute_statics(hover_template),
    ));
    let hover = Document::text(hover_text);
    let command = format!("{} {} {}", config.command, verb, id);

    refs.push(PreviewRef {
        id,
        category,
        label: label.plain_text(),
    });

    label
        .with_hover_where_absent(hover)
        .with_click_where_absent(ClickAction::RunCommand(command))
        .spans
}

fn held_item(ctx: &TemplateContext) -> Option<&ItemSnapshot> {
    ctx.held_item.as_ref().filter(|item| item.amount > 0)
}

/// Label text for a held item: sanitized name, with the stack count
/// appended for stacks larger than one.
fn item_label(item: &ItemSnapshot) -> String {
    let name: String = item
        .name
        .chars()
        .filter(|c| *c != '<' && *c != '>')
        .collect();
    if item.amount > 1 {
        format!("{} &bx{}", name, item.amount)
    } else {
        name
    }
}
