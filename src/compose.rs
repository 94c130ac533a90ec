//! Top-level message composition.
//!
//! Orchestrates template rendering, codec parsing, preview expansion and
//! default affordances, producing the structured document plus the legacy
//! fallback string. One call per outgoing message; pure over its inputs.

use std::sync::Arc;

use crate::codec;
use crate::config::ChatConfig;
use crate::document::{ClickAction, Document};
use crate::preview::{self, PreviewRef};
use crate::providers::{PermissionProvider, PlaceholderExpander, RosterProvider, SnapshotStore};
use crate::template::{MentionPatterns, TemplateContext, TemplateEngine};

/// Both renditions of one composed message, ready for dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedMessage {
    pub document: Document,
    /// Applied-code serialization for clients without structural tags.
    /// Interactive spans degrade to their label text here; `previews`
    /// carries the ids for hosts with an alternate interactive transport.
    pub legacy: String,
    pub plain: String,
    pub previews: Vec<PreviewRef>,
}

/// Composes outgoing chat messages against one configuration snapshot.
pub struct MessageComposer<'a> {
    config: Arc<ChatConfig>,
    permissions: &'a dyn PermissionProvider,
    placeholders: &'a dyn PlaceholderExpander,
    roster: &'a dyn RosterProvider,
    store: &'a dyn SnapshotStore,
    mentions: &'a MentionPatterns,
}

impl<'a> MessageComposer<'a> {
    pub fn new(
        config: Arc<ChatConfig>,
        permissions: &'a dyn PermissionProvider,
        placeholders: &'a dyn PlaceholderExpander,
        roster: &'a dyn RosterProvider,
        store: &'a dyn SnapshotStore,
        mentions: &'a MentionPatterns,
    ) -> MessageComposer<'a> {
        MessageComposer {
            config,
            permissions,
            placeholders,
            roster,
            store,
            mentions,
        }
    }

    /// Compose one outgoing message. Never fails; malformed input degrades
    /// to reduced styling or interactivity.
    pub fn compose(&self, ctx: &TemplateContext, raw_message: &str) -> ComposedMessage {
        let engine = TemplateEngine::new(
            &self.config,
            self.permissions,
            self.placeholders,
            self.roster,
            self.mentions,
        );
        let rendered = engine.render(ctx, raw_message);
        let document = codec::translate(&rendered);
        let (mut document, previews) = preview::expand(
            document,
            &self.config.previews,
            ctx,
            self.placeholders,
            self.store,
        );

        // a document-wide default hover and reply suggestion apply only when
        // nothing in the message carries specific interactivity; specific
        // always wins over generic, never both
        if !has_specific_interactivity(&document) {
            if let Some(hover) = engine.render_hover(ctx, raw_message) {
                document = document.with_hover_where_absent(hover);
            }
            let reply = self.config.reply_command.replace("{name}", &ctx.name);
            document = document.with_click_where_absent(ClickAction::SuggestCommand(reply));
        }

        ComposedMessage {
            legacy: codec::to_legacy_string(&document),
            plain: document.plain_text(),
            previews,
            document,
        }
    }
}

/// Whether any span carries interactivity from protected structured input or
/// token expansion. A document-wide auto-linked URL does not count; the
/// default hover may still attach alongside it.
fn has_specific_interactivity(document: &Document) -> bool {
    document.spans.iter().any(|span| {
        span.hover.is_some() || matches!(span.click, Some(ClickAction::RunCommand(_)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{NoopPlaceholders, Recipient, StaticRoster};
    use crate::snapshot::{ItemSnapshot, MemorySnapshotStore};
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    struct AllPerms;

    impl PermissionProvider for AllPerms {
        fn primary_group(&self, _sender: Uuid) -> Option<String> {
            None
        }

        fn has_permission(&self, _sender: Uuid, _node: &str) -> bool {
            true
        }
    }

    struct NoPerms;

    impl PermissionProvider for NoPerms {
        fn primary_group(&self, _sender: Uuid) -> Option<String> {
            None
        }

        fn has_permission(&self, _sender: Uuid, _node: &str) -> bool {
            false
        }
    }

    fn fixture() -> (StaticRoster, MemorySnapshotStore, MentionPatterns) {
        (
            StaticRoster(vec![Recipient {
                id: Uuid::new_v4(),
                name: "Ann".to_string(),
            }]),
            MemorySnapshotStore::new(),
            MentionPatterns::new(),
        )
    }

    #[test]
    fn plain_message_gets_default_reply_click() {
        let (roster, store, mentions) = fixture();
        let composer = MessageComposer::new(
            Arc::new(ChatConfig::default()),
            &AllPerms,
            &NoopPlaceholders,
            &roster,
            &store,
            &mentions,
        );
        let ctx = TemplateContext::new(Uuid::nil(), "Tom");
        let composed = composer.compose(&ctx, "hello");
        assert_eq!(composed.plain, "Tom: hello");
        assert!(composed
            .document
            .spans
            .iter()
            .all(|s| s.click == Some(ClickAction::SuggestCommand("/msg Tom ".to_string()))));
    }

    #[test]
    fn token_expansion_suppresses_defaults() {
        let (roster, store, mentions) = fixture();
        let mut config = ChatConfig::default();
        config.format.hover.lines = vec!["&6{name}".to_string()];
        let composer = MessageComposer::new(
            Arc::new(config),
            &AllPerms,
            &NoopPlaceholders,
            &roster,
            &store,
            &mentions,
        );
        let mut ctx = TemplateContext::new(Uuid::nil(), "Tom");
        ctx.held_item = Some(ItemSnapshot {
            name: "Sword".to_string(),
            amount: 1,
        });
        let composed = composer.compose(&ctx, "look [item]");
        assert_eq!(composed.previews.len(), 1);
        // no span got the generic reply suggestion
        assert!(!composed
            .document
            .spans
            .iter()
            .any(|s| matches!(s.click, Some(ClickAction::SuggestCommand(_)))));
        // the non-token spans carry no hover either
        assert!(composed.document.spans[0].hover.is_none());
    }

    #[test]
    fn default_hover_attaches_when_nothing_is_interactive() {
        let (roster, store, mentions) = fixture();
        let mut config = ChatConfig::default();
        config.format.hover.lines = vec!["&6{name}".to_string()];
        let composer = MessageComposer::new(
            Arc::new(config),
            &AllPerms,
            &NoopPlaceholders,
            &roster,
            &store,
            &mentions,
        );
        let ctx = TemplateContext::new(Uuid::nil(), "Tom");
        let composed = composer.compose(&ctx, "hello");
        assert!(composed
            .document
            .spans
            .iter()
            .all(|s| s.hover.as_ref().map(|h| h.plain_text()) == Some("Tom".to_string())));
    }

    #[test]
    fn legacy_output_degrades_interactive_spans() {
        let (roster, store, mentions) = fixture();
        let composer = MessageComposer::new(
            Arc::new(ChatConfig::default()),
            &AllPerms,
            &NoopPlaceholders,
            &roster,
            &store,
            &mentions,
        );
        let mut ctx = TemplateContext::new(Uuid::nil(), "Tom");
        ctx.held_item = Some(ItemSnapshot {
            name: "Sword".to_string(),
            amount: 1,
        });
        let composed = composer.compose(&ctx, "look [item]");
        assert!(composed.legacy.contains("Sword"));
        assert!(!composed.legacy.contains("viewitem"));
        assert!(!composed.legacy.contains("hover"));
    }

    #[test]
    fn sender_without_color_permission_yields_uncolored_spans() {
        let (roster, store, mentions) = fixture();
        let mut config = ChatConfig::default();
        config.format.default = "{message}".to_string();
        config.chatcolor.colors = vec![crate::config::ColorPreset {
            name: "red".to_string(),
            format: "&c".to_string(),
            permission: None,
            display_name: None,
        }];
        let composer = MessageComposer::new(
            Arc::new(config),
            &NoPerms,
            &NoopPlaceholders,
            &roster,
            &store,
            &mentions,
        );
        let mut ctx = TemplateContext::new(Uuid::nil(), "Tom");
        ctx.preset = Some("red".to_string());
        let composed = composer.compose(&ctx, "&cred §lbold &#00ff00green #123456 bare");
        for span in &composed.document.spans {
            assert_eq!(span.color, None);
            assert!(span.styles.is_empty());
        }
    }

    #[test]
    fn end_to_end_two_dialect_message() {
        let (roster, store, mentions) = fixture();
        let mut config = ChatConfig::default();
        config.format.default = "{message}".to_string();
        let composer = MessageComposer::new(
            Arc::new(config),
            &AllPerms,
            &NoopPlaceholders,
            &roster,
            &store,
            &mentions,
        );
        let ctx = TemplateContext::new(Uuid::nil(), "Tom");
        let composed = composer.compose(&ctx, "&cHello &#00ff00World");
        assert_eq!(composed.plain, "Hello World");
        assert_eq!(composed.legacy, "§cHello §x§0§0§f§f§0§0World");
    }
}
