//! Per-recipient template selection and ordered message substitution.

pub mod context;
mod emoji;
pub mod mention;
pub mod presets;

pub use context::{TemplateContext, Transport};
pub use mention::MentionPatterns;

use tracing::debug;

use crate::codec;
use crate::config::{ChatConfig, GroupFormat, HoverConfig};
use crate::document::Document;
use crate::providers::{PermissionProvider, PlaceholderExpander, RosterProvider};

/// Permission to keep color/style dialects in the message body.
pub const COLOR_PERMISSION: &str = "chat.chatcolor";
/// Permission gating external placeholder expansion of the message body.
pub const PLACEHOLDER_PERMISSION: &str = "chat.placeholders";

/// Resolves the per-recipient template and performs the ordered
/// substitutions. Pure over its borrowed inputs.
pub struct TemplateEngine<'a> {
    config: &'a ChatConfig,
    permissions: &'a dyn PermissionProvider,
    placeholders: &'a dyn PlaceholderExpander,
    roster: &'a dyn RosterProvider,
    mentions: &'a MentionPatterns,
}

impl<'a> TemplateEngine<'a> {
    pub fn new(
        config: &'a ChatConfig,
        permissions: &'a dyn PermissionProvider,
        placeholders: &'a dyn PlaceholderExpander,
        roster: &'a dyn RosterProvider,
        mentions: &'a MentionPatterns,
    ) -> TemplateEngine<'a> {
        TemplateEngine {
            config,
            permissions,
            placeholders,
            roster,
            mentions,
        }
    }

    /// Render the dialect-mixed string for this message, ready for the
    /// codec. Substitution order is load-bearing: placeholder expansion,
    /// color gate/preset, emoji, mentions, statics, template assembly.
    pub fn render(&self, ctx: &TemplateContext, raw_message: &str) -> String {
        let template = if self.config.format.enabled {
            self.format_for(ctx)
        } else {
            // formatting disabled: the message passes through unframed
            "{message}"
        };

        let mut message = raw_message.to_string();
        if self
            .permissions
            .has_permission(ctx.sender, PLACEHOLDER_PERMISSION)
        {
            message = self.placeholders.apply(ctx.sender, &message);
        }

        // color stripping runs after expansion so placeholder-injected
        // styling is stripped too
        if !self.permissions.has_permission(ctx.sender, COLOR_PERMISSION) {
            message = codec::strip(&message);
        } else if let Some(preset) = self.selected_preset(ctx) {
            message = presets::apply(preset, &self.config.previews, &message);
        }

        message = emoji::apply(&self.config.emoji, &message);
        message = self
            .mentions
            .highlight(&self.config.mention, self.roster, &message);
        message = ctx.substitute_statics(&message);

        let rendered = template.replace("{message}", &message);
        let rendered = ctx.substitute_statics(&rendered);
        self.placeholders.apply(ctx.sender, &rendered)
    }

    /// Build the hover tooltip document for this sender, if the resolved
    /// hover block is enabled and non-empty. Hover lines get statics and
    /// placeholder expansion but no recoloring or token protection.
    pub fn render_hover(&self, ctx: &TemplateContext, raw_message: &str) -> Option<Document> {
        let hover = self.hover_for(ctx);
        if !hover.enabled || hover.lines.is_empty() {
            return None;
        }
        let joined = hover.lines.join("\n").replace("{message}", raw_message);
        let joined = ctx.substitute_statics(&joined);
        let expanded = self.placeholders.apply(ctx.sender, &joined);
        let doc = codec::translate(&expanded);
        if doc.is_empty() {
            None
        } else {
            Some(doc)
        }
    }

    /// Template priority: exact case-insensitive primary-group match, first
    /// declared group whose permission the sender holds, global default. A
    /// matched group without a usable format falls through to the next
    /// candidate rather than erroring.
    fn format_for(&self, ctx: &TemplateContext) -> &str {
        if let Some(group) = self.resolve_group(ctx) {
            if let Some(format) = group.format.as_deref().filter(|f| !f.is_empty()) {
                return format;
            }
            debug!(group = %group.name, "group has no format, falling through");
        }
        for group in &self.config.format.groups {
            let Some(permission) = group.permission.as_deref().filter(|p| !p.is_empty()) else {
                continue;
            };
            if self.permissions.has_permission(ctx.sender, permission) {
                if let Some(format) = group.format.as_deref().filter(|f| !f.is_empty()) {
                    debug!(group = %group.name, "matched group by permission");
                    return format;
                }
            }
        }
        &self.config.format.default
    }

    fn hover_for(&self, ctx: &TemplateContext) -> &HoverConfig {
        if let Some(group) = self.resolve_group(ctx) {
            if let Some(hover) = group.hover.as_ref() {
                return hover;
            }
        }
        &self.config.format.hover
    }

    fn resolve_group(&self, ctx: &TemplateContext) -> Option<&GroupFormat> {
        let primary = ctx
            .primary_group
            .clone()
            .or_else(|| self.permissions.primary_group(ctx.sender));
        if let Some(primary) = primary {
            if let Some(group) = self
                .config
                .format
                .groups
                .iter()
                .find(|group| group.name.eq_ignore_ascii_case(&primary))
            {
                debug!(group = %group.name, "matched primary group");
                return Some(group);
            }
            debug!(%primary, "primary group has no configured entry");
        }
        None
    }

    fn selected_preset(&self, ctx: &TemplateContext) -> Option<&crate::config::ColorPreset> {
        if !self.config.chatcolor.enabled {
            return None;
        }
        let name = ctx.preset.as_deref()?;
        let preset = self
            .config
            .chatcolor
            .colors
            .iter()
            .find(|preset| preset.name.eq_ignore_ascii_case(name))?;
        // a selection whose permission was since revoked is ignored
        if !self
            .permissions
            .has_permission(ctx.sender, &preset.permission_node())
        {
            return None;
        }
        Some(preset)
    }
}
