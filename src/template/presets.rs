//! Preset chat colors with token-aware application.

use regex::Regex;
use uuid::Uuid;

use crate::config::{ChatColorConfig, ColorPreset, PreviewConfig};
use crate::providers::PermissionProvider;

/// Presets the sender may select, in declaration order.
pub fn available<'a>(
    config: &'a ChatColorConfig,
    permissions: &dyn PermissionProvider,
    sender: Uuid,
) -> Vec<&'a ColorPreset> {
    if !config.enabled {
        return Vec::new();
    }
    config
        .colors
        .iter()
        .filter(|preset| permissions.has_permission(sender, &preset.permission_node()))
        .collect()
}

/// Wrap un-tokenized runs of the message in the preset format. Configured
/// preview-token literals are left uncolored so they stay visually neutral
/// and machine-matchable.
pub(crate) fn apply(preset: &ColorPreset, previews: &PreviewConfig, message: &str) -> String {
    let literals: Vec<&String> = previews
        .tokens
        .item
        .iter()
        .chain(previews.tokens.inventory.iter())
        .filter(|literal| !literal.is_empty())
        .collect();
    if literals.is_empty() {
        return format!("{}{}", preset.format, message);
    }

    let alternation = literals
        .iter()
        .map(|literal| regex::escape(literal))
        .collect::<Vec<_>>()
        .join("|");
    let Ok(pattern) = Regex::new(&format!("(?i)({alternation})")) else {
        return format!("{}{}", preset.format, message);
    };

    let mut out = String::new();
    let mut last = 0;
    for found in pattern.find_iter(message) {
        let before = &message[last..found.start()];
        if !before.is_empty() {
            out.push_str(&preset.format);
            out.push_str(before);
        }
        out.push_str(found.as_str());
        last = found.end();
    }
    if last == 0 {
        return format!("{}{}", preset.format, message);
    }
    let tail = &message[last..];
    if !tail.is_empty() {
        out.push_str(&preset.format);
        out.push_str(tail);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn preset() -> ColorPreset {
        ColorPreset {
            name: "red".to_string(),
            format: "&c".to_string(),
            permission: None,
            display_name: None,
        }
    }

    #[test]
    fn whole_message_is_colored_without_tokens() {
        let out = apply(&preset(), &PreviewConfig::default(), "hello there");
        assert_eq!(out, "&chello there");
    }

    #[test]
    fn token_literals_stay_uncolored() {
        let out = apply(&preset(), &PreviewConfig::default(), "check [item] out");
        assert_eq!(out, "&ccheck [item]&c out");
    }

    #[test]
    fn token_matching_is_case_insensitive() {
        let out = apply(&preset(), &PreviewConfig::default(), "[ITEM] first");
        assert_eq!(out, "[ITEM]&c first");
    }

    #[test]
    fn adjacent_tokens_color_nothing_between() {
        let out = apply(&preset(), &PreviewConfig::default(), "[item][inv]");
        assert_eq!(out, "[item][inv]");
    }

    #[test]
    fn available_filters_by_permission() {
        struct OnlyRed;

        impl PermissionProvider for OnlyRed {
            fn primary_group(&self, _sender: Uuid) -> Option<String> {
                None
            }

            fn has_permission(&self, _sender: Uuid, node: &str) -> bool {
                node == "chat.color.red"
            }
        }

        let config = ChatColorConfig {
            enabled: true,
            colors: vec![
                preset(),
                ColorPreset {
                    name: "gold".to_string(),
                    format: "&6".to_string(),
                    permission: None,
                    display_name: None,
                },
            ],
        };
        let found = available(&config, &OnlyRed, Uuid::nil());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "red");
    }
}
