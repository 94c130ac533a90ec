//! Configuration snapshot types.
//!
//! A `ChatConfig` is loaded once per reload event, validated as a whole, and
//! installed atomically through a [`ConfigHandle`]; composition in flight
//! keeps the snapshot it started with.

use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::codec;
use crate::error::{ChatResult, ConfigError};
use crate::preview::{TokenCategory, TokenRule};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ChatConfig {
    pub format: FormatConfig,
    pub mention: MentionConfig,
    pub chatcolor: ChatColorConfig,
    pub emoji: EmojiConfig,
    pub previews: PreviewConfig,
    /// Suggested on click when a message carries no specific interactivity.
    pub reply_command: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        ChatConfig {
            format: FormatConfig::default(),
            mention: MentionConfig::default(),
            chatcolor: ChatColorConfig::default(),
            emoji: EmojiConfig::default(),
            previews: PreviewConfig::default(),
            reply_command: "/msg {name} ".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct FormatConfig {
    pub enabled: bool,
    /// The global default template; groups override it.
    pub default: String,
    pub hover: HoverConfig,
    /// Declaration order is the permission-fallback order.
    pub groups: Vec<GroupFormat>,
}

impl Default for FormatConfig {
    fn default() -> Self {
        FormatConfig {
            enabled: true,
            default: "&7{name}: &f{message}".to_string(),
            hover: HoverConfig::default(),
            groups: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct GroupFormat {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hover: Option<HoverConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct HoverConfig {
    pub enabled: bool,
    pub lines: Vec<String>,
}

impl Default for HoverConfig {
    fn default() -> Self {
        HoverConfig {
            enabled: true,
            lines: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct MentionConfig {
    pub enabled: bool,
    /// Highlight color sequence prefixed to `@name`.
    pub color: String,
    /// Also highlight bare names (word-bounded), not just `@name`.
    pub by_name: bool,
}

impl Default for MentionConfig {
    fn default() -> Self {
        MentionConfig {
            enabled: true,
            color: "&6".to_string(),
            by_name: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ChatColorConfig {
    pub enabled: bool,
    pub colors: Vec<ColorPreset>,
}

impl Default for ChatColorConfig {
    fn default() -> Self {
        ChatColorConfig {
            enabled: true,
            colors: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ColorPreset {
    pub name: String,
    /// Dialect sequence applied before each colored run, e.g. `&c`.
    pub format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl Default for ColorPreset {
    fn default() -> Self {
        ColorPreset {
            name: String::new(),
            format: "&f".to_string(),
            permission: None,
            display_name: None,
        }
    }
}

impl ColorPreset {
    /// The permission node guarding this preset.
    pub fn permission_node(&self) -> String {
        self.permission
            .clone()
            .unwrap_or_else(|| format!("chat.color.{}", self.name))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct EmojiConfig {
    pub enabled: bool,
    pub emojis: Vec<EmojiRule>,
}

impl Default for EmojiConfig {
    fn default() -> Self {
        EmojiConfig {
            enabled: true,
            emojis: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct EmojiRule {
    pub aliases: Vec<String>,
    pub replacement: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PreviewConfig {
    pub enabled: bool,
    /// Command stem for preview click actions (`{command} viewitem <id>`).
    pub command: String,
    pub tokens: TokenConfig,
    pub item: ItemPreviewConfig,
    pub inventory: InventoryPreviewConfig,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        PreviewConfig {
            enabled: true,
            command: "/chat".to_string(),
            tokens: TokenConfig::default(),
            item: ItemPreviewConfig::default(),
            inventory: InventoryPreviewConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TokenConfig {
    pub item: Vec<String>,
    pub inventory: Vec<String>,
}

impl Default for TokenConfig {
    fn default() -> Self {
        TokenConfig {
            item: vec!["[item]".to_string(), "[i]".to_string()],
            inventory: vec!["[inventory]".to_string(), "[inv]".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ItemPreviewConfig {
    pub hover: String,
    pub label_template: String,
    pub empty_label: String,
}

impl Default for ItemPreviewConfig {
    fn default() -> Self {
        ItemPreviewConfig {
            hover: "&7Click to view {name}'s item".to_string(),
            label_template: "&7[&f{label}&7]".to_string(),
            empty_label: "&7[&eHold an item to show it&7]".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct InventoryPreviewConfig {
    pub hover: String,
    pub label_template: String,
}

impl Default for InventoryPreviewConfig {
    fn default() -> Self {
        InventoryPreviewConfig {
            hover: "&7Click to view {name}'s inventory".to_string(),
            label_template: "&7[&fInventory&7]".to_string(),
        }
    }
}

impl ChatConfig {
    /// Parse and validate a YAML snapshot. Token literals are lowercased so
    /// later matching is purely case-insensitive lookup.
    pub fn from_yaml_str(yaml: &str) -> ChatResult<ChatConfig> {
        let mut config: ChatConfig = serde_yaml::from_str(yaml)?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    fn normalize(&mut self) {
        for literal in self
            .previews
            .tokens
            .item
            .iter_mut()
            .chain(self.previews.tokens.inventory.iter_mut())
        {
            *literal = literal.to_lowercase();
        }
    }

    /// Check snapshot-wide invariants. A failed validation leaves any
    /// previously installed snapshot untouched.
    pub fn validate(&self) -> ChatResult<()> {
        if self.format.enabled && !self.format.default.contains("{message}") {
            return Err(ConfigError::DefaultFormatMissingMessage);
        }
        let mut seen_groups: Vec<&str> = Vec::new();
        for group in &self.format.groups {
            if seen_groups
                .iter()
                .any(|g| g.eq_ignore_ascii_case(&group.name))
            {
                return Err(ConfigError::DuplicateGroup {
                    group: group.name.clone(),
                });
            }
            seen_groups.push(&group.name);
            if let Some(format) = group.format.as_deref() {
                if !format.is_empty() && !format.contains("{message}") {
                    return Err(ConfigError::GroupFormatMissingMessage {
                        group: group.name.clone(),
                    });
                }
            }
        }

        let mut seen_presets: Vec<&str> = Vec::new();
        for preset in &self.chatcolor.colors {
            if seen_presets
                .iter()
                .any(|p| p.eq_ignore_ascii_case(&preset.name))
            {
                return Err(ConfigError::DuplicatePreset {
                    name: preset.name.clone(),
                });
            }
            seen_presets.push(&preset.name);
            if preset.format.is_empty() {
                return Err(ConfigError::EmptyPresetFormat {
                    name: preset.name.clone(),
                });
            }
            if !codec::strip(&preset.format).is_empty() {
                return Err(ConfigError::InvalidPresetFormat {
                    name: preset.name.clone(),
                    format: preset.format.clone(),
                });
            }
        }

        validate_tokens("item", &self.previews.tokens.item)?;
        validate_tokens("inventory", &self.previews.tokens.inventory)?;

        if self.mention.enabled && !codec::strip(&self.mention.color).is_empty() {
            return Err(ConfigError::InvalidMentionColor {
                color: self.mention.color.clone(),
            });
        }
        Ok(())
    }

    /// The configured token rules, category by category.
    pub fn token_rules(&self) -> Vec<TokenRule> {
        self.previews.token_rules()
    }
}

impl PreviewConfig {
    /// The configured token rules, category by category.
    pub fn token_rules(&self) -> Vec<TokenRule> {
        vec![
            TokenRule {
                category: TokenCategory::Item,
                literals: self.tokens.item.clone(),
            },
            TokenRule {
                category: TokenCategory::Inventory,
                literals: self.tokens.inventory.clone(),
            },
        ]
    }
}

fn validate_tokens(category: &str, literals: &[String]) -> ChatResult<()> {
    let mut seen: Vec<&str> = Vec::new();
    for literal in literals {
        if literal.is_empty() {
            return Err(ConfigError::EmptyToken {
                category: category.to_string(),
            });
        }
        if seen.contains(&literal.as_str()) {
            return Err(ConfigError::DuplicateToken {
                token: literal.clone(),
                category: category.to_string(),
            });
        }
        seen.push(literal);
    }
    Ok(())
}

/// Atomically swappable configuration snapshot.
///
/// Readers clone the current `Arc` and keep composing against it even while
/// a reload installs a new snapshot.
#[derive(Debug, Default)]
pub struct ConfigHandle {
    inner: RwLock<Arc<ChatConfig>>,
}

impl ConfigHandle {
    pub fn new(config: ChatConfig) -> ConfigHandle {
        ConfigHandle {
            inner: RwLock::new(Arc::new(config)),
        }
    }

    /// The currently installed snapshot.
    pub fn current(&self) -> Arc<ChatConfig> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Swap in a new snapshot. In-flight composition against the previous
    /// snapshot runs to completion unaffected.
    pub fn install(&self, config: ChatConfig) {
        let groups = config.format.groups.len();
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(config);
        info!(groups, "installed configuration snapshot");
    }
}
