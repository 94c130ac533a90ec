//! Configurable emoji/alias literal replacement.

use crate::config::EmojiConfig;

/// Apply every configured alias, in declaration order. Replacement is a
/// case-sensitive literal substitution.
pub(crate) fn apply(config: &EmojiConfig, message: &str) -> String {
    if !config.enabled || config.emojis.is_empty() {
        return message.to_string();
    }
    let mut result = message.to_string();
    for rule in &config.emojis {
        for alias in &rule.aliases {
            if alias.is_empty() {
                continue;
            }
            result = result.replace(alias.as_str(), &rule.replacement);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmojiRule;
    use pretty_assertions::assert_eq;

    fn config() -> EmojiConfig {
        EmojiConfig {
            enabled: true,
            emojis: vec![EmojiRule {
                aliases: vec![":)".to_string(), ":smile:".to_string()],
                replacement: "\u{263A}".to_string(),
            }],
        }
    }

    #[test]
    fn aliases_map_to_the_same_replacement() {
        assert_eq!(apply(&config(), "hi :) and :smile:"), "hi \u{263A} and \u{263A}");
    }

    #[test]
    fn replacement_is_case_sensitive() {
        assert_eq!(apply(&config(), ":SMILE:"), ":SMILE:");
    }

    #[test]
    fn disabled_config_is_a_passthrough() {
        let mut config = config();
        config.enabled = false;
        assert_eq!(apply(&config, ":)"), ":)");
    }
}
