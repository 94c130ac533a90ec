//! @mention detection and highlighting.
//!
//! Compiled per-recipient patterns are cached for concurrent reuse across
//! messages; a roster change clears the whole cache rather than mutating
//! entries in place.

use dashmap::DashMap;
use regex::{NoExpand, Regex};

use crate::config::MentionConfig;
use crate::providers::{Recipient, RosterProvider};

/// Lazily populated per-name pattern cache.
#[derive(Debug, Default)]
pub struct MentionPatterns {
    at: DashMap<String, Regex>,
    named: DashMap<String, Regex>,
}

impl MentionPatterns {
    pub fn new() -> MentionPatterns {
        MentionPatterns::default()
    }

    /// Clear all cached patterns (call on roster change).
    pub fn invalidate(&self) {
        self.at.clear();
        self.named.clear();
    }

    fn at_pattern(&self, name: &str) -> Regex {
        self.at
            .entry(name.to_string())
            .or_insert_with(|| {
                Regex::new(&format!("(?i)@{}", regex::escape(name))).unwrap()
            })
            .clone()
    }

    /// Matches `@name` or a word-bounded bare `name`, so one substitution
    /// pass can highlight either form without re-wrapping its own output.
    fn named_pattern(&self, name: &str) -> Regex {
        self.named
            .entry(name.to_string())
            .or_insert_with(|| {
                Regex::new(&format!(r"(?i)@?\b{}\b", regex::escape(name))).unwrap()
            })
            .clone()
    }

    /// Rewrite mentions of online recipients into `{color}@Name&r`.
    pub fn highlight(
        &self,
        config: &MentionConfig,
        roster: &dyn RosterProvider,
        message: &str,
    ) -> String {
        if !config.enabled || message.is_empty() {
            return message.to_string();
        }
        let mut result = message.to_string();
        for recipient in roster.online_recipients() {
            let replacement = format!("{}@{}&r", config.color, recipient.name);
            let pattern = if config.by_name {
                self.named_pattern(&recipient.name)
            } else {
                self.at_pattern(&recipient.name)
            };
            result = pattern
                .replace_all(&result, NoExpand(&replacement))
                .into_owned();
        }
        result
    }

    /// The recipients a raw message mentions, for the delivery layer's
    /// notification effects (sounds, titles).
    pub fn mentioned(
        &self,
        config: &MentionConfig,
        roster: &dyn RosterProvider,
        raw_message: &str,
    ) -> Vec<Recipient> {
        if !config.enabled || raw_message.is_empty() {
            return Vec::new();
        }
        let lower = raw_message.to_lowercase();
        roster
            .online_recipients()
            .into_iter()
            .filter(|recipient| {
                let at_needle = format!("@{}", recipient.name.to_lowercase());
                lower.contains(&at_needle)
                    || (config.by_name
                        && self.named_pattern(&recipient.name).is_match(raw_message))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::StaticRoster;
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn roster(names: &[&str]) -> StaticRoster {
        StaticRoster(
            names
                .iter()
                .map(|name| Recipient {
                    id: Uuid::new_v4(),
                    name: name.to_string(),
                })
                .collect(),
        )
    }

    fn config() -> MentionConfig {
        MentionConfig {
            enabled: true,
            color: "&6".to_string(),
            by_name: true,
        }
    }

    #[test]
    fn at_mention_is_highlighted() {
        let patterns = MentionPatterns::new();
        let out = patterns.highlight(&config(), &roster(&["Tom"]), "hi @tom!");
        assert_eq!(out, "hi &6@Tom&r!");
    }

    #[test]
    fn bare_name_is_highlighted_when_enabled() {
        let patterns = MentionPatterns::new();
        let out = patterns.highlight(&config(), &roster(&["Tom"]), "hi tom");
        assert_eq!(out, "hi &6@Tom&r");
    }

    #[test]
    fn partial_words_are_not_highlighted() {
        let patterns = MentionPatterns::new();
        let out = patterns.highlight(&config(), &roster(&["Tom"]), "tomato soup");
        assert_eq!(out, "tomato soup");
    }

    #[test]
    fn at_form_is_not_double_wrapped() {
        let patterns = MentionPatterns::new();
        let out = patterns.highlight(&config(), &roster(&["Tom"]), "@Tom");
        assert_eq!(out, "&6@Tom&r");
    }

    #[test]
    fn mentioned_finds_targets() {
        let patterns = MentionPatterns::new();
        let found = patterns.mentioned(&config(), &roster(&["Tom", "Ann"]), "ping @ann");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Ann");
    }

    #[test]
    fn invalidate_clears_the_cache() {
        let patterns = MentionPatterns::new();
        patterns.highlight(&config(), &roster(&["Tom"]), "tom");
        assert!(!patterns.named.is_empty());
        patterns.invalidate();
        assert!(patterns.named.is_empty());
    }
}
