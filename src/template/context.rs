use uuid::Uuid;

use crate::snapshot::{InventorySnapshot, ItemSnapshot};

/// Capability of the delivery transport for this message, negotiated once at
/// startup by the delivery collaborator. The core always produces both the
/// structured document and the legacy fallback; this flag lets glue code pick
/// without probing anything at runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Transport {
    #[default]
    Structured,
    Legacy,
}

/// Read-only per-message sender context.
#[derive(Debug, Clone)]
pub struct TemplateContext {
    pub sender: Uuid,
    pub name: String,
    pub display_name: String,
    pub world: String,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub health: f64,
    pub max_health: f64,
    pub ping: i32,
    /// Resolved chat prefix; empty when the sender has none.
    pub prefix: String,
    /// Resolved primary group, when the host pre-resolved it. The template
    /// engine falls back to the permission provider otherwise.
    pub primary_group: Option<String>,
    /// Selected preset-color name (persisted by the host), if any.
    pub preset: Option<String>,
    pub held_item: Option<ItemSnapshot>,
    pub inventory: Option<InventorySnapshot>,
    pub transport: Transport,
}

impl TemplateContext {
    /// A context with neutral defaults; hosts fill in what they track.
    pub fn new(sender: Uuid, name: impl Into<String>) -> TemplateContext {
        let name = name.into();
        TemplateContext {
            sender,
            display_name: name.clone(),
            name,
            world: "world".to_string(),
            x: 0,
            y: 0,
            z: 0,
            health: 20.0,
            max_health: 20.0,
            ping: 0,
            prefix: String::new(),
            primary_group: None,
            preset: None,
            held_item: None,
            inventory: None,
            transport: Transport::Structured,
        }
    }

    /// Substitute the static context placeholders.
    pub(crate) fn substitute_statics(&self, text: &str) -> String {
        text.replace("{name}", &self.name)
            .replace("{player}", &self.name)
            .replace("{display_name}", &self.display_name)
            .replace("{world}", &self.world)
            .replace("{x}", &self.x.to_string())
            .replace("{y}", &self.y.to_string())
            .replace("{z}", &self.z.to_string())
            .replace("{health}", &round_stat(self.health))
            .replace("{max_health}", &round_stat(self.max_health))
            .replace("{ping}", &self.ping.to_string())
            .replace("{prefix}", &self.prefix)
    }
}

fn round_stat(value: f64) -> String {
    (value.max(0.0).round() as i64).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn statics_substitute() {
        let mut ctx = TemplateContext::new(Uuid::nil(), "Tom");
        ctx.world = "nether".to_string();
        ctx.health = 19.6;
        ctx.ping = 42;
        let out = ctx.substitute_statics("{name} in {world} at {health}hp ({ping}ms)");
        assert_eq!(out, "Tom in nether at 20hp (42ms)");
    }

    #[test]
    fn negative_health_clamps_to_zero() {
        let mut ctx = TemplateContext::new(Uuid::nil(), "Tom");
        ctx.health = -3.0;
        assert_eq!(ctx.substitute_statics("{health}"), "0");
    }
}
