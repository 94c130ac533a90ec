//! Interfaces to the external collaborators around the composition core.
//!
//! The core only reads through these traits; ownership of the underlying
//! state (permission backends, rosters, remote stores) stays with the host.

use uuid::Uuid;

use crate::error::SnapshotError;
use crate::snapshot::{PreviewPayload, SnapshotId};

/// Permission and group membership resolution.
pub trait PermissionProvider: Send + Sync {
    fn primary_group(&self, sender: Uuid) -> Option<String>;
    fn has_permission(&self, sender: Uuid, node: &str) -> bool;
}

/// External placeholder expansion. Implementations must be total; an
/// unavailable provider is a no-op passthrough.
pub trait PlaceholderExpander: Send + Sync {
    fn apply(&self, sender: Uuid, text: &str) -> String;
}

/// Passthrough used when no expansion service is installed.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPlaceholders;

impl PlaceholderExpander for NoopPlaceholders {
    fn apply(&self, _sender: Uuid, text: &str) -> String {
        text.to_string()
    }
}

/// An online recipient as seen by mention detection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Recipient {
    pub id: Uuid,
    pub name: String,
}

/// The set of currently online recipients.
pub trait RosterProvider: Send + Sync {
    fn online_recipients(&self) -> Vec<Recipient>;
}

/// A fixed roster, useful for hosts with static member lists and for tests.
#[derive(Debug, Default, Clone)]
pub struct StaticRoster(pub Vec<Recipient>);

impl RosterProvider for StaticRoster {
    fn online_recipients(&self) -> Vec<Recipient> {
        self.0.clone()
    }
}

/// Externally owned storage for preview snapshots. Every stored payload gets
/// a fresh single-use identifier; expiry policy belongs to the store.
pub trait SnapshotStore: Send + Sync {
    fn store(&self, payload: PreviewPayload, owner: &str) -> Result<SnapshotId, SnapshotError>;
    fn get(&self, id: &SnapshotId) -> Option<PreviewPayload>;
}
