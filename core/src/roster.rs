//! Plain-data snapshots exchanged with whatever stores player profiles.

use serde::{Deserialize, Serialize};

use crate::EntitySpec;

/// Long-lived player record carried between matches.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    /// Display name of the player.
    pub name: String,
    /// Currency earned from match rewards, spent on upgrades.
    pub currency: u64,
    /// Number of matches won.
    pub rank: u32,
    /// Named heroes owned by the player, including their permanent upgrades.
    pub heroes: Vec<EntitySpec>,
}

/// Collection of profiles loaded or saved as one unit.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RosterSnapshot {
    /// Profiles in the roster.
    pub profiles: Vec<PlayerProfile>,
}
