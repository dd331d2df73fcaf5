//! Gem selection: which inventory gems to activate after a hunt.
//!
//! [`select_gems`] is pure. Same inventory, needs, tiers and policy always give the same picks.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rarity tier. A gem's tier is its offset inside its slot's numeric range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GemTier {
    Common,
    Uncommon,
    Rare,
    Epic,
    Mythical,
    Legendary,
    Fabled,
}

impl GemTier {
    pub const ALL: [GemTier; 7] = [
        GemTier::Common,
        GemTier::Uncommon,
        GemTier::Rare,
        GemTier::Epic,
        GemTier::Mythical,
        GemTier::Legendary,
        GemTier::Fabled,
    ];

    fn offset(self) -> u32 {
        self as u32
    }

    fn from_offset(offset: u32) -> Option<Self> {
        Self::ALL.get(offset as usize).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GemTier::Common => "common",
            GemTier::Uncommon => "uncommon",
            GemTier::Rare => "rare",
            GemTier::Epic => "epic",
            GemTier::Mythical => "mythical",
            GemTier::Legendary => "legendary",
            GemTier::Fabled => "fabled",
        }
    }
}

impl fmt::Display for GemTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GemTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| format!("unknown gem tier '{}'", s))
    }
}

/// One need slot and its category of gem ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GemSlot {
    /// 051-057, marker `gem1`.
    Hunting,
    /// 065-071, marker `gem3`.
    Empowering,
    /// 072-078, marker `gem4`.
    Lucky,
    /// 079-085, marker `star`.
    Special,
}

impl GemSlot {
    pub const ALL: [GemSlot; 4] = [
        GemSlot::Hunting,
        GemSlot::Empowering,
        GemSlot::Lucky,
        GemSlot::Special,
    ];

    pub fn base(self) -> u32 {
        match self {
            GemSlot::Hunting => 51,
            GemSlot::Empowering => 65,
            GemSlot::Lucky => 72,
            GemSlot::Special => 79,
        }
    }

    /// Text the hunt reply contains when this slot is already active.
    pub fn marker(self) -> &'static str {
        match self {
            GemSlot::Hunting => "gem1",
            GemSlot::Empowering => "gem3",
            GemSlot::Lucky => "gem4",
            GemSlot::Special => "star",
        }
    }

    /// Tier of `id` if it falls in this slot's category.
    pub fn tier_of(self, id: u32) -> Option<GemTier> {
        id.checked_sub(self.base()).and_then(GemTier::from_offset)
    }

    pub fn id_for(self, tier: GemTier) -> u32 {
        self.base() + tier.offset()
    }
}

/// Which extremum to pick inside a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GemPolicy {
    #[default]
    Off,
    Max,
    Min,
}

/// Slots still unsatisfied after the latest hunt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GemNeeds {
    pub hunting: bool,
    pub empowering: bool,
    pub lucky: bool,
    pub special: bool,
}

impl GemNeeds {
    /// A slot is needed when its marker is absent. The special slot counts only if `use_special`.
    pub fn from_hunt_reply(text: &str, use_special: bool) -> Self {
        Self {
            hunting: !text.contains(GemSlot::Hunting.marker()),
            empowering: !text.contains(GemSlot::Empowering.marker()),
            lucky: !text.contains(GemSlot::Lucky.marker()),
            special: use_special && !text.contains(GemSlot::Special.marker()),
        }
    }

    pub fn is_needed(&self, slot: GemSlot) -> bool {
        match slot {
            GemSlot::Hunting => self.hunting,
            GemSlot::Empowering => self.empowering,
            GemSlot::Lucky => self.lucky,
            GemSlot::Special => self.special,
        }
    }

    pub fn any(&self) -> bool {
        self.hunting || self.empowering || self.lucky || self.special
    }

    /// Parses marker names (`gem1,gem3,gem4,star`) into needs.
    pub fn from_markers<'a>(markers: impl IntoIterator<Item = &'a str>) -> Self {
        let mut needs = Self::default();
        for marker in markers {
            match marker.trim() {
                "gem1" => needs.hunting = true,
                "gem3" => needs.empowering = true,
                "gem4" => needs.lucky = true,
                "star" => needs.special = true,
                _ => {}
            }
        }
        needs
    }
}

/// Inventory reply content split on back-ticks.
pub fn parse_inventory(content: &str) -> Vec<String> {
    content
        .split('`')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn gem_id(token: &str) -> Option<u32> {
    if !(2..=3).contains(&token.len()) || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

/// Picks at most one gem per needed slot, in slot order.
///
/// Each token is classified into its slot's category; only ids of an allowed tier stay eligible.
/// `Max` picks the highest eligible id, `Min` the lowest, `Off` picks nothing.
pub fn select_gems<S: AsRef<str>>(
    inventory: &[S],
    needs: &GemNeeds,
    tiers: &[GemTier],
    policy: GemPolicy,
) -> Vec<u32> {
    if policy == GemPolicy::Off {
        return Vec::new();
    }
    let ids: Vec<u32> = inventory.iter().filter_map(|t| gem_id(t.as_ref())).collect();

    GemSlot::ALL
        .iter()
        .filter(|slot| needs.is_needed(**slot))
        .filter_map(|slot| {
            let eligible = ids
                .iter()
                .copied()
                .filter(|id| slot.tier_of(*id).is_some_and(|t| tiers.contains(&t)));
            match policy {
                GemPolicy::Max => eligible.max(),
                GemPolicy::Min => eligible.min(),
                GemPolicy::Off => None,
            }
        })
        .collect()
}

/// `<prefix> use 51 65`, or `None` when nothing was chosen.
pub fn use_command(prefix: &str, gems: &[u32]) -> Option<String> {
    if gems.is_empty() {
        return None;
    }
    let ids: Vec<String> = gems.iter().map(u32::to_string).collect();
    Some(format!("{} use {}", prefix, ids.join(" ")))
}
