//! Ground and cover layers.
//!
//! Every cell has up to three co-located layers: ground below the tile,
//! cover above it. Covers intercept matching/swapping/gravity per a static
//! rule table; grounds take one damage whenever the tile above them is
//! destroyed.

use serde::{Deserialize, Serialize};

/// Ground kinds (the layer below the tile).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroundKind {
    Ice,
    Jelly,
    Honey,
}

impl GroundKind {
    pub fn default_hp(self) -> u8 {
        match self {
            GroundKind::Ice => 1,
            GroundKind::Jelly => 2,
            GroundKind::Honey => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ground {
    pub kind: GroundKind,
    pub hp: u8,
}

impl Ground {
    pub fn new(kind: GroundKind) -> Self {
        Ground { kind, hp: kind.default_hp() }
    }

    /// Apply one unit of damage. Returns true when the ground is destroyed.
    pub fn damage(&mut self) -> bool {
        self.hp = self.hp.saturating_sub(1);
        self.hp == 0
    }
}

/// Cover kinds (the layer above the tile).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverKind {
    Cage,
    Chain,
    Bubble,
    IceCover,
}

impl CoverKind {
    /// Rule table. Order: blocks match, blocks swap, blocks gravity, dynamic.
    ///
    /// | Kind     | match | swap | gravity | dynamic |
    /// |----------|-------|------|---------|---------|
    /// | Cage     | yes   | yes  | yes     | no      |
    /// | Chain    | no    | yes  | yes     | no      |
    /// | Bubble   | no    | yes  | no      | yes     |
    /// | IceCover | yes   | yes  | yes     | no      |
    const fn rules(self) -> (bool, bool, bool, bool) {
        match self {
            CoverKind::Cage => (true, true, true, false),
            CoverKind::Chain => (false, true, true, false),
            CoverKind::Bubble => (false, true, false, true),
            CoverKind::IceCover => (true, true, true, false),
        }
    }

    pub fn blocks_match(self) -> bool {
        self.rules().0
    }

    pub fn blocks_swap(self) -> bool {
        self.rules().1
    }

    pub fn blocks_gravity(self) -> bool {
        self.rules().2
    }

    /// Dynamic covers travel with their tile under gravity; static covers
    /// stay with the grid cell.
    pub fn is_dynamic(self) -> bool {
        self.rules().3
    }

    pub fn default_hp(self) -> u8 {
        1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cover {
    pub kind: CoverKind,
    pub hp: u8,
}

impl Cover {
    pub fn new(kind: CoverKind) -> Self {
        Cover { kind, hp: kind.default_hp() }
    }

    pub fn with_hp(kind: CoverKind, hp: u8) -> Self {
        Cover { kind, hp: if hp == 0 { kind.default_hp() } else { hp } }
    }

    /// Apply one unit of damage. Returns true when the cover is destroyed.
    pub fn damage(&mut self) -> bool {
        self.hp = self.hp.saturating_sub(1);
        self.hp == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cover_rule_table() {
        assert!(CoverKind::Cage.blocks_match());
        assert!(CoverKind::Cage.blocks_gravity());
        assert!(!CoverKind::Cage.is_dynamic());

        assert!(!CoverKind::Chain.blocks_match());
        assert!(CoverKind::Chain.blocks_swap());
        assert!(CoverKind::Chain.blocks_gravity());

        assert!(!CoverKind::Bubble.blocks_match());
        assert!(!CoverKind::Bubble.blocks_gravity());
        assert!(CoverKind::Bubble.is_dynamic());

        assert!(CoverKind::IceCover.blocks_match());
        assert!(!CoverKind::IceCover.is_dynamic());
    }

    #[test]
    fn test_ground_default_hp() {
        assert_eq!(GroundKind::Ice.default_hp(), 1);
        assert_eq!(GroundKind::Jelly.default_hp(), 2);
        assert_eq!(GroundKind::Honey.default_hp(), 1);
    }

    #[test]
    fn test_damage_to_destruction() {
        let mut g = Ground::new(GroundKind::Jelly);
        assert!(!g.damage());
        assert_eq!(g.hp, 1);
        assert!(g.damage());

        let mut c = Cover::new(CoverKind::Cage);
        assert!(c.damage());
        // Further damage is a no-op, not an underflow.
        assert!(c.damage());
        assert_eq!(c.hp, 0);
    }
}
