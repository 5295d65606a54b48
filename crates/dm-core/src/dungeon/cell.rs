//! Terrain features and per-cell flags

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Terrain feature occupying a cell
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum Feature {
    #[default]
    Granite = 0,
    PermWall = 1,
    Magma = 2,
    Quartz = 3,
    Rubble = 4,
    SecretDoor = 5,
    ClosedDoor = 6,
    BrokenDoor = 7,
    OpenDoor = 8,
    Floor = 9,
    Lava = 10,
    UpStaircase = 11,
    DownStaircase = 12,
}

impl Feature {
    /// Wall-type terrain. Secret doors count: they look like wall until found.
    pub const fn is_wall(&self) -> bool {
        matches!(
            self,
            Feature::Granite
                | Feature::PermWall
                | Feature::Magma
                | Feature::Quartz
                | Feature::SecretDoor
        )
    }

    /// Check if sight lines (and light) stop at this cell.
    pub const fn blocks_sight(&self) -> bool {
        self.is_wall() || matches!(self, Feature::ClosedDoor | Feature::Rubble)
    }

    /// Check if this is passable (can walk through)
    pub const fn is_passable(&self) -> bool {
        matches!(
            self,
            Feature::BrokenDoor
                | Feature::OpenDoor
                | Feature::Floor
                | Feature::Lava
                | Feature::UpStaircase
                | Feature::DownStaircase
        )
    }

    /// Bright terrain radiates its own light (lava).
    pub const fn is_bright(&self) -> bool {
        matches!(self, Feature::Lava)
    }

    /// Get the display character for this feature
    pub const fn symbol(&self) -> char {
        match self {
            Feature::Granite => '#',
            Feature::PermWall => '#',
            Feature::Magma => '%',
            Feature::Quartz => '*',
            Feature::Rubble => ':',
            Feature::SecretDoor => '#', // looks like wall
            Feature::ClosedDoor => '+',
            Feature::BrokenDoor => '\'',
            Feature::OpenDoor => '\'',
            Feature::Floor => '.',
            Feature::Lava => '~',
            Feature::UpStaircase => '<',
            Feature::DownStaircase => '>',
        }
    }
}

bitflags! {
    /// Per-cell terrain flags
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct CellFlags: u8 {
        /// Permanently illuminated. For a wall this only describes the
        /// material; which face actually shows lit depends on the viewer.
        const GLOW = 0x01;
        /// Counts toward the level feeling when first seen
        const FEEL = 0x02;
        /// Part of a generated room
        const ROOM = 0x04;
    }
}

// Manual serde impl for CellFlags
impl Serialize for CellFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CellFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u8::deserialize(deserializer)?;
        Ok(CellFlags::from_bits_truncate(bits))
    }
}

/// A single map cell
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Cell {
    /// Terrain feature
    pub feat: Feature,

    /// Terrain flags
    pub flags: CellFlags,
}

impl Cell {
    /// Create a solid granite cell
    pub const fn granite() -> Self {
        Self {
            feat: Feature::Granite,
            flags: CellFlags::empty(),
        }
    }

    /// Create a plain floor cell
    pub const fn floor() -> Self {
        Self {
            feat: Feature::Floor,
            flags: CellFlags::empty(),
        }
    }

    pub const fn blocks_sight(&self) -> bool {
        self.feat.blocks_sight()
    }

    /// A sight line may pass through this cell.
    pub const fn allows_los(&self) -> bool {
        !self.feat.blocks_sight()
    }

    pub const fn is_wall(&self) -> bool {
        self.feat.is_wall()
    }

    pub const fn is_passable(&self) -> bool {
        self.feat.is_passable()
    }

    pub fn is_glowing(&self) -> bool {
        self.flags.contains(CellFlags::GLOW)
    }

    pub const fn is_bright(&self) -> bool {
        self.feat.is_bright()
    }
}
