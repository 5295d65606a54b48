//! Per-player visibility and lighting
//!
//! Computes, for one player at a time, which grids of a shared level are in
//! line of sight (`view`), which are both in sight and illuminated (`seen`),
//! and which are lit by the player's own light (`close`), then reconciles the
//! result against the previous pass to drive discovery and redraw callbacks.
//!
//! The engine reads terrain and occupants through the [`TerrainView`] and
//! [`EntityView`] traits and writes only to the acting player's own view
//! array, so passes for different players on the same level never interfere.

mod light;
mod los;
mod view;

pub use light::{
    LightGrid, apply_light_source, compute_lighting, glow_lights_wall_face,
    source_lights_wall_face,
};
pub use los::{Shift, Stepping, distance, los};
pub use view::{PlayerView, SquareView, update_view};

use crate::dungeon::Loc;
use crate::player::PlayerId;

/// Read-only terrain queries consumed by the engine.
///
/// Implementations must tolerate out-of-bounds grids: `blocks_sight` reports
/// true and the other predicates report false outside the level, so callers
/// probing past the edge get the conservative answer instead of a panic.
pub trait TerrainView {
    fn width(&self) -> i32;
    fn height(&self) -> i32;

    fn in_bounds(&self, grid: Loc) -> bool {
        grid.x >= 0 && grid.x < self.width() && grid.y >= 0 && grid.y < self.height()
    }

    /// Strict interior check, excluding the outermost ring of cells. Safe
    /// for unchecked neighbor lookups.
    fn in_bounds_fully(&self, grid: Loc) -> bool {
        grid.x >= 1 && grid.x < self.width() - 1 && grid.y >= 1 && grid.y < self.height() - 1
    }

    /// Sight lines and light stop at this cell.
    fn blocks_sight(&self, grid: Loc) -> bool;

    /// Non-wall for the purposes of wall-face lighting.
    fn allows_los(&self, grid: Loc) -> bool;

    /// Permanently illuminated cell (for walls: material only).
    fn is_glowing(&self, grid: Loc) -> bool;

    /// Terrain that radiates its own light.
    fn is_bright(&self, grid: Loc) -> bool;

    /// Cell counts toward the level feeling when first seen.
    fn is_feel(&self, grid: Loc) -> bool;

    /// Cell holds a trap the player has not discovered yet.
    fn is_secret_trap(&self, grid: Loc) -> bool;
}

/// A monster's contribution to level lighting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonsterLight {
    pub grid: Loc,
    pub light: i32,
    pub camouflaged: bool,
}

/// Another player's contribution to level lighting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerLight {
    pub id: PlayerId,
    pub grid: Loc,
    pub light: i32,
    pub hidden: bool,
}

/// Light-casting occupants of a level, queried once per lighting pass.
pub trait EntityView {
    fn monster_lights(&self) -> Vec<MonsterLight>;
    fn player_lights(&self) -> Vec<PlayerLight>;
}

/// Side effects fired while reconciling a view pass.
///
/// The engine invokes these; rendering, map memory and trap bookkeeping
/// implement them.
pub trait ViewEvents {
    /// Cell newly entered the seen set; commit it to the player's map memory.
    fn memorize(&mut self, grid: Loc);

    /// Cell must be redrawn (visibility or lighting style changed).
    fn redraw(&mut self, grid: Loc);

    /// Enough of the level has been explored to announce its feeling.
    fn level_feeling(&mut self);

    /// A hidden trap sits on a seen cell; reveal it without alerting.
    fn reveal_trap(&mut self, grid: Loc);
}

/// Events sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEvents;

impl ViewEvents for NullEvents {
    fn memorize(&mut self, _grid: Loc) {}
    fn redraw(&mut self, _grid: Loc) {}
    fn level_feeling(&mut self) {}
    fn reveal_trap(&mut self, _grid: Loc) {}
}
