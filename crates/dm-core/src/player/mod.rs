//! Player state consumed by the visibility engine

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::consts::MAX_SIGHT;
use crate::dungeon::{Level, LevelId, Loc};
use crate::vision::PlayerView;

/// Unique identifier for players
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

bitflags! {
    /// UI elements queued for redraw
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct Redraw: u32 {
        /// Status line (light level, level feeling)
        const STATE = 0x01;
        /// Some part of the map changed appearance
        const MAP = 0x02;
    }
}

/// Derived per-turn state that feeds the view pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Signed light emission; negative radiates darkness. The lit radius
    /// is `|cur_light| - 1`.
    pub cur_light: i32,

    /// Maximum distance at which any grid can enter the view
    pub sight_range: i32,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            cur_light: 0,
            sight_range: MAX_SIGHT,
        }
    }
}

/// A player, with the per-cell view state for the level they are on
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub level: LevelId,
    pub grid: Loc,
    pub state: PlayerState,

    /// Blindness suppresses seen/close but leaves the geometric view intact
    pub blind: bool,

    /// Hidden players (mimicking an object) cast no light for others
    pub hidden: bool,

    /// Light level at the player's own grid as of the last pass
    pub square_light: i32,

    pub redraw: Redraw,

    /// Per-cell visibility for the current level; rebuilt on level entry
    pub view: PlayerView,
}

impl Player {
    pub fn new(id: PlayerId, level: &Level, grid: Loc) -> Self {
        Self {
            id,
            level: level.id,
            grid,
            state: PlayerState::default(),
            blind: false,
            hidden: false,
            square_light: 0,
            redraw: Redraw::empty(),
            view: PlayerView::new(level),
        }
    }

    /// Move to another level, dropping all view state from the old one.
    pub fn enter_level(&mut self, level: &Level, grid: Loc) {
        self.level = level.id;
        self.grid = grid;
        self.square_light = 0;
        self.view = PlayerView::new(level);
    }

    /// The player's own grid is not seen; they are standing in the dark.
    pub fn in_darkness(&self) -> bool {
        !self.view.is_seen(self.grid)
    }
}
