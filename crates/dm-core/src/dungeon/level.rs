//! Level structure: the shared terrain and occupant grid

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};
use thiserror::Error;

use super::{Cell, CellFlags, Feature, Loc};
use crate::consts::{MAX_LEVEL_HGT, MAX_LEVEL_WID};
use crate::monster::{Monster, MonsterId};
use crate::player::{Player, PlayerId};
use crate::vision::{EntityView, MonsterLight, PlayerLight, TerrainView};

/// Unique identifier for dungeon levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LevelId(pub u32);

/// Errors building a level from a text map
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LevelError {
    #[error("level dimensions {width}x{height} out of range")]
    BadDimensions { width: usize, height: usize },

    #[error("row {row} is {got} cells wide, expected {expected}")]
    NotRectangular {
        row: usize,
        got: usize,
        expected: usize,
    },

    #[error("unknown map glyph '{glyph}' at ({x}, {y})")]
    UnknownGlyph { glyph: char, x: usize, y: usize },
}

/// Trap types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumIter)]
pub enum TrapKind {
    Pit,
    Dart,
    Teleport,
    Web,
}

/// A trap on the level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trap {
    pub grid: Loc,
    pub kind: TrapKind,

    /// Not yet discovered by anyone
    pub hidden: bool,
}

impl Trap {
    pub fn new(grid: Loc, kind: TrapKind, hidden: bool) -> Self {
        Self { grid, kind, hidden }
    }
}

/// A dungeon level shared by every player on it.
///
/// Terrain is read-only from the visibility engine's point of view; the
/// per-player view state lives on each [`Player`], never here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    pub id: LevelId,
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    monsters: HashMap<MonsterId, Monster>,
    traps: Vec<Trap>,

    /// Per-tick snapshots of the players on this level, for lighting.
    /// Rebuilt by the server as players act; not part of the saved level.
    #[serde(skip)]
    presences: Vec<PlayerLight>,
}

impl Level {
    /// Create a level filled with solid granite.
    pub fn new(id: LevelId, width: usize, height: usize) -> Self {
        debug_assert!(width >= 1 && width <= MAX_LEVEL_WID);
        debug_assert!(height >= 1 && height <= MAX_LEVEL_HGT);
        Self {
            id,
            width,
            height,
            cells: vec![Cell::granite(); width * height],
            monsters: HashMap::new(),
            traps: Vec::new(),
            presences: Vec::new(),
        }
    }

    /// Build a level from rows of feature glyphs.
    ///
    /// Recognizes the symbols features draw as, plus `^` for a floor cell
    /// with a discovered pit. Used by tests and by level templates.
    pub fn from_rows(id: LevelId, rows: &[&str]) -> Result<Self, LevelError> {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.chars().count());
        if width == 0 || height == 0 || width > MAX_LEVEL_WID || height > MAX_LEVEL_HGT {
            return Err(LevelError::BadDimensions { width, height });
        }

        let mut level = Level::new(id, width, height);
        for (y, row) in rows.iter().enumerate() {
            let got = row.chars().count();
            if got != width {
                return Err(LevelError::NotRectangular {
                    row: y,
                    got,
                    expected: width,
                });
            }
            for (x, glyph) in row.chars().enumerate() {
                let feat = match glyph {
                    '#' => Feature::Granite,
                    '%' => Feature::Magma,
                    '*' => Feature::Quartz,
                    ':' => Feature::Rubble,
                    '+' => Feature::ClosedDoor,
                    '\'' => Feature::OpenDoor,
                    '.' => Feature::Floor,
                    '~' => Feature::Lava,
                    '<' => Feature::UpStaircase,
                    '>' => Feature::DownStaircase,
                    '^' => {
                        level
                            .traps
                            .push(Trap::new(Loc::new(x as i32, y as i32), TrapKind::Pit, false));
                        Feature::Floor
                    }
                    _ => return Err(LevelError::UnknownGlyph { glyph, x, y }),
                };
                level.cells[y * width + x].feat = feat;
            }
        }
        Ok(level)
    }

    fn index(&self, grid: Loc) -> usize {
        grid.y as usize * self.width + grid.x as usize
    }

    /// Caller ensures `grid` is in bounds.
    pub fn cell(&self, grid: Loc) -> &Cell {
        &self.cells[self.index(grid)]
    }

    /// Caller ensures `grid` is in bounds.
    pub fn cell_mut(&mut self, grid: Loc) -> &mut Cell {
        let idx = self.index(grid);
        &mut self.cells[idx]
    }

    /// Add or move a monster; the registry is keyed by id.
    pub fn place_monster(&mut self, mon: Monster) {
        self.monsters.insert(mon.id, mon);
    }

    pub fn remove_monster(&mut self, id: MonsterId) -> Option<Monster> {
        self.monsters.remove(&id)
    }

    pub fn monster(&self, id: MonsterId) -> Option<&Monster> {
        self.monsters.get(&id)
    }

    pub fn add_trap(&mut self, trap: Trap) {
        self.traps.push(trap);
    }

    /// Mark every trap on `grid` as discovered.
    pub fn reveal_traps(&mut self, grid: Loc) {
        for trap in &mut self.traps {
            if trap.grid == grid {
                trap.hidden = false;
            }
        }
    }

    pub fn traps(&self) -> &[Trap] {
        &self.traps
    }

    /// Record or refresh a player's lighting snapshot on this level.
    pub fn set_presence(&mut self, p: &Player) {
        let light = PlayerLight {
            id: p.id,
            grid: p.grid,
            light: p.state.cur_light,
            hidden: p.hidden,
        };
        match self.presences.iter_mut().find(|pl| pl.id == p.id) {
            Some(existing) => *existing = light,
            None => self.presences.push(light),
        }
    }

    /// Drop a departed player's lighting snapshot.
    pub fn clear_presence(&mut self, id: PlayerId) {
        self.presences.retain(|pl| pl.id != id);
    }
}

impl TerrainView for Level {
    fn width(&self) -> i32 {
        self.width as i32
    }

    fn height(&self) -> i32 {
        self.height as i32
    }

    fn blocks_sight(&self, grid: Loc) -> bool {
        !self.in_bounds(grid) || self.cell(grid).blocks_sight()
    }

    fn allows_los(&self, grid: Loc) -> bool {
        self.in_bounds(grid) && self.cell(grid).allows_los()
    }

    fn is_glowing(&self, grid: Loc) -> bool {
        self.in_bounds(grid) && self.cell(grid).is_glowing()
    }

    fn is_bright(&self, grid: Loc) -> bool {
        self.in_bounds(grid) && self.cell(grid).is_bright()
    }

    fn is_feel(&self, grid: Loc) -> bool {
        self.in_bounds(grid) && self.cell(grid).flags.contains(CellFlags::FEEL)
    }

    fn is_secret_trap(&self, grid: Loc) -> bool {
        self.traps.iter().any(|t| t.grid == grid && t.hidden)
    }
}

impl EntityView for Level {
    fn monster_lights(&self) -> Vec<MonsterLight> {
        self.monsters
            .values()
            .map(|mon| MonsterLight {
                grid: mon.grid,
                light: mon.light(),
                camouflaged: mon.camouflaged,
            })
            .collect()
    }

    fn player_lights(&self) -> Vec<PlayerLight> {
        self.presences.clone()
    }
}
