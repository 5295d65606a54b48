//! The per-player view update pass

use log::{debug, trace};

use super::light::{LightGrid, compute_lighting};
use super::los::{distance, los};
use super::{EntityView, TerrainView, ViewEvents};
use crate::consts::FEELING_NEED;
use crate::dungeon::Loc;
use crate::player::{Player, Redraw};

/// Visibility record for one (player, cell) pair.
///
/// `seen` implies `view`, and `close` implies `seen`, after every completed
/// pass. The `was_*` fields snapshot the previous pass during reconciliation
/// and are cleared before the pass returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SquareView {
    /// An unobstructed sight line reaches this cell, within sight range
    pub view: bool,

    /// In view and illuminated enough to perceive
    pub seen: bool,

    /// Seen and inside the player's own light radius
    pub close: bool,

    pub(crate) was_seen: bool,
    pub(crate) was_close: bool,
    pub(crate) was_lit: bool,

    /// Still counts toward the level feeling when first seen
    pub feel: bool,

    /// Accumulated light, rebuilt by every lighting pass
    pub light: i32,
}

impl SquareView {
    pub const fn is_lit(&self) -> bool {
        self.light > 0
    }
}

/// Per-player visibility state for one level.
///
/// A dense array, one record per cell. Allocated on level entry and thrown
/// away on level exit; nothing here is saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerView {
    width: i32,
    height: i32,
    squares: Vec<SquareView>,

    /// Cells already counted toward the level feeling
    pub feeling_squares: u32,
}

impl PlayerView {
    pub fn new<T: TerrainView + ?Sized>(terrain: &T) -> Self {
        let width = terrain.width();
        let height = terrain.height();
        let mut squares = vec![SquareView::default(); (width * height) as usize];
        for y in 0..height {
            for x in 0..width {
                squares[(y * width + x) as usize].feel = terrain.is_feel(Loc::new(x, y));
            }
        }
        Self {
            width,
            height,
            squares,
            feeling_squares: 0,
        }
    }

    fn in_bounds(&self, grid: Loc) -> bool {
        grid.x >= 0 && grid.x < self.width && grid.y >= 0 && grid.y < self.height
    }

    fn index(&self, grid: Loc) -> usize {
        (grid.y * self.width + grid.x) as usize
    }

    pub fn square(&self, grid: Loc) -> &SquareView {
        &self.squares[self.index(grid)]
    }

    pub(crate) fn square_mut(&mut self, grid: Loc) -> &mut SquareView {
        let idx = self.index(grid);
        &mut self.squares[idx]
    }

    /// Cell is geometrically visible from the player's current position.
    pub fn is_view(&self, grid: Loc) -> bool {
        self.in_bounds(grid) && self.square(grid).view
    }

    /// Cell is visible and illuminated.
    pub fn is_seen(&self, grid: Loc) -> bool {
        self.in_bounds(grid) && self.square(grid).seen
    }

    /// Cell is seen and within the player's own light radius.
    pub fn is_close(&self, grid: Loc) -> bool {
        self.in_bounds(grid) && self.square(grid).close
    }

    pub fn light(&self, grid: Loc) -> i32 {
        if self.in_bounds(grid) {
            self.square(grid).light
        } else {
            0
        }
    }

    pub fn is_lit(&self, grid: Loc) -> bool {
        self.light(grid) > 0
    }

    /// Copy a finished lighting pass into the per-cell records.
    pub(crate) fn absorb_light(&mut self, lights: &LightGrid) {
        for (sq, &light) in self.squares.iter_mut().zip(lights.values()) {
            sq.light = light;
        }
    }

    /// Save seen/close/lit into the snapshot fields, then clear the
    /// current view in preparation for recomputing it.
    fn snapshot(&mut self) {
        for sq in &mut self.squares {
            sq.was_seen = sq.seen;
            sq.was_close = sq.close;
            sq.was_lit = sq.is_lit();
            sq.view = false;
            sq.seen = false;
            sq.close = false;
        }
    }
}

/// Recompute the player's view of the level.
///
/// Runs when the player moves, their light radius changes, or terrain or
/// light sources nearby change. Snapshots the previous pass, recomputes
/// lighting, decides view/seen/close for every cell, then reconciles the
/// transitions into `events`. Reads shared terrain and occupant state but
/// writes only this player's own view array, so concurrent players never
/// disturb each other's result.
pub fn update_view<L, E>(p: &mut Player, level: &L, events: &mut E)
where
    L: TerrainView + EntityView + ?Sized,
    E: ViewEvents + ?Sized,
{
    trace!(
        "view pass for player {} at ({}, {})",
        p.id.0, p.grid.x, p.grid.y
    );

    p.view.snapshot();
    compute_lighting(p, level);

    // The player's own grid is always in view, and seen whenever any light
    // reaches it.
    {
        let own = p.grid;
        let lit = p.view.is_lit(own);
        let sq = p.view.square_mut(own);
        sq.view = true;
        if p.state.cur_light > 0 || lit {
            sq.seen = true;
            sq.close = true;
        }
    }

    for y in 0..level.height() {
        for x in 0..level.width() {
            consider_grid(p, level, Loc::new(x, y));
        }
    }

    for y in 0..level.height() {
        for x in 0..level.width() {
            reconcile_grid(p, level, Loc::new(x, y), events);
        }
    }
}

/// Decide whether one cell joins the current view.
fn consider_grid<L: TerrainView + ?Sized>(p: &mut Player, level: &L, grid: Loc) {
    let d = distance(grid, p.grid);
    if d > p.state.sight_range {
        return;
    }
    let close = d < p.state.cur_light;

    // Walls take their sight line from the neighboring cell one step
    // toward the player, so a wall face lit from this side is not occluded
    // by the wall's own geometry:
    //
    //  #1#############
    //  #............@#
    //  ###############
    //
    // The wall marked '1' is in view even though the line to its center
    // runs into the adjacent wall cell.
    let mut target = grid;
    if !level.allows_los(grid) {
        let dx = grid.x - p.grid.x;
        let dy = grid.y - p.grid.y;
        let ax = dx.abs();
        let ay = dy.abs();
        let sx = if dx > 0 { 1 } else { -1 };
        let sy = if dy > 0 { 1 } else { -1 };

        target = grid.toward(p.grid);

        // Never steal sight through another wall, or both layers of a
        // double-thickness wall would show.
        if !level.allows_los(target) {
            target = grid;
        }

        // A wall reached only via the knight's-move leniency does not
        // steal either.
        if ax == 2 && ay == 1 {
            let flank = Loc::new(grid.x - sx, grid.y);
            let diag = Loc::new(grid.x - sx, grid.y - sy);
            if level.in_bounds(flank)
                && level.allows_los(flank)
                && level.in_bounds(diag)
                && !level.allows_los(diag)
            {
                target = grid;
            }
        } else if ax == 1 && ay == 2 {
            let flank = Loc::new(grid.x, grid.y - sy);
            let diag = Loc::new(grid.x - sx, grid.y - sy);
            if level.in_bounds(flank)
                && level.allows_los(flank)
                && level.in_bounds(diag)
                && !level.allows_los(diag)
            {
                target = grid;
            }
        }
    }

    if los(level, p.grid, target) {
        mark_viewable(p, level, grid, close);
    }
}

/// Add a cell to the view, and to the seen set if lighting allows.
fn mark_viewable<L: TerrainView + ?Sized>(p: &mut Player, level: &L, grid: Loc, close: bool) {
    if p.view.is_view(grid) {
        return;
    }

    {
        let sq = p.view.square_mut(grid);
        sq.view = true;
        if close {
            sq.seen = true;
            sq.close = true;
        }
    }

    if p.view.is_lit(grid) {
        if level.allows_los(grid) {
            p.view.square_mut(grid).seen = true;
        } else {
            // A lit wall is only seen from the side the light is on: the
            // cell one step toward the player must be lit as well.
            let inner = grid.toward(p.grid);
            if p.view.is_lit(inner) {
                p.view.square_mut(grid).seen = true;
            }
        }
    }
}

/// Reconcile one cell's transitions against the previous pass.
fn reconcile_grid<L, E>(p: &mut Player, level: &L, grid: Loc, events: &mut E)
where
    L: TerrainView + ?Sized,
    E: ViewEvents + ?Sized,
{
    let snap = *p.view.square(grid);
    let is_lit = snap.is_lit();

    // Blindness wipes out perception but not geometry; otherwise a seen
    // cell gives away any trap hiding on it.
    if p.blind {
        let sq = p.view.square_mut(grid);
        sq.seen = false;
        sq.close = false;
    } else if p.view.is_seen(grid) && level.is_secret_trap(grid) {
        events.reveal_trap(grid);
    }

    let seen = p.view.is_seen(grid);
    let mut changed = false;

    // Unseen -> seen
    if seen && !snap.was_seen {
        if level.is_feel(grid) && snap.feel {
            p.view.square_mut(grid).feel = false;
            p.view.feeling_squares += 1;
            if p.view.feeling_squares == FEELING_NEED {
                debug!("player {} has explored enough to feel the level", p.id.0);
                events.level_feeling();
                p.redraw |= Redraw::STATE;
            }
        }
        events.memorize(grid);
        events.redraw(grid);
        changed = true;
    }

    // Seen -> unseen
    if !seen && snap.was_seen {
        events.redraw(grid);
        changed = true;
    }

    // Torch-lit to ambient-lit or back
    if snap.close != snap.was_close {
        events.redraw(grid);
        changed = true;
    }

    // Lit to unlit or back
    if is_lit != snap.was_lit {
        events.redraw(grid);
        changed = true;
    }

    if changed {
        p.redraw |= Redraw::MAP;
    }

    let sq = p.view.square_mut(grid);
    sq.was_seen = false;
    sq.was_close = false;
    sq.was_lit = false;
}
