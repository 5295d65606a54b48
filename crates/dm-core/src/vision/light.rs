//! Light propagation and wall-face lighting rules

use log::trace;

use super::los::{distance, los};
use super::{EntityView, TerrainView};
use crate::dungeon::Loc;
use crate::player::{Player, Redraw};

/// Check whether a wall can appear lit to a viewer, given a light source,
/// regardless of line-of-sight details.
///
/// A wall's lit face is the one turned toward the source; the viewer only
/// perceives it if it is also the face turned toward them. Both "turned
/// toward" directions are taken as one king-step off the wall. A source or
/// viewer standing inside the wall grid sees every face. When the two
/// directions share only one axis component, the cell off the wall along
/// that shared component must itself be open, or the face is hidden:
///
/// ```text
///   p
///  ###1#
///   @
/// ```
///
/// Both the glowing monster `p` and the viewer `@` have a line to the wall
/// `1`, but the face `p` lights is blocked from `@` by the wall directly
/// left of `1`.
pub fn source_lights_wall_face<T: TerrainView + ?Sized>(
    terrain: &T,
    viewer: Loc,
    source: Loc,
    wall: Loc,
) -> bool {
    let sn = wall.toward(source);
    if sn == wall {
        return true;
    }

    let pn = wall.toward(viewer);
    if pn == wall {
        return true;
    }

    let shared = if sn.x == pn.x {
        if sn.y == pn.y {
            return true;
        }
        Loc::new(sn.x, wall.y)
    } else if sn.y == pn.y {
        Loc::new(wall.x, sn.y)
    } else {
        // No shared component: the lit face points away from the viewer.
        return false;
    };

    terrain.allows_los(shared)
}

/// Check whether a permanently glowing wall can appear lit to a viewer.
///
/// The glow flag on a wall only marks the material; the face turned toward
/// the viewer is lit when some open, glowing neighbor on the viewer's side
/// acts as the light source for that face.
pub fn glow_lights_wall_face<T: TerrainView + ?Sized>(terrain: &T, viewer: Loc, wall: Loc) -> bool {
    let pn = wall.toward(viewer);
    if pn == wall {
        return true;
    }

    if terrain.allows_los(pn) && terrain.is_glowing(pn) {
        return true;
    }

    // Try the neighbors flanking the one in the viewer's direction.
    if pn.x != wall.x && pn.y != wall.y {
        let checks = [Loc::new(pn.x, wall.y), Loc::new(wall.x, pn.y)];
        for chk in checks {
            if terrain.allows_los(chk)
                && terrain.is_glowing(chk)
                && source_lights_wall_face(terrain, viewer, chk, wall)
            {
                return true;
            }
        }
    } else {
        // Cardinal direction; the flanking cells can be out of bounds.
        let checks = if pn.x != wall.x {
            [Loc::new(pn.x, wall.y - 1), Loc::new(pn.x, wall.y + 1)]
        } else {
            [Loc::new(wall.x - 1, pn.y), Loc::new(wall.x + 1, pn.y)]
        };
        for chk in checks {
            if terrain.in_bounds(chk)
                && terrain.allows_los(chk)
                && terrain.is_glowing(chk)
                && source_lights_wall_face(terrain, viewer, chk, wall)
            {
                return true;
            }
        }
    }

    false
}

/// Scratch buffer of signed light accumulators for one lighting pass.
///
/// Owned by the pass invocation and written back into the player's view
/// records when the pass completes; nothing here survives between passes.
#[derive(Debug, Clone)]
pub struct LightGrid {
    width: i32,
    light: Vec<i32>,
}

impl LightGrid {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            light: vec![0; (width * height) as usize],
        }
    }

    fn index(&self, grid: Loc) -> usize {
        (grid.y * self.width + grid.x) as usize
    }

    pub fn get(&self, grid: Loc) -> i32 {
        self.light[self.index(grid)]
    }

    pub fn set(&mut self, grid: Loc, value: i32) {
        let idx = self.index(grid);
        self.light[idx] = value;
    }

    pub fn add(&mut self, grid: Loc, delta: i32) {
        let idx = self.index(grid);
        self.light[idx] += delta;
    }

    pub(crate) fn values(&self) -> &[i32] {
        &self.light
    }
}

/// Accumulate one radiating source into the pass's light buffer.
///
/// Positive intensity weakens with distance (`intensity - dist`); negative
/// intensity is darkness, weakening toward zero (`intensity + dist`). Light
/// does not pass through walls, and a wall cell is only credited when the
/// face being lit is one the viewer could see. Brute force over the
/// bounding square; radii are small.
pub fn apply_light_source<T: TerrainView + ?Sized>(
    terrain: &T,
    viewer: Loc,
    lights: &mut LightGrid,
    source: Loc,
    radius: i32,
    intensity: i32,
) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let grid = source.offset(dx, dy);
            if !terrain.in_bounds(grid) {
                continue;
            }
            let dist = distance(source, grid);
            if dist > radius {
                continue;
            }
            if !los(terrain, source, grid) {
                continue;
            }
            if !terrain.allows_los(grid)
                && !source_lights_wall_face(terrain, viewer, source, grid)
            {
                continue;
            }
            if intensity > 0 {
                lights.add(grid, intensity - dist);
            } else {
                lights.add(grid, intensity + dist);
            }
        }
    }
}

/// Compute the light level of every grid as perceived by one player.
///
/// Base values come from permanent glow (walls only where the lit face is
/// visible), then bright terrain adds to itself and its neighbors, then the
/// player's own light and every light-casting monster and fellow player in
/// range contribute through [`apply_light_source`]. Finishes by refreshing
/// the light-level indicator for the player's own grid.
pub fn compute_lighting<L>(p: &mut Player, level: &L)
where
    L: TerrainView + EntityView + ?Sized,
{
    let light = p.state.cur_light;
    let radius = light.abs() - 1;
    let old_light = p.square_light;

    let mut lights = LightGrid::new(level.width(), level.height());

    // Starting values based on permanent light
    for y in 0..level.height() {
        for x in 0..level.width() {
            let grid = Loc::new(x, y);
            if level.is_glowing(grid)
                && (level.allows_los(grid) || glow_lights_wall_face(level, p.grid, grid))
            {
                lights.set(grid, 1);
            }
        }
    }

    // Bright terrain has intensity 2 and spills over to its neighbors
    for y in 0..level.height() {
        for x in 0..level.width() {
            let grid = Loc::new(x, y);
            if !level.is_bright(grid) {
                continue;
            }
            lights.add(grid, 2);
            for d in Loc::ADJACENT {
                let adj = grid.offset(d.x, d.y);
                if !level.in_bounds(adj) {
                    continue;
                }
                if !level.allows_los(adj)
                    && !source_lights_wall_face(level, p.grid, grid, adj)
                {
                    continue;
                }
                lights.add(adj, 1);
            }
        }
    }

    // Light around the player
    if light != 0 {
        apply_light_source(level, p.grid, &mut lights, p.grid, radius, light);
    }

    // Monster light and darkness
    for mon in level.monster_lights() {
        if mon.camouflaged || mon.light == 0 {
            continue;
        }
        let radius = mon.light.abs() - 1;
        if distance(p.grid, mon.grid) - radius > p.state.sight_range {
            continue;
        }
        apply_light_source(level, p.grid, &mut lights, mon.grid, radius, mon.light);
    }

    // Other players' lights
    for q in level.player_lights() {
        if q.id == p.id || q.hidden || q.light == 0 {
            continue;
        }
        let radius = q.light.abs() - 1;
        if distance(p.grid, q.grid) - radius > p.state.sight_range {
            continue;
        }
        apply_light_source(level, p.grid, &mut lights, q.grid, radius, q.light);
    }

    p.view.absorb_light(&lights);

    // Refresh the light level indicator
    let own = p.view.light(p.grid);
    if own != old_light {
        trace!("player {} grid light {} -> {}", p.id.0, old_light, own);
        p.square_light = own;
        p.redraw |= Redraw::STATE;
    }
}
