//! Distance estimation and the integer line-of-sight test

use super::TerrainView;
use crate::dungeon::Loc;

/// Approximate the distance between two grids.
///
/// `max(|dy|,|dx|) + min(|dy|,|dx|) / 2`, truncating. Exact along the axes,
/// near-exact on the diagonal, and overestimates by roughly one grid per
/// fifteen in between. Every radius cut-off in the engine uses this estimate;
/// swapping in true Euclidean distance would change where torch light and
/// sight radii end.
pub fn distance(a: Loc, b: Loc) -> i32 {
    let ay = (b.y - a.y).abs();
    let ax = (b.x - a.x).abs();
    if ay > ax { ay + (ax >> 1) } else { ax + (ay >> 1) }
}

/// Outcome of one step of the slope walk along the major axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shift {
    /// Stay on the current minor-axis row/column
    Hold,
    /// The line crossed into the next minor row/column mid-tile; the
    /// freshly entered corner cell must also be checked
    Cross,
    /// The line meets the corner of the tile exactly. Advance the minor
    /// axis without checking the grazed cell: vision is not blocked by
    /// brushing a corner.
    Graze,
}

/// Fixed-point accumulator for the general line-of-sight walk.
///
/// Progress along the minor axis is tracked in units scaled by
/// `f1 = 2 * major * minor`, with `f2 = f1 / 2` marking the tile border.
/// Each major-axis step adds the scaled slope `m = 2 * minor^2` and compares
/// against `f2` to decide whether the minor axis advances. With level sides
/// bounded by [`crate::MAX_LEVEL_WID`] the arithmetic stays far from i32
/// overflow.
#[derive(Debug, Clone, Copy)]
pub struct Stepping {
    q: i32,
    m: i32,
    f1: i32,
    f2: i32,
}

impl Stepping {
    /// Build the accumulator for absolute offsets `major >= minor > 0`.
    ///
    /// The returned bool is true for the exact-diagonal start (slope one):
    /// the walk then begins one step in on both axes, with no corner check.
    pub fn new(major: i32, minor: i32) -> (Self, bool) {
        let f2 = major * minor;
        let f1 = f2 << 1;
        let mut q = minor * minor;
        let m = q << 1;
        let diagonal = q == f2;
        if diagonal {
            q -= f1;
        }
        (Self { q, m, f1, f2 }, diagonal)
    }

    pub fn step(&mut self) -> Shift {
        self.q += self.m;
        if self.q < self.f2 {
            Shift::Hold
        } else if self.q > self.f2 {
            self.q -= self.f1;
            Shift::Cross
        } else {
            self.q -= self.f1;
            Shift::Graze
        }
    }
}

/// Test for an unobstructed sight line between the centers of two grids.
///
/// All interior grids along the line must let sight through; the endpoints
/// themselves are never tested. Pure function of the two grids and the
/// terrain, in priority order:
///
/// 1. identical or adjacent grids always succeed;
/// 2. purely vertical or horizontal lines walk the cells in between;
/// 3. a "chess knight" offset of (1,2) or (2,1) succeeds if the single cell
///    one step along the long axis is open, so diagonal sight may graze past
///    one obstructed corner (better gameplay than the strict geometric
///    answer, and the one case where the test is not reflexive);
/// 4. otherwise a fixed-point walk along the longer axis, driven by
///    [`Stepping`], fails at the first blocking cell it enters.
pub fn los<T: TerrainView + ?Sized>(terrain: &T, a: Loc, b: Loc) -> bool {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let ax = dx.abs();
    let ay = dy.abs();

    // Identical or adjacent
    if ax < 2 && ay < 2 {
        return true;
    }

    // Directly north/south
    if dx == 0 {
        let sy = dy.signum();
        let mut y = a.y + sy;
        while y != b.y {
            if terrain.blocks_sight(Loc::new(a.x, y)) {
                return false;
            }
            y += sy;
        }
        return true;
    }

    // Directly east/west
    if dy == 0 {
        let sx = dx.signum();
        let mut x = a.x + sx;
        while x != b.x {
            if terrain.blocks_sight(Loc::new(x, a.y)) {
                return false;
            }
            x += sx;
        }
        return true;
    }

    let sx = dx.signum();
    let sy = dy.signum();

    // Knight's moves
    if ax == 1 && ay == 2 && !terrain.blocks_sight(Loc::new(a.x, a.y + sy)) {
        return true;
    }
    if ay == 1 && ax == 2 && !terrain.blocks_sight(Loc::new(a.x + sx, a.y)) {
        return true;
    }

    if ax >= ay {
        // Travel horizontally
        let (mut walk, diagonal) = Stepping::new(ax, ay);
        let mut scan = Loc::new(a.x + sx, if diagonal { a.y + sy } else { a.y });

        while scan.x != b.x {
            if terrain.blocks_sight(scan) {
                return false;
            }
            match walk.step() {
                Shift::Hold => {}
                Shift::Cross => {
                    scan.y += sy;
                    if terrain.blocks_sight(scan) {
                        return false;
                    }
                }
                Shift::Graze => scan.y += sy,
            }
            scan.x += sx;
        }
    } else {
        // Travel vertically
        let (mut walk, diagonal) = Stepping::new(ay, ax);
        let mut scan = Loc::new(if diagonal { a.x + sx } else { a.x }, a.y + sy);

        while scan.y != b.y {
            if terrain.blocks_sight(scan) {
                return false;
            }
            match walk.step() {
                Shift::Hold => {}
                Shift::Cross => {
                    scan.x += sx;
                    if terrain.blocks_sight(scan) {
                        return false;
                    }
                }
                Shift::Graze => scan.x += sx,
            }
            scan.y += sy;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Synthetic terrain: '#' blocks sight, anything else is open.
    struct Blocks {
        width: i32,
        height: i32,
        blocked: Vec<bool>,
    }

    impl Blocks {
        fn from_rows(rows: &[&str]) -> Self {
            let height = rows.len() as i32;
            let width = rows[0].len() as i32;
            let blocked = rows
                .iter()
                .flat_map(|row| row.chars().map(|ch| ch == '#'))
                .collect();
            Self {
                width,
                height,
                blocked,
            }
        }

        fn open(width: i32, height: i32) -> Self {
            Self {
                width,
                height,
                blocked: vec![false; (width * height) as usize],
            }
        }
    }

    impl TerrainView for Blocks {
        fn width(&self) -> i32 {
            self.width
        }
        fn height(&self) -> i32 {
            self.height
        }
        fn blocks_sight(&self, grid: Loc) -> bool {
            !self.in_bounds(grid) || self.blocked[(grid.y * self.width + grid.x) as usize]
        }
        fn allows_los(&self, grid: Loc) -> bool {
            !self.blocks_sight(grid)
        }
        fn is_glowing(&self, _grid: Loc) -> bool {
            false
        }
        fn is_bright(&self, _grid: Loc) -> bool {
            false
        }
        fn is_feel(&self, _grid: Loc) -> bool {
            false
        }
        fn is_secret_trap(&self, _grid: Loc) -> bool {
            false
        }
    }

    #[test]
    fn test_distance_axes_exact() {
        let a = Loc::new(10, 10);
        assert_eq!(distance(a, Loc::new(10, 17)), 7);
        assert_eq!(distance(a, Loc::new(3, 10)), 7);
        assert_eq!(distance(a, a), 0);
    }

    #[test]
    fn test_distance_diagonal() {
        let a = Loc::new(0, 0);
        assert_eq!(distance(a, Loc::new(4, 4)), 6);
        assert_eq!(distance(a, Loc::new(2, 5)), 6);
    }

    #[test]
    fn test_adjacent_grids_always_have_los() {
        // Even when every cell blocks sight: endpoints are never tested.
        let t = Blocks::from_rows(&["###", "###", "###"]);
        let center = Loc::new(1, 1);
        for d in Loc::ADJACENT {
            assert!(los(&t, center, center.offset(d.x, d.y)));
            assert!(los(&t, center.offset(d.x, d.y), center));
        }
        assert!(los(&t, center, center));
    }

    #[test]
    fn test_axis_los_blocked_by_wall() {
        let t = Blocks::from_rows(&["....#....."]);
        assert!(!los(&t, Loc::new(0, 0), Loc::new(9, 0)));
        assert!(los(&t, Loc::new(0, 0), Loc::new(4, 0)));
        assert!(los(&t, Loc::new(5, 0), Loc::new(9, 0)));
        // and from the far side
        assert!(!los(&t, Loc::new(9, 0), Loc::new(0, 0)));
    }

    #[test]
    fn test_vertical_axis_los() {
        let t = Blocks::from_rows(&[".", ".", "#", ".", "."]);
        assert!(!los(&t, Loc::new(0, 0), Loc::new(0, 4)));
        assert!(los(&t, Loc::new(0, 0), Loc::new(0, 1)));
        assert!(!los(&t, Loc::new(0, 4), Loc::new(0, 0)));
    }

    #[test]
    fn test_corner_brush_not_blocking() {
        // The (0,0)-(2,2) line passes exactly through the corners shared
        // with the four walls; only the intervening floor cell matters.
        let t = Blocks::from_rows(&[
            ".#..",
            "#.#.",
            ".#..",
            "....",
        ]);
        assert!(los(&t, Loc::new(0, 0), Loc::new(2, 2)));
        assert!(los(&t, Loc::new(2, 2), Loc::new(0, 0)));
    }

    #[test]
    fn test_corner_brush_blocked_by_entered_cell() {
        let t = Blocks::from_rows(&[
            ".#..",
            "##..",
            ".#..",
            "....",
        ]);
        // Same shape but the diagonal's own cell is a wall.
        assert!(!los(&t, Loc::new(0, 0), Loc::new(2, 2)));
    }

    #[test]
    fn test_knights_move_leniency() {
        // Offset (1,2): only the straight-down cell decides.
        let t = Blocks::from_rows(&[
            "..",
            ".#",
            "..",
        ]);
        assert!(los(&t, Loc::new(0, 0), Loc::new(1, 2)));

        let t = Blocks::from_rows(&[
            "..",
            "#.",
            "..",
        ]);
        assert!(!los(&t, Loc::new(0, 0), Loc::new(1, 2)));

        // Offset (2,1), mirrored.
        let t = Blocks::from_rows(&[
            "..#",
            "...",
        ]);
        assert!(los(&t, Loc::new(0, 0), Loc::new(2, 1)));
        let t = Blocks::from_rows(&[
            ".#.",
            "...",
        ]);
        assert!(!los(&t, Loc::new(0, 0), Loc::new(2, 1)));
    }

    #[test]
    fn test_corridor_with_wall_segment() {
        let t = Blocks::from_rows(&["#####.####"]);
        assert!(!los(&t, Loc::new(0, 0), Loc::new(9, 0)));
        assert!(los(&t, Loc::new(0, 0), Loc::new(4, 0)));
    }

    #[test]
    fn test_shallow_slope_visits_expected_cells() {
        // (0,0) to (5,2): the walk enters (1,0), (1,1), (2,1), (3,1), (4,1)
        // and (4,2), and any one of them blocks.
        for (x, y) in [(1, 0), (1, 1), (2, 1), (3, 1), (4, 1), (4, 2)] {
            let mut t = Blocks::open(6, 3);
            t.blocked[(y * 6 + x) as usize] = true;
            assert!(
                !los(&t, Loc::new(0, 0), Loc::new(5, 2)),
                "wall at ({x},{y}) should block"
            );
        }
        // Cells merely brushed by the line do not block.
        for (x, y) in [(2, 0), (3, 2), (2, 2)] {
            let mut t = Blocks::open(6, 3);
            t.blocked[(y * 6 + x) as usize] = true;
            assert!(
                los(&t, Loc::new(0, 0), Loc::new(5, 2)),
                "wall at ({x},{y}) should not block"
            );
        }
    }

    #[test]
    fn test_stepping_exact_corner_sequence() {
        // Offset (3,1) grazes the corner between the two visited cells.
        let (mut walk, diagonal) = Stepping::new(3, 1);
        assert!(!diagonal);
        assert_eq!(walk.step(), Shift::Graze);
        assert_eq!(walk.step(), Shift::Hold);
    }

    #[test]
    fn test_stepping_shallow_slope_sequence() {
        let (mut walk, diagonal) = Stepping::new(5, 2);
        assert!(!diagonal);
        assert_eq!(walk.step(), Shift::Cross);
        assert_eq!(walk.step(), Shift::Hold);
        assert_eq!(walk.step(), Shift::Hold);
        assert_eq!(walk.step(), Shift::Cross);
    }

    #[test]
    fn test_stepping_diagonal_start() {
        let (_, diagonal) = Stepping::new(4, 4);
        assert!(diagonal);
    }

    proptest! {
        #[test]
        fn prop_distance_bounds(ax in -30i32..30, ay in -30i32..30, bx in -30i32..30, by in -30i32..30) {
            let a = Loc::new(ax, ay);
            let b = Loc::new(bx, by);
            let d = distance(a, b);
            let cheb = (bx - ax).abs().max((by - ay).abs());
            let taxi = (bx - ax).abs() + (by - ay).abs();
            prop_assert!(d >= cheb);
            prop_assert!(d <= taxi);
            prop_assert_eq!(d, distance(b, a));
        }

        #[test]
        fn prop_open_grid_always_has_los(ax in 0i32..12, ay in 0i32..12, bx in 0i32..12, by in 0i32..12) {
            let t = Blocks::open(12, 12);
            prop_assert!(los(&t, Loc::new(ax, ay), Loc::new(bx, by)));
        }

        #[test]
        fn prop_los_is_reflexive_outside_knights_moves(
            walls in proptest::collection::vec(any::<bool>(), 144),
            ax in 0i32..12, ay in 0i32..12, bx in 0i32..12, by in 0i32..12,
        ) {
            let dx = (bx - ax).abs();
            let dy = (by - ay).abs();
            // The knight's-move special case is deliberately one-sided.
            prop_assume!(!(dx.min(dy) == 1 && dx.max(dy) == 2));
            let mut t = Blocks::open(12, 12);
            t.blocked = walls;
            let a = Loc::new(ax, ay);
            let b = Loc::new(bx, by);
            prop_assert_eq!(los(&t, a, b), los(&t, b, a));
        }
    }
}
