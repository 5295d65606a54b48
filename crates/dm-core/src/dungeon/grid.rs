//! Grid coordinates

use serde::{Deserialize, Serialize};

/// A cell location on a level grid. Plain value type, no ownership.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loc {
    pub x: i32,
    pub y: i32,
}

impl Loc {
    /// Offsets of the eight neighboring grids, cardinals first.
    pub const ADJACENT: [Loc; 8] = [
        Loc::new(0, -1),
        Loc::new(0, 1),
        Loc::new(-1, 0),
        Loc::new(1, 0),
        Loc::new(-1, -1),
        Loc::new(1, -1),
        Loc::new(-1, 1),
        Loc::new(1, 1),
    ];

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Translate by (dx, dy).
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// The grid one king-move step from `self` toward `other`.
    ///
    /// Returns `self` unchanged when the two coincide; axes that already
    /// match do not move. This is the "which face of a wall do I see"
    /// primitive used by the wall lighting rules.
    pub const fn toward(self, other: Loc) -> Self {
        Self::new(
            self.x + (other.x - self.x).signum(),
            self.y + (other.y - self.y).signum(),
        )
    }

    /// Chebyshev-adjacent or identical.
    pub const fn is_adjacent(self, other: Loc) -> bool {
        (self.x - other.x).abs() < 2 && (self.y - other.y).abs() < 2
    }
}
