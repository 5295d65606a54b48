//! Core game constants

/// Maximum distance at which anything can enter a player's view
pub const MAX_SIGHT: i32 = 20;

/// Level size bounds. The fixed-point line-of-sight arithmetic works in
/// i32 and stays far from overflow within these dimensions.
pub const MAX_LEVEL_WID: usize = 198;
pub const MAX_LEVEL_HGT: usize = 66;

/// Marked squares placed on a level for the level feeling
pub const FEELING_TOTAL: u32 = 100;

/// Marked squares a player must see before the level feeling is announced
pub const FEELING_NEED: u32 = 10;
