//! dm-core: visibility and lighting engine for the Duskmire server
//!
//! Computes, per player, which grids of a shared dungeon level are in line
//! of sight, which are seen, and how brightly each is lit, and reconciles
//! each recomputation into discovery and redraw callbacks. Many players can
//! share one level: a view pass reads shared terrain and occupant state but
//! writes only the acting player's own view array.
//!
//! This crate contains no I/O; rendering, networking and persistence sit on
//! top of the query predicates and event callbacks exposed here.

pub mod dungeon;
pub mod monster;
pub mod player;
pub mod vision;

mod consts;

pub use consts::*;
