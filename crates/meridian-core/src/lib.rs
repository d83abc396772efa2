//! Authoritative simulation core for Meridian.
//!
//! [`GameEngine`] owns every unit, city and civilization and is the only thing
//! that mutates them. The remaining modules are the pieces it is built from:
//! grid geometry, pathfinding, the per-civilization unit queue, go-to orders,
//! enemy search and victory evaluation.

mod city;
mod civ;
mod combat;
mod config;
mod engine;
mod enemy_search;
mod entities;
mod error;
mod goto;
mod grid;
mod map;
pub mod mapgen;
mod pathfinding;
mod rng;
mod rules;
mod unit;
mod unit_queue;
mod victory;
mod yields;

pub use crate::city::*;
pub use crate::civ::*;
pub use crate::combat::*;
pub use crate::config::*;
pub use crate::engine::*;
pub use crate::enemy_search::*;
pub use crate::entities::*;
pub use crate::error::*;
pub use crate::goto::*;
pub use crate::grid::*;
pub use crate::map::*;
pub use crate::mapgen::{generate_map, GeneratedMap, MapGenConfig};
pub use crate::pathfinding::*;
pub use crate::rng::*;
pub use crate::rules::*;
pub use crate::unit::*;
pub use crate::unit_queue::*;
pub use crate::victory::*;
pub use crate::yields::*;
