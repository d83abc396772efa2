//! Visibility-aware nearest-enemy search.
//!
//! Rings are scanned outward so the first hit is at minimal Chebyshev
//! distance; ties inside a ring fall to ring order. If every ring comes up
//! empty, a row-major sweep over tiles the rings did not touch runs as a
//! fallback.

use meridian_protocol::{CityId, CivId, Coord, UnitId};

use crate::grid::Grid;

/// Read-only view of what a searching civilization can see.
pub trait EnemyView {
    fn unit_at(&self, c: Coord) -> Option<(UnitId, CivId)>;
    fn city_at(&self, c: Coord) -> Option<(CityId, CivId)>;
    fn is_visible(&self, c: Coord) -> bool;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyTarget {
    Unit(UnitId),
    City(CityId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnemyHit {
    pub coord: Coord,
    pub target: EnemyTarget,
    pub owner: CivId,
    pub distance: u32,
}

#[derive(Clone, Copy, Debug)]
pub struct EnemySearcher {
    grid: Grid,
}

impl EnemySearcher {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            grid: Grid::new(width, height),
        }
    }

    /// Units are preferred over a city on the same tile.
    fn enemy_on(&self, c: Coord, view: &impl EnemyView, civ: CivId, origin: Coord) -> Option<EnemyHit> {
        let target = match view.unit_at(c) {
            Some((id, owner)) if owner != civ => Some((EnemyTarget::Unit(id), owner)),
            _ => match view.city_at(c) {
                Some((id, owner)) if owner != civ => Some((EnemyTarget::City(id), owner)),
                _ => None,
            },
        };
        target.map(|(target, owner)| EnemyHit {
            coord: c,
            target,
            owner,
            distance: Grid::distance(origin, c),
        })
    }

    pub fn find_nearest_enemy(
        &self,
        start: Coord,
        view: &impl EnemyView,
        civ: CivId,
        max_radius: Option<u32>,
    ) -> Option<EnemyHit> {
        let max_radius = max_radius.unwrap_or(self.grid.width().max(self.grid.height()));
        let mut scanned = vec![false; self.grid.len()];
        if let Some(i) = self.grid.index_of(start) {
            scanned[i] = true;
        }

        for radius in 1..=max_radius {
            for c in self.grid.ring(start, radius) {
                if let Some(i) = self.grid.index_of(c) {
                    scanned[i] = true;
                }
                if !view.is_visible(c) {
                    continue;
                }
                if let Some(hit) = self.enemy_on(c, view, civ, start) {
                    return Some(hit);
                }
            }
        }

        self.grid
            .coords()
            .zip(scanned)
            .filter(|&(c, seen)| !seen && view.is_visible(c))
            .find_map(|(c, _)| self.enemy_on(c, view, civ, start))
    }

    /// Every visible enemy within `radius`, nearest first. No fallback sweep.
    pub fn find_all_enemies_in_radius(
        &self,
        start: Coord,
        view: &impl EnemyView,
        civ: CivId,
        radius: u32,
    ) -> Vec<EnemyHit> {
        let mut hits: Vec<EnemyHit> = (1..=radius)
            .flat_map(|r| self.grid.ring(start, r))
            .filter(|&c| view.is_visible(c))
            .filter_map(|c| self.enemy_on(c, view, civ, start))
            .collect();
        hits.sort_by_key(|h| h.distance);
        hits
    }

    pub fn has_visible_enemy(&self, view: &impl EnemyView, civ: CivId) -> bool {
        self.grid
            .coords()
            .filter(|&c| view.is_visible(c))
            .any(|c| self.enemy_on(c, view, civ, c).is_some())
    }
}
