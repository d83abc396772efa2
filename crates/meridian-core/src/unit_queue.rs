//! Per-civilization order of units still owed an action this turn.
//!
//! Entries are plain ids. A unit that became ineligible after it was queued
//! (destroyed, marked done, out of moves) is dropped lazily when it reaches
//! the front.

use std::collections::{HashMap, VecDeque};

use meridian_protocol::{CivId, UnitId};

use crate::{entities::EntityStore, unit::Unit};

/// Reported after every mutating call; the engine turns it into `UNIT_QUEUE_CHANGE`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueueChange {
    pub civ: CivId,
    pub current: Option<UnitId>,
    pub remaining: usize,
}

#[derive(Clone, Debug, Default)]
pub struct UnitTurnQueue {
    queues: HashMap<CivId, VecDeque<UnitId>>,
}

fn eligible(units: &EntityStore<Unit>, civ: CivId, id: UnitId) -> bool {
    units
        .get(id)
        .is_some_and(|u| u.owner == civ && u.can_act())
}

impl UnitTurnQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initialize_queue(&mut self, civ: CivId, units: &EntityStore<Unit>) -> QueueChange {
        let ids = units.ids_where(|u| u.owner == civ && u.can_act());
        self.queues.insert(civ, ids.into_iter().collect());
        self.settle_front(civ, units)
    }

    pub fn current_unit(&self, civ: CivId) -> Option<UnitId> {
        self.queues.get(&civ).and_then(|q| q.front().copied())
    }

    pub fn len(&self, civ: CivId) -> usize {
        self.queues.get(&civ).map_or(0, VecDeque::len)
    }

    pub fn is_queue_empty(&self, civ: CivId) -> bool {
        self.len(civ) == 0
    }

    pub fn contains(&self, civ: CivId, unit: UnitId) -> bool {
        self.queues.get(&civ).is_some_and(|q| q.contains(&unit))
    }

    /// Drops ineligible fronts until an actionable unit (or nothing) is current.
    fn settle_front(&mut self, civ: CivId, units: &EntityStore<Unit>) -> QueueChange {
        let queue = self.queues.entry(civ).or_default();
        while let Some(&front) = queue.front() {
            if eligible(units, civ, front) {
                break;
            }
            queue.pop_front();
        }
        QueueChange {
            civ,
            current: queue.front().copied(),
            remaining: queue.len(),
        }
    }

    pub fn next_unit(&mut self, civ: CivId, units: &EntityStore<Unit>) -> QueueChange {
        self.settle_front(civ, units)
    }

    /// Removes `unit` (or the current unit when `None`) and advances.
    pub fn unit_done(
        &mut self,
        civ: CivId,
        unit: Option<UnitId>,
        units: &EntityStore<Unit>,
    ) -> QueueChange {
        if let Some(queue) = self.queues.get_mut(&civ) {
            match unit {
                Some(id) => queue.retain(|&u| u != id),
                None => {
                    queue.pop_front();
                }
            }
        }
        self.settle_front(civ, units)
    }

    /// Sends the current unit to the back of the line.
    pub fn wait_unit(&mut self, civ: CivId, units: &EntityStore<Unit>) -> QueueChange {
        if let Some(queue) = self.queues.get_mut(&civ) {
            if let Some(front) = queue.pop_front() {
                queue.push_back(front);
            }
        }
        self.settle_front(civ, units)
    }

    /// Removes a unit from every civilization's queue.
    pub fn remove_unit(&mut self, unit: UnitId, units: &EntityStore<Unit>) -> Vec<QueueChange> {
        let affected: Vec<CivId> = self
            .queues
            .iter()
            .filter(|(_, q)| q.contains(&unit))
            .map(|(&civ, _)| civ)
            .collect();
        let mut changes = Vec::with_capacity(affected.len());
        for civ in affected {
            if let Some(queue) = self.queues.get_mut(&civ) {
                queue.retain(|&u| u != unit);
            }
            changes.push(self.settle_front(civ, units));
        }
        changes.sort_by_key(|c| c.civ);
        changes
    }

    pub fn add_unit(&mut self, civ: CivId, unit: UnitId, units: &EntityStore<Unit>) -> QueueChange {
        let queue = self.queues.entry(civ).or_default();
        if !queue.contains(&unit) {
            queue.push_back(unit);
        }
        self.settle_front(civ, units)
    }

    /// Re-checks a unit after it changed; finishes it if it no longer qualifies.
    pub fn check_unit_status(
        &mut self,
        civ: CivId,
        unit: UnitId,
        units: &EntityStore<Unit>,
    ) -> Option<QueueChange> {
        if !self.contains(civ, unit) || eligible(units, civ, unit) {
            return None;
        }
        Some(self.unit_done(civ, Some(unit), units))
    }

    /// Forgets one civilization's leftovers, e.g. units it never moved last turn.
    pub fn clear_civ(&mut self, civ: CivId) {
        self.queues.remove(&civ);
    }
}

#[cfg(test)]
mod tests {
    use meridian_protocol::{Coord, MovePoints, UnitKind};

    use super::*;
    use crate::rules::Rules;

    fn store_with(n: i32, civ: CivId) -> (EntityStore<Unit>, Vec<UnitId>) {
        let rules = Rules::embedded().unwrap();
        let mut store = EntityStore::default();
        let ids = (0..n)
            .map(|i| store.insert(Unit::new(UnitKind::Warrior, civ, Coord::new(i, 0), &rules)))
            .collect();
        (store, ids)
    }

    #[test]
    fn queue_drains_to_empty_without_revisiting() {
        let civ = CivId(0);
        let (units, ids) = store_with(4, civ);
        let mut queue = UnitTurnQueue::new();
        let change = queue.initialize_queue(civ, &units);
        assert_eq!(change.current, Some(ids[0]));
        assert_eq!(change.remaining, 4);

        let mut seen = Vec::new();
        while let Some(current) = queue.current_unit(civ) {
            assert!(!seen.contains(&current));
            seen.push(current);
            queue.unit_done(civ, None, &units);
        }
        assert!(queue.is_queue_empty(civ));
        assert_eq!(seen, ids);
    }

    #[test]
    fn wait_rotates_and_ineligible_fronts_are_dropped() {
        let civ = CivId(0);
        let (mut units, ids) = store_with(3, civ);
        let mut queue = UnitTurnQueue::new();
        queue.initialize_queue(civ, &units);

        let change = queue.wait_unit(civ, &units);
        assert_eq!(change.current, Some(ids[1]));

        units.get_mut(ids[1]).unwrap().moves_remaining = MovePoints::ZERO;
        units.remove(ids[2]);
        let change = queue.next_unit(civ, &units);
        assert_eq!(change.current, Some(ids[0]));
        assert_eq!(change.remaining, 1);
    }

    #[test]
    fn explicit_done_and_status_check() {
        let civ = CivId(1);
        let (mut units, ids) = store_with(3, civ);
        let mut queue = UnitTurnQueue::new();
        queue.initialize_queue(civ, &units);

        let change = queue.unit_done(civ, Some(ids[1]), &units);
        assert_eq!(change.current, Some(ids[0]));
        assert_eq!(change.remaining, 2);

        assert!(queue.check_unit_status(civ, ids[2], &units).is_none());
        units.get_mut(ids[2]).unwrap().turn_done = true;
        let change = queue.check_unit_status(civ, ids[2], &units).unwrap();
        assert_eq!(change.remaining, 1);
    }

    #[test]
    fn remove_and_add_cross_civ() {
        let (mut units, ids) = store_with(2, CivId(0));
        let mut queue = UnitTurnQueue::new();
        queue.initialize_queue(CivId(0), &units);

        let changes = queue.remove_unit(ids[0], &units);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].current, Some(ids[1]));

        let rules = Rules::embedded().unwrap();
        let fresh = units.insert(Unit::new(UnitKind::Settler, CivId(0), Coord::new(5, 5), &rules));
        let change = queue.add_unit(CivId(0), fresh, &units);
        assert_eq!(change.remaining, 2);
        assert!(queue.remove_unit(ids[0], &units).is_empty());
    }
}
