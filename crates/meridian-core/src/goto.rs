//! Multi-turn movement orders.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use meridian_protocol::{Coord, MovePoints, MoveReason, MoveResult, UnitId, UnitKind};

use crate::{map::GameMap, pathfinding::find_path};

/// What the stepper needs from whoever owns the units.
pub trait UnitMover {
    fn moves_remaining(&self, unit: UnitId) -> Option<MovePoints>;
    fn move_unit(&mut self, unit: UnitId, target: Coord) -> MoveResult;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GotoOutcome {
    /// One step taken; both path and moves remain.
    Stepped,
    /// The destination was reached and the order removed.
    Completed,
    /// Out of moves; the remaining path waits for the next turn.
    MovesExhausted,
    /// No stored path for this unit.
    NoPath,
    /// The unit no longer exists; its path was dropped.
    UnitMissing,
    /// A step was rejected; the path is left as it was.
    Failed(MoveReason),
}

#[derive(Clone, Debug, Default)]
pub struct GoToManager {
    paths: HashMap<UnitId, VecDeque<Coord>>,
}

impl GoToManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plans and stores a route without the unit's own tile. Returns false if there is none.
    pub fn calculate_path(
        &mut self,
        unit: UnitId,
        kind: UnitKind,
        start: Coord,
        goal: Coord,
        map: &GameMap,
    ) -> bool {
        let result = find_path(start, goal, |c| map.get(c), kind, map.width(), map.height());
        if !result.success || result.path.len() < 2 {
            self.paths.remove(&unit);
            return false;
        }
        self.paths
            .insert(unit, result.path.into_iter().skip(1).collect());
        true
    }

    pub fn has_path(&self, unit: UnitId) -> bool {
        self.paths.get(&unit).is_some_and(|p| !p.is_empty())
    }

    pub fn path(&self, unit: UnitId) -> Option<&VecDeque<Coord>> {
        self.paths.get(&unit)
    }

    /// Units holding orders, in id order.
    pub fn units_with_paths(&self) -> Vec<UnitId> {
        let mut ids: Vec<UnitId> = self.paths.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn clear_path(&mut self, unit: UnitId) {
        self.paths.remove(&unit);
    }

    pub fn retain_units(&mut self, mut keep: impl FnMut(UnitId) -> bool) {
        self.paths.retain(|&id, _| keep(id));
    }

    pub fn execute_first_step(&mut self, unit: UnitId, mover: &mut impl UnitMover) -> GotoOutcome {
        let Some(moves) = mover.moves_remaining(unit) else {
            self.paths.remove(&unit);
            return GotoOutcome::UnitMissing;
        };
        let Some(&next) = self.paths.get(&unit).and_then(|p| p.front()) else {
            self.paths.remove(&unit);
            return GotoOutcome::NoPath;
        };
        if moves.is_zero() {
            return GotoOutcome::MovesExhausted;
        }

        let result = mover.move_unit(unit, next);
        if !result.success {
            return GotoOutcome::Failed(result.reason.unwrap_or(MoveReason::InvalidTarget));
        }

        let finished = match self.paths.get_mut(&unit) {
            Some(path) => {
                path.pop_front();
                path.is_empty()
            }
            None => true,
        };
        if finished {
            self.paths.remove(&unit);
            return GotoOutcome::Completed;
        }
        match mover.moves_remaining(unit) {
            None => {
                self.paths.remove(&unit);
                GotoOutcome::UnitMissing
            }
            Some(m) if m.is_zero() => GotoOutcome::MovesExhausted,
            Some(_) => GotoOutcome::Stepped,
        }
    }

    /// Steps until the path ends, moves run out or a step fails.
    pub fn execute_path(&mut self, unit: UnitId, mover: &mut impl UnitMover) -> GotoOutcome {
        loop {
            let outcome = self.execute_first_step(unit, mover);
            if outcome != GotoOutcome::Stepped {
                return outcome;
            }
        }
    }

    /// Same as [`execute_path`](Self::execute_path), pausing between steps so
    /// observers can animate. A zero delay only yields to the scheduler.
    pub async fn execute_path_with_delay(
        &mut self,
        unit: UnitId,
        mover: &mut impl UnitMover,
        delay: Duration,
    ) -> GotoOutcome {
        loop {
            let outcome = self.execute_first_step(unit, mover);
            if outcome != GotoOutcome::Stepped {
                return outcome;
            }
            if delay.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(delay).await;
            }
        }
    }
}
