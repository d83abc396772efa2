use meridian_protocol::{CivId, Coord, MovePoints, UnitId, UnitKind, UnitSnapshot, UnitStatus};
use serde::{Deserialize, Serialize};

use crate::{map::Tile, rules::Rules};

pub const MAX_HEALTH: i32 = 100;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub kind: UnitKind,
    pub owner: CivId,
    pub position: Coord,
    pub health: i32,
    pub moves_remaining: MovePoints,
    pub max_moves: MovePoints,
    pub attack: i32,
    pub defense: i32,
    pub status: UnitStatus,
    /// Set once the unit is owed no further action this turn.
    pub turn_done: bool,
}

impl Unit {
    pub fn new(kind: UnitKind, owner: CivId, position: Coord, rules: &Rules) -> Self {
        let stats = rules.unit(kind);
        let max_moves = MovePoints::from_moves(stats.moves);
        Self {
            kind,
            owner,
            position,
            health: MAX_HEALTH,
            moves_remaining: max_moves,
            max_moves,
            attack: stats.attack,
            defense: stats.defense,
            status: UnitStatus::Active,
            turn_done: false,
        }
    }

    /// Start-of-turn refresh. Sleeping and fortified units stay out of the queue.
    pub fn begin_turn(&mut self) {
        self.moves_remaining = self.max_moves;
        if self.status == UnitStatus::Skipped {
            self.status = UnitStatus::Active;
        }
        self.turn_done = matches!(self.status, UnitStatus::Sleeping | UnitStatus::Fortified);
    }

    pub fn can_act(&self) -> bool {
        !self.turn_done && !self.moves_remaining.is_zero()
    }

    pub fn sight_radius(&self, standing_on: &Tile) -> u32 {
        if standing_on.terrain.is_elevated() {
            2
        } else {
            1
        }
    }

    pub fn snapshot(&self, id: UnitId, has_path: bool) -> UnitSnapshot {
        UnitSnapshot {
            id,
            owner: self.owner,
            kind: self.kind,
            position: self.position,
            health: self.health,
            moves_remaining: self.moves_remaining,
            status: self.status,
            has_path,
        }
    }
}
