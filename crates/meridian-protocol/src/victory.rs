use serde::{Deserialize, Serialize};

use crate::CivId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VictoryReason {
    /// Every rival (or the player) has no units and no cities left.
    Elimination,
    /// The designated victory technology was researched.
    Moonshot,
}

/// Final result reported with `GAME_WON` / `GAME_LOST`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOutcome {
    pub civilization_id: CivId,
    pub civ_name: String,
    pub reason: VictoryReason,
    pub is_human: bool,
    pub won: bool,
}
