use serde::{Deserialize, Serialize};

use crate::{CityId, CivId, Coord, Difficulty, ProductionItem, TechId, UnitAction, UnitId};

/// Requests an external collaborator may submit to the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
    /// Starts a fresh game with these setup parameters. Settings not named
    /// here (seed, science split, AI tuning) keep their current values.
    Initialize {
        difficulty: Difficulty,
        map_width: u32,
        map_height: u32,
        civ_count: u8,
        /// `None` lets the AI play every civilization.
        player_civ: Option<u8>,
        starting_year: i32,
        starting_gold: i32,
    },
    NewGame,
    AdvanceTurn,
    MoveUnit {
        unit: UnitId,
        col: i32,
        row: i32,
    },
    GoTo {
        unit: UnitId,
        target: Coord,
    },
    FoundCity {
        settler: UnitId,
    },
    SetResearch {
        civ: CivId,
        tech: TechId,
    },
    SetProduction {
        city: CityId,
        item: ProductionItem,
        queue: bool,
    },
    PurchaseProduction {
        city: CityId,
        item: ProductionItem,
    },
    RemoveFromQueue {
        city: CityId,
        index: usize,
    },
    UnitAction {
        unit: UnitId,
        action: UnitAction,
    },
    NextUnit {
        civ: CivId,
    },
    WaitUnit {
        civ: CivId,
    },
    UnitDone {
        civ: CivId,
        unit: Option<UnitId>,
    },
}
