use serde::{Deserialize, Serialize};

use crate::{
    BuildingKind, CityId, CitySnapshot, CivId, Coord, GameOutcome, ImprovementKind,
    ProductionItem, TechId, UnitId, UnitSnapshot, UnitStatus,
};

/// Discrete notifications emitted after the corresponding state change completes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameEvent {
    // Units
    UnitMoved {
        unit: UnitSnapshot,
        target: Coord,
    },
    CombatVictory {
        attacker: UnitSnapshot,
        defender: UnitSnapshot,
    },
    CombatDefeat {
        attacker: UnitSnapshot,
        defender: UnitSnapshot,
    },
    UnitDestroyed {
        unit: UnitId,
        owner: CivId,
    },
    UnitStatusChanged {
        unit: UnitId,
        status: UnitStatus,
    },
    UnitProduced {
        city_id: CityId,
        unit: UnitSnapshot,
    },
    UnitPurchased {
        city_id: CityId,
        unit: UnitSnapshot,
    },
    UnitQueueChange {
        civilization_id: CivId,
        current_unit_id: Option<UnitId>,
        queue_length: usize,
    },
    ImprovementBuilt {
        at: Coord,
        improvement: ImprovementKind,
    },

    // Cities
    BuildingCompleted {
        city_id: CityId,
        building_type: BuildingKind,
    },
    BuildingPurchased {
        city_id: CityId,
        building_type: BuildingKind,
    },
    CityFounded {
        city: CitySnapshot,
        settler: UnitSnapshot,
    },
    CityCaptured {
        city: CitySnapshot,
        previous_owner: CivId,
    },
    CityGrew {
        city_id: CityId,
        population: u32,
    },
    CityProductionChanged {
        city_id: CityId,
        item: ProductionItem,
        queued: bool,
    },

    // Civilizations
    TechResearched {
        civilization_id: CivId,
        tech: TechId,
    },
    CivilizationsUpdated {
        alive: Vec<(CivId, bool)>,
    },
    CivilizationEliminated {
        civilization_id: CivId,
    },

    // Turn flow
    TurnProcessed {
        civilization_id: CivId,
    },
    AiFinished {
        civilization_id: CivId,
    },
    AutoEndTurn {
        civilization_id: CivId,
    },
    TurnEndConfirmationNeeded {
        civilization_id: CivId,
    },
    GameWon {
        outcome: GameOutcome,
    },
    GameLost {
        outcome: GameOutcome,
    },
}

impl GameEvent {
    /// The wire name of this event (`UNIT_MOVED`, `GAME_WON`, ...).
    pub fn name(&self) -> &'static str {
        match self {
            GameEvent::UnitMoved { .. } => "UNIT_MOVED",
            GameEvent::CombatVictory { .. } => "COMBAT_VICTORY",
            GameEvent::CombatDefeat { .. } => "COMBAT_DEFEAT",
            GameEvent::UnitDestroyed { .. } => "UNIT_DESTROYED",
            GameEvent::UnitStatusChanged { .. } => "UNIT_STATUS_CHANGED",
            GameEvent::UnitProduced { .. } => "UNIT_PRODUCED",
            GameEvent::UnitPurchased { .. } => "UNIT_PURCHASED",
            GameEvent::UnitQueueChange { .. } => "UNIT_QUEUE_CHANGE",
            GameEvent::ImprovementBuilt { .. } => "IMPROVEMENT_BUILT",
            GameEvent::BuildingCompleted { .. } => "BUILDING_COMPLETED",
            GameEvent::BuildingPurchased { .. } => "BUILDING_PURCHASED",
            GameEvent::CityFounded { .. } => "CITY_FOUNDED",
            GameEvent::CityCaptured { .. } => "CITY_CAPTURED",
            GameEvent::CityGrew { .. } => "CITY_GREW",
            GameEvent::CityProductionChanged { .. } => "CITY_PRODUCTION_CHANGED",
            GameEvent::TechResearched { .. } => "TECH_RESEARCHED",
            GameEvent::CivilizationsUpdated { .. } => "CIVILIZATIONS_UPDATED",
            GameEvent::CivilizationEliminated { .. } => "CIVILIZATION_ELIMINATED",
            GameEvent::TurnProcessed { .. } => "TURN_PROCESSED",
            GameEvent::AiFinished { .. } => "AI_FINISHED",
            GameEvent::AutoEndTurn { .. } => "AUTO_END_TURN",
            GameEvent::TurnEndConfirmationNeeded { .. } => "TURN_END_CONFIRMATION_NEEDED",
            GameEvent::GameWon { .. } => "GAME_WON",
            GameEvent::GameLost { .. } => "GAME_LOST",
        }
    }
}
