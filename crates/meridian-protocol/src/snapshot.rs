use serde::{Deserialize, Serialize};

use crate::{
    BuildingKind, CityId, CivId, Coord, ImprovementKind, MovePoints, ProductionItem, ResourceKind,
    TechId, TerrainKind, UnitId, UnitKind, UnitStatus,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    pub id: UnitId,
    pub owner: CivId,
    pub kind: UnitKind,
    pub position: Coord,
    pub health: i32,
    pub moves_remaining: MovePoints,
    pub status: UnitStatus,
    pub has_path: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityYields {
    pub food: i32,
    pub production: i32,
    pub trade: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CitySnapshot {
    pub id: CityId,
    pub name: String,
    pub owner: CivId,
    pub position: Coord,
    pub population: u32,
    pub food_stored: i32,
    pub food_needed: i32,
    pub production_stored: i32,
    pub yields: CityYields,
    pub producing: Option<ProductionItem>,
    pub build_queue: Vec<ProductionItem>,
    pub buildings: Vec<BuildingKind>,
    pub is_capital: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CivSnapshot {
    pub id: CivId,
    pub name: String,
    pub is_human: bool,
    pub is_alive: bool,
    pub gold: i32,
    pub science: i32,
    pub researching: Option<TechId>,
    pub research_progress: i32,
    pub known_techs: Vec<TechId>,
    pub capital: Option<CityId>,
}

/// A tile as seen by one civilization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSnapshot {
    pub position: Coord,
    pub terrain: TerrainKind,
    pub resource: Option<ResourceKind>,
    pub improvement: Option<ImprovementKind>,
    pub river: bool,
    pub visible: bool,
    pub explored: bool,
}
