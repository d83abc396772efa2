use serde::{Deserialize, Serialize};

use crate::{MovePoints, TechId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainKind {
    Grassland,
    Plains,
    Desert,
    Tundra,
    Forest,
    Jungle,
    Swamp,
    Hills,
    Mountains,
    Coast,
    Ocean,
}

impl TerrainKind {
    pub const ALL: [TerrainKind; 11] = [
        TerrainKind::Grassland,
        TerrainKind::Plains,
        TerrainKind::Desert,
        TerrainKind::Tundra,
        TerrainKind::Forest,
        TerrainKind::Jungle,
        TerrainKind::Swamp,
        TerrainKind::Hills,
        TerrainKind::Mountains,
        TerrainKind::Coast,
        TerrainKind::Ocean,
    ];

    /// Base cost to enter a tile of this terrain, before road/river/railroad adjustments.
    pub const fn movement_cost(self) -> MovePoints {
        match self {
            TerrainKind::Forest | TerrainKind::Jungle | TerrainKind::Swamp | TerrainKind::Hills => {
                MovePoints::from_moves(2)
            }
            TerrainKind::Mountains => MovePoints::from_moves(3),
            _ => MovePoints::from_moves(1),
        }
    }

    pub const fn is_water(self) -> bool {
        matches!(self, TerrainKind::Coast | TerrainKind::Ocean)
    }

    /// Elevated terrain extends unit sight by one tile.
    pub const fn is_elevated(self) -> bool {
        matches!(self, TerrainKind::Hills | TerrainKind::Mountains)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Settler,
    Worker,
    Warrior,
    Archer,
    Spearman,
    Horseman,
    Swordsman,
    Catapult,
    Knight,
    Musketeer,
    Cannon,
    Trireme,
    Caravel,
    Frigate,
}

impl UnitKind {
    pub const ALL: [UnitKind; 14] = [
        UnitKind::Settler,
        UnitKind::Worker,
        UnitKind::Warrior,
        UnitKind::Archer,
        UnitKind::Spearman,
        UnitKind::Horseman,
        UnitKind::Swordsman,
        UnitKind::Catapult,
        UnitKind::Knight,
        UnitKind::Musketeer,
        UnitKind::Cannon,
        UnitKind::Trireme,
        UnitKind::Caravel,
        UnitKind::Frigate,
    ];

    /// Units restricted to water tiles.
    pub const NAVAL: [UnitKind; 3] = [UnitKind::Trireme, UnitKind::Caravel, UnitKind::Frigate];

    pub fn is_naval(self) -> bool {
        Self::NAVAL.contains(&self)
    }

    pub const fn can_found_city(self) -> bool {
        matches!(self, UnitKind::Settler)
    }

    pub const fn can_build_improvements(self) -> bool {
        matches!(self, UnitKind::Settler | UnitKind::Worker)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingKind {
    Granary,
    Workshop,
    Library,
    Marketplace,
    Harbor,
    Aqueduct,
    University,
}

impl BuildingKind {
    pub const ALL: [BuildingKind; 7] = [
        BuildingKind::Granary,
        BuildingKind::Workshop,
        BuildingKind::Library,
        BuildingKind::Marketplace,
        BuildingKind::Harbor,
        BuildingKind::Aqueduct,
        BuildingKind::University,
    ];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImprovementKind {
    Road,
    Irrigation,
    Mine,
    Railroad,
}

impl ImprovementKind {
    pub const ALL: [ImprovementKind; 4] = [
        ImprovementKind::Road,
        ImprovementKind::Irrigation,
        ImprovementKind::Mine,
        ImprovementKind::Railroad,
    ];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Wheat,
    Cattle,
    Fish,
    Iron,
    Gold,
    Horses,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 6] = [
        ResourceKind::Wheat,
        ResourceKind::Cattle,
        ResourceKind::Fish,
        ResourceKind::Iron,
        ResourceKind::Gold,
        ResourceKind::Horses,
    ];
}

/// Something a city can build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ProductionItem {
    Unit(UnitKind),
    Building(BuildingKind),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    #[default]
    Active,
    Fortified,
    Sleeping,
    Skipped,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "improvement", rename_all = "snake_case")]
pub enum UnitAction {
    Sleep,
    Wake,
    Fortify,
    Skip,
    BuildImprovement(ImprovementKind),
}

/// Technology availability as seen by one civilization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechStatus {
    pub id: TechId,
    pub cost: i32,
    pub known: bool,
    pub available: bool,
}

/// Handicap applied to AI civilizations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Chieftain,
    Warlord,
    #[default]
    Prince,
    King,
    Emperor,
}

impl Difficulty {
    /// Percent added to AI city production.
    pub const fn ai_production_bonus(self) -> i32 {
        match self {
            Difficulty::Chieftain => 0,
            Difficulty::Warlord => 10,
            Difficulty::Prince => 20,
            Difficulty::King => 35,
            Difficulty::Emperor => 50,
        }
    }

    /// Warriors each AI civilization receives on top of the standard start.
    pub const fn ai_extra_units(self) -> u32 {
        match self {
            Difficulty::Chieftain | Difficulty::Warlord => 0,
            Difficulty::Prince | Difficulty::King => 1,
            Difficulty::Emperor => 2,
        }
    }
}
