use std::collections::VecDeque;

use meridian_protocol::{BuildingKind, CityId, CitySnapshot, CivId, Coord, ProductionItem};
use serde::{Deserialize, Serialize};

use crate::{
    map::{GameMap, Tile},
    rules::Rules,
    yields::Yields,
};

pub const FOOD_PER_CITIZEN: i32 = 2;
pub const FOOD_BOX_PER_POP: i32 = 20;
pub const WORK_RADIUS: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub owner: CivId,
    pub position: Coord,
    pub population: u32,
    pub food_stored: i32,
    pub production_stored: i32,
    /// Cached per-turn output; refreshed by `refresh_yields`.
    pub yields: Yields,
    pub producing: Option<ProductionItem>,
    pub build_queue: VecDeque<ProductionItem>,
    pub buildings: Vec<BuildingKind>,
    pub is_capital: bool,
    /// Bought items delivered when the owner's turn ends.
    pub purchased: Vec<ProductionItem>,
}

impl City {
    pub fn new(name: String, owner: CivId, position: Coord) -> Self {
        Self {
            name,
            owner,
            position,
            population: 1,
            food_stored: 0,
            production_stored: 0,
            yields: Yields::default(),
            producing: None,
            build_queue: VecDeque::new(),
            buildings: Vec::new(),
            is_capital: false,
            purchased: Vec::new(),
        }
    }

    pub fn food_needed(&self) -> i32 {
        self.population as i32 * FOOD_BOX_PER_POP
    }

    pub fn has_building(&self, kind: BuildingKind) -> bool {
        self.buildings.contains(&kind)
    }

    /// True if the building is built, in production, queued or already bought.
    pub fn has_or_plans_building(&self, kind: BuildingKind) -> bool {
        self.producing == Some(ProductionItem::Building(kind))
            || self.has_or_plans_building_besides_current(kind)
    }

    /// [`has_or_plans_building`](Self::has_or_plans_building) without the
    /// production slot, for when that slot is about to be replaced.
    pub fn has_or_plans_building_besides_current(&self, kind: BuildingKind) -> bool {
        let item = ProductionItem::Building(kind);
        self.has_building(kind) || self.build_queue.contains(&item) || self.purchased.contains(&item)
    }

    /// Pulls the next queued item into production when idle.
    pub fn pull_from_queue(&mut self) -> Option<ProductionItem> {
        if self.producing.is_none() {
            self.producing = self.build_queue.pop_front();
        }
        self.producing
    }

    pub fn refresh_yields(&mut self, map: &GameMap, rules: &Rules) {
        self.yields = city_yields(self, map, rules);
    }

    pub fn snapshot(&self, id: CityId) -> CitySnapshot {
        CitySnapshot {
            id,
            name: self.name.clone(),
            owner: self.owner,
            position: self.position,
            population: self.population,
            food_stored: self.food_stored,
            food_needed: self.food_needed(),
            production_stored: self.production_stored,
            yields: self.yields.to_city_yields(),
            producing: self.producing,
            build_queue: self.build_queue.iter().copied().collect(),
            buildings: self.buildings.clone(),
            is_capital: self.is_capital,
        }
    }
}

pub fn tile_yields(tile: &Tile, rules: &Rules) -> Yields {
    let terrain = rules.terrain(tile.terrain);
    let mut total = Yields {
        food: terrain.food,
        production: terrain.production,
        trade: terrain.trade,
        ..Yields::default()
    };
    if let Some(resource) = tile.resource {
        let r = rules.resource(resource);
        total += Yields {
            food: r.food,
            production: r.production,
            trade: r.trade,
            ..Yields::default()
        };
    }
    if tile.river {
        total.trade += 1;
    }
    if let Some(improvement) = tile.improvement {
        total += rules.improvement(improvement).yields_on(tile.terrain);
    }
    total
}

/// City center plus the best `population` tiles in the work radius, building
/// bonuses added, food net of citizen upkeep.
pub fn city_yields(city: &City, map: &GameMap, rules: &Rules) -> Yields {
    let mut total = map
        .get(city.position)
        .map(|t| tile_yields(t, rules))
        .unwrap_or_default();

    let mut worked: Vec<Yields> = map
        .grid()
        .tiles_in_range(city.position, WORK_RADIUS)
        .into_iter()
        .filter(|&c| c != city.position)
        .filter_map(|c| map.get(c))
        .map(|t| tile_yields(t, rules))
        .collect();
    worked.sort_by(|a, b| b.work_score().cmp(&a.work_score()));
    for y in worked.into_iter().take(city.population as usize) {
        total += y;
    }

    for &kind in &city.buildings {
        let b = rules.building(kind);
        total += Yields {
            food: b.food,
            production: b.production,
            trade: 0,
            science: b.science,
            gold: b.gold,
        };
    }

    total.food -= city.population as i32 * FOOD_PER_CITIZEN;
    total
}
