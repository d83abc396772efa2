use meridian_protocol::{
    BuildingKind, CityId, CivId, Coord, GameEvent, MovePoints, ProductionItem, UnitId, UnitKind,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::GameEngine;
use crate::{city::City, error::GameError, grid::Grid, yields::Yields};

/// Cities closer than this (Chebyshev) to an existing city cannot be founded.
const MIN_CITY_DISTANCE: u32 = 3;
const PURCHASE_COST_MULTIPLIER: i32 = 2;

#[derive(Debug, Error)]
enum MalformedCity {
    #[error("city {0:?} no longer exists")]
    Missing(CityId),
    #[error("owner {0} has no civilization record")]
    UnknownOwner(CivId),
    #[error("city tile {0} is off the map")]
    OffMap(Coord),
}

impl GameEngine {
    /// Turns a settler into a city on its tile. The settler is consumed.
    pub fn found_city(&mut self, settler: UnitId) -> Result<CityId, GameError> {
        let u = self.active_unit(settler)?;
        if !u.kind.can_found_city() {
            return Err(GameError::NotASettler);
        }
        if u.moves_remaining.is_zero() {
            return Err(GameError::CannotFoundCity);
        }
        let owner = u.owner;
        let at = u.position;
        let tile = self.map.get(at).ok_or(GameError::CannotFoundCity)?;
        if tile.terrain.is_water() {
            return Err(GameError::WaterTile);
        }
        if self
            .cities
            .iter_ordered()
            .any(|(_, c)| Grid::distance(c.position, at) <= MIN_CITY_DISTANCE)
        {
            return Err(GameError::CityTooClose {
                min_distance: MIN_CITY_DISTANCE,
            });
        }

        if let Some(u) = self.units.get_mut(settler) {
            u.moves_remaining = MovePoints::ZERO;
        }
        let settler_snapshot = self
            .unit_snapshot(settler)
            .ok_or(GameError::UnitNotFound)?;
        self.take_unit(settler);
        let city = self.place_city(owner, at);

        if let Some(snapshot) = self.city_snapshot(city) {
            info!(city = %snapshot.name, civ = %owner, %at, "city founded");
            self.emit(GameEvent::CityFounded {
                city: snapshot,
                settler: settler_snapshot,
            });
        }
        if owner == self.active && self.queue.is_queue_empty(owner) && self.is_human(owner) {
            self.check_turn_end(owner);
        }
        Ok(city)
    }

    /// Creates a city without a settler. A civilization's first city is its capital.
    pub fn place_city(&mut self, owner: CivId, at: Coord) -> CityId {
        let name = match self.civs.get_mut(owner.index()) {
            Some(civ) => civ.next_city_name(),
            None => format!("City {}", self.cities.len() + 1),
        };
        let mut city = City::new(name, owner, at);
        city.refresh_yields(&self.map, &self.rules);
        let id = self.cities.insert(city);

        if let Some(civ) = self.civs.get_mut(owner.index()) {
            if civ.capital.is_none() {
                civ.capital = Some(id);
                if let Some(city) = self.cities.get_mut(id) {
                    city.is_capital = true;
                }
            }
        }
        self.refresh_visibility(owner);
        id
    }

    pub fn item_cost(&self, item: ProductionItem) -> i32 {
        match item {
            ProductionItem::Unit(kind) => self.rules.unit(kind).cost,
            ProductionItem::Building(kind) => self.rules.building(kind).cost,
        }
    }

    fn is_coastal(&self, at: Coord) -> bool {
        self.map
            .grid()
            .neighbors(at)
            .any(|c| self.map.get(c).is_some_and(|t| t.terrain.is_water()))
    }

    /// `replacing_current` leaves the item now in production out of the
    /// duplicate-building check.
    fn can_produce(&self, city: &City, item: ProductionItem, replacing_current: bool) -> bool {
        let Some(civ) = self.civ(city.owner) else {
            return false;
        };
        let known = &civ.known_techs;
        match item {
            ProductionItem::Unit(kind) => {
                self.rules
                    .tech_requirement_met(self.rules.unit(kind).requires_tech.as_ref(), known)
                    && (!kind.is_naval() || self.is_coastal(city.position))
            }
            ProductionItem::Building(kind) => {
                let planned = if replacing_current {
                    city.has_or_plans_building_besides_current(kind)
                } else {
                    city.has_or_plans_building(kind)
                };
                self.rules
                    .tech_requirement_met(self.rules.building(kind).requires_tech.as_ref(), known)
                    && !planned
                    && (kind != BuildingKind::Harbor || self.is_coastal(city.position))
            }
        }
    }

    /// Everything the city could start or queue right now, units first.
    pub fn available_production(&self, city: CityId) -> Vec<ProductionItem> {
        let Some(c) = self.cities.get(city) else {
            return Vec::new();
        };
        UnitKind::ALL
            .iter()
            .map(|&k| ProductionItem::Unit(k))
            .chain(BuildingKind::ALL.iter().map(|&k| ProductionItem::Building(k)))
            .filter(|&item| self.can_produce(c, item, false))
            .collect()
    }

    /// Replaces the current item, or appends to the queue when `queue` is set
    /// and something is already in production. Stored production carries over.
    pub fn set_production(
        &mut self,
        city: CityId,
        item: ProductionItem,
        queue: bool,
    ) -> Result<(), GameError> {
        let c = self.cities.get(city).ok_or(GameError::CityNotFound)?;
        let queued = queue && c.producing.is_some();
        if !self.can_produce(c, item, !queued) {
            return Err(GameError::ItemNotAvailable);
        }
        let c = self.cities.get_mut(city).ok_or(GameError::CityNotFound)?;
        if queued {
            c.build_queue.push_back(item);
        } else {
            c.producing = Some(item);
        }
        debug!(city = %c.name, ?item, queued, "production changed");
        self.emit(GameEvent::CityProductionChanged {
            city_id: city,
            item,
            queued,
        });
        Ok(())
    }

    /// Buys an item for twice its cost; it arrives when the owner's turn ends.
    pub fn purchase_production(&mut self, city: CityId, item: ProductionItem) -> Result<(), GameError> {
        let c = self.cities.get(city).ok_or(GameError::CityNotFound)?;
        if !self.can_produce(c, item, false) {
            return Err(GameError::ItemNotAvailable);
        }
        let owner = c.owner;
        let price = self.item_cost(item) * PURCHASE_COST_MULTIPLIER;
        let civ = self
            .civs
            .get_mut(owner.index())
            .ok_or(GameError::CivilizationNotFound)?;
        if civ.gold < price {
            return Err(GameError::NotEnoughGold {
                needed: price,
                available: civ.gold,
            });
        }
        civ.gold -= price;
        if let Some(c) = self.cities.get_mut(city) {
            c.purchased.push(item);
            debug!(city = %c.name, ?item, price, "production purchased");
        }
        Ok(())
    }

    pub fn remove_from_queue(&mut self, city: CityId, index: usize) -> Result<ProductionItem, GameError> {
        let c = self.cities.get_mut(city).ok_or(GameError::CityNotFound)?;
        c.build_queue
            .remove(index)
            .ok_or(GameError::InvalidQueueIndex(index))
    }

    /// Hands over everything `civ` bought this turn. Units with nowhere to
    /// stand stay on order until a tile frees up.
    pub(super) fn deliver_purchases(&mut self, civ: CivId) {
        for city_id in self.city_ids(civ) {
            let Some(city) = self.cities.get_mut(city_id) else {
                continue;
            };
            let position = city.position;
            let items = std::mem::take(&mut city.purchased);
            let mut undelivered = Vec::new();
            for item in items {
                match item {
                    ProductionItem::Unit(kind) => match self.find_spawn_tile(position, kind) {
                        Some(spot) => {
                            let unit = self.spawn_unit(kind, civ, spot);
                            if let Some(snapshot) = self.unit_snapshot(unit) {
                                self.emit(GameEvent::UnitPurchased {
                                    city_id,
                                    unit: snapshot,
                                });
                            }
                        }
                        None => undelivered.push(item),
                    },
                    ProductionItem::Building(kind) => {
                        if let Some(city) = self.cities.get_mut(city_id) {
                            if !city.has_building(kind) {
                                city.buildings.push(kind);
                            }
                            city.refresh_yields(&self.map, &self.rules);
                        }
                        self.emit(GameEvent::BuildingPurchased {
                            city_id,
                            building_type: kind,
                        });
                    }
                }
            }
            if let Some(city) = self.cities.get_mut(city_id) {
                city.purchased = undelivered;
            }
        }
    }

    /// Growth and production for every city `civ` owns.
    pub(super) fn process_cities(&mut self, civ: CivId) {
        for city in self.city_ids(civ) {
            if let Err(err) = self.process_city(city) {
                warn!(?city, %err, "skipping malformed city");
            }
        }
    }

    fn process_city(&mut self, id: CityId) -> Result<(), MalformedCity> {
        let city = self.cities.get(id).ok_or(MalformedCity::Missing(id))?;
        let owner = city.owner;
        let position = city.position;
        let civ = self.civ(owner).ok_or(MalformedCity::UnknownOwner(owner))?;
        self.map.get(position).ok_or(MalformedCity::OffMap(position))?;
        let bonus = if civ.is_human {
            0
        } else {
            self.settings.difficulty.ai_production_bonus()
        };

        let city = self.cities.get_mut(id).ok_or(MalformedCity::Missing(id))?;
        city.refresh_yields(&self.map, &self.rules);
        city.pull_from_queue();

        city.food_stored = (city.food_stored + city.yields.food).max(0);
        let grew = city.food_stored >= city.food_needed();
        if grew {
            city.population += 1;
            city.food_stored = 0;
            city.refresh_yields(&self.map, &self.rules);
        }
        let population = city.population;

        let production = city.yields.production.max(0);
        city.production_stored += production + production * bonus / 100;
        let producing = city.producing;

        if grew {
            debug!(?id, population, "city grew");
            self.emit(GameEvent::CityGrew {
                city_id: id,
                population,
            });
        }

        let Some(item) = producing else {
            return Ok(());
        };
        let stored = self.cities.get(id).map_or(0, |c| c.production_stored);
        if stored < self.item_cost(item) {
            return Ok(());
        }

        match item {
            ProductionItem::Unit(kind) => {
                let Some(spot) = self.find_spawn_tile(position, kind) else {
                    debug!(?id, ?kind, "no room for finished unit; holding");
                    return Ok(());
                };
                let unit = self.spawn_unit(kind, owner, spot);
                if let Some(snapshot) = self.unit_snapshot(unit) {
                    self.emit(GameEvent::UnitProduced {
                        city_id: id,
                        unit: snapshot,
                    });
                }
            }
            ProductionItem::Building(kind) => {
                if let Some(city) = self.cities.get_mut(id) {
                    if !city.has_building(kind) {
                        city.buildings.push(kind);
                    }
                    city.refresh_yields(&self.map, &self.rules);
                }
                self.emit(GameEvent::BuildingCompleted {
                    city_id: id,
                    building_type: kind,
                });
            }
        }

        if let Some(city) = self.cities.get_mut(id) {
            city.production_stored = 0;
            city.producing = None;
            city.pull_from_queue();
        }
        Ok(())
    }

    /// Sums city output into the civilization's treasury and research.
    pub(super) fn collect_civ_yields(&mut self, civ: CivId) {
        let mut total = Yields::default();
        for (_, city) in self.cities.iter_ordered().filter(|(_, c)| c.owner == civ) {
            total += city.yields;
        }
        let trade = total.trade.max(0);
        let science_share = trade * self.settings.science_percent / 100;
        let science = science_share + total.science;
        let gold = trade - science_share + total.gold;

        let Some(c) = self.civs.get_mut(civ.index()) else {
            warn!(%civ, "no civilization record to collect yields into");
            return;
        };
        c.science = science;
        c.gold += gold;
        c.last_yields = total;
        c.research_progress += science;

        let Some(target) = c.researching.clone() else {
            return;
        };
        let Some(cost) = self.rules.tech(&target).map(|t| t.cost) else {
            warn!(%civ, tech = %target, "research target missing from rules");
            c.researching = None;
            return;
        };
        if c.research_progress < cost {
            return;
        }
        c.research_progress -= cost;
        c.known_techs.insert(target.clone());
        c.researching = None;
        info!(%civ, tech = %target, "technology researched");
        self.emit(GameEvent::TechResearched {
            civilization_id: civ,
            tech: target,
        });
    }
}
