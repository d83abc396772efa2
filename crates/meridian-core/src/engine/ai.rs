//! Computer-controlled civilizations.
//!
//! An AI turn first settles research and city production, then walks its
//! units in creation order. Each call to [`AiTurn::step`] performs at most one
//! unit action so async drivers can yield between actions.

use std::collections::VecDeque;

use meridian_protocol::{
    CityId, CivId, Coord, ImprovementKind, MoveReason, MoveResult, ProductionItem, UnitId,
    UnitKind,
};
use tracing::debug;

use super::GameEngine;
use crate::{
    city::WORK_RADIUS,
    enemy_search::{EnemySearcher, EnemyTarget, EnemyView},
    grid::Grid,
    pathfinding::{find_path, tile_entry_cost},
};

/// Actions one unit may attempt before it is set aside for the turn.
const MAX_ATTEMPTS_PER_UNIT: u32 = 8;
const SETTLER_SEARCH_RADIUS: u32 = 6;
const TARGET_CITY_COUNT: usize = 4;

/// Improvements workers try on bare land, in order of preference.
const WORKER_PLAN: [ImprovementKind; 3] = [
    ImprovementKind::Irrigation,
    ImprovementKind::Mine,
    ImprovementKind::Road,
];

/// What one civilization currently sees.
struct CivView<'a> {
    engine: &'a GameEngine,
    civ: CivId,
}

impl EnemyView for CivView<'_> {
    fn unit_at(&self, c: Coord) -> Option<(UnitId, CivId)> {
        let id = self.engine.unit_at(c)?;
        self.engine.units.get(id).map(|u| (id, u.owner))
    }

    fn city_at(&self, c: Coord) -> Option<(CityId, CivId)> {
        let id = self.engine.city_at(c)?;
        self.engine.cities.get(id).map(|city| (id, city.owner))
    }

    fn is_visible(&self, c: Coord) -> bool {
        self.engine.map.is_visible_to(self.civ, c)
    }
}

/// One AI civilization's turn in progress.
#[derive(Debug)]
pub struct AiTurn {
    civ: CivId,
    pending: VecDeque<UnitId>,
    current: Option<(UnitId, u32)>,
}

impl AiTurn {
    /// Picks research and production, then lines up every unit.
    pub fn begin(engine: &mut GameEngine, civ: CivId) -> Self {
        engine.manage_empire(civ);
        Self {
            civ,
            pending: engine.unit_ids(civ).into(),
            current: None,
        }
    }

    /// Performs one unit action. Returns false once every unit is spent.
    pub fn step(&mut self, engine: &mut GameEngine) -> bool {
        loop {
            let (unit, attempts) = match self.current.take() {
                Some(entry) => entry,
                None => match self.pending.pop_front() {
                    Some(unit) => (unit, 0),
                    None => return false,
                },
            };
            if attempts >= MAX_ATTEMPTS_PER_UNIT || !engine.ai_unit_ready(unit, self.civ) {
                engine.set_unit_aside(unit);
                continue;
            }
            if engine.ai_act(unit) {
                self.current = Some((unit, attempts + 1));
            } else {
                engine.set_unit_aside(unit);
            }
            return true;
        }
    }
}

impl GameEngine {
    fn ai_unit_ready(&self, unit: UnitId, civ: CivId) -> bool {
        self.units
            .get(unit)
            .is_some_and(|u| u.owner == civ && u.can_act())
    }

    /// Marks a unit finished for this turn if it still exists.
    fn set_unit_aside(&mut self, unit: UnitId) {
        let Some(u) = self.units.get_mut(unit) else {
            return;
        };
        if u.turn_done {
            return;
        }
        u.turn_done = true;
        let owner = u.owner;
        self.after_unit_changed(owner, unit);
    }

    /// One action for `unit`. True if it may keep acting.
    fn ai_act(&mut self, unit: UnitId) -> bool {
        let Some(kind) = self.units.get(unit).map(|u| u.kind) else {
            return false;
        };
        match kind {
            UnitKind::Settler => {
                if self.found_city(unit).is_ok() {
                    return false;
                }
                if let Some(site) = self.ai_city_site(unit) {
                    let result = self.ai_move_toward(unit, site);
                    return self.ai_report(unit, site, result);
                }
            }
            UnitKind::Worker => return self.ai_work(unit),
            _ => {
                if let Some(result) = self.ai_attack_adjacent(unit) {
                    return result.success;
                }
            }
        }
        let Some(target) = self.ai_pick_target(unit) else {
            debug!(?unit, "no target");
            return false;
        };
        let result = self.ai_move_toward(unit, target);
        self.ai_report(unit, target, result)
    }

    fn ai_report(&self, unit: UnitId, target: Coord, result: MoveResult) -> bool {
        match result.reason {
            Some(reason) if !result.success => {
                debug!(?unit, %target, reason = reason.code(), "ai move halted");
            }
            _ => debug!(?unit, %target, "ai moved"),
        }
        result.success
    }

    /// Attacks the weakest visible enemy unit next to `unit`, if any.
    fn ai_attack_adjacent(&mut self, unit: UnitId) -> Option<MoveResult> {
        let u = self.units.get(unit)?;
        if u.attack <= 0 {
            return None;
        }
        let view = CivView {
            engine: self,
            civ: u.owner,
        };
        let searcher = EnemySearcher::new(self.map.width(), self.map.height());
        let target = searcher
            .find_all_enemies_in_radius(u.position, &view, u.owner, 1)
            .into_iter()
            .filter_map(|hit| match hit.target {
                EnemyTarget::Unit(id) => self.units.get(id).map(|d| (d.defense * d.health, hit.coord)),
                EnemyTarget::City(_) => None,
            })
            .min_by_key(|&(strength, _)| strength)
            .map(|(_, coord)| coord)?;
        let result = self.move_unit(unit, target);
        debug!(?unit, %target, success = result.success, "ai attacked");
        Some(result)
    }

    /// Exploration first, then the nearest enemy, then a random step.
    fn ai_pick_target(&mut self, unit: UnitId) -> Option<Coord> {
        let u = self.units.get(unit)?;
        let (civ, pos, kind) = (u.owner, u.position, u.kind);
        let grid = self.map.grid();
        let enterable =
            |c: Coord| self.map.get(c).is_some_and(|t| tile_entry_cost(t, kind).is_some());

        let unexplored = (1..=self.settings.ai_explore_radius)
            .flat_map(|r| grid.ring(pos, r))
            .find(|&c| !self.map.is_explored_by(civ, c) && enterable(c) && !self.own_unit_at(c, civ));
        if unexplored.is_some() {
            return unexplored;
        }

        let radius = self.settings.ai_enemy_radius;
        let view = CivView { engine: self, civ };
        let searcher = EnemySearcher::new(grid.width(), grid.height());
        if let Some(hit) = searcher
            .find_nearest_enemy(pos, &view, civ, Some(radius))
            .filter(|hit| hit.distance <= radius)
        {
            return Some(hit.coord);
        }

        let options: Vec<Coord> = grid
            .neighbors(pos)
            .filter(|&c| enterable(c) && !self.own_unit_at(c, civ))
            .collect();
        if options.is_empty() {
            return None;
        }
        let pick = self.rng.gen_index(options.len());
        options.get(pick).copied()
    }

    /// Adjacent targets are entered directly; farther ones take the first
    /// step of a path, or the free neighbor closest to the target.
    fn ai_move_toward(&mut self, unit: UnitId, target: Coord) -> MoveResult {
        let Some(u) = self.units.get(unit) else {
            return MoveResult::rejected(MoveReason::UnitNotFound);
        };
        let (civ, pos, kind) = (u.owner, u.position, u.kind);
        if Grid::distance(pos, target) == 1 {
            return self.move_unit(unit, target);
        }

        let path = find_path(
            pos,
            target,
            |c| self.map.get(c),
            kind,
            self.map.width(),
            self.map.height(),
        );
        if let Some(&next) = path.path.get(1).filter(|_| path.success) {
            return self.move_unit(unit, next);
        }

        let fallback = self
            .map
            .grid()
            .neighbors(pos)
            .filter(|&c| {
                self.map.get(c).is_some_and(|t| tile_entry_cost(t, kind).is_some())
                    && !self.own_unit_at(c, civ)
            })
            .min_by_key(|&c| Grid::distance(c, target));
        match fallback {
            Some(step) => self.move_unit(unit, step),
            None => MoveResult::rejected(MoveReason::InvalidTarget),
        }
    }

    fn valid_city_site(&self, c: Coord) -> bool {
        self.map.get(c).is_some_and(|t| !t.terrain.is_water())
            && self
                .cities
                .iter_ordered()
                .all(|(_, city)| Grid::distance(city.position, c) > 3)
    }

    /// Nearest valid city site the settler could walk to.
    fn ai_city_site(&self, unit: UnitId) -> Option<Coord> {
        let u = self.units.get(unit)?;
        let grid = self.map.grid();
        (1..=SETTLER_SEARCH_RADIUS)
            .flat_map(|r| grid.ring(u.position, r))
            .find(|&c| self.valid_city_site(c) && self.unit_at(c).is_none())
    }

    fn near_own_city(&self, civ: CivId, c: Coord) -> bool {
        self.cities
            .iter_ordered()
            .any(|(_, city)| city.owner == civ && Grid::distance(city.position, c) <= WORK_RADIUS)
    }

    /// Improves the tile under the worker if a city works it, otherwise heads
    /// for the nearest worked tile that is still bare. Roads are upgraded to
    /// railroads once the technology allows.
    fn ai_work(&mut self, unit: UnitId) -> bool {
        let Some(u) = self.units.get(unit) else {
            return false;
        };
        let (civ, pos) = (u.owner, u.position);
        if self.near_own_city(civ, pos) {
            let plan: &[ImprovementKind] = match self.map.get(pos).and_then(|t| t.improvement) {
                None => &WORKER_PLAN,
                Some(ImprovementKind::Road) => &[ImprovementKind::Railroad],
                Some(_) => &[],
            };
            for &kind in plan {
                if self.build_improvement(unit, kind).is_ok() {
                    return false;
                }
            }
        }

        let grid = self.map.grid();
        let target = (1..=SETTLER_SEARCH_RADIUS)
            .flat_map(|r| grid.ring(pos, r))
            .find(|&c| {
                self.near_own_city(civ, c)
                    && self
                        .map
                        .get(c)
                        .is_some_and(|t| t.improvement.is_none() && !t.terrain.is_water())
                    && self.unit_at(c).is_none()
            });
        match target {
            Some(target) => {
                let result = self.ai_move_toward(unit, target);
                self.ai_report(unit, target, result)
            }
            None => false,
        }
    }

    /// Research and production choices for the start of an AI turn.
    pub(super) fn manage_empire(&mut self, civ: CivId) {
        self.ai_choose_research(civ);
        for city in self.city_ids(civ) {
            let idle = self
                .cities
                .get(city)
                .is_some_and(|c| c.producing.is_none() && c.build_queue.is_empty());
            if !idle {
                continue;
            }
            if let Some(item) = self.ai_choose_production(civ, city) {
                if let Err(err) = self.set_production(city, item, false) {
                    debug!(?city, ?item, %err, "ai production rejected");
                }
            }
        }
    }

    /// Cheapest available technology; ties keep rules order.
    fn ai_choose_research(&mut self, civ: CivId) {
        let Some(c) = self.civ(civ) else {
            return;
        };
        if c.researching.is_some() {
            return;
        }
        let cheapest = self
            .rules
            .available_techs(&c.known_techs)
            .into_iter()
            .filter_map(|id| self.rules.tech(&id).map(|t| (t.cost, id)))
            .min_by_key(|(cost, _)| *cost)
            .map(|(_, id)| id);
        if let Some(tech) = cheapest {
            if let Err(err) = self.set_research(civ, tech) {
                debug!(%civ, %err, "ai research rejected");
            }
        }
    }

    /// Settlers while the empire is small, then an army proportional to its
    /// cities, a worker, and finally buildings.
    fn ai_choose_production(&self, civ: CivId, city: CityId) -> Option<ProductionItem> {
        let available = self.available_production(city);
        let offers = |item: ProductionItem| available.contains(&item);

        let cities = self.city_ids(civ).len();
        let count_units = |pred: &dyn Fn(UnitKind) -> bool| {
            self.units
                .iter_ordered()
                .filter(|(_, u)| u.owner == civ && pred(u.kind))
                .count()
        };
        let settlers_planned = self
            .cities
            .iter_ordered()
            .filter(|(_, c)| c.owner == civ && c.producing == Some(ProductionItem::Unit(UnitKind::Settler)))
            .count();
        let settlers = count_units(&|k: UnitKind| k == UnitKind::Settler) + settlers_planned;
        let military = count_units(&|k: UnitKind| self.rules.unit(k).attack > 0);
        let workers = count_units(&|k: UnitKind| k == UnitKind::Worker);

        let threatened = {
            let view = CivView { engine: self, civ };
            EnemySearcher::new(self.map.width(), self.map.height()).has_visible_enemy(&view, civ)
        };
        let army_per_city = if threatened { 3 } else { 2 };

        let settler = ProductionItem::Unit(UnitKind::Settler);
        if cities < TARGET_CITY_COUNT && settlers == 0 && !threatened && offers(settler) {
            return Some(settler);
        }
        if military < army_per_city * cities.max(1) {
            let best = available
                .iter()
                .filter_map(|&item| match item {
                    ProductionItem::Unit(kind) if !kind.is_naval() => {
                        let attack = self.rules.unit(kind).attack;
                        (attack > 0).then_some((attack, item))
                    }
                    _ => None,
                })
                .max_by_key(|&(attack, _)| attack)
                .map(|(_, item)| item);
            if best.is_some() {
                return best;
            }
        }
        let worker = ProductionItem::Unit(UnitKind::Worker);
        if workers == 0 && offers(worker) {
            return Some(worker);
        }
        available
            .iter()
            .copied()
            .find(|item| matches!(item, ProductionItem::Building(_)))
            .or_else(|| Some(ProductionItem::Unit(UnitKind::Warrior)).filter(|&w| offers(w)))
    }
}
