//! The authoritative game state and every operation that mutates it.
//!
//! Callers submit intents (directly or through [`GameEngine::apply_intent`])
//! and read back snapshots; each completed state change is recorded as a
//! [`GameEvent`] and handed out by [`GameEngine::drain_events`].

mod ai;
mod cities;
mod movement;
mod turn;

#[cfg(test)]
mod tests;

use std::time::Duration;

use meridian_protocol::{
    CityId, CitySnapshot, CivId, CivSnapshot, Coord, GameEvent, GameOutcome, Intent, MovePoints,
    MoveResult, ProductionItem, TechId, TechStatus, TileSnapshot, UnitId, UnitKind, UnitSnapshot,
};
use tracing::{debug, info};

use crate::{
    city::City,
    civ::Civilization,
    config::{ConfigError, GameSettings},
    entities::EntityStore,
    error::GameError,
    goto::{GoToManager, GotoOutcome, UnitMover},
    grid::Grid,
    map::GameMap,
    mapgen::{generate_map, MapGenConfig},
    pathfinding::{get_reachable_tiles, tile_entry_cost, ReachableTile},
    rng::GameRng,
    rules::Rules,
    unit::Unit,
    unit_queue::{QueueChange, UnitTurnQueue},
    victory::VictoryManager,
};

pub use ai::AiTurn;
pub use turn::TurnEndCheck;

const CITY_SIGHT_RADIUS: u32 = 2;

/// What an applied intent produced, beyond the events it emitted.
#[derive(Clone, Debug, PartialEq)]
pub enum IntentOutcome {
    Done,
    Moved(MoveResult),
    GoTo(GotoOutcome),
    CityFounded(CityId),
    RemovedFromQueue(ProductionItem),
    CurrentUnit(Option<UnitId>),
}

pub struct GameEngine {
    settings: GameSettings,
    rules: Rules,
    map: GameMap,
    units: EntityStore<Unit>,
    cities: EntityStore<City>,
    civs: Vec<Civilization>,
    active: CivId,
    turn: u32,
    year: i32,
    rng: GameRng,
    queue: UnitTurnQueue,
    goto: GoToManager,
    victory: VictoryManager,
    events: Vec<GameEvent>,
}

impl GameEngine {
    /// Generates a map from the settings' seed and places every civilization's
    /// starting units. The first civilization is active; if it is AI-controlled
    /// call [`run_ai_turns`](Self::run_ai_turns) to play it.
    pub fn new(settings: GameSettings, rules: Rules) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self::generate(settings, rules))
    }

    fn generate(settings: GameSettings, rules: Rules) -> Self {
        let config = MapGenConfig {
            width: settings.map_width,
            height: settings.map_height,
            num_civs: u32::from(settings.civ_count),
            ..MapGenConfig::default()
        };
        let generated = generate_map(&config, settings.seed);
        let civs = (0..settings.civ_count)
            .map(|i| {
                let id = CivId(i);
                Civilization::new(
                    id,
                    rules.civilization(usize::from(i)),
                    settings.is_human(id),
                    settings.starting_gold,
                )
            })
            .collect();

        let mut engine = Self::from_parts(settings, rules, generated.map, civs);
        for (i, &start) in generated.start_positions.iter().enumerate() {
            let civ = CivId(i as u8);
            engine.spawn_unit(UnitKind::Settler, civ, start);
            let extra = if engine.settings.is_human(civ) {
                0
            } else {
                engine.settings.difficulty.ai_extra_units()
            };
            for _ in 0..=extra {
                if let Some(spot) = engine.find_spawn_tile(start, UnitKind::Warrior) {
                    engine.spawn_unit(UnitKind::Warrior, civ, spot);
                }
            }
        }
        engine.start();
        info!(
            width = engine.map.width(),
            height = engine.map.height(),
            civs = engine.civs.len(),
            seed = engine.settings.seed,
            "new game"
        );
        engine
    }

    /// Assembles an engine around a prepared map and roster, with no units or
    /// cities. Place them with [`spawn_unit`](Self::spawn_unit) and
    /// [`place_city`](Self::place_city), then call [`start`](Self::start).
    pub fn from_parts(
        settings: GameSettings,
        rules: Rules,
        mut map: GameMap,
        civs: Vec<Civilization>,
    ) -> Self {
        map.reset_visibility(civs.len());
        Self {
            rng: GameRng::seed_from_u64(settings.seed.wrapping_add(1)),
            victory: VictoryManager::new(settings.victory_tech.clone()),
            year: settings.starting_year,
            settings,
            rules,
            map,
            units: EntityStore::default(),
            cities: EntityStore::default(),
            civs,
            active: CivId(0),
            turn: 1,
            queue: UnitTurnQueue::new(),
            goto: GoToManager::new(),
            events: Vec::new(),
        }
    }

    /// Reveals every civilization's surroundings and queues the active civilization's units.
    pub fn start(&mut self) {
        for i in 0..self.civs.len() {
            self.refresh_visibility(CivId(i as u8));
        }
        let change = self.queue.initialize_queue(self.active, &self.units);
        self.emit_queue_change(change);
    }

    /// Starts over with the configured settings; the same seed yields the same map.
    pub fn new_game(&mut self) {
        *self = Self::generate(self.settings.clone(), self.rules.clone());
    }

    /// Starts over with different settings. Invalid settings leave the
    /// current game untouched.
    pub fn initialize(&mut self, settings: GameSettings) -> Result<(), GameError> {
        settings
            .validate()
            .map_err(|err| GameError::InvalidSettings(err.to_string()))?;
        *self = Self::generate(settings, self.rules.clone());
        Ok(())
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn map(&self) -> &GameMap {
        &self.map
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn active_civ(&self) -> CivId {
        self.active
    }

    pub fn is_game_over(&self) -> bool {
        self.victory.is_concluded()
    }

    pub fn outcome(&self) -> Option<&GameOutcome> {
        self.victory.outcome()
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(id)
    }

    pub fn city(&self, id: CityId) -> Option<&City> {
        self.cities.get(id)
    }

    pub fn civ(&self, id: CivId) -> Option<&Civilization> {
        self.civs.get(id.index())
    }

    pub fn civs(&self) -> &[Civilization] {
        &self.civs
    }

    pub fn unit_at(&self, c: Coord) -> Option<UnitId> {
        self.units
            .iter_ordered()
            .find(|(_, u)| u.position == c)
            .map(|(id, _)| id)
    }

    pub fn city_at(&self, c: Coord) -> Option<CityId> {
        self.cities
            .iter_ordered()
            .find(|(_, city)| city.position == c)
            .map(|(id, _)| id)
    }

    pub fn unit_ids(&self, civ: CivId) -> Vec<UnitId> {
        self.units.ids_where(|u| u.owner == civ)
    }

    pub fn city_ids(&self, civ: CivId) -> Vec<CityId> {
        self.cities.ids_where(|c| c.owner == civ)
    }

    pub fn unit_snapshot(&self, id: UnitId) -> Option<UnitSnapshot> {
        self.units
            .get(id)
            .map(|u| u.snapshot(id, self.goto.has_path(id)))
    }

    pub fn city_snapshot(&self, id: CityId) -> Option<CitySnapshot> {
        self.cities.get(id).map(|c| c.snapshot(id))
    }

    pub fn civ_snapshot(&self, id: CivId) -> Option<CivSnapshot> {
        self.civ(id).map(Civilization::snapshot)
    }

    pub fn unit_snapshots(&self, civ: CivId) -> Vec<UnitSnapshot> {
        self.unit_ids(civ)
            .into_iter()
            .filter_map(|id| self.unit_snapshot(id))
            .collect()
    }

    pub fn city_snapshots(&self, civ: CivId) -> Vec<CitySnapshot> {
        self.city_ids(civ)
            .into_iter()
            .filter_map(|id| self.city_snapshot(id))
            .collect()
    }

    pub fn civ_snapshots(&self) -> Vec<CivSnapshot> {
        self.civs.iter().map(Civilization::snapshot).collect()
    }

    pub fn tile_snapshot(&self, c: Coord, viewer: CivId) -> Option<TileSnapshot> {
        self.map.tile_snapshot(c, viewer)
    }

    pub fn current_unit(&self, civ: CivId) -> Option<UnitId> {
        self.queue.current_unit(civ)
    }

    pub fn queue_length(&self, civ: CivId) -> usize {
        self.queue.len(civ)
    }

    pub fn path_of(&self, unit: UnitId) -> Option<Vec<Coord>> {
        self.goto.path(unit).map(|p| p.iter().copied().collect())
    }

    /// Every technology in rules order with this civilization's standing on it.
    pub fn tech_statuses(&self, civ: CivId) -> Vec<TechStatus> {
        let Some(civ) = self.civ(civ) else {
            return Vec::new();
        };
        let available = self.rules.available_techs(&civ.known_techs);
        self.rules
            .techs()
            .iter()
            .map(|t| TechStatus {
                id: t.id.clone(),
                cost: t.cost,
                known: civ.knows(&t.id),
                available: available.contains(&t.id),
            })
            .collect()
    }

    /// Tiles the unit could still reach this turn.
    pub fn reachable_tiles(&self, unit: UnitId) -> Vec<ReachableTile> {
        let Some(u) = self.units.get(unit) else {
            return Vec::new();
        };
        get_reachable_tiles(
            u.position,
            u.moves_remaining,
            |c| self.map.get(c),
            u.kind,
            self.map.width(),
            self.map.height(),
        )
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    // ------------------------------------------------------------------
    // Intents
    // ------------------------------------------------------------------

    pub fn apply_intent(&mut self, intent: Intent) -> Result<IntentOutcome, GameError> {
        match intent {
            Intent::Initialize {
                difficulty,
                map_width,
                map_height,
                civ_count,
                player_civ,
                starting_year,
                starting_gold,
            } => {
                let settings = GameSettings {
                    difficulty,
                    map_width,
                    map_height,
                    civ_count,
                    player_civ,
                    starting_year,
                    starting_gold,
                    ..self.settings.clone()
                };
                self.initialize(settings).map(|()| IntentOutcome::Done)
            }
            Intent::NewGame => {
                self.new_game();
                Ok(IntentOutcome::Done)
            }
            Intent::AdvanceTurn => self.advance_turn().map(|()| IntentOutcome::Done),
            Intent::MoveUnit { unit, col, row } => {
                let result = self.move_unit(unit, Coord::new(col, row));
                if result.success {
                    self.goto.clear_path(unit);
                }
                Ok(IntentOutcome::Moved(result))
            }
            Intent::GoTo { unit, target } => self.go_to(unit, target).map(IntentOutcome::GoTo),
            Intent::FoundCity { settler } => self.found_city(settler).map(IntentOutcome::CityFounded),
            Intent::SetResearch { civ, tech } => {
                self.set_research(civ, tech).map(|()| IntentOutcome::Done)
            }
            Intent::SetProduction { city, item, queue } => self
                .set_production(city, item, queue)
                .map(|()| IntentOutcome::Done),
            Intent::PurchaseProduction { city, item } => self
                .purchase_production(city, item)
                .map(|()| IntentOutcome::Done),
            Intent::RemoveFromQueue { city, index } => self
                .remove_from_queue(city, index)
                .map(IntentOutcome::RemovedFromQueue),
            Intent::UnitAction { unit, action } => {
                self.unit_action(unit, action).map(|()| IntentOutcome::Done)
            }
            Intent::NextUnit { civ } => Ok(IntentOutcome::CurrentUnit(self.next_unit(civ))),
            Intent::WaitUnit { civ } => Ok(IntentOutcome::CurrentUnit(self.wait_unit(civ))),
            Intent::UnitDone { civ, unit } => {
                Ok(IntentOutcome::CurrentUnit(self.unit_done(civ, unit)))
            }
        }
    }

    pub fn next_unit(&mut self, civ: CivId) -> Option<UnitId> {
        let change = self.queue.next_unit(civ, &self.units);
        self.emit_queue_change(change);
        change.current
    }

    pub fn wait_unit(&mut self, civ: CivId) -> Option<UnitId> {
        let change = self.queue.wait_unit(civ, &self.units);
        self.emit_queue_change(change);
        change.current
    }

    pub fn unit_done(&mut self, civ: CivId, unit: Option<UnitId>) -> Option<UnitId> {
        let target = unit.or_else(|| self.queue.current_unit(civ));
        if let Some(u) = target.and_then(|id| self.units.get_mut(id)) {
            if u.owner == civ {
                u.turn_done = true;
            }
        }
        let change = self.queue.unit_done(civ, unit, &self.units);
        self.emit_queue_change(change);
        if change.current.is_none() && civ == self.active && self.is_human(civ) {
            self.check_turn_end(civ);
        }
        change.current
    }

    pub fn set_research(&mut self, civ: CivId, tech: TechId) -> Result<(), GameError> {
        let civ = self
            .civs
            .get_mut(civ.index())
            .ok_or(GameError::CivilizationNotFound)?;
        let def = self.rules.tech(&tech).ok_or(GameError::UnknownTechnology)?;
        if civ.knows(&tech) {
            return Err(GameError::TechAlreadyKnown);
        }
        if !def.requires.iter().all(|r| civ.knows(r)) {
            return Err(GameError::TechPrerequisitesNotMet);
        }
        debug!(civ = %civ.id, %tech, "research target set");
        civ.researching = Some(tech);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Setup helpers
    // ------------------------------------------------------------------

    /// Creates a unit with full moves. Queued immediately if its owner is active.
    pub fn spawn_unit(&mut self, kind: UnitKind, owner: CivId, position: Coord) -> UnitId {
        let id = self
            .units
            .insert(Unit::new(kind, owner, position, &self.rules));
        self.refresh_visibility(owner);
        if owner == self.active {
            let change = self.queue.add_unit(owner, id, &self.units);
            self.emit_queue_change(change);
        }
        id
    }

    /// First free tile the unit can stand on: `center`, then outward to radius 2.
    pub(crate) fn find_spawn_tile(&self, center: Coord, kind: UnitKind) -> Option<Coord> {
        let grid = self.map.grid();
        (0..=2)
            .flat_map(|r| grid.ring(center, r))
            .find(|&c| {
                self.map
                    .get(c)
                    .is_some_and(|t| tile_entry_cost(t, kind).is_some())
                    && self.unit_at(c).is_none()
            })
    }

    // ------------------------------------------------------------------
    // Internals shared by the operation modules
    // ------------------------------------------------------------------

    fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    fn emit_queue_change(&mut self, change: QueueChange) {
        self.emit(GameEvent::UnitQueueChange {
            civilization_id: change.civ,
            current_unit_id: change.current,
            queue_length: change.remaining,
        });
    }

    fn is_human(&self, civ: CivId) -> bool {
        self.civ(civ).is_some_and(|c| c.is_human)
    }

    /// Recomputes what `civ` sees now. Explored tiles stay explored.
    fn refresh_visibility(&mut self, civ: CivId) {
        let grid = self.map.grid();
        let mut visible = vec![false; grid.len()];
        let mut reveal = |center: Coord, radius: u32| {
            for c in grid.tiles_in_range(center, radius) {
                if let Some(i) = grid.index_of(c) {
                    visible[i] = true;
                }
            }
        };
        for (_, unit) in self.units.iter_ordered().filter(|(_, u)| u.owner == civ) {
            let radius = self
                .map
                .get(unit.position)
                .map_or(1, |t| unit.sight_radius(t));
            reveal(unit.position, radius);
        }
        for (_, city) in self.cities.iter_ordered().filter(|(_, c)| c.owner == civ) {
            reveal(city.position, CITY_SIGHT_RADIUS);
        }
        if let Some(layer) = self.map.visibility_mut(civ) {
            layer.apply(visible);
        }
    }

    fn own_unit_at(&self, c: Coord, civ: CivId) -> bool {
        self.unit_at(c)
            .and_then(|id| self.units.get(id))
            .is_some_and(|u| u.owner == civ)
    }

    fn step_cost(&self, unit: &Unit, target: Coord) -> Option<MovePoints> {
        let tile = self.map.get(target)?;
        let step = tile_entry_cost(tile, unit.kind)?;
        Some(step * Grid::distance(unit.position, target))
    }

    fn ai_step_delay(&self) -> Duration {
        Duration::from_millis(self.settings.ai_step_delay_ms)
    }
}

impl UnitMover for GameEngine {
    fn moves_remaining(&self, unit: UnitId) -> Option<MovePoints> {
        self.units.get(unit).map(|u| u.moves_remaining)
    }

    fn move_unit(&mut self, unit: UnitId, target: Coord) -> MoveResult {
        GameEngine::move_unit(self, unit, target)
    }
}
