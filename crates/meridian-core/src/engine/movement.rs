use meridian_protocol::{
    CityId, CivId, Coord, GameEvent, ImprovementKind, MovePoints, MoveReason, MoveResult,
    UnitAction, UnitId, UnitStatus,
};
use tracing::{debug, info};

use super::GameEngine;
use crate::{
    city::WORK_RADIUS,
    combat::{resolve_combat, CombatOutcome, FAILED_ATTACK_DAMAGE},
    error::GameError,
    goto::{GoToManager, GotoOutcome},
    grid::Grid,
    pathfinding::tile_entry_cost,
    unit::Unit,
};

impl GameEngine {
    /// Moves a unit, or attacks when the target holds an enemy unit.
    ///
    /// A rejected move leaves every piece of state untouched.
    pub fn move_unit(&mut self, unit: UnitId, target: Coord) -> MoveResult {
        match self.try_move(unit, target) {
            Ok(result) => result,
            Err(reason) => {
                debug!(?unit, %target, reason = reason.code(), "move rejected");
                MoveResult::rejected(reason)
            }
        }
    }

    fn try_move(&mut self, unit: UnitId, target: Coord) -> Result<MoveResult, MoveReason> {
        if !self.map.grid().is_valid(target) {
            return Err(MoveReason::InvalidTarget);
        }
        let u = self.units.get(unit).ok_or(MoveReason::UnitNotFound)?;
        if u.owner != self.active {
            return Err(MoveReason::InvalidTarget);
        }
        if u.moves_remaining.is_zero() {
            return Err(MoveReason::NoMovesLeft);
        }
        if u.position == target {
            return Err(MoveReason::InvalidTarget);
        }
        let tile = self.map.get(target).ok_or(MoveReason::InvalidTarget)?;
        let step = tile_entry_cost(tile, u.kind).ok_or(MoveReason::TerrainImpassable)?;

        if let Some(occupant) = self.unit_at(target) {
            let occupant_owner = self.units.get(occupant).map(|o| o.owner);
            if occupant_owner == Some(u.owner) {
                return Err(MoveReason::InvalidTarget);
            }
            return self.attack(unit, occupant);
        }

        let cost = step * Grid::distance(u.position, target);
        if u.moves_remaining < cost {
            return Err(MoveReason::InsufficientMoves);
        }

        let owner = u.owner;
        self.relocate(unit, target, cost);
        self.capture_city_at(target, owner);
        self.refresh_visibility(owner);
        if let Some(snapshot) = self.unit_snapshot(unit) {
            self.emit(GameEvent::UnitMoved {
                unit: snapshot,
                target,
            });
        }
        self.after_unit_changed(owner, unit);
        Ok(MoveResult::moved())
    }

    fn relocate(&mut self, unit: UnitId, target: Coord, cost: MovePoints) {
        if let Some(u) = self.units.get_mut(unit) {
            u.position = target;
            u.moves_remaining = u.moves_remaining.saturating_sub(cost);
            if matches!(u.status, UnitStatus::Sleeping | UnitStatus::Fortified) {
                u.status = UnitStatus::Active;
            }
        }
    }

    fn attack(&mut self, attacker: UnitId, defender: UnitId) -> Result<MoveResult, MoveReason> {
        let a = self.units.get(attacker).ok_or(MoveReason::UnitNotFound)?;
        let d = self.units.get(defender).ok_or(MoveReason::InvalidTarget)?;
        if Grid::distance(a.position, d.position) != 1 || a.attack <= 0 {
            return Err(MoveReason::InvalidTarget);
        }

        let outcome = resolve_combat(a, d, &mut self.rng);
        let attacker_owner = a.owner;
        let defender_owner = d.owner;
        let target = d.position;
        let defender_snapshot = d.snapshot(defender, self.goto.has_path(defender));
        debug!(?attacker, ?defender, ?outcome, "combat resolved");

        match outcome {
            CombatOutcome::AttackerWins => {
                let all_moves = self
                    .units
                    .get(attacker)
                    .map_or(MovePoints::ZERO, |u| u.moves_remaining);
                self.relocate(attacker, target, all_moves);
                if let Some(snapshot) = self.unit_snapshot(attacker) {
                    self.emit(GameEvent::CombatVictory {
                        attacker: snapshot,
                        defender: defender_snapshot,
                    });
                }
                self.destroy_unit(defender);
                self.capture_city_at(target, attacker_owner);
                self.refresh_visibility(attacker_owner);
                self.refresh_visibility(defender_owner);
                self.after_unit_changed(attacker_owner, attacker);
                Ok(MoveResult::combat(true))
            }
            CombatOutcome::DefenderWins => {
                let mut dead = false;
                if let Some(u) = self.units.get_mut(attacker) {
                    u.health -= FAILED_ATTACK_DAMAGE;
                    u.moves_remaining = MovePoints::ZERO;
                    dead = u.health <= 0;
                }
                if let Some(snapshot) = self.unit_snapshot(attacker) {
                    self.emit(GameEvent::CombatDefeat {
                        attacker: snapshot,
                        defender: defender_snapshot,
                    });
                }
                if dead {
                    self.destroy_unit(attacker);
                    self.refresh_visibility(attacker_owner);
                } else {
                    self.after_unit_changed(attacker_owner, attacker);
                }
                Ok(MoveResult::combat(false))
            }
        }
    }

    /// Removes a unit from play without announcing a loss.
    pub(super) fn take_unit(&mut self, unit: UnitId) -> Option<Unit> {
        let removed = self.units.remove(unit)?;
        self.goto.clear_path(unit);
        for change in self.queue.remove_unit(unit, &self.units) {
            self.emit_queue_change(change);
        }
        Some(removed)
    }

    pub(super) fn destroy_unit(&mut self, unit: UnitId) {
        if let Some(removed) = self.take_unit(unit) {
            debug!(?unit, owner = %removed.owner, kind = ?removed.kind, "unit destroyed");
            self.emit(GameEvent::UnitDestroyed {
                unit,
                owner: removed.owner,
            });
        }
    }

    /// Hands an undefended city on `at` to `new_owner`.
    fn capture_city_at(&mut self, at: Coord, new_owner: CivId) {
        let Some(city_id) = self.city_at(at) else {
            return;
        };
        let Some(city) = self.cities.get_mut(city_id) else {
            return;
        };
        if city.owner == new_owner {
            return;
        }
        let previous_owner = city.owner;
        city.owner = new_owner;
        city.is_capital = false;
        city.producing = None;
        city.build_queue.clear();
        city.purchased.clear();
        city.production_stored = 0;
        city.refresh_yields(&self.map, &self.rules);
        info!(city = %city.name, from = %previous_owner, to = %new_owner, "city captured");

        if let Some(civ) = self.civs.get_mut(previous_owner.index()) {
            if civ.capital == Some(city_id) {
                civ.capital = None;
            }
        }
        if let Some(snapshot) = self.city_snapshot(city_id) {
            self.emit(GameEvent::CityCaptured {
                city: snapshot,
                previous_owner,
            });
        }
        self.refresh_visibility(previous_owner);
    }

    /// Re-checks a unit's queue eligibility after it acted.
    pub(super) fn after_unit_changed(&mut self, owner: CivId, unit: UnitId) {
        let Some(change) = self.queue.check_unit_status(owner, unit, &self.units) else {
            return;
        };
        self.emit_queue_change(change);
        if change.current.is_none() && owner == self.active && self.is_human(owner) {
            self.check_turn_end(owner);
        }
    }

    /// The unit, provided its owner is the civilization taking its turn.
    pub(super) fn active_unit(&self, unit: UnitId) -> Result<&Unit, GameError> {
        let u = self.units.get(unit).ok_or(GameError::UnitNotFound)?;
        if u.owner != self.active {
            return Err(GameError::NotActiveCivilization);
        }
        Ok(u)
    }

    pub fn unit_action(&mut self, unit: UnitId, action: UnitAction) -> Result<(), GameError> {
        if let UnitAction::BuildImprovement(kind) = action {
            return self.build_improvement(unit, kind);
        }
        self.active_unit(unit)?;
        let u = self.units.get_mut(unit).ok_or(GameError::UnitNotFound)?;
        let owner = u.owner;
        match action {
            UnitAction::Sleep => {
                u.status = UnitStatus::Sleeping;
                u.turn_done = true;
            }
            UnitAction::Fortify => {
                u.status = UnitStatus::Fortified;
                u.turn_done = true;
            }
            UnitAction::Skip => {
                u.status = UnitStatus::Skipped;
                u.turn_done = true;
            }
            UnitAction::Wake => {
                u.status = UnitStatus::Active;
                u.turn_done = false;
            }
            UnitAction::BuildImprovement(_) => {}
        }
        let status = u.status;
        self.emit(GameEvent::UnitStatusChanged { unit, status });

        if status == UnitStatus::Active {
            if owner == self.active {
                let change = self.queue.add_unit(owner, unit, &self.units);
                self.emit_queue_change(change);
            }
        } else {
            self.after_unit_changed(owner, unit);
        }
        Ok(())
    }

    /// Builds `kind` on the unit's tile, spending all of its moves.
    pub fn build_improvement(&mut self, unit: UnitId, kind: ImprovementKind) -> Result<(), GameError> {
        let u = self.active_unit(unit)?;
        if !u.kind.can_build_improvements() || u.moves_remaining.is_zero() {
            return Err(GameError::CannotBuildImprovement);
        }
        let owner = u.owner;
        let at = u.position;
        let tile = self.map.get(at).ok_or(GameError::CannotBuildImprovement)?;
        let stats = self.rules.improvement(kind);
        let known = &self
            .civ(owner)
            .ok_or(GameError::CivilizationNotFound)?
            .known_techs;
        let buildable = stats.allowed.contains(&tile.terrain)
            && tile.improvement != Some(kind)
            && stats
                .requires_improvement
                .map_or(true, |req| tile.improvement == Some(req))
            && self
                .rules
                .tech_requirement_met(stats.requires_tech.as_ref(), known);
        if !buildable {
            return Err(GameError::CannotBuildImprovement);
        }

        if let Some(tile) = self.map.get_mut(at) {
            tile.improvement = Some(kind);
        }
        if let Some(u) = self.units.get_mut(unit) {
            u.moves_remaining = MovePoints::ZERO;
        }
        self.refresh_city_yields_near(at);
        debug!(?unit, %at, ?kind, "improvement built");
        self.emit(GameEvent::ImprovementBuilt {
            at,
            improvement: kind,
        });
        self.after_unit_changed(owner, unit);
        Ok(())
    }

    fn refresh_city_yields_near(&mut self, at: Coord) {
        let ids: Vec<CityId> = self
            .cities
            .ids_where(|c| Grid::distance(c.position, at) <= WORK_RADIUS);
        for id in ids {
            if let Some(city) = self.cities.get_mut(id) {
                city.refresh_yields(&self.map, &self.rules);
            }
        }
    }

    /// Plans a route to `target` and walks it as far as this turn's moves allow.
    /// Whatever remains is resumed at the start of the owner's later turns.
    pub fn go_to(&mut self, unit: UnitId, target: Coord) -> Result<GotoOutcome, GameError> {
        let (kind, from) = self.active_unit(unit).map(|u| (u.kind, u.position))?;
        if !self.goto.calculate_path(unit, kind, from, target, &self.map) {
            return Ok(GotoOutcome::NoPath);
        }
        let mut goto = std::mem::take(&mut self.goto);
        let outcome = goto.execute_path(unit, self);
        self.restore_goto(goto);
        Ok(outcome)
    }

    /// [`go_to`](Self::go_to) with a pause between steps for observers.
    pub async fn go_to_animated(
        &mut self,
        unit: UnitId,
        target: Coord,
    ) -> Result<GotoOutcome, GameError> {
        let (kind, from) = self.active_unit(unit).map(|u| (u.kind, u.position))?;
        if !self.goto.calculate_path(unit, kind, from, target, &self.map) {
            return Ok(GotoOutcome::NoPath);
        }
        let delay = self.ai_step_delay();
        let mut goto = std::mem::take(&mut self.goto);
        let outcome = goto.execute_path_with_delay(unit, self, delay).await;
        self.restore_goto(goto);
        Ok(outcome)
    }

    /// Steps every stored order belonging to `civ`.
    pub(super) fn continue_orders(&mut self, civ: CivId) {
        let mut goto = std::mem::take(&mut self.goto);
        for unit in goto.units_with_paths() {
            if self.units.get(unit).is_some_and(|u| u.owner == civ) {
                let outcome = goto.execute_path(unit, self);
                debug!(?unit, ?outcome, "go-to order continued");
                if let GotoOutcome::Failed(_) = outcome {
                    goto.clear_path(unit);
                }
            }
        }
        self.restore_goto(goto);
    }

    /// Puts the order book back after stepping, dropping orders of units that
    /// died along the way.
    fn restore_goto(&mut self, mut goto: GoToManager) {
        goto.retain_units(|id| self.units.contains(id));
        self.goto = goto;
    }
}
