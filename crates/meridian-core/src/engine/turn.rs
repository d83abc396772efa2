use meridian_protocol::{CivId, GameEvent};
use tracing::{debug, info};

use super::{ai::AiTurn, GameEngine};
use crate::error::GameError;

/// Result of asking whether the active civilization's turn is over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnEndCheck {
    /// Some unit can still act.
    UnitsRemaining,
    /// A human has nothing left to move and was asked to end the turn.
    ConfirmationNeeded,
    /// An AI has nothing left to move; the turn ends on its own.
    AutoEnd,
}

/// Years added per full round at a given date.
fn year_step(year: i32) -> i32 {
    match year {
        y if y < -1000 => 50,
        y if y < 0 => 25,
        y if y < 1000 => 20,
        y if y < 1500 => 10,
        y if y < 1750 => 5,
        y if y < 1900 => 2,
        _ => 1,
    }
}

/// There is no year zero.
fn next_year(year: i32) -> i32 {
    let next = year + year_step(year);
    if next == 0 {
        1
    } else {
        next
    }
}

impl GameEngine {
    /// Ends the active civilization's turn and starts the next living one's.
    ///
    /// Purchases are delivered, victory is evaluated, and on wrap-around the
    /// turn counter and year advance. Does nothing once the game is over.
    pub fn process_turn(&mut self) {
        if self.victory.is_concluded() {
            return;
        }
        let ending = self.active;
        self.deliver_purchases(ending);
        if self.evaluate_victory() {
            return;
        }
        let Some(next) = self.next_alive_civ(ending) else {
            return;
        };
        if next.0 <= ending.0 {
            self.turn += 1;
            self.year = next_year(self.year);
        }
        self.active = next;
        info!(turn = self.turn, year = self.year, civ = %next, "turn rotated");
        self.begin_turn(next);
    }

    fn evaluate_victory(&mut self) -> bool {
        let units = &self.units;
        let cities = &self.cities;
        let owns_anything = |civ: CivId| {
            units.iter_ordered().any(|(_, u)| u.owner == civ)
                || cities.iter_ordered().any(|(_, c)| c.owner == civ)
        };
        self.victory
            .evaluate_end_of_turn(&mut self.civs, owns_anything, &mut self.events)
    }

    fn next_alive_civ(&self, from: CivId) -> Option<CivId> {
        let n = self.civs.len();
        (1..=n)
            .map(|step| (from.index() + step) % n)
            .find(|&i| self.civs[i].is_alive)
            .map(|i| CivId(i as u8))
    }

    fn begin_turn(&mut self, civ: CivId) {
        self.queue.clear_civ(civ);
        for id in self.unit_ids(civ) {
            if let Some(u) = self.units.get_mut(id) {
                u.begin_turn();
            }
        }
        self.continue_orders(civ);
        self.process_cities(civ);
        self.collect_civ_yields(civ);
        self.refresh_visibility(civ);
        let change = self.queue.initialize_queue(civ, &self.units);
        self.emit_queue_change(change);
        self.emit(GameEvent::TurnProcessed {
            civilization_id: civ,
        });
    }

    /// Asks whether `civ` is out of things to do, emitting the matching
    /// `TURN_END_CONFIRMATION_NEEDED` or `AUTO_END_TURN` event when it is.
    pub fn check_turn_end(&mut self, civ: CivId) -> TurnEndCheck {
        let can_act = self
            .units
            .iter_ordered()
            .any(|(_, u)| u.owner == civ && u.can_act());
        if can_act {
            return TurnEndCheck::UnitsRemaining;
        }
        if self.is_human(civ) {
            self.emit(GameEvent::TurnEndConfirmationNeeded {
                civilization_id: civ,
            });
            TurnEndCheck::ConfirmationNeeded
        } else {
            self.emit(GameEvent::AutoEndTurn {
                civilization_id: civ,
            });
            TurnEndCheck::AutoEnd
        }
    }

    /// Ends the current turn, then plays AI civilizations until a human is up.
    pub fn advance_turn(&mut self) -> Result<(), GameError> {
        if self.victory.is_concluded() {
            return Err(GameError::GameOver);
        }
        self.process_turn();
        self.run_ai_turns();
        Ok(())
    }

    /// Plays consecutive AI turns, at most one full round, stopping when a
    /// human civilization becomes active or the game ends.
    pub fn run_ai_turns(&mut self) {
        let mut budget = self.civs.len();
        while budget > 0 && !self.victory.is_concluded() && !self.is_human(self.active) {
            budget -= 1;
            let civ = self.active;
            let mut turn = AiTurn::begin(self, civ);
            while turn.step(self) {}
            self.finish_ai_turn(civ);
        }
    }

    /// [`advance_turn`](Self::advance_turn) with yields between AI actions so
    /// observers can follow along.
    pub async fn advance_turn_async(&mut self) -> Result<(), GameError> {
        if self.victory.is_concluded() {
            return Err(GameError::GameOver);
        }
        self.process_turn();
        self.run_ai_turns_async().await;
        Ok(())
    }

    pub async fn run_ai_turns_async(&mut self) {
        let delay = self.ai_step_delay();
        let mut budget = self.civs.len();
        while budget > 0 && !self.victory.is_concluded() && !self.is_human(self.active) {
            budget -= 1;
            let civ = self.active;
            let mut turn = AiTurn::begin(self, civ);
            while turn.step(self) {
                if delay.is_zero() {
                    tokio::task::yield_now().await;
                } else {
                    tokio::time::sleep(delay).await;
                }
            }
            self.finish_ai_turn(civ);
        }
    }

    fn finish_ai_turn(&mut self, civ: CivId) {
        self.emit(GameEvent::AiFinished {
            civilization_id: civ,
        });
        let check = self.check_turn_end(civ);
        debug!(%civ, ?check, "ai turn finished");
        self.process_turn();
    }
}
