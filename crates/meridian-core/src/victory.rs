//! End-of-turn victory and defeat evaluation.
//!
//! Once an outcome is declared it sticks: later calls report `true` without
//! emitting anything.

use meridian_protocol::{CivId, GameEvent, GameOutcome, TechId, VictoryReason};
use tracing::info;

use crate::civ::Civilization;

#[derive(Clone, Debug)]
pub struct VictoryManager {
    victory_tech: TechId,
    outcome: Option<GameOutcome>,
}

impl VictoryManager {
    pub fn new(victory_tech: TechId) -> Self {
        Self {
            victory_tech,
            outcome: None,
        }
    }

    pub fn is_concluded(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn outcome(&self) -> Option<&GameOutcome> {
        self.outcome.as_ref()
    }

    /// Refreshes alive flags and checks end conditions. `owns_anything` says
    /// whether a civilization still has at least one unit or city.
    pub fn evaluate_end_of_turn(
        &mut self,
        civs: &mut [Civilization],
        owns_anything: impl Fn(CivId) -> bool,
        events: &mut Vec<GameEvent>,
    ) -> bool {
        if self.outcome.is_some() {
            return true;
        }

        let mut alive = Vec::with_capacity(civs.len());
        for civ in civs.iter_mut() {
            let now_alive = owns_anything(civ.id);
            if civ.is_alive && !now_alive {
                info!(civ = %civ.id, name = %civ.name, "civilization eliminated");
                events.push(GameEvent::CivilizationEliminated {
                    civilization_id: civ.id,
                });
            }
            civ.is_alive = now_alive;
            alive.push((civ.id, now_alive));
        }
        events.push(GameEvent::CivilizationsUpdated { alive });

        let humans: Vec<&Civilization> = civs.iter().filter(|c| c.is_human).collect();

        if let [sole] = humans.as_slice() {
            if !sole.is_alive {
                return self.conclude(sole, VictoryReason::Elimination, false, events);
            }
        }

        if let Some(winner) = humans.iter().find(|c| c.knows(&self.victory_tech)) {
            return self.conclude(winner, VictoryReason::Moonshot, true, events);
        }

        let survivors: Vec<&Civilization> = civs.iter().filter(|c| c.is_alive).collect();
        if survivors.len() <= 1 {
            return match (survivors.first(), humans.first()) {
                (Some(last), _) if last.is_human => {
                    self.conclude(last, VictoryReason::Elimination, true, events)
                }
                (_, Some(primary)) => {
                    self.conclude(primary, VictoryReason::Elimination, false, events)
                }
                (Some(last), None) => {
                    self.conclude(last, VictoryReason::Elimination, true, events)
                }
                (None, None) => match civs.first() {
                    Some(first) => self.conclude(first, VictoryReason::Elimination, false, events),
                    None => false,
                },
            };
        }

        false
    }

    fn conclude(
        &mut self,
        civ: &Civilization,
        reason: VictoryReason,
        won: bool,
        events: &mut Vec<GameEvent>,
    ) -> bool {
        let outcome = GameOutcome {
            civilization_id: civ.id,
            civ_name: civ.name.clone(),
            reason,
            is_human: civ.is_human,
            won,
        };
        info!(civ = %civ.id, ?reason, won, "game over");
        events.push(if won {
            GameEvent::GameWon {
                outcome: outcome.clone(),
            }
        } else {
            GameEvent::GameLost {
                outcome: outcome.clone(),
            }
        });
        self.outcome = Some(outcome);
        true
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::rules::CivTemplate;

    fn civs(humans: &[bool]) -> Vec<Civilization> {
        humans
            .iter()
            .enumerate()
            .map(|(i, &human)| {
                let template = CivTemplate {
                    name: format!("Civ{i}"),
                    cities: vec![format!("City{i}")],
                };
                Civilization::new(CivId(i as u8), &template, human, 0)
            })
            .collect()
    }

    fn count_endings(events: &[GameEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, GameEvent::GameWon { .. } | GameEvent::GameLost { .. }))
            .count()
    }

    #[test]
    fn nothing_happens_while_several_civs_live() {
        let mut roster = civs(&[true, false, false]);
        let mut vm = VictoryManager::new(TechId::new("space_flight"));
        let mut events = Vec::new();
        assert!(!vm.evaluate_end_of_turn(&mut roster, |_| true, &mut events));
        assert_eq!(count_endings(&events), 0);
        assert!(matches!(events[0], GameEvent::CivilizationsUpdated { .. }));
    }

    #[test]
    fn dead_sole_human_loses() {
        let mut roster = civs(&[true, false, false]);
        let mut vm = VictoryManager::new(TechId::new("space_flight"));
        let mut events = Vec::new();
        assert!(vm.evaluate_end_of_turn(&mut roster, |c| c != CivId(0), &mut events));
        let outcome = vm.outcome().unwrap();
        assert!(!outcome.won);
        assert_eq!(outcome.reason, VictoryReason::Elimination);
        assert_eq!(outcome.civilization_id, CivId(0));
    }

    #[test]
    fn moonshot_wins_for_a_human() {
        let mut roster = civs(&[true, false]);
        roster[0].known_techs = HashSet::from([TechId::new("space_flight")]);
        let mut vm = VictoryManager::new(TechId::new("space_flight"));
        let mut events = Vec::new();
        assert!(vm.evaluate_end_of_turn(&mut roster, |_| true, &mut events));
        assert_eq!(vm.outcome().unwrap().reason, VictoryReason::Moonshot);
        assert!(vm.outcome().unwrap().won);
    }

    #[test]
    fn ai_moonshot_does_not_end_the_game() {
        let mut roster = civs(&[true, false]);
        roster[1].known_techs = HashSet::from([TechId::new("space_flight")]);
        let mut vm = VictoryManager::new(TechId::new("space_flight"));
        assert!(!vm.evaluate_end_of_turn(&mut roster, |_| true, &mut Vec::new()));
    }

    #[test]
    fn last_ai_standing_defeats_the_primary_human() {
        let mut roster = civs(&[true, true, false]);
        let mut vm = VictoryManager::new(TechId::new("space_flight"));
        let mut events = Vec::new();
        assert!(vm.evaluate_end_of_turn(&mut roster, |c| c == CivId(2), &mut events));
        let outcome = vm.outcome().unwrap();
        assert_eq!(outcome.civilization_id, CivId(0));
        assert!(!outcome.won);
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, GameEvent::CivilizationEliminated { .. }))
                .count(),
            2
        );
    }

    #[test]
    fn all_ai_survivor_wins() {
        let mut roster = civs(&[false, false]);
        let mut vm = VictoryManager::new(TechId::new("space_flight"));
        assert!(vm.evaluate_end_of_turn(&mut roster, |c| c == CivId(1), &mut Vec::new()));
        let outcome = vm.outcome().unwrap();
        assert_eq!(outcome.civilization_id, CivId(1));
        assert!(outcome.won);
        assert!(!outcome.is_human);
    }

    #[test]
    fn conclusion_is_idempotent() {
        let mut roster = civs(&[true, false]);
        let mut vm = VictoryManager::new(TechId::new("space_flight"));
        let mut events = Vec::new();
        assert!(vm.evaluate_end_of_turn(&mut roster, |c| c == CivId(0), &mut events));
        assert_eq!(count_endings(&events), 1);

        events.clear();
        assert!(vm.evaluate_end_of_turn(&mut roster, |c| c == CivId(0), &mut events));
        assert!(events.is_empty());
    }
}
