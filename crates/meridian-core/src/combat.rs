use crate::{rng::GameRng, unit::Unit, unit::MAX_HEALTH};

/// Health an attacker loses when its attack fails.
pub const FAILED_ATTACK_DAMAGE: i32 = 25;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CombatOutcome {
    AttackerWins,
    DefenderWins,
}

/// Chance that the attacker wins. Strength is the base stat scaled by health.
pub fn attacker_win_probability(
    attack: i32,
    attacker_health: i32,
    defense: i32,
    defender_health: i32,
) -> f64 {
    let attacker = f64::from(attack) * f64::from(attacker_health) / f64::from(MAX_HEALTH);
    let defender = f64::from(defense) * f64::from(defender_health) / f64::from(MAX_HEALTH);
    let total = attacker + defender;
    if total <= 0.0 {
        return 0.0;
    }
    attacker / total
}

pub fn resolve_combat(attacker: &Unit, defender: &Unit, rng: &mut GameRng) -> CombatOutcome {
    let p = attacker_win_probability(
        attacker.attack,
        attacker.health,
        defender.defense,
        defender.health,
    );
    if rng.chance(p) {
        CombatOutcome::AttackerWins
    } else {
        CombatOutcome::DefenderWins
    }
}
