use meridian_protocol::{
    BuildingKind, GameEvent, ImprovementKind, MoveReason, ProductionItem, TechId, TerrainKind, UnitAction,
    UnitKind, UnitStatus, VictoryReason,
};

use super::*;

fn engine_on(terrain: TerrainKind, humans: &[bool]) -> GameEngine {
    let rules = Rules::embedded().unwrap();
    let settings = GameSettings {
        map_width: 10,
        map_height: 10,
        civ_count: humans.len() as u8,
        ..GameSettings::default()
    };
    let civs = humans
        .iter()
        .enumerate()
        .map(|(i, &human)| {
            Civilization::new(
                CivId(i as u8),
                rules.civilization(i),
                human,
                settings.starting_gold,
            )
        })
        .collect();
    GameEngine::from_parts(settings, rules, GameMap::new(10, 10, terrain), civs)
}

fn set_terrain(engine: &mut GameEngine, at: Coord, terrain: TerrainKind) {
    engine.map.get_mut(at).unwrap().terrain = terrain;
}

fn count(events: &[GameEvent], name: &str) -> usize {
    events.iter().filter(|e| e.name() == name).count()
}

#[test]
fn plain_move_spends_points_and_reports() {
    let mut engine = engine_on(TerrainKind::Grassland, &[true, true]);
    let w = engine.spawn_unit(UnitKind::Warrior, CivId(0), Coord::new(2, 2));
    engine.start();
    engine.drain_events();

    let result = engine.move_unit(w, Coord::new(3, 2));
    assert!(result.success);
    assert_eq!(engine.unit(w).unwrap().position, Coord::new(3, 2));
    assert!(engine.unit(w).unwrap().moves_remaining.is_zero());

    let events = engine.drain_events();
    assert_eq!(count(&events, "UNIT_MOVED"), 1);
    assert_eq!(count(&events, "UNIT_QUEUE_CHANGE"), 1);

    let again = engine.move_unit(w, Coord::new(4, 2));
    assert_eq!(again.reason, Some(MoveReason::NoMovesLeft));
}

#[test]
fn rejected_moves_touch_nothing() {
    let mut engine = engine_on(TerrainKind::Grassland, &[true, true]);
    set_terrain(&mut engine, Coord::new(3, 2), TerrainKind::Forest);
    set_terrain(&mut engine, Coord::new(1, 2), TerrainKind::Ocean);
    let w = engine.spawn_unit(UnitKind::Warrior, CivId(0), Coord::new(2, 2));
    let friend = engine.spawn_unit(UnitKind::Warrior, CivId(0), Coord::new(2, 3));
    engine.start();
    let before = engine.unit(w).cloned();
    engine.drain_events();

    let cases = [
        (Coord::new(3, 2), MoveReason::InsufficientMoves),
        (Coord::new(1, 2), MoveReason::TerrainImpassable),
        (Coord::new(2, 3), MoveReason::InvalidTarget),
        (Coord::new(-1, 0), MoveReason::InvalidTarget),
        (Coord::new(2, 2), MoveReason::InvalidTarget),
    ];
    for (target, reason) in cases {
        let result = engine.move_unit(w, target);
        assert!(!result.success);
        assert_eq!(result.reason, Some(reason), "target {target}");
    }
    assert_eq!(engine.unit(w).cloned(), before);
    assert!(engine.unit(friend).is_some());
    assert!(engine.drain_events().is_empty());

    let missing = engine.move_unit(UnitId::new(99, 0), Coord::new(0, 0));
    assert_eq!(missing.reason, Some(MoveReason::UnitNotFound));
}

#[test]
fn multi_tile_move_costs_distance_times_terrain() {
    let mut engine = engine_on(TerrainKind::Grassland, &[true, true]);
    let h = engine.spawn_unit(UnitKind::Horseman, CivId(0), Coord::new(0, 0));
    assert!(engine.move_unit(h, Coord::new(2, 2)).success);
    assert!(engine.unit(h).unwrap().moves_remaining.is_zero());
}

#[test]
fn winning_attack_takes_the_tile_and_all_moves() {
    let mut engine = engine_on(TerrainKind::Grassland, &[true, true]);
    let attacker = engine.spawn_unit(UnitKind::Horseman, CivId(0), Coord::new(2, 2));
    let defender = engine.spawn_unit(UnitKind::Warrior, CivId(1), Coord::new(3, 2));
    engine.units.get_mut(defender).unwrap().defense = 0;
    engine.start();
    engine.drain_events();

    let result = engine.move_unit(attacker, Coord::new(3, 2));
    assert_eq!(result, MoveResult::combat(true));
    assert!(engine.unit(defender).is_none());
    let a = engine.unit(attacker).unwrap();
    assert_eq!(a.position, Coord::new(3, 2));
    assert!(a.moves_remaining.is_zero());

    let events = engine.drain_events();
    assert_eq!(count(&events, "COMBAT_VICTORY"), 1);
    assert_eq!(count(&events, "UNIT_DESTROYED"), 1);
}

#[test]
fn losing_attack_costs_health_and_can_kill() {
    let mut engine = engine_on(TerrainKind::Grassland, &[true, true]);
    let attacker = engine.spawn_unit(UnitKind::Warrior, CivId(0), Coord::new(2, 2));
    let defender = engine.spawn_unit(UnitKind::Warrior, CivId(1), Coord::new(3, 2));
    engine.units.get_mut(defender).unwrap().defense = 100_000;
    engine.units.get_mut(attacker).unwrap().health = 20;

    let result = engine.move_unit(attacker, Coord::new(3, 2));
    assert_eq!(result, MoveResult::combat(false));
    assert!(engine.unit(attacker).is_none());
    assert_eq!(engine.unit(defender).unwrap().health, 100);
    let events = engine.drain_events();
    assert_eq!(count(&events, "COMBAT_DEFEAT"), 1);
    assert_eq!(count(&events, "UNIT_DESTROYED"), 1);
}

#[test]
fn non_combatants_cannot_attack() {
    let mut engine = engine_on(TerrainKind::Grassland, &[true, true]);
    let settler = engine.spawn_unit(UnitKind::Settler, CivId(0), Coord::new(2, 2));
    engine.spawn_unit(UnitKind::Warrior, CivId(1), Coord::new(3, 2));
    let result = engine.move_unit(settler, Coord::new(3, 2));
    assert_eq!(result.reason, Some(MoveReason::InvalidTarget));
}

#[test]
fn founding_consumes_settler_and_names_a_capital() {
    let mut engine = engine_on(TerrainKind::Grassland, &[true, true]);
    let settler = engine.spawn_unit(UnitKind::Settler, CivId(0), Coord::new(2, 2));
    engine.start();
    engine.drain_events();

    let city = engine.found_city(settler).unwrap();
    assert!(engine.unit(settler).is_none());
    let c = engine.city(city).unwrap();
    assert_eq!(c.name, "Rome");
    assert!(c.is_capital);
    assert_eq!(engine.civ(CivId(0)).unwrap().capital, Some(city));

    let events = engine.drain_events();
    let founded = events
        .iter()
        .find_map(|e| match e {
            GameEvent::CityFounded { settler, .. } => Some(settler.clone()),
            _ => None,
        })
        .unwrap();
    assert!(founded.moves_remaining.is_zero());
    assert_eq!(count(&events, "TURN_END_CONFIRMATION_NEEDED"), 1);
}

#[test]
fn founding_rules_are_enforced() {
    let mut engine = engine_on(TerrainKind::Grassland, &[true, true]);
    set_terrain(&mut engine, Coord::new(8, 8), TerrainKind::Coast);
    let first = engine.spawn_unit(UnitKind::Settler, CivId(0), Coord::new(2, 2));
    let near = engine.spawn_unit(UnitKind::Settler, CivId(0), Coord::new(5, 2));
    let wet = engine.spawn_unit(UnitKind::Settler, CivId(0), Coord::new(8, 8));
    let warrior = engine.spawn_unit(UnitKind::Warrior, CivId(0), Coord::new(6, 6));

    engine.found_city(first).unwrap();
    assert_eq!(
        engine.found_city(near),
        Err(GameError::CityTooClose { min_distance: 3 })
    );
    assert_eq!(engine.found_city(wet), Err(GameError::WaterTile));
    assert_eq!(engine.found_city(warrior), Err(GameError::NotASettler));
    assert!(engine.unit(near).is_some());

    engine.units.get_mut(near).unwrap().position = Coord::new(6, 2);
    engine.units.get_mut(near).unwrap().moves_remaining = MovePoints::ZERO;
    assert_eq!(engine.found_city(near), Err(GameError::CannotFoundCity));
}

#[test]
fn city_produces_a_unit_when_the_box_fills() {
    let mut engine = engine_on(TerrainKind::Plains, &[true, true]);
    let city = engine.place_city(CivId(0), Coord::new(4, 4));
    engine
        .set_production(city, ProductionItem::Unit(UnitKind::Warrior), false)
        .unwrap();
    engine.drain_events();

    for _ in 0..4 {
        engine.process_cities(CivId(0));
    }
    assert_eq!(engine.city(city).unwrap().production_stored, 8);
    assert!(engine.unit_ids(CivId(0)).is_empty());

    engine.process_cities(CivId(0));
    let c = engine.city(city).unwrap();
    assert_eq!(c.production_stored, 0);
    assert_eq!(c.producing, None);
    assert_eq!(engine.unit_ids(CivId(0)).len(), 1);
    assert_eq!(count(&engine.drain_events(), "UNIT_PRODUCED"), 1);
}

#[test]
fn city_grows_when_food_box_fills() {
    let mut engine = engine_on(TerrainKind::Grassland, &[true, true]);
    let city = engine.place_city(CivId(0), Coord::new(4, 4));
    engine.cities.get_mut(city).unwrap().food_stored = 18;
    engine.process_cities(CivId(0));
    let c = engine.city(city).unwrap();
    assert_eq!(c.population, 2);
    assert_eq!(c.food_stored, 0);
    assert_eq!(c.food_needed(), 40);
    assert_eq!(count(&engine.drain_events(), "CITY_GREW"), 1);
}

#[test]
fn queue_feeds_production_in_order() {
    let mut engine = engine_on(TerrainKind::Plains, &[true, true]);
    let city = engine.place_city(CivId(0), Coord::new(4, 4));
    let warrior = ProductionItem::Unit(UnitKind::Warrior);
    let worker = ProductionItem::Unit(UnitKind::Worker);
    engine.set_production(city, warrior, true).unwrap();
    engine.set_production(city, worker, true).unwrap();
    engine.set_production(city, warrior, true).unwrap();

    let c = engine.city(city).unwrap();
    assert_eq!(c.producing, Some(warrior));
    assert_eq!(c.build_queue.len(), 2);

    assert_eq!(engine.remove_from_queue(city, 1), Ok(warrior));
    assert_eq!(
        engine.remove_from_queue(city, 5),
        Err(GameError::InvalidQueueIndex(5))
    );

    let workshop = ProductionItem::Building(BuildingKind::Workshop);
    assert_eq!(
        engine.set_production(city, workshop, false),
        Err(GameError::ItemNotAvailable)
    );
}

#[test]
fn purchases_arrive_when_the_turn_ends() {
    let mut engine = engine_on(TerrainKind::Grassland, &[true, true]);
    let city = engine.place_city(CivId(0), Coord::new(4, 4));
    engine.spawn_unit(UnitKind::Warrior, CivId(1), Coord::new(9, 9));
    engine.start();

    engine
        .purchase_production(city, ProductionItem::Unit(UnitKind::Warrior))
        .unwrap();
    assert_eq!(engine.civ(CivId(0)).unwrap().gold, 30);
    assert_eq!(
        engine.purchase_production(city, ProductionItem::Unit(UnitKind::Settler)),
        Err(GameError::NotEnoughGold {
            needed: 60,
            available: 30
        })
    );
    assert!(engine.unit_ids(CivId(0)).is_empty());

    engine.drain_events();
    engine.process_turn();
    assert_eq!(engine.unit_ids(CivId(0)).len(), 1);
    assert!(engine.city(city).unwrap().purchased.is_empty());
    assert_eq!(count(&engine.drain_events(), "UNIT_PURCHASED"), 1);
}

#[test]
fn research_respects_prerequisites_and_completes() {
    let mut engine = engine_on(TerrainKind::Grassland, &[true, true]);
    let civ = CivId(0);
    assert_eq!(
        engine.set_research(civ, TechId::new("warp_drive")),
        Err(GameError::UnknownTechnology)
    );
    assert_eq!(
        engine.set_research(civ, TechId::new("writing")),
        Err(GameError::TechPrerequisitesNotMet)
    );
    engine.set_research(civ, TechId::new("alphabet")).unwrap();

    set_terrain(&mut engine, Coord::new(4, 4), TerrainKind::Ocean);
    for c in engine.map.grid().neighbors(Coord::new(4, 4)).collect::<Vec<_>>() {
        set_terrain(&mut engine, c, TerrainKind::Ocean);
    }
    set_terrain(&mut engine, Coord::new(4, 4), TerrainKind::Grassland);
    let city = engine.place_city(civ, Coord::new(4, 4));
    // Center 0 trade, one ocean tile 2 trade: 1 science, 1 gold.
    assert_eq!(engine.city(city).unwrap().yields.trade, 2);

    for _ in 0..19 {
        engine.collect_civ_yields(civ);
    }
    assert!(!engine.civ(civ).unwrap().knows(&TechId::new("alphabet")));
    engine.collect_civ_yields(civ);
    let c = engine.civ(civ).unwrap();
    assert!(c.knows(&TechId::new("alphabet")));
    assert_eq!(c.research_progress, 0);
    assert_eq!(c.researching, None);
    assert_eq!(c.gold, 50 + 20);
    assert_eq!(
        engine.set_research(civ, TechId::new("alphabet")),
        Err(GameError::TechAlreadyKnown)
    );
}

#[test]
fn sleeping_units_leave_the_queue_until_woken() {
    let mut engine = engine_on(TerrainKind::Grassland, &[true, true]);
    let a = engine.spawn_unit(UnitKind::Warrior, CivId(0), Coord::new(1, 1));
    let b = engine.spawn_unit(UnitKind::Warrior, CivId(0), Coord::new(5, 5));
    engine.start();
    assert_eq!(engine.current_unit(CivId(0)), Some(a));

    engine.unit_action(a, UnitAction::Sleep).unwrap();
    assert_eq!(engine.current_unit(CivId(0)), Some(b));
    assert_eq!(engine.unit(a).unwrap().status, UnitStatus::Sleeping);

    engine.unit_action(a, UnitAction::Wake).unwrap();
    assert!(engine.queue.contains(CivId(0), a));
    assert_eq!(engine.queue_length(CivId(0)), 2);
}

#[test]
fn finishing_the_last_human_unit_asks_for_confirmation() {
    let mut engine = engine_on(TerrainKind::Grassland, &[true, false]);
    let a = engine.spawn_unit(UnitKind::Warrior, CivId(0), Coord::new(1, 1));
    engine.start();
    engine.drain_events();

    assert_eq!(engine.unit_done(CivId(0), None), None);
    let events = engine.drain_events();
    assert_eq!(count(&events, "TURN_END_CONFIRMATION_NEEDED"), 1);
    assert!(engine.unit(a).unwrap().turn_done);
}

#[test]
fn workers_improve_tiles_and_railroads_need_the_tech() {
    let mut engine = engine_on(TerrainKind::Grassland, &[true, true]);
    let city = engine.place_city(CivId(0), Coord::new(4, 4));
    let worker = engine.spawn_unit(UnitKind::Worker, CivId(0), Coord::new(5, 4));
    let food_before = engine.city(city).unwrap().yields.food;

    assert_eq!(
        engine.build_improvement(worker, ImprovementKind::Mine),
        Err(GameError::CannotBuildImprovement)
    );
    engine
        .unit_action(worker, UnitAction::BuildImprovement(ImprovementKind::Irrigation))
        .unwrap();
    assert_eq!(
        engine.map.get(Coord::new(5, 4)).unwrap().improvement,
        Some(ImprovementKind::Irrigation)
    );
    assert!(engine.unit(worker).unwrap().moves_remaining.is_zero());
    assert_eq!(engine.city(city).unwrap().yields.food, food_before + 1);

    engine.units.get_mut(worker).unwrap().begin_turn();
    engine.build_improvement(worker, ImprovementKind::Road).unwrap();
    engine.units.get_mut(worker).unwrap().begin_turn();
    assert_eq!(
        engine.build_improvement(worker, ImprovementKind::Railroad),
        Err(GameError::CannotBuildImprovement)
    );
    engine.civs[0].known_techs.insert(TechId::new("railroad"));
    engine.build_improvement(worker, ImprovementKind::Railroad).unwrap();
}

#[test]
fn capturing_an_undefended_city_transfers_it() {
    let mut engine = engine_on(TerrainKind::Grassland, &[true, true]);
    let city = engine.place_city(CivId(1), Coord::new(4, 4));
    engine
        .set_production(city, ProductionItem::Unit(UnitKind::Warrior), false)
        .unwrap();
    let w = engine.spawn_unit(UnitKind::Warrior, CivId(0), Coord::new(3, 4));
    engine.drain_events();

    assert!(engine.move_unit(w, Coord::new(4, 4)).success);
    let c = engine.city(city).unwrap();
    assert_eq!(c.owner, CivId(0));
    assert!(!c.is_capital);
    assert_eq!(c.producing, None);
    assert_eq!(engine.civ(CivId(1)).unwrap().capital, None);
    assert_eq!(count(&engine.drain_events(), "CITY_CAPTURED"), 1);
}

#[test]
fn go_to_orders_resume_next_turn() {
    let mut engine = engine_on(TerrainKind::Grassland, &[true, true]);
    let w = engine.spawn_unit(UnitKind::Warrior, CivId(0), Coord::new(0, 0));
    engine.spawn_unit(UnitKind::Warrior, CivId(1), Coord::new(9, 9));
    engine.start();

    assert_eq!(
        engine.go_to(w, Coord::new(3, 0)),
        Ok(GotoOutcome::MovesExhausted)
    );
    assert_eq!(engine.unit(w).unwrap().position, Coord::new(1, 0));
    assert_eq!(engine.path_of(w).map(|p| p.len()), Some(2));
    assert!(engine.unit_snapshot(w).unwrap().has_path);

    engine.process_turn();
    engine.process_turn();
    assert_eq!(engine.active_civ(), CivId(0));
    assert_eq!(engine.unit(w).unwrap().position, Coord::new(2, 0));
    assert_eq!(engine.turn(), 2);
    assert_eq!(engine.year(), -3950);
}

#[test]
fn fog_is_per_civilization_and_explored_sticks() {
    let mut engine = engine_on(TerrainKind::Grassland, &[true, true]);
    let w = engine.spawn_unit(UnitKind::Warrior, CivId(0), Coord::new(1, 1));
    engine.start();
    let map = engine.map();
    assert!(map.is_visible_to(CivId(0), Coord::new(2, 2)));
    assert!(!map.is_visible_to(CivId(0), Coord::new(3, 3)));
    assert!(!map.is_visible_to(CivId(1), Coord::new(1, 1)));

    engine.units.get_mut(w).unwrap().moves_remaining = MovePoints::from_moves(3);
    assert!(engine.move_unit(w, Coord::new(4, 1)).success);
    let map = engine.map();
    assert!(!map.is_visible_to(CivId(0), Coord::new(0, 0)));
    assert!(map.is_explored_by(CivId(0), Coord::new(0, 0)));
    assert!(map.is_visible_to(CivId(0), Coord::new(5, 2)));
}

#[test]
fn elimination_ends_the_game_and_blocks_further_turns() {
    let mut engine = engine_on(TerrainKind::Grassland, &[true, false]);
    engine.spawn_unit(UnitKind::Warrior, CivId(0), Coord::new(1, 1));
    engine.start();

    engine.process_turn();
    assert!(engine.is_game_over());
    let outcome = engine.outcome().unwrap();
    assert!(outcome.won);
    assert_eq!(outcome.civilization_id, CivId(0));
    assert_eq!(engine.advance_turn(), Err(GameError::GameOver));

    let events = engine.drain_events();
    assert_eq!(count(&events, "CIVILIZATION_ELIMINATED"), 1);
    assert_eq!(count(&events, "GAME_WON"), 1);
}

#[test]
fn apply_intent_routes_to_operations() {
    let mut engine = engine_on(TerrainKind::Grassland, &[true, true]);
    let settler = engine.spawn_unit(UnitKind::Settler, CivId(0), Coord::new(2, 2));
    let w = engine.spawn_unit(UnitKind::Warrior, CivId(0), Coord::new(6, 6));
    engine.start();

    let moved = engine
        .apply_intent(Intent::MoveUnit {
            unit: w,
            col: 7,
            row: 6,
        })
        .unwrap();
    assert_eq!(moved, IntentOutcome::Moved(MoveResult::moved()));

    let founded = engine.apply_intent(Intent::FoundCity { settler }).unwrap();
    assert!(matches!(founded, IntentOutcome::CityFounded(_)));

    let err = engine
        .apply_intent(Intent::FoundCity { settler })
        .unwrap_err();
    assert_eq!(err.code(), "unit_not_found");
}

#[test]
fn rejected_manual_move_keeps_the_go_to_order() {
    let mut engine = engine_on(TerrainKind::Grassland, &[true, true]);
    let w = engine.spawn_unit(UnitKind::Warrior, CivId(0), Coord::new(0, 0));
    engine.start();
    engine.go_to(w, Coord::new(3, 0)).unwrap();
    let path = engine.path_of(w);
    assert_eq!(path.as_ref().map(Vec::len), Some(2));

    let rejected = engine
        .apply_intent(Intent::MoveUnit {
            unit: w,
            col: 2,
            row: 0,
        })
        .unwrap();
    assert_eq!(
        rejected,
        IntentOutcome::Moved(MoveResult::rejected(MoveReason::NoMovesLeft))
    );
    assert_eq!(engine.path_of(w), path);

    engine.units.get_mut(w).unwrap().moves_remaining = MovePoints::from_moves(1);
    let moved = engine
        .apply_intent(Intent::MoveUnit {
            unit: w,
            col: 1,
            row: 1,
        })
        .unwrap();
    assert_eq!(moved, IntentOutcome::Moved(MoveResult::moved()));
    assert_eq!(engine.path_of(w), None);
}

#[test]
fn units_only_act_on_their_owners_turn() {
    let mut engine = engine_on(TerrainKind::Grassland, &[true, true]);
    engine.spawn_unit(UnitKind::Warrior, CivId(0), Coord::new(1, 1));
    let theirs = engine.spawn_unit(UnitKind::Warrior, CivId(1), Coord::new(5, 5));
    let settler = engine.spawn_unit(UnitKind::Settler, CivId(1), Coord::new(8, 8));
    engine.start();
    assert_eq!(engine.active_civ(), CivId(0));

    let result = engine.move_unit(theirs, Coord::new(6, 5));
    assert_eq!(result.reason, Some(MoveReason::InvalidTarget));
    assert_eq!(engine.unit(theirs).unwrap().position, Coord::new(5, 5));
    assert_eq!(
        engine.found_city(settler),
        Err(GameError::NotActiveCivilization)
    );
    assert_eq!(
        engine.unit_action(theirs, UnitAction::Fortify),
        Err(GameError::NotActiveCivilization)
    );
    assert_eq!(
        engine.build_improvement(settler, ImprovementKind::Road),
        Err(GameError::NotActiveCivilization)
    );
    assert_eq!(
        engine.go_to(theirs, Coord::new(7, 5)),
        Err(GameError::NotActiveCivilization)
    );
    assert!(engine.city_ids(CivId(1)).is_empty());
    assert_eq!(engine.unit(theirs).unwrap().status, UnitStatus::Active);

    engine.process_turn();
    assert_eq!(engine.active_civ(), CivId(1));
    assert!(engine.move_unit(theirs, Coord::new(6, 5)).success);
}

#[test]
fn losing_the_last_unit_and_city_in_one_turn_eliminates() {
    let mut engine = engine_on(TerrainKind::Grassland, &[true, false]);
    engine.place_city(CivId(1), Coord::new(4, 4));
    let defender = engine.spawn_unit(UnitKind::Warrior, CivId(1), Coord::new(4, 4));
    engine.units.get_mut(defender).unwrap().defense = 0;
    let w = engine.spawn_unit(UnitKind::Warrior, CivId(0), Coord::new(3, 4));
    engine.start();

    assert_eq!(engine.move_unit(w, Coord::new(4, 4)), MoveResult::combat(true));
    assert!(engine.unit_ids(CivId(1)).is_empty());
    assert!(engine.city_ids(CivId(1)).is_empty());
    assert_eq!(engine.city_ids(CivId(0)).len(), 1);

    engine.process_turn();
    let outcome = engine.outcome().unwrap();
    assert!(outcome.won);
    assert_eq!(outcome.civilization_id, CivId(0));
    assert_eq!(outcome.reason, VictoryReason::Elimination);
    assert!(!engine.civ(CivId(1)).unwrap().is_alive);
}

#[test]
fn first_growth_takes_ten_turns_at_two_food() {
    let mut engine = engine_on(TerrainKind::Grassland, &[true, true]);
    let city = engine.place_city(CivId(0), Coord::new(4, 4));
    assert_eq!(engine.city(city).unwrap().food_stored, 0);

    for _ in 0..9 {
        engine.process_cities(CivId(0));
    }
    let c = engine.city(city).unwrap();
    assert_eq!(c.yields.food, 2);
    assert_eq!(c.population, 1);
    assert_eq!(c.food_stored, 18);

    engine.process_cities(CivId(0));
    let c = engine.city(city).unwrap();
    assert_eq!(c.population, 2);
    assert_eq!(c.food_needed(), 40);
}

#[test]
fn finishing_units_out_of_turn_never_ends_a_turn() {
    let mut engine = engine_on(TerrainKind::Grassland, &[true, true]);
    engine.spawn_unit(UnitKind::Warrior, CivId(0), Coord::new(1, 1));
    engine.spawn_unit(UnitKind::Warrior, CivId(1), Coord::new(8, 8));
    engine.start();
    engine.drain_events();

    engine.unit_done(CivId(1), None);
    let events = engine.drain_events();
    assert_eq!(count(&events, "AUTO_END_TURN"), 0);
    assert_eq!(count(&events, "TURN_END_CONFIRMATION_NEEDED"), 0);
    assert_eq!(engine.active_civ(), CivId(0));
    assert_eq!(engine.queue_length(CivId(0)), 1);
}

#[test]
fn reselecting_the_building_in_production_is_allowed() {
    let mut engine = engine_on(TerrainKind::Grassland, &[true, true]);
    engine.civs[0].known_techs.insert(TechId::new("pottery"));
    let city = engine.place_city(CivId(0), Coord::new(4, 4));
    let granary = ProductionItem::Building(BuildingKind::Granary);

    engine.set_production(city, granary, false).unwrap();
    assert_eq!(engine.set_production(city, granary, false), Ok(()));
    assert_eq!(engine.city(city).unwrap().producing, Some(granary));
    assert_eq!(
        engine.set_production(city, granary, true),
        Err(GameError::ItemNotAvailable)
    );
    assert!(engine.city(city).unwrap().build_queue.is_empty());
}
