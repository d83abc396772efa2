use meridian_core::{GameEngine, GameSettings, Rules};
use meridian_protocol::{CivId, GameEvent};

fn all_ai(seed: u64) -> GameEngine {
    let settings = GameSettings {
        map_width: 20,
        map_height: 20,
        civ_count: 2,
        player_civ: None,
        seed,
        ..GameSettings::default()
    };
    GameEngine::new(settings, Rules::embedded().unwrap()).unwrap()
}

fn names(events: &[GameEvent]) -> Vec<&'static str> {
    events.iter().map(GameEvent::name).collect()
}

#[test]
fn ai_civilizations_play_rounds_on_their_own() {
    let mut engine = all_ai(7);
    assert_eq!(engine.turn(), 1);
    assert_eq!(engine.unit_ids(CivId(0)).len(), 3);

    let mut events = Vec::new();
    for _ in 0..5 {
        if engine.is_game_over() {
            break;
        }
        engine.run_ai_turns();
        events.extend(engine.drain_events());
    }

    let names = names(&events);
    assert!(names.contains(&"AI_FINISHED"));
    assert!(names.contains(&"AUTO_END_TURN"));
    assert!(names.contains(&"CITY_FOUNDED"));
    assert!(!names.contains(&"TURN_END_CONFIRMATION_NEEDED"));
    assert!(engine.is_game_over() || engine.turn() == 6);
    assert!(engine.year() > -4000);
}

#[test]
fn same_seed_replays_identically() {
    let mut a = all_ai(42);
    let mut b = all_ai(42);
    for _ in 0..4 {
        a.run_ai_turns();
        b.run_ai_turns();
    }
    assert_eq!(a.drain_events(), b.drain_events());
    assert_eq!(a.civ_snapshots(), b.civ_snapshots());
    assert_eq!(a.unit_snapshots(CivId(1)), b.unit_snapshots(CivId(1)));
}

#[test]
fn new_game_regenerates_the_same_world() {
    let mut engine = all_ai(3);
    let before = engine.unit_snapshots(CivId(0));
    engine.run_ai_turns();
    engine.new_game();
    assert_eq!(engine.turn(), 1);
    assert_eq!(engine.unit_snapshots(CivId(0)), before);
    assert!(engine.city_ids(CivId(0)).is_empty());
}

#[tokio::test]
async fn async_driver_matches_the_blocking_one() {
    let mut blocking = all_ai(11);
    let mut stepped = all_ai(11);
    for _ in 0..3 {
        blocking.run_ai_turns();
        stepped.run_ai_turns_async().await;
    }
    assert_eq!(blocking.turn(), stepped.turn());
    assert_eq!(blocking.drain_events(), stepped.drain_events());
}

#[test]
fn events_serialize_with_their_wire_names() {
    let mut engine = all_ai(5);
    engine.run_ai_turns();
    for event in engine.drain_events() {
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.name());
        let back: GameEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
