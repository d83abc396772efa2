use criterion::{black_box, criterion_group, criterion_main, Criterion};
use meridian_core::{find_path, generate_map, get_reachable_tiles, GameEngine, GameSettings, MapGenConfig, Rules};
use meridian_protocol::{MovePoints, UnitKind};

fn bench_routing(c: &mut Criterion) {
    let config = MapGenConfig {
        width: 64,
        height: 40,
        num_civs: 2,
        ..MapGenConfig::default()
    };
    let generated = generate_map(&config, 17);
    let map = generated.map;
    let (start, goal) = (generated.start_positions[0], generated.start_positions[1]);

    let mut group = c.benchmark_group("meridian-core/pathfinding");

    group.bench_function("find_path_across_map", |b| {
        b.iter(|| {
            let route = find_path(start, goal, |c| map.get(c), UnitKind::Warrior, map.width(), map.height());
            black_box(route.path.len());
        })
    });

    group.bench_function("reachable_three_moves", |b| {
        b.iter(|| {
            let tiles = get_reachable_tiles(
                start,
                MovePoints::from_moves(3),
                |c| map.get(c),
                UnitKind::Warrior,
                map.width(),
                map.height(),
            );
            black_box(tiles.len());
        })
    });

    group.finish();
}

fn bench_ai_round(c: &mut Criterion) {
    let settings = GameSettings {
        player_civ: None,
        ..GameSettings::default()
    };
    let rules = Rules::embedded().expect("rules");

    c.bench_function("meridian-core/ai_round", |b| {
        b.iter(|| {
            let mut engine = GameEngine::new(settings.clone(), rules.clone()).expect("engine");
            engine.run_ai_turns();
            black_box(engine.drain_events().len());
        })
    });
}

criterion_group!(benches, bench_routing, bench_ai_round);
criterion_main!(benches);
