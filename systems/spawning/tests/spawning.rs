use std::collections::HashSet;

use space_shooter_core::{Command, EnemyColor, Event, PixelPoint, Playfield};
use space_shooter_system_spawning::{Config, Spawning};
use space_shooter_world::{self as world, query, World};

fn spawn_positions(commands: &[Command]) -> Vec<(PixelPoint, EnemyColor)> {
    commands
        .iter()
        .map(|command| match command {
            Command::SpawnEnemy { position, color } => (*position, *color),
            other => panic!("unexpected command emitted: {other:?}"),
        })
        .collect()
}

#[test]
fn emits_one_spawn_per_enemy_in_the_wave() {
    let mut spawning = Spawning::new(Config::new(0x1234_5678));

    for wave_length in [10, 15, 20] {
        let mut commands = Vec::new();
        spawning.handle(
            &[Event::WaveStarted {
                level: wave_length / 5 - 1,
                wave_length,
            }],
            Playfield::DEFAULT,
            &mut commands,
        );

        let spawns = spawn_positions(&commands);
        assert_eq!(spawns.len(), wave_length as usize);
        for (position, _) in spawns {
            assert!((50..700).contains(&position.x()), "x = {}", position.x());
            assert!((-1500..-100).contains(&position.y()), "y = {}", position.y());
        }
    }
}

#[test]
fn ignores_unrelated_events() {
    let mut spawning = Spawning::new(Config::new(3));
    let mut commands = Vec::new();
    spawning.handle(
        &[Event::TimeAdvanced { frame: 1 }, Event::ScoreChanged { score: 10 }],
        Playfield::DEFAULT,
        &mut commands,
    );
    assert!(commands.is_empty());
}

#[test]
fn identical_seeds_produce_identical_waves() {
    let event = [Event::WaveStarted {
        level: 1,
        wave_length: 10,
    }];
    let mut first = Vec::new();
    let mut second = Vec::new();
    Spawning::new(Config::new(99)).handle(&event, Playfield::DEFAULT, &mut first);
    Spawning::new(Config::new(99)).handle(&event, Playfield::DEFAULT, &mut second);
    assert_eq!(first, second);
}

#[test]
fn large_waves_use_every_color() {
    let mut spawning = Spawning::new(Config::new(0xfeed));
    let mut commands = Vec::new();
    spawning.handle(
        &[Event::WaveStarted {
            level: 10,
            wave_length: 60,
        }],
        Playfield::DEFAULT,
        &mut commands,
    );
    let colors: HashSet<EnemyColor> = spawn_positions(&commands)
        .into_iter()
        .map(|(_, color)| color)
        .collect();
    assert_eq!(colors.len(), EnemyColor::ALL.len());
}

#[test]
fn world_accepts_the_first_wave() {
    let mut world = World::new();
    let mut spawning = Spawning::new(Config::new(0x4d59_5df4_d0f3_3173));

    let mut events = Vec::new();
    world::apply(&mut world, Command::Tick, &mut events);

    let mut commands = Vec::new();
    spawning.handle(&events, query::playfield(&world), &mut commands);
    assert_eq!(commands.len(), 10);

    let mut spawned = Vec::new();
    for command in commands {
        world::apply(&mut world, command, &mut spawned);
    }

    assert_eq!(query::enemy_view(&world).len(), 10);
    assert!(spawned
        .iter()
        .all(|event| matches!(event, Event::EnemySpawned { .. })));

    let mut next = Vec::new();
    world::apply(&mut world, Command::Tick, &mut next);
    assert!(!next
        .iter()
        .any(|event| matches!(event, Event::WaveStarted { .. })));
}
