use space_shooter_core::{Command, EnemyColor, Event, PixelPoint, SessionStatus};
use space_shooter_system_enemy_fire::{EnemyFire, FIRE_ODDS};
use space_shooter_world::{self as world, query, World};

fn world_with_enemies(count: i32) -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    for index in 0..count {
        world::apply(
            &mut world,
            Command::SpawnEnemy {
                position: PixelPoint::new(50 + index * 10, -400),
                color: EnemyColor::Blue,
            },
            &mut events,
        );
    }
    world
}

fn frames(count: u64) -> Vec<Event> {
    (1..=count).map(|frame| Event::TimeAdvanced { frame }).collect()
}

#[test]
fn fires_roughly_once_per_odds_window() {
    let world = world_with_enemies(10);
    let mut system = EnemyFire::new(0x5eed);
    let mut commands = Vec::new();

    let frame_count = u64::from(FIRE_ODDS) * 100;
    system.handle(
        &frames(frame_count),
        SessionStatus::Playing,
        &query::enemy_view(&world),
        &mut commands,
    );

    let expected = 10 * 100;
    assert!(
        (expected / 2..expected * 2).contains(&commands.len()),
        "got {} fire attempts",
        commands.len()
    );
    assert!(commands
        .iter()
        .all(|command| matches!(command, Command::FireEnemyLaser { .. })));
}

#[test]
fn stays_silent_without_time_advancing() {
    let world = world_with_enemies(5);
    let mut system = EnemyFire::new(1);
    let mut commands = Vec::new();
    system.handle(
        &[Event::ScoreChanged { score: 10 }],
        SessionStatus::Playing,
        &query::enemy_view(&world),
        &mut commands,
    );
    assert!(commands.is_empty());
}

#[test]
fn stays_silent_outside_of_play() {
    let world = world_with_enemies(5);
    let mut system = EnemyFire::new(1);
    let mut commands = Vec::new();
    for status in [SessionStatus::Lost, SessionStatus::Ended] {
        system.handle(
            &frames(10_000),
            status,
            &query::enemy_view(&world),
            &mut commands,
        );
    }
    assert!(commands.is_empty());
}

#[test]
fn world_gates_rolls_on_cooldown() {
    let mut world = world_with_enemies(1);
    let enemy = query::enemy_view(&world).into_vec()[0].id;

    let mut events = Vec::new();
    world::apply(&mut world, Command::FireEnemyLaser { enemy }, &mut events);
    world::apply(&mut world, Command::FireEnemyLaser { enemy }, &mut events);

    assert_eq!(events.len(), 1, "second attempt lands during cooldown");
    assert_eq!(query::laser_view(&world).len(), 1);
}
