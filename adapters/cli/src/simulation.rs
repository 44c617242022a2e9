use glam::Vec2;
use space_shooter_core::{Command, Event, PixelPoint, SessionStatus, Shooter, LOST_BANNER};
use space_shooter_rendering::{
    FrameInput, HealthBar, Hud, Scene, ScenePhase, SoundCue, SpriteKey, SpritePresentation,
};
use space_shooter_system_bootstrap::Bootstrap;
use space_shooter_system_enemy_fire::EnemyFire;
use space_shooter_system_player_control::{PilotInput, PlayerControl};
use space_shooter_system_spawning::{Config as SpawningConfig, Spawning};
use space_shooter_world::{self as world, query, World};

use crate::high_score::HighScoreStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Title,
    Session,
}

/// Frame driver wiring input, systems and the world together.
#[derive(Debug)]
pub(crate) struct Simulation<S> {
    world: World,
    store: S,
    bootstrap: Bootstrap,
    player_control: PlayerControl,
    spawning: Spawning,
    enemy_fire: EnemyFire,
    phase: Phase,
    commands: Vec<Command>,
    events: Vec<Event>,
    follow_up: Vec<Event>,
    sounds: Vec<SoundCue>,
}

impl<S: HighScoreStore> Simulation<S> {
    /// Creates a driver on the title screen, seeding the world with the stored high score.
    pub(crate) fn new(mut world: World, store: S, seed: u64) -> Self {
        let high_score = store.load();
        let mut events = Vec::new();
        world::apply(&mut world, Command::RestoreHighScore { high_score }, &mut events);
        tracing::info!(high_score, seed, "simulation ready");

        Self {
            world,
            store,
            bootstrap: Bootstrap,
            player_control: PlayerControl::new(),
            spawning: Spawning::new(SpawningConfig::new(seed)),
            enemy_fire: EnemyFire::new(seed.rotate_left(32)),
            phase: Phase::Title,
            commands: Vec::new(),
            events,
            follow_up: Vec::new(),
            sounds: Vec::new(),
        }
    }

    /// Advances one frame and mirrors the resulting state into the scene.
    pub(crate) fn step(&mut self, input: FrameInput, scene: &mut Scene) {
        self.advance(input);
        self.populate_scene(scene);
        scene.sounds.append(&mut self.sounds);
    }

    fn advance(&mut self, input: FrameInput) {
        self.events.clear();

        if self.phase == Phase::Title {
            if input.pointer_clicked {
                tracing::info!("session started");
                self.phase = Phase::Session;
            }
            return;
        }

        self.commands.clear();
        self.player_control.handle(
            query::status(&self.world),
            PilotInput::new(input.left, input.right, input.up, input.down, input.fire),
            &mut self.commands,
        );
        self.commands.push(Command::Tick);
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }

        self.spawning
            .handle(&self.events, query::playfield(&self.world), &mut self.commands);
        self.enemy_fire.handle(
            &self.events,
            query::status(&self.world),
            &query::enemy_view(&self.world),
            &mut self.commands,
        );
        self.follow_up.clear();
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.follow_up);
        }
        self.events.append(&mut self.follow_up);

        self.react_to_events();

        if query::status(&self.world) == SessionStatus::Ended {
            self.phase = Phase::Title;
            world::apply(&mut self.world, Command::ResetSession, &mut self.events);
        }
    }

    fn react_to_events(&mut self) {
        for event in &self.events {
            match *event {
                Event::LaserFired {
                    shooter: Shooter::Player,
                } => self.sounds.push(SoundCue::Laser),
                Event::EnemyDestroyed { .. } => self.sounds.push(SoundCue::Explosion),
                Event::WaveStarted { level, wave_length } => {
                    tracing::info!(level, wave_length, "wave started");
                }
                Event::SessionLost { score } => tracing::info!(score, "session lost"),
                Event::SessionEnded {
                    score,
                    high_score,
                    new_record,
                } => {
                    tracing::info!(score, high_score, new_record, "session ended");
                    if new_record {
                        if let Err(error) = self.store.save(high_score) {
                            tracing::warn!(%error, "high score was not persisted");
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn populate_scene(&self, scene: &mut Scene) {
        scene.clear_entities();

        if self.phase == Phase::Title {
            scene.phase = ScenePhase::Title;
            scene.banner = Some(self.bootstrap.welcome_banner(&self.world).to_owned());
            return;
        }

        let session = query::session(&self.world);
        scene.phase = match session.status {
            SessionStatus::Playing => ScenePhase::Playing,
            SessionStatus::Lost | SessionStatus::Ended => ScenePhase::Lost,
        };
        if scene.phase == ScenePhase::Lost {
            scene.banner = Some(LOST_BANNER.to_owned());
        }
        scene.hud = Hud {
            lives: session.lives,
            level: session.level,
            score: session.score,
            high_score: session.high_score,
        };

        let player = query::player(&self.world);
        let ship = sprite(
            SpriteKey::PlayerShip,
            player.position,
            player.width,
            player.height,
        );
        scene.health_bar = Some(HealthBar::below(&ship, player.health, player.max_health));
        scene.player = Some(ship);

        scene.enemies.extend(query::enemy_view(&self.world).iter().map(|enemy| {
            sprite(
                SpriteKey::EnemyShip(enemy.color),
                enemy.position,
                enemy.width,
                enemy.height,
            )
        }));
        scene
            .lasers
            .extend(query::laser_view(&self.world).into_iter().map(|laser| {
                let key = match laser.color {
                    Some(color) => SpriteKey::EnemyLaser(color),
                    None => SpriteKey::PlayerLaser,
                };
                sprite(key, laser.position, laser.width, laser.height)
            }));
    }
}

fn sprite(key: SpriteKey, position: PixelPoint, width: i32, height: i32) -> SpritePresentation {
    SpritePresentation::new(
        key,
        Vec2::new(position.x() as f32, position.y() as f32),
        Vec2::new(width as f32, height as f32),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::high_score::HighScoreError;
    use space_shooter_core::{EnemyColor, WELCOME_BANNER};
    use space_shooter_world::LOST_DELAY_FRAMES;

    #[derive(Debug, Default)]
    struct MemoryStore {
        stored: u32,
        saves: Vec<u32>,
    }

    impl HighScoreStore for MemoryStore {
        fn load(&self) -> u32 {
            self.stored
        }

        fn save(&mut self, high_score: u32) -> Result<(), HighScoreError> {
            self.stored = high_score;
            self.saves.push(high_score);
            Ok(())
        }
    }

    fn click() -> FrameInput {
        FrameInput {
            pointer_clicked: true,
            ..FrameInput::default()
        }
    }

    fn scene() -> Scene {
        Scene::new(800, 600).expect("valid playfield")
    }

    fn spawn(simulation: &mut Simulation<MemoryStore>, x: i32, y: i32) {
        let mut events = Vec::new();
        world::apply(
            &mut simulation.world,
            Command::SpawnEnemy {
                position: PixelPoint::new(x, y),
                color: EnemyColor::Green,
            },
            &mut events,
        );
    }

    #[test]
    fn title_screen_waits_for_a_click() {
        let mut simulation = Simulation::new(World::new(), MemoryStore::default(), 7);
        let mut scene = scene();

        for _ in 0..10 {
            simulation.step(FrameInput::default(), &mut scene);
        }
        assert_eq!(scene.phase, ScenePhase::Title);
        assert_eq!(scene.banner.as_deref(), Some(WELCOME_BANNER));
        assert_eq!(query::session(&simulation.world).frame, 0);

        simulation.step(click(), &mut scene);
        simulation.step(FrameInput::default(), &mut scene);
        assert_eq!(scene.phase, ScenePhase::Playing);
        assert!(scene.player.is_some());
        assert_eq!(scene.hud.level, 1);
        assert_eq!(scene.enemies.len(), 10, "first wave spawned");
    }

    #[test]
    fn restores_the_stored_high_score() {
        let store = MemoryStore {
            stored: 250,
            saves: Vec::new(),
        };
        let mut simulation = Simulation::new(World::new(), store, 7);
        let mut scene = scene();
        simulation.step(click(), &mut scene);
        simulation.step(FrameInput::default(), &mut scene);
        assert_eq!(scene.hud.high_score, 250);
    }

    #[test]
    fn player_shots_queue_a_laser_sound() {
        let mut simulation = Simulation::new(World::new(), MemoryStore::default(), 7);
        let mut scene = scene();
        simulation.step(click(), &mut scene);

        let fire = FrameInput {
            fire: true,
            ..FrameInput::default()
        };
        simulation.step(fire, &mut scene);

        assert!(scene.sounds.contains(&SoundCue::Laser));
        assert!(scene
            .lasers
            .iter()
            .any(|laser| laser.key == SpriteKey::PlayerLaser));
    }

    #[test]
    fn ramming_queues_an_explosion_and_shrinks_the_health_bar() {
        let mut simulation = Simulation::new(World::new(), MemoryStore::default(), 7);
        let mut scene = scene();
        simulation.step(click(), &mut scene);
        spawn(&mut simulation, 375, 500);

        simulation.step(FrameInput::default(), &mut scene);

        assert!(scene.sounds.contains(&SoundCue::Explosion));
        assert_eq!(scene.hud.score, 5);
        let bar = scene.health_bar.expect("health bar present");
        assert!((bar.ratio - 0.9).abs() < 1e-6);
    }

    #[test]
    fn record_is_persisted_and_title_returns_after_loss() {
        let mut simulation = Simulation::new(World::new(), MemoryStore::default(), 7);
        let mut scene = scene();
        simulation.step(click(), &mut scene);
        spawn(&mut simulation, 375, 500);
        for x in [50, 100, 150, 200, 250] {
            spawn(&mut simulation, x, 560);
        }

        simulation.step(FrameInput::default(), &mut scene);
        assert_eq!(scene.phase, ScenePhase::Lost);
        assert_eq!(scene.banner.as_deref(), Some(LOST_BANNER));

        for _ in 1..LOST_DELAY_FRAMES {
            simulation.step(FrameInput::default(), &mut scene);
            assert_eq!(scene.phase, ScenePhase::Lost);
        }
        assert!(simulation.store.saves.is_empty());

        simulation.step(FrameInput::default(), &mut scene);
        assert_eq!(simulation.store.saves, vec![5]);
        assert_eq!(scene.phase, ScenePhase::Title);

        simulation.step(click(), &mut scene);
        simulation.step(FrameInput::default(), &mut scene);
        assert_eq!(scene.phase, ScenePhase::Playing);
        assert_eq!(scene.hud.score, 0);
        assert_eq!(scene.hud.lives, 5);
        assert_eq!(scene.hud.high_score, 5);
    }

    #[test]
    fn lower_scores_are_not_persisted() {
        let store = MemoryStore {
            stored: 900,
            saves: Vec::new(),
        };
        let mut simulation = Simulation::new(World::new(), store, 7);
        let mut scene = scene();
        simulation.step(click(), &mut scene);
        for x in [50, 100, 150, 200, 250] {
            spawn(&mut simulation, x, 560);
        }
        for _ in 0..=LOST_DELAY_FRAMES {
            simulation.step(FrameInput::default(), &mut scene);
        }
        assert_eq!(scene.phase, ScenePhase::Title);
        assert!(simulation.store.saves.is_empty());
    }
}
