#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state management for Space Shooter.

mod ship;

use space_shooter_core::{
    overlaps, Command, DestroyCause, EnemyColor, EnemyId, Event, Heading, PixelPoint, Playfield,
    SessionStatus, Shooter, SpriteMasks, WELCOME_BANNER,
};

use self::ship::{Enemy, Muzzle, Player};

/// Frames a ship must wait between shots.
pub const COOLDOWN_MAX: u32 = 30;
/// Health removed from a ship struck by a laser.
pub const LASER_DAMAGE: i32 = 10;
/// Health removed from the player when an enemy rams it.
pub const RAM_DAMAGE: i32 = 10;
/// Score awarded for destroying an enemy with a laser.
pub const KILL_SCORE: u32 = 10;
/// Score awarded when an enemy is destroyed by ramming the player.
pub const RAM_SCORE: u32 = 5;
/// Pixels the player moves per frame in each held direction.
pub const PLAYER_VELOCITY: i32 = 5;
/// Vertical pixels a player laser travels per frame.
pub const PLAYER_LASER_VELOCITY: i32 = -5;
/// Vertical pixels an enemy descends per frame.
pub const ENEMY_VELOCITY: i32 = 1;
/// Vertical pixels an enemy laser travels per frame.
pub const ENEMY_LASER_VELOCITY: i32 = 4;
/// Extra clearance kept below the player ship for its health bar.
pub const BOTTOM_MARGIN: i32 = 15;
/// Lives available at the start of a session.
pub const STARTING_LIVES: i32 = 5;
/// Health of a freshly spawned player ship.
pub const PLAYER_MAX_HEALTH: i32 = 100;
/// Health of a freshly spawned enemy ship; one laser hit destroys it.
pub const ENEMY_HEALTH: i32 = LASER_DAMAGE;
/// Wave length before the first wave is requested.
pub const INITIAL_WAVE_LENGTH: u32 = 5;
/// Growth of the wave length with every new wave.
pub const WAVE_GROWTH: u32 = 5;
/// Frames the loss banner stays up before the session ends.
pub const LOST_DELAY_FRAMES: u32 = 180;

/// Counters describing the progress of the current session.
#[derive(Clone, Copy, Debug)]
struct Session {
    status: SessionStatus,
    level: u32,
    lives: i32,
    score: u32,
    high_score: u32,
    wave_length: u32,
    wave_pending: bool,
    frame: u64,
    lost_frames: u32,
}

impl Session {
    const fn fresh(high_score: u32) -> Self {
        Self {
            status: SessionStatus::Playing,
            level: 0,
            lives: STARTING_LIVES,
            score: 0,
            high_score,
            wave_length: INITIAL_WAVE_LENGTH,
            wave_pending: false,
            frame: 0,
            lost_frames: 0,
        }
    }
}

/// Represents the authoritative Space Shooter session state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    playfield: Playfield,
    sprites: SpriteMasks,
    player: Player,
    enemies: Vec<Enemy>,
    next_enemy_id: u32,
    session: Session,
}

impl World {
    /// Creates a new world on the default playfield with rectangular sprites.
    #[must_use]
    pub fn new() -> Self {
        let playfield = Playfield::DEFAULT;
        let sprites = SpriteMasks::rectangular();
        let player = Player::new(
            player_spawn(playfield, &sprites),
            PLAYER_MAX_HEALTH,
            &sprites,
        );
        Self {
            banner: WELCOME_BANNER,
            playfield,
            sprites,
            player,
            enemies: Vec::new(),
            next_enemy_id: 0,
            session: Session::fresh(0),
        }
    }

    fn reset_session(&mut self) {
        self.player = Player::new(
            player_spawn(self.playfield, &self.sprites),
            PLAYER_MAX_HEALTH,
            &self.sprites,
        );
        self.enemies.clear();
        self.next_enemy_id = 0;
        self.session = Session::fresh(self.session.high_score);
    }

    fn playfield_width(&self) -> i32 {
        i32::try_from(self.playfield.width()).unwrap_or(i32::MAX)
    }

    fn playfield_height(&self) -> i32 {
        i32::try_from(self.playfield.height()).unwrap_or(i32::MAX)
    }

    fn move_player(&mut self, heading: Heading) {
        let width = self.playfield_width();
        let height = self.playfield_height();
        let ship = &mut self.player.ship;
        let x = ship.position.x();
        let y = ship.position.y();
        let step = PLAYER_VELOCITY;

        let allowed = match heading {
            Heading::Left => x - step > 0,
            Heading::Right => x + step + ship.width() < width,
            Heading::Up => y - step > 0,
            Heading::Down => y + step + ship.height() + BOTTOM_MARGIN < height,
        };
        if !allowed {
            return;
        }

        ship.position = match heading {
            Heading::Left => ship.position.offset(-step, 0),
            Heading::Right => ship.position.offset(step, 0),
            Heading::Up => ship.position.offset(0, -step),
            Heading::Down => ship.position.offset(0, step),
        };
    }

    fn spawn_enemy(&mut self, position: PixelPoint, color: EnemyColor, out_events: &mut Vec<Event>) {
        let enemy = EnemyId::new(self.next_enemy_id);
        self.next_enemy_id = self.next_enemy_id.saturating_add(1);
        self.enemies
            .push(Enemy::new(enemy, color, position, ENEMY_HEALTH, &self.sprites));
        self.session.wave_pending = false;
        out_events.push(Event::EnemySpawned {
            enemy,
            position,
            color,
        });
    }

    fn fire_enemy_laser(&mut self, enemy: EnemyId, out_events: &mut Vec<Event>) {
        let Some(shooter) = self.enemies.iter_mut().find(|candidate| candidate.id == enemy) else {
            return;
        };
        if shooter.ship.shoot(Muzzle::Belly) {
            out_events.push(Event::LaserFired {
                shooter: Shooter::Enemy(enemy),
            });
        }
    }

    fn tick(&mut self, out_events: &mut Vec<Event>) {
        match self.session.status {
            SessionStatus::Playing => self.advance_frame(out_events),
            SessionStatus::Lost => self.count_down_loss(out_events),
            SessionStatus::Ended => {}
        }
    }

    fn advance_frame(&mut self, out_events: &mut Vec<Event>) {
        self.session.frame = self.session.frame.saturating_add(1);
        out_events.push(Event::TimeAdvanced {
            frame: self.session.frame,
        });

        if self.enemies.is_empty() && !self.session.wave_pending {
            self.session.level = self.session.level.saturating_add(1);
            self.session.wave_length = self.session.wave_length.saturating_add(WAVE_GROWTH);
            self.session.wave_pending = true;
            out_events.push(Event::WaveStarted {
                level: self.session.level,
                wave_length: self.session.wave_length,
            });
        }

        self.advance_enemies(out_events);
        self.advance_player_lasers(out_events);

        if self.session.lives <= 0 || self.player.ship.health <= 0 {
            self.session.status = SessionStatus::Lost;
            self.session.lost_frames = 0;
            out_events.push(Event::SessionLost {
                score: self.session.score,
            });
        }
    }

    fn advance_enemies(&mut self, out_events: &mut Vec<Event>) {
        let height = self.playfield_height();
        let Self {
            player,
            enemies,
            session,
            ..
        } = self;

        enemies.retain_mut(|enemy| {
            enemy.ship.position = enemy.ship.position.offset(0, ENEMY_VELOCITY);
            enemy
                .ship
                .update_lasers(ENEMY_LASER_VELOCITY, height, |laser| {
                    if !laser.collides_with(player.ship.positioned()) {
                        return false;
                    }
                    player.ship.health -= LASER_DAMAGE;
                    out_events.push(Event::PlayerDamaged {
                        damage: LASER_DAMAGE,
                        health: player.ship.health,
                    });
                    true
                });

            if overlaps(enemy.ship.positioned(), player.ship.positioned()) {
                player.ship.health -= RAM_DAMAGE;
                session.score = session.score.saturating_add(RAM_SCORE);
                out_events.push(Event::PlayerDamaged {
                    damage: RAM_DAMAGE,
                    health: player.ship.health,
                });
                out_events.push(Event::EnemyDestroyed {
                    enemy: enemy.id,
                    cause: DestroyCause::Rammed,
                });
                out_events.push(Event::ScoreChanged {
                    score: session.score,
                });
                return false;
            }

            if enemy.ship.bottom() > height {
                session.lives -= 1;
                out_events.push(Event::EnemyEscaped {
                    enemy: enemy.id,
                    lives: session.lives,
                });
                return false;
            }

            true
        });
    }

    fn advance_player_lasers(&mut self, out_events: &mut Vec<Event>) {
        let height = self.playfield_height();
        let Self {
            player,
            enemies,
            session,
            ..
        } = self;

        player
            .ship
            .update_lasers(PLAYER_LASER_VELOCITY, height, |laser| {
                let Some(index) = enemies
                    .iter()
                    .position(|enemy| laser.collides_with(enemy.ship.positioned()))
                else {
                    return false;
                };

                enemies[index].ship.health -= LASER_DAMAGE;
                if enemies[index].ship.health <= 0 {
                    let destroyed = enemies.remove(index);
                    session.score = session.score.saturating_add(KILL_SCORE);
                    out_events.push(Event::EnemyDestroyed {
                        enemy: destroyed.id,
                        cause: DestroyCause::Laser,
                    });
                    out_events.push(Event::ScoreChanged {
                        score: session.score,
                    });
                }
                true
            });
    }

    fn count_down_loss(&mut self, out_events: &mut Vec<Event>) {
        self.session.lost_frames = self.session.lost_frames.saturating_add(1);
        if self.session.lost_frames < LOST_DELAY_FRAMES {
            return;
        }

        self.session.status = SessionStatus::Ended;
        let new_record = self.session.score > self.session.high_score;
        if new_record {
            self.session.high_score = self.session.score;
        }
        out_events.push(Event::SessionEnded {
            score: self.session.score,
            high_score: self.session.high_score,
            new_record,
        });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigurePlayfield { playfield } => {
            world.playfield = playfield;
            world.reset_session();
        }
        Command::ConfigureSprites { sprites } => {
            world.sprites = sprites;
            world.reset_session();
        }
        Command::ResetSession => world.reset_session(),
        Command::RestoreHighScore { high_score } => {
            world.session.high_score = high_score;
        }
        Command::Tick => world.tick(out_events),
        _ if world.session.status != SessionStatus::Playing => {}
        Command::MovePlayer { heading } => world.move_player(heading),
        Command::FirePlayerLaser => {
            if world.player.ship.shoot(Muzzle::Nose) {
                out_events.push(Event::LaserFired {
                    shooter: Shooter::Player,
                });
            }
        }
        Command::FireEnemyLaser { enemy } => world.fire_enemy_laser(enemy, out_events),
        Command::SpawnEnemy { position, color } => world.spawn_enemy(position, color, out_events),
    }
}

/// Centred horizontally, 100 pixels above the bottom edge.
fn player_spawn(playfield: Playfield, sprites: &SpriteMasks) -> PixelPoint {
    let width = i32::try_from(playfield.width()).unwrap_or(i32::MAX);
    let height = i32::try_from(playfield.height()).unwrap_or(i32::MAX);
    let ship_width = i32::try_from(sprites.player_ship.width()).unwrap_or(i32::MAX);
    PixelPoint::new(width / 2 - ship_width / 2, height - 100)
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use space_shooter_core::{EnemyColor, EnemyId, PixelPoint, Playfield, SessionStatus, Shooter};

    use super::World;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides the dimensions of the playfield.
    #[must_use]
    pub fn playfield(world: &World) -> Playfield {
        world.playfield
    }

    /// Reports the lifecycle state of the current session.
    #[must_use]
    pub fn status(world: &World) -> SessionStatus {
        world.session.status
    }

    /// Captures the counters describing the current session.
    #[must_use]
    pub fn session(world: &World) -> SessionSnapshot {
        let session = world.session;
        SessionSnapshot {
            status: session.status,
            level: session.level,
            lives: session.lives,
            score: session.score,
            high_score: session.high_score,
            wave_length: session.wave_length,
            frame: session.frame,
            lost_frames: session.lost_frames,
        }
    }

    /// Captures the state of the player ship.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        let ship = &world.player.ship;
        PlayerSnapshot {
            position: ship.position,
            width: ship.width(),
            height: ship.height(),
            health: ship.health,
            max_health: world.player.max_health,
            cooldown: ship.cooldown().counter(),
        }
    }

    /// Captures a read-only view of the live enemies.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        let mut snapshots: Vec<EnemySnapshot> = world
            .enemies
            .iter()
            .map(|enemy| EnemySnapshot {
                id: enemy.id,
                color: enemy.color,
                position: enemy.ship.position,
                width: enemy.ship.width(),
                height: enemy.ship.height(),
                health: enemy.ship.health,
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        EnemyView { snapshots }
    }

    /// Captures every laser in flight, player lasers first.
    #[must_use]
    pub fn laser_view(world: &World) -> Vec<LaserSnapshot> {
        let player = world
            .player
            .ship
            .lasers()
            .iter()
            .map(|laser| LaserSnapshot {
                shooter: Shooter::Player,
                color: None,
                position: laser.position(),
                width: laser.width(),
                height: laser.height(),
            });
        let enemies = world.enemies.iter().flat_map(|enemy| {
            enemy.ship.lasers().iter().map(move |laser| LaserSnapshot {
                shooter: Shooter::Enemy(enemy.id),
                color: Some(enemy.color),
                position: laser.position(),
                width: laser.width(),
                height: laser.height(),
            })
        });
        player.chain(enemies).collect()
    }

    /// Immutable copy of the session counters.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct SessionSnapshot {
        /// Lifecycle state of the session.
        pub status: SessionStatus,
        /// Number of waves started so far.
        pub level: u32,
        /// Lives remaining; may dip below zero within the losing frame.
        pub lives: i32,
        /// Score accumulated during the session.
        pub score: u32,
        /// Best score known to the world.
        pub high_score: u32,
        /// Size of the most recently requested wave.
        pub wave_length: u32,
        /// Gameplay frames simulated so far.
        pub frame: u64,
        /// Frames spent in the lost state.
        pub lost_frames: u32,
    }

    /// Immutable representation of the player ship.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct PlayerSnapshot {
        /// Top-left corner of the ship sprite.
        pub position: PixelPoint,
        /// Sprite width in pixels.
        pub width: i32,
        /// Sprite height in pixels.
        pub height: i32,
        /// Current health; may be negative until the frame ends.
        pub health: i32,
        /// Health at spawn, used for the health-bar ratio.
        pub max_health: i32,
        /// Current cooldown counter.
        pub cooldown: u32,
    }

    /// Immutable representation of a single enemy.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct EnemySnapshot {
        /// Identifier assigned to the enemy.
        pub id: EnemyId,
        /// Cosmetic color of the enemy.
        pub color: EnemyColor,
        /// Top-left corner of the enemy sprite.
        pub position: PixelPoint,
        /// Sprite width in pixels.
        pub width: i32,
        /// Sprite height in pixels.
        pub height: i32,
        /// Remaining health.
        pub health: i32,
    }

    /// Read-only snapshot describing all live enemies.
    #[derive(Clone, Debug, Default)]
    pub struct EnemyView {
        snapshots: Vec<EnemySnapshot>,
    }

    impl EnemyView {
        /// Iterator over the captured enemy snapshots in identifier order.
        pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
            self.snapshots.iter()
        }

        /// Number of live enemies.
        #[must_use]
        pub fn len(&self) -> usize {
            self.snapshots.len()
        }

        /// Reports whether no enemies are alive.
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.snapshots.is_empty()
        }

        /// Consumes the view, yielding the underlying snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<EnemySnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a laser in flight.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct LaserSnapshot {
        /// Ship that fired the laser.
        pub shooter: Shooter,
        /// Color of the firing enemy, if an enemy fired it.
        pub color: Option<EnemyColor>,
        /// Top-left corner of the laser sprite.
        pub position: PixelPoint,
        /// Sprite width in pixels.
        pub width: i32,
        /// Sprite height in pixels.
        pub height: i32,
    }
}
