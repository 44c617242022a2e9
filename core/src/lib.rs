#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Space Shooter engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

pub mod mask;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use mask::{overlaps, CollisionMask, MaskError, PositionedMask};

/// Canonical banner shown on the title screen before a session starts.
pub const WELCOME_BANNER: &str = "Click to begin...";

/// Banner shown while a lost session counts down to its end.
pub const LOST_BANNER: &str = "You Lost!!";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Resizes the playfield and starts a fresh session on it.
    ConfigurePlayfield {
        /// Dimensions of the visible play area in pixels.
        playfield: Playfield,
    },
    /// Replaces the collision masks and starts a fresh session using them.
    ConfigureSprites {
        /// Masks derived from the loaded sprite art.
        sprites: SpriteMasks,
    },
    /// Discards the current session and starts a fresh one, keeping the high score.
    ResetSession,
    /// Seeds the session with the high score persisted by a previous run.
    RestoreHighScore {
        /// Best score recorded so far.
        high_score: u32,
    },
    /// Requests that the player ship move one step in the provided heading.
    MovePlayer {
        /// Direction of travel for the attempted step.
        heading: Heading,
    },
    /// Requests that the player ship fire a laser if its cooldown allows.
    FirePlayerLaser,
    /// Requests that an enemy ship fire a laser if its cooldown allows.
    FireEnemyLaser {
        /// Identifier of the enemy attempting to fire.
        enemy: EnemyId,
    },
    /// Requests that a new enemy ship enter the playfield.
    SpawnEnemy {
        /// Top-left corner of the enemy sprite, usually above the visible area.
        position: PixelPoint,
        /// Cosmetic color selecting the enemy's sprites.
        color: EnemyColor,
    },
    /// Advances the simulation by exactly one frame.
    Tick,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that a gameplay frame was simulated.
    TimeAdvanced {
        /// Number of gameplay frames simulated in the current session.
        frame: u64,
    },
    /// Announces that the previous wave was cleared and a new one is due.
    WaveStarted {
        /// Level reached by starting this wave.
        level: u32,
        /// Number of enemies the new wave should contain.
        wave_length: u32,
    },
    /// Confirms that an enemy entered the playfield.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Top-left corner of the enemy sprite.
        position: PixelPoint,
        /// Cosmetic color of the enemy.
        color: EnemyColor,
    },
    /// Confirms that a ship fired a laser.
    LaserFired {
        /// Ship that fired the laser.
        shooter: Shooter,
    },
    /// Reports that the player ship lost health.
    PlayerDamaged {
        /// Health removed by the hit.
        damage: i32,
        /// Remaining health after the hit. May be negative until the frame ends.
        health: i32,
    },
    /// Reports that an enemy was destroyed by the player.
    EnemyDestroyed {
        /// Identifier of the destroyed enemy.
        enemy: EnemyId,
        /// How the enemy was destroyed.
        cause: DestroyCause,
    },
    /// Reports that an enemy slipped past the bottom of the playfield.
    EnemyEscaped {
        /// Identifier of the escaped enemy.
        enemy: EnemyId,
        /// Lives remaining after the escape.
        lives: i32,
    },
    /// Reports the updated session score.
    ScoreChanged {
        /// Score after the change.
        score: u32,
    },
    /// Announces that the session entered the lost state.
    SessionLost {
        /// Score achieved by the session.
        score: u32,
    },
    /// Announces that the lost countdown elapsed and the session is over.
    SessionEnded {
        /// Final score of the session.
        score: u32,
        /// Best score after accounting for this session.
        high_score: u32,
        /// Whether this session beat the previously recorded high score.
        new_record: bool,
    },
}

/// Reasons an enemy may be removed from play with a score award.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DestroyCause {
    /// A player laser destroyed the enemy.
    Laser,
    /// The enemy collided with the player ship.
    Rammed,
}

/// Identifies the ship that owns a laser.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shooter {
    /// The player ship.
    Player,
    /// An enemy ship.
    Enemy(EnemyId),
}

/// Lifecycle of a single play-through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    /// Gameplay advances every frame.
    Playing,
    /// The session is lost and the loss banner is counting down.
    Lost,
    /// The session is over and the high score has been settled.
    Ended,
}

/// Directions available to the player ship.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Heading {
    /// Movement toward decreasing x.
    Left,
    /// Movement toward increasing x.
    Right,
    /// Movement toward decreasing y.
    Up,
    /// Movement toward increasing y.
    Down,
}

/// Cosmetic enemy variant selecting which sprites are drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnemyColor {
    /// Red enemy sprites.
    Red,
    /// Blue enemy sprites.
    Blue,
    /// Green enemy sprites.
    Green,
}

impl EnemyColor {
    /// Every available enemy color in declaration order.
    pub const ALL: [EnemyColor; 3] = [EnemyColor::Red, EnemyColor::Blue, EnemyColor::Green];

    /// Position of the color within [`EnemyColor::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Red => 0,
            Self::Blue => 1,
            Self::Green => 2,
        }
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Screen-space position measured in whole pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelPoint {
    x: i32,
    y: i32,
}

impl PixelPoint {
    /// Creates a new pixel coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate, increasing to the right.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical coordinate, increasing downward.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the point translated by the provided deltas.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Dimensions of the visible play area in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Playfield {
    width: u32,
    height: u32,
}

impl Playfield {
    /// Playfield used when nothing else is configured.
    pub const DEFAULT: Playfield = Playfield::new(800, 600);

    /// Creates a new playfield description.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width of the playfield in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the playfield in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}

impl Default for Playfield {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Collision masks for every sprite that takes part in the simulation.
///
/// Masks are reference counted so projectiles can share the immutable mask of
/// the sprite they were fired with.
#[derive(Clone, Debug, PartialEq)]
pub struct SpriteMasks {
    /// Player ship mask.
    pub player_ship: Arc<CollisionMask>,
    /// Player laser mask.
    pub player_laser: Arc<CollisionMask>,
    /// Enemy ship masks indexed by [`EnemyColor::index`].
    pub enemy_ships: [Arc<CollisionMask>; 3],
    /// Enemy laser masks indexed by [`EnemyColor::index`].
    pub enemy_lasers: [Arc<CollisionMask>; 3],
}

impl SpriteMasks {
    /// Player ship size used by the reference art.
    pub const PLAYER_SHIP_SIZE: (u32, u32) = (50, 50);
    /// Enemy ship size used by the reference art.
    pub const ENEMY_SHIP_SIZE: (u32, u32) = (40, 40);
    /// Laser size used by the reference art.
    pub const LASER_SIZE: (u32, u32) = (5, 20);

    /// Rectangular masks matching the reference art dimensions.
    #[must_use]
    pub fn rectangular() -> Self {
        let (ship_w, ship_h) = Self::PLAYER_SHIP_SIZE;
        let (enemy_w, enemy_h) = Self::ENEMY_SHIP_SIZE;
        let (laser_w, laser_h) = Self::LASER_SIZE;
        let enemy_ship = Arc::new(CollisionMask::filled(enemy_w, enemy_h));
        let laser = Arc::new(CollisionMask::filled(laser_w, laser_h));
        Self {
            player_ship: Arc::new(CollisionMask::filled(ship_w, ship_h)),
            player_laser: Arc::clone(&laser),
            enemy_ships: [
                Arc::clone(&enemy_ship),
                Arc::clone(&enemy_ship),
                enemy_ship,
            ],
            enemy_lasers: [Arc::clone(&laser), Arc::clone(&laser), laser],
        }
    }

    /// Ship mask used by enemies of the provided color.
    #[must_use]
    pub fn enemy_ship(&self, color: EnemyColor) -> &Arc<CollisionMask> {
        &self.enemy_ships[color.index()]
    }

    /// Laser mask used by enemies of the provided color.
    #[must_use]
    pub fn enemy_laser(&self, color: EnemyColor) -> &Arc<CollisionMask> {
        &self.enemy_lasers[color.index()]
    }
}

impl Default for SpriteMasks {
    fn default() -> Self {
        Self::rectangular()
    }
}
