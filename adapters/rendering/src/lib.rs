#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Space Shooter adapters.

use anyhow::Result as AnyResult;
use glam::Vec2;
use space_shooter_core::EnemyColor;
use std::{error::Error, fmt};

/// Height of the health bar drawn beneath the player ship.
pub const HEALTH_BAR_HEIGHT: f32 = 10.0;
/// Gap between the bottom of the player ship and its health bar.
pub const HEALTH_BAR_GAP: f32 = 10.0;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Color = Color::from_rgb_u8(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Color = Color::from_rgb_u8(255, 255, 255);
    /// Opaque red.
    pub const RED: Color = Color::from_rgb_u8(255, 0, 0);
    /// Opaque green.
    pub const GREEN: Color = Color::from_rgb_u8(0, 255, 0);

    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Color used for primitives standing in for the provided enemy variant.
    #[must_use]
    pub const fn for_enemy(color: EnemyColor) -> Self {
        match color {
            EnemyColor::Red => Self::from_rgb_u8(0xd6, 0x3a, 0x3a),
            EnemyColor::Blue => Self::from_rgb_u8(0x3a, 0x6e, 0xd6),
            EnemyColor::Green => Self::from_rgb_u8(0x3a, 0xd6, 0x5a),
        }
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Whether the left control is held.
    pub left: bool,
    /// Whether the right control is held.
    pub right: bool,
    /// Whether the up control is held.
    pub up: bool,
    /// Whether the down control is held.
    pub down: bool,
    /// Whether the fire control is held.
    pub fire: bool,
    /// Whether the primary pointer button was pressed on this frame.
    pub pointer_clicked: bool,
}

/// Identifies the artwork used to draw an element of the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpriteKey {
    /// Full-window backdrop.
    Background,
    /// Player ship.
    PlayerShip,
    /// Laser fired by the player.
    PlayerLaser,
    /// Enemy ship of the provided color.
    EnemyShip(EnemyColor),
    /// Laser fired by an enemy of the provided color.
    EnemyLaser(EnemyColor),
}

/// Sprite positioned in screen space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpritePresentation {
    /// Artwork used to draw the sprite.
    pub key: SpriteKey,
    /// Top-left corner in pixels.
    pub position: Vec2,
    /// Width and height in pixels.
    pub size: Vec2,
}

impl SpritePresentation {
    /// Creates a new sprite descriptor.
    #[must_use]
    pub const fn new(key: SpriteKey, position: Vec2, size: Vec2) -> Self {
        Self {
            key,
            position,
            size,
        }
    }
}

/// Health bar anchored beneath the player ship.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HealthBar {
    /// Top-left corner of the bar in pixels.
    pub position: Vec2,
    /// Full width of the bar in pixels.
    pub width: f32,
    /// Fraction of the bar drawn in the healthy color, clamped to `0.0..=1.0`.
    pub ratio: f32,
}

impl HealthBar {
    /// Places a bar as wide as the ship, [`HEALTH_BAR_GAP`] pixels below it.
    #[must_use]
    pub fn below(ship: &SpritePresentation, health: i32, max_health: i32) -> Self {
        let ratio = if max_health > 0 {
            (health as f32 / max_health as f32).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            position: Vec2::new(
                ship.position.x,
                ship.position.y + ship.size.y + HEALTH_BAR_GAP,
            ),
            width: ship.size.x,
            ratio,
        }
    }
}

/// Counters shown in the heads-up display.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Hud {
    /// Lives remaining, shown top-left.
    pub lives: i32,
    /// Current level, shown top-left.
    pub level: u32,
    /// Current score, shown top-right.
    pub score: u32,
    /// Best score known, shown top-right.
    pub high_score: u32,
}

/// Which screen the scene represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScenePhase {
    /// Title screen waiting for a click.
    Title,
    /// Gameplay in progress.
    Playing,
    /// Gameplay frozen beneath the loss banner.
    Lost,
}

/// Sound effects requested by the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundCue {
    /// Player laser fired.
    Laser,
    /// Enemy destroyed.
    Explosion,
}

/// Scene description combining the ships, lasers and overlays.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Width of the playfield in pixels.
    pub width: f32,
    /// Height of the playfield in pixels.
    pub height: f32,
    /// Screen currently presented.
    pub phase: ScenePhase,
    /// Player ship, absent on the title screen.
    pub player: Option<SpritePresentation>,
    /// Health bar beneath the player ship.
    pub health_bar: Option<HealthBar>,
    /// Enemy ships, including those still above the visible area.
    pub enemies: Vec<SpritePresentation>,
    /// Lasers in flight.
    pub lasers: Vec<SpritePresentation>,
    /// Heads-up display counters.
    pub hud: Hud,
    /// Centered banner text, if any.
    pub banner: Option<String>,
    /// Sound effects to play this frame. Backends drain the queue once played.
    pub sounds: Vec<SoundCue>,
}

impl Scene {
    /// Creates an empty title scene for a playfield of the provided size.
    pub fn new(width: u32, height: u32) -> Result<Self, RenderingError> {
        if width == 0 || height == 0 {
            return Err(RenderingError::EmptyPlayfield { width, height });
        }

        Ok(Self {
            width: width as f32,
            height: height as f32,
            phase: ScenePhase::Title,
            player: None,
            health_bar: None,
            enemies: Vec::new(),
            lasers: Vec::new(),
            hud: Hud::default(),
            banner: None,
            sounds: Vec::new(),
        })
    }

    /// Removes every ship, laser and overlay while keeping queued sounds.
    pub fn clear_entities(&mut self) {
        self.player = None;
        self.health_bar = None;
        self.enemies.clear();
        self.lasers.clear();
        self.banner = None;
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame when no background art is loaded.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Space Shooter scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure is invoked once per simulated frame
    /// with the input captured by the adapter, and may mutate the scene before
    /// it is rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq, Eq)]
pub enum RenderingError {
    /// Both playfield dimensions must be positive.
    EmptyPlayfield {
        /// Provided width.
        width: u32,
        /// Provided height.
        height: u32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPlayfield { width, height } => {
                write!(
                    f,
                    "playfield dimensions must be positive (received {width}x{height})"
                )
            }
        }
    }
}

impl Error for RenderingError {}
