#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Space Shooter.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature. Enable this crate's `audio` feature to hear the
//! background music and sound effects; without it every cue is traced.

mod audio;
mod sprites;

use std::{
    collections::HashMap,
    sync::mpsc,
    thread,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use macroquad::{
    input::{is_key_down, is_key_pressed, is_mouse_button_pressed, KeyCode, MouseButton},
    math::Vec2 as MacroquadVec2,
    texture::{DrawTextureParams, FilterMode, Texture2D},
};
use space_shooter_rendering::{
    Color, FrameInput, HealthBar, Hud, Presentation, RenderingBackend, Scene, ScenePhase,
    SpriteKey, SpritePresentation, HEALTH_BAR_HEIGHT,
};

use self::audio::Mixer;
pub use self::sprites::{SoundPaths, SpriteImage, SpriteSheet, ALL_SPRITE_KEYS};

/// Simulation frames per second.
pub const FRAMES_PER_SECOND: u32 = 60;

const HUD_FONT_SIZE: u16 = 30;
const HUD_MARGIN: f32 = 10.0;
const HUD_LINE_SPACING: f32 = 30.0;
const TITLE_FONT_SIZE: u16 = 50;
const LOST_FONT_SIZE: u16 = 60;
const PLAYER_LASER_COLOR: Color = Color::from_rgb_u8(0xff, 0xe0, 0x3a);

#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Q` or `Escape` to quit the game loop.
    quit_requested: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        Self {
            quit_requested: is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q),
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
    sprite_sheet: Option<SpriteSheet>,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or rely solely on the fixed frame budget.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs frame rate metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }

    /// Supplies the artwork and sounds used when drawing the scene.
    ///
    /// Sheets without images make the backend draw primitive shapes.
    #[must_use]
    pub fn with_sprite_sheet(mut self, sheet: SpriteSheet) -> Self {
        self.sprite_sheet = Some(sheet);
        self
    }
}

/// Sleeps away whatever is left of the fixed frame budget.
#[derive(Debug)]
struct FramePacer {
    budget: Duration,
    last: Option<Instant>,
}

impl FramePacer {
    fn new(frames_per_second: u32) -> Self {
        Self {
            budget: Duration::from_secs(1) / frames_per_second.max(1),
            last: None,
        }
    }

    fn remaining(&self, now: Instant) -> Duration {
        match self.last {
            Some(last) => self.budget.saturating_sub(now.saturating_duration_since(last)),
            None => Duration::ZERO,
        }
    }

    /// Blocks until the budget elapsed and returns the duration of the frame.
    fn wait(&mut self) -> Duration {
        let remaining = self.remaining(Instant::now());
        if !remaining.is_zero() {
            thread::sleep(remaining);
        }
        let now = Instant::now();
        let frame = self
            .last
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or_default();
        self.last = Some(now);
        frame
    }
}

/// Counts frames over one-second windows for `--show-fps`.
#[derive(Debug, Default)]
struct FrameRateMeter {
    elapsed: Duration,
    frames: u32,
}

impl FrameRateMeter {
    /// Returns the frame rate of the window that just closed, if one did.
    fn sample(&mut self, frame: Duration) -> Option<f32> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);
        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let rate = self.frames as f32 / self.elapsed.as_secs_f32();
        *self = Self::default();
        Some(rate)
    }
}

/// Textures uploaded from the sprite sheet once the window exists.
#[derive(Debug, Default)]
struct Textures {
    textures: HashMap<SpriteKey, Texture2D>,
}

impl Textures {
    fn upload(sheet: Option<&SpriteSheet>) -> Result<Self> {
        let Some(sheet) = sheet.filter(|sheet| sheet.has_images()) else {
            return Ok(Self::default());
        };

        let mut textures = HashMap::new();
        for key in ALL_SPRITE_KEYS {
            let Some(image) = sheet.image(key) else {
                continue;
            };
            let width = u16::try_from(image.width())
                .with_context(|| format!("sprite {key:?} is too wide for a texture"))?;
            let height = u16::try_from(image.height())
                .with_context(|| format!("sprite {key:?} is too tall for a texture"))?;
            let texture = Texture2D::from_rgba8(width, height, image.rgba());
            texture.set_filter(FilterMode::Nearest);
            let _ = textures.insert(key, texture);
        }
        Ok(Self { textures })
    }

    fn get(&self, key: SpriteKey) -> Option<Texture2D> {
        self.textures.get(&key).copied()
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
            sprite_sheet,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: scene.width as i32,
            window_height: scene.height as i32,
            window_resizable: false,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        let (init_sender, init_receiver) = mpsc::channel::<Result<()>>();

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;

            let textures = match Textures::upload(sprite_sheet.as_ref())
                .context("failed to upload sprite textures")
            {
                Ok(textures) => textures,
                Err(error) => {
                    let _ = init_sender.send(Err(error));
                    return;
                }
            };
            let sounds = sprite_sheet.as_ref().and_then(SpriteSheet::sounds);
            let mixer = match Mixer::load(sounds).await {
                Ok(mixer) => mixer,
                Err(error) => {
                    let _ = init_sender.send(Err(error));
                    return;
                }
            };
            let _ = init_sender.send(Ok(()));
            tracing::info!(
                textures = textures.textures.len(),
                width = scene.width,
                height = scene.height,
                "window ready"
            );

            let background = to_macroquad_color(clear_color);
            let mut pacer = FramePacer::new(FRAMES_PER_SECOND);
            let mut frame_rate = FrameRateMeter::default();

            loop {
                let frame = pacer.wait();

                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    tracing::info!("quit requested");
                    break;
                }

                update_scene(gather_frame_input(), &mut scene);
                mixer.drain(&mut scene.sounds);

                draw_background(&scene, &textures, background);
                if scene.phase != ScenePhase::Title {
                    for laser in &scene.lasers {
                        draw_sprite(laser, &textures);
                    }
                    for enemy in &scene.enemies {
                        draw_sprite(enemy, &textures);
                    }
                    if let Some(player) = &scene.player {
                        draw_sprite(player, &textures);
                    }
                    if let Some(bar) = scene.health_bar {
                        draw_health_bar(bar);
                    }
                    draw_hud(&scene.hud, scene.width);
                }
                if let Some(banner) = &scene.banner {
                    draw_banner(banner, banner_font_size(scene.phase), &scene);
                }

                if show_fps {
                    if let Some(fps) = frame_rate.sample(frame) {
                        tracing::info!(fps = format_args!("{fps:.2}"), "frame rate");
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        init_receiver.recv().unwrap_or_else(|_| Ok(()))?;

        Ok(())
    }
}

fn gather_frame_input() -> FrameInput {
    FrameInput {
        left: is_key_down(KeyCode::Left),
        right: is_key_down(KeyCode::Right),
        up: is_key_down(KeyCode::Up),
        down: is_key_down(KeyCode::Down),
        fire: is_key_down(KeyCode::Space),
        pointer_clicked: is_mouse_button_pressed(MouseButton::Left),
    }
}

fn draw_background(scene: &Scene, textures: &Textures, clear_color: macroquad::color::Color) {
    macroquad::window::clear_background(clear_color);
    if let Some(texture) = textures.get(SpriteKey::Background) {
        draw_texture(
            texture,
            MacroquadVec2::new(0.0, 0.0),
            MacroquadVec2::new(scene.width, scene.height),
        );
    }
}

fn draw_sprite(sprite: &SpritePresentation, textures: &Textures) {
    let position = MacroquadVec2::new(sprite.position.x, sprite.position.y);
    let size = MacroquadVec2::new(sprite.size.x, sprite.size.y);
    match textures.get(sprite.key) {
        Some(texture) => draw_texture(texture, position, size),
        None => draw_primitive(sprite.key, position, size),
    }
}

fn draw_texture(texture: Texture2D, position: MacroquadVec2, size: MacroquadVec2) {
    macroquad::texture::draw_texture_ex(
        texture,
        position.x,
        position.y,
        macroquad::color::WHITE,
        DrawTextureParams {
            dest_size: Some(size),
            ..DrawTextureParams::default()
        },
    );
}

/// Draws the shape the primitive sprite sheet derives its masks from.
fn draw_primitive(key: SpriteKey, position: MacroquadVec2, size: MacroquadVec2) {
    let (color, apex_up) = match key {
        SpriteKey::Background => return,
        SpriteKey::PlayerShip => (Color::WHITE, Some(true)),
        SpriteKey::EnemyShip(color) => (Color::for_enemy(color), Some(false)),
        SpriteKey::PlayerLaser => (PLAYER_LASER_COLOR, None),
        SpriteKey::EnemyLaser(color) => (Color::for_enemy(color), None),
    };
    let color = to_macroquad_color(color);

    match apex_up {
        Some(apex_up) => {
            let [apex, left, right] = triangle_vertices(position, size, apex_up);
            macroquad::shapes::draw_triangle(apex, left, right, color);
        }
        None => macroquad::shapes::draw_rectangle(position.x, position.y, size.x, size.y, color),
    }
}

fn triangle_vertices(position: MacroquadVec2, size: MacroquadVec2, apex_up: bool) -> [MacroquadVec2; 3] {
    let (apex_y, base_y) = if apex_up {
        (position.y, position.y + size.y)
    } else {
        (position.y + size.y, position.y)
    };
    [
        MacroquadVec2::new(position.x + size.x / 2.0, apex_y),
        MacroquadVec2::new(position.x, base_y),
        MacroquadVec2::new(position.x + size.x, base_y),
    ]
}

fn draw_health_bar(bar: HealthBar) {
    macroquad::shapes::draw_rectangle(
        bar.position.x,
        bar.position.y,
        bar.width,
        HEALTH_BAR_HEIGHT,
        to_macroquad_color(Color::RED),
    );
    macroquad::shapes::draw_rectangle(
        bar.position.x,
        bar.position.y,
        bar.width * bar.ratio,
        HEALTH_BAR_HEIGHT,
        to_macroquad_color(Color::GREEN),
    );
}

/// Labels in drawing order: lives and level on the left, score and high score on the right.
fn hud_labels(hud: &Hud) -> [String; 4] {
    [
        format!("Lives: {}", hud.lives),
        format!("Level: {}", hud.level),
        format!("Score: {}", hud.score),
        format!("High Score: {}", hud.high_score),
    ]
}

fn draw_hud(hud: &Hud, width: f32) {
    let white = to_macroquad_color(Color::WHITE);
    let font_size = f32::from(HUD_FONT_SIZE);
    let [lives, level, score, high_score] = hud_labels(hud);

    for (row, label) in [lives, level].iter().enumerate() {
        let top = HUD_MARGIN + row as f32 * HUD_LINE_SPACING;
        let dimensions = macroquad::text::measure_text(label, None, HUD_FONT_SIZE, 1.0);
        macroquad::text::draw_text(label, HUD_MARGIN, top + dimensions.offset_y, font_size, white);
    }
    for (row, label) in [score, high_score].iter().enumerate() {
        let top = HUD_MARGIN + row as f32 * HUD_LINE_SPACING;
        let dimensions = macroquad::text::measure_text(label, None, HUD_FONT_SIZE, 1.0);
        macroquad::text::draw_text(
            label,
            width - dimensions.width - HUD_MARGIN,
            top + dimensions.offset_y,
            font_size,
            white,
        );
    }
}

fn banner_font_size(phase: ScenePhase) -> u16 {
    match phase {
        ScenePhase::Lost => LOST_FONT_SIZE,
        ScenePhase::Title | ScenePhase::Playing => TITLE_FONT_SIZE,
    }
}

fn draw_banner(text: &str, font_size: u16, scene: &Scene) {
    let dimensions = macroquad::text::measure_text(text, None, font_size, 1.0);
    macroquad::text::draw_text(
        text,
        scene.width / 2.0 - dimensions.width / 2.0,
        scene.height / 2.0 - dimensions.height / 2.0 + dimensions.offset_y,
        f32::from(font_size),
        to_macroquad_color(Color::WHITE),
    );
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
