#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Space Shooter experience.

mod high_score;
mod simulation;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use space_shooter_core::Command;
use space_shooter_rendering::{Color, Presentation, RenderingBackend, Scene};
use space_shooter_rendering_macroquad::{MacroquadBackend, SpriteSheet};
use space_shooter_system_bootstrap::Bootstrap;
use space_shooter_world::{self as world, World};
use tracing_subscriber::EnvFilter;

use self::{high_score::FileHighScoreStore, simulation::Simulation};

const WINDOW_TITLE: &str = "Space Shooter";

/// Command-line options accepted by the game.
#[derive(Debug, Parser)]
#[command(name = "space-shooter", about = "Arcade space shooter", version)]
struct Args {
    /// Asset manifest describing sprites and sounds.
    #[arg(long, value_name = "PATH", default_value_os_t = SpriteSheet::default_manifest_path())]
    manifest: PathBuf,

    /// File holding the best score across runs.
    #[arg(long, value_name = "PATH", default_value = "highscore.txt")]
    high_score_file: PathBuf,

    /// Seed for enemy placement and firing; random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Draw primitive shapes instead of loading the asset manifest.
    #[arg(long)]
    no_sprites: bool,

    /// Synchronise presentation with the display refresh rate.
    #[arg(long)]
    vsync: bool,

    /// Log the frame rate once per second.
    #[arg(long)]
    show_fps: bool,
}

/// Entry point for the Space Shooter command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    let sheet = if args.no_sprites {
        SpriteSheet::primitive()
    } else {
        SpriteSheet::from_manifest_path(&args.manifest).with_context(|| {
            format!(
                "failed to load assets from {} (pass --no-sprites to run without them)",
                args.manifest.display()
            )
        })?
    };

    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureSprites {
            sprites: sheet.masks(),
        },
        &mut events,
    );

    let playfield = Bootstrap.playfield(&world);
    let scene = Scene::new(playfield.width(), playfield.height())
        .context("failed to describe the playfield")?;
    let presentation = Presentation::new(WINDOW_TITLE, Color::BLACK, scene);

    let store = FileHighScoreStore::new(args.high_score_file);
    tracing::info!(path = %store.path().display(), "high score store");
    let seed = args.seed.unwrap_or_else(rand::random);
    let mut simulation = Simulation::new(world, store, seed);

    MacroquadBackend::new()
        .with_vsync(args.vsync)
        .with_show_fps(args.show_fps)
        .with_sprite_sheet(sheet)
        .run(presentation, move |input, scene| simulation.step(input, scene))
}
