#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for populating enemy waves.

use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use space_shooter_core::{Command, EnemyColor, Event, PixelPoint, Playfield};

/// Leftmost horizontal spawn coordinate.
const SPAWN_LEFT: i32 = 50;
/// Distance from the right edge that bounds the horizontal spawn range.
const SPAWN_RIGHT_MARGIN: i32 = 100;
/// Highest (most negative) vertical spawn coordinate, inclusive.
const SPAWN_TOP: i32 = -1500;
/// Exclusive lower bound of the vertical spawn range.
const SPAWN_BOTTOM: i32 = -100;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided seed.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }
}

/// Pure system that answers wave requests with one spawn command per enemy.
///
/// Enemies are scattered above the visible area so a wave trickles in over
/// several seconds instead of arriving as a single row.
#[derive(Debug)]
pub struct Spawning {
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes events and emits spawn commands for every started wave.
    pub fn handle(&mut self, events: &[Event], playfield: Playfield, out: &mut Vec<Command>) {
        for event in events {
            if let Event::WaveStarted { wave_length, .. } = event {
                for _ in 0..*wave_length {
                    let position = self.spawn_position(playfield);
                    let color = self.next_color();
                    out.push(Command::SpawnEnemy { position, color });
                }
            }
        }
    }

    fn spawn_position(&mut self, playfield: Playfield) -> PixelPoint {
        let width = i32::try_from(playfield.width()).unwrap_or(i32::MAX);
        let right = (width - SPAWN_RIGHT_MARGIN).max(SPAWN_LEFT + 1);
        let x = self.rng.gen_range(SPAWN_LEFT..right);
        let y = self.rng.gen_range(SPAWN_TOP..SPAWN_BOTTOM);
        PixelPoint::new(x, y)
    }

    fn next_color(&mut self) -> EnemyColor {
        EnemyColor::ALL
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(EnemyColor::Red)
    }
}
