#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that decides when enemy ships attempt to fire.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use space_shooter_core::{Command, Event, SessionStatus};
use space_shooter_world::query::EnemyView;

/// Each enemy fires on average once per this many frames.
pub const FIRE_ODDS: u32 = 120;

/// Enemy fire system that rolls a shot attempt for every enemy each frame.
///
/// The world still gates the attempt on the enemy's cooldown, so a roll that
/// lands while the cooldown runs is silently discarded.
#[derive(Debug)]
pub struct EnemyFire {
    rng: ChaCha8Rng,
    scratch: Vec<Command>,
}

impl EnemyFire {
    /// Creates a new enemy fire system seeded for reproducible sessions.
    #[must_use]
    pub fn new(rng_seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(rng_seed),
            scratch: Vec::new(),
        }
    }

    /// Emits `Command::FireEnemyLaser` entries for enemies whose roll succeeded.
    pub fn handle(
        &mut self,
        events: &[Event],
        status: SessionStatus,
        enemies: &EnemyView,
        out: &mut Vec<Command>,
    ) {
        if status != SessionStatus::Playing || enemies.is_empty() {
            return;
        }

        let frames = events
            .iter()
            .filter(|event| matches!(event, Event::TimeAdvanced { .. }))
            .count();
        if frames == 0 {
            return;
        }

        self.scratch.clear();
        for _ in 0..frames {
            for enemy in enemies.iter() {
                if self.rng.gen_ratio(1, FIRE_ODDS) {
                    self.scratch.push(Command::FireEnemyLaser { enemy: enemy.id });
                }
            }
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}
