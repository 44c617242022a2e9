#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that prepares the Space Shooter experience.

use space_shooter_core::Playfield;
use space_shooter_world::{query, World};

/// Produces data required to greet the player.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Derives the banner that should be shown before a session starts.
    #[must_use]
    pub fn welcome_banner(&self, world: &World) -> &'static str {
        query::welcome_banner(world)
    }

    /// Exposes the playfield dimensions required to size the window.
    #[must_use]
    pub fn playfield(&self, world: &World) -> Playfield {
        query::playfield(world)
    }
}
