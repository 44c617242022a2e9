#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system translating held controls into player ship commands.

use space_shooter_core::{Command, Heading, SessionStatus};

/// Input snapshot distilled from adapter-provided frame input data.
///
/// Every flag reports whether the control is held on this frame; holding a
/// control repeats its action each frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PilotInput {
    /// Steer toward the left edge.
    pub left: bool,
    /// Steer toward the right edge.
    pub right: bool,
    /// Steer toward the top edge.
    pub up: bool,
    /// Steer toward the bottom edge.
    pub down: bool,
    /// Fire the player laser.
    pub fire: bool,
}

impl PilotInput {
    /// Creates a new input descriptor with explicit field values.
    #[must_use]
    pub const fn new(left: bool, right: bool, up: bool, down: bool, fire: bool) -> Self {
        Self {
            left,
            right,
            up,
            down,
            fire,
        }
    }
}

/// Player control system that emits movement and firing commands while playing.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlayerControl;

impl PlayerControl {
    /// Creates a new player control system instance.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Emits one command per held control, movement before firing.
    ///
    /// Opposing directions both apply and cancel out unless one is clamped at
    /// the playfield edge.
    pub fn handle(&self, status: SessionStatus, input: PilotInput, out: &mut Vec<Command>) {
        if status != SessionStatus::Playing {
            return;
        }

        let headings = [
            (input.left, Heading::Left),
            (input.right, Heading::Right),
            (input.up, Heading::Up),
            (input.down, Heading::Down),
        ];
        for (held, heading) in headings {
            if held {
                out.push(Command::MovePlayer { heading });
            }
        }

        if input.fire {
            out.push(Command::FirePlayerLaser);
        }
    }
}
