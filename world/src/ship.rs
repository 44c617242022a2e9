//! Ships, their lasers and the cooldown shared by every shooter.

use std::sync::Arc;

use space_shooter_core::{CollisionMask, EnemyColor, EnemyId, PixelPoint, PositionedMask, SpriteMasks};

use crate::COOLDOWN_MAX;

/// Frame counter gating how often a ship may fire.
///
/// The counter rests at zero while the ship is ready. Firing sets it to one,
/// every advance increments it, and only after it visits [`COOLDOWN_MAX`] does
/// the next advance return it to zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Cooldown {
    counter: u32,
}

impl Cooldown {
    pub(crate) fn advance(&mut self) {
        if self.counter >= COOLDOWN_MAX {
            self.counter = 0;
        } else if self.counter > 0 {
            self.counter += 1;
        }
    }

    pub(crate) const fn is_ready(&self) -> bool {
        self.counter == 0
    }

    pub(crate) fn trigger(&mut self) {
        self.counter = 1;
    }

    pub(crate) const fn counter(&self) -> u32 {
        self.counter
    }
}

/// Projectile travelling vertically at the velocity its owner supplies.
#[derive(Clone, Debug)]
pub(crate) struct Laser {
    position: PixelPoint,
    mask: Arc<CollisionMask>,
}

impl Laser {
    pub(crate) fn new(position: PixelPoint, mask: Arc<CollisionMask>) -> Self {
        Self { position, mask }
    }

    pub(crate) const fn position(&self) -> PixelPoint {
        self.position
    }

    pub(crate) fn width(&self) -> i32 {
        dimension(self.mask.width())
    }

    pub(crate) fn height(&self) -> i32 {
        dimension(self.mask.height())
    }

    /// Translates the laser vertically. Bounds are the caller's concern.
    pub(crate) fn advance(&mut self, dy: i32) {
        self.position = self.position.offset(0, dy);
    }

    /// A laser leaves the simulation once its top edge exits `[0, height]`.
    pub(crate) fn off_screen(&self, height: i32) -> bool {
        self.position.y() < 0 || self.position.y() > height
    }

    pub(crate) fn collides_with(&self, target: PositionedMask<'_>) -> bool {
        space_shooter_core::overlaps(self.positioned(), target)
    }

    pub(crate) fn positioned(&self) -> PositionedMask<'_> {
        PositionedMask::new(&self.mask, self.position)
    }
}

/// Where a ship's lasers leave the hull.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Muzzle {
    /// Top edge, firing upward.
    Nose,
    /// Bottom edge, firing downward.
    Belly,
}

/// State shared by the player and enemy ships.
#[derive(Clone, Debug)]
pub(crate) struct Ship {
    pub(crate) position: PixelPoint,
    pub(crate) health: i32,
    mask: Arc<CollisionMask>,
    laser_mask: Arc<CollisionMask>,
    lasers: Vec<Laser>,
    cooldown: Cooldown,
}

impl Ship {
    pub(crate) fn new(
        position: PixelPoint,
        health: i32,
        mask: Arc<CollisionMask>,
        laser_mask: Arc<CollisionMask>,
    ) -> Self {
        Self {
            position,
            health,
            mask,
            laser_mask,
            lasers: Vec::new(),
            cooldown: Cooldown::default(),
        }
    }

    pub(crate) fn width(&self) -> i32 {
        dimension(self.mask.width())
    }

    pub(crate) fn height(&self) -> i32 {
        dimension(self.mask.height())
    }

    pub(crate) fn bottom(&self) -> i32 {
        self.position.y() + self.height()
    }

    pub(crate) fn positioned(&self) -> PositionedMask<'_> {
        PositionedMask::new(&self.mask, self.position)
    }

    pub(crate) fn lasers(&self) -> &[Laser] {
        &self.lasers
    }

    pub(crate) const fn cooldown(&self) -> Cooldown {
        self.cooldown
    }

    pub(crate) fn advance_cooldown(&mut self) {
        self.cooldown.advance();
    }

    /// Fires a laser centred on the hull when the cooldown allows.
    ///
    /// Returns `true` when a laser was spawned.
    #[must_use]
    pub(crate) fn shoot(&mut self, muzzle: Muzzle) -> bool {
        if !self.cooldown.is_ready() {
            return false;
        }

        let x = self.position.x() + self.width() / 2 - dimension(self.laser_mask.width()) / 2;
        let y = match muzzle {
            Muzzle::Nose => self.position.y(),
            Muzzle::Belly => self.bottom(),
        };
        self.lasers
            .push(Laser::new(PixelPoint::new(x, y), Arc::clone(&self.laser_mask)));
        self.cooldown.trigger();
        true
    }

    /// Advances the cooldown, then moves every laser once.
    ///
    /// Lasers that leave the playfield are dropped. Remaining lasers are
    /// offered to `on_contact`, which applies any hit to its targets and
    /// returns `true` to consume the laser. Each laser is visited exactly once.
    pub(crate) fn update_lasers<F>(&mut self, velocity: i32, playfield_height: i32, mut on_contact: F)
    where
        F: FnMut(&Laser) -> bool,
    {
        self.advance_cooldown();
        self.lasers.retain_mut(|laser| {
            laser.advance(velocity);
            if laser.off_screen(playfield_height) {
                return false;
            }
            !on_contact(laser)
        });
    }
}

/// Player-controlled ship.
#[derive(Clone, Debug)]
pub(crate) struct Player {
    pub(crate) ship: Ship,
    pub(crate) max_health: i32,
}

impl Player {
    pub(crate) fn new(position: PixelPoint, health: i32, sprites: &SpriteMasks) -> Self {
        Self {
            ship: Ship::new(
                position,
                health,
                Arc::clone(&sprites.player_ship),
                Arc::clone(&sprites.player_laser),
            ),
            max_health: health,
        }
    }
}

/// Enemy ship descending through the playfield.
#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) color: EnemyColor,
    pub(crate) ship: Ship,
}

impl Enemy {
    pub(crate) fn new(
        id: EnemyId,
        color: EnemyColor,
        position: PixelPoint,
        health: i32,
        sprites: &SpriteMasks,
    ) -> Self {
        Self {
            id,
            color,
            ship: Ship::new(
                position,
                health,
                Arc::clone(sprites.enemy_ship(color)),
                Arc::clone(sprites.enemy_laser(color)),
            ),
        }
    }
}

fn dimension(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ship_at(x: i32, y: i32) -> Ship {
        let sprites = SpriteMasks::rectangular();
        Ship::new(
            PixelPoint::new(x, y),
            100,
            Arc::clone(&sprites.player_ship),
            Arc::clone(&sprites.player_laser),
        )
    }

    #[test]
    fn laser_translation_is_exact() {
        let mut laser = Laser::new(PixelPoint::new(12, 300), Arc::new(CollisionMask::filled(5, 20)));
        for velocity in [-5, 4] {
            let start = laser.position();
            for _ in 0..37 {
                laser.advance(velocity);
            }
            assert_eq!(laser.position(), start.offset(0, 37 * velocity));
        }
    }

    #[test]
    fn laser_is_off_screen_only_outside_vertical_bounds() {
        let mask = Arc::new(CollisionMask::filled(5, 20));
        for y in -3..=603 {
            let laser = Laser::new(PixelPoint::new(0, y), Arc::clone(&mask));
            assert_eq!(laser.off_screen(600), !(0..=600).contains(&y), "y = {y}");
        }
    }

    #[test]
    fn cooldown_reenables_after_exactly_cooldown_max_advances() {
        let mut ship = ship_at(100, 100);
        assert!(ship.shoot(Muzzle::Nose));

        for advance in 1..COOLDOWN_MAX {
            ship.advance_cooldown();
            assert!(!ship.shoot(Muzzle::Nose), "fired after {advance} advances");
        }
        assert_eq!(ship.cooldown().counter(), COOLDOWN_MAX);

        ship.advance_cooldown();
        assert!(ship.shoot(Muzzle::Nose));
        assert_eq!(ship.lasers().len(), 2);
    }

    #[test]
    fn idle_cooldown_stays_ready() {
        let mut cooldown = Cooldown::default();
        for _ in 0..100 {
            cooldown.advance();
            assert!(cooldown.is_ready());
        }
    }

    #[test]
    fn lasers_leave_from_the_centre_of_the_muzzle() {
        let mut ship = ship_at(375, 500);
        assert!(ship.shoot(Muzzle::Nose));
        assert_eq!(ship.lasers()[0].position(), PixelPoint::new(398, 500));

        let mut belly = ship_at(375, 500);
        assert!(belly.shoot(Muzzle::Belly));
        assert_eq!(belly.lasers()[0].position(), PixelPoint::new(398, 550));
    }

    #[test]
    fn update_lasers_drops_off_screen_and_consumed_lasers() {
        let mut ship = ship_at(100, 2);
        assert!(ship.shoot(Muzzle::Nose));
        ship.update_lasers(-5, 600, |_| false);
        assert!(ship.lasers().is_empty(), "laser above the top edge is dropped");

        let mut ship = ship_at(100, 300);
        assert!(ship.shoot(Muzzle::Nose));
        let mut offered = 0;
        ship.update_lasers(-5, 600, |laser| {
            offered += 1;
            assert_eq!(laser.position().y(), 295);
            true
        });
        assert_eq!(offered, 1);
        assert!(ship.lasers().is_empty(), "consumed laser is removed");
    }

    #[test]
    fn update_lasers_visits_every_laser_once_while_removing() {
        let mut ship = ship_at(100, 300);
        for _ in 0..4 {
            assert!(ship.shoot(Muzzle::Nose));
            for _ in 0..COOLDOWN_MAX {
                ship.advance_cooldown();
            }
        }
        assert_eq!(ship.lasers().len(), 4);

        let mut visits = 0;
        ship.update_lasers(-1, 600, |_| {
            visits += 1;
            visits % 2 == 1
        });

        assert_eq!(visits, 4);
        assert_eq!(ship.lasers().len(), 2);
    }
}
