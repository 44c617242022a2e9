//! Pixel-exact collision masks derived from sprite opacity.

use thiserror::Error;

use crate::PixelPoint;

/// Alpha values strictly above this threshold are treated as opaque.
pub const ALPHA_THRESHOLD: u8 = 127;

/// Immutable per-pixel opacity grid describing the solid area of a sprite.
///
/// Masks are computed once when a sprite is loaded and shared by every entity
/// drawn with that sprite.
#[derive(Clone, PartialEq, Eq)]
pub struct CollisionMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl CollisionMask {
    /// Creates a mask where every pixel is opaque.
    #[must_use]
    pub fn filled(width: u32, height: u32) -> Self {
        Self::from_fn(width, height, |_, _| true)
    }

    /// Creates a mask by sampling `opaque` for every pixel coordinate.
    #[must_use]
    pub fn from_fn<F>(width: u32, height: u32, mut opaque: F) -> Self
    where
        F: FnMut(u32, u32) -> bool,
    {
        let mut bits = Vec::with_capacity(area(width, height));
        for y in 0..height {
            for x in 0..width {
                bits.push(opaque(x, y));
            }
        }
        Self {
            width,
            height,
            bits,
        }
    }

    /// Derives a mask from tightly packed RGBA8 pixels.
    ///
    /// A pixel is opaque when its alpha channel exceeds [`ALPHA_THRESHOLD`].
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> Result<Self, MaskError> {
        let expected = area(width, height).saturating_mul(4);
        if rgba.len() != expected {
            return Err(MaskError::DimensionMismatch {
                width,
                height,
                expected,
                actual: rgba.len(),
            });
        }

        let bits = rgba
            .chunks_exact(4)
            .map(|pixel| pixel[3] > ALPHA_THRESHOLD)
            .collect();
        Ok(Self {
            width,
            height,
            bits,
        })
    }

    /// Width of the mask in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the mask in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether the pixel at the provided mask-local coordinate is opaque.
    ///
    /// Coordinates outside the mask are never opaque.
    #[must_use]
    pub fn is_opaque(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return false;
        }
        let index = y as usize * self.width as usize + x as usize;
        self.bits.get(index).copied().unwrap_or(false)
    }

    /// Number of opaque pixels contained in the mask.
    #[must_use]
    pub fn opaque_count(&self) -> usize {
        self.bits.iter().filter(|bit| **bit).count()
    }
}

impl std::fmt::Debug for CollisionMask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollisionMask")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("opaque", &self.opaque_count())
            .finish()
    }
}

/// Mask anchored at a screen-space position (the sprite's top-left corner).
#[derive(Clone, Copy, Debug)]
pub struct PositionedMask<'a> {
    mask: &'a CollisionMask,
    origin: PixelPoint,
}

impl<'a> PositionedMask<'a> {
    /// Anchors `mask` with its top-left corner at `origin`.
    #[must_use]
    pub const fn new(mask: &'a CollisionMask, origin: PixelPoint) -> Self {
        Self { mask, origin }
    }

    /// Mask being positioned.
    #[must_use]
    pub const fn mask(&self) -> &'a CollisionMask {
        self.mask
    }

    /// Screen-space position of the mask's top-left corner.
    #[must_use]
    pub const fn origin(&self) -> PixelPoint {
        self.origin
    }
}

/// Reports whether two positioned masks share at least one opaque pixel.
///
/// Mask `b` is translated by `(b.x - a.x, b.y - a.y)` over mask `a` and the
/// intersection is scanned row by row, returning on the first shared pixel.
#[must_use]
pub fn overlaps(a: PositionedMask<'_>, b: PositionedMask<'_>) -> bool {
    let offset_x = i64::from(b.origin.x()) - i64::from(a.origin.x());
    let offset_y = i64::from(b.origin.y()) - i64::from(a.origin.y());

    let left = offset_x.max(0);
    let top = offset_y.max(0);
    let right = (offset_x + i64::from(b.mask.width)).min(i64::from(a.mask.width));
    let bottom = (offset_y + i64::from(b.mask.height)).min(i64::from(a.mask.height));

    if left >= right || top >= bottom {
        return false;
    }

    (top..bottom).any(|y| {
        (left..right)
            .any(|x| a.mask.is_opaque(x, y) && b.mask.is_opaque(x - offset_x, y - offset_y))
    })
}

/// Errors raised while deriving masks from pixel data.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MaskError {
    /// Pixel buffer length disagrees with the declared dimensions.
    #[error("expected {expected} RGBA bytes for a {width}x{height} mask, received {actual}")]
    DimensionMismatch {
        /// Declared mask width.
        width: u32,
        /// Declared mask height.
        height: u32,
        /// Byte count implied by the dimensions.
        expected: usize,
        /// Byte count actually supplied.
        actual: usize,
    },
}

fn area(width: u32, height: u32) -> usize {
    usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(usize::MAX)
}
