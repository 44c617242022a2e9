use std::{
    collections::HashMap,
    fmt, fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{bail, ensure, Context, Result};
use image::ImageFormat;
use serde::Deserialize;
use space_shooter_core::{CollisionMask, EnemyColor, SpriteMasks};
use space_shooter_rendering::SpriteKey;

const SUPPORTED_MANIFEST_VERSION: u32 = 1;
const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
/// Every sprite the manifest must declare, in draw-table order.
pub const ALL_SPRITE_KEYS: [SpriteKey; 9] = [
    SpriteKey::Background,
    SpriteKey::PlayerShip,
    SpriteKey::PlayerLaser,
    SpriteKey::EnemyShip(EnemyColor::Red),
    SpriteKey::EnemyShip(EnemyColor::Blue),
    SpriteKey::EnemyShip(EnemyColor::Green),
    SpriteKey::EnemyLaser(EnemyColor::Red),
    SpriteKey::EnemyLaser(EnemyColor::Blue),
    SpriteKey::EnemyLaser(EnemyColor::Green),
];

/// Tightly packed RGBA8 pixels of a sprite scaled to its on-screen size.
#[derive(Clone, PartialEq, Eq)]
pub struct SpriteImage {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl SpriteImage {
    /// Wraps raw RGBA8 pixels, validating the buffer length.
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self> {
        let expected = u64::from(width) * u64::from(height) * 4;
        ensure!(
            rgba.len() as u64 == expected,
            "expected {expected} RGBA bytes for a {width}x{height} sprite, received {}",
            rgba.len()
        );
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 pixels in row-major order.
    #[must_use]
    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    /// Resamples the image to the requested size with nearest-neighbour sampling.
    #[must_use]
    pub fn scaled(&self, width: u32, height: u32) -> Self {
        if width == self.width && height == self.height {
            return self.clone();
        }

        let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            let source_y = nearest(y, height, self.height);
            for x in 0..width {
                let source_x = nearest(x, width, self.width);
                let offset = (source_y as usize * self.width as usize + source_x as usize) * 4;
                match self.rgba.get(offset..offset + 4) {
                    Some(pixel) => rgba.extend_from_slice(pixel),
                    None => rgba.extend_from_slice(&[0; 4]),
                }
            }
        }
        Self {
            width,
            height,
            rgba,
        }
    }

    fn collision_mask(&self) -> Result<CollisionMask> {
        CollisionMask::from_rgba(self.width, self.height, &self.rgba)
            .context("failed to derive collision mask")
    }
}

impl fmt::Debug for SpriteImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpriteImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

fn nearest(target: u32, target_len: u32, source_len: u32) -> u32 {
    if target_len == 0 || source_len == 0 {
        return 0;
    }
    let scaled = u64::from(target) * u64::from(source_len) / u64::from(target_len);
    (scaled as u32).min(source_len - 1)
}

/// Audio files referenced by the manifest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SoundPaths {
    /// Looping background music.
    pub background: PathBuf,
    /// Played whenever the player fires.
    pub laser: PathBuf,
    /// Played whenever an enemy is destroyed.
    pub explosion: PathBuf,
}

/// Sprite artwork, the collision masks derived from it, and the sound assets.
///
/// A sheet without images draws every element as a primitive shape whose
/// outline matches its mask.
#[derive(Debug)]
pub struct SpriteSheet {
    images: HashMap<SpriteKey, SpriteImage>,
    masks: SpriteMasks,
    sounds: Option<SoundPaths>,
}

impl SpriteSheet {
    /// Returns the default manifest path relative to the working directory.
    #[must_use]
    pub fn default_manifest_path() -> PathBuf {
        PathBuf::from("assets/manifest.toml")
    }

    /// Loads every sprite and checks every sound listed by the manifest.
    ///
    /// Any missing or unreadable asset is reported as an error.
    pub fn from_manifest_path(path: impl AsRef<Path>) -> Result<Self> {
        let manifest_path = path.as_ref();
        let contents = fs::read_to_string(manifest_path).with_context(|| {
            format!(
                "failed to read asset manifest at {}",
                manifest_path.display()
            )
        })?;
        let base = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let manifest = parse_manifest(&contents, &base)?;

        for path in [
            &manifest.sounds.background,
            &manifest.sounds.laser,
            &manifest.sounds.explosion,
        ] {
            let _ = fs::metadata(path)
                .with_context(|| format!("sound asset missing at {}", path.display()))?;
        }

        Self::from_manifest(manifest, &mut decode_png)
    }

    /// Sheet without artwork; masks follow the primitive shapes drawn instead.
    #[must_use]
    pub fn primitive() -> Self {
        let (ship_w, ship_h) = SpriteMasks::PLAYER_SHIP_SIZE;
        let (enemy_w, enemy_h) = SpriteMasks::ENEMY_SHIP_SIZE;
        let (laser_w, laser_h) = SpriteMasks::LASER_SIZE;

        let enemy_ship = Arc::new(triangle_mask(enemy_w, enemy_h, Facing::Down));
        let laser = Arc::new(CollisionMask::filled(laser_w, laser_h));
        let masks = SpriteMasks {
            player_ship: Arc::new(triangle_mask(ship_w, ship_h, Facing::Up)),
            player_laser: Arc::clone(&laser),
            enemy_ships: [
                Arc::clone(&enemy_ship),
                Arc::clone(&enemy_ship),
                enemy_ship,
            ],
            enemy_lasers: [Arc::clone(&laser), Arc::clone(&laser), laser],
        };

        Self {
            images: HashMap::new(),
            masks,
            sounds: None,
        }
    }

    /// Collision masks derived from the sheet, ready for the world.
    #[must_use]
    pub fn masks(&self) -> SpriteMasks {
        self.masks.clone()
    }

    /// Reports whether the sheet carries artwork rather than primitives.
    #[must_use]
    pub fn has_images(&self) -> bool {
        !self.images.is_empty()
    }

    /// Retrieves the scaled artwork for the provided key.
    #[must_use]
    pub fn image(&self, key: SpriteKey) -> Option<&SpriteImage> {
        self.images.get(&key)
    }

    /// Sound assets referenced by the manifest, if any were loaded.
    #[must_use]
    pub fn sounds(&self) -> Option<&SoundPaths> {
        self.sounds.as_ref()
    }

    fn from_manifest(
        manifest: ParsedManifest,
        loader: &mut impl FnMut(SpriteKey, &Path) -> Result<SpriteImage>,
    ) -> Result<Self> {
        let mut images = HashMap::with_capacity(manifest.sprites.len());
        for entry in manifest.sprites {
            let image = loader(entry.key, &entry.path).with_context(|| {
                format!(
                    "failed to load sprite {:?} from {}",
                    entry.key,
                    entry.path.display()
                )
            })?;
            let scaled = image.scaled(entry.width, entry.height);
            if images.insert(entry.key, scaled).is_some() {
                bail!("duplicate sprite entry for {:?}", entry.key);
            }
        }

        let mask = |key: SpriteKey| -> Result<Arc<CollisionMask>> {
            let image = images
                .get(&key)
                .with_context(|| format!("sprite {key:?} missing from sheet"))?;
            let mask = image
                .collision_mask()
                .with_context(|| format!("sprite {key:?} has an invalid pixel buffer"))?;
            Ok(Arc::new(mask))
        };
        let masks = SpriteMasks {
            player_ship: mask(SpriteKey::PlayerShip)?,
            player_laser: mask(SpriteKey::PlayerLaser)?,
            enemy_ships: [
                mask(SpriteKey::EnemyShip(EnemyColor::Red))?,
                mask(SpriteKey::EnemyShip(EnemyColor::Blue))?,
                mask(SpriteKey::EnemyShip(EnemyColor::Green))?,
            ],
            enemy_lasers: [
                mask(SpriteKey::EnemyLaser(EnemyColor::Red))?,
                mask(SpriteKey::EnemyLaser(EnemyColor::Blue))?,
                mask(SpriteKey::EnemyLaser(EnemyColor::Green))?,
            ],
        };

        Ok(Self {
            images,
            masks,
            sounds: Some(manifest.sounds),
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Facing {
    Up,
    Down,
}

/// Isosceles triangle spanning the full box, apex toward `facing`.
pub(crate) fn triangle_mask(width: u32, height: u32, facing: Facing) -> CollisionMask {
    CollisionMask::from_fn(width, height, |x, y| {
        let depth = match facing {
            Facing::Up => y as f32 + 0.5,
            Facing::Down => height as f32 - y as f32 - 0.5,
        };
        let half_span = depth / height as f32 * width as f32 / 2.0;
        (x as f32 + 0.5 - width as f32 / 2.0).abs() <= half_span
    })
}

fn decode_png(_key: SpriteKey, path: &Path) -> Result<SpriteImage> {
    let bytes = fs::read(path)
        .with_context(|| format!("failed to read sprite asset at {}", path.display()))?;
    ensure!(
        bytes.starts_with(&PNG_SIGNATURE),
        "sprite asset at {} is not a PNG image",
        path.display()
    );
    let image = image::load_from_memory_with_format(&bytes, ImageFormat::Png)
        .with_context(|| format!("failed to decode sprite asset at {}", path.display()))?
        .to_rgba8();
    let (width, height) = image.dimensions();
    SpriteImage::from_rgba(width, height, image.into_raw())
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    version: u32,
    sprites: HashMap<String, SpriteEntry>,
    sounds: SoundEntries,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SpriteEntry {
    path: String,
    width: u32,
    height: u32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SoundEntries {
    background: String,
    laser: String,
    explosion: String,
}

#[derive(Debug, PartialEq, Eq)]
struct ResolvedSprite {
    key: SpriteKey,
    path: PathBuf,
    width: u32,
    height: u32,
}

#[derive(Debug, PartialEq, Eq)]
struct ParsedManifest {
    sprites: Vec<ResolvedSprite>,
    sounds: SoundPaths,
}

fn parse_manifest(contents: &str, base_path: &Path) -> Result<ParsedManifest> {
    let manifest: Manifest =
        toml::from_str(contents).context("failed to parse asset manifest toml contents")?;
    if manifest.version != SUPPORTED_MANIFEST_VERSION {
        bail!(
            "unsupported asset manifest version {}; expected {}",
            manifest.version,
            SUPPORTED_MANIFEST_VERSION
        );
    }

    let mut resolved = HashMap::new();
    for (name, entry) in manifest.sprites {
        let key = parse_sprite_key(&name)
            .with_context(|| format!("unknown sprite key `{name}` in manifest"))?;
        if entry.width == 0 || entry.height == 0 {
            bail!("sprite `{name}` must have positive dimensions");
        }
        let _ = resolved.insert(key, entry);
    }

    let mut sprites = Vec::with_capacity(ALL_SPRITE_KEYS.len());
    for key in ALL_SPRITE_KEYS {
        let Some(entry) = resolved.remove(&key) else {
            bail!("asset manifest missing entry for {key:?}");
        };
        sprites.push(ResolvedSprite {
            key,
            path: base_path.join(entry.path),
            width: entry.width,
            height: entry.height,
        });
    }

    Ok(ParsedManifest {
        sprites,
        sounds: SoundPaths {
            background: base_path.join(manifest.sounds.background),
            laser: base_path.join(manifest.sounds.laser),
            explosion: base_path.join(manifest.sounds.explosion),
        },
    })
}

fn parse_sprite_key(name: &str) -> Result<SpriteKey> {
    let key = match name {
        "background" => SpriteKey::Background,
        "player_ship" => SpriteKey::PlayerShip,
        "player_laser" => SpriteKey::PlayerLaser,
        "enemy_ship_red" => SpriteKey::EnemyShip(EnemyColor::Red),
        "enemy_ship_blue" => SpriteKey::EnemyShip(EnemyColor::Blue),
        "enemy_ship_green" => SpriteKey::EnemyShip(EnemyColor::Green),
        "enemy_laser_red" => SpriteKey::EnemyLaser(EnemyColor::Red),
        "enemy_laser_blue" => SpriteKey::EnemyLaser(EnemyColor::Blue),
        "enemy_laser_green" => SpriteKey::EnemyLaser(EnemyColor::Green),
        _ => bail!("unknown sprite key `{name}`"),
    };
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    const FULL_MANIFEST: &str = r#"
        version = 1

        [sprites]
        background = { path = "background.png", width = 800, height = 600 }
        player_ship = { path = "player_ship.png", width = 50, height = 50 }
        player_laser = { path = "laser_player.png", width = 5, height = 20 }
        enemy_ship_red = { path = "enemy_ship.png", width = 40, height = 40 }
        enemy_ship_blue = { path = "enemy_ship.png", width = 40, height = 40 }
        enemy_ship_green = { path = "enemy_ship.png", width = 40, height = 40 }
        enemy_laser_red = { path = "laser_enemy.png", width = 5, height = 20 }
        enemy_laser_blue = { path = "laser_enemy.png", width = 5, height = 20 }
        enemy_laser_green = { path = "laser_enemy.png", width = 5, height = 20 }

        [sounds]
        background = "background.wav"
        laser = "laser.wav"
        explosion = "explosion.wav"
    "#;

    fn opaque(width: u32, height: u32) -> SpriteImage {
        SpriteImage::from_rgba(width, height, vec![255; (width * height * 4) as usize])
            .expect("valid buffer")
    }

    #[test]
    fn manifest_resolves_paths_relative_to_base_directory() {
        let parsed = parse_manifest(FULL_MANIFEST, Path::new("root")).expect("manifest parses");

        let keys: Vec<SpriteKey> = parsed.sprites.iter().map(|entry| entry.key).collect();
        assert_eq!(keys, ALL_SPRITE_KEYS);
        assert_eq!(parsed.sprites[1].path, PathBuf::from("root/player_ship.png"));
        assert_eq!((parsed.sprites[1].width, parsed.sprites[1].height), (50, 50));
        assert_eq!(parsed.sounds.laser, PathBuf::from("root/laser.wav"));
    }

    #[test]
    fn manifest_requires_every_sprite() {
        let manifest = FULL_MANIFEST.replace(
            "enemy_laser_green = { path = \"laser_enemy.png\", width = 5, height = 20 }",
            "",
        );
        let error = parse_manifest(&manifest, Path::new("assets")).expect_err("missing key");
        assert!(error.to_string().contains("EnemyLaser(Green)"));
    }

    #[test]
    fn manifest_rejects_unknown_keys() {
        let manifest = FULL_MANIFEST.replace(
            "[sounds]",
            "boss = { path = \"boss.png\", width = 80, height = 80 }\n\n[sounds]",
        );
        assert!(parse_manifest(&manifest, Path::new("assets")).is_err());
    }

    #[test]
    fn manifest_rejects_unsupported_version() {
        let manifest = FULL_MANIFEST.replace("version = 1", "version = 2");
        let error = parse_manifest(&manifest, Path::new("assets")).expect_err("bad version");
        assert!(error.to_string().contains("unsupported asset manifest version 2"));
    }

    #[test]
    fn manifest_rejects_zero_sized_sprites() {
        let manifest = FULL_MANIFEST.replace("width = 50, height = 50", "width = 0, height = 50");
        assert!(parse_manifest(&manifest, Path::new("assets")).is_err());
    }

    #[test]
    fn sheet_scales_images_and_derives_masks_in_manifest_order() {
        let manifest = parse_manifest(FULL_MANIFEST, Path::new("assets")).expect("parses");
        let load_order = RefCell::new(Vec::new());
        let sheet = SpriteSheet::from_manifest(manifest, &mut |key, _| {
            load_order.borrow_mut().push(key);
            Ok(opaque(3, 3))
        })
        .expect("sheet loads");

        assert_eq!(load_order.borrow().as_slice(), &ALL_SPRITE_KEYS);
        assert!(sheet.has_images());
        let background = sheet.image(SpriteKey::Background).expect("background");
        assert_eq!((background.width(), background.height()), (800, 600));

        let masks = sheet.masks();
        assert_eq!(masks.player_ship.width(), 50);
        assert_eq!(masks.player_ship.opaque_count(), 2500);
        assert_eq!(masks.enemy_laser(EnemyColor::Blue).height(), 20);
        assert!(sheet.sounds().is_some());
    }

    #[test]
    fn loader_failures_carry_the_sprite_key() {
        let manifest = parse_manifest(FULL_MANIFEST, Path::new("assets")).expect("parses");
        let error = SpriteSheet::from_manifest(manifest, &mut |key, _| {
            if key == SpriteKey::PlayerLaser {
                bail!("corrupt");
            }
            Ok(opaque(1, 1))
        })
        .expect_err("loader failure propagates");
        assert!(format!("{error:#}").contains("PlayerLaser"));
    }

    #[test]
    fn missing_manifest_is_reported() {
        let error = SpriteSheet::from_manifest_path("does/not/exist.toml").expect_err("missing");
        assert!(error.to_string().contains("does/not/exist.toml"));
    }

    #[test]
    fn missing_sound_assets_are_fatal() {
        let dir = tempfile::tempdir().expect("temp dir");
        let manifest = dir.path().join("manifest.toml");
        fs::write(&manifest, FULL_MANIFEST).expect("write manifest");

        let error = SpriteSheet::from_manifest_path(&manifest).expect_err("sounds missing");
        assert!(error.to_string().contains("background.wav"));
    }

    #[test]
    fn non_png_sprites_are_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let manifest = dir.path().join("manifest.toml");
        fs::write(&manifest, FULL_MANIFEST).expect("write manifest");
        for sound in ["background.wav", "laser.wav", "explosion.wav"] {
            fs::write(dir.path().join(sound), b"RIFF").expect("write sound");
        }
        for sprite in [
            "background.png",
            "player_ship.png",
            "laser_player.png",
            "enemy_ship.png",
            "laser_enemy.png",
        ] {
            fs::write(dir.path().join(sprite), b"not a png").expect("write sprite");
        }

        let error = SpriteSheet::from_manifest_path(&manifest).expect_err("invalid images");
        let message = format!("{error:#}");
        assert!(message.contains("Background"), "{message}");
        assert!(message.contains("not a PNG image"), "{message}");
    }

    const RED_PIXEL_PNG: [u8; 70] = [
        0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f,
        0x15, 0xc4, 0x89, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9c, 0x63, 0xf8,
        0xcf, 0xc0, 0xf0, 0x1f, 0x00, 0x05, 0x00, 0x01, 0xff, 0x89, 0x99, 0x3d, 0x1d, 0x00, 0x00,
        0x00, 0x00, 0x49, 0x45, 0x4e, 0x44, 0xae, 0x42, 0x60, 0x82,
    ];

    fn asset_dir(sprite_bytes: &[u8]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(dir.path().join("manifest.toml"), FULL_MANIFEST).expect("write manifest");
        for sound in ["background.wav", "laser.wav", "explosion.wav"] {
            fs::write(dir.path().join(sound), b"RIFF").expect("write sound");
        }
        for sprite in [
            "background.png",
            "player_ship.png",
            "laser_player.png",
            "enemy_ship.png",
            "laser_enemy.png",
        ] {
            fs::write(dir.path().join(sprite), sprite_bytes).expect("write sprite");
        }
        dir
    }

    #[test]
    fn png_pixels_are_decoded_as_rgba() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("pixel.png");
        fs::write(&path, RED_PIXEL_PNG).expect("write sprite");

        let image = decode_png(SpriteKey::PlayerShip, &path).expect("valid png");
        assert_eq!((image.width(), image.height()), (1, 1));
        assert_eq!(image.rgba(), &[255, 0, 0, 255]);
    }

    #[test]
    fn valid_assets_build_a_scaled_sheet() {
        let dir = asset_dir(&RED_PIXEL_PNG);
        let sheet =
            SpriteSheet::from_manifest_path(dir.path().join("manifest.toml")).expect("sheet loads");

        let ship = sheet.image(SpriteKey::PlayerShip).expect("player ship");
        assert_eq!((ship.width(), ship.height()), (50, 50));
        assert_eq!(sheet.masks().player_ship.opaque_count(), 2500);
    }

    #[test]
    fn truncated_png_is_an_error() {
        let mut truncated = PNG_SIGNATURE.to_vec();
        truncated.extend_from_slice(b"\0\0\0\rIHDR");
        let dir = asset_dir(&truncated);

        let error = SpriteSheet::from_manifest_path(dir.path().join("manifest.toml"))
            .expect_err("truncated images");
        let message = format!("{error:#}");
        assert!(message.contains("failed to decode sprite asset"), "{message}");
        assert!(message.contains("background.png"), "{message}");
    }

    #[test]
    fn nearest_neighbour_scaling_repeats_source_pixels() {
        let source = SpriteImage::from_rgba(
            2,
            1,
            vec![
                255, 0, 0, 255, //
                0, 0, 255, 0,
            ],
        )
        .expect("valid buffer");

        let scaled = source.scaled(4, 2);

        assert_eq!((scaled.width(), scaled.height()), (4, 2));
        let alphas: Vec<u8> = scaled.rgba().chunks_exact(4).map(|pixel| pixel[3]).collect();
        assert_eq!(alphas, vec![255, 255, 0, 0, 255, 255, 0, 0]);
    }

    #[test]
    fn sprite_image_rejects_short_buffers() {
        assert!(SpriteImage::from_rgba(2, 2, vec![0; 15]).is_err());
    }

    #[test]
    fn primitive_sheet_masks_follow_triangles() {
        let sheet = SpriteSheet::primitive();
        let masks = sheet.masks();

        assert!(!sheet.has_images());
        assert!(sheet.sounds().is_none());
        assert_eq!(masks.player_ship.width(), 50);
        assert!(masks.player_ship.is_opaque(25, 49), "base is solid");
        assert!(!masks.player_ship.is_opaque(0, 0), "corner beside apex is empty");
        assert!(masks.enemy_ship(EnemyColor::Red).is_opaque(20, 0));
        assert!(!masks.enemy_ship(EnemyColor::Red).is_opaque(0, 39));
        assert_eq!(masks.player_laser.opaque_count(), 100);
    }
}
