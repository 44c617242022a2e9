//! Sound playback. Real output requires the `audio` feature; otherwise every
//! cue is traced and dropped.

use anyhow::Result;
use space_shooter_rendering::SoundCue;

use crate::sprites::SoundPaths;

#[cfg(feature = "audio")]
mod backend {
    use anyhow::{Context, Result};
    use macroquad::audio::{self, PlaySoundParams, Sound};

    use super::{SoundCue, SoundPaths};

    #[derive(Debug)]
    pub(crate) struct AudioBank {
        background: Sound,
        laser: Sound,
        explosion: Sound,
    }

    impl AudioBank {
        pub(crate) async fn load(paths: &SoundPaths) -> Result<Self> {
            Ok(Self {
                background: load(&paths.background).await?,
                laser: load(&paths.laser).await?,
                explosion: load(&paths.explosion).await?,
            })
        }

        pub(crate) fn start_music(&self) {
            audio::play_sound(
                self.background,
                PlaySoundParams {
                    looped: true,
                    volume: 1.0,
                },
            );
        }

        pub(crate) fn play(&self, cue: SoundCue) {
            let sound = match cue {
                SoundCue::Laser => self.laser,
                SoundCue::Explosion => self.explosion,
            };
            audio::play_sound_once(sound);
        }
    }

    async fn load(path: &std::path::Path) -> Result<Sound> {
        let display = path.display().to_string();
        audio::load_sound(&display)
            .await
            .map_err(|error| anyhow::anyhow!("{error:?}"))
            .with_context(|| format!("failed to load sound asset at {display}"))
    }
}

#[cfg(not(feature = "audio"))]
mod backend {
    use anyhow::Result;

    use super::{SoundCue, SoundPaths};

    #[derive(Debug)]
    pub(crate) struct AudioBank;

    impl AudioBank {
        pub(crate) async fn load(paths: &SoundPaths) -> Result<Self> {
            tracing::debug!(
                background = %paths.background.display(),
                "audio feature disabled; sound assets will not be played"
            );
            Ok(Self)
        }

        pub(crate) fn start_music(&self) {
            tracing::trace!("background music requested");
        }

        pub(crate) fn play(&self, cue: SoundCue) {
            tracing::trace!(?cue, "sound cue dropped");
        }
    }
}

/// Plays queued sound cues when sound assets are available.
#[derive(Debug, Default)]
pub(crate) struct Mixer {
    bank: Option<backend::AudioBank>,
}

impl Mixer {
    pub(crate) async fn load(paths: Option<&SoundPaths>) -> Result<Self> {
        let bank = match paths {
            Some(paths) => Some(backend::AudioBank::load(paths).await?),
            None => None,
        };
        if let Some(bank) = &bank {
            bank.start_music();
        }
        Ok(Self { bank })
    }

    /// Plays and removes every queued cue.
    pub(crate) fn drain(&self, cues: &mut Vec<SoundCue>) {
        for cue in cues.drain(..) {
            match &self.bank {
                Some(bank) => bank.play(cue),
                None => tracing::trace!(?cue, "no sound assets loaded"),
            }
        }
    }
}
