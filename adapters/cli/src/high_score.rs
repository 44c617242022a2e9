use std::{
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;

/// Persistence for the best score across runs.
pub(crate) trait HighScoreStore {
    /// Reads the stored high score. Missing or unreadable values count as zero.
    fn load(&self) -> u32;

    /// Replaces the stored high score.
    fn save(&mut self, high_score: u32) -> Result<(), HighScoreError>;
}

/// Stores the high score as a single decimal integer in a text file.
#[derive(Clone, Debug)]
pub(crate) struct FileHighScoreStore {
    path: PathBuf,
}

impl FileHighScoreStore {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl HighScoreStore for FileHighScoreStore {
    fn load(&self) -> u32 {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(error) => {
                tracing::debug!(path = %self.path.display(), %error, "no stored high score");
                return 0;
            }
        };
        match contents.trim().parse() {
            Ok(high_score) => high_score,
            Err(error) => {
                tracing::debug!(path = %self.path.display(), %error, "ignoring unparseable high score");
                0
            }
        }
    }

    fn save(&mut self, high_score: u32) -> Result<(), HighScoreError> {
        fs::write(&self.path, high_score.to_string()).map_err(|source| HighScoreError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

/// Errors raised while persisting the high score.
#[derive(Debug, Error)]
pub(crate) enum HighScoreError {
    /// The file could not be written.
    #[error("failed to write high score to {}", .path.display())]
    Write {
        /// File that was being written.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
}
