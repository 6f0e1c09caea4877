use quizboard_game::{Board, BoardLoader, LoadError};
use std::fs;
use std::path::{Path, PathBuf};

const BUNDLED_BOARD: &str = include_str!("../assets/sample_board.json");

/// Reads a board document from disk, or the bundled sample when no path is
/// given.
#[derive(Debug, Clone, Default)]
pub struct FileBoardLoader {
    path: Option<PathBuf>,
}

impl FileBoardLoader {
    #[must_use]
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Label used in console output.
    #[must_use]
    pub fn describe(&self) -> String {
        self.path()
            .map_or_else(|| "bundled sample board".to_string(), |p| p.display().to_string())
    }
}

impl BoardLoader for FileBoardLoader {
    fn load_board(&self) -> Result<Board, LoadError> {
        match &self.path {
            Some(path) => {
                log::debug!("reading board from {}", path.display());
                let json = fs::read_to_string(path)?;
                Board::from_json(&json)
            }
            None => Board::from_json(BUNDLED_BOARD),
        }
    }
}
