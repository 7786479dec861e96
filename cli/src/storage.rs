//! JSON-file persistence for the best score and the running game.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use snake_2048_core::{GameSnapshot, Storage};
use tracing::warn;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredData {
    best_score: u32,
    game_state: Option<GameSnapshot>,
}

/// Keeps state in memory and, when a path is set, writes it through to a
/// JSON file after every change.
#[derive(Debug, Default)]
pub struct FileStorage {
    path: Option<PathBuf>,
    data: StoredData,
}

impl FileStorage {
    /// Storage that never touches the disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load `path` if it exists; a missing file starts empty.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let data = if path.exists() {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading state file {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing state file {}", path.display()))?
        } else {
            StoredData::default()
        };
        Ok(FileStorage {
            path: Some(path.to_path_buf()),
            data,
        })
    }

    fn persist(&self) {
        let Some(path) = &self.path else { return };
        let result = serde_json::to_string_pretty(&self.data)
            .context("encoding state")
            .and_then(|text| {
                fs::write(path, text).with_context(|| format!("writing {}", path.display()))
            });
        if let Err(err) = result {
            warn!("could not save game state: {:#}", err);
        }
    }
}

impl Storage for FileStorage {
    fn best_score(&self) -> u32 {
        self.data.best_score
    }

    fn set_best_score(&mut self, score: u32) {
        self.data.best_score = score;
        self.persist();
    }

    fn game_state(&self) -> Option<GameSnapshot> {
        self.data.game_state.clone()
    }

    fn set_game_state(&mut self, state: &GameSnapshot) {
        self.data.game_state = Some(state.clone());
        self.persist();
    }

    fn clear_game_state(&mut self) {
        self.data.game_state = None;
        self.persist();
    }
}
