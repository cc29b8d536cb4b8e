use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::audio_api::AudioEngine;
use crate::pipeline::PadGrid;
use crate::shared::{NUM_SLOTS, PadId};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub loaded: usize,
    pub failed: Vec<PathBuf>,
    pub ignored: usize, // files beyond the last slot
}

// All .wav files directly inside `dir`, sorted by file name
pub fn index_wav_in_dir(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).with_context(|| format!("cannot list {}", dir.display()))?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_wav = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"));
        if is_wav && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Load `paths` into the grid row by row. A file that fails to load leaves
/// its pad unloaded; the rest carry on.
pub fn load_into_grid(paths: &[PathBuf], grid: &PadGrid, engine: &dyn AudioEngine) -> LoadSummary {
    let mut summary = LoadSummary {
        ignored: paths.len().saturating_sub(NUM_SLOTS),
        ..Default::default()
    };

    for (slot, path) in paths.iter().take(NUM_SLOTS).enumerate() {
        let Some(pad) = PadId::from_slot(slot) else { break };
        match engine.load_sample(path) {
            Ok(handle) => {
                grid.assign_sample(pad, path.clone(), handle);
                summary.loaded += 1;
            }
            Err(err) => {
                log::warn!("{err}");
                grid.clear_slot(pad);
                summary.failed.push(path.clone());
            }
        }
    }

    if summary.ignored > 0 {
        log::warn!("only {NUM_SLOTS} pads available, ignoring {} files", summary.ignored);
    }
    summary
}
