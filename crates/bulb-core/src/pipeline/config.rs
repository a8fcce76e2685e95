use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Settings for one long-exposure run, loadable from TOML.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExposureConfig {
    /// Video capture to read: a SER file or a directory of still frames.
    pub input: PathBuf,
    /// Image to write; the extension picks the format (png or tiff).
    pub output: PathBuf,
    /// Keep every `step`-th frame; 1 keeps them all.
    #[serde(default = "default_step")]
    pub step: usize,
}

fn default_step() -> usize {
    1
}
