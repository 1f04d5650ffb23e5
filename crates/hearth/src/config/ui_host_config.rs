use std::{env::consts::EXE_SUFFIX, path::{Path, PathBuf}};

use serde::{Deserialize, Serialize};

/// Where to find the UI host and how to start it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiHostConfig {
    /// Candidate executables, probed in order. Relative paths resolve
    /// against the directory of the running executable.
    #[serde(default = "default_candidates")]
    pub candidates: Vec<PathBuf>,
    /// Extra arguments passed to the UI host.
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for UiHostConfig {
    fn default() -> Self {
        Self {
            candidates: default_candidates(),
            args: Vec::new(),
        }
    }
}

impl UiHostConfig {
    /// Candidates with relative entries resolved against `base`.
    pub fn resolved_candidates(&self, base: &Path) -> Vec<PathBuf> {
        self.candidates
            .iter()
            .map(|candidate| {
                if candidate.is_absolute() {
                    candidate.clone()
                } else {
                    base.join(candidate)
                }
            })
            .collect()
    }
}

fn default_candidates() -> Vec<PathBuf> {
    vec![
        PathBuf::from(format!("hearth-ui{EXE_SUFFIX}")),
        PathBuf::from("ui").join(format!("hearth-ui{EXE_SUFFIX}")),
    ]
}
