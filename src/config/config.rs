use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;

/// Persistent defaults for the merge engine, loaded from the user's
/// config.toml when present. Command-line flags always win over these.
#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub merge: MergeDefaults,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MergeDefaults {
    #[serde(default = "default_min_overlap")]
    pub min_overlap: usize,
    #[serde(default = "default_match_score")]
    pub match_score: i32,
    #[serde(default = "default_mismatch_score")]
    pub mismatch_score: i32,
    #[serde(default = "default_gap_score")]
    pub gap_score: i32,
    #[serde(default = "default_min_score")]
    pub min_score: i32,
    #[serde(default = "default_min_identity")]
    pub min_identity: f64,
    #[serde(default)]
    pub join_gap: usize,
    #[serde(default = "default_trim_window")]
    pub trim_window: usize,
    #[serde(default = "default_trim_threshold")]
    pub trim_threshold: u8,
    #[serde(default = "default_trim")]
    pub trim: bool,
}

fn default_min_overlap() -> usize {
    20
}

fn default_match_score() -> i32 {
    10
}

fn default_mismatch_score() -> i32 {
    -8
}

fn default_gap_score() -> i32 {
    -10
}

fn default_min_score() -> i32 {
    80
}

fn default_min_identity() -> f64 {
    85.0
}

fn default_trim_window() -> usize {
    4
}

fn default_trim_threshold() -> u8 {
    22
}

fn default_trim() -> bool {
    true
}

impl Default for MergeDefaults {
    fn default() -> Self {
        Self {
            min_overlap: default_min_overlap(),
            match_score: default_match_score(),
            mismatch_score: default_mismatch_score(),
            gap_score: default_gap_score(),
            min_score: default_min_score(),
            min_identity: default_min_identity(),
            join_gap: 0,
            trim_window: default_trim_window(),
            trim_threshold: default_trim_threshold(),
            trim: default_trim(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            merge: MergeDefaults::default(),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("io", "sangertools", "sanger-tools") {
            let config_dir = proj_dirs.config_dir();
            let config_path = config_dir.join("config.toml");

            if config_path.exists() {
                if let Ok(content) = fs::read_to_string(config_path) {
                    if let Ok(config) = toml::from_str(&content) {
                        return config;
                    }
                }
            }
        }
        Config::default()
    }

    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(proj_dirs) = ProjectDirs::from("io", "sangertools", "sanger-tools") {
            let config_dir = proj_dirs.config_dir();
            fs::create_dir_all(config_dir)?;

            let config_path = config_dir.join("config.toml");
            let content = toml::to_string_pretty(self)?;
            fs::write(config_path, content)?;
        }
        Ok(())
    }
}
