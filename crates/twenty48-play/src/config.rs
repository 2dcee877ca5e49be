use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};

/// Front-end configuration, loaded from TOML. Every key is optional.
///
/// ```toml
/// seed = 7
///
/// [board]
/// rows = 4
/// columns = 4
/// initial_tiles = 2
///
/// [input]
/// swipe_max_time_ms = 1000
/// swipe_min_distance = 20.0
/// swipe_min_normal = 0.85
/// ```
#[derive(Clone, Debug, PartialEq, serde::Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub board: BoardConfig,
    #[serde(default)]
    pub input: InputConfig,
    /// Seed for tile spawning. If None, the spawn source is seeded from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct BoardConfig {
    #[serde(default = "defaults::rows")]
    pub rows: usize,
    #[serde(default = "defaults::columns")]
    pub columns: usize,
    /// Tiles spawned when a game starts.
    #[serde(default = "defaults::initial_tiles")]
    pub initial_tiles: usize,
}

/// Swipe gesture thresholds.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct InputConfig {
    /// Gestures lasting this long or longer are ignored.
    #[serde(default = "defaults::swipe_max_time_ms")]
    pub swipe_max_time_ms: u64,
    /// Minimum travel distance, in pixels.
    #[serde(default = "defaults::swipe_min_distance")]
    pub swipe_min_distance: f64,
    /// A normalised component must exceed this to pick an axis; in (0, 1].
    #[serde(default = "defaults::swipe_min_normal")]
    pub swipe_min_normal: f64,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            rows: defaults::rows(),
            columns: defaults::columns(),
            initial_tiles: defaults::initial_tiles(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            swipe_max_time_ms: defaults::swipe_max_time_ms(),
            swipe_min_distance: defaults::swipe_min_distance(),
            swipe_min_normal: defaults::swipe_min_normal(),
        }
    }
}

impl Config {
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file = std::fs::File::open(path)
            .with_context(|| format!("failed to open config {}", path.display()))?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let cfg: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        let BoardConfig {
            rows,
            columns,
            initial_tiles,
        } = self.board;
        if rows == 0 || columns == 0 {
            bail!("board must be at least 1x1, got {rows}x{columns}");
        }
        if initial_tiles > rows * columns {
            bail!(
                "initial_tiles {initial_tiles} exceeds the {} cells of a {rows}x{columns} board",
                rows * columns
            );
        }
        let normal = self.input.swipe_min_normal;
        if !(normal > 0.0 && normal <= 1.0) {
            bail!("swipe_min_normal must be in (0, 1], got {normal}");
        }
        if !(self.input.swipe_min_distance >= 0.0) {
            bail!("swipe_min_distance must be non-negative");
        }
        Ok(())
    }
}

mod defaults {
    pub fn rows() -> usize { 4 }
    pub fn columns() -> usize { 4 }
    pub fn initial_tiles() -> usize { 2 }
    pub fn swipe_max_time_ms() -> u64 { 1000 }
    pub fn swipe_min_distance() -> f64 { 20.0 }
    pub fn swipe_min_normal() -> f64 { 0.85 }
}
