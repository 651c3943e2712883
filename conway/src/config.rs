//! TOML configuration file support.
//!
//! Every key is optional; a missing file or section falls back to the
//! defaults below, which match the shipped `patterns.toml`.
//!
//! # Example Configuration
//!
//! ```toml
//! [grid]
//! width = 50
//! height = 50
//! cell_size = 10.0
//!
//! [simulation]
//! ticks_per_second = 7.0
//! generations = "infinite"   # or a positive count
//! evolver = "serial"         # or "row-tasks"
//!
//! [patterns]
//! file = "patterns.toml"
//! default = "Blinker"
//! keys = ["Blinker", "Toad", "Beacon"]
//! ```

use std::fmt;
use std::fs;
use std::io;
use std::num::NonZeroU64;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::evolve::Strategy;
use crate::keys::DEFAULT_BINDINGS;

/// Largest grid, in cells, a configuration may ask for.
pub const MAX_CELLS: usize = 4096 * 4096;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    Read {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

// =============================================================================
// Generation Limit
// =============================================================================

/// How many generations a seeded pattern may run for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawLimit")]
pub enum GenerationLimit {
    #[default]
    Unbounded,
    Finite(NonZeroU64),
}

impl GenerationLimit {
    /// Generations left right after seeding; `None` means unbounded.
    pub fn initial_remaining(self) -> Option<u64> {
        match self {
            GenerationLimit::Unbounded => None,
            GenerationLimit::Finite(count) => Some(count.get()),
        }
    }
}

impl fmt::Display for GenerationLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationLimit::Unbounded => f.write_str("infinite"),
            GenerationLimit::Finite(count) => write!(f, "{count}"),
        }
    }
}

/// `generations` as written in the file: a count or the word "infinite".
#[derive(Deserialize)]
#[serde(untagged)]
enum RawLimit {
    Count(u64),
    Keyword(String),
}

impl TryFrom<RawLimit> for GenerationLimit {
    type Error = String;

    fn try_from(raw: RawLimit) -> Result<Self, Self::Error> {
        match raw {
            RawLimit::Count(count) => NonZeroU64::new(count)
                .map(GenerationLimit::Finite)
                .ok_or_else(|| "generations must be positive or \"infinite\"".to_string()),
            RawLimit::Keyword(word) if word == "infinite" => Ok(GenerationLimit::Unbounded),
            RawLimit::Keyword(word) => Err(format!(
                "generations must be a positive count or \"infinite\", found {word:?}"
            )),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Grid section of the TOML configuration
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Columns
    pub width: usize,

    /// Rows
    pub height: usize,

    /// Side of one cell on screen, in points
    pub cell_size: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 50,
            height: 50,
            cell_size: 10.0,
        }
    }
}

/// Simulation section of the TOML configuration
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Generations per second while running
    pub ticks_per_second: f32,

    /// Generations a pattern may run after it is loaded
    pub generations: GenerationLimit,

    /// Evolution strategy
    pub evolver: Strategy,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: 7.0,
            generations: GenerationLimit::Unbounded,
            evolver: Strategy::Serial,
        }
    }
}

/// Patterns section of the TOML configuration
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PatternsConfig {
    /// Pattern library, relative to the working directory
    pub file: PathBuf,

    /// Pattern seeded at startup
    pub default: String,

    /// Patterns bound to keys `1`..`9` then `0`
    pub keys: Vec<String>,
}

impl Default for PatternsConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("patterns.toml"),
            default: "Blinker".to_string(),
            keys: DEFAULT_BINDINGS.iter().map(|name| name.to_string()).collect(),
        }
    }
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Top-level configuration
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub grid: GridConfig,
    pub simulation: SimulationConfig,
    pub patterns: PatternsConfig,
}

impl Config {
    /// Load and validate the file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Like [`Config::load`], but a file that does not exist yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.width == 0 || self.grid.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "grid must be at least 1x1, got {}x{}",
                self.grid.height, self.grid.width
            )));
        }
        if !self
            .grid
            .height
            .checked_mul(self.grid.width)
            .is_some_and(|cells| cells <= MAX_CELLS)
        {
            return Err(ConfigError::Invalid(format!(
                "grid of {}x{} exceeds {MAX_CELLS} cells",
                self.grid.height, self.grid.width
            )));
        }
        let cell_size = self.grid.cell_size;
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "cell_size must be positive and finite, got {cell_size}"
            )));
        }
        let rate = self.simulation.ticks_per_second;
        if !rate.is_finite() || rate <= 0.0 || Duration::try_from_secs_f32(1.0 / rate).is_err() {
            return Err(ConfigError::Invalid(format!(
                "ticks_per_second must be a positive rate, got {rate}"
            )));
        }
        if self.patterns.keys.len() > DEFAULT_BINDINGS.len() {
            return Err(ConfigError::Invalid(format!(
                "at most {} pattern keys can be bound, got {}",
                DEFAULT_BINDINGS.len(),
                self.patterns.keys.len()
            )));
        }
        Ok(())
    }

    /// Time between generations while running.
    ///
    /// A rate that [`Config::validate`] would reject never ticks.
    pub fn tick_interval(&self) -> Duration {
        Duration::try_from_secs_f32(1.0 / self.simulation.ticks_per_second)
            .unwrap_or(Duration::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.grid.width, 50);
        assert_eq!(config.grid.height, 50);
        assert_eq!(config.simulation.generations, GenerationLimit::Unbounded);
        assert_eq!(config.simulation.evolver, Strategy::Serial);
        assert_eq!(config.patterns.file, PathBuf::from("patterns.toml"));
        assert_eq!(config.patterns.default, "Blinker");
        assert_eq!(config.patterns.keys.len(), 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::from_toml_str(
            r#"
            [grid]
            width = 80

            [simulation]
            generations = 120
            evolver = "row-tasks"
            "#,
        )
        .unwrap();

        assert_eq!(config.grid.width, 80);
        assert_eq!(config.grid.height, 50);
        assert_eq!(
            config.simulation.generations,
            GenerationLimit::Finite(NonZeroU64::new(120).unwrap())
        );
        assert_eq!(config.simulation.evolver, Strategy::RowTasks);
        assert_eq!(config.simulation.ticks_per_second, 7.0);
    }

    #[test]
    fn test_generation_limit_forms() {
        let parse = |value: &str| {
            Config::from_toml_str(&format!("[simulation]\ngenerations = {value}"))
                .map(|config| config.simulation.generations)
        };

        assert_eq!(parse("\"infinite\"").unwrap(), GenerationLimit::Unbounded);
        assert_eq!(parse("3").unwrap().initial_remaining(), Some(3));
        assert!(matches!(parse("0"), Err(ConfigError::Parse(_))));
        assert!(matches!(parse("-4"), Err(ConfigError::Parse(_))));
        assert!(matches!(parse("\"forever\""), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_generation_limit_display() {
        assert_eq!(GenerationLimit::Unbounded.to_string(), "infinite");
        assert_eq!(
            GenerationLimit::Finite(NonZeroU64::new(9).unwrap()).to_string(),
            "9"
        );
        assert_eq!(GenerationLimit::Unbounded.initial_remaining(), None);
    }

    #[test]
    fn test_validation() {
        let cases = [
            "[grid]\nwidth = 0",
            "[grid]\ncell_size = 0.0",
            "[simulation]\nticks_per_second = -1.0",
            "[simulation]\nticks_per_second = nan",
            "[simulation]\nticks_per_second = inf",
            "[simulation]\nticks_per_second = 1e-30",
            "[grid]\ncell_size = inf",
            "[grid]\ncell_size = nan",
            "[grid]\nheight = 4294967297\nwidth = 4294967296",
            "[grid]\nheight = 5000\nwidth = 5000",
            r#"
            [patterns]
            keys = ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k"]
            "#,
        ];
        for text in cases {
            let err = Config::from_toml_str(text).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "accepted {text:?}");
        }
    }

    #[test]
    fn test_unknown_evolver_is_parse_error() {
        let err = Config::from_toml_str("[simulation]\nevolver = \"gpu\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_tick_interval() {
        let config = Config::from_toml_str("[simulation]\nticks_per_second = 4.0").unwrap();
        assert_eq!(config.tick_interval(), Duration::from_millis(250));
    }

    #[test]
    fn test_tick_interval_never_panics() {
        let mut config = Config::default();
        config.simulation.ticks_per_second = 1e-30;
        assert_eq!(config.tick_interval(), Duration::MAX);
        config.simulation.ticks_per_second = 0.0;
        assert_eq!(config.tick_interval(), Duration::MAX);
    }

    #[test]
    fn test_largest_grid_is_accepted() {
        let config = Config::from_toml_str("[grid]\nheight = 4096\nwidth = 4096").unwrap();
        assert_eq!(config.grid.height * config.grid.width, MAX_CELLS);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[patterns]\ndefault = \"Glider\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.patterns.default, "Glider");
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conway.toml");

        assert!(matches!(Config::load(&path), Err(ConfigError::Read { .. })));
        assert_eq!(Config::load_or_default(&path).unwrap(), Config::default());
    }
}
