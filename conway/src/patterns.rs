// patterns.rs - Named starting patterns loaded from a TOML library
//
// File layout, one table per pattern, coordinates absolute on the grid:
//
//     [Glider]
//     alive_cells = [[1, 2], [2, 3], [3, 1], [3, 2], [3, 3]]

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::grid::Coord;

#[derive(Debug, Error)]
pub enum PatternError {
    /// The pattern file could not be read
    #[error("failed to read pattern file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The pattern file is not a table of `alive_cells` lists
    #[error("malformed pattern file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("pattern '{0}' not found")]
    NotFound(String),
}

impl PatternError {
    /// True for problems with the pattern file itself rather than a lookup.
    pub fn is_file_error(&self) -> bool {
        matches!(self, PatternError::Read { .. } | PatternError::Parse(_))
    }
}

#[derive(Deserialize)]
struct PatternToml {
    alive_cells: Vec<Coord>,
}

/// A named set of cells to bring to life.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    name: String,
    cells: Vec<Coord>,
}

impl Pattern {
    pub fn new(name: impl Into<String>, cells: Vec<Coord>) -> Self {
        Self {
            name: name.into(),
            cells,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cells(&self) -> &[Coord] {
        &self.cells
    }

    /// Cells that would fall off a `height` x `width` grid.
    pub fn cells_outside(&self, height: usize, width: usize) -> Vec<Coord> {
        self.cells
            .iter()
            .copied()
            .filter(|at| !at.is_within(height, width))
            .collect()
    }
}

/// Read-only library of patterns keyed by name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatternCatalog {
    patterns: BTreeMap<String, Pattern>,
}

impl PatternCatalog {
    /// Load every pattern in the TOML file at `path`.
    ///
    /// Nothing is returned unless the whole file is well formed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PatternError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| PatternError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_toml_str(&text)?;
        info!(path = %path.display(), patterns = catalog.len(), "loaded pattern library");
        Ok(catalog)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, PatternError> {
        let raw: BTreeMap<String, PatternToml> = toml::from_str(text)?;
        let patterns = raw
            .into_iter()
            .map(|(name, pattern)| {
                let pattern = Pattern::new(name.clone(), pattern.alive_cells);
                (name, pattern)
            })
            .collect();
        Ok(Self { patterns })
    }

    pub fn get(&self, name: &str) -> Result<&Pattern, PatternError> {
        self.patterns
            .get(name)
            .ok_or_else(|| PatternError::NotFound(name.to_owned()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.patterns.contains_key(name)
    }

    /// Pattern names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.patterns.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Every `(pattern, cell)` pair that would fall off a `height` x `width` grid.
    pub fn out_of_bounds(&self, height: usize, width: usize) -> Vec<(&str, Coord)> {
        self.patterns
            .values()
            .flat_map(|pattern| {
                pattern
                    .cells_outside(height, width)
                    .into_iter()
                    .map(move |at| (pattern.name(), at))
            })
            .collect()
    }
}
