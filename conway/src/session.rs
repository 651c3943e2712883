// session.rs - Interactive session state for Conway's Game of Life
//
// One `Session` owns the live grid. Input events arrive as `Command`s between
// frames; the renderer reads `grid()` after they have been applied.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{Config, GenerationLimit};
use crate::evolve::Evolver;
use crate::grid::{Cell, Coord, Grid, GridError};
use crate::keys::{KeyBindings, PatternKey};
use crate::patterns::{PatternCatalog, PatternError};

/// Whether generations are advancing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// Paused; cells can be edited.
    #[default]
    Editing,
    Running,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("cells cannot be edited while the simulation is running")]
    EditWhileRunning,

    #[error("no pattern is bound to key {0}")]
    Unbound(PatternKey),

    #[error(transparent)]
    OutOfBounds(#[from] GridError),

    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error("failed to start the evolution runtime: {0}")]
    Runtime(#[from] io::Error),
}

/// A discrete input event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    TogglePause,
    LoadSlot(PatternKey),
    LoadPattern(String),
    Clear,
    ExportAliveCells,
    EditCell { at: Coord, cell: Cell },
    ReloadPatterns(PathBuf),
    Tick,
}

/// What one [`Tick`](Command::Tick) did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running; nothing happened.
    Idle,
    /// A new generation was produced.
    Advanced { generation: u64 },
    /// Running, but the generation limit was already used up.
    Exhausted,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response {
    Done,
    Mode(Mode),
    Ticked(TickOutcome),
    Exported(Vec<Coord>),
    Reloaded { patterns: usize },
}

/// Grid, run state and pattern library of one interactive session.
#[derive(Debug)]
pub struct Session {
    grid: Grid,
    mode: Mode,
    limit: GenerationLimit,
    remaining: Option<u64>,
    generation: u64,
    catalog: PatternCatalog,
    bindings: KeyBindings,
    evolver: Evolver,
}

impl Session {
    /// A session over an empty `height` x `width` grid, paused.
    pub fn new(
        height: usize,
        width: usize,
        catalog: PatternCatalog,
        bindings: KeyBindings,
        limit: GenerationLimit,
        evolver: Evolver,
    ) -> Self {
        Self {
            grid: Grid::new(height, width),
            mode: Mode::Editing,
            limit,
            remaining: limit.initial_remaining(),
            generation: 0,
            catalog,
            bindings,
            evolver,
        }
    }

    /// Build everything `config` describes and seed its default pattern.
    ///
    /// Fails if the pattern library cannot be loaded, a key is bound to a
    /// missing pattern or the default pattern does not exist.
    pub fn from_config(config: &Config) -> Result<Self, SessionError> {
        let catalog = PatternCatalog::load(&config.patterns.file)?;
        for (name, at) in catalog.out_of_bounds(config.grid.height, config.grid.width) {
            warn!(
                pattern = name,
                cell = %at,
                "pattern cell lies outside the grid and will be skipped"
            );
        }
        let bindings = KeyBindings::new(&config.patterns.keys, &catalog)?;
        let evolver = Evolver::new(config.simulation.evolver)?;

        let mut session = Self::new(
            config.grid.height,
            config.grid.width,
            catalog,
            bindings,
            config.simulation.generations,
            evolver,
        );
        session.load_pattern(&config.patterns.default)?;
        info!(
            height = config.grid.height,
            width = config.grid.width,
            limit = %config.simulation.generations,
            evolver = ?session.evolver.strategy(),
            "session ready"
        );
        Ok(session)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.mode == Mode::Running
    }

    /// Generations since the last load or clear.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Generations left before the limit; `None` when unbounded.
    pub fn remaining(&self) -> Option<u64> {
        self.remaining
    }

    pub fn limit(&self) -> GenerationLimit {
        self.limit
    }

    pub fn population(&self) -> usize {
        self.grid.population()
    }

    pub fn catalog(&self) -> &PatternCatalog {
        &self.catalog
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn toggle_pause(&mut self) -> Mode {
        self.mode = match self.mode {
            Mode::Editing => Mode::Running,
            Mode::Running => Mode::Editing,
        };
        info!(mode = ?self.mode, generation = self.generation, "toggled simulation");
        self.mode
    }

    /// Replace the grid with pattern `name` and reset the generation budget.
    ///
    /// An unknown name leaves the session exactly as it was.
    pub fn load_pattern(&mut self, name: &str) -> Result<(), SessionError> {
        let pattern = self.catalog.get(name)?;

        self.grid.clear();
        let skipped = self.grid.seed(pattern.cells().iter().copied());
        if skipped > 0 {
            warn!(pattern = name, skipped, "pattern does not fit the grid");
        }

        self.mode = Mode::Editing;
        self.remaining = self.limit.initial_remaining();
        self.generation = 0;
        info!(pattern = name, population = self.grid.population(), "loaded pattern");
        Ok(())
    }

    /// Load whichever pattern `key` is bound to.
    pub fn load_slot(&mut self, key: PatternKey) -> Result<(), SessionError> {
        let name = self
            .bindings
            .pattern_for(key)
            .ok_or(SessionError::Unbound(key))?
            .to_owned();
        self.load_pattern(&name)
    }

    pub fn clear_grid(&mut self) {
        self.grid.clear();
        self.mode = Mode::Editing;
        self.generation = 0;
        info!("cleared grid");
    }

    /// Set one cell while paused.
    ///
    /// Rejected, with the grid untouched, while running or when `at` is off the grid.
    pub fn edit_cell(&mut self, at: Coord, cell: Cell) -> Result<(), SessionError> {
        if self.is_running() {
            return Err(SessionError::EditWhileRunning);
        }
        self.grid.get(at)?;
        self.grid.set(at, cell);
        debug!(cell = %at, state = ?cell, "edited cell");
        Ok(())
    }

    /// Advance one generation if running and the limit allows it.
    ///
    /// Using up the last allowed generation drops the session back to
    /// [`Mode::Editing`] so the final state can be edited.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.is_running() {
            return TickOutcome::Idle;
        }
        if self.remaining == Some(0) {
            self.mode = Mode::Editing;
            debug!("generation limit already reached");
            return TickOutcome::Exhausted;
        }

        self.grid = self.evolver.evolve(&self.grid);
        self.generation += 1;

        if let Some(remaining) = self.remaining.as_mut() {
            *remaining -= 1;
            if *remaining == 0 {
                self.mode = Mode::Editing;
                info!(generation = self.generation, "generation limit reached");
            }
        }
        TickOutcome::Advanced {
            generation: self.generation,
        }
    }

    /// Live cells in row-major order.
    pub fn export_alive_cells(&self) -> Vec<Coord> {
        self.grid.alive_cells()
    }

    /// Swap in the pattern library at `path`.
    ///
    /// On any failure, including a key binding the new library cannot
    /// satisfy, the current library is kept.
    pub fn reload_patterns(&mut self, path: &Path) -> Result<usize, SessionError> {
        let catalog = PatternCatalog::load(path)?;
        self.bindings.validate(&catalog)?;
        for (name, at) in catalog.out_of_bounds(self.grid.height(), self.grid.width()) {
            warn!(
                pattern = name,
                cell = %at,
                "pattern cell lies outside the grid and will be skipped"
            );
        }
        self.catalog = catalog;
        Ok(self.catalog.len())
    }

    /// Apply one input event.
    pub fn handle(&mut self, command: Command) -> Result<Response, SessionError> {
        match command {
            Command::TogglePause => Ok(Response::Mode(self.toggle_pause())),
            Command::LoadSlot(key) => self.load_slot(key).map(|()| Response::Done),
            Command::LoadPattern(name) => self.load_pattern(&name).map(|()| Response::Done),
            Command::Clear => {
                self.clear_grid();
                Ok(Response::Done)
            }
            Command::ExportAliveCells => Ok(Response::Exported(self.export_alive_cells())),
            Command::EditCell { at, cell } => self.edit_cell(at, cell).map(|()| Response::Done),
            Command::ReloadPatterns(path) => self
                .reload_patterns(&path)
                .map(|patterns| Response::Reloaded { patterns }),
            Command::Tick => Ok(Response::Ticked(self.tick())),
        }
    }
}
