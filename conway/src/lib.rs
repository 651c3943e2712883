//! # conway
//!
//! Conway's Game of Life on a bounded grid.
//!
//! Cells past the edge of the grid count as dead; nothing wraps around. The
//! crate holds the simulation only: a [`Session`] owns the grid and reacts to
//! [`Command`]s, and whatever front end drives it paints [`Session::grid`]
//! each frame.

pub mod config;
pub mod evolve;
pub mod grid;
pub mod keys;
pub mod neighbors;
pub mod patterns;
pub mod session;

pub use config::{Config, ConfigError, GenerationLimit};
pub use evolve::{evolve, Evolver, Strategy};
pub use grid::{Cell, Coord, Grid, GridError};
pub use keys::{KeyBindings, PatternKey};
pub use neighbors::count_live_neighbors;
pub use patterns::{Pattern, PatternCatalog, PatternError};
pub use session::{Command, Mode, Response, Session, SessionError, TickOutcome};
