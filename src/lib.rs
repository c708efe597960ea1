pub mod config;
pub mod core;
pub mod domain;
pub mod puzzles;
pub mod utils;

pub use config::cli::LocalStorage;
#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::toml_config::TomlConfig;

pub use core::engine::{RunSettings, SimulationEngine};
pub use core::report::{OutputFormat, ReportWriter};
pub use puzzles::{PuzzleKind, PuzzleParams};
pub use utils::error::{Result, SimError};
