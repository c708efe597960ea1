pub mod engine;
pub mod estimator;
pub mod report;

pub use crate::domain::model::{Estimate, EstimateKind, PuzzleResult, SimulationReport};
pub use crate::domain::ports::{ConfigProvider, Puzzle, Storage};
pub use crate::utils::error::Result;
