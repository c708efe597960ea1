// Domain layer: result models and ports (interfaces) shared by puzzles, engine and adapters.

pub mod model;
pub mod ports;
