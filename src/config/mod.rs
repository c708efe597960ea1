pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::report::OutputFormat;
#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::puzzles::PuzzleKind;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_path, validate_positive_number, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "puzzle-sim")]
#[command(about = "Monte-Carlo estimates for five classic probability puzzles")]
pub struct CliConfig {
    /// Puzzles to run (comma-separated slugs, or "all")
    #[arg(long, value_delimiter = ',', default_value = "all")]
    pub puzzles: Vec<String>,

    #[arg(long, default_value = "100000")]
    pub trials: u64,

    /// Seed every puzzle with this value instead of its own default
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, default_value = "4")]
    pub concurrency: usize,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    /// Report files to write (txt, csv, json); none by default
    #[arg(long, value_delimiter = ',')]
    pub output_formats: Vec<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage between puzzles")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn puzzles(&self) -> Result<Vec<PuzzleKind>> {
        PuzzleKind::parse_list(&self.puzzles)
    }

    fn trials(&self) -> u64 {
        self.trials
    }

    fn seed(&self) -> Option<u64> {
        self.seed
    }

    fn concurrency(&self) -> usize {
        self.concurrency
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.output_formats
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        self.puzzles()?;
        validate_positive_number("trials", self.trials, 1)?;
        validate_positive_number("concurrency", self.concurrency, 1)?;
        OutputFormat::parse_list(&self.output_formats)?;
        if !self.output_formats.is_empty() {
            validate_path("output_path", &self.output_path)?;
        }
        Ok(())
    }
}
