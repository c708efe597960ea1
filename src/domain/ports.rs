use crate::domain::model::Estimate;
use crate::puzzles::PuzzleKind;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use rand::rngs::StdRng;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn puzzles(&self) -> Result<Vec<PuzzleKind>>;
    fn trials(&self) -> u64;
    fn seed(&self) -> Option<u64>;
    fn concurrency(&self) -> usize;
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[String];
}

/// A self-contained Monte-Carlo experiment.
pub trait Puzzle: Validate + Send + Sync {
    fn kind(&self) -> PuzzleKind;

    /// Runs `trials` samples per reported case.
    fn run(&self, trials: u64, rng: &mut StdRng) -> Result<Vec<Estimate>>;
}
