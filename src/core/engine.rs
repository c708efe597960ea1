use crate::domain::model::{PuzzleResult, SimulationReport};
use crate::domain::ports::{ConfigProvider, Puzzle};
use crate::puzzles::PuzzleParams;
use crate::utils::error::{Result, SimError};
use crate::utils::monitor::SystemMonitor;
use crate::utils::validation::validate_positive_number;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;

#[derive(Debug, Clone)]
pub struct RunSettings {
    pub trials: u64,
    /// Overrides every puzzle's own seed when set.
    pub seed: Option<u64>,
    pub concurrency: usize,
    pub run_id: Option<String>,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            trials: 100_000,
            seed: None,
            concurrency: 4,
            run_id: None,
        }
    }
}

impl RunSettings {
    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        Self {
            trials: config.trials(),
            seed: config.seed(),
            concurrency: config.concurrency(),
            run_id: None,
        }
    }
}

pub struct SimulationEngine {
    puzzles: Vec<Arc<dyn Puzzle>>,
    settings: RunSettings,
    monitor: Arc<SystemMonitor>,
}

impl SimulationEngine {
    pub fn new(puzzles: Vec<Arc<dyn Puzzle>>, settings: RunSettings) -> Self {
        Self::new_with_monitoring(puzzles, settings, false)
    }

    pub fn new_with_monitoring(
        puzzles: Vec<Arc<dyn Puzzle>>,
        settings: RunSettings,
        monitor_enabled: bool,
    ) -> Self {
        Self {
            puzzles,
            settings,
            monitor: Arc::new(SystemMonitor::new(monitor_enabled)),
        }
    }

    /// Builds the puzzles a config selects, using the given parameters.
    pub fn from_config<C: ConfigProvider>(
        config: &C,
        params: &PuzzleParams,
        monitor_enabled: bool,
    ) -> Result<Self> {
        let puzzles = params.build_all(&config.puzzles()?)?;
        Ok(Self::new_with_monitoring(
            puzzles,
            RunSettings::from_config(config),
            monitor_enabled,
        ))
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    pub async fn run(&self) -> Result<SimulationReport> {
        validate_positive_number("trials", self.settings.trials, 1)?;
        validate_positive_number("concurrency", self.settings.concurrency, 1)?;

        let started_at = Utc::now();
        let start = Instant::now();
        let run_id = self
            .settings
            .run_id
            .clone()
            .unwrap_or_else(|| format!("sim_{}", started_at.format("%Y%m%d_%H%M%S")));

        tracing::info!(
            "🎲 Run {}: {} puzzle(s), {} trials each, concurrency {}",
            run_id,
            self.puzzles.len(),
            self.settings.trials,
            self.settings.concurrency
        );
        self.monitor.log_phase("Start");

        let permits = Arc::new(Semaphore::new(self.settings.concurrency));
        let mut handles = Vec::with_capacity(self.puzzles.len());

        for puzzle in &self.puzzles {
            let puzzle = Arc::clone(puzzle);
            let permits = Arc::clone(&permits);
            let monitor = Arc::clone(&self.monitor);
            let trials = self.settings.trials;
            let seed = self.settings.seed.unwrap_or(puzzle.kind().default_seed());

            handles.push(tokio::spawn(async move {
                let _permit = permits.acquire_owned().await.map_err(|e| SimError::TaskError {
                    message: e.to_string(),
                })?;
                let result = tokio::task::spawn_blocking(move || run_puzzle(puzzle, trials, seed))
                    .await
                    .map_err(|e| SimError::TaskError {
                        message: e.to_string(),
                    })??;
                monitor.log_phase(&result.puzzle);
                Ok::<_, SimError>(result)
            }));
        }

        // No task may outlive the run: await all before reporting a failure.
        let mut outcomes = Vec::with_capacity(handles.len());
        for handle in handles {
            outcomes.push(handle.await.map_err(|e| SimError::TaskError {
                message: e.to_string(),
            }));
        }
        let results = outcomes
            .into_iter()
            .map(|outcome| outcome.and_then(|result| result))
            .collect::<Result<Vec<_>>>()?;

        self.monitor.log_final();
        let elapsed_ms = start.elapsed().as_millis() as u64;
        tracing::info!("✅ Run {} finished in {} ms", run_id, elapsed_ms);

        Ok(SimulationReport {
            run_id,
            started_at,
            elapsed_ms,
            results,
        })
    }
}

fn run_puzzle(puzzle: Arc<dyn Puzzle>, trials: u64, seed: u64) -> Result<PuzzleResult> {
    let kind = puzzle.kind();
    tracing::info!("▶️ {} (seed {})", kind.title(), seed);

    let start = Instant::now();
    let mut rng = StdRng::seed_from_u64(seed);
    let estimates = puzzle.run(trials, &mut rng)?;
    let elapsed_ms = start.elapsed().as_millis() as u64;

    for estimate in &estimates {
        if let Some(z) = estimate.z_score() {
            if z.abs() > 4.0 {
                tracing::warn!(
                    "{} [{}] is {:.1} standard errors from the analytical value",
                    kind,
                    estimate.case,
                    z
                );
            }
        }
    }
    tracing::debug!("{} done in {} ms", kind, elapsed_ms);

    Ok(PuzzleResult {
        puzzle: kind.slug().to_string(),
        title: kind.title().to_string(),
        seed,
        trials,
        elapsed_ms,
        estimates,
    })
}
