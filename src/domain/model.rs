use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateKind {
    Probability,
    Expectation,
}

/// One reported number of a puzzle run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub puzzle: String,
    pub case: String,
    pub kind: EstimateKind,
    pub trials: u64,
    pub monte_carlo: f64,
    pub std_error: f64,
    pub analytical: Option<f64>,
}

impl Estimate {
    pub fn abs_error(&self) -> Option<f64> {
        self.analytical.map(|exact| (self.monte_carlo - exact).abs())
    }

    /// Distance from the analytical value in standard errors.
    pub fn z_score(&self) -> Option<f64> {
        let exact = self.analytical?;
        if self.std_error > 0.0 {
            Some((self.monte_carlo - exact) / self.std_error)
        } else if self.monte_carlo == exact {
            Some(0.0)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PuzzleResult {
    pub puzzle: String,
    pub title: String,
    pub seed: u64,
    pub trials: u64,
    pub elapsed_ms: u64,
    pub estimates: Vec<Estimate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub results: Vec<PuzzleResult>,
}

impl SimulationReport {
    pub fn estimates(&self) -> impl Iterator<Item = &Estimate> {
        self.results.iter().flat_map(|r| r.estimates.iter())
    }

    pub fn result_for(&self, puzzle: &str) -> Option<&PuzzleResult> {
        self.results.iter().find(|r| r.puzzle == puzzle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimate(monte_carlo: f64, std_error: f64, analytical: Option<f64>) -> Estimate {
        Estimate {
            puzzle: "parking".to_string(),
            case: "n=3".to_string(),
            kind: EstimateKind::Probability,
            trials: 100,
            monte_carlo,
            std_error,
            analytical,
        }
    }

    #[test]
    fn test_z_score() {
        let e = estimate(0.7, 0.01, Some(0.68));
        assert!((e.z_score().unwrap() - 2.0).abs() < 1e-9);
        assert!((e.abs_error().unwrap() - 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_z_score_without_spread() {
        assert_eq!(estimate(1.0, 0.0, Some(1.0)).z_score(), Some(0.0));
        assert_eq!(estimate(0.9, 0.0, Some(1.0)).z_score(), None);
        assert_eq!(estimate(0.9, 0.1, None).z_score(), None);
    }
}
