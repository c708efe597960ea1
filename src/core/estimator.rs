use crate::domain::model::{Estimate, EstimateKind};

/// Fraction of trials in which an event occurred.
#[derive(Debug, Clone, Default)]
pub struct ProportionEstimator {
    hits: u64,
    trials: u64,
}

impl ProportionEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, hit: bool) {
        self.trials += 1;
        if hit {
            self.hits += 1;
        }
    }

    pub fn trials(&self) -> u64 {
        self.trials
    }

    pub fn estimate(&self) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        self.hits as f64 / self.trials as f64
    }

    pub fn std_error(&self) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        let p = self.estimate();
        (p * (1.0 - p) / self.trials as f64).sqrt()
    }

    pub fn into_estimate(
        self,
        puzzle: &str,
        case: impl Into<String>,
        analytical: Option<f64>,
    ) -> Estimate {
        Estimate {
            puzzle: puzzle.to_string(),
            case: case.into(),
            kind: EstimateKind::Probability,
            trials: self.trials,
            monte_carlo: self.estimate(),
            std_error: self.std_error(),
            analytical,
        }
    }
}

/// Running mean and variance (Welford).
#[derive(Debug, Clone, Default)]
pub struct MeanEstimator {
    count: u64,
    mean: f64,
    m2: f64,
}

impl MeanEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            return 0.0;
        }
        self.m2 / (self.count - 1) as f64
    }

    pub fn std_error(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        (self.variance() / self.count as f64).sqrt()
    }

    pub fn into_estimate(
        self,
        puzzle: &str,
        case: impl Into<String>,
        analytical: Option<f64>,
    ) -> Estimate {
        Estimate {
            puzzle: puzzle.to_string(),
            case: case.into(),
            kind: EstimateKind::Expectation,
            trials: self.count,
            monte_carlo: self.mean,
            std_error: self.std_error(),
            analytical,
        }
    }
}
