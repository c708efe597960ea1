use super::PuzzleKind;
use crate::core::estimator::ProportionEstimator;
use crate::domain::model::Estimate;
use crate::domain::ports::Puzzle;
use crate::utils::error::Result;
use crate::utils::validation::{validate_positive_number, validate_range, Validate};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DishwasherParams {
    pub dishwashers: u32,
    pub broken_dishes: u32,
    pub clumsy_threshold: u32,
}

impl Default for DishwasherParams {
    fn default() -> Self {
        Self {
            dishwashers: 5,
            broken_dishes: 5,
            clumsy_threshold: 4,
        }
    }
}

/// Five equally careful dishwashers break five dishes in a week, four of them
/// by the same person. How likely is that by chance alone?
#[derive(Debug, Clone)]
pub struct Dishwasher {
    params: DishwasherParams,
}

impl Dishwasher {
    pub fn new(params: DishwasherParams) -> Self {
        Self { params }
    }

    /// P(Bin(broken_dishes, 1/dishwashers) >= clumsy_threshold)
    pub fn analytical_specific(&self) -> f64 {
        let n = self.params.broken_dishes;
        let p = 1.0 / self.params.dishwashers as f64;
        (self.params.clumsy_threshold..=n)
            .map(|k| binomial(n, k) * p.powi(k as i32) * (1.0 - p).powi((n - k) as i32))
            .sum()
    }

    /// Only closed when at most one dishwasher can reach the threshold.
    pub fn analytical_any(&self) -> Option<f64> {
        if 2 * self.params.clumsy_threshold > self.params.broken_dishes {
            Some(self.params.dishwashers as f64 * self.analytical_specific())
        } else {
            None
        }
    }
}

fn binomial(n: u32, k: u32) -> f64 {
    let k = k.min(n - k);
    (0..k).fold(1.0, |acc, i| acc * (n - i) as f64 / (i + 1) as f64)
}

impl Validate for Dishwasher {
    fn validate(&self) -> Result<()> {
        validate_positive_number("dishwasher.dishwashers", self.params.dishwashers, 1)?;
        validate_positive_number("dishwasher.broken_dishes", self.params.broken_dishes, 1)?;
        validate_range(
            "dishwasher.clumsy_threshold",
            self.params.clumsy_threshold,
            1,
            self.params.broken_dishes,
        )
    }
}

impl Puzzle for Dishwasher {
    fn kind(&self) -> PuzzleKind {
        PuzzleKind::Dishwasher
    }

    fn run(&self, trials: u64, rng: &mut StdRng) -> Result<Vec<Estimate>> {
        let dishwashers = self.params.dishwashers as usize;
        let threshold = self.params.clumsy_threshold;
        let mut counts = vec![0u32; dishwashers];

        let mut specific = ProportionEstimator::new();
        let mut any = ProportionEstimator::new();

        for _ in 0..trials {
            counts.iter_mut().for_each(|c| *c = 0);
            for _ in 0..self.params.broken_dishes {
                counts[rng.random_range(0..dishwashers)] += 1;
            }
            // dishwasher 0 is the one under suspicion
            specific.record(counts[0] >= threshold);
            any.record(counts.iter().any(|&c| c >= threshold));
        }

        tracing::debug!(
            "dishwasher: specific={:.6} any={:.6}",
            specific.estimate(),
            any.estimate()
        );

        let slug = self.kind().slug();
        Ok(vec![
            specific.into_estimate(slug, "specific", Some(self.analytical_specific())),
            any.into_estimate(slug, "any", self.analytical_any()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_analytical_default() {
        let puzzle = Dishwasher::new(DishwasherParams::default());
        assert!((puzzle.analytical_specific() - 21.0 / 3125.0).abs() < 1e-15);
        assert!((puzzle.analytical_any().unwrap() - 105.0 / 3125.0).abs() < 1e-15);
    }

    #[test]
    fn test_any_has_no_closed_form_for_low_threshold() {
        let puzzle = Dishwasher::new(DishwasherParams {
            dishwashers: 3,
            broken_dishes: 6,
            clumsy_threshold: 2,
        });
        assert!(puzzle.analytical_any().is_none());
    }

    #[test]
    fn test_monte_carlo_matches_analytical() {
        let puzzle = Dishwasher::new(DishwasherParams::default());
        let mut rng = StdRng::seed_from_u64(1337);
        let estimates = puzzle.run(200_000, &mut rng).unwrap();

        assert_eq!(estimates.len(), 2);
        for estimate in &estimates {
            assert_eq!(estimate.trials, 200_000);
            assert!(estimate.z_score().unwrap().abs() < 5.0, "{:?}", estimate);
        }
    }

    #[test]
    fn test_same_seed_same_result() {
        let puzzle = Dishwasher::new(DishwasherParams::default());
        let a = puzzle.run(5_000, &mut StdRng::seed_from_u64(7)).unwrap();
        let b = puzzle.run(5_000, &mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_threshold_above_dishes_is_rejected() {
        let puzzle = Dishwasher::new(DishwasherParams {
            clumsy_threshold: 6,
            ..DishwasherParams::default()
        });
        assert!(puzzle.validate().is_err());
    }
}
