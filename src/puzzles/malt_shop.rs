use super::PuzzleKind;
use crate::core::estimator::ProportionEstimator;
use crate::domain::model::Estimate;
use crate::domain::ports::Puzzle;
use crate::utils::error::{Result, SimError};
use crate::utils::validation::{validate_non_empty_list, validate_range, Validate};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WaitCase {
    pub alice_wait: f64,
    pub bob_wait: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MaltShopParams {
    /// Minutes in the agreed meeting window.
    pub arrival_window: f64,
    pub cases: Vec<WaitCase>,
}

impl Default for MaltShopParams {
    fn default() -> Self {
        Self {
            arrival_window: 30.0,
            cases: vec![
                WaitCase {
                    alice_wait: 5.0,
                    bob_wait: 7.0,
                },
                WaitCase {
                    alice_wait: 5.0,
                    bob_wait: 5.0,
                },
                WaitCase {
                    alice_wait: 7.0,
                    bob_wait: 7.0,
                },
            ],
        }
    }
}

/// Alice and Bob arrive uniformly within the window; whoever comes first
/// waits a fixed time, never past the end of the window.
#[derive(Debug, Clone)]
pub struct MaltShop {
    params: MaltShopParams,
}

impl MaltShop {
    pub fn new(params: MaltShopParams) -> Self {
        Self { params }
    }

    pub fn analytical(&self, case: WaitCase) -> f64 {
        let w = self.params.arrival_window;
        let a = case.alice_wait.min(w);
        let b = case.bob_wait.min(w);
        1.0 - ((w - a).powi(2) + (w - b).powi(2)) / (2.0 * w * w)
    }

    fn meets(alice: f64, bob: f64, case: WaitCase) -> bool {
        if alice <= bob {
            bob - alice <= case.alice_wait
        } else {
            alice - bob <= case.bob_wait
        }
    }
}

impl Validate for MaltShop {
    fn validate(&self) -> Result<()> {
        let w = self.params.arrival_window;
        if !(w > 0.0 && w.is_finite()) {
            return Err(SimError::InvalidConfigValueError {
                field: "malt_shop.arrival_window".to_string(),
                value: w.to_string(),
                reason: "Arrival window must be a positive number of minutes".to_string(),
            });
        }
        validate_non_empty_list("malt_shop.cases", &self.params.cases)?;
        for case in &self.params.cases {
            validate_range("malt_shop.cases.alice_wait", case.alice_wait, 0.0, w)?;
            validate_range("malt_shop.cases.bob_wait", case.bob_wait, 0.0, w)?;
        }
        Ok(())
    }
}

impl Puzzle for MaltShop {
    fn kind(&self) -> PuzzleKind {
        PuzzleKind::MaltShop
    }

    fn run(&self, trials: u64, rng: &mut StdRng) -> Result<Vec<Estimate>> {
        let window = self.params.arrival_window;
        let slug = self.kind().slug();

        let estimates = self
            .params
            .cases
            .iter()
            .map(|&case| {
                let mut meetings = ProportionEstimator::new();
                for _ in 0..trials {
                    let alice = rng.random_range(0.0..=window);
                    let bob = rng.random_range(0.0..=window);
                    meetings.record(Self::meets(alice, bob, case));
                }
                let label = format!("alice={} bob={}", case.alice_wait, case.bob_wait);
                tracing::debug!("malt-shop {}: {:.6}", label, meetings.estimate());
                meetings.into_estimate(slug, label, Some(self.analytical(case)))
            })
            .collect();

        Ok(estimates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_analytical_values() {
        let puzzle = MaltShop::new(MaltShopParams::default());
        let case = |a, b| WaitCase {
            alice_wait: a,
            bob_wait: b,
        };
        // 1 - (25^2 + 23^2) / 1800
        assert!((puzzle.analytical(case(5.0, 7.0)) - (1.0 - 1154.0 / 1800.0)).abs() < 1e-12);
        assert!((puzzle.analytical(case(5.0, 5.0)) - 11.0 / 36.0).abs() < 1e-12);
        assert!((puzzle.analytical(case(30.0, 30.0)) - 1.0).abs() < 1e-12);
        assert!(puzzle.analytical(case(0.0, 0.0)).abs() < 1e-12);
    }

    #[test]
    fn test_meeting_rule_is_asymmetric() {
        let case = WaitCase {
            alice_wait: 5.0,
            bob_wait: 7.0,
        };
        // Bob first, Alice 6 minutes later: Bob is still waiting
        assert!(MaltShop::meets(16.0, 10.0, case));
        // Alice first, Bob 6 minutes later: Alice already left
        assert!(!MaltShop::meets(10.0, 16.0, case));
    }

    #[test]
    fn test_monte_carlo_matches_analytical() {
        let puzzle = MaltShop::new(MaltShopParams::default());
        let mut rng = StdRng::seed_from_u64(23072022);
        let estimates = puzzle.run(100_000, &mut rng).unwrap();

        assert_eq!(estimates.len(), 3);
        for estimate in &estimates {
            assert!((0.0..=1.0).contains(&estimate.monte_carlo));
            assert!(estimate.z_score().unwrap().abs() < 5.0, "{:?}", estimate);
        }
    }

    #[test]
    fn test_nan_wait_is_rejected() {
        let puzzle = MaltShop::new(MaltShopParams {
            arrival_window: 30.0,
            cases: vec![WaitCase {
                alice_wait: f64::NAN,
                bob_wait: 5.0,
            }],
        });
        assert!(matches!(
            puzzle.validate(),
            Err(SimError::InvalidConfigValueError { .. })
        ));
    }

    #[test]
    fn test_wait_longer_than_window_is_rejected() {
        let puzzle = MaltShop::new(MaltShopParams {
            arrival_window: 10.0,
            cases: vec![WaitCase {
                alice_wait: 5.0,
                bob_wait: 12.0,
            }],
        });
        assert!(puzzle.validate().is_err());
    }
}
