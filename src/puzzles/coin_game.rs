use super::PuzzleKind;
use crate::core::estimator::MeanEstimator;
use crate::domain::model::Estimate;
use crate::domain::ports::Puzzle;
use crate::utils::error::{Result, SimError};
use crate::utils::validation::{
    validate_non_empty_list, validate_positive_number, validate_probability, Validate,
};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoinCase {
    pub coins: [u32; 3],
    /// Probability that any coin shows heads.
    pub bias: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoinGameParams {
    pub cases: Vec<CoinCase>,
    pub max_rounds: u64,
}

impl Default for CoinGameParams {
    fn default() -> Self {
        Self {
            cases: vec![
                CoinCase {
                    coins: [1, 1, 1],
                    bias: 0.5,
                },
                CoinCase {
                    coins: [2, 3, 4],
                    bias: 0.5,
                },
                CoinCase {
                    coins: [3, 3, 3],
                    bias: 0.4,
                },
            ],
            max_rounds: 1_000_000,
        }
    }
}

/// Three players flip simultaneously; the odd one out collects a coin from
/// each of the others. How many rounds until somebody is broke?
#[derive(Debug, Clone)]
pub struct CoinGame {
    params: CoinGameParams,
}

impl CoinGame {
    pub fn new(params: CoinGameParams) -> Self {
        Self { params }
    }

    pub fn analytical(case: CoinCase) -> Option<f64> {
        let [l, m, n] = case.coins.map(f64::from);
        if case.bias == 0.5 {
            return Some(4.0 * l * m * n / (3.0 * (l + m + n - 2.0)));
        }
        if case.coins == [1, 1, 1] {
            let p = case.bias;
            let q = 1.0 - p;
            return Some(1.0 / (1.0 - p * p * p - q * q * q));
        }
        None
    }

    /// Rounds played until a player runs out of coins.
    fn play(&self, case: CoinCase, rng: &mut StdRng) -> Result<u64> {
        let mut coins = case.coins;
        let mut rounds = 0u64;

        while coins.iter().all(|&c| c > 0) {
            if rounds == self.params.max_rounds {
                return Err(SimError::SimulationDiverged {
                    puzzle: PuzzleKind::CoinGame.slug().to_string(),
                    limit: self.params.max_rounds,
                });
            }
            rounds += 1;

            let heads: [bool; 3] = std::array::from_fn(|_| rng.random_bool(case.bias));
            let head_count = heads.iter().filter(|&&h| h).count();
            let odd_side = match head_count {
                1 => true,
                2 => false,
                _ => continue,
            };
            // odd_side is the face shown by exactly one player
            for (player, &face) in heads.iter().enumerate() {
                if face == odd_side {
                    coins[player] += 2;
                } else {
                    coins[player] -= 1;
                }
            }
        }

        Ok(rounds)
    }
}

impl Validate for CoinGame {
    fn validate(&self) -> Result<()> {
        validate_non_empty_list("coin_game.cases", &self.params.cases)?;
        validate_positive_number("coin_game.max_rounds", self.params.max_rounds, 1)?;
        for case in &self.params.cases {
            for &count in &case.coins {
                validate_positive_number("coin_game.cases.coins", count, 1)?;
            }
            validate_probability("coin_game.cases.bias", case.bias)?;
        }
        Ok(())
    }
}

impl Puzzle for CoinGame {
    fn kind(&self) -> PuzzleKind {
        PuzzleKind::CoinGame
    }

    fn run(&self, trials: u64, rng: &mut StdRng) -> Result<Vec<Estimate>> {
        let slug = self.kind().slug();
        let mut estimates = Vec::with_capacity(self.params.cases.len());

        for &case in &self.params.cases {
            let mut rounds = MeanEstimator::new();
            for _ in 0..trials {
                rounds.record(self.play(case, rng)? as f64);
            }

            let [l, m, n] = case.coins;
            let label = format!("coins={}/{}/{} p={}", l, m, n, case.bias);
            tracing::debug!("coin-game {}: {:.4} rounds", label, rounds.mean());
            estimates.push(rounds.into_estimate(slug, label, Self::analytical(case)));
        }

        Ok(estimates)
    }
}
