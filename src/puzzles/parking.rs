use super::PuzzleKind;
use crate::core::estimator::ProportionEstimator;
use crate::domain::model::Estimate;
use crate::domain::ports::Puzzle;
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_list, validate_positive_number, Validate};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParkingParams {
    pub car_counts: Vec<usize>,
}

impl Default for ParkingParams {
    fn default() -> Self {
        Self {
            car_counts: vec![2, 3, 4, 10],
        }
    }
}

/// N point-like cars park uniformly along a unit street. Is a randomly drawn
/// car one of a pair of mutual nearest neighbours?
#[derive(Debug, Clone)]
pub struct ParallelParking {
    params: ParkingParams,
}

impl ParallelParking {
    pub fn new(params: ParkingParams) -> Self {
        Self { params }
    }

    pub fn analytical(cars: usize) -> Option<f64> {
        match cars {
            0 | 1 => None,
            2 => Some(1.0),
            _ => Some(2.0 / 3.0),
        }
    }
}

/// Index of each car's nearest neighbour; `positions` must be sorted and hold
/// at least two cars. Ties go to the left neighbour.
pub fn nearest_neighbors(positions: &[f64]) -> Vec<usize> {
    let n = positions.len();
    (0..n)
        .map(|i| {
            if i == 0 {
                1
            } else if i == n - 1 {
                n - 2
            } else {
                let back = positions[i] - positions[i - 1];
                let forward = positions[i + 1] - positions[i];
                if forward < back {
                    i + 1
                } else {
                    i - 1
                }
            }
        })
        .collect()
}

impl Validate for ParallelParking {
    fn validate(&self) -> Result<()> {
        validate_non_empty_list("parking.car_counts", &self.params.car_counts)?;
        for &cars in &self.params.car_counts {
            validate_positive_number("parking.car_counts", cars, 2)?;
        }
        Ok(())
    }
}

impl Puzzle for ParallelParking {
    fn kind(&self) -> PuzzleKind {
        PuzzleKind::ParallelParking
    }

    fn run(&self, trials: u64, rng: &mut StdRng) -> Result<Vec<Estimate>> {
        let slug = self.kind().slug();
        let mut estimates = Vec::with_capacity(self.params.car_counts.len());

        for &cars in &self.params.car_counts {
            let mut positions = vec![0.0f64; cars];
            let mut mutual = ProportionEstimator::new();

            for _ in 0..trials {
                positions.iter_mut().for_each(|p| *p = rng.random::<f64>());
                positions.sort_unstable_by(f64::total_cmp);

                let neighbors = nearest_neighbors(&positions);
                let car = rng.random_range(0..cars);
                mutual.record(neighbors[neighbors[car]] == car);
            }

            tracing::debug!("parking n={}: {:.6}", cars, mutual.estimate());
            estimates.push(mutual.into_estimate(
                slug,
                format!("cars={}", cars),
                Self::analytical(cars),
            ));
        }

        Ok(estimates)
    }
}
