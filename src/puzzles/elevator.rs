use super::PuzzleKind;
use crate::core::estimator::ProportionEstimator;
use crate::domain::model::Estimate;
use crate::domain::ports::Puzzle;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_list, validate_positive_number, validate_range, Validate,
};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Beyond this many elevators the answer is 1/2 to double precision.
pub const MAX_ELEVATORS: u32 = 10_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ElevatorParams {
    pub floors: u32,
    /// 1-based; the ground floor is floor 1.
    pub gamow_floor: u32,
    pub elevator_counts: Vec<u32>,
}

impl Default for ElevatorParams {
    fn default() -> Self {
        Self {
            floors: 7,
            gamow_floor: 2,
            elevator_counts: vec![1, 2, 3],
        }
    }
}

/// Elevators shuttle between ground and top floor at constant speed. When
/// Gamow calls one, how often is the first to arrive heading down?
#[derive(Debug, Clone)]
pub struct Elevator {
    params: ElevatorParams,
}

impl Elevator {
    pub fn new(params: ElevatorParams) -> Self {
        Self { params }
    }

    /// Gamow's height as a fraction of the shaft.
    pub fn height(&self) -> f64 {
        (self.params.gamow_floor - 1) as f64 / (self.params.floors - 1) as f64
    }

    pub fn analytical(&self, elevators: u32) -> f64 {
        let h = self.height();
        if h <= 0.5 {
            0.5 + 0.5 * (1.0 - 2.0 * h).powi(elevators as i32)
        } else {
            0.5 - 0.5 * (2.0 * h - 1.0).powi(elevators as i32)
        }
    }
}

/// Time until an elevator at `phase` reaches height `h`, and whether it is
/// travelling down then. A full cycle takes 2 units: up during [0, 1), down
/// during [1, 2).
fn next_arrival(phase: f64, h: f64) -> (f64, bool) {
    let up_at = h;
    let down_at = 2.0 - h;
    let wait_up = (up_at - phase).rem_euclid(2.0);
    let wait_down = (down_at - phase).rem_euclid(2.0);
    if wait_down < wait_up {
        (wait_down, true)
    } else {
        (wait_up, false)
    }
}

impl Validate for Elevator {
    fn validate(&self) -> Result<()> {
        validate_positive_number("elevator.floors", self.params.floors, 3)?;
        validate_range(
            "elevator.gamow_floor",
            self.params.gamow_floor,
            2,
            self.params.floors - 1,
        )?;
        validate_non_empty_list("elevator.elevator_counts", &self.params.elevator_counts)?;
        for &count in &self.params.elevator_counts {
            validate_range("elevator.elevator_counts", count, 1, MAX_ELEVATORS)?;
        }
        Ok(())
    }
}

impl Puzzle for Elevator {
    fn kind(&self) -> PuzzleKind {
        PuzzleKind::Elevator
    }

    fn run(&self, trials: u64, rng: &mut StdRng) -> Result<Vec<Estimate>> {
        let slug = self.kind().slug();
        let h = self.height();

        let estimates = self
            .params
            .elevator_counts
            .iter()
            .map(|&elevators| {
                let mut going_down = ProportionEstimator::new();
                for _ in 0..trials {
                    let (_, down) = (0..elevators)
                        .map(|_| next_arrival(rng.random_range(0.0..2.0), h))
                        .fold((f64::INFINITY, false), |first, arrival| {
                            if arrival.0 < first.0 {
                                arrival
                            } else {
                                first
                            }
                        });
                    going_down.record(down);
                }

                tracing::debug!(
                    "elevator floors={} gamow={} elevators={}: {:.6}",
                    self.params.floors,
                    self.params.gamow_floor,
                    elevators,
                    going_down.estimate()
                );
                going_down.into_estimate(
                    slug,
                    format!("elevators={}", elevators),
                    Some(self.analytical(elevators)),
                )
            })
            .collect();

        Ok(estimates)
    }
}
