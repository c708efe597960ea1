//! The five probability puzzles, each a self-contained Monte-Carlo experiment.

pub mod coin_game;
pub mod dishwasher;
pub mod elevator;
pub mod malt_shop;
pub mod parking;

use crate::domain::ports::Puzzle;
use crate::utils::error::{Result, SimError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub use coin_game::{CoinCase, CoinGame, CoinGameParams};
pub use dishwasher::{Dishwasher, DishwasherParams};
pub use elevator::{Elevator, ElevatorParams};
pub use malt_shop::{MaltShop, MaltShopParams, WaitCase};
pub use parking::{ParallelParking, ParkingParams};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PuzzleKind {
    Dishwasher,
    MaltShop,
    ParallelParking,
    CoinGame,
    Elevator,
}

impl PuzzleKind {
    pub const ALL: [PuzzleKind; 5] = [
        PuzzleKind::Dishwasher,
        PuzzleKind::MaltShop,
        PuzzleKind::ParallelParking,
        PuzzleKind::CoinGame,
        PuzzleKind::Elevator,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            PuzzleKind::Dishwasher => "dishwasher",
            PuzzleKind::MaltShop => "malt-shop",
            PuzzleKind::ParallelParking => "parking",
            PuzzleKind::CoinGame => "coin-game",
            PuzzleKind::Elevator => "elevator",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            PuzzleKind::Dishwasher => "The Clumsy Dishwasher",
            PuzzleKind::MaltShop => "Will Alice and Bob Meet at the Malt Shop?",
            PuzzleKind::ParallelParking => "A Parallel Parking Problem",
            PuzzleKind::CoinGame => "A Curious Coin Game",
            PuzzleKind::Elevator => "The Gamow-Stern Elevator Problem",
        }
    }

    pub fn default_seed(self) -> u64 {
        match self {
            PuzzleKind::Dishwasher => 1337,
            PuzzleKind::MaltShop => 23072022,
            PuzzleKind::ParallelParking => 24072022,
            PuzzleKind::CoinGame => 55283621,
            PuzzleKind::Elevator => 31072022,
        }
    }

    /// Parses a comma-separated list; `all` (or an empty list) selects every puzzle.
    pub fn parse_list<S: AsRef<str>>(names: &[S]) -> Result<Vec<PuzzleKind>> {
        let mut kinds = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() {
                continue;
            }
            if name.eq_ignore_ascii_case("all") {
                return Ok(Self::ALL.to_vec());
            }
            let kind: PuzzleKind = name.parse()?;
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        if kinds.is_empty() {
            return Ok(Self::ALL.to_vec());
        }
        Ok(kinds)
    }
}

impl fmt::Display for PuzzleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for PuzzleKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "dishwasher" | "clumsy-dishwasher" => Ok(PuzzleKind::Dishwasher),
            "malt-shop" | "maltshop" => Ok(PuzzleKind::MaltShop),
            "parking" | "parallel-parking" => Ok(PuzzleKind::ParallelParking),
            "coin-game" | "coins" => Ok(PuzzleKind::CoinGame),
            "elevator" | "gamow-stern" => Ok(PuzzleKind::Elevator),
            _ => Err(SimError::UnknownPuzzle {
                name: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for PuzzleKind {
    type Error = SimError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<PuzzleKind> for String {
    fn from(kind: PuzzleKind) -> Self {
        kind.slug().to_string()
    }
}

/// Parameters for every puzzle, each section defaulting independently.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PuzzleParams {
    pub dishwasher: DishwasherParams,
    pub malt_shop: MaltShopParams,
    pub parking: ParkingParams,
    pub coin_game: CoinGameParams,
    pub elevator: ElevatorParams,
}

impl PuzzleParams {
    pub fn build(&self, kind: PuzzleKind) -> Arc<dyn Puzzle> {
        match kind {
            PuzzleKind::Dishwasher => Arc::new(Dishwasher::new(self.dishwasher.clone())),
            PuzzleKind::MaltShop => Arc::new(MaltShop::new(self.malt_shop.clone())),
            PuzzleKind::ParallelParking => Arc::new(ParallelParking::new(self.parking.clone())),
            PuzzleKind::CoinGame => Arc::new(CoinGame::new(self.coin_game.clone())),
            PuzzleKind::Elevator => Arc::new(Elevator::new(self.elevator.clone())),
        }
    }

    /// Builds and validates the selected puzzles, keeping their order.
    pub fn build_all(&self, kinds: &[PuzzleKind]) -> Result<Vec<Arc<dyn Puzzle>>> {
        kinds
            .iter()
            .map(|&kind| {
                let puzzle = self.build(kind);
                puzzle.validate()?;
                Ok(puzzle)
            })
            .collect()
    }
}
