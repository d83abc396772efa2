use std::ops::{Add, AddAssign};

use meridian_protocol::CityYields;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Yields {
    pub food: i32,
    pub production: i32,
    pub trade: i32,
    pub science: i32,
    pub gold: i32,
}

impl Add for Yields {
    type Output = Yields;

    fn add(self, other: Yields) -> Yields {
        Yields {
            food: self.food + other.food,
            production: self.production + other.production,
            trade: self.trade + other.trade,
            science: self.science + other.science,
            gold: self.gold + other.gold,
        }
    }
}

impl AddAssign for Yields {
    fn add_assign(&mut self, other: Yields) {
        *self = *self + other;
    }
}

impl Yields {
    /// Tile-work priority: food first, then production, then trade.
    pub fn work_score(&self) -> i32 {
        self.food * 3 + self.production * 2 + self.trade
    }

    pub fn to_city_yields(self) -> CityYields {
        CityYields {
            food: self.food,
            production: self.production,
            trade: self.trade,
        }
    }
}
