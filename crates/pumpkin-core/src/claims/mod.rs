//! The set of claimed pumpkin numbers.
//!
//! Numbers run 1..=100. Values from outside the core (CLI arguments,
//! imported documents, stored JSON) become [`PumpkinNumber`]s at the
//! boundary, so everything past that point can assume the range holds.

mod celebration;

pub use celebration::CelebrationLatch;

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const MIN_NUMBER: u8 = 1;
pub const MAX_NUMBER: u8 = 100;
pub const TOTAL: usize = MAX_NUMBER as usize;

/// A pumpkin number in `1..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct PumpkinNumber(u8);

impl PumpkinNumber {
    pub fn new(n: i64) -> Result<Self, ValidationError> {
        if (i64::from(MIN_NUMBER)..=i64::from(MAX_NUMBER)).contains(&n) {
            Ok(Self(n as u8))
        } else {
            Err(ValidationError::OutOfRange {
                field: "pumpkin number".into(),
                value: n,
                min: MIN_NUMBER.into(),
                max: MAX_NUMBER.into(),
            })
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Every number from 1 to 100, ascending.
    pub fn all() -> impl Iterator<Item = PumpkinNumber> {
        (MIN_NUMBER..=MAX_NUMBER).map(PumpkinNumber)
    }
}

impl TryFrom<i64> for PumpkinNumber {
    type Error = ValidationError;

    fn try_from(n: i64) -> Result<Self, Self::Error> {
        Self::new(n)
    }
}

impl From<PumpkinNumber> for u8 {
    fn from(n: PumpkinNumber) -> Self {
        n.0
    }
}

impl fmt::Display for PumpkinNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PumpkinNumber {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n: i64 = s.trim().parse().map_err(|_| ValidationError::InvalidValue {
            field: "pumpkin number".into(),
            message: format!("'{s}' is not a whole number"),
        })?;
        Self::new(n)
    }
}

/// Claimed numbers, without duplicates or order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimedSet {
    numbers: BTreeSet<PumpkinNumber>,
}

impl ClaimedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set membership of `n` to `desired`. Returns whether the set changed.
    pub fn toggle(&mut self, n: PumpkinNumber, desired: bool) -> bool {
        if desired {
            self.numbers.insert(n)
        } else {
            self.numbers.remove(&n)
        }
    }

    pub fn clear(&mut self) {
        self.numbers.clear();
    }

    pub fn contains(&self, n: PumpkinNumber) -> bool {
        self.numbers.contains(&n)
    }

    pub fn count(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_complete(&self) -> bool {
        self.count() == TOTAL
    }

    /// Claimed numbers, ascending.
    pub fn sorted(&self) -> Vec<u8> {
        self.numbers.iter().map(|n| n.get()).collect()
    }

    /// Numbers the grid should show.
    pub fn visible(&self, only_unclaimed: bool) -> Vec<u8> {
        PumpkinNumber::all()
            .filter(|n| !only_unclaimed || !self.contains(*n))
            .map(PumpkinNumber::get)
            .collect()
    }

    pub fn next_unclaimed(&self) -> Option<PumpkinNumber> {
        PumpkinNumber::all().find(|n| !self.contains(*n))
    }
}

impl FromIterator<PumpkinNumber> for ClaimedSet {
    fn from_iter<I: IntoIterator<Item = PumpkinNumber>>(iter: I) -> Self {
        Self {
            numbers: iter.into_iter().collect(),
        }
    }
}
