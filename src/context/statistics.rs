// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Run statistics
//!
//! Counters live in the context and are incremented by the scorer, the
//! skeleton search and the orientation rules.

use std::fmt;
use strum::EnumCount;
use strum_macros::{EnumCount as EnumCountMacro, EnumIter, IntoStaticStr};

#[derive(EnumCountMacro, EnumIter, IntoStaticStr, Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum Counter {
    LocalScores,
    CacheHits,
    IndependenceTests,
    Moves,
    BookmarkRestores,
    RuleFirings,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Statistics {
    stats: [u64; Counter::COUNT],
}

impl Statistics {
    pub fn new() -> Self {
        Statistics::default()
    }

    /// Increment the specified counter by 1.
    pub fn increment(&mut self, counter: Counter) {
        self.stats[counter as usize] += 1;
    }

    pub fn add(&mut self, counter: Counter, amount: u64) {
        self.stats[counter as usize] += amount;
    }

    /// Get the current value of the specified counter.
    pub fn get(&self, counter: Counter) -> u64 {
        self.stats[counter as usize]
    }

    /// Fold another run's counts into these.
    pub fn merge(&mut self, other: &Statistics) {
        for (mine, theirs) in self.stats.iter_mut().zip(other.stats.iter()) {
            *mine += theirs;
        }
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use strum::IntoEnumIterator;
        let parts: Vec<String> = Counter::iter()
            .map(|c| {
                let name: &'static str = c.into();
                format!("{name}={}", self.get(c))
            })
            .collect();
        write!(f, "{}", parts.join(" "))
    }
}
