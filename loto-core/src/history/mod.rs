pub mod import;

pub use import::{parse_history, ParsedDraw, ParsedHistory};

use crate::error::{LotoError, Result};
use crate::rules::NumberRange;
use crate::types::{Combination, Draw};
use std::collections::HashSet;

/// Append-only draw history of one lottery, ordered by sequence id.
#[derive(Debug, Clone, Default)]
pub struct History {
    draws: Vec<Draw>,
    index: HashSet<Combination>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_draws(mut draws: Vec<Draw>) -> Result<Self> {
        draws.sort_by_key(|d| d.sequence);
        let mut history = Self::new();
        for draw in draws {
            history.append(draw)?;
        }
        Ok(history)
    }

    pub fn append(&mut self, draw: Draw) -> Result<()> {
        if let Some(last) = self.last_sequence() {
            if draw.sequence <= last {
                return Err(LotoError::conflict(format!(
                    "draw sequence {} must be greater than {}",
                    draw.sequence, last
                )));
            }
        }
        self.index.insert(draw.combination.clone());
        self.draws.push(draw);
        Ok(())
    }

    pub fn draws(&self) -> &[Draw] {
        &self.draws
    }

    pub fn len(&self) -> usize {
        self.draws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    pub fn last_sequence(&self) -> Option<u64> {
        self.draws.last().map(|d| d.sequence)
    }

    pub fn next_sequence(&self) -> u64 {
        self.last_sequence().map_or(1, |s| s + 1)
    }

    /// Exact set + special-ball equality with some recorded draw.
    pub fn contains(&self, combination: &Combination) -> bool {
        self.index.contains(combination)
    }

    pub fn combinations(&self) -> impl Iterator<Item = &Combination> {
        self.index.iter()
    }

    /// Middle value of every drawn number; the range midpoint when empty.
    pub fn median(&self, range: NumberRange) -> u8 {
        let mut all: Vec<u8> = self
            .draws
            .iter()
            .flat_map(|d| d.combination.numbers().iter().copied())
            .collect();
        if all.is_empty() {
            return range.midpoint();
        }
        let mid = all.len() / 2;
        *all.select_nth_unstable(mid).1
    }
}
