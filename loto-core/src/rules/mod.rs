pub mod catalog;

pub use catalog::RuleCatalog;

use crate::criteria::Criteria;
use crate::error::{LotoError, Result};
use crate::types::Combination;
use serde::{Deserialize, Serialize};

/// Inclusive number range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberRange {
    pub min: u8,
    pub max: u8,
}

impl NumberRange {
    pub const fn new(min: u8, max: u8) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, n: u8) -> bool {
        self.min <= n && n <= self.max
    }

    pub fn size(&self) -> usize {
        if self.max < self.min {
            0
        } else {
            usize::from(self.max - self.min) + 1
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> {
        self.min..=self.max
    }

    /// Midpoint, used as the small/large split when no history exists.
    pub fn midpoint(&self) -> u8 {
        ((u16::from(self.min) + u16::from(self.max)) / 2) as u8
    }
}

/// Layout of a covering block: `base_per_block` disjoint base combinations
/// followed by one star combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockLayout {
    pub base_per_block: usize,
    pub star_reuse: usize,
}

impl BlockLayout {
    pub fn block_len(&self) -> usize {
        self.base_per_block + 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizeTier {
    pub label: String,
    pub numbers: usize,
    #[serde(default)]
    pub special: bool,
}

impl PrizeTier {
    pub fn new(label: impl Into<String>, numbers: usize) -> Self {
        Self {
            label: label.into(),
            numbers,
            special: false,
        }
    }

    pub fn with_special(mut self) -> Self {
        self.special = true;
        self
    }
}

fn default_distinct() -> bool {
    true
}

/// Constraints that make a combination valid for one lottery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LotteryRule {
    pub id: String,
    pub name: String,
    pub range: NumberRange,
    pub picks: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special: Option<NumberRange>,
    #[serde(default = "default_distinct")]
    pub distinct: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criteria: Option<Criteria>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocks: Option<BlockLayout>,
    /// Ordered best first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prize_tiers: Vec<PrizeTier>,
}

impl LotteryRule {
    pub fn new(id: impl Into<String>, name: impl Into<String>, range: NumberRange, picks: usize) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            range,
            picks,
            special: None,
            distinct: true,
            criteria: None,
            blocks: None,
            prize_tiers: Vec::new(),
        }
    }

    pub fn with_special(mut self, special: NumberRange) -> Self {
        self.special = Some(special);
        self
    }

    pub fn with_criteria(mut self, criteria: Criteria) -> Self {
        self.criteria = Some(criteria);
        self
    }

    pub fn with_blocks(mut self, blocks: BlockLayout) -> Self {
        self.blocks = Some(blocks);
        self
    }

    pub fn with_prize_tiers(mut self, tiers: Vec<PrizeTier>) -> Self {
        self.prize_tiers = tiers;
        self
    }

    /// Sanity checks on the rule itself, run when a catalog is built.
    pub fn check(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(LotoError::config("Lottery id cannot be empty"));
        }
        if self.range.size() == 0 {
            return Err(LotoError::config(format!(
                "Lottery '{}': empty number range {}..={}",
                self.id, self.range.min, self.range.max
            )));
        }
        if self.picks == 0 {
            return Err(LotoError::config(format!(
                "Lottery '{}': picks must be greater than 0",
                self.id
            )));
        }
        if self.distinct && self.picks > self.range.size() {
            return Err(LotoError::config(format!(
                "Lottery '{}': cannot pick {} distinct numbers from {}",
                self.id,
                self.picks,
                self.range.size()
            )));
        }
        if let Some(special) = self.special {
            if special.size() == 0 {
                return Err(LotoError::config(format!(
                    "Lottery '{}': empty special-ball range",
                    self.id
                )));
            }
        }
        if let Some(blocks) = self.blocks {
            if blocks.base_per_block == 0 || blocks.base_per_block * self.picks > self.range.size() {
                return Err(LotoError::config(format!(
                    "Lottery '{}': {} disjoint base combinations do not fit the range",
                    self.id, blocks.base_per_block
                )));
            }
            if blocks.star_reuse > self.picks {
                return Err(LotoError::config(format!(
                    "Lottery '{}': star cannot reuse {} of {} numbers",
                    self.id, blocks.star_reuse, self.picks
                )));
            }
        }
        if let Some(criteria) = &self.criteria {
            criteria.check(&self.id)?;
        }
        Ok(())
    }

    /// Checks range, count, uniqueness and special-ball presence.
    pub fn validate(&self, combination: &Combination) -> Result<()> {
        if combination.len() != self.picks {
            return Err(LotoError::invalid_combination(format!(
                "{} expects {} numbers, got {}",
                self.name,
                self.picks,
                combination.len()
            )));
        }

        if let Some(&n) = combination
            .numbers()
            .iter()
            .find(|&&n| !self.range.contains(n))
        {
            return Err(LotoError::invalid_combination(format!(
                "{} is outside {}..={}",
                n, self.range.min, self.range.max
            )));
        }

        if self.distinct && combination.has_repeats() {
            return Err(LotoError::invalid_combination(
                "numbers within a ticket must be distinct",
            ));
        }

        match (self.special, combination.special()) {
            (Some(range), Some(ball)) if !range.contains(ball) => {
                Err(LotoError::invalid_combination(format!(
                    "special ball {} is outside {}..={}",
                    ball, range.min, range.max
                )))
            }
            (Some(_), None) => Err(LotoError::invalid_combination(format!(
                "{} requires a special ball",
                self.name
            ))),
            (None, Some(_)) => Err(LotoError::invalid_combination(format!(
                "{} has no special ball",
                self.name
            ))),
            _ => Ok(()),
        }
    }

    pub fn is_valid(&self, combination: &Combination) -> bool {
        self.validate(combination).is_ok()
    }

    /// Number of distinct valid combinations, saturating at `u128::MAX`.
    pub fn space_size(&self) -> u128 {
        let n = self.range.size() as u128;
        let k = self.picks as u128;
        let main = if self.distinct {
            binomial(n, k)
        } else {
            binomial(n + k - 1, k)
        };
        let specials = self.special.map_or(1, |s| s.size() as u128);
        main.saturating_mul(specials)
    }

    /// First tier reached by `matched` numbers and the special-ball result.
    pub fn prize_tier(&self, matched: usize, special_matched: bool) -> Option<&PrizeTier> {
        self.prize_tiers
            .iter()
            .find(|tier| matched >= tier.numbers && (!tier.special || special_matched))
    }
}

fn binomial(n: u128, k: u128) -> u128 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut result: u128 = 1;
    for i in 0..k {
        result = match result.checked_mul(n - i) {
            Some(v) => v / (i + 1),
            None => return u128::MAX,
        };
    }
    result
}
