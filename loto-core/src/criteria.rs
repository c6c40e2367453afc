//! Statistical filters applied to candidate combinations.
//!
//! Each test mirrors a pattern observed in real draws: balanced parity, a
//! balanced small/large split around the historical median, few consecutive
//! runs, spread across decades, a realistic sum, varied last digits and few
//! shared multiples.

use crate::error::{LotoError, Result};
use crate::types::Combination;
use serde::{Deserialize, Serialize};

fn default_max_runs() -> usize {
    2
}

fn default_max_run_len() -> usize {
    3
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Criteria {
    /// Allowed `(even, odd)` counts.
    pub parity_splits: Vec<(usize, usize)>,
    /// Allowed `(small, large)` counts, small meaning `<= median`.
    pub size_splits: Vec<(usize, usize)>,
    pub max_per_decade: usize,
    pub max_same_ending: usize,
    pub min_distinct_endings: usize,
    pub max_per_multiple: usize,
    pub sum_min: u32,
    pub sum_max: u32,
    #[serde(default = "default_max_runs")]
    pub max_runs: usize,
    #[serde(default = "default_max_run_len")]
    pub max_run_len: usize,
}

impl Criteria {
    pub(crate) fn check(&self, lottery_id: &str) -> Result<()> {
        if self.sum_min > self.sum_max {
            return Err(LotoError::config(format!(
                "Lottery '{}': sum range {}..={} is empty",
                lottery_id, self.sum_min, self.sum_max
            )));
        }
        if self.parity_splits.is_empty() || self.size_splits.is_empty() {
            return Err(LotoError::config(format!(
                "Lottery '{}': criteria need at least one parity and one size split",
                lottery_id
            )));
        }
        Ok(())
    }

    /// Binds the criteria to the median used by the small/large test.
    pub fn with_median(&self, median: u8) -> CriteriaContext<'_> {
        CriteriaContext {
            criteria: self,
            median,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CriteriaContext<'a> {
    criteria: &'a Criteria,
    median: u8,
}

impl<'a> CriteriaContext<'a> {
    pub fn audit(&self, combination: &Combination) -> CriteriaAudit {
        let c = self.criteria;
        let numbers = combination.numbers();
        let total = combination.sum();

        let even = numbers.iter().filter(|&&n| n % 2 == 0).count();
        let small = numbers.iter().filter(|&&n| n <= self.median).count();

        CriteriaAudit {
            parity: c.parity_splits.contains(&(even, numbers.len() - even)),
            size: c.size_splits.contains(&(small, numbers.len() - small)),
            runs: runs_within(numbers, c.max_runs, c.max_run_len),
            decades: max_bucket(numbers.iter().map(|&n| usize::from(n.saturating_sub(1) / 10)))
                <= c.max_per_decade,
            sum: c.sum_min <= total && total <= c.sum_max,
            same_ending: max_bucket(numbers.iter().map(|&n| usize::from(n % 10)))
                <= c.max_same_ending,
            endings: distinct_endings(numbers) >= c.min_distinct_endings,
            multiples: (2..=9u8)
                .all(|m| numbers.iter().filter(|&&n| n % m == 0).count() <= c.max_per_multiple),
            total,
        }
    }

    pub fn passes(&self, combination: &Combination) -> bool {
        self.audit(combination).passes()
    }
}

/// Outcome of every criteria test for one combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriteriaAudit {
    pub parity: bool,
    pub size: bool,
    pub runs: bool,
    pub decades: bool,
    pub sum: bool,
    pub same_ending: bool,
    pub endings: bool,
    pub multiples: bool,
    pub total: u32,
}

impl CriteriaAudit {
    pub fn passes(&self) -> bool {
        self.parity
            && self.size
            && self.runs
            && self.decades
            && self.sum
            && self.same_ending
            && self.endings
            && self.multiples
    }

    /// Labels of the failed tests, in display order.
    pub fn failures(&self) -> Vec<&'static str> {
        [
            ("parity", self.parity),
            ("size", self.size),
            ("runs", self.runs),
            ("decades", self.decades),
            ("sum", self.sum),
            ("same ending", self.same_ending),
            ("endings", self.endings),
            ("multiples", self.multiples),
        ]
        .into_iter()
        .filter(|(_, ok)| !ok)
        .map(|(label, _)| label)
        .collect()
    }
}

// `numbers` is sorted
fn runs_within(numbers: &[u8], max_runs: usize, max_len: usize) -> bool {
    let mut runs = 0;
    let mut i = 0;
    while i + 1 < numbers.len() {
        if numbers[i].checked_add(1) == Some(numbers[i + 1]) {
            let mut j = i + 1;
            while j + 1 < numbers.len() && numbers[j].checked_add(1) == Some(numbers[j + 1]) {
                j += 1;
            }
            if j - i + 1 > max_len {
                return false;
            }
            runs += 1;
            i = j;
        } else {
            i += 1;
        }
    }
    runs <= max_runs
}

fn max_bucket(keys: impl Iterator<Item = usize>) -> usize {
    let mut buckets = [0usize; 26];
    for key in keys {
        buckets[key.min(25)] += 1;
    }
    buckets.into_iter().max().unwrap_or(0)
}

fn distinct_endings(numbers: &[u8]) -> usize {
    let mut seen = [false; 10];
    for &n in numbers {
        seen[usize::from(n % 10)] = true;
    }
    seen.iter().filter(|&&s| s).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn criteria() -> Criteria {
        Criteria {
            parity_splits: vec![(3, 3), (4, 2), (2, 4), (5, 1)],
            size_splits: vec![(3, 3), (4, 2), (2, 4), (5, 1)],
            max_per_decade: 4,
            max_same_ending: 3,
            min_distinct_endings: 4,
            max_per_multiple: 5,
            sum_min: 100,
            sum_max: 199,
            max_runs: 2,
            max_run_len: 3,
        }
    }

    #[test]
    fn test_balanced_combination_passes() {
        let criteria = criteria();
        let ctx = criteria.with_median(25);
        let audit = ctx.audit(&Combination::from_numbers([3, 14, 22, 27, 35, 41]));

        assert!(audit.passes(), "failed: {:?}", audit.failures());
        assert_eq!(audit.total, 142);
    }

    #[test]
    fn test_each_failure() {
        let criteria = criteria();
        let ctx = criteria.with_median(25);

        // all even
        let audit = ctx.audit(&Combination::from_numbers([2, 14, 22, 28, 36, 40]));
        assert!(!audit.parity);

        // long run
        let audit = ctx.audit(&Combination::from_numbers([20, 21, 22, 23, 35, 41]));
        assert!(!audit.runs);

        // too many runs of two
        let audit = ctx.audit(&Combination::from_numbers([10, 11, 20, 21, 30, 31]));
        assert!(!audit.runs);

        // sum too small
        let audit = ctx.audit(&Combination::from_numbers([1, 2, 4, 7, 9, 13]));
        assert!(!audit.sum);
        assert!(!audit.size);

        // same decade
        let audit = ctx.audit(&Combination::from_numbers([11, 13, 15, 17, 19, 40]));
        assert!(!audit.decades);

        // same ending
        let audit = ctx.audit(&Combination::from_numbers([1, 11, 21, 31, 42, 46]));
        assert!(!audit.same_ending);
        assert!(audit.failures().contains(&"same ending"));
    }

    #[test]
    fn test_runs_boundaries() {
        assert!(runs_within(&[1, 2, 3, 10, 20], 2, 3));
        assert!(!runs_within(&[1, 2, 3, 4, 20], 2, 3));
        assert!(runs_within(&[254, 255], 2, 3));
    }
}
