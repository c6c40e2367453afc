pub mod blocks;

pub use blocks::{generate_blocks, GeneratedBlock};

use crate::criteria::CriteriaContext;
use crate::error::{LotoError, Result};
use crate::history::History;
use crate::rules::LotteryRule;
use crate::types::Combination;
use rand::seq::{index, SliceRandom};
use rand::Rng;
use std::collections::HashSet;

/// Candidate draws allowed per requested combination before giving up.
pub const DEFAULT_MAX_ATTEMPTS: usize = 10_000;

/// Below this many free combinations the whole space is enumerated instead
/// of sampled.
const ENUMERATION_LIMIT: u128 = 50_000;

#[derive(Debug, Clone, Copy)]
pub struct GenerationOptions<'a> {
    /// Never produce a combination equal to one of these draws.
    pub avoid_history: Option<&'a History>,
    /// Extra combinations to avoid, such as earlier proposals.
    pub exclude: Option<&'a HashSet<Combination>>,
    /// Only keep candidates passing the statistical criteria.
    pub criteria: Option<CriteriaContext<'a>>,
    pub max_attempts: usize,
}

impl Default for GenerationOptions<'_> {
    fn default() -> Self {
        Self {
            avoid_history: None,
            exclude: None,
            criteria: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl<'a> GenerationOptions<'a> {
    pub fn avoiding(history: &'a History) -> Self {
        Self {
            avoid_history: Some(history),
            ..Self::default()
        }
    }

    fn is_excluded(&self, combination: &Combination) -> bool {
        self.avoid_history.is_some_and(|h| h.contains(combination))
            || self.exclude.is_some_and(|e| e.contains(combination))
    }

    fn accepts(&self, combination: &Combination) -> bool {
        !self.is_excluded(combination) && self.criteria.map_or(true, |c| c.passes(combination))
    }

    /// Distinct valid combinations ruled out before any sampling.
    fn excluded_count(&self, rule: &LotteryRule) -> usize {
        let mut excluded: HashSet<&Combination> = HashSet::new();
        if let Some(history) = self.avoid_history {
            excluded.extend(history.combinations());
        }
        if let Some(extra) = self.exclude {
            excluded.extend(extra.iter());
        }
        excluded.into_iter().filter(|c| rule.is_valid(c)).count()
    }
}

/// Produces `count` distinct valid combinations, none equal to a draw of
/// `avoid_history` when given.
pub fn generate<R: Rng>(
    rule: &LotteryRule,
    count: usize,
    avoid_history: Option<&History>,
    rng: &mut R,
) -> Result<Vec<Combination>> {
    let options = GenerationOptions {
        avoid_history,
        ..GenerationOptions::default()
    };
    generate_with(rule, count, &options, rng)
}

pub fn generate_with<R: Rng>(
    rule: &LotteryRule,
    count: usize,
    options: &GenerationOptions<'_>,
    rng: &mut R,
) -> Result<Vec<Combination>> {
    let available = rule
        .space_size()
        .saturating_sub(options.excluded_count(rule) as u128);

    if count as u128 > available {
        tracing::warn!(
            "Cannot generate {} combinations for '{}': {} available",
            count,
            rule.id,
            available
        );
        return Err(LotoError::GenerationExhausted {
            requested: count,
            available,
        });
    }

    if count == 0 {
        return Ok(Vec::new());
    }

    if available <= ENUMERATION_LIMIT && count as u128 * 2 > available {
        return pick_from_space(rule, count, options, rng);
    }

    let budget = options.max_attempts.max(1).saturating_mul(count);
    let mut seen = HashSet::with_capacity(count);
    let mut out = Vec::with_capacity(count);
    let mut attempts = 0;

    while out.len() < count {
        if attempts >= budget {
            tracing::warn!(
                "Gave up on '{}' after {} attempts with {}/{} combinations",
                rule.id,
                attempts,
                out.len(),
                count
            );
            return Err(LotoError::GenerationExhausted {
                requested: count,
                available: out.len() as u128,
            });
        }
        attempts += 1;

        let candidate = random_combination(rule, rng);
        if options.accepts(&candidate) && seen.insert(candidate.clone()) {
            out.push(candidate);
        }
    }

    tracing::debug!(
        "Generated {} combinations for '{}' in {} attempts",
        count,
        rule.id,
        attempts
    );
    Ok(out)
}

/// Uniform draw over the rule's valid space.
pub fn random_combination<R: Rng>(rule: &LotteryRule, rng: &mut R) -> Combination {
    let numbers = if rule.distinct {
        index::sample(rng, rule.range.size(), rule.picks)
            .into_iter()
            .map(|i| rule.range.min + i as u8)
            .collect()
    } else {
        // stars and bars: k distinct slots out of n + k - 1 map onto one multiset
        let mut slots = index::sample(rng, rule.range.size() + rule.picks - 1, rule.picks).into_vec();
        slots.sort_unstable();
        slots
            .into_iter()
            .enumerate()
            .map(|(i, slot)| rule.range.min + (slot - i) as u8)
            .collect()
    };
    Combination::new(numbers, random_special(rule, rng))
}

pub(crate) fn random_special<R: Rng>(rule: &LotteryRule, rng: &mut R) -> Option<u8> {
    rule.special.map(|s| rng.gen_range(s.min..=s.max))
}

fn pick_from_space<R: Rng>(
    rule: &LotteryRule,
    count: usize,
    options: &GenerationOptions<'_>,
    rng: &mut R,
) -> Result<Vec<Combination>> {
    let mut candidates: Vec<Combination> = enumerate_space(rule)
        .into_iter()
        .filter(|c| options.accepts(c))
        .collect();

    if candidates.len() < count {
        return Err(LotoError::GenerationExhausted {
            requested: count,
            available: candidates.len() as u128,
        });
    }

    let (picked, _) = candidates.partial_shuffle(rng, count);
    Ok(picked.to_vec())
}

/// Every valid combination of a small rule.
pub(crate) fn enumerate_space(rule: &LotteryRule) -> Vec<Combination> {
    let values: Vec<u8> = rule.range.iter().collect();
    let mut sets = Vec::new();
    collect_sets(&values, rule.picks, rule.distinct, 0, &mut Vec::new(), &mut sets);

    match rule.special {
        None => sets
            .into_iter()
            .map(|numbers| Combination::new(numbers, None))
            .collect(),
        Some(special) => sets
            .into_iter()
            .flat_map(|numbers| {
                special
                    .iter()
                    .map(move |s| Combination::new(numbers.clone(), Some(s)))
            })
            .collect(),
    }
}

fn collect_sets(
    values: &[u8],
    k: usize,
    distinct: bool,
    start: usize,
    current: &mut Vec<u8>,
    out: &mut Vec<Vec<u8>>,
) {
    if current.len() == k {
        out.push(current.clone());
        return;
    }
    for i in start..values.len() {
        current.push(values[i]);
        collect_sets(values, k, distinct, if distinct { i + 1 } else { i }, current, out);
        current.pop();
    }
}
