//! Covering blocks: disjoint base combinations plus one star combination.
//!
//! The base combinations of a block never share a number, so together they
//! cover most of the range. The star is built from the numbers the base left
//! unused, topped up with numbers reused from the base.

use super::{random_special, GenerationOptions};
use crate::error::{LotoError, Result};
use crate::rules::LotteryRule;
use crate::types::Combination;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::collections::HashSet;

const BLOCK_ATTEMPTS: usize = 800;
const BASE_ATTEMPTS: usize = 400;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedBlock {
    /// 1-based.
    pub index: usize,
    pub base: Vec<Combination>,
    pub star: Combination,
}

impl GeneratedBlock {
    pub fn combinations(&self) -> impl Iterator<Item = &Combination> {
        self.base.iter().chain(std::iter::once(&self.star))
    }
}

pub fn generate_blocks<R: Rng>(
    rule: &LotteryRule,
    blocks: usize,
    options: &GenerationOptions<'_>,
    rng: &mut R,
) -> Result<Vec<GeneratedBlock>> {
    let layout = rule.blocks.ok_or_else(|| {
        LotoError::invalid_request(format!("{} has no block layout", rule.name))
    })?;
    if !rule.distinct {
        return Err(LotoError::invalid_request(format!(
            "{} allows repeated numbers; covering blocks need distinct ones",
            rule.name
        )));
    }

    let mut batch: HashSet<Combination> = HashSet::new();
    let mut out = Vec::with_capacity(blocks);

    for index in 1..=blocks {
        let block = (0..BLOCK_ATTEMPTS)
            .find_map(|_| try_block(rule, layout.base_per_block, layout.star_reuse, options, &batch, rng));

        let Some(base_and_star) = block else {
            tracing::warn!(
                "Block {} for '{}' failed after {} attempts",
                index,
                rule.id,
                BLOCK_ATTEMPTS
            );
            return Err(LotoError::GenerationExhausted {
                requested: blocks * layout.block_len(),
                available: batch.len() as u128,
            });
        };

        let (base, star) = base_and_star;
        batch.extend(base.iter().cloned());
        batch.insert(star.clone());
        tracing::debug!("Block {} generated for '{}'", index, rule.id);
        out.push(GeneratedBlock { index, base, star });
    }

    Ok(out)
}

fn try_block<R: Rng>(
    rule: &LotteryRule,
    base_per_block: usize,
    star_reuse: usize,
    options: &GenerationOptions<'_>,
    batch: &HashSet<Combination>,
    rng: &mut R,
) -> Option<(Vec<Combination>, Combination)> {
    let accepts = |candidate: &Combination, base: &[Combination]| {
        rule.is_valid(candidate)
            && options.accepts(candidate)
            && !batch.contains(candidate)
            && !base.contains(candidate)
    };

    let mut pool: Vec<u8> = rule.range.iter().collect();
    pool.shuffle(rng);

    let mut base: Vec<Combination> = Vec::with_capacity(base_per_block);
    for _ in 0..base_per_block {
        let mut found = None;
        for _ in 0..BASE_ATTEMPTS {
            if pool.len() < rule.picks {
                return None;
            }
            let numbers: Vec<u8> = pool.choose_multiple(rng, rule.picks).copied().collect();
            let candidate = Combination::new(numbers, random_special(rule, rng));
            if accepts(&candidate, &base) {
                found = Some(candidate);
                break;
            }
        }
        let chosen = found?;
        pool.retain(|&n| !chosen.contains(n));
        base.push(chosen);
    }

    let used: Vec<u8> = base
        .iter()
        .flat_map(|c| c.numbers().iter().copied())
        .collect();
    let reuse = rule.picks.saturating_sub(pool.len()).max(star_reuse);
    let fresh = rule.picks - reuse;
    if reuse > used.len() || fresh > pool.len() {
        return None;
    }

    let mut numbers: Vec<u8> = used.choose_multiple(rng, reuse).copied().collect();
    numbers.extend(pool.choose_multiple(rng, fresh).copied());
    let star = Combination::new(numbers, random_special(rule, rng));

    accepts(&star, &base).then_some((base, star))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::History;
    use crate::rules::{NumberRange, RuleCatalog};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_blocks_for_builtin_lotteries() {
        let catalog = RuleCatalog::builtin();
        let mut rng = StdRng::seed_from_u64(2024);

        for rule in catalog.rules() {
            let layout = rule.blocks.unwrap();
            let blocks = generate_blocks(rule, 2, &GenerationOptions::default(), &mut rng).unwrap();
            assert_eq!(blocks.len(), 2);

            for block in &blocks {
                assert_eq!(block.base.len(), layout.base_per_block);

                let mut seen = HashSet::new();
                for combination in &block.base {
                    rule.validate(combination).unwrap();
                    for &n in combination.numbers() {
                        assert!(seen.insert(n), "number {} repeated in base", n);
                    }
                }

                rule.validate(&block.star).unwrap();
                let reused = block.star.numbers().iter().filter(|n| seen.contains(n)).count();
                assert!(reused >= layout.star_reuse);
            }

            let all: HashSet<_> = blocks.iter().flat_map(|b| b.combinations()).collect();
            assert_eq!(all.len(), 2 * layout.block_len());
        }
    }

    #[test]
    fn test_blocks_apply_criteria_and_history() {
        let catalog = RuleCatalog::builtin();
        let rule = catalog.get_rule("grande-vie").unwrap();
        let history = History::new();
        let criteria = rule.criteria.as_ref().unwrap().with_median(25);
        let options = GenerationOptions {
            avoid_history: Some(&history),
            criteria: Some(criteria),
            ..GenerationOptions::default()
        };

        let mut rng = StdRng::seed_from_u64(5);
        let blocks = generate_blocks(rule, 1, &options, &mut rng).unwrap();
        assert!(blocks[0].combinations().all(|c| criteria.passes(c)));
    }

    #[test]
    fn test_rule_without_layout() {
        let rule = LotteryRule::new("x", "X", NumberRange::new(1, 30), 5);
        let mut rng = StdRng::seed_from_u64(0);
        let err = generate_blocks(&rule, 1, &GenerationOptions::default(), &mut rng).unwrap_err();
        assert!(matches!(err, LotoError::InvalidRequest(_)));
    }
}
