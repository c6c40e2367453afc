use super::{BlockLayout, LotteryRule, NumberRange, PrizeTier};
use crate::criteria::Criteria;
use crate::error::{LotoError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Read-only set of lottery rules, built once and shared by reference.
#[derive(Debug, Clone)]
pub struct RuleCatalog {
    rules: BTreeMap<String, LotteryRule>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    Wrapped { lotteries: Vec<LotteryRule> },
    List(Vec<LotteryRule>),
}

impl RuleCatalog {
    pub fn new(rules: Vec<LotteryRule>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for rule in rules {
            rule.check()?;
            if map.contains_key(&rule.id) {
                return Err(LotoError::config(format!(
                    "Lottery '{}' is defined twice",
                    rule.id
                )));
            }
            map.insert(rule.id.clone(), rule);
        }

        if map.is_empty() {
            return Err(LotoError::config("Catalog contains no lottery"));
        }

        Ok(Self { rules: map })
    }

    /// Grande Vie, Lotto Max and Lotto 6/49.
    pub fn builtin() -> Self {
        let rules = [grande_vie(), lotto_max(), lotto_649()]
            .into_iter()
            .map(|rule| (rule.id.clone(), rule))
            .collect();
        Self { rules }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let rules = match serde_json::from_str::<CatalogFile>(json)? {
            CatalogFile::Wrapped { lotteries } => lotteries,
            CatalogFile::List(lotteries) => lotteries,
        };
        Self::new(rules)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&json)?;
        tracing::info!(
            "Loaded {} lotteries from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn get_rule(&self, lottery_id: &str) -> Result<&LotteryRule> {
        self.rules
            .get(lottery_id)
            .ok_or_else(|| LotoError::not_found(lottery_id))
    }

    pub fn rules(&self) -> impl Iterator<Item = &LotteryRule> {
        self.rules.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn count_tiers(picks: usize, lowest: usize) -> Vec<PrizeTier> {
    (lowest..=picks)
        .rev()
        .map(|n| PrizeTier::new(format!("{}/{}", n, picks), n))
        .collect()
}

fn grande_vie() -> LotteryRule {
    let splits = vec![(3, 2), (2, 3), (4, 1), (1, 4)];
    LotteryRule::new("grande-vie", "Grande Vie", NumberRange::new(1, 49), 5)
        .with_criteria(Criteria {
            parity_splits: splits.clone(),
            size_splits: splits,
            max_per_decade: 3,
            max_same_ending: 2,
            min_distinct_endings: 3,
            max_per_multiple: 4,
            sum_min: 80,
            sum_max: 179,
            max_runs: 2,
            max_run_len: 3,
        })
        .with_blocks(BlockLayout {
            base_per_block: 9,
            star_reuse: 1,
        })
        .with_prize_tiers(count_tiers(5, 2))
}

fn lotto_max() -> LotteryRule {
    let splits = vec![(4, 3), (3, 4), (5, 2), (2, 5)];
    LotteryRule::new("lotto-max", "Lotto Max", NumberRange::new(1, 50), 7)
        .with_criteria(Criteria {
            parity_splits: splits.clone(),
            size_splits: splits,
            max_per_decade: 4,
            max_same_ending: 3,
            min_distinct_endings: 4,
            max_per_multiple: 5,
            sum_min: 140,
            sum_max: 219,
            max_runs: 2,
            max_run_len: 3,
        })
        .with_blocks(BlockLayout {
            base_per_block: 7,
            star_reuse: 6,
        })
        .with_prize_tiers(count_tiers(7, 3))
}

fn lotto_649() -> LotteryRule {
    let splits = vec![(3, 3), (4, 2), (2, 4), (5, 1)];
    LotteryRule::new("649", "Lotto 6/49", NumberRange::new(1, 49), 6)
        .with_criteria(Criteria {
            parity_splits: splits.clone(),
            size_splits: splits,
            max_per_decade: 4,
            max_same_ending: 3,
            min_distinct_endings: 4,
            max_per_multiple: 5,
            sum_min: 100,
            sum_max: 199,
            max_runs: 2,
            max_run_len: 3,
        })
        .with_blocks(BlockLayout {
            base_per_block: 8,
            star_reuse: 5,
        })
        .with_prize_tiers(count_tiers(6, 2))
}
