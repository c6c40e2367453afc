use super::{verify, VerificationReport};
use crate::criteria::CriteriaAudit;
use crate::error::{ErrorPayload, LotoError, Result};
use crate::history::History;
use crate::rules::LotteryRule;
use crate::types::Combination;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockEntry {
    /// 0-based position in the submitted block.
    pub index: usize,
    pub combination: Combination,
    #[serde(flatten)]
    pub outcome: EntryOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum EntryOutcome {
    Verified { report: VerificationReport },
    Invalid { error: ErrorPayload },
    /// Every occurrence of a repeated combination, with all its positions.
    Duplicate { error: ErrorPayload, positions: Vec<usize> },
}

impl BlockEntry {
    pub fn report(&self) -> Option<&VerificationReport> {
        match &self.outcome {
            EntryOutcome::Verified { report } => Some(report),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorPayload> {
        match &self.outcome {
            EntryOutcome::Verified { .. } => None,
            EntryOutcome::Invalid { error } | EntryOutcome::Duplicate { error, .. } => Some(error),
        }
    }
}

/// Verifies a batch entry by entry. Invalid and repeated entries are reported
/// in place; the output keeps the input order and length.
pub fn verify_block(rule: &LotteryRule, block: &[Combination], history: &History) -> Vec<BlockEntry> {
    let validity: Vec<Result<()>> = block.iter().map(|c| rule.validate(c)).collect();

    let mut positions: HashMap<&Combination, Vec<usize>> = HashMap::new();
    for (index, combination) in block.iter().enumerate() {
        if validity[index].is_ok() {
            positions.entry(combination).or_default().push(index);
        }
    }

    block
        .iter()
        .zip(validity)
        .enumerate()
        .map(|(index, (combination, valid))| {
            let outcome = match valid {
                Err(err) => EntryOutcome::Invalid {
                    error: err.to_payload(),
                },
                Ok(()) => match positions.get(combination) {
                    Some(twins) if twins.len() > 1 => EntryOutcome::Duplicate {
                        error: LotoError::DuplicateInBlock {
                            positions: twins.clone(),
                        }
                        .to_payload(),
                        positions: twins.clone(),
                    },
                    _ => match verify(rule, combination, history) {
                        Ok(report) => EntryOutcome::Verified { report },
                        Err(err) => EntryOutcome::Invalid {
                            error: err.to_payload(),
                        },
                    },
                },
            };
            BlockEntry {
                index,
                combination: combination.clone(),
                outcome,
            }
        })
        .collect()
}

/// How well a block covers the number range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageSummary {
    pub star_index: usize,
    pub expected_len: Option<usize>,
    /// Numbers used by more than one base combination.
    pub repeated_numbers: Vec<u8>,
    pub star_reused: Vec<u8>,
    pub star_fresh: Vec<u8>,
    /// Range numbers used by neither the base nor the star.
    pub uncovered: Vec<u8>,
    pub invalid_entries: Vec<usize>,
    /// One audit per entry, in block order. Empty when the lottery has no
    /// criteria.
    pub audits: Vec<CriteriaAudit>,
    pub conforming: bool,
}

/// Analyses a covering block. The star defaults to the last entry. Criteria
/// are judged against the median of `history`, as in [`verify`].
pub fn analyze_coverage(
    rule: &LotteryRule,
    block: &[Combination],
    star_index: Option<usize>,
    history: &History,
) -> Result<CoverageSummary> {
    if block.is_empty() {
        return Err(LotoError::invalid_request("block is empty"));
    }
    let star_index = star_index.unwrap_or(block.len() - 1);
    let star = block.get(star_index).ok_or_else(|| {
        LotoError::invalid_request(format!(
            "star index {} is outside a block of {}",
            star_index,
            block.len()
        ))
    })?;

    let mut counts: BTreeMap<u8, usize> = BTreeMap::new();
    for (_, combination) in block.iter().enumerate().filter(|(i, _)| *i != star_index) {
        for &n in combination.numbers() {
            *counts.entry(n).or_default() += 1;
        }
    }
    let base_numbers: BTreeSet<u8> = counts.keys().copied().collect();
    let star_numbers: BTreeSet<u8> = star.numbers().iter().copied().collect();

    let repeated_numbers: Vec<u8> = counts
        .iter()
        .filter(|(_, &count)| count > 1)
        .map(|(&n, _)| n)
        .collect();
    let star_reused: Vec<u8> = star_numbers.intersection(&base_numbers).copied().collect();
    let star_fresh: Vec<u8> = star_numbers.difference(&base_numbers).copied().collect();
    let uncovered: Vec<u8> = rule
        .range
        .iter()
        .filter(|n| !base_numbers.contains(n) && !star_numbers.contains(n))
        .collect();
    let invalid_entries: Vec<usize> = block
        .iter()
        .enumerate()
        .filter(|(_, c)| !rule.is_valid(c))
        .map(|(i, _)| i)
        .collect();

    let audits: Vec<CriteriaAudit> = match &rule.criteria {
        Some(criteria) => {
            let ctx = criteria.with_median(history.median(rule.range));
            block.iter().map(|c| ctx.audit(c)).collect()
        }
        None => Vec::new(),
    };

    let expected_len = rule.blocks.map(|layout| layout.block_len());
    let star_reuse = rule.blocks.map_or(0, |layout| layout.star_reuse);
    let conforming = repeated_numbers.is_empty()
        && invalid_entries.is_empty()
        && star_reused.len() >= star_reuse
        && expected_len.map_or(true, |len| len == block.len())
        && audits.iter().all(CriteriaAudit::passes);

    Ok(CoverageSummary {
        star_index,
        expected_len,
        repeated_numbers,
        star_reused,
        star_fresh,
        uncovered,
        invalid_entries,
        audits,
        conforming,
    })
}
