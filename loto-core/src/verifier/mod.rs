pub mod block;

pub use block::{analyze_coverage, verify_block, BlockEntry, CoverageSummary, EntryOutcome};

use crate::criteria::CriteriaAudit;
use crate::error::Result;
use crate::history::History;
use crate::rules::LotteryRule;
use crate::types::{Combination, Draw};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReport {
    pub lottery_id: String,
    pub combination: Combination,
    /// Best matching draw; absent when nothing matched at all.
    pub matched_draw: Option<Draw>,
    pub matched_count: usize,
    /// Some draw tied on `matched_count` carries the same special ball. It
    /// need not be `matched_draw`, which is always the most recent of the tie.
    pub special_matched: bool,
    pub prize_tier: Option<String>,
    /// The combination was drawn exactly, special ball included.
    pub exact_match: bool,
    pub draws_checked: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criteria: Option<CriteriaAudit>,
}

/// Checks `combination` against every draw and keeps the best match: most
/// numbers in common, most recent draw on ties.
pub fn verify(
    rule: &LotteryRule,
    combination: &Combination,
    history: &History,
) -> Result<VerificationReport> {
    rule.validate(combination)?;

    let best = history
        .draws()
        .iter()
        .map(|draw| (combination.matched(&draw.combination), draw))
        .max_by_key(|(matched, draw)| (*matched, draw.sequence));

    let (matched_count, special_matched, matched_draw) = match best {
        Some((matched, draw)) => {
            // any draw tied on count may carry the special ball
            let special = combination.special().is_some()
                && history.draws().iter().any(|d| {
                    d.combination.special() == combination.special()
                        && combination.matched(&d.combination) == matched
                });
            let draw = (matched > 0 || special).then(|| draw.clone());
            (matched, special, draw)
        }
        None => (0, false, None),
    };

    let criteria = rule
        .criteria
        .as_ref()
        .map(|c| c.with_median(history.median(rule.range)).audit(combination));

    Ok(VerificationReport {
        lottery_id: rule.id.clone(),
        combination: combination.clone(),
        matched_draw,
        matched_count,
        special_matched,
        prize_tier: rule
            .prize_tier(matched_count, special_matched)
            .map(|tier| tier.label.clone()),
        exact_match: history.contains(combination),
        draws_checked: history.len(),
        criteria,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LotoError;
    use crate::rules::{NumberRange, PrizeTier, RuleCatalog};

    fn six_of_49() -> LotteryRule {
        LotteryRule::new("649", "Lotto 6/49", NumberRange::new(1, 49), 6)
    }

    fn history(draws: &[(u64, [u8; 6])]) -> History {
        History::from_draws(
            draws
                .iter()
                .map(|(seq, numbers)| Draw::new(*seq, Combination::from_numbers(*numbers)))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_partial_match() {
        let history = history(&[(1, [1, 2, 3, 4, 5, 6])]);
        let report = verify(
            &six_of_49(),
            &Combination::from_numbers([1, 2, 3, 7, 8, 9]),
            &history,
        )
        .unwrap();

        assert_eq!(report.matched_count, 3);
        assert_eq!(report.matched_draw.unwrap().sequence, 1);
        assert!(!report.exact_match);
        assert_eq!(report.draws_checked, 1);
    }

    #[test]
    fn test_full_match() {
        let history = history(&[(1, [1, 2, 3, 4, 5, 6]), (2, [10, 20, 30, 40, 41, 42])]);
        let combination = Combination::from_numbers([42, 41, 40, 30, 20, 10]);
        let report = verify(&six_of_49(), &combination, &history).unwrap();

        assert_eq!(report.matched_count, 6);
        assert!(report.exact_match);
    }

    #[test]
    fn test_tie_prefers_most_recent() {
        let history = history(&[
            (1, [1, 2, 10, 11, 12, 13]),
            (4, [1, 2, 20, 21, 22, 23]),
            (2, [1, 2, 30, 31, 32, 33]),
        ]);
        let report = verify(
            &six_of_49(),
            &Combination::from_numbers([1, 2, 40, 41, 42, 43]),
            &history,
        )
        .unwrap();

        assert_eq!(report.matched_count, 2);
        assert_eq!(report.matched_draw.unwrap().sequence, 4);
    }

    #[test]
    fn test_no_match_and_empty_history() {
        let rule = six_of_49();
        let combination = Combination::from_numbers([1, 2, 3, 4, 5, 6]);

        let report = verify(&rule, &combination, &History::new()).unwrap();
        assert_eq!(report.matched_count, 0);
        assert!(report.matched_draw.is_none());

        let history = history(&[(1, [10, 11, 12, 13, 14, 15])]);
        let report = verify(&rule, &combination, &history).unwrap();
        assert!(report.matched_draw.is_none());
        assert!(report.prize_tier.is_none());
    }

    #[test]
    fn test_invalid_combination_rejected() {
        let history = history(&[(1, [1, 2, 3, 4, 5, 6])]);
        let err = verify(
            &six_of_49(),
            &Combination::from_numbers([1, 2, 3, 4, 5, 99]),
            &history,
        )
        .unwrap_err();
        assert!(matches!(err, LotoError::InvalidCombination(_)));
    }

    #[test]
    fn test_special_ball_and_tiers() {
        let rule = LotteryRule::new("gv", "Grande Vie", NumberRange::new(1, 49), 5)
            .with_special(NumberRange::new(1, 7))
            .with_prize_tiers(vec![
                PrizeTier::new("5+1", 5).with_special(),
                PrizeTier::new("5", 5),
                PrizeTier::new("2+1", 2).with_special(),
            ]);
        let history = History::from_draws(vec![Draw::new(
            1,
            Combination::new(vec![5, 12, 23, 34, 45], Some(3)),
        )])
        .unwrap();

        let report = verify(&rule, &Combination::new(vec![5, 12, 1, 2, 4], Some(3)), &history).unwrap();
        assert!(report.special_matched);
        assert_eq!(report.prize_tier.as_deref(), Some("2+1"));

        let report = verify(&rule, &Combination::new(vec![5, 12, 23, 34, 45], Some(4)), &history).unwrap();
        assert!(!report.special_matched);
        assert!(!report.exact_match);
        assert_eq!(report.prize_tier.as_deref(), Some("5"));
    }

    #[test]
    fn test_special_ball_counts_across_tied_draws() {
        let rule = LotteryRule::new("gv", "Grande Vie", NumberRange::new(1, 49), 5)
            .with_special(NumberRange::new(1, 7))
            .with_prize_tiers(vec![
                PrizeTier::new("2+1", 2).with_special(),
                PrizeTier::new("3", 3),
            ]);
        let history = History::from_draws(vec![
            Draw::new(1, Combination::new(vec![5, 12, 23, 34, 45], Some(3))),
            Draw::new(2, Combination::new(vec![5, 12, 30, 31, 32], Some(6))),
        ])
        .unwrap();

        let report = verify(&rule, &Combination::new(vec![5, 12, 1, 2, 4], Some(3)), &history).unwrap();
        assert_eq!(report.matched_count, 2);
        assert_eq!(report.matched_draw.unwrap().sequence, 2);
        assert!(report.special_matched);
        assert_eq!(report.prize_tier.as_deref(), Some("2+1"));
    }

    #[test]
    fn test_builtin_report_includes_criteria() {
        let catalog = RuleCatalog::builtin();
        let rule = catalog.get_rule("649").unwrap();
        let report = verify(
            rule,
            &Combination::from_numbers([3, 14, 22, 27, 35, 41]),
            &History::new(),
        )
        .unwrap();
        assert!(report.criteria.unwrap().passes());
    }
}
