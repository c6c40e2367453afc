//! Plain-text draw history parsing.
//!
//! One draw per line, for example `2024-03-02 03 14 15 22 35 41 (07)`. The
//! date prefix is optional. A parenthesized number is the bonus ball: it
//! becomes the special ball when the lottery has one and is dropped
//! otherwise. Separators may be spaces, commas or semicolons.

use crate::rules::LotteryRule;
use crate::types::Combination;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedDraw {
    pub line: usize,
    pub drawn_on: Option<NaiveDate>,
    pub combination: Combination,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedHistory {
    /// Distinct draws in input order.
    pub draws: Vec<ParsedDraw>,
    /// Repeats of an earlier line, kept out of `draws`.
    pub duplicates: Vec<ParsedDraw>,
    /// Line numbers that did not hold a valid combination.
    pub skipped: Vec<usize>,
}

pub fn parse_history(text: &str, rule: &LotteryRule) -> ParsedHistory {
    let mut parsed = ParsedHistory::default();
    let mut seen = HashSet::new();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let Some(entry) = parse_line(line, line_no, rule) else {
            tracing::debug!("Skipping history line {}: {:?}", line_no, line);
            parsed.skipped.push(line_no);
            continue;
        };

        if seen.insert(entry.combination.clone()) {
            parsed.draws.push(entry);
        } else {
            parsed.duplicates.push(entry);
        }
    }

    parsed
}

fn parse_line(line: &str, line_no: usize, rule: &LotteryRule) -> Option<ParsedDraw> {
    let (drawn_on, rest) = match line.get(..10).and_then(|p| NaiveDate::parse_from_str(p, "%Y-%m-%d").ok()) {
        Some(date) => (Some(date), &line[10..]),
        None => (None, line),
    };

    let mut main = String::with_capacity(rest.len());
    let mut bonus = String::new();
    let mut in_parens = false;
    for ch in rest.chars() {
        match ch {
            '(' => in_parens = true,
            ')' => {
                in_parens = false;
                main.push(' ');
            }
            c if in_parens => bonus.push(c),
            c => main.push(c),
        }
    }

    let numbers = small_numbers(&main);
    if numbers.len() != rule.picks {
        return None;
    }

    let special = match rule.special {
        Some(_) => Some(*small_numbers(&bonus).first()?),
        None => None,
    };

    let combination = Combination::new(numbers, special);
    rule.is_valid(&combination).then_some(ParsedDraw {
        line: line_no,
        drawn_on,
        combination,
    })
}

/// Tokens of one or two digits; longer digit runs are ignored.
fn small_numbers(text: &str) -> Vec<u8> {
    text.split(|c: char| !c.is_ascii_digit())
        .filter(|token| !token.is_empty() && token.len() <= 2)
        .filter_map(|token| token.parse().ok())
        .collect()
}
