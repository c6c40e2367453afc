use crate::error::{LotoError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A ticket: the picked numbers (kept sorted) plus an optional special ball.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "CombinationRepr")]
pub struct Combination {
    numbers: Vec<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    special: Option<u8>,
}

/// Accepted JSON shapes: `{"numbers": [..], "special": n}` or a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum CombinationRepr {
    Full {
        numbers: Vec<u8>,
        #[serde(default)]
        special: Option<u8>,
    },
    Bare(Vec<u8>),
}

impl From<CombinationRepr> for Combination {
    fn from(repr: CombinationRepr) -> Self {
        match repr {
            CombinationRepr::Full { numbers, special } => Self::new(numbers, special),
            CombinationRepr::Bare(numbers) => Self::new(numbers, None),
        }
    }
}

impl Combination {
    pub fn new(mut numbers: Vec<u8>, special: Option<u8>) -> Self {
        numbers.sort_unstable();
        Self { numbers, special }
    }

    pub fn from_numbers(numbers: impl IntoIterator<Item = u8>) -> Self {
        Self::new(numbers.into_iter().collect(), None)
    }

    pub fn with_special(mut self, special: u8) -> Self {
        self.special = Some(special);
        self
    }

    pub fn numbers(&self) -> &[u8] {
        &self.numbers
    }

    pub fn special(&self) -> Option<u8> {
        self.special
    }

    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    pub fn contains(&self, number: u8) -> bool {
        self.numbers.binary_search(&number).is_ok()
    }

    pub fn sum(&self) -> u32 {
        self.numbers.iter().map(|&n| u32::from(n)).sum()
    }

    /// Size of the intersection with another combination's numbers.
    pub fn matched(&self, other: &Combination) -> usize {
        let (mut i, mut j, mut count) = (0, 0, 0);
        while i < self.numbers.len() && j < other.numbers.len() {
            match self.numbers[i].cmp(&other.numbers[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    count += 1;
                    i += 1;
                    j += 1;
                }
            }
        }
        count
    }

    /// True when some number appears more than once.
    pub fn has_repeats(&self) -> bool {
        self.numbers.windows(2).any(|w| w[0] == w[1])
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .numbers
            .iter()
            .map(|n| format!("{:02}", n))
            .collect::<Vec<_>>()
            .join(" ");
        match self.special {
            Some(special) => write!(f, "{} + {:02}", joined, special),
            None => write!(f, "{}", joined),
        }
    }
}

/// Parses `"3 14 15 22 35 41"`, commas and semicolons also accepted, with an
/// optional special ball after a `+`.
impl FromStr for Combination {
    type Err = LotoError;

    fn from_str(s: &str) -> Result<Self> {
        let (main, special) = match s.split_once('+') {
            Some((main, special)) => (main, Some(special.trim())),
            None => (s, None),
        };

        let numbers = main
            .split(|c: char| c.is_whitespace() || c == ',' || c == ';')
            .filter(|token| !token.is_empty())
            .map(|token| {
                token.parse::<u8>().map_err(|_| {
                    LotoError::invalid_request(format!("'{}' is not a valid number", token))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        if numbers.is_empty() {
            return Err(LotoError::invalid_request("combination has no numbers"));
        }

        let special = special
            .map(|token| {
                token.parse::<u8>().map_err(|_| {
                    LotoError::invalid_request(format!("'{}' is not a valid special ball", token))
                })
            })
            .transpose()?;

        Ok(Self::new(numbers, special))
    }
}

/// A recorded draw. Sequence ids grow strictly within a lottery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draw {
    pub sequence: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drawn_on: Option<NaiveDate>,
    pub combination: Combination,
}

impl Draw {
    pub fn new(sequence: u64, combination: Combination) -> Self {
        Self {
            sequence,
            drawn_on: None,
            combination,
        }
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.drawn_on = Some(date);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_are_sorted() {
        let combination = Combination::new(vec![9, 1, 5], Some(2));
        assert_eq!(combination.numbers(), &[1, 5, 9]);
        assert_eq!(combination.special(), Some(2));
        assert_eq!(combination, Combination::new(vec![5, 9, 1], Some(2)));
        assert_ne!(combination, Combination::new(vec![5, 9, 1], None));
    }

    #[test]
    fn test_matched() {
        let a = Combination::from_numbers([1, 2, 3, 4, 5, 6]);
        let b = Combination::from_numbers([1, 2, 3, 7, 8, 9]);
        assert_eq!(a.matched(&b), 3);
        assert_eq!(a.matched(&a), 6);
    }

    #[test]
    fn test_parse() {
        let combination: Combination = "14, 3;22 41 35 15".parse().unwrap();
        assert_eq!(combination.numbers(), &[3, 14, 15, 22, 35, 41]);
        assert_eq!(combination.special(), None);

        let combination: Combination = "1 2 3 4 5 + 7".parse().unwrap();
        assert_eq!(combination.special(), Some(7));
        assert_eq!(combination.to_string(), "01 02 03 04 05 + 07");

        assert!("1 2 x".parse::<Combination>().is_err());
        assert!("".parse::<Combination>().is_err());
    }

    #[test]
    fn test_deserialize_shapes() {
        let full: Combination = serde_json::from_str(r#"{"numbers":[3,1,2],"special":4}"#).unwrap();
        assert_eq!(full, Combination::new(vec![1, 2, 3], Some(4)));

        let bare: Combination = serde_json::from_str("[3, 1, 2]").unwrap();
        assert_eq!(bare, Combination::from_numbers([1, 2, 3]));

        let json = serde_json::to_value(&bare).unwrap();
        assert_eq!(json, serde_json::json!({ "numbers": [1, 2, 3] }));
    }

    #[test]
    fn test_repeats() {
        assert!(Combination::from_numbers([4, 4, 5]).has_repeats());
        assert!(!Combination::from_numbers([4, 5, 6]).has_repeats());
    }
}
