//! Constraint mini-language parser
//!
//! A constraint string is a comma-separated list of clauses:
//!
//! - `at least <n> <token>`: hard-ish minimum, violations cap scores at 0.5
//! - `max <n> <token>`: maximum, violations cap scores at 0.5
//! - `must have <skill>`: hard requirement, candidates lacking it are discarded
//! - `prefer <n> <token>`: soft target, misses cap scores at 0.8
//!
//! Matching is case-insensitive. Clauses that fit none of these shapes are
//! dropped without failing the parse.

use crate::error::{Result, TeamOptimizerError};
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

const KNOWN_KEYS: [&str; 6] = ["junior", "mid", "senior", "male", "female", "other"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstraintSet {
    pub at_least: BTreeMap<String, usize>,
    pub max: BTreeMap<String, usize>,
    pub must_have: BTreeSet<String>,
    pub prefer: BTreeMap<String, usize>,
    /// Clauses that were dropped because they could not be parsed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignored: Vec<String>,
}

impl ConstraintSet {
    pub fn is_empty(&self) -> bool {
        self.at_least.is_empty() && self.max.is_empty() && self.must_have.is_empty() && self.prefer.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Clause {
    AtLeast(String, usize),
    Max(String, usize),
    MustHave(String),
    Prefer(String, usize),
}

struct ClausePatterns {
    at_least: Regex,
    max: Regex,
    must_have: Regex,
    prefer: Regex,
}

fn patterns() -> &'static ClausePatterns {
    static PATTERNS: OnceLock<ClausePatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| ClausePatterns {
        at_least: Regex::new(r"^at least (\d+) (\w+)").expect("Invalid at-least regex"),
        max: Regex::new(r"^max (\d+) (\w+)").expect("Invalid max regex"),
        must_have: Regex::new(r"^must have (.+)").expect("Invalid must-have regex"),
        prefer: Regex::new(r"^prefer (\d+) (\w+)").expect("Invalid prefer regex"),
    })
}

/// Parse a full constraint string. Empty input yields an empty set.
pub fn parse_constraints(input: &str) -> ConstraintSet {
    let mut set = ConstraintSet::default();

    for part in input.split(',') {
        let part = part.trim().to_lowercase();
        if part.is_empty() {
            continue;
        }

        match parse_clause(&part) {
            Ok(Clause::AtLeast(key, count)) => {
                set.at_least.insert(key, count);
            }
            Ok(Clause::Max(key, count)) => {
                set.max.insert(key, count);
            }
            Ok(Clause::MustHave(skill)) => {
                set.must_have.insert(skill);
            }
            Ok(Clause::Prefer(key, count)) => {
                set.prefer.insert(key, count);
            }
            Err(e) => {
                debug!("Dropping constraint clause: {}", e);
                set.ignored.push(part);
            }
        }
    }

    set
}

fn parse_clause(part: &str) -> Result<Clause> {
    let patterns = patterns();
    let malformed = || TeamOptimizerError::MalformedConstraint(part.to_string());

    if part.starts_with("at least") {
        let (key, count) = count_and_key(&patterns.at_least, part).ok_or_else(malformed)?;
        Ok(Clause::AtLeast(key, count))
    } else if part.starts_with("max") {
        let (key, count) = count_and_key(&patterns.max, part).ok_or_else(malformed)?;
        Ok(Clause::Max(key, count))
    } else if part.starts_with("must have") {
        let caps = patterns.must_have.captures(part).ok_or_else(malformed)?;
        let skill = caps[1].trim().to_string();
        if skill.is_empty() {
            return Err(malformed());
        }
        Ok(Clause::MustHave(skill))
    } else if part.starts_with("prefer") {
        let (key, count) = count_and_key(&patterns.prefer, part).ok_or_else(malformed)?;
        Ok(Clause::Prefer(key, count))
    } else {
        Err(malformed())
    }
}

fn count_and_key(pattern: &Regex, part: &str) -> Option<(String, usize)> {
    let caps = pattern.captures(part)?;
    let count = caps[1].parse().ok()?;
    Some((normalize_key(&caps[2]), count))
}

/// `seniors` -> `senior`, `females` -> `female`. Other tokens are kept as-is.
fn normalize_key(token: &str) -> String {
    if let Some(singular) = token.strip_suffix('s') {
        if KNOWN_KEYS.contains(&singular) {
            return singular.to_string();
        }
    }
    token.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        let set = parse_constraints("");
        assert!(set.is_empty());
        assert!(set.ignored.is_empty());
    }

    #[test]
    fn test_all_clause_forms() {
        let set = parse_constraints("At least 2 Juniors, max 1 senior, must have DevOps, prefer 2 females");
        assert_eq!(set.at_least.get("junior"), Some(&2));
        assert_eq!(set.max.get("senior"), Some(&1));
        assert!(set.must_have.contains("devops"));
        assert_eq!(set.prefer.get("female"), Some(&2));
        assert!(set.ignored.is_empty());
    }

    #[test]
    fn test_multi_word_must_have() {
        let set = parse_constraints("must have   machine learning  ");
        assert!(set.must_have.contains("machine learning"));
    }

    #[test]
    fn test_unrecognized_clauses_are_dropped() {
        let set = parse_constraints("must have python, no weekends, at least many seniors, , max two mid");
        assert_eq!(set.must_have.len(), 1);
        assert!(set.at_least.is_empty());
        assert!(set.max.is_empty());
        assert_eq!(set.ignored, vec!["no weekends", "at least many seniors", "max two mid"]);
    }

    #[test]
    fn test_skill_tokens_are_not_singularised() {
        let set = parse_constraints("at least 1 kubernetes, prefer 1 sass");
        assert_eq!(set.at_least.get("kubernetes"), Some(&1));
        assert_eq!(set.prefer.get("sass"), Some(&1));
    }

    #[test]
    fn test_malformed_clause_error() {
        let err = parse_clause("prefer some female").unwrap_err();
        assert!(matches!(err, TeamOptimizerError::MalformedConstraint(_)));
    }
}
