//! Outcome aggregation
//!
//! Pure functions over recorded outcomes. Summaries can be computed per
//! batch and merged into a run total.

use crate::types::Outcome;
use serde::Serialize;

/// A failed module with the error recorded for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub name: String,
    pub error: String,
    pub possibly_spurious: bool,
}

/// Counts over a set of outcomes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub success_count: usize,
    pub fail_count: usize,
    /// Successes that were accepted despite a failed or skipped check
    pub soft_count: usize,
    /// Successes where no install was needed
    pub skipped_count: usize,
    pub failed: Vec<Failure>,
}

impl Summary {
    /// Names of failed modules, in the order they failed
    pub fn failed_names(&self) -> Vec<&str> {
        self.failed.iter().map(|f| f.name.as_str()).collect()
    }

    /// Whether every module succeeded
    pub fn is_success(&self) -> bool {
        self.fail_count == 0
    }

    /// Merge another summary into this one
    pub fn merge(&mut self, other: &Summary) {
        self.count += other.count;
        self.success_count += other.success_count;
        self.fail_count += other.fail_count;
        self.soft_count += other.soft_count;
        self.skipped_count += other.skipped_count;
        self.failed.extend(other.failed.iter().cloned());
    }

    /// Add one outcome to the summary
    pub fn add(&mut self, name: &str, outcome: &Outcome) {
        self.count += 1;
        if let Outcome::Failed {
            error,
            possibly_spurious,
        } = outcome
        {
            self.fail_count += 1;
            self.failed.push(Failure {
                name: name.to_string(),
                error: error.clone(),
                possibly_spurious: *possibly_spurious,
            });
            return;
        }

        self.success_count += 1;
        if outcome.is_soft_success() {
            self.soft_count += 1;
        }
        if outcome.is_skip() {
            self.skipped_count += 1;
        }
    }
}

/// Summarize a collection of per-module outcomes
pub fn summarize<'a, I>(outcomes: I) -> Summary
where
    I: IntoIterator<Item = (&'a String, &'a Outcome)>,
{
    let mut summary = Summary::default();
    for (name, outcome) in outcomes {
        summary.add(name, outcome);
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn failed(error: &str) -> Outcome {
        Outcome::Failed {
            error: error.into(),
            possibly_spurious: false,
        }
    }

    #[test]
    fn test_summarize_counts() {
        let mut outcomes = IndexMap::new();
        outcomes.insert("A".to_string(), Outcome::Installed { version: None });
        outcomes.insert(
            "B".to_string(),
            Outcome::AlreadySatisfied {
                installed: "1.0".into(),
            },
        );
        outcomes.insert(
            "C".to_string(),
            Outcome::InUse {
                message: "locked".into(),
            },
        );
        outcomes.insert("D".to_string(), failed("not found"));

        let summary = summarize(&outcomes);
        assert_eq!(summary.count, 4);
        assert_eq!(summary.success_count, 3);
        assert_eq!(summary.fail_count, 1);
        assert_eq!(summary.soft_count, 1);
        assert_eq!(summary.skipped_count, 1);
        assert_eq!(summary.failed_names(), vec!["D"]);
        assert_eq!(summary.failed[0].error, "not found");
        assert!(!summary.is_success());
    }

    #[test]
    fn test_summarize_empty() {
        let outcomes: IndexMap<String, Outcome> = IndexMap::new();
        let summary = summarize(&outcomes);
        assert_eq!(summary, Summary::default());
        assert!(summary.is_success());
    }

    #[test]
    fn test_merge() {
        let mut first = IndexMap::new();
        first.insert("A".to_string(), failed("x"));
        let mut second = IndexMap::new();
        second.insert("B".to_string(), Outcome::Installed { version: None });
        second.insert("C".to_string(), failed("y"));

        let mut total = summarize(&first);
        total.merge(&summarize(&second));
        assert_eq!(total.count, 3);
        assert_eq!(total.success_count, 1);
        assert_eq!(total.fail_count, 2);
        assert_eq!(total.failed_names(), vec!["A", "C"]);
    }
}
