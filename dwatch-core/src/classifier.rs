//! Operation classification.
//!
//! A group is classified by which entrypoints appear in it, not by an exact
//! match, so incidental internal calls do not break recognition. Rules are
//! evaluated in order and the first one whose entrypoints are all present wins.

use std::collections::BTreeSet;
use std::fmt;

use dwatch_sdk::objects::entrypoints;

use crate::grouping::OperationGroup;

/// Governance actions the watcher reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Vote,
    Propose,
    ExecuteTimelock,
    EndVoting,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Vote => write!(f, "vote"),
            OperationKind::Propose => write!(f, "propose"),
            OperationKind::ExecuteTimelock => write!(f, "execute_timelock"),
            OperationKind::EndVoting => write!(f, "end_voting"),
        }
    }
}

/// Result of classifying one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Known(OperationKind),
    /// No rule matched; carries the entrypoints that were seen.
    Unknown(BTreeSet<String>),
}

/// A rule matches when every one of `requires` is present in the group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRule {
    pub requires: Vec<String>,
    pub kind: OperationKind,
}

impl ClassificationRule {
    pub fn new(requires: &[&str], kind: OperationKind) -> Self {
        Self {
            requires: requires.iter().map(|s| s.to_string()).collect(),
            kind,
        }
    }

    fn matches(&self, present: &BTreeSet<&str>) -> bool {
        self.requires.iter().all(|e| present.contains(e.as_str()))
    }
}

/// Ordered rule list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classifier {
    rules: Vec<ClassificationRule>,
}

impl Classifier {
    pub fn new(rules: Vec<ClassificationRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    pub fn classify(&self, group: &OperationGroup) -> Classification {
        let present = group.entrypoints();

        match self.rules.iter().find(|rule| rule.matches(&present)) {
            Some(rule) => Classification::Known(rule.kind),
            None => Classification::Unknown(present.into_iter().map(str::to_string).collect()),
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(vec![
            ClassificationRule::new(
                &[entrypoints::VOTE, entrypoints::VOTE_CALLBACK],
                OperationKind::Vote,
            ),
            ClassificationRule::new(
                &[entrypoints::PROPOSE, entrypoints::TRANSFER],
                OperationKind::Propose,
            ),
            ClassificationRule::new(&[entrypoints::EXECUTE_TIMELOCK], OperationKind::ExecuteTimelock),
            ClassificationRule::new(&[entrypoints::END_VOTING], OperationKind::EndVoting),
        ])
    }
}
