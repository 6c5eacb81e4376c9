//! Validation report

use crate::problem::{Problem, ProblemKind};
use serde::Serialize;
use std::fmt;

/// Which check produced a group of problems. Reports list phases in this
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Phase {
    ContentTypes,
    RootRelationships,
    WorkbookRelationships,
    WorkbookSheets,
    WorksheetRelationships,
    WorksheetFormulas,
}

/// Ordered list of every problem found in one package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    problems: Vec<Problem>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the problems of one phase.
    ///
    /// Problems are kept as produced: the same defect seen by two checks is
    /// listed twice.
    pub fn extend(&mut self, problems: impl IntoIterator<Item = Problem>) {
        self.problems.extend(problems);
    }

    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    pub fn into_problems(self) -> Vec<Problem> {
        self.problems
    }

    pub fn is_structurally_sound(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    /// Number of problems of the given kind
    pub fn count(&self, kind: ProblemKind) -> usize {
        self.problems.iter().filter(|p| p.kind() == kind).count()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.problems.is_empty() {
            return writeln!(
                f,
                "No packaging issues detected. The package looks structurally sound."
            );
        }

        writeln!(f, "Potential issues detected ({}):", self.problems.len())?;
        for problem in &self.problems {
            writeln!(f, " - {}", problem)?;
        }
        Ok(())
    }
}
