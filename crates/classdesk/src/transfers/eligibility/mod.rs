mod policy;
mod ranking;
mod rules;

pub use policy::{resolve_teacher_transfer, IneligibleReason, ScheduleConflict, TeacherVerdict};
pub use ranking::rank;
pub use rules::{check_candidate, filter_eligible, has_capacity_for};

use super::domain::ClassSummary;
use serde::{Deserialize, Serialize};

/// A destination that was considered and turned down, with the first failing check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedCandidate {
    pub class: ClassSummary,
    pub reason: IneligibleReason,
}

/// Ranked destinations for a bulk student move.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StudentTransferOutcome {
    pub eligible: Vec<ClassSummary>,
    pub rejected: Vec<RejectedCandidate>,
}

impl StudentTransferOutcome {
    pub fn is_empty(&self) -> bool {
        self.eligible.is_empty()
    }

    pub fn contains(&self, class_id: &super::domain::ClassId) -> bool {
        self.eligible.iter().any(|class| &class.id == class_id)
    }

    pub fn rejection_for(
        &self,
        class_id: &super::domain::ClassId,
    ) -> Option<&IneligibleReason> {
        self.rejected
            .iter()
            .find(|rejected| &rejected.class.id == class_id)
            .map(|rejected| &rejected.reason)
    }
}

/// Resolver output for either call site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EligibilityResult {
    Students(StudentTransferOutcome),
    Teacher { verdict: TeacherVerdict },
}

impl EligibilityResult {
    pub fn students(self) -> Option<StudentTransferOutcome> {
        match self {
            EligibilityResult::Students(outcome) => Some(outcome),
            EligibilityResult::Teacher { .. } => None,
        }
    }

    pub fn teacher_verdict(self) -> Option<TeacherVerdict> {
        match self {
            EligibilityResult::Teacher { verdict } => Some(verdict),
            EligibilityResult::Students(_) => None,
        }
    }
}
