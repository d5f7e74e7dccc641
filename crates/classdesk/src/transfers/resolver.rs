use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::domain::{
    ClassSummary, EffectiveWindow, StudentId, TeacherId, TeacherProfile, TeacherSession,
    TransferKind, TransferRequest,
};
use super::eligibility::{
    check_candidate, rank, resolve_teacher_transfer, EligibilityResult, RejectedCandidate,
    StudentTransferOutcome, TeacherVerdict,
};
use crate::config::TransferConfig;

/// Request-shape problems caught before any eligibility check runs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransferError {
    #[error("select at least one student to transfer")]
    NoStudentsSelected,
    #[error("student {0} is selected more than once")]
    DuplicateStudent(StudentId),
    #[error("teacher transfer requires a candidate teacher and their profile")]
    MissingCandidateTeacher,
    #[error("teacher profile {found} does not match requested candidate {requested}")]
    TeacherMismatch {
        requested: TeacherId,
        found: TeacherId,
    },
    #[error("substitute end date {end} must fall after effective date {start}")]
    InvalidWindow {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },
}

/// Teacher data needed for the teacher-transfer path; unused for student moves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleData {
    #[serde(default)]
    pub teacher: Option<TeacherProfile>,
    #[serde(default)]
    pub teacher_sessions: Vec<TeacherSession>,
}

/// Stateless entry point dispatching on the transfer kind.
#[derive(Debug, Clone, Default)]
pub struct TransferEligibilityResolver {
    candidate_limit: Option<usize>,
}

impl TransferEligibilityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &TransferConfig) -> Self {
        Self {
            candidate_limit: config.candidate_limit,
        }
    }

    pub fn with_candidate_limit(mut self, limit: usize) -> Self {
        self.candidate_limit = Some(limit);
        self
    }

    pub fn resolve(
        &self,
        request: &TransferRequest,
        catalog: &[ClassSummary],
        schedule_data: &ScheduleData,
    ) -> Result<EligibilityResult, TransferError> {
        match request.kind {
            TransferKind::Student => self
                .resolve_students(request, catalog)
                .map(EligibilityResult::Students),
            TransferKind::Teacher => {
                let verdict = self.resolve_teacher(request, schedule_data)?;
                Ok(EligibilityResult::Teacher { verdict })
            }
        }
    }

    pub fn resolve_students(
        &self,
        request: &TransferRequest,
        catalog: &[ClassSummary],
    ) -> Result<StudentTransferOutcome, TransferError> {
        validate_selection(&request.entity_ids)?;

        let source = &request.source;
        let moving_count = request.moving_count();
        let mut eligible = Vec::new();
        let mut rejected = Vec::new();

        for candidate in catalog {
            match check_candidate(source, candidate, moving_count) {
                Ok(()) => eligible.push(candidate.clone()),
                Err(reason) => rejected.push(RejectedCandidate {
                    class: candidate.clone(),
                    reason,
                }),
            }
        }

        let mut eligible = rank(source, eligible);
        if let Some(limit) = self.candidate_limit {
            eligible.truncate(limit);
        }

        Ok(StudentTransferOutcome { eligible, rejected })
    }

    pub fn resolve_teacher(
        &self,
        request: &TransferRequest,
        schedule_data: &ScheduleData,
    ) -> Result<TeacherVerdict, TransferError> {
        if let Some(window) = request.window {
            validate_window(&window)?;
        }

        let requested = request
            .candidate_teacher_id
            .as_ref()
            .ok_or(TransferError::MissingCandidateTeacher)?;
        let teacher = schedule_data
            .teacher
            .as_ref()
            .ok_or(TransferError::MissingCandidateTeacher)?;
        if &teacher.id != requested {
            return Err(TransferError::TeacherMismatch {
                requested: requested.clone(),
                found: teacher.id.clone(),
            });
        }

        Ok(resolve_teacher_transfer(
            request,
            teacher,
            &schedule_data.teacher_sessions,
            &request.source.schedule,
        ))
    }
}

/// A student move needs at least one student and lists each of them once.
pub fn validate_selection(student_ids: &[StudentId]) -> Result<(), TransferError> {
    if student_ids.is_empty() {
        return Err(TransferError::NoStudentsSelected);
    }

    let mut seen = HashSet::with_capacity(student_ids.len());
    match student_ids.iter().find(|id| !seen.insert(*id)) {
        Some(duplicate) => Err(TransferError::DuplicateStudent(duplicate.clone())),
        None => Ok(()),
    }
}

pub fn validate_window(window: &EffectiveWindow) -> Result<(), TransferError> {
    match window.substitute_end_date {
        Some(end) if !window.is_well_formed() => Err(TransferError::InvalidWindow {
            start: window.effective_date,
            end,
        }),
        _ => Ok(()),
    }
}
