use super::super::domain::{
    ClassId, ClassStatus, TeacherProfile, TeacherSession, TransferRequest,
};
use super::super::schedule::ScheduleSlot;
use serde::{Deserialize, Serialize};

/// Why a destination class or candidate teacher was turned down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum IneligibleReason {
    Inactive,
    IncompatibleSubject { message: String },
    ScheduleConflict { conflicts: Vec<ScheduleConflict> },
    InsufficientCapacity { available: u32, requested: usize },
    WrongSubjectOrGrade,
    SameClass,
    ClassNotOpen { status: ClassStatus },
}

impl IneligibleReason {
    pub const fn code(&self) -> &'static str {
        match self {
            IneligibleReason::Inactive => "inactive",
            IneligibleReason::IncompatibleSubject { .. } => "incompatible_subject",
            IneligibleReason::ScheduleConflict { .. } => "schedule_conflict",
            IneligibleReason::InsufficientCapacity { .. } => "insufficient_capacity",
            IneligibleReason::WrongSubjectOrGrade => "wrong_subject_or_grade",
            IneligibleReason::SameClass => "same_class",
            IneligibleReason::ClassNotOpen { .. } => "class_not_open",
        }
    }

    pub fn summary(&self) -> String {
        match self {
            IneligibleReason::Inactive => "teacher is inactive".to_string(),
            IneligibleReason::IncompatibleSubject { message } => message.clone(),
            IneligibleReason::ScheduleConflict { conflicts } => {
                let details = conflicts
                    .iter()
                    .map(ScheduleConflict::summary)
                    .collect::<Vec<_>>();
                format!("schedule conflict: {}", details.join("; "))
            }
            IneligibleReason::InsufficientCapacity {
                available,
                requested,
            } => format!("only {available} seat(s) left for {requested} student(s)"),
            IneligibleReason::WrongSubjectOrGrade => {
                "class teaches a different subject or grade".to_string()
            }
            IneligibleReason::SameClass => "students are already in this class".to_string(),
            IneligibleReason::ClassNotOpen { status } => {
                format!("class is {} and does not accept transfers", status.label())
            }
        }
    }
}

/// A slot of the class being handed over that collides with the teacher's timetable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConflict {
    pub class_slot: ScheduleSlot,
    pub teacher_slot: ScheduleSlot,
    pub class_name: String,
    pub conflicting_class_id: ClassId,
    pub conflicting_class_name: String,
}

impl ScheduleConflict {
    pub fn summary(&self) -> String {
        format!(
            "{} ({}) overlaps {} ({})",
            self.class_name, self.class_slot, self.conflicting_class_name, self.teacher_slot
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum TeacherVerdict {
    Eligible,
    Ineligible(IneligibleReason),
}

impl TeacherVerdict {
    pub fn is_eligible(&self) -> bool {
        matches!(self, TeacherVerdict::Eligible)
    }

    pub fn reason(&self) -> Option<&IneligibleReason> {
        match self {
            TeacherVerdict::Eligible => None,
            TeacherVerdict::Ineligible(reason) => Some(reason),
        }
    }
}

/// Checks run in a fixed order and stop at the first failure: active flag, subject
/// qualification, then timetable conflicts inside the effective window.
pub fn resolve_teacher_transfer(
    request: &TransferRequest,
    teacher: &TeacherProfile,
    teacher_sessions: &[TeacherSession],
    class_schedule: &[ScheduleSlot],
) -> TeacherVerdict {
    if !teacher.active {
        return TeacherVerdict::Ineligible(IneligibleReason::Inactive);
    }

    let source = &request.source;
    if !teacher.teaches(&source.subject_id) {
        let message = teacher
            .incompatible_subject_message
            .clone()
            .unwrap_or_else(|| {
                format!(
                    "teacher {} is not qualified for subject {}",
                    teacher.id, source.subject_id
                )
            });
        return TeacherVerdict::Ineligible(IneligibleReason::IncompatibleSubject { message });
    }

    let conflicts = find_conflicts(request, teacher_sessions, class_schedule);
    if conflicts.is_empty() {
        TeacherVerdict::Eligible
    } else {
        TeacherVerdict::Ineligible(IneligibleReason::ScheduleConflict { conflicts })
    }
}

fn find_conflicts(
    request: &TransferRequest,
    teacher_sessions: &[TeacherSession],
    class_schedule: &[ScheduleSlot],
) -> Vec<ScheduleConflict> {
    let source = &request.source;
    let window = request.window.map(|window| window.span());

    let mut conflicts = Vec::new();
    for class_slot in class_schedule {
        for session in teacher_sessions {
            if session.class_id == source.id || !class_slot.overlaps(&session.slot) {
                continue;
            }

            // Without a window every recurring session counts.
            if let Some(window) = window {
                let occurs = window
                    .intersect(session.active_from, session.active_until)
                    .map(|span| span.contains_weekday(class_slot.day_of_week()))
                    .unwrap_or(false);
                if !occurs {
                    continue;
                }
            }

            conflicts.push(ScheduleConflict {
                class_slot: *class_slot,
                teacher_slot: session.slot,
                class_name: source.display_name().to_string(),
                conflicting_class_id: session.class_id.clone(),
                conflicting_class_name: if session.class_name.trim().is_empty() {
                    session.class_id.to_string()
                } else {
                    session.class_name.clone()
                },
            });
        }
    }

    conflicts
}
