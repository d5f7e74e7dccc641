use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::schedule::{DateSpan, ScheduleSlot};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifier of a scheduled class.
    ClassId
);
string_id!(SubjectId);
string_id!(GradeId);
string_id!(TeacherId);
string_id!(
    /// Identifier of an enrolled student.
    StudentId
);

/// Lifecycle of a class as reported by the class-listing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassStatus {
    Draft,
    Ready,
    Active,
    Suspended,
    Completed,
    Cancelled,
}

impl ClassStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ClassStatus::Draft => "draft",
            ClassStatus::Ready => "ready",
            ClassStatus::Active => "active",
            ClassStatus::Suspended => "suspended",
            ClassStatus::Completed => "completed",
            ClassStatus::Cancelled => "cancelled",
        }
    }

    /// Only classes that are about to start or already running accept transfers.
    pub const fn accepts_transfers(self) -> bool {
        matches!(self, ClassStatus::Ready | ClassStatus::Active)
    }

    pub fn from_label(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "draft" => Some(ClassStatus::Draft),
            "ready" => Some(ClassStatus::Ready),
            "active" => Some(ClassStatus::Active),
            "suspended" => Some(ClassStatus::Suspended),
            "completed" => Some(ClassStatus::Completed),
            "cancelled" | "canceled" => Some(ClassStatus::Cancelled),
            _ => None,
        }
    }
}

/// Snapshot of a class as fetched from the backend; never mutated by the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSummary {
    pub id: ClassId,
    #[serde(default)]
    pub name: String,
    pub subject_id: SubjectId,
    pub grade_id: GradeId,
    pub status: ClassStatus,
    pub current_occupancy: u32,
    /// `None` means unlimited.
    #[serde(default)]
    pub max_capacity: Option<u32>,
    #[serde(default)]
    pub teacher_id: Option<TeacherId>,
    #[serde(default)]
    pub schedule: Vec<ScheduleSlot>,
}

impl ClassSummary {
    /// Seats left, or `None` when the class has no cap.
    pub fn remaining_seats(&self) -> Option<u32> {
        self.max_capacity
            .map(|cap| cap.saturating_sub(self.current_occupancy))
    }

    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            self.id.as_str()
        } else {
            &self.name
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferKind {
    Student,
    Teacher,
}

/// Start of a teacher reassignment and, for temporary substitutions, its last day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveWindow {
    pub effective_date: NaiveDate,
    #[serde(default)]
    pub substitute_end_date: Option<NaiveDate>,
}

impl EffectiveWindow {
    pub fn permanent(effective_date: NaiveDate) -> Self {
        Self {
            effective_date,
            substitute_end_date: None,
        }
    }

    pub fn temporary(effective_date: NaiveDate, substitute_end_date: NaiveDate) -> Self {
        Self {
            effective_date,
            substitute_end_date: Some(substitute_end_date),
        }
    }

    pub fn is_temporary(&self) -> bool {
        self.substitute_end_date.is_some()
    }

    /// The substitute end date must fall strictly after the effective date.
    pub fn is_well_formed(&self) -> bool {
        self.substitute_end_date
            .map_or(true, |end| self.effective_date < end)
    }

    pub(crate) fn span(&self) -> DateSpan {
        DateSpan {
            start: self.effective_date,
            end: self.substitute_end_date,
        }
    }
}

/// Everything the caller knows about a requested move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub source: ClassSummary,
    pub kind: TransferKind,
    /// Students being moved. Empty for teacher transfers, where the moving entity is the
    /// source class's current teacher.
    #[serde(default)]
    pub entity_ids: Vec<StudentId>,
    #[serde(default)]
    pub candidate_teacher_id: Option<TeacherId>,
    #[serde(default)]
    pub window: Option<EffectiveWindow>,
}

impl TransferRequest {
    pub fn students(source: ClassSummary, entity_ids: Vec<StudentId>) -> Self {
        Self {
            source,
            kind: TransferKind::Student,
            entity_ids,
            candidate_teacher_id: None,
            window: None,
        }
    }

    pub fn teacher(
        source: ClassSummary,
        candidate_teacher_id: TeacherId,
        window: Option<EffectiveWindow>,
    ) -> Self {
        Self {
            source,
            kind: TransferKind::Teacher,
            entity_ids: Vec::new(),
            candidate_teacher_id: Some(candidate_teacher_id),
            window,
        }
    }

    /// Number of students moving; the resolver rejects selections that repeat an id.
    pub fn moving_count(&self) -> usize {
        self.entity_ids.len()
    }
}

/// Teacher data supplied by the teacher-transfer validation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherProfile {
    pub id: TeacherId,
    #[serde(default)]
    pub name: String,
    pub active: bool,
    #[serde(default)]
    pub subject_ids: Vec<SubjectId>,
    /// Human-readable explanation shown when the teacher cannot teach the class subject.
    #[serde(default)]
    pub incompatible_subject_message: Option<String>,
}

impl TeacherProfile {
    pub fn teaches(&self, subject: &SubjectId) -> bool {
        self.subject_ids.iter().any(|candidate| candidate == subject)
    }
}

/// One recurring session already on a teacher's timetable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherSession {
    pub class_id: ClassId,
    #[serde(default)]
    pub class_name: String,
    pub slot: ScheduleSlot,
    #[serde(default)]
    pub active_from: Option<NaiveDate>,
    #[serde(default)]
    pub active_until: Option<NaiveDate>,
}
