//! Reconciliation between the attendance sheet stored on the server and the marks a
//! teacher or manager has edited locally but not yet saved.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::transfers::StudentId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Excused,
}

/// One student's mark for a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceMark {
    pub status: AttendanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl AttendanceMark {
    pub fn new(status: AttendanceStatus) -> Self {
        Self { status, note: None }
    }

    pub fn with_note(status: AttendanceStatus, note: impl Into<String>) -> Self {
        Self {
            status,
            note: Some(note.into()),
        }
    }
}

pub type AttendanceSheet = BTreeMap<StudentId, AttendanceMark>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkChange {
    pub previous: AttendanceMark,
    pub next: AttendanceMark,
}

/// What has to be sent to the server to make it match the local sheet.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChangeSet {
    pub added: BTreeMap<StudentId, AttendanceMark>,
    pub updated: BTreeMap<StudentId, MarkChange>,
    pub removed: BTreeMap<StudentId, AttendanceMark>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.added.len() + self.updated.len() + self.removed.len()
    }

    /// Whether the student's mark differs from the server copy.
    pub fn touches(&self, student: &StudentId) -> bool {
        self.added.contains_key(student)
            || self.updated.contains_key(student)
            || self.removed.contains_key(student)
    }
}

/// Key-by-key comparison of the two sheets. Neither input is modified.
pub fn diff(server: &AttendanceSheet, local: &AttendanceSheet) -> ChangeSet {
    let mut changes = ChangeSet::default();

    for (student, mark) in local {
        match server.get(student) {
            None => {
                changes.added.insert(student.clone(), mark.clone());
            }
            Some(previous) if previous != mark => {
                changes.updated.insert(
                    student.clone(),
                    MarkChange {
                        previous: previous.clone(),
                        next: mark.clone(),
                    },
                );
            }
            Some(_) => {}
        }
    }

    for (student, mark) in server {
        if !local.contains_key(student) {
            changes.removed.insert(student.clone(), mark.clone());
        }
    }

    changes
}
