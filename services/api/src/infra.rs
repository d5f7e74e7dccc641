use chrono::NaiveDate;
use classdesk::catalog::ClassCatalogImporter;
use classdesk::config::TransferConfig;
use classdesk::error::AppError;
use classdesk::transfers::{
    CatalogError, ClassCatalog, ClassId, ClassSummary, LedgerError, TeacherId, TeacherProfile,
    TeacherSession, TransferCommit, TransferLedger, TransferReceipt,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Teacher details that a class export does not carry.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct TeacherRoster {
    #[serde(default)]
    pub(crate) teachers: Vec<RosterEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RosterEntry {
    #[serde(flatten)]
    pub(crate) profile: TeacherProfile,
    #[serde(default)]
    pub(crate) sessions: Vec<TeacherSession>,
}

/// Classes, teachers, and committed transfers held in memory for the service and CLI.
#[derive(Default, Clone)]
pub(crate) struct InMemoryCampus {
    classes: Arc<Mutex<Vec<ClassSummary>>>,
    teachers: Arc<Mutex<HashMap<TeacherId, TeacherProfile>>>,
    sessions: Arc<Mutex<HashMap<TeacherId, Vec<TeacherSession>>>>,
    receipts: Arc<Mutex<Vec<TransferReceipt>>>,
}

impl InMemoryCampus {
    /// Seeds the campus and registers an active profile for every teacher named in a
    /// class, qualified for the subjects they already teach.
    pub(crate) fn with_classes(classes: Vec<ClassSummary>) -> Self {
        let mut subjects: HashMap<TeacherId, BTreeSet<_>> = HashMap::new();
        for class in &classes {
            if let Some(teacher) = &class.teacher_id {
                subjects
                    .entry(teacher.clone())
                    .or_default()
                    .insert(class.subject_id.clone());
            }
        }

        let campus = Self::default();
        {
            let mut teachers = campus.teachers.lock().expect("campus mutex poisoned");
            for (id, subject_ids) in subjects {
                teachers.insert(
                    id.clone(),
                    TeacherProfile {
                        name: id.to_string(),
                        id,
                        active: true,
                        subject_ids: subject_ids.into_iter().collect(),
                        incompatible_subject_message: None,
                    },
                );
            }
        }
        *campus.classes.lock().expect("campus mutex poisoned") = classes;
        campus
    }

    /// Replaces any derived profile for the teacher and adds their extra sessions.
    pub(crate) fn add_teacher(&self, profile: TeacherProfile, sessions: Vec<TeacherSession>) {
        self.sessions
            .lock()
            .expect("campus mutex poisoned")
            .insert(profile.id.clone(), sessions);
        self.teachers
            .lock()
            .expect("campus mutex poisoned")
            .insert(profile.id.clone(), profile);
    }

    pub(crate) fn apply_roster(&self, roster: TeacherRoster) {
        for entry in roster.teachers {
            self.add_teacher(entry.profile, entry.sessions);
        }
    }

    pub(crate) fn classes(&self) -> Vec<ClassSummary> {
        self.classes.lock().expect("campus mutex poisoned").clone()
    }

    pub(crate) fn receipts(&self) -> Vec<TransferReceipt> {
        self.receipts.lock().expect("campus mutex poisoned").clone()
    }
}

impl ClassCatalog for InMemoryCampus {
    fn class(&self, id: &ClassId) -> Result<Option<ClassSummary>, CatalogError> {
        let guard = self.classes.lock().expect("campus mutex poisoned");
        Ok(guard.iter().find(|class| &class.id == id).cloned())
    }

    fn transfer_candidates(
        &self,
        source: &ClassSummary,
    ) -> Result<Vec<ClassSummary>, CatalogError> {
        let guard = self.classes.lock().expect("campus mutex poisoned");
        Ok(guard
            .iter()
            .filter(|class| class.subject_id == source.subject_id)
            .cloned()
            .collect())
    }

    fn teacher(&self, id: &TeacherId) -> Result<Option<TeacherProfile>, CatalogError> {
        let guard = self.teachers.lock().expect("campus mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    /// Sessions of every running class the teacher leads, plus any registered extras.
    fn teacher_sessions(&self, id: &TeacherId) -> Result<Vec<TeacherSession>, CatalogError> {
        let mut sessions: Vec<TeacherSession> = {
            let guard = self.classes.lock().expect("campus mutex poisoned");
            guard
                .iter()
                .filter(|class| class.teacher_id.as_ref() == Some(id))
                .filter(|class| class.status.accepts_transfers())
                .flat_map(|class| {
                    class.schedule.iter().map(|slot| TeacherSession {
                        class_id: class.id.clone(),
                        class_name: class.display_name().to_string(),
                        slot: *slot,
                        active_from: None,
                        active_until: None,
                    })
                })
                .collect()
        };

        let extras = self.sessions.lock().expect("campus mutex poisoned");
        if let Some(extra) = extras.get(id) {
            sessions.extend(extra.iter().cloned());
        }
        Ok(sessions)
    }
}

impl TransferLedger for InMemoryCampus {
    fn record(
        &self,
        transfer_id: String,
        commit: TransferCommit,
    ) -> Result<TransferReceipt, LedgerError> {
        let mut classes = self.classes.lock().expect("campus mutex poisoned");

        match &commit {
            TransferCommit::Students {
                source_class_id,
                destination_class_id,
                student_ids,
            } => {
                let distinct = student_ids.iter().collect::<BTreeSet<_>>().len();
                let moving = u32::try_from(distinct).map_err(|_| {
                    LedgerError::Conflict("too many students in one transfer".to_string())
                })?;
                let destination = classes
                    .iter_mut()
                    .find(|class| &class.id == destination_class_id)
                    .ok_or_else(|| {
                        LedgerError::Conflict(format!("class {destination_class_id} not found"))
                    })?;
                if let Some(seats) = destination.remaining_seats() {
                    if seats < moving {
                        return Err(LedgerError::Conflict(format!(
                            "class {destination_class_id} has {seats} seats left"
                        )));
                    }
                }
                destination.current_occupancy += moving;

                if let Some(source) = classes
                    .iter_mut()
                    .find(|class| &class.id == source_class_id)
                {
                    source.current_occupancy = source.current_occupancy.saturating_sub(moving);
                }
            }
            TransferCommit::Teacher {
                class_id,
                teacher_id,
                window,
            } => {
                let class = classes
                    .iter_mut()
                    .find(|class| &class.id == class_id)
                    .ok_or_else(|| LedgerError::Conflict(format!("class {class_id} not found")))?;
                // Substitutions leave the regular teacher assigned.
                if !window.is_temporary() {
                    class.teacher_id = Some(teacher_id.clone());
                }
            }
        }

        let receipt = TransferReceipt {
            transfer_id,
            commit,
        };
        self.receipts
            .lock()
            .expect("campus mutex poisoned")
            .push(receipt.clone());
        Ok(receipt)
    }
}

/// Builds the campus from `catalog` (or the configured export, or the sample campus) and
/// layers an optional teacher roster file on top.
pub(crate) fn load_campus(
    config: &TransferConfig,
    catalog: Option<&Path>,
    roster: Option<&Path>,
) -> Result<InMemoryCampus, AppError> {
    let catalog = catalog.or(config.catalog_csv.as_deref());
    let campus = match catalog {
        Some(path) => {
            let classes = ClassCatalogImporter::from_path(path)?;
            info!(path = %path.display(), classes = classes.len(), "loaded class export");
            InMemoryCampus::with_classes(classes)
        }
        None => crate::demo::sample_campus(),
    };

    if let Some(path) = roster {
        let raw = std::fs::read_to_string(path)?;
        let roster: TeacherRoster = serde_json::from_str(&raw)?;
        campus.apply_roster(roster);
    }

    Ok(campus)
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use classdesk::transfers::{
        ClassStatus, EffectiveWindow, GradeId, ScheduleSlot, StudentId, SubjectId,
    };

    fn class(id: &str, teacher: &str, occupancy: u32) -> ClassSummary {
        ClassSummary {
            id: ClassId::new(id),
            name: format!("Math 9 {id}"),
            subject_id: SubjectId::new("math"),
            grade_id: GradeId::new("9"),
            status: ClassStatus::Active,
            current_occupancy: occupancy,
            max_capacity: Some(10),
            teacher_id: Some(TeacherId::new(teacher)),
            schedule: vec![ScheduleSlot::parse(2, "17:00", "18:30").expect("slot")],
        }
    }

    #[test]
    fn derives_teacher_profiles_and_sessions_from_classes() {
        let campus = InMemoryCampus::with_classes(vec![class("A", "t-kim", 3)]);

        let profile = campus
            .teacher(&TeacherId::new("t-kim"))
            .expect("catalog available")
            .expect("profile derived");
        assert!(profile.active);
        assert!(profile.teaches(&SubjectId::new("math")));

        let sessions = campus
            .teacher_sessions(&TeacherId::new("t-kim"))
            .expect("catalog available");
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].class_id, ClassId::new("A"));
    }

    #[test]
    fn student_commit_moves_occupancy_and_guards_capacity() {
        let campus =
            InMemoryCampus::with_classes(vec![class("A", "t-kim", 3), class("B", "t-kim", 9)]);

        let into_full = TransferCommit::Students {
            source_class_id: ClassId::new("A"),
            destination_class_id: ClassId::new("B"),
            student_ids: vec![StudentId::new("s1"), StudentId::new("s2")],
        };
        assert!(matches!(
            campus.record("trf-1".to_string(), into_full),
            Err(LedgerError::Conflict(_))
        ));

        let back_to_a = TransferCommit::Students {
            source_class_id: ClassId::new("B"),
            destination_class_id: ClassId::new("A"),
            student_ids: vec![StudentId::new("s1")],
        };
        campus
            .record("trf-2".to_string(), back_to_a)
            .expect("room in A");
        let classes = campus.classes();
        assert_eq!(classes[0].current_occupancy, 4);
        assert_eq!(classes[1].current_occupancy, 8);
        assert_eq!(campus.receipts().len(), 1);
    }

    #[test]
    fn repeated_student_ids_occupy_one_seat() {
        let campus =
            InMemoryCampus::with_classes(vec![class("A", "t-kim", 3), class("B", "t-kim", 9)]);

        let repeated = TransferCommit::Students {
            source_class_id: ClassId::new("A"),
            destination_class_id: ClassId::new("B"),
            student_ids: vec![StudentId::new("s1"), StudentId::new("s1")],
        };
        campus
            .record("trf-1".to_string(), repeated)
            .expect("one seat left in B");

        let classes = campus.classes();
        assert_eq!(classes[0].current_occupancy, 2);
        assert_eq!(classes[1].current_occupancy, 10);
    }

    #[test]
    fn only_permanent_teacher_commits_reassign_the_class() {
        let campus = InMemoryCampus::with_classes(vec![class("A", "t-kim", 3)]);
        let start = NaiveDate::from_ymd_opt(2025, 9, 1).expect("date");
        let end = NaiveDate::from_ymd_opt(2025, 9, 30).expect("date");

        let substitution = TransferCommit::Teacher {
            class_id: ClassId::new("A"),
            teacher_id: TeacherId::new("t-sub"),
            window: EffectiveWindow::temporary(start, end),
        };
        campus
            .record("trf-1".to_string(), substitution)
            .expect("recorded");
        assert_eq!(campus.classes()[0].teacher_id, Some(TeacherId::new("t-kim")));

        let handover = TransferCommit::Teacher {
            class_id: ClassId::new("A"),
            teacher_id: TeacherId::new("t-new"),
            window: EffectiveWindow::permanent(start),
        };
        campus.record("trf-2".to_string(), handover).expect("recorded");
        assert_eq!(campus.classes()[0].teacher_id, Some(TeacherId::new("t-new")));
    }

    #[test]
    fn parses_iso_dates_only() {
        assert!(parse_date("2025-09-01").is_ok());
        assert!(parse_date("01/09/2025").is_err());
    }
}
