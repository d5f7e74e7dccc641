use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::transfers::domain::{
    ClassId, ClassStatus, ClassSummary, GradeId, SubjectId, TeacherId, TeacherProfile,
    TeacherSession,
};
use crate::transfers::repository::{
    CatalogError, ClassCatalog, LedgerError, TransferCommit, TransferLedger, TransferReceipt,
};
use crate::transfers::schedule::ScheduleSlot;
use crate::transfers::{transfer_router, TransferEligibilityResolver, TransferService};

pub(super) fn slot(day: u8, start: &str, end: &str) -> ScheduleSlot {
    ScheduleSlot::parse(day, start, end).expect("valid slot")
}

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn class(id: &str, subject: &str, grade: &str) -> ClassSummary {
    ClassSummary {
        id: ClassId::new(id),
        name: format!("Class {id}"),
        subject_id: SubjectId::new(subject),
        grade_id: GradeId::new(grade),
        status: ClassStatus::Active,
        current_occupancy: 0,
        max_capacity: Some(20),
        teacher_id: None,
        schedule: Vec::new(),
    }
}

pub(super) fn math_class(id: &str, teacher: Option<&str>, occupancy: u32) -> ClassSummary {
    let mut summary = class(id, "math", "9");
    summary.teacher_id = teacher.map(TeacherId::new);
    summary.current_occupancy = occupancy;
    summary
}

pub(super) fn ids(classes: &[ClassSummary]) -> Vec<&str> {
    classes.iter().map(|class| class.id.as_str()).collect()
}

pub(super) fn teacher(id: &str, subjects: &[&str]) -> TeacherProfile {
    TeacherProfile {
        id: TeacherId::new(id),
        name: format!("Teacher {id}"),
        active: true,
        subject_ids: subjects.iter().map(|subject| SubjectId::new(*subject)).collect(),
        incompatible_subject_message: None,
    }
}

pub(super) fn session(class_id: &str, slot: ScheduleSlot) -> TeacherSession {
    TeacherSession {
        class_id: ClassId::new(class_id),
        class_name: format!("Class {class_id}"),
        slot,
        active_from: None,
        active_until: None,
    }
}

/// Source class for the teacher flows: math 9, Monday and Wednesday afternoons.
pub(super) fn handover_class() -> ClassSummary {
    let mut source = math_class("M9-A", Some("t-old"), 12);
    source.schedule = vec![slot(1, "16:00", "17:30"), slot(3, "16:00", "17:30")];
    source
}

#[derive(Default, Clone)]
pub(super) struct MemoryCatalog {
    pub(super) classes: Arc<Mutex<Vec<ClassSummary>>>,
    pub(super) teachers: Arc<Mutex<HashMap<TeacherId, TeacherProfile>>>,
    pub(super) sessions: Arc<Mutex<HashMap<TeacherId, Vec<TeacherSession>>>>,
}

impl MemoryCatalog {
    pub(super) fn with_classes(classes: Vec<ClassSummary>) -> Self {
        let catalog = Self::default();
        *catalog.classes.lock().expect("catalog mutex poisoned") = classes;
        catalog
    }

    pub(super) fn add_teacher(&self, profile: TeacherProfile, sessions: Vec<TeacherSession>) {
        self.sessions
            .lock()
            .expect("catalog mutex poisoned")
            .insert(profile.id.clone(), sessions);
        self.teachers
            .lock()
            .expect("catalog mutex poisoned")
            .insert(profile.id.clone(), profile);
    }

    pub(super) fn set_occupancy(&self, id: &str, occupancy: u32) {
        let mut guard = self.classes.lock().expect("catalog mutex poisoned");
        if let Some(class) = guard.iter_mut().find(|class| class.id.as_str() == id) {
            class.current_occupancy = occupancy;
        }
    }
}

impl ClassCatalog for MemoryCatalog {
    fn class(&self, id: &ClassId) -> Result<Option<ClassSummary>, CatalogError> {
        let guard = self.classes.lock().expect("catalog mutex poisoned");
        Ok(guard.iter().find(|class| &class.id == id).cloned())
    }

    fn transfer_candidates(
        &self,
        _source: &ClassSummary,
    ) -> Result<Vec<ClassSummary>, CatalogError> {
        Ok(self.classes.lock().expect("catalog mutex poisoned").clone())
    }

    fn teacher(&self, id: &TeacherId) -> Result<Option<TeacherProfile>, CatalogError> {
        let guard = self.teachers.lock().expect("catalog mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn teacher_sessions(&self, id: &TeacherId) -> Result<Vec<TeacherSession>, CatalogError> {
        let guard = self.sessions.lock().expect("catalog mutex poisoned");
        Ok(guard.get(id).cloned().unwrap_or_default())
    }
}

pub(super) struct UnavailableCatalog;

impl ClassCatalog for UnavailableCatalog {
    fn class(&self, _id: &ClassId) -> Result<Option<ClassSummary>, CatalogError> {
        Err(CatalogError::Unavailable("timeout".to_string()))
    }

    fn transfer_candidates(
        &self,
        _source: &ClassSummary,
    ) -> Result<Vec<ClassSummary>, CatalogError> {
        Err(CatalogError::Unavailable("timeout".to_string()))
    }

    fn teacher(&self, _id: &TeacherId) -> Result<Option<TeacherProfile>, CatalogError> {
        Err(CatalogError::Unavailable("timeout".to_string()))
    }

    fn teacher_sessions(&self, _id: &TeacherId) -> Result<Vec<TeacherSession>, CatalogError> {
        Err(CatalogError::Unavailable("timeout".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryLedger {
    commits: Arc<Mutex<Vec<TransferReceipt>>>,
}

impl MemoryLedger {
    pub(super) fn receipts(&self) -> Vec<TransferReceipt> {
        self.commits.lock().expect("ledger mutex poisoned").clone()
    }
}

impl TransferLedger for MemoryLedger {
    fn record(
        &self,
        transfer_id: String,
        commit: TransferCommit,
    ) -> Result<TransferReceipt, LedgerError> {
        let receipt = TransferReceipt {
            transfer_id,
            commit,
        };
        self.commits
            .lock()
            .expect("ledger mutex poisoned")
            .push(receipt.clone());
        Ok(receipt)
    }
}

pub(super) struct FullLedger;

impl TransferLedger for FullLedger {
    fn record(
        &self,
        _transfer_id: String,
        _commit: TransferCommit,
    ) -> Result<TransferReceipt, LedgerError> {
        Err(LedgerError::Conflict(
            "destination filled up before commit".to_string(),
        ))
    }
}

/// Source `M9-A` plus three math 9 destinations and one english class.
pub(super) fn campus() -> Vec<ClassSummary> {
    let mut english = class("E9-A", "english", "9");
    english.current_occupancy = 1;

    vec![
        math_class("M9-A", Some("t-old"), 12),
        math_class("M9-B", Some("t-old"), 15),
        math_class("M9-C", Some("t-lee"), 4),
        math_class("M9-D", None, 19),
        english,
    ]
}

pub(super) fn build_service() -> (
    TransferService<MemoryCatalog, MemoryLedger>,
    Arc<MemoryCatalog>,
    Arc<MemoryLedger>,
) {
    let catalog = Arc::new(MemoryCatalog::with_classes(campus()));
    let ledger = Arc::new(MemoryLedger::default());
    let service = TransferService::new(
        catalog.clone(),
        ledger.clone(),
        TransferEligibilityResolver::new(),
    );
    (service, catalog, ledger)
}

pub(super) fn router_with_service(
    service: TransferService<MemoryCatalog, MemoryLedger>,
) -> axum::Router {
    transfer_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}
