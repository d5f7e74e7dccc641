use super::common::*;
use crate::transfers::domain::{ClassId, EffectiveWindow, StudentId, TeacherId};
use crate::transfers::repository::{LedgerError, TransferCommit};
use crate::transfers::{
    IneligibleReason, TeacherVerdict, TransferEligibilityResolver, TransferError,
    TransferService, TransferServiceError,
};
use std::sync::Arc;

fn students(ids: &[&str]) -> Vec<StudentId> {
    ids.iter().map(|id| StudentId::new(*id)).collect()
}

#[test]
fn candidates_come_from_fresh_catalog_snapshot() {
    let (service, catalog, _) = build_service();
    let source = ClassId::new("M9-A");

    let before = service
        .student_candidates(&source, students(&["stu-1"]))
        .expect("candidates resolve");
    assert_eq!(ids(&before.eligible), vec!["M9-B", "M9-C", "M9-D"]);

    catalog.set_occupancy("M9-B", 20);
    let after = service
        .student_candidates(&source, students(&["stu-1"]))
        .expect("candidates resolve");
    assert_eq!(ids(&after.eligible), vec!["M9-C", "M9-D"]);
}

#[test]
fn unknown_source_class_is_reported() {
    let (service, _, _) = build_service();

    match service.student_candidates(&ClassId::new("nope"), students(&["stu-1"])) {
        Err(TransferServiceError::UnknownClass(id)) => assert_eq!(id.as_str(), "nope"),
        other => panic!("expected unknown class, got {other:?}"),
    }
}

#[test]
fn commit_records_eligible_destination() {
    let (service, _, ledger) = build_service();

    let receipt = service
        .commit_students(
            &ClassId::new("M9-A"),
            &ClassId::new("M9-C"),
            students(&["stu-1", "stu-2"]),
        )
        .expect("commit succeeds");

    assert!(receipt.transfer_id.starts_with("trf-"));
    assert_eq!(ledger.receipts(), vec![receipt.clone()]);
    match receipt.commit {
        TransferCommit::Students {
            destination_class_id,
            student_ids,
            ..
        } => {
            assert_eq!(destination_class_id.as_str(), "M9-C");
            assert_eq!(student_ids.len(), 2);
        }
        other => panic!("expected student commit, got {other:?}"),
    }
}

#[test]
fn commit_revalidates_capacity_against_fresh_data() {
    let (service, catalog, ledger) = build_service();
    let source = ClassId::new("M9-A");
    let destination = ClassId::new("M9-B");

    let outcome = service
        .student_candidates(&source, students(&["stu-1", "stu-2"]))
        .expect("candidates resolve");
    assert!(outcome.contains(&destination));

    catalog.set_occupancy("M9-B", 19);
    match service.commit_students(&source, &destination, students(&["stu-1", "stu-2"])) {
        Err(TransferServiceError::Rejected(IneligibleReason::InsufficientCapacity {
            available,
            requested,
        })) => {
            assert_eq!(available, 1);
            assert_eq!(requested, 2);
        }
        other => panic!("expected capacity rejection, got {other:?}"),
    }
    assert!(ledger.receipts().is_empty());
}

#[test]
fn commit_rejects_wrong_subject_and_empty_selection() {
    let (service, _, ledger) = build_service();

    match service.commit_students(
        &ClassId::new("M9-A"),
        &ClassId::new("E9-A"),
        students(&["stu-1"]),
    ) {
        Err(TransferServiceError::Rejected(IneligibleReason::WrongSubjectOrGrade)) => {}
        other => panic!("expected subject rejection, got {other:?}"),
    }

    match service.commit_students(&ClassId::new("M9-A"), &ClassId::new("M9-B"), Vec::new()) {
        Err(TransferServiceError::Transfer(TransferError::NoStudentsSelected)) => {}
        other => panic!("expected empty selection error, got {other:?}"),
    }
    assert!(ledger.receipts().is_empty());
}

#[test]
fn ledger_conflicts_propagate() {
    let catalog = Arc::new(MemoryCatalog::with_classes(campus()));
    let service = TransferService::new(
        catalog,
        Arc::new(FullLedger),
        TransferEligibilityResolver::new(),
    );

    match service.commit_students(
        &ClassId::new("M9-A"),
        &ClassId::new("M9-C"),
        students(&["stu-1"]),
    ) {
        Err(TransferServiceError::Ledger(LedgerError::Conflict(_))) => {}
        other => panic!("expected ledger conflict, got {other:?}"),
    }
}

#[test]
fn catalog_outages_propagate() {
    let service = TransferService::new(
        Arc::new(UnavailableCatalog),
        Arc::new(MemoryLedger::default()),
        TransferEligibilityResolver::new(),
    );

    match service.student_candidates(&ClassId::new("M9-A"), students(&["stu-1"])) {
        Err(TransferServiceError::Catalog(_)) => {}
        other => panic!("expected catalog error, got {other:?}"),
    }
}

#[test]
fn teacher_validation_uses_catalog_timetable() {
    let mut classes = campus();
    classes[0] = handover_class();
    let catalog = Arc::new(MemoryCatalog::with_classes(classes));
    catalog.add_teacher(
        teacher("t-new", &["math"]),
        vec![session("M8-A", slot(3, "17:00", "18:00"))],
    );
    catalog.add_teacher(teacher("t-free", &["math"]), Vec::new());
    let ledger = Arc::new(MemoryLedger::default());
    let service = TransferService::new(
        catalog,
        ledger.clone(),
        TransferEligibilityResolver::new(),
    );
    let class_id = ClassId::new("M9-A");
    let window = EffectiveWindow::permanent(date(2025, 9, 1));

    let busy = service
        .validate_teacher(&class_id, &TeacherId::new("t-new"), window)
        .expect("validation runs");
    assert_eq!(busy.reason().map(IneligibleReason::code), Some("schedule_conflict"));

    match service.commit_teacher(&class_id, &TeacherId::new("t-new"), window) {
        Err(TransferServiceError::Rejected(IneligibleReason::ScheduleConflict { conflicts })) => {
            assert_eq!(conflicts.len(), 1)
        }
        other => panic!("expected conflict rejection, got {other:?}"),
    }

    let free = service
        .validate_teacher(&class_id, &TeacherId::new("t-free"), window)
        .expect("validation runs");
    assert_eq!(free, TeacherVerdict::Eligible);

    let receipt = service
        .commit_teacher(&class_id, &TeacherId::new("t-free"), window)
        .expect("commit succeeds");
    assert_eq!(
        receipt.commit,
        TransferCommit::Teacher {
            class_id,
            teacher_id: TeacherId::new("t-free"),
            window,
        }
    );
    assert_eq!(ledger.receipts().len(), 1);
}

#[test]
fn unknown_teacher_is_reported() {
    let (service, _, _) = build_service();

    match service.validate_teacher(
        &ClassId::new("M9-A"),
        &TeacherId::new("ghost"),
        EffectiveWindow::permanent(date(2025, 9, 1)),
    ) {
        Err(TransferServiceError::UnknownTeacher(id)) => assert_eq!(id.as_str(), "ghost"),
        other => panic!("expected unknown teacher, got {other:?}"),
    }
}

#[test]
fn commit_rejects_repeated_students_before_recording() {
    let (service, _, ledger) = build_service();

    match service.commit_students(
        &ClassId::new("M9-A"),
        &ClassId::new("M9-D"),
        students(&["stu-1", "stu-1"]),
    ) {
        Err(TransferServiceError::Transfer(TransferError::DuplicateStudent(id))) => {
            assert_eq!(id.as_str(), "stu-1")
        }
        other => panic!("expected duplicate student error, got {other:?}"),
    }
    assert!(ledger.receipts().is_empty());
}
