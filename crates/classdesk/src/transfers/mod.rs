//! Eligibility of destination classes and substitute teachers when moving enrollment
//! between classes.
//!
//! The resolver is pure: callers fetch snapshots (candidate classes, teacher timetable),
//! hand them in, and get back a ranked list or a verdict. `TransferService` wires the
//! resolver to a catalog and a ledger so commits are re-checked against fresh data.

pub mod domain;
pub(crate) mod eligibility;
pub mod repository;
pub mod resolver;
pub mod router;
pub mod schedule;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    ClassId, ClassStatus, ClassSummary, EffectiveWindow, GradeId, StudentId, SubjectId,
    TeacherId, TeacherProfile, TeacherSession, TransferKind, TransferRequest,
};
pub use eligibility::{
    check_candidate, filter_eligible, has_capacity_for, rank, resolve_teacher_transfer,
    EligibilityResult, IneligibleReason, RejectedCandidate, ScheduleConflict,
    StudentTransferOutcome, TeacherVerdict,
};
pub use repository::{
    CatalogError, ClassCatalog, LedgerError, TransferCommit, TransferLedger, TransferReceipt,
};
pub use resolver::{
    validate_selection, validate_window, ScheduleData, TransferEligibilityResolver, TransferError,
};
pub use router::transfer_router;
pub use schedule::{overlaps, DayOfWeek, InvalidScheduleSlot, ScheduleSlot, TimeOfDay};
pub use service::{TransferService, TransferServiceError};
