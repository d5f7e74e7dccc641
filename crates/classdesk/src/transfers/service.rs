use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::domain::{
    ClassId, ClassSummary, EffectiveWindow, StudentId, TeacherId, TransferRequest,
};
use super::eligibility::{
    check_candidate, IneligibleReason, StudentTransferOutcome, TeacherVerdict,
};
use super::repository::{
    CatalogError, ClassCatalog, LedgerError, TransferCommit, TransferLedger, TransferReceipt,
};
use super::resolver::{
    validate_selection, ScheduleData, TransferEligibilityResolver, TransferError,
};

/// Service composing the class catalog, the resolver, and the transfer ledger.
pub struct TransferService<C, L> {
    catalog: Arc<C>,
    ledger: Arc<L>,
    resolver: TransferEligibilityResolver,
}

static TRANSFER_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_transfer_id() -> String {
    let id = TRANSFER_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("trf-{id:06}")
}

impl<C, L> TransferService<C, L>
where
    C: ClassCatalog + 'static,
    L: TransferLedger + 'static,
{
    pub fn new(catalog: Arc<C>, ledger: Arc<L>, resolver: TransferEligibilityResolver) -> Self {
        Self {
            catalog,
            ledger,
            resolver,
        }
    }

    /// Ranked destinations for moving `student_ids` out of `source_id`.
    pub fn student_candidates(
        &self,
        source_id: &ClassId,
        student_ids: Vec<StudentId>,
    ) -> Result<StudentTransferOutcome, TransferServiceError> {
        let source = self.known_class(source_id)?;
        let catalog = self.catalog.transfer_candidates(&source)?;
        let request = TransferRequest::students(source, student_ids);

        let outcome = self.resolver.resolve_students(&request, &catalog)?;
        debug!(
            source = %source_id,
            considered = catalog.len(),
            eligible = outcome.eligible.len(),
            "resolved student transfer candidates"
        );
        Ok(outcome)
    }

    /// Whether `teacher_id` can take over `source_id` from `window.effective_date`.
    pub fn validate_teacher(
        &self,
        source_id: &ClassId,
        teacher_id: &TeacherId,
        window: EffectiveWindow,
    ) -> Result<TeacherVerdict, TransferServiceError> {
        let source = self.known_class(source_id)?;
        let schedule_data = ScheduleData {
            teacher: self.catalog.teacher(teacher_id)?,
            teacher_sessions: self.catalog.teacher_sessions(teacher_id)?,
        };
        if schedule_data.teacher.is_none() {
            return Err(TransferServiceError::UnknownTeacher(teacher_id.clone()));
        }

        let request = TransferRequest::teacher(source, teacher_id.clone(), Some(window));
        let verdict = self.resolver.resolve_teacher(&request, &schedule_data)?;
        debug!(
            class = %source_id,
            teacher = %teacher_id,
            eligible = verdict.is_eligible(),
            "validated teacher transfer"
        );
        Ok(verdict)
    }

    /// Re-check `destination_id` against fresh snapshots, then record the move.
    pub fn commit_students(
        &self,
        source_id: &ClassId,
        destination_id: &ClassId,
        student_ids: Vec<StudentId>,
    ) -> Result<TransferReceipt, TransferServiceError> {
        validate_selection(&student_ids)?;

        let source = self.known_class(source_id)?;
        let destination = self.known_class(destination_id)?;
        if let Err(reason) = check_candidate(&source, &destination, student_ids.len()) {
            warn!(
                source = %source_id,
                destination = %destination_id,
                reason = reason.code(),
                "student transfer rejected at commit"
            );
            return Err(TransferServiceError::Rejected(reason));
        }

        let moved = student_ids.len();
        let receipt = self.ledger.record(
            next_transfer_id(),
            TransferCommit::Students {
                source_class_id: source_id.clone(),
                destination_class_id: destination_id.clone(),
                student_ids,
            },
        )?;
        info!(
            transfer = %receipt.transfer_id,
            source = %source_id,
            destination = %destination_id,
            moved,
            "student transfer recorded"
        );
        Ok(receipt)
    }

    /// Re-validate the teacher and record the reassignment when still eligible.
    pub fn commit_teacher(
        &self,
        class_id: &ClassId,
        teacher_id: &TeacherId,
        window: EffectiveWindow,
    ) -> Result<TransferReceipt, TransferServiceError> {
        match self.validate_teacher(class_id, teacher_id, window)? {
            TeacherVerdict::Eligible => {}
            TeacherVerdict::Ineligible(reason) => {
                warn!(
                    class = %class_id,
                    teacher = %teacher_id,
                    reason = reason.code(),
                    "teacher transfer rejected at commit"
                );
                return Err(TransferServiceError::Rejected(reason));
            }
        }

        let receipt = self.ledger.record(
            next_transfer_id(),
            TransferCommit::Teacher {
                class_id: class_id.clone(),
                teacher_id: teacher_id.clone(),
                window,
            },
        )?;
        info!(
            transfer = %receipt.transfer_id,
            class = %class_id,
            teacher = %teacher_id,
            temporary = window.is_temporary(),
            "teacher transfer recorded"
        );
        Ok(receipt)
    }

    fn known_class(&self, id: &ClassId) -> Result<ClassSummary, TransferServiceError> {
        self.catalog
            .class(id)?
            .ok_or_else(|| TransferServiceError::UnknownClass(id.clone()))
    }
}

/// Error raised by the transfer service.
#[derive(Debug, thiserror::Error)]
pub enum TransferServiceError {
    #[error("unknown class {0}")]
    UnknownClass(ClassId),
    #[error("unknown teacher {0}")]
    UnknownTeacher(TeacherId),
    #[error("transfer rejected: {}", .0.summary())]
    Rejected(IneligibleReason),
    #[error(transparent)]
    Transfer(#[from] TransferError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
