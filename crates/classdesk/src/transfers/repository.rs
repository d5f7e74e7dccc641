use serde::{Deserialize, Serialize};

use super::domain::{
    ClassId, ClassSummary, EffectiveWindow, StudentId, TeacherId, TeacherProfile, TeacherSession,
};

/// Read side of the class-management backend: the snapshots the resolver runs on.
pub trait ClassCatalog: Send + Sync {
    fn class(&self, id: &ClassId) -> Result<Option<ClassSummary>, CatalogError>;
    /// Candidate destinations for a move out of `source`. Implementations may pre-filter,
    /// the resolver re-checks every rule regardless.
    fn transfer_candidates(
        &self,
        source: &ClassSummary,
    ) -> Result<Vec<ClassSummary>, CatalogError>;
    fn teacher(&self, id: &TeacherId) -> Result<Option<TeacherProfile>, CatalogError>;
    fn teacher_sessions(&self, id: &TeacherId) -> Result<Vec<TeacherSession>, CatalogError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("class catalog unavailable: {0}")]
    Unavailable(String),
}

/// Write side: performs the confirmed move. Must re-check capacity itself at commit time.
pub trait TransferLedger: Send + Sync {
    fn record(
        &self,
        transfer_id: String,
        commit: TransferCommit,
    ) -> Result<TransferReceipt, LedgerError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("transfer conflicts with current enrollment: {0}")]
    Conflict(String),
    #[error("transfer ledger unavailable: {0}")]
    Unavailable(String),
}

/// Mutation sent to the backend once the user confirms a resolver-approved choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransferCommit {
    Students {
        source_class_id: ClassId,
        destination_class_id: ClassId,
        student_ids: Vec<StudentId>,
    },
    Teacher {
        class_id: ClassId,
        teacher_id: TeacherId,
        window: EffectiveWindow,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub transfer_id: String,
    pub commit: TransferCommit,
}
