use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use super::domain::{ClassId, EffectiveWindow, StudentId, TeacherId};
use super::eligibility::TeacherVerdict;
use super::repository::{ClassCatalog, LedgerError, TransferLedger};
use super::service::{TransferService, TransferServiceError};

#[derive(Debug, Deserialize)]
pub(crate) struct StudentCandidatesRequest {
    pub(crate) source_class_id: ClassId,
    pub(crate) student_ids: Vec<StudentId>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StudentCommitRequest {
    pub(crate) source_class_id: ClassId,
    pub(crate) destination_class_id: ClassId,
    pub(crate) student_ids: Vec<StudentId>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TeacherTransferRequest {
    pub(crate) source_class_id: ClassId,
    pub(crate) teacher_id: TeacherId,
    pub(crate) effective_date: NaiveDate,
    #[serde(default)]
    pub(crate) substitute_end_date: Option<NaiveDate>,
}

impl TeacherTransferRequest {
    fn window(&self) -> EffectiveWindow {
        EffectiveWindow {
            effective_date: self.effective_date,
            substitute_end_date: self.substitute_end_date,
        }
    }
}

/// Router builder exposing candidate lookup, validation, and commit endpoints.
pub fn transfer_router<C, L>(service: Arc<TransferService<C, L>>) -> Router
where
    C: ClassCatalog + 'static,
    L: TransferLedger + 'static,
{
    Router::new()
        .route(
            "/api/v1/transfers/students/candidates",
            post(student_candidates_handler::<C, L>),
        )
        .route(
            "/api/v1/transfers/students",
            post(student_commit_handler::<C, L>),
        )
        .route(
            "/api/v1/transfers/teachers/validate",
            post(teacher_validation_handler::<C, L>),
        )
        .route(
            "/api/v1/transfers/teachers",
            post(teacher_commit_handler::<C, L>),
        )
        .with_state(service)
}

pub(crate) async fn student_candidates_handler<C, L>(
    State(service): State<Arc<TransferService<C, L>>>,
    axum::Json(request): axum::Json<StudentCandidatesRequest>,
) -> Response
where
    C: ClassCatalog + 'static,
    L: TransferLedger + 'static,
{
    match service.student_candidates(&request.source_class_id, request.student_ids) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn student_commit_handler<C, L>(
    State(service): State<Arc<TransferService<C, L>>>,
    axum::Json(request): axum::Json<StudentCommitRequest>,
) -> Response
where
    C: ClassCatalog + 'static,
    L: TransferLedger + 'static,
{
    match service.commit_students(
        &request.source_class_id,
        &request.destination_class_id,
        request.student_ids,
    ) {
        Ok(receipt) => (StatusCode::CREATED, axum::Json(receipt)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn teacher_validation_handler<C, L>(
    State(service): State<Arc<TransferService<C, L>>>,
    axum::Json(request): axum::Json<TeacherTransferRequest>,
) -> Response
where
    C: ClassCatalog + 'static,
    L: TransferLedger + 'static,
{
    let window = request.window();
    match service.validate_teacher(&request.source_class_id, &request.teacher_id, window) {
        Ok(verdict) => {
            let payload = json!({
                "eligible": verdict.is_eligible(),
                "summary": verdict_summary(&verdict),
                "result": verdict,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn teacher_commit_handler<C, L>(
    State(service): State<Arc<TransferService<C, L>>>,
    axum::Json(request): axum::Json<TeacherTransferRequest>,
) -> Response
where
    C: ClassCatalog + 'static,
    L: TransferLedger + 'static,
{
    let window = request.window();
    match service.commit_teacher(&request.source_class_id, &request.teacher_id, window) {
        Ok(receipt) => (StatusCode::CREATED, axum::Json(receipt)).into_response(),
        Err(err) => error_response(err),
    }
}

fn verdict_summary(verdict: &TeacherVerdict) -> String {
    match verdict.reason() {
        Some(reason) => reason.summary(),
        None => "teacher can take over the class".to_string(),
    }
}

fn error_response(err: TransferServiceError) -> Response {
    match err {
        TransferServiceError::UnknownClass(_) | TransferServiceError::UnknownTeacher(_) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        TransferServiceError::Rejected(reason) => {
            let payload = json!({
                "error": reason.summary(),
                "code": reason.code(),
                "detail": reason,
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        TransferServiceError::Transfer(error) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        TransferServiceError::Ledger(LedgerError::Conflict(detail)) => {
            let payload = json!({ "error": detail });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        other => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
