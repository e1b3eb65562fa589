//! # Approval Workflows
//!
//! - `POST /v1/workflows`: create and start
//! - `GET /v1/workflows`: list with filters
//! - `GET /v1/workflows/{id}`
//! - `POST /v1/workflows/{id}/advance`: current assignee approves or rejects
//! - `POST /v1/workflows/{id}/cancel`: initiator or admin

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use lexdoc_core::{ActorId, DocumentId, Timestamp, WorkflowId};
use lexdoc_lifecycle::{NewWorkflow, WorkflowFilter};
use lexdoc_state::{
    Priority, StepAction, StepSpec, StepStatus, Workflow, WorkflowStatus, WorkflowStep,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::auth::Caller;
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::AppState;

// ── Request/Response DTOs ───────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct StepInput {
    pub assignee: Uuid,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateWorkflowRequest {
    pub document_id: Uuid,
    pub name: String,
    /// Ordered steps; step 1 starts immediately.
    pub steps: Vec<StepInput>,
    /// RFC 3339 UTC, e.g. `2026-05-01T17:00:00Z`.
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "normal")]
    pub priority: Option<Priority>,
}

impl Validate for CreateWorkflowRequest {
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".into());
        }
        if self.steps.is_empty() {
            return Err("at least one step is required".into());
        }
        if let Some(deadline) = &self.deadline {
            Timestamp::parse(deadline).map_err(|e| e.to_string())?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdvanceRequest {
    #[schema(value_type = String, example = "approve")]
    pub action: StepAction,
    #[serde(default)]
    pub comments: Option<String>,
    /// Step the caller is acting on; a stale value is a 409.
    #[serde(default)]
    pub expected_step: Option<u32>,
}

impl Validate for AdvanceRequest {
    fn validate(&self) -> Result<(), String> {
        if self.expected_step == Some(0) {
            return Err("expected_step is 1-based".into());
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CancelRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListWorkflowsQuery {
    #[param(value_type = Option<String>)]
    pub status: Option<WorkflowStatus>,
    #[param(value_type = Option<String>)]
    pub priority: Option<Priority>,
    pub document_id: Option<Uuid>,
    /// Initiator or any assignee.
    pub participant: Option<Uuid>,
    #[serde(default)]
    pub include_archived: bool,
}

impl From<ListWorkflowsQuery> for WorkflowFilter {
    fn from(q: ListWorkflowsQuery) -> Self {
        Self {
            status: q.status,
            priority: q.priority,
            document_id: q.document_id.map(DocumentId),
            participant: q.participant.map(ActorId),
            include_archived: q.include_archived,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StepResponse {
    pub step_number: u32,
    pub assignee: Uuid,
    pub label: Option<String>,
    #[schema(value_type = String)]
    pub status: StepStatus,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
    pub comments: Option<String>,
}

impl From<WorkflowStep> for StepResponse {
    fn from(s: WorkflowStep) -> Self {
        Self {
            step_number: s.step_number,
            assignee: *s.assignee.as_uuid(),
            label: s.label,
            status: s.status,
            started_at: s.started_at.map(|t| t.to_iso8601()),
            completed_at: s.completed_at.map(|t| t.to_iso8601()),
            comments: s.comments,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WorkflowResponse {
    pub id: Uuid,
    pub document_id: Uuid,
    pub name: String,
    #[schema(value_type = String)]
    pub status: WorkflowStatus,
    #[schema(value_type = String)]
    pub priority: Priority,
    /// 1-based number of the current step.
    pub current_step: u32,
    pub steps: Vec<StepResponse>,
    pub deadline: Option<String>,
    pub initiated_by: Uuid,
    pub created_at: String,
    pub completed_at: Option<String>,
    pub cancel_reason: Option<String>,
    pub archived: bool,
}

impl From<Workflow> for WorkflowResponse {
    fn from(wf: Workflow) -> Self {
        Self {
            id: *wf.id.as_uuid(),
            document_id: *wf.document_id.as_uuid(),
            current_step: wf.current_step_number(),
            name: wf.name,
            status: wf.status,
            priority: wf.priority,
            steps: wf.steps.into_iter().map(Into::into).collect(),
            deadline: wf.deadline.map(|t| t.to_iso8601()),
            initiated_by: *wf.initiated_by.as_uuid(),
            created_at: wf.created_at.to_iso8601(),
            completed_at: wf.completed_at.map(|t| t.to_iso8601()),
            cancel_reason: wf.cancel_reason,
            archived: wf.archived,
        }
    }
}

// ── Router ──────────────────────────────────────────────────────────

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/workflows", get(list_workflows).post(create_workflow))
        .route("/v1/workflows/{id}", get(get_workflow))
        .route("/v1/workflows/{id}/advance", post(advance_workflow))
        .route("/v1/workflows/{id}/cancel", post(cancel_workflow))
}

// ── Handlers ────────────────────────────────────────────────────────

#[utoipa::path(
    post,
    path = "/v1/workflows",
    request_body = CreateWorkflowRequest,
    responses(
        (status = 201, description = "Workflow created and started", body = WorkflowResponse),
        (status = 404, description = "Document not found", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "workflows"
)]
pub(crate) async fn create_workflow(
    State(state): State<AppState>,
    Caller(actor): Caller,
    body: Result<Json<CreateWorkflowRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<WorkflowResponse>), AppError> {
    let req = extract_validated_json(body)?;
    let deadline = req
        .deadline
        .as_deref()
        .map(Timestamp::parse)
        .transpose()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let spec = NewWorkflow {
        document_id: DocumentId(req.document_id),
        name: req.name,
        steps: req
            .steps
            .into_iter()
            .map(|s| StepSpec {
                assignee: ActorId(s.assignee),
                label: s.label,
            })
            .collect(),
        deadline,
        priority: req.priority.unwrap_or_default(),
    };
    let wf = state.lifecycle.workflows.create(spec, &actor)?;
    Ok((StatusCode::CREATED, Json(wf.into())))
}

#[utoipa::path(
    get,
    path = "/v1/workflows",
    params(ListWorkflowsQuery),
    responses(
        (status = 200, description = "Workflows, newest first", body = Vec<WorkflowResponse>),
    ),
    tag = "workflows"
)]
pub(crate) async fn list_workflows(
    State(state): State<AppState>,
    Query(query): Query<ListWorkflowsQuery>,
) -> Json<Vec<WorkflowResponse>> {
    let filter = WorkflowFilter::from(query);
    Json(
        state
            .lifecycle
            .workflows
            .list(&filter)
            .into_iter()
            .map(Into::into)
            .collect(),
    )
}

#[utoipa::path(
    get,
    path = "/v1/workflows/{id}",
    params(("id" = Uuid, Path, description = "Workflow ID")),
    responses(
        (status = 200, description = "Workflow found", body = WorkflowResponse),
        (status = 404, description = "Workflow not found", body = crate::error::ErrorBody),
    ),
    tag = "workflows"
)]
pub(crate) async fn get_workflow(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WorkflowResponse>, AppError> {
    Ok(Json(state.lifecycle.workflows.get(WorkflowId(id))?.into()))
}

#[utoipa::path(
    post,
    path = "/v1/workflows/{id}/advance",
    params(("id" = Uuid, Path, description = "Workflow ID")),
    request_body = AdvanceRequest,
    responses(
        (status = 200, description = "Step decided", body = WorkflowResponse),
        (status = 403, description = "Not the current assignee, or workflow not running", body = crate::error::ErrorBody),
        (status = 409, description = "Step already decided", body = crate::error::ErrorBody),
    ),
    tag = "workflows"
)]
pub(crate) async fn advance_workflow(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
    body: Result<Json<AdvanceRequest>, JsonRejection>,
) -> Result<Json<WorkflowResponse>, AppError> {
    let req = extract_validated_json(body)?;
    let wf = state.lifecycle.workflows.advance(
        WorkflowId(id),
        &actor,
        req.action,
        req.comments,
        req.expected_step,
    )?;
    Ok(Json(wf.into()))
}

#[utoipa::path(
    post,
    path = "/v1/workflows/{id}/cancel",
    params(("id" = Uuid, Path, description = "Workflow ID")),
    request_body = CancelRequest,
    responses(
        (status = 200, description = "Workflow cancelled", body = WorkflowResponse),
        (status = 403, description = "Neither initiator nor admin", body = crate::error::ErrorBody),
        (status = 409, description = "Already finished", body = crate::error::ErrorBody),
    ),
    tag = "workflows"
)]
pub(crate) async fn cancel_workflow(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
    body: Option<Json<CancelRequest>>,
) -> Result<Json<WorkflowResponse>, AppError> {
    let reason = body.and_then(|Json(b)| b.reason);
    let wf = state.lifecycle.workflows.cancel(WorkflowId(id), &actor, reason)?;
    Ok(Json(wf.into()))
}
