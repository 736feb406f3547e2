//! Project endpoints.
//!
//! All routes are protected and scoped to the caller. Project responses
//! always embed the project's current task list, for single fetches and
//! listings alike.
//!
//! - `GET /projects[?title=]` - list, optional case-sensitive title prefix
//! - `GET /projects/:project_id` - fetch one with embedded tasks
//! - `POST /projects` - create, owner = caller
//! - `PUT /projects/:project_id` - full update
//! - `DELETE /projects/:project_id` - hard delete (tasks cascade)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::StatusResponse,
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;
use worktrack_shared::{
    auth::middleware::AuthContext,
    models::{
        project::{CreateProject, Project, UpdateProject},
        task::Task,
    },
};

/// Create/update payload. PUT replaces every one of these fields; the
/// owner always comes from the caller identity, never the payload.
#[derive(Debug, Deserialize, Validate)]
pub struct ProjectPayload {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    #[validate(length(min = 1, message = "Status is required"))]
    pub status: String,

    /// Optional total effort estimate in minutes
    pub total_man_hour_min: Option<i32>,

    pub from_date: DateTime<Utc>,

    pub to_date: DateTime<Utc>,
}

/// Title filter for the list endpoint
#[derive(Debug, Deserialize)]
pub struct ListProjectsQuery {
    /// Case-sensitive title prefix
    pub title: Option<String>,
}

/// A project with its task list embedded.
#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    #[serde(flatten)]
    pub project: Project,

    /// Every task currently attached to the project
    pub tasks: Vec<Task>,
}

/// List the caller's projects, newest first, tasks embedded.
pub async fn list_projects(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(query): Query<ListProjectsQuery>,
) -> ApiResult<Json<Vec<ProjectResponse>>> {
    let projects = Project::list(&state.db, auth.user_id, query.title.as_deref()).await?;

    // One round-trip for all task lists, then group by project
    let project_ids: Vec<Uuid> = projects.iter().map(|p| p.id).collect();
    let mut tasks_by_project: HashMap<Uuid, Vec<Task>> = HashMap::new();
    for task in Task::list_by_projects(&state.db, &project_ids).await? {
        if let Some(project_id) = task.project_id {
            tasks_by_project.entry(project_id).or_default().push(task);
        }
    }

    let responses = projects
        .into_iter()
        .map(|project| {
            let tasks = tasks_by_project.remove(&project.id).unwrap_or_default();
            ProjectResponse { project, tasks }
        })
        .collect();

    Ok(Json(responses))
}

/// Fetch one owned project with its tasks.
pub async fn get_project(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<ProjectResponse>> {
    let project = Project::find_by_id(&state.db, project_id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    let tasks = Task::list_by_project(&state.db, project.id).await?;

    Ok(Json(ProjectResponse { project, tasks }))
}

/// Create a project owned by the caller.
pub async fn create_project(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<ProjectPayload>,
) -> ApiResult<Json<ProjectResponse>> {
    req.validate()?;

    let project = Project::create(
        &state.db,
        CreateProject {
            title: req.title,
            status: req.status,
            total_man_hour_min: req.total_man_hour_min,
            from_date: req.from_date,
            to_date: req.to_date,
            user_id: auth.user_id,
        },
    )
    .await?;

    // Freshly created, so the embedded task list is necessarily empty
    Ok(Json(ProjectResponse {
        project,
        tasks: Vec::new(),
    }))
}

/// Full update of an owned project. `created_at` is untouched,
/// `updated_at` is refreshed.
pub async fn update_project(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(project_id): Path<Uuid>,
    Json(req): Json<ProjectPayload>,
) -> ApiResult<Json<ProjectResponse>> {
    req.validate()?;

    let project = Project::update(
        &state.db,
        project_id,
        auth.user_id,
        UpdateProject {
            title: req.title,
            status: req.status,
            total_man_hour_min: req.total_man_hour_min,
            from_date: req.from_date,
            to_date: req.to_date,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    let tasks = Task::list_by_project(&state.db, project.id).await?;

    Ok(Json(ProjectResponse { project, tasks }))
}

/// Hard-delete an owned project. Attached tasks are removed by the
/// cascade.
pub async fn delete_project(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<StatusResponse>> {
    let deleted = Project::delete(&state.db, project_id, auth.user_id).await?;

    if !deleted {
        return Err(ApiError::NotFound("Project not found".to_string()));
    }

    Ok(Json(StatusResponse::ok()))
}
