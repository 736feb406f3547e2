//! Task model and database operations.
//!
//! Tasks are the unit of trackable work. Every task is owned by the user
//! who created it and may optionally belong to one project; the project
//! link is validated only by the foreign key. Reads and writes are scoped
//! to the owner, like projects.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use super::escape_like;

/// A trackable work item.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID (UUID v4, assigned by the service at creation)
    pub id: Uuid,

    /// Task title
    pub title: String,

    /// Free-text status label
    pub status: String,

    /// Optional kind label, e.g. "meeting"
    #[serde(rename = "type")]
    pub task_type: Option<String>,

    /// Optional effort estimate in minutes
    pub man_hour_min: Option<i32>,

    /// Start of the scheduling window
    pub from_date: DateTime<Utc>,

    /// End of the scheduling window
    pub to_date: DateTime<Utc>,

    /// Integer priority rank
    pub priority: i32,

    /// Project this task belongs to, if any
    pub project_id: Option<Uuid>,

    /// Owning user
    pub user_id: Uuid,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task. The owner comes from the caller identity;
/// the project reference, when present, comes from the payload.
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub title: String,
    pub status: String,
    pub task_type: Option<String>,
    pub man_hour_min: Option<i32>,
    pub from_date: DateTime<Utc>,
    pub to_date: DateTime<Utc>,
    pub priority: i32,
    pub project_id: Option<Uuid>,
    pub user_id: Uuid,
}

/// Input for updating a task. Every field is replaced unconditionally;
/// the owner is immutable.
#[derive(Debug, Clone)]
pub struct UpdateTask {
    pub title: String,
    pub status: String,
    pub task_type: Option<String>,
    pub man_hour_min: Option<i32>,
    pub from_date: DateTime<Utc>,
    pub to_date: DateTime<Utc>,
    pub priority: i32,
    pub project_id: Option<Uuid>,
}

impl Task {
    /// Inserts a new task, assigning its id and timestamps.
    ///
    /// An unknown `project_id` violates the foreign key and surfaces as a
    /// database constraint error.
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let now = Utc::now();

        sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks
                (id, title, status, task_type, man_hour_min, from_date, to_date,
                 priority, project_id, user_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id, title, status, task_type, man_hour_min, from_date, to_date,
                      priority, project_id, user_id, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.title)
        .bind(data.status)
        .bind(data.task_type)
        .bind(data.man_hour_min)
        .bind(data.from_date)
        .bind(data.to_date)
        .bind(data.priority)
        .bind(data.project_id)
        .bind(data.user_id)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
    }

    /// Finds a task by id, scoped to its owner.
    pub async fn find_by_id(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, status, task_type, man_hour_min, from_date, to_date,
                   priority, project_id, user_id, created_at, updated_at
            FROM tasks
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Lists the caller's tasks, newest first, optionally narrowed to
    /// titles starting with `title_prefix` (case-sensitive).
    pub async fn list(
        pool: &PgPool,
        user_id: Uuid,
        title_prefix: Option<&str>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        match title_prefix {
            Some(prefix) => {
                sqlx::query_as::<_, Task>(
                    r#"
                    SELECT id, title, status, task_type, man_hour_min, from_date, to_date,
                           priority, project_id, user_id, created_at, updated_at
                    FROM tasks
                    WHERE user_id = $1 AND title LIKE $2
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(user_id)
                .bind(format!("{}%", escape_like(prefix)))
                .fetch_all(pool)
                .await
            }
            None => {
                sqlx::query_as::<_, Task>(
                    r#"
                    SELECT id, title, status, task_type, man_hour_min, from_date, to_date,
                           priority, project_id, user_id, created_at, updated_at
                    FROM tasks
                    WHERE user_id = $1
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(user_id)
                .fetch_all(pool)
                .await
            }
        }
    }

    /// Lists every task attached to one project, newest first.
    ///
    /// Used to embed a project's task list into its responses.
    pub async fn list_by_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, status, task_type, man_hour_min, from_date, to_date,
                   priority, project_id, user_id, created_at, updated_at
            FROM tasks
            WHERE project_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    /// Lists every task attached to any of the given projects in one
    /// round-trip. Used when embedding task lists into a project listing.
    pub async fn list_by_projects(
        pool: &PgPool,
        project_ids: &[Uuid],
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, status, task_type, man_hour_min, from_date, to_date,
                   priority, project_id, user_id, created_at, updated_at
            FROM tasks
            WHERE project_id = ANY($1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(project_ids)
        .fetch_all(pool)
        .await
    }

    /// Replaces every mutable field and refreshes `updated_at`, scoped to
    /// the owner. `created_at` is immutable.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = $3, status = $4, task_type = $5, man_hour_min = $6,
                from_date = $7, to_date = $8, priority = $9, project_id = $10,
                updated_at = $11
            WHERE id = $1 AND user_id = $2
            RETURNING id, title, status, task_type, man_hour_min, from_date, to_date,
                      priority, project_id, user_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(data.title)
        .bind(data.status)
        .bind(data.task_type)
        .bind(data.man_hour_min)
        .bind(data.from_date)
        .bind(data.to_date)
        .bind(data.priority)
        .bind(data.project_id)
        .bind(Utc::now())
        .fetch_optional(pool)
        .await
    }

    /// Hard-deletes an owned task. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
