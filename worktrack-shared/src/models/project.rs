//! Project model and database operations.
//!
//! A project is a unit of work owned by exactly one user and grouping zero
//! or more tasks. All read and write paths here are ownership-scoped: a
//! project belonging to another user behaves as if it does not exist.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE projects (
//!     id UUID PRIMARY KEY,
//!     title VARCHAR(200) NOT NULL,
//!     status VARCHAR(50) NOT NULL,
//!     total_man_hour_min INTEGER,
//!     from_date TIMESTAMPTZ NOT NULL,
//!     to_date TIMESTAMPTZ NOT NULL,
//!     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
//!     created_at TIMESTAMPTZ NOT NULL,
//!     updated_at TIMESTAMPTZ NOT NULL
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use super::escape_like;

/// A project owned by a user.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Project {
    /// Unique project ID (UUID v4, assigned by the service at creation)
    pub id: Uuid,

    /// Project title
    pub title: String,

    /// Free-text status label, e.g. "pending"
    pub status: String,

    /// Optional total effort estimate in minutes
    pub total_man_hour_min: Option<i32>,

    /// Start of the scheduling window
    pub from_date: DateTime<Utc>,

    /// End of the scheduling window
    pub to_date: DateTime<Utc>,

    /// Owning user
    pub user_id: Uuid,

    /// When the project was created
    pub created_at: DateTime<Utc>,

    /// When the project was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a project. The owner comes from the caller identity.
#[derive(Debug, Clone)]
pub struct CreateProject {
    pub title: String,
    pub status: String,
    pub total_man_hour_min: Option<i32>,
    pub from_date: DateTime<Utc>,
    pub to_date: DateTime<Utc>,
    pub user_id: Uuid,
}

/// Input for updating a project. Every field is replaced unconditionally;
/// the owner is immutable.
#[derive(Debug, Clone)]
pub struct UpdateProject {
    pub title: String,
    pub status: String,
    pub total_man_hour_min: Option<i32>,
    pub from_date: DateTime<Utc>,
    pub to_date: DateTime<Utc>,
}

impl Project {
    /// Inserts a new project, assigning its id and timestamps.
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        let now = Utc::now();

        sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects
                (id, title, status, total_man_hour_min, from_date, to_date,
                 user_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, title, status, total_man_hour_min, from_date, to_date,
                      user_id, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.title)
        .bind(data.status)
        .bind(data.total_man_hour_min)
        .bind(data.from_date)
        .bind(data.to_date)
        .bind(data.user_id)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
    }

    /// Finds a project by id, scoped to its owner.
    ///
    /// Returns `None` both when the id is unknown and when the project
    /// belongs to someone else, so existence is not leaked.
    pub async fn find_by_id(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"
            SELECT id, title, status, total_man_hour_min, from_date, to_date,
                   user_id, created_at, updated_at
            FROM projects
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Lists the caller's projects, newest first, optionally narrowed to
    /// titles starting with `title_prefix` (case-sensitive).
    pub async fn list(
        pool: &PgPool,
        user_id: Uuid,
        title_prefix: Option<&str>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        match title_prefix {
            Some(prefix) => {
                sqlx::query_as::<_, Project>(
                    r#"
                    SELECT id, title, status, total_man_hour_min, from_date, to_date,
                           user_id, created_at, updated_at
                    FROM projects
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
                sqlx::query_as::<_, Project>(
                    r#"
                    SELECT id, title, status, total_man_hour_min, from_date, to_date,
                           user_id, created_at, updated_at
                    FROM projects
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

    /// Replaces every mutable field and refreshes `updated_at`, scoped to
    /// the owner. `created_at` is immutable.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects
            SET title = $3, status = $4, total_man_hour_min = $5,
                from_date = $6, to_date = $7, updated_at = $8
            WHERE id = $1 AND user_id = $2
            RETURNING id, title, status, total_man_hour_min, from_date, to_date,
                      user_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(data.title)
        .bind(data.status)
        .bind(data.total_man_hour_min)
        .bind(data.from_date)
        .bind(data.to_date)
        .bind(Utc::now())
        .fetch_optional(pool)
        .await
    }

    /// Hard-deletes an owned project. Its tasks go with it (cascade).
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
