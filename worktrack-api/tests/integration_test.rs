//! Integration tests for the WorkTrack API.
//!
//! These drive the full router end-to-end against a real database:
//! registration and login, token gating, task and project lifecycles,
//! ownership scoping and the title-prefix filter.
//!
//! Requires `DATABASE_URL` and `JWT_SECRET` in the environment.

mod common;

use axum::http::StatusCode;
use common::{expect_status, json_request, TestContext, TEST_PASSWORD};
use serde_json::json;
use uuid::Uuid;

fn task_payload(title: &str) -> serde_json::Value {
    json!({
        "title": title,
        "status": "pending",
        "type": "meeting",
        "man_hour_min": 60,
        "from_date": "2025-08-14T15:32:00Z",
        "to_date": "2025-08-15T15:32:00Z",
        "priority": 1,
        "project_id": null
    })
}

fn project_payload(title: &str) -> serde_json::Value {
    json!({
        "title": title,
        "status": "pending",
        "total_man_hour_min": 600,
        "from_date": "2025-08-14T15:32:00Z",
        "to_date": "2025-09-14T15:32:00Z"
    })
}

/// Register → login → wrong password.
#[tokio::test]
async fn test_register_login_flow() {
    let ctx = TestContext::new().await.unwrap();
    let username = format!("alice-{}", Uuid::new_v4().simple());

    // Register
    let response = ctx
        .send(json_request(
            "POST",
            "/auth",
            json!({"username": username, "email": "a@x.com", "password": "secret"}),
        ))
        .await;
    let user = expect_status(response, StatusCode::OK).await;
    let user_id = user["id"].as_str().unwrap().to_string();
    assert_eq!(user["username"], username.as_str());
    assert_eq!(user["email"], "a@x.com");
    // No password material in the response
    assert!(user.get("password").is_none());
    assert!(user.get("password_hash").is_none());

    // Login with the right password
    let response = ctx
        .send(json_request(
            "POST",
            "/auth/login",
            json!({"username": username, "password": "secret"}),
        ))
        .await;
    let login = expect_status(response, StatusCode::OK).await;
    assert!(!login["access_token"].as_str().unwrap().is_empty());
    assert_eq!(login["token_type"], "bearer");
    assert_eq!(login["user_id"].as_str().unwrap(), user_id);

    // Wrong password fails
    let response = ctx
        .send(json_request(
            "POST",
            "/auth/login",
            json!({"username": username, "password": "wrong"}),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Unknown username fails identically
    let response = ctx
        .send(json_request(
            "POST",
            "/auth/login",
            json!({"username": "no-such-user", "password": "secret"}),
        ))
        .await;
    let login_err = expect_status(response, StatusCode::UNAUTHORIZED).await;
    assert_eq!(login_err["message"], "Invalid username or password");

    sqlx::query("DELETE FROM users WHERE id = $1::uuid")
        .bind(user_id)
        .execute(&ctx.db)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

/// Registration validation: missing fields answer with per-field details.
#[tokio::test]
async fn test_register_validation() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .send(json_request(
            "POST",
            "/auth",
            json!({"username": "", "email": "not-an-email", "password": "x"}),
        ))
        .await;
    let err = expect_status(response, StatusCode::UNPROCESSABLE_ENTITY).await;
    assert_eq!(err["error"], "validation_error");
    let fields: Vec<&str> = err["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"username"));
    assert!(fields.contains(&"email"));

    ctx.cleanup().await.unwrap();
}

/// Duplicate usernames are rejected with 409.
#[tokio::test]
async fn test_register_duplicate_username() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .send(json_request(
            "POST",
            "/auth",
            json!({
                "username": ctx.user.username,
                "email": "other@x.com",
                "password": "secret"
            }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    ctx.cleanup().await.unwrap();
}

/// Every resource route rejects requests without a valid token.
#[tokio::test]
async fn test_protected_routes_require_token() {
    let ctx = TestContext::new().await.unwrap();

    for uri in ["/tasks", "/projects", "/auth"] {
        let response = ctx
            .send(
                axum::http::Request::builder()
                    .method("GET")
                    .uri(uri)
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "GET {} without token",
            uri
        );
    }

    // A tampered token is rejected too
    let response = ctx
        .send(
            axum::http::Request::builder()
                .method("GET")
                .uri("/tasks")
                .header("authorization", format!("{}x", ctx.auth_header()))
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    ctx.cleanup().await.unwrap();
}

/// Create → fetch → delete → 404, the full task lifecycle.
#[tokio::test]
async fn test_task_lifecycle() {
    let ctx = TestContext::new().await.unwrap();

    // Create
    let response = ctx
        .send_authed("POST", "/tasks", Some(task_payload("Design Doc")))
        .await;
    let task = expect_status(response, StatusCode::OK).await;
    let task_id = task["id"].as_str().unwrap().to_string();
    assert_eq!(task["title"], "Design Doc");
    assert_eq!(task["status"], "pending");
    assert_eq!(task["type"], "meeting");
    assert_eq!(task["priority"], 1);
    assert_eq!(task["user_id"].as_str().unwrap(), ctx.user.id.to_string());
    assert!(task["created_at"].is_string());
    assert_eq!(task["created_at"], task["updated_at"]);

    // Fetch returns the same fields
    let response = ctx
        .send_authed("GET", &format!("/tasks/{}", task_id), None)
        .await;
    let fetched = expect_status(response, StatusCode::OK).await;
    assert_eq!(fetched, task);

    // Delete
    let response = ctx
        .send_authed("DELETE", &format!("/tasks/{}", task_id), None)
        .await;
    let deleted = expect_status(response, StatusCode::OK).await;
    assert_eq!(deleted, json!({"status": "OK"}));

    // Gone now
    let response = ctx
        .send_authed("GET", &format!("/tasks/{}", task_id), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Deleting a nonexistent id is also 404
    let response = ctx
        .send_authed("DELETE", &format!("/tasks/{}", Uuid::new_v4()), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    ctx.cleanup().await.unwrap();
}

/// Full update replaces every mutable field; created_at is immutable and
/// updated_at strictly increases.
#[tokio::test]
async fn test_task_update_semantics() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .send_authed("POST", "/tasks", Some(task_payload("Initial")))
        .await;
    let created = expect_status(response, StatusCode::OK).await;
    let task_id = created["id"].as_str().unwrap().to_string();

    // Make sure the update lands on a later timestamp
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;

    let response = ctx
        .send_authed(
            "PUT",
            &format!("/tasks/{}", task_id),
            Some(json!({
                "title": "Replaced",
                "status": "done",
                "type": null,
                "man_hour_min": null,
                "from_date": "2025-08-20T00:00:00Z",
                "to_date": "2025-08-21T00:00:00Z",
                "priority": 3,
                "project_id": null
            })),
        )
        .await;
    let updated = expect_status(response, StatusCode::OK).await;

    assert_eq!(updated["id"], created["id"]);
    assert_eq!(updated["title"], "Replaced");
    assert_eq!(updated["status"], "done");
    assert!(updated["type"].is_null());
    assert!(updated["man_hour_min"].is_null());
    assert_eq!(updated["priority"], 3);
    assert_eq!(updated["created_at"], created["created_at"]);
    let before = chrono::DateTime::parse_from_rfc3339(created["updated_at"].as_str().unwrap());
    let after = chrono::DateTime::parse_from_rfc3339(updated["updated_at"].as_str().unwrap());
    assert!(
        after.unwrap() > before.unwrap(),
        "updated_at must strictly increase"
    );

    // Updating a nonexistent id is 404
    let response = ctx
        .send_authed(
            "PUT",
            &format!("/tasks/{}", Uuid::new_v4()),
            Some(task_payload("Ghost")),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    ctx.cleanup().await.unwrap();
}

/// Tasks and projects are invisible across users: foreign ids answer 404.
#[tokio::test]
async fn test_ownership_scoping() {
    let ctx = TestContext::new().await.unwrap();
    let other = TestContext::new().await.unwrap();

    let response = ctx
        .send_authed("POST", "/tasks", Some(task_payload("Private Task")))
        .await;
    let task = expect_status(response, StatusCode::OK).await;
    let task_id = task["id"].as_str().unwrap();

    // The other user cannot see, update or delete it
    let response = other
        .send_authed("GET", &format!("/tasks/{}", task_id), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = other
        .send_authed(
            "PUT",
            &format!("/tasks/{}", task_id),
            Some(task_payload("Hijacked")),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = other
        .send_authed("DELETE", &format!("/tasks/{}", task_id), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // And their own task list does not include it
    let response = other.send_authed("GET", "/tasks", None).await;
    let tasks = expect_status(response, StatusCode::OK).await;
    assert!(tasks
        .as_array()
        .unwrap()
        .iter()
        .all(|t| t["id"].as_str().unwrap() != task_id));

    other.cleanup().await.unwrap();
    ctx.cleanup().await.unwrap();
}

/// Project lifecycle with embedded tasks and the title-prefix filter.
#[tokio::test]
async fn test_project_lifecycle_and_filter() {
    let ctx = TestContext::new().await.unwrap();

    // Two projects with distinct prefixes
    let response = ctx
        .send_authed("POST", "/projects", Some(project_payload("Website Redesign")))
        .await;
    let website = expect_status(response, StatusCode::OK).await;
    let website_id = website["id"].as_str().unwrap().to_string();
    assert_eq!(website["tasks"], json!([]));
    assert_eq!(
        website["user_id"].as_str().unwrap(),
        ctx.user.id.to_string()
    );

    let response = ctx
        .send_authed("POST", "/projects", Some(project_payload("Mobile App")))
        .await;
    expect_status(response, StatusCode::OK).await;

    // Attach a task to the first project
    let mut payload = task_payload("Wireframes");
    payload["project_id"] = json!(website_id);
    let response = ctx.send_authed("POST", "/tasks", Some(payload)).await;
    let task = expect_status(response, StatusCode::OK).await;

    // Single fetch embeds the task list
    let response = ctx
        .send_authed("GET", &format!("/projects/{}", website_id), None)
        .await;
    let fetched = expect_status(response, StatusCode::OK).await;
    let embedded = fetched["tasks"].as_array().unwrap();
    assert_eq!(embedded.len(), 1);
    assert_eq!(embedded[0]["id"], task["id"]);

    // Prefix filter is exact and case-sensitive
    let response = ctx.send_authed("GET", "/projects?title=Web", None).await;
    let filtered = expect_status(response, StatusCode::OK).await;
    let titles: Vec<&str> = filtered
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Website Redesign"]);

    let response = ctx.send_authed("GET", "/projects?title=web", None).await;
    let filtered = expect_status(response, StatusCode::OK).await;
    assert_eq!(filtered.as_array().unwrap().len(), 0);

    // Unfiltered list has both, newest first
    let response = ctx.send_authed("GET", "/projects", None).await;
    let all = expect_status(response, StatusCode::OK).await;
    let titles: Vec<&str> = all
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Mobile App", "Website Redesign"]);

    // Deleting the project cascades to its task
    let response = ctx
        .send_authed("DELETE", &format!("/projects/{}", website_id), None)
        .await;
    let deleted = expect_status(response, StatusCode::OK).await;
    assert_eq!(deleted, json!({"status": "OK"}));

    let response = ctx
        .send_authed(
            "GET",
            &format!("/tasks/{}", task["id"].as_str().unwrap()),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    ctx.cleanup().await.unwrap();
}

/// User resource: list, fetch, full update (password rotates), delete.
#[tokio::test]
async fn test_user_resource() {
    let ctx = TestContext::new().await.unwrap();

    // The context user is visible in the listing
    let response = ctx.send_authed("GET", "/auth", None).await;
    let users = expect_status(response, StatusCode::OK).await;
    assert!(users
        .as_array()
        .unwrap()
        .iter()
        .any(|u| u["id"].as_str().unwrap() == ctx.user.id.to_string()));

    // Fetch by id
    let response = ctx
        .send_authed("GET", &format!("/auth/{}", ctx.user.id), None)
        .await;
    let fetched = expect_status(response, StatusCode::OK).await;
    assert_eq!(fetched["username"], ctx.user.username.as_str());
    assert!(fetched.get("password_hash").is_none());

    // Full update rotates the password
    let new_username = format!("renamed-{}", Uuid::new_v4().simple());
    let response = ctx
        .send_authed(
            "PUT",
            &format!("/auth/{}", ctx.user.id),
            Some(json!({
                "username": new_username,
                "email": "renamed@example.com",
                "password": "rotated-password"
            })),
        )
        .await;
    let updated = expect_status(response, StatusCode::OK).await;
    assert_eq!(updated["username"], new_username.as_str());
    assert_eq!(updated["email"], "renamed@example.com");

    // Old password no longer works, the new one does
    let response = ctx
        .send(json_request(
            "POST",
            "/auth/login",
            json!({"username": new_username, "password": TEST_PASSWORD}),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = ctx
        .send(json_request(
            "POST",
            "/auth/login",
            json!({"username": new_username, "password": "rotated-password"}),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Delete, then the id is gone
    let response = ctx
        .send_authed("DELETE", &format!("/auth/{}", ctx.user.id), None)
        .await;
    let deleted = expect_status(response, StatusCode::OK).await;
    assert_eq!(deleted, json!({"status": "OK"}));

    let response = ctx
        .send_authed("GET", &format!("/auth/{}", ctx.user.id), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Health endpoint is public and reports database connectivity.
#[tokio::test]
async fn test_health() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .send(
            axum::http::Request::builder()
                .method("GET")
                .uri("/health")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await;
    let health = expect_status(response, StatusCode::OK).await;
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["database"], "connected");

    ctx.cleanup().await.unwrap();
}
