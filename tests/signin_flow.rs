
use axum::http::StatusCode;
use serde_json::json;
use test_support::{post_json, signup, spawn_app, temp_dir};

#[tokio::test]
async fn unknown_email_signs_up_then_logs_in_with_same_id() {
    let workspace = temp_dir("rollbook-signin");
    let app = spawn_app(&workspace);

    let user_id = signup(&app, "owner@example.com").await;
    assert!(!user_id.is_empty());

    let (status, body) = post_json(
        &app,
        "/signin",
        json!({ "email": "owner@example.com", "password": "hunter2" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["userId"], json!(user_id));

    let _ = std::fs::remove_dir_all(workspace);
}

#[tokio::test]
async fn wrong_password_is_unauthorized_and_creates_nothing() {
    let workspace = temp_dir("rollbook-signin-wrong");
    let app = spawn_app(&workspace);

    let user_id = signup(&app, "a@example.com").await;

    let (status, body) = post_json(
        &app,
        "/signin",
        json!({ "email": "a@example.com", "password": "nope" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "message": "Password did not match" }));

    // Still the original account.
    let (status, body) = post_json(
        &app,
        "/signin",
        json!({ "email": "a@example.com", "password": "hunter2" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userId"], json!(user_id));

    let db = rusqlite::Connection::open(workspace.join("rollbook.sqlite3")).expect("reopen db");
    let users: i64 = db
        .query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))
        .expect("count users");
    assert_eq!(users, 1);

    let _ = std::fs::remove_dir_all(workspace);
}

#[tokio::test]
async fn distinct_emails_get_distinct_users() {
    let workspace = temp_dir("rollbook-signin-distinct");
    let app = spawn_app(&workspace);

    let a = signup(&app, "a@example.com").await;
    let b = signup(&app, "A@example.com").await;
    assert_ne!(a, b);

    let _ = std::fs::remove_dir_all(workspace);
}

#[tokio::test]
async fn password_is_not_stored_in_plain_text() {
    let workspace = temp_dir("rollbook-signin-hash");
    let app = spawn_app(&workspace);

    signup(&app, "hash@example.com").await;

    let db = rusqlite::Connection::open(workspace.join("rollbook.sqlite3")).expect("reopen db");
    let hash: String = db
        .query_row(
            "SELECT password_hash FROM users WHERE email = ?",
            ["hash@example.com"],
            |r| r.get(0),
        )
        .expect("stored hash");
    assert_ne!(hash, "hunter2");
    assert!(hash.starts_with("$2"), "not a bcrypt hash: {}", hash);

    let _ = std::fs::remove_dir_all(workspace);
}
