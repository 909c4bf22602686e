
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::json;
use test_support::{get, post_json, send, send_raw, signup, spawn_app, temp_dir};

#[tokio::test]
async fn root_greets() {
    let workspace = temp_dir("rollbook-router-root");
    let app = spawn_app(&workspace);

    let (status, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("Hello, World!"));

    let _ = std::fs::remove_dir_all(workspace);
}

#[tokio::test]
async fn every_route_dispatches() {
    let workspace = temp_dir("rollbook-router-smoke");
    let app = spawn_app(&workspace);

    let user_id = signup(&app, "smoke@example.com").await;
    let (status, _) = post_json(
        &app,
        "/add-student",
        json!({ "name": "Smoke", "roll": 1, "userId": user_id }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = post_json(&app, "/check-rolls", json!({ "rolls": [1], "userId": user_id })).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = get(&app, &format!("/get-students?userId={}", user_id)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = post_json(&app, "/addAttendance", json!({ "userId": user_id, "rolls": [1] })).await;
    assert_eq!(status, StatusCode::OK);
    let (status, records) = get(&app, &format!("/get-attendance?userId={}", user_id)).await;
    assert_eq!(status, StatusCode::OK);
    let attendance_id = records[0]["_id"].as_str().expect("_id").to_string();
    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/delete-attendance?userId={}&attendanceId={}", user_id, attendance_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = post_json(&app, "/delete-student", json!({ "userId": user_id, "roll": 1 })).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get(&app, "/no-such-route").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let _ = std::fs::remove_dir_all(workspace);
}

#[tokio::test]
async fn malformed_input_collapses_to_generic_500() {
    let workspace = temp_dir("rollbook-router-malformed");
    let app = spawn_app(&workspace);
    let generic = json!({ "error": "Internal Server Error" });

    // Missing field.
    let (status, body) = post_json(&app, "/add-student", json!({ "name": "x", "userId": "u1" })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, generic);

    // Roll that is neither number nor string.
    let (status, body) = post_json(&app, "/addAttendance", json!({ "userId": "u1", "rolls": [null] })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, generic);

    // Not JSON at all.
    let req = Request::builder()
        .method(Method::POST)
        .uri("/check-rolls")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .expect("request");
    assert_eq!(send_raw(&app, req).await.status(), StatusCode::INTERNAL_SERVER_ERROR);

    // Missing query parameter.
    let (status, body) = get(&app, "/get-students").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, generic);

    let _ = std::fs::remove_dir_all(workspace);
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let workspace = temp_dir("rollbook-router-cors");
    let app = spawn_app(&workspace);

    let req = Request::builder()
        .method(Method::OPTIONS)
        .uri("/signin")
        .header(header::ORIGIN, "http://frontend.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .expect("request");
    let resp = send_raw(&app, req).await;
    assert!(resp.status().is_success());
    assert_eq!(
        resp.headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );

    let _ = std::fs::remove_dir_all(workspace);
}
