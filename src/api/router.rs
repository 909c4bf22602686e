use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers::{attendance, auth, core, students};
use super::types::SharedState;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(core::hello))
        .route("/signin", post(auth::signin))
        .route("/add-student", post(students::add_student_handler))
        .route("/check-rolls", post(students::check_rolls_handler))
        .route("/get-students", get(students::get_students_handler))
        .route("/delete-student", post(students::delete_student_handler))
        .route("/addAttendance", post(attendance::add_attendance_handler))
        .route("/get-attendance", get(attendance::get_attendance_handler))
        .route("/delete-attendance", delete(attendance::delete_attendance_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
