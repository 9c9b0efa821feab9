use axum::{Router, routing::get};

use crate::modules::students::controller::{
    create_student, delete_student, get_student, get_student_attendance, get_student_fees,
    get_student_grades, get_students, update_student,
};
use crate::state::AppState;

pub fn init_students_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_students).post(create_student))
        .route(
            "/{id}",
            get(get_student).put(update_student).delete(delete_student),
        )
        .route("/{id}/grades", get(get_student_grades))
        .route("/{id}/fees", get(get_student_fees))
        .route("/{id}/attendance", get(get_student_attendance))
}
