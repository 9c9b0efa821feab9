use axum::{Router, routing::get};

use crate::modules::grades::controller::{
    create_grade, delete_grade, get_grade, get_grades, update_grade,
};
use crate::state::AppState;

pub fn init_grades_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_grades).post(create_grade))
        .route("/{id}", get(get_grade).put(update_grade).delete(delete_grade))
}
