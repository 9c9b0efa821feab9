use axum::{Router, routing::get};

use crate::modules::classes::controller::{
    create_class, delete_class, get_class, get_classes, update_class,
};
use crate::state::AppState;

pub fn init_classes_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_classes).post(create_class))
        .route("/{id}", get(get_class).put(update_class).delete(delete_class))
}
