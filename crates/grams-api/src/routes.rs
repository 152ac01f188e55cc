use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};

use crate::auth::{self, AppState};
use crate::grams;
use crate::middleware::identify;

/// Room for a base64-encoded picture at the validation limit plus the JSON around it.
const MAX_BODY_SIZE: usize = 16 * 1024 * 1024;

/// Every gram and user route, with the identity middleware applied.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(grams::index))
        .route("/grams", get(grams::index).post(grams::create))
        .route("/grams/new", get(grams::new_form))
        .route(
            "/grams/{id}",
            get(grams::show)
                .patch(grams::update)
                .put(grams::update)
                .delete(grams::destroy),
        )
        .route("/grams/{id}/edit", get(grams::edit))
        .route("/grams/{id}/picture", get(grams::picture))
        .route("/users", post(auth::register))
        .route("/users/sign_in", get(auth::sign_in_form).post(auth::login))
        .layer(middleware::from_fn_with_state(state.clone(), identify))
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .with_state(state)
}
