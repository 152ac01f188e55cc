//! HTTP handlers for the gram actions. Each one runs the matching
//! [`GramController`] operation on the blocking pool and turns the outcome
//! into a response.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Redirect},
};
use tracing::error;

use grams_db::Database;
use grams_types::api::{GramForm, GramResponse};

use crate::auth::AppState;
use crate::controller::{self, GramController};
use crate::error::{GramError, GramResult};
use crate::middleware::CurrentActor;
use crate::validation::Submission;

/// Run a controller operation off the async runtime.
async fn with_controller<T, F>(state: AppState, f: F) -> GramResult<T>
where
    F: FnOnce(GramController<'_, Database>) -> GramResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || f(GramController::new(&state.db)))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            GramError::Store(e.into())
        })?
}

fn redirect(outcome: controller::Redirect) -> Redirect {
    Redirect::to(outcome.location)
}

/// GET / and GET /grams
pub async fn index(State(state): State<AppState>) -> GramResult<Json<Vec<GramResponse>>> {
    let grams = with_controller(state, |c| c.list()).await?;
    Ok(Json(grams.iter().map(GramResponse::from).collect()))
}

/// GET /grams/{id}
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> GramResult<Json<GramResponse>> {
    let gram = with_controller(state, move |c| c.show(&id)).await?;
    Ok(Json(GramResponse::from(&gram)))
}

/// GET /grams/{id}/picture — raw picture bytes.
pub async fn picture(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> GramResult<impl IntoResponse> {
    let gram = with_controller(state, move |c| c.show(&id)).await?;
    let bytes = gram
        .picture
        .ok_or_else(|| GramError::NotFound(format!("{}/picture", gram.id)))?;

    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        bytes,
    ))
}

/// GET /grams/new
pub async fn new_form(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> GramResult<Json<GramForm>> {
    let form = with_controller(state, move |c| c.new_form(actor.as_ref())).await?;
    Ok(Json(form))
}

/// POST /grams
///
/// The body is read raw so that a malformed one is reported by the
/// controller, after the login check, instead of by an extractor.
pub async fn create(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    body: Bytes,
) -> GramResult<Redirect> {
    let submission = Submission::parse(&body);
    let outcome = with_controller(state, move |c| c.create(actor.as_ref(), submission)).await?;
    Ok(redirect(outcome))
}

/// GET /grams/{id}/edit
pub async fn edit(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
) -> GramResult<Json<GramForm>> {
    let form = with_controller(state, move |c| c.edit_form(actor.as_ref(), &id)).await?;
    Ok(Json(form))
}

/// PATCH/PUT /grams/{id}
pub async fn update(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    body: Bytes,
) -> GramResult<Redirect> {
    let submission = Submission::parse(&body);
    let outcome =
        with_controller(state, move |c| c.update(actor.as_ref(), &id, submission)).await?;
    Ok(redirect(outcome))
}

/// DELETE /grams/{id}
pub async fn destroy(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
) -> GramResult<Redirect> {
    let outcome = with_controller(state, move |c| c.destroy(actor.as_ref(), &id)).await?;
    Ok(redirect(outcome))
}
