pub mod averages;
pub mod billing;
pub mod competencies;
pub mod core;
pub mod indicators;
pub mod students;

use super::error::ApiError;
use super::types::AppState;
use actix_web::http::header::ContentType;
use actix_web::{web, HttpResponse};

/// Runs `f` on the blocking pool; SQLite calls never run on the async
/// workers.
pub(crate) async fn blocking<T, F>(state: &web::Data<AppState>, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&AppState) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    web::block(move || f(state.get_ref())).await?
}

pub(crate) fn html(body: impl Into<String>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(body.into())
}
