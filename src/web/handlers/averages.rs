use super::{blocking, html};
use crate::derive;
use crate::render::AVERAGES_DONE_HTML;
use crate::web::error::ApiError;
use crate::web::types::AppState;
use actix_web::{web, HttpResponse};

/// Rebuilds subject averages and the per-student competency rows.
pub async fn calcular_promedios(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    blocking(&state, |state| {
        state.rebuild(|conn| Ok(derive::recompute_averages(conn)?))
    })
    .await?;
    Ok(html(AVERAGES_DONE_HTML))
}
