use super::{blocking, html};
use crate::derive;
use crate::reports;
use crate::web::error::ApiError;
use crate::web::types::AppState;
use actix_web::{web, HttpResponse};

pub async fn calcular_competencias_generales(
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let body = blocking(&state, |state| {
        let rows = state.rebuild(|conn| {
            derive::recompute_general_competencies(conn)?;
            Ok(reports::general_competency_report(conn)?)
        })?;
        Ok(state.pages.general_competencies(&rows)?)
    })
    .await?;
    Ok(html(body))
}
