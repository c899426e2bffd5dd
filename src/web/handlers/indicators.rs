use super::blocking;
use crate::derive;
use crate::web::error::ApiError;
use crate::web::types::AppState;
use actix_web::http::header;
use actix_web::{web, HttpResponse};

pub async fn calcular_indicadores(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    blocking(&state, |state| {
        state.rebuild(|conn| Ok(derive::recompute_indicators(conn)?))
    })
    .await?;

    // billing depends on the fresh indicators
    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, "/calcular-ingresos"))
        .finish())
}
