use super::{blocking, html};
use crate::reports;
use crate::web::error::ApiError;
use crate::web::types::AppState;
use actix_web::{web, HttpResponse};
use tracing::debug;

pub async fn index(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let body = blocking(&state, |state| {
        let conn = state.connect()?;
        let alumnos = reports::load_students(&conn)?;
        debug!(students = alumnos.len(), "listing students");
        Ok(state.pages.index(&alumnos)?)
    })
    .await?;
    Ok(html(body))
}

pub async fn detail(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id_alumno = path.into_inner();
    debug!(id_alumno, "student detail");
    let body = blocking(&state, move |state| {
        let conn = state.connect()?;
        let detail = reports::student_detail(&conn, id_alumno)?;
        Ok(state.pages.student(&detail)?)
    })
    .await?;
    Ok(html(body))
}
