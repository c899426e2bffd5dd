use super::blocking;
use crate::db;
use crate::web::error::ApiError;
use crate::web::types::AppState;
use actix_web::{web, HttpResponse};
use serde_json::json;

pub async fn health(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let students = blocking(&state, |state| {
        let conn = state.connect()?;
        db::count_rows(&conn, "alumnos")
            .map_err(|e| ApiError::new("db_query_failed", format!("{e:#}")))
    })
    .await?;

    Ok(HttpResponse::Ok().json(json!({
        "ok": true,
        "version": env!("CARGO_PKG_VERSION"),
        "database": state.db_path.to_string_lossy(),
        "students": students,
    })))
}
