use super::{blocking, html};
use crate::derive;
use crate::reports;
use crate::web::error::ApiError;
use crate::web::types::AppState;
use actix_web::{web, HttpResponse};

pub async fn calcular_ingresos(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let body = blocking(&state, |state| {
        let rows = state.rebuild(|conn| {
            derive::recompute_billing(conn)?;
            Ok(reports::billing_report(conn)?)
        })?;
        Ok(state.pages.billing(&rows)?)
    })
    .await?;
    Ok(html(body))
}
