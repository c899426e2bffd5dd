use super::handlers::{averages, billing, competencies, core, indicators, students};
use super::types::AppState;
use actix_web::{middleware, web, App, HttpServer};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(students::index))
        .route("/alumno/{id}", web::get().to(students::detail))
        .route("/calcular-promedios", web::get().to(averages::calcular_promedios))
        .route(
            "/calcular-indicadores",
            web::get().to(indicators::calcular_indicadores),
        )
        .route("/calcular-ingresos", web::get().to(billing::calcular_ingresos))
        .route(
            "/calcular-competencias-generales",
            web::get().to(competencies::calcular_competencias_generales),
        )
        .route("/health", web::get().to(core::health));
}

pub async fn run_server(state: AppState, bind_addr: &str) -> std::io::Result<()> {
    let state = web::Data::new(state);
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind(bind_addr)?
    .run()
    .await
}
