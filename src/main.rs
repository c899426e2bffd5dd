use anyhow::Context;
use clap::Parser;
use escolard::config::Config;
use escolard::render::Pages;
use escolard::web::AppState;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // RUST_LOG > --log-level
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    escolard::db::open_db(&config.db)?;
    let pages = Pages::new().context("failed to compile page templates")?;

    info!(db = %config.db.display(), bind = %config.bind, "starting escolard");
    escolard::web::run_server(AppState::new(config.db, pages), &config.bind)
        .await
        .with_context(|| format!("server on {} failed", config.bind))?;
    Ok(())
}
