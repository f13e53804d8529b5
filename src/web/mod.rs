mod handlers;
mod state;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use tracing::info;
use tracing_actix_web::TracingLogger;

use crate::config::AnalysisConfig;
use crate::retrieval::DirectoryProvider;
use state::AppState;

/// Serve the analysis API and the static front end on `port`.
///
/// With a raster directory, sessions can be created from a map region;
/// otherwise only uploaded or inline series are accepted.
pub async fn start_server(
    port: u16,
    config: AnalysisConfig,
    rasters: Option<DirectoryProvider>,
) -> std::io::Result<()> {
    let data = web::Data::new(AppState::new(config, rasters));

    info!(port, "starting greening trends web server");
    println!("Starting Greening Trends web server on http://localhost:{port}");

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST"])
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(TracingLogger::default())
            .app_data(data.clone())
            .app_data(web::JsonConfig::default().limit(10 * 1024 * 1024))
            // Static files
            .route("/", web::get().to(handlers::index_html))
            .route("/app.js", web::get().to(handlers::app_js))
            .route("/style.css", web::get().to(handlers::style_css))
            // API routes
            .route("/api/upload", web::post().to(handlers::upload))
            .route("/api/session", web::post().to(handlers::create_session))
            .route("/api/{id}/region", web::post().to(handlers::update_region))
            .route("/api/{id}/observations", web::get().to(handlers::observations))
            .route("/api/{id}/forecast", web::post().to(handlers::forecast))
            .route("/api/{id}/simulate", web::post().to(handlers::simulate))
            .route("/api/{id}/export", web::get().to(handlers::export))
    })
    .bind(("127.0.0.1", port))?
    .run()
    .await
}
