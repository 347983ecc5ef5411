// src/api/routes.rs
use actix_web::web;

use super::handlers;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health_check))
            .service(
                web::scope("/script")
                    .route("/upload", web::post().to(handlers::upload_script))
                    .route("/generate", web::post().to(handlers::generate))
                    .route("/save", web::post().to(handlers::save_manual))
                    .route("/edit", web::post().to(handlers::edit))
                    .route("/finalize", web::post().to(handlers::finalize)),
            )
            .service(
                web::scope("/session")
                    .route("/evaluate", web::post().to(handlers::evaluate_session))
                    .route("/history", web::get().to(handlers::get_history)),
            ),
    );
}
