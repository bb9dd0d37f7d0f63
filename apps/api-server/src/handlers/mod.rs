//! HTTP handlers and route configuration.

mod admin;
mod blogs;
mod health;
mod realtime;
mod sse;
mod stats;
mod views;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            .route("/stats", web::get().to(stats::stats))
            .route("/stats/stream", web::get().to(stats::stream))
            .service(
                web::scope("/blogs")
                    .route("", web::get().to(blogs::list))
                    .route("/latest", web::get().to(blogs::latest))
                    .route("/stream", web::get().to(blogs::stream))
                    .route("/{id}", web::get().to(blogs::show)),
            )
            .route("/realtime/{table}", web::get().to(realtime::stream))
            // Review queue
            .service(
                web::scope("/admin/verify")
                    .route("", web::get().to(admin::queue))
                    .route("/stream", web::get().to(admin::stream))
                    .route("/{id}", web::post().to(admin::verify)),
            ),
    );
}
