use axum::{Router, routing::get};

pub mod admin;
pub mod common;
pub mod inbox;
pub mod landing;
pub mod orders;
pub mod payments;
pub mod products;
pub mod public;
pub mod system;

/// Router for all authenticated (tenant-scoped) endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/stream", get(system::stream))
        .nest("/products", products::router())
        .nest("/orders", orders::router())
        .nest("/inbox", inbox::router())
        .nest("/landing", landing::router())
        .nest("/payments", payments::router())
        .nest("/admin", admin::router())
}
