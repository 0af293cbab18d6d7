use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::bookings::booking_routes;
use super::health::health_check;
use super::owner::owner_routes;
use super::user::user_routes;
use crate::auth::{cors_layer, security_headers_layer, AuthService};
use crate::config::AppConfig;
use crate::services::{AvailabilityService, BookingService, OwnerService};
use crate::store::Store;

pub fn create_routes(store: Arc<dyn Store>, config: &AppConfig) -> Router {
    let auth_service = AuthService::new(store.clone(), config);
    let availability = AvailabilityService::new(store.clone());
    let bookings = BookingService::new(store.clone());
    let owner_service = OwnerService::new(store);

    Router::new()
        .route("/health", get(health_check))
        .nest(
            "/api/user",
            user_routes(auth_service.clone(), availability.clone()),
        )
        .nest(
            "/api/owner",
            owner_routes(owner_service, auth_service.clone()),
        )
        .nest(
            "/api/bookings",
            booking_routes(bookings, availability, auth_service),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.cors_origin))
        .layer(security_headers_layer())
}
