use axum::{
    extract::{FromRef, State},
    middleware,
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use axum_extra::extract::WithRejection;

use crate::api::responses::CarsResponse;
use crate::auth::{
    jwt_auth_middleware, AuthError, AuthResponse, AuthService, LoginRequest, RegisterRequest,
    UserResponse,
};
use crate::models::UserProfile;
use crate::services::{AvailabilityService, ServiceError};

#[derive(Clone)]
struct UserState {
    auth_service: AuthService,
    availability: AvailabilityService,
}

impl FromRef<UserState> for AuthService {
    fn from_ref(state: &UserState) -> Self {
        state.auth_service.clone()
    }
}

impl FromRef<UserState> for AvailabilityService {
    fn from_ref(state: &UserState) -> Self {
        state.availability.clone()
    }
}

/// Account routes
pub fn user_routes(auth_service: AuthService, availability: AvailabilityService) -> Router {
    Router::new()
        .route("/data", get(get_user_data))
        .route_layer(middleware::from_fn_with_state(
            auth_service.clone(),
            jwt_auth_middleware,
        ))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/cars", get(list_cars))
        .with_state(UserState {
            auth_service,
            availability,
        })
}

/// Register a new user
#[tracing::instrument(skip(auth_service, request))]
async fn register(
    State(auth_service): State<AuthService>,
    WithRejection(Json(request), _): WithRejection<Json<RegisterRequest>, ServiceError>,
) -> Result<Json<AuthResponse>, AuthError> {
    let response = auth_service.register(request).await?;
    Ok(Json(response))
}

/// Login user
#[tracing::instrument(skip(auth_service, request))]
async fn login(
    State(auth_service): State<AuthService>,
    WithRejection(Json(request), _): WithRejection<Json<LoginRequest>, ServiceError>,
) -> Result<Json<AuthResponse>, AuthError> {
    let response = auth_service.login(request).await?;
    Ok(Json(response))
}

/// Current user, without credential
async fn get_user_data(Extension(user): Extension<UserProfile>) -> Json<UserResponse> {
    Json(UserResponse {
        success: true,
        user,
    })
}

/// Every car listed for rent
async fn list_cars(
    State(availability): State<AvailabilityService>,
) -> Result<Json<CarsResponse>, ServiceError> {
    let cars = availability.listed_cars().await?;
    Ok(Json(CarsResponse {
        success: true,
        cars,
    }))
}
