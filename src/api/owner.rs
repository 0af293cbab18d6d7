use axum::{
    extract::State,
    middleware,
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};

use crate::api::responses::{CarIdRequest, CarsResponse, MessageResponse};
use crate::auth::{jwt_auth_middleware, AuthService};
use crate::models::{Car, CarData, DashboardData, UserProfile};
use crate::services::{OwnerService, ServiceError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCarRequest {
    pub car_data: CarData,
}

#[derive(Debug, Deserialize)]
pub struct UpdateImageRequest {
    pub image: String,
}

#[derive(Debug, Serialize)]
pub struct AddCarResponse {
    pub success: bool,
    pub message: String,
    pub car: Car,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub success: bool,
    pub dashboard_data: DashboardData,
}

#[derive(Debug, Serialize)]
pub struct ImageResponse {
    pub success: bool,
    pub message: String,
    pub image: String,
}

/// Owner dashboard routes; all require authentication
pub fn owner_routes(owner_service: OwnerService, auth_service: AuthService) -> Router {
    Router::new()
        .route("/change-role", post(change_role))
        .route("/add-car", post(add_car))
        .route("/cars", get(owner_cars))
        .route("/toggle-car", post(toggle_car))
        .route("/delete-car", post(delete_car))
        .route("/dashboard", get(dashboard))
        .route("/update-image", post(update_image))
        .route_layer(middleware::from_fn_with_state(
            auth_service,
            jwt_auth_middleware,
        ))
        .with_state(owner_service)
}

#[tracing::instrument(skip(owner_service, user), fields(user_id = %user.id))]
async fn change_role(
    State(owner_service): State<OwnerService>,
    Extension(user): Extension<UserProfile>,
) -> Result<Json<MessageResponse>, ServiceError> {
    owner_service.change_role_to_owner(&user).await?;
    Ok(Json(MessageResponse::ok("Now you can list cars")))
}

#[tracing::instrument(skip(owner_service, user, request), fields(user_id = %user.id))]
async fn add_car(
    State(owner_service): State<OwnerService>,
    Extension(user): Extension<UserProfile>,
    WithRejection(Json(request), _): WithRejection<Json<AddCarRequest>, ServiceError>,
) -> Result<Json<AddCarResponse>, ServiceError> {
    let car = owner_service.add_car(&user, request.car_data).await?;

    Ok(Json(AddCarResponse {
        success: true,
        message: "Car added successfully.".to_string(),
        car,
    }))
}

#[tracing::instrument(skip(owner_service, user), fields(user_id = %user.id))]
async fn owner_cars(
    State(owner_service): State<OwnerService>,
    Extension(user): Extension<UserProfile>,
) -> Result<Json<CarsResponse>, ServiceError> {
    let cars = owner_service.owner_cars(&user).await?;
    Ok(Json(CarsResponse {
        success: true,
        cars,
    }))
}

#[tracing::instrument(skip(owner_service, user, request), fields(user_id = %user.id))]
async fn toggle_car(
    State(owner_service): State<OwnerService>,
    Extension(user): Extension<UserProfile>,
    WithRejection(Json(request), _): WithRejection<Json<CarIdRequest>, ServiceError>,
) -> Result<Json<MessageResponse>, ServiceError> {
    owner_service
        .toggle_car_availability(&user, request.car_id)
        .await?;
    Ok(Json(MessageResponse::ok("Availability Toggled")))
}

#[tracing::instrument(skip(owner_service, user, request), fields(user_id = %user.id))]
async fn delete_car(
    State(owner_service): State<OwnerService>,
    Extension(user): Extension<UserProfile>,
    WithRejection(Json(request), _): WithRejection<Json<CarIdRequest>, ServiceError>,
) -> Result<Json<MessageResponse>, ServiceError> {
    owner_service.remove_car(&user, request.car_id).await?;
    Ok(Json(MessageResponse::ok("Car Removed")))
}

#[tracing::instrument(skip(owner_service, user), fields(user_id = %user.id))]
async fn dashboard(
    State(owner_service): State<OwnerService>,
    Extension(user): Extension<UserProfile>,
) -> Result<Json<DashboardResponse>, ServiceError> {
    let dashboard_data = owner_service.dashboard(&user).await?;
    Ok(Json(DashboardResponse {
        success: true,
        dashboard_data,
    }))
}

#[tracing::instrument(skip(owner_service, user, request), fields(user_id = %user.id))]
async fn update_image(
    State(owner_service): State<OwnerService>,
    Extension(user): Extension<UserProfile>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateImageRequest>, ServiceError>,
) -> Result<Json<ImageResponse>, ServiceError> {
    owner_service.update_image(&user, &request.image).await?;
    Ok(Json(ImageResponse {
        success: true,
        message: "Image Updated".to_string(),
        image: request.image,
    }))
}
