use axum::{
    extract::{FromRef, State},
    middleware,
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use axum_extra::extract::WithRejection;
use serde::Serialize;

use crate::api::responses::MessageResponse;
use crate::auth::{jwt_auth_middleware, AuthService};
use crate::models::{
    Booking, BookingWithCar, Car, ChangeStatusRequest, CheckAvailabilityRequest,
    CreateBookingRequest, OwnerBooking, UserProfile,
};
use crate::services::{AvailabilityService, BookingService, ServiceError};

#[derive(Clone)]
struct BookingState {
    bookings: BookingService,
    availability: AvailabilityService,
}

impl FromRef<BookingState> for BookingService {
    fn from_ref(state: &BookingState) -> Self {
        state.bookings.clone()
    }
}

impl FromRef<BookingState> for AvailabilityService {
    fn from_ref(state: &BookingState) -> Self {
        state.availability.clone()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    pub success: bool,
    pub available_cars: Vec<Car>,
}

#[derive(Debug, Serialize)]
pub struct CreateBookingResponse {
    pub success: bool,
    pub message: String,
    pub booking: Booking,
}

#[derive(Debug, Serialize)]
pub struct BookingsResponse<T> {
    pub success: bool,
    pub bookings: Vec<T>,
}

pub fn booking_routes(
    bookings: BookingService,
    availability: AvailabilityService,
    auth_service: AuthService,
) -> Router {
    Router::new()
        .route("/", post(create_booking))
        .route("/create", post(create_booking))
        .route("/user", get(user_bookings))
        .route("/owner", get(owner_bookings))
        .route("/change-status", post(change_status))
        .route_layer(middleware::from_fn_with_state(
            auth_service,
            jwt_auth_middleware,
        ))
        .route("/check-availability", post(check_availability))
        .with_state(BookingState {
            bookings,
            availability,
        })
}

/// Cars at a location free for the whole date range
#[tracing::instrument(skip(availability, request))]
async fn check_availability(
    State(availability): State<AvailabilityService>,
    WithRejection(Json(request), _): WithRejection<Json<CheckAvailabilityRequest>, ServiceError>,
) -> Result<Json<AvailabilityResponse>, ServiceError> {
    let available_cars = availability
        .available_cars(&request.location, request.pickup_date, request.return_date)
        .await?;

    Ok(Json(AvailabilityResponse {
        success: true,
        available_cars,
    }))
}

#[tracing::instrument(skip(bookings, user, request), fields(user_id = %user.id))]
async fn create_booking(
    State(bookings): State<BookingService>,
    Extension(user): Extension<UserProfile>,
    WithRejection(Json(request), _): WithRejection<Json<CreateBookingRequest>, ServiceError>,
) -> Result<Json<CreateBookingResponse>, ServiceError> {
    let booking = bookings.create_booking(&user, request).await?;

    Ok(Json(CreateBookingResponse {
        success: true,
        message: "Booking created".to_string(),
        booking,
    }))
}

#[tracing::instrument(skip(bookings, user), fields(user_id = %user.id))]
async fn user_bookings(
    State(bookings): State<BookingService>,
    Extension(user): Extension<UserProfile>,
) -> Result<Json<BookingsResponse<BookingWithCar>>, ServiceError> {
    let bookings = bookings.user_bookings(&user).await?;
    Ok(Json(BookingsResponse {
        success: true,
        bookings,
    }))
}

#[tracing::instrument(skip(bookings, user), fields(user_id = %user.id))]
async fn owner_bookings(
    State(bookings): State<BookingService>,
    Extension(user): Extension<UserProfile>,
) -> Result<Json<BookingsResponse<OwnerBooking>>, ServiceError> {
    let bookings = bookings.owner_bookings(&user).await?;
    Ok(Json(BookingsResponse {
        success: true,
        bookings,
    }))
}

#[tracing::instrument(skip(bookings, user, request), fields(user_id = %user.id))]
async fn change_status(
    State(bookings): State<BookingService>,
    Extension(user): Extension<UserProfile>,
    WithRejection(Json(request), _): WithRejection<Json<ChangeStatusRequest>, ServiceError>,
) -> Result<Json<MessageResponse>, ServiceError> {
    bookings
        .change_status(&user, request.booking_id, request.status)
        .await?;

    Ok(Json(MessageResponse::ok("Status Updated")))
}
