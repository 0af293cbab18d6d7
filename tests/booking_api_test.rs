use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

mod common;
use common::TestApp;

#[tokio::test]
async fn test_create_booking_prices_by_days() {
    let app = TestApp::new();
    let owner = app.register_owner("Olive", "olive@example.com").await;
    let renter = app.register("Rita", "rita@example.com").await;
    let car = app.add_car(&owner, "Madrid", 50.0).await;

    let (status, body) = app
        .post(
            "/api/bookings/create",
            Some(&renter),
            json!({ "car": car, "pickupDate": "2025-01-01", "returnDate": "2025-01-04" }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Booking created");
    assert_eq!(body["booking"]["price"], 150.0);
    assert_eq!(body["booking"]["status"], "pending");
    assert_eq!(body["booking"]["car"], car.as_str());
}

#[tokio::test]
async fn test_create_booking_requires_authentication() {
    let app = TestApp::new();

    let (status, _) = app
        .post(
            "/api/bookings/create",
            None,
            json!({ "car": uuid::Uuid::new_v4(), "pickupDate": "2025-01-01", "returnDate": "2025-01-04" }),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_overlapping_booking_is_rejected() {
    let app = TestApp::new();
    let owner = app.register_owner("Olive", "olive@example.com").await;
    let renter = app.register("Rita", "rita@example.com").await;
    let car = app.add_car(&owner, "Madrid", 50.0).await;

    let (status, _) = app
        .post(
            "/api/bookings",
            Some(&renter),
            json!({ "car": car, "pickupDate": "2025-02-10", "returnDate": "2025-02-15" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .post(
            "/api/bookings/create",
            Some(&renter),
            json!({ "car": car, "pickupDate": "2025-02-15", "returnDate": "2025-02-18" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);

    let (status, _) = app
        .post(
            "/api/bookings/create",
            Some(&renter),
            json!({ "car": car, "pickupDate": "2025-02-16", "returnDate": "2025-02-18" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_invalid_range_and_unknown_car() {
    let app = TestApp::new();
    let owner = app.register_owner("Olive", "olive@example.com").await;
    let renter = app.register("Rita", "rita@example.com").await;
    let car = app.add_car(&owner, "Madrid", 50.0).await;

    let (status, _) = app
        .post(
            "/api/bookings/create",
            Some(&renter),
            json!({ "car": car, "pickupDate": "2025-01-04", "returnDate": "2025-01-04" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/bookings/create",
            Some(&renter),
            json!({ "car": uuid::Uuid::new_v4(), "pickupDate": "2025-01-01", "returnDate": "2025-01-04" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_check_availability_is_public_and_excludes_booked_cars() {
    let app = TestApp::new();
    let owner = app.register_owner("Olive", "olive@example.com").await;
    let renter = app.register("Rita", "rita@example.com").await;
    let booked = app.add_car(&owner, "Madrid", 50.0).await;
    let free = app.add_car(&owner, "Madrid", 70.0).await;
    app.add_car(&owner, "Seville", 40.0).await;
    app.post(
        "/api/bookings/create",
        Some(&renter),
        json!({ "car": booked, "pickupDate": "2025-05-01", "returnDate": "2025-05-05" }),
    )
    .await;

    let (status, body) = app
        .post(
            "/api/bookings/check-availability",
            None,
            json!({ "location": "Madrid", "pickupDate": "2025-05-04", "returnDate": "2025-05-08" }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let cars = body["availableCars"].as_array().unwrap();
    assert_eq!(cars.len(), 1);
    assert_eq!(cars[0]["id"], free.as_str());
}

#[tokio::test]
async fn test_user_and_owner_listings() {
    let app = TestApp::new();
    let owner = app.register_owner("Olive", "olive@example.com").await;
    let renter = app.register("Rita", "rita@example.com").await;
    let car = app.add_car(&owner, "Madrid", 50.0).await;
    for (pickup, ret) in [("2025-06-01", "2025-06-02"), ("2025-07-01", "2025-07-03")] {
        app.post(
            "/api/bookings/create",
            Some(&renter),
            json!({ "car": car, "pickupDate": pickup, "returnDate": ret }),
        )
        .await;
    }

    let (status, body) = app.get("/api/bookings/user", Some(&renter)).await;
    assert_eq!(status, StatusCode::OK);
    let bookings = body["bookings"].as_array().unwrap();
    assert_eq!(bookings.len(), 2);
    assert_eq!(bookings[0]["pickupDate"], "2025-07-01");
    assert_eq!(bookings[0]["car"]["brand"], "Toyota");

    let (status, body) = app.get("/api/bookings/owner", Some(&owner)).await;
    assert_eq!(status, StatusCode::OK);
    let bookings = body["bookings"].as_array().unwrap();
    assert_eq!(bookings.len(), 2);
    assert_eq!(bookings[0]["user"]["email"], "rita@example.com");
    assert!(bookings[0]["user"].get("passwordHash").is_none());

    let (status, _) = app.get("/api/bookings/owner", Some(&renter)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_change_status_only_by_car_owner() {
    let app = TestApp::new();
    let owner = app.register_owner("Olive", "olive@example.com").await;
    let renter = app.register("Rita", "rita@example.com").await;
    let car = app.add_car(&owner, "Madrid", 50.0).await;
    let (_, body) = app
        .post(
            "/api/bookings/create",
            Some(&renter),
            json!({ "car": car, "pickupDate": "2025-08-01", "returnDate": "2025-08-04" }),
        )
        .await;
    let booking_id = body["booking"]["id"].clone();

    let (status, _) = app
        .post(
            "/api/bookings/change-status",
            Some(&renter),
            json!({ "bookingId": booking_id, "status": "confirmed" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .post(
            "/api/bookings/change-status",
            Some(&owner),
            json!({ "bookingId": booking_id, "status": "cancelled" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Status Updated");

    let (_, body) = app.get("/api/bookings/user", Some(&renter)).await;
    assert_eq!(body["bookings"][0]["status"], "cancelled");
}

#[tokio::test]
async fn test_concurrent_overlapping_requests_admit_one() {
    let app = TestApp::new();
    let owner = app.register_owner("Olive", "olive@example.com").await;
    let renter = app.register("Rita", "rita@example.com").await;
    let car = app.add_car(&owner, "Madrid", 50.0).await;

    let first = app.post(
        "/api/bookings/create",
        Some(&renter),
        json!({ "car": car, "pickupDate": "2025-09-01", "returnDate": "2025-09-05" }),
    );
    let second = app.post(
        "/api/bookings/create",
        Some(&renter),
        json!({ "car": car, "pickupDate": "2025-09-03", "returnDate": "2025-09-07" }),
    );
    let ((a, _), (b, _)) = tokio::join!(first, second);

    let mut statuses = vec![a, b];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::OK, StatusCode::CONFLICT]);
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let app = TestApp::new();
    let renter = app.register("Rita", "rita@example.com").await;

    let (status, body) = app
        .post("/api/bookings/create", Some(&renter), json!({ "car": "nope" }))
        .await;

    assert!(status.is_client_error());
    assert_eq!(body["success"], false);
}
