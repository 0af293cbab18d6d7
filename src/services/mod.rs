// Business logic services

pub mod availability_service;
pub mod booking_service;
pub mod errors;
pub mod owner_service;

pub use availability_service::AvailabilityService;
pub use booking_service::BookingService;
pub use errors::*;
pub use owner_service::OwnerService;
