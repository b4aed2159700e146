pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{
    Booking, BookingExtraLine, BookingStatus, CancelBookingRequest, CancelledBy,
    ConfirmBookingRequest, CreateBookingRequest, RefundStatus, RescheduleBookingRequest,
};
pub use repositories::{BookingRepository, MySqlBookingRepository};
pub use services::BookingService;
