pub mod booking;
pub mod booking_request;

pub use booking::{Booking, BookingExtraLine, BookingStatus, RefundStatus};
pub use booking_request::{
    CancelBookingRequest, CancelledBy, ConfirmBookingRequest, CreateBookingRequest,
    RescheduleBookingRequest,
};
