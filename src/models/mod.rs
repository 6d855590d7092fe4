pub mod forecast;
pub mod itinerary;
pub mod optimize;
pub mod review;
pub mod trip;
