pub mod filters;
pub mod performance;
pub mod restaurants;
pub mod reviews;
pub mod sync;
