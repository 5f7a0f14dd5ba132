//! Row structs and DTOs for both stores.

pub mod restaurant;
pub mod review;
pub mod sync_state;
