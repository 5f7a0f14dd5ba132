//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept a pool as the first argument. `RestaurantRepo` and `ReviewRepo`
//! query the remote PostgreSQL store; `MirrorRepo` queries the local
//! SQLite mirror.

pub mod mirror_repo;
pub mod restaurant_repo;
pub mod review_repo;

pub use mirror_repo::MirrorRepo;
pub use restaurant_repo::RestaurantRepo;
pub use review_repo::ReviewRepo;
