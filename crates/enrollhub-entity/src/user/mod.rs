//! Participant domain entities.

pub mod model;
pub mod priority;
pub mod role;
pub mod status;

pub use model::User;
pub use priority::Priority;
pub use role::UserRole;
pub use status::UserStatus;
