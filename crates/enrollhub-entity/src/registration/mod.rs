//! Registration domain entities.

pub mod model;
pub mod status;

pub use model::{NewRegistration, Registration};
pub use status::RegistrationStatus;
