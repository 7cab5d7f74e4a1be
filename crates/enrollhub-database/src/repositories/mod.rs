//! Query repositories for EnrollHub tables.
//!
//! Repositories are stateless and run against a borrowed connection so the
//! same queries serve both pooled reads and the engine's transactions.

pub mod attendance;
pub mod class;
pub mod event;
pub mod registration;
pub mod user;

pub use attendance::AttendanceRepository;
pub use class::ClassRepository;
pub use event::EventRepository;
pub use registration::RegistrationRepository;
pub use user::UserRepository;
