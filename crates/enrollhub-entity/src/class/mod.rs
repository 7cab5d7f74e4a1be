//! Class domain entities.

pub mod model;

pub use model::{Class, ClassDetail};
