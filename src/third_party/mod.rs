//! Third-party crate isolation.

mod avian;

pub use avian::surface_distance;
