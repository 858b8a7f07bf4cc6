//! Implementations and traits for static analysis over the IL.

pub mod fixed_point;
mod liveness;
pub mod points_to;

pub use self::liveness::liveness;
pub use self::points_to::points_to;
