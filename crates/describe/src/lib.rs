//! World descriptions: serde data for whole scenes, and the
//! `ConstructWorldFromDescription` feature that hands them to a backend.
//!
//! The feature is declared outside the physics crate, so its client
//! operation is the [`ConstructWorld`] extension trait rather than an
//! inherent method.

pub mod construct;
pub mod description;

pub use construct::{
    ConstructWorld, ConstructWorldFromDescription, ConstructWorldFromDescriptionInterface,
};
pub use description::{
    CollisionDescription, DescribeError, Geometry, JointDescription, JointKind, LinkDescription,
    ModelDescription, PoseDescription, WorldDescription,
};
