//! Shared vocabulary: entity identities and geometry policies.
//!
//! # Invariants
//! - An identity's id never changes once minted.
//! - Id 0 names the engine; `usize::MAX` names nothing.

pub mod geometry;
pub mod identity;

pub use geometry::{
    AlignedBox, AlignedBox3d, FrameData, FrameData3d, FrameId, Policy, Policy3d, Policy3f, Pose,
    Pose3d, Pose3f,
};
pub use identity::{ENGINE_ENTITY_ID, INVALID_ENTITY_ID, IdAllocator, Identity};
