//! In-memory reference backend.
//!
//! [`MemoryPlugin`] keeps every entity in a [`Registry`] and implements
//! every featherstone feature against it, so composed engines can be
//! exercised end to end without an external physics engine.
//!
//! # Invariants
//! - The engine is id 0; every later entity gets the next integer.
//! - Lookup misses return the invalid identity and are logged at `warn`.
//! - Removing a model eagerly removes its links, shapes and joints.

pub mod construct;
pub mod entities;
pub mod kinematics;
pub mod plugin;
pub mod registry;
pub mod simulation;

use featherstone_common::Policy3d;
use featherstone_describe::ConstructWorldFromDescription;
use featherstone_physics::{
    AttachBoxShape, AttachSphereShape, ConstructEmptyLink, ConstructEmptyModel, ConstructEmptyWorld,
    ForwardStep, FrameSemantics, GetContactsFromLastStep, GetEngineInfo, GetJointFromModel,
    GetLinkBoundingBox, GetLinkFromModel, GetModelFromWorld, GetShapeBoundingBox,
    GetShapeCollisionProperties, GetShapeFromLink, GetShapeKinematicProperties, GetWorldFromEngine,
    JointFrameSemantics, LinkFrameSemantics, Loader, RemoveEntities, SetShapeCollisionProperties,
    SetShapeKinematicProperties, ShapeFrameSemantics, feature_list,
};

pub use plugin::MemoryPlugin;
pub use registry::{CollisionInfo, JointInfo, LinkInfo, ModelInfo, Registry, WorldInfo};

feature_list! {
    /// Every feature the memory backend can serve.
    pub struct MemoryFeatures {
        GetEngineInfo,
        GetWorldFromEngine,
        GetModelFromWorld,
        GetLinkFromModel,
        GetJointFromModel,
        GetShapeFromLink,
        RemoveEntities,
        ConstructEmptyWorld,
        ConstructEmptyModel,
        ConstructEmptyLink,
        AttachBoxShape,
        AttachSphereShape,
        FrameSemantics,
        LinkFrameSemantics,
        ShapeFrameSemantics,
        JointFrameSemantics,
        GetShapeKinematicProperties,
        SetShapeKinematicProperties,
        GetShapeCollisionProperties,
        SetShapeCollisionProperties,
        GetShapeBoundingBox,
        GetLinkBoundingBox,
        ForwardStep,
        GetContactsFromLastStep,
        ConstructWorldFromDescription,
    }
}

/// A loader with the memory plugin registered.
pub fn loader() -> Loader<Policy3d> {
    let mut loader = Loader::new();
    loader.register(MemoryPlugin::new);
    loader
}
