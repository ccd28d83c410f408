//! Feature composition: declare capabilities, compose them into feature
//! lists, and dispatch proxy-entity calls to the plugin implementing them.
//!
//! The physics features themselves (entity navigation, construction,
//! removal, frames, shape properties, stepping, contacts) are declared here too, as
//! inherent operations on [`Entity`] gated by `FL: Has<Feature>`.
//!
//! # Invariants
//! - A feature list containing a feature without its requirements does not
//!   compile ([`feature_list!`]) or does not compose ([`FeatureSet::compose`]).
//! - Composition validity depends on set membership only, never on order.
//! - An engine is only handed out for a feature list whose interfaces the
//!   plugin registered; unsupported lists fail at request time, not call time.

pub mod compose;
pub mod construct;
pub mod entities;
pub mod entity;
pub mod feature;
pub mod frames;
pub mod interface;
pub mod plugin;
pub mod remove;
pub mod shape;
pub mod step;

#[cfg(test)]
mod testing;

pub use compose::{CompositionError, FeatureSet};
pub use construct::{
    AttachBoxShape, AttachBoxShapeInterface, AttachSphereShape, AttachSphereShapeInterface,
    ConstructEmptyLink, ConstructEmptyLinkInterface, ConstructEmptyModel,
    ConstructEmptyModelInterface, ConstructEmptyWorld, ConstructEmptyWorldInterface,
};
pub use entities::{
    GetEngineInfo, GetEngineInfoInterface, GetJointFromModel, GetJointFromModelInterface,
    GetLinkFromModel, GetLinkFromModelInterface, GetModelFromWorld, GetModelFromWorldInterface,
    GetShapeFromLink, GetShapeFromLinkInterface, GetWorldFromEngine, GetWorldFromEngineInterface,
};
pub use entity::{
    Dispatch, Engine, Engine3d, Engine3f, Entity, Joint, Joint3d, Link, Link3d, Model, Model3d,
    Shape, Shape3d, World, World3d, World3f, kind,
};
pub use feature::{Feature, FeatureDescriptor, FeatureList, FeatureTuple, Has, HasAll};
pub use frames::{
    FrameSemantics, FrameSemanticsInterface, JointFrameSemantics, LinkFrameSemantics,
    ShapeFrameSemantics, resolve_frame_data,
};
pub use interface::InterfaceTable;
pub use plugin::{Loader, Plugin, PluginInstance};
pub use remove::{RemoveEntities, RemoveEntitiesInterface};
pub use shape::{
    GetLinkBoundingBox, GetShapeBoundingBox, GetShapeBoundingBoxInterface,
    GetShapeCollisionProperties, GetShapeCollisionPropertiesInterface,
    GetShapeKinematicProperties, GetShapeKinematicPropertiesInterface,
    SetShapeCollisionProperties, SetShapeCollisionPropertiesInterface,
    SetShapeKinematicProperties, SetShapeKinematicPropertiesInterface,
};
pub use step::{
    ChangedWorldPoses, Contact, ForwardStep, ForwardStepInterface, GetContactsFromLastStep,
    GetContactsFromLastStepInterface, POSE_CHANGE_TOLERANCE, ShapeContact, StepInput, StepOutput,
    WorldPose,
};
