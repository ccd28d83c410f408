//! Features for navigating the entity tree:
//! engine → worlds → models → links/joints → shapes.
//!
//! Every lookup that can miss returns `None` on the client side; backends
//! signal the miss with [`Identity::invalid`], never by panicking.

use featherstone_common::{Identity, Policy};
use crate::{Engine, Feature, Has, Joint, Link, Model, Shape, World};

/// Name and index of the engine.
pub struct GetEngineInfo;

pub trait GetEngineInfoInterface<P: Policy> {
    fn engine_name(&self, engine: &Identity) -> String;
    fn engine_index(&self, engine: &Identity) -> usize;
}

impl Feature for GetEngineInfo {
    const NAME: &'static str = "GetEngineInfo";
    type Requires = ();
    type Interface<P: Policy> = dyn GetEngineInfoInterface<P>;
}

impl<P: Policy, FL: Has<GetEngineInfo>> Engine<P, FL> {
    pub fn name(&self) -> String {
        self.query::<GetEngineInfo, _>(|info, engine| info.engine_name(engine))
    }

    pub fn index(&self) -> usize {
        self.query::<GetEngineInfo, _>(|info, engine| info.engine_index(engine))
    }
}

/// Worlds owned by an engine.
pub struct GetWorldFromEngine;

pub trait GetWorldFromEngineInterface<P: Policy> {
    fn world_count(&self, engine: &Identity) -> usize;
    fn world_by_index(&self, engine: &Identity, index: usize) -> Identity;
    fn world_by_name(&self, engine: &Identity, name: &str) -> Identity;
    fn world_name(&self, world: &Identity) -> String;
    fn world_index(&self, world: &Identity) -> usize;
    fn engine_of_world(&self, world: &Identity) -> Identity;
}

impl Feature for GetWorldFromEngine {
    const NAME: &'static str = "GetWorldFromEngine";
    type Requires = ();
    type Interface<P: Policy> = dyn GetWorldFromEngineInterface<P>;
}

impl<P: Policy, FL: Has<GetWorldFromEngine>> Engine<P, FL> {
    pub fn world_count(&self) -> usize {
        self.query::<GetWorldFromEngine, _>(|worlds, engine| worlds.world_count(engine))
    }

    pub fn world(&self, index: usize) -> Option<World<P, FL>> {
        let id = self
            .query::<GetWorldFromEngine, _>(|worlds, engine| worlds.world_by_index(engine, index));
        self.related(id)
    }

    pub fn world_by_name(&self, name: &str) -> Option<World<P, FL>> {
        let id = self.query::<GetWorldFromEngine, _>(|worlds, engine| {
            worlds.world_by_name(engine, name)
        });
        self.related(id)
    }
}

impl<P: Policy, FL: Has<GetWorldFromEngine>> World<P, FL> {
    pub fn name(&self) -> String {
        self.query::<GetWorldFromEngine, _>(|worlds, world| worlds.world_name(world))
    }

    pub fn index(&self) -> usize {
        self.query::<GetWorldFromEngine, _>(|worlds, world| worlds.world_index(world))
    }

    pub fn engine(&self) -> Option<Engine<P, FL>> {
        let id = self.query::<GetWorldFromEngine, _>(|worlds, world| worlds.engine_of_world(world));
        self.related(id)
    }
}

/// Models owned by a world.
pub struct GetModelFromWorld;

pub trait GetModelFromWorldInterface<P: Policy> {
    fn model_count(&self, world: &Identity) -> usize;
    fn model_by_index(&self, world: &Identity, index: usize) -> Identity;
    fn model_by_name(&self, world: &Identity, name: &str) -> Identity;
    fn model_name(&self, model: &Identity) -> String;
    fn model_index(&self, model: &Identity) -> usize;
    fn world_of_model(&self, model: &Identity) -> Identity;
}

impl Feature for GetModelFromWorld {
    const NAME: &'static str = "GetModelFromWorld";
    type Requires = ();
    type Interface<P: Policy> = dyn GetModelFromWorldInterface<P>;
}

impl<P: Policy, FL: Has<GetModelFromWorld>> World<P, FL> {
    pub fn model_count(&self) -> usize {
        self.query::<GetModelFromWorld, _>(|models, world| models.model_count(world))
    }

    pub fn model(&self, index: usize) -> Option<Model<P, FL>> {
        let id =
            self.query::<GetModelFromWorld, _>(|models, world| models.model_by_index(world, index));
        self.related(id)
    }

    pub fn model_by_name(&self, name: &str) -> Option<Model<P, FL>> {
        let id =
            self.query::<GetModelFromWorld, _>(|models, world| models.model_by_name(world, name));
        self.related(id)
    }
}

impl<P: Policy, FL: Has<GetModelFromWorld>> Model<P, FL> {
    pub fn name(&self) -> String {
        self.query::<GetModelFromWorld, _>(|models, model| models.model_name(model))
    }

    pub fn index(&self) -> usize {
        self.query::<GetModelFromWorld, _>(|models, model| models.model_index(model))
    }

    pub fn world(&self) -> Option<World<P, FL>> {
        let id = self.query::<GetModelFromWorld, _>(|models, model| models.world_of_model(model));
        self.related(id)
    }
}

/// Links owned by a model.
pub struct GetLinkFromModel;

pub trait GetLinkFromModelInterface<P: Policy> {
    fn link_count(&self, model: &Identity) -> usize;
    fn link_by_index(&self, model: &Identity, index: usize) -> Identity;
    fn link_by_name(&self, model: &Identity, name: &str) -> Identity;
    fn link_name(&self, link: &Identity) -> String;
    fn link_index(&self, link: &Identity) -> usize;
    fn model_of_link(&self, link: &Identity) -> Identity;
}

impl Feature for GetLinkFromModel {
    const NAME: &'static str = "GetLinkFromModel";
    type Requires = ();
    type Interface<P: Policy> = dyn GetLinkFromModelInterface<P>;
}

impl<P: Policy, FL: Has<GetLinkFromModel>> Model<P, FL> {
    pub fn link_count(&self) -> usize {
        self.query::<GetLinkFromModel, _>(|links, model| links.link_count(model))
    }

    pub fn link(&self, index: usize) -> Option<Link<P, FL>> {
        let id =
            self.query::<GetLinkFromModel, _>(|links, model| links.link_by_index(model, index));
        self.related(id)
    }

    pub fn link_by_name(&self, name: &str) -> Option<Link<P, FL>> {
        let id = self.query::<GetLinkFromModel, _>(|links, model| links.link_by_name(model, name));
        self.related(id)
    }
}

impl<P: Policy, FL: Has<GetLinkFromModel>> Link<P, FL> {
    pub fn name(&self) -> String {
        self.query::<GetLinkFromModel, _>(|links, link| links.link_name(link))
    }

    pub fn index(&self) -> usize {
        self.query::<GetLinkFromModel, _>(|links, link| links.link_index(link))
    }

    pub fn model(&self) -> Option<Model<P, FL>> {
        let id = self.query::<GetLinkFromModel, _>(|links, link| links.model_of_link(link));
        self.related(id)
    }
}

/// Joints owned by a model.
pub struct GetJointFromModel;

pub trait GetJointFromModelInterface<P: Policy> {
    fn joint_count(&self, model: &Identity) -> usize;
    fn joint_by_index(&self, model: &Identity, index: usize) -> Identity;
    fn joint_by_name(&self, model: &Identity, name: &str) -> Identity;
    fn joint_name(&self, joint: &Identity) -> String;
    fn joint_index(&self, joint: &Identity) -> usize;
    fn model_of_joint(&self, joint: &Identity) -> Identity;
}

impl Feature for GetJointFromModel {
    const NAME: &'static str = "GetJointFromModel";
    type Requires = ();
    type Interface<P: Policy> = dyn GetJointFromModelInterface<P>;
}

impl<P: Policy, FL: Has<GetJointFromModel>> Model<P, FL> {
    pub fn joint_count(&self) -> usize {
        self.query::<GetJointFromModel, _>(|joints, model| joints.joint_count(model))
    }

    pub fn joint(&self, index: usize) -> Option<Joint<P, FL>> {
        let id =
            self.query::<GetJointFromModel, _>(|joints, model| joints.joint_by_index(model, index));
        self.related(id)
    }

    pub fn joint_by_name(&self, name: &str) -> Option<Joint<P, FL>> {
        let id =
            self.query::<GetJointFromModel, _>(|joints, model| joints.joint_by_name(model, name));
        self.related(id)
    }
}

impl<P: Policy, FL: Has<GetJointFromModel>> Joint<P, FL> {
    pub fn name(&self) -> String {
        self.query::<GetJointFromModel, _>(|joints, joint| joints.joint_name(joint))
    }

    pub fn index(&self) -> usize {
        self.query::<GetJointFromModel, _>(|joints, joint| joints.joint_index(joint))
    }

    pub fn model(&self) -> Option<Model<P, FL>> {
        let id = self.query::<GetJointFromModel, _>(|joints, joint| joints.model_of_joint(joint));
        self.related(id)
    }
}

/// Collision shapes attached to a link.
pub struct GetShapeFromLink;

pub trait GetShapeFromLinkInterface<P: Policy> {
    fn shape_count(&self, link: &Identity) -> usize;
    fn shape_by_index(&self, link: &Identity, index: usize) -> Identity;
    fn shape_by_name(&self, link: &Identity, name: &str) -> Identity;
    fn shape_name(&self, shape: &Identity) -> String;
    fn shape_index(&self, shape: &Identity) -> usize;
    fn link_of_shape(&self, shape: &Identity) -> Identity;
}

impl Feature for GetShapeFromLink {
    const NAME: &'static str = "GetShapeFromLink";
    type Requires = ();
    type Interface<P: Policy> = dyn GetShapeFromLinkInterface<P>;
}

impl<P: Policy, FL: Has<GetShapeFromLink>> Link<P, FL> {
    pub fn shape_count(&self) -> usize {
        self.query::<GetShapeFromLink, _>(|shapes, link| shapes.shape_count(link))
    }

    pub fn shape(&self, index: usize) -> Option<Shape<P, FL>> {
        let id =
            self.query::<GetShapeFromLink, _>(|shapes, link| shapes.shape_by_index(link, index));
        self.related(id)
    }

    pub fn shape_by_name(&self, name: &str) -> Option<Shape<P, FL>> {
        let id = self.query::<GetShapeFromLink, _>(|shapes, link| shapes.shape_by_name(link, name));
        self.related(id)
    }
}

impl<P: Policy, FL: Has<GetShapeFromLink>> Shape<P, FL> {
    pub fn name(&self) -> String {
        self.query::<GetShapeFromLink, _>(|shapes, shape| shapes.shape_name(shape))
    }

    pub fn index(&self) -> usize {
        self.query::<GetShapeFromLink, _>(|shapes, shape| shapes.shape_index(shape))
    }

    pub fn link(&self) -> Option<Link<P, FL>> {
        let id = self.query::<GetShapeFromLink, _>(|shapes, shape| shapes.link_of_shape(shape));
        self.related(id)
    }
}
