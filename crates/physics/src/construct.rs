//! Features that introduce new, empty entities.

use featherstone_common::{Identity, Policy, Pose};

use crate::{Engine, Feature, Has, Link, Model, Shape, World};

pub struct ConstructEmptyWorld;

pub trait ConstructEmptyWorldInterface<P: Policy> {
    fn construct_empty_world(&mut self, engine: &Identity, name: &str) -> Identity;
}

impl Feature for ConstructEmptyWorld {
    const NAME: &'static str = "ConstructEmptyWorld";
    type Requires = ();
    type Interface<P: Policy> = dyn ConstructEmptyWorldInterface<P>;
}

impl<P: Policy, FL: Has<ConstructEmptyWorld>> Engine<P, FL> {
    pub fn construct_empty_world(&self, name: &str) -> Option<World<P, FL>> {
        let id = self.modify::<ConstructEmptyWorld, _>(|c, engine| {
            c.construct_empty_world(engine, name)
        });
        self.related(id)
    }
}

pub struct ConstructEmptyModel;

pub trait ConstructEmptyModelInterface<P: Policy> {
    fn construct_empty_model(&mut self, world: &Identity, name: &str) -> Identity;
}

impl Feature for ConstructEmptyModel {
    const NAME: &'static str = "ConstructEmptyModel";
    type Requires = ();
    type Interface<P: Policy> = dyn ConstructEmptyModelInterface<P>;
}

impl<P: Policy, FL: Has<ConstructEmptyModel>> World<P, FL> {
    pub fn construct_empty_model(&self, name: &str) -> Option<Model<P, FL>> {
        let id =
            self.modify::<ConstructEmptyModel, _>(|c, world| c.construct_empty_model(world, name));
        self.related(id)
    }
}

pub struct ConstructEmptyLink;

pub trait ConstructEmptyLinkInterface<P: Policy> {
    fn construct_empty_link(&mut self, model: &Identity, name: &str) -> Identity;
}

impl Feature for ConstructEmptyLink {
    const NAME: &'static str = "ConstructEmptyLink";
    type Requires = ();
    type Interface<P: Policy> = dyn ConstructEmptyLinkInterface<P>;
}

impl<P: Policy, FL: Has<ConstructEmptyLink>> Model<P, FL> {
    pub fn construct_empty_link(&self, name: &str) -> Option<Link<P, FL>> {
        let id =
            self.modify::<ConstructEmptyLink, _>(|c, model| c.construct_empty_link(model, name));
        self.related(id)
    }
}

/// Attach a box, centered on its frame, to a link.
pub struct AttachBoxShape;

pub trait AttachBoxShapeInterface<P: Policy> {
    /// `size` holds the full edge lengths.
    fn attach_box_shape(
        &mut self,
        link: &Identity,
        name: &str,
        size: P::Vector,
        pose: &Pose<P>,
    ) -> Identity;
}

impl Feature for AttachBoxShape {
    const NAME: &'static str = "AttachBoxShape";
    type Requires = ();
    type Interface<P: Policy> = dyn AttachBoxShapeInterface<P>;
}

impl<P: Policy, FL: Has<AttachBoxShape>> Link<P, FL> {
    pub fn attach_box_shape(
        &self,
        name: &str,
        size: P::Vector,
        pose: &Pose<P>,
    ) -> Option<Shape<P, FL>> {
        let id =
            self.modify::<AttachBoxShape, _>(|a, link| a.attach_box_shape(link, name, size, pose));
        self.related(id)
    }
}

pub struct AttachSphereShape;

pub trait AttachSphereShapeInterface<P: Policy> {
    fn attach_sphere_shape(
        &mut self,
        link: &Identity,
        name: &str,
        radius: P::Scalar,
        pose: &Pose<P>,
    ) -> Identity;
}

impl Feature for AttachSphereShape {
    const NAME: &'static str = "AttachSphereShape";
    type Requires = ();
    type Interface<P: Policy> = dyn AttachSphereShapeInterface<P>;
}

impl<P: Policy, FL: Has<AttachSphereShape>> Link<P, FL> {
    pub fn attach_sphere_shape(
        &self,
        name: &str,
        radius: P::Scalar,
        pose: &Pose<P>,
    ) -> Option<Shape<P, FL>> {
        let id = self.modify::<AttachSphereShape, _>(|a, link| {
            a.attach_sphere_shape(link, name, radius, pose)
        });
        self.related(id)
    }
}
