use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use featherstone_common::{Identity, Policy3d, Pose3d};
use featherstone_describe::ConstructWorldFromDescription;
use featherstone_physics::{
    AttachBoxShape, AttachSphereShape, ConstructEmptyLink, ConstructEmptyModel, ConstructEmptyWorld,
    Contact, ForwardStep, FrameSemantics, GetContactsFromLastStep, GetEngineInfo, GetJointFromModel,
    GetLinkFromModel, GetModelFromWorld, GetShapeBoundingBox, GetShapeCollisionProperties,
    GetShapeFromLink, GetShapeKinematicProperties, GetWorldFromEngine, InterfaceTable, Plugin,
    RemoveEntities, SetShapeCollisionProperties, SetShapeKinematicProperties,
};
use tracing::debug;

use crate::registry::Registry;

/// Unordered pair of shape ids.
pub(crate) type ShapePair = (usize, usize);

pub(crate) fn shape_pair(a: usize, b: usize) -> ShapePair {
    if a <= b { (a, b) } else { (b, a) }
}

/// In-memory reference backend.
///
/// Holds a [`Registry`] of worlds, models, links, collisions and joints and
/// implements every featherstone feature on top of it. Stepping is
/// kinematic: non-fixed links fall under their world's gravity and nothing
/// collides.
#[derive(Debug, Default)]
pub struct MemoryPlugin {
    pub(crate) registry: Registry,
    pub(crate) engine: Identity,
    pub(crate) engine_index: usize,
    pub(crate) pair_friction: BTreeMap<ShapePair, f64>,
    pub(crate) pair_restitution: BTreeMap<ShapePair, f64>,
    /// World poses reported by the previous step, keyed by link id.
    pub(crate) previous_poses: BTreeMap<usize, Pose3d>,
    /// Contacts found by the last step, keyed by world id.
    pub(crate) last_contacts: BTreeMap<usize, Vec<Contact<Policy3d>>>,
}

impl MemoryPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Forget pair overrides and contacts that mention any of `shapes`.
    pub(crate) fn forget_shapes(&mut self, shapes: &[usize]) {
        let keep = |pair: &ShapePair| !shapes.contains(&pair.0) && !shapes.contains(&pair.1);
        self.pair_friction.retain(|pair, _| keep(pair));
        self.pair_restitution.retain(|pair, _| keep(pair));
        for contacts in self.last_contacts.values_mut() {
            contacts.retain(|c| keep(&(c.collision1.id(), c.collision2.id())));
        }
    }
}

impl Plugin for MemoryPlugin {
    type Policy = Policy3d;
    const NAME: &'static str = "memory";

    fn initiate_engine(&mut self, engine_index: usize) -> Identity {
        self.engine = self.registry.mint_engine();
        self.engine_index = engine_index;
        debug!(engine = %self.engine, engine_index, "initiated memory engine");
        self.engine.clone()
    }

    fn register(this: &Rc<RefCell<Self>>, table: &mut InterfaceTable<Policy3d>) {
        table
            .implement::<GetEngineInfo>(this.clone())
            .implement::<GetWorldFromEngine>(this.clone())
            .implement::<GetModelFromWorld>(this.clone())
            .implement::<GetLinkFromModel>(this.clone())
            .implement::<GetJointFromModel>(this.clone())
            .implement::<GetShapeFromLink>(this.clone())
            .implement::<RemoveEntities>(this.clone())
            .implement::<ConstructEmptyWorld>(this.clone())
            .implement::<ConstructEmptyModel>(this.clone())
            .implement::<ConstructEmptyLink>(this.clone())
            .implement::<AttachBoxShape>(this.clone())
            .implement::<AttachSphereShape>(this.clone())
            .implement::<FrameSemantics>(this.clone())
            .implement::<GetShapeKinematicProperties>(this.clone())
            .implement::<SetShapeKinematicProperties>(this.clone())
            .implement::<GetShapeCollisionProperties>(this.clone())
            .implement::<SetShapeCollisionProperties>(this.clone())
            .implement::<GetShapeBoundingBox>(this.clone())
            .implement::<ForwardStep>(this.clone())
            .implement::<GetContactsFromLastStep>(this.clone())
            .implement::<ConstructWorldFromDescription>(this.clone());
    }
}
