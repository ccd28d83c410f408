//! Entity registry: every record the backend owns, keyed by id.
//!
//! # Invariants
//! - Ids are minted by one [`IdAllocator`]; the engine holds id 0 and no id
//!   is ever handed out twice, even after removal.
//! - Every child id listed by a parent record is present in the registry,
//!   and every present record's parent lists it.
//! - Identities handed out carry a strong reference to the record. The
//!   registry alone decides whether the entity is still reachable.

use std::any::Any;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use featherstone_common::{AlignedBox3d, IdAllocator, Identity, Pose3d};
use featherstone_describe::{Geometry, JointKind};
use glam::DVec3;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct WorldInfo {
    pub name: String,
    pub gravity: DVec3,
    /// Seconds.
    pub time_step: f64,
    /// Seconds simulated so far.
    pub sim_time: f64,
    pub models: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelInfo {
    pub name: String,
    pub world: usize,
    pub fixed: bool,
    /// Relative to the world.
    pub pose: Pose3d,
    pub links: Vec<usize>,
    pub joints: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkInfo {
    pub name: String,
    pub model: usize,
    /// Relative to the model.
    pub pose: Pose3d,
    pub mass: f64,
    pub inertia: DVec3,
    /// World frame.
    pub linear_velocity: DVec3,
    pub shapes: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollisionInfo {
    pub name: String,
    pub link: usize,
    /// Relative to the link.
    pub pose: Pose3d,
    pub geometry: Geometry,
    pub friction: f64,
    pub restitution: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JointInfo {
    pub name: String,
    pub model: usize,
    /// `None` when the joint attaches the child to the world.
    pub parent_link: Option<usize>,
    pub child_link: usize,
    pub kind: JointKind,
    pub axis: DVec3,
}

type Records<T> = BTreeMap<usize, Rc<RefCell<T>>>;

fn identity_of<T: 'static>(id: usize, record: &Rc<RefCell<T>>) -> Identity {
    let reference: Rc<dyn Any> = record.clone();
    Identity::generate(id, Some(reference))
}

fn lookup<T: 'static>(records: &Records<T>, id: usize) -> Identity {
    records
        .get(&id)
        .map(|record| identity_of(id, record))
        .unwrap_or_else(Identity::invalid)
}

/// Position of `id` in a child list, as an index, or `usize::MAX`.
pub(crate) fn position_of(children: &[usize], id: usize) -> usize {
    children
        .iter()
        .position(|&child| child == id)
        .unwrap_or(usize::MAX)
}

/// Drop child ids a caller put into a record being added. Children are only
/// ever listed by the registry itself.
fn clear_children(kind: &str, name: &str, children: &mut Vec<usize>) {
    if !children.is_empty() {
        warn!(kind, name, ignored = ?children, "new record listed children; cleared");
        children.clear();
    }
}

/// Every entity record the memory backend owns.
#[derive(Debug, Default)]
pub struct Registry {
    ids: IdAllocator,
    pub(crate) worlds: Records<WorldInfo>,
    pub(crate) models: Records<ModelInfo>,
    pub(crate) links: Records<LinkInfo>,
    pub(crate) collisions: Records<CollisionInfo>,
    pub(crate) joints: Records<JointInfo>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint the engine identity. Only valid as the first allocation.
    pub fn mint_engine(&mut self) -> Identity {
        self.ids.mint(None)
    }

    /// Number of ids handed out so far, removed entities included.
    pub fn minted(&self) -> usize {
        self.ids.count()
    }

    /// Child lists in `info` are ignored: a new world has no models.
    pub fn add_world(&mut self, mut info: WorldInfo) -> Identity {
        clear_children("world", &info.name, &mut info.models);
        let record = Rc::new(RefCell::new(info));
        let identity = self.ids.mint(Some(record.clone()));
        debug!(id = identity.id(), name = %record.borrow().name, "added world");
        self.worlds.insert(identity.id(), record);
        identity
    }

    /// Adds the model to its world's model list. The invalid identity if the
    /// world does not exist. Child lists in `info` are ignored.
    pub fn add_model(&mut self, mut info: ModelInfo) -> Identity {
        let Some(world) = self.worlds.get(&info.world).cloned() else {
            return Identity::invalid();
        };
        clear_children("model", &info.name, &mut info.links);
        clear_children("model", &info.name, &mut info.joints);
        let record = Rc::new(RefCell::new(info));
        let identity = self.ids.mint(Some(record.clone()));
        world.borrow_mut().models.push(identity.id());
        debug!(id = identity.id(), name = %record.borrow().name, "added model");
        self.models.insert(identity.id(), record);
        identity
    }

    /// Child lists in `info` are ignored.
    pub fn add_link(&mut self, mut info: LinkInfo) -> Identity {
        let Some(model) = self.models.get(&info.model).cloned() else {
            return Identity::invalid();
        };
        clear_children("link", &info.name, &mut info.shapes);
        let record = Rc::new(RefCell::new(info));
        let identity = self.ids.mint(Some(record.clone()));
        model.borrow_mut().links.push(identity.id());
        debug!(id = identity.id(), name = %record.borrow().name, "added link");
        self.links.insert(identity.id(), record);
        identity
    }

    pub fn add_collision(&mut self, info: CollisionInfo) -> Identity {
        let Some(link) = self.links.get(&info.link).cloned() else {
            return Identity::invalid();
        };
        let record = Rc::new(RefCell::new(info));
        let identity = self.ids.mint(Some(record.clone()));
        link.borrow_mut().shapes.push(identity.id());
        debug!(id = identity.id(), name = %record.borrow().name, "added collision");
        self.collisions.insert(identity.id(), record);
        identity
    }

    /// Both links must belong to the joint's model.
    pub fn add_joint(&mut self, info: JointInfo) -> Identity {
        let Some(model) = self.models.get(&info.model).cloned() else {
            return Identity::invalid();
        };
        let belongs = |link: usize| {
            self.links
                .get(&link)
                .is_some_and(|record| record.borrow().model == info.model)
        };
        if !belongs(info.child_link) || !info.parent_link.is_none_or(belongs) {
            return Identity::invalid();
        }
        let record = Rc::new(RefCell::new(info));
        let identity = self.ids.mint(Some(record.clone()));
        model.borrow_mut().joints.push(identity.id());
        debug!(id = identity.id(), name = %record.borrow().name, "added joint");
        self.joints.insert(identity.id(), record);
        identity
    }

    pub fn world_identity(&self, id: usize) -> Identity {
        lookup(&self.worlds, id)
    }

    pub fn model_identity(&self, id: usize) -> Identity {
        lookup(&self.models, id)
    }

    pub fn link_identity(&self, id: usize) -> Identity {
        lookup(&self.links, id)
    }

    pub fn collision_identity(&self, id: usize) -> Identity {
        lookup(&self.collisions, id)
    }

    pub fn joint_identity(&self, id: usize) -> Identity {
        lookup(&self.joints, id)
    }

    pub fn world(&self, id: usize) -> Option<&Rc<RefCell<WorldInfo>>> {
        self.worlds.get(&id)
    }

    pub fn model(&self, id: usize) -> Option<&Rc<RefCell<ModelInfo>>> {
        self.models.get(&id)
    }

    pub fn link(&self, id: usize) -> Option<&Rc<RefCell<LinkInfo>>> {
        self.links.get(&id)
    }

    pub fn collision(&self, id: usize) -> Option<&Rc<RefCell<CollisionInfo>>> {
        self.collisions.get(&id)
    }

    pub fn joint(&self, id: usize) -> Option<&Rc<RefCell<JointInfo>>> {
        self.joints.get(&id)
    }

    pub fn world_ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.worlds.keys().copied()
    }

    pub fn link_ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.links.keys().copied()
    }

    /// World pose of a link, or `None` if it does not exist.
    pub fn link_world_pose(&self, id: usize) -> Option<Pose3d> {
        let link = self.links.get(&id)?.borrow();
        let model = self.models.get(&link.model)?.borrow();
        Some(model.pose.compose(&link.pose))
    }

    pub fn collision_world_pose(&self, id: usize) -> Option<Pose3d> {
        let collision = self.collisions.get(&id)?.borrow();
        Some(self.link_world_pose(collision.link)?.compose(&collision.pose))
    }

    /// World-frame box around a collision's geometry.
    pub fn collision_world_box(&self, id: usize) -> Option<AlignedBox3d> {
        let half = self.collisions.get(&id)?.borrow().geometry.half_extents();
        let pose = self.collision_world_pose(id)?;
        Some(AlignedBox3d::new(-half, half).transformed(&pose))
    }

    /// Collisions of a world with the model owning each, in model then
    /// link order.
    pub fn world_collisions(&self, world: usize) -> Vec<(usize, usize)> {
        let Some(world) = self.worlds.get(&world) else {
            return Vec::new();
        };
        let mut collisions = Vec::new();
        for &model in &world.borrow().models {
            let Some(record) = self.models.get(&model) else {
                continue;
            };
            for link in &record.borrow().links {
                if let Some(link) = self.links.get(link) {
                    collisions.extend(link.borrow().shapes.iter().map(|&shape| (model, shape)));
                }
            }
        }
        collisions
    }

    /// Remove a model with its links, collisions and joints, and detach it
    /// from its world. Returns the removed collision ids, or `None` if the
    /// model does not exist.
    pub fn remove_model(&mut self, id: usize) -> Option<Vec<usize>> {
        let model = self.models.remove(&id)?;
        let model = model.borrow();
        if let Some(world) = self.worlds.get(&model.world) {
            world.borrow_mut().models.retain(|&m| m != id);
        }

        let mut removed_shapes = Vec::new();
        for link in &model.links {
            if let Some(link) = self.links.remove(link) {
                for shape in &link.borrow().shapes {
                    self.collisions.remove(shape);
                    removed_shapes.push(*shape);
                }
            }
        }
        for joint in &model.joints {
            self.joints.remove(joint);
        }
        debug!(
            id,
            name = %model.name,
            links = model.links.len(),
            joints = model.joints.len(),
            "removed model"
        );
        Some(removed_shapes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world(name: &str) -> WorldInfo {
        WorldInfo {
            name: name.into(),
            gravity: DVec3::new(0.0, 0.0, -9.8),
            time_step: 0.001,
            sim_time: 0.0,
            models: Vec::new(),
        }
    }

    fn model(name: &str, world: usize) -> ModelInfo {
        ModelInfo {
            name: name.into(),
            world,
            fixed: false,
            pose: Pose3d::identity(),
            links: Vec::new(),
            joints: Vec::new(),
        }
    }

    fn link(name: &str, model: usize) -> LinkInfo {
        LinkInfo {
            name: name.into(),
            model,
            pose: Pose3d::identity(),
            mass: 1.0,
            inertia: DVec3::ONE,
            linear_velocity: DVec3::ZERO,
            shapes: Vec::new(),
        }
    }

    fn sphere(name: &str, link: usize) -> CollisionInfo {
        CollisionInfo {
            name: name.into(),
            link,
            pose: Pose3d::identity(),
            geometry: Geometry::Sphere { radius: 0.5 },
            friction: 1.0,
            restitution: 0.0,
        }
    }

    fn populated() -> (Registry, Identity, Identity, Identity) {
        let mut registry = Registry::new();
        registry.mint_engine();
        let w = registry.add_world(world("w"));
        let m = registry.add_model(model("m", w.id()));
        let l = registry.add_link(link("l", m.id()));
        (registry, w, m, l)
    }

    #[test]
    fn ids_follow_the_engine() {
        let (registry, w, m, l) = populated();
        assert_eq!((w.id(), m.id(), l.id()), (1, 2, 3));
        assert_eq!(registry.minted(), 4);
    }

    #[test]
    fn lookup_yields_the_added_record() {
        let (registry, w, m, l) = populated();
        assert_eq!(*registry.world(w.id()).unwrap().borrow(), {
            let mut expected = world("w");
            expected.models.push(m.id());
            expected
        });
        assert_eq!(*registry.link(l.id()).unwrap().borrow(), link("l", m.id()));
        // Reads do not change anything.
        assert_eq!(registry.link_world_pose(l.id()), registry.link_world_pose(l.id()));
    }

    #[test]
    fn children_are_listed_by_parents() {
        let (mut registry, w, m, l) = populated();
        let c = registry.add_collision(sphere("c", l.id()));
        assert_eq!(registry.world(w.id()).unwrap().borrow().models, vec![m.id()]);
        assert_eq!(registry.model(m.id()).unwrap().borrow().links, vec![l.id()]);
        assert_eq!(registry.link(l.id()).unwrap().borrow().shapes, vec![c.id()]);
        assert_eq!(*registry.collision(c.id()).unwrap().borrow(), sphere("c", l.id()));
    }

    #[test]
    fn caller_child_lists_cannot_adopt_other_records() {
        let (mut registry, w, m, l) = populated();
        let mut intruder = model("intruder", w.id());
        intruder.links.push(l.id());
        let intruder = registry.add_model(intruder);
        assert!(registry.model(intruder.id()).unwrap().borrow().links.is_empty());

        let mut greedy = link("greedy", intruder.id());
        greedy.shapes.push(l.id());
        let greedy = registry.add_link(greedy);
        assert!(registry.link(greedy.id()).unwrap().borrow().shapes.is_empty());

        registry.remove_model(intruder.id());
        assert_eq!(registry.model(m.id()).unwrap().borrow().links, vec![l.id()]);
        assert!(registry.link(l.id()).is_some());
    }

    #[test]
    fn orphans_are_rejected() {
        let mut registry = Registry::new();
        registry.mint_engine();
        assert!(!registry.add_model(model("m", 42)).is_valid());
        assert!(!registry.add_link(link("l", 42)).is_valid());
        assert_eq!(registry.minted(), 1);
    }

    #[test]
    fn joint_links_must_share_the_model() {
        let (mut registry, w, m, l) = populated();
        let other = registry.add_model(model("other", w.id()));
        let stranger = registry.add_link(link("s", other.id()));
        let joint = |parent_link, child_link| JointInfo {
            name: "j".into(),
            model: m.id(),
            parent_link,
            child_link,
            kind: JointKind::Revolute,
            axis: DVec3::Z,
        };
        assert!(!registry.add_joint(joint(Some(stranger.id()), l.id())).is_valid());
        assert!(registry.add_joint(joint(None, l.id())).is_valid());
    }

    #[test]
    fn identities_carry_their_record() {
        let (registry, _, m, _) = populated();
        let record = registry
            .model_identity(m.id())
            .reference_as::<RefCell<ModelInfo>>()
            .unwrap();
        assert_eq!(record.borrow().name, "m");
        assert!(!registry.model_identity(999).is_valid());
    }

    #[test]
    fn removal_is_transitive_and_ids_are_not_reused() {
        let (mut registry, w, m, l) = populated();
        let c = registry.add_collision(sphere("c", l.id()));
        let held = registry.link_identity(l.id());

        assert_eq!(registry.remove_model(m.id()), Some(vec![c.id()]));
        assert!(registry.world(w.id()).unwrap().borrow().models.is_empty());
        assert!(registry.link(l.id()).is_none());
        assert!(registry.collision(c.id()).is_none());
        assert!(registry.remove_model(m.id()).is_none());

        // The held identity still owns the record's memory.
        assert!(held.reference_as::<RefCell<LinkInfo>>().is_some());

        let again = registry.add_model(model("m", w.id()));
        assert!(again.id() > c.id());
    }

    #[test]
    fn link_world_pose_composes_model_pose() {
        let (registry, _, m, l) = populated();
        registry.model(m.id()).unwrap().borrow_mut().pose = Pose3d::from_position(DVec3::Z);
        registry.link(l.id()).unwrap().borrow_mut().pose = Pose3d::from_position(DVec3::X);
        assert_eq!(
            registry.link_world_pose(l.id()).unwrap().position,
            DVec3::new(1.0, 0.0, 1.0)
        );
    }
}
