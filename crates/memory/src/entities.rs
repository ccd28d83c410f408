//! Entity navigation and removal over the registry.

use featherstone_common::{Identity, Policy3d};
use featherstone_physics::{
    GetEngineInfoInterface, GetJointFromModelInterface, GetLinkFromModelInterface,
    GetModelFromWorldInterface, GetShapeFromLinkInterface, GetWorldFromEngineInterface,
    RemoveEntitiesInterface,
};
use tracing::warn;

use crate::MemoryPlugin;
use crate::registry::position_of;

fn child_at(
    kind: &str,
    children: Option<Vec<usize>>,
    index: usize,
    identity: impl Fn(usize) -> Identity,
) -> Identity {
    match children.and_then(|children| children.get(index).copied()) {
        Some(id) => identity(id),
        None => {
            warn!(kind, index, "no entity at index");
            Identity::invalid()
        }
    }
}

fn named(kind: &str, name: &str, found: Option<Identity>) -> Identity {
    found.unwrap_or_else(|| {
        warn!(kind, name, "no entity with that name");
        Identity::invalid()
    })
}

fn parent_of(kind: &str, child: &Identity, found: Option<Identity>) -> Identity {
    found.unwrap_or_else(|| {
        warn!(kind, child = %child, "unknown entity has no parent");
        Identity::invalid()
    })
}

impl MemoryPlugin {
    fn model_children(&self, model: &Identity) -> Option<(Vec<usize>, Vec<usize>)> {
        let model = self.registry.model(model.id())?.borrow();
        Some((model.links.clone(), model.joints.clone()))
    }

    fn model_id_by_name(&self, world: &Identity, name: &str) -> Option<usize> {
        let world = self.registry.world(world.id())?.borrow();
        world.models.iter().copied().find(|id| {
            self.registry
                .model(*id)
                .is_some_and(|model| model.borrow().name == name)
        })
    }
}

impl GetEngineInfoInterface<Policy3d> for MemoryPlugin {
    fn engine_name(&self, _engine: &Identity) -> String {
        "memory".to_string()
    }

    fn engine_index(&self, _engine: &Identity) -> usize {
        self.engine_index
    }
}

impl GetWorldFromEngineInterface<Policy3d> for MemoryPlugin {
    fn world_count(&self, _engine: &Identity) -> usize {
        self.registry.world_ids().count()
    }

    fn world_by_index(&self, _engine: &Identity, index: usize) -> Identity {
        let worlds = Some(self.registry.world_ids().collect());
        child_at("world", worlds, index, |id| self.registry.world_identity(id))
    }

    fn world_by_name(&self, _engine: &Identity, name: &str) -> Identity {
        let found = self
            .registry
            .world_ids()
            .find(|id| {
                self.registry
                    .world(*id)
                    .is_some_and(|world| world.borrow().name == name)
            })
            .map(|id| self.registry.world_identity(id));
        named("world", name, found)
    }

    fn world_name(&self, world: &Identity) -> String {
        self.registry
            .world(world.id())
            .map(|world| world.borrow().name.clone())
            .unwrap_or_default()
    }

    fn world_index(&self, world: &Identity) -> usize {
        let ids: Vec<usize> = self.registry.world_ids().collect();
        position_of(&ids, world.id())
    }

    fn engine_of_world(&self, world: &Identity) -> Identity {
        let found = self.registry.world(world.id()).map(|_| self.engine.clone());
        parent_of("world", world, found)
    }
}

impl GetModelFromWorldInterface<Policy3d> for MemoryPlugin {
    fn model_count(&self, world: &Identity) -> usize {
        self.registry
            .world(world.id())
            .map_or(0, |world| world.borrow().models.len())
    }

    fn model_by_index(&self, world: &Identity, index: usize) -> Identity {
        let models = self
            .registry
            .world(world.id())
            .map(|world| world.borrow().models.clone());
        child_at("model", models, index, |id| self.registry.model_identity(id))
    }

    fn model_by_name(&self, world: &Identity, name: &str) -> Identity {
        let found = self
            .model_id_by_name(world, name)
            .map(|id| self.registry.model_identity(id));
        named("model", name, found)
    }

    fn model_name(&self, model: &Identity) -> String {
        self.registry
            .model(model.id())
            .map(|model| model.borrow().name.clone())
            .unwrap_or_default()
    }

    fn model_index(&self, model: &Identity) -> usize {
        let Some(record) = self.registry.model(model.id()) else {
            return usize::MAX;
        };
        let world = record.borrow().world;
        self.registry
            .world(world)
            .map_or(usize::MAX, |world| position_of(&world.borrow().models, model.id()))
    }

    fn world_of_model(&self, model: &Identity) -> Identity {
        let found = self
            .registry
            .model(model.id())
            .map(|model| self.registry.world_identity(model.borrow().world));
        parent_of("model", model, found)
    }
}

impl GetLinkFromModelInterface<Policy3d> for MemoryPlugin {
    fn link_count(&self, model: &Identity) -> usize {
        self.model_children(model).map_or(0, |(links, _)| links.len())
    }

    fn link_by_index(&self, model: &Identity, index: usize) -> Identity {
        let links = self.model_children(model).map(|(links, _)| links);
        child_at("link", links, index, |id| self.registry.link_identity(id))
    }

    fn link_by_name(&self, model: &Identity, name: &str) -> Identity {
        let links = self
            .model_children(model)
            .map(|(links, _)| links)
            .unwrap_or_default();
        let found = links
            .into_iter()
            .find(|id| {
                self.registry
                    .link(*id)
                    .is_some_and(|link| link.borrow().name == name)
            })
            .map(|id| self.registry.link_identity(id));
        named("link", name, found)
    }

    fn link_name(&self, link: &Identity) -> String {
        self.registry
            .link(link.id())
            .map(|link| link.borrow().name.clone())
            .unwrap_or_default()
    }

    fn link_index(&self, link: &Identity) -> usize {
        let Some(record) = self.registry.link(link.id()) else {
            return usize::MAX;
        };
        let model = record.borrow().model;
        self.registry
            .model(model)
            .map_or(usize::MAX, |model| position_of(&model.borrow().links, link.id()))
    }

    fn model_of_link(&self, link: &Identity) -> Identity {
        let found = self
            .registry
            .link(link.id())
            .map(|link| self.registry.model_identity(link.borrow().model));
        parent_of("link", link, found)
    }
}

impl GetJointFromModelInterface<Policy3d> for MemoryPlugin {
    fn joint_count(&self, model: &Identity) -> usize {
        self.model_children(model).map_or(0, |(_, joints)| joints.len())
    }

    fn joint_by_index(&self, model: &Identity, index: usize) -> Identity {
        let joints = self.model_children(model).map(|(_, joints)| joints);
        child_at("joint", joints, index, |id| self.registry.joint_identity(id))
    }

    fn joint_by_name(&self, model: &Identity, name: &str) -> Identity {
        let joints = self
            .model_children(model)
            .map(|(_, joints)| joints)
            .unwrap_or_default();
        let found = joints
            .into_iter()
            .find(|id| {
                self.registry
                    .joint(*id)
                    .is_some_and(|joint| joint.borrow().name == name)
            })
            .map(|id| self.registry.joint_identity(id));
        named("joint", name, found)
    }

    fn joint_name(&self, joint: &Identity) -> String {
        self.registry
            .joint(joint.id())
            .map(|joint| joint.borrow().name.clone())
            .unwrap_or_default()
    }

    fn joint_index(&self, joint: &Identity) -> usize {
        let Some(record) = self.registry.joint(joint.id()) else {
            return usize::MAX;
        };
        let model = record.borrow().model;
        self.registry
            .model(model)
            .map_or(usize::MAX, |model| position_of(&model.borrow().joints, joint.id()))
    }

    fn model_of_joint(&self, joint: &Identity) -> Identity {
        let found = self
            .registry
            .joint(joint.id())
            .map(|joint| self.registry.model_identity(joint.borrow().model));
        parent_of("joint", joint, found)
    }
}

impl GetShapeFromLinkInterface<Policy3d> for MemoryPlugin {
    fn shape_count(&self, link: &Identity) -> usize {
        self.registry
            .link(link.id())
            .map_or(0, |link| link.borrow().shapes.len())
    }

    fn shape_by_index(&self, link: &Identity, index: usize) -> Identity {
        let shapes = self
            .registry
            .link(link.id())
            .map(|link| link.borrow().shapes.clone());
        child_at("shape", shapes, index, |id| self.registry.collision_identity(id))
    }

    fn shape_by_name(&self, link: &Identity, name: &str) -> Identity {
        let shapes = self
            .registry
            .link(link.id())
            .map(|link| link.borrow().shapes.clone())
            .unwrap_or_default();
        let found = shapes
            .into_iter()
            .find(|id| {
                self.registry
                    .collision(*id)
                    .is_some_and(|shape| shape.borrow().name == name)
            })
            .map(|id| self.registry.collision_identity(id));
        named("shape", name, found)
    }

    fn shape_name(&self, shape: &Identity) -> String {
        self.registry
            .collision(shape.id())
            .map(|shape| shape.borrow().name.clone())
            .unwrap_or_default()
    }

    fn shape_index(&self, shape: &Identity) -> usize {
        let Some(record) = self.registry.collision(shape.id()) else {
            return usize::MAX;
        };
        let link = record.borrow().link;
        self.registry
            .link(link)
            .map_or(usize::MAX, |link| position_of(&link.borrow().shapes, shape.id()))
    }

    fn link_of_shape(&self, shape: &Identity) -> Identity {
        let found = self
            .registry
            .collision(shape.id())
            .map(|shape| self.registry.link_identity(shape.borrow().link));
        parent_of("shape", shape, found)
    }
}

impl RemoveEntitiesInterface<Policy3d> for MemoryPlugin {
    fn remove_model_by_index(&mut self, world: &Identity, index: usize) -> bool {
        let id = self.model_by_index(world, index);
        id.is_valid() && self.remove_model(&id)
    }

    fn remove_model_by_name(&mut self, world: &Identity, name: &str) -> bool {
        match self.model_id_by_name(world, name) {
            Some(id) => self.remove_model(&Identity::generate(id, None)),
            None => {
                warn!(world = %world, name, "no model to remove with that name");
                false
            }
        }
    }

    fn remove_model(&mut self, model: &Identity) -> bool {
        match self.registry.remove_model(model.id()) {
            Some(shapes) => {
                self.forget_shapes(&shapes);
                true
            }
            None => false,
        }
    }

    fn model_removed(&self, model: &Identity) -> bool {
        self.registry.model(model.id()).is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use featherstone_physics::{ConstructEmptyModelInterface, ConstructEmptyWorldInterface, Plugin};

    fn plugin() -> (MemoryPlugin, Identity) {
        let mut plugin = MemoryPlugin::new();
        let engine = plugin.initiate_engine(0);
        let world = plugin.construct_empty_world(&engine, "w");
        (plugin, world)
    }

    #[test]
    fn lookups_miss_with_invalid_identity() {
        let (plugin, world) = plugin();
        assert!(!plugin.model_by_index(&world, 0).is_valid());
        assert!(!plugin.model_by_name(&world, "nope").is_valid());
        assert!(!plugin.world_by_index(&plugin.engine, 3).is_valid());
        assert_eq!(plugin.model_index(&Identity::invalid()), usize::MAX);
        assert_eq!(plugin.model_name(&Identity::invalid()), "");
    }

    #[test]
    fn unknown_children_have_no_parent() {
        let (plugin, world) = plugin();
        let stray = Identity::generate(99, None);
        assert!(!plugin.world_of_model(&stray).is_valid());
        assert!(!plugin.model_of_link(&stray).is_valid());
        assert!(!plugin.model_of_joint(&stray).is_valid());
        assert!(!plugin.link_of_shape(&stray).is_valid());
        assert!(!plugin.engine_of_world(&stray).is_valid());
        assert!(!plugin.world_by_name(&plugin.engine, "elsewhere").is_valid());
        assert_eq!(plugin.engine_of_world(&world), plugin.engine);
    }

    #[test]
    fn indices_track_removal() {
        let (mut plugin, world) = plugin();
        let a = plugin.construct_empty_model(&world, "a");
        let b = plugin.construct_empty_model(&world, "b");
        assert_eq!(plugin.model_index(&b), 1);

        assert!(plugin.remove_model_by_name(&world, "a"));
        assert!(plugin.model_removed(&a));
        assert_eq!(plugin.model_index(&b), 0);
        assert_eq!(plugin.model_count(&world), 1);
        assert!(!plugin.remove_model(&a));
        assert!(!plugin.remove_model_by_index(&world, 5));
    }
}
