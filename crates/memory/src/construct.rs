use featherstone_common::{Identity, Policy3d, Pose3d};
use featherstone_describe::{
    ConstructWorldFromDescriptionInterface, Geometry, ModelDescription, WorldDescription,
};
use featherstone_physics::{
    AttachBoxShapeInterface, AttachSphereShapeInterface, ConstructEmptyLinkInterface,
    ConstructEmptyModelInterface, ConstructEmptyWorldInterface,
};
use glam::DVec3;
use tracing::{debug, warn};

use crate::MemoryPlugin;
use crate::registry::{CollisionInfo, JointInfo, LinkInfo, ModelInfo, WorldInfo};

const DEFAULT_GRAVITY: DVec3 = DVec3::new(0.0, 0.0, -9.8);
const DEFAULT_TIME_STEP: f64 = 0.001;
const DEFAULT_FRICTION: f64 = 1.0;

fn empty_link(name: &str, model: usize) -> LinkInfo {
    LinkInfo {
        name: name.to_string(),
        model,
        pose: Pose3d::identity(),
        mass: 1.0,
        inertia: DVec3::ONE,
        linear_velocity: DVec3::ZERO,
        shapes: Vec::new(),
    }
}

impl MemoryPlugin {
    fn attach_shape(
        &mut self,
        link: &Identity,
        name: &str,
        geometry: Geometry,
        pose: &Pose3d,
    ) -> Identity {
        let shape = self.registry.add_collision(CollisionInfo {
            name: name.to_string(),
            link: link.id(),
            pose: *pose,
            geometry,
            friction: DEFAULT_FRICTION,
            restitution: 0.0,
        });
        if !shape.is_valid() {
            warn!(link = %link, name, "cannot attach shape to unknown link");
        }
        shape
    }

    fn construct_described_model(&mut self, world: usize, description: &ModelDescription) {
        let model = self.registry.add_model(ModelInfo {
            name: description.name.clone(),
            world,
            fixed: description.fixed,
            pose: description.pose.to_pose(),
            links: Vec::new(),
            joints: Vec::new(),
        });

        let mut links = Vec::with_capacity(description.links.len());
        for link_description in &description.links {
            let link = self.registry.add_link(LinkInfo {
                pose: link_description.pose.to_pose(),
                mass: link_description.mass,
                inertia: link_description.inertia,
                ..empty_link(&link_description.name, model.id())
            });
            for collision in &link_description.collisions {
                self.registry.add_collision(CollisionInfo {
                    name: collision.name.clone(),
                    link: link.id(),
                    pose: collision.pose.to_pose(),
                    geometry: collision.geometry,
                    friction: collision.friction,
                    restitution: collision.restitution,
                });
            }
            links.push((link_description.name.as_str(), link.id()));
        }

        let link_id = |name: &str| {
            links
                .iter()
                .find(|(link_name, _)| *link_name == name)
                .map(|(_, id)| *id)
        };
        for joint in &description.joints {
            let Some(child_link) = link_id(&joint.child) else {
                warn!(
                    joint = %joint.name,
                    child = %joint.child,
                    "skipping joint with unknown child"
                );
                continue;
            };
            self.registry.add_joint(JointInfo {
                name: joint.name.clone(),
                model: model.id(),
                parent_link: joint.parent.as_deref().and_then(link_id),
                child_link,
                kind: joint.kind,
                axis: joint.axis,
            });
        }
    }
}

impl ConstructEmptyWorldInterface<Policy3d> for MemoryPlugin {
    fn construct_empty_world(&mut self, _engine: &Identity, name: &str) -> Identity {
        self.registry.add_world(WorldInfo {
            name: name.to_string(),
            gravity: DEFAULT_GRAVITY,
            time_step: DEFAULT_TIME_STEP,
            sim_time: 0.0,
            models: Vec::new(),
        })
    }
}

impl ConstructEmptyModelInterface<Policy3d> for MemoryPlugin {
    fn construct_empty_model(&mut self, world: &Identity, name: &str) -> Identity {
        let model = self.registry.add_model(ModelInfo {
            name: name.to_string(),
            world: world.id(),
            fixed: false,
            pose: Pose3d::identity(),
            links: Vec::new(),
            joints: Vec::new(),
        });
        if !model.is_valid() {
            warn!(world = %world, name, "cannot construct model in unknown world");
        }
        model
    }
}

impl ConstructEmptyLinkInterface<Policy3d> for MemoryPlugin {
    fn construct_empty_link(&mut self, model: &Identity, name: &str) -> Identity {
        let link = self.registry.add_link(empty_link(name, model.id()));
        if !link.is_valid() {
            warn!(model = %model, name, "cannot construct link in unknown model");
        }
        link
    }
}

impl AttachBoxShapeInterface<Policy3d> for MemoryPlugin {
    fn attach_box_shape(
        &mut self,
        link: &Identity,
        name: &str,
        size: DVec3,
        pose: &Pose3d,
    ) -> Identity {
        self.attach_shape(link, name, Geometry::Box { size }, pose)
    }
}

impl AttachSphereShapeInterface<Policy3d> for MemoryPlugin {
    fn attach_sphere_shape(
        &mut self,
        link: &Identity,
        name: &str,
        radius: f64,
        pose: &Pose3d,
    ) -> Identity {
        self.attach_shape(link, name, Geometry::Sphere { radius }, pose)
    }
}

impl ConstructWorldFromDescriptionInterface<Policy3d> for MemoryPlugin {
    fn construct_described_world(
        &mut self,
        _engine: &Identity,
        description: &WorldDescription,
    ) -> Identity {
        if let Err(err) = description.validate() {
            warn!(name = %description.name, %err, "rejecting world description");
            return Identity::invalid();
        }
        let world = self.registry.add_world(WorldInfo {
            name: description.name.clone(),
            gravity: description.gravity,
            time_step: description.time_step,
            sim_time: 0.0,
            models: Vec::new(),
        });
        for model in &description.models {
            self.construct_described_model(world.id(), model);
        }
        debug!(
            world = %world,
            name = %description.name,
            models = description.models.len(),
            links = description.link_count(),
            "constructed described world"
        );
        world
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use featherstone_physics::{GetLinkFromModelInterface, GetModelFromWorldInterface, Plugin};

    const TWO_LINKS: &str = r#"
name: w
gravity: [0.0, 0.0, -1.0]
models:
  - name: arm
    pose: { position: [0.0, 0.0, 1.0] }
    links:
      - name: upper
      - name: lower
        pose: { position: [0.0, 0.0, -0.5] }
        collisions:
          - name: tip
            geometry: { type: sphere, radius: 0.05 }
    joints:
      - { name: elbow, kind: revolute, parent: upper, child: lower }
      - { name: shoulder, child: upper }
"#;

    #[test]
    fn described_world_is_fully_registered() {
        let mut plugin = MemoryPlugin::new();
        let engine = plugin.initiate_engine(0);
        let description = WorldDescription::from_yaml_str(TWO_LINKS).unwrap();
        let world = plugin.construct_described_world(&engine, &description);

        let registry = plugin.registry();
        let gravity = registry.world(world.id()).unwrap().borrow().gravity;
        assert_eq!(gravity, DVec3::new(0.0, 0.0, -1.0));
        let arm = plugin.model_by_name(&world, "arm");
        assert_eq!(plugin.link_count(&arm), 2);

        let model = registry.model(arm.id()).unwrap().borrow();
        assert_eq!(model.joints.len(), 2);
        let shoulder = registry.joint(model.joints[1]).unwrap().borrow();
        assert_eq!(shoulder.parent_link, None);
        let elbow = registry.joint(model.joints[0]).unwrap().borrow();
        assert_eq!(elbow.parent_link, Some(model.links[0]));
        assert_eq!(elbow.child_link, model.links[1]);

        let lower = plugin.link_by_name(&arm, "lower");
        assert_eq!(
            registry.link_world_pose(lower.id()).unwrap().position,
            DVec3::new(0.0, 0.0, 0.5)
        );
    }

    #[test]
    fn attaching_to_unknown_link_misses() {
        let mut plugin = MemoryPlugin::new();
        plugin.initiate_engine(0);
        let shape = plugin.attach_sphere_shape(
            &Identity::generate(77, None),
            "ghost",
            1.0,
            &Pose3d::identity(),
        );
        assert!(!shape.is_valid());
    }
}
