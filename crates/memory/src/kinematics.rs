//! Frames, shape placement, contact coefficients and bounding boxes.

use featherstone_common::{AlignedBox3d, FrameData3d, FrameId, Identity, Policy3d, Pose3d};
use featherstone_physics::{
    FrameSemanticsInterface, GetShapeBoundingBoxInterface, GetShapeCollisionPropertiesInterface,
    GetShapeKinematicPropertiesInterface, SetShapeCollisionPropertiesInterface,
    SetShapeKinematicPropertiesInterface,
};
use glam::DVec3;
use tracing::warn;

use crate::MemoryPlugin;
use crate::plugin::shape_pair;
use crate::registry::CollisionInfo;

impl MemoryPlugin {
    fn link_frame_data(&self, id: usize) -> Option<FrameData3d> {
        let pose = self.registry.link_world_pose(id)?;
        let linear_velocity = self.registry.link(id)?.borrow().linear_velocity;
        Some(FrameData3d {
            pose,
            linear_velocity,
        })
    }

    fn collision_frame_data(&self, id: usize) -> Option<FrameData3d> {
        let link = self.registry.collision(id)?.borrow().link;
        let link = self.link_frame_data(link)?;
        Some(FrameData3d {
            pose: self.registry.collision_world_pose(id)?,
            linear_velocity: link.linear_velocity,
        })
    }

    fn joint_frame_data(&self, id: usize) -> Option<FrameData3d> {
        let child = self.registry.joint(id)?.borrow().child_link;
        self.link_frame_data(child)
    }

    fn model_frame_data(&self, id: usize) -> Option<FrameData3d> {
        Some(FrameData3d {
            pose: self.registry.model(id)?.borrow().pose,
            linear_velocity: DVec3::ZERO,
        })
    }

    /// Pair coefficient: the override if one was set, otherwise `combine`
    /// of the two shapes' own values.
    fn pair_coefficient(
        &self,
        shape: &Identity,
        other: &Identity,
        overridden: Option<f64>,
        own: impl Fn(&CollisionInfo) -> f64,
        combine: impl Fn(f64, f64) -> f64,
    ) -> f64 {
        if let Some(value) = overridden {
            return value;
        }
        let (Some(a), Some(b)) = (
            self.registry.collision(shape.id()),
            self.registry.collision(other.id()),
        ) else {
            warn!(shape = %shape, other = %other, "coefficient requested for unknown shape");
            return 0.0;
        };
        combine(own(&*a.borrow()), own(&*b.borrow()))
    }
}

impl FrameSemanticsInterface<Policy3d> for MemoryPlugin {
    fn frame_data_relative_to_world(&self, frame: &FrameId) -> FrameData3d {
        if frame.is_world() {
            return FrameData3d::default();
        }
        let id = frame.identity().id();
        let data = self
            .link_frame_data(id)
            .or_else(|| self.collision_frame_data(id))
            .or_else(|| self.joint_frame_data(id))
            .or_else(|| self.model_frame_data(id))
            .or_else(|| self.registry.world(id).map(|_| FrameData3d::default()));
        data.unwrap_or_else(|| {
            warn!(frame = %frame.identity(), "frame data requested for unknown entity");
            FrameData3d::default()
        })
    }
}

impl GetShapeKinematicPropertiesInterface<Policy3d> for MemoryPlugin {
    fn shape_relative_transform(&self, shape: &Identity) -> Pose3d {
        self.registry
            .collision(shape.id())
            .map(|shape| shape.borrow().pose)
            .unwrap_or_default()
    }
}

impl SetShapeKinematicPropertiesInterface<Policy3d> for MemoryPlugin {
    fn set_shape_relative_transform(&mut self, shape: &Identity, pose: &Pose3d) {
        match self.registry.collision(shape.id()) {
            Some(record) => record.borrow_mut().pose = *pose,
            None => warn!(shape = %shape, "cannot move unknown shape"),
        }
    }
}

impl GetShapeCollisionPropertiesInterface<Policy3d> for MemoryPlugin {
    fn shape_friction_coefficient(&self, shape: &Identity, other: &Identity) -> f64 {
        let overridden = self
            .pair_friction
            .get(&shape_pair(shape.id(), other.id()))
            .copied();
        self.pair_coefficient(shape, other, overridden, |c| c.friction, |a, b| (a * b).sqrt())
    }

    fn shape_restitution_coefficient(&self, shape: &Identity, other: &Identity) -> f64 {
        let overridden = self
            .pair_restitution
            .get(&shape_pair(shape.id(), other.id()))
            .copied();
        self.pair_coefficient(shape, other, overridden, |c| c.restitution, f64::max)
    }
}

impl SetShapeCollisionPropertiesInterface<Policy3d> for MemoryPlugin {
    fn set_shape_friction_coefficient(&mut self, shape: &Identity, other: &Identity, value: f64) {
        self.pair_friction
            .insert(shape_pair(shape.id(), other.id()), value);
    }

    fn set_shape_restitution_coefficient(
        &mut self,
        shape: &Identity,
        other: &Identity,
        value: f64,
    ) {
        self.pair_restitution
            .insert(shape_pair(shape.id(), other.id()), value);
    }
}

impl GetShapeBoundingBoxInterface<Policy3d> for MemoryPlugin {
    fn shape_axis_aligned_bounding_box(&self, shape: &Identity) -> AlignedBox3d {
        match self.registry.collision(shape.id()) {
            Some(record) => {
                let half = record.borrow().geometry.half_extents();
                AlignedBox3d::new(-half, half)
            }
            None => AlignedBox3d::empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use featherstone_physics::{
        AttachBoxShapeInterface, AttachSphereShapeInterface, ConstructEmptyLinkInterface,
        ConstructEmptyModelInterface, ConstructEmptyWorldInterface, Plugin,
    };
    use crate::registry::JointInfo;
    use featherstone_describe::JointKind;

    struct Scene {
        plugin: MemoryPlugin,
        model: Identity,
        link: Identity,
        ball: Identity,
        cube: Identity,
    }

    fn scene() -> Scene {
        let mut plugin = MemoryPlugin::new();
        let engine = plugin.initiate_engine(0);
        let world = plugin.construct_empty_world(&engine, "w");
        let model = plugin.construct_empty_model(&world, "m");
        let link = plugin.construct_empty_link(&model, "l");
        let ball = plugin.attach_sphere_shape(&link, "ball", 0.5, &Pose3d::identity());
        let cube = plugin.attach_box_shape(
            &link,
            "cube",
            DVec3::new(2.0, 2.0, 2.0),
            &Pose3d::from_position(DVec3::X),
        );
        Scene {
            plugin,
            model,
            link,
            ball,
            cube,
        }
    }

    #[test]
    fn friction_defaults_to_geometric_mean() {
        let s = scene();
        s.plugin.registry().collision(s.ball.id()).unwrap().borrow_mut().friction = 0.25;
        let mu = s.plugin.shape_friction_coefficient(&s.ball, &s.cube);
        assert!((mu - 0.5).abs() < 1e-12);
        assert_eq!(mu, s.plugin.shape_friction_coefficient(&s.cube, &s.ball));
    }

    #[test]
    fn restitution_defaults_to_max_and_overrides_are_symmetric() {
        let mut s = scene();
        s.plugin.registry().collision(s.cube.id()).unwrap().borrow_mut().restitution = 0.3;
        assert_eq!(s.plugin.shape_restitution_coefficient(&s.ball, &s.cube), 0.3);

        s.plugin.set_shape_restitution_coefficient(&s.cube, &s.ball, 0.9);
        assert_eq!(s.plugin.shape_restitution_coefficient(&s.ball, &s.cube), 0.9);
    }

    #[test]
    fn shape_frame_follows_link() {
        let s = scene();
        s.plugin.registry().model(s.model.id()).unwrap().borrow_mut().pose =
            Pose3d::from_position(DVec3::Z);
        let data = s
            .plugin
            .frame_data_relative_to_world(&FrameId::of(s.cube.clone()));
        assert_eq!(data.pose.position, DVec3::new(1.0, 0.0, 1.0));
        let link = s
            .plugin
            .frame_data_relative_to_world(&FrameId::of(s.link.clone()));
        assert_eq!(link.pose.position, DVec3::Z);
    }

    #[test]
    fn joint_frame_is_its_child_link_frame() {
        let mut s = scene();
        s.plugin.registry().link(s.link.id()).unwrap().borrow_mut().pose =
            Pose3d::from_position(DVec3::new(0.0, 2.0, 0.0));
        let hinge = s.plugin.registry.add_joint(JointInfo {
            name: "hinge".into(),
            model: s.model.id(),
            parent_link: None,
            child_link: s.link.id(),
            kind: JointKind::Revolute,
            axis: DVec3::X,
        });
        let data = s.plugin.frame_data_relative_to_world(&FrameId::of(hinge));
        assert_eq!(data.pose.position, DVec3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn local_boxes_come_from_geometry() {
        let s = scene();
        let cube = s.plugin.shape_axis_aligned_bounding_box(&s.cube);
        assert_eq!(cube, AlignedBox3d::new(DVec3::splat(-1.0), DVec3::splat(1.0)));
        assert!(s.plugin.shape_axis_aligned_bounding_box(&s.link).is_empty());
    }
}
