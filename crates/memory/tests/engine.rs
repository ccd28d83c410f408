//! Composed engines driven through the client surface.

use std::time::Duration;

use featherstone_common::{AlignedBox3d, FrameId, Policy, Pose3d};
use featherstone_describe::{ConstructWorld, ConstructWorldFromDescription, WorldDescription};
use featherstone_memory::{MemoryFeatures, MemoryPlugin, loader};
use featherstone_physics::{
    AttachBoxShape, AttachSphereShape, CompositionError, ConstructEmptyLink, ConstructEmptyModel,
    ConstructEmptyWorld, Engine3d, Feature, FeatureList, ForwardStep, FrameSemantics,
    GetContactsFromLastStep, GetEngineInfo, GetJointFromModel, GetLinkBoundingBox,
    GetLinkFromModel, GetModelFromWorld, GetShapeBoundingBox, GetShapeCollisionProperties,
    GetShapeFromLink, GetWorldFromEngine, JointFrameSemantics, LinkFrameSemantics, PluginInstance,
    RemoveEntities, SetShapeCollisionProperties, ShapeFrameSemantics, StepInput, feature_list,
};
use glam::{DQuat, DVec3};

feature_list! {
    struct Navigation {
        GetEngineInfo,
        GetWorldFromEngine,
        GetModelFromWorld,
        GetLinkFromModel,
        GetShapeFromLink,
    }
}

feature_list! {
    struct Building {
        ConstructEmptyWorld,
        ConstructEmptyModel,
        ConstructEmptyLink,
        AttachBoxShape,
        AttachSphereShape,
        GetWorldFromEngine,
        GetModelFromWorld,
        GetLinkFromModel,
        GetShapeFromLink,
        RemoveEntities,
    }
}

feature_list! {
    struct Geometry {
        ShapeFrameSemantics,
        GetLinkBoundingBox,
        FrameSemantics,
        GetShapeBoundingBox,
        LinkFrameSemantics,
        GetShapeFromLink,
        GetLinkFromModel,
        GetModelFromWorld,
        GetWorldFromEngine,
    }
}

feature_list! {
    struct Contacts {
        GetShapeCollisionProperties,
        SetShapeCollisionProperties,
    }
}

feature_list! {
    struct Simulation {
        ConstructWorldFromDescription,
        ForwardStep,
        GetWorldFromEngine,
        GetModelFromWorld,
        GetLinkFromModel,
    }
}

feature_list! {
    struct Touching {
        GetContactsFromLastStep,
        ForwardStep,
        ConstructWorldFromDescription,
        GetModelFromWorld,
        GetLinkFromModel,
        GetShapeFromLink,
        RemoveEntities,
    }
}

feature_list! {
    struct Jointed {
        JointFrameSemantics,
        LinkFrameSemantics,
        FrameSemantics,
        GetJointFromModel,
        GetLinkFromModel,
        GetModelFromWorld,
        ConstructWorldFromDescription,
    }
}

/// A feature no backend implements.
pub struct Teleport;

pub trait TeleportInterface<P: Policy> {
    fn teleport(&mut self);
}

impl Feature for Teleport {
    const NAME: &'static str = "Teleport";
    type Requires = ();
    type Interface<P: Policy> = dyn TeleportInterface<P>;
}

feature_list! {
    struct Teleporting { Teleport, GetEngineInfo }
}

fn engine<FL: FeatureList>() -> Engine3d<FL> {
    PluginInstance::new(MemoryPlugin::new())
        .unwrap()
        .request_engine::<FL>()
        .unwrap()
}

#[test]
fn scenario_world_model_link() {
    let instance = PluginInstance::new(MemoryPlugin::new()).unwrap();
    let builder = instance.request_engine::<Building>().unwrap();
    let world = builder.construct_empty_world("w").unwrap();
    let model = world.construct_empty_model("m").unwrap();
    let link = model.construct_empty_link("l").unwrap();

    assert_eq!(builder.entity_id(), 0);
    assert_ne!(world.entity_id(), builder.entity_id());
    assert_eq!(model.world().unwrap(), world);
    assert_eq!(model.link_count(), 1);
    assert_eq!(model.link(0).unwrap(), link);
    assert_eq!(link.model().unwrap(), model);

    // A second view over the same backend sees the same tree.
    let viewer = instance.request_engine::<Navigation>().unwrap();
    assert_eq!(viewer.name(), "memory");
    assert_eq!(viewer.index(), 0);
    let seen = viewer.world_by_name("w").unwrap();
    assert_eq!(seen.entity_id(), world.entity_id());
    assert_eq!(seen.model_by_name("m").unwrap().link_by_name("l").unwrap().index(), 0);
    assert!(seen.model_by_name("nope").is_none());
    assert!(seen.model(1).is_none());
}

#[test]
fn removal_is_eager_and_ids_are_not_reused() {
    let engine = engine::<Building>();
    let world = engine.construct_empty_world("w").unwrap();
    let doomed = world.construct_empty_model("doomed").unwrap();
    let link = doomed.construct_empty_link("l").unwrap();
    let shape = link
        .attach_sphere_shape("s", 0.5, &Pose3d::identity())
        .unwrap();
    let keeper = world.construct_empty_model("keeper").unwrap();

    assert!(!doomed.removed());
    assert!(world.remove_model_by_name("doomed"));
    assert!(doomed.removed());
    assert!(!doomed.remove());

    assert_eq!(world.model_count(), 1);
    assert_eq!(world.model(0).unwrap(), keeper);
    assert_eq!(keeper.index(), 0);
    assert!(doomed.world().is_none());
    assert!(link.model().is_none());
    assert!(shape.link().is_none());
    assert_eq!(link.shape_count(), 0);

    let fresh = world.construct_empty_model("fresh").unwrap();
    assert!(fresh.entity_id() > shape.entity_id());

    assert!(world.remove_model(0));
    assert!(keeper.removed());
    assert!(!world.remove_model(5));
}

#[test]
fn link_bounding_box_merges_shapes() {
    let instance = PluginInstance::new(MemoryPlugin::new()).unwrap();
    let builder = instance.request_engine::<Building>().unwrap();
    let world = builder.construct_empty_world("w").unwrap();
    let link = world
        .construct_empty_model("m")
        .unwrap()
        .construct_empty_link("l")
        .unwrap();
    link.attach_box_shape("unit", DVec3::ONE, &Pose3d::identity())
        .unwrap();
    link.attach_sphere_shape("ball", 0.5, &Pose3d::from_position(DVec3::new(2.0, 0.0, 0.0)))
        .unwrap();

    let geometry = instance.request_engine::<Geometry>().unwrap();
    let link = geometry
        .world(0)
        .unwrap()
        .model(0)
        .unwrap()
        .link(0)
        .unwrap();
    let aabb = link.axis_aligned_bounding_box(&FrameId::world());
    assert_eq!(
        aabb,
        AlignedBox3d::new(DVec3::new(-0.5, -0.5, -0.5), DVec3::new(2.5, 0.5, 0.5))
    );

    // In the frame of the ball, everything shifts by -2 along x.
    let ball = link.shape_by_name("ball").unwrap();
    let local = link.axis_aligned_bounding_box(&ball.frame_id());
    assert!(local.min.abs_diff_eq(DVec3::new(-2.5, -0.5, -0.5), 1e-12));
    assert_eq!(link.world_pose(), Pose3d::identity());
}

#[test]
fn empty_link_has_empty_box() {
    let builder = engine::<Building>();
    let link = builder
        .construct_empty_world("w")
        .unwrap()
        .construct_empty_model("m")
        .unwrap()
        .construct_empty_link("l")
        .unwrap();
    let link = link.request_features::<Geometry>().unwrap();
    assert!(link.axis_aligned_bounding_box(&FrameId::world()).is_empty());
}

#[test]
fn rotated_shape_box_grows() {
    let instance = PluginInstance::new(MemoryPlugin::new()).unwrap();
    let builder = instance.request_engine::<Building>().unwrap();
    let link = builder
        .construct_empty_world("w")
        .unwrap()
        .construct_empty_model("m")
        .unwrap()
        .construct_empty_link("l")
        .unwrap();
    let turned = Pose3d::new(DVec3::ZERO, DQuat::from_rotation_z(std::f64::consts::FRAC_PI_4));
    let shape = link
        .attach_box_shape("b", DVec3::new(2.0, 2.0, 2.0), &turned)
        .unwrap();

    let shape = shape.request_features::<Geometry>().unwrap();
    let aabb = shape.axis_aligned_bounding_box(&FrameId::world());
    assert!((aabb.max.x - 2.0_f64.sqrt()).abs() < 1e-9);
    assert!((aabb.max.z - 1.0).abs() < 1e-9);
}

#[test]
fn contact_coefficients() {
    let instance = PluginInstance::new(MemoryPlugin::new()).unwrap();
    let builder = instance.request_engine::<Building>().unwrap();
    let link = builder
        .construct_empty_world("w")
        .unwrap()
        .construct_empty_model("m")
        .unwrap()
        .construct_empty_link("l")
        .unwrap();
    let a = link.attach_sphere_shape("a", 1.0, &Pose3d::identity()).unwrap();
    let b = link.attach_sphere_shape("b", 1.0, &Pose3d::identity()).unwrap();

    let a = a.request_features::<Contacts>().unwrap();
    assert_eq!(a.friction_coefficient(&b), 1.0);
    assert_eq!(a.restitution_coefficient(&b), 0.0);

    a.set_friction_coefficient(&b, 0.4);
    let b = b.request_features::<Contacts>().unwrap();
    assert_eq!(b.friction_coefficient(&a), 0.4);
}

#[test]
fn described_world_falls() {
    let description = WorldDescription::from_yaml_str(
        r#"
name: drop
gravity: [0.0, 0.0, -10.0]
time_step: 0.01
models:
  - name: floor
    fixed: true
    links:
      - name: slab
        collisions: [{ name: top, geometry: { type: box, size: [4.0, 4.0, 0.2] } }]
  - name: crate
    pose: { position: [0.0, 0.0, 3.0] }
    links:
      - name: body
        collisions: [{ name: hull, geometry: { type: box, size: [1.0, 1.0, 1.0] } }]
"#,
    )
    .unwrap();

    let engine = engine::<Simulation>();
    let world = engine.construct_world(&description).unwrap();
    assert_eq!(world.model_count(), 2);

    let body = world.model_by_name("crate").unwrap().link(0).unwrap();
    let slab = world.model_by_name("floor").unwrap().link(0).unwrap();

    let first = world.step(&StepInput::default());
    assert_eq!(first.changed_poses.len(), 2);

    let second = world.step(&StepInput::default());
    assert_eq!(second.changed_poses.len(), 1);
    assert!(second.changed_poses.get(slab.identity()).is_none());
    let z = second.changed_poses.get(body.identity()).unwrap().position.z;
    // Two explicit Euler steps: 3 - 0.001 - 0.002.
    assert!((z - 2.997).abs() < 1e-9);

    let faster = world.step(&StepInput::with_time_step(Duration::from_millis(20)));
    assert!((faster.sim_time.as_secs_f64() - 0.04).abs() < 1e-9);
}

#[test]
fn unsupported_lists_fail_at_request_time() {
    let err = PluginInstance::new(MemoryPlugin::new())
        .unwrap()
        .request_engine::<Teleporting>()
        .unwrap_err();
    assert_eq!(
        err,
        CompositionError::Unimplemented {
            plugin: "memory".into(),
            feature: "Teleport",
        }
    );
}

#[test]
fn loader_finds_the_memory_plugin() {
    let loader = loader();
    assert_eq!(loader.plugin_names().collect::<Vec<_>>(), vec!["memory"]);
    assert!(loader.find_features::<MemoryFeatures>().contains("memory"));
    assert!(loader.find_features::<Teleporting>().is_empty());

    let engine = loader.request_engine::<MemoryFeatures>("memory").unwrap();
    assert_eq!(engine.world_count(), 0);
    assert!(matches!(
        loader.request_engine::<MemoryFeatures>("bullet"),
        Err(CompositionError::UnknownPlugin { .. })
    ));
}

#[test]
fn proxies_from_one_engine_share_state() {
    let engine = engine::<Building>();
    let other = engine.clone();
    engine.construct_empty_world("a").unwrap();
    other.construct_empty_world("b").unwrap();
    assert_eq!(engine.world_count(), 2);
    assert_eq!(format!("{engine:?}"), "Engine(#0)@memory");
}

#[test]
fn invalid_description_constructs_nothing() {
    let mut description = WorldDescription::from_yaml_str("name: bad\n").unwrap();
    description.time_step = -0.01;

    let engine = engine::<Simulation>();
    assert!(engine.construct_world(&description).is_none());
    assert_eq!(engine.world_count(), 0);

    description.time_step = 0.01;
    let world = engine.construct_world(&description).unwrap();
    let output = world.step(&StepInput::default());
    assert!((output.sim_time.as_secs_f64() - 0.01).abs() < 1e-9);
}

#[test]
fn resting_crate_touches_the_floor() {
    let description = WorldDescription::from_yaml_str(
        r#"
name: rest
gravity: [0.0, 0.0, -10.0]
time_step: 0.01
models:
  - name: floor
    fixed: true
    links:
      - name: slab
        collisions: [{ name: top, geometry: { type: box, size: [4.0, 4.0, 0.2] } }]
  - name: crate
    pose: { position: [0.0, 0.0, 0.5] }
    links:
      - name: body
        collisions: [{ name: hull, geometry: { type: box, size: [1.0, 1.0, 1.0] } }]
  - name: cloud
    fixed: true
    pose: { position: [0.0, 0.0, 10.0] }
    links:
      - name: puff
        collisions: [{ name: mist, geometry: { type: sphere, radius: 1.0 } }]
"#,
    )
    .unwrap();

    let engine = engine::<Touching>();
    let world = engine.construct_world(&description).unwrap();
    assert!(world.contacts_from_last_step().is_empty());

    let first_shape = |model: &str| {
        let link = world.model_by_name(model).unwrap().link(0).unwrap();
        link.shape(0).unwrap()
    };
    let top = first_shape("floor");
    let hull = first_shape("crate");

    world.step(&StepInput::default());
    let contacts = world.contacts_from_last_step();
    assert_eq!(contacts.len(), 1);
    let contact = &contacts[0];
    let pair = [contact.collision1.clone(), contact.collision2.clone()];
    assert!(pair.contains(&top));
    assert!(pair.contains(&hull));
    assert!(contact.point.z > -0.1 && contact.point.z < 0.1);

    assert!(world.model_by_name("crate").unwrap().remove());
    world.step(&StepInput::default());
    assert!(world.contacts_from_last_step().is_empty());
}

#[test]
fn joint_frame_follows_its_child_link() {
    let description = WorldDescription::from_yaml_str(
        r#"
name: swing
models:
  - name: pendulum
    pose: { position: [2.0, 0.0, 1.5] }
    links:
      - name: pivot
      - name: bob
        pose: { position: [0.0, 0.0, -1.0] }
    joints:
      - name: swing
        kind: revolute
        parent: pivot
        child: bob
        axis: [1.0, 0.0, 0.0]
"#,
    )
    .unwrap();

    let engine = engine::<Jointed>();
    let world = engine.construct_world(&description).unwrap();
    let pendulum = world.model_by_name("pendulum").unwrap();
    let joint = pendulum.joint_by_name("swing").unwrap();
    let bob = pendulum.link_by_name("bob").unwrap();

    assert_eq!(joint.world_pose(), bob.world_pose());
    assert!(joint.world_pose().position.abs_diff_eq(DVec3::new(2.0, 0.0, 0.5), 1e-12));
    let seen_from_bob = joint.frame_data_relative_to(&bob.frame_id());
    assert!(seen_from_bob.pose.position.abs_diff_eq(DVec3::ZERO, 1e-12));
}
