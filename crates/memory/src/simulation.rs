//! Kinematic forward stepping.
//!
//! Each step advances every link of every non-fixed model in the world by
//! explicit Euler under the world's gravity, then reports the links whose
//! world pose is new or moved since the previous report. Shapes of
//! different models whose world boxes overlap after the step are reported
//! as contacts, at the center of the overlap.

use std::collections::BTreeMap;
use std::time::Duration;

use featherstone_common::{Identity, Policy3d};
use featherstone_physics::{
    ChangedWorldPoses, Contact, ForwardStepInterface, GetContactsFromLastStepInterface,
    POSE_CHANGE_TOLERANCE, StepInput, StepOutput, WorldPose,
};
use tracing::{debug, warn};

use crate::MemoryPlugin;

const TIME_STEP_TOLERANCE: f64 = 1e-6;

impl MemoryPlugin {
    fn integrate(&self, world: usize, dt: f64) {
        let Some(record) = self.registry.world(world) else {
            return;
        };
        let (gravity, models) = {
            let world = record.borrow();
            (world.gravity, world.models.clone())
        };
        for model in models {
            let Some(model) = self.registry.model(model) else {
                continue;
            };
            let model = model.borrow();
            if model.fixed {
                continue;
            }
            // World-frame displacement, expressed in the model frame.
            let to_model = model.pose.rotation.inverse();
            for link in &model.links {
                if let Some(link) = self.registry.link(*link) {
                    let mut link = link.borrow_mut();
                    link.linear_velocity += gravity * dt;
                    let displacement = to_model * (link.linear_velocity * dt);
                    link.pose.position += displacement;
                }
            }
        }
    }

    fn detect_contacts(&self, world: usize) -> Vec<Contact<Policy3d>> {
        let shapes: Vec<_> = self
            .registry
            .world_collisions(world)
            .into_iter()
            .filter_map(|(model, id)| Some((model, id, self.registry.collision_world_box(id)?)))
            .collect();

        let mut contacts = Vec::new();
        for (i, (model_a, a, box_a)) in shapes.iter().enumerate() {
            for (model_b, b, box_b) in &shapes[i + 1..] {
                if model_a == model_b {
                    continue;
                }
                let overlap = box_a.intersection(box_b);
                if overlap.is_empty() {
                    continue;
                }
                let (first, second) = if a < b { (*a, *b) } else { (*b, *a) };
                contacts.push(Contact {
                    collision1: self.registry.collision_identity(first),
                    collision2: self.registry.collision_identity(second),
                    point: (overlap.min + overlap.max) * 0.5,
                });
            }
        }
        contacts.sort_by_key(|c| (c.collision1.id(), c.collision2.id()));
        contacts
    }

    /// Links of `world` whose pose changed since the last report. Resets
    /// the cache to the current poses of the world's links.
    fn changed_poses(&mut self, world: usize) -> ChangedWorldPoses<Policy3d> {
        let links: Vec<usize> = self
            .registry
            .world(world)
            .map(|world| world.borrow().models.clone())
            .unwrap_or_default()
            .into_iter()
            .filter_map(|model| self.registry.model(model))
            .flat_map(|model| model.borrow().links.clone())
            .collect();

        let mut current = BTreeMap::new();
        let mut changed = ChangedWorldPoses::default();
        for id in links {
            let Some(pose) = self.registry.link_world_pose(id) else {
                continue;
            };
            let moved = self
                .previous_poses
                .get(&id)
                .is_none_or(|previous| !previous.is_close(&pose, POSE_CHANGE_TOLERANCE));
            if moved {
                changed.entries.push(WorldPose {
                    body: self.registry.link_identity(id),
                    pose,
                });
            }
            current.insert(id, pose);
        }
        changed.entries.sort_by_key(|entry| entry.body.id());

        // Keep the cache of other worlds, drop links that no longer exist.
        self.previous_poses
            .retain(|id, _| !current.contains_key(id) && self.registry.link(*id).is_some());
        self.previous_poses.extend(current);
        changed
    }
}

impl ForwardStepInterface<Policy3d> for MemoryPlugin {
    fn world_forward_step(&mut self, world: &Identity, input: &StepInput) -> StepOutput<Policy3d> {
        let Some(record) = self.registry.world(world.id()).cloned() else {
            warn!(world = %world, "cannot step unknown world");
            return StepOutput {
                changed_poses: ChangedWorldPoses::default(),
                sim_time: Duration::ZERO,
            };
        };

        if let Some(time_step) = input.time_step {
            let mut info = record.borrow_mut();
            let seconds = time_step.as_secs_f64();
            if (seconds - info.time_step).abs() > TIME_STEP_TOLERANCE {
                info.time_step = seconds;
                debug!(world = %world, time_step = seconds, "simulation time step set");
            }
        }

        let dt = record.borrow().time_step;
        self.integrate(world.id(), dt);
        let sim_time = {
            let mut info = record.borrow_mut();
            info.sim_time += dt;
            info.sim_time
        };

        let contacts = self.detect_contacts(world.id());
        if !contacts.is_empty() {
            debug!(world = %world, contacts = contacts.len(), "shapes in contact");
        }
        self.last_contacts.insert(world.id(), contacts);

        StepOutput {
            changed_poses: self.changed_poses(world.id()),
            sim_time: Duration::try_from_secs_f64(sim_time).unwrap_or(Duration::ZERO),
        }
    }
}

impl GetContactsFromLastStepInterface<Policy3d> for MemoryPlugin {
    fn contacts_from_last_step(&self, world: &Identity) -> Vec<Contact<Policy3d>> {
        self.last_contacts.get(&world.id()).cloned().unwrap_or_default()
    }
}
