//! Advancing a world in time.

use std::time::Duration;

use featherstone_common::{Identity, Policy, Pose};

use crate::{Feature, FeatureList, Has, Shape, World};

/// Tolerance under which a link is considered not to have moved.
pub const POSE_CHANGE_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepInput {
    /// Overrides the world's time step for this and later steps.
    pub time_step: Option<Duration>,
}

impl StepInput {
    pub fn with_time_step(time_step: Duration) -> Self {
        Self {
            time_step: Some(time_step),
        }
    }
}

/// World pose of one body after a step.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldPose<P: Policy> {
    pub body: Identity,
    pub pose: Pose<P>,
}

/// Bodies whose world pose is new or moved during the step, in id order.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangedWorldPoses<P: Policy> {
    pub entries: Vec<WorldPose<P>>,
}

impl<P: Policy> Default for ChangedWorldPoses<P> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<P: Policy> ChangedWorldPoses<P> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, body: &Identity) -> Option<&Pose<P>> {
        self.entries
            .iter()
            .find(|entry| &entry.body == body)
            .map(|entry| &entry.pose)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepOutput<P: Policy> {
    pub changed_poses: ChangedWorldPoses<P>,
    /// Simulated time of the world after the step.
    pub sim_time: Duration,
}

pub struct ForwardStep;

pub trait ForwardStepInterface<P: Policy> {
    fn world_forward_step(&mut self, world: &Identity, input: &StepInput) -> StepOutput<P>;
}

impl Feature for ForwardStep {
    const NAME: &'static str = "ForwardStep";
    type Requires = ();
    type Interface<P: Policy> = dyn ForwardStepInterface<P>;
}

impl<P: Policy, FL: Has<ForwardStep>> World<P, FL> {
    pub fn step(&self, input: &StepInput) -> StepOutput<P> {
        self.modify::<ForwardStep, _>(|stepper, world| stepper.world_forward_step(world, input))
    }
}

/// A touching pair of shapes, as reported by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Contact<P: Policy> {
    pub collision1: Identity,
    pub collision2: Identity,
    /// World-frame contact point.
    pub point: P::Vector,
}

/// A contact with both shapes resolved to proxies.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeContact<P: Policy, FL: FeatureList> {
    pub collision1: Shape<P, FL>,
    pub collision2: Shape<P, FL>,
    pub point: P::Vector,
}

/// Contacts found by the most recent [`ForwardStep`] of a world.
pub struct GetContactsFromLastStep;

pub trait GetContactsFromLastStepInterface<P: Policy> {
    /// Empty before the first step and for unknown worlds.
    fn contacts_from_last_step(&self, world: &Identity) -> Vec<Contact<P>>;
}

impl Feature for GetContactsFromLastStep {
    const NAME: &'static str = "GetContactsFromLastStep";
    type Requires = (ForwardStep,);
    type Interface<P: Policy> = dyn GetContactsFromLastStepInterface<P>;
}

impl<P, FL> World<P, FL>
where
    P: Policy,
    FL: Has<GetContactsFromLastStep> + Has<ForwardStep>,
{
    /// Contacts whose shapes no longer exist are skipped.
    pub fn contacts_from_last_step(&self) -> Vec<ShapeContact<P, FL>> {
        self.query::<GetContactsFromLastStep, _>(|contacts, world| {
            contacts.contacts_from_last_step(world)
        })
        .into_iter()
        .filter_map(|contact| {
            Some(ShapeContact {
                collision1: self.related(contact.collision1)?,
                collision2: self.related(contact.collision2)?,
                point: contact.point,
            })
        })
        .collect()
    }
}
