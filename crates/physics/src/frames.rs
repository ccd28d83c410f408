//! Frame semantics: where entities are, relative to the world or to each
//! other.
//!
//! Backends only answer "relative to the world"; everything else is
//! resolved here on the client side.

use featherstone_common::{FrameData, FrameId, Policy, Pose};

use crate::{Feature, Has, Joint, Link, Shape};

/// Backend access to world-relative frame data.
pub struct FrameSemantics;

pub trait FrameSemanticsInterface<P: Policy> {
    /// Frame data of `frame` relative to the world. The world frame itself
    /// and unknown frames resolve to the identity.
    fn frame_data_relative_to_world(&self, frame: &FrameId) -> FrameData<P>;
}

impl Feature for FrameSemantics {
    const NAME: &'static str = "FrameSemantics";
    type Requires = ();
    type Interface<P: Policy> = dyn FrameSemanticsInterface<P>;
}

/// Express `target` in the frame `relative_to`.
pub fn resolve_frame_data<P: Policy>(
    frames: &dyn FrameSemanticsInterface<P>,
    target: &FrameId,
    relative_to: &FrameId,
) -> FrameData<P> {
    let target = frames.frame_data_relative_to_world(target);
    if relative_to.is_world() {
        return target;
    }
    let reference = frames.frame_data_relative_to_world(relative_to);
    let to_reference = reference.pose.inverse();
    FrameData {
        pose: to_reference.compose(&target.pose),
        linear_velocity: P::rotate(
            to_reference.rotation,
            P::add(target.linear_velocity, P::neg(reference.linear_velocity)),
        ),
    }
}

macro_rules! entity_frame_semantics {
    ($(#[$meta:meta])* $feature:ident, $kind:ident) => {
        $(#[$meta])*
        pub struct $feature;

        impl Feature for $feature {
            const NAME: &'static str = stringify!($feature);
            type Requires = (FrameSemantics,);
            type Interface<P: Policy> = ();
            const NEEDS_INTERFACE: bool = false;
        }

        impl<P: Policy, FL> $kind<P, FL>
        where
            FL: Has<$feature> + Has<FrameSemantics>,
        {
            pub fn frame_id(&self) -> FrameId {
                FrameId::of(self.identity().clone())
            }

            pub fn frame_data_relative_to(&self, relative_to: &FrameId) -> FrameData<P> {
                let target = self.frame_id();
                self.query::<FrameSemantics, _>(|frames, _| {
                    resolve_frame_data(frames, &target, relative_to)
                })
            }

            pub fn world_pose(&self) -> Pose<P> {
                self.frame_data_relative_to(&FrameId::world()).pose
            }
        }
    };
}

entity_frame_semantics!(LinkFrameSemantics, Link);
entity_frame_semantics!(ShapeFrameSemantics, Shape);
entity_frame_semantics!(
    /// A joint's frame is the frame of its child link.
    JointFrameSemantics,
    Joint
);
