//! Geometry policies.
//!
//! A [`Policy`] fixes the scalar, vector and rotation types that features and
//! backends exchange. Features are written once against `P: Policy`; a
//! backend picks one concrete policy.

use glam::{DQuat, DVec3, Quat, Vec3};
use std::fmt::Debug;

use crate::Identity;

/// Scalar/geometry convention shared by a client and a backend.
pub trait Policy: Copy + Debug + Default + PartialEq + Eq + 'static {
    type Scalar: Copy + Debug + Default + PartialEq + PartialOrd + 'static;
    type Vector: Copy + Debug + Default + PartialEq + 'static;
    type Rotation: Copy + Debug + PartialEq + 'static;

    /// Short tag used in logs and plugin listings.
    const NAME: &'static str;

    fn identity_rotation() -> Self::Rotation;
    fn rotate(rotation: Self::Rotation, v: Self::Vector) -> Self::Vector;
    fn compose_rotation(a: Self::Rotation, b: Self::Rotation) -> Self::Rotation;
    fn invert_rotation(r: Self::Rotation) -> Self::Rotation;

    fn add(a: Self::Vector, b: Self::Vector) -> Self::Vector;
    fn neg(v: Self::Vector) -> Self::Vector;
    fn min(a: Self::Vector, b: Self::Vector) -> Self::Vector;
    fn max(a: Self::Vector, b: Self::Vector) -> Self::Vector;
    fn splat(s: Self::Scalar) -> Self::Vector;
    fn infinity() -> Self::Scalar;

    /// The eight corners of the box spanned by `min` and `max`.
    fn corners(min: Self::Vector, max: Self::Vector) -> [Self::Vector; 8];

    /// Whether two poses agree within `tolerance` on every component.
    fn poses_close(a: &Pose<Self>, b: &Pose<Self>, tolerance: Self::Scalar) -> bool;
}

/// Double-precision 3D policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Policy3d;

/// Single-precision 3D policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Policy3f;

macro_rules! glam_policy {
    ($policy:ty, $name:literal, $scalar:ty, $vec:ty, $quat:ty) => {
        impl Policy for $policy {
            type Scalar = $scalar;
            type Vector = $vec;
            type Rotation = $quat;

            const NAME: &'static str = $name;

            fn identity_rotation() -> $quat {
                <$quat>::IDENTITY
            }

            fn rotate(rotation: $quat, v: $vec) -> $vec {
                rotation * v
            }

            fn compose_rotation(a: $quat, b: $quat) -> $quat {
                a * b
            }

            fn invert_rotation(r: $quat) -> $quat {
                r.inverse()
            }

            fn add(a: $vec, b: $vec) -> $vec {
                a + b
            }

            fn neg(v: $vec) -> $vec {
                -v
            }

            fn min(a: $vec, b: $vec) -> $vec {
                a.min(b)
            }

            fn max(a: $vec, b: $vec) -> $vec {
                a.max(b)
            }

            fn splat(s: $scalar) -> $vec {
                <$vec>::splat(s)
            }

            fn infinity() -> $scalar {
                <$scalar>::INFINITY
            }

            fn corners(min: $vec, max: $vec) -> [$vec; 8] {
                [
                    <$vec>::new(min.x, min.y, min.z),
                    <$vec>::new(max.x, min.y, min.z),
                    <$vec>::new(min.x, max.y, min.z),
                    <$vec>::new(max.x, max.y, min.z),
                    <$vec>::new(min.x, min.y, max.z),
                    <$vec>::new(max.x, min.y, max.z),
                    <$vec>::new(min.x, max.y, max.z),
                    <$vec>::new(max.x, max.y, max.z),
                ]
            }

            fn poses_close(a: &Pose<Self>, b: &Pose<Self>, tolerance: $scalar) -> bool {
                // q and -q describe the same rotation.
                a.position.abs_diff_eq(b.position, tolerance)
                    && (a.rotation.abs_diff_eq(b.rotation, tolerance)
                        || a.rotation.abs_diff_eq(-b.rotation, tolerance))
            }
        }
    };
}

glam_policy!(Policy3d, "3d", f64, DVec3, DQuat);
glam_policy!(Policy3f, "3f", f32, Vec3, Quat);

/// Rigid transform: rotation followed by translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose<P: Policy> {
    pub position: P::Vector,
    pub rotation: P::Rotation,
}

impl<P: Policy> Pose<P> {
    pub fn new(position: P::Vector, rotation: P::Rotation) -> Self {
        Self { position, rotation }
    }

    pub fn identity() -> Self {
        Self::new(P::Vector::default(), P::identity_rotation())
    }

    pub fn from_position(position: P::Vector) -> Self {
        Self::new(position, P::identity_rotation())
    }

    /// `self * child`: express a pose given in this pose's frame in the
    /// frame this pose is expressed in.
    pub fn compose(&self, child: &Pose<P>) -> Pose<P> {
        Self::new(
            P::add(self.position, P::rotate(self.rotation, child.position)),
            P::compose_rotation(self.rotation, child.rotation),
        )
    }

    pub fn inverse(&self) -> Pose<P> {
        let rotation = P::invert_rotation(self.rotation);
        Self::new(P::neg(P::rotate(rotation, self.position)), rotation)
    }

    pub fn transform_point(&self, point: P::Vector) -> P::Vector {
        P::add(self.position, P::rotate(self.rotation, point))
    }

    pub fn is_close(&self, other: &Pose<P>, tolerance: P::Scalar) -> bool {
        P::poses_close(self, other, tolerance)
    }
}

impl<P: Policy> Default for Pose<P> {
    fn default() -> Self {
        Self::identity()
    }
}

/// Axis-aligned box. An empty box has `min > max` on every axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignedBox<P: Policy> {
    pub min: P::Vector,
    pub max: P::Vector,
}

impl<P: Policy> AlignedBox<P> {
    pub fn new(min: P::Vector, max: P::Vector) -> Self {
        Self { min, max }
    }

    pub fn empty() -> Self {
        let inf = P::infinity();
        Self::new(P::splat(inf), P::neg(P::splat(inf)))
    }

    pub fn is_empty(&self) -> bool {
        P::min(self.min, self.max) != self.min
    }

    /// Smallest box containing both boxes.
    pub fn merge(&self, other: &AlignedBox<P>) -> AlignedBox<P> {
        if other.is_empty() {
            return *self;
        }
        if self.is_empty() {
            return *other;
        }
        Self::new(P::min(self.min, other.min), P::max(self.max, other.max))
    }

    /// Region shared by both boxes. Empty when they do not touch.
    pub fn intersection(&self, other: &AlignedBox<P>) -> AlignedBox<P> {
        if self.is_empty() || other.is_empty() {
            return Self::empty();
        }
        let shared = Self::new(P::max(self.min, other.min), P::min(self.max, other.max));
        if shared.is_empty() { Self::empty() } else { shared }
    }

    pub fn intersects(&self, other: &AlignedBox<P>) -> bool {
        !self.intersection(other).is_empty()
    }

    /// Box around this box after moving it by `pose`. Rotations grow the box.
    pub fn transformed(&self, pose: &Pose<P>) -> AlignedBox<P> {
        if self.is_empty() {
            return *self;
        }
        P::corners(self.min, self.max)
            .into_iter()
            .map(|c| pose.transform_point(c))
            .fold(Self::empty(), |acc, p| {
                if acc.is_empty() {
                    Self::new(p, p)
                } else {
                    Self::new(P::min(acc.min, p), P::max(acc.max, p))
                }
            })
    }
}

impl<P: Policy> Default for AlignedBox<P> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Names a reference frame: the world, or the frame attached to an entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrameId {
    identity: Identity,
}

impl FrameId {
    /// The inertial world frame.
    pub fn world() -> Self {
        Self {
            identity: Identity::invalid(),
        }
    }

    pub fn of(identity: Identity) -> Self {
        Self { identity }
    }

    pub fn is_world(&self) -> bool {
        !self.identity.is_valid()
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }
}

/// Kinematic state of a frame relative to some other frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameData<P: Policy> {
    pub pose: Pose<P>,
    pub linear_velocity: P::Vector,
}

impl<P: Policy> Default for FrameData<P> {
    fn default() -> Self {
        Self {
            pose: Pose::identity(),
            linear_velocity: P::Vector::default(),
        }
    }
}

pub type Pose3d = Pose<Policy3d>;
pub type Pose3f = Pose<Policy3f>;
pub type AlignedBox3d = AlignedBox<Policy3d>;
pub type FrameData3d = FrameData<Policy3d>;
