//! Shape properties and bounding boxes.

use featherstone_common::{AlignedBox, FrameId, Identity, Policy, Pose};

use crate::{
    Feature, FeatureList, FrameSemantics, GetShapeFromLink, Has, Link, LinkFrameSemantics, Shape,
    ShapeFrameSemantics,
};

/// Pose of a shape relative to its link.
pub struct GetShapeKinematicProperties;

pub trait GetShapeKinematicPropertiesInterface<P: Policy> {
    fn shape_relative_transform(&self, shape: &Identity) -> Pose<P>;
}

impl Feature for GetShapeKinematicProperties {
    const NAME: &'static str = "GetShapeKinematicProperties";
    type Requires = ();
    type Interface<P: Policy> = dyn GetShapeKinematicPropertiesInterface<P>;
}

impl<P: Policy, FL: Has<GetShapeKinematicProperties>> Shape<P, FL> {
    pub fn relative_transform(&self) -> Pose<P> {
        self.query::<GetShapeKinematicProperties, _>(|k, shape| k.shape_relative_transform(shape))
    }
}

pub struct SetShapeKinematicProperties;

pub trait SetShapeKinematicPropertiesInterface<P: Policy> {
    fn set_shape_relative_transform(&mut self, shape: &Identity, pose: &Pose<P>);
}

impl Feature for SetShapeKinematicProperties {
    const NAME: &'static str = "SetShapeKinematicProperties";
    type Requires = ();
    type Interface<P: Policy> = dyn SetShapeKinematicPropertiesInterface<P>;
}

impl<P: Policy, FL: Has<SetShapeKinematicProperties>> Shape<P, FL> {
    pub fn set_relative_transform(&self, pose: &Pose<P>) {
        self.modify::<SetShapeKinematicProperties, _>(|k, shape| {
            k.set_shape_relative_transform(shape, pose)
        });
    }
}

/// Contact coefficients between pairs of shapes.
///
/// Coefficients are symmetric: `a.friction_coefficient(&b)` always equals
/// `b.friction_coefficient(&a)`.
pub struct GetShapeCollisionProperties;

pub trait GetShapeCollisionPropertiesInterface<P: Policy> {
    fn shape_friction_coefficient(&self, shape: &Identity, other: &Identity) -> P::Scalar;
    fn shape_restitution_coefficient(&self, shape: &Identity, other: &Identity) -> P::Scalar;
}

impl Feature for GetShapeCollisionProperties {
    const NAME: &'static str = "GetShapeCollisionProperties";
    type Requires = ();
    type Interface<P: Policy> = dyn GetShapeCollisionPropertiesInterface<P>;
}

impl<P: Policy, FL: Has<GetShapeCollisionProperties>> Shape<P, FL> {
    /// `other` may come from any feature list over the same backend.
    pub fn friction_coefficient<FL2: FeatureList>(&self, other: &Shape<P, FL2>) -> P::Scalar {
        self.query::<GetShapeCollisionProperties, _>(|c, shape| {
            c.shape_friction_coefficient(shape, other.identity())
        })
    }

    pub fn restitution_coefficient<FL2: FeatureList>(&self, other: &Shape<P, FL2>) -> P::Scalar {
        self.query::<GetShapeCollisionProperties, _>(|c, shape| {
            c.shape_restitution_coefficient(shape, other.identity())
        })
    }
}

pub struct SetShapeCollisionProperties;

pub trait SetShapeCollisionPropertiesInterface<P: Policy> {
    fn set_shape_friction_coefficient(
        &mut self,
        shape: &Identity,
        other: &Identity,
        value: P::Scalar,
    );
    fn set_shape_restitution_coefficient(
        &mut self,
        shape: &Identity,
        other: &Identity,
        value: P::Scalar,
    );
}

impl Feature for SetShapeCollisionProperties {
    const NAME: &'static str = "SetShapeCollisionProperties";
    type Requires = ();
    type Interface<P: Policy> = dyn SetShapeCollisionPropertiesInterface<P>;
}

impl<P: Policy, FL: Has<SetShapeCollisionProperties>> Shape<P, FL> {
    pub fn set_friction_coefficient<FL2: FeatureList>(
        &self,
        other: &Shape<P, FL2>,
        value: P::Scalar,
    ) {
        self.modify::<SetShapeCollisionProperties, _>(|c, shape| {
            c.set_shape_friction_coefficient(shape, other.identity(), value)
        });
    }

    pub fn set_restitution_coefficient<FL2: FeatureList>(
        &self,
        other: &Shape<P, FL2>,
        value: P::Scalar,
    ) {
        self.modify::<SetShapeCollisionProperties, _>(|c, shape| {
            c.set_shape_restitution_coefficient(shape, other.identity(), value)
        });
    }
}

/// Axis-aligned bounding box of a shape.
pub struct GetShapeBoundingBox;

pub trait GetShapeBoundingBoxInterface<P: Policy> {
    /// Box in the shape's own frame. Unknown shapes yield an empty box.
    fn shape_axis_aligned_bounding_box(&self, shape: &Identity) -> AlignedBox<P>;
}

impl Feature for GetShapeBoundingBox {
    const NAME: &'static str = "GetShapeBoundingBox";
    type Requires = (ShapeFrameSemantics,);
    type Interface<P: Policy> = dyn GetShapeBoundingBoxInterface<P>;
}

impl<P: Policy, FL> Shape<P, FL>
where
    FL: Has<GetShapeBoundingBox> + Has<ShapeFrameSemantics> + Has<FrameSemantics>,
{
    /// Bounding box aligned with the axes of `frame`.
    pub fn axis_aligned_bounding_box(&self, frame: &FrameId) -> AlignedBox<P> {
        let local = self.query::<GetShapeBoundingBox, _>(|boxes, shape| {
            boxes.shape_axis_aligned_bounding_box(shape)
        });
        local.transformed(&self.frame_data_relative_to(frame).pose)
    }
}

/// Bounding box of every shape on a link. Client side only.
pub struct GetLinkBoundingBox;

impl Feature for GetLinkBoundingBox {
    const NAME: &'static str = "GetLinkBoundingBox";
    type Requires = (GetShapeBoundingBox, GetShapeFromLink, LinkFrameSemantics);
    type Interface<P: Policy> = ();
    const NEEDS_INTERFACE: bool = false;
}

impl<P: Policy, FL> Link<P, FL>
where
    FL: Has<GetLinkBoundingBox>
        + Has<GetShapeBoundingBox>
        + Has<GetShapeFromLink>
        + Has<ShapeFrameSemantics>
        + Has<FrameSemantics>,
{
    /// Empty for a link without shapes.
    pub fn axis_aligned_bounding_box(&self, frame: &FrameId) -> AlignedBox<P> {
        (0..self.shape_count())
            .filter_map(|i| self.shape(i))
            .fold(AlignedBox::empty(), |acc, shape| {
                acc.merge(&shape.axis_aligned_bounding_box(frame))
            })
    }
}
